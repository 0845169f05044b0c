use nalgebra::{DMatrix, DVector};

use super::BaseIndex;
use crate::domain::{CoefficientRecord, DefaultCoefficientRecord};
use crate::error::EngineResult;

/// Block-diagonal input-output matrix over the base index.
///
/// Block `r` holds `M[(r, input), (r, output)]`, the units of `input` consumed
/// per unit of `output` manufactured in region `r`. Only the diagonal blocks
/// are stored.
#[derive(Debug, Clone, PartialEq)]
pub struct IoMatrix {
    blocks: Vec<DMatrix<f64>>,
    commodities: usize,
}

impl IoMatrix {
    pub fn build(
        index: &BaseIndex,
        coefficients: &[CoefficientRecord],
        defaults: Option<&[DefaultCoefficientRecord]>,
    ) -> EngineResult<Self> {
        let n = index.commodity_count();
        let mut blocks = vec![DMatrix::<f64>::zeros(n, n); index.region_count()];

        for rec in coefficients {
            let region = index.locate_region(&rec.region)?;
            let input = index.locate(&rec.region, rec.input)? - region * n;
            let output = index.locate(&rec.region, rec.output)? - region * n;
            blocks[region][(input, output)] = rec.coefficient;
        }

        if let Some(defaults) = defaults {
            let mut fallback = DMatrix::<f64>::zeros(n, n);
            for rec in defaults {
                if let (Some(input), Some(output)) =
                    (index.commodity_position(rec.input), index.commodity_position(rec.output))
                {
                    fallback[(input, output)] = rec.coefficient;
                }
            }
            for block in blocks.iter_mut().take(index.real_region_count()) {
                for (entry, default) in block.iter_mut().zip(fallback.iter()) {
                    if *entry == 0.0 {
                        *entry = *default;
                    }
                }
            }
        }

        Ok(Self { blocks, commodities: n })
    }

    /// Variant without the Rest of World block
    pub fn short(&self) -> Self {
        let keep = self.blocks.len().saturating_sub(1);
        Self {
            blocks: self.blocks[..keep].to_vec(),
            commodities: self.commodities,
        }
    }

    /// Side length (number of cells covered)
    pub fn dim(&self) -> usize {
        self.blocks.len() * self.commodities
    }

    pub fn block(&self, region: usize) -> &DMatrix<f64> {
        &self.blocks[region]
    }

    /// `M · x`: input requirement per cell for manufacturing output `x`
    pub fn requirement(&self, manufacture: &[f64]) -> Vec<f64> {
        self.apply(manufacture, false)
    }

    /// `Mᵀ · p`: input cost per output cell for input prices `p`
    pub fn input_cost(&self, price: &[f64]) -> Vec<f64> {
        self.apply(price, true)
    }

    fn apply(&self, values: &[f64], transpose: bool) -> Vec<f64> {
        let n = self.commodities;
        let mut out = vec![0.0; values.len()];
        for (r, block) in self.blocks.iter().enumerate() {
            let start = r * n;
            if start + n > values.len() {
                break;
            }
            let x = DVector::from_column_slice(&values[start..start + n]);
            let y = if transpose { block.transpose() * x } else { block * x };
            out[start..start + n].copy_from_slice(y.as_slice());
        }
        out
    }

    /// Nonzero coefficients of one region as (input, output, coefficient)
    pub fn entries(&self, region: usize) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let block = &self.blocks[region];
        (0..self.commodities).flat_map(move |i| {
            (0..self.commodities).filter_map(move |o| {
                let v = block[(i, o)];
                (v != 0.0).then_some((i, o, v))
            })
        })
    }

    /// Dense L x L form
    pub fn to_dense(&self) -> DMatrix<f64> {
        let dim = self.dim();
        let n = self.commodities;
        let mut dense = DMatrix::<f64>::zeros(dim, dim);
        for (r, block) in self.blocks.iter().enumerate() {
            dense.view_mut((r * n, r * n), (n, n)).copy_from(block);
        }
        dense
    }
}
