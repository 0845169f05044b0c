//! Sparse QP assembly in Clarabel's conic form.
//!
//! minimize ½ xᵀPx + qᵀx  subject to  Ax + s = b, s ∈ K
//!
//! `P` is diagonal here. Equalities use the zero cone, inequalities the
//! nonnegative cone; consecutive rows of the same kind share one cone.

use clarabel::algebra::CscMatrix;
use clarabel::solver::SupportedConeT;
use std::collections::BTreeMap;
use std::ops::Range;

/// Contiguous block of constraint rows, used to read their duals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowRange {
    pub start: usize,
    pub len: usize,
}

impl RowRange {
    pub fn rows(&self) -> Range<usize> {
        self.start..self.start + self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn duals<'a>(&self, z: &'a [f64]) -> &'a [f64] {
        &z[self.rows()]
    }
}

/// Assembled problem data ready for the solver
pub struct QpProblem {
    pub p: CscMatrix<f64>,
    pub q: Vec<f64>,
    pub a: CscMatrix<f64>,
    pub b: Vec<f64>,
    pub cones: Vec<SupportedConeT<f64>>,
}

impl QpProblem {
    pub fn variables(&self) -> usize {
        self.q.len()
    }

    pub fn constraints(&self) -> usize {
        self.b.len()
    }
}

#[derive(Debug, Default)]
pub struct QpBuilder {
    quadratic: Vec<f64>,
    linear: Vec<f64>,
    /// Constraint matrix stored column-wise as (row, value)
    columns: Vec<Vec<(usize, f64)>>,
    rhs: Vec<f64>,
    cones: Vec<SupportedConeT<f64>>,
}

impl QpBuilder {
    pub fn new(variables: usize) -> Self {
        Self {
            quadratic: vec![0.0; variables],
            linear: vec![0.0; variables],
            columns: vec![Vec::new(); variables],
            ..Default::default()
        }
    }

    /// Append `count` fresh variables, returning their column range
    pub fn add_variables(&mut self, count: usize) -> Range<usize> {
        let start = self.linear.len();
        self.quadratic.resize(start + count, 0.0);
        self.linear.resize(start + count, 0.0);
        self.columns.resize(start + count, Vec::new());
        start..start + count
    }

    pub fn variables(&self) -> usize {
        self.linear.len()
    }

    pub fn rows(&self) -> usize {
        self.rhs.len()
    }

    /// Add `½ quadratic·x² + linear·x` for one variable to the minimized objective
    pub fn add_objective(&mut self, var: usize, quadratic: f64, linear: f64) {
        self.quadratic[var] += quadratic;
        self.linear[var] += linear;
    }

    fn push_row(&mut self, coeffs: &[(usize, f64)], b: f64, equality: bool) -> usize {
        let row = self.rhs.len();
        let mut merged: BTreeMap<usize, f64> = BTreeMap::new();
        for &(col, val) in coeffs {
            *merged.entry(col).or_insert(0.0) += val;
        }
        for (col, val) in merged {
            if val != 0.0 {
                self.columns[col].push((row, val));
            }
        }
        self.rhs.push(b);

        match (self.cones.last_mut(), equality) {
            (Some(SupportedConeT::ZeroConeT(n)), true) => *n += 1,
            (Some(SupportedConeT::NonnegativeConeT(n)), false) => *n += 1,
            (_, true) => self.cones.push(SupportedConeT::ZeroConeT(1)),
            (_, false) => self.cones.push(SupportedConeT::NonnegativeConeT(1)),
        }
        row
    }

    /// Σ coeff·x = b
    pub fn push_eq(&mut self, coeffs: &[(usize, f64)], b: f64) -> usize {
        self.push_row(coeffs, b, true)
    }

    /// Σ coeff·x ≤ b
    pub fn push_leq(&mut self, coeffs: &[(usize, f64)], b: f64) -> usize {
        self.push_row(coeffs, b, false)
    }

    /// Σ coeff·x ≥ b
    pub fn push_geq(&mut self, coeffs: &[(usize, f64)], b: f64) -> usize {
        let negated: Vec<(usize, f64)> = coeffs.iter().map(|&(c, v)| (c, -v)).collect();
        self.push_row(&negated, -b, false)
    }

    /// Run `f` and return the rows it appended
    pub fn block<F>(&mut self, f: F) -> RowRange
    where
        F: FnOnce(&mut Self),
    {
        let start = self.rows();
        f(self);
        RowRange { start, len: self.rows() - start }
    }

    pub fn build(mut self) -> QpProblem {
        let n = self.linear.len();
        let m = self.rhs.len();

        let mut col_ptr = Vec::with_capacity(n + 1);
        let mut row_idx = Vec::new();
        let mut values = Vec::new();
        for column in self.columns.iter_mut() {
            col_ptr.push(row_idx.len());
            column.sort_by_key(|(r, _)| *r);
            for &(r, v) in column.iter() {
                row_idx.push(r);
                values.push(v);
            }
        }
        col_ptr.push(row_idx.len());

        let mut p_ptr = Vec::with_capacity(n + 1);
        let mut p_idx = Vec::new();
        let mut p_val = Vec::new();
        for (j, &d) in self.quadratic.iter().enumerate() {
            p_ptr.push(p_idx.len());
            if d != 0.0 {
                p_idx.push(j);
                p_val.push(d);
            }
        }
        p_ptr.push(p_idx.len());

        QpProblem {
            p: CscMatrix::new(n, n, p_ptr, p_idx, p_val),
            q: self.linear,
            a: CscMatrix::new(m, n, col_ptr, row_idx, values),
            b: self.rhs,
            cones: self.cones,
        }
    }
}
