use itertools::iproduct;
use std::collections::HashMap;

use crate::domain::{Commodity, Region};
use crate::error::{EngineError, EngineResult};

/// Ordered Regions x Commodities cross join, region-major.
///
/// Rest of World is always the last region, so its cells are the last
/// `commodities.len()` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseIndex {
    regions: Vec<Region>,
    commodities: Vec<Commodity>,
    region_lookup: HashMap<String, usize>,
    commodity_lookup: HashMap<u32, usize>,
}

impl BaseIndex {
    /// Build the index, appending Rest of World after the input regions
    pub fn new(regions: &[Region], commodities: &[Commodity]) -> EngineResult<Self> {
        if regions.is_empty() {
            return Err(EngineError::data_shape("no regions declared"));
        }
        if commodities.is_empty() {
            return Err(EngineError::data_shape("no commodities declared"));
        }

        let mut all_regions: Vec<Region> = regions
            .iter()
            .filter(|r| !r.is_rest_of_world())
            .cloned()
            .collect();
        all_regions.push(Region::rest_of_world());

        let mut region_lookup = HashMap::with_capacity(all_regions.len());
        for (idx, region) in all_regions.iter().enumerate() {
            if region_lookup.insert(region.code.clone(), idx).is_some() {
                return Err(EngineError::data_shape(format!("duplicate region code '{}'", region.code)));
            }
        }
        let mut commodity_lookup = HashMap::with_capacity(commodities.len());
        for (idx, commodity) in commodities.iter().enumerate() {
            if commodity_lookup.insert(commodity.code, idx).is_some() {
                return Err(EngineError::data_shape(format!("duplicate commodity code {}", commodity.code)));
            }
        }

        Ok(Self {
            regions: all_regions,
            commodities: commodities.to_vec(),
            region_lookup,
            commodity_lookup,
        })
    }

    /// Number of cells (L)
    pub fn len(&self) -> usize {
        self.regions.len() * self.commodities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn commodities(&self) -> &[Commodity] {
        &self.commodities
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn commodity_count(&self) -> usize {
        self.commodities.len()
    }

    /// Regions excluding Rest of World
    pub fn real_region_count(&self) -> usize {
        self.regions.len() - 1
    }

    pub fn rest_of_world(&self) -> usize {
        self.regions.len() - 1
    }

    pub fn cell(&self, region: usize, commodity: usize) -> usize {
        region * self.commodities.len() + commodity
    }

    pub fn region_of(&self, cell: usize) -> usize {
        cell / self.commodities.len()
    }

    pub fn commodity_of(&self, cell: usize) -> usize {
        cell % self.commodities.len()
    }

    pub fn is_rest_of_world_cell(&self, cell: usize) -> bool {
        self.region_of(cell) == self.rest_of_world()
    }

    pub fn region_position(&self, code: &str) -> Option<usize> {
        self.region_lookup.get(code).copied()
    }

    pub fn commodity_position(&self, code: u32) -> Option<usize> {
        self.commodity_lookup.get(&code).copied()
    }

    /// Cell of a (region code, commodity code) key
    pub fn locate(&self, region: &str, commodity: u32) -> EngineResult<usize> {
        let r = self
            .region_position(region)
            .ok_or_else(|| EngineError::data_shape(format!("unknown region code '{region}'")))?;
        let c = self
            .commodity_position(commodity)
            .ok_or_else(|| EngineError::data_shape(format!("unknown commodity code {commodity}")))?;
        Ok(self.cell(r, c))
    }

    pub fn locate_region(&self, region: &str) -> EngineResult<usize> {
        self.region_position(region)
            .ok_or_else(|| EngineError::data_shape(format!("unknown region code '{region}'")))
    }

    pub fn commodity_code(&self, cell: usize) -> u32 {
        self.commodities[self.commodity_of(cell)].code
    }

    /// All (region, commodity) pairs in cell order
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        iproduct!(0..self.regions.len(), 0..self.commodities.len())
    }

    /// Cells of real regions in cell order
    pub fn real_cells(&self) -> std::ops::Range<usize> {
        0..self.real_region_count() * self.commodities.len()
    }

    /// Cells of a commodity across real regions
    pub fn commodity_cells(&self, commodity: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.real_region_count()).map(move |r| self.cell(r, commodity))
    }
}
