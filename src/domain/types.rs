use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumIter, IntoEnumIterator};

// ============================================================================
// Market Dimensions
// ============================================================================

/// Code of the synthetic region absorbing global trade residuals
pub const REST_OF_WORLD_CODE: &str = "zy";
pub const REST_OF_WORLD_NAME: &str = "Rest of World";

/// A market region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub code: String,
    pub name: String,
    /// Continent used by the aggregated output view
    #[serde(default)]
    pub continent: Option<String>,
}

impl Region {
    pub fn rest_of_world() -> Self {
        Self {
            code: REST_OF_WORLD_CODE.to_string(),
            name: REST_OF_WORLD_NAME.to_string(),
            continent: None,
        }
    }

    pub fn is_rest_of_world(&self) -> bool {
        self.code == REST_OF_WORLD_CODE
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

/// A traded, produced or consumed commodity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commodity {
    pub code: u32,
    pub name: String,
}

// ============================================================================
// Domain Kinds
// ============================================================================

/// Optimized domains, declared in optimization vector order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter)]
pub enum DomainKind {
    Demand,
    Export,
    Import,
    Manufacture,
    Supply,
}

/// Calibration formula family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveForm {
    /// slope = (1 / elasticity) * price / quantity
    Inverted,
    /// slope = elasticity * price / quantity
    Regular,
}

impl DomainKind {
    /// Position of this domain's block in the optimization vector
    pub fn block(self) -> usize {
        match self {
            DomainKind::Demand => 0,
            DomainKind::Export => 1,
            DomainKind::Import => 2,
            DomainKind::Manufacture => 3,
            DomainKind::Supply => 4,
        }
    }

    /// Sign applied to slope and intercept so the objective stays concave
    pub fn curvature(self) -> f64 {
        match self {
            DomainKind::Demand | DomainKind::Export => 1.0,
            DomainKind::Import | DomainKind::Manufacture | DomainKind::Supply => -1.0,
        }
    }

    pub fn curve_form(self) -> CurveForm {
        match self {
            DomainKind::Manufacture => CurveForm::Regular,
            _ => CurveForm::Inverted,
        }
    }

    pub fn all() -> impl Iterator<Item = DomainKind> {
        DomainKind::iter()
    }
}

/// Number of domain blocks in the optimization vector
pub const DOMAIN_BLOCKS: usize = 5;

// ============================================================================
// Commodity Groups
// ============================================================================

/// Product groups governing the material balance law of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter)]
pub enum CommodityGroup {
    /// Roundwood and other primary inputs to manufacturing
    Raw,
    Intermediate,
    Final,
    Fuelwood,
    /// Other industrial roundwood, supplied straight to demand
    OtherRoundwood,
}

impl CommodityGroup {
    pub fn all() -> impl Iterator<Item = CommodityGroup> {
        CommodityGroup::iter()
    }
}
