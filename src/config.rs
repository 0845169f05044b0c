use anyhow::Result;
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct Config {
    #[validate(nested)]
    pub model: ModelConfig,
    #[validate(nested)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub commodities: CommodityConventions,
    #[serde(default)]
    pub io: IoConfig,
}

/// Price determination for supply, demand and manufacturing cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Display, EnumString, EnumIter)]
pub enum ProductPriceMode {
    #[serde(rename = "shadow_PP")]
    #[strum(serialize = "shadow_PP")]
    Shadow,
    #[serde(rename = "calculated_PP")]
    #[strum(serialize = "calculated_PP")]
    Calculated,
}

/// World price policy for traded commodities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Display, EnumString, EnumIter)]
pub enum WorldPriceMode {
    #[serde(rename = "shadow_WP")]
    #[strum(serialize = "shadow_WP")]
    Shadow,
    #[serde(rename = "constant_WP")]
    #[strum(serialize = "constant_WP")]
    Constant,
    #[serde(rename = "average_WP")]
    #[strum(serialize = "average_WP")]
    Average,
    #[serde(rename = "exogen_WP")]
    #[strum(serialize = "exogen_WP")]
    Exogenous,
}

/// Granularity of the material balance constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Display, EnumString, EnumIter)]
pub enum MaterialBalanceMode {
    /// One constraint per (region, commodity)
    #[serde(rename = "RC_specific_MB")]
    #[strum(serialize = "RC_specific_MB")]
    RegionCommodity,
    /// One constraint block per (region, commodity group)
    #[serde(rename = "RCG_specific_MB")]
    #[strum(serialize = "RCG_specific_MB")]
    RegionGroup,
    /// One constraint block per commodity across all regions
    #[serde(rename = "C_specific_MB")]
    #[strum(serialize = "C_specific_MB")]
    Commodity,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ModelConfig {
    /// Base year of the simulation; the input file wins on mismatch
    #[validate(range(min = 1900, max = 2300))]
    pub base_year: i32,
    /// Number of follow periods after the base period
    #[validate(range(max = 200))]
    pub max_period: usize,
    pub price_mode: ProductPriceMode,
    pub world_price_mode: WorldPriceMode,
    pub material_balance: MaterialBalanceMode,
    pub global_material_balance: bool,
    pub dynamization: bool,
    /// Cap production prices at import prices
    pub capped_prices: bool,
    /// Report quantities clipped into their bounds
    pub cleaned_quantities: bool,
    pub verbose: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SolverConfig {
    #[validate(range(min = 1))]
    pub max_iter: u32,
    pub tol_gap_abs: f64,
    pub tol_gap_rel: f64,
}

/// Commodity code conventions used by recycling and supply shifts
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommodityConventions {
    /// Wastepaper commodity receiving recycled paper supply
    pub wastepaper_code: u32,
    /// Paper commodities have codes strictly above this value
    pub paper_code_floor: u32,
    /// Supply commodities at or above this code follow the paper-type supply shift
    pub paper_supply_code: u32,
}

impl Default for CommodityConventions {
    fn default() -> Self {
        Self {
            wastepaper_code: 90,
            paper_code_floor: 90,
            paper_supply_code: 89,
        }
    }
}

/// Substitution of a default IO coefficient set for regions without their own
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IoConfig {
    pub use_default_io: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_year: 2020,
            max_period: 10,
            price_mode: ProductPriceMode::Shadow,
            world_price_mode: WorldPriceMode::Shadow,
            material_balance: MaterialBalanceMode::Commodity,
            global_material_balance: false,
            dynamization: true,
            capped_prices: false,
            cleaned_quantities: false,
            verbose: true,
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iter: 500_000,
            tol_gap_abs: 0.00001,
            tol_gap_rel: 0.00025,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            solver: SolverConfig::default(),
            commodities: CommodityConventions::default(),
            io: IoConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("FTE__").split("__"));
        let config: Config = figment.extract()?;
        config.validate()?;
        config.check().map_err(anyhow::Error::msg)?;
        Ok(config)
    }

    /// Cross-field checks that the derive rules cannot express
    pub fn check(&self) -> Result<(), String> {
        if !self.solver.tol_gap_abs.is_finite() || self.solver.tol_gap_abs <= 0.0 {
            return Err(format!("tol_gap_abs must be positive: {}", self.solver.tol_gap_abs));
        }
        if !self.solver.tol_gap_rel.is_finite() || self.solver.tol_gap_rel <= 0.0 {
            return Err(format!("tol_gap_rel must be positive: {}", self.solver.tol_gap_rel));
        }
        if self.commodities.paper_supply_code > self.commodities.wastepaper_code {
            return Err("paper_supply_code must not exceed wastepaper_code".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok(), "Default config should pass derive rules");
        assert!(config.check().is_ok(), "Default config should pass cross-field checks");
        assert_eq!(config.model.material_balance, MaterialBalanceMode::Commodity);
        assert_eq!(config.solver.max_iter, 500_000);
    }

    #[test]
    fn test_mode_names_round_trip_through_strum() {
        assert_eq!(WorldPriceMode::from_str("exogen_WP").ok(), Some(WorldPriceMode::Exogenous));
        assert_eq!(ProductPriceMode::Calculated.to_string(), "calculated_PP");
        assert_eq!(MaterialBalanceMode::from_str("RCG_specific_MB").ok(), Some(MaterialBalanceMode::RegionGroup));
    }

    #[test]
    fn test_nonpositive_tolerance_rejected() {
        let mut config = Config::default();
        config.solver.tol_gap_rel = 0.0;
        assert!(config.check().is_err());
    }

    #[test]
    fn test_config_toml_deserializes() {
        let raw = r#"
            [model]
            base_year = 2020
            max_period = 3
            price_mode = "calculated_PP"
            world_price_mode = "constant_WP"
            material_balance = "RC_specific_MB"
            global_material_balance = false
            dynamization = true
            capped_prices = true
            cleaned_quantities = false
            verbose = false

            [solver]
            max_iter = 1000
            tol_gap_abs = 1e-6
            tol_gap_rel = 1e-6
        "#;
        let config: Config = Figment::new()
            .merge(Toml::string(raw))
            .extract()
            .expect("config should deserialize");
        assert_eq!(config.model.price_mode, ProductPriceMode::Calculated);
        assert_eq!(config.model.world_price_mode, WorldPriceMode::Constant);
        assert_eq!(config.commodities.wastepaper_code, 90);
    }
}
