//! Global configuration defaults used when constructing simulation components
use std::sync::{LazyLock, RwLock};

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

/// Default parameter values shared across the simulation
pub struct Configuration {
    /// Default reaction temperature in Kelvin
    pub temperature: f64,
    /// Fraction of accumulated heat lost per unit time
    pub heat_dissipation_rate: f64,
    /// Heat level above which the cell dies of thermal runaway
    pub max_heat: f64,
    /// Heat level below which the cell dies of insufficient metabolism
    pub min_heat: f64,
    /// Numerical tolerance for comparisons
    pub tolerance: f64,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            temperature: 310.,
            heat_dissipation_rate: 0.1,
            max_heat: 100.,
            min_heat: 0.,
            tolerance: 1e-07,
        }
    }
}
