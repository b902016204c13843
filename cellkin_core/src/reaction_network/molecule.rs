//! This module provides the molecule struct representing a concentration-bearing species

use derive_builder::Builder;

/// Represents a molecular species in the shared pool
#[derive(Builder, Debug, Clone)]
pub struct Molecule {
    /// Used to identify the molecule (must be unique)
    pub id: String,
    /// Human readable name of the molecule
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Concentration in mM, clamped to be non-negative after every step
    #[builder(default = "0.0")]
    pub concentration: f64,
    /// Locked molecules are held constant by the step loop
    #[builder(default = "false")]
    pub locked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let molecule = MoleculeBuilder::default()
            .id("atp".to_string())
            .build()
            .unwrap();
        assert_eq!(molecule.id, "atp");
        assert_eq!(molecule.concentration, 0.0);
        assert!(!molecule.locked);
        assert!(molecule.name.is_none());
    }
}
