//! This module provides the Gene struct, which controls enzyme synthesis, and the
//! RegulatoryElement struct implementing Hill-kinetics activation and repression
use derive_builder::Builder;
use indexmap::IndexMap;

/// Whether a regulatory element activates or represses its gene
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RegulatorKind {
    /// Raises expression toward basal rate times the fold-change
    Activator,
    /// Lowers expression toward basal rate divided by the fold-change
    Repressor,
}

/// A Hill-kinetics activator or repressor bound to a gene
///
/// A pure function of a concentration snapshot; a missing target species yields
/// no effect (multiplier of exactly 1).
#[derive(Builder, Clone, Debug)]
pub struct RegulatoryElement {
    /// Whether this element activates or represses
    pub kind: RegulatorKind,
    /// Id of the species whose concentration is sensed
    pub target: String,
    /// Dissociation constant of the regulator (mM)
    #[builder(default = "1.0")]
    pub kd: f64,
    /// Maximum fold-change at full occupancy
    #[builder(default = "2.0")]
    pub fold: f64,
    /// Hill coefficient, clamped to [0.1, 4] when evaluated
    #[builder(default = "1.0")]
    pub hill: f64,
}

impl RegulatoryElement {
    /// Multiplicative effect on expression given a concentration snapshot
    pub fn effect(&self, concentrations: &IndexMap<String, f64>) -> f64 {
        let Some(&target) = concentrations.get(&self.target) else {
            return 1.0;
        };
        if target <= 0.0 {
            return 1.0;
        }
        let n = self.hill.clamp(0.1, 4.0);
        let kd = self.kd.max(f64::EPSILON);
        let bound = target.powf(n);
        let occupancy = bound / (kd.powf(n) + bound);
        match self.kind {
            RegulatorKind::Activator => 1.0 + (self.fold - 1.0) * occupancy,
            RegulatorKind::Repressor => 1.0 / (1.0 + (self.fold - 1.0) * occupancy),
        }
    }
}

/// Structure representing a gene driving the synthesis of one enzyme
#[derive(Builder, Clone, Debug)]
pub struct Gene {
    /// Used to identify the gene (must be unique)
    pub id: String,
    /// Id of the enzyme this gene produces
    pub enzyme_id: String,
    /// Unregulated expression rate
    #[builder(default = "0.0")]
    pub basal_rate: f64,
    /// Cap on the regulated expression rate
    #[builder(default = "f64::INFINITY")]
    pub max_rate: f64,
    /// Whether this gene is currently expressed (see [`GeneActivity`])
    #[builder(default = "GeneActivity::Active")]
    pub activity: GeneActivity,
    /// Activating regulatory elements, evaluated in order
    #[builder(default = "Vec::new()")]
    pub activators: Vec<RegulatoryElement>,
    /// Repressing regulatory elements, evaluated in order
    #[builder(default = "Vec::new()")]
    pub repressors: Vec<RegulatoryElement>,
    /// Expression rate computed at the last step
    #[builder(setter(skip), default = "0.0")]
    pub last_expression_rate: f64,
    /// Combined activator factor at the last step
    #[builder(setter(skip), default = "1.0")]
    pub last_activation_factor: f64,
    /// Combined repressor factor at the last step
    #[builder(setter(skip), default = "1.0")]
    pub last_repression_factor: f64,
}

/// Whether a gene is active or not
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GeneActivity {
    /// Gene is considered active
    Active,
    /// Gene is considered inactive
    Inactive,
}

impl Gene {
    /// Expression rate under the current concentration snapshot
    ///
    /// Inactive genes express at zero. Regulator effects compose
    /// multiplicatively, which gives the correct saturation behavior for
    /// independent binding sites; the result is clamped to [0, max_rate].
    pub fn expression_rate(&mut self, concentrations: &IndexMap<String, f64>) -> f64 {
        if self.activity == GeneActivity::Inactive {
            self.last_expression_rate = 0.0;
            self.last_activation_factor = 1.0;
            self.last_repression_factor = 1.0;
            return 0.0;
        }
        let activation: f64 = self
            .activators
            .iter()
            .map(|element| element.effect(concentrations))
            .product();
        let repression: f64 = self
            .repressors
            .iter()
            .map(|element| element.effect(concentrations))
            .product();
        let rate = (self.basal_rate * activation * repression)
            .min(self.max_rate)
            .max(0.0);
        self.last_activation_factor = activation;
        self.last_repression_factor = repression;
        self.last_expression_rate = rate;
        rate
    }

    /// Amount of enzyme synthesized over one timestep
    pub fn synthesis_amount(&mut self, dt: f64, concentrations: &IndexMap<String, f64>) -> f64 {
        self.expression_rate(concentrations) * dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conc(pairs: &[(&str, f64)]) -> IndexMap<String, f64> {
        pairs
            .iter()
            .map(|(id, value)| (id.to_string(), *value))
            .collect()
    }

    fn activator(target: &str, kd: f64, fold: f64) -> RegulatoryElement {
        RegulatoryElementBuilder::default()
            .kind(RegulatorKind::Activator)
            .target(target.to_string())
            .kd(kd)
            .fold(fold)
            .build()
            .unwrap()
    }

    fn repressor(target: &str, kd: f64, fold: f64) -> RegulatoryElement {
        RegulatoryElementBuilder::default()
            .kind(RegulatorKind::Repressor)
            .target(target.to_string())
            .kd(kd)
            .fold(fold)
            .build()
            .unwrap()
    }

    #[test]
    fn unregulated_expression_equals_basal_rate() {
        let mut gene = GeneBuilder::default()
            .id("g1".to_string())
            .enzyme_id("e1".to_string())
            .basal_rate(0.25)
            .build()
            .unwrap();
        assert_eq!(gene.expression_rate(&conc(&[])), 0.25);
        assert_eq!(gene.last_expression_rate, 0.25);
    }

    #[test]
    fn inactive_gene_expresses_nothing() {
        let mut gene = GeneBuilder::default()
            .id("g1".to_string())
            .enzyme_id("e1".to_string())
            .basal_rate(0.25)
            .activity(GeneActivity::Inactive)
            .build()
            .unwrap();
        assert_eq!(gene.expression_rate(&conc(&[])), 0.0);
    }

    #[test]
    fn saturated_activator_approaches_but_never_exceeds_max_fold() {
        let mut gene = GeneBuilder::default()
            .id("g1".to_string())
            .enzyme_id("e1".to_string())
            .basal_rate(1.0)
            .activators(vec![activator("signal", 0.1, 5.0)])
            .build()
            .unwrap();
        let saturated = gene.expression_rate(&conc(&[("signal", 1e6)]));
        assert!(saturated > 4.99);
        assert!(saturated < 5.0);
    }

    #[test]
    fn repressor_at_zero_concentration_has_no_effect() {
        let element = repressor("product", 0.5, 10.0);
        assert_eq!(element.effect(&conc(&[("product", 0.0)])), 1.0);
        // A missing target behaves the same way
        assert_eq!(element.effect(&conc(&[])), 1.0);
    }

    #[test]
    fn repressor_halves_expression_at_kd_with_unit_hill() {
        let element = repressor("product", 1.0, 3.0);
        // Occupancy 1/2 at [M] = Kd: 1 / (1 + (3-1)*0.5) = 0.5
        let effect = element.effect(&conc(&[("product", 1.0)]));
        assert!((effect - 0.5).abs() < 1e-12);
    }

    #[test]
    fn hill_coefficient_is_clamped() {
        let mut element = activator("signal", 1.0, 2.0);
        element.hill = 100.0;
        // Clamped to n = 4, so an order of magnitude above Kd nearly saturates
        let effect = element.effect(&conc(&[("signal", 10.0)]));
        assert!(effect > 1.99 && effect < 2.0);
        element.hill = -3.0;
        // Clamped to n = 0.1
        let shallow = element.effect(&conc(&[("signal", 10.0)]));
        assert!(shallow > 1.0 && shallow < 1.6);
    }

    #[test]
    fn expression_is_clamped_to_max_rate() {
        let mut gene = GeneBuilder::default()
            .id("g1".to_string())
            .enzyme_id("e1".to_string())
            .basal_rate(1.0)
            .max_rate(2.0)
            .activators(vec![activator("signal", 0.1, 50.0)])
            .build()
            .unwrap();
        assert_eq!(gene.expression_rate(&conc(&[("signal", 100.0)])), 2.0);
    }

    #[test]
    fn regulators_compose_multiplicatively() {
        let mut gene = GeneBuilder::default()
            .id("g1".to_string())
            .enzyme_id("e1".to_string())
            .basal_rate(1.0)
            .activators(vec![activator("up", 1.0, 3.0)])
            .repressors(vec![repressor("down", 1.0, 3.0)])
            .build()
            .unwrap();
        // Both at half occupancy: 1.0 * 2.0 * 0.5 = 1.0
        let rate = gene.expression_rate(&conc(&[("up", 1.0), ("down", 1.0)]));
        assert!((rate - 1.0).abs() < 1e-12);
        assert!((gene.last_activation_factor - 2.0).abs() < 1e-12);
        assert!((gene.last_repression_factor - 0.5).abs() < 1e-12);
    }

    #[test]
    fn synthesis_amount_scales_with_dt() {
        let mut gene = GeneBuilder::default()
            .id("g1".to_string())
            .enzyme_id("e1".to_string())
            .basal_rate(0.5)
            .build()
            .unwrap();
        assert_eq!(gene.synthesis_amount(0.25, &conc(&[])), 0.125);
    }
}
