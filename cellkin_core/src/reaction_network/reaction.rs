//! This module provides a struct for representing reactions with their kinetic and
//! thermodynamic parameters, and the rate laws that govern them
use crate::configuration::CONFIGURATION;
use derive_builder::Builder;
use indexmap::IndexMap;

/// Gas constant in kJ/(mol*K)
pub const GAS_CONSTANT: f64 = 8.314e-3;
/// Floor applied to concentrations entering the reaction quotient
pub const CONCENTRATION_FLOOR: f64 = 1e-6;
/// Floor applied to the equilibrium constant in the Haldane relationship
pub const KEQ_FLOOR: f64 = 0.01;
/// The forward rate is zero above this free energy change (kJ/mol)
pub const FORWARD_DG_CUTOFF: f64 = 10.0;
/// Tighter forward cutoff used when the owning enzyme carries a regulation block
pub const EXTENDED_FORWARD_DG_CUTOFF: f64 = 5.0;
/// The reverse rate is zero below this free energy change (kJ/mol)
pub const REVERSE_DG_CUTOFF: f64 = -10.0;

/// Represents a stoichiometric transform catalyzed by an enzyme
///
/// A reaction with no substrates and at least one product is a "source", and a
/// reaction with substrates but no products is a "sink"; both are exempt from
/// thermodynamic gating. A reaction with neither substrates nor products carries
/// no flux.
#[derive(Builder, Debug, Clone)]
pub struct Reaction {
    /// Used to identify the reaction (must be unique)
    pub id: String,
    /// Human-readable reaction name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Substrate stoichiometry of the reaction, species id to coefficient
    #[builder(default = "IndexMap::new()")]
    pub substrates: IndexMap<String, f64>,
    /// Product stoichiometry of the reaction, species id to coefficient
    #[builder(default = "IndexMap::new()")]
    pub products: IndexMap<String, f64>,
    /// Maximal catalytic rate per unit of enzyme concentration
    #[builder(default = "1.0")]
    pub vmax: f64,
    /// Michaelis constant shared by all substrates unless overridden per species (mM)
    #[builder(default = "1.0")]
    pub km: f64,
    /// Fraction of released energy captured as useful work, in [0, 1]
    #[builder(default = "1.0")]
    pub efficiency: f64,
    /// Standard free energy change (kJ/mol)
    #[builder(default = "0.0")]
    pub delta_g_standard: f64,
    /// Temperature the reaction runs at (K)
    #[builder(default = "CONFIGURATION.read().unwrap().temperature")]
    pub temperature: f64,
    /// Whether the reverse direction is forbidden outright
    #[builder(default = "false")]
    pub irreversible: bool,
    /// Id of the owning enzyme, set when the reaction is added to one
    #[builder(setter(skip), default = "None")]
    pub(crate) enzyme_id: Option<String>,
    /// Forward rate computed at the last step (mM/s)
    #[builder(setter(skip), default = "0.0")]
    pub forward_rate: f64,
    /// Reverse rate computed at the last step (mM/s)
    #[builder(setter(skip), default = "0.0")]
    pub reverse_rate: f64,
    /// Instantaneous free energy change computed at the last step (kJ/mol)
    #[builder(setter(skip), default = "0.0")]
    pub delta_g_actual: f64,
    /// Useful work output rate at the last step, negative when energy is drawn in
    #[builder(setter(skip), default = "0.0")]
    pub useful_work_rate: f64,
    /// Heat output rate at the last step
    #[builder(setter(skip), default = "0.0")]
    pub heat_rate: f64,
    /// Energy credited by an energy coupling, consumed at the next free energy
    /// evaluation
    #[builder(setter(skip), default = "0.0")]
    pub(crate) coupled_energy: f64,
}

/// Kinetic modifiers applied to a reaction's rate laws
///
/// Computed from the owning enzyme's regulation block; the default applies no
/// modification and uses the plain forward cutoff.
#[derive(Debug, Clone)]
pub struct RateModifiers<'a> {
    /// Multiplier on the effective Vmax (non-competitive inhibition, allostery)
    pub vmax_scale: f64,
    /// Multiplier on the apparent Km (competitive inhibition)
    pub km_scale: f64,
    /// Per-species Km overrides replacing the reaction-level Km
    pub km_overrides: Option<&'a IndexMap<String, f64>>,
    /// Free energy change above which the forward rate is zero
    pub forward_cutoff: f64,
}

impl Default for RateModifiers<'_> {
    fn default() -> Self {
        RateModifiers {
            vmax_scale: 1.0,
            km_scale: 1.0,
            km_overrides: None,
            forward_cutoff: FORWARD_DG_CUTOFF,
        }
    }
}

impl Reaction {
    /// A source reaction produces without consuming
    pub fn is_source(&self) -> bool {
        self.substrates.is_empty() && !self.products.is_empty()
    }

    /// A sink reaction consumes without producing
    pub fn is_sink(&self) -> bool {
        !self.substrates.is_empty() && self.products.is_empty()
    }

    /// Id of the enzyme this reaction belongs to, if it has been added to one
    pub fn enzyme_id(&self) -> Option<&str> {
        self.enzyme_id.as_deref()
    }

    /// Equilibrium constant Keq = exp(-dG0/RT)
    pub fn equilibrium_constant(&self) -> f64 {
        (-self.delta_g_standard / (GAS_CONSTANT * self.temperature)).exp()
    }

    /// Instantaneous free energy change given a concentration snapshot
    ///
    /// Source and sink reactions bypass the reaction quotient and report the
    /// standard free energy change. Concentrations entering the quotient are
    /// floored at [`CONCENTRATION_FLOOR`] so the logarithm stays finite. Any
    /// pending coupled-energy credit is subtracted from the result.
    pub fn actual_free_energy(&self, concentrations: &IndexMap<String, f64>) -> f64 {
        if self.is_source() || self.is_sink() {
            return self.delta_g_standard - self.coupled_energy;
        }
        let mut ln_q = 0.0;
        for (species, coefficient) in &self.products {
            ln_q += coefficient * floored_concentration(concentrations, species).ln();
        }
        for (species, coefficient) in &self.substrates {
            ln_q -= coefficient * floored_concentration(concentrations, species).ln();
        }
        self.delta_g_standard + GAS_CONSTANT * self.temperature * ln_q - self.coupled_energy
    }

    /// Forward rate under Michaelis-Menten kinetics with thermodynamic gating
    ///
    /// Zero if the enzyme is absent. Source reactions run at
    /// vmax * enzyme concentration * efficiency with thermodynamics bypassed.
    /// Otherwise the rate is bounded by the slowest substrate saturation, gated
    /// to zero above the unfavorable cutoff, and exponentially damped on the
    /// unfavorable side below it. A missing or zero substrate yields zero.
    pub fn forward_rate(
        &self,
        concentrations: &IndexMap<String, f64>,
        enzyme_concentration: f64,
        modifiers: &RateModifiers,
    ) -> f64 {
        if enzyme_concentration <= 0.0 {
            return 0.0;
        }
        let vmax = self.vmax * modifiers.vmax_scale * enzyme_concentration * self.efficiency;
        if self.is_source() {
            return vmax;
        }
        if self.substrates.is_empty() {
            // Neither substrates nor products, carries no flux
            return 0.0;
        }
        let delta_g = self.actual_free_energy(concentrations);
        if delta_g > modifiers.forward_cutoff {
            return 0.0;
        }
        let saturation = self.limiting_saturation(&self.substrates, concentrations, modifiers);
        if saturation <= 0.0 {
            return 0.0;
        }
        let mut rate = vmax * saturation;
        if delta_g > 0.0 {
            rate *= (-delta_g / (GAS_CONSTANT * self.temperature)).exp();
        }
        rate
    }

    /// Reverse rate derived from the forward Vmax through the Haldane relationship
    ///
    /// Zero for irreversible, source, and sink reactions, when the enzyme is
    /// absent, and below the favorable cutoff. The reverse Vmax is
    /// vmax / max(Keq, [`KEQ_FLOOR`]) so that forward and reverse rates meet
    /// exactly at equilibrium.
    pub fn reverse_rate(
        &self,
        concentrations: &IndexMap<String, f64>,
        enzyme_concentration: f64,
        modifiers: &RateModifiers,
    ) -> f64 {
        if self.irreversible || self.is_source() || self.is_sink() || enzyme_concentration <= 0.0 {
            return 0.0;
        }
        if self.substrates.is_empty() || self.products.is_empty() {
            return 0.0;
        }
        let delta_g = self.actual_free_energy(concentrations);
        if delta_g < REVERSE_DG_CUTOFF {
            return 0.0;
        }
        let keq = self.equilibrium_constant().max(KEQ_FLOOR);
        let saturation = self.limiting_saturation(&self.products, concentrations, modifiers);
        if saturation <= 0.0 {
            return 0.0;
        }
        let mut rate = (self.vmax * modifiers.vmax_scale / keq)
            * enzyme_concentration
            * saturation
            * self.efficiency;
        if delta_g < 0.0 {
            rate *= (delta_g / (GAS_CONSTANT * self.temperature)).exp();
        }
        rate
    }

    /// Net rate at the last computed step
    pub fn net_rate(&self) -> f64 {
        self.forward_rate - self.reverse_rate
    }

    /// Partition the energy turned over at the given net rate into a useful work
    /// rate and a heat rate
    ///
    /// Exergonic: the released energy splits by efficiency. Endergonic: the work
    /// rate is negative (energy drawn in) and a waste-heat fraction remains.
    pub fn partition_energy(&self, net_rate: f64) -> (f64, f64) {
        if self.delta_g_actual < 0.0 {
            let released = -self.delta_g_actual * net_rate;
            (
                released * self.efficiency,
                released * (1.0 - self.efficiency),
            )
        } else {
            let work = -self.delta_g_actual * net_rate;
            (work, work.abs() * (1.0 - self.efficiency))
        }
    }

    /// Compute and store all runtime rate quantities from a concentration snapshot
    ///
    /// Consumes any pending coupled-energy credit: the credit lowers this
    /// evaluation's free energy change and is then cleared.
    pub fn compute_rates(
        &mut self,
        concentrations: &IndexMap<String, f64>,
        enzyme_concentration: f64,
        modifiers: &RateModifiers,
    ) {
        self.delta_g_actual = self.actual_free_energy(concentrations);
        self.forward_rate = self.forward_rate(concentrations, enzyme_concentration, modifiers);
        self.reverse_rate = self.reverse_rate(concentrations, enzyme_concentration, modifiers);
        let (work, heat) = self.partition_energy(self.net_rate());
        self.useful_work_rate = work;
        self.heat_rate = heat;
        self.coupled_energy = 0.0;
    }

    /// Saturation of the slowest species in the given stoichiometry map
    fn limiting_saturation(
        &self,
        stoichiometry: &IndexMap<String, f64>,
        concentrations: &IndexMap<String, f64>,
        modifiers: &RateModifiers,
    ) -> f64 {
        let mut limiting = 1.0f64;
        for species in stoichiometry.keys() {
            let concentration = concentrations.get(species).copied().unwrap_or(0.0);
            if concentration <= 0.0 {
                return 0.0;
            }
            let km = modifiers
                .km_overrides
                .and_then(|overrides| overrides.get(species))
                .copied()
                .unwrap_or(self.km)
                .max(0.0)
                * modifiers.km_scale;
            limiting = limiting.min(concentration / (km + concentration));
        }
        limiting
    }

    /// Clear all runtime rate state
    pub(crate) fn reset_runtime(&mut self) {
        self.forward_rate = 0.0;
        self.reverse_rate = 0.0;
        self.delta_g_actual = 0.0;
        self.useful_work_rate = 0.0;
        self.heat_rate = 0.0;
        self.coupled_energy = 0.0;
    }
}

fn floored_concentration(concentrations: &IndexMap<String, f64>, species: &str) -> f64 {
    concentrations
        .get(species)
        .copied()
        .unwrap_or(0.0)
        .max(CONCENTRATION_FLOOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_conversion(delta_g_standard: f64, irreversible: bool) -> Reaction {
        ReactionBuilder::default()
            .id("a_to_b".to_string())
            .substrates(IndexMap::from([("a".to_string(), 1.0)]))
            .products(IndexMap::from([("b".to_string(), 1.0)]))
            .delta_g_standard(delta_g_standard)
            .temperature(310.0)
            .irreversible(irreversible)
            .build()
            .unwrap()
    }

    fn concentrations(pairs: &[(&str, f64)]) -> IndexMap<String, f64> {
        pairs
            .iter()
            .map(|(id, value)| (id.to_string(), *value))
            .collect()
    }

    #[test]
    fn equilibrium_constant_matches_standard_free_energy() {
        let reaction = simple_conversion(-5.0, false);
        let expected = (5.0 / (GAS_CONSTANT * 310.0)).exp();
        assert!((reaction.equilibrium_constant() - expected).abs() < 1e-12);
        // dG0 = -5 kJ/mol at 310 K sits just under 7
        assert!((reaction.equilibrium_constant() - 6.96).abs() < 0.01);
    }

    #[test]
    fn forward_exceeds_reverse_away_from_equilibrium() {
        let reaction = simple_conversion(-5.0, false);
        let conc = concentrations(&[("a", 1.0), ("b", 1.0)]);
        let modifiers = RateModifiers::default();
        let forward = reaction.forward_rate(&conc, 1.0, &modifiers);
        let reverse = reaction.reverse_rate(&conc, 1.0, &modifiers);
        assert!(forward > 0.0);
        assert!(reverse > 0.0);
        // [a] > [b]/Keq, so the net should run forward
        assert!(forward > reverse);
    }

    #[test]
    fn irreversible_reverse_rate_is_exactly_zero() {
        let reaction = simple_conversion(-5.0, true);
        // Strongly product-favoring conditions still yield no reverse flux
        let conc = concentrations(&[("a", 0.001), ("b", 1000.0)]);
        assert_eq!(
            reaction.reverse_rate(&conc, 1.0, &RateModifiers::default()),
            0.0
        );
    }

    #[test]
    fn zero_enzyme_concentration_stops_both_directions() {
        let reaction = simple_conversion(-5.0, false);
        let conc = concentrations(&[("a", 1.0), ("b", 1.0)]);
        let modifiers = RateModifiers::default();
        assert_eq!(reaction.forward_rate(&conc, 0.0, &modifiers), 0.0);
        assert_eq!(reaction.reverse_rate(&conc, 0.0, &modifiers), 0.0);
    }

    #[test]
    fn missing_substrate_yields_zero_forward_rate() {
        let reaction = simple_conversion(-5.0, false);
        let conc = concentrations(&[("b", 1.0)]);
        assert_eq!(
            reaction.forward_rate(&conc, 1.0, &RateModifiers::default()),
            0.0
        );
    }

    #[test]
    fn source_rate_bypasses_thermodynamics() {
        let source = ReactionBuilder::default()
            .id("influx".to_string())
            .products(IndexMap::from([("a".to_string(), 1.0)]))
            .vmax(2.0)
            .efficiency(0.5)
            // A wildly unfavorable dG0 must not matter for a source
            .delta_g_standard(500.0)
            .build()
            .unwrap();
        let conc = concentrations(&[("a", 1.0)]);
        let rate = source.forward_rate(&conc, 3.0, &RateModifiers::default());
        assert_eq!(rate, 2.0 * 3.0 * 0.5);
        assert_eq!(source.reverse_rate(&conc, 3.0, &RateModifiers::default()), 0.0);
    }

    #[test]
    fn sink_has_no_reverse_rate() {
        let sink = ReactionBuilder::default()
            .id("efflux".to_string())
            .substrates(IndexMap::from([("a".to_string(), 1.0)]))
            .delta_g_standard(-5.0)
            .build()
            .unwrap();
        let conc = concentrations(&[("a", 10.0)]);
        assert!(sink.forward_rate(&conc, 1.0, &RateModifiers::default()) > 0.0);
        assert_eq!(sink.reverse_rate(&conc, 1.0, &RateModifiers::default()), 0.0);
    }

    #[test]
    fn forward_gated_above_cutoff() {
        let reaction = simple_conversion(0.0, false);
        // Massive product excess drives dG far above +10 kJ/mol
        let conc = concentrations(&[("a", 1e-6), ("b", 1000.0)]);
        let modifiers = RateModifiers::default();
        assert!(reaction.actual_free_energy(&conc) > FORWARD_DG_CUTOFF);
        assert_eq!(reaction.forward_rate(&conc, 1.0, &modifiers), 0.0);
        assert!(reaction.reverse_rate(&conc, 1.0, &modifiers) > 0.0);
    }

    #[test]
    fn extended_cutoff_gates_earlier_than_plain() {
        let reaction = simple_conversion(0.0, false);
        // dG about +7 kJ/mol: damped but nonzero under the plain cutoff,
        // zero under the extended one
        let conc = concentrations(&[("a", 1.0), ("b", 15.1)]);
        let delta_g = reaction.actual_free_energy(&conc);
        assert!(delta_g > EXTENDED_FORWARD_DG_CUTOFF && delta_g < FORWARD_DG_CUTOFF);
        let plain = RateModifiers::default();
        let extended = RateModifiers {
            forward_cutoff: EXTENDED_FORWARD_DG_CUTOFF,
            ..RateModifiers::default()
        };
        assert!(reaction.forward_rate(&conc, 1.0, &plain) > 0.0);
        assert_eq!(reaction.forward_rate(&conc, 1.0, &extended), 0.0);
    }

    #[test]
    fn unfavorable_forward_rate_is_damped() {
        let reaction = simple_conversion(0.0, false);
        let favorable = concentrations(&[("a", 1.0), ("b", 1.0)]);
        // dG about +2.6 kJ/mol
        let unfavorable = concentrations(&[("a", 1.0), ("b", (1.0f64).exp())]);
        let modifiers = RateModifiers::default();
        let at_equilibrium = reaction.forward_rate(&favorable, 1.0, &modifiers);
        let uphill = reaction.forward_rate(&unfavorable, 1.0, &modifiers);
        assert!(uphill > 0.0);
        assert!(uphill < at_equilibrium);
    }

    #[test]
    fn partition_splits_released_energy_by_efficiency() {
        let mut reaction = simple_conversion(-5.0, false);
        reaction.efficiency = 0.6;
        reaction.delta_g_actual = -10.0;
        let (work, heat) = reaction.partition_energy(2.0);
        assert!((work - 20.0 * 0.6).abs() < 1e-12);
        assert!((heat - 20.0 * 0.4).abs() < 1e-12);
    }

    #[test]
    fn partition_draws_energy_for_endergonic_flux() {
        let mut reaction = simple_conversion(5.0, false);
        reaction.efficiency = 0.5;
        reaction.delta_g_actual = 4.0;
        let (work, heat) = reaction.partition_energy(1.0);
        assert!((work - (-4.0)).abs() < 1e-12);
        assert!((heat - 2.0).abs() < 1e-12);
    }

    #[test]
    fn compute_rates_consumes_coupled_energy() {
        let mut reaction = simple_conversion(0.0, false);
        // dG about +7 kJ/mol without help
        let conc = concentrations(&[("a", 1.0), ("b", 15.1)]);
        reaction.coupled_energy = 7.0;
        reaction.compute_rates(&conc, 1.0, &RateModifiers::default());
        let helped_delta_g = reaction.delta_g_actual;
        assert!(helped_delta_g < 1.0);
        assert_eq!(reaction.coupled_energy, 0.0);
        // The credit is gone on the next evaluation
        reaction.compute_rates(&conc, 1.0, &RateModifiers::default());
        assert!(reaction.delta_g_actual > helped_delta_g);
    }
}
