//! This module provides the EnergyCoupling struct linking an exergonic reaction to
//! an endergonic one
use crate::reaction_network::reaction::Reaction;
use derive_builder::Builder;

/// Couples the free energy released by a source reaction into a sink reaction
///
/// The transferred energy lowers the sink's effective free energy change at its
/// next rate evaluation. The fraction lost to the coupling's inefficiency is
/// implicit waste heat, folded into the sink reaction's own heat term.
#[derive(Builder, Clone, Debug)]
pub struct EnergyCoupling {
    /// Id of the net-exergonic source reaction
    pub source: String,
    /// Id of the net-endergonic sink reaction
    pub sink: String,
    /// Fraction of the released energy that reaches the sink, in (0, 1]
    #[builder(default = "1.0")]
    pub efficiency: f64,
    /// Whether this coupling currently transfers energy
    #[builder(default = "true")]
    pub active: bool,
    /// Cumulative energy transferred over the run
    #[builder(setter(skip), default = "0.0")]
    pub total_transferred: f64,
}

impl EnergyCoupling {
    /// Whether a transfer can occur at the given free energy changes
    ///
    /// Requires an active coupling, an exergonic source, an endergonic sink, and
    /// enough transferable energy to cover the sink's requirement.
    pub fn can_couple(&self, source_delta_g: f64, sink_delta_g: f64) -> bool {
        self.active
            && source_delta_g < 0.0
            && sink_delta_g > 0.0
            && -source_delta_g * self.efficiency >= sink_delta_g
    }

    /// Transfer energy from the source into the sink over one timestep
    ///
    /// Credits the sink's next free energy evaluation and accumulates the
    /// transferred total. Returns the energy moved, zero when the coupling
    /// cannot fire.
    pub fn apply(&mut self, dt: f64, source_delta_g: f64, sink: &mut Reaction) -> f64 {
        if !self.can_couple(source_delta_g, sink.delta_g_actual) {
            return 0.0;
        }
        let available = -source_delta_g * self.efficiency;
        let transferred = available.min(sink.delta_g_actual);
        sink.coupled_energy += transferred;
        self.total_transferred += transferred * dt;
        transferred
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reaction_network::reaction::ReactionBuilder;
    use indexmap::IndexMap;

    fn endergonic_sink(delta_g_actual: f64) -> Reaction {
        let mut reaction = ReactionBuilder::default()
            .id("sink".to_string())
            .substrates(IndexMap::from([("a".to_string(), 1.0)]))
            .products(IndexMap::from([("b".to_string(), 1.0)]))
            .build()
            .unwrap();
        reaction.delta_g_actual = delta_g_actual;
        reaction
    }

    fn coupling(efficiency: f64) -> EnergyCoupling {
        EnergyCouplingBuilder::default()
            .source("source".to_string())
            .sink("sink".to_string())
            .efficiency(efficiency)
            .build()
            .unwrap()
    }

    #[test]
    fn requires_exergonic_source_and_endergonic_sink() {
        let coupling = coupling(1.0);
        assert!(coupling.can_couple(-30.0, 20.0));
        assert!(!coupling.can_couple(30.0, 20.0));
        assert!(!coupling.can_couple(-30.0, -20.0));
    }

    #[test]
    fn requires_enough_transferable_energy() {
        let coupling = coupling(0.5);
        // 30 * 0.5 = 15 < 20 required
        assert!(!coupling.can_couple(-30.0, 20.0));
        assert!(coupling.can_couple(-50.0, 20.0));
    }

    #[test]
    fn inactive_coupling_never_fires() {
        let mut coupling = coupling(1.0);
        coupling.active = false;
        assert!(!coupling.can_couple(-30.0, 20.0));
    }

    #[test]
    fn transfer_is_capped_at_the_sink_requirement() {
        let mut coupling = coupling(1.0);
        let mut sink = endergonic_sink(20.0);
        let transferred = coupling.apply(0.5, -30.0, &mut sink);
        assert_eq!(transferred, 20.0);
        assert_eq!(sink.coupled_energy, 20.0);
        assert!((coupling.total_transferred - 10.0).abs() < 1e-12);
    }

    #[test]
    fn failed_transfer_moves_nothing() {
        let mut coupling = coupling(0.1);
        let mut sink = endergonic_sink(20.0);
        assert_eq!(coupling.apply(1.0, -30.0, &mut sink), 0.0);
        assert_eq!(sink.coupled_energy, 0.0);
        assert_eq!(coupling.total_transferred, 0.0);
    }

    #[test]
    fn credit_lowers_the_next_free_energy_evaluation() {
        let mut coupling = coupling(1.0);
        let mut sink = endergonic_sink(0.0);
        // Make the sink genuinely endergonic under its own quotient
        sink.delta_g_standard = 20.0;
        let snapshot = IndexMap::from([("a".to_string(), 1.0), ("b".to_string(), 1.0)]);
        sink.delta_g_actual = sink.actual_free_energy(&snapshot);
        assert!((sink.delta_g_actual - 20.0).abs() < 1e-9);
        coupling.apply(1.0, -40.0, &mut sink);
        assert!(sink.actual_free_energy(&snapshot).abs() < 1e-9);
    }
}
