//! This module provides the Enzyme struct, which owns reactions and is subject to
//! synthesis, degradation, and optional extended regulation
use crate::reaction_network::reaction::{
    RateModifiers, Reaction, EXTENDED_FORWARD_DG_CUTOFF,
};
use derive_builder::Builder;
use indexmap::IndexMap;

/// Represents an enzyme catalyzing one or more reactions
#[derive(Builder, Debug, Clone)]
pub struct Enzyme {
    /// Used to identify the enzyme (must be unique)
    pub id: String,
    /// Human readable enzyme name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Current concentration, never negative
    #[builder(default = "0.0")]
    pub concentration: f64,
    /// Concentration recorded at load time, restored by a reset
    #[builder(setter(skip), default = "0.0")]
    pub initial_concentration: f64,
    /// Reactions owned by this enzyme
    #[builder(default = "Vec::new()")]
    pub reactions: Vec<Reaction>,
    /// Half-life driving first-order degradation; non-positive disables decay
    #[builder(default = "0.0")]
    pub half_life: f64,
    /// Whether the enzyme is subject to degradation at all
    #[builder(default = "true")]
    pub degradable: bool,
    /// Locked enzymes are exempt from synthesis and degradation
    #[builder(default = "false")]
    pub locked: bool,
    /// Whether this enzyme is currently active (see [`EnzymeActivity`])
    #[builder(default = "EnzymeActivity::Active")]
    pub activity: EnzymeActivity,
    /// Optional extended regulation block (inhibition, allostery, turnover control)
    #[builder(default = "None")]
    pub regulation: Option<Regulation>,
}

/// Whether an enzyme is active or inactive
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EnzymeActivity {
    /// The enzyme is active and its reactions can carry flux
    Active,
    /// The enzyme is inactive and its reactions carry no flux
    Inactive,
}

/// An allosteric binding site: dissociation constant and fold-change at saturation
///
/// For activating effects `fold` is the multiplier approached at full occupancy;
/// for inhibiting effects it is the floor multiplier approached at full occupancy.
#[derive(Clone, Copy, Debug)]
pub struct AllostericSite {
    /// Dissociation constant of the regulator (mM)
    pub kd: f64,
    /// Fold-change at full occupancy
    pub fold: f64,
}

impl AllostericSite {
    /// Fractional occupancy [R]/(Kd + [R]) at the given regulator concentration
    pub fn occupancy(&self, concentration: f64) -> f64 {
        if concentration <= 0.0 {
            return 0.0;
        }
        let kd = self.kd.max(f64::EPSILON);
        concentration / (kd + concentration)
    }
}

/// Extended regulation of an enzyme's kinetics and turnover
#[derive(Clone, Debug, Default)]
pub struct Regulation {
    /// Per-species Km overrides replacing the reaction-level Km
    pub km_overrides: IndexMap<String, f64>,
    /// Competitive inhibitors, species id to Ki; scale the apparent Km
    pub competitive_inhibitors: IndexMap<String, f64>,
    /// Non-competitive inhibitors, species id to Ki; scale down the effective Vmax
    pub noncompetitive_inhibitors: IndexMap<String, f64>,
    /// Allosteric activators of catalysis
    pub allosteric_activators: IndexMap<String, AllostericSite>,
    /// Allosteric inhibitors of catalysis
    pub allosteric_inhibitors: IndexMap<String, AllostericSite>,
    /// Regulators adjusting the enzyme's synthesis rate
    pub synthesis_regulators: IndexMap<String, AllostericSite>,
    /// Regulators adjusting the enzyme's degradation rate
    pub degradation_regulators: IndexMap<String, AllostericSite>,
    /// Gene-independent basal synthesis rate
    pub basal_synthesis: f64,
}

impl Regulation {
    /// Collapse the regulation block into rate modifiers for one snapshot
    ///
    /// Competitive inhibition multiplies the apparent Km by prod(1 + [I]/Ki);
    /// non-competitive inhibition divides Vmax by the same form; allosteric
    /// activation and inhibition scale Vmax by occupancy-weighted fold-changes.
    pub fn rate_modifiers(&self, concentrations: &IndexMap<String, f64>) -> RateModifiers<'_> {
        let mut km_scale = 1.0;
        for (species, ki) in &self.competitive_inhibitors {
            let inhibitor = concentration_of(concentrations, species);
            if inhibitor > 0.0 {
                km_scale *= 1.0 + inhibitor / ki.max(f64::EPSILON);
            }
        }
        let mut vmax_scale = 1.0;
        for (species, ki) in &self.noncompetitive_inhibitors {
            let inhibitor = concentration_of(concentrations, species);
            if inhibitor > 0.0 {
                vmax_scale /= 1.0 + inhibitor / ki.max(f64::EPSILON);
            }
        }
        for (species, site) in &self.allosteric_activators {
            let occupancy = site.occupancy(concentration_of(concentrations, species));
            vmax_scale *= 1.0 + (site.fold - 1.0) * occupancy;
        }
        for (species, site) in &self.allosteric_inhibitors {
            let occupancy = site.occupancy(concentration_of(concentrations, species));
            vmax_scale *= 1.0 - (1.0 - site.fold) * occupancy;
        }
        RateModifiers {
            vmax_scale: vmax_scale.max(0.0),
            km_scale,
            km_overrides: Some(&self.km_overrides),
            forward_cutoff: EXTENDED_FORWARD_DG_CUTOFF,
        }
    }

    /// Synthesis rate adjusted additively by occupancy-scaled fold effects
    pub fn adjusted_synthesis(&self, rate: f64, concentrations: &IndexMap<String, f64>) -> f64 {
        adjusted_rate(rate, &self.synthesis_regulators, concentrations)
    }

    /// Degradation rate adjusted additively by occupancy-scaled fold effects
    pub fn adjusted_degradation(&self, rate: f64, concentrations: &IndexMap<String, f64>) -> f64 {
        adjusted_rate(rate, &self.degradation_regulators, concentrations)
    }
}

fn adjusted_rate(
    rate: f64,
    regulators: &IndexMap<String, AllostericSite>,
    concentrations: &IndexMap<String, f64>,
) -> f64 {
    let mut adjusted = rate;
    for (species, site) in regulators {
        let occupancy = site.occupancy(concentration_of(concentrations, species));
        adjusted += rate * (site.fold - 1.0) * occupancy;
    }
    adjusted.max(0.0)
}

fn concentration_of(concentrations: &IndexMap<String, f64>, species: &str) -> f64 {
    concentrations.get(species).copied().unwrap_or(0.0)
}

impl Enzyme {
    /// First-order degradation rate k = ln(2) / half-life
    pub fn degradation_rate(&self) -> f64 {
        if self.half_life <= 0.0 {
            0.0
        } else {
            std::f64::consts::LN_2 / self.half_life
        }
    }

    /// Add a reaction to this enzyme, recording the back-reference
    pub fn add_reaction(&mut self, mut reaction: Reaction) {
        reaction.enzyme_id = Some(self.id.clone());
        self.reactions.push(reaction);
    }

    /// Recompute every owned reaction's rates from a concentration snapshot
    ///
    /// Reactions are independent of one another within one enzyme, so the order
    /// of computation does not matter. An inactive enzyme contributes zero
    /// effective concentration.
    pub fn update_reaction_rates(&mut self, concentrations: &IndexMap<String, f64>) {
        let effective_concentration = match self.activity {
            EnzymeActivity::Active => self.concentration,
            EnzymeActivity::Inactive => 0.0,
        };
        let modifiers = match &self.regulation {
            Some(regulation) => regulation.rate_modifiers(concentrations),
            None => RateModifiers::default(),
        };
        for reaction in &mut self.reactions {
            reaction.compute_rates(concentrations, effective_concentration, &modifiers);
        }
    }

    /// Apply first-order degradation over one timestep
    ///
    /// No-op if the enzyme is locked, non-degradable, or already depleted.
    pub fn apply_degradation(&mut self, dt: f64) {
        if self.locked || !self.degradable || self.concentration <= 0.0 {
            return;
        }
        let amount = self.degradation_rate() * self.concentration * dt;
        self.concentration = (self.concentration - amount).max(0.0);
    }

    /// Integrate synthesis and degradation over one timestep
    ///
    /// `synthesis_rate` is the expression rate credited by this enzyme's gene.
    /// With a regulation block, both rates are first adjusted by the turnover
    /// regulators and then integrated together; without one, synthesis is added
    /// and plain degradation applied.
    pub fn apply_turnover(
        &mut self,
        dt: f64,
        concentrations: &IndexMap<String, f64>,
        synthesis_rate: f64,
    ) {
        if self.locked {
            return;
        }
        match &self.regulation {
            Some(regulation) => {
                let base_degradation = if self.degradable && self.concentration > 0.0 {
                    self.degradation_rate() * self.concentration
                } else {
                    0.0
                };
                let creation = regulation
                    .adjusted_synthesis(synthesis_rate + regulation.basal_synthesis, concentrations);
                let degradation = regulation.adjusted_degradation(base_degradation, concentrations);
                self.concentration =
                    (self.concentration + (creation - degradation) * dt).max(0.0);
            }
            None => {
                self.concentration += synthesis_rate * dt;
                self.apply_degradation(dt);
            }
        }
    }
}
