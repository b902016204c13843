//! This module provides the Cell struct aggregating heat and usable energy across
//! all reactions
use crate::configuration::CONFIGURATION;
use crate::reaction_network::reaction::Reaction;
use std::fmt::{Display, Formatter};

/// Aggregate energy and thermal bookkeeping for the whole network
#[derive(Clone, Debug)]
pub struct Cell {
    /// Accumulated heat, dissipating proportionally each step
    pub heat: f64,
    /// Usable energy pool, never negative
    pub usable_energy: f64,
    /// Cumulative useful work generated by exergonic flux
    pub total_generated: f64,
    /// Cumulative energy consumed by endergonic flux
    pub total_consumed: f64,
    /// Cumulative heat produced
    pub total_heat: f64,
    /// Fraction of accumulated heat lost per unit time
    pub dissipation_rate: f64,
    /// Heat level below which the cell dies of insufficient metabolism
    pub min_heat: f64,
    /// Heat level above which the cell dies of thermal runaway
    pub max_heat: f64,
    /// Whether the cell is alive
    pub alive: bool,
    /// Why the cell died, if it has
    pub death_reason: Option<DeathReason>,
}

/// Cause of cell death reported by the survival check
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeathReason {
    /// Heat exceeded the maximum threshold
    ThermalRunaway,
    /// Heat fell below the minimum threshold
    InsufficientMetabolism,
}

impl Display for DeathReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DeathReason::ThermalRunaway => write!(f, "thermal runaway"),
            DeathReason::InsufficientMetabolism => write!(f, "insufficient metabolism"),
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        let configuration = CONFIGURATION.read().unwrap();
        Cell {
            heat: 0.0,
            usable_energy: 0.0,
            total_generated: 0.0,
            total_consumed: 0.0,
            total_heat: 0.0,
            dissipation_rate: configuration.heat_dissipation_rate,
            min_heat: configuration.min_heat,
            max_heat: configuration.max_heat,
            alive: true,
            death_reason: None,
        }
    }
}

impl Cell {
    /// Accumulate reaction heat over one timestep, then dissipate
    pub fn update_heat<'a>(&mut self, dt: f64, reactions: impl Iterator<Item = &'a Reaction>) {
        let generated: f64 = reactions.map(|reaction| reaction.heat_rate).sum::<f64>() * dt;
        self.heat += generated;
        self.total_heat += generated;
        self.heat -= self.heat * self.dissipation_rate * dt;
        if self.heat < 0.0 {
            self.heat = 0.0;
        }
    }

    /// Route reaction work into the energy pool and cumulative totals
    ///
    /// Only reactions carrying positive net flux contribute to the
    /// generated/consumed totals; the usable pool integrates the signed work of
    /// all reactions and is floored at zero.
    pub fn update_energy<'a>(&mut self, dt: f64, reactions: impl Iterator<Item = &'a Reaction>) {
        let mut net_work = 0.0;
        for reaction in reactions {
            net_work += reaction.useful_work_rate;
            if reaction.net_rate() > 0.0 {
                if reaction.useful_work_rate > 0.0 {
                    self.total_generated += reaction.useful_work_rate * dt;
                } else if reaction.useful_work_rate < 0.0 {
                    self.total_consumed -= reaction.useful_work_rate * dt;
                }
            }
        }
        self.usable_energy = (self.usable_energy + net_work * dt).max(0.0);
    }

    /// Mark the cell dead if heat has left the survivable band
    ///
    /// Only called by the engine when the survival check is enabled; the
    /// reference behavior leaves it off, reporting the cell as always alive.
    pub fn check_survival(&mut self) {
        if !self.alive {
            return;
        }
        if self.heat > self.max_heat {
            self.alive = false;
            self.death_reason = Some(DeathReason::ThermalRunaway);
        } else if self.heat < self.min_heat {
            self.alive = false;
            self.death_reason = Some(DeathReason::InsufficientMetabolism);
        }
    }

    /// Zero all accumulated state, keeping the configured rates and thresholds
    pub fn reset(&mut self) {
        self.heat = 0.0;
        self.usable_energy = 0.0;
        self.total_generated = 0.0;
        self.total_consumed = 0.0;
        self.total_heat = 0.0;
        self.alive = true;
        self.death_reason = None;
    }
}
