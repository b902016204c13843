//! Core rust implementation of cellkin, a crate for dynamic simulation of regulated
//! biochemical reaction networks.
//!
//! The simulation advances a pool of molecules under coupled enzyme kinetics with a
//! fixed explicit-Euler timestep: each step computes every reaction's forward and
//! reverse rate from a concentration snapshot, applies the stoichiometric deltas,
//! applies gene expression and enzyme turnover, aggregates the cell-level heat and
//! energy balance, and finally clamps all concentrations to be non-negative.

pub mod configuration;
pub mod io;
pub mod reaction_network;
