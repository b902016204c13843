//! Module providing the data model and step engine for a regulated reaction network.

pub mod cell;
pub mod coupling;
pub mod enzyme;
pub mod gene;
pub mod molecule;
pub mod network;
pub mod reaction;
