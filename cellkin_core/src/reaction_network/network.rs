//! This module provides the ReactionNetwork struct owning the full simulation state
//! and the fixed-timestep update loop
use crate::reaction_network::cell::Cell;
use crate::reaction_network::coupling::EnergyCoupling;
use crate::reaction_network::enzyme::{Enzyme, EnzymeActivity};
use crate::reaction_network::gene::{Gene, GeneActivity};
use crate::reaction_network::molecule::Molecule;
use crate::reaction_network::reaction::Reaction;

use indexmap::IndexMap;
use thiserror::Error;

/// Represents the complete state of a simulated reaction network
///
/// Owns the molecule pool, the enzymes (which own their reactions), the genes,
/// the energy couplings, and the singleton cell. Advanced one fixed timestep at
/// a time by [`ReactionNetwork::step`]; external mutation must happen strictly
/// between steps.
#[derive(Clone, Debug, Default)]
pub struct ReactionNetwork {
    /// Map of molecule ids to Molecule objects
    pub molecules: IndexMap<String, Molecule>,
    /// Map of enzyme ids to Enzyme objects
    pub enzymes: IndexMap<String, Enzyme>,
    /// Map of gene ids to Gene objects
    pub genes: IndexMap<String, Gene>,
    /// Energy couplings between reactions
    pub couplings: Vec<EnergyCoupling>,
    /// Aggregate heat and energy bookkeeping
    pub cell: Cell,
    /// Simulated time elapsed since the last load or reset
    pub time: f64,
    /// Steps taken since the last load or reset
    pub steps: u64,
    /// Whether the survival check runs each step; off by default, in which case
    /// the cell is reported as always alive
    pub survival_check: bool,
    /// Molecule concentrations recorded at load time, restored by a reset
    initial_concentrations: IndexMap<String, f64>,
}

/// Errors from the by-id accessor and mutator API
#[derive(Clone, Debug, Error)]
pub enum NetworkError {
    #[error("molecule {0} is not present in the network")]
    UnknownMolecule(String),
    #[error("enzyme {0} is not present in the network")]
    UnknownEnzyme(String),
    #[error("gene {0} is not present in the network")]
    UnknownGene(String),
}

impl ReactionNetwork {
    pub fn new_empty() -> Self {
        ReactionNetwork::default()
    }

    // region Population

    /// Add a molecule to the network, recording its initial concentration
    ///
    /// # Examples
    /// ```rust
    /// use cellkin_core::reaction_network::molecule::MoleculeBuilder;
    /// use cellkin_core::reaction_network::network::ReactionNetwork;
    /// let mut network = ReactionNetwork::new_empty();
    /// let glucose = MoleculeBuilder::default()
    ///     .id("glc".to_string())
    ///     .concentration(5.0)
    ///     .build()
    ///     .unwrap();
    /// network.add_molecule(glucose);
    /// ```
    pub fn add_molecule(&mut self, molecule: Molecule) {
        let id = molecule.id.clone();
        self.initial_concentrations
            .insert(id.clone(), molecule.concentration);
        self.molecules.insert(id, molecule);
    }

    /// Add an enzyme to the network, recording its initial concentration and
    /// stamping the enzyme id onto its owned reactions
    pub fn add_enzyme(&mut self, mut enzyme: Enzyme) {
        enzyme.initial_concentration = enzyme.concentration;
        for reaction in &mut enzyme.reactions {
            reaction.enzyme_id = Some(enzyme.id.clone());
        }
        let id = enzyme.id.clone();
        self.enzymes.insert(id, enzyme);
    }

    /// Add a gene to the network
    pub fn add_gene(&mut self, gene: Gene) {
        let id = gene.id.clone();
        self.genes.insert(id, gene);
    }

    /// Add an energy coupling to the network
    pub fn add_coupling(&mut self, coupling: EnergyCoupling) {
        self.couplings.push(coupling);
    }

    /// Atomically replace the molecule, enzyme, gene, and coupling sets
    ///
    /// Records every initial concentration for later reset and zeroes the cell,
    /// the clock, and the step counter.
    pub fn load(
        &mut self,
        molecules: Vec<Molecule>,
        enzymes: Vec<Enzyme>,
        genes: Vec<Gene>,
        couplings: Vec<EnergyCoupling>,
    ) {
        self.molecules = IndexMap::new();
        self.enzymes = IndexMap::new();
        self.genes = IndexMap::new();
        self.couplings = Vec::new();
        self.initial_concentrations = IndexMap::new();
        for molecule in molecules {
            self.add_molecule(molecule);
        }
        for enzyme in enzymes {
            self.add_enzyme(enzyme);
        }
        for gene in genes {
            self.add_gene(gene);
        }
        self.couplings = couplings;
        self.cell.reset();
        self.time = 0.0;
        self.steps = 0;
        log::info!(
            "loaded network: {} molecules, {} enzymes, {} genes, {} couplings",
            self.molecules.len(),
            self.enzymes.len(),
            self.genes.len(),
            self.couplings.len()
        );
    }

    /// Restore every recorded initial concentration exactly and zero all
    /// accumulated runtime state
    pub fn reset(&mut self) {
        for (id, molecule) in self.molecules.iter_mut() {
            if let Some(&initial) = self.initial_concentrations.get(id) {
                molecule.concentration = initial;
            }
        }
        for enzyme in self.enzymes.values_mut() {
            enzyme.concentration = enzyme.initial_concentration;
            for reaction in &mut enzyme.reactions {
                reaction.reset_runtime();
            }
        }
        for gene in self.genes.values_mut() {
            gene.last_expression_rate = 0.0;
            gene.last_activation_factor = 1.0;
            gene.last_repression_factor = 1.0;
        }
        for coupling in &mut self.couplings {
            coupling.total_transferred = 0.0;
        }
        self.cell.reset();
        self.time = 0.0;
        self.steps = 0;
    }

    // endregion Population

    // region Step loop

    /// Advance the simulation by one timestep
    ///
    /// The update runs in five strictly ordered phases: (1) snapshot all
    /// concentrations, (2) compute every reaction's rates from that snapshot
    /// only, (3) apply the stoichiometric deltas to the molecule pool, (4) apply
    /// gene expression and enzyme turnover, (5) aggregate cell heat and energy,
    /// fire energy couplings, and clamp all concentrations to be non-negative.
    /// Apart from its inputs the step is deterministic.
    pub fn step(&mut self, dt: f64) {
        let snapshot = self.concentration_snapshot();

        // Phase 2: rates, from the snapshot only
        for enzyme in self.enzymes.values_mut() {
            enzyme.update_reaction_rates(&snapshot);
        }

        // Phase 3: stoichiometric deltas, accumulated before application so no
        // reaction sees another's writes within the step
        let mut deltas: IndexMap<String, f64> = IndexMap::new();
        for enzyme in self.enzymes.values() {
            for reaction in &enzyme.reactions {
                let net = reaction.net_rate();
                if net == 0.0 {
                    continue;
                }
                for (species, coefficient) in &reaction.substrates {
                    *deltas.entry(species.clone()).or_insert(0.0) -= coefficient * net * dt;
                }
                for (species, coefficient) in &reaction.products {
                    *deltas.entry(species.clone()).or_insert(0.0) += coefficient * net * dt;
                }
            }
        }
        for (species, delta) in deltas {
            if let Some(molecule) = self.molecules.get_mut(&species) {
                if !molecule.locked {
                    molecule.concentration += delta;
                }
            }
        }

        // Phase 4: gene expression, then enzyme turnover
        let mut synthesis_rates: IndexMap<String, f64> = IndexMap::new();
        for gene in self.genes.values_mut() {
            let rate = gene.expression_rate(&snapshot);
            if rate > 0.0 {
                *synthesis_rates.entry(gene.enzyme_id.clone()).or_insert(0.0) += rate;
            }
        }
        for enzyme in self.enzymes.values_mut() {
            let synthesis = synthesis_rates.get(&enzyme.id).copied().unwrap_or(0.0);
            enzyme.apply_turnover(dt, &snapshot, synthesis);
        }

        // Phase 5: cell aggregation, couplings, clamp
        self.cell.update_heat(
            dt,
            self.enzymes.values().flat_map(|enzyme| enzyme.reactions.iter()),
        );
        self.cell.update_energy(
            dt,
            self.enzymes.values().flat_map(|enzyme| enzyme.reactions.iter()),
        );
        if self.survival_check {
            self.cell.check_survival();
        }
        for coupling in &mut self.couplings {
            let Some(source_delta_g) =
                reaction_in(&self.enzymes, &coupling.source).map(|r| r.delta_g_actual)
            else {
                continue;
            };
            let sink_id = coupling.sink.clone();
            if let Some(sink) = reaction_in_mut(&mut self.enzymes, &sink_id) {
                coupling.apply(dt, source_delta_g, sink);
            }
        }
        for molecule in self.molecules.values_mut() {
            if molecule.concentration < 0.0 {
                molecule.concentration = 0.0;
            }
        }

        self.time += dt;
        self.steps += 1;
    }

    // endregion Step loop

    // region Accessors and mutators

    /// Snapshot of every molecule concentration, keyed by id
    pub fn concentration_snapshot(&self) -> IndexMap<String, f64> {
        self.molecules
            .iter()
            .map(|(id, molecule)| (id.clone(), molecule.concentration))
            .collect()
    }

    /// Look up a reaction anywhere in the network by id
    pub fn reaction(&self, id: &str) -> Option<&Reaction> {
        reaction_in(&self.enzymes, id)
    }

    pub fn molecule_concentration(&self, id: &str) -> Result<f64, NetworkError> {
        self.molecules
            .get(id)
            .map(|molecule| molecule.concentration)
            .ok_or_else(|| NetworkError::UnknownMolecule(id.to_string()))
    }

    /// Set a molecule's concentration, clamped to be non-negative
    pub fn set_molecule_concentration(&mut self, id: &str, value: f64) -> Result<(), NetworkError> {
        let molecule = self
            .molecules
            .get_mut(id)
            .ok_or_else(|| NetworkError::UnknownMolecule(id.to_string()))?;
        molecule.concentration = value.max(0.0);
        Ok(())
    }

    pub fn set_molecule_locked(&mut self, id: &str, locked: bool) -> Result<(), NetworkError> {
        let molecule = self
            .molecules
            .get_mut(id)
            .ok_or_else(|| NetworkError::UnknownMolecule(id.to_string()))?;
        molecule.locked = locked;
        Ok(())
    }

    pub fn enzyme_concentration(&self, id: &str) -> Result<f64, NetworkError> {
        self.enzymes
            .get(id)
            .map(|enzyme| enzyme.concentration)
            .ok_or_else(|| NetworkError::UnknownEnzyme(id.to_string()))
    }

    /// Set an enzyme's concentration, clamped to be non-negative
    pub fn set_enzyme_concentration(&mut self, id: &str, value: f64) -> Result<(), NetworkError> {
        let enzyme = self
            .enzymes
            .get_mut(id)
            .ok_or_else(|| NetworkError::UnknownEnzyme(id.to_string()))?;
        enzyme.concentration = value.max(0.0);
        Ok(())
    }

    pub fn set_enzyme_activity(
        &mut self,
        id: &str,
        activity: EnzymeActivity,
    ) -> Result<(), NetworkError> {
        let enzyme = self
            .enzymes
            .get_mut(id)
            .ok_or_else(|| NetworkError::UnknownEnzyme(id.to_string()))?;
        enzyme.activity = activity;
        Ok(())
    }

    pub fn set_gene_activity(&mut self, id: &str, activity: GeneActivity) -> Result<(), NetworkError> {
        let gene = self
            .genes
            .get_mut(id)
            .ok_or_else(|| NetworkError::UnknownGene(id.to_string()))?;
        gene.activity = activity;
        Ok(())
    }

    /// Turn the per-step survival check on or off
    pub fn set_survival_check(&mut self, enabled: bool) {
        self.survival_check = enabled;
    }

    // endregion Accessors and mutators
}

fn reaction_in<'a>(enzymes: &'a IndexMap<String, Enzyme>, id: &str) -> Option<&'a Reaction> {
    enzymes
        .values()
        .flat_map(|enzyme| enzyme.reactions.iter())
        .find(|reaction| reaction.id == id)
}

fn reaction_in_mut<'a>(
    enzymes: &'a mut IndexMap<String, Enzyme>,
    id: &str,
) -> Option<&'a mut Reaction> {
    enzymes
        .values_mut()
        .flat_map(|enzyme| enzyme.reactions.iter_mut())
        .find(|reaction| reaction.id == id)
}
