//! Module providing JSON reading of network definitions
//!
//! This is collaborator-facing population of the engine: a definition file is
//! parsed, structurally validated, and handed to the network's atomic bulk-load.
//! The engine itself never serializes its state.
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::configuration::CONFIGURATION;
use crate::io::IoError;
use crate::reaction_network::coupling::EnergyCoupling;
use crate::reaction_network::enzyme::{AllostericSite, Enzyme, EnzymeActivity, Regulation};
use crate::reaction_network::gene::{Gene, GeneActivity, RegulatorKind, RegulatoryElement};
use crate::reaction_network::molecule::Molecule;
use crate::reaction_network::network::ReactionNetwork;
use crate::reaction_network::reaction::Reaction;

// region JSON network

/// A JSON serialized network definition
#[derive(Deserialize)]
struct JsonNetwork {
    #[serde(default)]
    molecules: Vec<JsonMolecule>,
    #[serde(default)]
    enzymes: Vec<JsonEnzyme>,
    #[serde(default)]
    genes: Vec<JsonGene>,
    #[serde(default)]
    couplings: Vec<JsonCoupling>,
}

#[derive(Deserialize)]
struct JsonMolecule {
    id: String,
    name: Option<String>,
    #[serde(default)]
    concentration: f64,
    #[serde(default)]
    locked: bool,
}

#[derive(Deserialize)]
struct JsonReaction {
    id: String,
    name: Option<String>,
    #[serde(default)]
    substrates: IndexMap<String, f64>,
    #[serde(default)]
    products: IndexMap<String, f64>,
    vmax: Option<f64>,
    km: Option<f64>,
    efficiency: Option<f64>,
    delta_g_standard: Option<f64>,
    temperature: Option<f64>,
    #[serde(default)]
    irreversible: bool,
}

#[derive(Deserialize)]
struct JsonEnzyme {
    id: String,
    name: Option<String>,
    #[serde(default)]
    concentration: f64,
    half_life: Option<f64>,
    degradable: Option<bool>,
    #[serde(default)]
    locked: bool,
    #[serde(default)]
    reactions: Vec<JsonReaction>,
    regulation: Option<JsonRegulation>,
}

#[derive(Deserialize)]
struct JsonSite {
    kd: f64,
    fold: f64,
}

#[derive(Deserialize)]
struct JsonRegulation {
    #[serde(default)]
    km: IndexMap<String, f64>,
    #[serde(default)]
    competitive_inhibitors: IndexMap<String, f64>,
    #[serde(default)]
    noncompetitive_inhibitors: IndexMap<String, f64>,
    #[serde(default)]
    allosteric_activators: IndexMap<String, JsonSite>,
    #[serde(default)]
    allosteric_inhibitors: IndexMap<String, JsonSite>,
    #[serde(default)]
    synthesis_regulators: IndexMap<String, JsonSite>,
    #[serde(default)]
    degradation_regulators: IndexMap<String, JsonSite>,
    #[serde(default)]
    basal_synthesis: f64,
}

#[derive(Deserialize)]
struct JsonRegulator {
    kind: String,
    target: String,
    kd: f64,
    fold: f64,
    hill: Option<f64>,
}

#[derive(Deserialize)]
struct JsonGene {
    id: String,
    enzyme: String,
    #[serde(default)]
    basal_rate: f64,
    max_rate: Option<f64>,
    active: Option<bool>,
    #[serde(default)]
    regulators: Vec<JsonRegulator>,
}

#[derive(Deserialize)]
struct JsonCoupling {
    source: String,
    sink: String,
    efficiency: Option<f64>,
    active: Option<bool>,
}

// endregion JSON network

// region Conversions

impl From<JsonMolecule> for Molecule {
    fn from(m: JsonMolecule) -> Self {
        Molecule {
            id: m.id,
            name: m.name,
            concentration: m.concentration.max(0.0),
            locked: m.locked,
        }
    }
}

impl From<JsonReaction> for Reaction {
    fn from(r: JsonReaction) -> Self {
        Reaction {
            id: r.id,
            name: r.name,
            substrates: r.substrates,
            products: r.products,
            vmax: r.vmax.unwrap_or(1.0),
            km: r.km.unwrap_or(1.0),
            efficiency: r.efficiency.unwrap_or(1.0).clamp(0.0, 1.0),
            delta_g_standard: r.delta_g_standard.unwrap_or(0.0),
            temperature: r
                .temperature
                .unwrap_or_else(|| CONFIGURATION.read().unwrap().temperature),
            irreversible: r.irreversible,
            enzyme_id: None,
            forward_rate: 0.0,
            reverse_rate: 0.0,
            delta_g_actual: 0.0,
            useful_work_rate: 0.0,
            heat_rate: 0.0,
            coupled_energy: 0.0,
        }
    }
}

impl From<JsonSite> for AllostericSite {
    fn from(site: JsonSite) -> Self {
        AllostericSite {
            kd: site.kd,
            fold: site.fold,
        }
    }
}

impl From<JsonRegulation> for Regulation {
    fn from(regulation: JsonRegulation) -> Self {
        Regulation {
            km_overrides: regulation.km,
            competitive_inhibitors: regulation.competitive_inhibitors,
            noncompetitive_inhibitors: regulation.noncompetitive_inhibitors,
            allosteric_activators: convert_sites(regulation.allosteric_activators),
            allosteric_inhibitors: convert_sites(regulation.allosteric_inhibitors),
            synthesis_regulators: convert_sites(regulation.synthesis_regulators),
            degradation_regulators: convert_sites(regulation.degradation_regulators),
            basal_synthesis: regulation.basal_synthesis,
        }
    }
}

fn convert_sites(sites: IndexMap<String, JsonSite>) -> IndexMap<String, AllostericSite> {
    sites
        .into_iter()
        .map(|(species, site)| (species, site.into()))
        .collect()
}

impl From<JsonEnzyme> for Enzyme {
    fn from(e: JsonEnzyme) -> Self {
        let mut enzyme = Enzyme {
            id: e.id,
            name: e.name,
            concentration: e.concentration.max(0.0),
            initial_concentration: 0.0,
            reactions: Vec::new(),
            half_life: e.half_life.unwrap_or(0.0),
            degradable: e.degradable.unwrap_or(true),
            locked: e.locked,
            activity: EnzymeActivity::Active,
            regulation: e.regulation.map(Regulation::from),
        };
        for reaction in e.reactions {
            enzyme.add_reaction(reaction.into());
        }
        enzyme
    }
}

impl TryFrom<JsonRegulator> for RegulatoryElement {
    type Error = IoError;

    fn try_from(regulator: JsonRegulator) -> Result<Self, IoError> {
        let kind = match regulator.kind.as_str() {
            "activator" => RegulatorKind::Activator,
            "repressor" => RegulatorKind::Repressor,
            other => return Err(IoError::InvalidRegulatorKind(other.to_string())),
        };
        Ok(RegulatoryElement {
            kind,
            target: regulator.target,
            kd: regulator.kd,
            fold: regulator.fold,
            hill: regulator.hill.unwrap_or(1.0),
        })
    }
}

impl TryFrom<JsonGene> for Gene {
    type Error = IoError;

    fn try_from(g: JsonGene) -> Result<Self, IoError> {
        let mut activators = Vec::new();
        let mut repressors = Vec::new();
        for regulator in g.regulators {
            let element = RegulatoryElement::try_from(regulator)?;
            match element.kind {
                RegulatorKind::Activator => activators.push(element),
                RegulatorKind::Repressor => repressors.push(element),
            }
        }
        Ok(Gene {
            id: g.id,
            enzyme_id: g.enzyme,
            basal_rate: g.basal_rate,
            max_rate: g.max_rate.unwrap_or(f64::INFINITY),
            activity: match g.active.unwrap_or(true) {
                true => GeneActivity::Active,
                false => GeneActivity::Inactive,
            },
            activators,
            repressors,
            last_expression_rate: 0.0,
            last_activation_factor: 1.0,
            last_repression_factor: 1.0,
        })
    }
}

impl From<JsonCoupling> for EnergyCoupling {
    fn from(c: JsonCoupling) -> Self {
        EnergyCoupling {
            source: c.source,
            sink: c.sink,
            efficiency: c.efficiency.unwrap_or(1.0),
            active: c.active.unwrap_or(true),
            total_transferred: 0.0,
        }
    }
}

// endregion Conversions

// region Reading

/// Read a JSON network definition from a string into a populated network
pub fn read_network_from_str(data: &str) -> Result<ReactionNetwork, IoError> {
    let json_network: JsonNetwork = serde_json::from_str(data)?;
    validate(&json_network)?;

    let molecules: Vec<Molecule> = json_network.molecules.into_iter().map(Into::into).collect();
    let enzymes: Vec<Enzyme> = json_network.enzymes.into_iter().map(Into::into).collect();
    let genes: Vec<Gene> = json_network
        .genes
        .into_iter()
        .map(Gene::try_from)
        .collect::<Result<_, _>>()?;
    let couplings: Vec<EnergyCoupling> =
        json_network.couplings.into_iter().map(Into::into).collect();

    let mut network = ReactionNetwork::new_empty();
    network.load(molecules, enzymes, genes, couplings);
    Ok(network)
}

/// Read a JSON network definition file into a populated network
pub fn read_network_from_file<P: AsRef<Path>>(path: P) -> Result<ReactionNetwork, IoError> {
    let data = match fs::read_to_string(&path) {
        Ok(data) => data,
        _ => return Err(IoError::FileNotFound),
    };
    let network = read_network_from_str(&data)?;
    log::info!("read network definition from {:?}", path.as_ref());
    Ok(network)
}

/// Structural validation before load
///
/// Every gene must name a known enzyme, every coupling must name known
/// reactions, and no reaction may have empty stoichiometry on both sides.
/// Unknown molecule ids inside reaction maps are tolerated: they contribute
/// zero rate at runtime.
fn validate(network: &JsonNetwork) -> Result<(), IoError> {
    for enzyme in &network.enzymes {
        for reaction in &enzyme.reactions {
            if reaction.substrates.is_empty() && reaction.products.is_empty() {
                return Err(IoError::EmptyReaction(reaction.id.clone()));
            }
        }
    }
    for gene in &network.genes {
        if !network.enzymes.iter().any(|enzyme| enzyme.id == gene.enzyme) {
            return Err(IoError::UnknownEnzyme {
                gene: gene.id.clone(),
                enzyme: gene.enzyme.clone(),
            });
        }
    }
    for coupling in &network.couplings {
        for reaction_id in [&coupling.source, &coupling.sink] {
            let known = network
                .enzymes
                .iter()
                .flat_map(|enzyme| enzyme.reactions.iter())
                .any(|reaction| &reaction.id == reaction_id);
            if !known {
                return Err(IoError::UnknownReaction(reaction_id.clone()));
            }
        }
    }
    Ok(())
}

// endregion Reading
