//! Topologies bundled with the crate.

use crate::error::TopologyError;
use crate::ir::Topology;
use crate::parser::parse_topology;

const MAG7: &str = include_str!("../assets/mag7.json5");
const DATAFLOW: &str = include_str!("../assets/services.json");

const BUILTINS: [(&str, &str); 2] = [("mag7", MAG7), ("dataflow", DATAFLOW)];

pub fn builtin_names() -> Vec<&'static str> {
    BUILTINS.iter().map(|(name, _)| *name).collect()
}

/// Source text of a built-in, for callers that want to inspect or edit it.
pub fn builtin_source(name: &str) -> Option<&'static str> {
    let name = name.trim().to_ascii_lowercase();
    BUILTINS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, source)| *source)
}

/// Parse the named built-in. `Ok(None)` when no built-in has that name.
pub fn builtin(name: &str) -> Result<Option<Topology>, TopologyError> {
    builtin_source(name).map(parse_topology).transpose()
}
