use thiserror::Error;

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("invalid topology document: {0}")]
    Syntax(#[from] json5::Error),
    #[error("invalid topology schema: {0}")]
    Schema(#[from] serde_json::Error),
    #[error("topology document must be an object with `nodes` or `domains`")]
    UnknownShape,
    #[error("duplicate node id `{0}`")]
    DuplicateNode(String),
    #[error("edge `{edge}` references unknown node `{node}`")]
    UnknownEndpoint { edge: String, node: String },
    #[error("node `{node}` has unknown type `{kind}`")]
    UnknownNodeKind { node: String, kind: String },
    #[error("node `{node}` has unknown status `{status}`")]
    UnknownStatus { node: String, status: String },
    #[error("edge `{edge}` has unknown flow `{flow}`")]
    UnknownFlow { edge: String, flow: String },
    #[error("unknown direction `{0}` (expected LR or TD)")]
    UnknownDirection(String),
    #[error("invalid color `{color}` on {owner}")]
    InvalidColor { owner: String, color: String },
}
