use std::fmt;

/// Why a graph snapshot could not be turned into a [`super::GraphModel`].
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum InvalidGraphError {
    #[error("edge {edge} references unknown {endpoint} node `{id}`")]
    UnknownEndpoint {
        edge: usize,
        endpoint: Endpoint,
        id: String,
    },
    #[error("node id `{id}` appears more than once")]
    DuplicateNode { id: String },
    #[error("node `{id}` has invalid size {size}")]
    InvalidSize { id: String, size: f32 },
    #[error("node `{id}` has a non-finite position")]
    NonFinitePosition { id: String },
    #[error("edge {edge} has invalid weight {weight}")]
    InvalidWeight { edge: usize, weight: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Source,
    Target,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Target => f.write_str("target"),
        }
    }
}
