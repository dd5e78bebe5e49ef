//! Structural integrity errors raised by [`Diagram`](super::Diagram) mutations.

use std::fmt;

use thiserror::Error;

use crate::{identifier::Id, model::ElementKind};

/// Which end of a relationship an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Source,
    Target,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Source => write!(f, "source"),
            Endpoint::Target => write!(f, "target"),
        }
    }
}

/// A violated diagram invariant.
///
/// These errors indicate a construction-order bug in the caller, not bad
/// input data, so they are never retried or silently dropped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("id `{0}` is already in use")]
    DuplicateId(Id),

    #[error("duplicate {kind} name: {name}")]
    DuplicateName { kind: ElementKind, name: String },

    #[error("relationship `{relationship}` references unknown {role} element `{endpoint}`")]
    UnknownEndpoint {
        relationship: Id,
        endpoint: Id,
        role: Endpoint,
    },

    #[error("element `{0}` not found")]
    UnknownElement(Id),

    #[error("cannot link `{owner}` to `{member}`: {reason}")]
    InvalidLink {
        owner: Id,
        member: Id,
        reason: &'static str,
    },
}
