use thiserror::Error;

use crate::network::{LinkIdx, NodeIdx};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoutingError {
    #[error("unknown node {0}")]
    UnknownNode(NodeIdx),

    #[error("unknown link {0}")]
    UnknownLink(LinkIdx),

    #[error("link {link} has a non-positive free speed ({freespeed})")]
    InvalidFreespeed { link: LinkIdx, freespeed: f64 },

    #[error("link {link} has a negative length ({length})")]
    InvalidLength { link: LinkIdx, length: f64 },
}
