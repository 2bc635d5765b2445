//! # Models Module
//!
//! Structural representation of a molecule as this crate sees it: the
//! bonded connectivity graph and the internal coordinates derived from it.
//!
//! - [`graph`] - Validated symmetric adjacency ([`graph::BondGraph`])
//! - [`coords`] - Coordinate kinds, enumeration, and value evaluation

pub mod coords;
pub mod graph;
