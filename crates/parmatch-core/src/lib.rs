//! # parmatch
//!
//! A library for deriving the internal coordinates of a molecule from its
//! bonded connectivity graph and resolving the force-field parameters that
//! apply to each of them.
//!
//! ## Architectural Philosophy
//!
//! The crate is split into two thin layers with a single data flow between
//! them:
//!
//! - **[`models`]: The Structure.** A validated connectivity graph
//!   ([`models::graph::BondGraph`]) and the coordinate enumerator
//!   ([`models::coords::InternalCoords`]) that walks it to produce bonds,
//!   angles, torsions, improper torsions, and the 1-2/1-3/1-4/nonbonded
//!   pair classification.
//!
//! - **[`forcefield`]: The Numbers.** An explicit, immutable force-field
//!   object (parameter table, ordering rules, combination rules, scale
//!   factors) consumed by the assignment engine
//!   ([`forcefield::assign::assign_params`]), which maps every coordinate
//!   instance to its parameter vector, and by the potential models that
//!   evaluate those vectors ([`forcefield::energy::deriv`]).
//!
//! Enumeration and assignment are deterministic and side-effect free; both
//! inputs may be shared read-only across any number of evaluations.

pub mod forcefield;
pub mod models;
pub mod utils;
