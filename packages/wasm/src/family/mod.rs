//! Relationship indexing.
//!
//! This module turns a flat list of people into an immutable index: id
//! lookup, the set of marriage units, per-person marriage memberships, and
//! the parent → child kinship graph used to reject impossible ancestry.

mod index;
mod kinship;
mod marriage;

pub use index::FamilyIndex;
pub use kinship::KinshipGraph;
pub use marriage::{Marriage, MarriageId};
