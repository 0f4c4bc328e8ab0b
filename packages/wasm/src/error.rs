//! Fatal errors and non-fatal warnings of the index → normalize pipeline.
//!
//! Errors abort the build before any tree reaches the renderer. Warnings are
//! collected on the result and never stop the pipeline.

use std::fmt;

use crate::person::PersonId;

/// Structural problems that make the snapshot unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FamilyTreeError {
    /// A row could not be turned into a person.
    #[error("invalid record at row {row}: {reason}")]
    InvalidRecord {
        /// Zero-based input position.
        row: usize,
        reason: &'static str,
    },

    /// Two rows share the same `ID`.
    #[error("duplicate person id {id} (rows {first_row} and {second_row})")]
    DuplicateId {
        id: PersonId,
        first_row: usize,
        second_row: usize,
    },

    /// Every person has at least one resolvable parent, so there is nothing to root the tree at.
    #[error("no root ancestor found: every person has a parent in the snapshot")]
    NoRootFound,

    /// A person is recorded as their own ancestor.
    #[error("ancestry cycle: {person} is their own ancestor")]
    AncestryCycle { person: PersonId },
}

/// Recoverable oddities surfaced alongside a successful tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeWarning {
    /// More than one root candidate; `chosen` is the first in input order.
    AmbiguousRoot {
        chosen: PersonId,
        others: Vec<PersonId>,
    },
}

impl fmt::Display for TreeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AmbiguousRoot { chosen, others } => write!(
                f,
                "multiple root ancestors detected; using {chosen} and ignoring {} other(s)",
                others.len()
            ),
        }
    }
}
