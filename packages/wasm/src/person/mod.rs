//! Person records and the typed person model.
//!
//! A person is identified by its externally assigned `ID`. Biological links
//! (`FatherID`, `MotherID`) and the explicit partner link (`MarriedToID`) are
//! carried as unresolved ids; resolving them is the family index's job.
//! Descriptive attributes are opaque to normalization and pass through as-is.

mod id;
mod record;

pub use id::PersonId;
pub use record::{PersonRecord, people_from_records};

use serde::Serialize;

/// Gender as recorded in the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Gender {
    /// Parse a sheet value, case-insensitively. Anything unrecognized is `Unknown`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Self::Male,
            "female" | "f" => Self::Female,
            _ => Self::Unknown,
        }
    }

    /// Label used to build the per-gender fallback image name.
    pub fn fallback_label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Unknown => "",
        }
    }
}

/// A person from the input snapshot.
///
/// Immutable once loaded. Serialized with the sheet's column names so the
/// renderer can keep reading `Name`, `Image`, `Gender` and friends.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Person {
    #[serde(rename = "ID")]
    pub id: PersonId,
    pub name: String,
    pub nickname: Option<String>,
    pub gender: Gender,
    pub year_of_birth: Option<i32>,
    pub year_of_death: Option<i32>,
    pub year_of_marriage: Option<i32>,
    pub profession: Option<String>,
    pub notes: Option<String>,
    #[serde(rename = "FatherID")]
    pub father_id: Option<PersonId>,
    #[serde(rename = "MotherID")]
    pub mother_id: Option<PersonId>,
    #[serde(rename = "MarriedToID")]
    pub married_to_id: Option<PersonId>,
    /// Resolved display asset.
    pub image: String,
    /// Per-gender asset to swap in when `image` fails to load.
    pub fallback_image: String,
}

impl Person {
    /// Both parent ids, if the row names both.
    pub fn parent_ids(&self) -> Option<(&PersonId, &PersonId)> {
        self.father_id.as_ref().zip(self.mother_id.as_ref())
    }
}
