//! Raw tabular rows as handed over by the JS loader.
//!
//! `d3.csv` yields every cell as a string, so deserialization is lenient:
//! values are trimmed, empty cells become `None`, and year columns accept
//! either numbers or numeric strings.

use serde::{Deserialize, Deserializer};

use super::{Gender, Person, PersonId};
use crate::config::ImageConfig;
use crate::error::FamilyTreeError;

/// One input row, column names as in the source sheet.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PersonRecord {
    #[serde(rename = "ID", default, deserialize_with = "text")]
    pub id: Option<String>,
    #[serde(rename = "Name", default, deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(rename = "Nickname", default, deserialize_with = "text")]
    pub nickname: Option<String>,
    #[serde(rename = "Gender", default, deserialize_with = "text")]
    pub gender: Option<String>,
    #[serde(rename = "YearOfBirth", default, deserialize_with = "year")]
    pub year_of_birth: Option<i32>,
    #[serde(rename = "YearOfDeath", default, deserialize_with = "year")]
    pub year_of_death: Option<i32>,
    #[serde(rename = "YearOfMarriage", default, deserialize_with = "year")]
    pub year_of_marriage: Option<i32>,
    #[serde(rename = "Profession", default, deserialize_with = "text")]
    pub profession: Option<String>,
    #[serde(rename = "Notes", default, deserialize_with = "text")]
    pub notes: Option<String>,
    #[serde(rename = "FatherID", default, deserialize_with = "text")]
    pub father_id: Option<String>,
    #[serde(rename = "MotherID", default, deserialize_with = "text")]
    pub mother_id: Option<String>,
    #[serde(rename = "MarriedToID", default, deserialize_with = "text")]
    pub married_to_id: Option<String>,
    #[serde(rename = "Image", default, deserialize_with = "text")]
    pub image: Option<String>,
}

impl PersonRecord {
    /// Start a record with only an `ID`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn father(mut self, id: impl Into<String>) -> Self {
        self.father_id = Some(id.into());
        self
    }

    pub fn mother(mut self, id: impl Into<String>) -> Self {
        self.mother_id = Some(id.into());
        self
    }

    /// Set both parents at once.
    pub fn child_of(self, father: impl Into<String>, mother: impl Into<String>) -> Self {
        self.father(father).mother(mother)
    }

    pub fn married_to(mut self, id: impl Into<String>) -> Self {
        self.married_to_id = Some(id.into());
        self
    }

    pub fn married_in(mut self, year: i32) -> Self {
        self.year_of_marriage = Some(year);
        self
    }

    /// Convert the row into a typed [`Person`], resolving its image.
    ///
    /// `row` is the zero-based input position, used only for error reporting.
    pub fn into_person(self, row: usize, images: &ImageConfig) -> Result<Person, FamilyTreeError> {
        let id = self
            .id
            .map(PersonId::from)
            .ok_or(FamilyTreeError::InvalidRecord {
                row,
                reason: "missing ID",
            })?;

        let gender = self.gender.as_deref().map(Gender::parse).unwrap_or_default();
        let fallback_image = images.fallback_url(gender);
        let image = match &self.image {
            Some(token) => images.resolve(token),
            None => fallback_image.clone(),
        };

        Ok(Person {
            id,
            name: self.name.unwrap_or_default(),
            nickname: self.nickname,
            gender,
            year_of_birth: self.year_of_birth,
            year_of_death: self.year_of_death,
            year_of_marriage: self.year_of_marriage,
            profession: self.profession,
            notes: self.notes,
            father_id: self.father_id.map(PersonId::from),
            mother_id: self.mother_id.map(PersonId::from),
            married_to_id: self.married_to_id.map(PersonId::from),
            image,
            fallback_image,
        })
    }
}

/// Convert a whole snapshot, stopping at the first invalid row.
pub fn people_from_records(
    records: Vec<PersonRecord>,
    images: &ImageConfig,
) -> Result<Vec<Person>, FamilyTreeError> {
    records
        .into_iter()
        .enumerate()
        .map(|(row, record)| record.into_person(row, images))
        .collect()
}

/// A cell as it may arrive from JS: text, a number, or a boolean.
#[derive(Deserialize)]
#[serde(untagged)]
enum Cell {
    Text(String),
    Number(f64),
    Flag(bool),
}

fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let cell = Option::<Cell>::deserialize(deserializer)?;
    Ok(cell.and_then(|cell| match cell {
        Cell::Text(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        Cell::Number(n) => Some(n.to_string()),
        Cell::Flag(b) => Some(b.to_string()),
    }))
}

fn year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let cell = Option::<Cell>::deserialize(deserializer)?;
    let value = match cell {
        Some(Cell::Number(n)) => Some(n),
        Some(Cell::Text(s)) => s.trim().parse::<f64>().ok(),
        Some(Cell::Flag(_)) | None => None,
    };
    // `0` and NaN are treated as "no year", as the sheet leaves them blank.
    // Years outside the `i32` range are absent rather than clamped.
    Ok(value
        .filter(|n| n.is_finite() && *n != 0.0)
        .map(f64::trunc)
        .filter(|n| (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(n))
        .map(|n| n as i32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn from_json(value: serde_json::Value) -> PersonRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_blank_cells_are_absent() {
        let record = from_json(json!({
            "ID": " P001 ",
            "Name": "Asha Rao",
            "Nickname": "",
            "FatherID": "   ",
            "YearOfBirth": "1931",
            "YearOfDeath": "",
            "YearOfMarriage": 1955,
            "MotherID": null,
        }));

        assert_eq!(record.id.as_deref(), Some("P001"));
        assert_eq!(record.name.as_deref(), Some("Asha Rao"));
        assert_eq!(record.nickname, None);
        assert_eq!(record.father_id, None);
        assert_eq!(record.year_of_birth, Some(1931));
        assert_eq!(record.year_of_death, None);
        assert_eq!(record.year_of_marriage, Some(1955));
        assert_eq!(record.mother_id, None);
    }

    #[test]
    fn test_unparseable_year_is_absent() {
        let record = from_json(json!({"ID": "P1", "YearOfBirth": "circa 1900", "YearOfDeath": "0"}));
        assert_eq!(record.year_of_birth, None);
        assert_eq!(record.year_of_death, None);
    }

    #[test]
    fn test_out_of_range_year_is_absent() {
        let record = from_json(json!({
            "ID": "P1",
            "YearOfBirth": "1e12",
            "YearOfDeath": 1e12,
            "YearOfMarriage": -3e9,
        }));
        assert_eq!(record.year_of_birth, None);
        assert_eq!(record.year_of_death, None);
        assert_eq!(record.year_of_marriage, None);

        let record = from_json(json!({"ID": "P1", "YearOfBirth": 2147483647.9}));
        assert_eq!(record.year_of_birth, Some(i32::MAX));
    }

    #[test]
    fn test_unknown_columns_ignored() {
        let record = from_json(json!({"ID": "P1", "Village": "Udupi"}));
        assert_eq!(record, PersonRecord::new("P1"));
    }

    #[test]
    fn test_missing_id_rejected() {
        let err = PersonRecord::default()
            .named("Nobody")
            .into_person(4, &ImageConfig::default())
            .unwrap_err();
        assert!(matches!(err, FamilyTreeError::InvalidRecord { row: 4, .. }));
    }

    #[test]
    fn test_image_resolution() {
        let images = ImageConfig {
            base_url: "img/".into(),
            ..Default::default()
        };

        let with_image = PersonRecord::new("P1")
            .gender("female")
            .into_person(0, &images)
            .unwrap();
        assert_eq!(with_image.image, "img/defFemale.jpg");
        assert_eq!(with_image.fallback_image, "img/defFemale.jpg");

        let mut record = PersonRecord::new("P2").gender("Male");
        record.image = Some("RaviRao.jpg".into());
        let person = record.into_person(1, &images).unwrap();
        assert_eq!(person.image, "img/RaviRao.jpg");
        assert_eq!(person.fallback_image, "img/defMale.jpg");
    }
}
