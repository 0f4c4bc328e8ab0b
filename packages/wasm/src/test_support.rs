//! Fixtures shared by unit tests across modules.

use proptest::prelude::*;

use crate::config::{ImageConfig, NormalizeConfig};
use crate::family::FamilyIndex;
use crate::person::{PersonRecord, people_from_records};
use crate::tree::{FamilyTree, FlatTree, normalize};

pub(crate) fn index(records: Vec<PersonRecord>) -> FamilyIndex {
    let people = people_from_records(records, &ImageConfig::default()).unwrap();
    FamilyIndex::build(people).unwrap()
}

pub(crate) fn tree(records: Vec<PersonRecord>) -> FamilyTree {
    normalize(&index(records), &NormalizeConfig::default()).unwrap()
}

pub(crate) fn flat(records: Vec<PersonRecord>) -> FlatTree {
    FlatTree::from_root(&tree(records).root)
}

/// Three generations with a remarriage and a childless couple.
pub(crate) fn three_generations() -> Vec<PersonRecord> {
    vec![
        PersonRecord::new("P001").named("Ravi").gender("Male"),
        PersonRecord::new("P002").named("Asha").gender("Female"),
        PersonRecord::new("P003").named("Meera").gender("Female"),
        PersonRecord::new("P004").named("Kiran").gender("Male").child_of("P001", "P002"),
        PersonRecord::new("P005").named("Latha").gender("Female").child_of("P001", "P002"),
        PersonRecord::new("P006").named("Sunil").gender("Male").child_of("P001", "P003"),
        PersonRecord::new("P007").named("Divya").gender("Female").married_to("P004"),
        PersonRecord::new("P008").named("Arjun").gender("Male").child_of("P004", "P007"),
        PersonRecord::new("P009").named("Nisha").gender("Female").married_to("P006"),
    ]
}

/// Random acyclic genealogy: person `i` may only have parents with a
/// smaller index, so ancestry is acyclic by construction. Ids are
/// zero-padded so lexical order equals input order. `P00` never has parents.
pub(crate) fn genealogy() -> impl Strategy<Value = Vec<PersonRecord>> {
    (2usize..24)
        .prop_flat_map(|n| {
            proptest::collection::vec((any::<u16>(), any::<u16>(), any::<u16>(), 0u8..4), n)
        })
        .prop_map(|rows| {
            rows.iter()
                .enumerate()
                .map(|(i, &(f, m, s, kind))| {
                    let record = PersonRecord::new(format!("P{i:02}"));
                    if i >= 2 && kind < 2 {
                        let father = f as usize % i;
                        let mother = m as usize % i;
                        record.child_of(format!("P{father:02}"), format!("P{mother:02}"))
                    } else if i >= 1 && kind == 2 {
                        let spouse = s as usize % i;
                        record.married_to(format!("P{spouse:02}"))
                    } else {
                        record
                    }
                })
                .collect()
        })
}
