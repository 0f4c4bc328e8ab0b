//! Relationship indexer.
//!
//! Builds the id → person lookup, discovers every marriage unit from
//! co-parent pairs and explicit spouse links, and records each person's
//! marriage memberships in discovery order.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::rc::Rc;

use tracing::debug;

use super::marriage::{Marriage, MarriageId};
use crate::error::FamilyTreeError;
use crate::person::{Person, PersonId};

/// Immutable index over one input snapshot.
///
/// People and marriages are shared through `Rc` so that every tree node
/// built from the index refers to the same source identity.
#[derive(Debug, Clone, Default)]
pub struct FamilyIndex {
    /// People in input order.
    people: Vec<Rc<Person>>,
    by_id: HashMap<PersonId, usize>,
    /// Marriages in discovery order.
    marriages: Vec<Rc<Marriage>>,
    marriage_by_id: HashMap<MarriageId, usize>,
    /// Per person (same slot as `people`): marriage slots in discovery order.
    memberships: Vec<Vec<usize>>,
    /// Per person: the marriage they are a child of, if both parents resolved.
    parent_of: Vec<Option<usize>>,
}

impl FamilyIndex {
    /// Index a snapshot.
    ///
    /// Fails only on duplicate ids. Partial or dangling lineage (one parent,
    /// unknown parent ids, self-pairs) is skipped and the person gets no
    /// parent marriage.
    pub fn build(people: Vec<Person>) -> Result<Self, FamilyTreeError> {
        let mut by_id = HashMap::with_capacity(people.len());
        for (row, person) in people.iter().enumerate() {
            match by_id.entry(person.id.clone()) {
                Entry::Occupied(existing) => {
                    return Err(FamilyTreeError::DuplicateId {
                        id: person.id.clone(),
                        first_row: *existing.get(),
                        second_row: row,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(row);
                }
            }
        }

        let mut builder = MarriageBuilder::new(people.len());

        // Co-parent pairs, in input order of the children.
        for (child, person) in people.iter().enumerate() {
            let Some((father_id, mother_id)) = person.parent_ids() else {
                if person.father_id.is_some() || person.mother_id.is_some() {
                    debug!(person = %person.id, "only one parent recorded; no parent marriage");
                }
                continue;
            };
            let (Some(&father), Some(&mother)) = (by_id.get(father_id), by_id.get(mother_id))
            else {
                debug!(person = %person.id, "unresolvable parent id; no parent marriage");
                continue;
            };
            let Some(key) = MarriageId::new(father_id, mother_id) else {
                debug!(person = %person.id, "father and mother are the same person; skipping");
                continue;
            };

            let marriage = builder.ensure(key, [father, mother], &people);
            builder.marriages[marriage].children.push(person.id.clone());
            builder.parent_of[child] = Some(marriage);
        }

        // Explicit spouse links that produced no children.
        for (slot, person) in people.iter().enumerate() {
            let Some(spouse_id) = &person.married_to_id else {
                continue;
            };
            let Some(&spouse) = by_id.get(spouse_id) else {
                debug!(person = %person.id, spouse = %spouse_id, "unresolvable spouse id");
                continue;
            };
            let Some(key) = MarriageId::new(&person.id, spouse_id) else {
                debug!(person = %person.id, "married to themselves; skipping");
                continue;
            };
            builder.ensure(key, [slot, spouse], &people);
        }

        let MarriageBuilder {
            marriages,
            marriage_by_id,
            memberships,
            parent_of,
        } = builder;

        let people: Vec<Rc<Person>> = people.into_iter().map(Rc::new).collect();
        let marriages = marriages
            .into_iter()
            .map(|mut marriage| {
                marriage.year = marriage
                    .partners
                    .iter()
                    .filter_map(|id| by_id.get(id))
                    .find_map(|&slot| people[slot].year_of_marriage);
                Rc::new(marriage)
            })
            .collect();

        Ok(Self {
            people,
            by_id,
            marriages,
            marriage_by_id,
            memberships,
            parent_of,
        })
    }

    /// People in input order.
    pub fn people(&self) -> &[Rc<Person>] {
        &self.people
    }

    pub fn person(&self, id: &PersonId) -> Option<&Rc<Person>> {
        self.by_id.get(id).map(|&slot| &self.people[slot])
    }

    /// Marriages in discovery order.
    pub fn marriages(&self) -> &[Rc<Marriage>] {
        &self.marriages
    }

    pub fn marriage(&self, id: &MarriageId) -> Option<&Rc<Marriage>> {
        self.marriage_by_id.get(id).map(|&slot| &self.marriages[slot])
    }

    /// The marriages `id` belongs to, in discovery order.
    pub fn marriages_of<'a>(
        &'a self,
        id: &PersonId,
    ) -> impl Iterator<Item = &'a Rc<Marriage>> + use<'a> {
        self.by_id
            .get(id)
            .into_iter()
            .flat_map(move |&slot| self.memberships[slot].iter())
            .map(move |&marriage| &self.marriages[marriage])
    }

    /// Whether `id` is a partner in at least one marriage. The renderer draws
    /// such people beside their marriage nodes instead of on their own.
    pub fn is_spouse(&self, id: &PersonId) -> bool {
        self.by_id
            .get(id)
            .is_some_and(|&slot| !self.memberships[slot].is_empty())
    }

    /// The marriage `id` is attached to as a child.
    pub fn parent_marriage(&self, id: &PersonId) -> Option<&Rc<Marriage>> {
        let slot = *self.by_id.get(id)?;
        self.parent_of[slot].map(|marriage| &self.marriages[marriage])
    }

    /// People eligible as the tree root, in input order: neither `FatherID`
    /// nor `MotherID` resolves to someone in the snapshot.
    ///
    /// Half-parented people are left out of every marriage but are not root
    /// candidates either.
    pub fn root_candidates(&self) -> impl Iterator<Item = &Rc<Person>> {
        self.people.iter().filter(move |person| {
            let resolves = |parent: &Option<PersonId>| {
                parent.as_ref().is_some_and(|id| self.by_id.contains_key(id))
            };
            !resolves(&person.father_id) && !resolves(&person.mother_id)
        })
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}

/// Mutable state while marriages are being discovered.
struct MarriageBuilder {
    marriages: Vec<Marriage>,
    marriage_by_id: HashMap<MarriageId, usize>,
    memberships: Vec<Vec<usize>>,
    parent_of: Vec<Option<usize>>,
}

impl MarriageBuilder {
    fn new(people: usize) -> Self {
        Self {
            marriages: Vec::new(),
            marriage_by_id: HashMap::new(),
            memberships: vec![Vec::new(); people],
            parent_of: vec![None; people],
        }
    }

    /// Return the slot for `key`, creating the marriage and registering it on
    /// both partners the first time the pair is seen.
    fn ensure(&mut self, key: MarriageId, partners: [usize; 2], people: &[Person]) -> usize {
        if let Some(&existing) = self.marriage_by_id.get(&key) {
            return existing;
        }

        let slot = self.marriages.len();
        self.marriages.push(Marriage {
            id: key.clone(),
            partners: partners.map(|p| people[p].id.clone()),
            children: Vec::new(),
            year: None,
        });
        self.marriage_by_id.insert(key, slot);
        for partner in partners {
            self.memberships[partner].push(slot);
        }
        slot
    }
}
