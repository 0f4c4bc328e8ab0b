//! Synthetic marriage units.
//!
//! Marriages never appear in the input. The index derives one for every
//! distinct pair of co-parents and for every explicit spouse link that
//! produced no children.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::person::PersonId;

/// Canonical, order-independent key for a partner pair.
///
/// `MarriageId::new(a, b) == MarriageId::new(b, a)`; the lower id is always
/// stored first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarriageId {
    low: PersonId,
    high: PersonId,
}

impl MarriageId {
    /// Build the key for a pair. Returns `None` if both ids are the same
    /// person, since a marriage needs two distinct partners.
    pub fn new(a: &PersonId, b: &PersonId) -> Option<Self> {
        match a.cmp(b) {
            std::cmp::Ordering::Less => Some(Self {
                low: a.clone(),
                high: b.clone(),
            }),
            std::cmp::Ordering::Greater => Some(Self {
                low: b.clone(),
                high: a.clone(),
            }),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// The two partner ids in canonical (sorted) order.
    pub fn pair(&self) -> (&PersonId, &PersonId) {
        (&self.low, &self.high)
    }

    pub fn involves(&self, id: &PersonId) -> bool {
        &self.low == id || &self.high == id
    }
}

impl fmt::Display for MarriageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FAM_{}_{}", self.low, self.high)
    }
}

impl Serialize for MarriageId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A partnership between exactly two people, with their shared children.
#[derive(Debug, Clone, PartialEq)]
pub struct Marriage {
    pub id: MarriageId,
    /// Partners in discovery orientation: `[father, mother]` when found
    /// through a child, `[person, spouse]` when found through `MarriedToID`.
    pub partners: [PersonId; 2],
    /// Children in input order.
    pub children: Vec<PersonId>,
    /// First `YearOfMarriage` recorded on either partner.
    pub year: Option<i32>,
}

impl Marriage {
    /// The partner that is not `id`, if `id` is one of the two.
    pub fn partner_of(&self, id: &PersonId) -> Option<&PersonId> {
        match &self.partners {
            [a, b] if a == id => Some(b),
            [a, b] if b == id => Some(a),
            _ => None,
        }
    }

    pub fn is_childless(&self) -> bool {
        self.children.is_empty()
    }
}
