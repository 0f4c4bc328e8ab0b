//! Pre-order arena over a normalized tree.
//!
//! Slot `0` is always the root. The arena is what layout, hit testing and
//! the JS surface index into; the recursive [`PersonNode`] stays the
//! serialization shape.

use std::collections::HashMap;

use super::node::{MarriageNode, PersonNode};
use crate::family::MarriageId;
use crate::person::PersonId;

/// What a slot represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotKind {
    Person { id: PersonId, is_spouse: bool },
    Marriage { id: MarriageId, partners: [PersonId; 2] },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlatNode {
    pub kind: SlotKind,
    pub key: String,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// Root is depth 0; marriage nodes count as a level.
    pub depth: u32,
}

#[derive(Debug, Clone, Default)]
pub struct FlatTree {
    nodes: Vec<FlatNode>,
    person_slots: HashMap<PersonId, Vec<usize>>,
    partner_slots: HashMap<PersonId, Vec<usize>>,
}

impl FlatTree {
    pub fn from_root(root: &PersonNode) -> Self {
        let mut tree = Self {
            nodes: Vec::with_capacity(root.subtree_len()),
            ..Default::default()
        };
        tree.push_person(root, None, 0);
        tree
    }

    fn push_person(&mut self, node: &PersonNode, parent: Option<usize>, depth: u32) -> usize {
        let slot = self.push(
            SlotKind::Person {
                id: node.person.id.clone(),
                is_spouse: node.is_spouse,
            },
            node.key().to_owned(),
            parent,
            depth,
        );
        self.person_slots
            .entry(node.person.id.clone())
            .or_default()
            .push(slot);

        for marriage in &node.children {
            let child = self.push_marriage(marriage, slot, depth + 1);
            self.nodes[slot].children.push(child);
        }
        slot
    }

    fn push_marriage(&mut self, node: &MarriageNode, parent: usize, depth: u32) -> usize {
        let partners = [node.partners[0].id.clone(), node.partners[1].id.clone()];
        for partner in &partners {
            self.partner_slots
                .entry(partner.clone())
                .or_default()
                .push(self.nodes.len());
        }
        let slot = self.push(
            SlotKind::Marriage {
                id: node.id().clone(),
                partners,
            },
            node.key().to_owned(),
            Some(parent),
            depth,
        );

        for person in &node.children {
            let child = self.push_person(person, Some(slot), depth + 1);
            self.nodes[slot].children.push(child);
        }
        slot
    }

    fn push(&mut self, kind: SlotKind, key: String, parent: Option<usize>, depth: u32) -> usize {
        let slot = self.nodes.len();
        self.nodes.push(FlatNode {
            kind,
            key,
            parent,
            children: Vec::new(),
            depth,
        });
        slot
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, slot: usize) -> Option<&FlatNode> {
        self.nodes.get(slot)
    }

    pub fn nodes(&self) -> &[FlatNode] {
        &self.nodes
    }

    /// Person-node slots for `id`, in pre-order. Empty for people who only
    /// appear as married-in partners.
    pub fn slots_for_person(&self, id: &PersonId) -> &[usize] {
        self.person_slots.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Marriage-node slots where `id` is one of the partners.
    pub fn marriage_slots_for_partner(&self, id: &PersonId) -> &[usize] {
        self.partner_slots.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First place `id` shows up: their own node if they have one, otherwise
    /// the first marriage they are drawn beside.
    pub fn first_slot_for_person(&self, id: &PersonId) -> Option<usize> {
        self.slots_for_person(id)
            .first()
            .or_else(|| self.marriage_slots_for_partner(id).first())
            .copied()
    }

    /// Directed parent → child pairs in pre-order.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        self.nodes
            .iter()
            .enumerate()
            .flat_map(|(parent, node)| node.children.iter().map(move |&child| (parent, child)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::person::PersonRecord;
    use crate::test_support::flat;

    fn id(s: &str) -> PersonId {
        PersonId::new(s)
    }

    #[test]
    fn test_pre_order_slots() {
        let flat = flat(vec![
            PersonRecord::new("P1"),
            PersonRecord::new("P2"),
            PersonRecord::new("C1").child_of("P1", "P2"),
            PersonRecord::new("C2").child_of("P1", "P2"),
        ]);

        assert_eq!(flat.len(), 4);
        assert_eq!(flat.node(0).unwrap().parent, None);
        assert_eq!(flat.node(0).unwrap().children, vec![1]);
        assert_eq!(flat.node(1).unwrap().children, vec![2, 3]);
        assert_eq!(flat.node(3).unwrap().depth, 2);
        assert_eq!(flat.edges(), vec![(0, 1), (1, 2), (1, 3)]);
        assert_eq!(flat.slots_for_person(&id("C2")), &[3]);
        assert!(matches!(
            flat.node(1).unwrap().kind,
            SlotKind::Marriage { .. }
        ));
    }

    #[test]
    fn test_married_in_partner_lookup() {
        let flat = flat(vec![
            PersonRecord::new("P1"),
            PersonRecord::new("P2"),
            PersonRecord::new("C1").child_of("P1", "P2"),
        ]);

        assert!(flat.slots_for_person(&id("P2")).is_empty());
        assert_eq!(flat.marriage_slots_for_partner(&id("P2")), &[1]);
        assert_eq!(flat.first_slot_for_person(&id("P2")), Some(1));
        assert_eq!(flat.first_slot_for_person(&id("P1")), Some(0));
        assert_eq!(flat.first_slot_for_person(&id("NOBODY")), None);
    }

    #[test]
    fn test_every_non_root_slot_has_one_parent() {
        let flat = flat(vec![
            PersonRecord::new("G1"),
            PersonRecord::new("G2"),
            PersonRecord::new("A").child_of("G1", "G2"),
            PersonRecord::new("B").child_of("G1", "G2"),
            PersonRecord::new("X").child_of("A", "B"),
            PersonRecord::new("Y").child_of("A", "B"),
        ]);

        let mut incoming = vec![0usize; flat.len()];
        for (_, child) in flat.edges() {
            incoming[child] += 1;
        }
        assert_eq!(incoming[0], 0);
        assert!(incoming[1..].iter().all(|&n| n == 1));
        assert_eq!(flat.slots_for_person(&id("X")).len(), 2);
        for (slot, node) in flat.nodes().iter().enumerate() {
            if let Some(parent) = node.parent {
                assert!(flat.node(parent).unwrap().children.contains(&slot));
            }
        }
    }
}
