//! Normalized tree nodes.
//!
//! Person nodes only ever have marriage nodes as children, and marriage nodes
//! only ever have person nodes as children. Every node is a fresh value;
//! identity is shared through the `Rc`s pointing back into the index.

use std::rc::Rc;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::family::{Marriage, MarriageId};
use crate::person::{Person, PersonId};

/// One appearance of a person in the tree.
#[derive(Debug, Clone)]
pub struct PersonNode {
    pub person: Rc<Person>,
    /// The marriage this appearance hangs under (`None` for the root).
    pub via: Option<MarriageId>,
    /// Path of ids from the root, unique per position in the tree.
    pub key: String,
    /// Partner in at least one marriage; the renderer draws such people
    /// beside their marriage nodes rather than at this node.
    pub is_spouse: bool,
    /// One node per marriage membership.
    pub children: Vec<MarriageNode>,
}

/// One appearance of a marriage in the tree.
#[derive(Debug, Clone)]
pub struct MarriageNode {
    pub marriage: Rc<Marriage>,
    /// The person whose node this marriage hangs under.
    pub from: PersonId,
    /// Path of ids from the root, unique per position in the tree.
    pub key: String,
    /// Both partners, by reference; they are not expanded as children.
    pub partners: [Rc<Person>; 2],
    /// The couple's children, re-expanded for this appearance.
    pub children: Vec<PersonNode>,
}

/// Borrowed view over either kind of node.
#[derive(Debug, Clone, Copy)]
pub enum TreeNode<'a> {
    Person(&'a PersonNode),
    Marriage(&'a MarriageNode),
}

impl PersonNode {
    /// Secondary key: `{person}` for the root, `{marriage key}/{person}` below it.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Number of nodes in this subtree, this node included.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(MarriageNode::subtree_len)
            .sum::<usize>()
    }
}

impl MarriageNode {
    /// Secondary key: `{person key}/{marriage}`.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn id(&self) -> &MarriageId {
        &self.marriage.id
    }

    pub fn subtree_len(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(PersonNode::subtree_len)
            .sum::<usize>()
    }
}

impl<'a> TreeNode<'a> {
    pub fn key(&self) -> &'a str {
        match *self {
            Self::Person(node) => node.key(),
            Self::Marriage(node) => node.key(),
        }
    }

    pub fn children(&self) -> Vec<TreeNode<'a>> {
        match *self {
            Self::Person(node) => node.children.iter().map(TreeNode::Marriage).collect(),
            Self::Marriage(node) => node.children.iter().map(TreeNode::Person).collect(),
        }
    }

    /// Visit this node and its descendants in pre-order.
    pub fn walk(self, visit: &mut impl FnMut(TreeNode<'a>)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}

impl<'a> From<&'a PersonNode> for TreeNode<'a> {
    fn from(node: &'a PersonNode) -> Self {
        Self::Person(node)
    }
}

// Serialized shapes follow what the renderer reads through `d3.hierarchy`:
// a `type` tag and a `children` array on every node.

impl Serialize for PersonNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PersonNode", 5)?;
        state.serialize_field("type", "person")?;
        state.serialize_field("key", self.key())?;
        state.serialize_field("person", &*self.person)?;
        state.serialize_field("isSpouse", &self.is_spouse)?;
        state.serialize_field("children", &self.children)?;
        state.end()
    }
}

impl Serialize for MarriageNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let partners: [&Person; 2] = [&self.partners[0], &self.partners[1]];
        let mut state = serializer.serialize_struct("MarriageNode", 6)?;
        state.serialize_field("type", "family")?;
        state.serialize_field("ID", &self.marriage.id)?;
        state.serialize_field("key", self.key())?;
        state.serialize_field("year", &self.marriage.year)?;
        state.serialize_field("partners", &partners)?;
        state.serialize_field("children", &self.children)?;
        state.end()
    }
}
