//! Graph → tree normalization.
//!
//! The person/marriage graph can reconverge (cousin marriages, remarriage,
//! shared ancestry), but the layout needs a strict tree. Rather than sharing
//! node instances and tracking visits, every person is re-expanded from
//! scratch under each marriage that reaches them. Duplication is bounded by
//! marriage count and the output never has back-edges.

use std::collections::HashSet;
use std::rc::Rc;

use tracing::{info, warn};

use super::node::{MarriageNode, PersonNode, TreeNode};
use crate::config::{MarriageOrder, NormalizeConfig};
use crate::error::{FamilyTreeError, TreeWarning};
use crate::family::{FamilyIndex, KinshipGraph, Marriage, MarriageId};
use crate::person::{Person, PersonId};

/// Result of one normalization pass.
#[derive(Debug, Clone)]
pub struct FamilyTree {
    pub root: PersonNode,
    pub warnings: Vec<TreeWarning>,
    /// People appearing nowhere in the tree, in input order.
    pub unreachable: Vec<PersonId>,
}

impl FamilyTree {
    /// Every person node representing `id`, in pre-order.
    ///
    /// A person appears once per marriage that reaches them, so this is
    /// one-to-many.
    pub fn find_person(&self, id: &PersonId) -> Vec<&PersonNode> {
        let mut found = Vec::new();
        TreeNode::from(&self.root).walk(&mut |node| {
            if let TreeNode::Person(person) = node {
                if &person.person.id == id {
                    found.push(person);
                }
            }
        });
        found
    }

    /// Total node count, marriage nodes included.
    pub fn node_count(&self) -> usize {
        self.root.subtree_len()
    }
}

/// Convert the indexed graph into a single rooted tree.
///
/// Fails if the ancestry is cyclic or nobody is free of resolvable parents.
/// With several root candidates the first in input order wins and a
/// [`TreeWarning::AmbiguousRoot`] is recorded.
pub fn normalize(
    index: &FamilyIndex,
    config: &NormalizeConfig,
) -> Result<FamilyTree, FamilyTreeError> {
    KinshipGraph::from_index(index).check_acyclic()?;

    let mut candidates = index.root_candidates();
    let root = candidates.next().ok_or(FamilyTreeError::NoRootFound)?;
    let others: Vec<PersonId> = candidates.map(|p| p.id.clone()).collect();

    let mut warnings = Vec::new();
    if !others.is_empty() {
        warn!(
            root = %root.id,
            ignored = others.len(),
            "multiple root ancestors detected; using the first one"
        );
        warnings.push(TreeWarning::AmbiguousRoot {
            chosen: root.id.clone(),
            others,
        });
    }

    let expander = Expander {
        index,
        order: config.marriage_order,
    };
    let root = expander.person(root, None);
    let unreachable = unreachable(index, &root);

    info!(
        people = index.len(),
        marriages = index.marriages().len(),
        nodes = root.subtree_len(),
        unreachable = unreachable.len(),
        "normalized family tree"
    );

    Ok(FamilyTree {
        root,
        warnings,
        unreachable,
    })
}

/// Recursive expansion context. Holds no per-run state: every call builds
/// brand-new nodes.
struct Expander<'a> {
    index: &'a FamilyIndex,
    order: MarriageOrder,
}

impl Expander<'_> {
    /// `parent` is the marriage node this appearance hangs under, as
    /// `(id, key)`; `None` for the root.
    fn person(&self, person: &Rc<Person>, parent: Option<(&MarriageId, &str)>) -> PersonNode {
        let key = match parent {
            Some((_, parent_key)) => format!("{parent_key}/{}", person.id),
            None => person.id.to_string(),
        };

        let mut marriages: Vec<&Rc<Marriage>> = self.index.marriages_of(&person.id).collect();
        if self.order == MarriageOrder::Year {
            // Stable: undated last, ties keep discovery order.
            marriages.sort_by_key(|m| m.year.map_or((1, 0), |year| (0, year)));
        }

        PersonNode {
            person: Rc::clone(person),
            via: parent.map(|(id, _)| id.clone()),
            is_spouse: !marriages.is_empty(),
            children: marriages
                .into_iter()
                .filter_map(|marriage| self.marriage(marriage, &person.id, &key))
                .collect(),
            key,
        }
    }

    fn marriage(&self, marriage: &Rc<Marriage>, from: &PersonId, parent: &str) -> Option<MarriageNode> {
        let [a, b] = &marriage.partners;
        let partners = [
            Rc::clone(self.index.person(a)?),
            Rc::clone(self.index.person(b)?),
        ];

        let key = format!("{parent}/{}", marriage.id);

        Some(MarriageNode {
            marriage: Rc::clone(marriage),
            from: from.clone(),
            partners,
            children: marriage
                .children
                .iter()
                .filter_map(|child| self.index.person(child))
                .map(|child| self.person(child, Some((&marriage.id, key.as_str()))))
                .collect(),
            key,
        })
    }
}

/// People that appear neither as a person node nor as a marriage partner.
fn unreachable(index: &FamilyIndex, root: &PersonNode) -> Vec<PersonId> {
    let mut seen: HashSet<&PersonId> = HashSet::new();
    TreeNode::from(root).walk(&mut |node| match node {
        TreeNode::Person(person) => {
            seen.insert(&person.person.id);
        }
        TreeNode::Marriage(marriage) => {
            seen.extend(marriage.partners.iter().map(|p| &p.id));
        }
    });

    index
        .people()
        .iter()
        .filter(|p| !seen.contains(&p.id))
        .map(|p| p.id.clone())
        .collect()
}
