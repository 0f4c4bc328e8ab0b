//! Kinship graph used to validate ancestry before normalization.
//!
//! The graph stores persons as nodes and a parent → child edge for every
//! child attached under a marriage (one edge per partner). These are exactly
//! the edges the normalizer follows, so the normalizer terminates iff this
//! graph is acyclic.

use petgraph::Directed;
use petgraph::algo::toposort;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use std::collections::HashMap;

use super::index::FamilyIndex;
use super::marriage::MarriageId;
use crate::error::FamilyTreeError;
use crate::person::PersonId;

/// Directed parent → child graph over one snapshot.
pub struct KinshipGraph {
    /// Nodes store the person id; edges store the marriage the child came through.
    graph: StableGraph<PersonId, MarriageId, Directed>,
}

impl KinshipGraph {
    /// Build the graph from an index.
    pub fn from_index(index: &FamilyIndex) -> Self {
        let edge_capacity = index
            .marriages()
            .iter()
            .map(|m| m.children.len() * 2)
            .sum();
        let mut graph = StableGraph::with_capacity(index.len(), edge_capacity);
        let mut person_to_index: HashMap<PersonId, NodeIndex> =
            HashMap::with_capacity(index.len());

        for person in index.people() {
            let node = graph.add_node(person.id.clone());
            person_to_index.insert(person.id.clone(), node);
        }

        for marriage in index.marriages() {
            for partner in &marriage.partners {
                let Some(&parent) = person_to_index.get(partner) else {
                    continue;
                };
                for child in &marriage.children {
                    if let Some(&child) = person_to_index.get(child) {
                        graph.add_edge(parent, child, marriage.id.clone());
                    }
                }
            }
        }

        Self { graph }
    }

    /// Get the number of persons.
    #[cfg(test)]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the number of parent → child edges.
    #[cfg(test)]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Children of a person across all of their marriages.
    #[cfg(test)]
    pub fn children(&self, id: &PersonId) -> Vec<&PersonId> {
        self.graph
            .node_indices()
            .find(|&index| self.graph[index] == *id)
            .map(|index| {
                let mut children: Vec<_> = self
                    .graph
                    .neighbors(index)
                    .filter_map(|n| self.graph.node_weight(n))
                    .collect();
                // petgraph yields neighbors newest-first
                children.reverse();
                children
            })
            .unwrap_or_default()
    }

    /// Reject snapshots in which someone is their own ancestor.
    pub fn check_acyclic(&self) -> Result<(), FamilyTreeError> {
        toposort(&self.graph, None).map(|_| ()).map_err(|cycle| {
            let person = self.graph[cycle.node_id()].clone();
            FamilyTreeError::AncestryCycle { person }
        })
    }
}
