//! Resource graph builder and sorter using petgraph.

use std::collections::{BTreeSet, HashMap};

use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use tracing::debug;

use skyforge_core::Architecture;

use crate::error::{Error, Result};

/// Which relation produced an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    Containment,
    Dependency,
}

/// Directed graph over an architecture's resources.
///
/// Edges point from a resource to the resources that must come after it:
/// parent to child, and dependency to dependent.
#[derive(Debug)]
pub struct ResourceGraph {
    graph: DiGraph<String, Relation>,
    id_to_node: HashMap<String, NodeIndex>,
}

impl ResourceGraph {
    /// Build the graph from an architecture's relations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownResource`] if a containment or dependency
    /// entry references an id with no resource behind it.
    pub fn from_architecture(architecture: &Architecture) -> Result<Self> {
        let mut graph = DiGraph::new();
        let mut id_to_node = HashMap::with_capacity(architecture.resources.len());

        for resource in &architecture.resources {
            let index = graph.add_node(resource.id.clone());
            id_to_node.insert(resource.id.clone(), index);
        }

        let resolve = |id: &str, id_to_node: &HashMap<String, NodeIndex>| -> Result<NodeIndex> {
            id_to_node
                .get(id)
                .copied()
                .ok_or_else(|| Error::UnknownResource { id: id.to_string() })
        };

        for (parent, children) in &architecture.containments {
            let parent_index = resolve(parent, &id_to_node)?;
            for child in children {
                let child_index = resolve(child, &id_to_node)?;
                graph.add_edge(parent_index, child_index, Relation::Containment);
            }
        }

        for (dependent, dependencies) in &architecture.dependencies {
            let dependent_index = resolve(dependent, &id_to_node)?;
            for dependency in dependencies {
                let dependency_index = resolve(dependency, &id_to_node)?;
                graph.add_edge(dependency_index, dependent_index, Relation::Dependency);
            }
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "resource graph built"
        );
        Ok(Self { graph, id_to_node })
    }

    /// Whether the combined relation has cycles.
    #[must_use]
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Produce the total order.
    ///
    /// Kahn's algorithm with an ordered ready-set: among resources with no
    /// remaining predecessors, the smallest id goes first. petgraph's own
    /// toposort is not used here because its tie-breaking follows insertion
    /// order rather than id order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CycleDetected`] carrying the ids of one
    /// strongly-connected component when the relation is cyclic.
    pub fn sort(&self) -> Result<Vec<String>> {
        if self.has_cycles() {
            return Err(Error::CycleDetected {
                members: self.cycle_members(),
            });
        }

        let mut in_degree: HashMap<NodeIndex, usize> = self
            .id_to_node
            .values()
            .map(|&index| {
                (
                    index,
                    self.graph
                        .neighbors_directed(index, Direction::Incoming)
                        .count(),
                )
            })
            .collect();

        let mut ready: BTreeSet<String> = in_degree
            .iter()
            .filter(|&(_, &degree)| degree == 0)
            .map(|(&index, _)| self.graph[index].clone())
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(id) = ready.pop_first() {
            let index = self.id_to_node[&id];
            order.push(id);
            for successor in self.graph.neighbors_directed(index, Direction::Outgoing) {
                let degree = in_degree
                    .get_mut(&successor)
                    .map(|d| {
                        *d = d.saturating_sub(1);
                        *d
                    })
                    .unwrap_or(0);
                if degree == 0 {
                    ready.insert(self.graph[successor].clone());
                }
            }
        }

        debug!(resources = order.len(), "topological order produced");
        Ok(order)
    }

    /// Ids of one cyclic strongly-connected component, sorted ascending.
    fn cycle_members(&self) -> Vec<String> {
        for component in tarjan_scc(&self.graph) {
            let cyclic = component.len() > 1
                || component
                    .first()
                    .is_some_and(|&n| self.graph.find_edge(n, n).is_some());
            if cyclic {
                let mut members: Vec<String> =
                    component.iter().map(|&n| self.graph[n].clone()).collect();
                members.sort();
                return members;
            }
        }
        Vec::new()
    }
}
