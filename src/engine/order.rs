//! Evaluation-order resolver over the provides graph
//!
//! Draws an edge provider → consumer whenever a consumer's formula references
//! a name in the provider's `provides` map, then produces a total order via
//! Kahn's algorithm. Ties among independent parts break by ascending
//! `sort_order` (then declaration index), so identical templates always
//! evaluate in the same sequence.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;

use crate::expr::referenced_variables;
use crate::model::{AssemblyPart, PartId};

/// The provides graph contains a cycle; no partial evaluation is attempted
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cyclic provides dependency among parts: {}", .parts.iter().map(|p| p.as_str()).collect::<Vec<_>>().join(" -> "))]
pub struct CycleError {
    pub parts: Vec<PartId>,
}

/// Deterministic per-part evaluation sequence plus the provider index used
/// to classify missing-binding failures
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationOrder {
    /// Indices into the assembly's part list, in evaluation order
    pub sequence: Vec<usize>,
    /// Provides name → indices of the parts that publish it
    pub providers: BTreeMap<String, Vec<usize>>,
}

/// Compute the evaluation order for an assembly's parts.
///
/// Provides names are matched by name alone. A part that provides a name
/// also bound in the environment (`width`, `panel_thickness`, a custom
/// parameter) shadows it: every formula referencing the name gains an edge
/// to that provider, and a provider referencing its own provides name is a
/// self-loop `CycleError`.
pub fn resolve(parts: &[AssemblyPart]) -> Result<EvaluationOrder, CycleError> {
    let mut providers: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (idx, part) in parts.iter().enumerate() {
        for name in part.provides.keys() {
            providers.entry(name.clone()).or_default().push(idx);
        }
    }

    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let nodes: Vec<NodeIndex> = (0..parts.len()).map(|idx| graph.add_node(idx)).collect();

    for (consumer, part) in parts.iter().enumerate() {
        for text in part.formula_texts() {
            for name in referenced_variables(text) {
                if let Some(sources) = providers.get(&name) {
                    for &provider in sources {
                        if !graph.contains_edge(nodes[provider], nodes[consumer]) {
                            graph.add_edge(nodes[provider], nodes[consumer], ());
                        }
                    }
                }
            }
        }
    }

    // Kahn's algorithm with a min-heap keyed by (sort_order, index) so
    // independent parts always come out in the same order
    let mut in_degree: Vec<usize> = nodes
        .iter()
        .map(|&n| graph.neighbors_directed(n, petgraph::Direction::Incoming).count())
        .collect();

    let mut ready: BinaryHeap<Reverse<(i32, usize)>> = BinaryHeap::new();
    for (idx, &degree) in in_degree.iter().enumerate() {
        if degree == 0 {
            ready.push(Reverse((parts[idx].sort_order, idx)));
        }
    }

    let mut sequence = Vec::with_capacity(parts.len());
    while let Some(Reverse((_, idx))) = ready.pop() {
        sequence.push(idx);
        for neighbor in graph.neighbors_directed(nodes[idx], petgraph::Direction::Outgoing) {
            let n = graph[neighbor];
            in_degree[n] -= 1;
            if in_degree[n] == 0 {
                ready.push(Reverse((parts[n].sort_order, n)));
            }
        }
    }

    if sequence.len() < parts.len() {
        return Err(CycleError {
            parts: cycle_members(&graph, parts),
        });
    }

    Ok(EvaluationOrder {
        sequence,
        providers,
    })
}

/// Part ids participating in dependency cycles, via strongly connected
/// components (plus self-loops, which tarjan reports as singletons)
fn cycle_members(graph: &DiGraph<usize, ()>, parts: &[AssemblyPart]) -> Vec<PartId> {
    let mut members = Vec::new();
    for component in tarjan_scc(graph) {
        let cyclic = component.len() > 1
            || component
                .first()
                .is_some_and(|&n| graph.contains_edge(n, n));
        if cyclic {
            for node in component {
                members.push(parts[graph[node]].id.clone());
            }
        }
    }
    members.sort();
    members
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PartGeometry, PartRole};

    fn part(id: &str, sort_order: i32) -> AssemblyPart {
        AssemblyPart::new(id, PartRole::Shelf, id).with_sort_order(sort_order)
    }

    fn parametric(length: &str) -> PartGeometry {
        PartGeometry::Parametric {
            length: length.to_string(),
            width: "100".to_string(),
            x: "0".to_string(),
            y: "0".to_string(),
            z: "0".to_string(),
        }
    }

    #[test]
    fn test_independent_parts_order_by_sort_order() {
        let parts = vec![part("c", 3), part("a", 1), part("b", 2)];
        let order = resolve(&parts).unwrap();
        assert_eq!(order.sequence, vec![1, 2, 0]);
    }

    #[test]
    fn test_provider_resolves_before_consumer() {
        // "consumer" has the lower sort order but depends on "provider"
        let parts = vec![
            part("consumer", 0).with_geometry(parametric("shelf_top - 10")),
            part("provider", 9).with_provides("shelf_top", "350"),
        ];
        let order = resolve(&parts).unwrap();
        assert_eq!(order.sequence, vec![1, 0]);
    }

    #[test]
    fn test_cycle_detected() {
        let parts = vec![
            part("a", 0)
                .with_geometry(parametric("from_b"))
                .with_provides("from_a", "1"),
            part("b", 1)
                .with_geometry(parametric("from_a"))
                .with_provides("from_b", "1"),
        ];
        let err = resolve(&parts).unwrap_err();
        assert_eq!(
            err.parts,
            vec![PartId::new("a"), PartId::new("b")]
        );
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let parts = vec![part("a", 0)
            .with_geometry(parametric("own"))
            .with_provides("own", "1")];
        let err = resolve(&parts).unwrap_err();
        assert_eq!(err.parts, vec![PartId::new("a")]);
    }

    #[test]
    fn test_condition_reference_creates_edge() {
        let parts = vec![
            part("dependent", 0).with_condition("door_count > 0"),
            part("source", 1).with_provides("door_count", "2"),
        ];
        let order = resolve(&parts).unwrap();
        assert_eq!(order.sequence, vec![1, 0]);
    }

    #[test]
    fn test_provides_shadowing_a_global_name_creates_edges() {
        // "width" is normally an environment binding; a part providing it
        // shadows the global for every consumer
        let parts = vec![
            part("consumer", 0).with_geometry(parametric("width - 36")),
            part("effective-width", 9).with_provides("width", "580"),
        ];
        let order = resolve(&parts).unwrap();
        assert_eq!(order.sequence, vec![1, 0]);
    }

    #[test]
    fn test_shadowing_provider_referencing_its_own_name_is_a_cycle() {
        let parts = vec![part("w", 0)
            .with_geometry(parametric("width"))
            .with_provides("width", "600")];
        let err = resolve(&parts).unwrap_err();
        assert_eq!(err.parts, vec![PartId::new("w")]);
    }

    #[test]
    fn test_providers_index() {
        let parts = vec![part("a", 0).with_provides("shelf_top", "1")];
        let order = resolve(&parts).unwrap();
        assert_eq!(order.providers.get("shelf_top"), Some(&vec![0]));
    }
}
