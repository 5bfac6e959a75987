//! Multi-relation directed graph over type ids.

use crate::error::{RefdocError, Result};
use crate::model::TypeId;
use refdoc_api::RelationKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

type Adjacency = BTreeMap<TypeId, BTreeSet<TypeId>>;

/// Wire shape: relation name → source id (as a string) → target ids.
type GraphWire = BTreeMap<String, BTreeMap<String, Vec<TypeId>>>;

/// Edges grouped by relation kind. Every edge is stored together with its
/// inverse, so reverse lookups are plain map reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "GraphWire", try_from = "GraphWire")]
pub struct RelationshipGraph {
    relations: BTreeMap<RelationKind, Adjacency>,
}

impl RelationshipGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, from: TypeId, kind: RelationKind, to: TypeId) -> bool {
        self.relations
            .entry(kind)
            .or_default()
            .entry(from)
            .or_default()
            .insert(to)
    }

    /// Adds `from -[kind]-> to` and `to -[kind.inverse()]-> from`.
    pub fn add_edge(&mut self, from: TypeId, kind: RelationKind, to: TypeId) {
        self.insert(from, kind, to);
        self.insert(to, kind.inverse(), from);
    }

    pub fn has_edge(&self, from: TypeId, kind: RelationKind, to: TypeId) -> bool {
        self.relations
            .get(&kind)
            .and_then(|adj| adj.get(&from))
            .is_some_and(|targets| targets.contains(&to))
    }

    /// Targets of `kind` edges leaving `id`, ascending.
    pub fn relation(&self, kind: RelationKind, id: TypeId) -> Vec<TypeId> {
        self.relations
            .get(&kind)
            .and_then(|adj| adj.get(&id))
            .map(|targets| targets.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Every non-empty relation leaving `id`.
    pub fn relations_of(&self, id: TypeId) -> Vec<(RelationKind, Vec<TypeId>)> {
        self.relations
            .iter()
            .filter_map(|(kind, adj)| {
                adj.get(&id)
                    .filter(|targets| !targets.is_empty())
                    .map(|targets| (*kind, targets.iter().copied().collect()))
            })
            .collect()
    }

    pub fn triples(&self) -> Vec<(RelationKind, TypeId, TypeId)> {
        let mut out = Vec::new();
        for (kind, adj) in &self.relations {
            for (from, targets) in adj {
                out.extend(targets.iter().map(|to| (*kind, *from, *to)));
            }
        }
        out
    }

    pub fn counts(&self) -> BTreeMap<RelationKind, usize> {
        self.relations
            .iter()
            .map(|(kind, adj)| (*kind, adj.values().map(BTreeSet::len).sum()))
            .filter(|(_, count)| *count > 0)
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.counts().values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.edge_count() == 0
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl From<RelationshipGraph> for GraphWire {
    fn from(graph: RelationshipGraph) -> Self {
        graph
            .relations
            .into_iter()
            .map(|(kind, adj)| {
                let adj = adj
                    .into_iter()
                    .map(|(from, targets)| (from.to_string(), targets.into_iter().collect()))
                    .collect();
                (kind.wire_name().to_string(), adj)
            })
            .collect()
    }
}

impl TryFrom<GraphWire> for RelationshipGraph {
    type Error = RefdocError;

    fn try_from(wire: GraphWire) -> Result<Self> {
        let mut graph = RelationshipGraph::new();
        for (name, adj) in wire {
            let kind: RelationKind = name.parse().map_err(RefdocError::Decode)?;
            for (from, targets) in adj {
                let from: TypeId = from.parse().map_err(|_| {
                    RefdocError::Decode(format!("invalid source id {:?} in {}", from, name))
                })?;
                for to in targets {
                    graph.insert(from, kind, to);
                }
            }
        }
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn full_graph() -> RelationshipGraph {
        let mut graph = RelationshipGraph::new();
        for (i, kind) in RelationKind::ALL.iter().enumerate().step_by(2) {
            graph.add_edge(i as TypeId, *kind, (i + 100) as TypeId);
        }
        graph
    }

    #[test]
    fn test_edges_are_symmetric() {
        let graph = full_graph();
        for (kind, from, to) in graph.triples() {
            assert!(graph.has_edge(to, kind.inverse(), from), "{} {} {}", from, kind, to);
        }
        assert_eq!(graph.counts().len(), RelationKind::ALL.len());
    }

    #[test]
    fn test_wire_round_trip_keeps_every_triple() {
        let graph = full_graph();
        let text = graph.to_json().unwrap();
        let back = RelationshipGraph::from_json(&text).unwrap();
        assert_eq!(back.triples(), graph.triples());
        assert_eq!(back, graph);
    }

    #[test]
    fn test_wire_uses_string_source_ids() {
        let mut graph = RelationshipGraph::new();
        graph.add_edge(1, RelationKind::SuperClass, 2);
        let value: serde_json::Value = serde_json::from_str(&graph.to_json().unwrap()).unwrap();
        assert_eq!(value["SUPER_CLASS"]["1"], serde_json::json!([2]));
        assert_eq!(value["SUBCLASS"]["2"], serde_json::json!([1]));
    }

    #[test]
    fn test_bad_wire_is_rejected() {
        assert!(RelationshipGraph::from_json(r#"{"SIDEWAYS": {"1": [2]}}"#).is_err());
        assert!(RelationshipGraph::from_json(r#"{"INHERITS": {"x": [2]}}"#).is_err());
    }

    #[test]
    fn test_reverse_lookup() {
        let mut graph = RelationshipGraph::new();
        graph.add_edge(5, RelationKind::FieldType, 3);
        graph.add_edge(6, RelationKind::FieldType, 3);
        assert_eq!(graph.relation(RelationKind::FieldTypeOf, 3), vec![5, 6]);
        assert_eq!(
            graph.relations_of(3),
            vec![(RelationKind::FieldTypeOf, vec![5, 6])]
        );
        assert!(graph.relation(RelationKind::Inherits, 3).is_empty());
    }
}
