//! Layered layout engine
//!
//! Rows by dependency depth. Levels come from Kahn's algorithm over the
//! relationship graph: elements without incoming relationships start at level
//! zero and every relationship pushes its target at least one level below its
//! source.
//!
//! Elements only reachable through a cycle are never dequeued and keep the
//! highest level relaxed into them so far (zero when nothing reached them).

use std::collections::{BTreeMap, HashMap, VecDeque};

use indexmap::IndexMap;
use log::debug;
use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};

use archgraph_core::{identifier::Id, model::Diagram};

use crate::layout::{
    Canvas,
    engines::{LayoutEngine, Placement},
    place_rows,
};

pub struct Engine {
    canvas: Canvas,
}

impl Engine {
    pub fn new(canvas: Canvas) -> Self {
        Self { canvas }
    }
}

fn relationship_graph(diagram: &Diagram) -> DiGraph<Id, ()> {
    let mut graph = DiGraph::new();
    let mut indices = HashMap::new();
    for element in diagram.elements() {
        indices.insert(element.id(), graph.add_node(element.id()));
    }
    for rel in diagram.relationships() {
        if let (Some(&source), Some(&target)) = (indices.get(&rel.source()), indices.get(&rel.target()))
        {
            graph.add_edge(source, target, ());
        }
    }
    graph
}

/// Computes the dependency level of every element, in element order.
pub fn dependency_levels(diagram: &Diagram) -> IndexMap<Id, usize> {
    let graph = relationship_graph(diagram);
    let mut levels = vec![0usize; graph.node_count()];
    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|idx| graph.edges_directed(idx, Direction::Incoming).count())
        .collect();

    let mut queue: VecDeque<NodeIndex> = graph
        .node_indices()
        .filter(|idx| in_degree[idx.index()] == 0)
        .collect();

    while let Some(current) = queue.pop_front() {
        let next_level = levels[current.index()] + 1;
        for edge in graph.edges_directed(current, Direction::Outgoing) {
            let target = edge.target().index();
            levels[target] = levels[target].max(next_level);
            in_degree[target] -= 1;
            if in_degree[target] == 0 {
                queue.push_back(edge.target());
            }
        }
    }

    let blocked = in_degree.iter().filter(|degree| **degree > 0).count();
    if blocked > 0 {
        debug!(elements = blocked; "Elements on cycles keep their partial level");
    }

    graph
        .node_indices()
        .map(|idx| (graph[idx], levels[idx.index()]))
        .collect()
}

impl LayoutEngine for Engine {
    fn calculate(&self, diagram: &Diagram) -> Placement {
        let mut rows: BTreeMap<usize, Vec<Id>> = BTreeMap::new();
        for (id, level) in dependency_levels(diagram) {
            rows.entry(level).or_default().push(id);
        }
        let rows: Vec<Vec<Id>> = rows.into_values().collect();
        Placement::from_positions(place_rows(&self.canvas, &rows))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use archgraph_core::model::{DiagramLevel, Element, ElementKind, RelationKind};

    use super::*;

    fn diagram(count: usize, edges: &[(usize, usize)]) -> (Diagram, Vec<Id>) {
        let mut diagram = Diagram::new(Id::new("layers"), "Layers", DiagramLevel::Component);
        let ids: Vec<Id> = (0..count)
            .map(|i| {
                diagram
                    .add_element(Element::new(ElementKind::Component, format!("c{i}")))
                    .unwrap()
            })
            .collect();
        for &(source, target) in edges {
            diagram
                .connect(ids[source], ids[target], RelationKind::DependsOn, "")
                .unwrap();
        }
        (diagram, ids)
    }

    #[test]
    fn test_longest_path_wins() {
        // 0 -> 1 -> 2 and 0 -> 2
        let (diagram, ids) = diagram(3, &[(0, 1), (1, 2), (0, 2)]);
        let levels = dependency_levels(&diagram);
        assert_eq!(levels[&ids[0]], 0);
        assert_eq!(levels[&ids[1]], 1);
        assert_eq!(levels[&ids[2]], 2);
    }

    #[test]
    fn test_cycle_without_entry_stays_at_zero() {
        let (diagram, ids) = diagram(3, &[(0, 1), (1, 0)]);
        let levels = dependency_levels(&diagram);
        assert_eq!(levels[&ids[0]], 0);
        assert_eq!(levels[&ids[1]], 0);
        assert_eq!(levels[&ids[2]], 0);
    }

    #[test]
    fn test_rows_follow_levels() {
        let (diagram, ids) = diagram(3, &[(0, 1), (1, 2)]);
        let positions = Engine::new(Canvas::default()).calculate(&diagram).positions;
        assert!(positions[&ids[0]].y() < positions[&ids[1]].y());
        assert!(positions[&ids[1]].y() < positions[&ids[2]].y());
    }

    /// Edges of a random DAG: only from lower to higher indices.
    fn dag() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
        (1usize..12).prop_flat_map(|count| {
            let edges = prop::collection::vec((0..count, 0..count), 0..30).prop_map(|pairs| {
                pairs
                    .into_iter()
                    .filter(|(a, b)| a != b)
                    .map(|(a, b)| (a.min(b), a.max(b)))
                    .collect::<Vec<_>>()
            });
            (Just(count), edges)
        })
    }

    proptest! {
        #[test]
        fn levels_increase_along_every_edge((count, edges) in dag()) {
            let (diagram, ids) = diagram(count, &edges);
            let levels = dependency_levels(&diagram);

            for &(source, target) in &edges {
                prop_assert!(levels[&ids[source]] < levels[&ids[target]]);
            }
            for (i, id) in ids.iter().enumerate() {
                if !edges.iter().any(|&(_, target)| target == i) {
                    prop_assert_eq!(levels[id], 0);
                }
            }
        }
    }
}
