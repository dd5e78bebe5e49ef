//! Hierarchical layout engine
//!
//! Rows by element kind: persons on top, then systems, then containers and
//! finally components. Only kinds present in the diagram get a row.

use std::collections::BTreeMap;

use archgraph_core::{
    identifier::Id,
    model::{Diagram, ElementKind},
};

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

    /// The row an element kind belongs to.
    fn level(kind: ElementKind) -> usize {
        match kind {
            ElementKind::Person => 0,
            ElementKind::System | ElementKind::ExternalSystem => 1,
            ElementKind::Container | ElementKind::Database | ElementKind::Queue => 2,
            ElementKind::Component | ElementKind::FileSystem => 3,
        }
    }
}

impl LayoutEngine for Engine {
    fn calculate(&self, diagram: &Diagram) -> Placement {
        let mut levels: BTreeMap<usize, Vec<Id>> = BTreeMap::new();
        for element in diagram.elements() {
            levels
                .entry(Self::level(element.kind()))
                .or_default()
                .push(element.id());
        }
        let rows: Vec<Vec<Id>> = levels.into_values().collect();
        Placement::from_positions(place_rows(&self.canvas, &rows))
    }
}
