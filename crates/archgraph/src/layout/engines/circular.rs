//! Circular layout engine

use std::f32::consts::TAU;

use indexmap::IndexMap;

use archgraph_core::{geometry::Point, model::Diagram};

use crate::layout::{
    Canvas,
    engines::{LayoutEngine, Placement},
};

/// Places every element evenly around a single circle centered on the canvas.
pub struct Engine {
    canvas: Canvas,
}

impl Engine {
    pub fn new(canvas: Canvas) -> Self {
        Self { canvas }
    }

    /// Radius that keeps a whole element inside the margins.
    fn radius(&self) -> f32 {
        let center = self.canvas.center();
        (center.x().min(center.y())
            - self.canvas.margin()
            - self.canvas.element_size().width() / 2.0)
            .max(0.0)
    }
}

impl LayoutEngine for Engine {
    fn calculate(&self, diagram: &Diagram) -> Placement {
        let count = diagram.element_count();
        if count == 0 {
            return Placement::default();
        }

        let center = self.canvas.center();
        let radius = self.radius();
        let angle_step = TAU / count as f32;

        let positions: IndexMap<_, _> = diagram
            .elements()
            .enumerate()
            .map(|(i, element)| {
                let angle = i as f32 * angle_step;
                let offset = Point::new(angle.cos(), angle.sin()).scale(radius);
                (element.id(), center.add_point(offset))
            })
            .collect();
        Placement::from_positions(positions)
    }
}
