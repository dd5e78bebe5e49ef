//! Grid layout engine

use indexmap::IndexMap;

use archgraph_core::{geometry::Point, model::Diagram};

use crate::layout::{
    Canvas,
    engines::{LayoutEngine, Placement},
};

/// Row-major grid with `ceil(sqrt(n))` columns.
pub struct Engine {
    canvas: Canvas,
}

impl Engine {
    pub fn new(canvas: Canvas) -> Self {
        Self { canvas }
    }

    /// Columns and rows for `count` elements.
    fn dimensions(count: usize) -> (usize, usize) {
        let columns = ((count as f64).sqrt().ceil() as usize).max(1);
        let rows = count.div_ceil(columns).max(1);
        (columns, rows)
    }
}

impl LayoutEngine for Engine {
    fn calculate(&self, diagram: &Diagram) -> Placement {
        let (columns, rows) = Self::dimensions(diagram.element_count());
        let x_spacing = self.canvas.usable_width() / columns as f32;
        let y_spacing = self.canvas.usable_height() / rows as f32;
        let margin = self.canvas.margin();

        let positions: IndexMap<_, _> = diagram
            .elements()
            .enumerate()
            .map(|(i, element)| {
                let column = (i % columns) as f32;
                let row = (i / columns) as f32;
                let point = Point::new(
                    margin + column * x_spacing + x_spacing / 2.0,
                    margin + row * y_spacing + y_spacing / 2.0,
                );
                (element.id(), point)
            })
            .collect();
        Placement::from_positions(positions)
    }
}
