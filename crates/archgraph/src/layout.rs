//! Element positioning.
//!
//! Every strategy in [`LayoutStrategy`](crate::config::LayoutStrategy) is
//! implemented by an engine behind the [`LayoutEngine`] trait. Engines only
//! compute a [`Placement`]; the optimizer writes it back to the diagram.

mod engines;

pub use engines::{EngineBuilder, LayoutEngine, Placement, Simulation, dependency_levels};

use indexmap::IndexMap;

use archgraph_core::{
    geometry::{Point, Size},
    identifier::Id,
};

/// The drawable area shared by every engine.
///
/// Positions are element centers and always stay inside the margins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    size: Size,
    margin: f32,
    element: Size,
}

impl Canvas {
    pub fn new(size: Size, margin: f32, element: Size) -> Self {
        Self {
            size,
            margin,
            element,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn element_size(&self) -> Size {
        self.element
    }

    /// Width between the left and right margins.
    pub fn usable_width(&self) -> f32 {
        (self.size.width() - 2.0 * self.margin).max(0.0)
    }

    /// Height between the top and bottom margins.
    pub fn usable_height(&self) -> f32 {
        (self.size.height() - 2.0 * self.margin).max(0.0)
    }

    pub fn center(&self) -> Point {
        Point::new(self.size.width() / 2.0, self.size.height() / 2.0)
    }

    /// The top-left corner of the area inside the margins.
    pub fn min_point(&self) -> Point {
        Point::new(self.margin, self.margin)
    }

    /// The bottom-right corner of the area inside the margins.
    pub fn max_point(&self) -> Point {
        Point::new(
            (self.size.width() - self.margin).max(self.margin),
            (self.size.height() - self.margin).max(self.margin),
        )
    }

    /// Where an element without any computed position is drawn.
    pub fn default_position(&self) -> Point {
        Point::new(
            self.margin + self.element.width() / 2.0,
            self.margin + self.element.height() / 2.0,
        )
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(Size::new(1200.0, 800.0), 50.0, Size::new(120.0, 80.0))
    }
}

/// Places `rows` in horizontal bands of equal height, top to bottom.
///
/// Each row is spread evenly across the usable width, and each element sits
/// in the middle of its slot.
fn place_rows(canvas: &Canvas, rows: &[Vec<Id>]) -> IndexMap<Id, Point> {
    let mut positions = IndexMap::new();
    if rows.is_empty() {
        return positions;
    }

    let y_spacing = canvas.usable_height() / rows.len() as f32;
    for (rank, row) in rows.iter().enumerate() {
        let y = canvas.margin() + rank as f32 * y_spacing + y_spacing / 2.0;
        let x_spacing = canvas.usable_width() / row.len().max(1) as f32;
        for (i, id) in row.iter().enumerate() {
            let x = canvas.margin() + i as f32 * x_spacing + x_spacing / 2.0;
            positions.insert(*id, Point::new(x, y));
        }
    }
    positions
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    #[test]
    fn test_canvas_bounds() {
        let canvas = Canvas::default();
        assert_eq!(canvas.usable_width(), 1100.0);
        assert_eq!(canvas.usable_height(), 700.0);
        assert_eq!(canvas.max_point(), Point::new(1150.0, 750.0));
        assert_eq!(canvas.default_position(), Point::new(110.0, 90.0));
    }

    #[test]
    fn test_place_rows_centers_slots() {
        let canvas = Canvas::default();
        let rows = vec![vec![Id::new("a")], vec![Id::new("b"), Id::new("c")]];
        let positions = place_rows(&canvas, &rows);

        let a = positions[&Id::new("a")];
        assert!(approx_eq!(f32, a.x(), 600.0));
        assert!(approx_eq!(f32, a.y(), 225.0));

        let c = positions[&Id::new("c")];
        assert!(approx_eq!(f32, c.x(), 875.0));
        assert!(approx_eq!(f32, c.y(), 575.0));
    }
}
