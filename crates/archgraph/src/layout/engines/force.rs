//! Force-directed layout engine
//!
//! This module implements a force-directed graph layout algorithm: every pair
//! of elements repels, every relationship pulls its endpoints together, and
//! positions move by a fraction of the net force until the forces settle.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, info, trace};
use rand::{
    SeedableRng,
    distr::{Distribution, Uniform},
    rngs::StdRng,
};

use archgraph_core::{geometry::Point, identifier::Id, model::Diagram};

use crate::layout::{
    Canvas,
    engines::{LayoutEngine, Placement, Simulation},
};

/// Added to every distance so coincident elements never divide by zero.
const DISTANCE_EPSILON: f32 = 0.01;
/// Maximum random offset applied to the initial grid positions.
const JITTER: f32 = 20.0;

/// Force layout engine
///
/// Repulsion between two elements is `min_distance / d²`; attraction along a
/// relationship is `d / min_distance`. Each iteration moves every element by
/// `learning_rate` times its net force, clamped to the canvas margins. The
/// simulation stops once the largest single-axis force is below `threshold`.
pub struct Engine {
    canvas: Canvas,
    // Simulation parameters
    iterations: usize,
    min_distance: f32,
    threshold: f32,
    learning_rate: f32,
    seed: u64,
}

impl Engine {
    /// Create a new force layout engine
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            iterations: 100,
            min_distance: 100.0,
            threshold: 0.1,
            learning_rate: 0.1,
            seed: 0x5eed,
        }
    }

    /// Set the maximum number of iterations for the force simulation
    pub fn set_iterations(&mut self, iterations: usize) -> &mut Self {
        self.iterations = iterations;
        self
    }

    /// Set the distance constant scaling both forces
    pub fn set_min_distance(&mut self, distance: f32) -> &mut Self {
        self.min_distance = distance;
        self
    }

    /// Set the convergence threshold
    pub fn set_threshold(&mut self, threshold: f32) -> &mut Self {
        self.threshold = threshold;
        self
    }

    /// Set the fraction of the net force applied per iteration
    pub fn set_learning_rate(&mut self, rate: f32) -> &mut Self {
        self.learning_rate = rate;
        self
    }

    /// Set the seed of the initial position jitter
    #[allow(dead_code)]
    pub fn set_seed(&mut self, seed: u64) -> &mut Self {
        self.seed = seed;
        self
    }

    /// Initial positions: existing ones are kept, the rest start on a
    /// jittered grid.
    fn initialize_positions(&self, diagram: &Diagram) -> Vec<Point> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let jitter = Uniform::new(-JITTER, JITTER).ok();
        let mut offset = || jitter.as_ref().map_or(0.0, |range| range.sample(&mut rng));

        let grid_size = ((diagram.element_count() as f32).sqrt().ceil() as usize).max(1);
        let cell_size = self.min_distance * 1.5;
        let origin = self.canvas.default_position();

        diagram
            .elements()
            .enumerate()
            .map(|(i, element)| {
                if let Some(position) = element.position() {
                    return position;
                }
                let row = i / grid_size;
                let col = i % grid_size;
                let base = Point::new(col as f32 * cell_size, row as f32 * cell_size);
                let jitter = Point::new(offset(), offset());
                origin
                    .add_point(base)
                    .add_point(jitter)
                    .clamp(self.canvas.min_point(), self.canvas.max_point())
            })
            .collect()
    }

    /// Runs the simulation in place, returning how it ended.
    fn run_force_simulation(&self, positions: &mut [Point], edges: &[(usize, usize)]) -> Simulation {
        let min = self.canvas.min_point();
        let max = self.canvas.max_point();
        let mut forces = vec![Point::default(); positions.len()];

        for iteration in 0..self.iterations {
            forces.fill(Point::default());

            // Repulsive forces between every ordered pair
            for i in 0..positions.len() {
                for j in 0..positions.len() {
                    if i == j {
                        continue;
                    }
                    let delta = positions[i].sub_point(positions[j]);
                    let distance = delta.hypot() + DISTANCE_EPSILON;
                    let force = self.min_distance / (distance * distance);
                    forces[i] = forces[i].add_point(delta.scale(force / distance));
                }
            }

            // Attractive forces along relationships
            for &(source, target) in edges {
                let delta = positions[target].sub_point(positions[source]);
                let distance = delta.hypot() + DISTANCE_EPSILON;
                let pull = delta.scale((distance / self.min_distance) / distance);
                forces[source] = forces[source].add_point(pull);
                forces[target] = forces[target].sub_point(pull);
            }

            let mut max_force: f32 = 0.0;
            for (position, force) in positions.iter_mut().zip(&forces) {
                max_force = max_force.max(force.x().abs()).max(force.y().abs());
                *position = position
                    .add_point(force.scale(self.learning_rate))
                    .clamp(min, max);
            }
            trace!(iteration = iteration, max_force = max_force; "Force iteration");

            if max_force < self.threshold {
                info!(iterations = iteration + 1; "Force-directed layout converged");
                return Simulation {
                    iterations: iteration + 1,
                    converged: true,
                };
            }
        }

        debug!(iterations = self.iterations; "Force-directed layout hit the iteration limit");
        Simulation {
            iterations: self.iterations,
            converged: false,
        }
    }
}

impl LayoutEngine for Engine {
    fn calculate(&self, diagram: &Diagram) -> Placement {
        let ids: Vec<Id> = diagram.elements().map(|element| element.id()).collect();
        let index: HashMap<Id, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        let edges: Vec<(usize, usize)> = diagram
            .relationships()
            .iter()
            .filter_map(|rel| Some((*index.get(&rel.source())?, *index.get(&rel.target())?)))
            .collect();

        let mut positions = self.initialize_positions(diagram);
        let simulation = self.run_force_simulation(&mut positions, &edges);

        let positions: IndexMap<Id, Point> = ids.into_iter().zip(positions).collect();
        Placement {
            positions,
            simulation: Some(simulation),
        }
    }
}

#[cfg(test)]
mod tests {
    use archgraph_core::model::{DiagramLevel, Element, ElementKind, RelationKind};

    use super::*;

    fn chain(names: &[&str]) -> Diagram {
        let mut diagram = Diagram::new(Id::new("force"), "Force", DiagramLevel::Component);
        let ids: Vec<Id> = names
            .iter()
            .map(|name| {
                diagram
                    .add_element(Element::new(ElementKind::Component, *name))
                    .unwrap()
            })
            .collect();
        for pair in ids.windows(2) {
            diagram
                .connect(pair[0], pair[1], RelationKind::Uses, "")
                .unwrap();
        }
        diagram
    }

    fn engine(iterations: usize) -> Engine {
        let mut engine = Engine::new(Canvas::default());
        engine.set_iterations(iterations);
        engine
    }

    #[test]
    fn test_deterministic() {
        let diagram = chain(&["a", "b", "c"]);
        assert_eq!(engine(50).calculate(&diagram), engine(50).calculate(&diagram));
    }

    #[test]
    fn test_iteration_limit() {
        let diagram = chain(&["a", "b", "c"]);
        let simulation = engine(3).calculate(&diagram).simulation.unwrap();
        assert_eq!(simulation.iterations, 3);
        assert!(!simulation.converged);
    }

    #[test]
    fn test_single_element_converges_immediately() {
        let diagram = chain(&["only"]);
        let placement = engine(100).calculate(&diagram);
        assert_eq!(
            placement.simulation,
            Some(Simulation {
                iterations: 1,
                converged: true
            })
        );
    }

    #[test]
    fn test_connected_elements_are_pulled_together() {
        let diagram = chain(&["a", "b"]);
        let initial = engine(0).calculate(&diagram).positions;
        let settled = engine(500).calculate(&diagram).positions;

        let gap = |positions: &IndexMap<Id, Point>| positions[0].sub_point(positions[1]).hypot();
        assert!(gap(&settled) < gap(&initial));
    }

    #[test]
    fn test_converged_positions_are_stable() {
        let mut diagram = chain(&["a", "b", "c"]);
        let first = engine(20_000).calculate(&diagram);
        assert!(first.simulation.unwrap().converged);

        for element in diagram.elements_mut() {
            element.set_position(first.positions[&element.id()]);
        }
        let second = engine(20_000).calculate(&diagram);

        for (id, position) in &second.positions {
            let displacement = position.sub_point(first.positions[id]).hypot();
            assert!(displacement < 0.1, "{id} moved by {displacement}");
        }
    }
}
