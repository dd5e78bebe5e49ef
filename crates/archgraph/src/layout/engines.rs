//! Layout engine factory module
//!
//! This module provides the engines behind every
//! [`LayoutStrategy`](crate::config::LayoutStrategy) and a builder that
//! configures them from shared settings.
//!
//! The module uses a builder pattern for creating and configuring layout engines.

mod circular;
mod force;
mod grid;
mod hierarchical;
mod layered;

pub use layered::dependency_levels;

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Serialize;

use archgraph_core::{geometry::Point, identifier::Id, model::Diagram};

use crate::{config::LayoutStrategy, layout::Canvas};

/// Outcome of an iterative engine run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Simulation {
    /// Iterations actually performed.
    pub iterations: usize,
    /// Whether the largest force dropped below the threshold before the
    /// iteration limit.
    pub converged: bool,
}

/// Positions computed by an engine, keyed by element id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placement {
    pub positions: IndexMap<Id, Point>,
    /// Present for iterative engines only.
    pub simulation: Option<Simulation>,
}

impl Placement {
    fn from_positions(positions: IndexMap<Id, Point>) -> Self {
        Self {
            positions,
            simulation: None,
        }
    }
}

/// Trait defining the interface for diagram layout engines
pub trait LayoutEngine {
    /// Calculate positions for the elements of `diagram`.
    ///
    /// Engines never mutate the diagram; existing positions may be used as a
    /// starting point.
    fn calculate(&self, diagram: &Diagram) -> Placement;
}

/// Builder for creating and configuring layout engines.
pub struct EngineBuilder {
    // Cache for reusing engines with the same configuration
    engines: HashMap<LayoutStrategy, Box<dyn LayoutEngine>>,

    // Configuration options
    canvas: Canvas,
    min_distance: f32,
    max_iterations: usize,
    force_threshold: f32,
    learning_rate: f32,
}

impl EngineBuilder {
    /// Create a new engine builder with default engine cache and configuration
    pub fn new() -> Self {
        Self {
            engines: HashMap::new(),
            canvas: Canvas::default(),
            min_distance: 100.0,
            max_iterations: 100,
            force_threshold: 0.1,
            learning_rate: 0.1,
        }
    }

    /// Set the canvas every engine places elements on
    pub fn with_canvas(mut self, canvas: Canvas) -> Self {
        self.canvas = canvas;
        self
    }

    /// Set the distance constant that scales the simulated forces
    pub fn with_min_distance(mut self, distance: f32) -> Self {
        self.min_distance = distance;
        self
    }

    /// Set the maximum number of force simulation iterations
    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Set the force magnitude under which the simulation counts as converged
    pub fn with_force_threshold(mut self, threshold: f32) -> Self {
        self.force_threshold = threshold;
        self
    }

    /// Set the fraction of the net force applied per iteration
    pub fn with_learning_rate(mut self, rate: f32) -> Self {
        self.learning_rate = rate;
        self
    }

    /// Get an engine for the given strategy with configured options
    pub fn engine(&mut self, strategy: LayoutStrategy) -> &dyn LayoutEngine {
        let engine = self.engines.entry(strategy).or_insert_with(|| {
            let engine: Box<dyn LayoutEngine> = match strategy {
                LayoutStrategy::Hierarchical => Box::new(hierarchical::Engine::new(self.canvas)),
                LayoutStrategy::Circular => Box::new(circular::Engine::new(self.canvas)),
                LayoutStrategy::Grid => Box::new(grid::Engine::new(self.canvas)),
                LayoutStrategy::Layered => Box::new(layered::Engine::new(self.canvas)),
                LayoutStrategy::ForceDirected => {
                    let mut e = force::Engine::new(self.canvas);
                    e.set_min_distance(self.min_distance)
                        .set_iterations(self.max_iterations)
                        .set_threshold(self.force_threshold)
                        .set_learning_rate(self.learning_rate);
                    Box::new(e)
                }
            };
            engine
        });
        // Dereference to avoid returning reference to temporary
        &**engine
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
