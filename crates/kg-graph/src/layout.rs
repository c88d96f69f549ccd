//! Spring (force-directed) layout
//!
//! Fruchterman-Reingold: nodes repel each other, edges pull their endpoints
//! together, and a cooling temperature caps how far a node moves per step.
//! Positions are computed in the unit square and then scaled to the canvas.

use petgraph::visit::EdgeRef;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::KnowledgeGraph;

/// Minimum distance used when two nodes coincide
const MIN_DISTANCE: f64 = 0.01;

/// A position on the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Node positions, indexed like the graph's nodes
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    positions: Vec<Point>,
    width: f64,
    height: f64,
}

impl Layout {
    pub fn position(&self, node: usize) -> Option<Point> {
        self.positions.get(node).copied()
    }

    pub fn positions(&self) -> &[Point] {
        &self.positions
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

/// Force-directed layout parameters
#[derive(Debug, Clone)]
pub struct SpringLayout {
    /// Number of simulation steps
    pub iterations: u32,

    /// Canvas width
    pub width: f64,

    /// Canvas height
    pub height: f64,

    /// Empty border kept around the drawing
    pub margin: f64,

    /// Seed for the initial positions; random when unset
    pub seed: Option<u64>,
}

impl Default for SpringLayout {
    fn default() -> Self {
        Self {
            iterations: 50,
            width: 1000.0,
            height: 700.0,
            margin: 60.0,
            seed: None,
        }
    }
}

impl SpringLayout {
    /// Create layout parameters for a canvas size
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Compute positions for every node of the graph
    pub fn compute(&self, graph: &KnowledgeGraph) -> Layout {
        let n = graph.node_count();
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut pos: Vec<(f64, f64)> = (0..n).map(|_| (rng.gen(), rng.gen())).collect();

        // Undirected adjacency without self-loops; parallel edges pull harder
        let edges: Vec<(usize, usize)> = graph
            .inner()
            .edge_references()
            .map(|e| (e.source().index(), e.target().index()))
            .filter(|(a, b)| a != b)
            .collect();

        if n > 1 {
            let k = (1.0 / n as f64).sqrt();
            let mut temperature = 0.1;
            let cooling = temperature / (self.iterations as f64 + 1.0);

            for _ in 0..self.iterations {
                let mut disp = vec![(0.0f64, 0.0f64); n];

                for i in 0..n {
                    for j in 0..n {
                        if i == j {
                            continue;
                        }
                        let (dx, dy) = (pos[i].0 - pos[j].0, pos[i].1 - pos[j].1);
                        let dist = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                        let force = k * k / dist;
                        disp[i].0 += dx / dist * force;
                        disp[i].1 += dy / dist * force;
                    }
                }

                for &(a, b) in &edges {
                    let (dx, dy) = (pos[a].0 - pos[b].0, pos[a].1 - pos[b].1);
                    let dist = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                    let force = dist * dist / k;
                    let (fx, fy) = (dx / dist * force, dy / dist * force);
                    disp[a].0 -= fx;
                    disp[a].1 -= fy;
                    disp[b].0 += fx;
                    disp[b].1 += fy;
                }

                for (p, d) in pos.iter_mut().zip(&disp) {
                    let length = (d.0 * d.0 + d.1 * d.1).sqrt().max(MIN_DISTANCE);
                    let step = length.min(temperature);
                    p.0 += d.0 / length * step;
                    p.1 += d.1 / length * step;
                }

                temperature -= cooling;
            }
        }

        Layout {
            positions: self.scale(&pos),
            width: self.width,
            height: self.height,
        }
    }

    /// Map raw positions into the canvas, preserving aspect within the margins
    fn scale(&self, pos: &[(f64, f64)]) -> Vec<Point> {
        let center = Point {
            x: self.width / 2.0,
            y: self.height / 2.0,
        };
        if pos.len() <= 1 {
            return pos.iter().map(|_| center).collect();
        }

        let (min_x, max_x) = bounds(pos.iter().map(|p| p.0));
        let (min_y, max_y) = bounds(pos.iter().map(|p| p.1));
        let span = (max_x - min_x).max(max_y - min_y).max(f64::EPSILON);

        let usable_w = (self.width - 2.0 * self.margin).max(0.0);
        let usable_h = (self.height - 2.0 * self.margin).max(0.0);
        let scale = usable_w.min(usable_h) / span;

        // Center the drawing in the canvas
        let offset_x = (self.width - (max_x - min_x) * scale) / 2.0;
        let offset_y = (self.height - (max_y - min_y) * scale) / 2.0;

        pos.iter()
            .map(|p| Point {
                x: offset_x + (p.0 - min_x) * scale,
                y: offset_y + (p.1 - min_y) * scale,
            })
            .collect()
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}
