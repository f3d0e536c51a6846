// Force-directed (Fruchterman-Reingold) node placement
use serde::{Deserialize, Serialize};

use super::graph::KeywordGraph;

const MIN_DISTANCE: f64 = 0.01;
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Spring layout parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringLayout {
    /// Optimal distance between nodes
    pub k: f64,
    pub iterations: usize,
}

impl Default for SpringLayout {
    fn default() -> Self {
        Self {
            k: 1.0,
            iterations: 50,
        }
    }
}

impl SpringLayout {
    /// Node positions indexed by node id, rescaled into `[-1, 1]`
    ///
    /// Nodes start on a sunflower spiral inside the unit square so the result
    /// is deterministic. Attraction uses the edge weights.
    pub fn positions(&self, graph: &KeywordGraph) -> Vec<Point> {
        let n = graph.node_count();
        let mut pos: Vec<Point> = (0..n)
            .map(|i| {
                let r = 0.5 * ((i as f64 + 0.5) / n as f64).sqrt();
                let theta = i as f64 * GOLDEN_ANGLE;
                Point {
                    x: 0.5 + r * theta.cos(),
                    y: 0.5 + r * theta.sin(),
                }
            })
            .collect();

        if n < 2 {
            return rescale(pos);
        }

        let mut temperature = 0.1 * span(&pos);
        let cooling = temperature / (self.iterations as f64 + 1.0);
        let k2 = self.k * self.k;

        for _ in 0..self.iterations {
            let mut displacement = vec![Point { x: 0.0, y: 0.0 }; n];

            // repulsion between every pair
            for i in 0..n {
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let dx = pos[i].x - pos[j].x;
                    let dy = pos[i].y - pos[j].y;
                    let distance = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                    let force = k2 / (distance * distance);
                    displacement[i].x += dx * force;
                    displacement[i].y += dy * force;
                }
            }

            // attraction along edges, scaled by weight
            for edge in graph.edges() {
                let dx = pos[edge.from].x - pos[edge.to].x;
                let dy = pos[edge.from].y - pos[edge.to].y;
                let distance = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                let force = edge.weight as f64 * distance / self.k;
                displacement[edge.from].x -= dx * force;
                displacement[edge.from].y -= dy * force;
                displacement[edge.to].x += dx * force;
                displacement[edge.to].y += dy * force;
            }

            for (p, d) in pos.iter_mut().zip(&displacement) {
                let length = (d.x * d.x + d.y * d.y).sqrt().max(MIN_DISTANCE);
                p.x += d.x * temperature / length;
                p.y += d.y * temperature / length;
            }

            temperature -= cooling;
        }

        rescale(pos)
    }
}

/// Largest extent of the positions along either axis
fn span(pos: &[Point]) -> f64 {
    let (mut min_x, mut max_x) = (f64::MAX, f64::MIN);
    let (mut min_y, mut max_y) = (f64::MAX, f64::MIN);
    for p in pos {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    (max_x - min_x).max(max_y - min_y)
}

/// Center on the mean and scale the largest coordinate to 1
fn rescale(mut pos: Vec<Point>) -> Vec<Point> {
    if pos.is_empty() {
        return pos;
    }
    let n = pos.len() as f64;
    let mean_x = pos.iter().map(|p| p.x).sum::<f64>() / n;
    let mean_y = pos.iter().map(|p| p.y).sum::<f64>() / n;

    for p in &mut pos {
        p.x -= mean_x;
        p.y -= mean_y;
    }

    let extent = pos
        .iter()
        .map(|p| p.x.abs().max(p.y.abs()))
        .fold(0.0_f64, f64::max);
    if extent > 0.0 {
        for p in &mut pos {
            p.x /= extent;
            p.y /= extent;
        }
    }
    pos
}
