use tracing::debug;

use crate::catalog::Module;
use crate::state::SimulationState;

/// Angular step between consecutive samples, in radians.
pub const THETA_STEP: f64 = 0.1;
const SAMPLES_PER_RADIAN: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub const fn new(width: f64, height: f64) -> Self {
        CanvasSize { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        CanvasSize::new(600.0, 600.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn dist(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Maps the module's perfect number (6 up to ~8.6e9) onto a radius factor
/// that keeps every spiral inside the same canvas.
pub fn visual_scale(module: &Module) -> f64 {
    debug_assert!(module.perfect_number > 0, "catalog perfect numbers are positive");
    let scale_base = (module.perfect_number as f64).log10() + 1.0;
    20.0 / scale_base
}

/// Sample angles `0, 0.1, 0.2, ...` strictly below `theta_max`. Computed by
/// index so the count is exactly `theta_max * 10`.
pub fn theta_samples(theta_max: u32) -> impl Iterator<Item = f64> {
    (0..theta_max * SAMPLES_PER_RADIAN).map(|i| i as f64 * THETA_STEP)
}

/// r(θ) = ϕ · θ · (1 + 0.1 sin(S · θ / 2)) · scale
pub fn radius(state: &SimulationState, theta: f64, scale: f64) -> f64 {
    let modulation = 1.0 + 0.1 * (state.s_total * theta * 0.5).sin();
    state.phi * theta * modulation * scale
}

/// Polyline for the current state, in increasing-θ draw order.
pub fn generate_spiral(state: &SimulationState, module: &Module, canvas: CanvasSize) -> Vec<Point> {
    let scale = visual_scale(module);
    let center = canvas.center();

    let points: Vec<Point> = theta_samples(state.theta_max)
        .map(|theta| {
            let r = radius(state, theta, scale);
            let (sin, cos) = theta.sin_cos();
            Point::new(center.x + r * cos, center.y + r * sin)
        })
        .collect();

    debug!(
        module = module.id,
        points = points.len(),
        scale,
        "spiral regenerated"
    );
    points
}
