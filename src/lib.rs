pub mod catalog;
pub mod config;
pub mod error;
pub mod oracle;
pub mod session;
pub mod spiral;
pub mod state;
pub mod stats;
pub mod telemetry;
pub mod visualizer;

pub use catalog::{MODULES, Module, find_module, list_modules, resolve_module};
pub use config::LabConfig;
pub use error::{LabError, LabResult};
pub use oracle::{GeminiGenerator, OracleClient, OracleResult, TextGenerator};
pub use session::{Session, render_catalog};
pub use spiral::{CanvasSize, Point, generate_spiral, visual_scale};
pub use state::{Param, SimulationState};
pub use stats::{Stats, display_mersenne_exponent, entropy, format_grouped, resonance_hz};
pub use telemetry::init_tracing;
pub use visualizer::{rasterize, save_snapshot, spawn_visualizer};
