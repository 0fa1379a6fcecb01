//! Gradient-boosted ensemble: training, evaluation, and persistence.

pub mod booster;
pub mod metrics;
pub mod persist;
pub mod trainer;
pub mod tree;

pub use booster::{GbdtModel, TrainConfig};
pub use metrics::{ClassReport, EvalReport};
pub use persist::{load, save, ARTIFACT_FORMAT_VERSION};
pub use trainer::{evaluate, train};
