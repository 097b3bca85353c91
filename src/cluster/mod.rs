// Cluster engine: a Dirichlet-multinomial mixture over short documents.

pub mod gsdmm;
pub mod model;
pub mod persist;

pub use gsdmm::{fit, fit_with_progress, score, Assignment, FitSettings, PassStats};
pub use model::{Cluster, ClusterModel, Hyperparameters};
pub use persist::{inspect, load, save, ModelInfo};
