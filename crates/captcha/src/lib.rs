pub mod backend;
pub mod config;
pub mod logging;
pub mod solver;

pub use config::CaptchaConfig;
pub use solver::{DEFAULT_COMPENSATION_FACTOR, SliderSolver, SolveError};
