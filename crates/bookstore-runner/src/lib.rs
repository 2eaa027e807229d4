pub mod config;
mod error;
mod output;
mod runner;
mod step;

pub use config::Config;
pub use error::RunError;
pub use output::render;
pub use runner::{Runner, run_session};
pub use step::{Step, StepOutput};
