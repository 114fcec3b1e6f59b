// Library exports for posture-coach
// Landmarks in, posture score, feedback and debounced alerts out.

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::PostureConfig;
pub use error::{PostureError, Result};
