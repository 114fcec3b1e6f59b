// Library exports for the posture-coach CLI
// This allows testing of internal modules

pub mod commands;
pub mod recording;
pub mod report;
