// Landmark and posture data models

pub mod landmark;
pub mod posture;

pub use landmark::*;
pub use posture::*;
