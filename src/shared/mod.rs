//! Types and helpers shared by the timeline reconciler and the status badge.

pub mod geometry;
pub mod strings;
pub mod text_measure;
