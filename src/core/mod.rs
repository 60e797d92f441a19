//! Platform-agnostic building blocks shared by the brush engine.
//!
//! Nothing in here knows about brush types; it covers the canvas view the
//! engine writes into, the error type, and input validation.

pub mod brush_model;
pub mod canvas;
pub mod errors;
