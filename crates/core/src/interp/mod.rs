//! Content stream interpretation.
//!
//! This module contains:
//! - `interpreter`: operation dispatch and interpreter state
//! - `device`: the `Device` trait and the `PageCollector` device
//! - `state`: graphics and text state
//! - `ops`: operator implementations by category

pub mod device;
pub mod interpreter;
mod ops;
pub mod state;

pub use device::{Device, PageCollector, PaintMode, PaintedShape, PathSegment, TextSeqItem};
pub use interpreter::PageInterpreter;
pub use state::{Color, ColorSpace, GraphicState, TextState};
