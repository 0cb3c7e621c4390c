// src/output/mod.rs

//! Display-side shaping of decoded build output.
//!
//! `normalize` is a pure function of one chunk. `LineBuffer` carries a
//! partial line between chunks of the same run for lines mode.

pub mod lines;
pub mod normalize;

pub use lines::LineBuffer;
pub use normalize::{normalize, normalize_newlines};
