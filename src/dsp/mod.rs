//! DSP — pure Rust synthesis primitives for the effect recipes.
//!
//! Everything renders offline into sample buffers; the browser only plays
//! the finished buffer, so native tests hear exactly what players hear.

pub mod automation;
pub mod filter;
pub mod mixer;
pub mod noise;
pub mod oscillator;
pub mod wav;

