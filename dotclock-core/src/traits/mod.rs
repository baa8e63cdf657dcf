//! Hardware abstraction traits
//!
//! These traits define the interface between the rendering code and the
//! device drivers.

pub mod matrix;

pub use matrix::LedMatrix;
