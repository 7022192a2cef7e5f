//! Cube model
//!
//! Facelet-string validation and move notation. No solving happens here.

pub mod face;
pub mod facelets;
pub mod moves;

pub use facelets::{CubeState, FaceletError};
pub use moves::{MoveParseError, MoveSequence};
