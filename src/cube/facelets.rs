//! Facelet string validation
//!
//! A facelet string lists all 54 sticker colors face by face (U, R, F, D, L,
//! B), nine stickers per face. Validation here is shallow: it checks the
//! length and that every color appears exactly nine times. Whether the
//! arrangement is reachable on a physical cube is left to the solver.

use std::fmt;

use thiserror::Error;

use super::face::Face;

/// Number of stickers on a 3x3x3 cube
pub const FACELET_COUNT: usize = 54;

/// Stickers per face
pub const STICKERS_PER_FACE: usize = 9;

/// The solved cube in facelet notation
pub const SOLVED: &str = "UUUUUUUUURRRRRRRRRFFFFFFFFFDDDDDDDDDLLLLLLLLLBBBBBBBBB";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FaceletError {
    #[error("Cube string must have exactly 54 characters (got length {0}).")]
    InvalidLength(usize),

    #[error("Cube string does not represent a valid Rubik's Cube.")]
    InvalidComposition,
}

/// A facelet string that passed length and color-count validation
///
/// The original text is kept verbatim so it can be handed to the solver
/// unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CubeState(String);

impl CubeState {
    /// Validate a raw facelet string
    ///
    /// Checks run in a fixed order: length first, then composition. A string
    /// that fails both reports the length error.
    pub fn parse(raw: &str) -> Result<Self, FaceletError> {
        check_length(raw)?;
        check_composition(raw)?;
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_solved(&self) -> bool {
        self.0 == SOLVED
    }
}

impl fmt::Display for CubeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn check_length(raw: &str) -> Result<(), FaceletError> {
    let len = raw.chars().count();
    if len == FACELET_COUNT {
        Ok(())
    } else {
        Err(FaceletError::InvalidLength(len))
    }
}

/// Every face letter must appear exactly nine times and nothing else may
/// appear. With the length already fixed at 54 this is the same as the
/// sorted characters equalling the sorted solved string.
fn check_composition(raw: &str) -> Result<(), FaceletError> {
    let mut counts = [0usize; Face::ALL.len()];
    for c in raw.chars() {
        let face = Face::from_char(c).ok_or(FaceletError::InvalidComposition)?;
        counts[face.index()] += 1;
    }

    if counts.iter().all(|&n| n == STICKERS_PER_FACE) {
        Ok(())
    } else {
        Err(FaceletError::InvalidComposition)
    }
}
