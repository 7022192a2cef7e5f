//! Face alphabet
//!
//! The six face letters double as sticker colors: in the solved state every
//! sticker on a face carries that face's letter.

use std::fmt;

/// One face of the cube, in facelet-string order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    Up,
    Right,
    Front,
    Down,
    Left,
    Back,
}

impl Face {
    /// Faces in the order they appear in a facelet string
    pub const ALL: [Self; 6] = [
        Self::Up,
        Self::Right,
        Self::Front,
        Self::Down,
        Self::Left,
        Self::Back,
    ];

    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'U' => Some(Self::Up),
            'R' => Some(Self::Right),
            'F' => Some(Self::Front),
            'D' => Some(Self::Down),
            'L' => Some(Self::Left),
            'B' => Some(Self::Back),
            _ => None,
        }
    }

    pub const fn as_char(self) -> char {
        match self {
            Self::Up => 'U',
            Self::Right => 'R',
            Self::Front => 'F',
            Self::Down => 'D',
            Self::Left => 'L',
            Self::Back => 'B',
        }
    }

    /// Position of this face in `Face::ALL`
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
