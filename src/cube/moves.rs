//! Move tokens in Singmaster face-turn notation
//!
//! A token is a face letter with an optional suffix: nothing for a clockwise
//! quarter turn, `2` for a half turn, `'` for a counter-clockwise quarter turn.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::face::Face;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid move token '{0}' in solver output")]
pub struct MoveParseError(pub String);

/// Amount and direction of a face turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Clockwise,
    Half,
    CounterClockwise,
}

impl Turn {
    const fn suffix(self) -> &'static str {
        match self {
            Self::Clockwise => "",
            Self::Half => "2",
            Self::CounterClockwise => "'",
        }
    }
}

/// A single face turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub face: Face,
    pub turn: Turn,
}

impl FromStr for Move {
    type Err = MoveParseError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let invalid = || MoveParseError(token.to_string());

        let mut chars = token.chars();
        let face = chars.next().and_then(Face::from_char).ok_or_else(invalid)?;
        let turn = match chars.as_str() {
            "" => Turn::Clockwise,
            "2" => Turn::Half,
            "'" => Turn::CounterClockwise,
            _ => return Err(invalid()),
        };

        Ok(Self { face, turn })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.face, self.turn.suffix())
    }
}

/// An ordered list of face turns
///
/// Renders as space-separated tokens; the empty sequence renders as `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveSequence(Vec<Move>);

impl MoveSequence {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for MoveSequence {
    type Err = MoveParseError;

    /// Tokens may be separated by any run of ASCII whitespace
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split_ascii_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl fmt::Display for MoveSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, mv) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{mv}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_moves() {
        assert_eq!(
            "R".parse::<Move>().unwrap(),
            Move { face: Face::Right, turn: Turn::Clockwise }
        );
        assert_eq!(
            "U2".parse::<Move>().unwrap(),
            Move { face: Face::Up, turn: Turn::Half }
        );
        assert_eq!(
            "F'".parse::<Move>().unwrap(),
            Move { face: Face::Front, turn: Turn::CounterClockwise }
        );
    }

    #[test]
    fn test_reject_bad_tokens() {
        for token in ["", "X", "r", "R3", "R''", "R2'", "Rw", "M"] {
            assert_eq!(
                token.parse::<Move>(),
                Err(MoveParseError(token.to_string())),
                "token {token:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_sequence_normalizes_whitespace() {
        let seq: MoveSequence = "  D2 R'\tD' F2  B D R2 \n".parse().unwrap();
        assert_eq!(seq.len(), 7);
        assert_eq!(seq.to_string(), "D2 R' D' F2 B D R2");
    }

    #[test]
    fn test_empty_sequence() {
        let seq: MoveSequence = "".parse().unwrap();
        assert!(seq.is_empty());
        assert_eq!(seq.to_string(), "");

        let blank: MoveSequence = "   \n".parse().unwrap();
        assert_eq!(blank, MoveSequence::default());
    }

    #[test]
    fn test_sequence_reports_offending_token() {
        let err = "R U Error".parse::<MoveSequence>().unwrap_err();
        assert_eq!(err, MoveParseError("Error".to_string()));
        assert!(err.to_string().contains("'Error'"));
    }
}
