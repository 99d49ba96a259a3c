//! The 26-letter alphabet the machine operates on.
//!
//! Every component works on [`Letter`] values (`A=0 … Z=25`) so that rotor
//! offsets, ring settings and wirings share one modular arithmetic.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::machine::EnigmaError;

pub const LETTER_COUNT: usize = 26;
pub const ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// One letter of the machine alphabet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct Letter(u8);

impl Letter {
    pub const A: Letter = Letter(0);

    /// Accepts ASCII letters of either case.
    pub fn from_char(c: char) -> Option<Self> {
        if c.is_ascii_alphabetic() {
            Some(Letter(c.to_ascii_uppercase() as u8 - b'A'))
        } else {
            None
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        (index < LETTER_COUNT).then_some(Letter(index as u8))
    }

    /// Wraps any integer into the alphabet, so `-1` becomes `Z`.
    pub fn wrapping(value: i32) -> Self {
        Letter(value.rem_euclid(LETTER_COUNT as i32) as u8)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn to_char(self) -> char {
        (b'A' + self.0) as char
    }

    pub fn shift(self, by: i32) -> Self {
        Self::wrapping(self.0 as i32 + by)
    }

    pub fn next(self) -> Self {
        self.shift(1)
    }

    pub fn all() -> impl Iterator<Item = Letter> {
        (0..LETTER_COUNT as u8).map(Letter)
    }
}

impl TryFrom<char> for Letter {
    type Error = EnigmaError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        Letter::from_char(value).ok_or(EnigmaError::NotALetter(value))
    }
}

impl From<Letter> for char {
    fn from(value: Letter) -> Self {
        value.to_char()
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Parses a 26-letter wiring string such as `"EKMFLGDQVZNTOWYHXUSPAIBRCJ"`.
pub(crate) fn parse_wiring(component: &str, wiring: &str) -> Result<[Letter; LETTER_COUNT], EnigmaError> {
    let letters = wiring
        .trim()
        .chars()
        .map(Letter::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    if letters.len() != LETTER_COUNT {
        return Err(EnigmaError::WiringLength {
            component: component.to_string(),
            found: letters.len(),
        });
    }
    let mut table = [Letter::A; LETTER_COUNT];
    table.copy_from_slice(&letters);
    Ok(table)
}

/// Rotor positions in left, middle, right order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Positions {
    pub left: Letter,
    pub middle: Letter,
    pub right: Letter,
}

impl Positions {
    pub const fn new(left: Letter, middle: Letter, right: Letter) -> Self {
        Self { left, middle, right }
    }

    pub fn to_chars(self) -> [char; 3] {
        [self.left.to_char(), self.middle.to_char(), self.right.to_char()]
    }
}

impl Default for Positions {
    fn default() -> Self {
        Self::new(Letter::A, Letter::A, Letter::A)
    }
}

impl TryFrom<[char; 3]> for Positions {
    type Error = EnigmaError;

    fn try_from(value: [char; 3]) -> Result<Self, Self::Error> {
        Ok(Self::new(
            Letter::try_from(value[0])?,
            Letter::try_from(value[1])?,
            Letter::try_from(value[2])?,
        ))
    }
}

/// Accepts `"AAB"` or `"A-A-B"`.
impl FromStr for Positions {
    type Err = EnigmaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.trim().chars().filter(|c| *c != '-').collect();
        let triple: [char; 3] = chars
            .try_into()
            .map_err(|_| EnigmaError::MalformedPositions(s.to_string()))?;
        Self::try_from(triple)
    }
}

impl fmt::Display for Positions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.left, self.middle, self.right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_map_to_zero_based_indices() {
        assert_eq!(Letter::from_char('A').unwrap().index(), 0);
        assert_eq!(Letter::from_char('z').unwrap().index(), 25);
        assert_eq!(Letter::from_char('5'), None);
        assert_eq!(Letter::from_char('é'), None);
    }

    #[test]
    fn shifting_wraps_both_directions() {
        let z = Letter::from_char('Z').unwrap();
        assert_eq!(z.next(), Letter::A);
        assert_eq!(Letter::A.shift(-1), z);
        assert_eq!(Letter::A.shift(-27), z);
        assert_eq!(Letter::wrapping(52), Letter::A);
    }

    #[test]
    fn positions_parse_plain_and_hyphenated() {
        let plain: Positions = "aab".parse().unwrap();
        let hyphenated: Positions = "A-A-B".parse().unwrap();
        assert_eq!(plain, hyphenated);
        assert_eq!(plain.to_string(), "A-A-B");
        assert_eq!(plain.to_chars(), ['A', 'A', 'B']);
    }

    #[test]
    fn positions_reject_wrong_length() {
        let err = "AB".parse::<Positions>().unwrap_err();
        assert!(matches!(err, EnigmaError::MalformedPositions(_)));
        let err = "A1C".parse::<Positions>().unwrap_err();
        assert!(matches!(err, EnigmaError::NotALetter('1')));
    }

    #[test]
    fn letter_serializes_as_char() {
        let letter = Letter::from_char('q').unwrap();
        assert_eq!(serde_json::to_string(&letter).unwrap(), "\"Q\"");
        let decoded: Letter = serde_json::from_str("\"Q\"").unwrap();
        assert_eq!(decoded, letter);
        assert!(serde_json::from_str::<Letter>("\"?\"").is_err());
    }

    #[test]
    fn wiring_length_is_checked() {
        let err = parse_wiring("rotor X", "ABC").unwrap_err();
        assert!(matches!(err, EnigmaError::WiringLength { found: 3, .. }));
    }
}
