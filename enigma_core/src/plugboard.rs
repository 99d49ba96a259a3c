use std::fmt;
use std::str::FromStr;

use crate::alphabet::{LETTER_COUNT, Letter};
use crate::machine::EnigmaError;

/// Steckerbrett: swaps letters in pairs at the entry and exit of the signal
/// path. Letters without a cable map to themselves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plugboard {
    mapping: [Letter; LETTER_COUNT],
}

impl Default for Plugboard {
    fn default() -> Self {
        Self {
            mapping: std::array::from_fn(|i| Letter::wrapping(i as i32)),
        }
    }
}

impl Plugboard {
    pub fn new(pairs: impl IntoIterator<Item = (Letter, Letter)>) -> Result<Self, EnigmaError> {
        let mut board = Self::default();
        for (a, b) in pairs {
            if a == b {
                return Err(EnigmaError::PlugboardSelfPair(a));
            }
            for letter in [a, b] {
                if board.apply(letter) != letter {
                    return Err(EnigmaError::PlugboardLetterReused(letter));
                }
            }
            board.mapping[a.index()] = b;
            board.mapping[b.index()] = a;
        }
        Ok(board)
    }

    pub fn apply(&self, input: Letter) -> Letter {
        self.mapping[input.index()]
    }

    /// Connected pairs, each listed once with the smaller letter first.
    pub fn pairs(&self) -> Vec<(Letter, Letter)> {
        Letter::all()
            .map(|letter| (letter, self.apply(letter)))
            .filter(|(a, b)| a < b)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs().is_empty()
    }
}

/// Parses whitespace or comma separated pairs such as `"AB CD EF"`.
impl FromStr for Plugboard {
    type Err = EnigmaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut pairs = Vec::new();
        for token in s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
        {
            let letters = token
                .chars()
                .map(Letter::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| EnigmaError::PlugboardPairMalformed(token.to_string()))?;
            match letters.as_slice() {
                [a, b] => pairs.push((*a, *b)),
                _ => return Err(EnigmaError::PlugboardPairMalformed(token.to_string())),
            }
        }
        Self::new(pairs)
    }
}

impl fmt::Display for Plugboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .pairs()
            .into_iter()
            .map(|(a, b)| format!("{a}{b}"))
            .collect();
        f.write_str(&rendered.join(" "))
    }
}
