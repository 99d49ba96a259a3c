use once_cell::sync::Lazy;

use crate::alphabet::{LETTER_COUNT, Letter, parse_wiring};
use crate::machine::EnigmaError;

pub const REFLECTOR_B_WIRING: &str = "YRUHQSLDPXNGOKMIEBFZCWVJAT";

static REFLECTOR_B: Lazy<Reflector> = Lazy::new(|| {
    Reflector::new("B", REFLECTOR_B_WIRING).expect("reflector B is a fixed-point-free involution")
});

/// Umkehrwalze: pairs every letter with a different one so the signal can
/// travel back through the rotors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reflector {
    name: String,
    wiring: [Letter; LETTER_COUNT],
}

impl Reflector {
    pub fn new(name: impl Into<String>, wiring: &str) -> Result<Self, EnigmaError> {
        let name = name.into();
        let wiring = parse_wiring(&format!("reflector {name}"), wiring)?;
        for letter in Letter::all() {
            let to = wiring[letter.index()];
            if to == letter {
                return Err(EnigmaError::ReflectorFixedPoint { letter });
            }
            let back = wiring[to.index()];
            if back != letter {
                return Err(EnigmaError::ReflectorNotInvolution {
                    from: letter,
                    to,
                    back,
                });
            }
        }
        Ok(Self { name, wiring })
    }

    /// The standard wide reflector B.
    pub fn b() -> Self {
        REFLECTOR_B.clone()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, input: Letter) -> Letter {
        self.wiring[input.index()]
    }
}

impl Default for Reflector {
    fn default() -> Self {
        Self::b()
    }
}
