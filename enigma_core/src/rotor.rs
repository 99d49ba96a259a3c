use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::alphabet::{LETTER_COUNT, Letter, Positions, parse_wiring};
use crate::machine::EnigmaError;

/// Historical Enigma I rotor types.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotorType {
    I,
    II,
    III,
    IV,
    V,
}

struct CatalogEntry {
    name: &'static str,
    wiring: &'static str,
    notch: char,
}

const ROTOR_I: CatalogEntry = CatalogEntry {
    name: "I",
    wiring: "EKMFLGDQVZNTOWYHXUSPAIBRCJ",
    notch: 'Q',
};

const ROTOR_II: CatalogEntry = CatalogEntry {
    name: "II",
    wiring: "AJDKSIRUXBLHWTMCQGZNPYFVOE",
    notch: 'E',
};

const ROTOR_III: CatalogEntry = CatalogEntry {
    name: "III",
    wiring: "BDFHJLCPRTXVZNYEIWGAKMUSQO",
    notch: 'V',
};

const ROTOR_IV: CatalogEntry = CatalogEntry {
    name: "IV",
    wiring: "ESOVPZJAYQUIRHXLNFTGKDCMWB",
    notch: 'J',
};

const ROTOR_V: CatalogEntry = CatalogEntry {
    name: "V",
    wiring: "VZBRGITYUPSDNHLXAWMJQOFECK",
    notch: 'Z',
};

static CATALOG: Lazy<[Arc<RotorSpec>; 5]> = Lazy::new(|| {
    [ROTOR_I, ROTOR_II, ROTOR_III, ROTOR_IV, ROTOR_V].map(|entry| {
        Arc::new(
            RotorSpec::new(entry.name, entry.wiring, entry.notch)
                .expect("catalog rotor wiring is a permutation"),
        )
    })
});

impl RotorType {
    pub const ALL: [RotorType; 5] = [
        RotorType::I,
        RotorType::II,
        RotorType::III,
        RotorType::IV,
        RotorType::V,
    ];

    /// Shared, immutable wiring for this rotor type.
    pub fn spec(self) -> Arc<RotorSpec> {
        let index = match self {
            RotorType::I => 0,
            RotorType::II => 1,
            RotorType::III => 2,
            RotorType::IV => 3,
            RotorType::V => 4,
        };
        Arc::clone(&CATALOG[index])
    }
}

impl fmt::Display for RotorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spec().name)
    }
}

/// Fixed wiring and notch of one rotor type.
///
/// The wiring is a permutation of the alphabet; `inverse` is its reverse
/// lookup, built once at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RotorSpec {
    name: String,
    wiring: [Letter; LETTER_COUNT],
    inverse: [Option<Letter>; LETTER_COUNT],
    notch: Letter,
}

impl RotorSpec {
    pub fn new(name: impl Into<String>, wiring: &str, notch: char) -> Result<Self, EnigmaError> {
        let name = name.into();
        let component = format!("rotor {name}");
        let wiring = parse_wiring(&component, wiring)?;
        let notch = Letter::try_from(notch)?;
        let mut inverse = [None; LETTER_COUNT];
        for (contact, wired) in Letter::all().zip(wiring) {
            if inverse[wired.index()].replace(contact).is_some() {
                return Err(EnigmaError::DuplicateWiring {
                    component,
                    letter: wired,
                });
            }
        }
        Ok(Self {
            name,
            wiring,
            inverse,
            notch,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn notch(&self) -> Letter {
        self.notch
    }

    pub fn wire(&self, contact: Letter) -> Letter {
        self.wiring[contact.index()]
    }

    /// Contact whose wire lands on `wired`, if the wiring has one.
    pub fn unwire(&self, wired: Letter) -> Option<Letter> {
        self.inverse[wired.index()]
    }

    pub fn wiring(&self) -> String {
        self.wiring.iter().map(|letter| letter.to_char()).collect()
    }
}

/// Runtime state of one rotor: its rotational position and ring offset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RotorState {
    spec: Arc<RotorSpec>,
    position: Letter,
    ring_setting: Letter,
}

impl RotorState {
    pub fn new(spec: Arc<RotorSpec>, position: Letter, ring_setting: Letter) -> Self {
        Self {
            spec,
            position,
            ring_setting,
        }
    }

    pub fn spec(&self) -> &Arc<RotorSpec> {
        &self.spec
    }

    pub fn position(&self) -> Letter {
        self.position
    }

    pub fn ring_setting(&self) -> Letter {
        self.ring_setting
    }

    pub fn at_notch(&self) -> bool {
        self.position == self.spec.notch
    }

    pub(crate) fn set_position(&mut self, position: Letter) {
        self.position = position;
    }

    pub(crate) fn step(&mut self) {
        self.position = self.position.next();
    }

    fn offset(&self) -> i32 {
        self.position.index() as i32 - self.ring_setting.index() as i32
    }

    /// Signal entering from the right-hand contacts.
    pub fn forward(&self, input: Letter) -> Letter {
        let shift = self.offset();
        self.spec.wire(input.shift(shift)).shift(-shift)
    }

    /// Signal returning from the reflector side.
    pub fn reverse(&self, input: Letter) -> Result<Letter, EnigmaError> {
        let shift = self.offset();
        let adjusted = input.shift(shift);
        let contact = self
            .spec
            .unwire(adjusted)
            .ok_or_else(|| EnigmaError::BrokenWiring {
                rotor: self.spec.name.clone(),
                letter: adjusted,
            })?;
        Ok(contact.shift(-shift))
    }
}

/// Slot a rotor occupies. The right rotor steps on every key press, the left
/// one least often.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotorSlot {
    Left,
    Middle,
    Right,
}

impl RotorSlot {
    /// Order the signal crosses the rotors on its way to the reflector.
    pub const FORWARD: [RotorSlot; 3] = [RotorSlot::Right, RotorSlot::Middle, RotorSlot::Left];
    /// Order on the way back.
    pub const REVERSE: [RotorSlot; 3] = [RotorSlot::Left, RotorSlot::Middle, RotorSlot::Right];

    pub fn label(self) -> &'static str {
        match self {
            RotorSlot::Left => "LEFT",
            RotorSlot::Middle => "MIDDLE",
            RotorSlot::Right => "RIGHT",
        }
    }
}

/// The three rotors, held by slot rather than by array index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RotorStack {
    pub(crate) left: RotorState,
    pub(crate) middle: RotorState,
    pub(crate) right: RotorState,
}

impl RotorStack {
    pub fn new(left: RotorState, middle: RotorState, right: RotorState) -> Self {
        Self {
            left,
            middle,
            right,
        }
    }

    pub fn slot(&self, slot: RotorSlot) -> &RotorState {
        match slot {
            RotorSlot::Left => &self.left,
            RotorSlot::Middle => &self.middle,
            RotorSlot::Right => &self.right,
        }
    }

    pub fn left(&self) -> &RotorState {
        &self.left
    }

    pub fn middle(&self) -> &RotorState {
        &self.middle
    }

    pub fn right(&self) -> &RotorState {
        &self.right
    }

    pub fn positions(&self) -> Positions {
        Positions::new(
            self.left.position,
            self.middle.position,
            self.right.position,
        )
    }

    pub(crate) fn set_positions(&mut self, positions: Positions) {
        self.left.set_position(positions.left);
        self.middle.set_position(positions.middle);
        self.right.set_position(positions.right);
    }

    pub fn names(&self) -> [String; 3] {
        [
            self.left.spec.name.clone(),
            self.middle.spec.name.clone(),
            self.right.spec.name.clone(),
        ]
    }
}
