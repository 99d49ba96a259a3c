//! Rotor advancement: an odometer with the Enigma double-step anomaly.
//!
//! All decisions are taken on the positions as they stand before any rotor
//! moves in this key press:
//!
//! 1. If the middle rotor sits on its notch, it steps together with the left
//!    rotor (the double step).
//! 2. The right rotor always steps.
//! 3. If the right rotor sat on its notch, the middle rotor steps, unless
//!    rule 1 already moved it.

use serde::{Deserialize, Serialize};

use crate::rotor::RotorStack;

/// Which carries fired during one advancement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTrace {
    /// Middle rotor was on its notch and moved itself and the left rotor.
    pub double_step: bool,
    /// Right rotor's notch carried into the middle rotor.
    pub middle_carry: bool,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SteppingController;

impl SteppingController {
    pub fn advance(rotors: &mut RotorStack) -> StepTrace {
        let middle_at_notch = rotors.middle.at_notch();
        let right_at_notch = rotors.right.at_notch();

        if middle_at_notch {
            rotors.middle.step();
            rotors.left.step();
        }

        rotors.right.step();

        let middle_carry = right_at_notch && !middle_at_notch;
        if middle_carry {
            rotors.middle.step();
        }

        StepTrace {
            double_step: middle_at_notch,
            middle_carry,
        }
    }
}
