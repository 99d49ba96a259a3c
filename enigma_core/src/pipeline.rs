use serde::{Deserialize, Serialize};

use crate::alphabet::Letter;
use crate::machine::EnigmaError;
use crate::plugboard::Plugboard;
use crate::reflector::Reflector;
use crate::rotor::{RotorSlot, RotorStack};

pub const SIGNAL_STAGES: usize = 9;

/// One hop of the signal through the machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    PlugboardEntry,
    Forward(RotorSlot),
    Reflector,
    Reverse(RotorSlot),
    PlugboardExit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRecord {
    pub stage: Stage,
    pub input: Letter,
    pub output: Letter,
}

/// Every intermediate value of one key press, in signal order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalPath {
    pub stages: Vec<StageRecord>,
}

impl SignalPath {
    pub fn input(&self) -> Option<Letter> {
        self.stages.first().map(|record| record.input)
    }

    pub fn output(&self) -> Option<Letter> {
        self.stages.last().map(|record| record.output)
    }

    /// The lit lamp. Only a full path ending at the plugboard exit has one.
    pub fn lamp(&self) -> Result<Letter, EnigmaError> {
        match self.stages.last() {
            Some(last)
                if self.stages.len() == SIGNAL_STAGES && last.stage == Stage::PlugboardExit =>
            {
                Ok(last.output)
            }
            _ => Err(EnigmaError::IncompleteSignalPath {
                found: self.stages.len(),
            }),
        }
    }
}

/// Runs one letter from keyboard to lamp without touching rotor positions.
pub fn encipher(
    rotors: &RotorStack,
    plugboard: &Plugboard,
    reflector: &Reflector,
    input: Letter,
) -> Result<SignalPath, EnigmaError> {
    let mut stages = Vec::with_capacity(SIGNAL_STAGES);
    let mut signal = input;

    signal = record(&mut stages, Stage::PlugboardEntry, signal, plugboard.apply(signal));
    for slot in RotorSlot::FORWARD {
        let output = rotors.slot(slot).forward(signal);
        signal = record(&mut stages, Stage::Forward(slot), signal, output);
    }
    signal = record(&mut stages, Stage::Reflector, signal, reflector.apply(signal));
    for slot in RotorSlot::REVERSE {
        let output = rotors.slot(slot).reverse(signal)?;
        signal = record(&mut stages, Stage::Reverse(slot), signal, output);
    }
    record(&mut stages, Stage::PlugboardExit, signal, plugboard.apply(signal));

    Ok(SignalPath { stages })
}

fn record(stages: &mut Vec<StageRecord>, stage: Stage, input: Letter, output: Letter) -> Letter {
    stages.push(StageRecord {
        stage,
        input,
        output,
    });
    output
}
