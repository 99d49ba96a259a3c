//! Per-letter instrumentation for replaying and explaining a session.
//!
//! Recording is a side channel: the machine never reads its own history, so
//! disabling the recorder leaves the ciphertext unchanged.

use serde::{Deserialize, Serialize};

use crate::alphabet::{Letter, Positions};
use crate::machine::EnigmaError;
use crate::pipeline::{SignalPath, Stage, StageRecord};
use crate::rotor::RotorSlot;
use crate::stepping::StepTrace;

/// Everything that happened while one letter was processed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub input: Letter,
    pub output: Letter,
    pub positions_before: Positions,
    pub positions_after: Positions,
    /// Rotor names in left, middle, right order.
    pub rotor_names: [String; 3],
    pub stages: Vec<StageRecord>,
    pub step: StepTrace,
}

/// A display-ready description of one stage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepExplanation {
    pub number: usize,
    pub title: String,
    pub explanation: String,
    pub input: String,
    pub output: String,
    pub details: String,
}

impl HistoryEntry {
    pub fn new(
        input: Letter,
        path: SignalPath,
        positions_before: Positions,
        positions_after: Positions,
        rotor_names: [String; 3],
        step: StepTrace,
    ) -> Result<Self, EnigmaError> {
        let output = path.lamp()?;
        Ok(Self {
            input,
            output,
            positions_before,
            positions_after,
            rotor_names,
            stages: path.stages,
            step,
        })
    }

    fn rotor_name(&self, slot: RotorSlot) -> &str {
        match slot {
            RotorSlot::Left => &self.rotor_names[0],
            RotorSlot::Middle => &self.rotor_names[1],
            RotorSlot::Right => &self.rotor_names[2],
        }
    }

    fn position(&self, slot: RotorSlot) -> Letter {
        match slot {
            RotorSlot::Left => self.positions_before.left,
            RotorSlot::Middle => self.positions_before.middle,
            RotorSlot::Right => self.positions_before.right,
        }
    }

    /// The nine signal stages followed by the rotor advancement, numbered
    /// from one.
    pub fn explain(&self) -> Vec<StepExplanation> {
        let mut steps: Vec<StepExplanation> = self
            .stages
            .iter()
            .enumerate()
            .map(|(index, record)| self.explain_stage(index + 1, record))
            .collect();
        steps.push(self.explain_advance(steps.len() + 1));
        steps
    }

    fn explain_stage(&self, number: usize, record: &StageRecord) -> StepExplanation {
        let (input, output) = (record.input, record.output);
        let (title, explanation, details) = match record.stage {
            Stage::PlugboardEntry => (
                "PLUGBOARD ENTRY".to_string(),
                "Signal enters the plugboard, which may swap it for its cabled partner".to_string(),
                plugboard_details(input, output, "the signal continues as"),
            ),
            Stage::Forward(slot) => (
                format!("{} ROTOR ({})", slot.label(), self.rotor_name(slot)),
                format!("Signal crosses the {} rotor towards the reflector", slot.label().to_lowercase()),
                format!(
                    "At position {}, the internal wiring connects {input} to {output}",
                    self.position(slot)
                ),
            ),
            Stage::Reflector => (
                "REFLECTOR".to_string(),
                "Signal is turned around by the reflector, which makes the machine reciprocal".to_string(),
                format!("The reflector permanently pairs {input} with {output}, so the same settings encrypt and decrypt"),
            ),
            Stage::Reverse(slot) => (
                format!("{} ROTOR ({}) RETURN", slot.label(), self.rotor_name(slot)),
                format!("Signal crosses the {} rotor again on its way back", slot.label().to_lowercase()),
                format!("The return path uses the inverse wiring: {input} becomes {output}"),
            ),
            Stage::PlugboardExit => (
                "PLUGBOARD EXIT".to_string(),
                "Signal leaves through the plugboard and lights a lamp".to_string(),
                plugboard_details(input, output, "the lamp shows"),
            ),
        };
        StepExplanation {
            number,
            title,
            explanation,
            input: input.to_string(),
            output: output.to_string(),
            details,
        }
    }

    fn explain_advance(&self, number: usize) -> StepExplanation {
        let before = self.positions_before;
        let after = self.positions_after;
        let mut details = format!(
            "The right rotor moved from {} to {}",
            before.right, after.right
        );
        if self.step.middle_carry {
            details.push_str(&format!(
                "; its notch carried the middle rotor from {} to {}",
                before.middle, after.middle
            ));
        }
        if self.step.double_step {
            details.push_str(&format!(
                "; the middle rotor was on its notch and double-stepped with the left rotor ({} to {})",
                before.left, after.left
            ));
        }
        details.push_str(". The next letter meets a different wiring, even if it is the same key");
        StepExplanation {
            number,
            title: "ROTOR ADVANCEMENT".to_string(),
            explanation: "Rotors advance like an odometer after every letter".to_string(),
            input: before.to_string(),
            output: after.to_string(),
            details,
        }
    }
}

fn plugboard_details(input: Letter, output: Letter, continuation: &str) -> String {
    if input == output {
        format!("No cable on {input}, so {continuation} {output}")
    } else {
        format!("A cable swaps {input} with {output}")
    }
}

/// Append-only log of processed letters, owned by a machine.
#[derive(Clone, Debug)]
pub struct HistoryRecorder {
    enabled: bool,
    entries: Vec<HistoryEntry>,
}

impl Default for HistoryRecorder {
    fn default() -> Self {
        Self {
            enabled: true,
            entries: Vec::new(),
        }
    }
}

impl HistoryRecorder {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            entries: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn record(&mut self, entry: HistoryEntry) {
        if self.enabled {
            self.entries.push(entry);
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
