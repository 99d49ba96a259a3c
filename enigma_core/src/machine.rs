use log::{debug, trace};
use thiserror::Error;

use crate::alphabet::{Letter, Positions};
use crate::history::{HistoryEntry, HistoryRecorder};
use crate::pipeline::encipher;
use crate::plugboard::Plugboard;
use crate::reflector::Reflector;
use crate::rotor::RotorStack;
use crate::stepping::SteppingController;

#[derive(Debug, Error)]
pub enum EnigmaError {
    #[error("'{0}' is not a letter of the A-Z alphabet")]
    NotALetter(char),

    #[error("{component} wiring must contain 26 letters, found {found}")]
    WiringLength { component: String, found: usize },

    #[error("{component} wiring is not a permutation: '{letter}' is wired more than once")]
    DuplicateWiring { component: String, letter: Letter },

    #[error("reflector maps '{letter}' to itself")]
    ReflectorFixedPoint { letter: Letter },

    #[error("reflector is not an involution: '{from}' -> '{to}' but '{to}' -> '{back}'")]
    ReflectorNotInvolution { from: Letter, to: Letter, back: Letter },

    #[error("plugboard cannot connect '{0}' to itself")]
    PlugboardSelfPair(Letter),

    #[error("plugboard letter '{0}' is already connected")]
    PlugboardLetterReused(Letter),

    #[error("malformed plugboard pair '{0}'")]
    PlugboardPairMalformed(String),

    #[error("rotor positions need exactly three letters, got '{0}'")]
    MalformedPositions(String),

    #[error("rotor {rotor} has no wire landing on '{letter}'")]
    BrokenWiring { rotor: String, letter: Letter },

    #[error("signal path ended after {found} stages without reaching the lamp")]
    IncompleteSignalPath { found: usize },

    #[error("machine session lock poisoned")]
    SessionPoisoned,
}

/// A configured three-rotor machine.
///
/// The machine owns its rotor positions and history outright; independent
/// sessions need independent machines.
#[derive(Clone, Debug)]
pub struct Machine {
    rotors: RotorStack,
    plugboard: Plugboard,
    reflector: Reflector,
    history: HistoryRecorder,
}

impl Machine {
    pub fn new(rotors: RotorStack, plugboard: Plugboard, reflector: Reflector) -> Self {
        debug!(
            "machine rotors={:?} positions={} plugboard=[{}] reflector={}",
            rotors.names(),
            rotors.positions(),
            plugboard,
            reflector.name()
        );
        Self {
            rotors,
            plugboard,
            reflector,
            history: HistoryRecorder::default(),
        }
    }

    pub fn with_history(mut self, enabled: bool) -> Self {
        self.history.set_enabled(enabled);
        self
    }

    pub fn rotors(&self) -> &RotorStack {
        &self.rotors
    }

    pub fn plugboard(&self) -> &Plugboard {
        &self.plugboard
    }

    pub fn reflector(&self) -> &Reflector {
        &self.reflector
    }

    /// Presses one key. Characters outside A-Z (either case) come back
    /// unchanged and leave the machine untouched.
    pub fn encrypt_letter(&mut self, input: char) -> Result<char, EnigmaError> {
        let Some(letter) = Letter::from_char(input) else {
            return Ok(input);
        };
        let before = self.rotors.positions();
        let path = encipher(&self.rotors, &self.plugboard, &self.reflector, letter)?;
        let output = path.lamp()?;
        let step = SteppingController::advance(&mut self.rotors);
        let after = self.rotors.positions();
        trace!(
            "key {letter} -> {output} positions {before} -> {after} double_step={} carry={}",
            step.double_step,
            step.middle_carry
        );
        if self.history.is_enabled() {
            self.history.record(HistoryEntry::new(
                letter,
                path,
                before,
                after,
                self.rotors.names(),
                step,
            )?);
        }
        Ok(output.to_char())
    }

    /// Processes a message strictly left to right; each letter sees the
    /// positions left behind by the previous one.
    pub fn encrypt_message(&mut self, message: &str) -> Result<String, EnigmaError> {
        let start = self.rotors.positions();
        let output = message
            .chars()
            .map(|c| self.encrypt_letter(c.to_ascii_uppercase()))
            .collect::<Result<String, _>>()?;
        debug!(
            "message chars={} positions {} -> {}",
            output.chars().count(),
            start,
            self.rotors.positions()
        );
        Ok(output)
    }

    pub fn positions(&self) -> Positions {
        self.rotors.positions()
    }

    /// Re-keys the rotors without touching the history, so the next entry's
    /// starting positions will not follow from the previous entry. Use
    /// [`Machine::reset`] to start a fresh session.
    pub fn set_positions(&mut self, positions: Positions) {
        self.rotors.set_positions(positions);
    }

    /// Re-keys the rotors and drops the history of the previous key.
    pub fn reset(&mut self, positions: Positions) {
        debug!("reset positions {} -> {}", self.rotors.positions(), positions);
        self.set_positions(positions);
        self.clear_history();
    }

    pub fn history(&self) -> &[HistoryEntry] {
        self.history.entries()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Stage;
    use crate::rotor::{RotorSlot, RotorState, RotorType};

    fn machine(positions: &str) -> Machine {
        machine_with(positions, Plugboard::default())
    }

    fn machine_with(positions: &str, plugboard: Plugboard) -> Machine {
        let positions: Positions = positions.parse().unwrap();
        let rotors = RotorStack::new(
            RotorState::new(RotorType::I.spec(), positions.left, Letter::A),
            RotorState::new(RotorType::II.spec(), positions.middle, Letter::A),
            RotorState::new(RotorType::III.spec(), positions.right, Letter::A),
        );
        Machine::new(rotors, plugboard, Reflector::b())
    }

    #[test]
    fn single_letter_reciprocity() {
        let mut encoder = machine("AAA");
        assert_eq!(encoder.encrypt_letter('A').unwrap(), 'U');
        assert_eq!(encoder.positions().to_chars(), ['A', 'A', 'B']);

        let mut decoder = machine("AAA");
        assert_eq!(decoder.encrypt_letter('U').unwrap(), 'A');
    }

    #[test]
    fn odometer_over_26_letters() {
        let mut m = machine("AAA");
        let mut middle_moves = Vec::new();
        for call in 1..=26 {
            let before = m.positions();
            m.encrypt_letter('A').unwrap();
            let after = m.positions();
            assert_eq!(after.left, Letter::A);
            if after.middle != before.middle {
                middle_moves.push(call);
            }
        }
        assert_eq!(middle_moves, vec![22]);
        assert_eq!(m.positions().to_string(), "A-B-A");
    }

    #[test]
    fn double_step_moves_middle_and_left() {
        let mut m = machine("CEK");
        m.encrypt_letter('X').unwrap();
        assert_eq!(m.positions().to_string(), "D-F-L");
    }

    #[test]
    fn non_letters_pass_through_untouched() {
        let mut m = machine("AAA");
        for c in [' ', '7', '.', '\n', 'é'] {
            assert_eq!(m.encrypt_letter(c).unwrap(), c);
        }
        assert_eq!(m.positions(), Positions::default());
        assert!(m.history().is_empty());
    }

    #[test]
    fn lowercase_letters_are_folded() {
        let mut m = machine("AAA");
        assert_eq!(m.encrypt_letter('a').unwrap(), 'U');
    }

    #[test]
    fn message_keeps_punctuation_in_place() {
        let mut encoder = machine("AAA");
        let ciphertext = encoder.encrypt_message("Hello, World!").unwrap();
        assert_eq!(ciphertext, "ZFEBM, QKNGR!");
        let mut decoder = machine("AAA");
        assert_eq!(decoder.encrypt_message(&ciphertext).unwrap(), "HELLO, WORLD!");
    }

    #[test]
    fn history_replays_to_same_output() {
        let plugboard: Plugboard = "AM FI NV PS TU WZ".parse().unwrap();
        let mut m = machine_with("QEV", plugboard.clone());
        let reflector = Reflector::b();
        let output = m.encrypt_letter('G').unwrap();
        let entry = &m.history()[0];
        assert_eq!(entry.stages.len(), 9);

        // Rebuild the rotors at the recorded starting positions and replay
        // each stage by hand.
        let before = entry.positions_before;
        let rotors = RotorStack::new(
            RotorState::new(RotorType::I.spec(), before.left, Letter::A),
            RotorState::new(RotorType::II.spec(), before.middle, Letter::A),
            RotorState::new(RotorType::III.spec(), before.right, Letter::A),
        );
        let mut signal = entry.input;
        for record in &entry.stages {
            assert_eq!(record.input, signal);
            signal = match record.stage {
                Stage::PlugboardEntry | Stage::PlugboardExit => plugboard.apply(signal),
                Stage::Forward(slot) => rotors.slot(slot).forward(signal),
                Stage::Reflector => reflector.apply(signal),
                Stage::Reverse(slot) => rotors.slot(slot).reverse(signal).unwrap(),
            };
            assert_eq!(record.output, signal);
        }
        assert_eq!(signal.to_char(), output);
        assert_eq!(entry.output.to_char(), output);
        assert_eq!(entry.positions_after, m.positions());
        assert_eq!(entry.stages[1].stage, Stage::Forward(RotorSlot::Right));
    }

    #[test]
    fn history_does_not_change_ciphertext() {
        let mut recorded = machine("ZZZ");
        let mut silent = machine("ZZZ").with_history(false);
        let text = "THE QUICK BROWN FOX JUMPS OVER THE LAZY DOG";
        assert_eq!(
            recorded.encrypt_message(text).unwrap(),
            silent.encrypt_message(text).unwrap()
        );
        assert_eq!(recorded.history().len(), 35);
        assert!(silent.history().is_empty());
    }

    #[test]
    fn reset_clears_history_but_set_positions_does_not() {
        let mut m = machine("AAA");
        m.encrypt_message("ABC").unwrap();
        m.set_positions("AAA".parse().unwrap());
        assert_eq!(m.history().len(), 3);
        m.reset("BBB".parse().unwrap());
        assert!(m.history().is_empty());
        assert_eq!(m.positions().to_chars(), ['B', 'B', 'B']);
    }

    #[test]
    fn set_positions_leaves_a_gap_that_reset_avoids() {
        let mut m = machine("AAA");
        m.encrypt_message("AB").unwrap();
        m.set_positions("QEV".parse().unwrap());
        m.encrypt_letter('C').unwrap();
        let history = m.history();
        assert_eq!(history[1].positions_after.to_string(), "A-A-C");
        assert_eq!(history[2].positions_before.to_string(), "Q-E-V");

        m.reset("QEV".parse().unwrap());
        m.encrypt_letter('C').unwrap();
        assert_eq!(m.history().len(), 1);
        assert_eq!(m.history()[0].positions_before.to_string(), "Q-E-V");
    }

    #[test]
    fn rekeying_reproduces_ciphertext() {
        let mut m = machine("MCK");
        let first = m.encrypt_message("REPEATABLE").unwrap();
        m.reset("MCK".parse().unwrap());
        assert_eq!(m.encrypt_message("REPEATABLE").unwrap(), first);
    }

    #[test]
    fn error_messages_are_readable() {
        let err = EnigmaError::PlugboardLetterReused(Letter::A);
        assert_eq!(err.to_string(), "plugboard letter 'A' is already connected");
        let err = EnigmaError::BrokenWiring {
            rotor: "I".into(),
            letter: Letter::A,
        };
        assert_eq!(err.to_string(), "rotor I has no wire landing on 'A'");
    }
}
