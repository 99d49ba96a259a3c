//! Core types and primitives for a three-rotor Enigma I simulator.
//!
//! A [`Machine`] pushes each key press through the plugboard, the right,
//! middle and left rotors, the reflector, back through the rotors and out
//! through the plugboard, then advances the rotors. Two machines built from
//! the same [`MachineSettings`] are inverses of each other.
//!
//! ```
//! use enigma_core::MachineSettings;
//!
//! let settings = MachineSettings::default();
//! let mut encoder = settings.build().unwrap();
//! let mut decoder = settings.build().unwrap();
//!
//! let ciphertext = encoder.encrypt_message("ATTACK AT DAWN").unwrap();
//! assert_eq!(decoder.encrypt_message(&ciphertext).unwrap(), "ATTACK AT DAWN");
//! ```

pub mod alphabet;
pub mod history;
pub mod machine;
pub mod pipeline;
pub mod plugboard;
pub mod reflector;
pub mod rng;
pub mod rotor;
pub mod session;
pub mod settings;
pub mod stepping;
pub mod versioning;

pub use crate::alphabet::{ALPHABET, LETTER_COUNT, Letter, Positions};
pub use crate::history::{HistoryEntry, HistoryRecorder, StepExplanation};
pub use crate::machine::{EnigmaError, Machine};
pub use crate::pipeline::{SignalPath, Stage, StageRecord, encipher};
pub use crate::plugboard::Plugboard;
pub use crate::reflector::{REFLECTOR_B_WIRING, Reflector};
pub use crate::rng::{SecureRng, derive_key_rng, secure_rng};
pub use crate::rotor::{RotorSlot, RotorSpec, RotorStack, RotorState, RotorType};
pub use crate::session::MachineSession;
pub use crate::settings::{
    KEY_SHEET_PLUG_PAIRS, MachineSettings, ReflectorChoice, ReflectorType, RotorChoice,
    RotorSettings,
};
pub use crate::stepping::{StepTrace, SteppingController};
pub use crate::versioning::*;
