use std::sync::{Arc, Mutex, MutexGuard};

use crate::alphabet::Positions;
use crate::history::HistoryEntry;
use crate::machine::{EnigmaError, Machine};
use crate::settings::MachineSettings;

/// Cloneable handle for sharing one machine between threads.
///
/// Every call holds the lock for its whole duration, so a letter always sees
/// the rotor triple, plugboard and reflector as one consistent snapshot and
/// a message is never interleaved with another caller's keys.
#[derive(Clone, Debug)]
pub struct MachineSession {
    inner: Arc<Mutex<Machine>>,
}

impl MachineSession {
    pub fn new(machine: Machine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(machine)),
        }
    }

    pub fn from_settings(settings: &MachineSettings) -> Result<Self, EnigmaError> {
        Ok(Self::new(settings.build()?))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Machine>, EnigmaError> {
        self.inner.lock().map_err(|_| EnigmaError::SessionPoisoned)
    }

    pub fn encrypt_letter(&self, input: char) -> Result<char, EnigmaError> {
        self.lock()?.encrypt_letter(input)
    }

    pub fn encrypt_message(&self, message: &str) -> Result<String, EnigmaError> {
        self.lock()?.encrypt_message(message)
    }

    pub fn positions(&self) -> Result<Positions, EnigmaError> {
        Ok(self.lock()?.positions())
    }

    pub fn reset(&self, positions: Positions) -> Result<(), EnigmaError> {
        self.lock()?.reset(positions);
        Ok(())
    }

    pub fn history(&self) -> Result<Vec<HistoryEntry>, EnigmaError> {
        Ok(self.lock()?.history().to_vec())
    }

    pub fn clear_history(&self) -> Result<(), EnigmaError> {
        self.lock()?.clear_history();
        Ok(())
    }

    /// Runs `f` with exclusive access to the machine.
    pub fn with_machine<T>(&self, f: impl FnOnce(&mut Machine) -> T) -> Result<T, EnigmaError> {
        Ok(f(&mut *self.lock()?))
    }
}
