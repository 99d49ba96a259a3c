//! Machine configuration as a versioned, serde-backed document.

use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Deserializer, Serialize};

use crate::alphabet::{Letter, Positions};
use crate::machine::{EnigmaError, Machine};
use crate::plugboard::Plugboard;
use crate::reflector::Reflector;
use crate::rotor::{RotorSpec, RotorStack, RotorState, RotorType};
use crate::versioning::{MACHINE_SETTINGS_VERSION, expect_version};

/// Cables used by the random key generator, as on period key sheets.
pub const KEY_SHEET_PLUG_PAIRS: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RotorChoice {
    Catalog(RotorType),
    Custom {
        name: String,
        wiring: String,
        notch: char,
    },
}

impl RotorChoice {
    fn spec(&self) -> Result<Arc<RotorSpec>, EnigmaError> {
        match self {
            RotorChoice::Catalog(rotor) => Ok(rotor.spec()),
            RotorChoice::Custom {
                name,
                wiring,
                notch,
            } => Ok(Arc::new(RotorSpec::new(name.clone(), wiring, *notch)?)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotorSettings {
    pub rotor: RotorChoice,
    pub position: Letter,
    pub ring: Letter,
}

impl RotorSettings {
    pub fn catalog(rotor: RotorType) -> Self {
        Self {
            rotor: RotorChoice::Catalog(rotor),
            position: Letter::A,
            ring: Letter::A,
        }
    }

    fn state(&self) -> Result<RotorState, EnigmaError> {
        Ok(RotorState::new(self.rotor.spec()?, self.position, self.ring))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReflectorType {
    B,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReflectorChoice {
    Catalog(ReflectorType),
    Custom { wiring: String },
}

impl ReflectorChoice {
    fn reflector(&self) -> Result<Reflector, EnigmaError> {
        match self {
            ReflectorChoice::Catalog(ReflectorType::B) => Ok(Reflector::b()),
            ReflectorChoice::Custom { wiring } => Reflector::new("custom", wiring),
        }
    }
}

/// Full key for one machine: rotor order, ring settings, start positions,
/// reflector and plugboard cabling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MachineSettings {
    pub version: u16,
    /// Left, middle, right.
    pub rotors: [RotorSettings; 3],
    pub reflector: ReflectorChoice,
    /// Space separated pairs, e.g. `"AB CD"`.
    pub plugboard: String,
}

impl<'de> Deserialize<'de> for MachineSettings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Helper {
            version: u16,
            rotors: [RotorSettings; 3],
            reflector: ReflectorChoice,
            #[serde(default)]
            plugboard: String,
        }
        let helper = Helper::deserialize(deserializer)?;
        expect_version::<D::Error>(helper.version, MACHINE_SETTINGS_VERSION, "MachineSettings")?;
        Ok(Self {
            version: helper.version,
            rotors: helper.rotors,
            reflector: helper.reflector,
            plugboard: helper.plugboard,
        })
    }
}

impl Default for MachineSettings {
    /// Rotors I, II, III at `A-A-A`, rings `A-A-A`, reflector B, no cables.
    fn default() -> Self {
        Self {
            version: MACHINE_SETTINGS_VERSION,
            rotors: [
                RotorSettings::catalog(RotorType::I),
                RotorSettings::catalog(RotorType::II),
                RotorSettings::catalog(RotorType::III),
            ],
            reflector: ReflectorChoice::Catalog(ReflectorType::B),
            plugboard: String::new(),
        }
    }
}

impl MachineSettings {
    pub fn with_rotors(mut self, rotors: [RotorType; 3]) -> Self {
        for (slot, rotor) in self.rotors.iter_mut().zip(rotors) {
            slot.rotor = RotorChoice::Catalog(rotor);
        }
        self
    }

    pub fn with_positions(mut self, positions: Positions) -> Self {
        let letters = [positions.left, positions.middle, positions.right];
        for (slot, position) in self.rotors.iter_mut().zip(letters) {
            slot.position = position;
        }
        self
    }

    pub fn with_rings(mut self, rings: Positions) -> Self {
        let letters = [rings.left, rings.middle, rings.right];
        for (slot, ring) in self.rotors.iter_mut().zip(letters) {
            slot.ring = ring;
        }
        self
    }

    pub fn with_plugboard(mut self, plugboard: impl Into<String>) -> Self {
        self.plugboard = plugboard.into();
        self
    }

    pub fn positions(&self) -> Positions {
        let [left, middle, right] = &self.rotors;
        Positions::new(left.position, middle.position, right.position)
    }

    pub fn rings(&self) -> Positions {
        let [left, middle, right] = &self.rotors;
        Positions::new(left.ring, middle.ring, right.ring)
    }

    /// Validates every component and assembles a machine. Any invalid wiring,
    /// reflector or plugboard pair is rejected here.
    pub fn build(&self) -> Result<Machine, EnigmaError> {
        let [left, middle, right] = &self.rotors;
        let rotors = RotorStack::new(left.state()?, middle.state()?, right.state()?);
        let plugboard: Plugboard = self.plugboard.parse()?;
        let reflector = self.reflector.reflector()?;
        Ok(Machine::new(rotors, plugboard, reflector))
    }

    /// Draws a key: three distinct catalog rotors, random rings and start
    /// positions, and ten plugboard cables.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let chosen: Vec<RotorType> = RotorType::ALL.choose_multiple(rng, 3).copied().collect();
        let rotors = [0, 1, 2].map(|slot| RotorSettings {
            rotor: RotorChoice::Catalog(chosen[slot]),
            position: random_letter(rng),
            ring: random_letter(rng),
        });
        let mut letters: Vec<Letter> = Letter::all().collect();
        letters.shuffle(rng);
        let pairs: Vec<String> = letters
            .chunks(2)
            .take(KEY_SHEET_PLUG_PAIRS)
            .map(|pair| {
                let (a, b) = if pair[0] < pair[1] {
                    (pair[0], pair[1])
                } else {
                    (pair[1], pair[0])
                };
                format!("{a}{b}")
            })
            .collect();
        Self {
            version: MACHINE_SETTINGS_VERSION,
            rotors,
            reflector: ReflectorChoice::Catalog(ReflectorType::B),
            plugboard: pairs.join(" "),
        }
    }
}

fn random_letter<R: Rng + ?Sized>(rng: &mut R) -> Letter {
    Letter::wrapping(rng.gen_range(0..26))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::derive_key_rng;
    use std::collections::HashSet;

    #[test]
    fn default_settings_build_reference_machine() {
        let mut machine = MachineSettings::default().build().unwrap();
        assert_eq!(machine.encrypt_letter('A').unwrap(), 'U');
        assert_eq!(machine.positions().to_string(), "A-A-B");
    }

    #[test]
    fn builder_overrides_apply_per_slot() {
        let settings = MachineSettings::default()
            .with_rotors([RotorType::IV, RotorType::V, RotorType::I])
            .with_positions("XYZ".parse().unwrap())
            .with_rings("BCD".parse().unwrap())
            .with_plugboard("AB");
        assert_eq!(settings.positions().to_string(), "X-Y-Z");
        assert_eq!(settings.rings().to_string(), "B-C-D");
        let machine = settings.build().unwrap();
        assert_eq!(machine.rotors().names(), ["IV", "V", "I"].map(String::from));
        assert_eq!(machine.rotors().right().ring_setting().to_char(), 'D');
        assert_eq!(machine.plugboard().to_string(), "AB");
    }

    #[test]
    fn json_roundtrip_with_custom_parts() {
        let mut settings = MachineSettings::default().with_plugboard("AQ BW");
        settings.rotors[0].rotor = RotorChoice::Custom {
            name: "shifted".into(),
            wiring: "BCDEFGHIJKLMNOPQRSTUVWXYZA".into(),
            notch: 'M',
        };
        settings.reflector = ReflectorChoice::Custom {
            wiring: crate::reflector::REFLECTOR_B_WIRING.into(),
        };
        let encoded = serde_json::to_string(&settings).unwrap();
        let decoded: MachineSettings = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, settings);
        assert!(decoded.build().is_ok());
    }

    #[test]
    fn catalog_names_serialize_as_strings() {
        let value = serde_json::to_value(MachineSettings::default()).unwrap();
        assert_eq!(value["rotors"][2]["rotor"], "III");
        assert_eq!(value["rotors"][2]["position"], "A");
        assert_eq!(value["reflector"], "B");
        assert_eq!(value["version"], 1);
    }

    #[test]
    fn version_mismatch_rejected() {
        let json = r#"{
            "version": 9,
            "rotors": [
                {"rotor": "I", "position": "A", "ring": "A"},
                {"rotor": "II", "position": "A", "ring": "A"},
                {"rotor": "III", "position": "A", "ring": "A"}
            ],
            "reflector": "B"
        }"#;
        let err = serde_json::from_str::<MachineSettings>(json).unwrap_err();
        assert!(err.to_string().contains("version mismatch"));
    }

    #[test]
    fn invalid_parts_fail_at_build() {
        let bad_plugboard = MachineSettings::default().with_plugboard("AB AC");
        assert!(matches!(
            bad_plugboard.build().unwrap_err(),
            EnigmaError::PlugboardLetterReused(_)
        ));

        let mut bad_rotor = MachineSettings::default();
        bad_rotor.rotors[1].rotor = RotorChoice::Custom {
            name: "dup".into(),
            wiring: "ABCDEFGHIJKLMNOPQRSTUVWXYY".into(),
            notch: 'A',
        };
        assert!(matches!(
            bad_rotor.build().unwrap_err(),
            EnigmaError::DuplicateWiring { .. }
        ));

        let mut bad_reflector = MachineSettings::default();
        bad_reflector.reflector = ReflectorChoice::Custom {
            wiring: "ABCDEFGHIJKLMNOPQRSTUVWXYZ".into(),
        };
        assert!(matches!(
            bad_reflector.build().unwrap_err(),
            EnigmaError::ReflectorFixedPoint { .. }
        ));
    }

    #[test]
    fn random_key_is_valid_and_reproducible() {
        let a = MachineSettings::random(&mut derive_key_rng(b"sheet", b"day-1"));
        let b = MachineSettings::random(&mut derive_key_rng(b"sheet", b"day-1"));
        assert_eq!(a, b);

        let names: HashSet<_> = a
            .rotors
            .iter()
            .map(|slot| match &slot.rotor {
                RotorChoice::Catalog(rotor) => *rotor,
                RotorChoice::Custom { .. } => panic!("random keys use catalog rotors"),
            })
            .collect();
        assert_eq!(names.len(), 3);

        let machine = a.build().unwrap();
        assert_eq!(machine.plugboard().pairs().len(), KEY_SHEET_PLUG_PAIRS);
    }
}
