// ── Device model table and typed domain values ──

use serde::{Deserialize, Serialize};

use tesyctl_api::{RawSnapshot, fields};

/// Static description of one known heater family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceModel {
    /// Numeric device-type id as reported in the `id` field.
    pub type_id: &'static str,
    pub name: &'static str,
    pub min_setpoint: u8,
    pub max_setpoint: u8,
    /// Shower-scale models use a discrete 0..=4 step instead of °C.
    pub uses_showers: bool,
}

/// The known heater families.
///
/// BelliSlimo variants count showers; the actual maximum depends on the
/// tank size and the mounting position and is reported at runtime in
/// `tmpMX`.
pub const DEVICE_MODELS: &[DeviceModel] = &[
    DeviceModel {
        type_id: "2000",
        name: "ModEco",
        min_setpoint: 15,
        max_setpoint: 75,
        uses_showers: false,
    },
    DeviceModel {
        type_id: "2002",
        name: "BelliSlimo",
        min_setpoint: 0,
        max_setpoint: 4,
        uses_showers: true,
    },
    DeviceModel {
        type_id: "2003",
        name: "BiLight Smart",
        min_setpoint: 15,
        max_setpoint: 75,
        uses_showers: false,
    },
    DeviceModel {
        type_id: "2004",
        name: "ModEco 2",
        min_setpoint: 15,
        max_setpoint: 75,
        uses_showers: false,
    },
    DeviceModel {
        type_id: "2005",
        name: "BelliSlimo Lite",
        min_setpoint: 0,
        max_setpoint: 4,
        uses_showers: true,
    },
];

/// Look up a model by its numeric type id.
pub fn model_for(type_id: &str) -> Option<&'static DeviceModel> {
    DEVICE_MODELS.iter().find(|m| m.type_id == type_id)
}

/// Stable identity of one physical heater, derived from the first
/// successful snapshot. Identity fields never change across polls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceIdentity {
    pub mac: String,
    pub type_id: String,
    pub model: Option<&'static DeviceModel>,
    pub software_version: Option<String>,
    pub hardware_version: Option<String>,
}

impl DeviceIdentity {
    /// Extract the identity, if the snapshot carries the MAC.
    pub fn from_snapshot(snapshot: &RawSnapshot) -> Option<Self> {
        let mac = snapshot.get(fields::MAC)?.to_owned();
        let type_id = snapshot.get(fields::DEVICE_TYPE).unwrap_or("").to_owned();
        Some(Self {
            model: model_for(&type_id),
            mac,
            type_id,
            software_version: snapshot.get(fields::SOFTWARE_VERSION).map(str::to_owned),
            hardware_version: snapshot.get(fields::HARDWARE_VERSION).map(str::to_owned),
        })
    }

    /// Model name, or the raw type id for families we don't know.
    pub fn model_name(&self) -> &str {
        self.model.map(|m| m.name).unwrap_or(&self.type_id)
    }
}

/// Operating mode of the heater's controller.
///
/// P1..P3 are schedule programs (P1 and P2 pre-heat so the target is
/// reached at the scheduled time; P3 behaves like a plain thermostat).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    Manual,
    Program1,
    Program2,
    Program3,
    Eco,
    EcoComfort,
    EcoNight,
    /// A wire code outside the documented `0`..`6` range.
    #[serde(untagged)]
    Unknown(String),
}

impl Mode {
    /// Parse the `mode` field wire code.
    pub fn from_code(code: &str) -> Self {
        match code {
            "0" => Self::Manual,
            "1" => Self::Program1,
            "2" => Self::Program2,
            "3" => Self::Program3,
            "4" => Self::Eco,
            "5" => Self::EcoComfort,
            "6" => Self::EcoNight,
            other => Self::Unknown(other.to_owned()),
        }
    }

    /// The code to send when selecting this mode.
    pub fn wire_code(&self) -> &str {
        match self {
            Self::Manual => "0",
            Self::Program1 => "1",
            Self::Program2 => "2",
            Self::Program3 => "3",
            Self::Eco => "4",
            Self::EcoComfort => "5",
            Self::EcoNight => "6",
            Self::Unknown(code) => code,
        }
    }

    /// Human-readable mode name. Unmapped codes keep the raw code
    /// visible rather than hiding it behind a generic label.
    pub fn text(&self) -> String {
        match self {
            Self::Manual => "manual".into(),
            Self::Program1 => "P1".into(),
            Self::Program2 => "P2".into(),
            Self::Program3 => "P3".into(),
            Self::Eco => "eco".into(),
            Self::EcoComfort => "eco-comfort".into(),
            Self::EcoNight => "eco-night".into(),
            Self::Unknown(code) => format!("unknown mode ({code})"),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text())
    }
}

/// Mounting position of the tank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Vertical,
    Horizontal,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vertical => f.write_str("vertical"),
            Self::Horizontal => f.write_str("horizontal"),
        }
    }
}
