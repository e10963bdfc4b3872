//! Mass units
//!
//! Kilograms are the stored unit. Pounds only exist at the presentation
//! boundary, and every conversion rounds to a whole number.

use serde::{Deserialize, Serialize};

/// Pounds per kilogram
pub const LBS_PER_KG: f64 = 2.20462;

/// Kilograms to whole pounds
pub fn kg_to_lbs(kg: f64) -> i64 {
    (kg * LBS_PER_KG).round() as i64
}

/// Pounds to whole kilograms
pub fn lbs_to_kg(lbs: f64) -> i64 {
    (lbs / LBS_PER_KG).round() as i64
}

/// Unit a weight was entered in, or should be displayed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MassUnit {
    Kg,
    #[default]
    Lbs,
}

impl MassUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            MassUnit::Kg => "kg",
            MassUnit::Lbs => "lbs",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "kgs" | "kilogram" | "kilograms" => Some(MassUnit::Kg),
            "lb" | "lbs" | "pound" | "pounds" => Some(MassUnit::Lbs),
            _ => None,
        }
    }

    /// Convert a value in this unit to the stored kilogram value
    pub fn to_kg(&self, value: f64) -> f64 {
        match self {
            MassUnit::Kg => value,
            MassUnit::Lbs => lbs_to_kg(value) as f64,
        }
    }

    /// Convert a stored kilogram value for display in this unit
    pub fn from_kg(&self, kg: f64) -> f64 {
        match self {
            MassUnit::Kg => kg,
            MassUnit::Lbs => kg_to_lbs(kg) as f64,
        }
    }
}
