//! Weight conversion tool

use serde::Serialize;

use super::workouts::parse_unit;
use crate::scoring::{kg_to_lbs, lbs_to_kg, MassUnit};

#[derive(Debug, Serialize)]
pub struct ConvertWeightResponse {
    pub input: f64,
    pub input_unit: &'static str,
    pub kg: f64,
    pub lbs: f64,
}

/// Show a weight in both units, rounded the way logged weights are
pub fn convert_weight(value: f64, from_unit: Option<&str>) -> Result<ConvertWeightResponse, String> {
    if !value.is_finite() {
        return Err(format!("Invalid weight: {}", value));
    }
    let unit = parse_unit(from_unit)?;
    let (kg, lbs) = match unit {
        MassUnit::Kg => (value, kg_to_lbs(value) as f64),
        MassUnit::Lbs => (lbs_to_kg(value) as f64, value),
    };
    Ok(ConvertWeightResponse {
        input: value,
        input_unit: unit.as_str(),
        kg,
        lbs,
    })
}
