// Input validation rules for manually entered readings
use super::telemetry::TelemetrySample;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Voltage,
    Current,
    Temperature,
    Capacity,
    CycleNumber,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Voltage => "voltage",
            Field::Current => "current",
            Field::Temperature => "temperature",
            Field::Capacity => "capacity",
            Field::CycleNumber => "cycle_number",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationRule {
    pub field: Field,
    pub label: &'static str,
    pub unit: &'static str,
    pub min: f64,
    pub max: f64,
}

impl ValidationRule {
    pub fn accepts(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn describe_bound(&self, bound: f64) -> String {
        if self.unit.is_empty() {
            format!("{}", bound)
        } else {
            format!("{} {}", bound, self.unit)
        }
    }
}

/// Inclusive bounds, in the order a submission is checked.
pub const VALIDATION_RULES: [ValidationRule; 5] = [
    ValidationRule { field: Field::Voltage, label: "Voltage", unit: "V", min: 2.5, max: 4.5 },
    ValidationRule { field: Field::Current, label: "Current", unit: "A", min: 0.0, max: 10.0 },
    ValidationRule { field: Field::Temperature, label: "Temperature", unit: "°C", min: -20.0, max: 80.0 },
    ValidationRule { field: Field::Capacity, label: "Capacity", unit: "Ah", min: 0.0, max: 120.0 },
    ValidationRule { field: Field::CycleNumber, label: "Cycle number", unit: "", min: 0.0, max: 5000.0 },
];

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{label} must be between {min} and {max}")]
pub struct ValidationError {
    pub field: Field,
    pub value: f64,
    pub label: &'static str,
    pub min: String,
    pub max: String,
}

pub fn rule_for(field: Field) -> &'static ValidationRule {
    // The table covers every Field variant.
    match field {
        Field::Voltage => &VALIDATION_RULES[0],
        Field::Current => &VALIDATION_RULES[1],
        Field::Temperature => &VALIDATION_RULES[2],
        Field::Capacity => &VALIDATION_RULES[3],
        Field::CycleNumber => &VALIDATION_RULES[4],
    }
}

pub fn validate(field: Field, value: f64) -> Result<(), ValidationError> {
    let rule = rule_for(field);
    if rule.accepts(value) {
        Ok(())
    } else {
        Err(ValidationError {
            field,
            value,
            label: rule.label,
            min: rule.describe_bound(rule.min),
            max: rule.describe_bound(rule.max),
        })
    }
}

/// Checks every field in table order and reports the first violation.
pub fn validate_with(value_of: impl Fn(Field) -> f64) -> Result<(), ValidationError> {
    for rule in &VALIDATION_RULES {
        validate(rule.field, value_of(rule.field))?;
    }
    Ok(())
}

pub fn validate_sample(sample: &TelemetrySample) -> Result<(), ValidationError> {
    validate_with(|field| match field {
        Field::Voltage => sample.voltage,
        Field::Current => sample.current,
        Field::Temperature => sample.temperature,
        Field::Capacity => sample.capacity,
        Field::CycleNumber => f64::from(sample.cycle_number),
    })
}
