//! Configuration validation
//!
//! Validation rules:
//! - sink names unique and non-empty
//! - destination ids unique
//! - exclusive destinations carry an origin tag
//! - handler numeric ranges (capacity, segment limit, cadence)
//! - redaction secret values non-empty

use std::collections::HashSet;

use contracts::{CourierBlueprint, CourierError, RoutingMode};
use validator::Validate;

/// Validate a CourierBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &CourierBlueprint) -> Result<(), CourierError> {
    validate_ranges(blueprint)?;
    validate_sinks(blueprint)?;
    validate_destinations(blueprint)?;
    validate_redaction(blueprint)?;
    Ok(())
}

/// Derive-level range checks (capacity, segment limit, intervals)
fn validate_ranges(blueprint: &CourierBlueprint) -> Result<(), CourierError> {
    blueprint.validate().map_err(|e| {
        let field = e
            .field_errors()
            .keys()
            .next()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "handler".to_string());
        CourierError::config_validation(field, e.to_string())
    })
}

/// Validate sink name uniqueness
fn validate_sinks(blueprint: &CourierBlueprint) -> Result<(), CourierError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(CourierError::config_validation(
                format!("sinks[{idx}].name"),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(&sink.name) {
            return Err(CourierError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
    }
    Ok(())
}

/// Validate destination id uniqueness and routing topology
fn validate_destinations(blueprint: &CourierBlueprint) -> Result<(), CourierError> {
    let mut seen = HashSet::new();
    for destination in &blueprint.destinations {
        if !seen.insert(destination.id.as_str()) {
            return Err(CourierError::config_validation(
                format!("destinations[id={}]", destination.id),
                "duplicate destination id",
            ));
        }
        if destination.routing == RoutingMode::Exclusive && destination.origin.is_none() {
            return Err(CourierError::config_validation(
                format!("destinations[id={}].origin", destination.id),
                "exclusive routing requires an origin tag",
            ));
        }
    }
    Ok(())
}

/// Validate redaction secrets
fn validate_redaction(blueprint: &CourierBlueprint) -> Result<(), CourierError> {
    for (idx, secret) in blueprint.redaction.secrets.iter().enumerate() {
        if secret.value.is_empty() {
            return Err(CourierError::config_validation(
                format!("redaction.secrets[{idx}].value"),
                "secret value cannot be empty",
            ));
        }
    }
    Ok(())
}
