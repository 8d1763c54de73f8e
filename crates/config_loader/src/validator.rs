//! Validation rules beyond the declarative field checks
//!
//! Session:
//! - declarative rules (`SessionConfig::check`)
//! - `max_analog_frequency` >= 1 Hz (the common rate search is integral)
//! - output option names not blank
//!
//! Input:
//! - rates and start times finite, rates >= 0
//! - group rate > 0 when one of its channels inherits
//! - marker labels unique, analog labels unique
//! - platform manufacturer present

use std::collections::HashSet;

use contracts::{Channel, ChannelGroup, ContractError, SessionConfig, SyncInput};

pub fn validate_session(config: &SessionConfig) -> Result<(), ContractError> {
    config.check()?;

    if config.synchronizer.max_analog_frequency < 1.0 {
        return Err(ContractError::config_validation(
            "synchronizer.max_analog_frequency",
            format!(
                "must be >= 1 Hz, got {}",
                config.synchronizer.max_analog_frequency
            ),
        ));
    }

    if let Some(name) = config.output.keys().find(|name| name.trim().is_empty()) {
        return Err(ContractError::config_validation(
            format!("output[{name:?}]"),
            "option name cannot be empty",
        ));
    }
    Ok(())
}

pub fn validate_input(input: &SyncInput) -> Result<(), ContractError> {
    for (idx, group) in input.groups.iter().enumerate() {
        validate_group(idx, group)?;
    }
    validate_unique_labels(
        "markers",
        input.groups.iter().flat_map(|g| g.markers.iter().map(|m| m.label())),
    )?;
    validate_unique_labels(
        "analogs",
        input.groups.iter().flat_map(|g| g.analogs.iter().map(|a| a.label())),
    )?;
    validate_platforms(input)?;
    Ok(())
}

fn validate_group(idx: usize, group: &ChannelGroup) -> Result<(), ContractError> {
    let field = |name: &str| format!("groups[{idx}].{name}");

    if !group.rate.is_finite() || group.rate < 0.0 {
        return Err(ContractError::config_validation(
            field("rate"),
            format!("rate must be finite and >= 0, got {}", group.rate),
        ));
    }
    if !group.start_time.is_finite() {
        return Err(ContractError::config_validation(
            field("start_time"),
            "start_time must be finite",
        ));
    }

    let channels = group
        .markers
        .iter()
        .map(|m| ("markers", m as &dyn Channel))
        .chain(group.analogs.iter().map(|a| ("analogs", a as &dyn Channel)));
    for (kind, channel) in channels {
        let rate = channel.rate();
        let path = || field(&format!("{kind}[{}]", channel.label()));
        if !rate.is_finite() || rate < 0.0 {
            return Err(ContractError::config_validation(
                path(),
                format!("rate must be finite and >= 0, got {rate}"),
            ));
        }
        if !channel.start_time().is_finite() {
            return Err(ContractError::config_validation(
                path(),
                "start_time must be finite",
            ));
        }
        if rate == 0.0 && group.rate <= 0.0 {
            return Err(ContractError::config_validation(
                path(),
                format!(
                    "channel inherits the rate of group '{}' which has none",
                    group.name
                ),
            ));
        }
    }
    Ok(())
}

fn validate_unique_labels<'a>(
    collection: &str,
    labels: impl Iterator<Item = &'a str>,
) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for label in labels {
        if !seen.insert(label) {
            return Err(ContractError::config_validation(
                format!("{collection}[label={label}]"),
                "duplicate label",
            ));
        }
    }
    Ok(())
}

fn validate_platforms(input: &SyncInput) -> Result<(), ContractError> {
    for (idx, platform) in input.platforms.iter().enumerate() {
        if platform.manufacturer.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("platforms[{idx}].manufacturer"),
                "manufacturer cannot be empty",
            ));
        }
    }
    Ok(())
}
