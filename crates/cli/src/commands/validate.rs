//! `validate` command implementation.

use anyhow::{Context, Result};
use codec::FrameOptions;
use contracts::SessionConfig;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    rate_tolerance: f64,
    max_analog_frequency: f64,
    flip_force_sign: bool,
    relabel_force_channels: bool,
    encoding: String,
    data_storage: String,
    point_scale: f64,
    log_level: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let (warnings, options) = check_output_options(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    rate_tolerance: config.synchronizer.rate_tolerance,
                    max_analog_frequency: config.synchronizer.max_analog_frequency,
                    flip_force_sign: config.synchronizer.flip_force_sign,
                    relabel_force_channels: config.synchronizer.relabel_force_channels,
                    encoding: options.encoding.to_string(),
                    data_storage: options.storage.as_str().to_string(),
                    point_scale: options.point_scale,
                    log_level: config.logging.level.clone(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Apply `[output]` to the writer registry; rejected entries are non-fatal
fn check_output_options(config: &SessionConfig) -> (Vec<String>, FrameOptions) {
    let mut registry = FrameOptions::registry();
    let mut warnings = Vec::new();

    for (name, value) in &config.output {
        if !registry.available_options().contains(&name.as_str()) {
            warnings.push(format!(
                "Unknown output option '{}' (available: {})",
                name,
                registry.available_options().join(", ")
            ));
        } else if !registry.set(name, value.clone()) {
            let choices: Vec<String> = registry
                .available_choices(name)
                .iter()
                .map(ToString::to_string)
                .collect();
            warnings.push(if choices.is_empty() {
                format!("Output option '{}' rejected value {}", name, value)
            } else {
                format!(
                    "Output option '{}' rejected value {} (choices: {})",
                    name,
                    value,
                    choices.join(", ")
                )
            });
        }
    }

    (warnings, FrameOptions::from_registry(&registry))
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Rate tolerance: {}", summary.rate_tolerance);
            println!("  Max analog frequency: {} Hz", summary.max_analog_frequency);
            println!("  Flip force sign: {}", summary.flip_force_sign);
            println!("  Relabel force channels: {}", summary.relabel_force_channels);
            println!(
                "  Output: {} / {} / point scale {}",
                summary.encoding, summary.data_storage, summary.point_scale
            );
            println!("  Log level: {}", summary.log_level);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
