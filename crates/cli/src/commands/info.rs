//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{Channel, ChannelGroup, SyncInput, SynchronizerConfig};
use serde::Serialize;
use tracing::info;

use super::load_session;
use crate::cli::InfoArgs;

/// Input info for JSON output
#[derive(Serialize)]
struct InputInfo {
    groups: Vec<GroupInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    platforms: Vec<PlatformInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    common_analog_frequency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rate_error: Option<String>,
}

#[derive(Serialize)]
struct GroupInfo {
    name: String,
    rate: f64,
    start_time: f64,
    markers: Vec<ChannelInfo>,
    analogs: Vec<ChannelInfo>,
}

#[derive(Serialize)]
struct ChannelInfo {
    label: String,
    /// Effective rate after group inheritance
    rate: f64,
    start_time: f64,
    samples: usize,
}

#[derive(Serialize)]
struct PlatformInfo {
    manufacturer: String,
    channels: Vec<u32>,
    calibrated: bool,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(input = %args.input.display(), "Loading input info");

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let session = load_session(args.config.as_deref())?;
    let input = config_loader::ConfigLoader::load_input_from_path(&args.input)
        .with_context(|| format!("Failed to load input from {}", args.input.display()))?;

    let info = build_input_info(&input, &session.synchronizer);
    if args.json {
        let json = serde_json::to_string_pretty(&info).context("Failed to serialize input info")?;
        println!("{}", json);
    } else {
        print_input_info(&info);
    }

    Ok(())
}

fn channel_info(group: &ChannelGroup, channel: &dyn Channel) -> ChannelInfo {
    let (rate, start_time) = group.timing_of(channel.rate(), channel.start_time());
    ChannelInfo {
        label: channel.label().to_string(),
        rate,
        start_time,
        samples: channel.len(),
    }
}

fn build_input_info(input: &SyncInput, config: &SynchronizerConfig) -> InputInfo {
    let groups: Vec<GroupInfo> = input
        .groups
        .iter()
        .map(|group| GroupInfo {
            name: group.name.clone(),
            rate: group.rate,
            start_time: group.start_time,
            markers: group
                .markers
                .iter()
                .map(|m| channel_info(group, m))
                .collect(),
            analogs: group
                .analogs
                .iter()
                .map(|a| channel_info(group, a))
                .collect(),
        })
        .collect();

    // the first marker sets the frame clock; every analog joins it
    let mut rates: Vec<f64> = groups
        .iter()
        .flat_map(|g| g.markers.first())
        .take(1)
        .map(|m| m.rate)
        .collect();
    rates.extend(groups.iter().flat_map(|g| g.analogs.iter().map(|a| a.rate)));

    let (common_analog_frequency, rate_error) = if rates.is_empty() {
        (None, None)
    } else {
        match sync_engine::derive_common_rate(&rates, config) {
            Ok(rate) => (Some(rate), None),
            Err(e) => (None, Some(e.to_string())),
        }
    };

    let platforms = input
        .platforms
        .iter()
        .map(|p| PlatformInfo {
            manufacturer: p.manufacturer.clone(),
            channels: p.channels.clone(),
            calibrated: p.calibration.is_some(),
        })
        .collect();

    InputInfo {
        groups,
        platforms,
        common_analog_frequency,
        rate_error,
    }
}

fn print_input_info(info: &InputInfo) {
    println!("\n=== Input Summary ===\n");
    for group in &info.groups {
        println!(
            "Group '{}' ({} Hz, start {} s)",
            group.name, group.rate, group.start_time
        );
        for (kind, channels) in [("marker", &group.markers), ("analog", &group.analogs)] {
            for channel in channels {
                println!(
                    "  - {} {} : {} Hz, {} samples, start {} s",
                    kind, channel.label, channel.rate, channel.samples, channel.start_time
                );
            }
        }
    }

    if !info.platforms.is_empty() {
        println!("\nForce platforms ({}):", info.platforms.len());
        for platform in &info.platforms {
            println!(
                "  - {} channels {:?}{}",
                platform.manufacturer,
                platform.channels,
                if platform.calibrated { " (calibrated)" } else { "" }
            );
        }
    }

    match (&info.common_analog_frequency, &info.rate_error) {
        (Some(rate), _) => println!("\nCommon analog frequency: {} Hz", rate),
        (None, Some(error)) => println!("\nCommon analog frequency: unresolved ({})", error),
        (None, None) => {}
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{AnalogChannel, MarkerChannel};

    #[test]
    fn test_common_frequency_preview() {
        let input = SyncInput {
            groups: vec![
                ChannelGroup::new("vicon", 100.0).with_marker(MarkerChannel::new("LASI", 0.0)),
                ChannelGroup::new("adc", 1000.0)
                    .with_analog(AnalogChannel::new("FZ1", 0.0))
                    .with_analog(AnalogChannel::new("EMG1", 250.0)),
            ],
            platforms: Vec::new(),
        };
        let info = build_input_info(&input, &SynchronizerConfig::default());
        assert_eq!(info.common_analog_frequency, Some(1000.0));
        assert_eq!(info.groups[1].analogs[0].rate, 1000.0);
        assert_eq!(info.groups[0].markers[0].rate, 100.0);
    }

    #[test]
    fn test_unresolved_frequency_is_reported() {
        let input = SyncInput {
            groups: vec![ChannelGroup::new("adc", 0.0).with_analog(AnalogChannel::new("A", 0.0))],
            platforms: Vec::new(),
        };
        let info = build_input_info(&input, &SynchronizerConfig::default());
        assert!(info.common_analog_frequency.is_none());
        assert!(info.rate_error.is_some());
    }
}
