//! # Integration Tests
//!
//! Cross-crate end-to-end tests.
//!
//! Covers:
//! - session config + input description -> synchronizer -> frame block
//! - force platform remapping seen through the written block
//! - error propagation across crate boundaries

#[cfg(test)]
mod contract_tests {
    use contracts::ByteOrder;

    #[test]
    fn test_processor_ids_round_trip() {
        for order in ByteOrder::ALL {
            assert_eq!(ByteOrder::from_processor_id(order.processor_id()), Some(order));
        }
    }
}

#[cfg(test)]
mod e2e_tests {
    use codec::{
        read_frames, write_frames, BinaryStream, FileMode, FileStream, FrameLayout, FrameOptions,
        MemoryStream, SeekOrigin, StreamError,
    };
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        Acquisition, ByteOrder, ContractError, SessionConfig, SyncInput, SyncReport, WarningKind,
    };
    use observability::SyncMetricsAggregator;
    use sync_engine::{MismatchKind, SyncError, Synchronizer};

    const SESSION_TOML: &str = r#"
[synchronizer]
rate_tolerance = 1e-6

[output]
Encoding = "VaxLittleEndian"
DataStorage = "Float"
"#;

    fn ramp(len: usize) -> Vec<f64> {
        (0..len).map(|i| i as f64).collect()
    }

    /// Two marker channels at 100 Hz (one short), analogs at 1000 and 500 Hz
    fn capture_toml() -> String {
        format!(
            r#"
[[groups]]
name = "vicon"
rate = 100.0

[[groups.markers]]
label = "LASI"
samples = [
    {{ position = [100.0, 200.0, 300.0], residual = 0.3 }},
    {{ position = [101.0, 201.0, 301.0] }},
    {{ position = [102.0, 202.0, 302.0], occluded = true }},
]

[[groups.markers]]
label = "RASI"
samples = [{{ position = [10.0, 20.0, 30.0] }}, {{ position = [11.0, 21.0, 31.0] }}]

[[groups]]
name = "adc"
rate = 1000.0

[[groups.analogs]]
label = "FZ1"
samples = {:?}

[[groups.analogs]]
label = "EMG1"
rate = 500.0
samples = {:?}
"#,
            ramp(30),
            ramp(15)
        )
    }

    fn synchronize(session: &SessionConfig, input: SyncInput) -> SyncReport {
        Synchronizer::new(session.synchronizer.clone())
            .run(input)
            .unwrap()
    }

    fn frame_options(session: &SessionConfig) -> FrameOptions {
        let mut registry = FrameOptions::registry();
        for (name, value) in &session.output {
            assert!(registry.set(name, value.clone()), "option {name} rejected");
        }
        FrameOptions::from_registry(&registry)
    }

    fn encode(acquisition: &Acquisition, options: &FrameOptions) -> MemoryStream {
        let mut stream = MemoryStream::new();
        let written = write_frames(acquisition, &options.codec(), &mut stream, options).unwrap();
        assert_eq!(written as usize, FrameLayout::of(acquisition, options).byte_len());
        stream.seek(0, SeekOrigin::Begin).unwrap();
        stream
    }

    #[test]
    fn test_capture_to_vax_frame_block() {
        let session = ConfigLoader::load_from_str(SESSION_TOML, ConfigFormat::Toml).unwrap();
        let input = ConfigLoader::load_input_from_str(&capture_toml(), ConfigFormat::Toml).unwrap();
        let report = synchronize(&session, input);
        let acquisition = &report.acquisition;

        assert_eq!(acquisition.point_frequency, 100.0);
        assert_eq!(acquisition.analog_frequency(), 1000.0);
        assert_eq!(acquisition.point_frame_count, 3);
        assert_eq!(acquisition.first_frame, 1);
        assert_eq!(report.count(WarningKind::FramePadded), 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(acquisition.point("RASI").unwrap().samples[2].occluded);

        let options = frame_options(&session);
        assert_eq!(options.encoding, ByteOrder::VaxLittleEndian);

        let mut stream = encode(acquisition, &options);
        // 3 frames * (2 markers * 4 + 10 sub-frames * 2 analogs) words of 4 bytes
        assert_eq!(stream.len(), 3 * 28 * 4);

        let layout = FrameLayout::of(acquisition, &options);
        let (markers, analogs) = read_frames(&options.codec(), &mut stream, &layout).unwrap();
        assert!(stream.at_end());

        let lasi = &markers[0];
        assert_eq!(lasi[0].position, [100.0, 200.0, 300.0]);
        assert!((lasi[0].residual - 0.3).abs() < 1e-9);
        // unknown residual is stored as the smallest valid step
        assert!((lasi[1].residual - 0.1).abs() < 1e-9);
        assert!(lasi[2].occluded);
        assert!(markers[1][2].occluded);
        assert!(!markers[1][1].occluded);

        for (decoded, channel) in analogs.iter().zip(&acquisition.analogs) {
            assert_eq!(decoded.len(), 30);
            for (a, b) in decoded.iter().zip(&channel.samples) {
                assert!((a - b).abs() < 1e-6);
            }
        }
        // 500 Hz channel doubled with interpolated midpoints
        assert_eq!(analogs[1][1], 0.5);
        assert_eq!(analogs[1][29], 14.0);
    }

    #[test]
    fn test_force_platform_through_integer_file_block() {
        let session_toml = r#"
[synchronizer]
relabel_force_channels = true

[output]
Encoding = "IeeeBigEndian"
DataStorage = "Integer"
PointScale = 0.1
"#;
        let session = ConfigLoader::load_from_str(session_toml, ConfigFormat::Toml).unwrap();

        let analogs: Vec<String> = (1..=6)
            .map(|id| {
                format!(
                    r#"{{ "label": "ch{id}", "hardware_id": {id}, "samples": {:?} }}"#,
                    vec![id as f64; 20]
                )
            })
            .collect();
        let input_json = format!(
            r#"{{
                "groups": [
                    {{ "name": "vicon", "rate": 100.0, "markers": [
                        {{ "label": "HEEL", "samples": [
                            {{ "position": [12.3, -45.6, 7.8], "residual": 0.5 }},
                            {{ "position": [12.4, -45.5, 7.9], "residual": 0.5 }}
                        ] }}
                    ] }},
                    {{ "name": "adc", "rate": 1000.0, "analogs": [{}] }}
                ],
                "platforms": [{{
                    "manufacturer": "AMTI",
                    "corners": [[0,0,0],[600,0,0],[600,400,0],[0,400,0]],
                    "channels": [1, 2, 3, 4, 5, 6]
                }}]
            }}"#,
            analogs.join(", ")
        );
        let input = ConfigLoader::load_input_from_str(&input_json, ConfigFormat::Json).unwrap();
        let report = synchronize(&session, input);
        let acquisition = &report.acquisition;

        let labels: Vec<&str> = acquisition.analogs.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, ["FX", "FY", "FZ", "MX", "MY", "MZ"]);
        assert_eq!(acquisition.analog("MZ").unwrap().unit, "Nmm");
        assert_eq!(acquisition.analog("FX").unwrap().samples[0], -1.0);

        let used = acquisition.metadata.find("FORCE_PLATFORM:USED").unwrap();
        assert_eq!(used.value.as_ref().unwrap().as_integers(), Some(&[1][..]));
        let channel = acquisition.metadata.find("FORCE_PLATFORM:CHANNEL").unwrap();
        assert_eq!(
            channel.value.as_ref().unwrap().as_integers(),
            Some(&[1, 2, 3, 4, 5, 6][..])
        );
        let analog_labels = acquisition.metadata.find("ANALOG:LABELS").unwrap();
        assert_eq!(analog_labels.value.as_ref().unwrap().as_texts().unwrap()[0], "FX");

        let options = frame_options(&session);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.bin");

        let mut stream = FileStream::open(&path, FileMode::Write).unwrap();
        let written = write_frames(acquisition, &options.codec(), &mut stream, &options).unwrap();
        stream.close();
        // 2 frames * (4 + 10 * 6) words of 2 bytes
        assert_eq!(written, 2 * 64 * 2);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), written);

        let mut stream = FileStream::open(&path, FileMode::Read).unwrap();
        let layout = FrameLayout::of(acquisition, &options);
        let (markers, analogs) = read_frames(&options.codec(), &mut stream, &layout).unwrap();

        let heel = &markers[0];
        for (axis, expected) in [12.3, -45.6, 7.8].into_iter().enumerate() {
            assert!((heel[0].position[axis] - expected).abs() < 1e-9);
        }
        assert!((heel[1].residual - 0.5).abs() < 1e-9);
        assert_eq!(analogs[2][19], -3.0);
        assert_eq!(analogs[5][0], -6.0);
    }

    #[test]
    fn test_truncated_block_reports_read_error() {
        let input = ConfigLoader::load_input_from_str(&capture_toml(), ConfigFormat::Toml).unwrap();
        let report = synchronize(&SessionConfig::default(), input);
        let options = FrameOptions::default();

        let full = encode(&report.acquisition, &options).into_bytes();
        let mut truncated = MemoryStream::from_bytes(full.slice(..full.len() - 2));
        let layout = FrameLayout::of(&report.acquisition, &options);

        let err = read_frames(&options.codec(), &mut truncated, &layout).unwrap_err();
        assert!(matches!(
            err,
            StreamError::Read {
                requested: 4,
                available: 2
            }
        ));
    }

    #[test]
    fn test_marker_rate_mismatch_is_fatal() {
        let input_json = r#"{
            "groups": [
                { "name": "a", "rate": 100.0, "markers": [{ "label": "M1" }] },
                { "name": "b", "rate": 120.0, "markers": [{ "label": "M2" }] }
            ]
        }"#;
        let input = ConfigLoader::load_input_from_str(input_json, ConfigFormat::Json).unwrap();
        let err = Synchronizer::default().run(input).unwrap_err();
        assert!(matches!(
            err,
            SyncError::RateMismatch {
                kind: MismatchKind::Rate,
                ref channel,
                ..
            } if channel == "M2"
        ));
    }

    #[test]
    fn test_invalid_input_rejected_before_sync() {
        let input_json = r#"{
            "groups": [
                { "name": "adc", "rate": 0.0, "analogs": [{ "label": "A1" }] }
            ]
        }"#;
        let err = ConfigLoader::load_input_from_str(input_json, ConfigFormat::Json).unwrap_err();
        assert!(matches!(err, ContractError::ConfigValidation { .. }));
    }

    #[test]
    fn test_aggregated_metrics_across_runs() {
        let mut aggregator = SyncMetricsAggregator::new();
        for _ in 0..3 {
            let input =
                ConfigLoader::load_input_from_str(&capture_toml(), ConfigFormat::Toml).unwrap();
            let report = synchronize(&SessionConfig::default(), input);
            observability::record_sync_report(&report);
            aggregator.update(&report);
        }

        let summary = aggregator.summary();
        assert_eq!(summary.total_runs, 3);
        assert_eq!(summary.runs_with_warnings, 3);
        assert_eq!(summary.warning_counts.get("frame_padded"), Some(&3));
        assert!((summary.frames.mean - 3.0).abs() < 1e-9);
    }
}
