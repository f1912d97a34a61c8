//! Shared fixtures for strategy and engine tests: document builders and the
//! inverse of the production decoder (JSON → gzip → url-safe base64).

use std::io::Write;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::strategy::codec::{RawAction, Scenario, ScenarioData, StrategyDoc, Track};

/// Encode a document into a data code the decoder accepts.
pub(crate) fn encode_data_code(doc: &StrategyDoc) -> String {
    let json = serde_json::to_vec(doc).expect("serialize strategy doc");
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json).expect("gzip strategy doc");
    URL_SAFE_NO_PAD.encode(encoder.finish().expect("finish gzip stream"))
}

pub(crate) fn raw_action(action_type: &str, start_time: f64) -> RawAction {
    RawAction {
        instance_id: format!("act_{action_type}_{start_time}"),
        action_type: action_type.to_string(),
        start_time,
        duration: 1.0,
        ..RawAction::default()
    }
}

/// One scenario ("sc_1", active) with one track.
pub(crate) fn single_track_doc(actions: Vec<RawAction>) -> StrategyDoc {
    multi_track_doc(vec![actions])
}

/// One scenario ("sc_1", active) with one track per action list, in order.
pub(crate) fn multi_track_doc(tracks: Vec<Vec<RawAction>>) -> StrategyDoc {
    let tracks = tracks
        .into_iter()
        .enumerate()
        .map(|(i, actions)| Track { id: format!("track_{}", i + 1), actions })
        .collect();

    StrategyDoc {
        version: "1".to_string(),
        scenario_list: vec![Scenario {
            id: "sc_1".to_string(),
            name: "Test Scenario".to_string(),
            data: ScenarioData { tracks, prep_duration: 0.0 },
        }],
        active_scenario_id: "sc_1".to_string(),
        ..StrategyDoc::default()
    }
}
