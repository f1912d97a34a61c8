//! Decoder for strategy data codes.
//!
//! A data code is a url-safe base64 string (no padding) wrapping a gzip
//! stream wrapping the JSON document exported by the timeline editor. The
//! decoder is one-shot and pure: the same string always yields the same
//! document.

use std::io::Read;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Top-level structure of an exported strategy document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrategyDoc {
    pub version: String,
    pub scenario_list: Vec<Scenario>,
    pub active_scenario_id: String,
    pub system_constants: SystemConstants,
}

/// A single battle scenario.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    pub data: ScenarioData,
}

/// Tracks and timing parameters of one scenario.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScenarioData {
    pub tracks: Vec<Track>,
    pub prep_duration: f64,
}

/// Combat actions for a single party member. Track order determines the
/// operator index (first track = operator 1).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Track {
    pub id: String,
    pub actions: Vec<RawAction>,
}

/// One action on a track, as authored in the editor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAction {
    pub instance_id: String,
    /// "attack", "skill", "link", "ultimate", "dodge", "execution", ...
    #[serde(rename = "type")]
    pub action_type: String,
    pub start_time: f64,
    pub duration: f64,
    pub sp_cost: f64,
    pub gauge_cost: f64,
    pub animation_time: f64,
}

/// Editor-wide tuning values. Non-positive values mean "use the default".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemConstants {
    pub max_sp: f64,
    pub initial_sp: f64,
    pub sp_regen_rate: f64,
    pub skill_sp_cost_default: f64,
}

/// Decode a data code into a [`StrategyDoc`].
pub fn decode_data_code(data_code: &str) -> Result<StrategyDoc, DecodeError> {
    let data_code = data_code.trim();
    if data_code.is_empty() {
        return Err(DecodeError::EmptyCode);
    }

    let compressed = URL_SAFE_NO_PAD.decode(data_code)?;

    let mut decoder = GzDecoder::new(compressed.as_slice());
    let mut json_bytes = Vec::new();
    decoder.read_to_end(&mut json_bytes)?;

    Ok(serde_json::from_slice(&json_bytes)?)
}
