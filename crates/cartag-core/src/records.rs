//! Loading and saving persisted sample records.
//!
//! Samples are stored as a JSON array or as JSON Lines. Nested fields are
//! decoded leniently because upstream exports (CSV round-trips in particular)
//! often store them as JSON-encoded strings, empty strings, or nulls: any of
//! those decode to an empty value instead of failing the record.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::config::OutputConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::output::{OutputFormat, OutputWriter};
use crate::types::Sample;
use crate::uncertainty::UncertaintyScores;

/// Deserialize a field that may be a value, null, "" or a JSON string.
///
/// Anything that still fails to decode becomes `T::default()`.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce(value))
}

/// Like [`lenient`] for per-category maps, but entries are decoded one at a
/// time: a bad entry is dropped without losing its siblings.
pub(crate) fn lenient_map<'de, D, V>(
    deserializer: D,
) -> Result<BTreeMap<String, V>, D::Error>
where
    D: Deserializer<'de>,
    V: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_map(value, |entry| serde_json::from_value(entry).ok()))
}

/// Per-category uncertainty where each score field may be missing.
pub(crate) fn lenient_uncertainty<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, UncertaintyScores>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_map(value, |entry| {
        serde_json::from_value::<PersistedScores>(entry)
            .ok()
            .map(UncertaintyScores::from)
    }))
}

/// Stored uncertainty record. Missing fields read as "no uncertainty":
/// entropy 0, margin 1, max_confidence 0.
#[derive(Deserialize)]
#[serde(default)]
struct PersistedScores {
    entropy: f64,
    margin: f64,
    max_confidence: f64,
}

impl Default for PersistedScores {
    fn default() -> Self {
        Self {
            entropy: 0.0,
            margin: 1.0,
            max_confidence: 0.0,
        }
    }
}

impl From<PersistedScores> for UncertaintyScores {
    fn from(p: PersistedScores) -> Self {
        Self {
            entropy: p.entropy,
            margin: p.margin,
            max_confidence: p.max_confidence,
        }
    }
}

/// Unwrap null, blank and JSON-encoded strings. `None` means "empty".
fn decode_cell(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => serde_json::from_str::<Value>(&s).ok(),
        other => Some(other),
    }
}

fn coerce<T: DeserializeOwned + Default>(value: Value) -> T {
    decode_cell(value)
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

fn coerce_map<V>(value: Value, decode: impl Fn(Value) -> Option<V>) -> BTreeMap<String, V> {
    let Some(Value::Object(entries)) = decode_cell(value) else {
        return BTreeMap::new();
    };
    entries
        .into_iter()
        .filter_map(|(key, entry)| match decode(entry) {
            Some(decoded) => Some((key, decoded)),
            None => {
                tracing::debug!("Dropping undecodable '{key}' entry");
                None
            }
        })
        .collect()
}

/// Samples read from disk plus a count of records that were skipped.
#[derive(Debug, Default)]
pub struct LoadedSamples {
    pub samples: Vec<Sample>,
    pub skipped: usize,
}

/// Load samples from a JSON array or JSON Lines file.
///
/// The format is detected from the first non-whitespace byte. JSONL lines
/// that fail to decode are logged and skipped; a malformed JSON array fails
/// as a whole. Array elements that are not valid samples are skipped.
pub fn load_samples(path: &Path) -> PipelineResult<LoadedSamples> {
    let content = std::fs::read_to_string(path).map_err(|e| PipelineError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let loaded = if content.trim_start().starts_with('[') {
        parse_array(&content)?
    } else {
        parse_lines(&content)
    };

    tracing::info!(
        "Loaded {} samples from {:?} ({} skipped)",
        loaded.samples.len(),
        path,
        loaded.skipped
    );
    Ok(loaded)
}

fn parse_array(content: &str) -> PipelineResult<LoadedSamples> {
    let values: Vec<Value> = serde_json::from_str(content).map_err(|e| PipelineError::Record {
        line: e.line(),
        message: e.to_string(),
    })?;

    let mut loaded = LoadedSamples::default();
    for (idx, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<Sample>(value) {
            Ok(sample) => loaded.samples.push(sample),
            Err(e) => {
                tracing::warn!("Skipping array element {idx}: {e}");
                loaded.skipped += 1;
            }
        }
    }
    Ok(loaded)
}

fn parse_lines(content: &str) -> LoadedSamples {
    let mut loaded = LoadedSamples::default();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Sample>(line) {
            Ok(sample) => loaded.samples.push(sample),
            Err(e) => {
                let err = PipelineError::Record {
                    line: idx + 1,
                    message: e.to_string(),
                };
                tracing::warn!("{err}");
                loaded.skipped += 1;
            }
        }
    }
    loaded
}

/// Write samples to a file in the given format, creating parent directories.
pub fn save_samples(path: &Path, samples: &[Sample], format: OutputFormat) -> PipelineResult<()> {
    write_samples(path, samples, format, false)
}

/// Write samples using the `[output]` config section's format and pretty flag.
pub fn save_samples_with_config(
    path: &Path,
    samples: &[Sample],
    config: &OutputConfig,
) -> PipelineResult<()> {
    let format = OutputFormat::parse(&config.format).ok_or_else(|| PipelineError::Io {
        path: path.to_path_buf(),
        message: format!("unknown output format '{}'", config.format),
    })?;
    write_samples(path, samples, format, config.pretty)
}

fn write_samples(
    path: &Path,
    samples: &[Sample],
    format: OutputFormat,
    pretty: bool,
) -> PipelineResult<()> {
    let io_err = |e: std::io::Error| PipelineError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let file = File::create(path).map_err(io_err)?;
    let mut writer = OutputWriter::new(BufWriter::new(file), format, pretty);
    writer.write_all(samples).map_err(io_err)?;
    let count = writer.items_written();
    writer.finish().map_err(io_err)?;

    tracing::info!("Wrote {} samples to {:?}", count, path);
    Ok(())
}
