//! Loading of the pre-trained artifacts the service runs on.
//!
//! Everything is read once at startup into an [`ArtifactSet`]. Mandatory
//! artifacts that are missing or corrupt abort the load; optional ones fall
//! back through an ordered list of attempts.

mod check;
pub mod model;
mod scaler;

pub use check::{ArtifactCheck, CheckReport, FileCheck, check};

pub use model::{Forest, LinearModel, Model, ModelArtifact, RegressionTree, Regressor};
pub use scaler::{MinMaxScalerParams, SCALED_COLUMNS, Scaler, StandardScalerParams};

use crate::{Error, Result, features::LocationEncoder};
use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

pub const MODEL_FILE: &str = "model.json";
pub const LOCATION_PRICE_MAP_FILE: &str = "location_price_map.json";
pub const OVERALL_MEAN_PRICE_FILE: &str = "overall_mean_price.json";
pub const SCALER_JSON_FILE: &str = "scaler.json";
pub const SCALER_YAML_FILE: &str = "scaler.yaml";
pub const FEATURE_COLUMNS_FILE: &str = "feature_columns.json";
pub const BATH_MEDIAN_FILE: &str = "bath_median.json";
pub const BALCONY_MEDIAN_FILE: &str = "balcony_median.json";

pub const DEFAULT_BATH_MEDIAN: f64 = 2.0;
pub const DEFAULT_BALCONY_MEDIAN: f64 = 1.0;

/// One way of loading an artifact, tried in order until one succeeds.
struct Attempt<T> {
    label: &'static str,
    file: &'static str,
    load: fn(&Path) -> Result<T>,
}

const SCALER_ATTEMPTS: [Attempt<Scaler>; 3] = [
    Attempt {
        label: "scaler.json",
        file: SCALER_JSON_FILE,
        load: scaler_from_json,
    },
    Attempt {
        label: "scaler.yaml (tagged)",
        file: SCALER_YAML_FILE,
        load: scaler_from_tagged_yaml,
    },
    Attempt {
        label: "scaler.yaml (standard params)",
        file: SCALER_YAML_FILE,
        load: scaler_from_bare_yaml,
    },
];

fn scaler_from_json(dir: &Path) -> Result<Scaler> {
    read_json(&dir.join(SCALER_JSON_FILE))
}

fn scaler_from_tagged_yaml(dir: &Path) -> Result<Scaler> {
    read_yaml(&dir.join(SCALER_YAML_FILE))
}

fn scaler_from_bare_yaml(dir: &Path) -> Result<Scaler> {
    read_yaml::<StandardScalerParams>(&dir.join(SCALER_YAML_FILE)).map(Scaler::from)
}

fn first_success<'a, T: 'a>(
    dir: &Path,
    attempts: impl IntoIterator<Item = &'a Attempt<T>>,
) -> std::result::Result<(T, &'static str), Vec<String>> {
    let mut failures = Vec::new();
    for attempt in attempts {
        match (attempt.load)(dir) {
            Ok(value) => return Ok((value, attempt.label)),
            Err(e) => {
                debug!("Loading {} failed: {}", attempt.label, e);
                failures.push(format!("{}: {}", attempt.label, e));
            }
        }
    }
    Err(failures)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MedianSource {
    Artifact,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureColumnsSource {
    Sidecar,
    Model,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Median {
    pub value: f64,
    pub source: MedianSource,
}

/// All artifacts, loaded and cross-checked. Immutable once built.
pub struct ArtifactSet {
    pub model: ModelArtifact,
    pub location_encoder: LocationEncoder,
    pub scaler: Scaler,
    pub scaler_source: &'static str,
    pub feature_columns: Vec<String>,
    pub feature_columns_source: FeatureColumnsSource,
    pub bath_median: Median,
    pub balcony_median: Median,
    pub loaded_at: DateTime<Utc>,
}

/// What `/artifacts` reports about the loaded set.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactSummary {
    pub model_kind: &'static str,
    pub n_features: usize,
    pub feature_columns: Vec<String>,
    pub feature_columns_source: FeatureColumnsSource,
    pub locations: usize,
    pub overall_mean_price: f64,
    pub bath_median: Median,
    pub balcony_median: Median,
    pub scaler_kind: &'static str,
    pub scaler_source: &'static str,
    pub loaded_at: DateTime<Utc>,
}

impl ArtifactSet {
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        info!("Loading artifacts from {}", dir.display());

        let model = load_model(dir)?;
        let location_prices: HashMap<String, f64> =
            read_json(&dir.join(LOCATION_PRICE_MAP_FILE))
                .map_err(|e| Error::artifact(LOCATION_PRICE_MAP_FILE, e))?;
        let overall_mean: f64 = read_json(&dir.join(OVERALL_MEAN_PRICE_FILE))
            .map_err(|e| Error::artifact(OVERALL_MEAN_PRICE_FILE, e))?;

        let (scaler, scaler_source) = load_scaler(dir)?;
        debug!("Scaler loaded from {}", scaler_source);

        let (feature_columns, feature_columns_source) = load_feature_columns(dir, &model)?;
        if feature_columns.is_empty() {
            return Err(Error::artifact(FEATURE_COLUMNS_FILE, "no feature columns"));
        }
        model.check_width(feature_columns.len())?;

        let bath_median = load_median(dir, BATH_MEDIAN_FILE, DEFAULT_BATH_MEDIAN);
        let balcony_median = load_median(dir, BALCONY_MEDIAN_FILE, DEFAULT_BALCONY_MEDIAN);

        info!(
            "Artifacts loaded: {} model over {} features, {} locations",
            model.kind(),
            feature_columns.len(),
            location_prices.len()
        );

        Ok(Self {
            model,
            location_encoder: LocationEncoder::new(location_prices, overall_mean),
            scaler,
            scaler_source,
            feature_columns,
            feature_columns_source,
            bath_median,
            balcony_median,
            loaded_at: Utc::now(),
        })
    }

    pub fn summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            model_kind: self.model.kind(),
            n_features: self.feature_columns.len(),
            feature_columns: self.feature_columns.clone(),
            feature_columns_source: self.feature_columns_source,
            locations: self.location_encoder.len(),
            overall_mean_price: self.location_encoder.overall_mean(),
            bath_median: self.bath_median,
            balcony_median: self.balcony_median,
            scaler_kind: self.scaler.kind(),
            scaler_source: self.scaler_source,
            loaded_at: self.loaded_at,
        }
    }
}

pub fn load_model(dir: &Path) -> Result<ModelArtifact> {
    let model: ModelArtifact =
        read_json(&dir.join(MODEL_FILE)).map_err(|e| Error::artifact(MODEL_FILE, e))?;
    model.validate()?;
    Ok(model)
}

/// Tries each scaler format in order and keeps the first that loads.
pub fn load_scaler(dir: &Path) -> Result<(Scaler, &'static str)> {
    let (scaler, source) = first_success(dir, &SCALER_ATTEMPTS)
        .map_err(|failures| Error::artifact("scaler", failures.join("; ")))?;
    scaler.validate()?;
    Ok((scaler, source))
}

/// Like [`load_scaler`], restricted to the formats stored in `file`.
pub fn load_scaler_file(dir: &Path, file: &str) -> Result<(Scaler, &'static str)> {
    let attempts = SCALER_ATTEMPTS.iter().filter(|attempt| attempt.file == file);
    let (scaler, source) = first_success(dir, attempts)
        .map_err(|failures| Error::artifact(file, failures.join("; ")))?;
    scaler.validate()?;
    Ok((scaler, source))
}

/// Reads the sidecar column list, or derives it from the model and writes it back.
fn load_feature_columns(
    dir: &Path,
    model: &ModelArtifact,
) -> Result<(Vec<String>, FeatureColumnsSource)> {
    let path = dir.join(FEATURE_COLUMNS_FILE);
    match read_json::<Vec<String>>(&path) {
        Ok(columns) => return Ok((columns, FeatureColumnsSource::Sidecar)),
        Err(e) => warn!("{} unavailable ({}), deriving from model", FEATURE_COLUMNS_FILE, e),
    }

    let columns = match &model.feature_names_in {
        Some(names) if !names.is_empty() => names.clone(),
        _ => {
            return Err(Error::artifact(
                FEATURE_COLUMNS_FILE,
                "missing and the model records no training columns; export it from training",
            ));
        }
    };

    match write_json(&path, &columns) {
        Ok(()) => info!("Persisted derived feature columns to {}", path.display()),
        Err(e) => warn!("Could not persist {}: {}", path.display(), e),
    }
    Ok((columns, FeatureColumnsSource::Model))
}

fn load_median(dir: &Path, file: &str, default: f64) -> Median {
    match read_json::<f64>(&dir.join(file)) {
        Ok(value) => Median {
            value,
            source: MedianSource::Artifact,
        },
        Err(e) => {
            warn!("{} unavailable ({}), using default {}", file, e, default);
            Median {
                value: default,
                source: MedianSource::Default,
            }
        }
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    fs::write(path, serde_json::to_string(value)?)?;
    Ok(())
}

/// Every artifact file the loader may read, with whether it is required.
const ARTIFACT_FILES: [(&str, bool); 8] = [
    (MODEL_FILE, true),
    (LOCATION_PRICE_MAP_FILE, true),
    (OVERALL_MEAN_PRICE_FILE, true),
    (SCALER_JSON_FILE, false),
    (SCALER_YAML_FILE, false),
    (FEATURE_COLUMNS_FILE, false),
    (BATH_MEDIAN_FILE, false),
    (BALCONY_MEDIAN_FILE, false),
];

pub fn expected_files(dir: &Path) -> Vec<(PathBuf, bool)> {
    ARTIFACT_FILES
        .into_iter()
        .map(|(file, required)| (dir.join(file), required))
        .collect()
}
