//! File-by-file validation of an artifact directory, behind `check-artifacts`.

use super::{
    ARTIFACT_FILES, ArtifactSet, BALCONY_MEDIAN_FILE, BATH_MEDIAN_FILE, FEATURE_COLUMNS_FILE,
    LOCATION_PRICE_MAP_FILE, MODEL_FILE, OVERALL_MEAN_PRICE_FILE, Regressor, SCALER_JSON_FILE,
    SCALER_YAML_FILE, load_model, load_scaler_file, read_json,
};
use crate::Result;
use std::{collections::HashMap, fs, path::Path};

#[derive(Debug, Clone, PartialEq)]
pub enum FileCheck {
    Missing,
    /// Optional file that is not there.
    Absent,
    Loaded { bytes: u64, details: Vec<String> },
    Invalid { bytes: u64, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactCheck {
    pub file: &'static str,
    pub required: bool,
    pub result: FileCheck,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub files: Vec<ArtifactCheck>,
    pub scaler_found: bool,
    /// Why the full set failed to load, when every file passed on its own.
    pub set_error: Option<String>,
}

impl CheckReport {
    pub fn is_ok(&self) -> bool {
        self.scaler_found
            && self.set_error.is_none()
            && self.files.iter().all(|f| {
                !matches!(f.result, FileCheck::Missing | FileCheck::Invalid { .. })
            })
    }

    pub fn file(&self, name: &str) -> Option<&ArtifactCheck> {
        self.files.iter().find(|f| f.file == name)
    }
}

/// Loads one artifact file and describes what it holds.
fn describe(dir: &Path, file: &str) -> Result<Vec<String>> {
    let path = dir.join(file);
    let lines = match file {
        MODEL_FILE => {
            let model = load_model(dir)?;
            let width = model
                .n_features()
                .map_or_else(|| "unknown".to_string(), |n| n.to_string());
            vec![format!("Model loaded: {} ({} features)", model.kind(), width)]
        }
        LOCATION_PRICE_MAP_FILE => {
            let prices: HashMap<String, f64> = read_json(&path)?;
            let mut examples: Vec<_> = prices.iter().collect();
            examples.sort_by(|a, b| a.0.cmp(b.0));
            examples.truncate(3);
            vec![
                format!("{} locations in the mapping", prices.len()),
                format!("  Examples: {:?}", examples),
            ]
        }
        OVERALL_MEAN_PRICE_FILE => {
            let mean: f64 = read_json(&path)?;
            vec![format!("Mean price: {:.2}", mean)]
        }
        BATH_MEDIAN_FILE | BALCONY_MEDIAN_FILE => {
            let median: f64 = read_json(&path)?;
            vec![format!("Median: {}", median)]
        }
        SCALER_JSON_FILE | SCALER_YAML_FILE => {
            let (scaler, source) = load_scaler_file(dir, file)?;
            vec![format!("Scaler loaded: {} (from {})", scaler.kind(), source)]
        }
        FEATURE_COLUMNS_FILE => {
            let columns: Vec<String> = read_json(&path)?;
            let tail = columns.len().saturating_sub(5);
            vec![
                format!("{} columns", columns.len()),
                format!("  First: {:?}", &columns[..columns.len().min(5)]),
                format!("  Last: {:?}", &columns[tail..]),
            ]
        }
        _ => Vec::new(),
    };
    Ok(lines)
}

/// Checks each artifact file on its own, then the whole set together.
pub fn check(dir: &Path) -> CheckReport {
    let mut files = Vec::with_capacity(ARTIFACT_FILES.len());
    let mut scaler_found = false;

    for (file, required) in ARTIFACT_FILES {
        let result = match fs::metadata(dir.join(file)) {
            Err(_) if required => FileCheck::Missing,
            Err(_) => FileCheck::Absent,
            Ok(metadata) => match describe(dir, file) {
                Ok(details) => {
                    if file == SCALER_JSON_FILE || file == SCALER_YAML_FILE {
                        scaler_found = true;
                    }
                    FileCheck::Loaded {
                        bytes: metadata.len(),
                        details,
                    }
                }
                Err(e) => FileCheck::Invalid {
                    bytes: metadata.len(),
                    reason: e.to_string(),
                },
            },
        };
        files.push(ArtifactCheck {
            file,
            required,
            result,
        });
    }

    let mut report = CheckReport {
        files,
        scaler_found,
        set_error: None,
    };
    if report.is_ok() {
        report.set_error = ArtifactSet::load(dir).err().map(|e| e.to_string());
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_empty_dir_reports_missing() {
        let dir = TempDir::new().unwrap();
        let report = check(dir.path());

        assert!(!report.is_ok());
        assert!(!report.scaler_found);
        assert_eq!(report.file(MODEL_FILE).unwrap().result, FileCheck::Missing);
        assert_eq!(report.file(SCALER_JSON_FILE).unwrap().result, FileCheck::Absent);
        assert_eq!(report.set_error, None);
    }

    #[test]
    fn test_corrupt_median_is_invalid() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(BATH_MEDIAN_FILE), "two").unwrap();
        let report = check(dir.path());

        assert!(matches!(
            report.file(BATH_MEDIAN_FILE).unwrap().result,
            FileCheck::Invalid { bytes: 3, .. }
        ));
    }
}
