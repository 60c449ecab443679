//! Two-column scaler applied to the encoded location and the area.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Number of columns the scaler was fitted on: `location`, `total_sqft`.
pub const SCALED_COLUMNS: usize = 2;

/// Fitted parameters of a standard (z-score) scaler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScalerParams {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Fitted parameters of a min-max scaler, in `x * scale + min` form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScalerParams {
    pub min: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    Standard(StandardScalerParams),
    MinMax(MinMaxScalerParams),
}

impl From<StandardScalerParams> for Scaler {
    fn from(params: StandardScalerParams) -> Self {
        Scaler::Standard(params)
    }
}

impl Scaler {
    pub fn kind(&self) -> &'static str {
        match self {
            Scaler::Standard(_) => "standard",
            Scaler::MinMax(_) => "min_max",
        }
    }

    pub fn validate(&self) -> Result<()> {
        let (first, second) = match self {
            Scaler::Standard(p) => (&p.mean, &p.scale),
            Scaler::MinMax(p) => (&p.min, &p.scale),
        };
        if first.len() != SCALED_COLUMNS || second.len() != SCALED_COLUMNS {
            return Err(Error::artifact(
                "scaler",
                format!(
                    "expected {} columns, got {} and {}",
                    SCALED_COLUMNS,
                    first.len(),
                    second.len()
                ),
            ));
        }
        if first.iter().chain(second).any(|v| !v.is_finite()) {
            return Err(Error::artifact("scaler", "parameters must be finite"));
        }
        Ok(())
    }

    /// Scales `[location, total_sqft]`, in that order.
    pub fn transform(&self, row: [f64; SCALED_COLUMNS]) -> [f64; SCALED_COLUMNS] {
        let mut out = row;
        match self {
            Scaler::Standard(p) => {
                for (i, value) in out.iter_mut().enumerate() {
                    // zero variance columns are left unscaled
                    let scale = if p.scale[i] == 0.0 { 1.0 } else { p.scale[i] };
                    *value = (*value - p.mean[i]) / scale;
                }
            }
            Scaler::MinMax(p) => {
                for (i, value) in out.iter_mut().enumerate() {
                    *value = *value * p.scale[i] + p.min[i];
                }
            }
        }
        out
    }
}
