use super::types::ListingRequest;
use crate::{
    Result,
    artifacts::{ArtifactSet, Regressor},
    features::{AreaInput, FeatureAssembler, FeatureLayout, decompose_size, normalize_area},
};
use serde_json::Value;
use tracing::{debug, warn};

/// Scores listings against the loaded artifacts. Holds no per-request state.
pub struct PricePredictor {
    artifacts: ArtifactSet,
    assembler: FeatureAssembler,
}

impl PricePredictor {
    pub fn new(artifacts: ArtifactSet) -> Self {
        let layout = FeatureLayout::new(&artifacts.feature_columns);
        let unused = layout.unused_columns();
        if !unused.is_empty() {
            warn!(
                "Feature schema ignores computed columns: {:?}",
                unused.iter().map(|c| c.name()).collect::<Vec<_>>()
            );
        }

        let assembler = FeatureAssembler::new(
            layout,
            artifacts.scaler.clone(),
            artifacts.bath_median.value,
            artifacts.balcony_median.value,
        );
        Self {
            artifacts,
            assembler,
        }
    }

    pub fn artifacts(&self) -> &ArtifactSet {
        &self.artifacts
    }

    /// Encodes a listing into the model's input vector.
    pub fn features(&self, listing: &ListingRequest) -> Result<Vec<f64>> {
        listing.validate()?;

        let area = match AreaInput::try_from(&listing.total_sqft).and_then(|raw| normalize_area(&raw)) {
            Ok(area) => Some(area),
            Err(e) => {
                debug!("Area normalization failed: {}", e);
                None
            }
        };

        let encoder = &self.artifacts.location_encoder;
        let location_code = match &listing.location {
            Value::String(location) => encoder.encode(location),
            _ => encoder.overall_mean(),
        };

        let room = decompose_size(&listing.size_text());

        self.assembler
            .assemble(&listing.bath, &listing.balcony, area, location_code, &room)
    }

    /// Predicted price for a listing, exactly as the model returns it.
    pub fn predict(&self, listing: &ListingRequest) -> Result<f64> {
        let features = self.features(listing)?;
        let prediction = self.artifacts.model.predict(&features)?;
        debug!("Predicted price {} from {} features", prediction, features.len());
        Ok(prediction)
    }
}
