use std::collections::HashMap;
use tracing::debug;

/// Target encoding of listing locations.
#[derive(Debug, Clone)]
pub struct LocationEncoder {
    prices: HashMap<String, f64>,
    overall_mean: f64,
}

impl LocationEncoder {
    pub fn new(prices: HashMap<String, f64>, overall_mean: f64) -> Self {
        Self {
            prices,
            overall_mean,
        }
    }

    /// Lowercases and strips space characters.
    pub fn canonical_key(raw: &str) -> String {
        raw.replace(' ', "").to_lowercase()
    }

    /// Mean price learned for the location, or the overall mean when it was never seen.
    pub fn encode(&self, raw: &str) -> f64 {
        let key = Self::canonical_key(raw);
        match self.prices.get(&key) {
            Some(price) => *price,
            None => {
                debug!("Unknown location '{}', using overall mean price", key);
                self.overall_mean
            }
        }
    }

    pub fn overall_mean(&self) -> f64 {
        self.overall_mean
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}
