use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const REQUIRED_FIELDS: [&str; 3] = ["location", "total_sqft", "size"];

/// A raw listing as posted by clients. Fields keep their JSON shape until encoded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingRequest {
    #[serde(default)]
    pub location: Value,
    #[serde(default)]
    pub total_sqft: Value,
    #[serde(default)]
    pub bath: Value,
    #[serde(default)]
    pub balcony: Value,
    #[serde(default)]
    pub size: Value,
}

impl ListingRequest {
    fn field(&self, name: &str) -> Option<&Value> {
        match name {
            "location" => Some(&self.location),
            "total_sqft" => Some(&self.total_sqft),
            "bath" => Some(&self.bath),
            "balcony" => Some(&self.balcony),
            "size" => Some(&self.size),
            _ => None,
        }
    }

    /// Required fields that are absent or blank, in declaration order.
    pub fn missing_fields(&self) -> Vec<String> {
        REQUIRED_FIELDS
            .iter()
            .filter(|name| self.field(name).is_none_or(is_blank))
            .map(|name| name.to_string())
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation { missing })
        }
    }

    /// The `size` field as text; numbers are rendered as written.
    pub fn size_text(&self) -> String {
        match &self.size {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Null, `""`, `0`, `false` and empty containers all count as not provided.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_missing_fields_in_order() {
        let listing: ListingRequest = serde_json::from_value(json!({"total_sqft": "1200"})).unwrap();
        assert_eq!(listing.missing_fields(), vec!["location", "size"]);
        assert!(matches!(listing.validate(), Err(Error::Validation { .. })));
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let listing: ListingRequest = serde_json::from_value(json!({
            "location": "",
            "total_sqft": 0,
            "size": null
        }))
        .unwrap();
        assert_eq!(listing.missing_fields(), vec!["location", "total_sqft", "size"]);
    }

    #[test]
    fn test_optional_fields_are_not_required() {
        let listing: ListingRequest = serde_json::from_value(json!({
            "location": "Whitefield",
            "total_sqft": 1200,
            "size": "2 BHK"
        }))
        .unwrap();
        listing.validate().unwrap();
        assert_eq!(listing.bath, Value::Null);
    }

    #[test]
    fn test_field_lookup() {
        let listing = ListingRequest {
            size: json!("2 BHK"),
            ..Default::default()
        };
        assert_eq!(listing.field("size"), Some(&json!("2 BHK")));
        assert_eq!(listing.field("bath"), Some(&Value::Null));
        assert_eq!(listing.field("area_type"), None);
    }

    #[test]
    fn test_size_text() {
        let mut listing = ListingRequest {
            size: json!("3 BHK"),
            ..Default::default()
        };
        assert_eq!(listing.size_text(), "3 BHK");
        listing.size = json!(3);
        assert_eq!(listing.size_text(), "3");
    }
}
