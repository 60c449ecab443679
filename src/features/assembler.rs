//! Builds the model's input vector from the per-field encodings.
//!
//! The column layout is resolved once from the feature schema; every request
//! then fills a zeroed vector of the schema's width by position.

use super::room::RoomFeatures;
use crate::{Error, Result, artifacts::Scaler};
use serde_json::Value;

/// Columns the pipeline knows how to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Location,
    TotalSqft,
    Bath,
    Balcony,
    Bhk,
    Bedroom,
    Rk,
    TypeBedroom,
    TypeBhk,
    TypeRk,
}

impl Column {
    pub const ALL: [Column; 10] = [
        Column::Location,
        Column::TotalSqft,
        Column::Bath,
        Column::Balcony,
        Column::Bhk,
        Column::Bedroom,
        Column::Rk,
        Column::TypeBedroom,
        Column::TypeBhk,
        Column::TypeRk,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::Location => "location",
            Column::TotalSqft => "total_sqft",
            Column::Bath => "bath",
            Column::Balcony => "balcony",
            Column::Bhk => "BHK",
            Column::Bedroom => "Bedroom",
            Column::Rk => "RK",
            Column::TypeBedroom => "type_bedroom",
            Column::TypeBhk => "type_bhk",
            Column::TypeRk => "type_rk",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.name() == name)
    }
}

/// Schema position -> computed column, or `None` for columns filled with zero.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureLayout {
    slots: Vec<Option<Column>>,
}

impl FeatureLayout {
    pub fn new(schema: &[String]) -> Self {
        Self {
            slots: schema.iter().map(|name| Column::from_name(name)).collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.slots.len()
    }

    /// Computed columns the schema never asks for.
    pub fn unused_columns(&self) -> Vec<Column> {
        Column::ALL
            .into_iter()
            .filter(|column| !self.slots.contains(&Some(*column)))
            .collect()
    }

    fn project(&self, record: &FeatureRecord) -> Vec<f64> {
        self.slots
            .iter()
            .map(|slot| slot.map_or(0.0, |column| record.get(column)))
            .collect()
    }
}

/// One listing's computed columns before projection onto the schema.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FeatureRecord {
    bath: f64,
    balcony: f64,
    location: f64,
    total_sqft: f64,
    room: RoomFeatures,
}

impl FeatureRecord {
    fn get(&self, column: Column) -> f64 {
        match column {
            Column::Location => self.location,
            Column::TotalSqft => self.total_sqft,
            Column::Bath => self.bath,
            Column::Balcony => self.balcony,
            Column::Bhk => self.room.bhk,
            Column::Bedroom => self.room.bedroom,
            Column::Rk => self.room.rk,
            Column::TypeBedroom => self.room.type_bedroom,
            Column::TypeBhk => self.room.type_bhk,
            Column::TypeRk => self.room.type_rk,
        }
    }
}

/// Reads a count that may arrive as a JSON number or a numeric string.
pub fn parse_count(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| !v.is_nan())
}

#[derive(Debug, Clone)]
pub struct FeatureAssembler {
    layout: FeatureLayout,
    scaler: Scaler,
    bath_median: f64,
    balcony_median: f64,
}

impl FeatureAssembler {
    pub fn new(layout: FeatureLayout, scaler: Scaler, bath_median: f64, balcony_median: f64) -> Self {
        Self {
            layout,
            scaler,
            bath_median,
            balcony_median,
        }
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    /// Produces a vector with exactly the schema's width and order.
    ///
    /// `area` is `None` when normalization failed, which rejects the listing.
    pub fn assemble(
        &self,
        bath: &Value,
        balcony: &Value,
        area: Option<f64>,
        location_code: f64,
        room: &RoomFeatures,
    ) -> Result<Vec<f64>> {
        let bath = parse_count(bath).unwrap_or(self.bath_median);
        let balcony = parse_count(balcony).unwrap_or(self.balcony_median);

        let area = area.ok_or_else(|| Error::normalization("area has no value"))?;

        let [location, total_sqft] = self.scaler.transform([location_code, area]);

        let record = FeatureRecord {
            bath,
            balcony,
            location,
            total_sqft,
            room: *room,
        };
        Ok(self.layout.project(&record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::StandardScalerParams;
    use crate::features::decompose_size;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schema(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn create_test_assembler(names: &[&str]) -> FeatureAssembler {
        let scaler = Scaler::Standard(StandardScalerParams {
            mean: vec![5000.0, 1000.0],
            scale: vec![1000.0, 100.0],
        });
        FeatureAssembler::new(FeatureLayout::new(&schema(names)), scaler, 2.0, 1.0)
    }

    const FULL_SCHEMA: [&str; 10] = [
        "location",
        "total_sqft",
        "bath",
        "balcony",
        "BHK",
        "Bedroom",
        "RK",
        "type_bedroom",
        "type_bhk",
        "type_rk",
    ];

    #[test]
    fn test_full_schema_in_order() {
        let assembler = create_test_assembler(&FULL_SCHEMA);
        let room = decompose_size("2 BHK");
        let features = assembler
            .assemble(&json!(3), &json!(0), Some(1200.0), 6000.0, &room)
            .unwrap();
        assert_eq!(
            features,
            vec![1.0, 2.0, 3.0, 0.0, 2.0, 0.0, 0.0, 0.0, 1.0, 0.0]
        );
    }

    #[test]
    fn test_missing_counts_use_medians() {
        let assembler = create_test_assembler(&["bath", "balcony"]);
        let room = RoomFeatures::default();
        let features = assembler
            .assemble(&Value::Null, &json!("n/a"), Some(1000.0), 5000.0, &room)
            .unwrap();
        assert_eq!(features, vec![2.0, 1.0]);
    }

    #[test]
    fn test_numeric_strings_are_counts() {
        let assembler = create_test_assembler(&["bath", "balcony"]);
        let features = assembler
            .assemble(&json!(" 4 "), &json!("2.0"), Some(1000.0), 5000.0, &RoomFeatures::default())
            .unwrap();
        assert_eq!(features, vec![4.0, 2.0]);
    }

    #[test]
    fn test_booleans_are_not_counts() {
        let assembler = create_test_assembler(&["bath", "balcony"]);
        let features = assembler
            .assemble(&json!(true), &json!(false), Some(1000.0), 5000.0, &RoomFeatures::default())
            .unwrap();
        assert_eq!(features, vec![2.0, 1.0]);
    }

    #[test]
    fn test_missing_area_is_rejected() {
        let assembler = create_test_assembler(&FULL_SCHEMA);
        let err = assembler
            .assemble(&json!(2), &json!(1), None, 5000.0, &RoomFeatures::default())
            .unwrap_err();
        assert!(matches!(err, Error::Normalization(_)));
    }

    #[test]
    fn test_unknown_columns_are_zero_and_extras_dropped() {
        let assembler = create_test_assembler(&["area_type_plot", "bath", "availability"]);
        let features = assembler
            .assemble(&json!(5), &json!(1), Some(1000.0), 5000.0, &decompose_size("3 bhk"))
            .unwrap();
        assert_eq!(features, vec![0.0, 5.0, 0.0]);
        assert_eq!(assembler.layout().width(), 3);
    }

    #[test]
    fn test_unused_columns() {
        let layout = FeatureLayout::new(&schema(&["bath", "location"]));
        let unused = layout.unused_columns();
        assert_eq!(unused.len(), 8);
        assert!(!unused.contains(&Column::Bath));
        assert!(unused.contains(&Column::TypeRk));
    }

    #[test]
    fn test_column_names_round_trip() {
        for column in Column::ALL {
            assert_eq!(Column::from_name(column.name()), Some(column));
        }
        assert_eq!(Column::from_name("bhk"), None);
    }
}
