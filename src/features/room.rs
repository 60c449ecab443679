//! Decomposition of the free-text `size` field ("2 BHK", "4 Bedroom", "1 RK").

use regex::Regex;
use std::sync::LazyLock;

static COUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("count pattern is valid"));
static TYPE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"bhk|bedroom|rk").expect("room type pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoomType {
    Bhk,
    Bedroom,
    Rk,
}

impl RoomType {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "bhk" => Some(Self::Bhk),
            "bedroom" => Some(Self::Bedroom),
            "rk" => Some(Self::Rk),
            _ => None,
        }
    }
}

/// Room counts split by type, plus one indicator column per type.
///
/// At most one of `bhk`, `bedroom` and `rk` is non-zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RoomFeatures {
    pub bhk: f64,
    pub bedroom: f64,
    pub rk: f64,
    pub type_bhk: f64,
    pub type_bedroom: f64,
    pub type_rk: f64,
}

pub fn decompose_size(raw: &str) -> RoomFeatures {
    let size = raw.trim().to_lowercase();

    let count = COUNT_PATTERN
        .find(&size)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0);
    let room_type = TYPE_PATTERN
        .find(&size)
        .and_then(|m| RoomType::from_tag(m.as_str()));

    let mut features = RoomFeatures::default();
    match room_type {
        Some(RoomType::Bhk) => {
            features.bhk = count;
            features.type_bhk = 1.0;
        }
        Some(RoomType::Bedroom) => {
            features.bedroom = count;
            features.type_bedroom = 1.0;
        }
        Some(RoomType::Rk) => {
            features.rk = count;
            features.type_rk = 1.0;
        }
        None => {}
    }
    features
}
