mod area;
mod assembler;
mod location;
mod room;

pub use area::{AreaInput, UNIT_FACTORS, normalize_area};
pub use assembler::{Column, FeatureAssembler, FeatureLayout, parse_count};
pub use location::LocationEncoder;
pub use room::{RoomFeatures, decompose_size};
