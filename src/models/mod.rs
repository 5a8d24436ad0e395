pub mod point;
pub mod preference;
pub mod recommendation;

pub use point::Point;
pub use preference::{ItemId, PreferenceRecord, PreferenceVector, UserId};
pub use recommendation::{RecommendedItem, Similarity};
