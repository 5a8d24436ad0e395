pub mod loader;
pub mod preference_store;

pub use loader::{
    load_points, load_points_from_reader, load_preferences, load_preferences_from_reader,
    LoadOptions, MalformedPolicy,
};
pub use preference_store::{DuplicatePolicy, PreferenceStore};
