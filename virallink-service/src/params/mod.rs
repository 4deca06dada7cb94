// Parameters Module
// Global parameter store and the per-format loaders that populate it

pub mod loader;
pub mod store;

pub use loader::{KeyValueLoader, ParameterFormat, ParameterLoader, TabularLoader};
pub use store::{ParameterStore, OUTPUT_DIR_KEY};
