pub mod error;
pub mod files;
pub mod schema;
pub mod store;

pub use error::{Result, StoreError};
pub use files::{default_base_dir, load_dataset_dir, load_profile, parse_profile};
pub use store::{SeedReport, Store, TableCounts};
