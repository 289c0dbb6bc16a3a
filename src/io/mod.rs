pub mod archive;
pub mod csv_export;
pub mod file;

pub use file::{load_or_default, save_json, DataStore};
