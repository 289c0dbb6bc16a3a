//! Construction site planning: tasks, teams, sectors, personnel and an
//! activity log, each kept in its own JSON file.

pub mod app;
pub mod auth;
pub mod error;
pub mod io;
pub mod model;
pub mod report;
pub mod settings;

pub use app::SiteApp;
pub use auth::{AccessGate, Role};
pub use error::{Error, Result};
pub use settings::Settings;
