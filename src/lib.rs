pub mod config;
pub mod error;
pub mod expect;
pub mod logging;
pub mod models;
pub mod runner;
pub mod scenarios;
pub mod session;

pub use config::HarnessConfig;
pub use error::{HarnessError, HarnessResult};
pub use runner::{RunReport, Runner};
pub use session::{ApiResponse, Session, SessionKind};
