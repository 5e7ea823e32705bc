pub mod analytics;
pub mod config;
pub mod session;

pub use analytics::{CoveragePoint, RunAnalytics};
pub use config::{EngineConfig, EngineConfigError};
pub use session::{CoverageSession, SessionError};
