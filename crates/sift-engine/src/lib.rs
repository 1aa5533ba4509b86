//! Sift Engine - pipeline orchestration over the analysis primitives
//!
//! Three layers:
//! - [`EngineGateway`]: lazy, shared access to the analyzer backend with
//!   sticky load failure
//! - [`TaskRunner`]: one concurrent pipeline run per artifact, streaming
//!   [`sift_report::TaskEvent`]s
//! - [`SessionManager`]: open sessions, selection, retries with secrets,
//!   and nested member re-scans

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod gateway;
pub mod runner;
pub mod session;

pub use config::{EngineConfig, DEFAULT_MAX_RESCAN_DEPTH};
pub use error::{AnalysisError, GatewayError, SessionError};
pub use gateway::{Analyzers, Engine, EngineGateway};
pub use runner::{Artifact, TaskRunner};
pub use session::{SessionId, SessionInfo, SessionManager};

/// Commonly used engine types.
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::error::{GatewayError, SessionError};
    pub use crate::gateway::{Analyzers, EngineGateway};
    pub use crate::runner::{Artifact, TaskRunner};
    pub use crate::session::{SessionId, SessionManager};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
