//! F1 Dashboard Core Library
//!
//! This crate provides the session data model, the provider trait, and the
//! pure transformations behind the dashboard: fastest-lap telemetry
//! extraction, derived comparison metrics and results normalization.

pub mod dashboard;
pub mod error;
pub mod metrics;
pub mod model;
pub mod provider;
pub mod results;
pub mod telemetry;
pub mod units;

pub use dashboard::{build_dashboard, Dashboard};
pub use error::{DashboardError, Result};
pub use model::{Session, SessionKey, SessionType};
pub use provider::SessionProvider;
