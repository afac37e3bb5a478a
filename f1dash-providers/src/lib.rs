//! Session data providers for the F1 dashboard

pub mod archive;
pub mod demo;

pub use archive::{ArchiveProvider, SessionPayload};
pub use demo::DemoProvider;
