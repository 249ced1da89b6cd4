//! Refresh Module
//!
//! Host-triggered refresh fan-out across independently mounted widgets.

pub mod coordinator;

pub use coordinator::{
    RefreshCallback, RefreshConfig, RefreshCoordinator, RefreshOutcome, RefreshRegistration,
    RefreshReport,
};
