//! Tenant onboarding — resumable document intake wizard.

pub mod config;
pub mod error;
pub mod onboarding;
pub mod store;
