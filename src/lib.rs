//! Njoki: a symptom-information client for the Gemini API.
//!
//! A free-text description goes out with a fixed policy document and a
//! declared response schema; a [`health::HealthInformationResult`] comes
//! back, or one of the failures in [`error::AnalysisError`].

pub mod advisor;
pub mod auth;
pub mod banner;
pub mod commands;
pub mod config;
pub mod consts;
pub mod error;
pub mod health;
pub mod logging;
pub mod prompts;
pub mod render;
pub mod retry;
pub mod session;
pub mod spinner;
