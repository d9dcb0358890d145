//! End-to-end scenario suite for the PetFriends service.
//!
//! # Overview
//! `suite::all` lists the scenarios; `scenario::run_suite` runs them in
//! order against a `PetFriends` client built from `Settings` and returns a
//! `Report`. Nothing is global: the client and settings are passed into
//! every scenario through `ScenarioContext`.

pub mod scenario;
pub mod settings;
pub mod suite;

pub use scenario::{run_suite, Outcome, Report, Scenario, ScenarioContext, ScenarioError};
pub use settings::{Settings, SettingsError};
