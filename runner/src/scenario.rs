//! Scenario plumbing: context, outcomes, the sequential runner and its report.
//!
//! # Design
//! A scenario is a plain function over a `ScenarioContext`. Checks return
//! `ScenarioError::Check` instead of panicking, so one failing scenario never
//! stops the others. Transport failures are different: the service is
//! unreachable and every later scenario would fail the same way, so the run
//! stops and the error is handed back to the caller.

use std::fmt;
use std::time::{Duration, Instant};

use petfriends_core::{ApiError, ApiResponse, AuthKey, Pet, PetFields, PetFilter, PetFriends, PetList};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{info, warn};

use crate::settings::Settings;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("{0}")]
    Check(String),

    #[error("{0}")]
    Skipped(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Returns `ScenarioError::Check` with the formatted message unless `cond` holds.
#[macro_export]
macro_rules! check {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::scenario::ScenarioError::Check(format!($($arg)+)));
        }
    };
}

/// Returns `ScenarioError::Check` unless both sides are equal.
#[macro_export]
macro_rules! check_eq {
    ($left:expr, $right:expr $(,)?) => {
        match (&$left, &$right) {
            (left, right) => {
                if left != right {
                    return Err($crate::scenario::ScenarioError::Check(format!(
                        "{} == {}: {:?} != {:?}",
                        stringify!($left),
                        stringify!($right),
                        left,
                        right
                    )));
                }
            }
        }
    };
}

/// What every scenario receives: the client and the settings, passed in explicitly.
pub struct ScenarioContext<'a> {
    pub api: &'a PetFriends,
    pub settings: &'a Settings,
}

impl<'a> ScenarioContext<'a> {
    pub fn new(api: &'a PetFriends, settings: &'a Settings) -> Self {
        Self { api, settings }
    }

    /// Logs in with the valid credentials.
    pub fn login(&self) -> Result<AuthKey, ScenarioError> {
        let response = self.api.get_api_key(&self.settings.credentials)?;
        check_eq!(response.status, 200);
        response
            .auth_key()
            .ok_or_else(|| ScenarioError::Check(format!("no key in login response: {:?}", response.body)))
    }

    /// Creates a photo-less pet the scenario can act on.
    pub fn provision_pet(&self, key: &AuthKey, fields: &PetFields) -> Result<Pet, ScenarioError> {
        let response = self.api.create_pet_simple(key, fields)?;
        check!(
            response.status == 200,
            "provisioning pet failed with {}: {:?}",
            response.status,
            response.body
        );
        decode(&response)
    }

    pub fn my_pets(&self, key: &AuthKey) -> Result<PetList, ScenarioError> {
        let response = self.api.list_pets(key, PetFilter::MyPets)?;
        check_eq!(response.status, 200);
        decode(&response)
    }
}

/// Decodes a body, turning a shape mismatch into a failed check.
pub fn decode<T: DeserializeOwned>(response: &ApiResponse) -> Result<T, ScenarioError> {
    response.decode().map_err(|e| ScenarioError::Check(e.to_string()))
}

pub type ScenarioFn = fn(&ScenarioContext<'_>) -> Result<(), ScenarioError>;

#[derive(Clone, Copy)]
pub struct Scenario {
    pub name: &'static str,
    pub description: &'static str,
    pub run: ScenarioFn,
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario").field("name", &self.name).finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed(String),
    Skipped(String),
}

#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub name: &'static str,
    pub outcome: Outcome,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct Report {
    pub results: Vec<ScenarioResult>,
}

impl Report {
    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Passed))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped(_)))
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn outcome(&self, name: &str) -> Option<&Outcome> {
        self.results.iter().find(|r| r.name == name).map(|r| &r.outcome)
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.results {
            let ms = result.elapsed.as_millis();
            match &result.outcome {
                Outcome::Passed => writeln!(f, "PASS {} ({ms} ms)", result.name)?,
                Outcome::Failed(reason) => writeln!(f, "FAIL {} ({ms} ms): {reason}", result.name)?,
                Outcome::Skipped(reason) => writeln!(f, "SKIP {}: {reason}", result.name)?,
            }
        }
        write!(
            f,
            "{} passed, {} failed, {} skipped",
            self.passed(),
            self.failed(),
            self.skipped()
        )
    }
}

/// Runs `scenarios` in order. Stops early only on a transport failure.
pub fn run_suite(scenarios: &[Scenario], ctx: &ScenarioContext<'_>) -> Result<Report, ApiError> {
    let mut report = Report::default();
    for scenario in scenarios {
        let started = Instant::now();
        let outcome = match (scenario.run)(ctx) {
            Ok(()) => Outcome::Passed,
            Err(ScenarioError::Skipped(reason)) => Outcome::Skipped(reason),
            Err(ScenarioError::Api(err @ ApiError::Transport(_))) => {
                warn!(scenario = scenario.name, error = %err, "aborting run");
                return Err(err);
            }
            Err(err) => Outcome::Failed(err.to_string()),
        };
        let elapsed = started.elapsed();
        match &outcome {
            Outcome::Passed => info!(scenario = scenario.name, ?elapsed, "passed"),
            Outcome::Failed(reason) => warn!(scenario = scenario.name, %reason, "failed"),
            Outcome::Skipped(reason) => info!(scenario = scenario.name, %reason, "skipped"),
        }
        report.results.push(ScenarioResult {
            name: scenario.name,
            outcome,
            elapsed,
        });
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use petfriends_core::Credentials;

    use super::*;

    fn ok(_: &ScenarioContext<'_>) -> Result<(), ScenarioError> {
        Ok(())
    }

    fn fails(_: &ScenarioContext<'_>) -> Result<(), ScenarioError> {
        check_eq!(1 + 1, 3);
        Ok(())
    }

    fn skips(_: &ScenarioContext<'_>) -> Result<(), ScenarioError> {
        Err(ScenarioError::Skipped("nothing configured".to_string()))
    }

    fn photo_missing(_: &ScenarioContext<'_>) -> Result<(), ScenarioError> {
        Err(ApiError::Photo {
            path: "x.jpg".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        }
        .into())
    }

    fn checked(flag: bool) -> Result<(), ScenarioError> {
        check!(flag, "flag was {}", flag);
        Ok(())
    }

    fn scenario(name: &'static str, run: ScenarioFn) -> Scenario {
        Scenario {
            name,
            description: "",
            run,
        }
    }

    #[test]
    fn outcomes_are_collected_in_order() {
        let api = PetFriends::new("http://127.0.0.1:9");
        let settings = Settings::new("http://127.0.0.1:9", Credentials::new("a", "b"));
        let ctx = ScenarioContext::new(&api, &settings);
        let report = run_suite(
            &[
                scenario("ok", ok),
                scenario("fails", fails),
                scenario("skips", skips),
                scenario("photo", photo_missing),
            ],
            &ctx,
        )
        .unwrap();

        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 2);
        assert_eq!(report.skipped(), 1);
        assert!(!report.is_success());
        assert_eq!(report.results[1].name, "fails");
        assert!(matches!(report.outcome("fails"), Some(Outcome::Failed(m)) if m.contains("1 + 1 == 3")));
        assert!(matches!(report.outcome("photo"), Some(Outcome::Failed(m)) if m.contains("x.jpg")));
    }

    #[test]
    fn check_macro_formats_message() {
        assert!(checked(true).is_ok());
        let err = checked(false).unwrap_err();
        assert_eq!(err.to_string(), "flag was false");
    }

    #[test]
    fn report_display_lists_every_scenario() {
        let report = Report {
            results: vec![
                ScenarioResult {
                    name: "a",
                    outcome: Outcome::Passed,
                    elapsed: Duration::from_millis(5),
                },
                ScenarioResult {
                    name: "b",
                    outcome: Outcome::Skipped("why".to_string()),
                    elapsed: Duration::ZERO,
                },
            ],
        };
        let text = report.to_string();
        assert!(text.contains("PASS a (5 ms)"));
        assert!(text.contains("SKIP b: why"));
        assert!(text.ends_with("1 passed, 0 failed, 1 skipped"));
        assert!(report.is_success());
    }

    #[test]
    fn empty_report_is_success() {
        assert!(Report::default().is_success());
    }
}
