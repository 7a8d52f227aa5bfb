use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    DryRun,
    error::{ModelError, ModelResult},
};

/// Reboot flavour accepted by `POST /2/instances/{name}/reboot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebootKind {
    #[default]
    Soft,
    Hard,
    Full,
}

impl RebootKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RebootKind::Soft => "soft",
            RebootKind::Hard => "hard",
            RebootKind::Full => "full",
        }
    }
}

impl fmt::Display for RebootKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RebootKind {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "soft" => Ok(RebootKind::Soft),
            "hard" => Ok(RebootKind::Hard),
            "full" => Ok(RebootKind::Full),
            other => Err(ModelError::UnknownRebootKind(other.to_string())),
        }
    }
}

/// Query options of a reboot request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebootOptions {
    pub kind: RebootKind,
    pub ignore_secondaries: bool,
    pub dry_run: DryRun,
    pub reason: Option<String>,
}

/// Query options shared by shutdown and startup requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PowerOptions {
    pub dry_run: DryRun,
    /// Do not record the new power state in the configuration.
    pub no_remember: bool,
    pub reason: Option<String>,
}

impl PowerOptions {
    pub fn dry_run(mut self, dry_run: DryRun) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
