use serde::{Deserialize, Serialize};

/// Whether a mutating call should only be validated by the server.
///
/// A dry run must never change cluster state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DryRun(bool);

impl DryRun {
    /// Validate only.
    pub const fn enabled() -> Self {
        Self(true)
    }

    /// Persist the effect.
    pub const fn disabled() -> Self {
        Self(false)
    }

    /// Check if the call is a dry run.
    pub const fn is_enabled(&self) -> bool {
        self.0
    }
}

impl From<bool> for DryRun {
    fn from(b: bool) -> Self {
        Self(b)
    }
}

#[cfg(test)]
mod tests {
    use super::DryRun;

    #[test]
    fn default_persists() {
        assert!(!DryRun::default().is_enabled());
    }

    #[test]
    fn from_bool() {
        assert_eq!(DryRun::from(true), DryRun::enabled());
        assert_eq!(DryRun::from(false), DryRun::disabled());
    }
}
