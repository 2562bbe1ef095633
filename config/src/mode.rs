//! Analysis-mode resolution.

use std::env;

use vantage_types::{ApiKey, Mode};

use crate::{DOORWAY_URL_ENV, TEXT_MODEL_KEY_ENV};

/// The two external signals mode resolution reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendSignals {
    pub doorway_url: Option<String>,
    pub text_model_key: Option<ApiKey>,
}

impl BackendSignals {
    /// Read both signals from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read both signals through `lookup`. Blank values count as absent.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            doorway_url: lookup(DOORWAY_URL_ENV).filter(|v| !v.trim().is_empty()),
            text_model_key: lookup(TEXT_MODEL_KEY_ENV).and_then(ApiKey::new),
        }
    }
}

/// Picks the analysis mode with fixed priority:
/// geometric backend > text-model credential > standalone.
#[derive(Debug, Clone, Default)]
pub struct ModeSelector {
    signals: BackendSignals,
}

impl ModeSelector {
    #[must_use]
    pub fn new(signals: BackendSignals) -> Self {
        Self { signals }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::new(BackendSignals::from_env())
    }

    #[must_use]
    pub fn signals(&self) -> &BackendSignals {
        &self.signals
    }

    #[must_use]
    pub fn resolve(&self) -> Mode {
        if self.signals.doorway_url.is_some() {
            Mode::GeometricModel
        } else if self.signals.text_model_key.is_some() {
            Mode::TextModel
        } else {
            Mode::Standalone
        }
    }
}
