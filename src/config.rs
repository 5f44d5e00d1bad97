// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Kernel configuration and the global validation switch

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::geometry::EPSILON;

static VALIDATION_ENABLED: AtomicBool = AtomicBool::new(true);

/// Whether geometry constructors validate their input
pub fn validation_enabled() -> bool {
    VALIDATION_ENABLED.load(Ordering::Relaxed)
}

/// Enable or disable construction-time validation for the whole process.
///
/// Disabling skips coplanarity, self-intersection and degenerate segment
/// checks; callers doing bulk construction of known-good geometry opt in to
/// the risk of invalid shapes.
pub fn set_validation_enabled(enabled: bool) {
    VALIDATION_ENABLED.store(enabled, Ordering::Relaxed);
}

/// Kernel configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Tolerance used by cell complexes for coordinate lookup
    pub tolerance: f64,
    /// Grid size used when scaling polygons to integer paths
    pub clipper_tolerance: f64,
    /// Validate geometry on construction
    pub validate: bool,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            tolerance: EPSILON,
            clipper_tolerance: EPSILON,
            validate: true,
        }
    }
}

impl KernelConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: KernelConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from("polycell.toml").exists() {
            Self::from_file("polycell.toml")?
        } else {
            Self::default()
        };

        config.override_from(|key| std::env::var(key).ok())?;
        config.check()?;
        Ok(config)
    }

    /// Apply `POLYCELL_*` overrides resolved through `lookup`
    pub fn override_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(tolerance) = lookup("POLYCELL_TOLERANCE") {
            self.tolerance = tolerance
                .parse()
                .with_context(|| format!("Invalid POLYCELL_TOLERANCE: {}", tolerance))?;
        }

        if let Some(tolerance) = lookup("POLYCELL_CLIPPER_TOLERANCE") {
            self.clipper_tolerance = tolerance
                .parse()
                .with_context(|| format!("Invalid POLYCELL_CLIPPER_TOLERANCE: {}", tolerance))?;
        }

        if let Some(validate) = lookup("POLYCELL_VALIDATE") {
            self.validate = validate
                .trim()
                .parse()
                .with_context(|| format!("Invalid POLYCELL_VALIDATE: {}", validate))?;
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Reject tolerances that cannot be used as scale factors
    pub fn check(&self) -> Result<()> {
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            anyhow::bail!("tolerance must be positive, got {}", self.tolerance);
        }
        if !(self.clipper_tolerance > 0.0 && self.clipper_tolerance.is_finite()) {
            anyhow::bail!(
                "clipper_tolerance must be positive, got {}",
                self.clipper_tolerance
            );
        }
        Ok(())
    }

    /// Install the process-wide settings carried by this configuration
    pub fn apply(&self) {
        set_validation_enabled(self.validate);
    }
}
