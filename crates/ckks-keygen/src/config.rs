//! Configuration of a key lifecycle run.

use crate::{Error, Result};
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// Policy comparing the decrypted result of the correctness computation with
/// its expected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcceptanceRule {
    /// Accept iff `|value - expected| <= tolerance`.
    #[default]
    Symmetric,
    /// Reject only when the value overshoots: `value - expected > tolerance`.
    /// Any undershoot is accepted.
    OvershootOnly,
}

impl AcceptanceRule {
    /// Whether `value` is accepted.
    pub fn accepts(&self, value: f64, expected: f64, tolerance: f64) -> bool {
        match self {
            AcceptanceRule::Symmetric => (value - expected).abs() <= tolerance,
            AcceptanceRule::OvershootOnly => !(value - expected > tolerance),
        }
    }
}

impl Display for AcceptanceRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AcceptanceRule::Symmetric => write!(f, "symmetric"),
            AcceptanceRule::OvershootOnly => write!(f, "overshoot-only"),
        }
    }
}

/// File names of the three artifacts of a key bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFiles {
    /// Encoded encryption parameters.
    pub parameters: String,
    /// Encoded public key.
    pub public_key: String,
    /// Encoded secret key.
    pub secret_key: String,
}

impl Default for KeyFiles {
    fn default() -> Self {
        Self {
            parameters: "ckks-params.b64".to_string(),
            public_key: "ckks-public-key.b64".to_string(),
            secret_key: "ckks-secret-key.b64".to_string(),
        }
    }
}

impl KeyFiles {
    /// Path of the parameters file in `dir`.
    pub fn parameters_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.parameters)
    }

    /// Path of the public key file in `dir`.
    pub fn public_key_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.public_key)
    }

    /// Path of the secret key file in `dir`.
    pub fn secret_key_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.secret_key)
    }
}

/// Configuration of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct KeygenConfig {
    dir: PathBuf,
    degree: usize,
    moduli_sizes: Vec<usize>,
    scale: f64,
    expected: f64,
    tolerance: f64,
    rule: AcceptanceRule,
    files: KeyFiles,
}

impl KeygenConfig {
    /// Storage directory of the key bundle.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Polynomial degree of generated parameters.
    pub const fn degree(&self) -> usize {
        self.degree
    }

    /// Bit sizes of the generated modulus chain.
    pub fn moduli_sizes(&self) -> &[usize] {
        &self.moduli_sizes
    }

    /// Encoding scale.
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Expected result of the correctness computation.
    pub const fn expected(&self) -> f64 {
        self.expected
    }

    /// Tolerated deviation from [`Self::expected`].
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Acceptance rule of the correctness check.
    pub const fn rule(&self) -> AcceptanceRule {
        self.rule
    }

    /// File layout of the key bundle.
    pub const fn files(&self) -> &KeyFiles {
        &self.files
    }
}

/// Builder for a [`KeygenConfig`]. Unset fields take the values of the
/// reference run: `./keys`, degree 8192, moduli of 60, 40, 40 and 60 bits,
/// scale 2^40, expected value 14.85 within 0.1.
#[derive(Debug, Clone)]
pub struct KeygenConfigBuilder {
    config: KeygenConfig,
}

impl KeygenConfigBuilder {
    /// Default storage directory.
    pub const DEFAULT_DIR: &'static str = "./keys";

    /// Creates a new instance of the builder
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            config: KeygenConfig {
                dir: PathBuf::from(Self::DEFAULT_DIR),
                degree: 8192,
                moduli_sizes: vec![60, 40, 40, 60],
                scale: 2f64.powi(40),
                expected: crate::oracle::EXPECTED_RESULT,
                tolerance: crate::oracle::DEFAULT_TOLERANCE,
                rule: AcceptanceRule::default(),
                files: KeyFiles::default(),
            },
        }
    }

    /// Sets the storage directory.
    pub fn set_dir<P: AsRef<Path>>(&mut self, dir: P) -> &mut Self {
        self.config.dir = dir.as_ref().to_path_buf();
        self
    }

    /// Sets the polynomial degree.
    pub fn set_degree(&mut self, degree: usize) -> &mut Self {
        self.config.degree = degree;
        self
    }

    /// Sets the bit sizes of the modulus chain, special prime last.
    pub fn set_moduli_sizes(&mut self, sizes: &[usize]) -> &mut Self {
        self.config.moduli_sizes = sizes.to_owned();
        self
    }

    /// Sets the encoding scale.
    pub fn set_scale(&mut self, scale: f64) -> &mut Self {
        self.config.scale = scale;
        self
    }

    /// Sets the expected result of the correctness computation.
    pub fn set_expected(&mut self, expected: f64) -> &mut Self {
        self.config.expected = expected;
        self
    }

    /// Sets the tolerated deviation.
    pub fn set_tolerance(&mut self, tolerance: f64) -> &mut Self {
        self.config.tolerance = tolerance;
        self
    }

    /// Sets the acceptance rule.
    pub fn set_rule(&mut self, rule: AcceptanceRule) -> &mut Self {
        self.config.rule = rule;
        self
    }

    /// Sets the file layout.
    pub fn set_files(&mut self, files: KeyFiles) -> &mut Self {
        self.config.files = files;
        self
    }

    /// Build a new [`KeygenConfig`].
    pub fn build(&self) -> Result<KeygenConfig> {
        let config = &self.config;
        if config.dir.as_os_str().is_empty() {
            return Err(Error::Argument("The key directory is empty".to_string()));
        }
        if !config.scale.is_finite() || config.scale <= 0.0 {
            return Err(Error::Argument(format!("Invalid scale {}", config.scale)));
        }
        if !config.expected.is_finite() {
            return Err(Error::Argument(format!(
                "Invalid expected value {}",
                config.expected
            )));
        }
        if !config.tolerance.is_finite() || config.tolerance < 0.0 {
            return Err(Error::Argument(format!(
                "Invalid tolerance {}",
                config.tolerance
            )));
        }
        if config.moduli_sizes.is_empty() {
            return Err(Error::Argument("No moduli sizes specified".to_string()));
        }
        let files = &config.files;
        if [&files.parameters, &files.public_key, &files.secret_key]
            .iter()
            .any(|name| name.is_empty())
        {
            return Err(Error::Argument("Empty artifact file name".to_string()));
        }
        Ok(config.clone())
    }
}
