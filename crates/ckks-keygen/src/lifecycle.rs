//! Generate-or-load state machine of a key bundle.
//!
//! A run generates and persists a new bundle when the storage directory does
//! not exist, then always reloads the bundle from disk and checks it. Every
//! failure ends the run; partial writes are left in place.

use crate::engine::Engine;
use crate::oracle::{self, OracleReport};
use crate::serializer::{self, Artifact};
use crate::{Error, KeygenConfig, Result};
use log::{debug, info};
use rand::{CryptoRng, RngCore};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Check of the freshly generated keys, if generation ran.
    pub generation: Option<OracleReport>,
    /// Check of the keys reloaded from disk.
    pub load: OracleReport,
    /// Storage directory of the bundle.
    pub dir: PathBuf,
}

impl Report {
    /// Whether the run generated a new bundle.
    pub fn generated(&self) -> bool {
        self.generation.is_some()
    }
}

/// Drives the lifecycle of the key bundle described by a [`KeygenConfig`].
#[derive(Debug)]
pub struct Lifecycle<E: Engine> {
    engine: E,
    config: KeygenConfig,
}

impl<E: Engine> Lifecycle<E> {
    /// Creates a lifecycle over `engine`.
    pub fn new(engine: E, config: &KeygenConfig) -> Self {
        Self {
            engine,
            config: config.clone(),
        }
    }

    /// Generates a bundle if the directory is absent, then loads and checks
    /// the stored bundle.
    pub fn run<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<Report> {
        self.run_with(rng, |_| ())
    }

    /// Same as [`Self::run`], calling `on_generated` with the check of the
    /// fresh keys as soon as it passes, before the bundle is reloaded.
    pub fn run_with<R, F>(&self, rng: &mut R, on_generated: F) -> Result<Report>
    where
        R: RngCore + CryptoRng,
        F: FnOnce(&OracleReport),
    {
        let dir = self.config.dir();
        let generation = if dir.exists() {
            debug!("Directory {} exists, skipping generation", dir.display());
            None
        } else {
            let report = self.generate_and_persist(rng)?;
            on_generated(&report);
            Some(report)
        };
        let load = self.load_and_verify(rng)?;
        Ok(Report {
            generation,
            load,
            dir: dir.to_path_buf(),
        })
    }

    /// Generates a new bundle, writes it to the directory and checks the
    /// in-memory keys.
    pub fn generate_and_persist<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
    ) -> Result<OracleReport> {
        let dir = self.config.dir();
        info!("Generating and saving keys to directory: {}", dir.display());

        let parameters = self
            .engine
            .build_parameters(self.config.degree(), self.config.moduli_sizes())
            .map_err(Error::engine)?;
        let ctx = self.engine.create_context(parameters);
        let sk = self
            .engine
            .generate_secret_key(&ctx, rng)
            .map_err(Error::engine)?;
        let pk = self
            .engine
            .derive_public_key(&ctx, &sk, rng)
            .map_err(Error::engine)?;

        std::fs::create_dir_all(dir).map_err(Error::io(dir))?;
        let files = self.config.files();
        serializer::write_artifact(&files.parameters_path(dir), ctx.as_ref())?;
        serializer::write_artifact(&files.public_key_path(dir), &pk)?;
        serializer::write_artifact(&files.secret_key_path(dir), &sk)?;

        let report = self.check(&ctx, &pk, &sk, rng)?;
        if report.passed() {
            info!("Input Serialization Check Passed: {report}");
            Ok(report)
        } else {
            Err(Error::SerializationCheckFailed(report))
        }
    }

    /// Reads the bundle back from the directory and checks it.
    pub fn load_and_verify<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<OracleReport> {
        let dir = self.config.dir();
        info!("Loading and testing keys from directory: {}", dir.display());

        let files = self.config.files();
        let text = serializer::read_artifact(&files.parameters_path(dir))?;
        let parameters: E::Parameters = serializer::parameters_from_text(&text)?;
        let ctx = self.engine.create_context(parameters);
        let pk: E::PublicKey = load(&files.public_key_path(dir), Artifact::PublicKey, &ctx)?;
        let sk: E::SecretKey = load(&files.secret_key_path(dir), Artifact::SecretKey, &ctx)?;

        let report = self.check(&ctx, &pk, &sk, rng)?;
        if report.passed() {
            info!("Output Serialization Check Passed: {report}");
            Ok(report)
        } else {
            Err(Error::DeserializationCheckFailed(report))
        }
    }

    /// Derives fresh relinearization keys and runs the oracle.
    fn check<R: RngCore + CryptoRng>(
        &self,
        ctx: &Arc<E::Parameters>,
        pk: &E::PublicKey,
        sk: &E::SecretKey,
        rng: &mut R,
    ) -> Result<OracleReport> {
        let rk = self
            .engine
            .derive_relin_keys(ctx, sk, rng)
            .map_err(Error::engine)?;
        let value = oracle::verify(&self.engine, pk, sk, ctx, self.config.scale(), &rk, rng)?;
        let report = OracleReport {
            value,
            expected: self.config.expected(),
            tolerance: self.config.tolerance(),
            rule: self.config.rule(),
        };
        debug!("Correctness check: {report}");
        Ok(report)
    }
}

fn load<T>(path: &Path, artifact: Artifact, ctx: &Arc<T::Parameters>) -> Result<T>
where
    T: fhe_traits::DeserializeParametrized,
    T::Error: std::fmt::Display,
{
    let text = serializer::read_artifact(path)?;
    serializer::from_text(&text, artifact, ctx)
}
