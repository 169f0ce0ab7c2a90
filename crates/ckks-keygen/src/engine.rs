//! The capabilities the key lifecycle needs from an encryption library.

use fhe_ckks::ckks::{
    add, multiply, Ciphertext, CkksParameters, CkksParametersBuilder, Encoder, ParmsId,
    Plaintext, PublicKey, RelinearizationKey, SecretKey,
};
use fhe_traits::{
    Deserialize, DeserializeParametrized, FheParameters, FheParametrized, Serialize,
};
use rand::{CryptoRng, RngCore};
use std::fmt::Debug;
use std::sync::Arc;

/// A CKKS-style encryption engine.
///
/// A context is an `Arc` over the engine parameters. Keys are bound to the
/// context they were created or deserialized with, so implementations may
/// derive from the key alone and ignore the context argument.
pub trait Engine {
    /// Encryption parameters.
    type Parameters: FheParameters + Serialize + Deserialize<Error = Self::Error>;
    /// Public key.
    type PublicKey: Serialize
        + DeserializeParametrized<Error = Self::Error>
        + FheParametrized<Parameters = Self::Parameters>;
    /// Secret key.
    type SecretKey: Serialize
        + DeserializeParametrized<Error = Self::Error>
        + FheParametrized<Parameters = Self::Parameters>;
    /// Relinearization keys.
    type RelinKeys;
    /// Encoded plaintext.
    type Plaintext;
    /// Ciphertext.
    type Ciphertext;
    /// Identifier of a parameter level.
    type ParmsId: Copy + Debug;
    /// Engine error.
    type Error: std::error::Error;

    /// Builds parameters with the given degree and modulus bit sizes.
    fn build_parameters(
        &self,
        degree: usize,
        moduli_sizes: &[usize],
    ) -> Result<Self::Parameters, Self::Error>;

    /// Validates parameters into a context.
    fn create_context(&self, parameters: Self::Parameters) -> Arc<Self::Parameters> {
        Arc::new(parameters)
    }

    /// Samples a fresh secret key.
    fn generate_secret_key<R: RngCore + CryptoRng>(
        &self,
        ctx: &Arc<Self::Parameters>,
        rng: &mut R,
    ) -> Result<Self::SecretKey, Self::Error>;

    /// Derives the public key of `sk`.
    fn derive_public_key<R: RngCore + CryptoRng>(
        &self,
        ctx: &Arc<Self::Parameters>,
        sk: &Self::SecretKey,
        rng: &mut R,
    ) -> Result<Self::PublicKey, Self::Error>;

    /// Derives relinearization keys from `sk`.
    fn derive_relin_keys<R: RngCore + CryptoRng>(
        &self,
        ctx: &Arc<Self::Parameters>,
        sk: &Self::SecretKey,
        rng: &mut R,
    ) -> Result<Self::RelinKeys, Self::Error>;

    /// Encodes `value` in every slot at the given scale.
    fn encode(
        &self,
        value: f64,
        scale: f64,
        ctx: &Arc<Self::Parameters>,
    ) -> Result<Self::Plaintext, Self::Error>;

    /// Decodes the slots of a plaintext.
    fn decode(&self, pt: &Self::Plaintext) -> Result<Vec<f64>, Self::Error>;

    /// Encrypts a plaintext under a public key.
    fn encrypt<R: RngCore + CryptoRng>(
        &self,
        pt: &Self::Plaintext,
        pk: &Self::PublicKey,
        rng: &mut R,
    ) -> Result<Self::Ciphertext, Self::Error>;

    /// Decrypts a ciphertext with a secret key.
    fn decrypt(
        &self,
        ct: &Self::Ciphertext,
        sk: &Self::SecretKey,
    ) -> Result<Self::Plaintext, Self::Error>;

    /// Multiplies two ciphertexts.
    fn multiply(
        &self,
        lhs: &Self::Ciphertext,
        rhs: &Self::Ciphertext,
    ) -> Result<Self::Ciphertext, Self::Error>;

    /// Relinearizes a product in place.
    fn relinearize(
        &self,
        ct: &mut Self::Ciphertext,
        rk: &Self::RelinKeys,
    ) -> Result<(), Self::Error>;

    /// Rescales a ciphertext to the next level in place.
    fn rescale(&self, ct: &mut Self::Ciphertext) -> Result<(), Self::Error>;

    /// The parameter level of a ciphertext.
    fn parms_id(&self, ct: &Self::Ciphertext) -> Self::ParmsId;

    /// Switches a ciphertext down to the level of `parms_id` without scaling.
    fn mod_switch_to(
        &self,
        ct: &mut Self::Ciphertext,
        parms_id: &Self::ParmsId,
    ) -> Result<(), Self::Error>;

    /// Overwrites the scale of a ciphertext.
    fn set_scale(&self, ct: &mut Self::Ciphertext, scale: f64);

    /// Adds two ciphertexts.
    fn add(
        &self,
        lhs: &Self::Ciphertext,
        rhs: &Self::Ciphertext,
    ) -> Result<Self::Ciphertext, Self::Error>;
}

/// [`Engine`] backed by the `fhe-ckks` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct CkksEngine;

impl Engine for CkksEngine {
    type Parameters = CkksParameters;
    type PublicKey = PublicKey;
    type SecretKey = SecretKey;
    type RelinKeys = RelinearizationKey;
    type Plaintext = Plaintext;
    type Ciphertext = Ciphertext;
    type ParmsId = ParmsId;
    type Error = fhe_ckks::Error;

    fn build_parameters(
        &self,
        degree: usize,
        moduli_sizes: &[usize],
    ) -> fhe_ckks::Result<CkksParameters> {
        CkksParametersBuilder::new()
            .set_degree(degree)
            .set_moduli_sizes(moduli_sizes)
            .build()
    }

    fn generate_secret_key<R: RngCore + CryptoRng>(
        &self,
        ctx: &Arc<CkksParameters>,
        rng: &mut R,
    ) -> fhe_ckks::Result<SecretKey> {
        SecretKey::random(ctx, rng)
    }

    fn derive_public_key<R: RngCore + CryptoRng>(
        &self,
        _ctx: &Arc<CkksParameters>,
        sk: &SecretKey,
        rng: &mut R,
    ) -> fhe_ckks::Result<PublicKey> {
        PublicKey::new(sk, rng)
    }

    fn derive_relin_keys<R: RngCore + CryptoRng>(
        &self,
        _ctx: &Arc<CkksParameters>,
        sk: &SecretKey,
        rng: &mut R,
    ) -> fhe_ckks::Result<RelinearizationKey> {
        RelinearizationKey::new(sk, rng)
    }

    fn encode(
        &self,
        value: f64,
        scale: f64,
        ctx: &Arc<CkksParameters>,
    ) -> fhe_ckks::Result<Plaintext> {
        Encoder::new(ctx).encode_scalar(value, scale, 0)
    }

    fn decode(&self, pt: &Plaintext) -> fhe_ckks::Result<Vec<f64>> {
        pt.decode()
    }

    fn encrypt<R: RngCore + CryptoRng>(
        &self,
        pt: &Plaintext,
        pk: &PublicKey,
        rng: &mut R,
    ) -> fhe_ckks::Result<Ciphertext> {
        pk.try_encrypt(pt, rng)
    }

    fn decrypt(&self, ct: &Ciphertext, sk: &SecretKey) -> fhe_ckks::Result<Plaintext> {
        sk.try_decrypt(ct)
    }

    fn multiply(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> fhe_ckks::Result<Ciphertext> {
        multiply(lhs, rhs)
    }

    fn relinearize(
        &self,
        ct: &mut Ciphertext,
        rk: &RelinearizationKey,
    ) -> fhe_ckks::Result<()> {
        rk.relinearizes(ct)
    }

    fn rescale(&self, ct: &mut Ciphertext) -> fhe_ckks::Result<()> {
        ct.rescale_to_next()
    }

    fn parms_id(&self, ct: &Ciphertext) -> ParmsId {
        ct.parms_id()
    }

    fn mod_switch_to(&self, ct: &mut Ciphertext, parms_id: &ParmsId) -> fhe_ckks::Result<()> {
        ct.mod_switch_to(parms_id)
    }

    fn set_scale(&self, ct: &mut Ciphertext, scale: f64) {
        ct.set_scale(scale)
    }

    fn add(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> fhe_ckks::Result<Ciphertext> {
        add(lhs, rhs)
    }
}
