//! Conversion of key material to and from storable text.
//!
//! Objects are serialized with their engine-native binary encoding and then
//! passed through the [`codec`](crate::codec).

use crate::codec;
use crate::{Error, Result};
use fhe_traits::{Deserialize, DeserializeParametrized, Serialize};
use std::fmt::Display;
use std::path::Path;
use std::sync::Arc;

/// The artifacts of a stored key bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    /// Encryption parameters.
    Parameters,
    /// Public key.
    PublicKey,
    /// Secret key.
    SecretKey,
}

impl Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Artifact::Parameters => write!(f, "parameters"),
            Artifact::PublicKey => write!(f, "public key"),
            Artifact::SecretKey => write!(f, "secret key"),
        }
    }
}

/// Encodes an object as text.
pub fn to_text<T: Serialize>(object: &T) -> String {
    codec::encode(&object.to_bytes())
}

/// Decodes parameters from text. Parameters need no context.
pub fn parameters_from_text<P>(text: &str) -> Result<P>
where
    P: Deserialize,
    P::Error: Display,
{
    P::try_deserialize(&codec::decode(text)).map_err(|e| Error::KeyMaterialCorrupt {
        artifact: Artifact::Parameters,
        reason: e.to_string(),
    })
}

/// Decodes an object bound to the context `par` from text.
pub fn from_text<T>(text: &str, artifact: Artifact, par: &Arc<T::Parameters>) -> Result<T>
where
    T: DeserializeParametrized,
    T::Error: Display,
{
    T::from_bytes(&codec::decode(text), par).map_err(|e| Error::KeyMaterialCorrupt {
        artifact,
        reason: e.to_string(),
    })
}

/// Writes the text encoding of `object` to `path`.
pub fn write_artifact<T: Serialize>(path: &Path, object: &T) -> Result<()> {
    std::fs::write(path, to_text(object)).map_err(Error::io(path))
}

/// Reads the stored text at `path`. Nothing is trimmed; decoding ignores
/// trailing characters outside the alphabet.
pub fn read_artifact(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(Error::io(path))
}

#[cfg(test)]
mod tests {
    use super::{from_text, parameters_from_text, read_artifact, to_text, write_artifact, Artifact};
    use crate::Error;
    use fhe_ckks::ckks::{CkksParameters, CkksParametersBuilder, PublicKey, SecretKey};
    use rand::thread_rng;
    use std::error::Error as StdError;
    use std::sync::Arc;

    fn parameters(degree: usize) -> Result<Arc<CkksParameters>, Box<dyn StdError>> {
        Ok(CkksParametersBuilder::new()
            .set_degree(degree)
            .set_moduli_sizes(&[60, 40, 60])
            .build_arc()?)
    }

    #[test]
    fn keys_through_text() -> Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        let par = parameters(16)?;
        let sk = SecretKey::random(&par, &mut rng)?;
        let pk = PublicKey::new(&sk, &mut rng)?;

        let par_text = to_text(par.as_ref());
        assert_eq!(par_text.len() % 4, 0);
        let loaded: CkksParameters = parameters_from_text(&par_text)?;
        assert_eq!(&loaded, par.as_ref());
        let loaded = Arc::new(loaded);

        let pk2: PublicKey = from_text(&to_text(&pk), Artifact::PublicKey, &loaded)?;
        assert_eq!(pk2, pk);
        let sk2: SecretKey = from_text(&to_text(&sk), Artifact::SecretKey, &loaded)?;
        assert_eq!(sk2, sk);

        // A trailing newline is ignored.
        let sk3: SecretKey =
            from_text(&format!("{}\n", to_text(&sk)), Artifact::SecretKey, &loaded)?;
        assert_eq!(sk3, sk);
        Ok(())
    }

    #[test]
    fn corrupt_text() -> Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        let par = parameters(16)?;
        let sk = SecretKey::random(&par, &mut rng)?;
        let pk = PublicKey::new(&sk, &mut rng)?;

        let text = to_text(&pk);
        let truncated = &text[..text.len() / 2];
        let e = from_text::<PublicKey>(truncated, Artifact::PublicKey, &par);
        assert!(matches!(
            e,
            Err(Error::KeyMaterialCorrupt {
                artifact: Artifact::PublicKey,
                ..
            })
        ));

        let e = parameters_from_text::<CkksParameters>("not parameters");
        assert!(matches!(
            e,
            Err(Error::KeyMaterialCorrupt {
                artifact: Artifact::Parameters,
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn context_mismatch() -> Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        let par = parameters(16)?;
        let other = parameters(32)?;
        let sk = SecretKey::random(&par, &mut rng)?;
        let pk = PublicKey::new(&sk, &mut rng)?;

        for (artifact, result) in [
            (
                Artifact::SecretKey,
                from_text::<SecretKey>(&to_text(&sk), Artifact::SecretKey, &other).map(|_| ()),
            ),
            (
                Artifact::PublicKey,
                from_text::<PublicKey>(&to_text(&pk), Artifact::PublicKey, &other).map(|_| ()),
            ),
        ] {
            match result {
                Err(Error::KeyMaterialCorrupt { artifact: a, .. }) => assert_eq!(a, artifact),
                _ => panic!("expected corrupt {artifact}"),
            }
        }
        Ok(())
    }

    #[test]
    fn files() -> Result<(), Box<dyn StdError>> {
        let dir = tempfile::tempdir()?;
        let par = parameters(16)?;
        let path = dir.path().join("params.b64");
        write_artifact(&path, par.as_ref())?;
        assert_eq!(read_artifact(&path)?, to_text(par.as_ref()));

        let missing = dir.path().join("missing.b64");
        assert!(matches!(
            read_artifact(&missing),
            Err(Error::Io { path, .. }) if path == missing
        ));
        Ok(())
    }
}
