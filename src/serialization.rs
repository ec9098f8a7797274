//! Byte-level persistence of fitted parameters.
//!
//! Fitted state (column transforms, trained weights) is exported as plain
//! parameter records holding `Vec<f64>` and scalars, never backend tensors, and
//! encoded with bincode. Any serde type gets the encoding for free.

use std::error::Error;
use std::path::Path;

/// A parameter representation that can be serialized to and from bytes.
pub trait SerializableParams: Sized {
    /// The error type returned during (de)serialization.
    type Error: Error + Send + Sync + 'static;

    /// Serialize the parameters into a byte buffer.
    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error>;

    /// Deserialize the parameters from a byte buffer.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error>;
}

impl<T> SerializableParams for T
where
    T: serde::Serialize + for<'de> serde::Deserialize<'de>,
{
    type Error = bincode::Error;

    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error> {
        bincode::serialize(self)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error> {
        bincode::deserialize(bytes)
    }
}

/// Writes `params` to `path`, replacing any existing file.
pub(crate) fn write_params<P, E>(params: &P, path: impl AsRef<Path>) -> Result<(), E>
where
    P: SerializableParams,
    E: From<P::Error> + From<std::io::Error>,
{
    let bytes = params.to_bytes()?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Reads parameters previously written by [`write_params`].
pub(crate) fn read_params<P, E>(path: impl AsRef<Path>) -> Result<P, E>
where
    P: SerializableParams,
    E: From<P::Error> + From<std::io::Error>,
{
    let bytes = std::fs::read(path)?;
    Ok(P::from_bytes(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Params {
        weights: Vec<f64>,
        n_features: usize,
    }

    #[test]
    fn test_bytes_roundtrip() {
        let params = Params {
            weights: vec![0.5, -1.25],
            n_features: 2,
        };
        let bytes = params.to_bytes().unwrap();
        assert_eq!(Params::from_bytes(&bytes).unwrap(), params);
    }

    #[test]
    fn test_truncated_bytes_fail() {
        let params = Params {
            weights: vec![1.0; 4],
            n_features: 4,
        };
        let bytes = params.to_bytes().unwrap();
        assert!(Params::from_bytes(&bytes[..bytes.len() / 2]).is_err());
    }
}
