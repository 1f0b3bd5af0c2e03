//! Key pairs and the PEM files they live in.

use dc_crypto::{
    parse_private_key_pem, parse_public_key_pem, private_key_pem, public_key_pem, KeyError,
    SigningKey, VerifyingKey,
};
use rand::rngs::OsRng;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Errors from reading, writing or pairing key files.
#[derive(Debug, thiserror::Error)]
pub enum KeyFileError {
    #[error("failed to access key file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("key file {path} already exists")]
    AlreadyExists { path: PathBuf },
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error("public key does not belong to the private key")]
    Mismatch,
}

/// A P-256 signing key together with its public half.
///
/// Cheap to share by reference across threads; nothing in link
/// construction mutates it.
#[derive(Clone)]
pub struct Keypair {
    private_key: SigningKey,
    public_key: VerifyingKey,
}

impl Keypair {
    /// Generate a fresh key pair from the operating system RNG.
    #[must_use]
    pub fn generate() -> Self {
        Self::from_private_key(SigningKey::random(&mut OsRng))
    }

    #[must_use]
    pub fn from_private_key(private_key: SigningKey) -> Self {
        let public_key = *private_key.verifying_key();
        Self {
            private_key,
            public_key,
        }
    }

    /// Pair a private key PEM (PKCS#8 or SEC1) with a public key PEM (SPKI).
    ///
    /// # Errors
    /// Returns an error if either document is malformed or the public key
    /// is not derived from the private key.
    pub fn from_pem(private_pem: &str, public_pem: &str) -> Result<Self, KeyFileError> {
        let keypair = Self::from_private_key(parse_private_key_pem(private_pem)?);
        if parse_public_key_pem(public_pem)? != keypair.public_key {
            return Err(KeyFileError::Mismatch);
        }
        Ok(keypair)
    }

    /// Load a key pair from PEM files.
    ///
    /// # Errors
    /// Returns an error if a file cannot be read or [`Keypair::from_pem`] fails.
    pub fn load(private_path: &Path, public_path: &Path) -> Result<Self, KeyFileError> {
        let private_pem = read_key_file(private_path)?;
        let public_pem = read_key_file(public_path)?;
        let keypair = Self::from_pem(&private_pem, &public_pem)?;
        tracing::debug!(
            private_key = %private_path.display(),
            public_key = %public_path.display(),
            "loaded key pair"
        );
        Ok(keypair)
    }

    /// Write the pair as PKCS#8 and SPKI PEM files, creating parent
    /// directories. The private key file is created owner-readable only on
    /// Unix.
    ///
    /// # Errors
    /// Returns `KeyFileError::AlreadyExists` when a target exists and
    /// `overwrite` is false, or an I/O error.
    pub fn write(
        &self,
        private_path: &Path,
        public_path: &Path,
        overwrite: bool,
    ) -> Result<(), KeyFileError> {
        if !overwrite {
            for path in [private_path, public_path] {
                if path.exists() {
                    return Err(KeyFileError::AlreadyExists {
                        path: path.to_path_buf(),
                    });
                }
            }
        }

        write_key_file(private_path, &private_key_pem(&self.private_key)?, true)?;
        write_key_file(public_path, &public_key_pem(&self.public_key)?, false)?;
        tracing::info!(
            private_key = %private_path.display(),
            public_key = %public_path.display(),
            "wrote key pair"
        );
        Ok(())
    }

    #[must_use]
    pub const fn private_key(&self) -> &SigningKey {
        &self.private_key
    }

    #[must_use]
    pub const fn public_key(&self) -> &VerifyingKey {
        &self.public_key
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

fn read_key_file(path: &Path) -> Result<String, KeyFileError> {
    fs::read_to_string(path).map_err(|source| KeyFileError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_key_file(path: &Path, contents: &str, private: bool) -> Result<(), KeyFileError> {
    let io_err = |source| KeyFileError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        if private {
            options.mode(0o600);
        }
    }
    #[cfg(not(unix))]
    let _ = private;

    let mut file = options.open(path).map_err(io_err)?;
    file.write_all(contents.as_bytes()).map_err(io_err)
}
