//! RSA key material
//!
//! Private keys are read from unencrypted PEM (PKCS#1 `RSA PRIVATE KEY` or PKCS#8
//! `PRIVATE KEY`); public keys from SubjectPublicKeyInfo PEM. Keys are only ever
//! generated through [`KeyPair::generate`] or [`ensure_keypair`].

use crate::error::{Error, Result};
use crate::policy::ProtocolPolicy;
use openssl::pkey::{HasPublic, Id, PKey, Private, Public};
use openssl::rsa::Rsa;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Smallest RSA modulus accepted for wrapping and signing
pub const MIN_RSA_KEY_BITS: u32 = 2048;

/// Default RSA modulus size for new key pairs
pub const DEFAULT_RSA_KEY_BITS: u32 = 2048;

/// RSA private key used for unwrapping and signing
#[derive(Clone)]
pub struct PrivateKey(PKey<Private>);

/// RSA public key used for wrapping and signature verification
#[derive(Clone)]
pub struct PublicKey(PKey<Public>);

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("bits", &self.0.bits())
            .field("key", &"<hidden>")
            .finish()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("bits", &self.0.bits())
            .finish()
    }
}

fn check_rsa<T: HasPublic>(key: &PKey<T>) -> Result<()> {
    if key.id() != Id::RSA {
        return Err(Error::KeyLoad(format!(
            "expected an RSA key, found {:?}",
            key.id()
        )));
    }
    if key.bits() < MIN_RSA_KEY_BITS {
        return Err(Error::KeyLoad(format!(
            "RSA key of {} bits is below the {}-bit minimum",
            key.bits(),
            MIN_RSA_KEY_BITS
        )));
    }
    Ok(())
}

impl PrivateKey {
    /// Parses an unencrypted PEM private key.
    ///
    /// Encrypted PEM is refused with [`Error::KeyLoad`] instead of prompting for a
    /// passphrase.
    pub fn from_pem(pem: &[u8]) -> Result<Self> {
        let key = PKey::private_key_from_pem_passphrase(pem, b"")
            .map_err(|e| Error::KeyLoad(format!("invalid private key PEM: {}", e)))?;
        check_rsa(&key)?;
        Ok(Self(key))
    }

    /// Reads and parses a PEM private key file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let pem = fs::read(path).map_err(|e| {
            Error::KeyLoad(format!("cannot read private key {}: {}", path.display(), e))
        })?;
        Self::from_pem(&pem)
    }

    /// Derives the matching public key
    pub fn public_key(&self) -> Result<PublicKey> {
        let der = self
            .0
            .public_key_to_der()
            .map_err(|e| Error::KeyLoad(format!("cannot derive public key: {}", e)))?;
        let key = PKey::public_key_from_der(&der)
            .map_err(|e| Error::KeyLoad(format!("cannot derive public key: {}", e)))?;
        Ok(PublicKey(key))
    }

    /// PEM in the traditional PKCS#1 `RSA PRIVATE KEY` form
    pub fn to_pem(&self) -> Result<Vec<u8>> {
        self.0
            .rsa()
            .and_then(|rsa| rsa.private_key_to_pem())
            .map_err(|e| Error::KeyLoad(format!("cannot serialize private key: {}", e)))
    }

    /// Modulus size in bits
    pub fn bits(&self) -> u32 {
        self.0.bits()
    }

    pub(crate) fn pkey(&self) -> &PKey<Private> {
        &self.0
    }
}

impl PublicKey {
    /// Parses a SubjectPublicKeyInfo PEM public key
    pub fn from_pem(pem: &[u8]) -> Result<Self> {
        let key = PKey::public_key_from_pem(pem)
            .map_err(|e| Error::KeyLoad(format!("invalid public key PEM: {}", e)))?;
        check_rsa(&key)?;
        Ok(Self(key))
    }

    /// Reads and parses a PEM public key file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let pem = fs::read(path).map_err(|e| {
            Error::KeyLoad(format!("cannot read public key {}: {}", path.display(), e))
        })?;
        Self::from_pem(&pem)
    }

    /// SubjectPublicKeyInfo PEM
    pub fn to_pem(&self) -> Result<Vec<u8>> {
        self.0
            .public_key_to_pem()
            .map_err(|e| Error::KeyLoad(format!("cannot serialize public key: {}", e)))
    }

    /// Modulus size in bits
    pub fn bits(&self) -> u32 {
        self.0.bits()
    }

    /// True when both keys share the same modulus and exponent
    pub fn matches(&self, private_key: &PrivateKey) -> bool {
        private_key
            .public_key()
            .map(|derived| derived.0.public_eq(&self.0))
            .unwrap_or(false)
    }

    pub(crate) fn pkey(&self) -> &PKey<Public> {
        &self.0
    }
}

/// An RSA key pair owned by the issuer
#[derive(Clone, Debug)]
pub struct KeyPair {
    private_key: PrivateKey,
    public_key: PublicKey,
}

impl KeyPair {
    /// Generates a new key pair with public exponent 65537
    pub fn generate(bits: u32) -> Result<Self> {
        if bits < MIN_RSA_KEY_BITS {
            return Err(Error::InvalidArgument(format!(
                "RSA key size {} is below the {}-bit minimum",
                bits, MIN_RSA_KEY_BITS
            )));
        }
        let rsa = Rsa::generate(bits)
            .map_err(|e| Error::KeyLoad(format!("Failed to generate RSA keypair: {}", e)))?;
        let key = PKey::from_rsa(rsa)
            .map_err(|e| Error::KeyLoad(format!("Failed to create private key: {}", e)))?;
        Self::from_private_key(PrivateKey(key))
    }

    /// Completes a key pair from its private half
    pub fn from_private_key(private_key: PrivateKey) -> Result<Self> {
        let public_key = private_key.public_key()?;
        Ok(Self {
            private_key,
            public_key,
        })
    }

    /// Pairs two separately loaded halves, checking that they match
    pub fn from_parts(private_key: PrivateKey, public_key: PublicKey) -> Result<Self> {
        if !public_key.matches(&private_key) {
            return Err(Error::KeyLoad(
                "public key does not belong to the private key".into(),
            ));
        }
        Ok(Self {
            private_key,
            public_key,
        })
    }

    /// Loads a key pair from two PEM files
    pub fn load(private_path: impl AsRef<Path>, public_path: impl AsRef<Path>) -> Result<Self> {
        Self::from_parts(
            PrivateKey::load(private_path)?,
            PublicKey::load(public_path)?,
        )
    }

    /// The private half
    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    /// The public half
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Writes both halves as PEM files. Existing files are replaced.
    ///
    /// If the public half cannot be written the private file is removed again.
    pub fn save(&self, private_path: impl AsRef<Path>, public_path: impl AsRef<Path>) -> Result<()> {
        let private_path = private_path.as_ref();
        write_key_file(private_path, &self.private_key.to_pem()?, true)?;
        let public_pem = self.public_key.to_pem();
        if let Err(e) = public_pem.and_then(|pem| write_key_file(public_path.as_ref(), &pem, false)) {
            if let Err(remove_err) = fs::remove_file(private_path) {
                ::log::warn!(
                    "cannot remove {} after failed save: {}",
                    private_path.display(),
                    remove_err
                );
            }
            return Err(e);
        }
        Ok(())
    }
}

fn write_key_file(path: &Path, pem: &[u8], secret: bool) -> Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        if secret {
            options.mode(0o600);
        }
    }
    #[cfg(not(unix))]
    let _ = secret;

    let mut file = options.open(path)?;
    // mode() only applies to newly created files
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if secret {
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }
    }
    file.write_all(pem)?;
    file.sync_all()?;
    Ok(())
}

/// Paths of the two key files inside `dir`, named by the policy
pub fn key_paths(dir: impl AsRef<Path>, policy: &ProtocolPolicy) -> (PathBuf, PathBuf) {
    let dir = dir.as_ref();
    (
        dir.join(&policy.private_key_file),
        dir.join(&policy.public_key_file),
    )
}

/// Loads the key pair stored in `dir`, generating and writing one if none exists.
///
/// Idempotent: a second call returns the same keys. If only one of the two files is
/// present the directory is left untouched and a [`Error::KeyLoad`] is returned.
pub fn ensure_keypair(dir: impl AsRef<Path>, policy: &ProtocolPolicy) -> Result<KeyPair> {
    let dir = dir.as_ref();
    let (private_path, public_path) = key_paths(dir, policy);

    match (private_path.exists(), public_path.exists()) {
        (true, true) => {
            crate::debugf!("loading existing key pair from {}", dir.display());
            KeyPair::load(&private_path, &public_path)
        }
        (false, false) => {
            ::log::info!(
                "generating {}-bit RSA key pair in {}",
                policy.rsa_key_bits,
                dir.display()
            );
            fs::create_dir_all(dir)?;
            let pair = KeyPair::generate(policy.rsa_key_bits)?;
            pair.save(&private_path, &public_path)?;
            Ok(pair)
        }
        (true, false) => Err(Error::KeyLoad(format!(
            "{} exists without {}",
            private_path.display(),
            public_path.display()
        ))),
        (false, true) => Err(Error::KeyLoad(format!(
            "{} exists without {}",
            public_path.display(),
            private_path.display()
        ))),
    }
}
