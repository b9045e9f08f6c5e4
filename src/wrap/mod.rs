//! Asymmetric key wrapping of the bulk key
//!
//! The bulk key is encrypted with RSA-OAEP using SHA-256 for both the hash and MGF1
//! and an empty label, matching the `cryptography` defaults the payload format was
//! defined with.

use crate::error::{Error, Result};
use crate::keys::{PrivateKey, PublicKey};
use crate::BULK_KEY_SIZE;
use openssl::encrypt::{Decrypter, Encrypter};
use openssl::hash::MessageDigest;
use openssl::rsa::Padding;
use zeroize::Zeroizing;

/// Wraps a 32-byte bulk key for the holder of `public_key`
pub fn wrap_key(bulk_key: &[u8], public_key: &PublicKey) -> Result<Vec<u8>> {
    if bulk_key.len() != BULK_KEY_SIZE {
        return Err(Error::Wrap(format!(
            "bulk key must be {} bytes, got {}",
            BULK_KEY_SIZE,
            bulk_key.len()
        )));
    }

    let wrap_err = |e: openssl::error::ErrorStack| Error::Wrap(format!("RSA encryption failed: {}", e));

    let mut encrypter = Encrypter::new(public_key.pkey()).map_err(wrap_err)?;
    encrypter.set_rsa_padding(Padding::PKCS1_OAEP).map_err(wrap_err)?;
    encrypter.set_rsa_oaep_md(MessageDigest::sha256()).map_err(wrap_err)?;
    encrypter.set_rsa_mgf1_md(MessageDigest::sha256()).map_err(wrap_err)?;

    let mut wrapped = vec![0_u8; encrypter.encrypt_len(bulk_key).map_err(wrap_err)?];
    let len = encrypter.encrypt(bulk_key, &mut wrapped).map_err(wrap_err)?;
    wrapped.truncate(len);
    Ok(wrapped)
}

/// Recovers the bulk key wrapped by [`wrap_key`].
///
/// Fails with [`Error::Unwrap`] on a non-matching private key, truncated or
/// corrupted input, OAEP padding failure, or a result that is not exactly 32 bytes.
pub fn unwrap_key(wrapped_key: &[u8], private_key: &PrivateKey) -> Result<Zeroizing<Vec<u8>>> {
    let unwrap_err =
        |e: openssl::error::ErrorStack| Error::Unwrap(format!("RSA decryption failed: {}", e));

    let modulus_len = (private_key.bits() as usize + 7) / 8;
    if wrapped_key.len() != modulus_len {
        return Err(Error::Unwrap(format!(
            "wrapped key is {} bytes, expected {}",
            wrapped_key.len(),
            modulus_len
        )));
    }

    let mut decrypter = Decrypter::new(private_key.pkey()).map_err(unwrap_err)?;
    decrypter.set_rsa_padding(Padding::PKCS1_OAEP).map_err(unwrap_err)?;
    decrypter.set_rsa_oaep_md(MessageDigest::sha256()).map_err(unwrap_err)?;
    decrypter.set_rsa_mgf1_md(MessageDigest::sha256()).map_err(unwrap_err)?;

    let mut bulk_key = Zeroizing::new(vec![
        0_u8;
        decrypter.decrypt_len(wrapped_key).map_err(unwrap_err)?
    ]);
    let len = decrypter
        .decrypt(wrapped_key, &mut bulk_key)
        .map_err(unwrap_err)?;
    bulk_key.truncate(len);

    if bulk_key.len() != BULK_KEY_SIZE {
        return Err(Error::Unwrap(format!(
            "unwrapped key is {} bytes, expected {}",
            bulk_key.len(),
            BULK_KEY_SIZE
        )));
    }
    Ok(bulk_key)
}
