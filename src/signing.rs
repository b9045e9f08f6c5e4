//! Record signatures
//!
//! Signatures are RSA PKCS#1 v1.5 over SHA-256 of the record's canonical bytes,
//! always taken without the `signature` field. They travel base64-encoded inside the
//! signed record.

use crate::error::{Error, Result};
use crate::keys::{PrivateKey, PublicKey};
use crate::record::{MetadataRecord, SignedRecord};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use openssl::hash::MessageDigest;
use openssl::rsa::Padding;
use openssl::sign::{Signer, Verifier};

/// Signs raw canonical bytes.
///
/// The key is already parsed at this point, so an OpenSSL failure here means the
/// key cannot be used for PKCS#1 v1.5 signing and is reported as [`Error::KeyLoad`].
pub fn sign_bytes(message: &[u8], private_key: &PrivateKey) -> Result<Vec<u8>> {
    let sign_err = |e: openssl::error::ErrorStack| {
        Error::KeyLoad(format!("private key cannot produce an RSA signature: {}", e))
    };

    let mut signer = Signer::new(MessageDigest::sha256(), private_key.pkey()).map_err(sign_err)?;
    signer.set_rsa_padding(Padding::PKCS1).map_err(sign_err)?;
    signer.update(message).map_err(sign_err)?;
    signer.sign_to_vec().map_err(sign_err)
}

/// Checks a signature over raw canonical bytes.
///
/// Any mismatch, malformed signature or library failure yields `false`.
pub fn verify_bytes(message: &[u8], signature: &[u8], public_key: &PublicKey) -> bool {
    let outcome = (|| -> std::result::Result<bool, openssl::error::ErrorStack> {
        let mut verifier = Verifier::new(MessageDigest::sha256(), public_key.pkey())?;
        verifier.set_rsa_padding(Padding::PKCS1)?;
        verifier.update(message)?;
        verifier.verify(signature)
    })();

    match outcome {
        Ok(valid) => valid,
        Err(e) => {
            crate::debugf!("signature check errored, treating as mismatch: {}", e);
            false
        }
    }
}

/// Signs the canonical encoding of `record`, returning the raw signature
pub fn sign(record: &MetadataRecord, private_key: &PrivateKey) -> Result<Vec<u8>> {
    sign_bytes(&record.encode()?, private_key)
}

/// Checks `signature` against the canonical encoding of `record`
pub fn verify(record: &MetadataRecord, signature: &[u8], public_key: &PublicKey) -> bool {
    match record.encode() {
        Ok(bytes) => verify_bytes(&bytes, signature, public_key),
        Err(_) => false,
    }
}

/// Signs `record` and attaches the base64 signature
pub fn sign_record(record: MetadataRecord, private_key: &PrivateKey) -> Result<SignedRecord> {
    let signature = sign(&record, private_key)?;
    Ok(SignedRecord::new(record, STANDARD.encode(signature)))
}

/// Checks a signed record's embedded signature.
///
/// Returns [`Error::SignatureInvalid`] when the signature is not base64 or does not
/// match the record.
pub fn verify_record(signed: &SignedRecord, public_key: &PublicKey) -> Result<()> {
    let signature = STANDARD
        .decode(signed.signature())
        .map_err(|e| Error::SignatureInvalid(format!("signature is not valid base64: {}", e)))?;

    if verify(signed.record(), &signature, public_key) {
        Ok(())
    } else {
        Err(Error::SignatureInvalid(
            "signature does not match record".into(),
        ))
    }
}
