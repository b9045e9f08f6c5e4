use std::fmt;
use thiserror::Error;

/// Result type for certseal operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while issuing or verifying a certificate payload
#[derive(Error, Debug)]
pub enum Error {
    /// A record could not be canonically serialized, or decoded bytes are not a valid record
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Key material is missing, unreadable, or not an RSA key of an acceptable size
    #[error("Key load error: {0}")]
    KeyLoad(String),

    /// RSA-OAEP wrapping of the bulk key failed
    #[error("Key wrap error: {0}")]
    Wrap(String),

    /// RSA-OAEP unwrapping failed (wrong private key, corrupted ciphertext, bad padding)
    #[error("Key unwrap error: {0}")]
    Unwrap(String),

    /// Symmetric layer failure, including authenticated-encryption integrity failures
    #[error("Cipher error: {0}")]
    Cipher(String),

    /// The signature was checked and does not match the record
    #[error("Signature invalid: {0}")]
    SignatureInvalid(String),

    /// The transport string does not parse into the required envelope fields
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Errors related to I/O operations outside key loading (key provisioning writes)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid argument error
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Field-less discriminant of [`Error`], stable across releases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Encoding,
    KeyLoad,
    Wrap,
    Unwrap,
    Cipher,
    SignatureInvalid,
    MalformedPayload,
    Io,
    InvalidArgument,
}

impl Error {
    /// Returns the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Encoding(_) => ErrorKind::Encoding,
            Error::KeyLoad(_) => ErrorKind::KeyLoad,
            Error::Wrap(_) => ErrorKind::Wrap,
            Error::Unwrap(_) => ErrorKind::Unwrap,
            Error::Cipher(_) => ErrorKind::Cipher,
            Error::SignatureInvalid(_) => ErrorKind::SignatureInvalid,
            Error::MalformedPayload(_) => ErrorKind::MalformedPayload,
            Error::Io(_) => ErrorKind::Io,
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
        }
    }

    /// True when verification ran to completion and rejected the record.
    ///
    /// Every other kind means the payload could not be processed at all.
    pub fn is_rejection(&self) -> bool {
        self.kind() == ErrorKind::SignatureInvalid
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Encoding => "encoding",
            ErrorKind::KeyLoad => "key_load",
            ErrorKind::Wrap => "wrap",
            ErrorKind::Unwrap => "unwrap",
            ErrorKind::Cipher => "cipher",
            ErrorKind::SignatureInvalid => "signature_invalid",
            ErrorKind::MalformedPayload => "malformed_payload",
            ErrorKind::Io => "io",
            ErrorKind::InvalidArgument => "invalid_argument",
        };
        f.write_str(name)
    }
}
