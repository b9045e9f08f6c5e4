use crate::crypto::CipherSuite;
use crate::keys::DEFAULT_RSA_KEY_BITS;

/// Default values for ProtocolPolicy
pub const DEFAULT_PRIVATE_KEY_FILE: &str = "private_key.pem";
pub const DEFAULT_PUBLIC_KEY_FILE: &str = "public_key.pem";

/// Policy for issuing and verifying certificate payloads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolPolicy {
    /// Cipher suite used by the issuer for new payloads
    pub cipher_suite: CipherSuite,

    /// Whether the verifier accepts payloads sealed with the unauthenticated CFB suite
    pub allow_unauthenticated_cipher: bool,

    /// Modulus size for newly provisioned key pairs
    pub rsa_key_bits: u32,

    /// File name of the private key inside a key directory
    pub private_key_file: String,

    /// File name of the public key inside a key directory
    pub public_key_file: String,

    /// Whether the issuer appends a `Created At` field to records lacking one
    pub stamp_created_at: bool,
}

impl Default for ProtocolPolicy {
    fn default() -> Self {
        Self {
            cipher_suite: CipherSuite::Aes256Cfb,
            allow_unauthenticated_cipher: true,
            rsa_key_bits: DEFAULT_RSA_KEY_BITS,
            private_key_file: DEFAULT_PRIVATE_KEY_FILE.to_string(),
            public_key_file: DEFAULT_PUBLIC_KEY_FILE.to_string(),
            stamp_created_at: false,
        }
    }
}

impl ProtocolPolicy {
    /// Creates a new ProtocolPolicy with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cipher suite used for new payloads
    ///
    /// # Example
    /// ```
    /// use certseal::{CipherSuite, ProtocolPolicy};
    ///
    /// let policy = ProtocolPolicy::new().with_cipher_suite(CipherSuite::Aes256Gcm);
    /// assert!(policy.cipher_suite.is_authenticated());
    /// ```
    pub fn with_cipher_suite(mut self, suite: CipherSuite) -> Self {
        self.cipher_suite = suite;
        self
    }

    /// Makes the verifier refuse CFB payloads, so only tamper-detecting ciphertexts
    /// are accepted
    pub fn with_authenticated_cipher_only(mut self) -> Self {
        self.allow_unauthenticated_cipher = false;
        self.cipher_suite = CipherSuite::Aes256Gcm;
        self
    }

    /// Sets the modulus size for provisioned key pairs
    pub fn with_rsa_key_bits(mut self, bits: u32) -> Self {
        self.rsa_key_bits = bits;
        self
    }

    /// Sets the key file names used inside a key directory
    pub fn with_key_files(
        mut self,
        private_key_file: impl Into<String>,
        public_key_file: impl Into<String>,
    ) -> Self {
        self.private_key_file = private_key_file.into();
        self.public_key_file = public_key_file.into();
        self
    }

    /// Enables or disables `Created At` stamping
    pub fn with_created_at_stamp(mut self, enabled: bool) -> Self {
        self.stamp_created_at = enabled;
        self
    }

    /// Whether a verifier under this policy accepts `suite`
    pub fn accepts(&self, suite: CipherSuite) -> bool {
        suite.is_authenticated() || self.allow_unauthenticated_cipher
    }
}
