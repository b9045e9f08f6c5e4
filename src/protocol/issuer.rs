use super::state::{IssueState, Trail};
use crate::crypto::{CipherSuite, SymmetricSecret};
use crate::envelope::Envelope;
use crate::error::{Error, Result};
use crate::keys::{KeyPair, PublicKey};
use crate::policy::ProtocolPolicy;
use crate::record::certificate::{now_timestamp, CREATED_AT};
use crate::record::{CertificateMetadata, MetadataRecord, SignedRecord};
use crate::{signing, wrap, SymmetricCipher};
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;

/// Output of a successful issue
#[derive(Debug, Clone)]
pub struct Issued {
    /// The record exactly as it was signed, with its signature
    pub signed: SignedRecord,
    /// Transport token to embed in the QR code
    pub payload: String,
    /// Suite the payload was sealed with
    pub suite: CipherSuite,
}

/// Signs, encrypts and envelopes certificate records
///
/// An `Issuer` holds no mutable state and can be shared across threads.
#[derive(Debug, Clone)]
pub struct Issuer {
    key_pair: Arc<KeyPair>,
    recipient: PublicKey,
    policy: Arc<ProtocolPolicy>,
    cipher: Arc<dyn SymmetricCipher>,
}

impl Issuer {
    /// Creates a new builder for Issuer
    pub fn builder() -> IssuerBuilder {
        IssuerBuilder::new()
    }

    /// The policy this issuer runs under
    pub fn policy(&self) -> &ProtocolPolicy {
        &self.policy
    }

    /// Suite used for new payloads
    pub fn suite(&self) -> CipherSuite {
        self.cipher.suite()
    }

    /// Issues a payload for `record`
    pub fn issue(&self, record: MetadataRecord) -> Result<Issued> {
        self.issue_traced(record).1
    }

    /// Issues a payload for a typed certificate
    pub fn issue_certificate(&self, metadata: &CertificateMetadata) -> Result<Issued> {
        self.issue(metadata.to_record())
    }

    /// Issues a payload for `record`, also returning every state visited
    pub fn issue_traced(&self, record: MetadataRecord) -> (Vec<IssueState>, Result<Issued>) {
        let start = Instant::now();
        counter!("certseal.issue", 1);

        let mut trail = Trail::start("issue", IssueState::Building);
        let result = self.run(record, &mut trail);

        histogram!("certseal.issue.time", start.elapsed());
        (trail.into_states(), result)
    }

    fn run(&self, mut record: MetadataRecord, trail: &mut Trail<IssueState>) -> Result<Issued> {
        if self.policy.stamp_created_at && !record.contains_key(CREATED_AT) {
            if let Err(e) = record.insert(CREATED_AT, now_timestamp()) {
                trail.advance(IssueState::Failed(e.kind()));
                return Err(e);
            }
        }

        let signed = trail.step(IssueState::Signed, || {
            signing::sign_record(record, self.key_pair.private_key())
        })?;

        let suite = self.cipher.suite();
        let secret = SymmetricSecret::generate(suite);
        let ciphertext = trail.step(IssueState::Encrypted, || {
            let plaintext = signed.encode()?;
            self.cipher.encrypt(&plaintext, secret.key(), secret.iv())
        })?;

        let payload = trail.step(IssueState::Enveloped, || {
            let wrapped_key = wrap::wrap_key(secret.key(), &self.recipient)?;
            Envelope::new(wrapped_key, secret.into_iv(), ciphertext, suite).assemble()
        })?;

        Ok(Issued {
            signed,
            payload,
            suite,
        })
    }
}

/// Builder for Issuer
#[derive(Debug, Default)]
pub struct IssuerBuilder {
    key_pair: Option<Arc<KeyPair>>,
    recipient: Option<PublicKey>,
    policy: Option<Arc<ProtocolPolicy>>,
    cipher: Option<Arc<dyn SymmetricCipher>>,
}

impl IssuerBuilder {
    /// Creates a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the signing key pair. Its public half is also the default recipient.
    pub fn with_key_pair(mut self, key_pair: Arc<KeyPair>) -> Self {
        self.key_pair = Some(key_pair);
        self
    }

    /// Wraps bulk keys for `recipient` instead of the signing pair's public key
    pub fn with_recipient(mut self, recipient: PublicKey) -> Self {
        self.recipient = Some(recipient);
        self
    }

    /// Sets the policy
    pub fn with_policy(mut self, policy: Arc<ProtocolPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Overrides the cipher chosen by the policy's suite
    pub fn with_cipher(mut self, cipher: Arc<dyn SymmetricCipher>) -> Self {
        self.cipher = Some(cipher);
        self
    }

    /// Builds the Issuer
    pub fn build(self) -> Result<Issuer> {
        let key_pair = self
            .key_pair
            .ok_or_else(|| Error::InvalidArgument("key pair is required".to_string()))?;
        let policy = self.policy.unwrap_or_default();
        let cipher = self.cipher.unwrap_or_else(|| policy.cipher_suite.cipher());
        let recipient = self
            .recipient
            .unwrap_or_else(|| key_pair.public_key().clone());

        Ok(Issuer {
            key_pair,
            recipient,
            policy,
            cipher,
        })
    }
}
