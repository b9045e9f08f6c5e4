use super::state::{Trail, VerifyState};
use crate::crypto::SymmetricSecret;
use crate::envelope::Envelope;
use crate::error::{Error, Result};
use crate::keys::{PrivateKey, PublicKey};
use crate::policy::ProtocolPolicy;
use crate::record::SignedRecord;
use crate::{signing, wrap};
use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;

/// Opens payloads and checks the issuer signature before returning any field
#[derive(Debug, Clone)]
pub struct Verifier {
    private_key: PrivateKey,
    public_key: PublicKey,
    policy: Arc<ProtocolPolicy>,
}

impl Verifier {
    /// Creates a verifier holding only the private key. Signatures are checked
    /// against the public half derived from it.
    pub fn new(private_key: PrivateKey) -> Result<Self> {
        let public_key = private_key.public_key()?;
        Ok(Verifier {
            private_key,
            public_key,
            policy: Arc::new(ProtocolPolicy::default()),
        })
    }

    /// Checks signatures against `public_key` instead of the derived one
    pub fn with_public_key(mut self, public_key: PublicKey) -> Self {
        self.public_key = public_key;
        self
    }

    /// Sets the policy
    pub fn with_policy(mut self, policy: Arc<ProtocolPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Opens `payload` and returns its record only if the signature holds.
    ///
    /// A missing or non-matching signature yields [`Error::SignatureInvalid`]; every
    /// other error names the step that could not complete.
    pub fn verify(&self, payload: &str) -> Result<SignedRecord> {
        self.verify_traced(payload).1
    }

    /// Like [`verify`](Self::verify), also returning every state visited
    pub fn verify_traced(&self, payload: &str) -> (Vec<VerifyState>, Result<SignedRecord>) {
        let start = Instant::now();
        counter!("certseal.verify", 1);

        let mut trail = Trail::start("verify", VerifyState::Received);
        let result = self.run(payload, &mut trail);

        match trail.current() {
            VerifyState::Rejected => {
                counter!("certseal.verify.rejected", 1);
            }
            VerifyState::Failed(_) => {
                counter!("certseal.verify.failed", 1);
            }
            _ => {}
        }
        histogram!("certseal.verify.time", start.elapsed());
        (trail.into_states(), result)
    }

    fn run(&self, payload: &str, trail: &mut Trail<VerifyState>) -> Result<SignedRecord> {
        let envelope = trail.step(VerifyState::Disassembled, || {
            let envelope = Envelope::disassemble(payload)?;
            if !self.policy.accepts(envelope.suite) {
                return Err(Error::MalformedPayload(format!(
                    "{} payloads are not accepted",
                    envelope.suite
                )));
            }
            Ok(envelope)
        })?;

        let suite = envelope.suite;
        let secret = trail.step(VerifyState::Unwrapped, || {
            let bulk_key = wrap::unwrap_key(&envelope.wrapped_key, &self.private_key)?;
            SymmetricSecret::from_parts(&bulk_key, envelope.iv)
        })?;

        let plaintext = trail.step(VerifyState::Decrypted, || {
            suite
                .cipher()
                .decrypt(&envelope.ciphertext, secret.key(), secret.iv())
        })?;
        drop(secret);

        let (record, signature) =
            trail.step(VerifyState::Decoded, || SignedRecord::decode(&plaintext))?;

        let signed = match signature {
            Some(signature) => SignedRecord::new(record, signature),
            None => {
                trail.advance(VerifyState::Rejected);
                return Err(Error::SignatureInvalid("record carries no signature".into()));
            }
        };

        match signing::verify_record(&signed, &self.public_key) {
            Ok(()) => {
                trail.advance(VerifyState::Verified);
                Ok(signed)
            }
            Err(e) => {
                trail.advance(if e.is_rejection() {
                    VerifyState::Rejected
                } else {
                    VerifyState::Failed(e.kind())
                });
                Err(e)
            }
        }
    }
}
