// End-to-end issue/verify flows

use crate::common::{
    create_issuer, create_verifier, key_pair, other_key_pair, scenario_record, CERTIFICATE_ID,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use certseal::protocol::{Issuer, IssueState, Verifier, VerifyState};
use certseal::record::certificate::CREATED_AT;
use certseal::{
    signing, wrap, CertificateMetadata, CipherSuite, Envelope, ErrorKind, ProtocolPolicy,
    SignedRecord,
};
use std::sync::Arc;

#[test]
fn test_scenario_a_decrypted_record_verifies() {
    let issuer = create_issuer(ProtocolPolicy::new());
    let issued = issuer.issue(scenario_record()).expect("Failed to issue");

    // Walk the verify path by hand
    let envelope = Envelope::disassemble(&issued.payload).expect("Failed to disassemble");
    assert_eq!(envelope.suite, CipherSuite::Aes256Cfb);
    assert_eq!(envelope.iv.len(), 16);

    let bulk_key = wrap::unwrap_key(&envelope.wrapped_key, key_pair().private_key())
        .expect("Failed to unwrap");
    let plaintext = envelope
        .suite
        .cipher()
        .decrypt(&envelope.ciphertext, &bulk_key, &envelope.iv)
        .expect("Failed to decrypt");
    assert_eq!(plaintext.len(), envelope.ciphertext.len());

    let (record, signature) = SignedRecord::decode(&plaintext).expect("Failed to decode");
    assert_eq!(record, scenario_record());
    assert_eq!(record.len(), 4);

    let signature = signature.expect("signature field missing");
    let raw_signature = STANDARD.decode(&signature).expect("signature is not base64");
    assert_eq!(raw_signature.len(), 256);
    assert!(signing::verify(&record, &raw_signature, key_pair().public_key()));

    assert_eq!(
        String::from_utf8(record.encode().unwrap()).unwrap(),
        r#"{"Certificate ID": "CERT-2025-001", "Name": "HDD", "Course": "Data Wipe", "Issued Date": "24 Sept 2025"}"#
    );
}

#[test]
fn test_scenario_a_through_verifier() {
    let issued = create_issuer(ProtocolPolicy::new())
        .issue(scenario_record())
        .expect("Failed to issue");

    let signed = create_verifier(ProtocolPolicy::new())
        .verify(&issued.payload)
        .expect("Failed to verify");
    assert_eq!(signed.record(), &scenario_record());
    assert_eq!(signed.signature(), issued.signed.signature());
}

#[test]
fn test_issuing_twice_gives_different_payloads_same_record() {
    let issuer = create_issuer(ProtocolPolicy::new());
    let first = issuer.issue(scenario_record()).unwrap();
    let second = issuer.issue(scenario_record()).unwrap();

    assert_eq!(first.signed.encode().unwrap(), second.signed.encode().unwrap());
    assert_ne!(first.payload, second.payload);

    let first_envelope = Envelope::disassemble(&first.payload).unwrap();
    let second_envelope = Envelope::disassemble(&second.payload).unwrap();
    assert_ne!(first_envelope.iv, second_envelope.iv);
    assert_ne!(first_envelope.ciphertext, second_envelope.ciphertext);

    let verifier = create_verifier(ProtocolPolicy::new());
    assert_eq!(
        verifier.verify(&first.payload).unwrap(),
        verifier.verify(&second.payload).unwrap()
    );
}

#[test]
fn test_gcm_round_trip() {
    let policy = ProtocolPolicy::new().with_authenticated_cipher_only();
    let issued = create_issuer(policy.clone())
        .issue(scenario_record())
        .expect("Failed to issue");
    assert_eq!(issued.suite, CipherSuite::Aes256Gcm);

    let envelope = Envelope::disassemble(&issued.payload).unwrap();
    assert_eq!(envelope.iv.len(), 12);

    let signed = create_verifier(policy).verify(&issued.payload).unwrap();
    assert_eq!(signed.record(), &scenario_record());
}

#[test]
fn test_cfb_verifier_still_opens_gcm_payloads() {
    let issued = create_issuer(ProtocolPolicy::new().with_cipher_suite(CipherSuite::Aes256Gcm))
        .issue(scenario_record())
        .unwrap();
    assert!(create_verifier(ProtocolPolicy::new())
        .verify(&issued.payload)
        .is_ok());
}

#[test]
fn test_wrong_private_key_fails_at_unwrap() {
    let issued = create_issuer(ProtocolPolicy::new())
        .issue(scenario_record())
        .unwrap();

    let verifier = Verifier::new(other_key_pair().private_key().clone()).unwrap();
    let (states, result) = verifier.verify_traced(&issued.payload);

    assert_eq!(result.unwrap_err().kind(), ErrorKind::Unwrap);
    assert_eq!(
        states,
        vec![
            VerifyState::Received,
            VerifyState::Disassembled,
            VerifyState::Failed(ErrorKind::Unwrap)
        ]
    );
}

#[test]
fn test_foreign_issuer_signature_is_rejected() {
    // Signed by one pair but wrapped for the verifier's key
    let issuer = Issuer::builder()
        .with_key_pair(other_key_pair())
        .with_recipient(key_pair().public_key().clone())
        .build()
        .unwrap();
    let issued = issuer.issue(scenario_record()).unwrap();

    let (states, result) = create_verifier(ProtocolPolicy::new()).verify_traced(&issued.payload);
    assert!(result.unwrap_err().is_rejection());
    assert_eq!(states.last(), Some(&VerifyState::Rejected));

    // Trusting the foreign public key instead accepts it
    let trusting = create_verifier(ProtocolPolicy::new())
        .with_public_key(other_key_pair().public_key().clone());
    assert!(trusting.verify(&issued.payload).is_ok());
}

#[test]
fn test_typed_certificate_with_stamp() {
    let issuer = create_issuer(ProtocolPolicy::new().with_created_at_stamp(true));
    let metadata = CertificateMetadata::new(CERTIFICATE_ID, "Zoë", "24 Sept 2025");
    let (states, result) = issuer.issue_traced(metadata.to_record());
    let issued = result.unwrap();
    assert_eq!(states.last(), Some(&IssueState::Enveloped));

    let signed = create_verifier(ProtocolPolicy::new())
        .verify(&issued.payload)
        .unwrap();
    let keys: Vec<_> = signed.record().iter().map(|(k, _)| k).collect();
    assert_eq!(
        keys,
        ["Certificate ID", "Name", "Course", "Issued Date", CREATED_AT]
    );

    let parsed = CertificateMetadata::try_from(signed.record()).unwrap();
    assert_eq!(parsed.name, "Zoë");
    assert!(parsed.created_at.is_some());
}

#[test]
fn test_cipher_failure_propagates_kind() {
    #[derive(Debug)]
    struct FailingCipher;

    impl certseal::SymmetricCipher for FailingCipher {
        fn suite(&self) -> CipherSuite {
            CipherSuite::Aes256Cfb
        }

        fn encrypt(&self, _plaintext: &[u8], _key: &[u8], _iv: &[u8]) -> certseal::Result<Vec<u8>> {
            Err(certseal::Error::Cipher("cipher unavailable".into()))
        }

        fn decrypt(&self, _ciphertext: &[u8], _key: &[u8], _iv: &[u8]) -> certseal::Result<Vec<u8>> {
            Err(certseal::Error::Cipher("cipher unavailable".into()))
        }
    }

    let issuer = Issuer::builder()
        .with_key_pair(key_pair())
        .with_cipher(Arc::new(FailingCipher))
        .build()
        .unwrap();
    let (states, result) = issuer.issue_traced(scenario_record());

    assert_eq!(result.unwrap_err().kind(), ErrorKind::Cipher);
    assert_eq!(
        states,
        vec![
            IssueState::Building,
            IssueState::Signed,
            IssueState::Failed(ErrorKind::Cipher)
        ]
    );
}
