// Tampering with a payload must never produce a verified record

use crate::common::{create_issuer, create_verifier, scenario_record};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use certseal::{CipherSuite, Envelope, ErrorKind, ProtocolPolicy, SignedRecord};

// Replaces one character in the middle of the base64 `data` field
fn corrupt_data_field(payload: &str) -> String {
    let json = STANDARD.decode(payload).expect("payload is not base64");
    let mut wire: serde_json::Value = serde_json::from_slice(&json).expect("payload is not json");

    let data = wire["data"].as_str().expect("data field missing").to_string();
    let mut chars: Vec<char> = data.chars().collect();
    let middle = chars.len() / 2;
    chars[middle] = if chars[middle] == 'A' { 'B' } else { 'A' };
    wire["data"] = serde_json::Value::String(chars.into_iter().collect());

    STANDARD.encode(serde_json::to_vec(&wire).unwrap())
}

#[test]
fn test_scenario_b_corrupted_data_is_never_verified() {
    let issued = create_issuer(ProtocolPolicy::new())
        .issue(scenario_record())
        .unwrap();
    let tampered = corrupt_data_field(&issued.payload);
    assert_ne!(tampered, issued.payload);

    // Still a well-formed envelope
    let envelope = Envelope::disassemble(&tampered).expect("Failed to disassemble");
    assert_eq!(envelope.suite, CipherSuite::Aes256Cfb);

    let err = create_verifier(ProtocolPolicy::new())
        .verify(&tampered)
        .expect_err("tampered payload verified");
    assert!(
        matches!(err.kind(), ErrorKind::SignatureInvalid | ErrorKind::Encoding),
        "unexpected error kind {:?}",
        err.kind()
    );
}

#[test]
fn test_every_flipped_ciphertext_byte_is_caught() {
    let issued = create_issuer(ProtocolPolicy::new())
        .issue(scenario_record())
        .unwrap();
    let envelope = Envelope::disassemble(&issued.payload).unwrap();
    let verifier = create_verifier(ProtocolPolicy::new());

    for index in 0..envelope.ciphertext.len() {
        let mut tampered = envelope.clone();
        tampered.ciphertext[index] ^= 0x01;
        let payload = tampered.assemble().unwrap();

        let err = verifier
            .verify(&payload)
            .expect_err("tampered payload verified");
        assert!(
            matches!(err.kind(), ErrorKind::SignatureInvalid | ErrorKind::Encoding),
            "byte {}: unexpected error kind {:?}",
            index,
            err.kind()
        );
    }
}

#[test]
fn test_gcm_tamper_fails_in_cipher() {
    let policy = ProtocolPolicy::new().with_authenticated_cipher_only();
    let issued = create_issuer(policy.clone()).issue(scenario_record()).unwrap();
    let verifier = create_verifier(policy);

    let mut envelope = Envelope::disassemble(&issued.payload).unwrap();
    envelope.ciphertext[3] ^= 0x80;
    let err = verifier.verify(&envelope.assemble().unwrap()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cipher);

    // Downgrading the suite label is refused outright
    let mut downgraded = Envelope::disassemble(&issued.payload).unwrap();
    downgraded.suite = CipherSuite::Aes256Cfb;
    downgraded.iv.extend_from_slice(&[0; 4]);
    let err = verifier.verify(&downgraded.assemble().unwrap()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedPayload);
}

#[test]
fn test_changed_iv_is_caught() {
    let issued = create_issuer(ProtocolPolicy::new())
        .issue(scenario_record())
        .unwrap();
    let mut envelope = Envelope::disassemble(&issued.payload).unwrap();
    envelope.iv[0] ^= 0xff;

    let err = create_verifier(ProtocolPolicy::new())
        .verify(&envelope.assemble().unwrap())
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::SignatureInvalid | ErrorKind::Encoding
    ));
}

#[test]
fn test_swapped_field_value_is_rejected() {
    let issuer = create_issuer(ProtocolPolicy::new());
    let issued = issuer.issue(scenario_record()).unwrap();

    // Re-seal the same signature over an edited record with fresh secrets
    let (mut record, signature) = issued.signed.into_parts();
    record.insert("Name", "SSD").unwrap();
    let forged = SignedRecord::new(record, signature);

    let payload = {
        use certseal::crypto::SymmetricSecret;
        let keys = crate::common::key_pair();
        let secret = SymmetricSecret::generate(CipherSuite::Aes256Cfb);
        let ciphertext = CipherSuite::Aes256Cfb
            .cipher()
            .encrypt(&forged.encode().unwrap(), secret.key(), secret.iv())
            .unwrap();
        let wrapped = certseal::wrap::wrap_key(secret.key(), keys.public_key()).unwrap();
        certseal::envelope::assemble(&wrapped, secret.iv(), &ciphertext).unwrap()
    };

    let err = create_verifier(ProtocolPolicy::new())
        .verify(&payload)
        .unwrap_err();
    assert!(err.is_rejection());
}
