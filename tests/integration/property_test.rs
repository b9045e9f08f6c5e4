// Property tests for the encoder, ciphers, key wrap and signatures

use crate::common::key_pair;
use certseal::crypto::{Aes256CfbCipher, Aes256GcmCipher};
use certseal::record::SIGNATURE_FIELD;
use certseal::{signing, wrap, MetadataRecord, SignedRecord, SymmetricCipher};
use proptest::collection::vec;
use proptest::prelude::*;

fn record_strategy() -> impl Strategy<Value = MetadataRecord> {
    vec((any::<String>(), any::<String>()), 0..8).prop_map(|fields| {
        fields
            .into_iter()
            .filter(|(key, _)| key != SIGNATURE_FIELD)
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_encode_decode_round_trip(record in record_strategy()) {
        let bytes = record.encode().unwrap();
        prop_assert!(bytes.is_ascii());
        prop_assert_eq!(MetadataRecord::decode(&bytes).unwrap(), record.clone());
        prop_assert_eq!(record.encode().unwrap(), bytes);
    }

    #[test]
    fn prop_signed_round_trip(record in record_strategy(), signature in "[A-Za-z0-9+/]{0,64}") {
        let signed = SignedRecord::new(record.clone(), signature.clone());
        let (decoded, decoded_signature) = SignedRecord::decode(&signed.encode().unwrap()).unwrap();
        prop_assert_eq!(decoded, record);
        prop_assert_eq!(decoded_signature, Some(signature));
    }

    #[test]
    fn prop_cfb_inverse(
        key in any::<[u8; 32]>(),
        iv in any::<[u8; 16]>(),
        plaintext in vec(any::<u8>(), 0..512),
    ) {
        let cipher = Aes256CfbCipher::new();
        let ciphertext = cipher.encrypt(&plaintext, &key, &iv).unwrap();
        prop_assert_eq!(ciphertext.len(), plaintext.len());
        prop_assert_eq!(cipher.decrypt(&ciphertext, &key, &iv).unwrap(), plaintext);
    }

    #[test]
    fn prop_gcm_inverse(
        key in any::<[u8; 32]>(),
        nonce in any::<[u8; 12]>(),
        plaintext in vec(any::<u8>(), 0..512),
    ) {
        let cipher = Aes256GcmCipher::new();
        let ciphertext = cipher.encrypt(&plaintext, &key, &nonce).unwrap();
        prop_assert_eq!(cipher.decrypt(&ciphertext, &key, &nonce).unwrap(), plaintext);
    }
}

proptest! {
    // RSA operations are slow, keep the case count low
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_wrap_inverse(secret in any::<[u8; 32]>()) {
        let keys = key_pair();
        let wrapped = wrap::wrap_key(&secret, keys.public_key()).unwrap();
        let unwrapped = wrap::unwrap_key(&wrapped, keys.private_key()).unwrap();
        prop_assert_eq!(unwrapped.as_slice(), &secret[..]);
    }

    #[test]
    fn prop_flipped_byte_fails_verification(
        record in record_strategy(),
        index in any::<prop::sample::Index>(),
        mask in 1_u8..=255,
    ) {
        let keys = key_pair();
        let bytes = record.encode().unwrap();
        let signature = signing::sign_bytes(&bytes, keys.private_key()).unwrap();
        prop_assert!(signing::verify_bytes(&bytes, &signature, keys.public_key()));

        let mut tampered = bytes.clone();
        let position = index.index(tampered.len());
        tampered[position] ^= mask;
        prop_assert!(!signing::verify_bytes(&tampered, &signature, keys.public_key()));
    }
}
