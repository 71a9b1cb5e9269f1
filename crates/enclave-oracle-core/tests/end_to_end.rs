//! End-to-end flow through the public API: attest, register, configure,
//! submit, read back.

use enclave_oracle_core::{
    signing_digest, AttestationDocument, AttestationRegistry, MemoryEventSink, OracleConfig,
    OracleError, PriceOracle, RegistryError, PRICE_INTENT_SCOPE,
};
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{Signature, SigningKey};

const NOW_MS: u64 = 1_700_000_000_000;

fn attested_enclave(seed: u8) -> (SigningKey, AttestationDocument) {
    let signing_key = SigningKey::from_slice(&[seed; 32]).unwrap();
    let public_key = signing_key
        .verifying_key()
        .to_encoded_point(false) // hand over the uncompressed SEC1 form
        .as_bytes()
        .to_vec();
    let doc = AttestationDocument {
        public_key: Some(public_key),
        pcrs: vec![
            (0, vec![seed; 48]),
            (1, vec![seed.wrapping_add(1); 48]),
            (2, vec![seed.wrapping_add(2); 48]),
            (16, vec![seed.wrapping_add(3); 48]),
        ],
    };
    (signing_key, doc)
}

fn sign_price(signing_key: &SigningKey, timestamp_ms: u64, price: u64) -> Vec<u8> {
    let digest = signing_digest(PRICE_INTENT_SCOPE, timestamp_ms, price).unwrap();
    let signature: Signature = signing_key.sign_prehash(&digest).unwrap();
    signature.to_bytes().to_vec()
}

#[test]
fn full_price_update_flow() {
    let sink = MemoryEventSink::shared();
    let (signing_key, doc) = attested_enclave(7);

    // Registration accepts the uncompressed key and canonicalizes it.
    let mut registry = AttestationRegistry::with_sink(sink.clone());
    let key = registry.register(&doc).unwrap();
    assert_eq!(key.len(), 33);

    // The deployer configures the oracle from the registered measurements.
    let (mut oracle, cap) = PriceOracle::with_sink(OracleConfig::default(), sink.clone());
    let expected = registry.get_pcrs(&key).unwrap().clone();
    oracle.update_expected_pcrs(&cap, expected).unwrap();

    // The enclave signs a price over the canonical intent encoding.
    let price = 1_250_000;
    let signature = sign_price(&signing_key, NOW_MS, price);
    oracle
        .update_price(&registry, NOW_MS, &key, price, NOW_MS, &signature)
        .unwrap();

    assert_eq!(oracle.latest_price().unwrap(), (price, NOW_MS));
    assert_eq!(sink.drain().len(), 4); // registered, created, configured, updated
}

#[test]
fn untrusted_enclave_cannot_move_the_price() {
    let (trusted_key, trusted_doc) = attested_enclave(7);
    let (rogue_key, rogue_doc) = attested_enclave(9);

    let mut registry = AttestationRegistry::new();
    let trusted = registry.register(&trusted_doc).unwrap();
    let rogue = registry.register(&rogue_doc).unwrap();

    let (mut oracle, cap) = PriceOracle::new(OracleConfig::default());
    let expected = registry.get_pcrs(&trusted).unwrap().clone();
    oracle.update_expected_pcrs(&cap, expected).unwrap();

    // Registered, correctly signed, fresh, but wrong measurements.
    let signature = sign_price(&rogue_key, NOW_MS, 9_999_999);
    let err = oracle
        .update_price(&registry, NOW_MS, &rogue, 9_999_999, NOW_MS, &signature)
        .unwrap_err();
    assert!(matches!(err, OracleError::InvalidPcrs));

    // Never-registered keys fail earlier, at the lookup.
    let ghost_doc = attested_enclave(11).1;
    let ghost = enclave_oracle_core::normalize_public_key(
        ghost_doc.public_key.as_deref().unwrap(),
    )
    .unwrap();
    let signature = sign_price(&trusted_key, NOW_MS, 1);
    let err = oracle
        .update_price(&registry, NOW_MS, &ghost, 1, NOW_MS, &signature)
        .unwrap_err();
    assert!(matches!(
        err,
        OracleError::Registry(RegistryError::NotRegistered { .. })
    ));

    assert!(oracle.latest_price().is_err());
}
