use proptest::prelude::*;

use super::*;

fn uncompressed_key(last_y_byte: u8) -> Vec<u8> {
    let mut key = Vec::with_capacity(UNCOMPRESSED_KEY_LEN);
    key.extend((0u8..32).map(|i| i.wrapping_add(0x10))); // X coordinate
    key.extend([0u8; 31]);
    key.push(last_y_byte);
    key
}

#[test]
fn compresses_even_parity_to_02() {
    let raw = uncompressed_key(0x08);
    let key = normalize_public_key(&raw).unwrap();

    assert_eq!(key.len(), COMPRESSED_KEY_LEN);
    assert_eq!(key.as_bytes()[0], 0x02);
    assert_eq!(&key.as_bytes()[1..], &raw[..32]);
}

#[test]
fn compresses_odd_parity_to_03() {
    let raw = uncompressed_key(0x09);
    let key = normalize_public_key(&raw).unwrap();

    assert_eq!(key.as_bytes()[0], 0x03);
    assert_eq!(&key.as_bytes()[1..], &raw[..32]);
}

#[test]
fn strips_sec1_uncompressed_tag_then_compresses() {
    let bare = uncompressed_key(0x07);
    let mut sec1 = vec![0x04];
    sec1.extend_from_slice(&bare);

    let from_sec1 = normalize_public_key(&sec1).unwrap();
    let from_bare = normalize_public_key(&bare).unwrap();
    assert_eq!(from_sec1, from_bare);
}

#[test]
fn rejects_65_byte_key_with_wrong_tag() {
    let mut sec1 = vec![0x05];
    sec1.extend_from_slice(&uncompressed_key(0x07));

    let err = normalize_public_key(&sec1).unwrap_err();
    assert_eq!(err, KeyError::InvalidUncompressedPrefix { prefix: 0x05 });
}

#[test]
fn passes_compressed_key_through_unchanged() {
    for tag in [0x02, 0x03] {
        let mut raw = vec![tag];
        raw.extend([0xabu8; 32]);

        let key = normalize_public_key(&raw).unwrap();
        assert_eq!(key.as_bytes(), raw.as_slice());
        assert!(key.is_compressed_secp256k1());
    }
}

#[test]
fn rejects_compressed_key_with_wrong_tag() {
    for tag in [0x00, 0x01, 0x04, 0xff] {
        let mut raw = vec![tag];
        raw.extend([0xabu8; 32]);

        let err = normalize_public_key(&raw).unwrap_err();
        assert_eq!(err, KeyError::InvalidCompressedPrefix { prefix: tag });
    }
}

#[test]
fn passes_raw_32_byte_key_through_unchanged() {
    let raw = [0x5au8; 32];
    let key = normalize_public_key(&raw).unwrap();

    assert_eq!(key.as_bytes(), raw.as_slice());
    assert!(!key.is_compressed_secp256k1());
}

#[test]
fn rejects_unsupported_lengths() {
    for len in [0usize, 1, 31, 34, 63, 66, 128] {
        let raw = vec![0x02; len];
        let err = normalize_public_key(&raw).unwrap_err();
        assert_eq!(err, KeyError::InvalidLength { len });
    }
}

#[test]
fn display_renders_hex() {
    let key = normalize_public_key(&[0x11; 32]).unwrap();
    assert_eq!(key.to_string(), "11".repeat(32));
}

proptest! {
    #[test]
    fn any_64_byte_key_compresses_to_33_bytes(xy in prop::array::uniform32(any::<u8>()),
                                              y in prop::array::uniform32(any::<u8>())) {
        let mut raw = xy.to_vec();
        raw.extend_from_slice(&y);

        let key = normalize_public_key(&raw).unwrap();
        prop_assert_eq!(key.len(), COMPRESSED_KEY_LEN);
        let expected_tag = if y[31] % 2 == 0 { 0x02 } else { 0x03 };
        prop_assert_eq!(key.as_bytes()[0], expected_tag);
        prop_assert_eq!(&key.as_bytes()[1..], &xy[..]);
    }

    #[test]
    fn unsupported_lengths_always_fail(len in 0usize..256, byte in any::<u8>()) {
        prop_assume!(!matches!(len, 32 | 33 | 64 | 65));
        let raw = vec![byte; len];
        prop_assert_eq!(
            normalize_public_key(&raw).unwrap_err(),
            KeyError::InvalidLength { len }
        );
    }
}
