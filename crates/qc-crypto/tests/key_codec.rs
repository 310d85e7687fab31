//! Key file and hex round-trips through [`KeyCodec`].

use std::fs;
use std::sync::Arc;

use qc_crypto::{CryptoError, Ed25519Sig, HybridSig, KeyCodec};

fn ed25519_codec() -> KeyCodec {
    KeyCodec::new(Arc::new(Ed25519Sig::new()))
}

#[test]
fn test_hex_round_trip_hybrid() {
    let codec = KeyCodec::new(Arc::new(HybridSig::new()));
    let key = codec.algorithm().generate_key().unwrap();

    let private_hex = codec.private_key_to_hex(&key).unwrap();
    let restored = codec.hex_to_private_key(&private_hex).unwrap();
    assert_eq!(restored.secret_bytes(), key.secret_bytes());
    assert_eq!(restored.public_key(), key.public_key());

    let public_hex = codec.public_key_to_hex(key.public_key()).unwrap();
    assert_eq!(public_hex.len(), 2 * codec.algorithm().public_key_length());
    assert_eq!(&codec.hex_to_public_key(&public_hex).unwrap(), key.public_key());
}

#[test]
fn test_hex_rejects_wrong_length() {
    let codec = ed25519_codec();
    assert!(matches!(
        codec.hex_to_private_key("abcd"),
        Err(CryptoError::InvalidKeyLength { .. })
    ));
    assert!(matches!(
        codec.hex_to_public_key("not hex"),
        Err(CryptoError::InvalidHex(_))
    ));
}

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("node.key");
    let codec = ed25519_codec();
    let key = codec.algorithm().generate_key().unwrap();

    codec.save_private_key_to_file(&path, &key).unwrap();
    let loaded = codec.load_private_key_from_file(&path).unwrap();

    assert_eq!(loaded.secret_bytes(), key.secret_bytes());
    assert_eq!(loaded.public_key(), key.public_key());
}

#[test]
fn test_oversized_file_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("node.key");
    let codec = ed25519_codec();
    let key = codec.algorithm().generate_key().unwrap();

    let mut contents = codec.private_key_to_hex(&key).unwrap();
    contents.push_str(&"\n".repeat(1 << 20));
    fs::write(&path, contents).unwrap();

    assert!(matches!(
        codec.load_private_key_from_file(&path),
        Err(CryptoError::KeyFileTooLong { .. })
    ));
}

#[cfg(unix)]
#[test]
fn test_saved_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("node.key");
    let codec = ed25519_codec();
    let key = codec.algorithm().generate_key().unwrap();

    codec.save_private_key_to_file(&path, &key).unwrap();
    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn test_file_with_trailing_newlines() {
    let dir = tempfile::tempdir().unwrap();
    let codec = ed25519_codec();
    let key = codec.algorithm().generate_key().unwrap();
    let encoded = codec.private_key_to_hex(&key).unwrap();

    let ok = dir.path().join("ok.key");
    fs::write(&ok, format!("{}\r\n", encoded)).unwrap();
    assert!(codec.load_private_key_from_file(&ok).is_ok());

    let too_long = dir.path().join("long.key");
    fs::write(&too_long, format!("{}\n\n\n", encoded)).unwrap();
    assert!(matches!(
        codec.load_private_key_from_file(&too_long),
        Err(CryptoError::KeyFileTooLong { .. })
    ));

    let junk = dir.path().join("junk.key");
    fs::write(&junk, format!("{}x", encoded)).unwrap();
    assert!(matches!(
        codec.load_private_key_from_file(&junk),
        Err(CryptoError::KeyFileInvalidTrailer('x'))
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let codec = ed25519_codec();
    assert!(matches!(
        codec.load_private_key_from_file(&dir.path().join("absent.key")),
        Err(CryptoError::Io(_))
    ));
}
