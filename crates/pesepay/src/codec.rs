//! Payload codec: AES-256-CBC with PKCS#7 padding, framed as standard Base64.
//!
//! The gateway derives both cipher inputs from the one shared encryption key:
//! the first 32 bytes are the AES-256 key and the first 16 bytes are the IV.
//! A key-derived IV makes encryption deterministic and leaks equal-prefix
//! plaintexts, but the gateway decrypts with exactly this derivation, so it
//! cannot change without the gateway changing too.

use aes::Aes256;
use base64::Engine;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::constants::{BLOCK_SIZE, KEY_LENGTH};
use crate::error::{CryptoError, PesepayError};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Split raw key material into the AES-256 key and the CBC IV.
///
/// The slices are exactly 32 and 16 bytes, so `new_from_slices` cannot fail on them.
fn derive_key_iv(key: &[u8]) -> Result<(&[u8], &[u8]), CryptoError> {
    if key.len() < KEY_LENGTH {
        return Err(CryptoError::KeyTooShort {
            len: key.len(),
            min: KEY_LENGTH,
        });
    }
    Ok((&key[..KEY_LENGTH], &key[..BLOCK_SIZE]))
}

/// Encrypt `plaintext` and return the ciphertext as standard Base64.
///
/// The ciphertext is always a positive multiple of 16 bytes: block-aligned
/// input gains a full block of padding.
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<String, CryptoError> {
    let (key, iv) = derive_key_iv(key)?;
    let encryptor = Aes256CbcEnc::new_from_slices(key, iv).map_err(|_| CryptoError::CipherInit)?;

    let msg_len = plaintext.len();
    let mut buffer = Vec::with_capacity(msg_len + BLOCK_SIZE);
    buffer.extend_from_slice(plaintext);
    buffer.resize(msg_len + BLOCK_SIZE, 0);

    let ciphertext_len = encryptor
        .encrypt_padded_mut::<Pkcs7>(&mut buffer, msg_len)
        .map_err(|_| CryptoError::InvalidPadding)?
        .len();
    buffer.truncate(ciphertext_len);

    Ok(base64::engine::general_purpose::STANDARD.encode(&buffer))
}

/// Decode and decrypt a Base64 ciphertext produced by [`encrypt`] (or the gateway).
pub fn decrypt(ciphertext_b64: &str, key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let (key, iv) = derive_key_iv(key)?;

    let mut buffer = base64::engine::general_purpose::STANDARD
        .decode(ciphertext_b64.trim())
        .map_err(|e| CryptoError::InvalidBase64(e.to_string()))?;

    if buffer.is_empty() || buffer.len() % BLOCK_SIZE != 0 {
        return Err(CryptoError::InvalidCiphertextLength(buffer.len()));
    }

    let decryptor = Aes256CbcDec::new_from_slices(key, iv).map_err(|_| CryptoError::CipherInit)?;

    let plaintext_len = decryptor
        .decrypt_padded_mut::<Pkcs7>(&mut buffer)
        .map_err(|_| CryptoError::InvalidPadding)?
        .len();
    buffer.truncate(plaintext_len);

    Ok(buffer)
}

/// Serialize `value` to JSON and encrypt it.
pub fn encrypt_json<T: Serialize>(value: &T, key: &[u8]) -> Result<String, PesepayError> {
    let json = serde_json::to_vec(value)?;
    Ok(encrypt(&json, key)?)
}

/// Decrypt a payload and parse the plaintext as JSON.
pub fn decrypt_json<T: DeserializeOwned>(ciphertext_b64: &str, key: &[u8]) -> Result<T, PesepayError> {
    let plaintext = decrypt(ciphertext_b64, key)?;
    serde_json::from_slice(&plaintext)
        .map_err(|e| PesepayError::Protocol(format!("decrypted payload is not valid JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
    use cbc::cipher::block_padding::NoPadding;

    const KEY: &[u8] = b"0f2c4a8e1b3d5f7092a4c6e8f0b2d4e6";

    fn raw_decrypt(ciphertext_b64: &str) -> Vec<u8> {
        let mut buffer = base64::engine::general_purpose::STANDARD
            .decode(ciphertext_b64)
            .unwrap();
        let decryptor = Aes256CbcDec::new_from_slices(&KEY[..32], &KEY[..16]).unwrap();
        let len = decryptor
            .decrypt_padded_mut::<NoPadding>(&mut buffer)
            .unwrap()
            .len();
        buffer.truncate(len);
        buffer
    }

    fn ciphertext_len(ciphertext_b64: &str) -> usize {
        base64::engine::general_purpose::STANDARD
            .decode(ciphertext_b64)
            .unwrap()
            .len()
    }

    #[test]
    fn test_roundtrip() {
        let plaintext = br#"{"amountDetails":{"amount":10.5,"currencyCode":"USD"}}"#;
        let encrypted = encrypt(plaintext, KEY).unwrap();
        assert_eq!(decrypt(&encrypted, KEY).unwrap(), plaintext.to_vec());
    }

    #[test]
    fn test_roundtrip_empty() {
        let encrypted = encrypt(b"", KEY).unwrap();
        assert_eq!(ciphertext_len(&encrypted), 16);
        assert!(decrypt(&encrypted, KEY).unwrap().is_empty());
    }

    #[test]
    fn test_padding_lengths() {
        for len in [1usize, 15, 16, 17, 31, 32, 100] {
            let plaintext = vec![b'x'; len];
            let encrypted = encrypt(&plaintext, KEY).unwrap();
            let expected = (len / 16 + 1) * 16;
            assert_eq!(ciphertext_len(&encrypted), expected, "input length {len}");
        }
    }

    #[test]
    fn test_aligned_input_gains_full_block() {
        let plaintext = [b'a'; 32];
        let padded = raw_decrypt(&encrypt(&plaintext, KEY).unwrap());
        assert_eq!(padded.len(), 48);
        assert_eq!(&padded[..32], &plaintext);
        assert!(padded[32..].iter().all(|&b| b == 16));
    }

    #[test]
    fn test_pad_bytes_hold_pad_length() {
        let padded = raw_decrypt(&encrypt(b"abc", KEY).unwrap());
        assert_eq!(padded.len(), 16);
        assert_eq!(&padded[..3], b"abc");
        assert!(padded[3..].iter().all(|&b| b == 13));
    }

    #[test]
    fn test_deterministic() {
        let a = encrypt(b"same input", KEY).unwrap();
        let b = encrypt(b"same input", KEY).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_iv_is_key_prefix() {
        let plaintext = [b'p'; 16];
        let encrypted = encrypt(&plaintext, KEY).unwrap();
        let ciphertext = base64::engine::general_purpose::STANDARD
            .decode(&encrypted)
            .unwrap();

        // First CBC block = AES(key, P0 xor IV)
        let mut block = [0u8; 16];
        for (i, b) in block.iter_mut().enumerate() {
            *b = plaintext[i] ^ KEY[i];
        }
        let cipher = Aes256::new_from_slice(&KEY[..32]).unwrap();
        let mut block = GenericArray::clone_from_slice(&block);
        cipher.encrypt_block(&mut block);

        assert_eq!(&ciphertext[..16], block.as_slice());
    }

    #[test]
    fn test_only_first_32_key_bytes_used() {
        let mut long_key = KEY.to_vec();
        long_key.extend_from_slice(b"ignored-suffix");
        assert_eq!(
            encrypt(b"payload", &long_key).unwrap(),
            encrypt(b"payload", KEY).unwrap()
        );
    }

    #[test]
    fn test_output_is_single_line_base64() {
        let encrypted = encrypt(&[b'z'; 500], KEY).unwrap();
        assert!(!encrypted.contains('\n'));
        assert!(base64::engine::general_purpose::STANDARD
            .decode(&encrypted)
            .is_ok());
    }

    #[test]
    fn test_short_key_rejected() {
        let err = encrypt(b"data", b"only-sixteen-byt").unwrap_err();
        assert_eq!(err, CryptoError::KeyTooShort { len: 16, min: 32 });

        let err = decrypt("AAAAAAAAAAAAAAAAAAAAAA==", b"short").unwrap_err();
        assert_eq!(err, CryptoError::KeyTooShort { len: 5, min: 32 });
    }

    #[test]
    fn test_derived_slices_always_fit_cipher() {
        let long_key = [7u8; 48];
        let (key, iv) = derive_key_iv(&long_key).unwrap();
        assert_eq!((key.len(), iv.len()), (KEY_LENGTH, BLOCK_SIZE));
        assert!(Aes256CbcEnc::new_from_slices(key, iv).is_ok());
        assert!(Aes256CbcDec::new_from_slices(key, iv).is_ok());
    }

    #[test]
    fn test_invalid_base64_rejected() {
        let err = decrypt("not base64!!", KEY).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidBase64(_)));
    }

    #[test]
    fn test_unaligned_ciphertext_rejected() {
        let ten_bytes = base64::engine::general_purpose::STANDARD.encode([0u8; 10]);
        assert_eq!(
            decrypt(&ten_bytes, KEY).unwrap_err(),
            CryptoError::InvalidCiphertextLength(10)
        );
        assert_eq!(
            decrypt("", KEY).unwrap_err(),
            CryptoError::InvalidCiphertextLength(0)
        );
    }

    #[test]
    fn test_invalid_padding_rejected() {
        // A block whose plaintext ends in 0x00 can never carry valid PKCS#7.
        let mut buffer = [0u8; 16];
        let encryptor = Aes256CbcEnc::new_from_slices(&KEY[..32], &KEY[..16]).unwrap();
        encryptor
            .encrypt_padded_mut::<NoPadding>(&mut buffer, 16)
            .unwrap();
        let encoded = base64::engine::general_purpose::STANDARD.encode(buffer);

        assert_eq!(decrypt(&encoded, KEY).unwrap_err(), CryptoError::InvalidPadding);
    }

    #[test]
    fn test_json_helpers_roundtrip() {
        let value = serde_json::json!({"referenceNumber": "R1", "paid": true});
        let encrypted = encrypt_json(&value, KEY).unwrap();
        let decoded: serde_json::Value = decrypt_json(&encrypted, KEY).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_decrypt_json_rejects_non_json() {
        let encrypted = encrypt(b"<html>oops</html>", KEY).unwrap();
        let err = decrypt_json::<serde_json::Value>(&encrypted, KEY).unwrap_err();
        assert!(matches!(err, PesepayError::Protocol(_)));
    }
}
