use thiserror::Error;

/// Errors returned by Pesepay operations.
#[derive(Debug, Error)]
pub enum PesepayError {
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("gateway returned {status}: {message}")]
    Gateway { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Failures of the payload codec. None of these are recoverable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("encryption key too short: {len} bytes, need at least {min}")]
    KeyTooShort { len: usize, min: usize },

    #[error("invalid base64: {0}")]
    InvalidBase64(String),

    #[error("ciphertext length {0} is not a positive multiple of the block size")]
    InvalidCiphertextLength(usize),

    #[error("invalid padding")]
    InvalidPadding,

    #[error("cipher rejected the derived key or IV")]
    CipherInit,
}
