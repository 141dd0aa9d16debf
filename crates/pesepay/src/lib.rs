//! Pesepay encrypted payments protocol.
//!
//! Everything the Pesepay gateway expects on the wire, independent of any
//! HTTP stack:
//!
//! - **Codec** ([`codec`]): AES-256-CBC with PKCS#7 padding and Base64 framing
//! - **Payloads** ([`payment`]): transaction and seamless-payment request bodies
//! - **Responses** ([`response`]): decrypt and normalize gateway answers
//!
//! The HTTP client lives in the `pesepay-client` crate.
//!
//! # Quick example
//!
//! ```
//! use pesepay::{parse_transaction_response, EncryptedBody};
//!
//! let key = b"0f2c4a8e1b3d5f7092a4c6e8f0b2d4e6";
//! let inner = serde_json::json!({"referenceNumber": "R1", "pollUrl": "U1", "redirectUrl": "U2"});
//! let body = serde_json::to_vec(&EncryptedBody::seal(&inner, key).unwrap()).unwrap();
//!
//! let resp = parse_transaction_response(200, &body, key).unwrap();
//! assert_eq!(resp.reference_number(), Some("R1"));
//! ```

pub mod codec;
pub mod constants;
pub mod error;
pub mod payment;
pub mod response;

pub use constants::*;
pub use error::{CryptoError, PesepayError};
pub use payment::*;
pub use response::*;

pub use rust_decimal::Decimal;
