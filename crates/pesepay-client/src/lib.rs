//! Pesepay client SDK.
//!
//! Wraps the encrypted Pesepay payments API: payloads are AES-256-CBC
//! encrypted with the merchant's encryption key, sent with the integration
//! key as `Authorization`, and the encrypted answers are decrypted and parsed
//! into typed results.
//!
//! # Quick Example
//!
//! ```no_run
//! use pesepay_client::{Decimal, PesepayClient, PesepayConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), pesepay_client::PesepayError> {
//! let config = PesepayConfig::new(
//!     "INTEGRATION_KEY",
//!     "ENCRYPTION_KEY_OF_AT_LEAST_32_BYTES",
//!     "https://merchant.example/result",
//!     "https://merchant.example/return",
//! );
//! let client = PesepayClient::new(config)?;
//!
//! let tx = client.create_transaction(Decimal::from(10), "USD", "Online payment for Camera", None);
//! let resp = client.initiate_transaction(&tx).await?;
//!
//! if let Some(url) = resp.redirect_url() {
//!     println!("Send the customer to {url}");
//! }
//! if let Some(poll_url) = resp.poll_url() {
//!     let status = client.poll_transaction(poll_url).await?;
//!     println!("paid: {}", status.paid());
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod http_client;

pub use config::{ConfigError, PesepayConfig};
pub use http_client::PesepayClient;

// Re-export commonly needed types from core
pub use pesepay::{
    CryptoError, Customer, Decimal, Payment, PaymentMethod, PaymentStatus, PesepayError,
    StatusResponse, Transaction, TransactionDetails, TransactionResponse, TransactionStatus,
    DEFAULT_BASE_URL,
};
