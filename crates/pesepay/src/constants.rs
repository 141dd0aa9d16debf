/// Production gateway host.
pub const DEFAULT_BASE_URL: &str = "https://api.pesepay.com";

/// POST: start a redirect-based transaction.
pub const INITIATE_PATH: &str = "/api/payments-engine/v1/payments/initiate";

/// POST: one-step (seamless) payment with card/wallet fields in the body.
pub const MAKE_PAYMENT_PATH: &str = "/api/payments-engine/v2/payments/make-payment";

/// GET: payment methods available for `?currencyCode=`. Unencrypted response.
pub const PAYMENT_METHODS_PATH: &str = "/api/payments-engine/v1/payment-methods/for-currency";

/// GET: transaction status for `?reference_number=`.
pub const CHECK_PAYMENT_PATH: &str = "/api/payments-engine/v1/payments/check-payment";

/// AES block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// AES-256 key length. The IV is the first [`BLOCK_SIZE`] bytes of the same key.
pub const KEY_LENGTH: usize = 32;

/// Status string the gateway reports for a settled transaction.
pub const STATUS_SUCCESS: &str = "SUCCESS";
