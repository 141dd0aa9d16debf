use pesepay::{
    parse_payment_method_code, parse_payment_methods, parse_status_response,
    parse_transaction_response, CallbackUrls, CryptoError, Customer, Decimal, EncryptedBody,
    Payment, PaymentMethod, PesepayError, SeamlessPaymentDetails, SeamlessPaymentPayload,
    StatusResponse, Transaction, TransactionPayload, TransactionResponse, CHECK_PAYMENT_PATH,
    INITIATE_PATH, KEY_LENGTH, MAKE_PAYMENT_PATH, PAYMENT_METHODS_PATH,
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use url::Url;

use crate::config::PesepayConfig;

/// Pesepay gateway client.
///
/// Each operation is a single request/response round trip: build the payload,
/// encrypt it, send it, decrypt and parse the answer. Nothing is retried.
///
/// The callback URLs can be changed between calls with [`set_result_url`] and
/// [`set_return_url`]; both take `&mut self`, so they cannot race an
/// in-flight request on the same client.
///
/// [`set_result_url`]: PesepayClient::set_result_url
/// [`set_return_url`]: PesepayClient::set_return_url
pub struct PesepayClient {
    http: reqwest::Client,
    config: PesepayConfig,
}

impl std::fmt::Debug for PesepayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PesepayClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PesepayClient {
    /// Build a client. TLS certificates are validated unless
    /// `config.danger_accept_invalid_certs` is set.
    pub fn new(config: PesepayConfig) -> Result<Self, PesepayError> {
        check_key(&config)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if config.danger_accept_invalid_certs {
            tracing::warn!(
                "TLS certificate validation is DISABLED for the Pesepay client. \
                 Only use this against test environments."
            );
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http = builder
            .build()
            .map_err(|e| PesepayError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Create a client with a custom reqwest::Client.
    pub fn with_http_client(
        config: PesepayConfig,
        http: reqwest::Client,
    ) -> Result<Self, PesepayError> {
        check_key(&config)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &PesepayConfig {
        &self.config
    }

    pub fn result_url(&self) -> &str {
        &self.config.result_url
    }

    pub fn return_url(&self) -> &str {
        &self.config.return_url
    }

    pub fn set_result_url(&mut self, url: impl Into<String>) {
        self.config.result_url = url.into();
    }

    pub fn set_return_url(&mut self, url: impl Into<String>) {
        self.config.return_url = url.into();
    }

    /// Create a transaction for [`initiate_transaction`](Self::initiate_transaction).
    ///
    /// A UUID v4 merchant reference is generated when none is given.
    pub fn create_transaction(
        &self,
        amount: Decimal,
        currency_code: &str,
        reason_for_payment: &str,
        merchant_reference: Option<&str>,
    ) -> Transaction {
        Transaction {
            amount,
            currency_code: currency_code.to_string(),
            reason_for_payment: reason_for_payment.to_string(),
            merchant_reference: merchant_reference
                .map(str::to_string)
                .unwrap_or_else(generate_reference),
        }
    }

    /// Create a payment for [`make_seamless_payment`](Self::make_seamless_payment).
    ///
    /// Without a `payment_method_code` the code is looked up for the currency
    /// when the payment is sent.
    pub fn create_payment(
        &self,
        currency_code: &str,
        payment_method_code: Option<&str>,
        email: Option<&str>,
        phone_number: Option<&str>,
        name: Option<&str>,
    ) -> Payment {
        Payment {
            currency_code: currency_code.to_string(),
            payment_method_code: payment_method_code.map(str::to_string),
            customer: Customer {
                email: email.map(str::to_string),
                phone_number: phone_number.map(str::to_string),
                name: name.map(str::to_string),
            },
        }
    }

    /// Start a redirect-based transaction.
    ///
    /// Calls `POST {base_url}/api/payments-engine/v1/payments/initiate`.
    pub async fn initiate_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<TransactionResponse, PesepayError> {
        let payload = TransactionPayload::build(transaction, self.callback_urls());
        let body = EncryptedBody::seal(&payload, self.key())?;

        tracing::debug!(
            merchant_reference = %transaction.merchant_reference,
            currency = %transaction.currency_code,
            "initiating transaction"
        );

        let (status, bytes) = self.post(INITIATE_PATH, &body).await?;
        let resp = parse_transaction_response(status, &bytes, self.key())?;
        if let Some(reference) = resp.reference_number() {
            tracing::info!(reference_number = reference, "transaction initiated");
        }
        Ok(resp)
    }

    /// Make a one-step payment with the channel's required fields in the body.
    ///
    /// Resolves the payment-method code for the currency first when the
    /// payment does not carry one, then calls
    /// `POST {base_url}/api/payments-engine/v2/payments/make-payment`.
    pub async fn make_seamless_payment(
        &self,
        payment: &Payment,
        reason_for_payment: &str,
        amount: Decimal,
        required_fields: serde_json::Map<String, serde_json::Value>,
        merchant_reference: Option<&str>,
    ) -> Result<TransactionResponse, PesepayError> {
        let payment_method_code = match &payment.payment_method_code {
            Some(code) => code.clone(),
            None => self.get_payment_method_code(&payment.currency_code).await?,
        };
        let merchant_reference = merchant_reference
            .map(str::to_string)
            .unwrap_or_else(generate_reference);

        let payload = SeamlessPaymentPayload::build(
            payment,
            SeamlessPaymentDetails {
                amount,
                reason_for_payment,
                merchant_reference: &merchant_reference,
                payment_method_code: &payment_method_code,
                required_fields,
            },
            self.callback_urls(),
        );
        let body = EncryptedBody::seal(&payload, self.key())?;

        tracing::debug!(
            merchant_reference = %merchant_reference,
            payment_method_code = %payment_method_code,
            currency = %payment.currency_code,
            "making seamless payment"
        );

        let (status, bytes) = self.post(MAKE_PAYMENT_PATH, &body).await?;
        parse_transaction_response(status, &bytes, self.key())
    }

    /// All payment methods the gateway offers for `currency_code`.
    ///
    /// Calls `GET {base_url}/api/payments-engine/v1/payment-methods/for-currency?currencyCode=..`.
    pub async fn payment_methods_for_currency(
        &self,
        currency_code: &str,
    ) -> Result<Vec<PaymentMethod>, PesepayError> {
        let (status, bytes) = self.get_payment_methods(currency_code).await?;
        parse_payment_methods(status, &bytes)
    }

    /// Code of the first payment method offered for `currency_code`.
    pub async fn get_payment_method_code(&self, currency_code: &str) -> Result<String, PesepayError> {
        let (status, bytes) = self.get_payment_methods(currency_code).await?;
        let code = parse_payment_method_code(status, &bytes)?;
        tracing::debug!(currency = currency_code, code = %code, "resolved payment method");
        Ok(code)
    }

    /// Fetch the status behind a poll URL returned by an earlier call.
    pub async fn poll_transaction(&self, poll_url: &str) -> Result<StatusResponse, PesepayError> {
        let url = Url::parse(poll_url)
            .map_err(|e| PesepayError::Config(format!("invalid poll URL '{poll_url}': {e}")))?;
        let (status, bytes) = self.get(url).await?;
        let resp = parse_status_response(status, &bytes, self.key())?;
        if let Some(s) = resp.status() {
            tracing::debug!(
                reference_number = %s.reference_number,
                paid = s.paid,
                "polled transaction"
            );
        }
        Ok(resp)
    }

    /// Check a transaction by its gateway reference number.
    ///
    /// Calls `GET {base_url}/api/payments-engine/v1/payments/check-payment?reference_number=..`.
    pub async fn check_payment(&self, reference_number: &str) -> Result<StatusResponse, PesepayError> {
        let mut url = self.endpoint(CHECK_PAYMENT_PATH)?;
        url.query_pairs_mut()
            .append_pair("reference_number", reference_number);
        let (status, bytes) = self.get(url).await?;
        parse_status_response(status, &bytes, self.key())
    }

    fn key(&self) -> &[u8] {
        self.config.encryption_key.as_bytes()
    }

    fn callback_urls(&self) -> CallbackUrls<'_> {
        CallbackUrls {
            result_url: &self.config.result_url,
            return_url: &self.config.return_url,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, PesepayError> {
        let raw = format!(
            "{}{}",
            self.config.base_url.as_str().trim_end_matches('/'),
            path
        );
        Url::parse(&raw).map_err(|e| PesepayError::Config(format!("invalid endpoint URL '{raw}': {e}")))
    }

    async fn get_payment_methods(&self, currency_code: &str) -> Result<(u16, Vec<u8>), PesepayError> {
        let mut url = self.endpoint(PAYMENT_METHODS_PATH)?;
        url.query_pairs_mut()
            .append_pair("currencyCode", currency_code);
        self.get(url).await
    }

    async fn post(&self, path: &str, body: &EncryptedBody) -> Result<(u16, Vec<u8>), PesepayError> {
        let url = self.endpoint(path)?;
        let body = serde_json::to_vec(body)?;
        let request = self
            .http
            .post(url.clone())
            .header(AUTHORIZATION, self.config.integration_key.as_str())
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        send(request, &url).await
    }

    async fn get(&self, url: Url) -> Result<(u16, Vec<u8>), PesepayError> {
        let request = self
            .http
            .get(url.clone())
            .header(AUTHORIZATION, self.config.integration_key.as_str())
            .header(CONTENT_TYPE, "application/json");
        send(request, &url).await
    }
}

async fn send(request: reqwest::RequestBuilder, url: &Url) -> Result<(u16, Vec<u8>), PesepayError> {
    let resp = request
        .send()
        .await
        .map_err(|e| PesepayError::Transport(format!("request to {} failed: {e}", url.path())))?;

    let status = resp.status().as_u16();
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| PesepayError::Transport(format!("failed to read response from {}: {e}", url.path())))?;

    tracing::debug!(path = url.path(), status, len = bytes.len(), "gateway response");
    Ok((status, bytes.to_vec()))
}

fn check_key(config: &PesepayConfig) -> Result<(), CryptoError> {
    let len = config.encryption_key.len();
    if len < KEY_LENGTH {
        return Err(CryptoError::KeyTooShort {
            len,
            min: KEY_LENGTH,
        });
    }
    Ok(())
}

fn generate_reference() -> String {
    uuid::Uuid::new_v4().to_string()
}
