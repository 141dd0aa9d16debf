//! Request value objects and the JSON payloads built from them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::PesepayError;

/// A redirect-based transaction, created by the client and sent once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Sent as a JSON number through `f64`: exact to about 15 significant digits.
    pub amount: Decimal,
    pub currency_code: String,
    pub reason_for_payment: String,
    pub merchant_reference: String,
}

/// Payer details for a seamless payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub name: Option<String>,
}

/// A seamless (one-step) payment. Amount and reason are supplied when it is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub currency_code: String,
    /// `None` means the code is looked up for `currency_code` before sending.
    pub payment_method_code: Option<String>,
    pub customer: Customer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountDetails {
    /// Serialized as an `f64` JSON number; precision beyond `f64` is lost.
    pub amount: Decimal,
    pub currency_code: String,
}

/// Callback URLs the gateway reports results to and returns the payer to.
#[derive(Debug, Clone, Copy)]
pub struct CallbackUrls<'a> {
    pub result_url: &'a str,
    pub return_url: &'a str,
}

/// Plaintext body of `POST /v1/payments/initiate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPayload {
    pub amount_details: AmountDetails,
    pub reason_for_payment: String,
    pub result_url: String,
    pub return_url: String,
    pub merchant_reference: String,
}

impl TransactionPayload {
    pub fn build(transaction: &Transaction, urls: CallbackUrls<'_>) -> Self {
        Self {
            amount_details: AmountDetails {
                amount: transaction.amount,
                currency_code: transaction.currency_code.clone(),
            },
            reason_for_payment: transaction.reason_for_payment.clone(),
            result_url: urls.result_url.to_string(),
            return_url: urls.return_url.to_string(),
            merchant_reference: transaction.merchant_reference.clone(),
        }
    }
}

/// Plaintext body of `POST /v2/payments/make-payment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeamlessPaymentPayload {
    pub amount_details: AmountDetails,
    pub merchant_reference: String,
    pub reason_for_payment: String,
    pub result_url: String,
    pub return_url: String,
    pub payment_method_code: String,
    pub customer: Customer,
    /// Channel-specific fields (card number, wallet MSISDN, ...), passed through untouched.
    pub payment_method_required_fields: serde_json::Map<String, serde_json::Value>,
}

/// Everything a seamless payment needs beyond the [`Payment`] itself.
#[derive(Debug, Clone)]
pub struct SeamlessPaymentDetails<'a> {
    pub amount: Decimal,
    pub reason_for_payment: &'a str,
    pub merchant_reference: &'a str,
    pub payment_method_code: &'a str,
    pub required_fields: serde_json::Map<String, serde_json::Value>,
}

impl SeamlessPaymentPayload {
    pub fn build(
        payment: &Payment,
        details: SeamlessPaymentDetails<'_>,
        urls: CallbackUrls<'_>,
    ) -> Self {
        Self {
            amount_details: AmountDetails {
                amount: details.amount,
                currency_code: payment.currency_code.clone(),
            },
            merchant_reference: details.merchant_reference.to_string(),
            reason_for_payment: details.reason_for_payment.to_string(),
            result_url: urls.result_url.to_string(),
            return_url: urls.return_url.to_string(),
            payment_method_code: details.payment_method_code.to_string(),
            customer: payment.customer.clone(),
            payment_method_required_fields: details.required_fields,
        }
    }
}

/// Outer HTTP body: `{"payload": "<base64 ciphertext>"}`. Used in both directions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedBody {
    pub payload: String,
}

impl EncryptedBody {
    /// Serialize and encrypt `payload` into a request body.
    pub fn seal<T: Serialize>(payload: &T, key: &[u8]) -> Result<Self, PesepayError> {
        Ok(Self {
            payload: codec::encrypt_json(payload, key)?,
        })
    }

    /// Decrypt the wrapped payload and parse it as JSON.
    pub fn open<T: serde::de::DeserializeOwned>(&self, key: &[u8]) -> Result<T, PesepayError> {
        codec::decrypt_json(&self.payload, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const KEY: &[u8] = b"0f2c4a8e1b3d5f7092a4c6e8f0b2d4e6";

    fn urls() -> CallbackUrls<'static> {
        CallbackUrls {
            result_url: "https://merchant.example/result",
            return_url: "https://merchant.example/return",
        }
    }

    fn sample_transaction() -> Transaction {
        Transaction {
            amount: Decimal::from_str("12.50").unwrap(),
            currency_code: "USD".to_string(),
            reason_for_payment: "Online payment for Camera".to_string(),
            merchant_reference: "INV-001".to_string(),
        }
    }

    #[test]
    fn test_transaction_payload_keys() {
        let payload = TransactionPayload::build(&sample_transaction(), urls());
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["amountDetails"]["amount"].as_f64(), Some(12.5));
        assert_eq!(json["amountDetails"]["currencyCode"], "USD");
        assert_eq!(json["reasonForPayment"], "Online payment for Camera");
        assert_eq!(json["resultUrl"], "https://merchant.example/result");
        assert_eq!(json["returnUrl"], "https://merchant.example/return");
        assert_eq!(json["merchantReference"], "INV-001");
        assert_eq!(json.as_object().unwrap().len(), 5);
    }

    #[test]
    fn test_amount_is_json_number() {
        let details = AmountDetails {
            amount: Decimal::from_str("1234567.75").unwrap(),
            currency_code: "USD".to_string(),
        };
        let json = serde_json::to_value(&details).unwrap();
        assert!(json["amount"].is_number());
        assert_eq!(json["amount"].as_f64(), Some(1234567.75));
    }

    #[test]
    fn test_seamless_payload_keys() {
        let payment = Payment {
            currency_code: "ZWL".to_string(),
            payment_method_code: None,
            customer: Customer {
                email: Some("customer@example.com".to_string()),
                phone_number: Some("0777000000".to_string()),
                name: None,
            },
        };
        let mut required_fields = serde_json::Map::new();
        required_fields.insert("customerPhoneNumber".into(), "0777000000".into());

        let payload = SeamlessPaymentPayload::build(
            &payment,
            SeamlessPaymentDetails {
                amount: Decimal::from(100),
                reason_for_payment: "Airtime",
                merchant_reference: "REF-9",
                payment_method_code: "PZW211",
                required_fields,
            },
            urls(),
        );
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["amountDetails"]["currencyCode"], "ZWL");
        assert_eq!(json["amountDetails"]["amount"].as_f64(), Some(100.0));
        assert_eq!(json["merchantReference"], "REF-9");
        assert_eq!(json["reasonForPayment"], "Airtime");
        assert_eq!(json["paymentMethodCode"], "PZW211");
        assert_eq!(json["customer"]["email"], "customer@example.com");
        assert_eq!(json["customer"]["phoneNumber"], "0777000000");
        // Absent customer fields are still sent.
        assert!(json["customer"].as_object().unwrap().contains_key("name"));
        assert!(json["customer"]["name"].is_null());
        assert_eq!(
            json["paymentMethodRequiredFields"]["customerPhoneNumber"],
            "0777000000"
        );
        assert!(json.get("resultUrl").is_some());
        assert!(json.get("returnUrl").is_some());
    }

    #[test]
    fn test_sealed_body_opens_to_same_payload() {
        let payload = TransactionPayload::build(&sample_transaction(), urls());
        let body = EncryptedBody::seal(&payload, KEY).unwrap();

        let wire = serde_json::to_value(&body).unwrap();
        assert!(wire["payload"].is_string());

        let opened: TransactionPayload = body.open(KEY).unwrap();
        assert_eq!(opened, payload);
    }
}
