use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

pub const CREDIT_CARD: &str = "credit_card";
pub const CASH_ON_DELIVERY: &str = "cash_on_delivery";
pub const BANK_TRANSFER: &str = "bank_transfer";

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct PaymentRequest {
    /// Payment type slug.
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50))]
    pub payment_type: String,
    #[schema(value_type = Object)]
    pub details: Map<String, Value>,
    /// Attach the payment to this order.
    pub order_uuid: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Validate)]
pub struct CreditCardDetails {
    #[validate(length(min = 1, max = 255))]
    pub holder_name: String,
    #[validate(length(min = 12, max = 19))]
    pub number: String,
    #[validate(length(min = 3, max = 4))]
    pub ccv: String,
    #[validate(length(min = 1, max = 10))]
    pub expire_date: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Validate)]
pub struct CashOnDeliveryDetails {
    #[validate(length(min = 1, max = 255))]
    pub first_name: String,
    #[validate(length(min = 1, max = 255))]
    pub last_name: String,
    #[validate(length(min = 1, max = 255))]
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Validate)]
pub struct BankTransferDetails {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 8, max = 11))]
    pub swift: String,
    #[validate(length(min = 15, max = 34))]
    pub iban: String,
}

/// Payment details, typed by the payment type slug.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentDetails {
    CreditCard(CreditCardDetails),
    CashOnDelivery(CashOnDeliveryDetails),
    BankTransfer(BankTransferDetails),
}

impl PaymentDetails {
    pub fn parse(payment_type: &str, details: &Value) -> AppResult<Self> {
        fn typed<T>(details: &Value) -> AppResult<T>
        where
            T: serde::de::DeserializeOwned + Validate,
        {
            let parsed: T = serde_json::from_value(details.clone())
                .map_err(|e| AppError::Unprocessable(format!("Invalid payment details: {e}")))?;
            parsed.validate()?;
            Ok(parsed)
        }

        match payment_type {
            CREDIT_CARD => Ok(Self::CreditCard(typed(details)?)),
            CASH_ON_DELIVERY => Ok(Self::CashOnDelivery(typed(details)?)),
            BANK_TRANSFER => Ok(Self::BankTransfer(typed(details)?)),
            other => Err(AppError::Unprocessable(format!(
                "Unsupported payment type {other}"
            ))),
        }
    }
}

/// Replace the first `hidden` characters with `*`.
pub fn mask_prefix(value: &str, hidden: usize) -> String {
    let rest: String = value.chars().skip(hidden).collect();
    format!("{}{rest}", "*".repeat(hidden))
}

fn mask_field(details: &mut Map<String, Value>, key: &str, hidden: usize) {
    if let Some(Value::String(value)) = details.get_mut(key) {
        *value = mask_prefix(value, hidden);
    }
}

/// Stored details as they may be shown back over the API: card numbers and
/// IBANs masked like on the invoice, the card security code dropped.
pub fn redact_details(payment_type: &str, details: &Value) -> Value {
    let mut details = details.clone();
    if let Value::Object(map) = &mut details {
        match payment_type {
            CREDIT_CARD => {
                map.remove("ccv");
                mask_field(map, "number", 12);
            }
            BANK_TRANSFER => mask_field(map, "iban", 8),
            _ => {}
        }
    }
    details
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn details_are_parsed_by_type() {
        let details = json!({
            "holder_name": "Robin Doe",
            "number": "4111111111111111",
            "ccv": "123",
            "expire_date": "12/30"
        });
        let parsed = PaymentDetails::parse(CREDIT_CARD, &details).unwrap();
        assert!(matches!(parsed, PaymentDetails::CreditCard(ref card) if card.holder_name == "Robin Doe"));
    }

    #[test]
    fn details_for_the_wrong_type_are_rejected() {
        let details = json!({ "first_name": "Robin", "last_name": "Doe", "address": "1 Dog Lane" });
        assert!(PaymentDetails::parse(BANK_TRANSFER, &details).is_err());
        assert!(PaymentDetails::parse(CASH_ON_DELIVERY, &details).is_ok());
        assert!(PaymentDetails::parse("barter", &details).is_err());
    }

    #[test]
    fn card_and_bank_details_are_redacted() {
        let card = json!({
            "holder_name": "Robin Doe",
            "number": "4111111111111111",
            "ccv": "123",
            "expire_date": "12/30"
        });
        let shown = redact_details(CREDIT_CARD, &card);
        assert_eq!(shown["number"], "************1111");
        assert!(shown.get("ccv").is_none());
        assert_eq!(shown["holder_name"], "Robin Doe");
        assert!(!shown.to_string().contains("4111111111111111"));

        let bank = json!({ "swift": "NWBKGB2L", "iban": "GB82WEST12345698765432", "name": "Robin" });
        assert_eq!(redact_details(BANK_TRANSFER, &bank)["iban"], "********12345698765432");

        let cash = json!({ "first_name": "Robin", "last_name": "Doe", "address": "1 Dog Lane" });
        assert_eq!(redact_details(CASH_ON_DELIVERY, &cash), cash);
    }
}
