//! Hosted checkout provider client.
//!
//! The provider hosts the payment page; we create a session with the
//! priced line items and redirect the shopper to its URL. Everything we
//! need to materialize the order later rides along in the session
//! metadata, so `checkout-success` only has to retrieve the session by
//! id and check its payment status.

use std::collections::HashMap;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use juniper_core::{Money, ProductId, UserId};

use crate::config::CheckoutConfig;

/// Session status reported by the provider once the shopper has paid.
pub const PAYMENT_STATUS_PAID: &str = "paid";

const METADATA_USER_ID: &str = "user_id";
const METADATA_COUPON_CODE: &str = "coupon_code";
const METADATA_ITEMS: &str = "items";

/// Errors that can occur when talking to the checkout provider.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned an error response.
    #[error("checkout provider error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Session metadata is missing or malformed.
    #[error("session metadata error: {0}")]
    Metadata(String),
}

/// One priced line on a checkout session.
///
/// Amounts are integer cents; the price comes from the catalog, never
/// from the client.
#[derive(Debug, Clone, Serialize)]
pub struct LineItem {
    pub name: String,
    pub unit_amount: i64,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// What we stash in session metadata to rebuild the order on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionItem {
    pub product_id: ProductId,
    pub quantity: i32,
    /// Unit price in cents at checkout time.
    pub unit_price: i64,
}

/// A newly created checkout session.
#[derive(Debug, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted payment page the shopper is redirected to.
    pub url: String,
}

/// A session retrieved after the shopper returns from the provider.
#[derive(Debug, Deserialize)]
pub struct RetrievedSession {
    pub id: String,
    pub payment_status: String,
    pub amount_total: i64,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl RetrievedSession {
    /// Whether the provider reports this session as paid.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.payment_status == PAYMENT_STATUS_PAID
    }

    /// The user the session was created for.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Metadata` if the field is absent or not an id.
    pub fn user_id(&self) -> Result<UserId, PaymentError> {
        self.metadata
            .get(METADATA_USER_ID)
            .and_then(|v| v.parse::<UserId>().ok())
            .ok_or_else(|| PaymentError::Metadata("missing or invalid user_id".to_string()))
    }

    /// The coupon code applied to the session, if any.
    #[must_use]
    pub fn coupon_code(&self) -> Option<&str> {
        self.metadata
            .get(METADATA_COUPON_CODE)
            .map(String::as_str)
            .filter(|code| !code.is_empty())
    }

    /// The order lines recorded when the session was created.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Metadata` if the field is absent or malformed.
    pub fn items(&self) -> Result<Vec<SessionItem>, PaymentError> {
        let raw = self
            .metadata
            .get(METADATA_ITEMS)
            .ok_or_else(|| PaymentError::Metadata("missing items".to_string()))?;

        serde_json::from_str(raw).map_err(|e| PaymentError::Metadata(e.to_string()))
    }
}

/// Client for the hosted checkout provider's REST API.
#[derive(Clone)]
pub struct CheckoutClient {
    client: reqwest::Client,
    base_url: String,
    success_url: String,
    cancel_url: String,
}

impl CheckoutClient {
    /// Create a new checkout provider client.
    ///
    /// Redirect URLs are derived from the frontend URL; the provider
    /// substitutes the session id into the success URL placeholder.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &CheckoutConfig, client_url: &str) -> Result<Self, PaymentError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        let mut auth_value = HeaderValue::from_str(&auth_value)
            .map_err(|e| PaymentError::Parse(format!("invalid API key format: {e}")))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            success_url: format!(
                "{client_url}/purchase-success?session_id={{CHECKOUT_SESSION_ID}}"
            ),
            cancel_url: format!("{client_url}/purchase-cancel"),
        })
    }

    /// Create a hosted checkout session.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the provider rejects it.
    pub async fn create_session(
        &self,
        user_id: UserId,
        line_items: &[LineItem],
        discount_percent: Option<u8>,
        coupon_code: Option<&str>,
        items: &[SessionItem],
    ) -> Result<CheckoutSession, PaymentError> {
        let url = format!("{}/checkout/sessions", self.base_url);

        let metadata = build_metadata(user_id, coupon_code, items)?;

        let mut body = serde_json::json!({
            "mode": "payment",
            "success_url": self.success_url,
            "cancel_url": self.cancel_url,
            "line_items": line_items,
            "metadata": metadata,
        });
        if let Some(percent) = discount_percent {
            body["discounts"] = serde_json::json!([{ "percent_off": percent }]);
        }

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| PaymentError::Parse(e.to_string()))
    }

    /// Retrieve a session by id after the shopper returns.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the session does not exist.
    pub async fn retrieve_session(&self, session_id: &str) -> Result<RetrievedSession, PaymentError> {
        let url = format!("{}/checkout/sessions/{session_id}", self.base_url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| PaymentError::Parse(e.to_string()))
    }
}

impl LineItem {
    /// Build a line item from catalog data and a cart quantity.
    #[must_use]
    pub fn new(name: String, unit_price: Money, quantity: u32, image_url: Option<String>) -> Self {
        Self {
            name,
            unit_amount: unit_price.cents(),
            quantity,
            image_url,
        }
    }
}

fn build_metadata(
    user_id: UserId,
    coupon_code: Option<&str>,
    items: &[SessionItem],
) -> Result<HashMap<String, String>, PaymentError> {
    let mut metadata = HashMap::new();
    metadata.insert(METADATA_USER_ID.to_string(), user_id.to_string());
    if let Some(code) = coupon_code {
        metadata.insert(METADATA_COUPON_CODE.to_string(), code.to_string());
    }
    metadata.insert(
        METADATA_ITEMS.to_string(),
        serde_json::to_string(items).map_err(|e| PaymentError::Metadata(e.to_string()))?,
    );
    Ok(metadata)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn session_with(metadata: HashMap<String, String>) -> RetrievedSession {
        RetrievedSession {
            id: "cs_test_123".to_string(),
            payment_status: PAYMENT_STATUS_PAID.to_string(),
            amount_total: 17003,
            metadata,
        }
    }

    #[test]
    fn test_metadata_roundtrip() {
        let items = vec![
            SessionItem {
                product_id: ProductId::new(1),
                quantity: 2,
                unit_price: 4999,
            },
            SessionItem {
                product_id: ProductId::new(7),
                quantity: 1,
                unit_price: 10005,
            },
        ];

        let metadata = build_metadata(UserId::new(42), Some("GIFTAB12CD"), &items).unwrap();
        let session = session_with(metadata);

        assert_eq!(session.user_id().unwrap(), UserId::new(42));
        assert_eq!(session.coupon_code(), Some("GIFTAB12CD"));
        assert_eq!(session.items().unwrap(), items);
    }

    #[test]
    fn test_metadata_without_coupon() {
        let metadata = build_metadata(UserId::new(1), None, &[]).unwrap();
        let session = session_with(metadata);

        assert_eq!(session.coupon_code(), None);
        assert!(session.items().unwrap().is_empty());
    }

    #[test]
    fn test_missing_user_id_is_an_error() {
        let session = session_with(HashMap::new());
        assert!(matches!(
            session.user_id(),
            Err(PaymentError::Metadata(_))
        ));
    }

    #[test]
    fn test_unpaid_session_is_not_paid() {
        let mut session = session_with(HashMap::new());
        session.payment_status = "unpaid".to_string();
        assert!(!session.is_paid());
    }

    #[test]
    fn test_line_item_uses_catalog_cents() {
        let item = LineItem::new(
            "Walnut Board".to_string(),
            Money::from_cents(4999).unwrap(),
            2,
            None,
        );
        assert_eq!(item.unit_amount, 4999);
        assert_eq!(item.quantity, 2);
    }
}
