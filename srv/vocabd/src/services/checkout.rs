use std::future::Future;
use std::pin::Pin;
use log::{info, warn};
use serde::Deserialize;
use crate::error::CheckoutError;
use crate::models::CheckoutRequest;

/// Smallest ad-hoc amount accepted, in minor units
pub const MIN_AMOUNT: u64 = 100;

pub type CheckoutFuture<'a> = Pin<Box<dyn Future<Output = Result<String, CheckoutError>> + Send + 'a>>;

/// Creates hosted checkout sessions and returns the provider's session id
pub trait CheckoutProvider: Send + Sync {
    fn create_session<'a>(&'a self, session: &'a CheckoutSession) -> CheckoutFuture<'a>;
}

/// Defaults applied to every checkout request
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    pub currency: String,
    pub product_name: String,
    pub statement_descriptor: String,
    pub success_url: String,
    pub cancel_url: String,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            currency: "usd".to_string(),
            product_name: "VocabSwipe Donation".to_string(),
            statement_descriptor: "VOCABSWIPE.COM".to_string(),
            success_url: "https://vocabswipe.com/thank-you".to_string(),
            cancel_url: "https://vocabswipe.com/donate".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LineItem {
    /// Ad-hoc price in minor units
    Amount { amount: u64, currency: String, product_name: String },
    /// Price configured with the provider beforehand
    Price(String),
}

/// A validated checkout request
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    pub line_item: LineItem,
    pub statement_descriptor: String,
    pub success_url: String,
    pub cancel_url: String,
}

impl CheckoutSession {
    pub fn from_request(req: &CheckoutRequest, settings: &CheckoutSettings) -> Result<Self, CheckoutError> {
        let line_item = match (&req.price, req.amount) {
            (Some(price), _) if !price.trim().is_empty() => LineItem::Price(price.trim().to_string()),
            (_, Some(amount)) if amount >= MIN_AMOUNT => LineItem::Amount {
                amount,
                currency: req
                    .currency
                    .clone()
                    .unwrap_or_else(|| settings.currency.clone())
                    .to_lowercase(),
                product_name: req
                    .description
                    .clone()
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or_else(|| settings.product_name.clone()),
            },
            (_, Some(amount)) => {
                return Err(CheckoutError::InvalidRequest(format!(
                    "amount {} is below the minimum of {}",
                    amount, MIN_AMOUNT
                )))
            }
            (_, None) => {
                return Err(CheckoutError::InvalidRequest("an amount or price is required".to_string()))
            }
        };

        Ok(Self {
            line_item,
            statement_descriptor: req
                .statement_descriptor
                .clone()
                .unwrap_or_else(|| settings.statement_descriptor.clone()),
            success_url: settings.success_url.clone(),
            cancel_url: settings.cancel_url.clone(),
        })
    }

    /// Form fields of a Checkout Sessions API call
    pub fn form_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("mode", "payment".to_string()),
            ("payment_method_types[0]", "card".to_string()),
            ("line_items[0][quantity]", "1".to_string()),
            ("success_url", self.success_url.clone()),
            ("cancel_url", self.cancel_url.clone()),
            ("payment_intent_data[statement_descriptor]", self.statement_descriptor.clone()),
        ];
        match &self.line_item {
            LineItem::Amount { amount, currency, product_name } => {
                params.push(("line_items[0][price_data][currency]", currency.clone()));
                params.push(("line_items[0][price_data][product_data][name]", product_name.clone()));
                params.push(("line_items[0][price_data][unit_amount]", amount.to_string()));
            }
            LineItem::Price(price) => params.push(("line_items[0][price]", price.clone())),
        }
        params
    }
}

/// Stand-in used when no provider key is configured
pub struct DisabledCheckout;

impl CheckoutProvider for DisabledCheckout {
    fn create_session<'a>(&'a self, _session: &'a CheckoutSession) -> CheckoutFuture<'a> {
        Box::pin(async { Err(CheckoutError::NotConfigured) })
    }
}

pub struct StripeCheckout {
    client: reqwest::Client,
    secret_key: String,
    api_base: String,
}

#[derive(Deserialize)]
struct StripeSession {
    id: String,
}

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    message: String,
}

impl StripeCheckout {
    pub fn new(secret_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key,
            api_base: "https://api.stripe.com".to_string(),
        }
    }

    async fn post_session(&self, session: &CheckoutSession) -> Result<String, CheckoutError> {
        let url = format!("{}/v1/checkout/sessions", self.api_base);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&session.form_params())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<StripeErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| format!("provider returned {}", status));
            warn!("Error creating checkout session: {}", message);
            return Err(CheckoutError::Provider(message));
        }

        let created: StripeSession = serde_json::from_str(&body)
            .map_err(|e| CheckoutError::Provider(format!("unexpected provider response: {}", e)))?;
        info!("Created checkout session {}", created.id);
        Ok(created.id)
    }
}

impl CheckoutProvider for StripeCheckout {
    fn create_session<'a>(&'a self, session: &'a CheckoutSession) -> CheckoutFuture<'a> {
        Box::pin(self.post_session(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(amount: Option<u64>, price: Option<&str>) -> CheckoutRequest {
        CheckoutRequest {
            amount,
            description: None,
            statement_descriptor: None,
            currency: None,
            price: price.map(|p| p.to_string()),
        }
    }

    fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_amount_request_uses_defaults() {
        let session = CheckoutSession::from_request(&request(Some(500), None), &CheckoutSettings::default()).unwrap();
        let params = session.form_params();
        assert_eq!(param(&params, "line_items[0][price_data][unit_amount]"), Some("500"));
        assert_eq!(param(&params, "line_items[0][price_data][currency]"), Some("usd"));
        assert_eq!(
            param(&params, "line_items[0][price_data][product_data][name]"),
            Some("VocabSwipe Donation")
        );
        assert_eq!(param(&params, "payment_intent_data[statement_descriptor]"), Some("VOCABSWIPE.COM"));
        assert_eq!(param(&params, "line_items[0][price]"), None);
    }

    #[test]
    fn test_price_reference_wins() {
        let session =
            CheckoutSession::from_request(&request(None, Some("price_123")), &CheckoutSettings::default()).unwrap();
        assert_eq!(session.line_item, LineItem::Price("price_123".to_string()));
        assert_eq!(param(&session.form_params(), "line_items[0][price]"), Some("price_123"));
    }

    #[test]
    fn test_custom_description_and_currency() {
        let mut req = request(Some(1000), None);
        req.description = Some("VocabSwipe Poster".to_string());
        req.currency = Some("THB".to_string());
        let session = CheckoutSession::from_request(&req, &CheckoutSettings::default()).unwrap();
        assert_eq!(
            session.line_item,
            LineItem::Amount { amount: 1000, currency: "thb".to_string(), product_name: "VocabSwipe Poster".to_string() }
        );
    }

    #[test]
    fn test_small_or_missing_amount_rejected() {
        let settings = CheckoutSettings::default();
        assert!(matches!(
            CheckoutSession::from_request(&request(Some(99), None), &settings),
            Err(CheckoutError::InvalidRequest(_))
        ));
        assert!(matches!(
            CheckoutSession::from_request(&request(None, None), &settings),
            Err(CheckoutError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_disabled_provider() {
        let session = CheckoutSession::from_request(&request(Some(500), None), &CheckoutSettings::default()).unwrap();
        assert!(matches!(
            DisabledCheckout.create_session(&session).await,
            Err(CheckoutError::NotConfigured)
        ));
    }
}
