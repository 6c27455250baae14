//! Stripe payment intents client.

use std::{
    fmt::{self, Debug, Formatter},
    time::Duration,
};

use async_trait::async_trait;
use jiff::Timestamp;
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::payments::{
    GatewayEvent, NewPaymentIntent, PaymentConfigError, PaymentGateway, PaymentGatewayError,
    PaymentIntent, WebhookError, webhook,
};

const SECRET_KEY_PREFIX: &str = "sk_";

/// Configuration for the Stripe gateway.
#[derive(Clone)]
pub struct StripeConfig {
    /// API base, e.g. `"https://api.stripe.com"`.
    pub api_base: String,

    /// Secret API key.
    pub secret_key: String,

    /// Signing secret of the webhook endpoint.
    pub webhook_secret: String,

    /// Timeout applied to every API request.
    pub timeout: Duration,

    /// Allowed drift between webhook timestamps and the local clock.
    pub webhook_tolerance: Duration,
}

impl StripeConfig {
    /// Validate the configuration eagerly.
    pub fn validate(&self) -> Result<Url, PaymentConfigError> {
        if self.secret_key.trim().is_empty() {
            return Err(PaymentConfigError::MissingSecretKey);
        }

        if !self.secret_key.starts_with(SECRET_KEY_PREFIX) {
            return Err(PaymentConfigError::InvalidSecretKey);
        }

        if self.webhook_secret.trim().is_empty() {
            return Err(PaymentConfigError::MissingWebhookSecret);
        }

        if self.timeout.is_zero() {
            return Err(PaymentConfigError::InvalidTimeout);
        }

        Url::parse(&self.api_base)
            .map_err(|error| PaymentConfigError::InvalidApiBase(error.to_string()))
    }
}

impl Debug for StripeConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("StripeConfig")
            .field("api_base", &self.api_base)
            .field("secret_key", &"**redacted**")
            .field("webhook_secret", &"**redacted**")
            .field("timeout", &self.timeout)
            .field("webhook_tolerance", &self.webhook_tolerance)
            .finish()
    }
}

/// HTTP client for Stripe payment intents.
#[derive(Debug, Clone)]
pub struct StripeGateway {
    config: StripeConfig,
    intents_url: Url,
    http: Client,
}

impl StripeGateway {
    /// Create a new gateway, validating `config` first.
    pub fn new(config: StripeConfig) -> Result<Self, PaymentConfigError> {
        let mut api_base = config.validate()?;

        if !api_base.path().ends_with('/') {
            let path = format!("{}/", api_base.path());
            api_base.set_path(&path);
        }

        let intents_url = api_base
            .join("v1/payment_intents")
            .map_err(|error| PaymentConfigError::InvalidApiBase(error.to_string()))?;

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(PaymentConfigError::Client)?;

        Ok(Self {
            config,
            intents_url,
            http,
        })
    }

    fn intent_url(&self, intent_id: &str) -> Result<Url, PaymentGatewayError> {
        let mut url = self.intents_url.clone();

        url.path_segments_mut()
            .map_err(|()| PaymentGatewayError::IntentNotFound)?
            .push(intent_id);

        Ok(url)
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(
        &self,
        intent: NewPaymentIntent,
    ) -> Result<PaymentIntent, PaymentGatewayError> {
        let mut form = vec![
            ("amount".to_string(), intent.amount_minor.to_string()),
            ("currency".to_string(), intent.currency.to_ascii_lowercase()),
            ("description".to_string(), intent.description),
            (
                "automatic_payment_methods[enabled]".to_string(),
                "true".to_string(),
            ),
        ];

        if let Some(email) = intent.receipt_email {
            form.push(("receipt_email".to_string(), email));
        }

        form.extend(
            intent
                .metadata
                .into_iter()
                .map(|(key, value)| (format!("metadata[{key}]"), value)),
        );

        let response = self
            .http
            .post(self.intents_url.clone())
            .basic_auth(&self.config.secret_key, None::<&str>)
            .form(&form)
            .send()
            .await?;

        let created = decode_intent(response).await?;

        debug!(intent_id = %created.id, status = %created.status, "payment intent created");

        Ok(created)
    }

    async fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent, PaymentGatewayError> {
        let response = self
            .http
            .get(self.intent_url(intent_id)?)
            .basic_auth(&self.config.secret_key, None::<&str>)
            .send()
            .await?;

        decode_intent(response).await
    }

    fn verify_event(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<GatewayEvent, WebhookError> {
        webhook::construct_event(
            payload,
            signature,
            &self.config.webhook_secret,
            self.config.webhook_tolerance,
            Timestamp::now(),
        )
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

async fn decode_intent(response: Response) -> Result<PaymentIntent, PaymentGatewayError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response.json::<PaymentIntent>().await?);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(PaymentGatewayError::IntentNotFound);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error.message.unwrap_or_default(),
        Err(source) => {
            warn!("could not decode payment gateway error body: {source}");

            String::new()
        }
    };

    Err(PaymentGatewayError::UnexpectedResponse {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StripeConfig {
        StripeConfig {
            api_base: "https://api.stripe.com".to_string(),
            secret_key: "sk_test_123".to_string(),
            webhook_secret: "whsec_123".to_string(),
            timeout: Duration::from_secs(10),
            webhook_tolerance: webhook::DEFAULT_TOLERANCE,
        }
    }

    #[test]
    fn valid_config_builds_gateway() {
        let gateway = StripeGateway::new(config());

        assert!(gateway.is_ok(), "expected gateway, got {gateway:?}");
    }

    #[test]
    fn publishable_key_is_rejected() {
        let result = StripeGateway::new(StripeConfig {
            secret_key: "pk_test_123".to_string(),
            ..config()
        });

        assert!(
            matches!(result, Err(PaymentConfigError::InvalidSecretKey)),
            "expected InvalidSecretKey, got {result:?}"
        );
    }

    #[test]
    fn missing_webhook_secret_is_rejected() {
        let result = StripeGateway::new(StripeConfig {
            webhook_secret: String::new(),
            ..config()
        });

        assert!(
            matches!(result, Err(PaymentConfigError::MissingWebhookSecret)),
            "expected MissingWebhookSecret, got {result:?}"
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let result = StripeGateway::new(StripeConfig {
            timeout: Duration::ZERO,
            ..config()
        });

        assert!(
            matches!(result, Err(PaymentConfigError::InvalidTimeout)),
            "expected InvalidTimeout, got {result:?}"
        );
    }

    #[test]
    fn intent_url_escapes_the_identifier() -> testresult::TestResult {
        let gateway = StripeGateway::new(config())?;

        let url = gateway.intent_url("pi_123/../x")?;

        assert_eq!(
            url.as_str(),
            "https://api.stripe.com/v1/payment_intents/pi_123%2F..%2Fx"
        );

        Ok(())
    }

    #[test]
    fn api_base_path_prefix_is_kept() -> testresult::TestResult {
        for api_base in ["https://proxy.internal/stripe", "https://proxy.internal/stripe/"] {
            let gateway = StripeGateway::new(StripeConfig {
                api_base: api_base.to_string(),
                ..config()
            })?;

            assert_eq!(
                gateway.intents_url.as_str(),
                "https://proxy.internal/stripe/v1/payment_intents"
            );
        }

        Ok(())
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let rendered = format!("{:?}", config());

        assert!(!rendered.contains("sk_test_123"), "secret key leaked");
        assert!(!rendered.contains("whsec_123"), "webhook secret leaked");
    }

    mod http {
        use std::collections::BTreeMap;

        use testresult::TestResult;
        use wiremock::{
            Mock, MockServer, ResponseTemplate,
            matchers::{basic_auth, body_string_contains, method, path},
        };

        use crate::payments::IntentStatus;

        use super::*;

        fn gateway(server: &MockServer) -> Result<StripeGateway, PaymentConfigError> {
            StripeGateway::new(StripeConfig {
                api_base: server.uri(),
                ..config()
            })
        }

        fn new_intent() -> NewPaymentIntent {
            NewPaymentIntent {
                amount_minor: 850,
                currency: "USD".to_string(),
                description: "Order ORD-1".to_string(),
                receipt_email: None,
                metadata: BTreeMap::from([("order_id".to_string(), "ord-1".to_string())]),
            }
        }

        fn intent_body(status: &str) -> serde_json::Value {
            serde_json::json!({
                "id": "pi_123",
                "object": "payment_intent",
                "client_secret": "pi_123_secret",
                "status": status,
                "amount": 850,
                "currency": "usd",
            })
        }

        fn error_body(message: &str) -> serde_json::Value {
            serde_json::json!({ "error": { "type": "card_error", "message": message } })
        }

        #[tokio::test]
        async fn create_sends_form_encoded_intent() -> TestResult {
            let server = MockServer::start().await;

            Mock::given(method("POST"))
                .and(path("/v1/payment_intents"))
                .and(basic_auth("sk_test_123", ""))
                .and(body_string_contains("amount=850"))
                .and(body_string_contains("currency=usd"))
                .and(body_string_contains("metadata%5Border_id%5D=ord-1"))
                .and(body_string_contains(
                    "automatic_payment_methods%5Benabled%5D=true",
                ))
                .respond_with(ResponseTemplate::new(200).set_body_json(intent_body(
                    "requires_payment_method",
                )))
                .expect(1)
                .mount(&server)
                .await;

            let created = gateway(&server)?.create_intent(new_intent()).await?;

            assert_eq!(created.id, "pi_123");
            assert_eq!(created.client_secret.as_deref(), Some("pi_123_secret"));
            assert_eq!(created.status, IntentStatus::RequiresPaymentMethod);
            assert_eq!(created.amount_minor, 850);

            Ok(())
        }

        #[tokio::test]
        async fn create_keeps_the_api_base_prefix() -> TestResult {
            let server = MockServer::start().await;

            Mock::given(method("POST"))
                .and(path("/stripe/v1/payment_intents"))
                .respond_with(ResponseTemplate::new(200).set_body_json(intent_body(
                    "requires_payment_method",
                )))
                .expect(1)
                .mount(&server)
                .await;

            let gateway = StripeGateway::new(StripeConfig {
                api_base: format!("{}/stripe", server.uri()),
                ..config()
            })?;

            gateway.create_intent(new_intent()).await?;

            Ok(())
        }

        #[tokio::test]
        async fn retrieve_reads_the_intent() -> TestResult {
            let server = MockServer::start().await;

            Mock::given(method("GET"))
                .and(path("/v1/payment_intents/pi_123"))
                .and(basic_auth("sk_test_123", ""))
                .respond_with(ResponseTemplate::new(200).set_body_json(intent_body("succeeded")))
                .expect(1)
                .mount(&server)
                .await;

            let intent = gateway(&server)?.retrieve_intent("pi_123").await?;

            assert_eq!(intent.status, IntentStatus::Succeeded);
            assert_eq!(intent.currency, "usd");

            Ok(())
        }

        #[tokio::test]
        async fn unknown_intent_is_not_found() -> TestResult {
            let server = MockServer::start().await;

            Mock::given(method("GET"))
                .and(path("/v1/payment_intents/pi_missing"))
                .respond_with(
                    ResponseTemplate::new(404).set_body_json(error_body("No such payment_intent")),
                )
                .mount(&server)
                .await;

            let result = gateway(&server)?.retrieve_intent("pi_missing").await;

            assert!(
                matches!(result, Err(PaymentGatewayError::IntentNotFound)),
                "expected IntentNotFound, got {result:?}"
            );

            Ok(())
        }

        #[tokio::test]
        async fn rejected_request_carries_the_provider_message() -> TestResult {
            let server = MockServer::start().await;

            Mock::given(method("POST"))
                .and(path("/v1/payment_intents"))
                .respond_with(
                    ResponseTemplate::new(402).set_body_json(error_body("Your card was declined.")),
                )
                .mount(&server)
                .await;

            let result = gateway(&server)?.create_intent(new_intent()).await;

            match result {
                Err(PaymentGatewayError::UnexpectedResponse { status, message }) => {
                    assert_eq!(status, 402);
                    assert_eq!(message, "Your card was declined.");
                }
                other => panic!("expected UnexpectedResponse, got {other:?}"),
            }

            Ok(())
        }

        #[tokio::test]
        async fn undecodable_error_body_leaves_the_message_empty() -> TestResult {
            let server = MockServer::start().await;

            Mock::given(method("GET"))
                .and(path("/v1/payment_intents/pi_123"))
                .respond_with(ResponseTemplate::new(500).set_body_string("upstream failure"))
                .mount(&server)
                .await;

            let result = gateway(&server)?.retrieve_intent("pi_123").await;

            match result {
                Err(PaymentGatewayError::UnexpectedResponse { status, message }) => {
                    assert_eq!(status, 500);
                    assert!(message.is_empty(), "unexpected message {message:?}");
                }
                other => panic!("expected UnexpectedResponse, got {other:?}"),
            }

            Ok(())
        }

        #[tokio::test]
        async fn slow_provider_times_out() -> TestResult {
            let server = MockServer::start().await;

            Mock::given(method("GET"))
                .and(path("/v1/payment_intents/pi_123"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(intent_body("succeeded"))
                        .set_delay(Duration::from_secs(2)),
                )
                .mount(&server)
                .await;

            let gateway = StripeGateway::new(StripeConfig {
                api_base: server.uri(),
                timeout: Duration::from_millis(100),
                ..config()
            })?;

            let result = gateway.retrieve_intent("pi_123").await;

            assert!(
                matches!(result, Err(PaymentGatewayError::Timeout(_))),
                "expected Timeout, got {result:?}"
            );

            Ok(())
        }
    }
}
