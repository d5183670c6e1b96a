//! Live HTTP implementation of the gateway client.

use std::time::Duration;

use async_trait::async_trait;
use domain::GatewayOrderId;
use serde::{Deserialize, Serialize};

use crate::client::{CreateSessionRequest, PaymentAttempt, PaymentGateway, PaymentSession};
use crate::error::GatewayError;

/// Connection settings for the live gateway.
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// API base URL, e.g. `https://sandbox.cashfree.com/pg`.
    pub base_url: String,
    /// API client id header value.
    pub client_id: String,
    /// API client secret header value.
    pub client_secret: String,
    /// API version header value.
    pub api_version: String,
    /// Per-request timeout. A timeout during session creation means no
    /// reservation gets written; during confirmation it leaves state
    /// unchanged so a retry is safe.
    pub timeout: Duration,
}

/// Payment gateway over HTTP.
#[derive(Clone)]
pub struct HttpPaymentGateway {
    config: HttpGatewayConfig,
    client: reqwest::Client,
}

// Wire types, gateway-side field names.

#[derive(Serialize)]
struct CustomerDetailsBody<'a> {
    customer_id: &'a str,
    customer_name: &'a str,
    customer_email: &'a str,
    customer_phone: &'a str,
}

#[derive(Serialize)]
struct OrderMetaBody<'a> {
    return_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    notify_url: Option<&'a str>,
}

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    order_id: &'a str,
    order_amount: f64,
    order_currency: &'a str,
    customer_details: CustomerDetailsBody<'a>,
    order_meta: OrderMetaBody<'a>,
}

#[derive(Deserialize)]
struct CreateOrderResponse {
    payment_session_id: String,
}

#[derive(Deserialize)]
struct PaymentRow {
    cf_payment_id: serde_json::Value,
    payment_status: crate::client::PaymentStatus,
}

impl HttpPaymentGateway {
    /// Creates a gateway client with a bounded request timeout.
    pub fn new(config: HttpGatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, client })
    }

    fn auth_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("x-client-id", &self.config.client_id)
            .header("x-client-secret", &self.config.client_secret)
            .header("x-api-version", &self.config.api_version)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(GatewayError::Api {
            status: status.as_u16(),
            message,
        })
    }

    fn payment_id_to_string(value: &serde_json::Value) -> Result<String, GatewayError> {
        match value {
            serde_json::Value::String(s) => Ok(s.clone()),
            serde_json::Value::Number(n) => Ok(n.to_string()),
            other => Err(GatewayError::InvalidResponse(format!(
                "unexpected cf_payment_id: {other}"
            ))),
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    #[tracing::instrument(skip(self, request), fields(order_id = %request.gateway_order_id))]
    async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<PaymentSession, GatewayError> {
        let url = format!("{}/orders", self.config.base_url);
        let body = CreateOrderBody {
            order_id: request.gateway_order_id.as_str(),
            // The gateway wants a decimal rupee amount; this is the only
            // place money leaves integer paise.
            order_amount: request.amount.as_rupees_f64(),
            order_currency: &request.currency,
            customer_details: CustomerDetailsBody {
                customer_id: request.gateway_order_id.as_str(),
                customer_name: &request.customer.name,
                customer_email: &request.customer.email,
                customer_phone: &request.customer.phone,
            },
            order_meta: OrderMetaBody {
                return_url: &request.return_url,
                notify_url: request.notify_url.as_deref(),
            },
        };

        let response = self
            .auth_headers(self.client.post(&url))
            .json(&body)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let parsed: CreateOrderResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        Ok(PaymentSession {
            session_token: parsed.payment_session_id,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_payments(
        &self,
        order_id: &GatewayOrderId,
    ) -> Result<Vec<PaymentAttempt>, GatewayError> {
        let url = format!("{}/orders/{}/payments", self.config.base_url, order_id);

        let response = self.auth_headers(self.client.get(&url)).send().await?;
        let response = Self::check_status(response).await?;

        // The gateway returns attempts most recent first; preserve order.
        let rows: Vec<PaymentRow> = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        rows.iter()
            .map(|row| {
                Ok(PaymentAttempt {
                    payment_id: Self::payment_id_to_string(&row.cf_payment_id)?,
                    status: row.payment_status,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_id_accepts_number_and_string() {
        assert_eq!(
            HttpPaymentGateway::payment_id_to_string(&serde_json::json!(12345)).unwrap(),
            "12345"
        );
        assert_eq!(
            HttpPaymentGateway::payment_id_to_string(&serde_json::json!("cf_12345")).unwrap(),
            "cf_12345"
        );
        assert!(HttpPaymentGateway::payment_id_to_string(&serde_json::json!(null)).is_err());
    }

    #[test]
    fn test_create_order_body_shape() {
        let body = CreateOrderBody {
            order_id: "order_abc",
            order_amount: 2199.0,
            order_currency: "INR",
            customer_details: CustomerDetailsBody {
                customer_id: "order_abc",
                customer_name: "Asha",
                customer_email: "asha@example.com",
                customer_phone: "9999999999",
            },
            order_meta: OrderMetaBody {
                return_url: "https://shop.example/return",
                notify_url: None,
            },
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["order_amount"], 2199.0);
        assert_eq!(json["customer_details"]["customer_name"], "Asha");
        assert!(json["order_meta"].get("notify_url").is_none());
    }
}
