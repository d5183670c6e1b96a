//! Application configuration loaded from environment variables.

use std::time::Duration;

use checkout::CheckoutConfig;
use domain::{Money, PricingPolicy};
use gateway::HttpGatewayConfig;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `DATABASE_URL` — Postgres DSN; unset runs the in-memory store
/// - `GATEWAY_BASE_URL`, `GATEWAY_CLIENT_ID`, `GATEWAY_CLIENT_SECRET`,
///   `GATEWAY_API_VERSION`, `GATEWAY_TIMEOUT_SECS` — payment gateway
/// - `WEBHOOK_SECRET` — HMAC secret for inbound webhook verification
/// - `RESERVATION_TTL_SECS` — pending reservation lifetime
/// - `SHIPPING_FEE_RUPEES`, `FREE_SHIPPING_THRESHOLD_RUPEES`
/// - `CHECKOUT_RETURN_URL`, `CHECKOUT_NOTIFY_URL`
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub gateway_base_url: String,
    pub gateway_client_id: String,
    pub gateway_client_secret: String,
    pub gateway_api_version: String,
    pub gateway_timeout: Duration,
    pub webhook_secret: String,
    pub reservation_ttl: Duration,
    pub flat_shipping_fee: Money,
    pub free_shipping_threshold: Money,
    pub return_url: String,
    pub notify_url: Option<String>,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_parse("PORT", 3000),
            log_level: env_or("RUST_LOG", "info"),
            database_url: std::env::var("DATABASE_URL").ok(),
            gateway_base_url: env_or("GATEWAY_BASE_URL", "https://sandbox.cashfree.com/pg"),
            gateway_client_id: env_or("GATEWAY_CLIENT_ID", ""),
            gateway_client_secret: env_or("GATEWAY_CLIENT_SECRET", ""),
            gateway_api_version: env_or("GATEWAY_API_VERSION", "2023-08-01"),
            gateway_timeout: Duration::from_secs(env_parse("GATEWAY_TIMEOUT_SECS", 10)),
            webhook_secret: env_or("WEBHOOK_SECRET", ""),
            reservation_ttl: Duration::from_secs(env_parse("RESERVATION_TTL_SECS", 3600)),
            flat_shipping_fee: Money::from_rupees(env_parse("SHIPPING_FEE_RUPEES", 99)),
            free_shipping_threshold: Money::from_rupees(env_parse(
                "FREE_SHIPPING_THRESHOLD_RUPEES",
                5000,
            )),
            return_url: env_or("CHECKOUT_RETURN_URL", "http://localhost:3000/checkout/return"),
            notify_url: std::env::var("CHECKOUT_NOTIFY_URL").ok(),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Checkout workflow settings derived from this configuration.
    pub fn checkout_config(&self) -> CheckoutConfig {
        CheckoutConfig {
            pricing: PricingPolicy {
                flat_shipping_fee: self.flat_shipping_fee,
                free_shipping_threshold: self.free_shipping_threshold,
            },
            reservation_ttl: self.reservation_ttl,
            currency: "INR".to_string(),
            return_url: self.return_url.clone(),
            notify_url: self.notify_url.clone(),
        }
    }

    /// Gateway client settings derived from this configuration.
    pub fn gateway_config(&self) -> HttpGatewayConfig {
        HttpGatewayConfig {
            base_url: self.gateway_base_url.clone(),
            client_id: self.gateway_client_id.clone(),
            client_secret: self.gateway_client_secret.clone(),
            api_version: self.gateway_api_version.clone(),
            timeout: self.gateway_timeout,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            gateway_base_url: "https://sandbox.cashfree.com/pg".to_string(),
            gateway_client_id: String::new(),
            gateway_client_secret: String::new(),
            gateway_api_version: "2023-08-01".to_string(),
            gateway_timeout: Duration::from_secs(10),
            webhook_secret: String::new(),
            reservation_ttl: Duration::from_secs(3600),
            flat_shipping_fee: Money::from_rupees(99),
            free_shipping_threshold: Money::from_rupees(5000),
            return_url: "http://localhost:3000/checkout/return".to_string(),
            notify_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.reservation_ttl, Duration::from_secs(3600));
        assert_eq!(config.flat_shipping_fee, Money::from_rupees(99));
        assert_eq!(config.free_shipping_threshold, Money::from_rupees(5000));
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_checkout_config_carries_pricing() {
        let config = Config {
            flat_shipping_fee: Money::from_rupees(49),
            ..Config::default()
        };
        let checkout = config.checkout_config();
        assert_eq!(checkout.pricing.flat_shipping_fee, Money::from_rupees(49));
        assert_eq!(checkout.currency, "INR");
    }
}
