//! Order intake configuration

use std::path::PathBuf;

use crate::error::ConfigError;

/// Order intake configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | production
    pub environment: String,
    /// HTTP listen port
    pub http_port: u16,
    /// Stripe secret key (charge lookups)
    pub stripe_secret_key: Option<String>,
    /// Stripe webhook signing secret; absent means every webhook is rejected
    pub stripe_webhook_secret: Option<String>,
    /// Stripe REST base URL
    pub stripe_api_base: String,
    /// SES sender address; absent means receipts are skipped
    pub sender_email: Option<String>,
    /// SES region
    pub ses_region: String,
    /// DynamoDB orders table
    pub dynamodb_table_name: Option<String>,
    /// AWS IoT data plane endpoint (`https://<prefix>-ats.iot.<region>.amazonaws.com`)
    pub iot_data_endpoint: Option<String>,
    /// Topic the print ticket is published to
    pub printer_topic: String,
    /// Receipt HTML template, read at send time
    pub email_template_path: PathBuf,
    pub restaurant_name: String,
    /// `Access-Control-Allow-Origin` value (`*` for any)
    pub cors_allow_origin: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".into(),
            http_port: 8080,
            stripe_secret_key: None,
            stripe_webhook_secret: None,
            stripe_api_base: "https://api.stripe.com".into(),
            sender_email: None,
            ses_region: "ca-central-1".into(),
            dynamodb_table_name: None,
            iot_data_endpoint: None,
            printer_topic: "printers/orders/print".into(),
            email_template_path: PathBuf::from("templates/receipt.html"),
            restaurant_name: "Momotaro Sushi".into(),
            cors_allow_origin: "*".into(),
        }
    }
}

/// Read a variable, treating empty as unset
fn env_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Outside development the order store and the IoT endpoint are required.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let environment = env_opt("ENVIRONMENT").unwrap_or(defaults.environment);

        let http_port = match env_opt("HTTP_PORT") {
            Some(p) => p.parse().map_err(|_| ConfigError::Invalid {
                name: "HTTP_PORT",
                value: p,
            })?,
            None => defaults.http_port,
        };

        let config = Self {
            http_port,
            stripe_secret_key: env_opt("STRIPE_SECRET_KEY"),
            stripe_webhook_secret: env_opt("STRIPE_WEBHOOK_SECRET"),
            stripe_api_base: env_opt("STRIPE_API_BASE").unwrap_or(defaults.stripe_api_base),
            sender_email: env_opt("SENDER_EMAIL"),
            ses_region: env_opt("SES_REGION").unwrap_or(defaults.ses_region),
            dynamodb_table_name: env_opt("DYNAMODB_TABLE_NAME"),
            iot_data_endpoint: env_opt("IOT_DATA_ENDPOINT"),
            printer_topic: env_opt("PRINTER_TOPIC").unwrap_or(defaults.printer_topic),
            email_template_path: env_opt("EMAIL_TEMPLATE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.email_template_path),
            restaurant_name: env_opt("RESTAURANT_NAME").unwrap_or(defaults.restaurant_name),
            cors_allow_origin: env_opt("CORS_ALLOW_ORIGIN").unwrap_or(defaults.cors_allow_origin),
            environment,
        };

        if !config.is_development() {
            if config.dynamodb_table_name.is_none() {
                return Err(ConfigError::Missing {
                    name: "DYNAMODB_TABLE_NAME",
                    environment: config.environment,
                });
            }
            if config.iot_data_endpoint.is_none() {
                return Err(ConfigError::Missing {
                    name: "IOT_DATA_ENDPOINT",
                    environment: config.environment,
                });
            }
        }

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.is_development());
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.printer_topic, "printers/orders/print");
        assert_eq!(config.cors_allow_origin, "*");
        assert!(config.stripe_webhook_secret.is_none());
    }
}
