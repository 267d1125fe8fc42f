use crate::error::{AlertError, Result};
use std::env;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_SYMBOL: &str = "TSLA";
pub const DEFAULT_COMPANY_NAME: &str = "Tesla Inc";
pub const DEFAULT_STOCK_ENDPOINT: &str = "https://www.alphavantage.co/query";
pub const DEFAULT_NEWS_ENDPOINT: &str = "https://newsapi.org/v2/everything";
pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Run-wide settings, read once at startup and passed by reference to every client.
#[derive(Clone)]
pub struct Config {
    pub symbol: String,
    pub company_name: String,
    pub stock_endpoint: String,
    pub news_endpoint: String,
    pub twilio_api_base: String,
    pub stock_api_key: String,
    pub news_api_key: String,
    pub twilio_sid: String,
    pub twilio_token: String,
    pub sender_number: String,
    pub recipient_number: String,
    pub http_timeout: Duration,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// Call `dotenv().ok()` first if a `.env` file should be honoured.
    ///
    /// # Errors
    /// Returns `MissingEnv` for any absent or empty required variable and
    /// `InvalidEnv` when `HTTP_TIMEOUT_SECS` is not a positive integer.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| get(name).ok_or(AlertError::MissingEnv(name));
        let optional = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());

        let http_timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(AlertError::InvalidEnv {
                        name: "HTTP_TIMEOUT_SECS",
                        value: raw,
                    })
                }
            },
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Self {
            stock_api_key: required("STOCK_API_KEY")?,
            news_api_key: required("NEWS_API_KEY")?,
            twilio_sid: required("TWILIO_SID")?,
            twilio_token: required("TWILIO_TOKEN")?,
            sender_number: required("SENDER_NUMBER")?,
            recipient_number: required("RECIPIENT_NUMBER")?,
            symbol: optional("STOCK_SYMBOL", DEFAULT_SYMBOL),
            company_name: optional("COMPANY_NAME", DEFAULT_COMPANY_NAME),
            stock_endpoint: optional("STOCK_ENDPOINT", DEFAULT_STOCK_ENDPOINT),
            news_endpoint: optional("NEWS_ENDPOINT", DEFAULT_NEWS_ENDPOINT),
            twilio_api_base: optional("TWILIO_API_BASE", DEFAULT_TWILIO_API_BASE),
            http_timeout,
        })
    }

    /// HTTP client shared by all three providers, with the configured timeout applied.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .timeout(self.http_timeout)
            .build()?)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const REDACTED: &str = "<redacted>";
        f.debug_struct("Config")
            .field("symbol", &self.symbol)
            .field("company_name", &self.company_name)
            .field("stock_endpoint", &self.stock_endpoint)
            .field("news_endpoint", &self.news_endpoint)
            .field("twilio_api_base", &self.twilio_api_base)
            .field("stock_api_key", &REDACTED)
            .field("news_api_key", &REDACTED)
            .field("twilio_sid", &self.twilio_sid)
            .field("twilio_token", &REDACTED)
            .field("sender_number", &self.sender_number)
            .field("recipient_number", &self.recipient_number)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}
