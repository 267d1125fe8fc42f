use crate::config::Config;
use crate::error::{AlertError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

const SERIES_KEY: &str = "Time Series (Daily)";

/// One trading day of price data for a single symbol.
///
/// Only the close is required; the other fields are kept when the
/// provider sends them.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBar {
    pub open: Option<Decimal>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub close: Decimal,
    pub volume: Option<Decimal>,
}

impl fmt::Display for DailyBar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, value) in [("O", self.open), ("H", self.high), ("L", self.low)] {
            if let Some(v) = value {
                write!(f, "{} {} ", label, v)?;
            }
        }
        write!(f, "C {}", self.close)?;
        if let Some(v) = self.volume {
            write!(f, " V {}", v)?;
        }
        Ok(())
    }
}

/// Date-indexed daily bars for one symbol.
///
/// Bars are keyed by calendar date so ordering never depends on the order
/// the provider happened to serialize its JSON object in.
#[derive(Debug, Clone)]
pub struct DailySeries {
    pub symbol: String,
    bars: BTreeMap<NaiveDate, DailyBar>,
}

impl DailySeries {
    /// Parses an Alpha Vantage `TIME_SERIES_DAILY` body.
    ///
    /// # Errors
    /// - `Provider` when the body carries an error, information or rate-limit message
    ///   instead of a series
    /// - `MissingSeries` when the series object is absent or empty
    /// - `Data` when a date key or close price cannot be parsed
    pub fn from_response(symbol: &str, response: &Value) -> Result<Self> {
        if let Some(message) = response.get("Error Message") {
            return Err(AlertError::Provider(format!(
                "Alpha Vantage API error: {}",
                message.as_str().unwrap_or("Unknown error")
            )));
        }

        let time_series = match response.get(SERIES_KEY).and_then(Value::as_object) {
            Some(ts) => ts,
            None => {
                debug!("market-data response without series: {}", response);

                if let Some(note) = response.get("Note") {
                    return Err(AlertError::Provider(format!(
                        "API rate limit: {}",
                        note.as_str().unwrap_or("Unknown rate limit message")
                    )));
                }

                if let Some(info) = response.get("Information") {
                    return Err(AlertError::Provider(format!(
                        "API information: {}",
                        info.as_str().unwrap_or("Unknown information message")
                    )));
                }

                return Err(AlertError::MissingSeries);
            }
        };

        // A note alongside real data is only a warning.
        if let Some(note) = response.get("Note") {
            warn!("Alpha Vantage API note: {}", note.as_str().unwrap_or(""));
        }

        let mut bars = BTreeMap::new();
        for (date_str, data) in time_series {
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
                .map_err(|e| AlertError::Data(format!("invalid date key {:?}: {}", date_str, e)))?;

            let data = data.as_object().ok_or_else(|| {
                AlertError::Data(format!("invalid data format for date {}", date_str))
            })?;

            let close = decimal_field(data, "4. close")?.ok_or_else(|| {
                AlertError::Data(format!("close price not found for date {}", date_str))
            })?;

            bars.insert(
                date,
                DailyBar {
                    open: optional_decimal(data, "1. open"),
                    high: optional_decimal(data, "2. high"),
                    low: optional_decimal(data, "3. low"),
                    close,
                    volume: optional_decimal(data, "5. volume"),
                },
            );
        }

        if bars.is_empty() {
            return Err(AlertError::MissingSeries);
        }

        Ok(Self {
            symbol: symbol.to_string(),
            bars,
        })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Most recent bar first.
    pub fn iter_recent(&self) -> impl Iterator<Item = (&NaiveDate, &DailyBar)> + '_ {
        self.bars.iter().rev()
    }

    /// Returns `(previous, current)`: the second most recent and the most recent trading day.
    pub fn latest_two(&self) -> Result<((NaiveDate, &DailyBar), (NaiveDate, &DailyBar))> {
        let mut recent = self.iter_recent();
        match (recent.next(), recent.next()) {
            (Some((cur_date, cur)), Some((prev_date, prev))) => {
                Ok(((*prev_date, prev), (*cur_date, cur)))
            }
            _ => Err(AlertError::InsufficientHistory(self.len())),
        }
    }
}

/// Reads an optional decimal-as-string field from a bar object.
fn decimal_field(data: &Map<String, Value>, key: &str) -> Result<Option<Decimal>> {
    let Some(value) = data.get(key) else {
        return Ok(None);
    };
    let raw = value
        .as_str()
        .ok_or_else(|| AlertError::Data(format!("{} is not a string", key)))?;
    Decimal::from_str(raw.trim())
        .map(Some)
        .map_err(|e| AlertError::Data(format!("{} value {:?}: {}", key, raw, e)))
}

/// Like `decimal_field`, but an unreadable value is logged and dropped
/// instead of failing the whole series.
fn optional_decimal(data: &Map<String, Value>, key: &str) -> Option<Decimal> {
    decimal_field(data, key).unwrap_or_else(|e| {
        debug!("ignoring {}: {}", key, e);
        None
    })
}

/// Client for the daily time-series endpoint of the market-data provider.
pub struct StockIngestion {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl StockIngestion {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            endpoint: config.stock_endpoint.clone(),
            api_key: config.stock_api_key.clone(),
            client,
        }
    }

    /// Fetches the daily closing series for `symbol`.
    ///
    /// Any error returned here is fatal to the run: nothing downstream is
    /// meaningful without two closes.
    pub async fn fetch_daily_series(&self, symbol: &str) -> Result<DailySeries> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AlertError::status(response.status(), response.url()));
        }

        let body = response.json::<Value>().await?;
        let series = DailySeries::from_response(symbol, &body)?;
        debug!(symbol, days = series.len(), "parsed daily series");
        Ok(series)
    }
}
