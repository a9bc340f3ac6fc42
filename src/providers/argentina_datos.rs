use crate::core::calendar;
use crate::core::{Currency, QuoteProvider, RateQuote};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

pub const DEFAULT_BASE_URL: &str = "https://api.argentinadatos.com/v1";

/// Quotes from the argentinadatos.com `cotizaciones` endpoints.
pub struct ArgentinaDatosProvider {
    base_url: String,
    client: reqwest::Client,
}

impl ArgentinaDatosProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("peso-watcher/1.0")
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn quote_url(&self, currency: Currency, date: NaiveDate) -> String {
        format!(
            "{}/cotizaciones/{}/{}",
            self.base_url,
            currency.endpoint_path(),
            calendar::format_path(date)
        )
    }
}

/// Reads `compra`/`venta` independently; non-numeric values count as missing.
fn parse_quote(body: &Value) -> RateQuote {
    RateQuote::new(
        body.get("compra").and_then(Value::as_f64),
        body.get("venta").and_then(Value::as_f64),
    )
}

/// Pulls a readable reason out of an error body, if it carries one.
fn error_detail(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    text_field(&json, "error")
        .or_else(|| text_field(&json, "message"))
        .map(str::to_string)
}

fn text_field<'a>(json: &'a Value, name: &str) -> Option<&'a str> {
    json.get(name)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}

#[async_trait]
impl QuoteProvider for ArgentinaDatosProvider {
    #[instrument(
        name = "ArgentinaDatosQuoteFetch",
        skip_all,
        fields(currency = %currency, date = %date)
    )]
    async fn fetch_quote(&self, currency: Currency, date: NaiveDate) -> Result<RateQuote> {
        let url = self.quote_url(currency, date);
        debug!("Requesting quote from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for {} on {}", e, currency, date))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to get response text for {currency} on {date}"))?;

        if !status.is_success() {
            return Err(match error_detail(&text) {
                Some(detail) => anyhow!("API error: {} ({})", detail, status),
                None => anyhow!("HTTP error: {}", status),
            });
        }

        let body: Value = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {} on {}: {}", currency, date, e))?;

        let quote = parse_quote(&body);
        if quote.is_empty() {
            debug!(response = %text, "Response carried no numeric quote");
        }
        Ok(quote)
    }
}
