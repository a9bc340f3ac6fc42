//! Quote abstractions and core types

use super::currency::Currency;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Buy/sell price of one currency on one day. Either side may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RateQuote {
    pub buy: Option<f64>,
    pub sell: Option<f64>,
}

impl RateQuote {
    pub fn new(buy: Option<f64>, sell: Option<f64>) -> Self {
        Self { buy, sell }
    }

    /// A quote with no data on either side.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.buy.is_none() && self.sell.is_none()
    }
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Looks up a single (currency, date) quote. Exactly one request is made per call.
    ///
    /// A reachable endpoint whose body has no numeric buy/sell yields an empty
    /// quote, not an error.
    async fn fetch_quote(&self, currency: Currency, date: NaiveDate) -> Result<RateQuote>;
}
