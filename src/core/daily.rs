//! Rates of every tracked currency for a single chosen date

use super::currency::Currency;
use super::i18n::Translator;
use super::notify::{Notification, Notifier};
use super::quote::{QuoteProvider, RateQuote};
use chrono::NaiveDate;
use futures::future::join_all;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct DailySnapshot {
    pub date: NaiveDate,
    /// Set only when at least one currency returned data.
    pub quote_date: Option<NaiveDate>,
    pub quotes: BTreeMap<Currency, Option<RateQuote>>,
    pub errors: Vec<String>,
}

impl DailySnapshot {
    pub fn quote(&self, currency: Currency) -> Option<&RateQuote> {
        self.quotes.get(&currency).and_then(Option::as_ref)
    }

    pub fn has_data(&self) -> bool {
        self.quote_date.is_some()
    }
}

/// Looks up all tracked currencies for `date`.
///
/// Failures are collected as readable lines rather than returned. When every
/// currency fails, a single error notification lists them.
pub async fn fetch_daily_snapshot(
    provider: &dyn QuoteProvider,
    translator: &Translator,
    notifier: &dyn Notifier,
    date: NaiveDate,
) -> DailySnapshot {
    let display_date = translator.format_short_date(date);

    let lookups = Currency::ALL.map(|currency| async move {
        (currency, provider.fetch_quote(currency, date).await)
    });
    let results = join_all(lookups).await;

    let mut quotes = BTreeMap::new();
    let mut errors = Vec::new();
    for (currency, result) in results {
        match result {
            Ok(quote) if !quote.is_empty() => {
                quotes.insert(currency, Some(quote));
            }
            Ok(_) => {
                let label = translator.t(currency.label_key());
                errors.push(translator.translate(
                    "noExchangeRateDataSpecific",
                    &[("currency", label.as_str()), ("date", display_date.as_str())],
                ));
                quotes.insert(currency, None);
            }
            Err(e) => {
                debug!(%currency, error = %e, "Daily lookup failed");
                errors.push(format!("{currency} API ({display_date}): {e}"));
                quotes.insert(currency, None);
            }
        }
    }

    let any_data = quotes.values().any(Option::is_some);
    if !any_data && !errors.is_empty() {
        let detail = errors
            .iter()
            .map(|e| translator.translate("apiErrorsDescriptionItem", &[("error", e.as_str())]))
            .collect::<Vec<_>>()
            .join("\n");
        notifier.notify(Notification::error("apiErrorsTitle", detail));
    }

    DailySnapshot {
        date,
        quote_date: any_data.then_some(date),
        quotes,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::i18n::Locale;
    use crate::core::notify::{NotificationCenter, NotificationKind};
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;

    struct ScriptedProvider {
        blue: Option<RateQuote>,
        oficial: Option<RateQuote>,
        eur: Option<RateQuote>,
    }

    #[async_trait]
    impl QuoteProvider for ScriptedProvider {
        async fn fetch_quote(&self, currency: Currency, _date: NaiveDate) -> Result<RateQuote> {
            let scripted = match currency {
                Currency::UsdBlue => self.blue,
                Currency::UsdOficial => self.oficial,
                Currency::Eur => self.eur,
            };
            scripted.ok_or_else(|| anyhow!("HTTP error: 500 Internal Server Error"))
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 14).unwrap()
    }

    #[tokio::test]
    async fn test_snapshot_keeps_partial_results() {
        let provider = ScriptedProvider {
            blue: Some(RateQuote::new(Some(1020.0), Some(1045.0))),
            oficial: Some(RateQuote::empty()),
            eur: None,
        };
        let translator = Translator::new(Locale::En).unwrap();
        let center = NotificationCenter::new();
        let mut rx = center.subscribe();

        let snapshot = fetch_daily_snapshot(&provider, &translator, &center, date()).await;

        assert_eq!(snapshot.quote_date, Some(date()));
        assert_eq!(
            snapshot.quote(Currency::UsdBlue),
            Some(&RateQuote::new(Some(1020.0), Some(1045.0)))
        );
        assert!(snapshot.quote(Currency::UsdOficial).is_none());
        assert!(snapshot.quote(Currency::Eur).is_none());
        assert_eq!(
            snapshot.errors,
            vec![
                "No USD (Oficial) exchange rate data for 05/14/2024.".to_string(),
                "EUR API (05/14/2024): HTTP error: 500 Internal Server Error".to_string(),
            ]
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_snapshot_notifies_when_everything_fails() {
        let provider = ScriptedProvider {
            blue: None,
            oficial: None,
            eur: None,
        };
        let translator = Translator::new(Locale::Es).unwrap();
        let center = NotificationCenter::new();
        let mut rx = center.subscribe();

        let snapshot = fetch_daily_snapshot(&provider, &translator, &center, date()).await;

        assert!(!snapshot.has_data());
        assert_eq!(snapshot.errors.len(), 3);

        let notification = rx.recv().await.unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(notification.title, "apiErrorsTitle");
        assert_eq!(notification.detail.lines().count(), 3);
        assert!(notification.detail.starts_with("- USD (Blue) API (14/05/2024)"));
    }
}
