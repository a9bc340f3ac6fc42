use super::ui;
use crate::core::calendar::{self, DateRejection};
use crate::core::daily::{DailySnapshot, fetch_daily_snapshot};
use crate::core::i18n::Translator;
use crate::core::{Currency, Notification, Notifier, QuoteProvider};
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::{Cell, Color};

/// Shows the rates of every tracked currency for `date` (yesterday when unset).
pub async fn run(
    provider: &dyn QuoteProvider,
    translator: &Translator,
    notifier: &dyn Notifier,
    today: NaiveDate,
    min_date: NaiveDate,
    date: Option<NaiveDate>,
) -> Result<()> {
    let requested = match date {
        Some(date) => date,
        None => calendar::subtract_days(today, 1)?,
    };

    let date = match calendar::check_selectable(requested, today, min_date) {
        Ok(date) => date,
        Err(rejection) => {
            let detail = match rejection {
                DateRejection::Future => translator.t("toastInvalidDateDescriptionFuture"),
                DateRejection::BeforeMinimum => translator.translate(
                    "toastInvalidDateDescriptionPast",
                    &[("date", translator.format_short_date(min_date).as_str())],
                ),
            };
            notifier.notify(Notification::error("toastInvalidDateTitle", detail));
            return Ok(());
        }
    };

    let pb = ui::new_progress_bar(Currency::ALL.len() as u64, translator.t("modalTitle"));
    let snapshot = fetch_daily_snapshot(provider, translator, notifier, date).await;
    pb.finish_and_clear();

    println!("{}", render_snapshot(&snapshot, translator));
    Ok(())
}

pub fn render_snapshot(snapshot: &DailySnapshot, translator: &Translator) -> String {
    let display_date = translator.format_short_date(snapshot.date);
    let na = translator.t("notAvailableShort");

    let mut output = format!(
        "{} {}\n\n",
        ui::style_text(&translator.t("modalTitle"), ui::StyleType::Title),
        ui::style_text(
            &translator.translate("ratesForDateText", &[("date", display_date.as_str())]),
            ui::StyleType::Label
        )
    );

    if snapshot.has_data() {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell(&translator.t("historyCurrencyHeader")),
            ui::header_cell(&translator.t("compraShort")),
            ui::header_cell(&translator.t("ventaShort")),
        ]);

        for currency in Currency::ALL {
            let label = translator.t(currency.label_key());
            match snapshot.quote(currency) {
                Some(quote) => table.add_row(vec![
                    Cell::new(label),
                    ui::format_optional_cell(quote.buy, &na, ui::format_ars),
                    ui::format_optional_cell(quote.sell, &na, ui::format_ars),
                ]),
                None => {
                    let missing = translator.translate(
                        "dataNotAvailableOnDate",
                        &[("currency", label.as_str())],
                    );
                    table.add_row(vec![
                        Cell::new(&label),
                        Cell::new(missing).fg(Color::DarkGrey),
                        Cell::new(""),
                    ])
                }
            };
        }
        output.push_str(&table.to_string());
    } else if snapshot.errors.is_empty() {
        output.push_str(&ui::style_text(
            &translator.translate("noExchangeRateDataGeneric", &[("date", display_date.as_str())]),
            ui::StyleType::Error,
        ));
    }

    if !snapshot.errors.is_empty() {
        output.push_str(&format!(
            "\n\n{}:\n",
            ui::style_text(&translator.t("apiErrorsTitle"), ui::StyleType::Error)
        ));
        for error in &snapshot.errors {
            output.push_str(&translator.translate("apiErrorsDescriptionItem", &[("error", error.as_str())]));
            output.push('\n');
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RateQuote;
    use crate::core::i18n::Locale;
    use crate::core::notify::NotificationCenter;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl QuoteProvider for CountingProvider {
        async fn fetch_quote(&self, _currency: Currency, _date: NaiveDate) -> Result<RateQuote> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(anyhow!("unreachable"))
        }
    }

    #[tokio::test]
    async fn test_future_date_is_rejected_without_lookups() {
        let provider = CountingProvider {
            calls: AtomicUsize::new(0),
        };
        let translator = Translator::new(Locale::En).unwrap();
        let center = NotificationCenter::new();
        let mut rx = center.subscribe();
        let today = ymd(2024, 5, 15);

        run(
            &provider,
            &translator,
            &center,
            today,
            calendar::MIN_DATE,
            Some(ymd(2024, 5, 16)),
        )
        .await
        .unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        let notification = rx.recv().await.unwrap();
        assert_eq!(notification.title, "toastInvalidDateTitle");
        assert_eq!(notification.detail, "You cannot select a future date.");
    }

    #[tokio::test]
    async fn test_date_before_minimum_is_rejected() {
        let provider = CountingProvider {
            calls: AtomicUsize::new(0),
        };
        let translator = Translator::new(Locale::En).unwrap();
        let center = NotificationCenter::new();
        let mut rx = center.subscribe();

        run(
            &provider,
            &translator,
            &center,
            ymd(2024, 5, 15),
            calendar::MIN_DATE,
            Some(ymd(1999, 12, 31)),
        )
        .await
        .unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            rx.recv().await.unwrap().detail,
            "Please select a date on or after 01/01/2000."
        );
    }

    #[test]
    fn test_render_snapshot_with_partial_data() {
        let translator = Translator::new(Locale::En).unwrap();
        let snapshot = DailySnapshot {
            date: ymd(2024, 5, 14),
            quote_date: Some(ymd(2024, 5, 14)),
            quotes: BTreeMap::from([
                (
                    Currency::UsdBlue,
                    Some(RateQuote::new(Some(1020.0), Some(1045.5))),
                ),
                (Currency::UsdOficial, Some(RateQuote::new(None, Some(900.0)))),
                (Currency::Eur, None),
            ]),
            errors: vec!["EUR API (05/14/2024): HTTP error: 500 Internal Server Error".to_string()],
        };

        let output = render_snapshot(&snapshot, &translator);

        assert!(output.contains("rates for 05/14/2024"));
        assert!(output.contains("1020.00 ARS"));
        assert!(output.contains("1045.50 ARS"));
        assert!(output.contains("900.00 ARS"));
        assert!(output.contains("N/A"));
        assert!(output.contains("EUR data not available for this date."));
        assert!(output.contains("- EUR API (05/14/2024): HTTP error: 500 Internal Server Error"));
    }

    #[test]
    fn test_render_snapshot_without_data() {
        let translator = Translator::new(Locale::Es).unwrap();
        let snapshot = DailySnapshot {
            date: ymd(2024, 5, 14),
            quote_date: None,
            quotes: BTreeMap::new(),
            errors: Vec::new(),
        };

        let output = render_snapshot(&snapshot, &translator);
        assert!(output.contains("No se encontraron cotizaciones para el 14/05/2024."));
    }
}
