use super::ui;
use crate::core::Currency;
use crate::core::calendar;
use crate::core::history::{
    FilterState, HistoricalRateEntry, HistorySession, RefreshOutcome, SortKey,
};
use crate::core::i18n::Translator;
use anyhow::Result;
use comfy_table::Cell;
use indicatif::ProgressBar;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct HistoryOptions {
    /// Overrides the configured lookback window.
    pub days: Option<usize>,
    pub sort: Option<SortKey>,
    pub reverse: bool,
    pub only: Vec<Currency>,
}

/// Loads the history table and prints it with the requested sort and filter.
pub async fn run(
    session: &HistorySession,
    translator: &Translator,
    lookback_days: usize,
    options: &HistoryOptions,
    pb: &ProgressBar,
) -> Result<()> {
    session.set_filter(FilterState::only(&options.only)).await;

    let current = session.sort_state().await;
    let key = options.sort.unwrap_or(current.key);
    if key != current.key {
        session.request_sort(key).await;
    }
    if options.reverse {
        session.request_sort(key).await;
    }

    let outcome = session.refresh().await;
    pb.finish_and_clear();
    debug!(?outcome, "History refresh finished");

    let rows = session.visible_rows().await;
    println!(
        "{}",
        render_history(&rows, outcome, translator, lookback_days)
    );
    Ok(())
}

pub fn render_history(
    rows: &[HistoricalRateEntry],
    outcome: RefreshOutcome,
    translator: &Translator,
    lookback_days: usize,
) -> String {
    let days = lookback_days.to_string();
    let mut output = format!(
        "{}\n\n",
        ui::style_text(
            &translator.translate("historyTitle", &[("days", days.as_str())]),
            ui::StyleType::Title
        )
    );

    if matches!(outcome, RefreshOutcome::Empty | RefreshOutcome::Failed) {
        output.push_str(&ui::style_text(
            &translator.t("historyNoData"),
            ui::StyleType::Subtle,
        ));
        return output;
    }

    let na = translator.t("notAvailableShort");
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell(&translator.t("historyDateHeader")),
        ui::header_cell(&translator.t("historyCurrencyHeader")),
        ui::header_cell(&translator.t("compraShort")),
        ui::header_cell(&translator.t("ventaShort")),
    ]);

    for entry in rows {
        table.add_row(vec![
            Cell::new(calendar::format_iso(entry.date)),
            Cell::new(translator.t(entry.currency.label_key())),
            ui::format_optional_cell(entry.rate.buy, &na, ui::format_ars),
            ui::format_optional_cell(entry.rate.sell, &na, ui::format_ars),
        ]);
    }

    output.push_str(&table.to_string());
    output
}
