use crate::core::history::HistoryProgress;
use crate::core::i18n::Translator;
use crate::core::{Notification, NotificationKind};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::sync::broadcast::{self, error::TryRecvError};

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Label,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Label => style(text).bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Formats an `Option<T>` into a `Cell`. `None` is displayed as `na_text`.
pub fn format_optional_cell<T>(
    value: Option<T>,
    na_text: &str,
    format_fn: impl Fn(T) -> String,
) -> Cell {
    value.map_or(
        Cell::new(na_text)
            .fg(Color::DarkGrey)
            .set_alignment(CellAlignment::Right),
        |v| Cell::new(format_fn(v)).set_alignment(CellAlignment::Right),
    )
}

/// Peso amount with two decimals.
pub fn format_ars(value: f64) -> String {
    format!("{value:.2} ARS")
}

/// Creates a spinner shown while lookups are in flight.
pub fn new_progress_bar(len: u64, message: String) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

impl HistoryProgress for ProgressBar {
    fn planned(&self, lookups: usize) {
        self.set_length(lookups as u64);
    }

    fn settled(&self) {
        self.inc(1);
    }
}

/// App name and tagline printed above every command's output.
pub fn render_banner(translator: &Translator) -> String {
    format!(
        "{}
{}
",
        style_text(&translator.t("headerTitle"), StyleType::Title),
        style_text(&translator.t("headerSubtitle"), StyleType::Subtle)
    )
}

/// Renders a notification as a short styled block.
pub fn format_notification(notification: &Notification, translator: &Translator) -> String {
    let title = translator.t(&notification.title);
    let title = match notification.kind {
        NotificationKind::Error => style(title).red().bold().to_string(),
        NotificationKind::Info => style(title).cyan().bold().to_string(),
    };
    if notification.detail.is_empty() {
        title
    } else {
        format!("{title}\n{}", notification.detail)
    }
}

/// Prints every notification received so far to stderr.
pub fn drain_notifications(
    receiver: &mut broadcast::Receiver<Notification>,
    translator: &Translator,
) {
    loop {
        match receiver.try_recv() {
            Ok(notification) => eprintln!("{}", format_notification(&notification, translator)),
            Err(TryRecvError::Lagged(missed)) => {
                eprintln!(
                    "{}",
                    style_text(&format!("({missed} notifications dropped)"), StyleType::Subtle)
                );
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::i18n::Locale;

    #[test]
    fn test_format_notification_translates_title() {
        console::set_colors_enabled(false);
        let translator = Translator::new(Locale::Es).unwrap();

        let text = format_notification(
            &Notification::error("apiErrorsTitle", "- EUR API: HTTP error"),
            &translator,
        );
        assert_eq!(text, "Errores de la API\n- EUR API: HTTP error");

        let plain = format_notification(&Notification::info("Already text", ""), &translator);
        assert_eq!(plain, "Already text");
    }

    #[test]
    fn test_render_banner() {
        console::set_colors_enabled(false);
        let translator = Translator::new(Locale::Es).unwrap();
        assert_eq!(
            render_banner(&translator),
            "Peso Watcher\nCotizaciones históricas del dólar y el euro frente al peso argentino\n"
        );
    }

    #[test]
    fn test_progress_bar_tracks_planned_lookups() {
        let pb = ProgressBar::hidden();
        pb.planned(15);
        pb.settled();
        pb.settled();

        assert_eq!(pb.length(), Some(15));
        assert_eq!(pb.position(), 2);
    }

    #[test]
    fn test_format_ars() {
        assert_eq!(format_ars(1045.0), "1045.00 ARS");
        assert_eq!(format_ars(1020.456), "1020.46 ARS");
    }
}
