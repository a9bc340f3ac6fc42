pub mod cli;
pub mod core;
pub mod providers;

use crate::cli::history::HistoryOptions;
use crate::core::calendar::{Clock, SystemClock};
use crate::core::config::AppConfig;
use crate::core::history::{HistoryAggregator, HistorySession};
use crate::core::i18n::{Locale, Translator};
use crate::core::NotificationCenter;
use crate::providers::ArgentinaDatosProvider;
use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Quote { date: Option<NaiveDate> },
    History(HistoryOptions),
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    locale: Option<Locale>,
) -> Result<()> {
    info!("Peso Watcher starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let translator = Translator::new(locale.unwrap_or(config.locale))?;
    let notifications = Arc::new(NotificationCenter::new());
    let mut receiver = notifications.subscribe();

    let provider = Arc::new(ArgentinaDatosProvider::new(
        &config.provider.base_url,
        config.provider.timeout(),
    )?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    println!("{}", cli::ui::render_banner(&translator));

    let result = match command {
        AppCommand::Quote { date } => {
            cli::quote::run(
                provider.as_ref(),
                &translator,
                notifications.as_ref(),
                clock.today(),
                config.history.min_date,
                date,
            )
            .await
        }
        AppCommand::History(options) => {
            let lookback_days = options.days.unwrap_or(config.history.lookback_days);
            // Resized once the walk knows how many lookups it needs
            let pb = cli::ui::new_progress_bar(0, translator.t("historyLoading"));
            let aggregator = HistoryAggregator::new(provider, Arc::clone(&clock))
                .with_concurrency(config.history.concurrency)
                .with_timeout(config.provider.timeout())
                .with_progress(Arc::new(pb.clone()));
            let session = HistorySession::new(
                aggregator,
                notifications.clone(),
                lookback_days,
                config.history.min_date,
            );

            cli::history::run(&session, &translator, lookback_days, &options, &pb).await
        }
    };

    cli::ui::drain_notifications(&mut receiver, &translator);
    result
}
