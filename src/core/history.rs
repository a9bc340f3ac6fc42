//! Historical rate aggregation over recent business days
//!
//! [`HistoryAggregator`] walks business days backward from yesterday and looks up
//! every tracked currency for each of them. Failed lookups are folded into
//! empty quotes so the result always has one entry per (day, currency).
//! [`HistorySession`] holds the display state (sort, filter, load state) and
//! discards results of runs that were superseded or cancelled.

use super::calendar::{self, Clock};
use super::currency::Currency;
use super::notify::{Notification, Notifier};
use super::quote::{QuoteProvider, RateQuote};
use anyhow::Result;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_LOOKBACK_DAYS: usize = 10;
pub const DEFAULT_CONCURRENCY: usize = 6;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalRateEntry {
    pub id: String,
    pub date: NaiveDate,
    pub currency: Currency,
    pub rate: RateQuote,
}

impl HistoricalRateEntry {
    pub fn new(date: NaiveDate, currency: Currency, rate: RateQuote) -> Self {
        Self {
            id: format!("{}-{}", calendar::format_iso(date), currency.slug()),
            date,
            currency,
            rate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Date,
    Currency,
}

impl SortKey {
    fn default_direction(&self) -> SortDirection {
        match self {
            SortKey::Date => SortDirection::Desc,
            SortKey::Currency => SortDirection::Asc,
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "date" => Ok(SortKey::Date),
            "currency" => Ok(SortKey::Currency),
            _ => Err(anyhow::anyhow!("Invalid sort key: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            key: SortKey::Date,
            direction: SortKey::Date.default_direction(),
        }
    }
}

impl SortState {
    /// Flips the direction when `key` is already active, otherwise switches to
    /// `key` with its default direction.
    pub fn request_sort(self, key: SortKey) -> Self {
        if self.key == key {
            Self {
                key,
                direction: self.direction.flipped(),
            }
        } else {
            Self {
                key,
                direction: key.default_direction(),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterState {
    pub usd_blue: bool,
    pub usd_oficial: bool,
    pub eur: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            usd_blue: true,
            usd_oficial: true,
            eur: true,
        }
    }
}

impl FilterState {
    /// Shows only the listed currencies. An empty list shows everything.
    pub fn only(currencies: &[Currency]) -> Self {
        if currencies.is_empty() {
            return Self::default();
        }
        Self {
            usd_blue: currencies.contains(&Currency::UsdBlue),
            usd_oficial: currencies.contains(&Currency::UsdOficial),
            eur: currencies.contains(&Currency::Eur),
        }
    }

    pub fn allows(&self, currency: Currency) -> bool {
        match currency {
            Currency::UsdBlue => self.usd_blue,
            Currency::UsdOficial => self.usd_oficial,
            Currency::Eur => self.eur,
        }
    }

    pub fn toggle(&mut self, currency: Currency) {
        match currency {
            Currency::UsdBlue => self.usd_blue = !self.usd_blue,
            Currency::UsdOficial => self.usd_oficial = !self.usd_oficial,
            Currency::Eur => self.eur = !self.eur,
        }
    }
}

fn compare_entries(a: &HistoricalRateEntry, b: &HistoricalRateEntry, sort: SortState) -> Ordering {
    match sort.key {
        SortKey::Date => sort
            .direction
            .apply(a.date.cmp(&b.date))
            .then_with(|| a.currency.rank().cmp(&b.currency.rank())),
        SortKey::Currency => sort
            .direction
            .apply(a.currency.rank().cmp(&b.currency.rank()))
            .then_with(|| b.date.cmp(&a.date)),
    }
}

pub fn sort_entries(entries: &[HistoricalRateEntry], sort: SortState) -> Vec<HistoricalRateEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| compare_entries(a, b, sort));
    sorted
}

pub fn filter_entries(
    entries: &[HistoricalRateEntry],
    filter: FilterState,
) -> Vec<HistoricalRateEntry> {
    entries
        .iter()
        .filter(|entry| filter.allows(entry.currency))
        .cloned()
        .collect()
}

/// Observes the lookups of a history run.
pub trait HistoryProgress: Send + Sync {
    /// Number of lookups the run is about to issue.
    fn planned(&self, lookups: usize);
    /// One lookup settled, whatever its outcome.
    fn settled(&self);
}

/// Builds the rate history table from per-day, per-currency lookups.
pub struct HistoryAggregator {
    provider: Arc<dyn QuoteProvider>,
    clock: Arc<dyn Clock>,
    concurrency: usize,
    timeout: Duration,
    progress: Option<Arc<dyn HistoryProgress>>,
}

impl HistoryAggregator {
    pub fn new(provider: Arc<dyn QuoteProvider>, clock: Arc<dyn Clock>) -> Self {
        Self {
            provider,
            clock,
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn HistoryProgress>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Caps the number of lookups in flight at once.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Bounds each individual lookup.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetches rates for up to `lookback_business_days` weekdays before today,
    /// never going below `min_date`.
    ///
    /// Returns exactly one entry per visited day and tracked currency, ordered
    /// by date descending and then by currency rank. Upstream failures produce
    /// empty quotes; only calendar failures are returned as errors.
    #[instrument(name = "FetchHistory", skip(self))]
    pub async fn fetch_history(
        &self,
        lookback_business_days: usize,
        min_date: NaiveDate,
    ) -> Result<Vec<HistoricalRateEntry>> {
        let today = self.clock.today();
        let days = calendar::business_days_back(today, lookback_business_days, min_date)?;
        debug!(
            "Walking {} business days back from {}",
            days.len(),
            calendar::format_iso(today)
        );

        let lookups: Vec<(NaiveDate, Currency)> = days
            .iter()
            .flat_map(|date| Currency::ALL.map(|currency| (*date, currency)))
            .collect();
        if let Some(progress) = &self.progress {
            progress.planned(lookups.len());
        }

        let mut entries: Vec<HistoricalRateEntry> = stream::iter(lookups)
            .map(|(date, currency)| async move {
                HistoricalRateEntry::new(date, currency, self.lookup(date, currency).await)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        // Responses settle in any order
        entries.sort_by(|a, b| compare_entries(a, b, SortState::default()));

        let failed = entries.iter().filter(|e| e.rate.is_empty()).count();
        info!(
            entries = entries.len(),
            failed, "Historical rate aggregation finished"
        );
        Ok(entries)
    }

    async fn lookup(&self, date: NaiveDate, currency: Currency) -> RateQuote {
        let quote = self.lookup_isolated(date, currency).await;
        if let Some(progress) = &self.progress {
            progress.settled();
        }
        quote
    }

    async fn lookup_isolated(&self, date: NaiveDate, currency: Currency) -> RateQuote {
        match tokio::time::timeout(self.timeout, self.provider.fetch_quote(currency, date)).await {
            Ok(Ok(quote)) => quote,
            Ok(Err(e)) => {
                debug!(%currency, %date, error = %e, "Lookup failed");
                RateQuote::empty()
            }
            Err(_) => {
                warn!(%currency, %date, "Lookup timed out");
                RateQuote::empty()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Idle,
    Loading,
    Populated(Vec<HistoricalRateEntry>),
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Populated(usize),
    Empty,
    Failed,
    /// A newer run or a cancellation took over before this run finished.
    Superseded,
}

#[derive(Debug)]
struct SessionState {
    load: LoadState,
    sort: SortState,
    filter: FilterState,
}

/// Display state of the history table across refreshes.
///
/// Each refresh takes a generation token. Results are applied only when the
/// token is still current, so stale runs never overwrite newer ones.
pub struct HistorySession {
    aggregator: HistoryAggregator,
    notifier: Arc<dyn Notifier>,
    lookback_days: usize,
    min_date: NaiveDate,
    generation: AtomicU64,
    state: Mutex<SessionState>,
}

impl HistorySession {
    pub fn new(
        aggregator: HistoryAggregator,
        notifier: Arc<dyn Notifier>,
        lookback_days: usize,
        min_date: NaiveDate,
    ) -> Self {
        Self {
            aggregator,
            notifier,
            lookback_days,
            min_date,
            generation: AtomicU64::new(0),
            state: Mutex::new(SessionState {
                load: LoadState::Idle,
                sort: SortState::default(),
                filter: FilterState::default(),
            }),
        }
    }

    pub async fn refresh(&self) -> RefreshOutcome {
        let token = self.generation.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        self.state.lock().await.load = LoadState::Loading;

        let result = self
            .aggregator
            .fetch_history(self.lookback_days, self.min_date)
            .await;

        let mut state = self.state.lock().await;
        if self.generation.load(AtomicOrdering::SeqCst) != token {
            debug!(token, "Discarding superseded history run");
            return RefreshOutcome::Superseded;
        }

        match result {
            Ok(entries) if entries.is_empty() => {
                state.load = LoadState::Empty;
                RefreshOutcome::Empty
            }
            Ok(entries) => {
                let count = entries.len();
                state.load = LoadState::Populated(entries);
                RefreshOutcome::Populated(count)
            }
            Err(e) => {
                warn!(error = %e, "History aggregation failed");
                state.load = LoadState::Empty;
                self.notifier
                    .notify(Notification::error("historyErrorTitle", e.to_string()));
                RefreshOutcome::Failed
            }
        }
    }

    /// Invalidates any run in flight. Its results will be discarded.
    pub async fn cancel(&self) {
        self.generation.fetch_add(1, AtomicOrdering::SeqCst);
        let mut state = self.state.lock().await;
        if state.load == LoadState::Loading {
            state.load = LoadState::Idle;
        }
    }

    pub async fn load_state(&self) -> LoadState {
        self.state.lock().await.load.clone()
    }

    pub async fn sort_state(&self) -> SortState {
        self.state.lock().await.sort
    }

    pub async fn filter_state(&self) -> FilterState {
        self.state.lock().await.filter
    }

    pub async fn request_sort(&self, key: SortKey) -> SortState {
        let mut state = self.state.lock().await;
        state.sort = state.sort.request_sort(key);
        state.sort
    }

    pub async fn set_filter(&self, filter: FilterState) {
        self.state.lock().await.filter = filter;
    }

    pub async fn toggle_currency(&self, currency: Currency) -> FilterState {
        let mut state = self.state.lock().await;
        state.filter.toggle(currency);
        state.filter
    }

    /// Filtered and sorted rows for display. Empty unless populated.
    pub async fn visible_rows(&self) -> Vec<HistoricalRateEntry> {
        let state = self.state.lock().await;
        match &state.load {
            LoadState::Populated(entries) => {
                sort_entries(&filter_entries(entries, state.filter), state.sort)
            }
            _ => Vec::new(),
        }
    }
}
