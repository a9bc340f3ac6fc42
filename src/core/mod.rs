//! Core business logic abstractions

pub mod calendar;
pub mod config;
pub mod currency;
pub mod daily;
pub mod history;
pub mod i18n;
pub mod log;
pub mod notify;
pub mod quote;

// Re-export main types for cleaner imports
pub use currency::Currency;
pub use notify::{Notification, NotificationCenter, NotificationKind, Notifier};
pub use quote::{QuoteProvider, RateQuote};
