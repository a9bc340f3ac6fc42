pub mod history;
pub mod quote;
pub mod setup;
pub mod ui;
