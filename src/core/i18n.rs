//! Translation lookup for user-facing labels

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

const EN_CATALOG: &str = include_str!("../../locales/en.json");
const ES_CATALOG: &str = include_str!("../../locales/es.json");

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locale::En => write!(f, "en"),
            Locale::Es => write!(f, "es"),
        }
    }
}

impl FromStr for Locale {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "es" => Ok(Locale::Es),
            _ => Err(anyhow::anyhow!("Unsupported locale: {}", s)),
        }
    }
}

type Catalog = HashMap<String, String>;

/// Resolves string identifiers in the active locale.
///
/// Lookups fall back to English, then to the key itself. `{{name}}`
/// placeholders are replaced from the supplied parameters.
#[derive(Debug, Clone)]
pub struct Translator {
    locale: Locale,
    active: Catalog,
    fallback: Catalog,
}

impl Translator {
    pub fn new(locale: Locale) -> Result<Self> {
        let fallback = parse_catalog(EN_CATALOG).context("Failed to load en catalog")?;
        let active = match locale {
            Locale::En => fallback.clone(),
            Locale::Es => parse_catalog(ES_CATALOG).context("Failed to load es catalog")?,
        };
        Ok(Self {
            locale,
            active,
            fallback,
        })
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn translate(&self, key: &str, params: &[(&str, &str)]) -> String {
        let mut translation = self
            .active
            .get(key)
            .or_else(|| self.fallback.get(key))
            .cloned()
            .unwrap_or_else(|| key.to_string());

        for (name, value) in params {
            translation = translation.replace(&format!("{{{{{name}}}}}"), value);
        }
        translation
    }

    /// Shorthand for a lookup without parameters.
    pub fn t(&self, key: &str) -> String {
        self.translate(key, &[])
    }

    /// Numeric short date in the locale's field order.
    pub fn format_short_date(&self, date: NaiveDate) -> String {
        match self.locale {
            Locale::En => date.format("%m/%d/%Y").to_string(),
            Locale::Es => date.format("%d/%m/%Y").to_string(),
        }
    }
}

fn parse_catalog(raw: &str) -> Result<Catalog> {
    Ok(serde_json::from_str(raw)?)
}
