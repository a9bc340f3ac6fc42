//! The fixed set of currencies quoted against the Argentine Peso

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Currency {
    UsdBlue,
    UsdOficial,
    Eur,
}

impl Currency {
    /// Every tracked currency, in rank order.
    pub const ALL: [Currency; 3] = [Currency::UsdBlue, Currency::UsdOficial, Currency::Eur];

    /// Tie-break rank used when ordering table rows.
    pub fn rank(&self) -> u8 {
        match self {
            Currency::UsdBlue => 1,
            Currency::UsdOficial => 2,
            Currency::Eur => 3,
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Currency::UsdBlue => "usd-blue",
            Currency::UsdOficial => "usd-oficial",
            Currency::Eur => "eur",
        }
    }

    /// Path segment under `/cotizaciones` on the quotation service.
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            Currency::UsdBlue => "dolares/blue",
            Currency::UsdOficial => "dolares/oficial",
            Currency::Eur => "eur",
        }
    }

    /// Translation key of the human readable label.
    pub fn label_key(&self) -> &'static str {
        match self {
            Currency::UsdBlue => "usdBlueLabel",
            Currency::UsdOficial => "usdOficialLabel",
            Currency::Eur => "eurLabel",
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Currency::UsdBlue => "USD (Blue)",
                Currency::UsdOficial => "USD (Oficial)",
                Currency::Eur => "EUR",
            }
        )
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "usd-blue" | "blue" => Ok(Currency::UsdBlue),
            "usd-oficial" | "oficial" => Ok(Currency::UsdOficial),
            "eur" => Ok(Currency::Eur),
            _ => Err(anyhow::anyhow!("Invalid currency: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_follows_declaration_order() {
        let ranks: Vec<u8> = Currency::ALL.iter().map(Currency::rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert!(Currency::UsdBlue < Currency::UsdOficial);
        assert!(Currency::UsdOficial < Currency::Eur);
    }

    #[test]
    fn test_from_str_accepts_slugs_and_aliases() {
        assert_eq!("usd-blue".parse::<Currency>().unwrap(), Currency::UsdBlue);
        assert_eq!("USD_OFICIAL".parse::<Currency>().unwrap(), Currency::UsdOficial);
        assert_eq!("oficial".parse::<Currency>().unwrap(), Currency::UsdOficial);
        assert_eq!("EUR".parse::<Currency>().unwrap(), Currency::Eur);

        let err = "gbp".parse::<Currency>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid currency: gbp");
    }

    #[test]
    fn test_slug_round_trips_through_from_str() {
        for currency in Currency::ALL {
            assert_eq!(currency.slug().parse::<Currency>().unwrap(), currency);
        }
    }
}
