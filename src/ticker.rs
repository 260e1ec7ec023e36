use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Ticker symbol identifying a traded security.
///
/// Symbols are normalised on construction: surrounding whitespace is removed
/// and letters are upper-cased, so `" aapl "` and `"AAPL"` name the same key.
/// Index (`^GSPC`) and continuous futures (`ES=F`) symbols are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Parses and normalises a user-entered ticker.
    ///
    /// # Errors
    /// Returns an error if the trimmed symbol is empty or contains characters
    /// other than alphanumerics and `. - _ ^ =`.
    pub fn parse(raw: &str) -> Result<Self, TickerError> {
        let symbol = raw.trim().to_uppercase();
        Self::validate(&symbol)?;
        Ok(Ticker(symbol))
    }

    fn validate(symbol: &str) -> Result<(), TickerError> {
        if symbol.is_empty() {
            return Err(TickerError::Empty);
        }

        if let Some(bad) = symbol
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '^' | '=')))
        {
            return Err(TickerError::InvalidCharacter(bad));
        }

        Ok(())
    }

    /// Returns the normalised symbol.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Ticker {
    type Error = TickerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ticker::parse(&value)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

/// Errors raised while parsing a ticker symbol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TickerError {
    #[error("Ticker cannot be empty")]
    Empty,
    #[error("Ticker contains invalid character '{0}'")]
    InvalidCharacter(char),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_normalises_case_and_whitespace() {
        let ticker = Ticker::parse("  msft ").unwrap();
        assert_eq!(ticker.as_str(), "MSFT");
        assert_eq!(ticker, Ticker::parse("MSFT").unwrap());
    }

    #[test]
    fn test_ticker_rejects_empty() {
        assert_eq!(Ticker::parse("").unwrap_err(), TickerError::Empty);
        assert_eq!(Ticker::parse("   ").unwrap_err(), TickerError::Empty);
    }

    #[test]
    fn test_ticker_rejects_invalid_characters() {
        assert_eq!(
            Ticker::parse("AAPL@").unwrap_err(),
            TickerError::InvalidCharacter('@')
        );
        assert!(Ticker::parse("AA PL").is_err());
    }

    #[test]
    fn test_ticker_accepts_index_and_futures_symbols() {
        assert_eq!(Ticker::parse("^gspc").unwrap().as_str(), "^GSPC");
        assert_eq!(Ticker::parse("es=f").unwrap().as_str(), "ES=F");
        assert_eq!(Ticker::parse("brk-b").unwrap().as_str(), "BRK-B");
    }

    #[test]
    fn test_ticker_display() {
        let ticker = Ticker::parse("tsla").unwrap();
        assert_eq!(format!("{}", ticker), "TSLA");
    }

    #[test]
    fn test_ticker_hashable() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(Ticker::parse("AAPL").unwrap(), "Apple Inc.");
        assert_eq!(map.get(&Ticker::parse("aapl").unwrap()), Some(&"Apple Inc."));
        assert_eq!(map.get(&Ticker::parse("MSFT").unwrap()), None);
    }

    #[test]
    fn test_ticker_serde_roundtrip_normalises() {
        let ticker: Ticker = serde_json::from_str("\" goog \"").unwrap();
        assert_eq!(ticker.as_str(), "GOOG");
        assert_eq!(serde_json::to_string(&ticker).unwrap(), "\"GOOG\"");
        assert!(serde_json::from_str::<Ticker>("\"\"").is_err());
    }
}
