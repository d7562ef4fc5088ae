//! Tradable instrument selection.

use crate::models::market::Product;

/// Base currency of a `BASE-QUOTE` product id.
pub fn base_currency(symbol: &str) -> Option<&str> {
    symbol.split_once('-').map(|(base, _)| base)
}

/// Quote currency of a `BASE-QUOTE` product id.
pub fn quote_currency(symbol: &str) -> Option<&str> {
    symbol.split_once('-').map(|(_, quote)| quote)
}

/// Instruments visited each cycle, in catalog order. Built once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstrumentSet {
    symbols: Vec<String>,
}

impl InstrumentSet {
    /// Keep catalog ids quoted in `quote` that are not blacklisted. Ids
    /// without a `BASE-QUOTE` shape are dropped.
    pub fn from_catalog<I, S>(catalog: I, quote: &str, blacklist: &[String]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let symbols = catalog
            .into_iter()
            .map(Into::into)
            .filter(|id: &String| !blacklist.iter().any(|b| b == id))
            .filter(|id| quote_currency(id) == Some(quote))
            .collect();
        Self { symbols }
    }

    /// Same as [`InstrumentSet::from_catalog`], after dropping products the
    /// exchange flags as `trading_disabled`.
    pub fn from_products(products: &[Product], quote: &str, blacklist: &[String]) -> Self {
        let enabled = products
            .iter()
            .filter(|p| !p.trading_disabled)
            .map(|p| p.id.as_str());
        Self::from_catalog(enabled, quote, blacklist)
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
