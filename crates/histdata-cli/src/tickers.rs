//! Curated ticker lists per asset class.

use std::fmt;

use clap::ValueEnum;

/// Asset classes with curated ticker lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Market {
    /// Cryptocurrencies quoted in USD.
    Crypto,
    /// US-listed equities.
    Stocks,
    /// Currency pairs.
    Forex,
    /// Market indices.
    Indices,
    /// Commodity futures.
    Commodities,
}

const CRYPTO: &[&str] = &[
    "BTC-USD", "ETH-USD", "SOL1-USD", "ADA-USD", "XRP-USD", "DOT1-USD", "LUNA1-USD", "DOGE-USD",
    "AVAX-USD", "SHIB-USD", "ALGO-USD", "LTC-USD", "UNI3-USD", "BCH-USD", "XLM-USD", "TRX-USD",
    "TON-USD", "BNB-USD",
];

const STOCKS: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "META", "NVDA", "NFLX", "AMD", "INTC", "CRM", "ADBE",
    "PYPL", "UBER", "LYFT", "ZM", "SQ", "ROKU", "SPOT", "TWTR", "BABA", "JD", "PDD", "NIO", "XPEV",
    "LI", "BIDU", "TME", "VIPS", "YMM", "JPM", "BAC", "WFC", "GS", "MS", "C", "USB", "PNC", "TFC",
    "COF",
];

const FOREX: &[&str] = &["EURUSD=X", "JPY=X", "GBPUSD=X", "EURJPY=X"];

const INDICES: &[&str] = &["^DJI", "^GSPC", "^IXIC", "^VIX", "^HSI", "^N225", "DX-Y.NYB"];

const COMMODITIES: &[&str] = &["GC=F", "SI=F", "ZN=F", "ZS=F"];

impl Market {
    /// Returns the curated tickers for this asset class.
    pub(crate) fn tickers(self) -> &'static [&'static str] {
        match self {
            Self::Crypto => CRYPTO,
            Self::Stocks => STOCKS,
            Self::Forex => FOREX,
            Self::Indices => INDICES,
            Self::Commodities => COMMODITIES,
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Crypto => "crypto",
            Self::Stocks => "stocks",
            Self::Forex => "forex",
            Self::Indices => "indices",
            Self::Commodities => "commodities",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[Market] = &[
        Market::Crypto,
        Market::Stocks,
        Market::Forex,
        Market::Indices,
        Market::Commodities,
    ];

    #[test]
    fn every_market_has_tickers() {
        for market in ALL {
            assert!(!market.tickers().is_empty(), "{market} list is empty");
        }
    }

    #[test]
    fn no_duplicates_within_a_market() {
        for market in ALL {
            let mut seen = std::collections::HashSet::new();
            for ticker in market.tickers() {
                assert!(seen.insert(ticker), "duplicate {ticker} in {market}");
            }
        }
    }
}
