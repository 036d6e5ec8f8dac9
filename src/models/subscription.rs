//! User-selected chart settings and the subscription key derived from them.

use serde::{Deserialize, Serialize};

/// Candle bucket width offered by the feed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[default]
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "12h")]
    H12,
    #[serde(rename = "1D")]
    D1,
    #[serde(rename = "1W")]
    W1,
    #[serde(rename = "1M")]
    Month1,
}

impl Timeframe {
    /// All timeframes in display order.
    pub const ALL: [Timeframe; 8] = [
        Timeframe::M1,
        Timeframe::M15,
        Timeframe::M30,
        Timeframe::H1,
        Timeframe::H12,
        Timeframe::D1,
        Timeframe::W1,
        Timeframe::Month1,
    ];

    /// Returns the wire name, which is also the display label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 => "1h",
            Timeframe::H12 => "12h",
            Timeframe::D1 => "1D",
            Timeframe::W1 => "1W",
            Timeframe::Month1 => "1M",
        }
    }

    /// Looks up a timeframe by its 1-based position in [`Timeframe::ALL`].
    pub fn from_shortcut(digit: char) -> Option<Self> {
        let index = digit.to_digit(10)?.checked_sub(1)?;
        Self::ALL.get(index as usize).copied()
    }
}

/// How the series is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesKind {
    #[default]
    Candlestick,
    Bar,
}

impl SeriesKind {
    /// Toggles between series kinds.
    pub fn toggle(&mut self) {
        *self = match self {
            SeriesKind::Candlestick => SeriesKind::Bar,
            SeriesKind::Bar => SeriesKind::Candlestick,
        };
    }

    pub fn label(&self) -> &'static str {
        match self {
            SeriesKind::Candlestick => "Candles",
            SeriesKind::Bar => "Bars",
        }
    }
}

/// A tradable pair offered in the market selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Market {
    /// Short display name.
    pub label: &'static str,
    /// Exchange pair identifier.
    pub symbol: &'static str,
}

/// Markets offered by the selector, in cycling order.
pub const MARKETS: [Market; 3] = [
    Market {
        label: "BTC",
        symbol: "tBTCUSD",
    },
    Market {
        label: "ETH",
        symbol: "tETHUSD",
    },
    Market {
        label: "SOL",
        symbol: "tSOLUSD",
    },
];

/// Everything that identifies one live chart subscription.
///
/// Serialized with the field names used for the persisted preference entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionParams {
    #[serde(rename = "selectedTimeFrame")]
    pub timeframe: Timeframe,
    #[serde(rename = "selectedCurrency")]
    pub symbol: String,
    #[serde(rename = "selectedSeries")]
    pub series_kind: SeriesKind,
}

impl SubscriptionParams {
    /// Returns the candles channel key, e.g. `trade:1m:tBTCUSD`.
    pub fn key(&self) -> String {
        format!("trade:{}:{}", self.timeframe.as_str(), self.symbol)
    }

    /// Returns the selector entry for the current symbol, if it is one of [`MARKETS`].
    pub fn market(&self) -> Option<&'static Market> {
        MARKETS.iter().find(|m| m.symbol == self.symbol)
    }

    /// Display label such as `BTC/USDT`; unknown symbols are shown verbatim.
    pub fn market_label(&self) -> String {
        match self.market() {
            Some(market) => format!("{}/USDT", market.label),
            None => self.symbol.clone(),
        }
    }

    /// Switches to the next market in [`MARKETS`], wrapping around.
    pub fn next_market(&mut self) {
        let next = match MARKETS.iter().position(|m| m.symbol == self.symbol) {
            Some(i) => (i + 1) % MARKETS.len(),
            None => 0,
        };
        self.symbol = MARKETS[next].symbol.to_string();
    }
}

impl Default for SubscriptionParams {
    fn default() -> Self {
        Self {
            timeframe: Timeframe::default(),
            symbol: MARKETS[0].symbol.to_string(),
            series_kind: SeriesKind::default(),
        }
    }
}
