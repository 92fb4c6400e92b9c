//! External collaborators: market data, alert delivery, fundamental gating.

pub mod alerts;
pub mod fundamental;
pub mod kraken;
pub mod market_data;

pub use alerts::{AlertDispatcher, DispatchError, LogDispatcher, TelegramDispatcher};
pub use fundamental::{FilterDecision, FundamentalFilter, MacroCalendarFilter, MacroEvent};
pub use kraken::KrakenMarketDataProvider;
pub use market_data::{FetchError, MarketDataProvider, ProviderResolver};
