pub mod config;
pub mod datasource;
pub mod decode;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod replay;
pub mod risk;

pub use config::Config;
pub use datasource::{
    DataSourceError, EventSource, FileEventSource, IndexerEventSource, MockEventSource,
    SqliteEventSource,
};
pub use domain::{Address, Decimal, DecimalFactors, LoanId, RawEvent, Token, TokenAmounts, TokenRegistry};
pub use engine::{HashstackProtocol, LoanEntity, LoanProtocol, LoanStateStore};
pub use error::{DecodeError, ReplayError, RiskError};
pub use orchestration::{SyncError, Synchronizer};
pub use replay::{ReplayEngine, ReplaySummary, ReplayWatermark};
pub use risk::Prices;
