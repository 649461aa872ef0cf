// Sol Mood Core Library
// Sentiment-gated trading logic for a single Solana token pair

pub mod models;
pub mod error;
pub mod settings;
pub mod wallet;
pub mod decision;
pub mod http_client;
pub mod rpc_client;
pub mod transaction_signer;
pub mod price_feed;
pub mod sentiment;
pub mod balance;
pub mod executor;
pub mod service;

#[cfg(feature = "native")]
pub mod native;

// Re-exports
pub use error::{CoreError, DataSource, FetchError, InvalidActionError, SubmissionError};
pub use models::*;
pub use settings::Settings;
pub use decision::DecisionPolicy;
pub use price_feed::*;
pub use sentiment::*;
pub use balance::*;
pub use executor::*;
pub use service::*;
