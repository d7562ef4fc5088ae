//! Exchange access and its supporting services.

pub mod coinbase;
pub mod credentials;
pub mod exchange;

pub use coinbase::CoinbaseRestClient;
pub use credentials::Credentials;
pub use exchange::ExchangeClient;
