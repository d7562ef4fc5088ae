//! Core application primitives (time windows, instrument selection, the
//! trading loop and its health server)

pub mod http;
pub mod instruments;
pub mod time_window;
pub mod trader;

pub use http::*;
pub use instruments::*;
pub use time_window::*;
pub use trader::*;
