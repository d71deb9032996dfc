//! MarketLens client: session handling, research records and advertorial
//! generation against the MarketLens analysis service.

pub mod auth;
pub mod config;
pub mod errors;
pub mod generation;
pub mod logging;
pub mod models;
pub mod research;
pub mod session;
pub mod transport;
pub mod ui;

pub use auth::AuthFlow;
pub use config::Settings;
pub use errors::{TransportError, TransportErrorKind};
pub use session::SessionStore;
pub use transport::ApiClient;
