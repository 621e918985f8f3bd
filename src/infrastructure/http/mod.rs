//! HTTP adapters: download transport and request URL resolution.

pub mod transport;
pub mod url_resolver;

pub use transport::{DEFAULT_TIMEOUT_SECS, ReqwestTransport};
pub use url_resolver::BaseUrlResolver;
