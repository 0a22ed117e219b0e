//! Atelier Marketplace Adapter
//!
//! Rate-limited proxy between automation modules and the marketplace API.
//! The wire envelope (`{endpoint, params}` / `{success, data?, error?}` with
//! 429 on quota exhaustion) matches the dashboard's edge contract so a real
//! marketplace integration can replace the simulated backend without touching
//! callers.

pub mod backend;
pub mod error;
pub mod proxy;
pub mod rate_limit;

// Re-export key types
pub use backend::{HttpBackend, MarketplaceBackend, SimulatedBackend};
pub use error::{AdapterError, Result};
pub use proxy::{MarketplaceProxy, ProxyRequest, ProxyResponse};
pub use rate_limit::RollingWindowLimiter;
