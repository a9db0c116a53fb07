//! Client for the remote identity provider's admin API.

mod error;
mod http_provider;
mod identity_provider;
mod throttle;


pub use error::{ProviderError, Result};
pub use http_provider::HttpIdentityProvider;
pub use identity_provider::{IdentityProvider, NewRemoteUser};
pub use throttle::RequestThrottle;
