pub mod error;
mod middleware;
pub mod provider;
pub mod resolution;
pub mod store;
mod version;


pub use error::{Error, Result};
pub use middleware::TracingMiddleware;
pub use provider::{DataStoreProvider, ProviderOptions, IDENTITY_FETCH_ERROR, PROVIDER_NAME};
pub use resolution::Resolution;
pub use store::{HttpIdentityStore, IdentityStore, Namespace, DEFAULT_REQUEST_TIMEOUT_MS};
pub use version::VERSION;

// Re-export commonly used types from open-feature
pub use open_feature::{EvaluationContext, EvaluationError, EvaluationReason};
