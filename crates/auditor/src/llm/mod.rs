//! AI audit capability integration.
//!
//! The request builder assembles an ordered multi-part prompt from the
//! contract source and the optional whitepaper payload, paired with the
//! strict output schema. The provider abstraction keeps the wire client
//! swappable; tests run against the mock provider.

pub mod mock_provider;
pub mod provider;
pub mod request;

pub use mock_provider::MockAiProvider;
pub use provider::{AiProvider, GeminiProvider};
pub use request::{build_audit_request, AuditRequest, RequestPart, NO_WHITEPAPER_MARKER};
