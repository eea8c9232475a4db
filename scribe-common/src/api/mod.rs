//! Shared HTTP API functionality
//!
//! Wire types of the AI functions and service-key authentication, used by
//! scribe-ai (server side) and scribe-pm (client side). No HTTP framework
//! dependencies live here.

pub mod auth;
pub mod types;

pub use auth::{bearer_token, ServiceAuthError, ServiceKey};
pub use types::{
    AbstractInput, AbstractLanguage, AnalyzeDocumentRequest, AnalyzeDocumentResponse,
    AnalyzeTextRequest, AnalyzeTextResponse, GenerateAbstractRequest, GenerateAbstractResponse,
    Icon, Suggestion, SuggestionKind, Tip, TipCategory,
};
