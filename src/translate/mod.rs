pub mod interface;
pub mod error;
pub mod throttle;
pub mod deepl;
pub mod groq;
pub mod huggingface;
pub mod coordinator;
pub mod factory;

pub use interface::{
    Credentials, ProviderAttempt, ProviderOutput, ServiceKind, TextPayload, TranslationProvider,
    TranslationRequest, TranslationResult,
};
pub use error::{ProviderError, TranslateError};
pub use coordinator::FallbackCoordinator;
pub use factory::TranslationProviderFactory;
