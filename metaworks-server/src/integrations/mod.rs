//! Third-party service clients
//!
//! Each client sits behind a trait so routes can be tested with a stub.

pub mod openai;

use async_trait::async_trait;
use metaworks_core::MascotPrompt;

pub use openai::OpenAiClient;

/// Chat completion backend for the mascot
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, prompt: &MascotPrompt) -> Result<String, IntegrationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("upstream returned no answer")]
    EmptyAnswer,
}
