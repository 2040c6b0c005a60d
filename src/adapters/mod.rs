pub mod openai;

pub use openai::OpenAiAdapter;

use std::future::Future;

use anyhow::Result;

/// A text-generation backend that turns one prompt into one reply
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}
