//! AI Integration Layer
//!
//! Text and image generation backends plus prompt construction.

pub mod image;
pub mod json_repair;
pub mod prompt;
pub mod provider;

pub use image::{
    GeneratedImage, HuggingFaceProvider, ImageFormat, ImageOutcome, ImagePipeline, ImageProvider,
    ImageSource, OpenAiImageProvider, SharedImageProvider,
};
pub use json_repair::{JsonRepairer, extract_json_array, extract_json_from_response};
pub use prompt::{PromptBuilder, PromptSection, PromptTemplates};
pub use provider::{
    ChainConfig, ChainedProvider, GeminiProvider, LlmProvider, LlmResponse, OpenAiProvider,
    ProviderChain, ProviderConfig, ResponseMetadata, SharedProvider, TokenUsage, create_chain,
    create_provider,
};
