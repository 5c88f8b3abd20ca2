//! # ayesha-providers
//!
//! Backend implementations: OpenAI-compatible chat completions and
//! diffusion image generation.

pub mod diffusion;
pub mod openai;

pub use diffusion::DiffusionProvider;
pub use openai::OpenAiProvider;
