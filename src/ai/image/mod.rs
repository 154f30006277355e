//! Image Generation
//!
//! Hero images come from a fallback chain:
//! provider A → provider B → stock image → SVG placeholder.
//!
//! ## Modules
//!
//! - `huggingface`: Stable Diffusion through the Hugging Face inference router
//! - `openai`: OpenAI `images/generations`
//!
//! Unlike the text chain, each image provider is tried exactly once. The
//! pipeline always produces a file, so callers never need their own fallback.

mod huggingface;
mod openai;

pub use huggingface::HuggingFaceProvider;
pub use openai::OpenAiImageProvider;

use async_trait::async_trait;
use maud::html;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::ImageConfig;
use crate::constants::image::EXTENSIONS;
use crate::types::{EngineError, Result};

// =============================================================================
// Image Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Webp,
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
            Self::Svg => "svg",
        }
    }

    /// Sniff the format from magic bytes, defaulting to PNG
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Self::Jpeg
        } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Self::Webp
        } else if bytes.starts_with(b"<svg") || bytes.starts_with(b"<?xml") {
            Self::Svg
        } else {
            Self::Png
        }
    }

    /// Format named by an HTTP content type, if it is an image type
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type.split(';').next()?.trim().to_ascii_lowercase();
        match mime.as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::Webp),
            "image/svg+xml" => Some(Self::Svg),
            _ => None,
        }
    }
}

/// Decoded image returned by a provider
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl GeneratedImage {
    pub fn new(bytes: Vec<u8>) -> Self {
        let format = ImageFormat::detect(&bytes);
        Self { bytes, format }
    }
}

/// Where the final image came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "provider", rename_all = "lowercase")]
pub enum ImageSource {
    Provider(String),
    Stock,
    Placeholder,
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Provider(name) => write!(f, "provider:{}", name),
            Self::Stock => write!(f, "stock"),
            Self::Placeholder => write!(f, "placeholder"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageOutcome {
    pub path: PathBuf,
    pub source: ImageSource,
}

impl ImageOutcome {
    pub fn is_fallback(&self) -> bool {
        !matches!(self.source, ImageSource::Provider(_))
    }

    /// File name under the images directory
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

// =============================================================================
// Image Provider Trait
// =============================================================================

#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage>;

    fn name(&self) -> &str;
}

pub type SharedImageProvider = Arc<dyn ImageProvider>;

/// Build a provider by name; fails when its API key is missing
pub fn create_image_provider(name: &str, config: &ImageConfig) -> Result<SharedImageProvider> {
    match name {
        "huggingface" | "hf" => Ok(Arc::new(HuggingFaceProvider::from_env(config)?)),
        "openai" => Ok(Arc::new(OpenAiImageProvider::from_env(config)?)),
        other => Err(EngineError::Config(format!(
            "Unknown image provider: {}. Supported: huggingface, openai",
            other
        ))),
    }
}

// =============================================================================
// Image Pipeline
// =============================================================================

/// Provider chain plus local fallbacks, writing into one images directory
pub struct ImagePipeline {
    providers: Vec<SharedImageProvider>,
    stock_image: PathBuf,
    images_dir: PathBuf,
}

impl ImagePipeline {
    pub fn new(images_dir: impl Into<PathBuf>, stock_image: impl Into<PathBuf>) -> Self {
        Self {
            providers: Vec::new(),
            stock_image: stock_image.into(),
            images_dir: images_dir.into(),
        }
    }

    pub fn with_provider(mut self, provider: SharedImageProvider) -> Self {
        self.providers.push(provider);
        self
    }

    /// Providers named in `config.providers`; unusable ones are skipped
    pub fn from_config(config: &ImageConfig, images_dir: impl Into<PathBuf>) -> Self {
        let mut pipeline = Self::new(images_dir, config.stock_image.clone());
        for name in &config.providers {
            match create_image_provider(name, config) {
                Ok(provider) => pipeline = pipeline.with_provider(provider),
                Err(e) => warn!(provider = %name, error = %e, "Skipping image provider"),
            }
        }
        pipeline
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Produce `images/<slug>.<ext>`, falling back to stock then placeholder
    pub async fn generate(&self, prompt: &str, slug: &str) -> Result<ImageOutcome> {
        std::fs::create_dir_all(&self.images_dir)?;

        for provider in &self.providers {
            match provider.generate(prompt).await {
                Ok(image) => {
                    let path = self
                        .images_dir
                        .join(format!("{}.{}", slug, image.format.extension()));
                    std::fs::write(&path, &image.bytes)?;
                    self.remove_stale(slug, &path)?;
                    info!(provider = provider.name(), path = %path.display(), "Image saved");
                    return Ok(ImageOutcome {
                        path,
                        source: ImageSource::Provider(provider.name().to_string()),
                    });
                }
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "Image generation failed");
                }
            }
        }

        if let Some(path) = self.copy_stock(slug)? {
            self.remove_stale(slug, &path)?;
            info!(path = %path.display(), "Using stock image");
            return Ok(ImageOutcome {
                path,
                source: ImageSource::Stock,
            });
        }

        let path = self.images_dir.join(format!("{}.svg", slug));
        std::fs::write(&path, placeholder_svg(slug))?;
        self.remove_stale(slug, &path)?;
        warn!(path = %path.display(), "No stock image found, wrote placeholder");
        Ok(ImageOutcome {
            path,
            source: ImageSource::Placeholder,
        })
    }

    /// Delete `<slug>.<ext>` files left by earlier runs so only `current`
    /// remains for the slug
    fn remove_stale(&self, slug: &str, current: &Path) -> Result<()> {
        for extension in EXTENSIONS {
            let candidate = self.images_dir.join(format!("{}.{}", slug, extension));
            if candidate == current || !candidate.is_file() {
                continue;
            }
            std::fs::remove_file(&candidate)?;
            debug!(path = %candidate.display(), "Removed stale image");
        }
        Ok(())
    }

    fn copy_stock(&self, slug: &str) -> Result<Option<PathBuf>> {
        if !self.stock_image.is_file() {
            return Ok(None);
        }
        let extension = stock_extension(&self.stock_image);
        let dest = self.images_dir.join(format!("{}.{}", slug, extension));
        if dest != self.stock_image {
            std::fs::copy(&self.stock_image, &dest)?;
        }
        Ok(Some(dest))
    }
}

fn stock_extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| "jpg".to_string())
}

/// Neutral swatch with the slug as caption
pub fn placeholder_svg(label: &str) -> String {
    let markup = html! {
        svg xmlns="http://www.w3.org/2000/svg" width="1024" height="576" viewBox="0 0 1024 576" {
            rect width="1024" height="576" fill="#efe9e1" {}
            rect x="32" y="32" width="960" height="512" fill="none" stroke="#c8b8a6" stroke-width="4" {}
            text x="512" y="300" text-anchor="middle" font-family="sans-serif" font-size="36" fill="#6b5b4b" {
                (label)
            }
        }
    };
    markup.into_string()
}
