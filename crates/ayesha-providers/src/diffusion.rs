//! Diffusion image generation provider.
//!
//! Posts a prompt and fixed canvas dimensions, receives base64 images, and
//! writes them to the output directory as `image_<n>.png` where `n` is a
//! random number in `1..=10000`. Files are never cleaned up here.

use async_trait::async_trait;
use ayesha_core::{config::ImageConfig, error::AyeshaError, traits::ImageGenerator};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Image generation backend.
pub struct DiffusionProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    width: u32,
    height: u32,
    output_dir: PathBuf,
}

impl DiffusionProvider {
    pub fn from_config(config: &ImageConfig, output_dir: PathBuf) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                warn!("diffusion: falling back to default HTTP client: {e}");
                reqwest::Client::new()
            });
        Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            width: config.width,
            height: config.height,
            output_dir,
        }
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> DiffusionRequest<'a> {
        DiffusionRequest {
            model_name: &self.model,
            prompt,
            image_height: self.height,
            image_width: self.width,
        }
    }
}

#[derive(Serialize)]
pub(crate) struct DiffusionRequest<'a> {
    pub model_name: &'a str,
    pub prompt: &'a str,
    pub image_height: u32,
    pub image_width: u32,
}

#[derive(Deserialize)]
pub(crate) struct DiffusionResponse {
    #[serde(default)]
    pub data: Vec<DiffusionImage>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
pub(crate) struct DiffusionImage {
    pub b64_json: Option<String>,
}

/// Base64 payloads from a response, or the backend's error.
fn payloads(resp: DiffusionResponse) -> Result<Vec<String>, AyeshaError> {
    if let Some(err) = resp.error.filter(|e| !e.is_null()) {
        let text = match err {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        return Err(AyeshaError::Provider(text));
    }
    Ok(resp.data.into_iter().filter_map(|d| d.b64_json).collect())
}

/// Highest random suffix in an image file name.
const MAX_IMAGE_SUFFIX: u32 = 10000;
/// Random draws before falling back to the first free suffix.
const RANDOM_NAME_ATTEMPTS: usize = 32;

/// Decode each payload and write it to `dir`, preserving order.
pub(crate) async fn save_images(
    dir: &Path,
    payloads: &[String],
) -> Result<Vec<PathBuf>, AyeshaError> {
    tokio::fs::create_dir_all(dir).await?;
    let mut paths = Vec::with_capacity(payloads.len());
    for payload in payloads {
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| AyeshaError::Provider(format!("invalid image data: {e}")))?;
        let (path, mut file) = create_unique_image(dir).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        paths.push(path);
    }
    Ok(paths)
}

/// Create a new `image_<n>.png` in `dir`. `n` is drawn at random; once
/// the draws keep hitting taken names, the lowest free `n` is used.
/// Existing files are never opened for writing.
async fn create_unique_image(dir: &Path) -> Result<(PathBuf, tokio::fs::File), AyeshaError> {
    let random = (0..RANDOM_NAME_ATTEMPTS)
        .map(|_| rand::thread_rng().gen_range(1..=MAX_IMAGE_SUFFIX))
        .collect::<Vec<_>>();
    for n in random.into_iter().chain(1..=MAX_IMAGE_SUFFIX) {
        let path = dir.join(format!("image_{n}.png"));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!("diffusion: {} taken", path.display());
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(AyeshaError::Provider(format!(
        "no free image name left in {}",
        dir.display()
    )))
}

#[async_trait]
impl ImageGenerator for DiffusionProvider {
    fn name(&self) -> &str {
        "diffusion"
    }

    async fn generate(&self, prompt: &str) -> Result<Vec<PathBuf>, AyeshaError> {
        debug!("diffusion: POST {} model={}", self.endpoint, self.model);

        let resp = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| AyeshaError::Provider(format!("image request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(AyeshaError::Provider(format!(
                "image backend returned {status}: {text}"
            )));
        }

        let parsed: DiffusionResponse = resp
            .json()
            .await
            .map_err(|e| AyeshaError::Provider(format!("image: failed to parse response: {e}")))?;

        let paths = save_images(&self.output_dir, &payloads(parsed)?).await?;
        info!("diffusion: saved {} image(s)", paths.len());
        Ok(paths)
    }
}
