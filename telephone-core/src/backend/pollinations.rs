//! Image generation through the public Pollinations endpoint.

use super::{drawing_path, BackendError, DrawingGenerator};
use async_trait::async_trait;
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;

const API_BASE: &str = "https://image.pollinations.ai/prompt/";

/// Downloads a generated image per prompt and stores it as a PNG.
#[derive(Clone)]
pub struct PollinationsDrawing {
    client: reqwest::Client,
    dir: PathBuf,
    width: u32,
    height: u32,
    model: String,
}

impl PollinationsDrawing {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Ok(Self {
            client,
            dir: dir.into(),
            width: 400,
            height: 400,
            model: "flux".to_string(),
        })
    }

    fn url(&self, prompt: &str) -> Result<Url, BackendError> {
        let mut url = Url::parse(API_BASE).map_err(|e| BackendError::Parse(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| BackendError::Parse("base URL cannot take a path".to_string()))?
            .pop_if_empty()
            .push(prompt);
        url.query_pairs_mut()
            .append_pair("width", &self.width.to_string())
            .append_pair("height", &self.height.to_string())
            .append_pair("model", &self.model)
            .append_pair("nologo", "true")
            .append_pair("enhance", "false");
        Ok(url)
    }
}

#[async_trait]
impl DrawingGenerator for PollinationsDrawing {
    async fn generate_drawing(
        &self,
        prompt: &str,
        owner: &str,
        round: u32,
    ) -> Result<String, BackendError> {
        let response = self
            .client
            .get(self.url(prompt)?)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Api { status, message });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        if bytes.is_empty() {
            return Err(BackendError::Empty);
        }

        fs::create_dir_all(&self.dir).await?;
        let path = drawing_path(&self.dir, owner, round, "png");
        fs::write(&path, &bytes).await?;
        Ok(path.to_string_lossy().into_owned())
    }
}
