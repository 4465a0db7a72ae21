use crate::{config::ModelSettings, error::ModelFetchError};
use std::{path::PathBuf, time::Duration};
use tokio::io::AsyncWriteExt;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Resolves the model checkpoint at startup. If the configured file is
/// missing and a download url is set, fetches it from the remote model
/// repository. Any failure here aborts startup.
pub async fn ensure_model(settings: &ModelSettings) -> Result<PathBuf, ModelFetchError> {
    let model_path = settings.get_model_path();
    if model_path.exists() {
        tracing::info!("Model checkpoint already present at {:?}", model_path);
        return Ok(model_path);
    }

    let url = settings
        .download_url
        .as_deref()
        .ok_or_else(|| ModelFetchError::MissingModel(model_path.clone()))?;

    tracing::info!("Downloading model from {} to {:?}", url, model_path);
    download_model(url, &model_path).await?;

    Ok(model_path)
}

async fn download_model(url: &str, path: &PathBuf) -> Result<u64, ModelFetchError> {
    let client = reqwest::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()?;

    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(ModelFetchError::UnexpectedStatus(response.status()));
    }

    let bytes = response.bytes().await?;
    let size = bytes.len() as u64;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(&bytes).await?;
    file.flush().await?;

    tracing::info!("Downloaded model checkpoint ({} bytes)", size);
    Ok(size)
}
