//! Concrete uploaders for exported headshots.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::{Result, bail};
use log::{debug, info};
use serde::Deserialize;
use sigframe_core::{UploadError, Uploader};
use sigframe_utils::{RasterFormat, UploadProvider, UploadSettings, data_uri};

/// Build the uploader selected in `settings`, or `None` to embed rasters inline.
pub fn build_uploader(settings: &UploadSettings) -> Result<Option<Arc<dyn Uploader>>> {
    match settings.provider {
        UploadProvider::None => Ok(None),
        UploadProvider::Directory => {
            let Some(directory) = settings.directory.clone() else {
                bail!("the directory upload provider needs --upload-dir");
            };
            if settings.public_base_url.trim().is_empty() {
                bail!("the directory upload provider needs --public-base-url");
            }
            info!("Publishing headshots into {}", directory.display());
            let uploader: Arc<dyn Uploader> =
                Arc::new(DirectoryUploader::new(directory, &settings.public_base_url));
            Ok(Some(uploader))
        }
        UploadProvider::Cloudinary => {
            if settings.cloud_name.trim().is_empty() || settings.upload_preset.trim().is_empty() {
                bail!("the cloudinary upload provider needs --cloud-name and --upload-preset");
            }
            let uploader: Arc<dyn Uploader> = Arc::new(CloudinaryUploader::new(
                &settings.cloud_name,
                &settings.upload_preset,
                Duration::from_secs(settings.timeout_secs),
            ));
            Ok(Some(uploader))
        }
    }
}

/// Copies files into a directory that a web server publishes.
#[derive(Debug, Clone)]
pub struct DirectoryUploader {
    directory: PathBuf,
    base_url: String,
}

impl DirectoryUploader {
    pub fn new(directory: PathBuf, base_url: &str) -> Self {
        Self {
            directory,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl Uploader for DirectoryUploader {
    fn upload(&self, bytes: &[u8], filename: &str) -> Result<String, UploadError> {
        fs::create_dir_all(&self.directory)?;
        let target = self.directory.join(filename);
        fs::write(&target, bytes)?;
        debug!("Wrote {} bytes to {}", bytes.len(), target.display());
        Ok(format!("{}/{filename}", self.base_url))
    }

    fn name(&self) -> &str {
        "directory"
    }
}

/// Unsigned uploads to a Cloudinary cloud.
pub struct CloudinaryUploader {
    endpoint: String,
    upload_preset: String,
    agent: ureq::Agent,
}

#[derive(Debug, Deserialize)]
struct CloudinaryResponse {
    secure_url: String,
}

impl CloudinaryUploader {
    pub fn new(cloud_name: &str, upload_preset: &str, timeout: Duration) -> Self {
        Self {
            endpoint: format!(
                "https://api.cloudinary.com/v1_1/{}/image/upload",
                cloud_name.trim()
            ),
            upload_preset: upload_preset.trim().to_string(),
            agent: ureq::AgentBuilder::new()
                .timeout(timeout)
                .user_agent(concat!("sigframe/", env!("CARGO_PKG_VERSION")))
                .build(),
        }
    }
}

impl Uploader for CloudinaryUploader {
    fn upload(&self, bytes: &[u8], filename: &str) -> Result<String, UploadError> {
        let (stem, mime) = split_filename(filename);
        let payload = data_uri(bytes, mime);
        let response = self.agent.post(&self.endpoint).send_form(&[
            ("file", payload.as_str()),
            ("upload_preset", self.upload_preset.as_str()),
            ("public_id", stem),
        ]);

        match response {
            Ok(resp) => resp
                .into_json::<CloudinaryResponse>()
                .map(|body| body.secure_url)
                .map_err(|err| UploadError::Service(format!("unreadable upload response: {err}"))),
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                Err(UploadError::Service(format!("HTTP {code}: {}", body.trim())))
            }
            Err(err) => Err(UploadError::Network(err.to_string())),
        }
    }

    fn name(&self) -> &str {
        "cloudinary"
    }
}

/// Split `headshot-3.jpg` into the public id and the MIME type of its extension.
fn split_filename(filename: &str) -> (&str, &'static str) {
    match filename.rsplit_once('.') {
        Some((stem, ext)) => {
            let mime = ext
                .parse::<RasterFormat>()
                .map(RasterFormat::mime_type)
                .unwrap_or("application/octet-stream");
            (stem, mime)
        }
        None => (filename, "application/octet-stream"),
    }
}
