//! Background headshot export.
//!
//! An export crops and encodes the current source on the rayon pool, publishes the bytes
//! through an [`Uploader`], and reports an [`ExportOutcome`] over a channel. The session
//! decides whether the outcome is still wanted.

use std::sync::{Arc, OnceLock, mpsc};

use log::{Level, error, info, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};
use sigframe_utils::{EncodeOptions, EncodedRaster, timing_guard};

use crate::{
    error::{CropError, UploadError},
    geometry::CropParameters,
    raster::{SourceImage, crop_and_encode},
};

/// Publishes encoded headshots and returns their public URL.
pub trait Uploader: Send + Sync {
    fn upload(&self, bytes: &[u8], filename: &str) -> Result<String, UploadError>;

    /// Short name used in logs.
    fn name(&self) -> &str {
        "uploader"
    }
}

/// Identity of the inputs an export was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExportKey {
    pub params: CropParameters,
    pub source_generation: u64,
}

/// Handle for an export that has been started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportTicket {
    pub request_id: u64,
    pub key: ExportKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetOrigin {
    /// Raster published through the uploader.
    Uploaded,
    /// Raster embedded as a `data:` URI.
    Embedded,
    /// Hosted original with a server-side crop transform.
    RemoteTransform,
}

/// Headshot URL usable in the email artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAssetReference {
    pub url: String,
    pub key: ExportKey,
    pub origin: AssetOrigin,
    /// Whether the image at `url` is already cropped to the container.
    pub precropped: bool,
}

/// Successful export payload.
#[derive(Debug, Clone)]
pub struct ExportedAsset {
    pub reference: RemoteAssetReference,
    pub raster: EncodedRaster,
    pub warnings: Vec<String>,
}

/// Message sent from the worker back to the session.
#[derive(Debug)]
pub struct ExportOutcome {
    pub request_id: u64,
    pub key: ExportKey,
    pub result: Result<ExportedAsset, CropError>,
}

/// Self-contained unit of export work.
pub struct ExportJob {
    pub ticket: ExportTicket,
    pub source: Arc<SourceImage>,
    pub options: EncodeOptions,
    pub bake_mask: bool,
    pub file_stem: String,
    pub uploader: Option<Arc<dyn Uploader>>,
}

impl ExportJob {
    /// Crop, encode and publish synchronously.
    pub fn run(self) -> ExportOutcome {
        let encoded = self.encode();
        self.finish(encoded)
    }

    /// CPU-bound half of the job.
    fn encode(&self) -> Result<EncodedRaster, CropError> {
        let _guard = timing_guard(
            format!("export request {} encode", self.ticket.request_id),
            Level::Debug,
        );
        crop_and_encode(&self.source, &self.ticket.key.params, &self.options, self.bake_mask)
    }

    /// Publish an encoded raster, possibly blocking on the network.
    fn finish(self, encoded: Result<EncodedRaster, CropError>) -> ExportOutcome {
        let ExportTicket { request_id, key } = self.ticket;
        let result = encoded.map(|raster| {
            let filename = raster.file_name(&format!("{}-{request_id}", self.file_stem));
            publish(raster, &filename, key, self.uploader.as_deref())
        });
        ExportOutcome {
            request_id,
            key,
            result,
        }
    }
}

fn publish(
    raster: EncodedRaster,
    filename: &str,
    key: ExportKey,
    uploader: Option<&dyn Uploader>,
) -> ExportedAsset {
    let mut warnings = Vec::new();
    let uploaded = match uploader {
        Some(uploader) => {
            let _guard = timing_guard(format!("{} upload", uploader.name()), Level::Debug);
            match uploader.upload(&raster.bytes, filename) {
                Ok(url) => {
                    info!("Uploaded {filename} via {} to {url}", uploader.name());
                    Some(url)
                }
                Err(err) => {
                    warn!("Upload of {filename} via {} failed: {err}", uploader.name());
                    warnings.push(format!(
                        "Headshot upload failed ({err}); the image is embedded inline instead."
                    ));
                    None
                }
            }
        }
        None => {
            warnings.push(
                "No upload provider configured; the headshot is embedded inline and some email clients may block it."
                    .to_string(),
            );
            None
        }
    };

    let reference = match uploaded {
        Some(url) => RemoteAssetReference {
            url,
            key,
            origin: AssetOrigin::Uploaded,
            precropped: true,
        },
        None => RemoteAssetReference {
            url: raster.data_uri(),
            key,
            origin: AssetOrigin::Embedded,
            precropped: true,
        },
    };
    ExportedAsset {
        reference,
        raster,
        warnings,
    }
}

const UPLOAD_THREAD_PREFIX: &str = "sigframe-upload";
const UPLOAD_THREADS: usize = 2;

/// Small dedicated pool for uploads so blocking network calls stay off the compute pool.
fn upload_pool() -> Option<&'static ThreadPool> {
    static POOL: OnceLock<Option<ThreadPool>> = OnceLock::new();
    POOL.get_or_init(|| {
        match ThreadPoolBuilder::new()
            .num_threads(UPLOAD_THREADS)
            .thread_name(|index| format!("{UPLOAD_THREAD_PREFIX}-{index}"))
            .build()
        {
            Ok(pool) => Some(pool),
            Err(err) => {
                warn!("Failed to start upload thread ({err}); uploading on the compute pool");
                None
            }
        }
    })
    .as_ref()
}

/// Crop and encode `job` on the rayon pool, upload on the upload thread, and send the
/// outcome on `tx`.
pub fn spawn_export(job: ExportJob, tx: mpsc::Sender<ExportOutcome>) {
    let request_id = job.ticket.request_id;
    info!("Launching export request {request_id}");

    rayon::spawn(move || {
        let encoded = job.encode();
        let needs_upload = encoded.is_ok() && job.uploader.is_some();
        let deliver = move || {
            let outcome = job.finish(encoded);
            if tx.send(outcome).is_err() {
                error!("Session dropped export result for request {request_id}");
            }
        };
        match upload_pool().filter(|_| needs_upload) {
            Some(pool) => pool.spawn(deliver),
            None => deliver(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use sigframe_utils::ShapeId;
    use std::sync::Mutex;

    struct Recording {
        calls: Mutex<Vec<(usize, String)>>,
        fail: bool,
    }

    impl Uploader for Recording {
        fn upload(&self, bytes: &[u8], filename: &str) -> Result<String, UploadError> {
            self.calls
                .lock()
                .unwrap()
                .push((bytes.len(), filename.to_string()));
            if self.fail {
                Err(UploadError::Network("connection refused".into()))
            } else {
                Ok(format!("https://cdn.test/{filename}"))
            }
        }
    }

    fn job(uploader: Option<Arc<dyn Uploader>>) -> ExportJob {
        let source =
            SourceImage::from_rgba(RgbaImage::from_pixel(80, 60, Rgba([200, 10, 10, 255])))
                .unwrap();
        ExportJob {
            ticket: ExportTicket {
                request_id: 7,
                key: ExportKey {
                    params: CropParameters::new(40, 120, 50, 50, ShapeId::Circle),
                    source_generation: 3,
                },
            },
            source: Arc::new(source),
            options: EncodeOptions::default(),
            bake_mask: false,
            file_stem: "headshot".into(),
            uploader,
        }
    }

    #[test]
    fn successful_upload_returns_hosted_url() {
        let uploader = Arc::new(Recording {
            calls: Mutex::new(Vec::new()),
            fail: false,
        });
        let outcome = job(Some(uploader.clone())).run();
        assert_eq!(outcome.request_id, 7);
        let asset = outcome.result.unwrap();
        assert_eq!(asset.reference.url, "https://cdn.test/headshot-7.jpg");
        assert_eq!(asset.reference.origin, AssetOrigin::Uploaded);
        assert_eq!(asset.reference.key.source_generation, 3);
        assert!(asset.warnings.is_empty());
        assert_eq!((asset.raster.width, asset.raster.height), (40, 40));
        assert_eq!(uploader.calls.lock().unwrap()[0].1, "headshot-7.jpg");
    }

    #[test]
    fn failed_upload_degrades_to_data_uri() {
        let uploader = Arc::new(Recording {
            calls: Mutex::new(Vec::new()),
            fail: true,
        });
        let asset = job(Some(uploader)).run().result.unwrap();
        assert_eq!(asset.reference.origin, AssetOrigin::Embedded);
        assert!(asset.reference.url.starts_with("data:image/jpeg;base64,"));
        assert_eq!(asset.warnings.len(), 1);
        assert!(asset.warnings[0].contains("connection refused"));
    }

    #[test]
    fn missing_uploader_embeds_with_warning() {
        let asset = job(None).run().result.unwrap();
        assert_eq!(asset.reference.origin, AssetOrigin::Embedded);
        assert_eq!(asset.warnings.len(), 1);
    }

    #[test]
    fn spawned_job_reports_over_channel() {
        let (tx, rx) = mpsc::channel();
        spawn_export(job(None), tx);
        let outcome = rx
            .recv_timeout(std::time::Duration::from_secs(10))
            .expect("outcome");
        assert_eq!(outcome.request_id, 7);
        assert!(outcome.result.is_ok());
    }

    /// Records the name of the thread each upload runs on.
    struct ThreadRecorder {
        names: Mutex<Vec<Option<String>>>,
    }

    impl Uploader for ThreadRecorder {
        fn upload(&self, _bytes: &[u8], filename: &str) -> Result<String, UploadError> {
            let name = std::thread::current().name().map(str::to_string);
            self.names.lock().unwrap().push(name);
            Ok(format!("https://cdn.test/{filename}"))
        }
    }

    #[test]
    fn spawned_upload_runs_off_the_compute_pool() {
        let uploader = Arc::new(ThreadRecorder {
            names: Mutex::new(Vec::new()),
        });
        let (tx, rx) = mpsc::channel();
        spawn_export(job(Some(uploader.clone())), tx);
        let outcome = rx
            .recv_timeout(std::time::Duration::from_secs(10))
            .expect("outcome");
        assert_eq!(
            outcome.result.unwrap().reference.origin,
            AssetOrigin::Uploaded
        );

        let names = uploader.names.lock().unwrap();
        assert_eq!(names.len(), 1);
        let name = names[0].as_deref().unwrap_or_default();
        assert!(name.starts_with(UPLOAD_THREAD_PREFIX), "uploaded on {name:?}");
    }
}
