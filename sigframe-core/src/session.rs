//! Editing session: record, source image, export lifecycle and artifact assembly.

use std::{
    path::Path,
    sync::{Arc, mpsc},
    time::{Duration, Instant},
};

use log::{debug, info, warn};
use sigframe_utils::{AppSettings, EncodeOptions, LogoMode, ThemeSettings, data_uri};

use crate::{
    error::{CropError, ExportError},
    export::{
        AssetOrigin, ExportJob, ExportKey, ExportOutcome, ExportTicket, ExportedAsset,
        RemoteAssetReference, Uploader, spawn_export,
    },
    html::{LogoImage, RenderInput, RenderTarget, SignatureArtifact, render_html, render_plain_text},
    raster::SourceImage,
    remote::RemoteCropUrlBuilder,
    signature::{SignatureStore, Snapshot},
};

/// What happened to a finished export.
#[derive(Debug)]
pub enum ExportStatus {
    /// Result matched the session and is now the cached asset.
    Applied {
        request_id: u64,
        reference: RemoteAssetReference,
    },
    /// Crop parameters or source changed while the export ran.
    Stale { request_id: u64 },
    /// A newer request was issued after this one.
    Superseded { request_id: u64 },
    /// Crop or encode failed; the previous asset is kept.
    Failed { request_id: u64, error: CropError },
}

impl ExportStatus {
    pub fn request_id(&self) -> u64 {
        match self {
            ExportStatus::Applied { request_id, .. }
            | ExportStatus::Stale { request_id }
            | ExportStatus::Superseded { request_id }
            | ExportStatus::Failed { request_id, .. } => *request_id,
        }
    }
}

/// Request-id bookkeeping for single-flight exports.
#[derive(Debug, Default)]
pub struct ExportCoordinator {
    last_issued: u64,
    in_flight: Option<ExportTicket>,
    /// Abandoned request whose worker has not reported back yet.
    draining: Option<u64>,
    cached: Option<ExportedAsset>,
}

impl ExportCoordinator {
    /// Reserve a request id for `key`, or reject while another export is running.
    pub fn begin(&mut self, key: ExportKey) -> Result<ExportTicket, ExportError> {
        let running = self.in_flight.map(|ticket| ticket.request_id);
        if let Some(request_id) = running.or(self.draining) {
            return Err(ExportError::Busy {
                in_flight: request_id,
            });
        }
        self.last_issued += 1;
        let ticket = ExportTicket {
            request_id: self.last_issued,
            key,
        };
        self.in_flight = Some(ticket);
        Ok(ticket)
    }

    /// Detach the running export from the session. Its result will be reported as
    /// superseded, and no new export starts until that result has arrived.
    pub fn abandon(&mut self) {
        if let Some(ticket) = self.in_flight.take() {
            debug!("Abandoning export request {}", ticket.request_id);
            self.draining = Some(ticket.request_id);
        }
    }

    pub fn in_flight(&self) -> Option<ExportTicket> {
        self.in_flight
    }

    /// `true` while any worker, live or abandoned, has not reported back.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some() || self.draining.is_some()
    }

    /// Settle `outcome` against the session's `current` inputs.
    pub fn complete(&mut self, outcome: ExportOutcome, current: Option<ExportKey>) -> ExportStatus {
        let request_id = outcome.request_id;
        if self.draining == Some(request_id) {
            self.draining = None;
            info!("Abandoned export request {request_id} finished");
            return ExportStatus::Superseded { request_id };
        }
        if self.in_flight.map(|ticket| ticket.request_id) != Some(request_id) {
            info!("Ignoring superseded export result {request_id}");
            return ExportStatus::Superseded { request_id };
        }
        self.in_flight = None;

        match outcome.result {
            Err(error) => {
                warn!("Export request {request_id} failed: {error}");
                ExportStatus::Failed { request_id, error }
            }
            Ok(_) if current != Some(outcome.key) => {
                info!("Discarding stale export result {request_id}");
                ExportStatus::Stale { request_id }
            }
            Ok(asset) => {
                let reference = asset.reference.clone();
                self.cached = Some(asset);
                ExportStatus::Applied {
                    request_id,
                    reference,
                }
            }
        }
    }

    /// Drop the cached asset unless it was produced from `current`.
    pub fn invalidate(&mut self, current: Option<ExportKey>) {
        if self
            .cached
            .as_ref()
            .is_some_and(|asset| Some(asset.reference.key) != current)
        {
            debug!("Crop inputs changed; dropping cached headshot asset");
            self.cached = None;
        }
    }

    /// Cached asset, if it was produced from `key`.
    pub fn cached(&self, key: ExportKey) -> Option<&ExportedAsset> {
        self.cached
            .as_ref()
            .filter(|asset| asset.reference.key == key)
    }
}

/// Render and export settings resolved once per session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub theme: ThemeSettings,
    pub encode: EncodeOptions,
    pub bake_mask: bool,
    pub file_stem: String,
    pub remote: RemoteCropUrlBuilder,
    pub logo_alt: String,
}

impl From<&AppSettings> for SessionSettings {
    fn from(settings: &AppSettings) -> Self {
        Self {
            theme: settings.theme.clone(),
            encode: EncodeOptions::from_export_settings(&settings.export),
            bake_mask: settings.export.bake_mask,
            file_stem: settings.export.file_stem.clone(),
            remote: RemoteCropUrlBuilder::from_settings(&settings.remote),
            logo_alt: settings.remote.logo_alt.clone(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&AppSettings::default())
    }
}

#[derive(Debug, Clone)]
struct LoadedSource {
    image: Arc<SourceImage>,
    generation: u64,
    /// Original upload as a `data:` URI for the preview.
    preview_src: String,
}

/// One user's editing session.
pub struct SignatureSession {
    settings: SessionSettings,
    store: SignatureStore,
    source: Option<LoadedSource>,
    generation: u64,
    coordinator: ExportCoordinator,
    uploader: Option<Arc<dyn Uploader>>,
    job_tx: mpsc::Sender<ExportOutcome>,
    job_rx: mpsc::Receiver<ExportOutcome>,
}

impl SignatureSession {
    pub fn new(
        settings: SessionSettings,
        store: SignatureStore,
        uploader: Option<Arc<dyn Uploader>>,
    ) -> Self {
        let (job_tx, job_rx) = mpsc::channel();
        Self {
            settings,
            store,
            source: None,
            generation: 0,
            coordinator: ExportCoordinator::default(),
            uploader,
            job_tx,
            job_rx,
        }
    }

    pub fn from_app_settings(settings: &AppSettings, uploader: Option<Arc<dyn Uploader>>) -> Self {
        Self::new(
            SessionSettings::from(settings),
            SignatureStore::new(settings.record.clone()),
            uploader,
        )
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// Edit the record. Crop edits drop the cached asset; text edits keep it.
    pub fn update_record<F>(&mut self, edit: F) -> Snapshot
    where
        F: FnOnce(&mut sigframe_utils::SignatureRecord),
    {
        let snapshot = self.store.update(edit);
        let current = self.current_key();
        self.coordinator.invalidate(current);
        snapshot
    }

    /// Decode and adopt a new headshot. On error the previous source stays loaded.
    pub fn load_source(&mut self, bytes: &[u8]) -> Result<(), CropError> {
        let image = SourceImage::decode(bytes)?;
        let mime = image::guess_format(bytes)
            .map(|format| format.to_mime_type())
            .unwrap_or("application/octet-stream");
        self.adopt_source(image, data_uri(bytes, mime));
        Ok(())
    }

    pub fn load_source_path(&mut self, path: &Path) -> Result<(), CropError> {
        let bytes =
            std::fs::read(path).map_err(|err| CropError::Decode(image::ImageError::IoError(err)))?;
        self.load_source(&bytes)
    }

    fn adopt_source(&mut self, image: SourceImage, preview_src: String) {
        self.generation += 1;
        info!(
            "Loaded headshot source {}x{} (generation {})",
            image.width(),
            image.height(),
            self.generation
        );
        self.source = Some(LoadedSource {
            image: Arc::new(image),
            generation: self.generation,
            preview_src,
        });
        self.coordinator.abandon();
        let current = self.current_key();
        self.coordinator.invalidate(current);
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Inputs an export started now would be keyed by.
    pub fn current_key(&self) -> Option<ExportKey> {
        self.source.as_ref().map(|source| ExportKey {
            params: self.store.snapshot().crop_parameters(),
            source_generation: source.generation,
        })
    }

    /// Start exporting the current crop in the background.
    pub fn begin_export(&mut self) -> Result<ExportTicket, ExportError> {
        let key = self.current_key().ok_or(ExportError::NoHeadshot)?;
        let source = self
            .source
            .as_ref()
            .map(|source| Arc::clone(&source.image))
            .ok_or(ExportError::NoHeadshot)?;
        let ticket = self.coordinator.begin(key)?;
        spawn_export(
            ExportJob {
                ticket,
                source,
                options: self.settings.encode.clone(),
                bake_mask: self.settings.bake_mask,
                file_stem: self.settings.file_stem.clone(),
                uploader: self.uploader.clone(),
            },
            self.job_tx.clone(),
        );
        Ok(ticket)
    }

    pub fn export_in_flight(&self) -> bool {
        self.coordinator.in_flight().is_some()
    }

    /// `true` until every started export, including abandoned ones, has reported back.
    pub fn export_busy(&self) -> bool {
        self.coordinator.is_busy()
    }

    /// Drain finished exports without blocking.
    pub fn poll(&mut self) -> Vec<ExportStatus> {
        let mut statuses = Vec::new();
        while let Ok(outcome) = self.job_rx.try_recv() {
            statuses.push(self.settle(outcome));
        }
        statuses
    }

    /// Block until the pending export settles or `timeout` elapses.
    ///
    /// Superseded results are skipped while a live export is still running; with only an
    /// abandoned export pending, its `Superseded` status is returned.
    pub fn wait_for_export(&mut self, timeout: Duration) -> Option<ExportStatus> {
        let deadline = Instant::now() + timeout;
        while self.export_busy() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let outcome = self.job_rx.recv_timeout(remaining).ok()?;
            match self.settle(outcome) {
                ExportStatus::Superseded { .. } if self.export_in_flight() => continue,
                status => return Some(status),
            }
        }
        None
    }

    fn settle(&mut self, outcome: ExportOutcome) -> ExportStatus {
        let current = self.current_key();
        self.coordinator.complete(outcome, current)
    }

    /// Asset for the current crop, if one has been exported.
    pub fn cached_asset(&self) -> Option<&ExportedAsset> {
        self.current_key()
            .and_then(|key| self.coordinator.cached(key))
    }

    /// Live preview markup; the headshot is positioned with CSS.
    pub fn preview_html(&self) -> String {
        let snapshot = self.snapshot();
        let headshot = self
            .source
            .as_ref()
            .map(|source| source.preview_src.as_str())
            .or_else(|| Some(snapshot.record.headshot_url.as_str()).filter(|url| !url.is_empty()));
        self.render(&snapshot, headshot, RenderTarget::Preview)
    }

    /// Paste-ready email artifact with a pre-cropped headshot.
    pub fn email_artifact(&self) -> SignatureArtifact {
        let snapshot = self.snapshot();
        let mut warnings = Vec::new();
        let headshot = self.email_headshot(&snapshot, &mut warnings);
        let html = self.render(&snapshot, headshot.as_ref().map(|r| r.url.as_str()), RenderTarget::Email);
        SignatureArtifact {
            html,
            plain_text: render_plain_text(&snapshot.record),
            warnings,
        }
    }

    fn email_headshot(
        &self,
        snapshot: &Snapshot,
        warnings: &mut Vec<String>,
    ) -> Option<RemoteAssetReference> {
        let record = &snapshot.record;
        if !record.show_headshot {
            return None;
        }
        if let Some(asset) = self.cached_asset() {
            warnings.extend(asset.warnings.iter().cloned());
            return Some(asset.reference.clone());
        }

        let params = snapshot.crop_parameters();
        if !record.headshot_url.is_empty() {
            let url = self.settings.remote.build(&record.headshot_url, &params);
            let precropped = url != record.headshot_url;
            if !precropped {
                warnings.push(
                    "Headshot URL is not on the image transform service; email clients will show it uncropped."
                        .to_string(),
                );
            }
            return Some(RemoteAssetReference {
                url,
                key: ExportKey {
                    params,
                    source_generation: 0,
                },
                origin: AssetOrigin::RemoteTransform,
                precropped,
            });
        }

        if self.source.is_some() {
            warnings.push("Headshot has not been exported yet; it is left out of the email signature.".to_string());
        }
        None
    }

    fn render(&self, snapshot: &Snapshot, headshot: Option<&str>, target: RenderTarget) -> String {
        let record = &snapshot.record;
        let logo_src = match record.logo {
            LogoMode::Show => Some(
                self.settings
                    .remote
                    .logo_url(record.headshot.container_size),
            ),
            LogoMode::None => None,
        };
        let input = RenderInput {
            record,
            theme: &self.settings.theme,
            headshot_src: headshot,
            logo: logo_src.as_deref().map(|src| LogoImage {
                src,
                alt: &self.settings.logo_alt,
            }),
        };
        render_html(&input, target)
    }
}
