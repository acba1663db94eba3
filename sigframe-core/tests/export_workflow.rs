use std::{fs, io::Cursor, path::PathBuf, sync::Arc, time::Duration};

use image::{ImageFormat, Rgba, RgbaImage};
use sigframe_core::{
    AssetOrigin, ExportStatus, SignatureSession, UploadError, Uploader,
};
use sigframe_utils::{AppSettings, LogoMode, ShapeId};
use tempfile::tempdir;

/// Writes uploads into a directory and serves them from a fixed base URL.
struct FolderUploader {
    root: PathBuf,
}

impl Uploader for FolderUploader {
    fn upload(&self, bytes: &[u8], filename: &str) -> Result<String, UploadError> {
        fs::write(self.root.join(filename), bytes)?;
        Ok(format!("https://assets.example.org/{filename}"))
    }

    fn name(&self) -> &str {
        "folder"
    }
}

fn portrait_png() -> Vec<u8> {
    let img = RgbaImage::from_fn(300, 450, |x, y| {
        Rgba([(x % 251) as u8, (y % 241) as u8, 200, 255])
    });
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png).unwrap();
    buffer.into_inner()
}

#[test]
fn export_uploads_cropped_raster_and_renders_email() {
    let dir = tempdir().unwrap();
    let mut settings = AppSettings::default();
    settings.record.headshot.image_scale = 160;
    settings.record.headshot.shape = ShapeId::Squircle;
    settings.export.format = "png".into();
    settings.export.bake_mask = true;

    let uploader = Arc::new(FolderUploader {
        root: dir.path().to_path_buf(),
    });
    let mut session = SignatureSession::from_app_settings(&settings, Some(uploader));
    session.load_source(&portrait_png()).unwrap();

    let ticket = session.begin_export().unwrap();
    let status = session
        .wait_for_export(Duration::from_secs(30))
        .expect("export settles");
    let reference = match status {
        ExportStatus::Applied { reference, .. } => reference,
        other => panic!("unexpected status {other:?}"),
    };
    assert_eq!(reference.origin, AssetOrigin::Uploaded);
    assert!(reference.precropped);

    let file = dir.path().join(format!("headshot-{}.png", ticket.request_id));
    let written = image::open(&file).unwrap().to_rgba8();
    assert_eq!(written.dimensions(), (135, 135));
    // Squircle corners are clipped into transparency.
    assert_eq!(written.get_pixel(0, 0)[3], 0);
    assert_eq!(written.get_pixel(67, 67)[3], 255);

    let artifact = session.email_artifact();
    assert!(artifact.warnings.is_empty(), "{:?}", artifact.warnings);
    assert!(artifact.html.contains(&reference.url));
    assert!(artifact.html.contains("border-radius: 25%"));
    assert!(artifact.html.contains("a_270,h_135,c_fit"));
    assert!(artifact.plain_text.starts_with("John Doe\nAI Solutions Engineer"));
}

#[test]
fn preview_shows_uncropped_source_with_css_offsets() {
    let mut settings = AppSettings::default();
    settings.record.logo = LogoMode::None;
    let mut session = SignatureSession::from_app_settings(&settings, None);
    session.load_source(&portrait_png()).unwrap();
    session.update_record(|record| {
        record.headshot.x = 30;
        record.headshot.y = 55;
    });

    let html = session.preview_html();
    assert!(html.contains("data:image/png;base64,"));
    assert!(html.contains("left: -100px"));
    assert!(html.contains("top: 25px"));
    assert!(!html.contains("a_270"));
}

#[test]
fn retry_after_stale_result_issues_new_request() {
    let mut session = SignatureSession::from_app_settings(&AppSettings::default(), None);
    session.load_source(&portrait_png()).unwrap();

    let first = session.begin_export().unwrap();
    session.update_record(|record| record.headshot.image_scale = 250);
    let status = session
        .wait_for_export(Duration::from_secs(30))
        .expect("first export settles");
    assert_eq!(status.request_id(), first.request_id);

    let second = session.begin_export().unwrap();
    assert!(second.request_id > first.request_id);
    let status = session
        .wait_for_export(Duration::from_secs(30))
        .expect("second export settles");
    assert!(matches!(status, ExportStatus::Applied { .. }));
    let asset = session.cached_asset().expect("cached");
    assert_eq!(asset.reference.origin, AssetOrigin::Embedded);
    assert_eq!(asset.reference.key.params.scale_percent, 250);
}
