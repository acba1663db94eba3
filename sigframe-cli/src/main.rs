mod args;
mod config;
mod upload;

use std::{
    fs,
    path::Path,
    time::Duration,
};

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use log::{info, warn};
use serde::Serialize;
use sigframe_core::{AssetOrigin, ExportStatus, SignatureSession};
use sigframe_utils::{configure_telemetry, init_logging, normalize_path};

use crate::{
    args::SignatureArgs,
    config::{apply_cli_overrides, load_settings},
    upload::build_uploader,
};

/// Summary printed to stdout after a run.
#[derive(Debug, Serialize)]
struct RunReport {
    preview: String,
    html: String,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    headshot: Option<HeadshotReport>,
    warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct HeadshotReport {
    file: String,
    url: String,
    origin: &'static str,
    width: u32,
    height: u32,
}

fn main() -> Result<()> {
    init_logging(log::LevelFilter::Info)?;
    let args = SignatureArgs::parse();

    let mut settings = load_settings(args.config.as_ref())?;
    apply_cli_overrides(&mut settings, &args);
    configure_telemetry(
        settings.telemetry.enabled,
        settings.telemetry.level_filter(),
    );

    if let Some(path) = args.save_config.as_ref() {
        settings.save_to_path(path)?;
        info!("Saved effective settings to {}", path.display());
    }

    fs::create_dir_all(&args.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            args.output_dir.display()
        )
    })?;
    let output_dir = normalize_path(&args.output_dir)?;

    let uploader = build_uploader(&settings.upload)?;
    let mut session = SignatureSession::from_app_settings(&settings, uploader);

    let headshot = match args.headshot.as_ref() {
        Some(path) => Some(export_headshot(
            &mut session,
            path,
            &output_dir,
            &settings.export.file_stem,
            Duration::from_secs(args.timeout.max(1)),
        )?),
        None => None,
    };

    let preview_path = output_dir.join("preview.html");
    write_file(&preview_path, &preview_document(&session.preview_html()))?;

    let artifact = session.email_artifact();
    let html_path = output_dir.join("signature.html");
    write_file(&html_path, &artifact.html)?;
    let text_path = output_dir.join("signature.txt");
    write_file(&text_path, &artifact.plain_text)?;

    for warning in &artifact.warnings {
        warn!("{warning}");
    }
    info!("Wrote signature files to {}", output_dir.display());

    let report = RunReport {
        preview: preview_path.display().to_string(),
        html: html_path.display().to_string(),
        text: text_path.display().to_string(),
        headshot,
        warnings: artifact.warnings,
    };
    let json = serde_json::to_string_pretty(&report).context("failed to serialize run report")?;
    println!("{json}");

    Ok(())
}

/// Load, crop, encode and publish the headshot, then keep a local copy of the raster.
fn export_headshot(
    session: &mut SignatureSession,
    path: &Path,
    output_dir: &Path,
    file_stem: &str,
    timeout: Duration,
) -> Result<HeadshotReport> {
    let path = normalize_path(path)?;
    session
        .load_source_path(&path)
        .with_context(|| format!("failed to load headshot {}", path.display()))?;

    let ticket = session.begin_export()?;
    let status = session.wait_for_export(timeout).ok_or_else(|| {
        anyhow!(
            "export request {} did not finish within {}s",
            ticket.request_id,
            timeout.as_secs()
        )
    })?;
    match status {
        ExportStatus::Applied { .. } => {}
        ExportStatus::Failed { error, .. } => {
            return Err(error).with_context(|| format!("failed to export {}", path.display()));
        }
        other => bail!(
            "export request {} was discarded ({other:?})",
            other.request_id()
        ),
    }

    let asset = session
        .cached_asset()
        .ok_or_else(|| anyhow!("export finished but produced no headshot asset"))?;
    let file = output_dir.join(asset.raster.file_name(file_stem));
    asset.raster.save(&file)?;
    info!(
        "Saved {}x{} headshot to {}",
        asset.raster.width,
        asset.raster.height,
        file.display()
    );

    let origin = match asset.reference.origin {
        AssetOrigin::Uploaded => "uploaded",
        AssetOrigin::Embedded => "embedded",
        AssetOrigin::RemoteTransform => "remote-transform",
    };
    // Inline data URIs are too long to be useful in the report.
    let url = match asset.reference.origin {
        AssetOrigin::Embedded => "data:".to_string(),
        _ => asset.reference.url.clone(),
    };
    Ok(HeadshotReport {
        file: file.display().to_string(),
        url,
        origin,
        width: asset.raster.width,
        height: asset.raster.height,
    })
}

fn preview_document(fragment: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Signature preview</title>\n</head>\n<body style=\"background-color: #FFFFFF; padding: 2rem\">\n{fragment}\n</body>\n</html>\n"
    )
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
