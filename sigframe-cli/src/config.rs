//! Configuration loading and CLI override logic.

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{info, warn};
use sigframe_utils::{
    config::{AppSettings, default_settings_path},
    RgbaColor, normalize_path,
};

use crate::args::SignatureArgs;

/// Load application settings from a file or use defaults.
pub fn load_settings(config_path: Option<&PathBuf>) -> Result<AppSettings> {
    if let Some(path) = config_path {
        let resolved = normalize_path(path)?;
        let settings = AppSettings::load_from_path(&resolved)?;
        info!("Loaded settings from {}", resolved.display());
        Ok(settings)
    } else {
        let default_path = default_settings_path();
        if default_path.exists() {
            let settings = AppSettings::load_from_path(&default_path).with_context(|| {
                format!(
                    "failed to load default settings from {}",
                    default_path.display()
                )
            })?;
            info!("Loaded settings from {}", default_path.display());
            Ok(settings)
        } else {
            Ok(AppSettings::default())
        }
    }
}

/// Apply command-line arguments on top of loaded or default settings.
pub fn apply_cli_overrides(settings: &mut AppSettings, args: &SignatureArgs) {
    if args.telemetry {
        settings.telemetry.enabled = true;
    }
    if let Some(level) = args.telemetry_level.as_ref() {
        let normalized = level.trim();
        if !normalized.is_empty() {
            let lower = normalized.to_ascii_lowercase();
            settings.telemetry.level = lower.clone();
            if lower == "off" {
                settings.telemetry.enabled = false;
            }
        }
    }

    let record = &mut settings.record;
    let text_fields = [
        (&args.full_name, &mut record.full_name),
        (&args.title, &mut record.title),
        (&args.email, &mut record.email),
        (&args.phone, &mut record.phone),
        (&args.website, &mut record.website),
        (&args.address, &mut record.address),
        (&args.headshot_url, &mut record.headshot_url),
    ];
    for (value, field) in text_fields {
        if let Some(value) = value {
            *field = value.trim().to_string();
        }
    }
    if let Some(logo) = args.logo {
        record.logo = logo;
    }
    if args.no_headshot {
        record.show_headshot = false;
    }

    let headshot = &mut record.headshot;
    if let Some(size) = args.size {
        headshot.container_size = size;
    }
    if let Some(scale) = args.scale {
        headshot.image_scale = scale;
    }
    if let Some(x) = args.x {
        headshot.x = x;
    }
    if let Some(y) = args.y {
        headshot.y = y;
    }
    if let Some(shape) = args.shape {
        headshot.shape = shape;
    }
    record.sanitize();

    if let Some(format) = args.format.as_ref() {
        settings.export.format = format.trim().to_ascii_lowercase();
    }
    if let Some(quality) = args.jpeg_quality {
        settings.export.jpeg_quality = quality.clamp(1, 100);
    }
    if let Some(fill) = args.fill_color.as_ref() {
        match fill.parse::<RgbaColor>() {
            Ok(color) => settings.export.fill_color = color,
            Err(err) => warn!("failed to parse --fill-color '{fill}': {err}"),
        }
    }
    if args.bake_mask {
        settings.export.bake_mask = true;
    }

    let upload = &mut settings.upload;
    if let Some(provider) = args.upload {
        upload.provider = provider;
    }
    if let Some(dir) = args.upload_dir.as_ref() {
        upload.directory = Some(dir.clone());
    }
    if let Some(base) = args.public_base_url.as_ref() {
        upload.public_base_url = base.trim().to_string();
    }
    if let Some(cloud) = args.cloud_name.as_ref() {
        upload.cloud_name = cloud.trim().to_string();
    }
    if let Some(preset) = args.upload_preset.as_ref() {
        upload.upload_preset = preset.trim().to_string();
    }
    upload.timeout_secs = upload.timeout_secs.max(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use sigframe_utils::{LogoMode, ShapeId, UploadProvider};

    fn parse(args: &[&str]) -> SignatureArgs {
        SignatureArgs::parse_from(std::iter::once("sigframe").chain(args.iter().copied()))
    }

    #[test]
    fn overrides_replace_record_and_crop_fields() {
        let args = parse(&[
            "--full-name",
            " Ada Lovelace ",
            "--phone",
            "",
            "--logo",
            "none",
            "--scale",
            "500",
            "-x",
            "20",
            "--shape",
            "Hexagon",
        ]);
        let mut settings = AppSettings::default();
        apply_cli_overrides(&mut settings, &args);

        assert_eq!(settings.record.full_name, "Ada Lovelace");
        assert!(settings.record.phone.is_empty());
        assert_eq!(settings.record.logo, LogoMode::None);
        assert_eq!(settings.record.headshot.image_scale, 300);
        assert_eq!(settings.record.headshot.x, 20);
        assert_eq!(settings.record.headshot.y, 50);
        assert_eq!(settings.record.headshot.shape, ShapeId::Hexagon);
    }

    #[test]
    fn export_and_upload_overrides() {
        let args = parse(&[
            "--format",
            "PNG",
            "--fill-color",
            "#000",
            "--bake-mask",
            "--upload",
            "directory",
            "--upload-dir",
            "/srv/www/heads",
            "--public-base-url",
            "https://cdn.example.com/heads",
        ]);
        let mut settings = AppSettings::default();
        apply_cli_overrides(&mut settings, &args);

        assert_eq!(settings.export.format, "png");
        assert_eq!(settings.export.fill_color, RgbaColor::BLACK);
        assert!(settings.export.bake_mask);
        assert_eq!(settings.upload.provider, UploadProvider::Directory);
        assert_eq!(
            settings.upload.directory.as_deref(),
            Some(std::path::Path::new("/srv/www/heads"))
        );
    }

    #[test]
    fn bad_fill_color_keeps_setting() {
        let args = parse(&["--fill-color", "not-a-color"]);
        let mut settings = AppSettings::default();
        apply_cli_overrides(&mut settings, &args);
        assert_eq!(settings.export.fill_color, RgbaColor::WHITE);
    }

    #[test]
    fn telemetry_level_off_disables() {
        let args = parse(&["--telemetry", "--telemetry-level", "OFF"]);
        let mut settings = AppSettings::default();
        apply_cli_overrides(&mut settings, &args);
        assert!(!settings.telemetry.enabled);
        assert_eq!(settings.telemetry.level, "off");
    }
}
