//! Signature markup.
//!
//! Both targets share one table layout: headshot cell, optional vertical logo cell, a 3px
//! accent divider and the text block. The preview positions the full headshot with CSS; the
//! email target expects an already cropped image because mail clients drop clipping styles.

use sigframe_utils::{SignatureRecord, ThemeSettings};

use crate::geometry::{CropParameters, preview_container_declarations, preview_image_declarations};

/// Which surface the markup is produced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderTarget {
    /// Browser preview: tighter spacing, CSS-positioned headshot.
    Preview,
    /// Clipboard/email artifact: looser spacing, pre-cropped headshot.
    Email,
}

struct Spacing {
    title_padding: &'static str,
    name_margin: &'static str,
    row_padding: &'static str,
}

impl RenderTarget {
    fn spacing(self) -> Spacing {
        match self {
            RenderTarget::Preview => Spacing {
                title_padding: "10px",
                name_margin: "0px",
                row_padding: "2px",
            },
            RenderTarget::Email => Spacing {
                title_padding: "18px",
                name_margin: "2px",
                row_padding: "5px",
            },
        }
    }
}

/// Image shown in the vertical logo column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoImage<'a> {
    pub src: &'a str,
    pub alt: &'a str,
}

/// Everything the renderer reads; borrowed from a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub record: &'a SignatureRecord,
    pub theme: &'a ThemeSettings,
    /// Headshot URL. For [`RenderTarget::Email`] it must already be cropped to the container.
    pub headshot_src: Option<&'a str>,
    pub logo: Option<LogoImage<'a>>,
}

/// Paste-ready signature.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignatureArtifact {
    pub html: String,
    pub plain_text: String,
    /// Non-fatal problems hit while producing the artifact.
    pub warnings: Vec<String>,
}

/// Render the signature table for `target`.
pub fn render_html(input: &RenderInput<'_>, target: RenderTarget) -> String {
    let record = input.record;
    let theme = input.theme;
    let params = CropParameters::from(&record.headshot);
    let size = params.container_size;
    let spacing = target.spacing();
    let accent = theme.accent.to_css_hex();

    let mut html = String::new();
    html.push_str(&format!(
        r#"<div style="font-family: {}; color: {}; line-height: 1.4">"#,
        escape(&theme.font_family),
        theme.text_color.to_css_hex()
    ));
    html.push_str(
        r#"<table cellpadding="0" cellspacing="0" border="0" style="border-collapse: collapse"><tbody><tr>"#,
    );

    if let Some(src) = input.headshot_src.filter(|src| record.show_headshot && !src.is_empty()) {
        html.push_str(r#"<td style="padding-right: 10px; vertical-align: top">"#);
        match target {
            RenderTarget::Preview => {
                html.push_str(&format!(
                    r#"<div style="{}"><img src="{}" alt="{}" style="{}"></div>"#,
                    style(&preview_container_declarations(&params)),
                    escape(src),
                    escape(&record.full_name),
                    style(&preview_image_declarations(&params))
                ));
            }
            RenderTarget::Email => {
                let mut declarations = vec![
                    ("width", format!("{size}px")),
                    ("height", format!("{size}px")),
                    ("display", "block".to_string()),
                    ("border", "0".to_string()),
                ];
                declarations.extend(params.shape.mask().css_declarations());
                html.push_str(&format!(
                    r#"<img src="{}" alt="{}" width="{size}" height="{size}" style="{}">"#,
                    escape(src),
                    escape(&record.full_name),
                    style(&declarations)
                ));
            }
        }
        html.push_str("</td>");
    }

    if let Some(logo) = input.logo {
        html.push_str(&format!(
            r#"<td style="padding: 0; vertical-align: top"><img src="{}" alt="{}" height="{size}" style="height: {size}px; width: auto; display: block; border: 0"></td>"#,
            escape(logo.src),
            escape(logo.alt)
        ));
    }

    html.push_str(&format!(
        r#"<td style="width: 3px; padding: 0; background-color: {accent}"><div style="width: 3px; height: {size}px; background-color: {accent}"></div></td>"#
    ));

    html.push_str(r#"<td style="vertical-align: top; padding-left: 10px">"#);
    html.push_str(r#"<table cellpadding="0" cellspacing="0" border="0"><tbody>"#);
    html.push_str(&format!(
        r#"<tr><td style="padding-bottom: {}"><strong style="font-size: 18px; color: {}; display: block; font-weight: 900; margin-bottom: {}">{}</strong><span style="font-size: 14px; color: {accent}; font-weight: bold; text-transform: uppercase; letter-spacing: 0.5px">{}</span></td></tr>"#,
        spacing.title_padding,
        theme.name_color.to_css_hex(),
        spacing.name_margin,
        escape(&record.full_name),
        escape(&record.title)
    ));

    for row in contact_rows(record) {
        // The address row never carries bottom padding.
        let padding = if row.href.is_none() {
            String::new()
        } else {
            format!("; padding-bottom: {}", spacing.row_padding)
        };
        html.push_str(&format!(
            r#"<tr><td style="font-size: 13px; color: {}{padding}"><span style="color: {accent}; font-weight: bold">{}:</span> "#,
            theme.muted_color.to_css_hex(),
            row.label
        ));
        match &row.href {
            Some(href) => {
                html.push_str(&format!(
                    r#"<a href="{}" style="color: {}; text-decoration: none">{}</a>"#,
                    escape(href),
                    theme.text_color.to_css_hex(),
                    escape(row.value)
                ));
            }
            None => html.push_str(&escape(row.value)),
        }
        html.push_str("</td></tr>");
    }

    html.push_str("</tbody></table></td></tr></tbody></table></div>");
    html
}

/// Text fallback placed next to the HTML on the clipboard.
pub fn render_plain_text(record: &SignatureRecord) -> String {
    let mut lines = Vec::new();
    for value in [&record.full_name, &record.title] {
        if !value.trim().is_empty() {
            lines.push(value.trim().to_string());
        }
    }
    for row in contact_rows(record) {
        lines.push(format!("{}: {}", row.label, row.value));
    }
    lines.join("\n")
}

struct ContactRow<'a> {
    label: &'static str,
    value: &'a str,
    href: Option<String>,
}

/// Phone, email, website and address, skipping empty fields.
fn contact_rows(record: &SignatureRecord) -> Vec<ContactRow<'_>> {
    let candidates = [
        ("P", record.phone.trim(), Some("tel:")),
        ("E", record.email.trim(), Some("mailto:")),
        ("W", record.website.trim(), Some("https://")),
        ("A", record.address.trim(), None),
    ];
    candidates
        .into_iter()
        .filter(|(_, value, _)| !value.is_empty())
        .map(|(label, value, scheme)| ContactRow {
            label,
            value,
            href: scheme.map(|scheme| format!("{scheme}{value}")),
        })
        .collect()
}

fn style(declarations: &[(&str, String)]) -> String {
    let joined = declarations
        .iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect::<Vec<_>>()
        .join("; ");
    escape(&joined)
}

/// Escape text for element content and double-quoted attributes.
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
