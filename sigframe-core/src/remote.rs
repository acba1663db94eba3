//! Server-side crop URLs for hosted headshots.
//!
//! Email clients ignore `overflow: hidden`, so the email artifact asks the image service to
//! pre-crop the headshot. The transform segment is inserted right after `/upload/`.

use log::debug;
use sigframe_utils::RemoteSettings;
use url::Url;

use crate::geometry::CropParameters;

const UPLOAD_SEGMENT: &str = "/upload/";

/// Rewrites hosted image URLs into crop-transform URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCropUrlBuilder {
    host_suffix: String,
    logo_url: String,
}

impl RemoteCropUrlBuilder {
    pub fn new(host_suffix: impl Into<String>) -> Self {
        Self {
            host_suffix: host_suffix.into().trim().trim_start_matches('.').to_ascii_lowercase(),
            logo_url: String::new(),
        }
    }

    pub fn from_settings(settings: &RemoteSettings) -> Self {
        Self {
            logo_url: settings.logo_url.clone(),
            ..Self::new(settings.host_suffix.as_str())
        }
    }

    /// `true` when `remote_url` is an absolute URL on the configured service.
    pub fn matches_host(&self, remote_url: &str) -> bool {
        if self.host_suffix.is_empty() {
            return false;
        }
        let Ok(parsed) = Url::parse(remote_url) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        host == self.host_suffix
            || host
                .strip_suffix(self.host_suffix.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    }

    /// Build the transform URL reproducing `params` server-side.
    ///
    /// URLs on other hosts, or without exactly one `/upload/` segment, come back unchanged.
    ///
    /// ```rust
    /// # use sigframe_core::{geometry::CropParameters, remote::RemoteCropUrlBuilder};
    /// # use sigframe_utils::ShapeId;
    /// let builder = RemoteCropUrlBuilder::new("cloudinary.com");
    /// let params = CropParameters::new(135, 150, 50, 50, ShapeId::Circle);
    /// let url = builder.build("https://res.cloudinary.com/demo/image/upload/v1/me.jpg", &params);
    /// assert_eq!(
    ///     url,
    ///     "https://res.cloudinary.com/demo/image/upload/c_fill,w_135,h_135,g_xy_center,x_0,y_0,z_1.5/v1/me.jpg"
    /// );
    /// ```
    pub fn build(&self, remote_url: &str, params: &CropParameters) -> String {
        if !self.matches_host(remote_url) {
            debug!("Leaving non-transformable headshot URL untouched");
            return remote_url.to_string();
        }
        let parts: Vec<&str> = remote_url.split(UPLOAD_SEGMENT).collect();
        let [prefix, rest] = parts.as_slice() else {
            debug!(
                "Headshot URL has {} upload segments; leaving untouched",
                parts.len().saturating_sub(1)
            );
            return remote_url.to_string();
        };

        let size = params.container_size;
        let scale = params.zoom();
        let (x, y) = window_offsets(params);
        format!(
            "{prefix}{UPLOAD_SEGMENT}c_fill,w_{size},h_{size},g_xy_center,x_{x},y_{y},z_{scale}/{rest}"
        )
    }

    /// Vertical logo cell image, rotated and fitted to the headshot height.
    ///
    /// Falls back to the plain asset when it is not hosted on the transform service.
    pub fn logo_url(&self, height: u32) -> String {
        if !self.matches_host(&self.logo_url) {
            return self.logo_url.clone();
        }
        match self.logo_url.split_once(UPLOAD_SEGMENT) {
            Some((prefix, rest)) => {
                format!("{prefix}{UPLOAD_SEGMENT}a_270,h_{height},c_fit/{rest}")
            }
            None => self.logo_url.clone(),
        }
    }
}

impl Default for RemoteCropUrlBuilder {
    fn default() -> Self {
        Self::from_settings(&RemoteSettings::default())
    }
}

/// Crop window offsets in source pixels.
///
/// `crop_size` is the inverse-scaled window; positions map linearly onto the slack between
/// the window and the container.
fn window_offsets(params: &CropParameters) -> (i64, i64) {
    let size = f64::from(params.container_size);
    let crop_size = (size / params.zoom()).round();
    let max_offset = (crop_size - size).max(0.0);
    let offset = |position: u8| (f64::from(position) / 100.0 * max_offset).round() as i64;
    (offset(params.position_x), offset(params.position_y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigframe_utils::ShapeId;

    const HOSTED: &str = "https://res.cloudinary.com/demo/image/upload/v1700000000/team/jane.png";

    fn params(size: u32, scale: u32, x: u32, y: u32) -> CropParameters {
        CropParameters::new(size, scale, x, y, ShapeId::Circle)
    }

    #[test]
    fn injects_transform_after_upload_segment() {
        let builder = RemoteCropUrlBuilder::new("cloudinary.com");
        let url = builder.build(HOSTED, &params(135, 100, 50, 50));
        assert_eq!(
            url,
            "https://res.cloudinary.com/demo/image/upload/c_fill,w_135,h_135,g_xy_center,x_0,y_0,z_1/v1700000000/team/jane.png"
        );
    }

    #[test]
    fn zoomed_window_never_has_slack() {
        // crop_size <= size whenever scale >= 1, so offsets collapse to zero.
        let builder = RemoteCropUrlBuilder::new("cloudinary.com");
        let url = builder.build(HOSTED, &params(120, 250, 0, 100));
        assert!(url.contains("c_fill,w_120,h_120,g_xy_center,x_0,y_0,z_2.5/"), "{url}");
    }

    #[test]
    fn foreign_hosts_are_untouched() {
        let builder = RemoteCropUrlBuilder::new("cloudinary.com");
        for url in [
            "https://images.example.com/upload/me.jpg",
            "https://cloudinary.com.evil.test/upload/me.jpg",
            "https://notcloudinary.com/upload/me.jpg",
            "data:image/jpeg;base64,AAAA",
            "not a url",
            "",
        ] {
            assert_eq!(builder.build(url, &params(135, 150, 10, 90)), url);
        }
    }

    #[test]
    fn requires_exactly_one_upload_segment() {
        let builder = RemoteCropUrlBuilder::new("cloudinary.com");
        let none = "https://res.cloudinary.com/demo/image/fetch/me.jpg";
        let two = "https://res.cloudinary.com/demo/image/upload/a/upload/me.jpg";
        assert_eq!(builder.build(none, &params(135, 150, 50, 50)), none);
        assert_eq!(builder.build(two, &params(135, 150, 50, 50)), two);
    }

    #[test]
    fn host_match_is_case_insensitive_and_accepts_apex() {
        let builder = RemoteCropUrlBuilder::new(".Cloudinary.com");
        assert!(builder.matches_host("https://RES.CLOUDINARY.COM/x/upload/y.jpg"));
        assert!(builder.matches_host("https://cloudinary.com/x/upload/y.jpg"));
        assert!(!RemoteCropUrlBuilder::new("").matches_host(HOSTED));
    }

    #[test]
    fn logo_url_rotates_and_fits_height() {
        let builder = RemoteCropUrlBuilder::default();
        assert_eq!(
            builder.logo_url(135),
            "https://res.cloudinary.com/dippj70ao/image/upload/a_270,h_135,c_fit/v1763925891/skyhi-og-image-black_iychjj.png"
        );
    }

    #[test]
    fn window_offsets_follow_positions() {
        assert_eq!(window_offsets(&params(135, 100, 0, 100)), (0, 0));
        assert_eq!(window_offsets(&params(135, 300, 50, 50)), (0, 0));
    }
}
