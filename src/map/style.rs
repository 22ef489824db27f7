use crate::error::{AppError, Result};
use std::fmt;

const STYLE_SCHEME: &str = "mapbox://styles/";
const API_ROOT: &str = "https://api.mapbox.com";

/// Versioned style identifier understood by the map provider,
/// e.g. `mapbox://styles/mapbox/dark-v12`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StyleUrl(String);

impl StyleUrl {
    pub fn parse(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix(STYLE_SCHEME)
            .ok_or_else(|| AppError::StyleUrl(url.to_string()))?;
        match rest.split_once('/') {
            Some((owner, id)) if !owner.is_empty() && !id.is_empty() && !id.contains('/') => {
                Ok(Self(url.to_string()))
            }
            _ => Err(AppError::StyleUrl(url.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `owner/id` part of the identifier.
    fn path(&self) -> &str {
        &self.0[STYLE_SCHEME.len()..]
    }

    /// Raster tile endpoint for this style, without the credential.
    pub fn tile_url(&self, z: u8, x: u32, y: u32, tile_size: u32) -> String {
        let (owner, id) = self.path().split_once('/').unwrap_or(("mapbox", self.path()));
        format!("{API_ROOT}/styles/v1/{owner}/{id}/tiles/{tile_size}/{z}/{x}/{y}")
    }
}

impl fmt::Display for StyleUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The fixed set of basemaps offered by the style buttons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BasemapStyle {
    #[default]
    Satellite,
    Streets,
    Outdoors,
    Dark,
    Light,
}

impl BasemapStyle {
    pub const ALL: [BasemapStyle; 5] = [
        BasemapStyle::Satellite,
        BasemapStyle::Streets,
        BasemapStyle::Outdoors,
        BasemapStyle::Dark,
        BasemapStyle::Light,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BasemapStyle::Satellite => "Satellite",
            BasemapStyle::Streets => "Streets",
            BasemapStyle::Outdoors => "Outdoors",
            BasemapStyle::Dark => "Dark",
            BasemapStyle::Light => "Light",
        }
    }

    /// Satellite imagery is only published as v9; the vector basemaps as v12.
    fn style_id(self) -> &'static str {
        match self {
            BasemapStyle::Satellite => "satellite-v9",
            BasemapStyle::Streets => "streets-v12",
            BasemapStyle::Outdoors => "outdoors-v12",
            BasemapStyle::Dark => "dark-v12",
            BasemapStyle::Light => "light-v12",
        }
    }

    pub fn style_url(self) -> StyleUrl {
        StyleUrl(format!("{STYLE_SCHEME}mapbox/{}", self.style_id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn basemaps_resolve_to_versioned_ids() {
        let urls: Vec<String> = BasemapStyle::ALL
            .iter()
            .map(|s| s.style_url().to_string())
            .collect();
        assert_eq!(
            urls,
            vec![
                "mapbox://styles/mapbox/satellite-v9",
                "mapbox://styles/mapbox/streets-v12",
                "mapbox://styles/mapbox/outdoors-v12",
                "mapbox://styles/mapbox/dark-v12",
                "mapbox://styles/mapbox/light-v12",
            ]
        );
    }

    #[test]
    fn tile_url_uses_owner_and_id() {
        let url = BasemapStyle::Dark.style_url().tile_url(12, 1205, 1540, 256);
        assert_eq!(
            url,
            "https://api.mapbox.com/styles/v1/mapbox/dark-v12/tiles/256/12/1205/1540"
        );
    }

    #[test]
    fn parse_accepts_only_style_urls() {
        assert!(StyleUrl::parse("mapbox://styles/someone/custom-abc").is_ok());
        assert!(StyleUrl::parse("https://example.com/style.json").is_err());
        assert!(StyleUrl::parse("mapbox://styles/mapbox").is_err());
        assert!(StyleUrl::parse("mapbox://styles/a/b/c").is_err());
    }
}
