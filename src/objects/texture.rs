use crate::error::{AppError, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, Rgb, RgbaImage};
use std::fmt;
use std::io::Cursor;

/// Image encoded as a `data:image/...;base64,` URL.
#[derive(Clone, PartialEq, Eq)]
pub struct TextureUrl(String);

impl TextureUrl {
    pub fn encode_png(image: &RgbaImage) -> Result<Self> {
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageFormat::Png)?;
        Ok(Self(format!(
            "data:image/png;base64,{}",
            STANDARD.encode(bytes.into_inner())
        )))
    }

    pub fn parse(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        Self::payload(&url)?;
        Ok(Self(url))
    }

    fn payload(url: &str) -> Result<&str> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| AppError::DataUrl("missing data: scheme".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| AppError::DataUrl("missing payload".to_string()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| AppError::DataUrl(format!("{header} is not base64")))?;
        if !mime.starts_with("image/") {
            return Err(AppError::DataUrl(format!("{mime} is not an image")));
        }
        Ok(payload)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn decode(&self) -> Result<RgbaImage> {
        let bytes = STANDARD.decode(Self::payload(&self.0)?)?;
        Ok(image::load_from_memory(&bytes)?.to_rgba8())
    }
}

// Payload can be megabytes, keep logs short.
impl fmt::Debug for TextureUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head: String = self.0.chars().take(32).collect();
        write!(f, "TextureUrl({head}… {} bytes)", self.0.len())
    }
}

// Края [0, 1] остаются на своей стороне текстуры
fn wrap(t: f64) -> f64 {
    if (0.0..=1.0).contains(&t) {
        t
    } else {
        t.rem_euclid(1.0)
    }
}

/// Diffuse texture sampled by the rasterizer.
#[derive(Clone)]
pub struct Texture {
    image: RgbaImage,
}

impl Texture {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn from_url(url: &TextureUrl) -> Result<Self> {
        Ok(Self::new(url.decode()?))
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Nearest-texel lookup with repeat wrapping. `(0, 0)` is the top-left corner.
    pub fn sample(&self, u: f64, v: f64) -> Rgb<u8> {
        let (width, height) = self.image.dimensions();
        if width == 0 || height == 0 {
            return Rgb([0, 0, 0]);
        }
        let x = ((wrap(u) * width as f64) as u32).min(width - 1);
        let y = ((wrap(v) * height as f64) as u32).min(height - 1);
        let [r, g, b, _] = self.image.get_pixel(x, y).0;
        Rgb([r, g, b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checker() -> RgbaImage {
        RgbaImage::from_fn(4, 2, |x, _| {
            if x < 2 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        })
    }

    #[test]
    fn png_data_url_decodes_back() {
        let url = TextureUrl::encode_png(&checker()).unwrap();
        assert!(url.as_str().starts_with("data:image/png;base64,"));
        assert_eq!(url.decode().unwrap(), checker());
    }

    #[test]
    fn rejects_non_image_urls() {
        assert!(TextureUrl::parse("https://example.com/a.png").is_err());
        assert!(TextureUrl::parse("data:text/plain;base64,aGVsbG8=").is_err());
        assert!(TextureUrl::parse("data:image/png,rawbytes").is_err());
        assert!(TextureUrl::parse("data:image/png;base64,%%%").unwrap().decode().is_err());
    }

    #[test]
    fn sampling_wraps() {
        let texture = Texture::new(checker());
        assert_eq!(texture.sample(0.1, 0.5), Rgb([255, 0, 0]));
        assert_eq!(texture.sample(0.9, 0.5), Rgb([0, 0, 255]));
        assert_eq!(texture.sample(1.1, 0.5), Rgb([255, 0, 0]));
        assert_eq!(texture.sample(-0.1, 0.5), Rgb([0, 0, 255]));
        // Right and bottom edges stay on their own side
        assert_eq!(texture.sample(1.0, 1.0), Rgb([0, 0, 255]));
        assert_eq!(texture.sample(2.25, 0.5), Rgb([255, 0, 0]));
    }
}
