//! Error types shared by the map widget, the texture pipeline and startup.

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Required environment variable is absent or blank
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    /// Environment variable could not be parsed
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidVar {
        key: &'static str,
        value: String,
        reason: String,
    },

    /// Style identifier is not a `mapbox://styles/{owner}/{id}` URL
    #[error("unsupported style url: {0}")]
    StyleUrl(String),

    /// HTTP request to the map provider failed
    #[error("request to {url} failed: {reason}")]
    Http { url: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    /// Texture source is not a base64 image data URL
    #[error("malformed data url: {0}")]
    DataUrl(String),

    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("geocoding response error: {0}")]
    Geocoding(#[from] serde_json::Error),

    #[error("window error: {0}")]
    Window(String),
}

// Query strings carry the access token, so only the path is kept.
fn strip_query(url: &str) -> String {
    url.split('?').next().unwrap_or_default().to_string()
}

impl From<ureq::Error> for AppError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, response) => AppError::Http {
                url: strip_query(response.get_url()),
                reason: format!("status code {code}"),
            },
            ureq::Error::Transport(transport) => AppError::Http {
                url: transport
                    .url()
                    .map(|url| strip_query(url.as_str()))
                    .unwrap_or_default(),
                reason: match transport.message() {
                    Some(message) => format!("{}: {message}", transport.kind()),
                    None => transport.kind().to_string(),
                },
            },
        }
    }
}

impl From<eframe::Error> for AppError {
    fn from(err: eframe::Error) -> Self {
        AppError::Window(err.to_string())
    }
}
