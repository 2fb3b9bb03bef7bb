use std::path::Path;

use chrono::NaiveDate;
use mime::Mime;
use serde::Deserialize;

/// Header block shown above the invoice items.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientDetails {
    pub client: Option<String>,
    pub address: Option<String>,
    pub invoice: Option<String>,
    pub date_issued: Option<String>,
    pub logo: Option<String>,
}

impl ClientDetails {
    /// Empty header for a hand-filled invoice, dated `issued`.
    pub fn blank(issued: NaiveDate) -> Self {
        Self {
            date_issued: Some(issued.format("%Y-%m-%d").to_string()),
            ..Self::default()
        }
    }

    /// Use `path` as the client logo if it names an image file.
    ///
    /// Returns false and leaves the header untouched for anything else.
    pub fn import_logo(&mut self, path: &str) -> bool {
        let path = path.trim();
        match image_mime(Path::new(path)) {
            Some(mime) => {
                tracing::info!(%mime, path, "client logo imported");
                self.logo = Some(path.to_string());
                true
            }
            None => {
                tracing::warn!(path, "ignoring logo that is not an image");
                false
            }
        }
    }
}

// Guess an image MIME type from the file extension
fn image_mime(path: &Path) -> Option<Mime> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => mime::IMAGE_PNG,
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "gif" => mime::IMAGE_GIF,
        "bmp" => mime::IMAGE_BMP,
        "svg" => mime::IMAGE_SVG,
        "webp" => "image/webp".parse().ok()?,
        _ => return None,
    };

    (mime.type_() == mime::IMAGE).then_some(mime)
}
