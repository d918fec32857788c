//! Uploaded images and where they are kept.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Upper bound on an uploaded image, in bytes.
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// Image formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Jpeg,
    Png,
    Bmp,
}

impl ImageKind {
    /// Resolve a declared MIME type. Parameters after `;` are ignored.
    pub fn from_content_type(raw: &str) -> Option<Self> {
        let essence = raw.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/bmp" | "image/x-bmp" | "image/x-ms-bmp" => Some(Self::Bmp),
            _ => None,
        }
    }

    /// Resolve a stored file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "bmp" => Some(Self::Bmp),
            _ => None,
        }
    }

    /// Canonical MIME type served back to clients.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Bmp => "image/bmp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Bmp => "bmp",
        }
    }
}

/// Reasons an upload is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("image is empty")]
    Empty,
    #[error("image is {size} bytes; the limit is {max}")]
    TooLarge { size: usize, max: usize },
    #[error("unsupported image type `{content_type}`; use jpeg, png or bmp")]
    UnsupportedType { content_type: String },
}

/// Validated image payload ready for storage.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    kind: ImageKind,
    bytes: Vec<u8>,
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("kind", &self.kind)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageUpload {
    /// Check size and declared type of an upload.
    ///
    /// # Examples
    /// ```
    /// use design_desk::domain::{ImageKind, ImageUpload};
    ///
    /// let upload = ImageUpload::new("image/png", vec![0_u8; 16]).unwrap();
    /// assert_eq!(upload.kind(), ImageKind::Png);
    /// assert!(ImageUpload::new("image/gif", vec![0_u8; 16]).is_err());
    /// ```
    pub fn new(content_type: &str, bytes: Vec<u8>) -> Result<Self, UploadError> {
        let kind = ImageKind::from_content_type(content_type).ok_or_else(|| {
            UploadError::UnsupportedType {
                content_type: content_type.to_owned(),
            }
        })?;
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(UploadError::TooLarge {
                size: bytes.len(),
                max: MAX_IMAGE_BYTES,
            });
        }
        Ok(Self { kind, bytes })
    }

    pub fn kind(&self) -> ImageKind {
        self.kind
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Storage area an image belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageArea {
    /// Reference images supplied by applicants.
    Applications,
    /// Finished designs attached by staff.
    Designs,
}

impl ImageArea {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Applications => "applications",
            Self::Designs => "designs",
        }
    }

    fn from_str(raw: &str) -> Option<Self> {
        match raw {
            "applications" => Some(Self::Applications),
            "designs" => Some(Self::Designs),
            _ => None,
        }
    }
}

/// Error raised when a stored image location cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid image location `{0}`")]
pub struct InvalidImageLocation(pub String);

/// Relative location of a stored image, e.g. `designs/<uuid>.png`.
///
/// ## Invariants
/// - Exactly two segments: an [`ImageArea`] and a file name.
/// - The file name has a known [`ImageKind`] extension and no path syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageLocation {
    area: ImageArea,
    kind: ImageKind,
    raw: String,
}

impl ImageLocation {
    /// Build a location for a freshly named file.
    pub fn generate(area: ImageArea, kind: ImageKind) -> Self {
        let raw = format!(
            "{}/{}.{}",
            area.as_str(),
            uuid::Uuid::new_v4(),
            kind.extension()
        );
        Self { area, kind, raw }
    }

    /// Parse a persisted location.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, InvalidImageLocation> {
        let text = raw.as_ref();
        let invalid = || InvalidImageLocation(text.to_owned());
        let (area, file) = text.split_once('/').ok_or_else(invalid)?;
        let area = ImageArea::from_str(area).ok_or_else(invalid)?;
        let (stem, ext) = file.rsplit_once('.').ok_or_else(invalid)?;
        let clean_stem = !stem.is_empty()
            && stem
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
        if !clean_stem {
            return Err(invalid());
        }
        let kind = ImageKind::from_extension(ext).ok_or_else(invalid)?;
        Ok(Self {
            area,
            kind,
            raw: text.to_owned(),
        })
    }

    pub fn area(&self) -> ImageArea {
        self.area
    }

    pub fn kind(&self) -> ImageKind {
        self.kind
    }

    /// Area directory name.
    pub fn directory(&self) -> &str {
        self.area.as_str()
    }

    /// File name within the area directory.
    pub fn file_name(&self) -> &str {
        self.raw
            .split_once('/')
            .map_or(self.raw.as_str(), |(_, file)| file)
    }
}

impl AsRef<str> for ImageLocation {
    fn as_ref(&self) -> &str {
        self.raw.as_str()
    }
}

impl fmt::Display for ImageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<ImageLocation> for String {
    fn from(value: ImageLocation) -> Self {
        value.raw
    }
}

impl TryFrom<String> for ImageLocation {
    type Error = InvalidImageLocation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

/// Bytes of a stored image with the type to serve them as.
#[derive(Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub kind: ImageKind,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for StoredImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredImage")
            .field("kind", &self.kind)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("image/jpeg", Some(ImageKind::Jpeg))]
    #[case("IMAGE/PNG", Some(ImageKind::Png))]
    #[case("image/bmp; charset=binary", Some(ImageKind::Bmp))]
    #[case("image/gif", None)]
    #[case("application/pdf", None)]
    fn content_types_map_to_kinds(#[case] raw: &str, #[case] expected: Option<ImageKind>) {
        assert_eq!(ImageKind::from_content_type(raw), expected);
    }

    #[rstest]
    fn accepts_image_at_the_limit() {
        let upload = ImageUpload::new("image/jpeg", vec![0_u8; MAX_IMAGE_BYTES])
            .expect("limit is inclusive");
        assert_eq!(upload.bytes().len(), MAX_IMAGE_BYTES);
    }

    #[rstest]
    fn rejects_image_over_the_limit() {
        let err = ImageUpload::new("image/jpeg", vec![0_u8; 3 * 1024 * 1024])
            .expect_err("3 MiB exceeds the cap");
        assert_eq!(
            err,
            UploadError::TooLarge {
                size: 3 * 1024 * 1024,
                max: MAX_IMAGE_BYTES
            }
        );
    }

    #[rstest]
    fn rejects_unsupported_type_before_size() {
        let err = ImageUpload::new("image/webp", Vec::new()).expect_err("webp");
        assert!(matches!(err, UploadError::UnsupportedType { .. }));
    }

    #[rstest]
    fn rejects_empty_payload() {
        assert_eq!(
            ImageUpload::new("image/png", Vec::new()),
            Err(UploadError::Empty)
        );
    }

    #[rstest]
    fn generated_locations_parse_back() {
        let location = ImageLocation::generate(ImageArea::Designs, ImageKind::Png);
        let parsed = ImageLocation::parse(location.as_ref()).expect("parses");
        assert_eq!(parsed, location);
        assert_eq!(parsed.directory(), "designs");
        assert!(parsed.file_name().ends_with(".png"));
    }

    #[rstest]
    #[case("")]
    #[case("designs")]
    #[case("other/abc.png")]
    #[case("designs/../secret.png")]
    #[case("designs/abc.gif")]
    #[case("designs/.png")]
    #[case("designs/a/b.png")]
    fn rejects_malformed_locations(#[case] raw: &str) {
        assert!(ImageLocation::parse(raw).is_err(), "input: {raw}");
    }
}
