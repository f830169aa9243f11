use thiserror::Error;

#[derive(Error, Debug)]
pub enum NUpError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid options: {0}")]
    InvalidOptions(String),
    #[error("The PDF file is encrypted")]
    SourceEncrypted,
    #[error("Degenerate sheet geometry: {0}")]
    Geometry(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("No pages to lay out")]
    NoPages,
}

pub type Result<T> = std::result::Result<T, NUpError>;

/// Flat classification of failures, for callers that report error codes
/// rather than matching on the full error enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidOptions,
    SourceEncrypted,
    ProcessingFailed,
}

impl NUpError {
    pub fn code(&self) -> ErrorCode {
        match self {
            NUpError::InvalidOptions(_) => ErrorCode::InvalidOptions,
            NUpError::SourceEncrypted => ErrorCode::SourceEncrypted,
            NUpError::Pdf(_)
            | NUpError::Io(_)
            | NUpError::Geometry(_)
            | NUpError::TaskJoin(_)
            | NUpError::NoPages => ErrorCode::ProcessingFailed,
        }
    }
}

/// Number of source pages placed on each output sheet.
///
/// Only values with a defined grid factorization are representable:
/// 2 → 2×1, 4 → 2×2, 9 → 3×3, 16 → 4×4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PagesPerSheet {
    Two,
    #[default]
    Four,
    Nine,
    Sixteen,
}

impl PagesPerSheet {
    pub fn count(self) -> usize {
        match self {
            PagesPerSheet::Two => 2,
            PagesPerSheet::Four => 4,
            PagesPerSheet::Nine => 9,
            PagesPerSheet::Sixteen => 16,
        }
    }
}

impl TryFrom<u32> for PagesPerSheet {
    type Error = NUpError;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            2 => Ok(PagesPerSheet::Two),
            4 => Ok(PagesPerSheet::Four),
            9 => Ok(PagesPerSheet::Nine),
            16 => Ok(PagesPerSheet::Sixteen),
            other => Err(NUpError::InvalidOptions(format!(
                "pages per sheet must be 2, 4, 9 or 16, got {other}"
            ))),
        }
    }
}

/// Output paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PaperSize {
    #[default]
    A4,
    Letter,
    Legal,
    A3,
}

impl PaperSize {
    /// Base dimensions in points (always portrait: width < height)
    pub fn dimensions_pt(self) -> (f32, f32) {
        match self {
            PaperSize::A4 => (595.28, 841.89),
            PaperSize::Letter => (612.0, 792.0),
            PaperSize::Legal => (612.0, 1008.0),
            PaperSize::A3 => (841.89, 1190.55),
        }
    }
}

/// Output sheet orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    Portrait,
    Landscape,
    /// Decide from the first source page's aspect ratio and the grid shape
    #[default]
    Auto,
}

/// RGB color with components in 0.0–1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

pub const BLACK: Rgb = Rgb {
    r: 0.0,
    g: 0.0,
    b: 0.0,
};

/// Parse a `#RRGGBB` hex color. Returns `None` on any malformed input.
pub fn parse_hex_color(hex: &str) -> Option<Rgb> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map(|v| v as f32 / 255.0)
            .ok()
    };
    Some(Rgb {
        r: channel(0..2)?,
        g: channel(2..4)?,
        b: channel(4..6)?,
    })
}

/// An input document: the caller-supplied filename plus raw bytes.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Terminal outcome of a run. Cancellation is not an error; callers must
/// be able to tell it apart from a failure.
#[derive(Debug)]
pub enum NUpOutcome {
    Complete(NUpArtifact),
    Cancelled,
}

impl NUpOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, NUpOutcome::Cancelled)
    }

    pub fn into_artifact(self) -> Option<NUpArtifact> {
        match self {
            NUpOutcome::Complete(artifact) => Some(artifact),
            NUpOutcome::Cancelled => None,
        }
    }
}

/// The finished output document plus everything the caller needs to hand
/// it on: serialized bytes, MIME type, derived filename, and run metadata.
#[derive(Debug)]
pub struct NUpArtifact {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub filename: String,
    pub metadata: NUpMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NUpMetadata {
    pub original_page_count: usize,
    pub output_sheet_count: usize,
    pub pages_per_sheet: usize,
}
