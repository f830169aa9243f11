use crate::types::*;

/// N-Up layout configuration
///
/// Deserialized configs may be partial; missing fields take their
/// documented defaults.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NUpOptions {
    /// Source pages placed on each output sheet
    pub pages_per_sheet: PagesPerSheet,
    /// Output paper size
    pub paper_size: PaperSize,
    /// Output sheet orientation
    pub orientation: Orientation,
    /// Apply a 36pt outer margin and 10pt gutters between cells
    pub use_margins: bool,
    /// Draw a 1pt outline around each placed page
    pub add_border: bool,
    /// Border color as `#RRGGBB`
    pub border_color: String,
}

impl Default for NUpOptions {
    fn default() -> Self {
        Self {
            pages_per_sheet: PagesPerSheet::Four,
            paper_size: PaperSize::A4,
            orientation: Orientation::Auto,
            use_margins: true,
            add_border: false,
            border_color: "#000000".to_string(),
        }
    }
}

impl NUpOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| NUpError::InvalidOptions(format!("failed to parse config: {e}")))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| NUpError::InvalidOptions(format!("failed to serialize config: {e}")))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// The configured border color, falling back to black when the hex
    /// string is malformed.
    pub fn border_rgb(&self) -> Rgb {
        parse_hex_color(&self.border_color).unwrap_or(BLACK)
    }
}
