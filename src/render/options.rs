//! HTML rendering options.

/// Font stack used when no family is configured.
pub const DEFAULT_FONT_FAMILY: &str = "'Helvetica Neue', Helvetica, Arial, sans-serif";

/// Options for HTML synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// CSS `font-family` value applied to every text element
    pub font_family: String,

    /// Prefix prepended to asset file names in `src` attributes
    pub asset_prefix: String,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the CSS font family.
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    /// Set the asset path prefix (e.g. `"assets/"`).
    pub fn with_asset_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.asset_prefix = prefix.into();
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            asset_prefix: String::new(),
        }
    }
}
