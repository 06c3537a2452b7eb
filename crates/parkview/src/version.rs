//! Version information for parkview.

/// Parkview version from Cargo.toml
pub const PARKVIEW_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version block reported by the lot server.
#[derive(Debug, Clone, serde::Serialize)]
pub struct VersionInfo {
    pub parkview: &'static str,
    /// Name of the catalog file being served, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,
}

impl Default for VersionInfo {
    fn default() -> Self {
        Self {
            parkview: PARKVIEW_VERSION,
            catalog: None,
        }
    }
}

impl VersionInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(mut self, catalog: String) -> Self {
        self.catalog = Some(catalog);
        self
    }
}
