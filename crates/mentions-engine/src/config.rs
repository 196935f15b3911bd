use serde::Deserialize;

/// URL and title settings the engine needs to build links embedded in
/// content and emails. Resolved once by the embedding platform and
/// passed in at construction; the engine never reads global
/// configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct SiteConfig {
    pub url: String,
    /// Overrides `url` when building outward-facing links.
    #[serde(default)]
    pub display_url: Option<String>,
    pub site_url: String,
    pub static_site_url: String,
    /// Path prefix mention links live under, e.g. `/community`.
    #[serde(default)]
    pub relative_path: String,
    pub title: String,
}

impl SiteConfig {
    pub fn base_url(&self) -> &str {
        self.display_url.as_deref().unwrap_or(&self.url)
    }
}
