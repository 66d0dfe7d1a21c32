use crate::components::{Controller, SeriesList, Theme, ThemeRegistry};
use crate::models::{PostDeletePolicy, SeriesOrder};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub series: SeriesConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub components: ComponentsConfig,
    #[serde(default)]
    pub themes: ThemeConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SiteConfig {
    /// Base URL page URLs are resolved against. Paths only when unset.
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            pool_size: default_pool_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranslationConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_locale")]
    pub default_locale: String,
    /// Locales translations may be stored for, besides the default one.
    #[serde(default)]
    pub locales: Vec<String>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            default_locale: default_locale(),
            locales: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeriesConfig {
    #[serde(default)]
    pub on_delete: PostDeletePolicy,
    #[serde(default = "default_order")]
    pub default_order: String,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            on_delete: PostDeletePolicy::default(),
            default_order: default_order(),
        }
    }
}

impl SeriesConfig {
    pub fn order(&self) -> Result<SeriesOrder> {
        self.default_order
            .parse()
            .with_context(|| "series.default_order is not a known order")
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaConfig {
    /// Directory featured image bytes are written to.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
        }
    }
}

impl MediaConfig {
    pub fn upload_path(&self) -> &Path {
        Path::new(&self.upload_dir)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ComponentsConfig {
    /// Whether `{{ :param }}` properties are filled from route parameters.
    #[serde(default = "default_true")]
    pub bind_params: bool,
}

impl Default for ComponentsConfig {
    fn default() -> Self {
        Self { bind_params: true }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ThemeConfig {
    pub active: Option<String>,
    #[serde(default)]
    pub installed: Vec<Theme>,
}

impl ThemeConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(active) = &self.active {
            if !self.installed.iter().any(|theme| &theme.name == active) {
                let names: Vec<&str> = self.installed.iter().map(|t| t.name.as_str()).collect();
                anyhow::bail!(
                    "Invalid theme '{}'. Installed themes: {}",
                    active,
                    names.join(", ")
                );
            }
        }
        for theme in &self.installed {
            for page in &theme.pages {
                if !page.url.starts_with('/') {
                    anyhow::bail!(
                        "Page '{}' of theme '{}' has URL '{}' which must start with '/'",
                        page.name,
                        theme.name,
                        page.url
                    );
                }
                if let Some(order) = page
                    .components
                    .get(SeriesList::ALIAS)
                    .and_then(|properties| properties.get("orderBy"))
                {
                    order.parse::<SeriesOrder>().with_context(|| {
                        format!(
                            "Invalid orderBy on page '{}' of theme '{}'",
                            page.name, theme.name
                        )
                    })?;
                }
            }
        }
        Ok(())
    }
}

fn default_database_path() -> String {
    "taxonomy.db".to_string()
}

fn default_pool_size() -> u32 {
    10
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_order() -> String {
    SeriesOrder::default().as_str().to_string()
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!(
                "Could not read config file '{}': {}",
                path.display(),
                e
            )
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.pool_size == 0 {
            anyhow::bail!("database.pool_size must be greater than 0");
        }
        if self.translation.enabled && self.translation.locales.is_empty() {
            anyhow::bail!("translation.locales must list at least one locale when enabled");
        }
        if let Some(url) = &self.site.url {
            Url::parse(url).with_context(|| format!("site.url '{}' is not a valid URL", url))?;
        }
        if self.media.upload_dir.trim().is_empty() {
            anyhow::bail!("media.upload_dir must not be empty");
        }
        self.series.order()?;
        self.themes.validate()?;
        Ok(())
    }

    pub fn registry(&self) -> ThemeRegistry {
        ThemeRegistry::new(self.themes.installed.clone(), self.themes.active.as_deref())
    }

    /// A request context over `registry` configured by this file.
    pub fn controller<'a>(&self, registry: &'a ThemeRegistry) -> Result<Controller<'a>> {
        let mut controller = Controller::new(registry);
        if let Some(url) = &self.site.url {
            controller = controller.with_base_url(Url::parse(url)?);
        }
        if !self.components.bind_params {
            controller = controller.without_param_binding();
        }
        Ok(controller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[site]
url = "https://example.com"

[database]
path = "blog.db"

[translation]
enabled = true
locales = ["fr"]

[series]
on_delete = "restrict"
default_order = "posts_count desc"

[media]
upload_dir = "data/uploads"

[themes]
active = "demo"

[[themes.installed]]
name = "demo"

[[themes.installed.pages]]
name = "blog/series"
url = "/blog/series/:series"

[themes.installed.pages.components.seriesPosts]
series = "{{ :series }}"

[[themes.installed.pages]]
name = "blog/index"
url = "/blog"

[themes.installed.pages.components.seriesList]
orderBy = "created_at desc"
"#;

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(config.database.path, "blog.db");
        assert_eq!(config.database.pool_size, 10);
        assert!(config.translation.enabled);
        assert_eq!(config.translation.default_locale, "en");
        assert_eq!(config.series.on_delete, PostDeletePolicy::Restrict);
        assert_eq!(config.series.order().unwrap(), SeriesOrder::PostsCountDesc);
        assert!(config.components.bind_params);
        assert_eq!(config.media.upload_path(), Path::new("data/uploads"));

        let registry = config.registry();
        let page = registry.load_page("blog/series").unwrap();
        assert_eq!(page.url, "/blog/series/:series");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.database.path, "taxonomy.db");
        assert!(!config.translation.enabled);
        assert_eq!(config.series.on_delete, PostDeletePolicy::Nullify);
        assert_eq!(config.series.order().unwrap(), SeriesOrder::TitleAsc);
        assert_eq!(config.media.upload_dir, "uploads");
    }

    #[test]
    fn test_rejects_empty_upload_dir() {
        let bad = SAMPLE.replace("upload_dir = \"data/uploads\"", "upload_dir = \" \"");
        assert!(Config::parse(&bad).is_err());
    }

    #[test]
    fn test_rejects_unknown_component_order() {
        let bad = SAMPLE.replace("created_at desc", "color asc");
        assert!(Config::parse(&bad).is_err());
    }

    #[test]
    fn test_rejects_unknown_default_order() {
        let bad = SAMPLE.replace("posts_count desc", "shuffle");
        assert!(Config::parse(&bad).is_err());
    }

    #[test]
    fn test_rejects_missing_active_theme() {
        let bad = SAMPLE.replace("active = \"demo\"", "active = \"other\"");
        assert!(Config::parse(&bad).is_err());
    }

    #[test]
    fn test_translation_requires_locales() {
        let bad = SAMPLE.replace("locales = [\"fr\"]", "locales = []");
        assert!(Config::parse(&bad).is_err());
    }

    #[test]
    fn test_controller_uses_site_url() {
        let config = Config::parse(SAMPLE).unwrap();
        let registry = config.registry();
        let controller = config.controller(&registry).unwrap();
        let mut params = crate::components::UrlParams::new();
        params.insert("series".into(), "intro".into());
        assert_eq!(
            controller.page_url("blog/series", &params).as_deref(),
            Some("https://example.com/blog/series/intro")
        );
    }
}
