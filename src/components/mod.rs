//! Presentation components: named units bound to theme pages, configured
//! through string properties, which load series and posts and decorate them
//! with URLs before a view consumes them.

mod controller;
mod registry;
mod series_list;
mod series_posts;
mod url;

pub use controller::Controller;
pub use registry::{ComponentSpec, Page, PageComponent, Theme, ThemeRegistry};
pub use series_list::SeriesList;
pub use series_posts::{SeriesPosts, SeriesPostsView};
pub use url::{get_component, set_urls, url_property, PostLinks, SetUrl};

use crate::services::translation::Translation;
use crate::Database;
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// Route parameter name to value, or role to parameter name when passed as
/// overrides to [`SetUrl::set_url`].
pub type UrlParams = BTreeMap<String, String>;

static EXTERNAL_PARAM_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\{\{\s*:([A-Za-z0-9_\-]+)\s*\}\}$").unwrap());

/// Declared property of a component, shown to site builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDefinition {
    pub name: &'static str,
    /// Localization key of the property label.
    pub title: &'static str,
    pub default: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyValue {
    raw: String,
    external: Option<String>,
    value: Option<String>,
}

impl PropertyValue {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let external = EXTERNAL_PARAM_REGEX
            .captures(raw.trim())
            .map(|caps| caps[1].to_string());
        let value = if external.is_some() {
            None
        } else {
            Some(raw.clone())
        };
        Self { raw, external, value }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Route parameter this property is bound to (`{{ :name }}`), if any.
    pub fn external(&self) -> Option<&str> {
        self.external.as_deref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// The configured property values of one component instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    values: BTreeMap<String, PropertyValue>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut properties = Self::new();
        for (name, raw) in pairs {
            properties.set(name, raw);
        }
        properties
    }

    pub fn set(&mut self, name: impl Into<String>, raw: impl Into<String>) {
        self.values.insert(name.into(), PropertyValue::new(raw));
    }

    /// Fills in declared defaults for every property not configured.
    pub fn with_defaults(mut self, definitions: &[PropertyDefinition]) -> Self {
        for definition in definitions {
            if let Some(default) = definition.default {
                self.values
                    .entry(definition.name.to_string())
                    .or_insert_with(|| PropertyValue::new(default));
            }
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(PropertyValue::value)
    }

    pub fn external_name(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(PropertyValue::external)
    }

    /// Resolves a bound property to the value of its route parameter.
    /// Returns false if the property is not bound to a parameter.
    pub fn bind(&mut self, name: &str, value: Option<&str>) -> bool {
        match self.values.get_mut(name) {
            Some(property) if property.external.is_some() => {
                property.value = value.map(str::to_string);
                true
            }
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// A configurable presentation unit that can be found on a page by alias.
pub trait Component: std::fmt::Debug {
    fn alias(&self) -> &str;

    fn define_properties(&self) -> &[PropertyDefinition];

    fn properties(&self) -> &Properties;

    fn properties_mut(&mut self) -> &mut Properties;

    /// The value the page configured for `name`.
    fn property(&self, name: &str) -> Option<&str> {
        self.properties().value(name)
    }

    /// Route parameter name the property is bound to, or `default`.
    fn param_name<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.properties().external_name(name).unwrap_or(default)
    }

    /// Configured value, then the declared default, then `fallback`. A
    /// default bound to a route parameter only counts once bound.
    fn get_property(&self, name: &str, fallback: Option<&str>) -> Option<String> {
        self.property(name)
            .or_else(|| {
                self.define_properties()
                    .iter()
                    .find(|definition| definition.name == name)
                    .and_then(|definition| definition.default)
                    .filter(|default| !EXTERNAL_PARAM_REGEX.is_match(default.trim()))
            })
            .or(fallback)
            .map(str::to_string)
    }
}

pub(crate) fn truthy(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}

/// Runs every series component on `page_name` and returns their output
/// keyed by component alias.
pub fn render_page(
    db: &Database,
    controller: &Controller<'_>,
    translation: &Translation,
    page_name: &str,
) -> Result<serde_json::Map<String, serde_json::Value>> {
    let page = controller
        .registry()
        .load_page(page_name)
        .ok_or_else(|| anyhow::anyhow!("Page '{}' not found in the active theme", page_name))?;

    let mut output = serde_json::Map::new();
    for spec in page.components() {
        let properties = Properties::from_pairs(spec.properties.clone());
        let value = match spec.alias.as_str() {
            SeriesList::ALIAS => {
                let mut component = SeriesList::new(properties);
                controller.bind(&mut component);
                serde_json::to_value(component.run(db, controller, translation)?)?
            }
            SeriesPosts::ALIAS => {
                let mut component = SeriesPosts::new(properties);
                controller.bind(&mut component);
                serde_json::to_value(component.run(db, controller, translation)?)?
            }
            other => {
                tracing::debug!("Skipping component '{}' on page '{}'", other, page_name);
                continue;
            }
        };
        output.insert(spec.alias.clone(), value);
    }
    Ok(output)
}
