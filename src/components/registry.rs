use super::{Component, Properties, PropertyDefinition};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A component placed on a page, with the property values the page sets.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ComponentSpec {
    pub alias: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Page {
    pub name: String,
    /// URL pattern, e.g. `/blog/post/:slug` or `/blog/:page?`.
    pub url: String,
    #[serde(default)]
    pub components: BTreeMap<String, BTreeMap<String, String>>,
}

impl Page {
    pub fn components(&self) -> Vec<ComponentSpec> {
        self.components
            .iter()
            .map(|(alias, properties)| ComponentSpec {
                alias: alias.clone(),
                properties: properties.clone(),
            })
            .collect()
    }

    /// A fresh instance of the component registered on this page under
    /// `alias`.
    pub fn get_component(&self, alias: &str) -> Option<PageComponent> {
        self.components.get(alias).map(|properties| PageComponent {
            alias: alias.to_string(),
            properties: Properties::from_pairs(properties.clone()),
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Theme {
    pub name: String,
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Theme {
    pub fn page(&self, name: &str) -> Option<&Page> {
        self.pages.iter().find(|page| page.name == name)
    }
}

/// Installed themes and the one currently serving pages.
#[derive(Debug, Clone, Default)]
pub struct ThemeRegistry {
    themes: BTreeMap<String, Theme>,
    active: Option<String>,
}

impl ThemeRegistry {
    pub fn new(themes: impl IntoIterator<Item = Theme>, active: Option<&str>) -> Self {
        let themes: BTreeMap<String, Theme> = themes
            .into_iter()
            .map(|theme| (theme.name.clone(), theme))
            .collect();
        let active = active
            .map(str::to_string)
            .or_else(|| themes.keys().next().cloned());
        Self { themes, active }
    }

    pub fn active_theme(&self) -> Option<&Theme> {
        self.active.as_ref().and_then(|name| self.themes.get(name))
    }

    pub fn theme(&self, name: &str) -> Option<&Theme> {
        self.themes.get(name)
    }

    /// Loads a page of the active theme by name.
    pub fn load_page(&self, name: &str) -> Option<&Page> {
        self.active_theme().and_then(|theme| theme.page(name))
    }
}

/// A component instance read from a page definition. It carries no schema
/// of its own, so only configured values and bound parameters are known.
#[derive(Debug, Clone)]
pub struct PageComponent {
    alias: String,
    properties: Properties,
}

impl Component for PageComponent {
    fn alias(&self) -> &str {
        &self.alias
    }

    fn define_properties(&self) -> &[PropertyDefinition] {
        &[]
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }
}
