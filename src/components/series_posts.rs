use super::{Component, Controller, PostLinks, Properties, PropertyDefinition};
use crate::models::{Post, Series};
use crate::services::series::{get_series_by_slug, list_published_posts};
use crate::services::translation::Translation;
use crate::Database;
use anyhow::Result;
use serde::Serialize;

const PROPERTIES: &[PropertyDefinition] = &[
    PropertyDefinition {
        name: "series",
        title: "taxonomy::lang.components.series_posts.series_title",
        default: Some("{{ :series }}"),
    },
    PropertyDefinition {
        name: "postPage",
        title: "taxonomy::lang.components.series_posts.post_page_title",
        default: Some("blog/post"),
    },
    PropertyDefinition {
        name: "categoryPage",
        title: "taxonomy::lang.components.series_posts.category_page_title",
        default: Some("blog/category"),
    },
    PropertyDefinition {
        name: "locale",
        title: "taxonomy::lang.components.series_posts.locale_title",
        default: None,
    },
];

#[derive(Debug, Clone, Serialize)]
pub struct SeriesPostsView {
    pub series: Series,
    pub posts: Vec<Post>,
}

/// Shows one series, picked by slug, with its published posts.
#[derive(Debug, Clone)]
pub struct SeriesPosts {
    properties: Properties,
}

impl SeriesPosts {
    pub const ALIAS: &'static str = "seriesPosts";

    pub fn new(properties: Properties) -> Self {
        Self {
            properties: properties.with_defaults(PROPERTIES),
        }
    }

    pub fn links(&self) -> PostLinks {
        PostLinks::new(
            self.get_property("postPage", None),
            self.get_property("categoryPage", None),
        )
    }

    /// `None` when no series slug is bound or no series has it.
    pub fn run(
        &self,
        db: &Database,
        controller: &Controller<'_>,
        translation: &Translation,
    ) -> Result<Option<SeriesPostsView>> {
        let Some(slug) = self.get_property("series", None).filter(|s| !s.is_empty()) else {
            tracing::debug!("{} has no series slug to show", Self::ALIAS);
            return Ok(None);
        };

        let locale = self.get_property("locale", controller.locale());
        let Some(series) = get_series_by_slug(db, &slug, translation, locale.as_deref())? else {
            tracing::debug!("Series '{}' not found", slug);
            return Ok(None);
        };

        let mut posts = list_published_posts(db, series.id)?;
        self.links().set_post_urls(&mut posts, controller);

        Ok(Some(SeriesPostsView { series, posts }))
    }
}

impl Component for SeriesPosts {
    fn alias(&self) -> &str {
        Self::ALIAS
    }

    fn define_properties(&self) -> &[PropertyDefinition] {
        PROPERTIES
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ThemeRegistry;

    #[test]
    fn test_series_property_is_bound_to_route() {
        let mut component = SeriesPosts::new(Properties::new());
        assert_eq!(component.param_name("series", "series"), "series");
        assert_eq!(component.get_property("series", None), None);

        let registry = ThemeRegistry::default();
        let controller = Controller::new(&registry).with_param("series", "rust-basics");
        controller.bind(&mut component);
        assert_eq!(
            component.get_property("series", None).as_deref(),
            Some("rust-basics")
        );
    }

    #[test]
    fn test_links_use_configured_pages() {
        let component = SeriesPosts::new(Properties::from_pairs([
            ("postPage", "articles/show"),
            ("categoryPage", ""),
        ]));
        let links = component.links();
        assert_eq!(links.post_page.as_deref(), Some("articles/show"));
        assert_eq!(links.category_page, None);
    }
}
