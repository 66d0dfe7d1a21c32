use super::{
    get_component, set_urls, truthy, url_property, Component, Controller, Properties,
    PropertyDefinition, UrlParams,
};
use crate::models::{Series, SeriesOrder};
use crate::services::series::{list_series, SeriesQuery};
use crate::services::translation::Translation;
use crate::Database;
use anyhow::{Context, Result};

const PROPERTIES: &[PropertyDefinition] = &[
    PropertyDefinition {
        name: "seriesPage",
        title: "taxonomy::lang.components.series_list.series_page_title",
        default: Some("blog/series"),
    },
    PropertyDefinition {
        name: "displayEmpty",
        title: "taxonomy::lang.components.series_list.display_empty_title",
        default: Some("0"),
    },
    PropertyDefinition {
        name: "orderBy",
        title: "taxonomy::lang.components.series_list.order_title",
        default: Some("title asc"),
    },
    PropertyDefinition {
        name: "limit",
        title: "taxonomy::lang.components.series_list.limit_title",
        default: Some("0"),
    },
];

/// Lists series with links to the page showing each one.
#[derive(Debug, Clone)]
pub struct SeriesList {
    properties: Properties,
}

impl SeriesList {
    pub const ALIAS: &'static str = "seriesList";

    pub fn new(properties: Properties) -> Self {
        Self {
            properties: properties.with_defaults(PROPERTIES),
        }
    }

    pub fn order(&self) -> Result<SeriesOrder> {
        let raw = self.get_property("orderBy", None).unwrap_or_default();
        let order = raw
            .parse::<SeriesOrder>()
            .with_context(|| format!("Invalid orderBy property on {}", Self::ALIAS))?;
        Ok(order)
    }

    pub fn series_page(&self) -> Option<String> {
        self.get_property("seriesPage", None).filter(|p| !p.is_empty())
    }

    pub fn run(
        &self,
        db: &Database,
        controller: &Controller<'_>,
        translation: &Translation,
    ) -> Result<Vec<Series>> {
        let limit = self
            .get_property("limit", Some("0"))
            .and_then(|l| l.trim().parse::<usize>().ok())
            .unwrap_or(0);
        let query = SeriesQuery {
            order: self.order()?,
            limit,
            include_empty: truthy(self.get_property("displayEmpty", None).as_deref()),
        };

        let mut list = list_series(db, &query, translation, controller.locale())?;

        if let Some(page) = self.series_page() {
            let target = get_component(controller, super::SeriesPosts::ALIAS, &page);
            let mut params = UrlParams::new();
            if let Some(name) = url_property(target.as_ref().map(|c| c as &dyn Component), "series") {
                params.insert("series".to_string(), name);
            }
            set_urls(list.iter_mut(), &page, controller, &params);
        }

        Ok(list)
    }
}

impl Component for SeriesList {
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
