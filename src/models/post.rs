use crate::components::{Controller, SetUrl, UrlParams};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(default, skip_deserializing)]
    pub url: Option<String>,
}

impl SetUrl for Category {
    fn set_url(&mut self, page: &str, controller: &Controller<'_>, params: &UrlParams) {
        let slug_param = params.get("slug").map(String::as_str).unwrap_or("slug");

        let mut values = UrlParams::new();
        values.insert("id".to_string(), self.id.to_string());
        values.insert(slug_param.to_string(), self.slug.clone());

        self.url = controller.page_url(page, &values);
    }
}

/// A blog post as seen by the series layer. Posts belong to the blog, the
/// series only references them through `series_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub published: bool,
    pub published_at: Option<String>,
    pub series_id: Option<i64>,
    pub created_at: String,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default, skip_deserializing)]
    pub url: Option<String>,
}

impl SetUrl for Post {
    fn set_url(&mut self, page: &str, controller: &Controller<'_>, params: &UrlParams) {
        let slug_param = params.get("slug").map(String::as_str).unwrap_or("slug");

        let mut values = UrlParams::new();
        values.insert("id".to_string(), self.id.to_string());
        values.insert(slug_param.to_string(), self.slug.clone());
        if let Some(category) = self.categories.first() {
            values
                .entry("category".to_string())
                .or_insert_with(|| category.slug.clone());
        }

        self.url = controller.page_url(page, &values);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePost {
    pub title: String,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    #[serde(default)]
    pub published: bool,
    pub published_at: Option<String>,
    pub series_id: Option<i64>,
}
