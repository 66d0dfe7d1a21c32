use crate::components::{Controller, SetUrl, UrlParams};
use crate::LOCALIZATION_KEY;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
    /// Published posts in the series, counted when the row is read.
    #[serde(default)]
    pub post_count: i64,
    /// Locale whose translation is applied to the text fields, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_deserializing)]
    pub url: Option<String>,
}

impl Series {
    /// Attachment type under which featured images are stored.
    pub const ATTACHMENT_TYPE: &'static str = "series";
    pub const FEATURED_IMAGES: &'static str = "featured_images";

    /// Route parameters for this series' own page. `params` may rename the
    /// `series` parameter.
    pub fn url_params(&self, params: &UrlParams) -> UrlParams {
        let name = params
            .get("series")
            .map(String::as_str)
            .unwrap_or("series");
        let mut values = UrlParams::new();
        values.insert(name.to_string(), self.slug.clone());
        values
    }
}

impl SetUrl for Series {
    fn set_url(&mut self, page: &str, controller: &Controller<'_>, params: &UrlParams) {
        let values = self.url_params(params);
        self.url = controller.page_url(page, &values);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSeries {
    pub title: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSeries {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
}

/// Per-locale values for the translatable fields of a series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedFields {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
}

impl TranslatedFields {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.slug.is_none() && self.description.is_none()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown series order '{0}'")]
pub struct OrderError(pub String);

/// The orders a series listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum SeriesOrder {
    #[default]
    TitleAsc,
    TitleDesc,
    CreatedAtAsc,
    CreatedAtDesc,
    PostsCountAsc,
    PostsCountDesc,
    Random,
}

impl SeriesOrder {
    pub const ALL: [SeriesOrder; 7] = [
        Self::TitleAsc,
        Self::TitleDesc,
        Self::CreatedAtAsc,
        Self::CreatedAtDesc,
        Self::PostsCountAsc,
        Self::PostsCountDesc,
        Self::Random,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TitleAsc => "title asc",
            Self::TitleDesc => "title desc",
            Self::CreatedAtAsc => "created_at asc",
            Self::CreatedAtDesc => "created_at desc",
            Self::PostsCountAsc => "posts_count asc",
            Self::PostsCountDesc => "posts_count desc",
            Self::Random => "random",
        }
    }

    /// Localization key of the option label.
    pub fn label_key(&self) -> String {
        let name = match self {
            Self::TitleAsc => "title_asc",
            Self::TitleDesc => "title_desc",
            Self::CreatedAtAsc => "created_at_asc",
            Self::CreatedAtDesc => "created_at_desc",
            Self::PostsCountAsc => "post_count_asc",
            Self::PostsCountDesc => "post_count_desc",
            Self::Random => "random",
        };
        format!("{}order_options.{}", LOCALIZATION_KEY, name)
    }

    /// ORDER BY clause over the series listing columns.
    pub fn sql(&self) -> &'static str {
        match self {
            Self::TitleAsc => "title COLLATE NOCASE ASC, id ASC",
            Self::TitleDesc => "title COLLATE NOCASE DESC, id DESC",
            Self::CreatedAtAsc => "created_at ASC, id ASC",
            Self::CreatedAtDesc => "created_at DESC, id DESC",
            Self::PostsCountAsc => "posts_count ASC, id ASC",
            Self::PostsCountDesc => "posts_count DESC, id ASC",
            Self::Random => "RANDOM()",
        }
    }

    /// Key/label pairs offered to site builders.
    pub fn options() -> Vec<(&'static str, String)> {
        Self::ALL
            .iter()
            .map(|order| (order.as_str(), order.label_key()))
            .collect()
    }
}

impl FromStr for SeriesOrder {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        Self::ALL
            .iter()
            .copied()
            .find(|order| order.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| OrderError(s.to_string()))
    }
}

impl TryFrom<String> for SeriesOrder {
    type Error = OrderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SeriesOrder> for String {
    fn from(order: SeriesOrder) -> Self {
        order.as_str().to_string()
    }
}

impl std::fmt::Display for SeriesOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens to posts that still reference a series being deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostDeletePolicy {
    /// Clear the posts' series reference.
    #[default]
    Nullify,
    /// Refuse to delete a series that still has posts.
    Restrict,
    /// Delete the posts together with the series.
    Cascade,
}

impl FromStr for PostDeletePolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nullify" => Ok(Self::Nullify),
            "restrict" => Ok(Self::Restrict),
            "cascade" => Ok(Self::Cascade),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for PostDeletePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nullify => write!(f, "nullify"),
            Self::Restrict => write!(f, "restrict"),
            Self::Cascade => write!(f, "cascade"),
        }
    }
}
