use super::{Component, Controller, PageComponent, UrlParams};
use crate::models::Post;

/// Alias of the blog component that renders a single post.
pub const BLOG_POST_COMPONENT: &str = "blogPost";
/// Alias of the blog component that lists the posts of a category.
pub const BLOG_CATEGORIES_COMPONENT: &str = "blogCategories";

/// An item that can compute its own public URL.
pub trait SetUrl {
    /// Sets the item's URL to `page`. `params` maps a parameter role, such
    /// as `slug`, to the route parameter name the page uses for it.
    fn set_url(&mut self, page: &str, controller: &Controller<'_>, params: &UrlParams);
}

/// Sets the URL of every item to `page`.
pub fn set_urls<'i, T, I>(items: I, page: &str, controller: &Controller<'_>, params: &UrlParams)
where
    T: SetUrl + 'i,
    I: IntoIterator<Item = &'i mut T>,
{
    for item in items {
        item.set_url(page, controller, params);
    }
}

/// Finds `alias` on `page` in the active theme and binds it to the current
/// request when the controller supports it.
pub fn get_component(
    controller: &Controller<'_>,
    alias: &str,
    page: &str,
) -> Option<PageComponent> {
    let page_definition = controller.registry().load_page(page)?;
    let mut component = page_definition.get_component(alias)?;
    controller.bind(&mut component);
    Some(component)
}

/// Route parameter name behind the component's `name` property, `name`
/// itself when unbound, nothing when there is no component.
pub fn url_property(component: Option<&dyn Component>, name: &str) -> Option<String> {
    component.map(|component| component.param_name(name, name).to_string())
}

/// Pages that posts and their categories link to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostLinks {
    pub post_page: Option<String>,
    pub category_page: Option<String>,
}

impl PostLinks {
    pub fn new(post_page: Option<String>, category_page: Option<String>) -> Self {
        Self {
            post_page: post_page.filter(|p| !p.is_empty()),
            category_page: category_page.filter(|p| !p.is_empty()),
        }
    }

    /// Sets the URL of every post and, when a category page is configured,
    /// of every category of those posts.
    pub fn set_post_urls(&self, posts: &mut [Post], controller: &Controller<'_>) {
        let Some(post_page) = self.post_page.as_deref() else {
            return;
        };
        if posts.is_empty() {
            return;
        }

        let post_component = get_component(controller, BLOG_POST_COMPONENT, post_page);
        let category_component = self
            .category_page
            .as_deref()
            .and_then(|page| get_component(controller, BLOG_CATEGORIES_COMPONENT, page));

        let post_params = slug_params(post_component.as_ref());
        let category_params = slug_params(category_component.as_ref());

        for post in posts.iter_mut() {
            post.set_url(post_page, controller, &post_params);

            if let Some(category_page) = self.category_page.as_deref() {
                if !post.categories.is_empty() {
                    set_urls(
                        post.categories.iter_mut(),
                        category_page,
                        controller,
                        &category_params,
                    );
                }
            }
        }
    }
}

fn slug_params(component: Option<&PageComponent>) -> UrlParams {
    let name = url_property(component.map(|c| c as &dyn Component), "slug")
        .unwrap_or_else(|| "slug".to_string());
    UrlParams::from([("slug".to_string(), name)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Page, Theme, ThemeRegistry};
    use crate::models::Category;
    use std::collections::BTreeMap;

    fn page(name: &str, url: &str, components: Vec<(&str, Vec<(&str, &str)>)>) -> Page {
        Page {
            name: name.to_string(),
            url: url.to_string(),
            components: components
                .into_iter()
                .map(|(alias, props)| {
                    (
                        alias.to_string(),
                        props
                            .into_iter()
                            .map(|(k, v)| (k.to_string(), v.to_string()))
                            .collect::<BTreeMap<_, _>>(),
                    )
                })
                .collect(),
        }
    }

    fn registry() -> ThemeRegistry {
        ThemeRegistry::new(
            [Theme {
                name: "default".to_string(),
                pages: vec![
                    page(
                        "blog/post",
                        "/blog/:post_slug",
                        vec![("blogPost", vec![("slug", "{{ :post_slug }}")])],
                    ),
                    page(
                        "blog/category",
                        "/blog/category/:category_slug",
                        vec![("blogCategories", vec![("slug", "{{ :category_slug }}")])],
                    ),
                    page("plain/post", "/p/:slug", vec![]),
                ],
            }],
            None,
        )
    }

    fn post(id: i64, slug: &str, categories: &[&str]) -> Post {
        Post {
            id,
            title: slug.to_string(),
            slug: slug.to_string(),
            excerpt: None,
            published: true,
            published_at: None,
            series_id: None,
            created_at: "2024-01-01 00:00:00".to_string(),
            categories: categories
                .iter()
                .enumerate()
                .map(|(i, slug)| Category {
                    id: i as i64 + 1,
                    name: slug.to_string(),
                    slug: slug.to_string(),
                    url: None,
                })
                .collect(),
            url: None,
        }
    }

    #[test]
    fn test_set_post_urls_uses_bound_parameter_name() {
        let registry = registry();
        let controller = Controller::new(&registry);
        let links = PostLinks::new(Some("blog/post".into()), Some("blog/category".into()));

        let mut posts = vec![post(1, "first", &["rust"]), post(2, "second", &[])];
        links.set_post_urls(&mut posts, &controller);

        assert_eq!(posts[0].url.as_deref(), Some("/blog/first"));
        assert_eq!(posts[1].url.as_deref(), Some("/blog/second"));
        assert_eq!(
            posts[0].categories[0].url.as_deref(),
            Some("/blog/category/rust")
        );
    }

    #[test]
    fn test_set_post_urls_falls_back_to_slug_param() {
        let registry = registry();
        let controller = Controller::new(&registry);
        let links = PostLinks::new(Some("plain/post".into()), None);

        let mut posts = vec![post(1, "first", &["rust"])];
        links.set_post_urls(&mut posts, &controller);

        assert_eq!(posts[0].url.as_deref(), Some("/p/first"));
        assert_eq!(posts[0].categories[0].url, None);
    }

    #[test]
    fn test_set_post_urls_without_post_page_is_noop() {
        let registry = registry();
        let controller = Controller::new(&registry);
        let links = PostLinks::new(Some(String::new()), Some("blog/category".into()));

        let mut posts = vec![post(1, "first", &["rust"])];
        links.set_post_urls(&mut posts, &controller);

        assert_eq!(posts[0].url, None);
        assert_eq!(posts[0].categories[0].url, None);
    }

    #[test]
    fn test_set_post_urls_with_missing_category_page() {
        let registry = registry();
        let controller = Controller::new(&registry);
        let links = PostLinks::new(Some("blog/post".into()), Some("nowhere".into()));

        let mut posts = vec![post(1, "first", &["rust"])];
        links.set_post_urls(&mut posts, &controller);

        assert_eq!(posts[0].url.as_deref(), Some("/blog/first"));
        assert_eq!(posts[0].categories[0].url, None);
    }

    #[test]
    fn test_set_post_urls_empty_collection() {
        let registry = registry();
        let controller = Controller::new(&registry);
        let links = PostLinks::new(Some("blog/post".into()), None);
        let mut posts: Vec<Post> = Vec::new();
        links.set_post_urls(&mut posts, &controller);
        assert!(posts.is_empty());
    }

    #[test]
    fn test_url_property_without_component() {
        assert_eq!(url_property(None, "slug"), None);
        assert_eq!(url_property(None, ""), None);
    }

    #[test]
    fn test_get_component_binds_request_params() {
        let registry = registry();
        let controller = Controller::new(&registry).with_param("post_slug", "first");

        let component = get_component(&controller, "blogPost", "blog/post").unwrap();
        assert_eq!(component.property("slug"), Some("first"));
        assert_eq!(
            url_property(Some(&component as &dyn Component), "slug").as_deref(),
            Some("post_slug")
        );

        assert!(get_component(&controller, "blogPost", "missing").is_none());
        assert!(get_component(&controller, "blogCategories", "blog/post").is_none());
    }

    #[test]
    fn test_set_urls_visits_every_item() {
        let registry = registry();
        let controller = Controller::new(&registry);
        let mut categories = vec![
            Category {
                id: 1,
                name: "Rust".into(),
                slug: "rust".into(),
                url: None,
            },
            Category {
                id: 2,
                name: "Go".into(),
                slug: "go".into(),
                url: None,
            },
        ];
        let params = UrlParams::from([("slug".to_string(), "category_slug".to_string())]);
        set_urls(categories.iter_mut(), "blog/category", &controller, &params);

        assert_eq!(categories[0].url.as_deref(), Some("/blog/category/rust"));
        assert_eq!(categories[1].url.as_deref(), Some("/blog/category/go"));

        let mut none: Vec<Category> = Vec::new();
        set_urls(none.iter_mut(), "blog/category", &controller, &params);
    }
}
