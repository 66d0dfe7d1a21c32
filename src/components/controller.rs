use super::{Component, ThemeRegistry, UrlParams};
use std::collections::HashMap;
use url::Url;

/// Request context of a render pass: the theme registry, the matched route
/// parameters, and where generated URLs point to.
#[derive(Debug, Clone)]
pub struct Controller<'a> {
    registry: &'a ThemeRegistry,
    params: HashMap<String, String>,
    base_url: Option<Url>,
    locale: Option<String>,
    binds_params: bool,
}

impl<'a> Controller<'a> {
    pub fn new(registry: &'a ThemeRegistry) -> Self {
        Self {
            registry,
            params: HashMap::new(),
            base_url: None,
            locale: None,
            binds_params: true,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in params {
            self.params.insert(name.into(), value.into());
        }
        self
    }

    /// Generated URLs become absolute under `base_url`.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// A context that leaves component properties as the page defines them.
    pub fn without_param_binding(mut self) -> Self {
        self.binds_params = false;
        self
    }

    pub fn registry(&self) -> &'a ThemeRegistry {
        self.registry
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn supports_param_binding(&self) -> bool {
        self.binds_params
    }

    /// Resolves every `{{ :param }}` property of `component` against the
    /// current route parameters.
    pub fn set_component_properties_from_params(&self, component: &mut dyn Component) {
        let bound: Vec<(String, String)> = component
            .properties()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .external()
                    .map(|param| (name.to_string(), param.to_string()))
            })
            .collect();

        let properties = component.properties_mut();
        for (name, param) in bound {
            properties.bind(&name, self.param(&param));
        }
    }

    /// Binds the component if this context supports it.
    pub fn bind(&self, component: &mut dyn Component) {
        if self.binds_params {
            self.set_component_properties_from_params(component);
        }
    }

    /// Builds the URL of a theme page, filling its `:param` segments.
    ///
    /// Optional segments (`:param?`) without a value end the path. Returns
    /// `None` if the page does not exist or a required parameter is missing.
    pub fn page_url(&self, page_name: &str, params: &UrlParams) -> Option<String> {
        let page = match self.registry.load_page(page_name) {
            Some(page) => page,
            None => {
                tracing::debug!("Page '{}' not found, leaving URL unset", page_name);
                return None;
            }
        };

        let mut segments: Vec<String> = Vec::new();
        for segment in page.url.split('/').filter(|s| !s.is_empty()) {
            let Some(pattern) = segment.strip_prefix(':') else {
                segments.push(segment.to_string());
                continue;
            };

            // `:name?default` and `:name|regex` forms.
            let pattern = pattern.split('|').next().unwrap_or(pattern);
            let (name, optional, default) = match pattern.split_once('?') {
                Some((name, default)) => (name, true, Some(default).filter(|d| !d.is_empty())),
                None => (pattern, false, None),
            };

            match params.get(name).map(String::as_str).or(default) {
                Some(value) if !value.is_empty() => segments.push(value.to_string()),
                _ if optional => break,
                _ => {
                    tracing::debug!(
                        "Missing parameter '{}' for page '{}'",
                        name,
                        page_name
                    );
                    return None;
                }
            }
        }

        self.build_url(&segments)
    }

    fn build_url(&self, segments: &[String]) -> Option<String> {
        let mut url = match &self.base_url {
            Some(base) => base.clone(),
            None => Url::parse("http://localhost/").ok()?,
        };
        {
            let mut path = url.path_segments_mut().ok()?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }

        if self.base_url.is_some() {
            Some(url.to_string())
        } else if segments.is_empty() {
            Some("/".to_string())
        } else {
            Some(url.path().to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Page, Theme};
    use std::collections::BTreeMap;

    fn registry() -> ThemeRegistry {
        let page = |name: &str, url: &str| Page {
            name: name.to_string(),
            url: url.to_string(),
            components: BTreeMap::new(),
        };
        ThemeRegistry::new(
            [Theme {
                name: "default".to_string(),
                pages: vec![
                    page("blog/post", "/blog/post/:slug"),
                    page("blog/archive", "/blog/:category?/:page?"),
                    page("blog/paged", "/blog/list/:page?1"),
                    page("home", "/"),
                ],
            }],
            None,
        )
    }

    fn params(pairs: &[(&str, &str)]) -> UrlParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_page_url_fills_required_params() {
        let registry = registry();
        let controller = Controller::new(&registry);
        assert_eq!(
            controller.page_url("blog/post", &params(&[("slug", "hello-world")])),
            Some("/blog/post/hello-world".to_string())
        );
    }

    #[test]
    fn test_page_url_missing_required_param() {
        let registry = registry();
        let controller = Controller::new(&registry);
        assert_eq!(controller.page_url("blog/post", &UrlParams::new()), None);
    }

    #[test]
    fn test_page_url_unknown_page() {
        let registry = registry();
        let controller = Controller::new(&registry);
        assert_eq!(
            controller.page_url("missing", &params(&[("slug", "x")])),
            None
        );
    }

    #[test]
    fn test_page_url_drops_trailing_optional_segments() {
        let registry = registry();
        let controller = Controller::new(&registry);
        assert_eq!(
            controller.page_url("blog/archive", &params(&[("category", "rust")])),
            Some("/blog/rust".to_string())
        );
        assert_eq!(
            controller.page_url("blog/archive", &UrlParams::new()),
            Some("/blog".to_string())
        );
        assert_eq!(
            controller.page_url("blog/paged", &UrlParams::new()),
            Some("/blog/list/1".to_string())
        );
        assert_eq!(
            controller.page_url("home", &UrlParams::new()),
            Some("/".to_string())
        );
    }

    #[test]
    fn test_page_url_encodes_segments() {
        let registry = registry();
        let controller = Controller::new(&registry);
        assert_eq!(
            controller.page_url("blog/post", &params(&[("slug", "a b/c")])),
            Some("/blog/post/a%20b%2Fc".to_string())
        );
    }

    #[test]
    fn test_page_url_with_base_url() {
        let registry = registry();
        let controller = Controller::new(&registry)
            .with_base_url(Url::parse("https://example.com/").unwrap());
        assert_eq!(
            controller.page_url("blog/post", &params(&[("slug", "hello")])),
            Some("https://example.com/blog/post/hello".to_string())
        );
    }

    #[test]
    fn test_bind_respects_capability() {
        let registry = registry();
        let page = Page {
            name: "p".to_string(),
            url: "/".to_string(),
            components: BTreeMap::from([(
                "blogPost".to_string(),
                BTreeMap::from([("slug".to_string(), "{{ :slug }}".to_string())]),
            )]),
        };

        let controller = Controller::new(&registry).with_param("slug", "from-request");
        let mut component = page.get_component("blogPost").unwrap();
        controller.bind(&mut component);
        assert_eq!(component.properties().value("slug"), Some("from-request"));

        let controller = controller.without_param_binding();
        let mut component = page.get_component("blogPost").unwrap();
        controller.bind(&mut component);
        assert_eq!(component.properties().value("slug"), None);
        assert!(!controller.supports_param_binding());
    }
}
