#[cfg(test)]
mod tests {

    mod slug_tests {
        use crate::services::slug::{generate_slug, slug_or_generate, validate_slug};

        #[test]
        fn test_generate_slug_basic() {
            assert_eq!(generate_slug("Hello World"), "hello-world");
        }

        #[test]
        fn test_generate_slug_special_characters() {
            assert_eq!(generate_slug("My Series!"), "my-series");
        }

        #[test]
        fn test_generate_slug_unicode() {
            assert_eq!(generate_slug("Café au lait"), "cafe-au-lait");
        }

        #[test]
        fn test_generate_slug_multiple_spaces() {
            assert_eq!(generate_slug("Hello   World"), "hello-world");
        }

        #[test]
        fn test_generate_slug_leading_trailing_spaces() {
            assert_eq!(generate_slug("  Hello World  "), "hello-world");
        }

        #[test]
        fn test_generate_slug_is_idempotent() {
            for title in ["Rust, in 10 Steps?", "Ünïcödé   Series", "--already-a-slug--"] {
                let once = generate_slug(title);
                assert_eq!(generate_slug(&once), once);
            }
        }

        #[test]
        fn test_slug_or_generate_prefers_explicit_slug() {
            assert_eq!(slug_or_generate(Some("custom"), "Title"), "custom");
            assert_eq!(slug_or_generate(Some("  "), "Some Title"), "some-title");
            assert_eq!(slug_or_generate(None, "Some Title"), "some-title");
        }

        #[test]
        fn test_validate_slug_valid() {
            assert!(validate_slug("hello-world"));
            assert!(validate_slug("Hello-World"));
            assert!(validate_slug("123"));
        }

        #[test]
        fn test_validate_slug_invalid_chars() {
            assert!(!validate_slug(""));
            assert!(!validate_slug("hello_world"));
            assert!(!validate_slug("hello world"));
            assert!(!validate_slug("my-series!"));
        }
    }

    mod order_tests {
        use crate::models::SeriesOrder;

        #[test]
        fn test_order_from_str() {
            assert_eq!("title asc".parse::<SeriesOrder>().unwrap(), SeriesOrder::TitleAsc);
            assert_eq!(
                "posts_count desc".parse::<SeriesOrder>().unwrap(),
                SeriesOrder::PostsCountDesc
            );
            assert_eq!("random".parse::<SeriesOrder>().unwrap(), SeriesOrder::Random);
        }

        #[test]
        fn test_order_from_str_normalizes() {
            assert_eq!(
                "  Created_At   DESC ".parse::<SeriesOrder>().unwrap(),
                SeriesOrder::CreatedAtDesc
            );
        }

        #[test]
        fn test_order_from_str_invalid() {
            assert!("color asc".parse::<SeriesOrder>().is_err());
            assert!("".parse::<SeriesOrder>().is_err());
        }

        #[test]
        fn test_every_order_has_label_and_sql() {
            for order in SeriesOrder::ALL {
                assert_eq!(order.as_str().parse::<SeriesOrder>().unwrap(), order);
                assert!(order.label_key().starts_with(crate::LOCALIZATION_KEY));
                assert!(!order.sql().is_empty());
            }
            assert_eq!(SeriesOrder::options().len(), SeriesOrder::ALL.len());
        }

        #[test]
        fn test_order_serde_uses_key() {
            let json = serde_json::to_string(&SeriesOrder::TitleDesc).unwrap();
            assert_eq!(json, "\"title desc\"");
            assert!(serde_json::from_str::<SeriesOrder>("\"color asc\"").is_err());
        }
    }

    mod policy_tests {
        use crate::models::PostDeletePolicy;

        #[test]
        fn test_policy_from_str() {
            assert_eq!("nullify".parse(), Ok(PostDeletePolicy::Nullify));
            assert_eq!("RESTRICT".parse(), Ok(PostDeletePolicy::Restrict));
            assert_eq!("cascade".parse(), Ok(PostDeletePolicy::Cascade));
            assert_eq!("drop".parse::<PostDeletePolicy>(), Err(()));
        }

        #[test]
        fn test_policy_default() {
            assert_eq!(PostDeletePolicy::default(), PostDeletePolicy::Nullify);
            assert_eq!(PostDeletePolicy::Cascade.to_string(), "cascade");
        }
    }

    mod url_params_tests {
        use crate::components::UrlParams;
        use crate::models::Series;

        fn series() -> Series {
            Series {
                id: 1,
                title: "Intro".into(),
                slug: "intro".into(),
                description: String::new(),
                created_at: String::new(),
                updated_at: String::new(),
                post_count: 0,
                locale: None,
                url: None,
            }
        }

        #[test]
        fn test_url_params_default_name() {
            let params = series().url_params(&UrlParams::new());
            assert_eq!(params.get("series").map(String::as_str), Some("intro"));
        }

        #[test]
        fn test_url_params_renamed() {
            let mut overrides = UrlParams::new();
            overrides.insert("series".into(), "topic".into());
            let params = series().url_params(&overrides);
            assert_eq!(params.len(), 1);
            assert_eq!(params.get("topic").map(String::as_str), Some("intro"));
        }
    }

    mod config_tests {
        use crate::Config;
        use std::path::Path;

        #[test]
        fn test_config_load_missing_file() {
            let result = Config::load(Path::new("/nonexistent/path.toml"));
            assert!(result.is_err());
        }

        #[test]
        fn test_config_load_valid_toml() {
            use std::io::Write;
            let temp_dir = std::env::temp_dir();
            let config_path = temp_dir.join("test_taxonomy_config.toml");

            let config_content = r#"
[database]
path = "data/blog.db"
pool_size = 2

[series]
on_delete = "cascade"
"#;

            let mut file = std::fs::File::create(&config_path).unwrap();
            file.write_all(config_content.as_bytes()).unwrap();

            let config = Config::load(&config_path).unwrap();
            assert_eq!(config.database.path, "data/blog.db");
            assert_eq!(config.database.pool_size, 2);
            assert_eq!(
                config.series.on_delete,
                crate::models::PostDeletePolicy::Cascade
            );

            std::fs::remove_file(&config_path).ok();
        }

        #[test]
        fn test_config_rejects_zero_pool() {
            assert!(Config::parse("[database]\npool_size = 0\n").is_err());
        }
    }
}
