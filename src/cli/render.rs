use crate::components::render_page;
use crate::services::translation::Translation;
use anyhow::Result;
use std::path::Path;

pub fn run(
    config_path: &Path,
    page: &str,
    params: Vec<(String, String)>,
    locale: Option<String>,
) -> Result<()> {
    let (config, db) = super::open(config_path)?;
    let translation = Translation::from_config(&config.translation);
    let registry = config.registry();

    let mut controller = config.controller(&registry)?.with_params(params);
    if let Some(locale) = locale {
        controller = controller.with_locale(locale);
    }

    let output = render_page(&db, &controller, &translation, page)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
