use crate::cli::PostCommand;
use crate::models::CreatePost;
use crate::services::posts;
use crate::services::series::get_series_by_slug;
use crate::services::translation::Translation;
use crate::Database;
use anyhow::{Context, Result};
use std::path::Path;

pub fn run(config_path: &Path, command: PostCommand) -> Result<()> {
    let (_, db) = super::open(config_path)?;

    match command {
        PostCommand::Add {
            title,
            slug,
            excerpt,
            series,
            categories,
            draft,
            published_at,
        } => {
            let series_id = series_id(&db, series.as_deref())?;
            let input = CreatePost {
                title,
                slug,
                excerpt,
                published: !draft,
                published_at,
                series_id,
            };
            let id = posts::create_post(&db, &input)?;
            for name in &categories {
                let category_id = posts::ensure_category(&db, name)?;
                posts::add_post_category(&db, id, category_id)?;
            }
            println!("Created post {}", id);
        }
        PostCommand::Move { id, series } => {
            let series_id = series_id(&db, series.as_deref())?;
            posts::set_post_series(&db, id, series_id)?;
            match series {
                Some(slug) => println!("Moved post {} into series '{}'", id, slug),
                None => println!("Removed post {} from its series", id),
            }
        }
    }

    Ok(())
}

fn series_id(db: &Database, slug: Option<&str>) -> Result<Option<i64>> {
    let Some(slug) = slug else {
        return Ok(None);
    };
    let series = get_series_by_slug(db, slug, &Translation::Disabled, None)?
        .with_context(|| format!("Series '{}' not found", slug))?;
    Ok(Some(series.id))
}
