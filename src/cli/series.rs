use crate::cli::SeriesCommand;
use crate::models::{CreateSeries, NewFile, PostDeletePolicy, SeriesOrder, TranslatedFields, UpdateSeries};
use crate::services::series;
use crate::services::translation::Translation;
use crate::services::validation::ValidationError;
use anyhow::{Context, Result};
use std::path::Path;

pub fn run(config_path: &Path, command: SeriesCommand) -> Result<()> {
    let (config, db) = super::open(config_path)?;
    let translation = Translation::from_config(&config.translation);

    match command {
        SeriesCommand::Add {
            title,
            slug,
            description,
        } => {
            let input = CreateSeries {
                title,
                slug,
                description,
            };
            let id = series::create_series(&db, &input).map_err(explain)?;
            println!("Created series {}", id);
        }
        SeriesCommand::Edit {
            id,
            title,
            slug,
            description,
        } => {
            let input = UpdateSeries {
                title,
                slug,
                description,
            };
            series::update_series(&db, id, &input).map_err(explain)?;
            println!("Updated series {}", id);
        }
        SeriesCommand::List {
            order,
            limit,
            all,
            locale,
        } => {
            let order = match order {
                Some(order) => order.parse::<SeriesOrder>()?,
                None => config.series.order()?,
            };
            let query = series::SeriesQuery {
                order,
                limit,
                include_empty: all,
            };
            let list = series::list_series(&db, &query, &translation, locale.as_deref())?;

            println!("{:<6} {:<30} {:<30} {:>6}", "ID", "TITLE", "SLUG", "POSTS");
            println!("{}", "-".repeat(75));
            for s in list {
                println!("{:<6} {:<30} {:<30} {:>6}", s.id, s.title, s.slug, s.post_count);
            }
        }
        SeriesCommand::Show { slug, locale } => {
            let found = series::get_series_by_slug(&db, &slug, &translation, locale.as_deref())?
                .with_context(|| format!("Series '{}' not found", slug))?;
            let posts = series::list_published_posts(&db, found.id)?;
            let images = series::list_featured_images(&db, found.id)?;
            let output = serde_json::json!({
                "series": found,
                "posts": posts,
                "featured_images": images,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        SeriesCommand::Delete { id, on_delete } => {
            let policy = match on_delete {
                Some(policy) => policy.parse::<PostDeletePolicy>().map_err(|_| {
                    anyhow::anyhow!("Invalid policy '{}'. Use nullify, restrict or cascade", policy)
                })?,
                None => config.series.on_delete,
            };
            series::delete_series(&db, config.media.upload_path(), id, policy)?;
            println!("Deleted series {} ({})", id, policy);
        }
        SeriesCommand::Translate {
            id,
            locale,
            title,
            slug,
            description,
        } => {
            let fields = TranslatedFields {
                title,
                slug,
                description,
            };
            if !translation.is_enabled() {
                anyhow::bail!("Translation is disabled; set translation.enabled in the configuration");
            }
            if fields.is_empty() {
                anyhow::bail!("Nothing to translate: pass --title, --slug or --description");
            }
            let stored = series::translate_series(&db, &translation, id, &locale, &fields)
                .map_err(explain)?;
            if stored {
                println!("Stored '{}' translation of series {}", locale, id);
            }
        }
        SeriesCommand::Attach { id, file, title } => {
            let (new_file, data) = read_file(&file, title)?;
            let attached = series::attach_featured_image(
                &db,
                config.media.upload_path(),
                id,
                &new_file,
                &data,
            )?;
            println!(
                "Attached {} to series {} as {} (file {})",
                attached.file_name, id, attached.disk_name, attached.id
            );
        }
        SeriesCommand::Detach { id, file_id } => {
            if series::detach_featured_image(&db, config.media.upload_path(), id, file_id)? {
                println!("Detached file {} from series {}", file_id, id);
            } else {
                anyhow::bail!("File {} is not attached to series {}", file_id, id);
            }
        }
    }

    Ok(())
}

pub fn list_orders() {
    for order in SeriesOrder::ALL {
        println!("{:<20} {}", order.as_str(), order.label_key());
    }
}

fn read_file(path: &Path, title: Option<String>) -> Result<(NewFile, Vec<u8>)> {
    let data = std::fs::read(path)
        .with_context(|| format!("Could not read '{}'", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("'{}' has no file name", path.display()))?
        .to_string();
    let content_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string();
    let file = NewFile {
        file_name,
        content_type,
        title,
    };
    Ok((file, data))
}

/// Lists every violated rule instead of the summary line.
fn explain(err: anyhow::Error) -> anyhow::Error {
    match err.downcast_ref::<ValidationError>() {
        Some(validation) => {
            for violation in &validation.violations {
                eprintln!("  {:?} {:?}: {}", violation.field, violation.rule, violation.message);
            }
            err
        }
        None => err,
    }
}
