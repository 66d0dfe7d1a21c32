pub mod migrate;
pub mod post;
pub mod render;
pub mod series;

use crate::{Config, Database};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "taxonomy")]
#[command(version)]
#[command(about = "Series taxonomy for blog posts", long_about = None)]
pub struct Cli {
    #[arg(short, long, default_value = "taxonomy.toml", env = "TAXONOMY_CONFIG")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    Migrate {
        #[command(subcommand)]
        command: Option<MigrateCommand>,
    },
    Series {
        #[command(subcommand)]
        command: SeriesCommand,
    },
    Post {
        #[command(subcommand)]
        command: PostCommand,
    },
    /// Run the series components of a page and print their output as JSON
    Render {
        #[arg(long)]
        page: String,
        /// Route parameter, as `name=value`
        #[arg(long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
        #[arg(long)]
        locale: Option<String>,
    },
    /// List the orders a series list accepts
    Orders,
}

#[derive(Subcommand)]
pub enum MigrateCommand {
    Status,
}

#[derive(Subcommand)]
pub enum SeriesCommand {
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        slug: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
    },
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        slug: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    List {
        #[arg(long)]
        order: Option<String>,
        #[arg(long, default_value = "0")]
        limit: usize,
        #[arg(long)]
        all: bool,
        #[arg(long)]
        locale: Option<String>,
    },
    Show {
        slug: String,
        #[arg(long)]
        locale: Option<String>,
    },
    Delete {
        id: i64,
        /// Overrides `series.on_delete` (nullify, restrict, cascade)
        #[arg(long)]
        on_delete: Option<String>,
    },
    Translate {
        id: i64,
        #[arg(long)]
        locale: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        slug: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Attach an image file as a featured image
    Attach {
        id: i64,
        file: PathBuf,
        #[arg(long)]
        title: Option<String>,
    },
    /// Remove a featured image and its stored file
    Detach { id: i64, file_id: i64 },
}

#[derive(Subcommand)]
pub enum PostCommand {
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        slug: Option<String>,
        #[arg(long)]
        excerpt: Option<String>,
        #[arg(long)]
        series: Option<String>,
        /// Category names, created when missing
        #[arg(long = "category")]
        categories: Vec<String>,
        #[arg(long)]
        draft: bool,
        /// Publish time, RFC 3339 or `YYYY-MM-DD HH:MM:SS` (UTC)
        #[arg(long)]
        published_at: Option<String>,
    },
    /// Move a post into a series, or out of its series without `--series`
    Move {
        id: i64,
        #[arg(long)]
        series: Option<String>,
    },
}

/// Loads the configuration and opens its database.
pub(crate) fn open(config_path: &Path) -> Result<(Config, Database)> {
    let config = Config::load(config_path)?;
    let db = Database::open_with_pool_size(&config.database.path, config.database.pool_size)?;
    Ok((config, db))
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("invalid parameter '{}', expected name=value", s))
}
