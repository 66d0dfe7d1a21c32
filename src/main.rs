use blog_taxonomy::cli::{Cli, Commands};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blog_taxonomy=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Migrate { command }) => {
            blog_taxonomy::cli::migrate::run(&cli.config, command)?;
        }
        Some(Commands::Series { command }) => {
            blog_taxonomy::cli::series::run(&cli.config, command)?;
        }
        Some(Commands::Post { command }) => {
            blog_taxonomy::cli::post::run(&cli.config, command)?;
        }
        Some(Commands::Render {
            page,
            params,
            locale,
        }) => {
            blog_taxonomy::cli::render::run(&cli.config, &page, params, locale)?;
        }
        Some(Commands::Orders) => {
            blog_taxonomy::cli::series::list_orders();
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
