use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use interview_weaver::{bundle, config, output, render, section};

use interview_weaver::cli::{Cli, Commands};
use interview_weaver::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "weaver=debug"
    } else {
        "weaver=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().await?;

    match cli.command {
        Commands::Build { page } => {
            let pages = select_pages(&config, page.as_deref())?;
            build_pages(&config, &pages, cli.quiet).await?;
        }
        Commands::Check => {
            check_pages(&config).await?;
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                println!("Edit the config file to add pages and speakers:");
                println!("  config.yaml (current directory takes precedence)");
            }
        }
    }

    Ok(())
}

fn select_pages<'a>(
    config: &'a Config,
    page_id: Option<&str>,
) -> Result<Vec<&'a config::PageConfig>> {
    match page_id {
        Some(id) => {
            let page = config
                .page(id)
                .ok_or_else(|| anyhow::anyhow!("No page with id '{}' in configuration", id))?;
            Ok(vec![page])
        }
        None => Ok(config.pages.iter().collect()),
    }
}

async fn build_pages(
    config: &Config,
    pages: &[&config::PageConfig],
    quiet: bool,
) -> Result<()> {
    if pages.is_empty() {
        println!("No pages configured. Add pages to config.yaml and re-run.");
        return Ok(());
    }

    let catalog = bundle::load_catalog(&config.site.images_file).await?;

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(pages.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30}] {pos}/{len} {msg}")
                .unwrap(),
        );
        bar
    };

    let mut failed = 0usize;
    for page in pages {
        progress.set_message(page.page_id.clone());

        // A bad page aborts only itself; the rest of the batch proceeds
        match build_one(config, page, &catalog).await {
            Ok(()) => {
                tracing::info!(page_id = %page.page_id, output = %page.output_file.display(), "page written");
            }
            Err(e) => {
                failed += 1;
                progress.suspend(|| output::print_failure(&page.page_id, &e));
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    let built = pages.len() - failed;
    println!(
        "{} {} page(s) written{}",
        style("✓").green(),
        built,
        if failed > 0 {
            format!(", {} failed", failed)
        } else {
            String::new()
        }
    );

    if failed > 0 {
        anyhow::bail!("{} page(s) failed to build", failed);
    }
    Ok(())
}

async fn build_one(
    config: &Config,
    page: &config::PageConfig,
    catalog: &section::ImageCatalog,
) -> Result<()> {
    let bundle = bundle::load_bundle(page, &config.site, catalog).await?;
    let html = render::render_page(&bundle, config)?;
    output::write_page(&page.output_file, &html).await?;
    Ok(())
}

async fn check_pages(config: &Config) -> Result<()> {
    config.validate()?;

    if config.pages.is_empty() {
        println!("No pages configured.");
        return Ok(());
    }

    let catalog = bundle::load_catalog(&config.site.images_file).await?;

    let mut failed = 0usize;
    for page in &config.pages {
        match bundle::load_bundle(page, &config.site, &catalog).await {
            Ok(bundle) => {
                let report = output::inspect_bundle(&bundle);
                output::print_report(&report);
            }
            Err(e) => {
                failed += 1;
                output::print_failure(&page.page_id, &e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} page(s) failed validation", failed);
    }
    println!("{} configuration OK", style("✓").green());
    Ok(())
}
