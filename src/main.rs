use anyhow::Result;
use clap::Parser;
use colored::*;
use docs2pdf::config::{CliFlags, Config};
use docs2pdf::fetch::HttpClient;
use docs2pdf::progress::{LogProgress, ProgressSink};
use docs2pdf::render::Chrome;
use docs2pdf::{pdf, pdf_merger, pipeline, sidebar};
use std::process;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "docs2pdf")]
#[command(about = "CLI utility to turn a Docusaurus documentation website into a single merged PDF")]
#[command(version = "0.1.0")]
struct Args {
    /// Base URL of the site (e.g. https://docs.example.com)
    #[arg(long = "baseUrl")]
    base_url: Option<String>,

    /// Entry point URL where sidebar discovery starts
    #[arg(long = "entryPoint")]
    entry_point: Option<String>,

    /// Only include sidebar links whose href contains one of these values
    #[arg(long = "directories", num_args = 1..)]
    directories: Vec<String>,

    /// Custom CSS injected into every page before rendering
    #[arg(long = "customStyles")]
    custom_styles: Option<String>,

    /// Output PDF path
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// Disable lazy loading for images so they render immediately
    #[arg(long = "forceImages")]
    force_images: bool,
}

async fn run(args: Args) -> Result<()> {
    let config = Config::resolve(CliFlags {
        base_url: args.base_url,
        entry_point: args.entry_point,
        directories: args.directories,
        custom_styles: args.custom_styles,
        output: args.output,
        force_images: args.force_images,
    })?;

    info!("Scraping sidebar from \"{}\"", config.entry_point.green());
    let client = HttpClient::new();
    let nodes = sidebar::scrape_sidebar(
        &client,
        &config.entry_point,
        &config.base_url,
        &config.required_dirs,
    )
    .await?;

    let mut progress = LogProgress::new();
    progress.start(sidebar::count_items(&nodes));

    let chrome = Chrome::launch().await?;
    let result = pipeline::generate_all_pdfs(
        &chrome,
        &client,
        &nodes,
        &config.base_url,
        &mut progress,
        config.custom_styles.as_deref(),
        config.force_images,
    )
    .await;
    chrome.close().await?;
    let buffers = result?;

    let merged = pdf_merger::merge_pdfs(&buffers)?;
    pdf::save_pdf(&merged, &config.output).await?;
    progress.stop();

    Ok(())
}

#[tokio::main]
async fn main() {
    // Set up logging with chromiumoxide errors suppressed
    let filter = EnvFilter::from_default_env()
        .add_directive("chromiumoxide::conn=off".parse().unwrap())
        .add_directive("chromiumoxide::handler=off".parse().unwrap())
        .add_directive("docs2pdf=info".parse().unwrap());

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!("{}", format!("Error: {}", e).red());
        process::exit(1);
    }
}
