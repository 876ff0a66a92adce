use clap::{Parser, ValueEnum};
use colored::Colorize;
use sitedata::fetch::Source;
use sitedata::{render, SiteConfig, SiteData, DEFAULT_PUBLICATIONS_SOURCE, DEFAULT_TEACHING_SOURCE};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "sitedata")]
#[command(version)]
#[command(about = "Render teaching and publication lists for an academic site", long_about = None)]
struct Args {
    /// Teaching activities (comma-separated, with header row): path or URL
    #[arg(long, default_value = DEFAULT_TEACHING_SOURCE)]
    teaching: String,

    /// Bibliography: path or URL
    #[arg(long, default_value = DEFAULT_PUBLICATIONS_SOURCE)]
    publications: String,

    /// Show only publications of this entry type (repeatable)
    #[arg(long = "filter", value_name = "TYPE")]
    filters: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Html)]
    format: Format,

    /// Load a single section
    #[arg(long, value_enum)]
    only: Option<Section>,

    /// Verbose output
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Html,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Section {
    Teaching,
    Publications,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("sitedata=debug")
            .with_writer(std::io::stderr)
            .init();
    }

    let config = SiteConfig {
        teaching: Source::parse(&args.teaching),
        publications: Source::parse(&args.publications),
        load_teaching: args.only != Some(Section::Publications),
        load_publications: args.only != Some(Section::Teaching),
    };

    let mut data = match SiteData::load(&config).await {
        Ok(data) => data,
        Err(e) => {
            eprintln!("{} Failed to initialize loader: {}", "Error:".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    data.apply_filters(&args.filters);

    for err in [
        data.teaching.as_ref().and_then(|r| r.as_ref().err()),
        data.publications.as_ref().and_then(|r| r.as_ref().err()),
    ]
    .into_iter()
    .flatten()
    {
        eprintln!("{} {}", "Warning:".yellow().bold(), err);
    }

    match args.format {
        Format::Html => print!("{}", render::render_site(&data)),
        Format::Json => match render::site_json(&data)
            .and_then(|value| serde_json::to_string_pretty(&value))
        {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("{} Failed to write JSON: {}", "Error:".red().bold(), e);
                return ExitCode::FAILURE;
            }
        },
    }

    if data.failure_count() > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
