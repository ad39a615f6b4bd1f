use clap::Parser;
use log::{error, info};
use overxrpt_core::cli::{Cli, OutputFormat};
use overxrpt_core::{OverexposureAnalyser, OverexposureAnalysis, TextReport};
use std::process;

fn main() {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.verbose);

    let config = match cli.run_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let analysis = match OverexposureAnalyser::analyse(&cli.report, &config) {
        Ok(analysis) => analysis,
        Err(e) => {
            error!("Failed to analyse {}: {}", cli.report.display(), e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if cli.summary {
        eprintln!("{}", TextReport::new(&analysis));
    }

    let rendered = render(&analysis, &cli.format);
    match &cli.output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, rendered) {
                error!("Failed to write {}: {}", path.display(), e);
                eprintln!("Error: Failed to write {}: {}", path.display(), e);
                process::exit(1);
            }
            info!("Draft written to {}", path.display());
        }
        None => print!("{}", rendered),
    }
}

fn setup_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
}

fn render(analysis: &OverexposureAnalysis, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Text => analysis.email.to_string(),
        OutputFormat::Html => analysis.email.to_html(),
        OutputFormat::Json => {
            #[cfg(feature = "json")]
            {
                match serde_json::to_string_pretty(analysis) {
                    Ok(json) => json + "\n",
                    Err(e) => {
                        error!("Failed to serialize to JSON: {}", e);
                        eprintln!("Error: Failed to serialize to JSON: {}", e);
                        process::exit(1);
                    }
                }
            }
            #[cfg(not(feature = "json"))]
            {
                eprintln!("Error: JSON output requires the 'json' feature");
                eprintln!("Rebuild with: cargo build --features json");
                process::exit(1);
            }
        }
    }
}
