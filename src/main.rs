use clap::Parser;
use numlinks::{Cli, NumLinks, NumLinksError, OutputFormatter, OutputMode, RunReport, UserFriendlyError};
use std::process;

#[tokio::main]
async fn main() {
    let exit_code = run().await;
    process::exit(exit_code);
}

async fn run() -> i32 {
    let cli = Cli::parse();
    init_logging(&cli);

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let numlinks = match NumLinks::from_cli(&cli) {
        Ok(numlinks) => numlinks,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    if !cli.has_requests() {
        let error = NumLinksError::Config {
            message: "No input given: pass files, --text or --stdin".to_string(),
        };
        numlinks.handle_error(&error);
        return exit_code_for(&error);
    }

    let requests = match cli.collect_requests(numlinks.config()) {
        Ok(requests) => requests,
        Err(e) => {
            numlinks.handle_error(&e);
            return exit_code_for(&e);
        }
    };

    if cli.dry_run {
        return handle_dry_run(&numlinks, &requests);
    }

    match numlinks.run(requests).await {
        Ok(report) => {
            numlinks.output_formatter().print_run_report(&report);
            exit_code_for_report(&report)
        }
        Err(e) => {
            numlinks.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &NumLinksError) -> i32 {
    match error {
        NumLinksError::Cancelled => 130, // Interrupted (SIGINT)
        NumLinksError::UnsupportedFormat { .. } => 2,
        NumLinksError::DataSource { .. } => 3,
        NumLinksError::Allocation { .. } => 4,
        NumLinksError::Write { .. } => 5,
        NumLinksError::NoTokensFound => 6,
        NumLinksError::InvalidPath { .. } => 7,
        _ => 1, // General error
    }
}

fn exit_code_for_report(report: &RunReport) -> i32 {
    if report.has_failures() {
        2 // Finished with failed inputs
    } else if report.written() == 0 {
        6 // Nothing found anywhere
    } else {
        0
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "numlinks.toml".to_string());

    match NumLinks::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  numlinks <inputs> --config {}", config_path);
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(numlinks: &NumLinks, requests: &[numlinks::Request]) -> i32 {
    let formatter = numlinks.output_formatter();
    let config = numlinks.config();

    formatter.print_header("Dry run - no files will be written");
    println!("  Output directory: {}", config.output.directory.display());
    println!("  Prefix:           {}", config.output.prefix);
    println!("  Minimum digits:   {}", config.extraction.min_token_length);
    formatter.print_separator();

    for request in requests {
        let kind = match request {
            numlinks::Request::Text(_) => "text".to_string(),
            numlinks::Request::File { kind, .. } => kind.clone(),
        };
        println!("  [{}] {}", kind, request.describe());
    }

    match numlinks.planned_names() {
        Ok((plus, link)) => {
            formatter.print_separator();
            println!("  First request would write:");
            println!("    {}", plus.display());
            println!("    {}", link.display());
            0
        }
        Err(e) => {
            numlinks.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn print_startup_error(error: &NumLinksError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

fn init_logging(cli: &Cli) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.default_log_filter()));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_generate_config_command() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let cli = Cli::try_parse_from([
            "numlinks",
            "--generate-config",
            "--config",
            config_path.to_str().unwrap(),
        ])
        .unwrap();

        assert_eq!(handle_generate_config(&cli), 0);
        let content = std::fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[output]"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code_for(&NumLinksError::Cancelled), 130);
        assert_eq!(exit_code_for(&NumLinksError::NoTokensFound), 6);
        assert_eq!(
            exit_code_for(&NumLinksError::data_source(PathBuf::from("a.xlsx"), "corrupt")),
            3
        );
        assert_eq!(
            exit_code_for(&NumLinksError::Config {
                message: "bad".to_string()
            }),
            1
        );
    }
}
