pub mod artifact;
pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod pipeline;
pub mod report;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, ExtractionConfig, InputConfig, OutputConfig};
pub use error::{NumLinksError, Result, UserFriendlyError};

// Core functionality re-exports
pub use artifact::{ArtifactPair, ArtifactWriter, FormatTransformer, FormattedPair, NameAllocator};
pub use extractor::{TabularTokenExtractor, TextTokenExtractor, TokenSequence};
pub use pipeline::{InputKind, Pipeline, Reply, Request};
pub use report::{RequestOutcome, RequestResult, RunReport, RunTracker};
pub use scanner::{InputFilter, InputScanner};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use std::path::{Path, PathBuf};
use tokio::task;

/// Main library interface: runs a batch of requests through one shared pipeline.
pub struct NumLinks {
    config: Config,
    pipeline: Pipeline,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl NumLinks {
    /// Creates the output directory if it does not exist yet.
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let pipeline = Pipeline::new(&config)?;
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);
        let shutdown = GracefulShutdown::new()?;

        Ok(Self {
            config,
            pipeline,
            output_formatter,
            progress_manager,
            shutdown,
        })
    }

    /// Create a NumLinks instance for testing (no signal handler conflicts)
    #[cfg(test)]
    pub fn new_for_test(config: Config) -> Result<Self> {
        Ok(Self {
            pipeline: Pipeline::new(&config)?,
            config,
            output_formatter: OutputFormatter::new(OutputMode::Plain, 0, true),
            progress_manager: ProgressManager::new(false),
            shutdown: GracefulShutdown::new_for_test(),
        })
    }

    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(config, output_mode, cli_args.verbose, cli_args.quiet)
    }

    /// Processes each request independently; one failing request does not stop the others.
    pub async fn run(&self, requests: Vec<Request>) -> Result<RunReport> {
        self.shutdown.check_shutdown()?;

        self.output_formatter.start_operation(&format!(
            "Processing {} input(s) into {}",
            requests.len(),
            self.pipeline.output_directory().display()
        ));

        self.output_formatter.info(&format!(
            "Prefix {:?}, numbers need at least {} digits",
            self.config.output.prefix, self.config.extraction.min_token_length
        ));

        let mut tracker = RunTracker::new(requests.len());
        let batch_progress = self.progress_manager.create_batch_progress(requests.len() as u64);

        for request in requests {
            self.shutdown.check_shutdown()?;
            let source = request.describe();
            ui::progress::update_batch_progress(&batch_progress, &tracker, &source);
            self.progress_manager
                .suspend(|| self.output_formatter.debug(&format!("Processing {}", source)));

            let pipeline = self.pipeline.clone();
            let request_result = task::spawn_blocking(move || pipeline.respond(&request))
                .await
                .map_err(|e| NumLinksError::Internal {
                    message: format!("Request task failed: {}", e),
                })?;

            self.progress_manager
                .suspend(|| self.output_formatter.print_request_result(&request_result));
            tracker.record(request_result);
        }

        batch_progress.set_position(tracker.processed() as u64);
        ui::progress::finish_progress_with_summary(
            &batch_progress,
            &format!("Processed {} input(s)", tracker.processed()),
            tracker.elapsed(),
        );

        Ok(tracker.finish(
            self.pipeline.output_directory().to_path_buf(),
            self.config.output.prefix.clone(),
        ))
    }

    /// Names the next request would be written to, without touching the directory.
    pub fn planned_names(&self) -> Result<(PathBuf, PathBuf)> {
        let writer = self.pipeline.writer();
        writer.allocator().peek_pair(writer.prefix())
    }

    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        Config::default().save_to_file(output_path)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    pub fn handle_error(&self, error: &NumLinksError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}
