use crate::config::{CliOverrides, Config};
use crate::error::{NumLinksError, Result};
use crate::pipeline::{InputKind, Request};
use crate::scanner::InputScanner;
use clap::{Parser, ValueEnum};
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "numlinks")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Turn lists of numbers into +number and t.me/+number files")]
#[command(
    long_about = "numlinks finds every run of digits in text, text files and spreadsheets and \
                  writes two files per input: one with each number prefixed by '+', one with \
                  each number as a t.me/+ link. Output files are named sequentially \
                  (evan.txt, evan_1.txt, ...) and never overwrite existing files."
)]
#[command(after_help = "EXAMPLES:\n  \
    numlinks --text \"8801712345678\"\n  \
    numlinks contacts.xlsx numbers.txt\n  \
    numlinks uploads/ --output-dir links --prefix batch\n  \
    cat numbers.txt | numlinks --stdin\n  \
    numlinks export.dat --kind text")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Text files, spreadsheets or directories to process, one request each
    pub inputs: Vec<PathBuf>,

    /// Process this text as one message
    #[arg(short, long)]
    pub text: Option<String>,

    /// Read one message from standard input
    #[arg(long)]
    pub stdin: bool,

    /// Declared kind for the input files instead of guessing from the extension
    #[arg(short, long, value_enum)]
    pub kind: Option<InputKind>,

    /// Directory that receives the generated files
    #[arg(short, long, env = "NUMLINKS_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Base name of the generated files
    #[arg(short, long, env = "NUMLINKS_PREFIX")]
    pub prefix: Option<String>,

    /// Minimum number of digits for a number to be picked up
    #[arg(short = 'm', long)]
    pub min_length: Option<usize>,

    /// How deep to look inside input directories
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show what would be processed and which names would be used, without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_min_token_length(self.min_length)
            .with_output_dir(self.output_dir.clone())
            .with_prefix(self.prefix.clone())
            .with_max_depth(self.max_depth)
    }

    /// Builds the request list in command-line order: `--text`, then stdin, then input paths.
    pub fn collect_requests(&self, config: &Config) -> Result<Vec<Request>> {
        let mut requests = Vec::new();

        if let Some(ref text) = self.text {
            requests.push(Request::text(text.clone()));
        }

        if self.stdin {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .map_err(|e| NumLinksError::InvalidPath {
                    path: format!("<stdin>: {}", e),
                })?;
            requests.push(Request::text(body));
        }

        let scanner = InputScanner::new(&config.input)
            .with_forced_kind(self.kind)
            .excluding_dir(&config.output.directory);
        requests.extend(scanner.scan(&self.inputs)?);

        Ok(requests)
    }

    pub fn has_requests(&self) -> bool {
        self.text.is_some() || self.stdin || !self.inputs.is_empty()
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Log filter used when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        match self.verbosity_level() {
            0 => "numlinks=warn",
            1 => "numlinks=info",
            2 => "numlinks=debug",
            _ => "numlinks=trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("numlinks").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_inputs_and_flags() {
        let cli = parse(&["a.txt", "b.xlsx", "--prefix", "batch", "-m", "7", "-vv"]);
        assert_eq!(cli.inputs, vec![PathBuf::from("a.txt"), PathBuf::from("b.xlsx")]);
        assert_eq!(cli.prefix.as_deref(), Some("batch"));
        assert_eq!(cli.min_length, Some(7));
        assert_eq!(cli.verbosity_level(), 2);
        assert_eq!(cli.default_log_filter(), "numlinks=debug");
    }

    #[test]
    fn test_parse_kind() {
        let cli = parse(&["export.dat", "--kind", "tabular"]);
        assert_eq!(cli.kind, Some(InputKind::Tabular));
        assert!(Cli::try_parse_from(["numlinks", "x", "--kind", "pdf"]).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["numlinks", "x", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_overrides_applied() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        let cli = parse(&[
            "--text",
            "12345",
            "--output-dir",
            out.to_str().unwrap(),
            "--min-length",
            "6",
        ]);

        let config = cli.load_config().unwrap();
        assert_eq!(config.output.directory, out);
        assert_eq!(config.extraction.min_token_length, 6);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let cli = parse(&["--text", "12345", "--prefix", "a/b"]);
        assert!(matches!(cli.load_config(), Err(NumLinksError::Config { .. })));
    }

    #[test]
    fn test_collect_requests_order() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("numbers.txt");
        fs::write(&file, "12345").unwrap();

        let cli = parse(&["--text", "99999", file.to_str().unwrap()]);
        let requests = cli.collect_requests(&Config::default()).unwrap();

        assert_eq!(
            requests,
            vec![
                Request::text("99999"),
                Request::file(&file, InputKind::Text),
            ]
        );
        assert!(cli.has_requests());
    }
}
