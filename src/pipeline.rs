use crate::artifact::{ArtifactPair, ArtifactWriter, NameAllocator};
use crate::config::Config;
use crate::error::{NumLinksError, Result, UserFriendlyError};
use crate::extractor::{TabularTokenExtractor, TextTokenExtractor, TokenSequence};
use crate::report::RequestResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error, info, info_span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// Plain text, scanned as one blob for digit runs
    Text,
    /// Spreadsheet workbook, scanned sheet by sheet and column by column
    Tabular,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::Tabular => "tabular",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputKind {
    type Err = NumLinksError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(InputKind::Text),
            "tabular" => Ok(InputKind::Tabular),
            other => Err(NumLinksError::UnsupportedFormat {
                kind: other.to_string(),
            }),
        }
    }
}

/// One unit of work handed over by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// A message body.
    Text(String),
    /// A downloaded upload and the kind the transport declared for it.
    File { path: PathBuf, kind: String },
}

impl Request {
    pub fn text<S: Into<String>>(body: S) -> Self {
        Request::Text(body.into())
    }

    pub fn file<P: Into<PathBuf>>(path: P, kind: InputKind) -> Self {
        Request::File {
            path: path.into(),
            kind: kind.as_str().to_string(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Request::Text(body) => format!("text message ({} bytes)", body.len()),
            Request::File { path, .. } => path.display().to_string(),
        }
    }
}

/// What goes back to the requester: a message, or the two files to attach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    Message {
        text: String,
    },
    Documents {
        plus_file: PathBuf,
        link_file: PathBuf,
        token_count: usize,
    },
}

impl Reply {
    pub fn from_result(result: &Result<ArtifactPair>) -> Self {
        match result {
            Ok(pair) => Reply::Documents {
                plus_file: pair.plus_path.clone(),
                link_file: pair.link_path.clone(),
                token_count: pair.token_count,
            },
            Err(e) => Reply::Message {
                text: e.user_message(),
            },
        }
    }

    pub fn text(&self) -> String {
        match self {
            Reply::Message { text } => text.clone(),
            Reply::Documents {
                plus_file,
                link_file,
                token_count,
            } => format!(
                "Created {} and {} ({} numbers)",
                display_name(plus_file),
                display_name(link_file),
                token_count
            ),
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Extract, transform, allocate and write for one request at a time.
///
/// Cheap to clone; clones share one allocator and therefore one naming sequence.
#[derive(Clone)]
pub struct Pipeline {
    text: TextTokenExtractor,
    tabular: TabularTokenExtractor,
    writer: Arc<ArtifactWriter>,
}

impl Pipeline {
    pub fn new(config: &Config) -> Result<Self> {
        let allocator = NameAllocator::new(&config.output.directory)?
            .with_max_attempts(config.output.max_allocation_attempts);
        let writer = ArtifactWriter::new(Arc::new(allocator), config.output.prefix.clone());
        let text = TextTokenExtractor::new(config.extraction.min_token_length)?;

        Ok(Self::from_parts(text, writer))
    }

    pub fn from_parts(text: TextTokenExtractor, writer: ArtifactWriter) -> Self {
        Self {
            tabular: TabularTokenExtractor::new(text.clone()),
            text,
            writer: Arc::new(writer),
        }
    }

    pub fn writer(&self) -> &ArtifactWriter {
        &self.writer
    }

    pub fn output_directory(&self) -> &Path {
        self.writer.allocator().directory()
    }

    pub fn extract(&self, request: &Request) -> Result<TokenSequence> {
        match request {
            Request::Text(body) => Ok(self.text.extract(body)),
            Request::File { path, kind } => match kind.parse::<InputKind>()? {
                InputKind::Text => self.extract_text_file(path),
                InputKind::Tabular => self.tabular.extract(path),
            },
        }
    }

    pub fn handle(&self, request: &Request) -> Result<ArtifactPair> {
        let span = info_span!("request", source = %request.describe());
        let _enter = span.enter();

        let tokens = self.extract(request)?;
        debug!(tokens = tokens.len(), "extracted tokens");

        self.writer.write(&tokens)
    }

    /// Request boundary: every outcome, including failures, becomes a `RequestResult`
    /// carrying the `Reply` for the requester.
    pub fn respond(&self, request: &Request) -> RequestResult {
        let result = self.handle(request);

        match &result {
            Ok(pair) => info!(plus = %pair.plus_file_name(), link = %pair.link_file_name(), "request completed"),
            Err(e) if e.is_user_error() => info!(source = %request.describe(), error = %e, "request rejected"),
            Err(e) => error!(source = %request.describe(), error = %e, "request failed"),
        }

        RequestResult::new(request, &result)
    }

    fn extract_text_file(&self, path: &Path) -> Result<TokenSequence> {
        let bytes = std::fs::read(path).map_err(|e| NumLinksError::data_source(path, e))?;
        Ok(self.text.extract(&String::from_utf8_lossy(&bytes)))
    }
}
