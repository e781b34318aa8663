use crate::artifact::ArtifactPair;
use crate::error::{NumLinksError, UserFriendlyError};
use crate::pipeline::{Reply, Request};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    pub output_directory: PathBuf,
    pub prefix: String,
    pub results: Vec<RequestResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestResult {
    pub source: String,
    pub outcome: RequestOutcome,
    pub reply: Reply,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RequestOutcome {
    Written {
        plus_file: String,
        link_file: String,
        tokens: usize,
    },
    NoTokens,
    Failed {
        error: String,
    },
}

impl RequestResult {
    pub fn new(request: &Request, result: &Result<ArtifactPair, NumLinksError>) -> Self {
        let outcome = match result {
            Ok(pair) => RequestOutcome::Written {
                plus_file: pair.plus_file_name(),
                link_file: pair.link_file_name(),
                tokens: pair.token_count,
            },
            Err(NumLinksError::NoTokensFound) => RequestOutcome::NoTokens,
            Err(e) => RequestOutcome::Failed {
                error: e.user_message(),
            },
        };

        Self {
            source: request.describe(),
            outcome,
            reply: Reply::from_result(result),
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self.outcome, RequestOutcome::Written { .. })
    }
}

/// Collects per-request results while a batch runs.
#[derive(Debug)]
pub struct RunTracker {
    started_at: DateTime<Utc>,
    start_time: Instant,
    total: usize,
    results: Vec<RequestResult>,
}

impl RunTracker {
    pub fn new(total: usize) -> Self {
        Self {
            started_at: Utc::now(),
            start_time: Instant::now(),
            total,
            results: Vec::with_capacity(total),
        }
    }

    pub fn record(&mut self, result: RequestResult) {
        self.results.push(result);
    }

    pub fn processed(&self) -> usize {
        self.results.len()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn finish(self, output_directory: PathBuf, prefix: String) -> RunReport {
        RunReport {
            started_at: self.started_at,
            duration: self.start_time.elapsed(),
            output_directory,
            prefix,
            results: self.results,
        }
    }
}

impl RunReport {
    pub fn written(&self) -> usize {
        self.results.iter().filter(|r| r.is_written()).count()
    }

    pub fn no_tokens(&self) -> usize {
        self.count(|o| matches!(o, RequestOutcome::NoTokens))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, RequestOutcome::Failed { .. }))
    }

    pub fn total_tokens(&self) -> usize {
        self.results
            .iter()
            .map(|r| match r.outcome {
                RequestOutcome::Written { tokens, .. } => tokens,
                _ => 0,
            })
            .sum()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    pub fn errors(&self) -> Vec<String> {
        self.results
            .iter()
            .filter_map(|r| match &r.outcome {
                RequestOutcome::Failed { error } => Some(format!("{}: {}", r.source, error)),
                _ => None,
            })
            .collect()
    }

    fn count<F: Fn(&RequestOutcome) -> bool>(&self, predicate: F) -> usize {
        self.results.iter().filter(|r| predicate(&r.outcome)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(tokens: usize) -> ArtifactPair {
        ArtifactPair {
            plus_path: PathBuf::from("/out/evan.txt"),
            link_path: PathBuf::from("/out/evan_1.txt"),
            token_count: tokens,
        }
    }

    #[test]
    fn test_outcomes() {
        let request = Request::text("12345");

        let written = RequestResult::new(&request, &Ok(pair(3)));
        assert_eq!(
            written.outcome,
            RequestOutcome::Written {
                plus_file: "evan.txt".to_string(),
                link_file: "evan_1.txt".to_string(),
                tokens: 3,
            }
        );

        let empty = RequestResult::new(&request, &Err(NumLinksError::NoTokensFound));
        assert_eq!(empty.outcome, RequestOutcome::NoTokens);
        assert!(matches!(empty.reply, Reply::Message { .. }));

        let failed = RequestResult::new(
            &request,
            &Err(NumLinksError::UnsupportedFormat {
                kind: "pdf".to_string(),
            }),
        );
        assert!(matches!(failed.outcome, RequestOutcome::Failed { .. }));
    }

    #[test]
    fn test_report_totals() {
        let request = Request::text("12345");
        let mut tracker = RunTracker::new(3);
        tracker.record(RequestResult::new(&request, &Ok(pair(2))));
        tracker.record(RequestResult::new(&request, &Ok(pair(5))));
        tracker.record(RequestResult::new(&request, &Err(NumLinksError::NoTokensFound)));
        assert_eq!(tracker.processed(), 3);

        let report = tracker.finish(PathBuf::from("/out"), "evan".to_string());
        assert_eq!(report.written(), 2);
        assert_eq!(report.no_tokens(), 1);
        assert_eq!(report.failed(), 0);
        assert_eq!(report.total_tokens(), 7);
        assert!(!report.has_failures());
        assert!(report.errors().is_empty());
    }

    #[test]
    fn test_report_serializes() {
        let request = Request::text("12345");
        let mut tracker = RunTracker::new(1);
        tracker.record(RequestResult::new(&request, &Ok(pair(1))));
        let report = tracker.finish(PathBuf::from("/out"), "evan".to_string());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["prefix"], "evan");
        assert_eq!(json["results"][0]["outcome"]["status"], "written");
        assert_eq!(json["results"][0]["reply"]["type"], "documents");
    }
}
