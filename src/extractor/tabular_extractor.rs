use crate::error::{NumLinksError, Result};
use crate::extractor::text_extractor::{TextTokenExtractor, TokenSequence};
use calamine::{open_workbook_auto, Data, DataType, Range, Reader};
use std::path::Path;
use tracing::{debug, warn};

/// Pulls tokens out of every cell of a workbook (xlsx, xlsm, xlsb, xls, ods).
///
/// Traversal order is sheet by sheet in file order, then column by column, then top to bottom
/// inside each column.
#[derive(Debug, Clone, Default)]
pub struct TabularTokenExtractor {
    text: TextTokenExtractor,
}

impl TabularTokenExtractor {
    pub fn new(text: TextTokenExtractor) -> Self {
        Self { text }
    }

    /// Reads the whole workbook or nothing: a failure on any sheet discards the tokens already
    /// collected so an empty result always means the workbook was read and had no tokens.
    pub fn extract<P: AsRef<Path>>(&self, path: P) -> Result<TokenSequence> {
        let path = path.as_ref();

        let mut workbook = open_workbook_auto(path).map_err(|e| {
            warn!(path = %path.display(), error = %e, "failed to open workbook");
            NumLinksError::data_source(path, e)
        })?;

        let sheet_names = workbook.sheet_names().to_vec();
        let mut tokens = TokenSequence::new();

        for sheet_name in &sheet_names {
            let range = workbook.worksheet_range(sheet_name).map_err(|e| {
                warn!(path = %path.display(), sheet = %sheet_name, error = %e, "failed to read sheet");
                NumLinksError::data_source(path, format!("sheet {:?}: {}", sheet_name, e))
            })?;

            let before = tokens.len();
            self.extract_range(&range, &mut tokens);
            debug!(sheet = %sheet_name, found = tokens.len() - before, "scanned sheet");
        }

        Ok(tokens)
    }

    fn extract_range(&self, range: &Range<Data>, tokens: &mut TokenSequence) {
        let (height, width) = range.get_size();

        for col in 0..width {
            for row in 0..height {
                if let Some(cell) = range.get((row, col)) {
                    let text = cell_to_text(cell);
                    if !text.is_empty() {
                        self.text.extract_into(&text, tokens);
                    }
                }
            }
        }
    }
}

/// Renders a cell the way a user would read it in the sheet.
pub fn cell_to_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_float(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(|dt| dt.to_string())
            .unwrap_or_default(),
    }
}

// f64's Display never switches to exponent notation and drops the ".0" of integral values,
// so 8801712345678.0 renders as "8801712345678".
fn format_float(value: f64) -> String {
    value.to_string()
}
