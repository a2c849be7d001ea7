//! Output formats for extracted n-grams.

use serde::Serialize;

use fieldgram_core::{ExtractionResult, NGram};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text listing
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// JSON shape of one page.
#[derive(Serialize)]
struct PageOutput<'a> {
    page: usize,
    line_count: usize,
    ngrams: Vec<&'a NGram>,
}

fn selected(result: &ExtractionResult, candidates_only: bool) -> impl Iterator<Item = &NGram> {
    result
        .ngrams
        .iter()
        .filter(move |n| !candidates_only || n.parses.is_some())
}

/// N-grams of every page paired with their page number.
fn numbered(results: &[ExtractionResult], candidates_only: bool) -> impl Iterator<Item = (usize, &NGram)> {
    results
        .iter()
        .flat_map(move |result| selected(result, candidates_only).map(move |n| (result.page, n)))
}

pub fn format_ngrams(
    results: &[ExtractionResult],
    format: OutputFormat,
    candidates_only: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let pages: Vec<PageOutput> = results
                .iter()
                .map(|result| PageOutput {
                    page: result.page,
                    line_count: result.line_count,
                    ngrams: selected(result, candidates_only).collect(),
                })
                .collect();
            Ok(serde_json::to_string_pretty(&pages)?)
        }
        OutputFormat::Csv => format_csv(results, candidates_only),
        OutputFormat::Text => Ok(format_text(results, candidates_only)),
    }
}

fn format_csv(results: &[ExtractionResult], candidates_only: bool) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "page", "text", "kind", "value", "left", "top", "right", "bottom",
    ])?;

    for (page, ngram) in numbered(results, candidates_only) {
        let (left, top, right, bottom) = ngram.bounding_box().unwrap_or_default();
        let (kind, value) = match &ngram.parses {
            Some(parsed) => (parsed.kind().to_string(), parsed.as_str().to_string()),
            None => (String::new(), String::new()),
        };
        wtr.write_record([
            &page.to_string(),
            &ngram.text(),
            &kind,
            &value,
            &left.to_string(),
            &top.to_string(),
            &right.to_string(),
            &bottom.to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(results: &[ExtractionResult], candidates_only: bool) -> String {
    let mut output = String::new();

    for result in results {
        output.push_str(&format!(
            "Page {}: {} lines, {} n-grams, {} candidates\n",
            result.page,
            result.line_count,
            result.ngrams.len(),
            result.candidates().count()
        ));

        for ngram in &result.ngrams {
            match &ngram.parses {
                Some(parsed) => output.push_str(&format!(
                    "  [{}] {:<12} {}\n",
                    parsed.kind(),
                    parsed.as_str(),
                    ngram.text()
                )),
                None if !candidates_only => output.push_str(&format!("  {}\n", ngram.text())),
                None => {}
            }
        }
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldgram_core::{ParsedValue, Word};
    use pretty_assertions::assert_eq;

    fn results() -> Vec<ExtractionResult> {
        let mut total = NGram::new(vec![
            Word::new("Total", 10, 10, 60, 30),
            Word::new("12.5", 70, 12, 110, 31),
        ]);
        total.parses = Some(ParsedValue::Amount("12.50".to_string()));

        vec![ExtractionResult {
            page: 1,
            ngrams: vec![NGram::new(vec![Word::new("Total", 10, 10, 60, 30)]), total],
            line_count: 1,
            processing_time_ms: 0,
        }]
    }

    fn later_page() -> Vec<ExtractionResult> {
        let mut results = results();
        results[0].page = 3;
        results
    }

    #[test]
    fn test_csv_candidates_only() {
        let csv = format_ngrams(&results(), OutputFormat::Csv, true).unwrap();
        assert_eq!(
            csv,
            "page,text,kind,value,left,top,right,bottom\n1,Total 12.5,amount,12.50,10,10,110,31\n"
        );
    }

    #[test]
    fn test_json_groups_ngrams_by_page() {
        let json = format_ngrams(&later_page(), OutputFormat::Json, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value.as_array().map(|a| a.len()), Some(1));
        assert_eq!(value[0]["page"], 3);
        assert_eq!(value[0]["line_count"], 1);
        assert_eq!(value[0]["ngrams"].as_array().map(|a| a.len()), Some(2));

        let json = format_ngrams(&later_page(), OutputFormat::Json, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["ngrams"].as_array().map(|a| a.len()), Some(1));
    }

    #[test]
    fn test_page_numbers_kept() {
        let csv = format_ngrams(&later_page(), OutputFormat::Csv, true).unwrap();
        assert!(csv.ends_with("\n3,Total 12.5,amount,12.50,10,10,110,31\n"));

        let text = format_ngrams(&later_page(), OutputFormat::Text, true).unwrap();
        assert!(text.starts_with("Page 3: "));
    }

    #[test]
    fn test_text_listing() {
        let text = format_ngrams(&results(), OutputFormat::Text, true).unwrap();
        assert!(text.starts_with("Page 1: 1 lines, 2 n-grams, 1 candidates\n"));
        assert!(text.contains("[amount] 12.50"));
        assert!(!text.contains("  Total\n"));
    }
}
