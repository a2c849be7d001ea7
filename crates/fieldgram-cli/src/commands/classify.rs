//! Classify command - run the pattern matcher on free text.

use chrono::NaiveDate;
use clap::Args;
use console::style;
use serde::Serialize;

use fieldgram_core::{Clock, FieldKind, FieldPatternMatcher, FixedClock, Normalizer, SystemClock};

use super::pipeline::load_config;

/// Arguments for the classify command.
#[derive(Args)]
pub struct ClassifyArgs {
    /// Text to classify
    #[arg(required = true)]
    text: String,

    /// Tag to match (date, amount, or an invoice field name)
    #[arg(short, long, default_value = "date")]
    tag: String,

    /// Replace every match with this text
    #[arg(short, long)]
    replace: Option<String>,

    /// Treat this date (YYYY-MM-DD) as today when rejecting future dates
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Print a JSON report instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report {
    tag: String,
    detected: bool,
    found: Vec<String>,
    normalized: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    replaced: Option<String>,
}

/// Canonical form of the first match. Dates found by the matcher are already
/// canonical; field names go through the catalog.
fn normalize(normalizer: &Normalizer<FixedClock>, text: &str, found: &[String], tag: &FieldKind) -> String {
    match tag {
        FieldKind::Date => found.first().cloned().unwrap_or_else(|| text.to_string()),
        FieldKind::Amount => normalizer.normalize(found.first().map(String::as_str).unwrap_or(text), tag),
        FieldKind::Other(field) => normalizer.normalize_field(text, field),
    }
}

pub async fn run(args: ClassifyArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let clock = FixedClock(args.today.unwrap_or_else(|| SystemClock.today()));
    let order = config.extraction.date_order;

    let matcher = FieldPatternMatcher::with_clock(clock).with_date_order(order);
    let normalizer = Normalizer::with_clock(clock).with_date_order(order);
    let tag = FieldKind::from(args.tag.as_str());

    let found = matcher.find(&args.text, &tag);
    let report = Report {
        tag: tag.to_string(),
        detected: matcher.detect(&args.text, &tag),
        normalized: normalize(&normalizer, &args.text, &found, &tag),
        found,
        replaced: args
            .replace
            .as_deref()
            .map(|substitute| matcher.replace(&args.text, &tag, substitute)),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let mark = if report.detected {
        style("✓").green()
    } else {
        style("✗").red()
    };
    println!("{} {} in {:?}", mark, report.tag, args.text);
    for value in &report.found {
        println!("  found: {}", value);
    }
    println!("  normalized: {}", report.normalized);
    if let Some(replaced) = &report.replaced {
        println!("  replaced: {}", replaced);
    }

    Ok(())
}
