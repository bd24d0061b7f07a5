// src/export.rs
// =============================================================================
// Turns a finished crawl into something a person or another tool can read.
//
// Edge formats:
// - json:  [{"from": "...", "to": "..."}, ...]
// - csv:   from,to
// - urls:  sorted list of every discovered in-scope URL, one per line
// - table: human-readable table with a summary
// - report: the whole crawl result as one JSON object (edges, pages,
//   failures, pages fetched and why the crawl stopped)
//
// Page metadata (when the crawl collected it) is written as CSV with
// URL,Title,Description columns, or as JSON with the same keys.
//
// Also home of the JSON -> CSV conversion used by `linkmap convert`.
// =============================================================================

use crate::crawl::{CrawlResult, Edge, PageRecord};
use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use serde_json::Value;
use std::io::Write;

// How the edge list is written out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
    Urls,
    #[default]
    Table,
    Report,
}

pub fn write_edges<W: Write>(result: &CrawlResult, format: OutputFormat, mut out: W) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &result.edges)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => write_csv(&result.edges, out)?,
        OutputFormat::Urls => {
            for url in result.discovered_urls() {
                writeln!(out, "{}", url)?;
            }
        }
        OutputFormat::Table => write_table(result, out)?,
        OutputFormat::Report => {
            serde_json::to_writer_pretty(&mut out, result)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

pub fn write_pages_csv<W: Write>(pages: &[PageRecord], out: W) -> Result<()> {
    write_csv(pages, out)
}

pub fn write_pages_json<W: Write>(pages: &[PageRecord], mut out: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, pages)?;
    writeln!(out)?;
    Ok(())
}

// Serializes rows with their serde field names as the header
fn write_csv<T: serde::Serialize, W: Write>(rows: &[T], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

// Prints edges as a table, followed by a summary of the crawl
fn write_table<W: Write>(result: &CrawlResult, mut out: W) -> Result<()> {
    writeln!(out, "{:<60} {:<60}", "FROM", "TO")?;
    writeln!(out, "{}", "=".repeat(121))?;

    for Edge { from, to } in &result.edges {
        writeln!(out, "{:<60} {:<60}", truncate(from.as_str()), truncate(to.as_str()))?;
    }

    if !result.failures.is_empty() {
        writeln!(out)?;
        writeln!(out, "{:<60} {:<25} {}", "FAILED PAGE", "KIND", "MESSAGE")?;
        writeln!(out, "{}", "=".repeat(121))?;
        for failure in &result.failures {
            writeln!(
                out,
                "{:<60} {:<25} {}",
                truncate(failure.url.as_str()),
                format!("{:?}", failure.kind),
                failure.message
            )?;
        }
    }

    writeln!(out)?;
    writeln!(out, "📊 Summary:")?;
    writeln!(out, "   📄 Pages fetched: {}", result.pages_fetched)?;
    writeln!(out, "   🔗 Edges: {}", result.edges.len())?;
    writeln!(out, "   🌐 Unique URLs: {}", result.discovered_urls().len())?;
    writeln!(out, "   ❌ Failed: {}", result.failures.len())?;
    Ok(())
}

// Shortens long URLs so the columns stay aligned
fn truncate(url: &str) -> String {
    if url.chars().count() > 57 {
        let head: String = url.chars().take(57).collect();
        format!("{}...", head)
    } else {
        url.to_string()
    }
}

// Converts a JSON array of flat objects into CSV
//
// Columns are the union of all keys, in the order they are first seen.
// Missing and null values become empty cells; strings are written as-is and
// everything else in its JSON form.
pub fn json_to_csv<W: Write>(json: &str, out: W) -> Result<usize> {
    let value: Value = serde_json::from_str(json).context("input is not valid JSON")?;
    let Value::Array(rows) = value else {
        bail!("expected a JSON array of objects");
    };

    let mut objects = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        match row {
            Value::Object(map) => objects.push(map),
            other => bail!("row {} is not an object: {}", index, other),
        }
    }

    let mut columns: Vec<String> = Vec::new();
    for object in &objects {
        for key in object.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(&columns)?;
    for object in &objects {
        let record = columns.iter().map(|column| match object.get(column) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        });
        writer.write_record(record)?;
    }
    writer.flush()?;

    Ok(objects.len())
}
