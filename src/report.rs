//! Per-image count table, serialized as CSV or JSON.

use serde::Serialize;
use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::Path;

pub const CSV_HEADER: &str = "Image_Name,Total_Cell_Count";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    #[serde(rename = "Image_Name")]
    pub image_name: String,
    #[serde(rename = "Total_Cell_Count")]
    pub total_count: u32,
}

/// Rows in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CountReport {
    rows: Vec<ReportRow>,
}

impl CountReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, image_name: impl Into<String>, total_count: u32) {
        self.rows.push(ReportRow {
            image_name: image_name.into(),
            total_count,
        });
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.rows.iter().map(|r| r.total_count as u64).sum()
    }

    pub fn to_csv_string(&self) -> String {
        let mut out = String::from(CSV_HEADER);
        out.push('\n');
        for row in &self.rows {
            out.push_str(&csv_field(&row.image_name));
            out.push(',');
            out.push_str(&row.total_count.to_string());
            out.push('\n');
        }
        out
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_csv(&self, path: &Path) -> io::Result<()> {
        write_text_file(path, &self.to_csv_string())
    }

    pub fn write_json(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json_string().map_err(io::Error::other)?;
        write_text_file(path, &json)
    }
}

fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn write_text_file(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}
