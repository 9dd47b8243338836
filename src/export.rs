//! Rendering result tables as TXT, CSV, TSV or JSON, and writing them to
//! timestamped files.

use std::fmt::Display;
use std::fs::OpenOptions;
use std::hash::Hash;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::prelude::*;
use clap::ValueEnum;
use csv::WriterBuilder;
use serde::Serialize;

use crate::dictionary::CategoryTable;
use crate::error::Result;
use crate::grouping::TailGroupRecord;
use crate::index::PosTailRow;
use crate::pmi::PmiCooc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Txt,
    Csv,
    Tsv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Json => "json",
        }
    }
}

/// Neutralize cells that a spreadsheet would evaluate as a formula by
/// prefixing a single quote. Cells already starting with a quote are kept,
/// and so are plain numbers such as negative scores.
pub fn csv_safe_cell(cell: String) -> String {
    if cell.parse::<f64>().is_ok() {
        return cell;
    }
    match cell.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r') => format!("'{cell}"),
        _ => cell,
    }
}

/// A serializable record with a fixed column layout.
pub trait TableRow: Serialize {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

impl TableRow for TailGroupRecord {
    const HEADERS: &'static [&'static str] = &[
        "dependency_type",
        "dependency_word",
        "dependency_pos",
        "dependency_freq",
        "tail_word",
        "tail_pos",
        "tail_freq",
        "dep_tail_freq",
        "category",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.dependency_type.to_string(),
            self.dependency_word.clone(),
            self.dependency_pos.clone(),
            self.dependency_freq.to_string(),
            self.tail_word.clone(),
            self.tail_pos.clone(),
            self.tail_freq.to_string(),
            self.dep_tail_freq.to_string(),
            self.category.clone().unwrap_or_default(),
        ]
    }
}

/// One scored pair of the PMI table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PmiRow {
    pub term1: String,
    pub term2: String,
    pub pair_freq: u64,
    pub pmi: f64,
}

impl TableRow for PmiRow {
    const HEADERS: &'static [&'static str] = &["term1", "term2", "pair_freq", "pmi"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.term1.clone(),
            self.term2.clone(),
            self.pair_freq.to_string(),
            format!("{:.4}", self.pmi),
        ]
    }
}

/// Flatten the ranked pairs, keeping the `top` boundary of
/// [`PmiCooc::highest`] when given.
pub fn pmi_rows<T: Ord + Hash + Clone + Display>(pmi: &PmiCooc<T>, top: Option<usize>) -> Vec<PmiRow> {
    let pairs = match top {
        Some(n) => pmi.highest(n),
        None => pmi.ranked(),
    };
    pairs
        .iter()
        .map(|(pair, score)| PmiRow {
            term1: pair.first.to_string(),
            term2: pair.second.to_string(),
            pair_freq: pmi.pair_frequency(&pair.first, &pair.second),
            pmi: *score,
        })
        .collect()
}

impl TableRow for PosTailRow {
    const HEADERS: &'static [&'static str] =
        &["pos", "all", "all_frac", "low", "low_frac", "once", "once_frac"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.pos.clone(),
            self.all.to_string(),
            format!("{:.2}", self.all_frac),
            self.low.to_string(),
            format!("{:.2}", self.low_frac),
            self.once.to_string(),
            format!("{:.2}", self.once_frac),
        ]
    }
}

pub fn render_rows<R: TableRow>(rows: &[R], format: ExportFormat) -> Result<String> {
    let headers: Vec<String> = R::HEADERS.iter().map(|h| h.to_string()).collect();
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
        _ => {
            let cells: Vec<Vec<String>> = rows.iter().map(TableRow::cells).collect();
            render_cells(&headers, &cells, format)
        }
    }
}

pub fn render_category_table(table: &CategoryTable, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => {
            let objects: Vec<serde_json::Map<String, serde_json::Value>> = table
                .rows
                .iter()
                .map(|(id, counts)| {
                    let mut obj = serde_json::Map::new();
                    obj.insert("id".to_string(), id.clone().into());
                    for (col, n) in table.columns.iter().zip(counts) {
                        obj.insert(col.clone(), (*n).into());
                    }
                    obj
                })
                .collect();
            Ok(serde_json::to_string_pretty(&objects)?)
        }
        _ => {
            let mut headers = vec!["id".to_string()];
            headers.extend(table.columns.iter().cloned());
            let cells: Vec<Vec<String>> = table
                .rows
                .iter()
                .map(|(id, counts)| {
                    std::iter::once(id.clone())
                        .chain(counts.iter().map(|n| n.to_string()))
                        .collect()
                })
                .collect();
            render_cells(&headers, &cells, format)
        }
    }
}

fn render_cells(headers: &[String], rows: &[Vec<String>], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Csv => render_delimited(headers, rows, b','),
        ExportFormat::Tsv => render_delimited(headers, rows, b'\t'),
        _ => Ok(render_text(headers, rows)),
    }
}

fn render_delimited(headers: &[String], rows: &[Vec<String>], delimiter: u8) -> Result<String> {
    let mut buf = Vec::new();
    {
        let mut wtr = WriterBuilder::new().delimiter(delimiter).from_writer(&mut buf);
        wtr.write_record(headers)?;
        for row in rows {
            wtr.write_record(row.iter().cloned().map(csv_safe_cell))?;
        }
        wtr.flush()?;
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Left-aligned columns padded to the widest cell.
fn render_text(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }
    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };
    let mut out = line(headers);
    out.push('\n');
    for row in rows {
        out.push_str(&line(row.as_slice()));
        out.push('\n');
    }
    out
}

/// `<dir>/<stem>_<YYYYMMDD_HHMMSS>_<table>.<ext>`
pub fn timestamped_path(dir: &Path, stem: &str, table: &str, format: ExportFormat) -> PathBuf {
    let local: DateTime<Local> = Local::now();
    let filename = format!(
        "{}_{}_{}.{}",
        stem,
        local.format("%Y%m%d_%H%M%S"),
        table,
        format.extension()
    );
    dir.join(filename)
}

/// Write rendered output next to other results. Returns the file path.
pub fn save_file(content: &str, dir: &Path, stem: &str, table: &str, format: ExportFormat) -> Result<PathBuf> {
    let path = timestamped_path(dir, stem, table, format);
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)?;
    file.write_all(content.as_bytes())?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::DependencyType;

    fn record() -> TailGroupRecord {
        TailGroupRecord {
            dependency_type: DependencyType::Head,
            dependency_word: "sleep".into(),
            dependency_pos: "VERB".into(),
            dependency_freq: 3,
            tail_word: "=cat".into(),
            tail_pos: "NOUN".into(),
            tail_freq: 1,
            dep_tail_freq: 1,
            category: None,
        }
    }

    #[test]
    fn csv_neutralizes_formulas() {
        let out = render_rows(&[record()], ExportFormat::Csv).unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some(TailGroupRecord::HEADERS.join(",").as_str()));
        assert_eq!(lines.next(), Some("head,sleep,VERB,3,'=cat,NOUN,1,1,"));
    }

    #[test]
    fn no_double_prefix() {
        assert_eq!(csv_safe_cell("'@SAFE".to_string()), "'@SAFE");
        assert_eq!(csv_safe_cell("normal".to_string()), "normal");
        assert_eq!(csv_safe_cell("-1".to_string()), "-1");
        assert_eq!(csv_safe_cell("-1+A1".to_string()), "'-1+A1");
        assert_eq!(csv_safe_cell("-cmd".to_string()), "'-cmd");
    }

    #[test]
    fn negative_scores_stay_numeric() {
        let row = PmiRow {
            term1: "a".into(),
            term2: "b".into(),
            pair_freq: 1,
            pmi: -0.904,
        };
        for (format, sep) in [(ExportFormat::Csv, ','), (ExportFormat::Tsv, '\t')] {
            let out = render_rows(std::slice::from_ref(&row), format).unwrap();
            let line = out.lines().nth(1).unwrap();
            assert_eq!(line, ["a", "b", "1", "-0.9040"].join(&sep.to_string()));
            let pmi: f64 = line.rsplit(sep).next().unwrap().parse().unwrap();
            assert!(pmi < 0.0);
        }
    }

    #[test]
    fn json_keeps_null_category() {
        let out = render_rows(&[record()], ExportFormat::Json).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v[0]["dependency_type"], "head");
        assert!(v[0]["category"].is_null());
        assert_eq!(v[0]["dep_tail_freq"], 1);
    }

    #[test]
    fn text_columns_are_aligned() {
        let out = render_rows(&[record()], ExportFormat::Txt).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].find("dependency_word"), lines[1].find("sleep"));
    }

    #[test]
    fn category_table_formats() {
        let table = CategoryTable {
            columns: vec!["posemo".into(), "negemo".into()],
            rows: vec![("r1".into(), vec![2, 0])],
        };
        let tsv = render_category_table(&table, ExportFormat::Tsv).unwrap();
        assert_eq!(tsv, "id\tposemo\tnegemo\nr1\t2\t0\n");
        let json = render_category_table(&table, ExportFormat::Json).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v[0]["posemo"], 2);
        assert_eq!(v[0]["id"], "r1");
    }

    #[test]
    fn saves_with_timestamped_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_file("x", dir.path(), "corpus", "tails", ExportFormat::Csv).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        let re = regex::Regex::new(r"^corpus_\d{8}_\d{6}_tails\.csv$").unwrap();
        assert!(re.is_match(&name), "unexpected name {name}");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "x");
    }
}
