//! Corpus input: JSON-lines and tab-separated readers (gzip aware),
//! annotated documents, id alignment and paginated search-index scrolling.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;
use log::{debug, info};
use serde::de::DeserializeOwned;

use crate::error::{AnalysisError, Result};
use crate::token::Document;

/// Open `path` for buffered reading, decompressing when it ends in `.gz`.
pub fn open_reader<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let reader: Box<dyn BufRead> = if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader)
}

/// Parse one JSON value per non-empty line.
pub fn parse_json_lines<T: DeserializeOwned, R: BufRead>(reader: R) -> Result<Vec<T>> {
    let mut items = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        items.push(serde_json::from_str(line)?);
    }
    Ok(items)
}

pub fn read_json_lines<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<Vec<T>> {
    let items = parse_json_lines(open_reader(path.as_ref())?)?;
    debug!("read {} JSON lines from {}", items.len(), path.as_ref().display());
    Ok(items)
}

/// Annotated documents, one JSON object per line.
pub fn read_documents<P: AsRef<Path>>(path: P) -> Result<Vec<Document>> {
    read_json_lines(path)
}

/// Parse tab-separated rows keyed by the header row.
pub fn parse_tsv<R: std::io::Read>(reader: R) -> Result<Vec<BTreeMap<String, String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(
            headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect(),
        );
    }
    Ok(rows)
}

pub fn read_tsv<P: AsRef<Path>>(path: P) -> Result<Vec<BTreeMap<String, String>>> {
    parse_tsv(open_reader(path)?)
}

/// Key documents by their identifiers; both lists must be aligned.
pub fn attach_ids(ids: Vec<String>, docs: Vec<Document>) -> Result<HashMap<String, Document>> {
    if ids.len() != docs.len() {
        return Err(AnalysisError::LengthMismatch {
            left: "ids",
            left_len: ids.len(),
            right: "documents",
            right_len: docs.len(),
        });
    }
    Ok(ids
        .into_iter()
        .zip(docs)
        .map(|(id, mut doc)| {
            doc.id = Some(id.clone());
            (id, doc)
        })
        .collect())
}

/// Documents for `ids`, in order, skipping unknown and repeated ids.
pub fn select_documents<'a, S: AsRef<str>>(
    docs: &'a HashMap<String, Document>,
    ids: &[S],
) -> Vec<&'a Document> {
    let mut seen = HashSet::new();
    ids.iter()
        .map(|id| id.as_ref())
        .filter(|id| seen.insert(*id))
        .filter_map(|id| docs.get(id))
        .collect()
}

/// Empirical cumulative distribution: sorted values and their cumulative
/// fractions `1/n ..= 1`. With `reverse`, values are sorted descending.
pub fn ecdf(values: &[f64], reverse: bool) -> (Vec<f64>, Vec<f64>) {
    let n = values.len();
    let mut x = values.to_vec();
    x.sort_by(|a, b| a.total_cmp(b));
    if reverse {
        x.reverse();
    }
    let y = (1..=n).map(|i| i as f64 / n as f64).collect();
    (x, y)
}

/// One page of hits from a search index.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollPage<H> {
    pub scroll_id: Option<String>,
    /// Total number of matches, when the backend reports it.
    pub total: Option<u64>,
    pub hits: Vec<H>,
}

/// A search backend that serves results in pages behind a scroll cursor.
pub trait ScrollSource {
    type Hit;

    fn first_page(&mut self, query: &serde_json::Value, size: usize) -> Result<ScrollPage<Self::Hit>>;

    fn next_page(&mut self, scroll_id: &str) -> Result<ScrollPage<Self::Hit>>;
}

/// Iterates all hits of a query, page by page. Stops after a page holding
/// fewer hits than the page size. A backend error is yielded once and ends
/// the iteration.
pub struct ScrollHits<'s, S: ScrollSource> {
    source: &'s mut S,
    query: serde_json::Value,
    size: usize,
    buffer: VecDeque<S::Hit>,
    scroll_id: Option<String>,
    started: bool,
    done: bool,
}

impl<'s, S: ScrollSource> ScrollHits<'s, S> {
    pub fn new(source: &'s mut S, query: serde_json::Value, size: usize) -> Result<Self> {
        if size == 0 {
            return Err(AnalysisError::InvalidConfig(
                "scroll page size must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            source,
            query,
            size,
            buffer: VecDeque::new(),
            scroll_id: None,
            started: false,
            done: false,
        })
    }

    fn fetch(&mut self) -> Result<()> {
        let page = if self.started {
            match self.scroll_id.as_deref() {
                Some(id) => self.source.next_page(id)?,
                None => {
                    self.done = true;
                    return Ok(());
                }
            }
        } else {
            self.started = true;
            let page = self.source.first_page(&self.query, self.size)?;
            if let Some(total) = page.total {
                info!("total hits: {total}");
            }
            page
        };
        if page.hits.len() < self.size {
            self.done = true;
        }
        self.scroll_id = page.scroll_id;
        self.buffer.extend(page.hits);
        Ok(())
    }
}

impl<S: ScrollSource> Iterator for ScrollHits<'_, S> {
    type Item = Result<S::Hit>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(hit) = self.buffer.pop_front() {
                return Some(Ok(hit));
            }
            if self.done {
                return None;
            }
            if let Err(e) = self.fetch() {
                self.done = true;
                return Some(Err(e));
            }
        }
    }
}
