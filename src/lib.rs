//! # tail_analysis
//!
//! Corpus statistics over dependency-parsed documents:
//!
//! - [`pmi`]: pointwise mutual information of term co-occurrence in token sets
//! - [`dictionary`]: LIWC-style word categories with wildcard-prefix lookup
//! - [`grouping`]: rare ("tail") terms grouped by their dependency head or
//!   child and annotated with dictionary categories
//! - [`index`]: lemma/POS term and document frequency indices, content chunks
//! - [`corpus`]: JSON-lines/TSV readers (gzip aware) and search-index scrolling
//! - [`export`]: TXT/CSV/TSV/JSON rendering of result tables
//!
//! Parsing itself is done by an external NLP pipeline; documents come in as
//! JSON lines in the shape of [`Document`].
//!
//! ## Example
//! ```
//! use tail_analysis::{PmiCooc, TermKey};
//!
//! let sets = vec![vec!["cat", "sleep"], vec!["dog", "sleep"], vec!["cat", "purr"]];
//! let pmi = PmiCooc::new(&sets, None).unwrap();
//! assert_eq!(pmi.pair_frequency(&"sleep", &"cat"), 1);
//! assert_eq!(pmi.highest(0).len(), 1);
//! # let _ = TermKey::new("cat", "NOUN");
//! ```

pub mod corpus;
pub mod counter;
pub mod dictionary;
pub mod error;
pub mod export;
pub mod grouping;
pub mod index;
pub mod pmi;
pub mod token;

pub use corpus::{
    ScrollHits, ScrollPage, ScrollSource, attach_ids, ecdf, open_reader, read_documents,
    read_json_lines, read_tsv, select_documents,
};
pub use counter::FrequencyTable;
pub use dictionary::{CategoryDictionary, CategoryTable, DEFAULT_PREFIX_SIZE};
pub use error::{AnalysisError, Result};
pub use export::{ExportFormat, PmiRow, TableRow, csv_safe_cell, pmi_rows, render_rows, save_file};
pub use grouping::{
    DEFAULT_DEPENDENCY_POS, DependencyGroups, DependencyType, TailGroupRecord, TailOptions,
    Thresholds, build_tail_report, group_by_child, group_by_head,
};
pub use index::{
    CONTENT_POS, ContentChunk, PosTailRow, doc_content_chunks, doc_term_sets, filter_pos, lemmas,
    lemma_pos_df_index, lemma_pos_tf_index, pos_tail_distribution, sent_content_chunks,
    tail_lemmas,
};
pub use pmi::{CoocCounts, PmiCooc, TermPair, count_pairs, count_terms};
pub use token::{Document, Sentence, TermKey, Token};
