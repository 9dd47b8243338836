//! Lemma/POS frequency indices over annotated documents.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::counter::FrequencyTable;
use crate::token::{Document, PRON, Sentence, TermKey, Token};

/// POS tags of the single tokens kept as content outside noun chunks.
pub const CONTENT_POS: [&str; 4] = ["VERB", "ADJ", "ADP", "ADV"];

/// Alphabetic tokens that are neither stopwords nor punctuation.
pub fn word_tokens(doc: &Document) -> Vec<&Token> {
    doc.tokens()
        .filter(|t| !t.is_stop && !t.is_punct && t.is_alpha)
        .collect()
}

/// `(lemma, POS)` for each token. With `keep_pron`, pronouns keep their
/// surface text instead of the lemma.
pub fn lemma_pos<'a, I>(tokens: I, keep_pron: bool) -> Vec<TermKey>
where
    I: IntoIterator<Item = &'a Token>,
{
    tokens
        .into_iter()
        .map(|t| {
            if keep_pron && t.pos == PRON {
                TermKey::new(t.text.clone(), t.pos.clone())
            } else {
                t.key()
            }
        })
        .collect()
}

/// Tokens whose POS is one of `include_pos`, in input order.
pub fn filter_pos<'a, I, S>(tokens: I, include_pos: &[S]) -> Vec<&'a Token>
where
    I: IntoIterator<Item = &'a Token>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .filter(|t| include_pos.iter().any(|p| p.as_ref() == t.pos))
        .collect()
}

/// Lemma of each token, except pronouns, which keep their surface text.
pub fn lemmas<'a, I>(tokens: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a Token>,
{
    tokens
        .into_iter()
        .map(|t| if t.pos == PRON { t.text.as_str() } else { t.lemma.as_str() })
        .collect()
}

pub fn has_lemma_pos<'a, I>(tokens: I, lemma: &str, pos: &str) -> bool
where
    I: IntoIterator<Item = &'a Token>,
{
    tokens.into_iter().any(|t| t.lemma == lemma && t.pos == pos)
}

/// Term frequency of every `(lemma, POS)` over all tokens of all documents.
pub fn lemma_pos_tf_index(docs: &[Document], keep_pron: bool) -> FrequencyTable<TermKey> {
    let mut index = FrequencyTable::new();
    for doc in docs {
        index.add_all(lemma_pos(doc.tokens(), keep_pron));
    }
    index
}

/// Document frequency of every `(lemma, POS)`, over each document's distinct
/// word tokens.
pub fn lemma_pos_df_index(docs: &[Document], keep_pron: bool) -> FrequencyTable<TermKey> {
    let mut index = FrequencyTable::new();
    for doc in docs {
        index.add_all(distinct(lemma_pos(word_tokens(doc), keep_pron)));
    }
    index
}

/// Distinct word terms per document (lemma or surface text), in first
/// occurrence order. This is the input shape the PMI engine expects.
pub fn doc_term_sets(docs: &[Document], use_lemma: bool) -> Vec<Vec<String>> {
    docs.iter()
        .map(|doc| {
            distinct(word_tokens(doc).into_iter().map(|t| {
                if use_lemma {
                    t.lemma.clone()
                } else {
                    t.text.clone()
                }
            }))
        })
        .collect()
}

fn distinct<T, I>(items: I) -> Vec<T>
where
    T: Eq + std::hash::Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// A content unit of a sentence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContentChunk<'a> {
    NounChunk(&'a [Token]),
    Token(&'a Token),
}

impl<'a> ContentChunk<'a> {
    pub fn tokens(&self) -> &'a [Token] {
        match *self {
            ContentChunk::NounChunk(tokens) => tokens,
            ContentChunk::Token(token) => std::slice::from_ref(token),
        }
    }

    /// Surface text, tokens joined by a space.
    pub fn text(&self) -> String {
        self.tokens()
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The sentence as an ordered list of content units: each noun chunk as a
/// whole at its first token, and every non-stopword token outside the chunks
/// whose POS is in [`CONTENT_POS`].
pub fn sent_content_chunks(sent: &Sentence) -> Vec<ContentChunk<'_>> {
    let starts: HashMap<usize, &[Token]> = sent.noun_chunk_spans().collect();
    let covered: HashSet<usize> = starts
        .iter()
        .flat_map(|(&start, chunk)| start..start + chunk.len())
        .collect();

    let mut chunks = Vec::new();
    for (pos, token) in sent.tokens.iter().enumerate() {
        if let Some(&chunk) = starts.get(&pos) {
            chunks.push(ContentChunk::NounChunk(chunk));
        } else if !covered.contains(&pos)
            && CONTENT_POS.contains(&token.pos.as_str())
            && !token.is_stop
        {
            chunks.push(ContentChunk::Token(token));
        }
    }
    chunks
}

/// Content chunks of every sentence of `doc`.
pub fn doc_content_chunks(doc: &Document) -> Vec<Vec<ContentChunk<'_>>> {
    doc.sentences.iter().map(sent_content_chunks).collect()
}

/// Lemmas occurring exactly `frequency` times, optionally restricted to one
/// POS, at most `limit` of them in index order.
pub fn tail_lemmas(
    index: &FrequencyTable<TermKey>,
    frequency: u64,
    pos: Option<&str>,
    limit: usize,
) -> Vec<String> {
    index
        .iter()
        .filter(|(key, count)| *count == frequency && pos.is_none_or(|p| key.pos == p))
        .map(|(key, _)| key.lemma.clone())
        .take(limit)
        .collect()
}

/// Share of the token mass per POS overall, in the low-frequency tail and
/// among hapaxes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PosTailRow {
    pub pos: String,
    pub all: u64,
    pub all_frac: f64,
    pub low: u64,
    pub low_frac: f64,
    pub once: u64,
    pub once_frac: f64,
}

pub fn pos_tail_distribution(index: &FrequencyTable<TermKey>, low_threshold: u64) -> Vec<PosTailRow> {
    let mut all: FrequencyTable<String> = FrequencyTable::new();
    let mut low: FrequencyTable<String> = FrequencyTable::new();
    let mut once: FrequencyTable<String> = FrequencyTable::new();
    for (key, count) in index.iter() {
        all.add_n(key.pos.clone(), count);
        if count <= low_threshold {
            low.add_n(key.pos.clone(), count);
        }
        if count == 1 {
            once.add_n(key.pos.clone(), count);
        }
    }
    let frac = |part: u64, total: u64| {
        if total == 0 {
            0.0
        } else {
            part as f64 / total as f64
        }
    };
    all.iter()
        .map(|(pos, n)| PosTailRow {
            pos: pos.clone(),
            all: n,
            all_frac: frac(n, all.total()),
            low: low.get(pos),
            low_frac: frac(low.get(pos), low.total()),
            once: once.get(pos),
            once_frac: frac(once.get(pos), once.total()),
        })
        .collect()
}
