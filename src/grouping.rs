//! Grouping of rare ("tail") terms by the term they attach to in a
//! dependency parse.
//!
//! A token is a tail candidate when its POS is accepted and its frequency in
//! the index lies within the thresholds. `group_by_head` groups the token
//! under its head. `group_by_child` groups the token's children under the
//! token itself.

use std::collections::HashMap;

use log::info;
use serde::Serialize;

use crate::counter::FrequencyTable;
use crate::dictionary::CategoryDictionary;
use crate::token::{Document, Sentence, TermKey, Token, sentence_iter};

/// POS tags accepted for heads and children unless configured otherwise.
pub const DEFAULT_DEPENDENCY_POS: [&str; 5] = ["ADJ", "ADV", "NOUN", "PROPN", "VERB"];

/// Inclusive frequency bounds. `Some(0)` is an active bound. Terms missing
/// from the frequency index are never excluded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Thresholds {
    pub max: Option<u64>,
    pub min: Option<u64>,
}

impl Thresholds {
    pub fn new(max: Option<u64>, min: Option<u64>) -> Self {
        Self { max, min }
    }

    pub fn admits(&self, key: &TermKey, index: &FrequencyTable<TermKey>) -> bool {
        if !index.contains(key) {
            return true;
        }
        let freq = index.get(key);
        self.max.is_none_or(|max| freq <= max) && self.min.is_none_or(|min| freq >= min)
    }
}

fn pos_in<S: AsRef<str>>(pos: &str, accepted: &[S]) -> bool {
    accepted.iter().any(|p| p.as_ref() == pos)
}

/// Group key -> frequencies of the terms recorded under it, in discovery
/// order. The key is the head for head grouping and the tail token for
/// child grouping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyGroups {
    order: Vec<TermKey>,
    groups: HashMap<TermKey, FrequencyTable<TermKey>>,
}

impl DependencyGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, dependency: TermKey, tail: TermKey) {
        if !self.groups.contains_key(&dependency) {
            self.order.push(dependency.clone());
        }
        self.groups.entry(dependency).or_default().add(tail);
    }

    pub fn get(&self, dependency: &TermKey) -> Option<&FrequencyTable<TermKey>> {
        self.groups.get(dependency)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TermKey, &FrequencyTable<TermKey>)> + '_ {
        self.order.iter().map(move |k| (k, &self.groups[k]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

fn tail_candidates<'a, S: AsRef<str>>(
    docs: &'a [Document],
    index: &'a FrequencyTable<TermKey>,
    token_pos: &'a [S],
    thresholds: Thresholds,
) -> impl Iterator<Item = (&'a Sentence, &'a Token)> + 'a {
    sentence_iter(docs)
        .flat_map(|sent| sent.iter().map(move |token| (sent, token)))
        .filter(move |(_, token)| pos_in(&token.pos, token_pos))
        .filter(move |(_, token)| thresholds.admits(&token.key(), index))
}

/// Group tail tokens by their syntactic head.
pub fn group_by_head<S: AsRef<str>, H: AsRef<str>>(
    docs: &[Document],
    index: &FrequencyTable<TermKey>,
    token_pos: &[S],
    head_pos: &[H],
    thresholds: Thresholds,
) -> DependencyGroups {
    let mut groups = DependencyGroups::new();
    for (sent, token) in tail_candidates(docs, index, token_pos, thresholds) {
        let Some(head) = sent.head_of(token) else {
            continue;
        };
        if !pos_in(&head.pos, head_pos) {
            continue;
        }
        groups.record(head.key(), token.key());
    }
    groups
}

/// Group the syntactic children of tail tokens under the token: one
/// occurrence of token -> child per accepted child.
pub fn group_by_child<S: AsRef<str>, C: AsRef<str>>(
    docs: &[Document],
    index: &FrequencyTable<TermKey>,
    token_pos: &[S],
    child_pos: &[C],
    thresholds: Thresholds,
) -> DependencyGroups {
    let mut groups = DependencyGroups::new();
    for (sent, token) in tail_candidates(docs, index, token_pos, thresholds) {
        for child in sent.children_of(token) {
            if pos_in(&child.pos, child_pos) {
                groups.record(token.key(), child.key());
            }
        }
    }
    groups
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyType {
    Head,
    Child,
}

impl std::fmt::Display for DependencyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DependencyType::Head => write!(f, "head"),
            DependencyType::Child => write!(f, "child"),
        }
    }
}

/// One row of the tail report. Head rows pair a tail token (`tail_*`) with
/// its head (`dependency_*`). Child rows pair a tail token (`dependency_*`)
/// with one of its children (`tail_*`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TailGroupRecord {
    pub dependency_type: DependencyType,
    pub dependency_word: String,
    pub dependency_pos: String,
    pub dependency_freq: u64,
    pub tail_word: String,
    pub tail_pos: String,
    pub tail_freq: u64,
    pub dep_tail_freq: u64,
    /// Pipe-joined dictionary categories of the tail lemma.
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TailOptions {
    pub max_threshold: Option<u64>,
    pub min_threshold: Option<u64>,
    /// POS tags accepted for heads and children.
    pub dependency_pos: Vec<String>,
}

impl Default for TailOptions {
    fn default() -> Self {
        Self {
            max_threshold: Some(5),
            min_threshold: Some(0),
            dependency_pos: DEFAULT_DEPENDENCY_POS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl TailOptions {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(self.max_threshold, self.min_threshold)
    }
}

/// Run head and child grouping and flatten both into report rows, each tail
/// annotated with its dictionary categories.
pub fn build_tail_report<S: AsRef<str>>(
    docs: &[Document],
    index: &FrequencyTable<TermKey>,
    token_pos: &[S],
    dictionary: &CategoryDictionary,
    options: &TailOptions,
) -> Vec<TailGroupRecord> {
    let thresholds = options.thresholds();
    let dep_groups = [
        (
            DependencyType::Head,
            group_by_head(docs, index, token_pos, options.dependency_pos.as_slice(), thresholds),
        ),
        (
            DependencyType::Child,
            group_by_child(docs, index, token_pos, options.dependency_pos.as_slice(), thresholds),
        ),
    ];

    let mut records = Vec::new();
    for (dep_type, groups) in &dep_groups {
        for (dep, tails) in groups.iter() {
            if tails.is_empty() {
                continue;
            }
            for (tail, dep_tail_freq) in tails.iter() {
                let category = if dictionary.contains(&tail.lemma) {
                    Some(dictionary.categories_of(&tail.lemma).join("|"))
                } else {
                    None
                };
                records.push(TailGroupRecord {
                    dependency_type: *dep_type,
                    dependency_word: dep.lemma.clone(),
                    dependency_pos: dep.pos.clone(),
                    dependency_freq: index.get(dep),
                    tail_word: tail.lemma.clone(),
                    tail_pos: tail.pos.clone(),
                    tail_freq: index.get(tail),
                    dep_tail_freq,
                    category,
                });
            }
        }
    }
    info!(
        "tail report: {} head groups, {} child groups, {} rows",
        dep_groups[0].1.len(),
        dep_groups[1].1.len(),
        records.len()
    );
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::lemma_pos_tf_index;
    use crate::token::fixtures::{sleeps, tok};

    fn key(lemma: &str, pos: &str) -> TermKey {
        TermKey::new(lemma, pos)
    }

    #[test]
    fn groups_nouns_by_verb_head() {
        let docs = vec![Document::new(vec![sleeps("cat"), sleeps("dog")])];
        let tf = lemma_pos_tf_index(&docs, false);
        let groups = group_by_head(&docs, &tf, &["NOUN"], &["VERB"], Thresholds::default());
        assert_eq!(groups.len(), 1);
        let tails = groups.get(&key("sleep", "VERB")).unwrap();
        assert_eq!(tails.get(&key("cat", "NOUN")), 1);
        assert_eq!(tails.get(&key("dog", "NOUN")), 1);
        assert_eq!(tails.len(), 2);
        assert!(groups.get(&key("cat", "NOUN")).is_none());
    }

    #[test]
    fn head_pos_filter_applies() {
        let docs = vec![Document::new(vec![sleeps("cat")])];
        let tf = lemma_pos_tf_index(&docs, false);
        let groups = group_by_head(&docs, &tf, &["NOUN"], &["ADJ"], Thresholds::default());
        assert!(groups.is_empty());
    }

    #[test]
    fn thresholds_are_inclusive_and_zero_is_active() {
        let docs = vec![Document::new(vec![sleeps("cat"), sleeps("cat"), sleeps("dog")])];
        let tf = lemma_pos_tf_index(&docs, false);

        let rare = group_by_head(&docs, &tf, &["NOUN"], &["VERB"], Thresholds::new(Some(1), None));
        let tails = rare.get(&key("sleep", "VERB")).unwrap();
        assert_eq!(tails.get(&key("dog", "NOUN")), 1);
        assert_eq!(tails.get(&key("cat", "NOUN")), 0);

        let frequent = group_by_head(&docs, &tf, &["NOUN"], &["VERB"], Thresholds::new(None, Some(2)));
        let tails = frequent.get(&key("sleep", "VERB")).unwrap();
        assert_eq!(tails.get(&key("cat", "NOUN")), 2);
        assert_eq!(tails.get(&key("dog", "NOUN")), 0);

        let none = group_by_head(&docs, &tf, &["NOUN"], &["VERB"], Thresholds::new(Some(0), None));
        assert!(none.is_empty());
    }

    #[test]
    fn unindexed_terms_pass_thresholds() {
        let docs = vec![Document::new(vec![sleeps("cat")])];
        let empty = FrequencyTable::new();
        let groups = group_by_head(&docs, &empty, &["NOUN"], &["VERB"], Thresholds::new(Some(0), Some(0)));
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn groups_children_under_tail_token() {
        // "quiet cats sleep": quiet(ADJ) -> cat(NOUN) -> sleep(VERB)
        let sent = Sentence::new(vec![
            tok(0, "quiet", "quiet", "ADJ", 1),
            tok(1, "cats", "cat", "NOUN", 2),
            tok(2, "sleep", "sleep", "VERB", 2),
        ]);
        let docs = vec![Document::new(vec![sent])];
        let tf = lemma_pos_tf_index(&docs, false);
        let groups = group_by_child(&docs, &tf, &["NOUN", "VERB"], &["ADJ", "NOUN"], Thresholds::default());
        assert_eq!(groups.get(&key("cat", "NOUN")).unwrap().get(&key("quiet", "ADJ")), 1);
        assert_eq!(groups.get(&key("sleep", "VERB")).unwrap().get(&key("cat", "NOUN")), 1);
        assert!(groups.get(&key("quiet", "ADJ")).is_none());
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn report_rows_carry_frequencies_and_categories() {
        let docs = vec![Document::new(vec![sleeps("cat"), sleeps("cat"), sleeps("dog")])];
        let tf = lemma_pos_tf_index(&docs, false);
        let dict = CategoryDictionary::from_categories(
            vec![("animal", vec!["cat", "do*"]), ("pet", vec!["dog"])],
            2,
        )
        .unwrap();
        let rows = build_tail_report(&docs, &tf, &["NOUN"], &dict, &TailOptions::default());

        // nouns have no children in these sentences
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.dependency_type == DependencyType::Head));
        let cat = &rows[0];
        assert_eq!(cat.dependency_word, "sleep");
        assert_eq!(cat.dependency_freq, 3);
        assert_eq!(cat.tail_word, "cat");
        assert_eq!(cat.tail_freq, 2);
        assert_eq!(cat.dep_tail_freq, 2);
        assert_eq!(cat.category.as_deref(), Some("animal"));
        assert_eq!(rows[1].category.as_deref(), Some("pet|animal"));
    }

    #[test]
    fn child_rows_categorize_the_child() {
        let sent = Sentence::new(vec![
            tok(0, "quiet", "quiet", "ADJ", 1),
            tok(1, "cats", "cat", "NOUN", 2),
            tok(2, "sleep", "sleep", "VERB", 2),
        ]);
        let docs = vec![Document::new(vec![sent])];
        let tf = lemma_pos_tf_index(&docs, false);
        let dict = CategoryDictionary::from_categories(vec![("calm", vec!["quiet"])], 2).unwrap();
        let rows = build_tail_report(&docs, &tf, &["NOUN"], &dict, &TailOptions::default());

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].dependency_type, DependencyType::Head);
        assert_eq!((rows[0].dependency_word.as_str(), rows[0].tail_word.as_str()), ("sleep", "cat"));
        assert_eq!(rows[0].category, None);
        let child = &rows[1];
        assert_eq!(child.dependency_type, DependencyType::Child);
        assert_eq!(child.dependency_word, "cat");
        assert_eq!(child.dependency_pos, "NOUN");
        assert_eq!(child.tail_word, "quiet");
        assert_eq!(child.tail_pos, "ADJ");
        assert_eq!(child.category.as_deref(), Some("calm"));
    }

    #[test]
    fn report_leaves_category_empty_for_unknown_words() {
        let docs = vec![Document::new(vec![sleeps("yak")])];
        let tf = lemma_pos_tf_index(&docs, false);
        let dict = CategoryDictionary::from_categories(vec![("animal", vec!["cat"])], 2).unwrap();
        let rows = build_tail_report(&docs, &tf, &["NOUN"], &dict, &TailOptions::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, None);
    }

    #[test]
    fn report_skips_empty_groups() {
        let docs = vec![Document::new(vec![sleeps("cat")])];
        let tf = lemma_pos_tf_index(&docs, false);
        let dict = CategoryDictionary::from_categories(vec![("animal", vec!["cat"])], 2).unwrap();
        let options = TailOptions {
            max_threshold: Some(0),
            ..TailOptions::default()
        };
        let rows = build_tail_report(&docs, &tf, &["NOUN"], &dict, &options);
        assert!(rows.is_empty());
    }
}
