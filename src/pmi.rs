//! Pointwise mutual information over term co-occurrence in token sets.
//!
//! Each input set is one document's (or sentence's) distinct terms. A term
//! counts once per set it appears in, and every unordered pair of distinct
//! terms counts once per set that contains both.
//!
//! `P(term) = freq(term) / sum(term freqs)` and
//! `P(pair) = freq(pair) / sum(pair freqs)`. The two totals come from
//! different count spaces, so the score is an approximation of PMI rather
//! than a normalized joint/marginal model. Scores are natural logarithms.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use log::debug;
use serde::Serialize;

use crate::counter::FrequencyTable;
use crate::error::{AnalysisError, Result};

/// An unordered pair of terms, stored with the smaller term first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TermPair<T> {
    pub first: T,
    pub second: T,
}

impl<T: Ord> TermPair<T> {
    pub fn new(a: T, b: T) -> Self {
        if a <= b {
            TermPair {
                first: a,
                second: b,
            }
        } else {
            TermPair {
                first: b,
                second: a,
            }
        }
    }
}

/// Count each term once per set.
pub fn count_terms<T, S>(token_sets: &[S]) -> FrequencyTable<T>
where
    T: Eq + Hash + Clone,
    S: AsRef<[T]>,
{
    let mut freq = FrequencyTable::new();
    for set in token_sets {
        freq.add_all(set.as_ref().iter().cloned());
    }
    freq
}

/// Count each unordered pair of distinct terms once per set.
pub fn count_pairs<T, S>(token_sets: &[S]) -> FrequencyTable<TermPair<T>>
where
    T: Ord + Hash + Clone,
    S: AsRef<[T]>,
{
    let mut freq = FrequencyTable::new();
    for set in token_sets {
        add_pairs(&mut freq, set.as_ref());
    }
    freq
}

fn add_pairs<T: Ord + Hash + Clone>(freq: &mut FrequencyTable<TermPair<T>>, set: &[T]) {
    for (i, a) in set.iter().enumerate() {
        for b in &set[i + 1..] {
            if a != b {
                freq.add(TermPair::new(a.clone(), b.clone()));
            }
        }
    }
}

/// Term and pair frequencies of a corpus. Counting is additive, so tables
/// built over separate partitions can be merged.
#[derive(Debug, Clone, PartialEq)]
pub struct CoocCounts<T: Eq + Hash> {
    pub terms: FrequencyTable<T>,
    pub pairs: FrequencyTable<TermPair<T>>,
}

impl<T: Ord + Hash + Clone> Default for CoocCounts<T> {
    fn default() -> Self {
        Self {
            terms: FrequencyTable::new(),
            pairs: FrequencyTable::new(),
        }
    }
}

impl<T: Ord + Hash + Clone> CoocCounts<T> {
    pub fn from_sets<S: AsRef<[T]>>(token_sets: &[S]) -> Self {
        let mut counts = Self::default();
        for set in token_sets {
            counts.add_set(set.as_ref());
        }
        counts
    }

    pub fn add_set(&mut self, set: &[T]) {
        self.terms.add_all(set.iter().cloned());
        add_pairs(&mut self.pairs, set);
    }

    pub fn merge(&mut self, other: &CoocCounts<T>) {
        self.terms.merge(&other.terms);
        self.pairs.merge(&other.pairs);
    }
}

/// PMI scores for all observed pairs, ranked from highest to lowest.
#[derive(Debug, Clone)]
pub struct PmiCooc<T: Eq + Hash> {
    counts: CoocCounts<T>,
    ranked: Vec<(TermPair<T>, f64)>,
    positions: HashMap<TermPair<T>, usize>,
}

impl<T: Ord + Hash + Clone> PmiCooc<T> {
    /// Count `token_sets` and score every pair. With a `filter`, only pairs
    /// whose two terms are both in the filter are scored.
    pub fn new<S: AsRef<[T]>>(token_sets: &[S], filter: Option<&HashSet<T>>) -> Result<Self> {
        Self::from_counts(CoocCounts::from_sets(token_sets), filter)
    }

    /// Score pre-computed counts. Fails on a corpus without any term or pair
    /// observation, where the probabilities are undefined.
    pub fn from_counts(counts: CoocCounts<T>, filter: Option<&HashSet<T>>) -> Result<Self> {
        if counts.terms.total() == 0 {
            return Err(AnalysisError::EmptyCorpus("no terms observed".to_string()));
        }
        if counts.pairs.total() == 0 {
            return Err(AnalysisError::EmptyCorpus(
                "no co-occurring term pairs observed".to_string(),
            ));
        }
        let total_terms = counts.terms.total() as f64;
        let total_pairs = counts.pairs.total() as f64;

        let mut ranked: Vec<(TermPair<T>, f64)> = counts
            .pairs
            .most_common()
            .into_iter()
            .filter(|(pair, _)| match filter {
                Some(allowed) => allowed.contains(&pair.first) && allowed.contains(&pair.second),
                None => true,
            })
            .map(|(pair, freq)| {
                let p_pair = freq as f64 / total_pairs;
                let p_first = counts.terms.get(&pair.first) as f64 / total_terms;
                let p_second = counts.terms.get(&pair.second) as f64 / total_terms;
                let score = (p_pair / (p_first * p_second)).ln();
                (pair, score)
            })
            .collect();
        // stable: equal scores keep the most-common-first order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let positions = ranked
            .iter()
            .enumerate()
            .map(|(i, (pair, _))| (pair.clone(), i))
            .collect();
        debug!(
            "pmi: {} terms, {} pairs, {} scored",
            counts.terms.len(),
            counts.pairs.len(),
            ranked.len()
        );
        Ok(PmiCooc {
            counts,
            ranked,
            positions,
        })
    }

    pub fn counts(&self) -> &CoocCounts<T> {
        &self.counts
    }

    /// Score of the pair `{a, b}`, in either order. `None` if the pair was
    /// never observed or was filtered out.
    pub fn score(&self, a: &T, b: &T) -> Option<f64> {
        let pair = TermPair::new(a.clone(), b.clone());
        self.positions.get(&pair).map(|&i| self.ranked[i].1)
    }

    /// All scored pairs, highest score first.
    pub fn ranked(&self) -> &[(TermPair<T>, f64)] {
        &self.ranked
    }

    /// The first `num + 1` ranked pairs: the boundary index `num` is
    /// included.
    pub fn highest(&self, num: usize) -> &[(TermPair<T>, f64)] {
        let end = num.saturating_add(1).min(self.ranked.len());
        &self.ranked[..end]
    }

    /// Pair at rank `index`.
    pub fn get(&self, index: usize) -> Option<&(TermPair<T>, f64)> {
        self.ranked.get(index)
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    pub fn term_frequency(&self, term: &T) -> u64 {
        self.counts.terms.get(term)
    }

    pub fn pair_frequency(&self, a: &T, b: &T) -> u64 {
        self.counts.pairs.get(&TermPair::new(a.clone(), b.clone()))
    }

    pub fn term_probability(&self, term: &T) -> f64 {
        self.term_frequency(term) as f64 / self.counts.terms.total() as f64
    }

    pub fn pair_probability(&self, a: &T, b: &T) -> f64 {
        self.pair_frequency(a, b) as f64 / self.counts.pairs.total() as f64
    }
}
