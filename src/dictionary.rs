//! Word-category dictionary with exact and wildcard-prefix lookup.
//!
//! Entries ending in `*` match every word that starts with the entry's stem.
//! Wildcard stems are bucketed by their first `prefix_size` characters, so a
//! lookup only scans the stems that share the word's own prefix.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::debug;

use crate::counter::FrequencyTable;
use crate::error::{AnalysisError, Result};

pub const DEFAULT_PREFIX_SIZE: usize = 2;
pub const WILDCARD: char = '*';

#[derive(Debug, Clone)]
struct WildcardEntry {
    stem: String,
    categories: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CategoryDictionary {
    prefix_size: usize,
    categories: Vec<String>,
    exact: HashMap<String, Vec<String>>,
    wildcards: HashMap<String, Vec<WildcardEntry>>,
}

fn prefix(word: &str, size: usize) -> String {
    word.chars().take(size).collect()
}

fn push_unique(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|c| c == item) {
        list.push(item.to_string());
    }
}

impl CategoryDictionary {
    /// Build the dictionary from `(category, words)` pairs.
    ///
    /// Fails if `prefix_size` is 0, if an entry is empty, or if a wildcard
    /// stem (the entry without `*`) has fewer than `prefix_size` characters.
    /// Exact entries shorter than the prefix, such as `i` or `a`, are kept.
    pub fn from_categories<I, C, W, S>(entries: I, prefix_size: usize) -> Result<Self>
    where
        I: IntoIterator<Item = (C, W)>,
        C: Into<String>,
        W: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if prefix_size == 0 {
            return Err(AnalysisError::InvalidConfig(
                "dictionary prefix size must be at least 1".to_string(),
            ));
        }
        let mut dict = CategoryDictionary {
            prefix_size,
            categories: Vec::new(),
            exact: HashMap::new(),
            wildcards: HashMap::new(),
        };
        for (category, words) in entries {
            let category: String = category.into();
            push_unique(&mut dict.categories, &category);
            for word in words {
                dict.insert(word.as_ref(), &category)?;
            }
        }
        debug!(
            "dictionary loaded: {} categories, {} exact entries, {} wildcard buckets",
            dict.categories.len(),
            dict.exact.len(),
            dict.wildcards.len()
        );
        Ok(dict)
    }

    fn insert(&mut self, word: &str, category: &str) -> Result<()> {
        let stem = word.strip_suffix(WILDCARD);
        // wildcard stems must fill a whole bucket key
        let too_short = match stem {
            Some(stem) => stem.chars().count() < self.prefix_size,
            None => word.is_empty(),
        };
        if too_short {
            return Err(AnalysisError::DictionaryEntryTooShort {
                entry: word.to_string(),
                prefix_size: self.prefix_size,
            });
        }
        match stem {
            Some(stem) => {
                let bucket = self
                    .wildcards
                    .entry(prefix(stem, self.prefix_size))
                    .or_default();
                match bucket.iter().position(|e| e.stem == stem) {
                    Some(i) => push_unique(&mut bucket[i].categories, category),
                    None => bucket.push(WildcardEntry {
                        stem: stem.to_string(),
                        categories: vec![category.to_string()],
                    }),
                }
            }
            None => push_unique(self.exact.entry(word.to_string()).or_default(), category),
        }
        Ok(())
    }

    /// Parse a LIWC `.dic` file: a `%`-delimited header mapping numeric ids
    /// to category names, followed by `word<TAB>id<TAB>id...` lines.
    pub fn parse_dic(content: &str, prefix_size: usize) -> Result<Self> {
        let mut names: HashMap<&str, &str> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();
        let mut words: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut delimiters = 0;

        for (n, raw) in content.lines().enumerate() {
            let line_no = n + 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if line == "%" {
                delimiters += 1;
                continue;
            }
            match delimiters {
                0 => {
                    return Err(AnalysisError::DictionaryFormat {
                        line: line_no,
                        message: "expected '%' before the category header".to_string(),
                    });
                }
                1 => {
                    let mut fields = line.split_whitespace();
                    let (Some(id), Some(name)) = (fields.next(), fields.next()) else {
                        return Err(AnalysisError::DictionaryFormat {
                            line: line_no,
                            message: format!("expected '<id> <category>', got {line:?}"),
                        });
                    };
                    names.insert(id, name);
                    order.push(id);
                    words.entry(id).or_default();
                }
                _ => {
                    let mut fields = line.split('\t').map(str::trim).filter(|f| !f.is_empty());
                    let Some(word) = fields.next() else { continue };
                    let mut any = false;
                    for id in fields {
                        let Some(list) = words.get_mut(id) else {
                            return Err(AnalysisError::DictionaryFormat {
                                line: line_no,
                                message: format!("unknown category id {id:?} for {word:?}"),
                            });
                        };
                        list.push(word);
                        any = true;
                    }
                    if !any {
                        return Err(AnalysisError::DictionaryFormat {
                            line: line_no,
                            message: format!("entry {word:?} has no category ids"),
                        });
                    }
                }
            }
        }
        if delimiters < 2 {
            return Err(AnalysisError::DictionaryFormat {
                line: content.lines().count(),
                message: "missing '%' header delimiters".to_string(),
            });
        }

        let entries = order.into_iter().map(|id| {
            let list = words.remove(id).unwrap_or_default();
            (names[id], list)
        });
        Self::from_categories(entries, prefix_size)
    }

    pub fn from_dic_file<P: AsRef<Path>>(path: P, prefix_size: usize) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse_dic(&content, prefix_size)
    }

    pub fn prefix_size(&self) -> usize {
        self.prefix_size
    }

    /// Category names in load order.
    pub fn category_names(&self) -> &[String] {
        &self.categories
    }

    fn matching_wildcards<'a>(&'a self, word: &'a str) -> impl Iterator<Item = &'a WildcardEntry> + 'a {
        self.wildcards
            .get(&prefix(word, self.prefix_size))
            .into_iter()
            .flatten()
            .filter(move |e| word.starts_with(e.stem.as_str()))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.exact.contains_key(word) || self.matching_wildcards(word).next().is_some()
    }

    /// Every category of the exact entry and of every matching wildcard,
    /// without duplicates. Empty if the word is not in the dictionary.
    pub fn categories_of(&self, word: &str) -> Vec<String> {
        let mut cats = Vec::new();
        if let Some(exact) = self.exact.get(word) {
            for c in exact {
                push_unique(&mut cats, c);
            }
        }
        for entry in self.matching_wildcards(word) {
            for c in &entry.categories {
                push_unique(&mut cats, c);
            }
        }
        cats
    }

    /// Count category hits in `text`: each word adds one to each of its
    /// categories.
    pub fn count_categories(&self, text: &str) -> FrequencyTable<String> {
        let mut counts = FrequencyTable::new();
        for word in split_words(text) {
            counts.add_all(self.categories_of(&word));
        }
        counts
    }

    /// One row per text, one column per category, absent counts as 0.
    pub fn category_table<I, D, T>(&self, texts: I) -> CategoryTable
    where
        I: IntoIterator<Item = (D, T)>,
        D: Into<String>,
        T: AsRef<str>,
    {
        let rows = texts
            .into_iter()
            .map(|(id, text)| {
                let counts = self.count_categories(text.as_ref());
                let row = self.categories.iter().map(|c| counts.get(c)).collect();
                (id.into(), row)
            })
            .collect();
        CategoryTable {
            columns: self.categories.clone(),
            rows,
        }
    }
}

/// Category counts per text.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTable {
    pub columns: Vec<String>,
    pub rows: Vec<(String, Vec<u64>)>,
}

/// Lowercase and split on anything that is neither alphanumeric nor an
/// apostrophe.
fn split_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn happy_dict() -> CategoryDictionary {
        CategoryDictionary::from_categories(
            vec![("posemo", vec!["happy", "happ*"]), ("affect", vec!["happ*", "sad"])],
            DEFAULT_PREFIX_SIZE,
        )
        .unwrap()
    }

    #[test]
    fn wildcard_prefix_lookup() {
        let d = CategoryDictionary::from_categories(
            vec![("catA", vec!["happy", "happ*"])],
            DEFAULT_PREFIX_SIZE,
        )
        .unwrap();
        assert!(d.contains("happiness"));
        assert_eq!(d.categories_of("happiness"), vec!["catA".to_string()]);
        assert!(!d.contains("sad"));
        assert!(d.categories_of("sad").is_empty());
    }

    #[test]
    fn union_of_exact_and_wildcard_categories() {
        let d = happy_dict();
        assert_eq!(d.categories_of("happy"), vec!["posemo", "affect"]);
        assert_eq!(d.categories_of("sad"), vec!["affect"]);
        assert!(!d.contains("ha"));
        assert!(!d.contains("h"));
    }

    #[test]
    fn short_entries_fail() {
        let err = CategoryDictionary::from_categories(vec![("x", vec!["a*"])], 2).unwrap_err();
        assert!(matches!(err, AnalysisError::DictionaryEntryTooShort { .. }));
        let err = CategoryDictionary::from_categories(vec![("x", vec!["*"])], 2).unwrap_err();
        assert!(matches!(err, AnalysisError::DictionaryEntryTooShort { .. }));
        let err = CategoryDictionary::from_categories(vec![("x", vec![""])], 2).unwrap_err();
        assert!(matches!(err, AnalysisError::DictionaryEntryTooShort { .. }));
        assert!(CategoryDictionary::from_categories(vec![("x", vec!["ab*"])], 0).is_err());
    }

    #[test]
    fn short_exact_entries_are_kept() {
        let dic = "%\n1\ti\n2\tarticle\n%\ni\t1\na\t2\nhapp*\t1\n";
        let d = CategoryDictionary::parse_dic(dic, 2).unwrap();
        assert!(d.contains("i"));
        assert_eq!(d.categories_of("i"), vec!["i"]);
        assert_eq!(d.categories_of("a"), vec!["article"]);
        assert!(d.contains("happy"));
        assert_eq!(d.count_categories("I ate a happy apple").get("article"), 1);
    }

    #[test]
    fn parses_liwc_dic() {
        let dic = "%\n1\tposemo\n2\tnegemo\n%\nhapp*\t1\nsad\t2\nbittersweet\t1\t2\n";
        let d = CategoryDictionary::parse_dic(dic, 2).unwrap();
        assert_eq!(d.category_names(), &["posemo".to_string(), "negemo".to_string()]);
        assert_eq!(d.categories_of("happier"), vec!["posemo"]);
        assert_eq!(d.categories_of("bittersweet"), vec!["posemo", "negemo"]);
    }

    #[test]
    fn dic_unknown_id_reports_line() {
        let dic = "%\n1\tposemo\n%\nhappy\t9\n";
        match CategoryDictionary::parse_dic(dic, 2) {
            Err(AnalysisError::DictionaryFormat { line, .. }) => assert_eq!(line, 4),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn counts_categories_per_text() {
        let d = happy_dict();
        let counts = d.count_categories("Happy, happier... and sad!");
        assert_eq!(counts.get("posemo"), 2);
        assert_eq!(counts.get("affect"), 3);

        let table = d.category_table(vec![("r1", "so happy"), ("r2", "nothing here")]);
        assert_eq!(table.columns, vec!["posemo", "affect"]);
        assert_eq!(table.rows[0], ("r1".to_string(), vec![1, 1]));
        assert_eq!(table.rows[1], ("r2".to_string(), vec![0, 0]));
    }
}
