//! Annotated documents as produced by an external NLP pipeline.
//!
//! A document is a list of sentences, a sentence a list of tokens. Dependency
//! links are stored as indices within the sentence; the root token points at
//! itself. Any backend that can emit this shape as JSON is interchangeable.

use serde::{Deserialize, Serialize};

/// Universal POS tag for pronouns.
pub const PRON: &str = "PRON";

/// `(lemma, POS)`, the unit every frequency index counts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TermKey {
    pub lemma: String,
    pub pos: String,
}

impl TermKey {
    pub fn new(lemma: impl Into<String>, pos: impl Into<String>) -> Self {
        Self {
            lemma: lemma.into(),
            pos: pos.into(),
        }
    }
}

impl std::fmt::Display for TermKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.lemma, self.pos)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub lemma: String,
    pub pos: String,
    #[serde(default)]
    pub is_stop: bool,
    #[serde(default)]
    pub is_punct: bool,
    #[serde(default = "default_true")]
    pub is_alpha: bool,
    /// Position within the sentence.
    pub i: usize,
    /// Position of the syntactic head within the sentence.
    pub head: usize,
}

fn default_true() -> bool {
    true
}

impl Token {
    pub fn key(&self) -> TermKey {
        TermKey::new(self.lemma.clone(), self.pos.clone())
    }

    pub fn is_root(&self) -> bool {
        self.head == self.i
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub tokens: Vec<Token>,
    /// Noun chunk spans as `(start, end)` token positions, end exclusive.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub noun_chunks: Vec<(usize, usize)>,
}

impl Sentence {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            noun_chunks: Vec::new(),
        }
    }

    pub fn with_noun_chunks(mut self, noun_chunks: Vec<(usize, usize)>) -> Self {
        self.noun_chunks = noun_chunks;
        self
    }

    /// Tokens of each well-formed noun chunk, paired with its start position.
    /// Spans that are empty or run past the sentence are skipped.
    pub fn noun_chunk_spans(&self) -> impl Iterator<Item = (usize, &[Token])> + '_ {
        self.noun_chunks
            .iter()
            .filter(|(start, end)| start < end)
            .filter_map(|&(start, end)| self.tokens.get(start..end).map(|chunk| (start, chunk)))
    }

    /// The head of `token`. Returns `None` only for a dangling head index.
    pub fn head_of(&self, token: &Token) -> Option<&Token> {
        self.tokens.get(token.head)
    }

    /// Tokens that depend on `token`, in sentence order.
    pub fn children_of<'a>(&'a self, token: &'a Token) -> impl Iterator<Item = &'a Token> + 'a {
        self.tokens
            .iter()
            .filter(move |t| t.head == token.i && t.i != token.i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub sentences: Vec<Sentence>,
}

impl Document {
    pub fn new(sentences: Vec<Sentence>) -> Self {
        Self {
            id: None,
            sentences,
        }
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> + '_ {
        self.sentences.iter().flat_map(|s| s.tokens.iter())
    }
}

/// All sentences of all documents, in order.
pub fn sentence_iter(docs: &[Document]) -> impl Iterator<Item = &Sentence> + '_ {
    docs.iter().flat_map(|d| d.sentences.iter())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn tok(i: usize, text: &str, lemma: &str, pos: &str, head: usize) -> Token {
        Token {
            text: text.to_string(),
            lemma: lemma.to_string(),
            pos: pos.to_string(),
            is_stop: matches!(lemma, "the" | "a" | "be"),
            is_punct: pos == "PUNCT",
            is_alpha: text.chars().all(char::is_alphabetic),
            i,
            head,
        }
    }

    /// "the <noun> sleeps": det -> noun -> verb (root).
    pub fn sleeps(noun: &str) -> Sentence {
        Sentence::new(vec![
            tok(0, "the", "the", "DET", 1),
            tok(1, noun, noun, "NOUN", 2),
            tok(2, "sleeps", "sleep", "VERB", 2),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn heads_and_children() {
        let s = sleeps("cat");
        let verb = &s.tokens[2];
        assert!(verb.is_root());
        assert_eq!(s.head_of(&s.tokens[1]).map(|t| t.lemma.as_str()), Some("sleep"));
        let children: Vec<&str> = s.children_of(verb).map(|t| t.lemma.as_str()).collect();
        assert_eq!(children, vec!["cat"]);
    }

    #[test]
    fn deserializes_with_defaults() {
        let json = r#"{"sentences":[{"tokens":[{"text":"Hi","lemma":"hi","pos":"INTJ","i":0,"head":0}]}]}"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        let t = &doc.sentences[0].tokens[0];
        assert!(t.is_alpha);
        assert!(!t.is_stop);
        assert_eq!(doc.id, None);
        assert_eq!(t.key(), TermKey::new("hi", "INTJ"));
        assert!(doc.sentences[0].noun_chunks.is_empty());
    }

    #[test]
    fn reads_noun_chunk_spans() {
        let json = r#"{"tokens":[
            {"text":"the","lemma":"the","pos":"DET","i":0,"head":1},
            {"text":"cat","lemma":"cat","pos":"NOUN","i":1,"head":2},
            {"text":"sleeps","lemma":"sleep","pos":"VERB","i":2,"head":2}],
            "noun_chunks":[[0,2],[2,9],[1,1]]}"#;
        let sent: Sentence = serde_json::from_str(json).unwrap();
        assert_eq!(sent.noun_chunks, vec![(0, 2), (2, 9), (1, 1)]);
        let spans: Vec<(usize, Vec<&str>)> = sent
            .noun_chunk_spans()
            .map(|(start, chunk)| (start, chunk.iter().map(|t| t.text.as_str()).collect()))
            .collect();
        assert_eq!(spans, vec![(0, vec!["the", "cat"])]);
    }
}
