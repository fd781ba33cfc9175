use alloc::collections::BTreeSet;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use bincode::{
    de::Decoder,
    enc::Encoder,
    error::{DecodeError, EncodeError},
    Decode, Encode,
};
use hashbrown::HashMap;

use crate::sentence::Sentence;

/// Number of leading characters that form a word prefix.
pub const PREFIX_LEN: usize = 5;

/// Returns the first [`PREFIX_LEN`] characters of `word`.
#[inline(always)]
pub fn word_prefix(word: &str) -> &str {
    match word.char_indices().nth(PREFIX_LEN) {
        Some((i, _)) => &word[..i],
        None => word,
    }
}

/// Dense indices of the words, tags and word-tag pairs seen in a corpus.
///
/// Lookups of unseen values return `None`; the vocabulary never grows after construction.
#[derive(Debug, Default, Clone)]
pub struct Vocabulary {
    words: Vec<String>,
    tags: Vec<String>,
    pairs: Vec<(String, String)>,

    word_ids: HashMap<String, usize>,
    tag_ids: HashMap<String, usize>,
    pair_ids: HashMap<String, HashMap<String, usize>>,
    prefix_pair_ids: HashMap<String, HashMap<String, usize>>,
    n_prefix_pairs: usize,
}

impl Vocabulary {
    /// Creates a vocabulary from explicit lists.
    ///
    /// Indices follow the given order. Repeated entries keep their first index.
    pub fn new<W, T, P, Q>(words: &[W], tags: &[T], pairs: &[(P, Q)]) -> Self
    where
        W: AsRef<str>,
        T: AsRef<str>,
        P: AsRef<str>,
        Q: AsRef<str>,
    {
        let mut vocab = Self::default();
        for word in words {
            let word = word.as_ref();
            if !vocab.word_ids.contains_key(word) {
                vocab.word_ids.insert(word.to_string(), vocab.words.len());
                vocab.words.push(word.to_string());
            }
        }
        for tag in tags {
            let tag = tag.as_ref();
            if !vocab.tag_ids.contains_key(tag) {
                vocab.tag_ids.insert(tag.to_string(), vocab.tags.len());
                vocab.tags.push(tag.to_string());
            }
        }
        for (word, tag) in pairs {
            let (word, tag) = (word.as_ref(), tag.as_ref());
            let n_pairs = vocab.pairs.len();
            let tag_ids = vocab.pair_ids.entry_ref(word).or_default();
            if !tag_ids.contains_key(tag) {
                tag_ids.insert(tag.to_string(), n_pairs);
                vocab.pairs.push((word.to_string(), tag.to_string()));
            }
            let n_prefix_pairs = vocab.n_prefix_pairs;
            let tag_ids = vocab
                .prefix_pair_ids
                .entry_ref(word_prefix(word))
                .or_default();
            if !tag_ids.contains_key(tag) {
                tag_ids.insert(tag.to_string(), n_prefix_pairs);
                vocab.n_prefix_pairs += 1;
            }
        }
        vocab
    }

    /// Creates a vocabulary from every token of the given sentences, the root included.
    ///
    /// Words, tags and pairs are each sorted before indexing.
    pub fn from_sentences<'a, I>(sentences: I) -> Self
    where
        I: IntoIterator<Item = &'a Sentence>,
    {
        let mut words = BTreeSet::new();
        let mut tags = BTreeSet::new();
        let mut pairs = BTreeSet::new();
        for sentence in sentences {
            for token in sentence.tokens() {
                words.insert(token.word());
                tags.insert(token.tag());
                pairs.insert((token.word(), token.tag()));
            }
        }
        let words: Vec<_> = words.into_iter().collect();
        let tags: Vec<_> = tags.into_iter().collect();
        let pairs: Vec<_> = pairs.into_iter().collect();
        Self::new(&words, &tags, &pairs)
    }

    /// Returns the index of `word`.
    #[inline(always)]
    pub fn word_id(&self, word: &str) -> Option<usize> {
        self.word_ids.get(word).copied()
    }

    /// Returns the index of `tag`.
    #[inline(always)]
    pub fn tag_id(&self, tag: &str) -> Option<usize> {
        self.tag_ids.get(tag).copied()
    }

    /// Returns the index of the pair `(word, tag)`.
    #[inline(always)]
    pub fn pair_id(&self, word: &str, tag: &str) -> Option<usize> {
        self.pair_ids
            .get(word)
            .and_then(|tag_ids| tag_ids.get(tag))
            .copied()
    }

    /// Returns the index of the pair `(word_prefix(word), tag)`.
    #[inline(always)]
    pub fn prefix_pair_id(&self, word: &str, tag: &str) -> Option<usize> {
        self.prefix_pair_ids
            .get(word_prefix(word))
            .and_then(|tag_ids| tag_ids.get(tag))
            .copied()
    }

    /// Gets the indexed words.
    #[inline(always)]
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Gets the indexed tags.
    #[inline(always)]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Gets the indexed word-tag pairs.
    #[inline(always)]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Returns the number of distinct prefix-tag pairs.
    #[inline(always)]
    pub fn n_prefix_pairs(&self) -> usize {
        self.n_prefix_pairs
    }
}

impl<Context> Decode<Context> for Vocabulary {
    fn decode<D: Decoder<Context = Context>>(decoder: &mut D) -> Result<Self, DecodeError> {
        let words: Vec<String> = Decode::decode(decoder)?;
        let tags: Vec<String> = Decode::decode(decoder)?;
        let pairs: Vec<(String, String)> = Decode::decode(decoder)?;
        Ok(Self::new(&words, &tags, &pairs))
    }
}

bincode::impl_borrow_decode!(Vocabulary);

impl Encode for Vocabulary {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        Encode::encode(&self.words, encoder)?;
        Encode::encode(&self.tags, encoder)?;
        Encode::encode(&self.pairs, encoder)?;
        Ok(())
    }
}
