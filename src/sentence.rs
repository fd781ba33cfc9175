use alloc::string::String;
use alloc::vec::Vec;

use crate::errors::{Result, RudepError};

/// Word and tag of the artificial root token.
pub const ROOT: &str = "ROOT";

/// Represents a token: a word with its part-of-speech tag.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Token {
    word: String,
    tag: String,
}

impl Token {
    /// Creates a new token.
    #[inline(always)]
    pub fn new<W, T>(word: W, tag: T) -> Self
    where
        W: Into<String>,
        T: Into<String>,
    {
        Self {
            word: word.into(),
            tag: tag.into(),
        }
    }

    /// Gets the word form.
    #[inline(always)]
    pub fn word(&self) -> &str {
        &self.word
    }

    /// Gets the part-of-speech tag.
    #[inline(always)]
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

/// Represents a tokenized sentence.
///
/// Index 0 always holds the artificial `(ROOT, ROOT)` token, so a sentence of `k` words has
/// length `k + 1`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Sentence {
    tokens: Vec<Token>,
}

impl Sentence {
    /// Creates a new sentence from parallel lists of words and tags.
    ///
    /// # Errors
    ///
    /// `words` and `tags` must have the same length.
    pub fn new<W, T>(words: &[W], tags: &[T]) -> Result<Self>
    where
        W: AsRef<str>,
        T: AsRef<str>,
    {
        if words.len() != tags.len() {
            return Err(RudepError::invalid_argument(
                "words and tags must have the same length",
            ));
        }
        Ok(Self::from_pairs(
            words.iter().zip(tags).map(|(w, t)| (w.as_ref(), t.as_ref())),
        ))
    }

    /// Creates a new sentence from `(word, tag)` pairs.
    pub fn from_pairs<I, W, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (W, T)>,
        W: Into<String>,
        T: Into<String>,
    {
        let mut tokens = vec![Token::new(ROOT, ROOT)];
        tokens.extend(pairs.into_iter().map(|(w, t)| Token::new(w, t)));
        Self { tokens }
    }

    /// Returns the number of tokens including the root.
    #[inline(always)]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns the token at `index`.
    ///
    /// # Panics
    ///
    /// `index` must be less than [`Sentence::len()`].
    #[inline(always)]
    pub fn token(&self, index: usize) -> &Token {
        &self.tokens[index]
    }

    /// Returns the word at `index`.
    #[inline(always)]
    pub fn word(&self, index: usize) -> &str {
        self.tokens[index].word()
    }

    /// Returns the tag at `index`.
    #[inline(always)]
    pub fn tag(&self, index: usize) -> &str {
        self.tokens[index].tag()
    }

    /// Returns the tag at `index + offset`, or `None` outside the sentence.
    #[inline(always)]
    pub fn neighbor_tag(&self, index: usize, offset: isize) -> Option<&str> {
        index
            .checked_add_signed(offset)
            .and_then(|i| self.tokens.get(i))
            .map(Token::tag)
    }

    /// Returns all tokens, the root first.
    #[inline(always)]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

/// Represents a dependency tree as a dependent→head function.
///
/// `head(m)` is defined for every `m` in `1..len()`. The head→children relation is available as a
/// derived view through [`DependencyTree::children()`].
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DependencyTree {
    // heads[0] is a placeholder for the root.
    heads: Vec<usize>,
}

impl DependencyTree {
    /// Creates a tree from the heads of tokens `1..=heads.len()`, in token order.
    ///
    /// # Errors
    ///
    /// Returns [`RudepError::InvalidTree`] when a head is out of range, a token heads itself, or
    /// the assignment contains a cycle.
    pub fn from_heads(heads: &[usize]) -> Result<Self> {
        let mut all = Vec::with_capacity(heads.len() + 1);
        all.push(0);
        all.extend_from_slice(heads);
        Self::validate(&all)?;
        Ok(Self { heads: all })
    }

    /// Creates a tree from its head→children view.
    ///
    /// `children[h]` lists the dependents of `h`; `children.len()` is the sentence length.
    ///
    /// # Errors
    ///
    /// Every token except the root must appear exactly once as a child, and the result must be a
    /// tree.
    pub fn from_children(children: &[Vec<usize>]) -> Result<Self> {
        let len = children.len();
        if len == 0 {
            return Err(RudepError::invalid_tree(0, "missing root"));
        }
        let mut heads: Vec<Option<usize>> = vec![None; len];
        for (h, deps) in children.iter().enumerate() {
            for &m in deps {
                if m == 0 || m >= len {
                    return Err(RudepError::invalid_tree(m, "child out of range"));
                }
                if heads[m].replace(h).is_some() {
                    return Err(RudepError::invalid_tree(m, "child has several heads"));
                }
            }
        }
        let mut all = Vec::with_capacity(len);
        for (m, h) in heads.into_iter().enumerate() {
            match h {
                Some(h) => all.push(h),
                None if m == 0 => all.push(0),
                None => return Err(RudepError::invalid_tree(m, "token has no head")),
            }
        }
        Self::validate(&all)?;
        Ok(Self { heads: all })
    }

    /// Builds a tree without validation. The decoder guarantees the tree property.
    #[inline(always)]
    pub(crate) fn from_heads_unchecked(heads: Vec<usize>) -> Self {
        debug_assert!(Self::validate(&heads).is_ok());
        Self { heads }
    }

    fn validate(heads: &[usize]) -> Result<()> {
        let len = heads.len();
        for (m, &h) in heads.iter().enumerate().skip(1) {
            if h >= len {
                return Err(RudepError::invalid_tree(m, "head out of range"));
            }
            if h == m {
                return Err(RudepError::invalid_tree(m, "token heads itself"));
            }
        }
        // 0: unvisited, 1: on the current path, 2: reaches the root
        let mut state = vec![0u8; len];
        state[0] = 2;
        let mut path = vec![];
        for start in 1..len {
            let mut v = start;
            while state[v] == 0 {
                state[v] = 1;
                path.push(v);
                v = heads[v];
            }
            if state[v] == 1 {
                return Err(RudepError::invalid_tree(v, "cycle"));
            }
            for u in path.drain(..) {
                state[u] = 2;
            }
        }
        Ok(())
    }

    /// Returns the sentence length, including the root.
    #[inline(always)]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.heads.len()
    }

    /// Returns the head of `dep`, or `None` for the root or an out-of-range index.
    #[inline(always)]
    pub fn head(&self, dep: usize) -> Option<usize> {
        if dep == 0 {
            return None;
        }
        self.heads.get(dep).copied()
    }

    /// Returns the heads of tokens `1..len()`, in token order.
    #[inline(always)]
    pub fn heads(&self) -> &[usize] {
        &self.heads[1..]
    }

    /// Iterates over `(head, dependent)` edges in dependent order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.heads
            .iter()
            .enumerate()
            .skip(1)
            .map(|(m, &h)| (h, m))
    }

    /// Returns the head→children view. Each list is in ascending order.
    pub fn children(&self) -> Vec<Vec<usize>> {
        let mut children = vec![vec![]; self.heads.len()];
        for (h, m) in self.edges() {
            children[h].push(m);
        }
        children
    }
}

/// Represents a sentence with its gold dependency tree.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LabeledSentence {
    sentence: Sentence,
    tree: DependencyTree,
}

impl LabeledSentence {
    /// Creates a new labeled sentence.
    ///
    /// `heads[i]` is the head of token `i + 1`, where 0 denotes the root.
    ///
    /// # Errors
    ///
    /// All lists must have the same length and `heads` must form a tree.
    pub fn new<W, T>(words: &[W], tags: &[T], heads: &[usize]) -> Result<Self>
    where
        W: AsRef<str>,
        T: AsRef<str>,
    {
        if words.len() != heads.len() {
            return Err(RudepError::invalid_argument(
                "words and heads must have the same length",
            ));
        }
        let sentence = Sentence::new(words, tags)?;
        let tree = DependencyTree::from_heads(heads)?;
        Ok(Self { sentence, tree })
    }

    /// Combines a sentence with its tree.
    ///
    /// # Errors
    ///
    /// The tree must cover the sentence.
    pub fn from_parts(sentence: Sentence, tree: DependencyTree) -> Result<Self> {
        if sentence.len() != tree.len() {
            return Err(RudepError::invalid_argument(
                "tree and sentence must have the same length",
            ));
        }
        Ok(Self { sentence, tree })
    }

    /// Gets the sentence.
    #[inline(always)]
    pub fn sentence(&self) -> &Sentence {
        &self.sentence
    }

    /// Gets the gold tree.
    #[inline(always)]
    pub fn tree(&self) -> &DependencyTree {
        &self.tree
    }
}

impl core::fmt::Display for Token {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}/{}", self.word, self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentence_root() {
        let s = Sentence::new(&["ofir", "tomer", "nadav", "roy"], &["S", "S", "T", "T"]).unwrap();
        assert_eq!(5, s.len());
        assert_eq!(&Token::new(ROOT, ROOT), s.token(0));
        assert_eq!("tomer", s.word(2));
        assert_eq!("T", s.tag(4));
    }

    #[test]
    fn test_sentence_from_pairs() {
        let s = Sentence::from_pairs([("a", "X"), ("b", "Y")]);
        assert_eq!(Sentence::new(&["a", "b"], &["X", "Y"]).unwrap(), s);
    }

    #[test]
    fn test_sentence_length_mismatch() {
        assert!(Sentence::new(&["a", "b"], &["X"]).is_err());
    }

    #[test]
    fn test_neighbor_tag() {
        let s = Sentence::new(&["a", "b"], &["X", "Y"]).unwrap();
        assert_eq!(None, s.neighbor_tag(0, -1));
        assert_eq!(Some(ROOT), s.neighbor_tag(1, -1));
        assert_eq!(Some("Y"), s.neighbor_tag(1, 1));
        assert_eq!(None, s.neighbor_tag(2, 1));
    }

    #[test]
    fn test_tree_chain() {
        let tree = DependencyTree::from_heads(&[0, 1, 2, 3]).unwrap();
        assert_eq!(5, tree.len());
        assert_eq!(None, tree.head(0));
        assert_eq!(Some(0), tree.head(1));
        assert_eq!(Some(3), tree.head(4));
        assert_eq!(
            vec![vec![1], vec![2], vec![3], vec![4], vec![]],
            tree.children()
        );
    }

    #[test]
    fn test_tree_children_round_trip() {
        let tree = DependencyTree::from_heads(&[2, 0, 2, 3]).unwrap();
        let children = tree.children();
        assert_eq!(vec![2], children[0]);
        assert_eq!(vec![1, 3], children[2]);
        assert_eq!(tree, DependencyTree::from_children(&children).unwrap());
    }

    #[test]
    fn test_tree_rejects_cycle() {
        assert!(matches!(
            DependencyTree::from_heads(&[0, 3, 2]),
            Err(RudepError::InvalidTree(_))
        ));
    }

    #[test]
    fn test_tree_rejects_self_loop() {
        assert!(DependencyTree::from_heads(&[0, 2]).is_err());
    }

    #[test]
    fn test_tree_rejects_out_of_range() {
        assert!(DependencyTree::from_heads(&[0, 5]).is_err());
    }

    #[test]
    fn test_children_rejects_missing_and_duplicate() {
        assert!(DependencyTree::from_children(&[vec![1], vec![], vec![]]).is_err());
        assert!(DependencyTree::from_children(&[vec![1, 2], vec![2], vec![]]).is_err());
    }

    #[test]
    fn test_labeled_sentence() {
        let s = LabeledSentence::new(&["a", "b"], &["X", "Y"], &[2, 0]).unwrap();
        assert_eq!(3, s.sentence().len());
        assert_eq!(vec![(2, 1), (0, 2)], s.tree().edges().collect::<Vec<_>>());
        assert!(LabeledSentence::new(&["a", "b"], &["X", "Y"], &[0]).is_err());
    }
}
