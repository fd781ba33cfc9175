//! Feature functions mapping sentence values to slots of weight-vector blocks.

use alloc::vec::Vec;

use crate::sentence::Sentence;
use crate::vocabulary::Vocabulary;

/// Default upper bound of [`DistanceFeature`].
pub const DEFAULT_MAX_DISTANCE: usize = 60;

/// Output of a feature function: a position inside the function's block, and the block size.
///
/// `slot` is `None` when the input is unknown and the feature does not fire. The size is reported
/// either way so that callers can advance through the weight vector.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FeatureSlot {
    /// Position inside the block.
    pub slot: Option<usize>,

    /// Size of the block.
    pub size: usize,
}

impl FeatureSlot {
    /// Creates a slot that fires at `slot`.
    #[inline(always)]
    pub const fn hit(slot: usize, size: usize) -> Self {
        Self {
            slot: Some(slot),
            size,
        }
    }

    /// Creates a slot that does not fire.
    #[inline(always)]
    pub const fn miss(size: usize) -> Self {
        Self { slot: None, size }
    }

    #[inline(always)]
    fn from_id(id: Option<usize>, size: usize) -> Self {
        Self { slot: id, size }
    }
}

/// Fires on the word.
pub struct WordFeature<'a> {
    vocab: &'a Vocabulary,
}

impl<'a> WordFeature<'a> {
    /// Creates a new feature function.
    pub const fn new(vocab: &'a Vocabulary) -> Self {
        Self { vocab }
    }

    /// Evaluates the feature.
    #[inline(always)]
    pub fn call(&self, word: &str) -> FeatureSlot {
        FeatureSlot::from_id(self.vocab.word_id(word), self.vocab.words().len())
    }
}

/// Fires on the tag. A tag outside the sentence (`None`) never fires.
pub struct PosFeature<'a> {
    vocab: &'a Vocabulary,
}

impl<'a> PosFeature<'a> {
    /// Creates a new feature function.
    pub const fn new(vocab: &'a Vocabulary) -> Self {
        Self { vocab }
    }

    /// Evaluates the feature.
    #[inline(always)]
    pub fn call(&self, tag: Option<&str>) -> FeatureSlot {
        FeatureSlot::from_id(
            tag.and_then(|tag| self.vocab.tag_id(tag)),
            self.vocab.tags().len(),
        )
    }
}

/// Fires on the word-tag pair.
pub struct WordPosFeature<'a> {
    vocab: &'a Vocabulary,
}

impl<'a> WordPosFeature<'a> {
    /// Creates a new feature function.
    pub const fn new(vocab: &'a Vocabulary) -> Self {
        Self { vocab }
    }

    /// Evaluates the feature.
    #[inline(always)]
    pub fn call(&self, word: &str, tag: &str) -> FeatureSlot {
        FeatureSlot::from_id(self.vocab.pair_id(word, tag), self.vocab.pairs().len())
    }
}

/// Fires on the pair of the word's first five characters and the tag.
pub struct WordPosPrefixFeature<'a> {
    vocab: &'a Vocabulary,
}

impl<'a> WordPosPrefixFeature<'a> {
    /// Creates a new feature function.
    pub const fn new(vocab: &'a Vocabulary) -> Self {
        Self { vocab }
    }

    /// Evaluates the feature.
    #[inline(always)]
    pub fn call(&self, word: &str, tag: &str) -> FeatureSlot {
        FeatureSlot::from_id(
            self.vocab.prefix_pair_id(word, tag),
            self.vocab.n_prefix_pairs(),
        )
    }
}

/// Fires on a word-tag pair conjoined with another tag.
pub struct WordPosPosFeature<'a> {
    vocab: &'a Vocabulary,
}

impl<'a> WordPosPosFeature<'a> {
    /// Creates a new feature function.
    pub const fn new(vocab: &'a Vocabulary) -> Self {
        Self { vocab }
    }

    /// Evaluates the feature.
    #[inline(always)]
    pub fn call(&self, word: &str, tag: &str, other_tag: &str) -> FeatureSlot {
        let n_pairs = self.vocab.pairs().len();
        let size = n_pairs * self.vocab.tags().len();
        match (self.vocab.pair_id(word, tag), self.vocab.tag_id(other_tag)) {
            (Some(pair_id), Some(other_id)) => FeatureSlot::hit(other_id * n_pairs + pair_id, size),
            _ => FeatureSlot::miss(size),
        }
    }
}

/// Fires on an ordered pair of tags.
pub struct PosPosFeature<'a> {
    vocab: &'a Vocabulary,
}

impl<'a> PosPosFeature<'a> {
    /// Creates a new feature function.
    pub const fn new(vocab: &'a Vocabulary) -> Self {
        Self { vocab }
    }

    /// Evaluates the feature.
    #[inline(always)]
    pub fn call(&self, tag: &str, other_tag: &str) -> FeatureSlot {
        let n_tags = self.vocab.tags().len();
        match (self.vocab.tag_id(tag), self.vocab.tag_id(other_tag)) {
            (Some(tag_id), Some(other_id)) => {
                FeatureSlot::hit(other_id * n_tags + tag_id, n_tags * n_tags)
            }
            _ => FeatureSlot::miss(n_tags * n_tags),
        }
    }
}

/// Fires on four tags, encoded in mixed radix with the first tag most significant.
pub struct PosQuadFeature<'a> {
    vocab: &'a Vocabulary,
}

impl<'a> PosQuadFeature<'a> {
    /// Creates a new feature function.
    pub const fn new(vocab: &'a Vocabulary) -> Self {
        Self { vocab }
    }

    /// Evaluates the feature. A `None` tag lies outside the sentence and never fires.
    #[inline(always)]
    pub fn call(&self, tags: [Option<&str>; 4]) -> FeatureSlot {
        let n_tags = self.vocab.tags().len();
        let size = n_tags.pow(4);
        let mut slot = 0;
        for tag in tags {
            match tag.and_then(|tag| self.vocab.tag_id(tag)) {
                Some(tag_id) => slot = slot * n_tags + tag_id,
                None => return FeatureSlot::miss(size),
            }
        }
        FeatureSlot::hit(slot, size)
    }
}

/// Fires on the attachment direction: 1 if the head precedes the dependent, otherwise 0.
pub struct DirectionFeature;

impl DirectionFeature {
    /// Evaluates the feature.
    #[inline(always)]
    pub const fn call(&self, head: usize, dep: usize) -> FeatureSlot {
        FeatureSlot::hit(if head < dep { 1 } else { 0 }, 2)
    }
}

/// Fires on the distance between head and dependent when it is less than `max_len`.
pub struct DistanceFeature {
    max_len: usize,
}

impl DistanceFeature {
    /// Creates a new feature function.
    pub const fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    /// Evaluates the feature.
    #[inline(always)]
    pub const fn call(&self, head: usize, dep: usize) -> FeatureSlot {
        let dist = head.abs_diff(dep);
        if dist < self.max_len {
            FeatureSlot::hit(dist, self.max_len)
        } else {
            FeatureSlot::miss(self.max_len)
        }
    }
}

impl Default for DistanceFeature {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DISTANCE)
    }
}

/// Emits one single-slot block per known tag, firing when that tag occurs strictly between the
/// head and the dependent.
pub struct BetweenPosFeature<'a> {
    vocab: &'a Vocabulary,
}

impl<'a> BetweenPosFeature<'a> {
    /// Creates a new feature function.
    pub const fn new(vocab: &'a Vocabulary) -> Self {
        Self { vocab }
    }

    /// Appends the blocks to `out`.
    pub fn extend(&self, head: usize, dep: usize, sentence: &Sentence, out: &mut Vec<FeatureSlot>) {
        let start = out.len();
        out.resize(start + self.vocab.tags().len(), FeatureSlot::miss(1));
        for i in head.min(dep) + 1..head.max(dep) {
            if let Some(tag_id) = self.vocab.tag_id(sentence.tag(i)) {
                out[start + tag_id] = FeatureSlot::hit(0, 1);
            }
        }
    }

    /// Evaluates the feature.
    pub fn call(&self, head: usize, dep: usize, sentence: &Sentence) -> Vec<FeatureSlot> {
        let mut out = vec![];
        self.extend(head, dep, sentence, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_utils::{self, slot_pairs};

    #[test]
    fn test_word_pos() {
        let vocab = test_utils::generate_test_vocabulary();
        let f = WordPosFeature::new(&vocab);
        assert_eq!(FeatureSlot::hit(0, 4), f.call("ofir", "S"));
        assert_eq!(FeatureSlot::hit(1, 4), f.call("tomer", "S"));
        assert_eq!(FeatureSlot::hit(2, 4), f.call("nadav", "T"));
        assert_eq!(FeatureSlot::hit(3, 4), f.call("roy", "T"));
        assert_eq!(FeatureSlot::miss(4), f.call("tomer", "T"));
    }

    #[test]
    fn test_word() {
        let vocab = test_utils::generate_test_vocabulary();
        let f = WordFeature::new(&vocab);
        assert_eq!(FeatureSlot::hit(0, 4), f.call("ofir"));
        assert_eq!(FeatureSlot::hit(2, 4), f.call("nadav"));
        assert_eq!(FeatureSlot::miss(4), f.call("test"));
    }

    #[test]
    fn test_pos() {
        let vocab = test_utils::generate_test_vocabulary();
        let f = PosFeature::new(&vocab);
        assert_eq!(FeatureSlot::hit(0, 2), f.call(Some("S")));
        assert_eq!(FeatureSlot::hit(1, 2), f.call(Some("T")));
        assert_eq!(FeatureSlot::miss(2), f.call(Some("F")));
        assert_eq!(FeatureSlot::miss(2), f.call(None));
    }

    #[test]
    fn test_word_pos_pos() {
        let vocab = test_utils::generate_test_vocabulary();
        let f = WordPosPosFeature::new(&vocab);
        assert_eq!(FeatureSlot::hit(0, 8), f.call("ofir", "S", "S"));
        assert_eq!(FeatureSlot::hit(3, 8), f.call("roy", "T", "S"));
        assert_eq!(FeatureSlot::hit(4, 8), f.call("ofir", "S", "T"));
        assert_eq!(FeatureSlot::hit(7, 8), f.call("roy", "T", "T"));
        assert_eq!(FeatureSlot::miss(8), f.call("test", "S", "S"));
        assert_eq!(FeatureSlot::miss(8), f.call("roy", "F", "S"));
        assert_eq!(FeatureSlot::miss(8), f.call("roy", "S", "F"));
    }

    #[test]
    fn test_pos_pos() {
        let vocab = test_utils::generate_test_vocabulary();
        let f = PosPosFeature::new(&vocab);
        assert_eq!(FeatureSlot::hit(0, 4), f.call("S", "S"));
        assert_eq!(FeatureSlot::hit(1, 4), f.call("T", "S"));
        assert_eq!(FeatureSlot::hit(2, 4), f.call("S", "T"));
        assert_eq!(FeatureSlot::hit(3, 4), f.call("T", "T"));
        assert_eq!(FeatureSlot::miss(4), f.call("T", "ROOT"));
    }

    #[test]
    fn test_pos_quad() {
        let vocab = test_utils::generate_test_vocabulary();
        let f = PosQuadFeature::new(&vocab);
        let tags = ["S", "T"];
        let mut expected = 0;
        for a in tags {
            for b in tags {
                for c in tags {
                    for d in tags {
                        assert_eq!(
                            FeatureSlot::hit(expected, 16),
                            f.call([Some(a), Some(b), Some(c), Some(d)])
                        );
                        expected += 1;
                    }
                }
            }
        }
        assert_eq!(
            FeatureSlot::miss(16),
            f.call([None, Some("S"), Some("S"), Some("S")])
        );
        assert_eq!(
            FeatureSlot::miss(16),
            f.call([Some("S"), Some("S"), Some("X"), Some("S")])
        );
    }

    #[test]
    fn test_direction() {
        assert_eq!(FeatureSlot::hit(1, 2), DirectionFeature.call(0, 1));
        assert_eq!(FeatureSlot::hit(0, 2), DirectionFeature.call(1, 0));
    }

    #[test]
    fn test_distance() {
        let f = DistanceFeature::new(5);
        assert_eq!(FeatureSlot::hit(1, 5), f.call(0, 1));
        assert_eq!(FeatureSlot::hit(1, 5), f.call(1, 0));
        assert_eq!(FeatureSlot::hit(4, 5), f.call(5, 9));
        assert_eq!(FeatureSlot::hit(3, 5), f.call(9, 6));
        assert_eq!(FeatureSlot::miss(5), f.call(5, 10));
        assert_eq!(60, DistanceFeature::default().call(0, 100).size);
    }

    #[test]
    fn test_between_pos() {
        let vocab = test_utils::generate_test_vocabulary();
        let f = BetweenPosFeature::new(&vocab);
        let sentence = Sentence::new(&["ofir", "roy", "tomer"], &["S", "T", "S"]).unwrap();
        assert_eq!(vec![(-1, 1), (0, 1)], slot_pairs(&f.call(1, 3, &sentence)));
        assert_eq!(vec![(0, 1), (0, 1)], slot_pairs(&f.call(0, 3, &sentence)));
        assert_eq!(vec![(-1, 1), (-1, 1)], slot_pairs(&f.call(2, 1, &sentence)));
    }

    #[test]
    fn test_lookup_is_pure() {
        let vocab = test_utils::generate_test_vocabulary();
        let f = WordPosPosFeature::new(&vocab);
        for (word, tag) in [("ofir", "S"), ("nadav", "T"), ("unknown", "S")] {
            assert_eq!(f.call(word, tag, "T"), f.call(word, tag, "T"));
        }
    }

    #[test]
    fn test_miss_keeps_domain_size() {
        let vocab = test_utils::generate_test_vocabulary();
        assert_eq!(
            WordFeature::new(&vocab).call("ofir").size,
            WordFeature::new(&vocab).call("nobody").size
        );
        assert_eq!(
            WordPosPrefixFeature::new(&vocab).call("ofir", "S").size,
            WordPosPrefixFeature::new(&vocab).call("nobody", "S").size
        );
        assert_eq!(
            PosQuadFeature::new(&vocab).call([Some("S"); 4]).size,
            PosQuadFeature::new(&vocab).call([None; 4]).size
        );
    }
}
