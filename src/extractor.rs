use alloc::vec::Vec;

use bincode::{Decode, Encode};

use crate::feature::{
    BetweenPosFeature, DirectionFeature, DistanceFeature, FeatureSlot, PosFeature, PosPosFeature,
    PosQuadFeature, WordFeature, WordPosFeature, WordPosPosFeature, WordPosPrefixFeature,
    DEFAULT_MAX_DISTANCE,
};
use crate::sentence::Sentence;
use crate::vocabulary::Vocabulary;

/// Block layout of the global weight vector.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FeatureLayout {
    offsets: Vec<usize>,
    len: usize,
}

impl FeatureLayout {
    /// Creates a layout from the block sizes, in extraction order.
    pub fn new(block_sizes: &[usize]) -> Self {
        let mut offsets = Vec::with_capacity(block_sizes.len());
        let mut len = 0;
        for &size in block_sizes {
            offsets.push(len);
            len += size;
        }
        Self { offsets, len }
    }

    /// Returns the start offset of each block.
    #[inline(always)]
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Returns the length of the weight vector.
    #[inline(always)]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Translates an edge's feature list into weight-vector positions, skipping misses.
    pub fn positions<'a>(&'a self, features: &'a [FeatureSlot]) -> impl Iterator<Item = usize> + 'a {
        debug_assert_eq!(self.offsets.len(), features.len());
        self.offsets
            .iter()
            .zip(features)
            .filter_map(|(&offset, f)| f.slot.map(|slot| offset + slot))
    }
}

/// A composition of feature functions producing one feature list per edge.
pub trait FeatureSet {
    /// Appends the features of the edge `head → dep` to `out`.
    fn extract(&self, sentence: &Sentence, head: usize, dep: usize, out: &mut Vec<FeatureSlot>);

    /// Returns the features of the edge `head → dep`.
    fn features(&self, sentence: &Sentence, head: usize, dep: usize) -> Vec<FeatureSlot> {
        let mut out = vec![];
        self.extract(sentence, head, dep, &mut out);
        out
    }

    /// Returns the block size of each output position.
    fn block_sizes(&self) -> Vec<usize> {
        let probe = Sentence::from_pairs([("", "")]);
        self.features(&probe, 0, 1)
            .into_iter()
            .map(|f| f.size)
            .collect()
    }

    /// Returns the dimensionality of the weight vector.
    fn features_len(&self) -> usize {
        self.block_sizes().into_iter().sum()
    }

    /// Returns the block layout.
    fn layout(&self) -> FeatureLayout {
        FeatureLayout::new(&self.block_sizes())
    }
}

/// Word, tag and tag-pair features of the head and the dependent.
#[derive(Clone, Debug, Decode, Encode)]
pub struct BasicFeatures {
    vocab: Vocabulary,
}

impl BasicFeatures {
    /// Creates a new feature set.
    pub fn new(vocab: Vocabulary) -> Self {
        Self { vocab }
    }

    /// Gets the vocabulary.
    #[inline(always)]
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }
}

impl FeatureSet for BasicFeatures {
    fn extract(&self, sentence: &Sentence, head: usize, dep: usize, out: &mut Vec<FeatureSlot>) {
        let word_pos = WordPosFeature::new(&self.vocab);
        let word = WordFeature::new(&self.vocab);
        let pos = PosFeature::new(&self.vocab);
        let word_pos_pos = WordPosPosFeature::new(&self.vocab);
        let pos_pos = PosPosFeature::new(&self.vocab);

        let (h_word, h_tag) = (sentence.word(head), sentence.tag(head));
        let (m_word, m_tag) = (sentence.word(dep), sentence.tag(dep));

        out.extend([
            word_pos.call(h_word, h_tag),
            word.call(h_word),
            pos.call(Some(h_tag)),
            word_pos.call(m_word, m_tag),
            word.call(m_word),
            pos.call(Some(m_tag)),
            word_pos_pos.call(m_word, m_tag, h_tag),
            word_pos_pos.call(h_word, h_tag, m_tag),
            pos_pos.call(h_tag, m_tag),
        ]);
    }
}

/// Basic features plus prefixes, surrounding tags, distance, direction and in-between tags.
#[derive(Clone, Debug, Decode, Encode)]
pub struct ComplexFeatures {
    basic: BasicFeatures,
    max_distance: usize,
}

impl ComplexFeatures {
    /// Creates a new feature set.
    pub fn new(vocab: Vocabulary, max_distance: usize) -> Self {
        Self {
            basic: BasicFeatures::new(vocab),
            max_distance,
        }
    }

    /// Gets the vocabulary.
    #[inline(always)]
    pub fn vocabulary(&self) -> &Vocabulary {
        self.basic.vocabulary()
    }
}

impl FeatureSet for ComplexFeatures {
    fn extract(&self, sentence: &Sentence, head: usize, dep: usize, out: &mut Vec<FeatureSlot>) {
        self.basic.extract(sentence, head, dep, out);

        let vocab = self.vocabulary();
        let prefix = WordPosPrefixFeature::new(vocab);
        let pos = PosFeature::new(vocab);
        let quad = PosQuadFeature::new(vocab);
        let distance = DistanceFeature::new(self.max_distance);

        let h = Some(sentence.tag(head));
        let m = Some(sentence.tag(dep));
        let h_prev = sentence.neighbor_tag(head, -1);
        let h_next = sentence.neighbor_tag(head, 1);
        let m_prev = sentence.neighbor_tag(dep, -1);
        let m_next = sentence.neighbor_tag(dep, 1);

        out.extend([
            prefix.call(sentence.word(head), sentence.tag(head)),
            prefix.call(sentence.word(dep), sentence.tag(dep)),
            pos.call(h_prev),
            pos.call(h_next),
            pos.call(m_prev),
            pos.call(m_next),
            quad.call([h, h_next, m_prev, m]),
            quad.call([h_prev, h, m_prev, m]),
            quad.call([h, h_next, m, m_next]),
            quad.call([h_prev, h, m, m_next]),
            distance.call(head, dep),
            DirectionFeature.call(head, dep),
        ]);
        BetweenPosFeature::new(vocab).extend(head, dep, sentence, out);
    }
}

/// Selects the feature set to train with.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FeatureTemplate {
    /// [`BasicFeatures`].
    #[default]
    Basic,

    /// [`ComplexFeatures`] with the given distance bound.
    Complex {
        /// Distances at or above this bound do not fire.
        max_distance: usize,
    },
}

impl FeatureTemplate {
    /// [`FeatureTemplate::Complex`] with the default distance bound.
    pub const fn complex() -> Self {
        Self::Complex {
            max_distance: DEFAULT_MAX_DISTANCE,
        }
    }

    /// Builds the feature set over `vocab`.
    pub fn build(self, vocab: Vocabulary) -> FeatureExtractor {
        match self {
            Self::Basic => FeatureExtractor::Basic(BasicFeatures::new(vocab)),
            Self::Complex { max_distance } => {
                FeatureExtractor::Complex(ComplexFeatures::new(vocab, max_distance))
            }
        }
    }
}

/// A feature set stored in a model.
#[derive(Clone, Debug, Decode, Encode)]
pub enum FeatureExtractor {
    /// Basic features.
    Basic(BasicFeatures),

    /// Complex features.
    Complex(ComplexFeatures),
}

impl FeatureExtractor {
    /// Gets the vocabulary.
    #[inline(always)]
    pub fn vocabulary(&self) -> &Vocabulary {
        match self {
            Self::Basic(f) => f.vocabulary(),
            Self::Complex(f) => f.vocabulary(),
        }
    }
}

impl FeatureSet for FeatureExtractor {
    #[inline(always)]
    fn extract(&self, sentence: &Sentence, head: usize, dep: usize, out: &mut Vec<FeatureSlot>) {
        match self {
            Self::Basic(f) => f.extract(sentence, head, dep, out),
            Self::Complex(f) => f.extract(sentence, head, dep, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_utils::{self, slot_pairs};

    #[test]
    fn test_basic_unknown_word() {
        let basic = BasicFeatures::new(test_utils::generate_test_vocabulary());
        let sentence = Sentence::new(&["alejandro"], &["S"]).unwrap();
        assert_eq!(
            vec![
                (-1, 4),
                (-1, 4),
                (-1, 2),
                (-1, 4),
                (-1, 4),
                (0, 2),
                (-1, 8),
                (-1, 8),
                (-1, 4)
            ],
            slot_pairs(&basic.features(&sentence, 0, 1)),
        );
        assert_eq!(4 + 4 + 2 + 4 + 4 + 2 + 8 + 8 + 4, basic.features_len());
    }

    #[test]
    fn test_basic_known_edge() {
        let basic = BasicFeatures::new(test_utils::generate_test_vocabulary());
        let sentence = Sentence::new(&["ofir", "roy"], &["S", "T"]).unwrap();
        assert_eq!(
            vec![
                (3, 4),
                (3, 4),
                (1, 2),
                (0, 4),
                (0, 4),
                (0, 2),
                (4, 8),
                (3, 8),
                (1, 4)
            ],
            slot_pairs(&basic.features(&sentence, 2, 1)),
        );
    }

    #[test]
    fn test_layout() {
        let layout = FeatureLayout::new(&[4, 4, 2]);
        assert_eq!(&[0, 4, 8], layout.offsets());
        assert_eq!(10, layout.len());
        let features = [
            FeatureSlot::hit(1, 4),
            FeatureSlot::miss(4),
            FeatureSlot::hit(1, 2),
        ];
        assert_eq!(vec![1, 9], layout.positions(&features).collect::<Vec<_>>());
    }

    #[test]
    fn test_complex_blocks() {
        let vocab = test_utils::generate_test_vocabulary();
        let complex = ComplexFeatures::new(vocab, 60);
        let sizes = complex.block_sizes();
        // 9 basic + 2 prefix + 4 surrounding tags + 4 quads + distance + direction + 2 tags
        assert_eq!(9 + 2 + 4 + 4 + 1 + 1 + 2, sizes.len());
        assert_eq!(
            40 + 4 + 4 + 4 * 2 + 4 * 16 + 60 + 2 + 2,
            complex.features_len()
        );
    }

    #[test]
    fn test_complex_context() {
        let vocab = test_utils::generate_test_vocabulary();
        let complex = ComplexFeatures::new(vocab, 60);
        let sentence = Sentence::new(&["ofir", "roy", "tomer"], &["S", "T", "S"]).unwrap();
        let features = complex.features(&sentence, 3, 1);
        let extra = slot_pairs(&features[9..]);
        assert_eq!(
            vec![
                (1, 4),   // prefix of tomer/S
                (0, 4),   // prefix of ofir/S
                (1, 2),   // tag before head: T
                (-1, 2),  // after the last token
                (-1, 2),  // ROOT is not a known tag here
                (1, 2),   // tag after dep: T
                (-1, 16), // S, None, ROOT, S
                (-1, 16), // T, S, ROOT, S
                (-1, 16), // S, None, S, T
                (9, 16),  // T, S, S, T
                (2, 60),
                (0, 2),
                (-1, 1),
                (0, 1),
            ],
            extra
        );
    }

    #[test]
    fn test_template() {
        let vocab = test_utils::generate_test_vocabulary();
        let basic = FeatureTemplate::Basic.build(vocab.clone());
        assert!(matches!(basic, FeatureExtractor::Basic(_)));
        assert_eq!(40, basic.features_len());
        let complex = FeatureTemplate::complex().build(vocab);
        assert!(matches!(
            complex,
            FeatureExtractor::Complex(ComplexFeatures {
                max_distance: DEFAULT_MAX_DISTANCE,
                ..
            })
        ));
    }
}
