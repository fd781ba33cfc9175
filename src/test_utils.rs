use alloc::vec::Vec;

use crate::feature::FeatureSlot;
#[cfg(feature = "train")]
use crate::sentence::LabeledSentence;
use crate::vocabulary::Vocabulary;

macro_rules! hashmap {
    ( $($k:expr => $v:expr,)* ) => {
        {
            #[allow(unused_mut)]
            let mut h = HashMap::new();
            $(
                h.insert($k, $v);
            )*
            h
        }
    };
    ( $($k:expr => $v:expr),* ) => {
        hashmap![$( $k => $v, )*]
    };
}

/// words: ofir, tomer, nadav, roy
/// tags: S, T
/// pairs: ofir/S, tomer/S, nadav/T, roy/T
pub fn generate_test_vocabulary() -> Vocabulary {
    Vocabulary::new(
        &["ofir", "tomer", "nadav", "roy"],
        &["S", "T"],
        &[("ofir", "S"), ("tomer", "S"), ("nadav", "T"), ("roy", "T")],
    )
}

/// Flattens feature slots into `(slot, size)` pairs, a miss being `-1`.
pub fn slot_pairs(features: &[FeatureSlot]) -> Vec<(isize, usize)> {
    features
        .iter()
        .map(|f| (f.slot.map_or(-1, |s| s as isize), f.size))
        .collect()
}

/// Every dependent's gold head is the only head with a plausible tag pair, so the corpus is
/// separable by the basic features.
#[cfg(feature = "train")]
pub fn generate_toy_corpus() -> Vec<LabeledSentence> {
    vec![
        LabeledSentence::new(
            &["the", "dog", "barks"],
            &["DT", "NN", "VBZ"],
            &[2, 3, 0],
        )
        .unwrap(),
        LabeledSentence::new(&["a", "cat", "sleeps"], &["DT", "NN", "VBZ"], &[2, 3, 0]).unwrap(),
        LabeledSentence::new(
            &["dogs", "bark", "loudly"],
            &["NNS", "VBP", "RB"],
            &[2, 0, 2],
        )
        .unwrap(),
        LabeledSentence::new(
            &["the", "big", "dog", "barks"],
            &["DT", "JJ", "NN", "VBZ"],
            &[3, 3, 4, 0],
        )
        .unwrap(),
    ]
}

pub(crate) use hashmap;
