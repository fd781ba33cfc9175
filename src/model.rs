use alloc::vec::Vec;

use bincode::{
    de::Decoder,
    enc::Encoder,
    error::{DecodeError, EncodeError},
    Decode, Encode,
};

use crate::cache::PreparedSentence;
use crate::decoder;
use crate::errors::Result;
use crate::extractor::{FeatureExtractor, FeatureLayout, FeatureSet};
use crate::pruning::CandidateFilter;
use crate::sentence::{DependencyTree, Sentence};
use crate::vocabulary::Vocabulary;

/// Represents a trained dependency parser.
///
/// A model carries its feature definition and candidate filter, so the same edges are scored at
/// inference as during training.
#[derive(Clone, Debug)]
pub struct Model {
    extractor: FeatureExtractor,
    filter: CandidateFilter,
    layout: FeatureLayout,
    weights: Vec<f64>,
}

impl Model {
    /// Creates a model with zero weights.
    pub fn new(extractor: FeatureExtractor, filter: CandidateFilter) -> Self {
        let layout = extractor.layout();
        let weights = vec![0.0; layout.len()];
        Self {
            extractor,
            filter,
            layout,
            weights,
        }
    }

    #[cfg(any(feature = "train", test))]
    #[inline(always)]
    pub(crate) fn weights_mut(&mut self) -> &mut Vec<f64> {
        &mut self.weights
    }

    /// Builds the candidate graph of `sentence` and extracts the features of its edges.
    ///
    /// # Errors
    ///
    /// See [`PreparedSentence::new()`].
    pub fn prepare(&self, sentence: &Sentence) -> Result<PreparedSentence> {
        let graph = self.filter.graph(sentence);
        PreparedSentence::new(&self.extractor, &self.layout, sentence, graph)
    }

    /// Parses a prepared sentence.
    ///
    /// # Errors
    ///
    /// See [`decoder::decode()`].
    pub fn parse_prepared(&self, prepared: &PreparedSentence) -> Result<DependencyTree> {
        let features = prepared.features();
        decoder::decode(prepared.graph(), |head, dep| {
            features.score(self.weights.as_slice(), head, dep)
        })
    }

    /// Parses a sentence.
    ///
    /// # Errors
    ///
    /// See [`Model::prepare()`] and [`decoder::decode()`].
    pub fn parse(&self, sentence: &Sentence) -> Result<DependencyTree> {
        let prepared = self.prepare(sentence)?;
        self.parse_prepared(&prepared)
    }

    /// Returns the score of the edge `head → dep`, or 0 for edges outside the candidate graph.
    #[inline(always)]
    pub fn score(&self, prepared: &PreparedSentence, head: usize, dep: usize) -> f64 {
        prepared
            .features()
            .score(self.weights.as_slice(), head, dep)
    }

    /// Gets the weight vector.
    #[inline(always)]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Returns the length of the weight vector.
    #[inline(always)]
    pub fn features_len(&self) -> usize {
        self.layout.len()
    }

    /// Gets the block layout of the weight vector.
    #[inline(always)]
    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    /// Gets the feature extractor.
    #[inline(always)]
    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    /// Gets the vocabulary.
    #[inline(always)]
    pub fn vocabulary(&self) -> &Vocabulary {
        self.extractor.vocabulary()
    }

    /// Gets the candidate filter.
    #[inline(always)]
    pub fn filter(&self) -> &CandidateFilter {
        &self.filter
    }
}

impl<Context> Decode<Context> for Model {
    fn decode<D: Decoder<Context = Context>>(decoder: &mut D) -> Result<Self, DecodeError> {
        let extractor: FeatureExtractor = Decode::decode(decoder)?;
        let filter = Decode::decode(decoder)?;
        let weights: Vec<f64> = Decode::decode(decoder)?;
        let layout = extractor.layout();
        if weights.len() != layout.len() {
            return Err(DecodeError::Other("weights do not match the feature layout"));
        }
        Ok(Self {
            extractor,
            filter,
            layout,
            weights,
        })
    }
}
bincode::impl_borrow_decode!(Model);

impl Encode for Model {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        Encode::encode(&self.extractor, encoder)?;
        Encode::encode(&self.filter, encoder)?;
        Encode::encode(&self.weights, encoder)?;
        Ok(())
    }
}
