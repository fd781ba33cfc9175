use alloc::vec::Vec;

use crate::errors::{Result, RudepError};
use crate::extractor::{FeatureLayout, FeatureSet};
use crate::graph::CandidateGraph;
use crate::sentence::Sentence;
use crate::utils::FromU32;
use crate::vector::{WeightVector, WeightVectorMut};

/// Weight-vector positions live on each candidate edge of one sentence.
///
/// Positions are absolute (block offset already added) and stored in one flat buffer indexed by
/// `head * len + dep`, so scoring an edge is a slice lookup and a sum. Edges outside the candidate
/// graph have no positions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EdgeFeatures {
    len: usize,
    starts: Vec<u32>,
    positions: Vec<u32>,
}

impl EdgeFeatures {
    /// Extracts the features of every edge of `graph`.
    ///
    /// # Errors
    ///
    /// Positions must fit in `u32`.
    pub fn new<F>(
        features: &F,
        layout: &FeatureLayout,
        sentence: &Sentence,
        graph: &CandidateGraph,
    ) -> Result<Self>
    where
        F: FeatureSet + ?Sized,
    {
        let len = sentence.len();
        debug_assert_eq!(len, graph.len());
        let mut starts = Vec::with_capacity(len * len + 1);
        let mut positions = vec![];
        let mut buf = vec![];
        for head in 0..len {
            for dep in 0..len {
                starts.push(Self::offset(positions.len())?);
                if !graph.contains(head, dep) {
                    continue;
                }
                buf.clear();
                features.extract(sentence, head, dep, &mut buf);
                for pos in layout.positions(&buf) {
                    positions.push(Self::offset(pos)?);
                }
            }
        }
        starts.push(Self::offset(positions.len())?);
        Ok(Self {
            len,
            starts,
            positions,
        })
    }

    #[inline(always)]
    fn offset(x: usize) -> Result<u32> {
        u32::try_from(x).map_err(|_| RudepError::model_scale("feature positions exceed u32"))
    }

    /// Returns the sentence length, including the root.
    #[inline(always)]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the positions live on the edge `head → dep`.
    #[inline(always)]
    pub fn positions(&self, head: usize, dep: usize) -> &[u32] {
        let id = head * self.len + dep;
        let start = usize::from_u32(self.starts[id]);
        let end = usize::from_u32(self.starts[id + 1]);
        &self.positions[start..end]
    }

    /// Scores the edge `head → dep`.
    #[inline(always)]
    pub fn score<W>(&self, weights: &W, head: usize, dep: usize) -> f64
    where
        W: WeightVector + ?Sized,
    {
        weights.sum_weights(self.positions(head, dep))
    }

    /// Adds `value` to every weight live on the edge `head → dep`.
    #[inline(always)]
    pub fn update<W>(&self, weights: &mut W, head: usize, dep: usize, value: f64)
    where
        W: WeightVectorMut + ?Sized,
    {
        weights.add_weights(self.positions(head, dep), value);
    }
}

/// A sentence ready for decoding: its candidate graph and cached edge features.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PreparedSentence {
    graph: CandidateGraph,
    features: EdgeFeatures,
}

impl PreparedSentence {
    /// Extracts the features of every edge of `graph`.
    ///
    /// # Errors
    ///
    /// See [`EdgeFeatures::new()`].
    pub fn new<F>(
        features: &F,
        layout: &FeatureLayout,
        sentence: &Sentence,
        graph: CandidateGraph,
    ) -> Result<Self>
    where
        F: FeatureSet + ?Sized,
    {
        let features = EdgeFeatures::new(features, layout, sentence, &graph)?;
        Ok(Self { graph, features })
    }

    /// Gets the candidate graph.
    #[inline(always)]
    pub fn graph(&self) -> &CandidateGraph {
        &self.graph
    }

    /// Gets the cached edge features.
    #[inline(always)]
    pub fn features(&self) -> &EdgeFeatures {
        &self.features
    }
}
