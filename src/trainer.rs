use std::panic;
use std::thread;
use std::time::Instant;

use alloc::vec::Vec;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::cache::{EdgeFeatures, PreparedSentence};
use crate::decoder;
use crate::errors::{Result, RudepError};
use crate::extractor::{FeatureExtractor, FeatureLayout, FeatureSet, FeatureTemplate};
use crate::model::Model;
use crate::pruning::CandidateFilter;
use crate::sentence::{DependencyTree, LabeledSentence};
use crate::vocabulary::Vocabulary;

/// Structured perceptron trainer.
#[cfg_attr(docsrs, doc(cfg(feature = "train")))]
pub struct Trainer {
    epochs: usize,
    seed: u64,
    template: FeatureTemplate,
    filter: CandidateFilter,
    n_threads: usize,
}

impl Trainer {
    /// Creates a new trainer.
    pub fn new() -> Self {
        Self {
            epochs: 10,
            seed: 0,
            template: FeatureTemplate::Basic,
            filter: CandidateFilter::new(),
            n_threads: 1,
        }
    }

    /// Sets the number of passes over the training data.
    ///
    /// # Errors
    ///
    /// `epochs` must not be 0.
    pub fn epochs(mut self, epochs: usize) -> Result<Self> {
        if epochs == 0 {
            return Err(RudepError::invalid_argument("epochs must not be 0"));
        }
        self.epochs = epochs;
        Ok(self)
    }

    /// Sets the seed of the per-epoch shuffle.
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the feature template.
    pub const fn features(mut self, template: FeatureTemplate) -> Self {
        self.template = template;
        self
    }

    /// Sets the candidate filter applied to every sentence.
    pub fn filter(mut self, filter: CandidateFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Sets the number of threads used for feature extraction.
    ///
    /// # Errors
    ///
    /// `n_threads` must not be 0.
    pub fn n_threads(mut self, n_threads: usize) -> Result<Self> {
        if n_threads == 0 {
            return Err(RudepError::invalid_argument("n_threads must not be 0"));
        }
        self.n_threads = n_threads;
        Ok(self)
    }

    /// Builds the candidate graph of a gold sentence with every gold edge re-admitted.
    ///
    /// Returns the prepared sentence and the number of gold edges the filter had removed.
    fn prepare(
        filter: &CandidateFilter,
        extractor: &FeatureExtractor,
        layout: &FeatureLayout,
        sentence: &LabeledSentence,
    ) -> Result<(PreparedSentence, usize)> {
        let mut graph = filter.graph(sentence.sentence());
        let mut pruned = 0;
        for (head, dep) in sentence.tree().edges() {
            if !graph.contains(head, dep) {
                graph.add_edge(head, dep)?;
                pruned += 1;
            }
        }
        let prepared = PreparedSentence::new(extractor, layout, sentence.sentence(), graph)?;
        Ok((prepared, pruned))
    }

    fn prepare_all(
        &self,
        extractor: &FeatureExtractor,
        layout: &FeatureLayout,
        sentences: &[LabeledSentence],
    ) -> Result<Vec<PreparedSentence>> {
        let (s, r) = crossbeam_channel::unbounded();
        for i in 0..sentences.len() {
            // The receiver is still alive, so sending cannot fail.
            s.send(i).ok();
        }
        drop(s);
        let mut results = thread::scope(|scope| {
            let mut threads = vec![];
            for _ in 0..self.n_threads {
                let t = scope.spawn(|| {
                    let mut results = vec![];
                    while let Ok(i) = r.try_recv() {
                        let result = Self::prepare(&self.filter, extractor, layout, &sentences[i]);
                        results.push((i, result));
                    }
                    results
                });
                threads.push(t);
            }
            let mut results = Vec::with_capacity(sentences.len());
            for t in threads {
                match t.join() {
                    Ok(r) => results.extend(r),
                    Err(e) => panic::resume_unwind(e),
                }
            }
            results
        });
        results.sort_unstable_by_key(|&(i, _)| i);

        let mut prepared = Vec::with_capacity(sentences.len());
        let mut n_pruned = 0;
        for (_, result) in results {
            let (p, pruned) = result?;
            prepared.push(p);
            n_pruned += pruned;
        }
        if n_pruned != 0 {
            let n_edges: usize = sentences.iter().map(|s| s.tree().heads().len()).sum();
            log::warn!(
                "the candidate filter removed {n_pruned} of {n_edges} gold edges; they were re-admitted for training"
            );
        }
        Ok(prepared)
    }

    /// Moves the weights towards the gold tree and away from the predicted one.
    ///
    /// Only dependents whose predicted head is wrong are touched.
    pub(crate) fn update(
        weights: &mut [f64],
        features: &EdgeFeatures,
        gold: &DependencyTree,
        predicted: &DependencyTree,
    ) {
        for ((dep, &g), &p) in (1..).zip(gold.heads()).zip(predicted.heads()) {
            if g != p {
                features.update(weights, g, dep, 1.0);
                features.update(weights, p, dep, -1.0);
            }
        }
    }

    /// Starts training and generates a model from the given sentences.
    ///
    /// # Errors
    ///
    /// `sentences` must not be empty, and the feature vector must be addressable with `u32`.
    pub fn train(&self, sentences: &[LabeledSentence]) -> Result<Model> {
        if sentences.is_empty() {
            return Err(RudepError::invalid_argument("no training sentences"));
        }

        let vocab = Vocabulary::from_sentences(sentences.iter().map(LabeledSentence::sentence));
        let extractor = self.template.build(vocab);
        let layout = extractor.layout();
        if u32::try_from(layout.len()).is_err() {
            return Err(RudepError::model_scale("feature vector exceeds u32"));
        }
        log::info!(
            "vocabulary: {} words, {} tags, {} pairs; {} features",
            extractor.vocabulary().words().len(),
            extractor.vocabulary().tags().len(),
            extractor.vocabulary().pairs().len(),
            layout.len(),
        );

        let start = Instant::now();
        let prepared = self.prepare_all(&extractor, &layout, sentences)?;
        log::info!(
            "extracted features of {} sentences in {:?}",
            prepared.len(),
            start.elapsed()
        );

        let mut model = Model::new(extractor, self.filter.clone());
        let weights = model.weights_mut();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.seed);
        let mut order: Vec<usize> = (0..sentences.len()).collect();
        for epoch in 1..=self.epochs {
            let start = Instant::now();
            order.shuffle(&mut rng);
            let mut mistakes = 0;
            let mut skipped = 0;
            for &i in &order {
                let p = &prepared[i];
                let gold = sentences[i].tree();
                let features = p.features();
                let predicted = match decoder::decode(p.graph(), |head, dep| {
                    features.score(weights.as_slice(), head, dep)
                }) {
                    Ok(tree) => tree,
                    Err(e) => {
                        log::warn!("epoch {epoch}: skipped sentence {i}: {e}");
                        skipped += 1;
                        continue;
                    }
                };
                if predicted != *gold {
                    mistakes += 1;
                    Self::update(weights, features, gold, &predicted);
                }
            }
            log::info!(
                "epoch {epoch}/{}: mistakes = {mistakes}/{}, skipped = {skipped}, elapsed = {:?}",
                self.epochs,
                sentences.len(),
                start.elapsed(),
            );
        }

        Ok(model)
    }
}

impl Default for Trainer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::evaluate::evaluate;
    use crate::extractor::BasicFeatures;
    use crate::graph::CandidateGraph;
    use crate::sentence::Sentence;
    use crate::test_utils;

    #[test]
    fn test_invalid_settings() {
        assert!(Trainer::new().epochs(0).is_err());
        assert!(Trainer::new().n_threads(0).is_err());
        assert!(Trainer::new().train(&[]).is_err());
    }

    #[test]
    fn test_convergence() {
        let corpus = test_utils::generate_toy_corpus();
        let model = Trainer::new().epochs(20).unwrap().train(&corpus).unwrap();
        let score = evaluate(&model, &corpus).unwrap();
        assert_eq!(score.correct, score.total);
        assert_eq!(13, score.total);
    }

    #[test]
    fn test_same_seed_same_model() {
        let corpus = test_utils::generate_toy_corpus();
        let trainer = Trainer::new().epochs(3).unwrap().seed(42);
        let a = trainer.train(&corpus).unwrap();
        let b = trainer.train(&corpus).unwrap();
        assert_eq!(a.weights(), b.weights());
    }

    #[test]
    fn test_thread_count_does_not_matter() {
        let corpus = test_utils::generate_toy_corpus();
        let a = Trainer::new()
            .epochs(3)
            .unwrap()
            .train(&corpus)
            .unwrap();
        let b = Trainer::new()
            .epochs(3)
            .unwrap()
            .n_threads(3)
            .unwrap()
            .train(&corpus)
            .unwrap();
        assert_eq!(a.weights(), b.weights());
    }

    #[test]
    fn test_update_skips_shared_edges() {
        let basic = BasicFeatures::new(test_utils::generate_test_vocabulary());
        let layout = basic.layout();
        let sentence = Sentence::new(&["ofir", "roy", "tomer"], &["S", "T", "S"]).unwrap();
        let graph = CandidateGraph::complete(sentence.len());
        let features = EdgeFeatures::new(&basic, &layout, &sentence, &graph).unwrap();
        let gold = DependencyTree::from_heads(&[2, 0, 2]).unwrap();
        let predicted = DependencyTree::from_heads(&[0, 0, 2]).unwrap();

        let mut weights = vec![0.0; layout.len()];
        Trainer::update(&mut weights, &features, &gold, &predicted);

        let mut expected = vec![0.0; layout.len()];
        features.update(&mut expected, 2, 1, 1.0);
        features.update(&mut expected, 0, 1, -1.0);
        assert_eq!(expected, weights);

        let mut weights = vec![0.0; layout.len()];
        Trainer::update(&mut weights, &features, &gold, &gold);
        assert!(weights.iter().all(|&w| w == 0.0));
    }

    #[test]
    fn test_pruned_gold_edges_are_readmitted() {
        let sentence =
            LabeledSentence::new(&["a", "b", "c", "d"], &["X"; 4], &[0, 1, 2, 1]).unwrap();
        let filter = CandidateFilter::new().max_distance(1).unwrap();
        let extractor =
            FeatureTemplate::Basic.build(Vocabulary::from_sentences([sentence.sentence()]));
        let layout = extractor.layout();
        let (prepared, pruned) =
            Trainer::prepare(&filter, &extractor, &layout, &sentence).unwrap();
        assert_eq!(1, pruned);
        assert!(prepared.graph().contains(1, 4));
        assert!(!prepared.graph().contains(4, 1));
    }
}
