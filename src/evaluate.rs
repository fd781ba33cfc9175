//! Unlabeled attachment score.

use crate::errors::Result;
use crate::model::Model;
use crate::sentence::LabeledSentence;

/// Counts of correctly attached tokens.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AttachmentScore {
    /// Tokens whose predicted head equals the gold head.
    pub correct: usize,

    /// Tokens evaluated, the root excluded.
    pub total: usize,
}

impl AttachmentScore {
    /// Returns `correct / total`, or 0 if nothing was evaluated.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64
    }
}

impl core::ops::AddAssign for AttachmentScore {
    fn add_assign(&mut self, other: Self) {
        self.correct += other.correct;
        self.total += other.total;
    }
}

/// Parses every sentence with `model` and compares the heads against the gold trees.
///
/// Sentences the model fails to parse count as entirely wrong.
///
/// # Errors
///
/// Feature extraction errors are propagated. See [`Model::prepare()`].
pub fn evaluate(model: &Model, sentences: &[LabeledSentence]) -> Result<AttachmentScore> {
    let mut score = AttachmentScore::default();
    for (i, sentence) in sentences.iter().enumerate() {
        let gold = sentence.tree().heads();
        score.total += gold.len();
        let prepared = model.prepare(sentence.sentence())?;
        match model.parse_prepared(&prepared) {
            Ok(tree) => {
                score.correct += gold
                    .iter()
                    .zip(tree.heads())
                    .filter(|(g, p)| g == p)
                    .count();
            }
            Err(e) => log::warn!("sentence {i} counted as wrong: {e}"),
        }
    }
    Ok(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::extractor::{BasicFeatures, FeatureExtractor};
    use crate::pruning::CandidateFilter;
    use crate::test_utils;

    #[test]
    fn test_accuracy() {
        assert_eq!(0.0, AttachmentScore::default().accuracy());
        let mut score = AttachmentScore {
            correct: 1,
            total: 4,
        };
        score += AttachmentScore {
            correct: 2,
            total: 4,
        };
        assert_eq!(0.375, score.accuracy());
    }

    #[test]
    fn test_untrained_model_attaches_to_root() {
        let extractor =
            FeatureExtractor::Basic(BasicFeatures::new(test_utils::generate_test_vocabulary()));
        let model = Model::new(extractor, CandidateFilter::new());
        let sentences = [
            LabeledSentence::new(&["ofir", "roy"], &["S", "T"], &[2, 0]).unwrap(),
            LabeledSentence::new(&["tomer"], &["S"], &[0]).unwrap(),
        ];
        let score = evaluate(&model, &sentences).unwrap();
        assert_eq!(
            AttachmentScore {
                correct: 2,
                total: 3
            },
            score
        );
    }
}
