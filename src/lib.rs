//! # rudep
//!
//! Graph-based dependency parsing with a structured perceptron, implemented in pure Rust.
//!
//! Every candidate head→dependent edge of a sentence is scored by a linear function of sparse
//! features, and the highest-scoring spanning tree is found with the Chu-Liu-Edmonds algorithm.
//! Weights are learned online by comparing the gold tree with the tree predicted under the
//! current weights.
#![cfg_attr(
    all(feature = "std", feature = "train"),
    doc = "
## Examples

```rust
use rudep::{LabeledSentence, Sentence, Trainer};

// Training data:
// the/DT dog/NN barks/VBZ
// a/DT cat/NN sleeps/VBZ
// dogs/NNS bark/VBP loudly/RB
let sentences = vec![
    LabeledSentence::new(&[\"the\", \"dog\", \"barks\"], &[\"DT\", \"NN\", \"VBZ\"], &[2, 3, 0])?,
    LabeledSentence::new(&[\"a\", \"cat\", \"sleeps\"], &[\"DT\", \"NN\", \"VBZ\"], &[2, 3, 0])?,
    LabeledSentence::new(&[\"dogs\", \"bark\", \"loudly\"], &[\"NNS\", \"VBP\", \"RB\"], &[2, 0, 2])?,
];

// Generates a model
let trainer = Trainer::new().epochs(10)?;
let model = trainer.train(&sentences)?;

// the/DT cat/NN barks/VBZ
let sentence = Sentence::new(&[\"the\", \"cat\", \"barks\"], &[\"DT\", \"NN\", \"VBZ\"])?;
let tree = model.parse(&sentence)?;

assert_eq!(&[2, 3, 0], tree.heads());
# Ok::<(), rudep::RudepError>(())
```
"
)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "alloc"))]
compile_error!("`alloc` feature is currently required to build this crate");

#[macro_use]
extern crate alloc;

mod cache;
pub mod decoder;
pub mod errors;
pub mod evaluate;
mod extractor;
pub mod feature;
mod graph;
mod model;
pub mod pruning;
mod sentence;
mod utils;
mod vector;
mod vocabulary;

#[cfg(feature = "std")]
pub mod corpus;
#[cfg(feature = "train")]
mod trainer;

#[cfg(test)]
mod test_utils;

pub use cache::{EdgeFeatures, PreparedSentence};
pub use errors::{Result, RudepError};
pub use extractor::{
    BasicFeatures, ComplexFeatures, FeatureExtractor, FeatureLayout, FeatureSet, FeatureTemplate,
};
pub use graph::CandidateGraph;
pub use model::Model;
pub use sentence::{DependencyTree, LabeledSentence, Sentence, Token, ROOT};
pub use vector::{WeightVector, WeightVectorMut};
pub use vocabulary::{word_prefix, Vocabulary, PREFIX_LEN};

#[cfg(feature = "train")]
pub use trainer::Trainer;
