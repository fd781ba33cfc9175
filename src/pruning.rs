//! Filters removing structurally implausible edges before feature extraction.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use bincode::{Decode, Encode};

use crate::errors::{Result, RudepError};
use crate::graph::CandidateGraph;
use crate::sentence::Sentence;

/// Side on which a dependent sits relative to its head.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Decode, Encode)]
pub enum Attachment {
    /// The head follows the dependent.
    Left,

    /// The head precedes the dependent.
    Right,

    /// Either side.
    Any,
}

impl Attachment {
    #[inline(always)]
    fn matches(self, head: usize, dep: usize) -> bool {
        match self {
            Self::Left => head > dep,
            Self::Right => head < dep,
            Self::Any => true,
        }
    }
}

/// A static table of tag-based pruning rules.
#[derive(Clone, Debug, Default, Eq, PartialEq, Decode, Encode)]
pub struct TagPairPruner {
    non_heads: Vec<String>,
    right_headed: Vec<String>,
    forbidden: Vec<(String, String, Attachment)>,
}

impl TagPairPruner {
    /// Creates a pruner without rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pruner with rules for Penn Treebank tags.
    pub fn english() -> Self {
        let mut pruner = Self::new();
        for tag in [",", ".", ":", "``", "''", "-LRB-", "-RRB-", "#", "CC"] {
            pruner = pruner.never_head(tag);
        }
        for tag in ["DT", "PDT", "PRP$", "WP$"] {
            pruner = pruner.head_follows(tag);
        }
        for (head, dep, attachment) in [
            ("JJ", "VBD", Attachment::Any),
            ("JJ", "VBZ", Attachment::Any),
            ("JJ", "VBP", Attachment::Any),
            ("RB", "NN", Attachment::Any),
            ("RB", "NNS", Attachment::Any),
            ("IN", "DT", Attachment::Left),
        ] {
            pruner = pruner.forbid(head, dep, attachment);
        }
        pruner
    }

    /// Tokens tagged `tag` never govern another token.
    pub fn never_head(mut self, tag: &str) -> Self {
        self.non_heads.push(tag.to_string());
        self
    }

    /// Tokens tagged `tag` only attach to a head on their right.
    pub fn head_follows(mut self, tag: &str) -> Self {
        self.right_headed.push(tag.to_string());
        self
    }

    /// A `head_tag` token never governs a `dep_tag` token on the given side.
    pub fn forbid(mut self, head_tag: &str, dep_tag: &str, attachment: Attachment) -> Self {
        self.forbidden
            .push((head_tag.to_string(), dep_tag.to_string(), attachment));
        self
    }

    /// Returns `true` if no rule rejects the edge.
    pub fn allows(&self, sentence: &Sentence, head: usize, dep: usize) -> bool {
        let head_tag = sentence.tag(head);
        let dep_tag = sentence.tag(dep);
        if self.non_heads.iter().any(|t| t == head_tag) {
            return false;
        }
        if head < dep && self.right_headed.iter().any(|t| t == dep_tag) {
            return false;
        }
        !self
            .forbidden
            .iter()
            .any(|(h, m, a)| h == head_tag && m == dep_tag && a.matches(head, dep))
    }
}

/// Builds the candidate graph of a sentence, optionally pruned by distance and by tag pairs.
///
/// Edges leaving the root are never pruned, so every token keeps a candidate head.
#[derive(Clone, Debug, Default, Eq, PartialEq, Decode, Encode)]
pub struct CandidateFilter {
    max_distance: Option<usize>,
    tag_pairs: Option<TagPairPruner>,
}

impl CandidateFilter {
    /// Creates a filter that keeps every edge.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops edges spanning more than `max_distance` tokens.
    ///
    /// # Errors
    ///
    /// `max_distance` must not be 0.
    pub fn max_distance(mut self, max_distance: usize) -> Result<Self> {
        if max_distance == 0 {
            return Err(RudepError::invalid_argument("max_distance must not be 0"));
        }
        self.max_distance = Some(max_distance);
        Ok(self)
    }

    /// Drops edges rejected by `pruner`.
    pub fn tag_pairs(mut self, pruner: TagPairPruner) -> Self {
        self.tag_pairs = Some(pruner);
        self
    }

    /// Returns `true` if the filter may drop edges.
    #[inline(always)]
    pub fn is_active(&self) -> bool {
        self.max_distance.is_some() || self.tag_pairs.is_some()
    }

    /// Returns `true` if the edge survives the filter.
    pub fn allows(&self, sentence: &Sentence, head: usize, dep: usize) -> bool {
        if head == 0 {
            return true;
        }
        if let Some(max_distance) = self.max_distance {
            if head.abs_diff(dep) > max_distance {
                return false;
            }
        }
        self.tag_pairs
            .as_ref()
            .is_none_or(|pruner| pruner.allows(sentence, head, dep))
    }

    /// Returns the candidate graph of `sentence`.
    pub fn graph(&self, sentence: &Sentence) -> CandidateGraph {
        let mut graph = CandidateGraph::complete(sentence.len());
        if self.is_active() {
            graph.retain(|head, dep| self.allows(sentence, head, dep));
        }
        graph
    }
}
