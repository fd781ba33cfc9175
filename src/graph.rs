use alloc::vec::Vec;

use crate::errors::{Result, RudepError};

/// Represents the candidate head→dependent edges of a sentence.
///
/// Node 0 is the root and never a dependent. Successor lists are kept in ascending order, which
/// fixes the order the decoder visits edges in.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CandidateGraph {
    successors: Vec<Vec<usize>>,
}

impl CandidateGraph {
    /// Creates a graph of `len` nodes without edges.
    pub fn new(len: usize) -> Self {
        Self {
            successors: vec![vec![]; len],
        }
    }

    /// Creates a graph of `len` nodes with every edge `(h, m)`, `h ≠ m`, `m ≠ 0`.
    pub fn complete(len: usize) -> Self {
        let successors = (0..len)
            .map(|h| (1..len).filter(|&m| m != h).collect())
            .collect();
        Self { successors }
    }

    /// Adds an edge. Adding an existing edge has no effect.
    ///
    /// # Errors
    ///
    /// Both ends must be nodes of the graph, `dep` must not be the root, and `head ≠ dep`.
    pub fn add_edge(&mut self, head: usize, dep: usize) -> Result<()> {
        if head >= self.len() || dep >= self.len() {
            return Err(RudepError::invalid_argument("edge out of range"));
        }
        if dep == 0 {
            return Err(RudepError::invalid_argument("root cannot be a dependent"));
        }
        if head == dep {
            return Err(RudepError::invalid_argument("self-loop"));
        }
        let successors = &mut self.successors[head];
        if let Err(pos) = successors.binary_search(&dep) {
            successors.insert(pos, dep);
        }
        Ok(())
    }

    /// Keeps only the edges for which `f(head, dep)` returns `true`.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(usize, usize) -> bool,
    {
        for (head, successors) in self.successors.iter_mut().enumerate() {
            successors.retain(|&dep| f(head, dep));
        }
    }

    /// Returns `true` if the graph has the edge.
    #[inline(always)]
    pub fn contains(&self, head: usize, dep: usize) -> bool {
        self.successors
            .get(head)
            .is_some_and(|s| s.binary_search(&dep).is_ok())
    }

    /// Returns the number of nodes, including the root.
    #[inline(always)]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.successors.len()
    }

    /// Returns the dependents `head` may govern.
    #[inline(always)]
    pub fn successors(&self, head: usize) -> &[usize] {
        &self.successors[head]
    }

    /// Iterates over all edges, ordered by head and then by dependent.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.successors
            .iter()
            .enumerate()
            .flat_map(|(h, s)| s.iter().map(move |&m| (h, m)))
    }

    /// Returns the number of edges.
    pub fn n_edges(&self) -> usize {
        self.successors.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete() {
        let graph = CandidateGraph::complete(4);
        assert_eq!(4, graph.len());
        assert_eq!(&[1, 2, 3], graph.successors(0));
        assert_eq!(&[1, 3], graph.successors(2));
        assert_eq!(9, graph.n_edges());
        assert!(graph.contains(3, 1));
        assert!(!graph.contains(1, 0));
        assert!(!graph.contains(2, 2));
    }

    #[test]
    fn test_root_only() {
        let graph = CandidateGraph::complete(1);
        assert_eq!(0, graph.n_edges());
    }

    #[test]
    fn test_add_and_retain() {
        let mut graph = CandidateGraph::new(4);
        graph.add_edge(0, 3).unwrap();
        graph.add_edge(0, 1).unwrap();
        graph.add_edge(0, 1).unwrap();
        graph.add_edge(3, 2).unwrap();
        assert_eq!(
            vec![(0, 1), (0, 3), (3, 2)],
            graph.edges().collect::<Vec<_>>()
        );
        graph.retain(|h, _| h != 3);
        assert_eq!(2, graph.n_edges());
    }

    #[test]
    fn test_add_invalid() {
        let mut graph = CandidateGraph::new(3);
        assert!(graph.add_edge(1, 0).is_err());
        assert!(graph.add_edge(1, 1).is_err());
        assert!(graph.add_edge(0, 3).is_err());
    }
}
