//! Reader and writer of CoNLL-style corpora.
//!
//! Each non-blank line holds one token with whitespace-separated columns. The word is in column 2,
//! the tag in column 4, and the 1-based head in column 7, with 0 denoting the root. Blank lines
//! separate sentences.

use std::io::{BufRead, Lines, Write};

use alloc::string::String;
use alloc::vec::Vec;

use crate::errors::{Result, RudepError};
use crate::sentence::{DependencyTree, LabeledSentence, Sentence};

const WORD_COLUMN: usize = 1;
const TAG_COLUMN: usize = 3;
const HEAD_COLUMN: usize = 6;

/// One sentence block: the line number of its first line and its lines.
struct Block {
    first_line: usize,
    lines: Vec<String>,
}

impl Block {
    fn column(&self, token: usize, column: usize, msg: &'static str) -> Result<&str> {
        self.lines[token]
            .split_whitespace()
            .nth(column)
            .ok_or(RudepError::corpus(self.first_line + token, msg))
    }

    fn sentence(&self) -> Result<Sentence> {
        let mut pairs = Vec::with_capacity(self.lines.len());
        for i in 0..self.lines.len() {
            let word = self.column(i, WORD_COLUMN, "missing word column")?;
            let tag = self.column(i, TAG_COLUMN, "missing tag column")?;
            pairs.push((word, tag));
        }
        Ok(Sentence::from_pairs(pairs))
    }

    fn labeled_sentence(&self) -> Result<LabeledSentence> {
        let sentence = self.sentence()?;
        let mut heads = Vec::with_capacity(self.lines.len());
        for i in 0..self.lines.len() {
            let head = self.column(i, HEAD_COLUMN, "missing head column")?;
            let head = head
                .parse()
                .map_err(|_| RudepError::corpus(self.first_line + i, "head is not an integer"))?;
            heads.push(head);
        }
        let tree = DependencyTree::from_heads(&heads).map_err(|e| match e {
            RudepError::InvalidTree(e) => RudepError::corpus(
                self.first_line + e.dependent.max(1) - 1,
                "heads do not form a tree",
            ),
            e => e,
        })?;
        LabeledSentence::from_parts(sentence, tree)
    }
}

/// Splits a corpus into sentence blocks.
pub struct CorpusReader<R> {
    lines: Lines<R>,
    line_no: usize,
    failed: bool,
}

impl<R> CorpusReader<R>
where
    R: BufRead,
{
    /// Creates a new reader.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            failed: false,
        }
    }

    /// Reads sentences with their gold trees.
    pub fn labeled(reader: R) -> LabeledSentences<R> {
        LabeledSentences(Self::new(reader))
    }

    /// Reads sentences, ignoring the head column.
    pub fn unlabeled(reader: R) -> Sentences<R> {
        Sentences(Self::new(reader))
    }

    fn next_block(&mut self) -> Option<Result<Block>> {
        if self.failed {
            return None;
        }
        let mut block = Block {
            first_line: 0,
            lines: vec![],
        };
        for line in self.lines.by_ref() {
            self.line_no += 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e.into()));
                }
            };
            if line.trim().is_empty() {
                if block.lines.is_empty() {
                    continue;
                }
                return Some(Ok(block));
            }
            if block.lines.is_empty() {
                block.first_line = self.line_no;
            }
            block.lines.push(line);
        }
        if block.lines.is_empty() {
            None
        } else {
            Some(Ok(block))
        }
    }
}

/// Iterator over the labeled sentences of a corpus, created by [`CorpusReader::labeled()`].
///
/// A malformed block yields an error, and iteration continues with the next block.
pub struct LabeledSentences<R>(CorpusReader<R>);

impl<R> Iterator for LabeledSentences<R>
where
    R: BufRead,
{
    type Item = Result<LabeledSentence>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0
            .next_block()
            .map(|block| block.and_then(|b| b.labeled_sentence()))
    }
}

/// Iterator over the sentences of a corpus, created by [`CorpusReader::unlabeled()`].
///
/// A malformed block yields an error, and iteration continues with the next block.
pub struct Sentences<R>(CorpusReader<R>);

impl<R> Iterator for Sentences<R>
where
    R: BufRead,
{
    type Item = Result<Sentence>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0
            .next_block()
            .map(|block| block.and_then(|b| b.sentence()))
    }
}

/// Copies a corpus to `out`, replacing the head column with predicted heads.
///
/// `trees[i]` holds the prediction for the `i`-th sentence block of `input`. Columns are joined
/// with tabs and short lines are padded with `_`. Where no prediction is available, the original
/// head is kept.
///
/// # Errors
///
/// I/O errors are propagated.
pub fn write_predictions<R, W>(
    input: R,
    trees: &[Option<DependencyTree>],
    mut out: W,
) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut block = 0;
    let mut token = 0;
    for line in input.lines() {
        let line = line?;
        let mut columns: Vec<&str> = line.split_whitespace().collect();
        if columns.is_empty() {
            if token != 0 {
                writeln!(out)?;
                block += 1;
                token = 0;
            }
            continue;
        }
        token += 1;
        if columns.len() <= HEAD_COLUMN {
            columns.resize(HEAD_COLUMN + 1, "_");
        }
        let head = trees
            .get(block)
            .and_then(Option::as_ref)
            .and_then(|tree| tree.head(token))
            .map(|head| head.to_string());
        if let Some(head) = &head {
            columns[HEAD_COLUMN] = head.as_str();
        }
        writeln!(out, "{}", columns.join("\t"))?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: &str = "\
1\tthe\t_\tDT\t_\t_\t2\t_
2\tdog\t_\tNN\t_\t_\t3\t_
3\tbarks\t_\tVBZ\t_\t_\t0\t_

1\tdogs\t_\tNNS\t_\t_\t2\t_
2\tbark\t_\tVBP\t_\t_\t0\t_
";

    #[test]
    fn test_labeled() {
        let sentences: Vec<_> = CorpusReader::labeled(CORPUS.as_bytes())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(2, sentences.len());
        assert_eq!(4, sentences[0].sentence().len());
        assert_eq!("dog", sentences[0].sentence().word(2));
        assert_eq!("VBZ", sentences[0].sentence().tag(3));
        assert_eq!(&[2, 3, 0], sentences[0].tree().heads());
        assert_eq!(&[2, 0], sentences[1].tree().heads());
    }

    #[test]
    fn test_unlabeled_ignores_heads() {
        let corpus = "1 the _ DT\n2 dog _ NN\n\n\n\n1 hi _ UH\n";
        let sentences: Vec<_> = CorpusReader::unlabeled(corpus.as_bytes())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(2, sentences.len());
        assert_eq!("UH", sentences[1].tag(1));
    }

    #[test]
    fn test_malformed_blocks_are_skippable() {
        let corpus = "\
1 a _ X _ _ x _
2 b _ X _ _ 0 _

1 a _ X _ _ 2 _
2 b _ X _ _ 1 _

1 a _ X
2 b _ X _ _ 0 _

1 ok _ X _ _ 0 _
";
        let results: Vec<_> = CorpusReader::labeled(corpus.as_bytes()).collect();
        assert_eq!(4, results.len());
        assert!(matches!(&results[0], Err(RudepError::Corpus(e)) if e.line == 1));
        assert!(matches!(&results[1], Err(RudepError::Corpus(e)) if e.line == 4));
        assert!(matches!(&results[2], Err(RudepError::Corpus(e)) if e.line == 7));
        assert_eq!(&[0], results[3].as_ref().unwrap().tree().heads());
    }

    #[test]
    fn test_write_predictions() {
        let trees = [Some(DependencyTree::from_heads(&[3, 3, 0]).unwrap()), None];
        let mut out = vec![];
        write_predictions(CORPUS.as_bytes(), &trees, &mut out).unwrap();
        let expected = "\
1\tthe\t_\tDT\t_\t_\t3\t_
2\tdog\t_\tNN\t_\t_\t3\t_
3\tbarks\t_\tVBZ\t_\t_\t0\t_

1\tdogs\t_\tNNS\t_\t_\t2\t_
2\tbark\t_\tVBP\t_\t_\t0\t_
";
        assert_eq!(expected, String::from_utf8(out).unwrap());
    }

    #[test]
    fn test_write_predictions_pads_short_lines() {
        let input = "1 hi _ UH\n";
        let trees = [Some(DependencyTree::from_heads(&[0]).unwrap())];
        let mut out = vec![];
        write_predictions(input.as_bytes(), &trees, &mut out).unwrap();
        assert_eq!("1\thi\t_\tUH\t_\t_\t0\n", String::from_utf8(out).unwrap());

        let mut out = vec![];
        write_predictions(input.as_bytes(), &[], &mut out).unwrap();
        assert_eq!("1\thi\t_\tUH\t_\t_\t_\n", String::from_utf8(out).unwrap());
    }
}
