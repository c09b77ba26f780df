//! Online suffix tree (Ukkonen) over a pre-loaded byte sequence.
//!
//! The whole text is known up front, but the tree only ever sees the
//! first `committed()` symbols. Every step also refreshes, for the
//! trailing `max_lookback` suffixes, the latest text position at which
//! each of them ended. Suffix links and edge labels always point at the
//! first occurrence of a substring; the latest-occurrence table is what
//! lets the tree answer queries restricted to a recent window.
//!
//! Nodes and edges live in two arenas and refer to each other by index.

use std::collections::{BTreeMap, HashMap};

use tracing::trace;

use crate::matcher::{Match, MatchFinder};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct NodeId(usize);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct EdgeId(usize);

const ROOT: NodeId = NodeId(0);
// has one edge per symbol of the text, each leading back to the root
const BOTTOM: NodeId = NodeId(1);

#[derive(Debug, Default)]
struct Node {
    // keyed by the first symbol of the edge label
    edges: HashMap<u8, EdgeId>,
    suffix_link: Option<NodeId>,
}

impl Node {
    fn is_leaf(&self) -> bool {
        self.edges.is_empty()
    }
}

#[derive(Debug)]
struct Edge {
    first: usize,
    // None while the edge ends in a leaf that still grows
    last: Option<usize>,
    end: NodeId,
    // first-occurrence end position -> latest known end position.
    // Missing means the substring has only occurred once.
    latest: BTreeMap<usize, usize>,
}

impl Edge {
    fn new(first: usize, last: Option<usize>, end: NodeId) -> Self {
        Edge {
            first,
            last,
            end,
            latest: BTreeMap::new(),
        }
    }

    fn label_len(&self) -> Option<usize> {
        self.last.map(|last| last - self.first + 1)
    }

    fn last_within(&self, bound: usize) -> usize {
        self.last.map_or(bound, |last| last.min(bound))
    }

    fn latest_occurrence(&self, first_pos: usize) -> usize {
        debug_assert!(first_pos >= self.first);
        self.latest.get(&first_pos).copied().unwrap_or(first_pos)
    }

    fn record_occurrence(&mut self, first_pos: usize, end: usize) {
        if end > self.latest_occurrence(first_pos) {
            self.latest.insert(first_pos, end);
        }
    }
}

/// Canonical reference to the point reached by `text[start..end]` below
/// `node`, where `end` is supplied by the caller.
#[derive(Debug, Copy, Clone)]
struct ActivePoint {
    node: NodeId,
    start: usize,
}

pub struct SuffixTree<'a> {
    symbols: &'a [u8],
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    active: ActivePoint,
    committed: usize,
    max_lookback: usize,
}

impl<'a> SuffixTree<'a> {
    /// Builds an empty tree over `symbols`. `max_lookback` bounds how many
    /// trailing suffixes get their latest occurrence refreshed per step,
    /// and therefore the longest match whose latest occurrence is exact.
    pub fn new(symbols: &'a [u8], max_lookback: usize) -> Self {
        let mut tree = SuffixTree {
            symbols,
            nodes: vec![Node::default(), Node::default()],
            edges: Vec::new(),
            active: ActivePoint {
                node: ROOT,
                start: 0,
            },
            committed: 0,
            max_lookback,
        };
        let mut seen = [false; 256];
        for (i, &c) in symbols.iter().enumerate() {
            if !seen[c as usize] {
                seen[c as usize] = true;
                tree.add_edge(BOTTOM, Edge::new(i, Some(i), ROOT));
            }
        }
        tree.nodes[ROOT.0].suffix_link = Some(BOTTOM);
        tree
    }

    pub fn committed(&self) -> usize {
        self.committed
    }

    pub fn is_complete(&self) -> bool {
        self.committed == self.symbols.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Reveals the next symbol to the tree. Returns false if every symbol
    /// was already committed.
    pub fn commit_next_symbol(&mut self) -> bool {
        let i = self.committed;
        if i >= self.symbols.len() {
            return false;
        }
        let ActivePoint { node, start } = self.update(self.active.node, self.active.start, i);
        self.active = self.canonize(node, start, i + 1);
        self.committed = i + 1;
        self.refresh_latest_occurrences();
        true
    }

    /// Commits up to `n` symbols, returning how many were committed.
    pub fn commit(&mut self, n: usize) -> usize {
        (0..n).take_while(|_| self.commit_next_symbol()).count()
    }

    pub fn commit_all(&mut self) {
        while self.commit_next_symbol() {}
    }

    /// Records the newest committed position as the latest end of every
    /// suffix of length up to `max_lookback` that ends there.
    ///
    /// Runs as part of every commit; calling it again is a no-op since
    /// recorded positions only ever grow.
    pub fn refresh_latest_occurrences(&mut self) {
        let Some(end) = self.committed.checked_sub(1) else {
            return;
        };
        for start in (end + 1).saturating_sub(self.max_lookback)..=end {
            let (edge, pos) = self
                .locate(&self.symbols[start..=end])
                .expect("every committed suffix is spelled out in the tree");
            self.edges[edge.0].record_occurrence(pos, end);
        }
    }

    /// Finds the longest prefix of `target` that occurs in the committed
    /// text with its latest occurrence starting at or after `min_start`.
    ///
    /// The match is never longer than `target`. A single-symbol match is
    /// still reported; deciding whether it is worth a copy is up to the
    /// caller.
    pub fn find_longest_match_after(&self, target: &[u8], min_start: usize) -> Option<Match> {
        let mut best = None;
        self.walk(target, |edge, pos, len| {
            let latest_end = self.edges[edge.0].latest_occurrence(pos);
            let start = latest_end + 1 - len;
            // walking deeper only ever lengthens the match
            if start >= min_start {
                best = Some(Match { start, len });
            }
        });
        best
    }

    /// Text position where the latest committed occurrence of `path` ends,
    /// or None if `path` has not occurred yet.
    pub fn latest_occurrence_of(&self, path: &[u8]) -> Option<usize> {
        let (edge, pos) = self.locate(path)?;
        Some(self.edges[edge.0].latest_occurrence(pos))
    }

    /// Depth-first walk over the committed tree, children in symbol order.
    pub fn edges(&self) -> Edges<'_, 'a> {
        let mut walk = Edges {
            tree: self,
            stack: Vec::new(),
        };
        walk.push_children(ROOT, 0);
        walk
    }

    /// Number of distinct non-empty substrings of the committed prefix,
    /// counted as the total length of all committed edge labels.
    pub fn distinct_substrings(&self) -> usize {
        self.edges().map(|e| e.label.len()).sum()
    }

    fn add_edge(&mut self, from: NodeId, edge: Edge) -> EdgeId {
        let c = self.symbols[edge.first];
        let id = EdgeId(self.edges.len());
        self.edges.push(edge);
        self.nodes[from.0].edges.insert(c, id);
        id
    }

    fn new_node(&mut self) -> NodeId {
        self.nodes.push(Node::default());
        NodeId(self.nodes.len() - 1)
    }

    fn child_edge(&self, node: NodeId, c: u8) -> Option<EdgeId> {
        self.nodes[node.0].edges.get(&c).copied()
    }

    fn expect_edge(&self, node: NodeId, c: u8) -> EdgeId {
        self.child_edge(node, c)
            .expect("canonical reference continues along an existing edge")
    }

    /// Inserts `symbols[i]` after every suffix of `symbols[..i]` that it
    /// does not already extend, starting from the active point
    /// `(node, symbols[start..i])`.
    fn update(&mut self, mut node: NodeId, mut start: usize, i: usize) -> ActivePoint {
        let t = self.symbols[i];
        let mut prev = ROOT;
        let (mut at_end, mut r) = self.test_and_split(node, start, i, t);
        while !at_end {
            let leaf = self.new_node();
            self.add_edge(r, Edge::new(i, None, leaf));
            if prev != ROOT {
                self.nodes[prev.0].suffix_link = Some(r);
            }
            prev = r;
            let link = self.nodes[node.0]
                .suffix_link
                .expect("explicit node on the boundary path has a suffix link");
            let next = self.canonize(link, start, i);
            node = next.node;
            start = next.start;
            (at_end, r) = self.test_and_split(node, start, i, t);
        }
        if prev != ROOT {
            self.nodes[prev.0].suffix_link = Some(node);
        }
        ActivePoint { node, start }
    }

    /// Checks whether the point `(node, symbols[start..end])` continues
    /// with `t`. If it doesn't and the point is implicit, splits the edge
    /// there and returns the new node.
    fn test_and_split(&mut self, node: NodeId, start: usize, end: usize, t: u8) -> (bool, NodeId) {
        if start >= end {
            return (self.child_edge(node, t).is_some(), node);
        }
        let id = self.expect_edge(node, self.symbols[start]);
        let split = self.edges[id.0].first + (end - start);
        if self.symbols[split] == t {
            return (true, node);
        }
        let mid = self.new_node();
        let upper = &mut self.edges[id.0];
        let lower = Edge {
            first: split,
            last: upper.last,
            end: upper.end,
            latest: upper.latest.split_off(&split),
        };
        upper.last = Some(split - 1);
        upper.end = mid;
        self.add_edge(mid, lower);
        trace!(split, "split edge");
        (false, mid)
    }

    /// Moves `(node, symbols[start..end])` down past every edge it fully
    /// covers.
    fn canonize(&self, mut node: NodeId, mut start: usize, end: usize) -> ActivePoint {
        while start < end {
            let edge = &self.edges[self.expect_edge(node, self.symbols[start]).0];
            match edge.label_len() {
                Some(len) if len <= end - start => {
                    start += len;
                    node = edge.end;
                }
                _ => break,
            }
        }
        ActivePoint { node, start }
    }

    /// Follows `target` from the root through committed symbols, calling
    /// `visit(edge, pos, len)` for each matched prefix length `len`, where
    /// `pos` is the label position of its last symbol. Returns the number
    /// of symbols matched.
    fn walk(&self, target: &[u8], mut visit: impl FnMut(EdgeId, usize, usize)) -> usize {
        let Some(bound) = self.committed.checked_sub(1) else {
            return 0;
        };
        let Some(mut id) = target.first().and_then(|&c| self.child_edge(ROOT, c)) else {
            return 0;
        };
        let mut pos = self.edges[id.0].first;
        visit(id, pos, 1);
        for (tpos, &sym) in target.iter().enumerate().skip(1) {
            let edge = &self.edges[id.0];
            if pos < edge.last_within(bound) {
                pos += 1;
                if self.symbols[pos] != sym {
                    return tpos;
                }
            } else {
                match self.child_edge(edge.end, sym) {
                    Some(next) => {
                        id = next;
                        pos = self.edges[id.0].first;
                    }
                    None => return tpos,
                }
            }
            visit(id, pos, tpos + 1);
        }
        target.len()
    }

    fn locate(&self, path: &[u8]) -> Option<(EdgeId, usize)> {
        let mut found = None;
        let matched = self.walk(path, |edge, pos, _| found = Some((edge, pos)));
        if matched == path.len() {
            found
        } else {
            None
        }
    }
}

impl MatchFinder for SuffixTree<'_> {
    fn committed(&self) -> usize {
        self.committed
    }

    fn find_longest_match_after(&self, target: &[u8], min_start: usize) -> Option<Match> {
        SuffixTree::find_longest_match_after(self, target, min_start)
    }

    fn advance(&mut self, n: usize) {
        let done = self.commit(n);
        assert_eq!(done, n, "advanced past the end of the text");
    }
}

/// One committed edge as seen by [`SuffixTree::edges`].
pub struct EdgeView<'t> {
    /// Number of edges between the root and this edge's parent.
    pub depth: usize,
    pub first: usize,
    /// Last label position, clamped to the committed prefix.
    pub last: usize,
    pub label: &'t [u8],
    pub is_leaf: bool,
    edge: &'t Edge,
}

impl EdgeView<'_> {
    /// Latest end position of the substring whose first occurrence ends
    /// at label position `pos`.
    pub fn latest_occurrence(&self, pos: usize) -> usize {
        self.edge.latest_occurrence(pos)
    }
}

pub struct Edges<'t, 'a> {
    tree: &'t SuffixTree<'a>,
    stack: Vec<(EdgeId, usize)>,
}

impl Edges<'_, '_> {
    fn push_children(&mut self, node: NodeId, depth: usize) {
        let mut children: Vec<(u8, EdgeId)> = self.tree.nodes[node.0]
            .edges
            .iter()
            .map(|(&c, &id)| (c, id))
            .collect();
        // reversed so the smallest symbol is popped first
        children.sort_unstable_by(|a, b| b.0.cmp(&a.0));
        self.stack
            .extend(children.into_iter().map(|(_, id)| (id, depth)));
    }
}

impl<'t> Iterator for Edges<'t, '_> {
    type Item = EdgeView<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;
        let tree = self.tree;
        let edge = &tree.edges[id.0];
        let last = edge.last_within(tree.committed - 1);
        self.push_children(edge.end, depth + 1);
        Some(EdgeView {
            depth,
            first: edge.first,
            last,
            label: &tree.symbols[edge.first..=last],
            is_leaf: tree.nodes[edge.end.0].is_leaf(),
            edge,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn substrings(data: &[u8]) -> HashSet<&[u8]> {
        let mut set = HashSet::new();
        for i in 0..data.len() {
            for j in i + 1..=data.len() {
                set.insert(&data[i..j]);
            }
        }
        set
    }

    #[test]
    fn test_banana() {
        let text = b"banana";
        let mut tree = SuffixTree::new(text, 16);
        tree.commit_all();
        assert!(tree.is_complete());
        assert_eq!(tree.distinct_substrings(), 15);
        assert!(!tree.commit_next_symbol());
    }

    #[test]
    fn test_every_substring_of_each_prefix_is_found() {
        let text = b"abracadabra_abracadabra";
        let mut tree = SuffixTree::new(text, 32);
        for n in 1..=text.len() {
            assert!(tree.commit_next_symbol());
            let prefix = &text[..n];
            let subs = substrings(prefix);
            for sub in &subs {
                let m = tree.find_longest_match_after(sub, 0).unwrap();
                assert_eq!(m.len, sub.len());
                assert_eq!(&prefix[m.start..m.start + m.len], *sub);
            }
            assert_eq!(tree.distinct_substrings(), subs.len());
        }
    }

    #[test]
    fn test_uncommitted_symbols_are_hidden() {
        let text = b"abab";
        let mut tree = SuffixTree::new(text, 16);
        assert_eq!(tree.commit(2), 2);
        assert_eq!(
            tree.find_longest_match_after(b"aba", 0),
            Some(Match { start: 0, len: 2 })
        );
        assert_eq!(tree.find_longest_match_after(b"ba", 0).map(|m| m.len), Some(1));
        assert_eq!(tree.commit(5), 2);
        assert_eq!(
            tree.find_longest_match_after(b"aba", 0),
            Some(Match { start: 0, len: 3 })
        );
    }

    #[test]
    fn test_no_match() {
        let text = b"xyz";
        let mut tree = SuffixTree::new(text, 16);
        assert_eq!(tree.find_longest_match_after(b"x", 0), None);
        tree.commit_all();
        assert_eq!(tree.find_longest_match_after(b"q", 0), None);
        assert_eq!(tree.find_longest_match_after(b"", 0), None);
    }

    #[test]
    fn test_reports_latest_occurrence() {
        let text = b"abcXabcYabcZ";
        let mut tree = SuffixTree::new(text, 16);
        tree.commit_all();
        assert_eq!(
            tree.find_longest_match_after(b"abcQ", 0),
            Some(Match { start: 8, len: 3 })
        );
        assert_eq!(tree.find_longest_match_after(b"abc", 9), None);
        // an older, longer match is out of range but a newer prefix is not
        assert_eq!(
            tree.find_longest_match_after(b"abcX", 2),
            Some(Match { start: 8, len: 3 })
        );
        assert_eq!(tree.latest_occurrence_of(b"bc"), Some(10));
        assert_eq!(tree.latest_occurrence_of(b"Xa"), Some(4));
        assert_eq!(tree.latest_occurrence_of(b"XY"), None);
    }

    #[test]
    fn test_latest_occurrence_survives_split() {
        // "ab" sits on a single leaf edge until "abd" forces a split
        let text = b"abcabcabd";
        let mut tree = SuffixTree::new(text, 16);
        tree.commit_all();
        assert_eq!(tree.latest_occurrence_of(b"abc"), Some(5));
        assert_eq!(tree.latest_occurrence_of(b"ab"), Some(7));
        assert_eq!(tree.latest_occurrence_of(b"bca"), Some(6));
        // occurs once, so the first occurrence is also the latest
        assert_eq!(tree.latest_occurrence_of(b"abcabca"), Some(6));
        assert_eq!(tree.latest_occurrence_of(b"bd"), Some(8));
    }

    #[test]
    fn test_latest_occurrence_is_monotonic() {
        let text = b"aabaabaaabbaabab";
        let mut tree = SuffixTree::new(text, 16);
        let mut last_seen = None;
        while tree.commit_next_symbol() {
            let now = tree.latest_occurrence_of(b"ab");
            assert!(now >= last_seen);
            last_seen = now;
            tree.refresh_latest_occurrences();
            assert_eq!(tree.latest_occurrence_of(b"ab"), now);
        }
        assert_eq!(last_seen, Some(15));
    }

    #[test]
    fn test_respects_lookback() {
        let text = b"abcdabcd";
        let mut tree = SuffixTree::new(text, 2);
        tree.commit_all();
        // only suffixes up to length 2 were refreshed
        assert_eq!(tree.latest_occurrence_of(b"cd"), Some(7));
        assert_eq!(tree.latest_occurrence_of(b"bcd"), Some(3));
    }

    #[test]
    fn test_edges_walk_in_symbol_order() {
        let text = b"aab";
        let mut tree = SuffixTree::new(text, 16);
        tree.commit_all();
        let labels: Vec<(usize, &[u8])> = tree.edges().map(|e| (e.depth, e.label)).collect();
        assert_eq!(
            labels,
            vec![
                (0, &b"a"[..]),
                (1, &b"ab"[..]),
                (1, &b"b"[..]),
                (0, &b"b"[..]),
            ]
        );
        assert!(tree.edges().filter(|e| e.is_leaf).count() == 3);
    }
}
