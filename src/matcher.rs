/// A previous occurrence of some prefix of a lookup target.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Match {
    /// Text position where the occurrence starts.
    pub start: usize,
    pub len: usize,
}

/// Anything that can answer "longest earlier copy of this target" over a
/// text revealed one symbol at a time.
///
/// The encoder keeps `committed()` equal to its own cursor, so a match
/// always lies entirely before the bytes being encoded.
pub trait MatchFinder {
    /// Number of symbols revealed so far.
    fn committed(&self) -> usize;

    /// Longest prefix of `target` that occurs in the committed text
    /// starting at or after `min_start`. Reports the latest such start.
    fn find_longest_match_after(&self, target: &[u8], min_start: usize) -> Option<Match>;

    /// Reveals the next `n` symbols.
    fn advance(&mut self, n: usize);
}
