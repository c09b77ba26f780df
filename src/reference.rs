//! Slow but obviously-correct counterparts of the suffix tree, used to
//! cross-check it.

use crate::matcher::{Match, MatchFinder};

/// Scans every candidate start in the window. Among the longest matches
/// it keeps the latest one, which is what the suffix tree reports too.
pub struct BruteForceMatcher<'a> {
    data: &'a [u8],
    committed: usize,
}

impl<'a> BruteForceMatcher<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        BruteForceMatcher { data, committed: 0 }
    }
}

impl MatchFinder for BruteForceMatcher<'_> {
    fn committed(&self) -> usize {
        self.committed
    }

    fn find_longest_match_after(&self, target: &[u8], min_start: usize) -> Option<Match> {
        let seen = &self.data[..self.committed];
        let mut best: Option<Match> = None;
        for start in (min_start..seen.len()).rev() {
            let len = seen[start..]
                .iter()
                .zip(target)
                .take_while(|(a, b)| a == b)
                .count();
            if len > 0 && best.map_or(true, |b| len > b.len) {
                best = Some(Match { start, len });
            }
        }
        best
    }

    fn advance(&mut self, n: usize) {
        assert!(
            self.committed + n <= self.data.len(),
            "advanced past the end of the text"
        );
        self.committed += n;
    }
}

// build inverse suffix array given a regular suffix array
fn inv_suffix_array(suff_arr: &[i32]) -> Vec<u32> {
    let mut out = vec![0u32; suff_arr.len()];
    for (i, v) in suff_arr.iter().enumerate() {
        out[*v as usize] = i as u32;
    }
    out
}

fn lcp_len(a: &[u8], b: &[u8]) -> u32 {
    a.iter()
        .zip(b.iter())
        .take_while(|(ca, cb)| ca == cb)
        .count() as u32
}

// build longest common prefix table.
// lcps[rank] = longest common prefix of suffixes at rank and rank-1.
// this function adapted from https://github.com/BurntSushi/suffix
// (lcp_lens_linear in src/table.rs), which is licensed under unlicense.
fn build_lcp(data: &[u8], suff: &[i32], inv_suff: &[u32]) -> Vec<u32> {
    let mut lcps = vec![0u32; data.len()];
    let mut len = 0u32;
    for (sufi2, &rank) in inv_suff.iter().enumerate() {
        if rank == 0 {
            len = 0;
            continue;
        }
        let sufi1 = suff[(rank - 1) as usize] as usize;
        len += lcp_len(
            &data[sufi1 + len as usize..],
            &data[sufi2 + len as usize..],
        );
        lcps[rank as usize] = len;
        len = len.saturating_sub(1);
    }
    lcps
}

/// Number of distinct non-empty substrings of `data`, from its suffix
/// array: every suffix contributes the prefixes it does not share with
/// its lexicographic predecessor.
pub fn distinct_substrings(data: &[u8]) -> usize {
    if data.is_empty() {
        return 0;
    }
    let suff = {
        let mut tmp = vec![0i32; data.len()];
        divsufsort::sort_in_place(data, &mut tmp);
        tmp
    };
    let inv_suff = inv_suffix_array(&suff);
    let lcp = build_lcp(data, &suff, &inv_suff);
    let n = data.len();
    n * (n + 1) / 2 - lcp.iter().map(|&l| l as usize).sum::<usize>()
}
