//! LZ-style byte compressor whose match finder is an online suffix tree.
//!
//! The input is encoded as a stream of literal and copy commands (see
//! [`codec`]). At every position the encoder asks the tree for the
//! longest earlier occurrence of the upcoming bytes whose start lies
//! within the last [`WINDOW_SIZE`] bytes, then reveals to the tree
//! exactly the bytes it just encoded.

pub mod bitstream;
pub mod codec;
pub mod dump;
pub mod error;
pub mod matcher;
pub mod reference;
pub mod suffix_tree;

use tracing::debug;

pub use bitstream::{BitReader, BitWriter};
pub use codec::{Command, CompressOptions, Stats};
pub use error::{Error, Result};
pub use matcher::{Match, MatchFinder};
pub use reference::BruteForceMatcher;
pub use suffix_tree::SuffixTree;

pub const LITERAL_BITS: u32 = 8;
pub const DISTANCE_BITS: u32 = 12;
/// The length field stores `len - 1`.
pub const LENGTH_BITS: u32 = 4;

/// How far back a copy may reach.
pub const WINDOW_SIZE: usize = 1 << DISTANCE_BITS;
pub const MAX_COPY_LEN: usize = 1 << LENGTH_BITS;

/// Compresses `data` into `buf` using the suffix-tree match finder.
pub fn compress(data: &[u8], options: &CompressOptions, buf: &mut Vec<u8>) -> Result<Stats> {
    // matches never exceed MAX_COPY_LEN, so that is all the lookback the
    // tree needs to keep latest occurrences exact
    let mut tree = SuffixTree::new(data, MAX_COPY_LEN);
    let stats = compress_with(data, &mut tree, options, buf)?;
    debug!(nodes = tree.node_count(), "suffix tree finished");
    Ok(stats)
}

/// Compresses `data` into `buf` with any match finder that starts with
/// nothing committed.
pub fn compress_with<M: MatchFinder>(
    data: &[u8],
    finder: &mut M,
    options: &CompressOptions,
    buf: &mut Vec<u8>,
) -> Result<Stats> {
    let mut w = BitWriter::new();
    let stats = codec::encode(data, finder, options, &mut w)?;
    debug!(
        input = data.len(),
        output = w.as_bytes().len(),
        literals = stats.literals,
        copies = stats.copies,
        "compressed"
    );
    buf.extend_from_slice(w.as_bytes());
    Ok(stats)
}

/// Decompresses `data`, appending the output to `buf`.
pub fn decompress(data: &[u8], buf: &mut Vec<u8>) -> Result<Stats> {
    let start = buf.len();
    let mut r = BitReader::new(data);
    let stats = codec::decode(&mut r, buf)?;
    debug!(
        input = data.len(),
        output = buf.len() - start,
        literals = stats.literals,
        copies = stats.copies,
        padding_bits = r.remaining_bits(),
        "decompressed"
    );
    Ok(stats)
}
