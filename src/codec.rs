//! Command stream: the encoder loop that turns match queries into
//! literal/copy commands, and the decoder that replays them.
//!
//! Each command is a flag bit followed by its payload:
//!
//! ```text
//! 0 <literal:8>
//! 1 <distance:12> <length-1:4>
//! ```
//!
//! There is no end marker; decoding stops when a command cannot be read
//! in full, which is how the byte padding at the end gets ignored.

use tracing::trace;

use crate::bitstream::{BitReader, BitWriter};
use crate::error::{Error, Result};
use crate::matcher::MatchFinder;
use crate::{DISTANCE_BITS, LENGTH_BITS, LITERAL_BITS, MAX_COPY_LEN, WINDOW_SIZE};

pub const DEFAULT_MIN_MATCH: usize = 2;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    Literal(u8),
    /// Copies `len` bytes starting `distance + 1` bytes back.
    Copy { distance: usize, len: usize },
}

impl Command {
    pub fn read(r: &mut BitReader) -> Option<Self> {
        if r.read_bit()? {
            let distance = r.read_bits(DISTANCE_BITS)? as usize;
            let len = r.read_bits(LENGTH_BITS)? as usize + 1;
            Some(Command::Copy { distance, len })
        } else {
            Some(Command::Literal(r.read_bits(LITERAL_BITS)? as u8))
        }
    }

    pub fn write(&self, w: &mut BitWriter) {
        match *self {
            Command::Literal(b) => {
                w.write_bit(false);
                w.write_bits(b as u32, LITERAL_BITS);
            }
            Command::Copy { distance, len } => {
                assert!(distance < WINDOW_SIZE, "copy distance {distance} out of window");
                assert!(
                    (1..=MAX_COPY_LEN).contains(&len),
                    "copy length {len} not encodable"
                );
                w.write_bit(true);
                w.write_bits(distance as u32, DISTANCE_BITS);
                w.write_bits((len - 1) as u32, LENGTH_BITS);
            }
        }
    }

    /// Number of output bytes this command produces.
    pub fn output_len(&self) -> usize {
        match *self {
            Command::Literal(_) => 1,
            Command::Copy { len, .. } => len,
        }
    }

    /// Appends this command's bytes to `buf`. `index` is the command's
    /// ordinal in the stream, used for error reporting.
    pub fn apply(&self, index: usize, buf: &mut Vec<u8>) -> Result<()> {
        match *self {
            Command::Literal(b) => buf.push(b),
            Command::Copy { distance, len } => {
                if distance >= buf.len() {
                    return Err(Error::CorruptBackReference {
                        command: index,
                        distance,
                        length: len,
                        available: buf.len(),
                    });
                }
                let off = buf.len() - 1 - distance;
                // may read bytes pushed by this same copy
                for i in off..off + len {
                    buf.push(buf[i]);
                }
            }
        }
        Ok(())
    }
}

/// Encoder tunables. The field widths are fixed by the format and are not
/// configurable here.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CompressOptions {
    /// Shortest match worth a copy command.
    pub min_match: usize,
}

impl Default for CompressOptions {
    fn default() -> Self {
        CompressOptions {
            min_match: DEFAULT_MIN_MATCH,
        }
    }
}

impl CompressOptions {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_COPY_LEN).contains(&self.min_match) {
            return Err(Error::InvalidOption(format!(
                "min_match must be between 1 and {MAX_COPY_LEN}, got {}",
                self.min_match
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Stats {
    pub literals: usize,
    pub copies: usize,
}

impl Stats {
    fn count(&mut self, cmd: &Command) {
        match cmd {
            Command::Literal(_) => self.literals += 1,
            Command::Copy { .. } => self.copies += 1,
        }
    }

    pub fn commands(&self) -> usize {
        self.literals + self.copies
    }
}

/// Greedily encodes `data`, asking `finder` for the longest in-window
/// match at every position and advancing it by exactly the bytes each
/// command consumes.
pub fn encode<M: MatchFinder>(
    data: &[u8],
    finder: &mut M,
    options: &CompressOptions,
    out: &mut BitWriter,
) -> Result<Stats> {
    options.validate()?;
    let mut stats = Stats::default();
    let mut pos = 0;
    while pos < data.len() {
        assert_eq!(
            finder.committed(),
            pos,
            "match finder out of step with the encoder"
        );
        let target = &data[pos..data.len().min(pos + MAX_COPY_LEN)];
        let min_start = pos.saturating_sub(WINDOW_SIZE);
        let cmd = match finder.find_longest_match_after(target, min_start) {
            Some(m) if m.len >= options.min_match => Command::Copy {
                distance: pos - m.start - 1,
                len: m.len,
            },
            _ => Command::Literal(data[pos]),
        };
        trace!(pos, ?cmd, "emit");
        cmd.write(out);
        stats.count(&cmd);
        let consumed = cmd.output_len();
        finder.advance(consumed);
        pos += consumed;
    }
    Ok(stats)
}

/// Replays every complete command in `r` onto `buf`.
pub fn decode(r: &mut BitReader, buf: &mut Vec<u8>) -> Result<Stats> {
    let mut stats = Stats::default();
    while let Some(cmd) = Command::read(r) {
        trace!(at = buf.len(), ?cmd, "replay");
        cmd.apply(stats.commands(), buf)?;
        stats.count(&cmd);
    }
    Ok(stats)
}
