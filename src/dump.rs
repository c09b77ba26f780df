//! Human-readable listings of a suffix tree and of a command stream.

use std::io::Write;

use crate::bitstream::BitReader;
use crate::codec::Command;
use crate::error::Result;
use crate::suffix_tree::SuffixTree;

/// One line per committed edge, indented by depth:
/// `first-last 'label' sym,latest sym,latest ...`
pub fn write_tree(tree: &SuffixTree, out: &mut impl Write) -> std::io::Result<()> {
    for edge in tree.edges() {
        write!(
            out,
            "{} {:indent$}{}-{} '{}' ",
            edge.depth,
            "",
            edge.first,
            edge.last,
            edge.label.escape_ascii(),
            indent = edge.depth
        )?;
        for (pos, sym) in (edge.first..).zip(edge.label) {
            write!(
                out,
                "{},{} ",
                std::ascii::escape_default(*sym),
                edge.latest_occurrence(pos)
            )?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Decodes `data` like [`crate::decompress`], printing every command
/// with the output position it starts at.
pub fn analyze(data: &[u8], buf: &mut Vec<u8>, out: &mut impl Write) -> Result<()> {
    let mut r = BitReader::new(data);
    let mut index = 0;
    while let Some(cmd) = Command::read(&mut r) {
        writeln!(out, "{index:>8} @{:<8} {cmd:?}", buf.len())?;
        cmd.apply(index, buf)?;
        index += 1;
    }
    writeln!(
        out,
        "{index} commands, {} bytes out, {} padding bits",
        buf.len(),
        r.remaining_bits()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_tree() {
        let mut tree = SuffixTree::new(b"aab", 16);
        tree.commit_all();
        let mut out = vec![];
        write_tree(&tree, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "0 0-0 'a' a,1 ");
        assert_eq!(lines[1], "1  1-2 'ab' a,1 b,2 ");
    }

    #[test]
    fn test_analyze_lists_commands() {
        let mut packed = vec![];
        crate::compress(b"abababab", &Default::default(), &mut packed).unwrap();
        let mut buf = vec![];
        let mut out = vec![];
        analyze(&packed, &mut buf, &mut out).unwrap();
        assert_eq!(buf, b"abababab");
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Literal(97)"));
        // copy sources never reach into the bytes being encoded
        assert!(text.contains("Copy { distance: 1, len: 2 }"));
        assert!(text.contains("Copy { distance: 3, len: 4 }"));
        assert!(text.contains("4 commands, 8 bytes out"));
    }
}
