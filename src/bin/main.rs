use std::io::Write;
use std::process::ExitCode;
use std::time::Instant;

use clap::{arg, value_parser, ArgMatches, Command};
use suffix_squish::{
    compress, compress_with, decompress, dump, reference, BruteForceMatcher, CompressOptions,
    Error, Result, SuffixTree, MAX_COPY_LEN,
};
use tracing::{error, info};

fn cli() -> Command {
    let min_match = || {
        arg!(-m --"min-match" <LEN> "Shortest match worth a copy command")
            .default_value("2")
            .value_parser(value_parser!(usize))
    };
    Command::new("suffix-squish")
        .about("LZ compressor backed by an online suffix tree")
        .subcommand(
            Command::new("compress")
                .alias("c")
                .arg(arg!(<in> "input filename"))
                .arg(arg!(<out> "output (compressed) filename"))
                .arg(min_match()),
        )
        .subcommand(
            Command::new("compress-brute")
                .alias("s")
                .about("Compress using the brute-force matcher")
                .arg(arg!(<in> "input filename"))
                .arg(arg!(<out> "output (compressed) filename"))
                .arg(min_match()),
        )
        .subcommand(
            Command::new("decompress")
                .alias("d")
                .arg(arg!(<in> "input (compressed) filename"))
                .arg(arg!(<out> "output filename")),
        )
        .subcommand(
            Command::new("analyze")
                .alias("a")
                .about("List the commands in a compressed file")
                .arg(arg!(<in> "input (compressed) filename")),
        )
        .subcommand(
            Command::new("dump-tree")
                .alias("t")
                .about("Print the suffix tree of a (small) file")
                .arg(arg!(<in> "input filename")),
        )
        .subcommand(
            Command::new("verify")
                .alias("v")
                .about("Cross-check the suffix tree against reference implementations")
                .arg(arg!(<in> "input filename"))
                .arg(min_match()),
        )
        .subcommand_required(true)
}

fn options(matches: &ArgMatches) -> CompressOptions {
    CompressOptions {
        min_match: *matches.get_one::<usize>("min-match").unwrap(),
    }
}

fn paths(matches: &ArgMatches) -> (&str, &str) {
    let inp = matches.get_one::<String>("in").unwrap();
    let out = matches.get_one::<String>("out").unwrap();
    (inp.as_str(), out.as_str())
}

fn run(matches: ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("compress", matches)) => {
            let (inp, out) = paths(matches);
            let data = std::fs::read(inp)?;
            let now = Instant::now();
            let mut buf = vec![];
            let stats = compress(&data, &options(matches), &mut buf)?;
            info!(
                input = data.len(),
                output = buf.len(),
                literals = stats.literals,
                copies = stats.copies,
                elapsed = ?now.elapsed(),
                "compressed {inp}"
            );
            std::fs::write(out, buf)?;
        }
        Some(("compress-brute", matches)) => {
            let (inp, out) = paths(matches);
            let data = std::fs::read(inp)?;
            let now = Instant::now();
            let mut buf = vec![];
            let mut finder = BruteForceMatcher::new(&data);
            let stats = compress_with(&data, &mut finder, &options(matches), &mut buf)?;
            info!(
                input = data.len(),
                output = buf.len(),
                literals = stats.literals,
                copies = stats.copies,
                elapsed = ?now.elapsed(),
                "compressed {inp} (brute force)"
            );
            std::fs::write(out, buf)?;
        }
        Some(("decompress", matches)) => {
            let (inp, out) = paths(matches);
            let data = std::fs::read(inp)?;
            let now = Instant::now();
            let mut buf = vec![];
            decompress(&data, &mut buf)?;
            info!(
                input = data.len(),
                output = buf.len(),
                elapsed = ?now.elapsed(),
                "decompressed {inp}"
            );
            std::fs::write(out, buf)?;
        }
        Some(("analyze", matches)) => {
            let inp = matches.get_one::<String>("in").unwrap();
            let data = std::fs::read(inp)?;
            let mut buf = vec![];
            let stdout = std::io::stdout();
            dump::analyze(&data, &mut buf, &mut stdout.lock())?;
        }
        Some(("dump-tree", matches)) => {
            let inp = matches.get_one::<String>("in").unwrap();
            let data = std::fs::read(inp)?;
            let mut tree = SuffixTree::new(&data, MAX_COPY_LEN);
            tree.commit_all();
            let mut stdout = std::io::stdout().lock();
            dump::write_tree(&tree, &mut stdout)?;
            stdout.flush()?;
        }
        Some(("verify", matches)) => {
            let inp = matches.get_one::<String>("in").unwrap();
            let data = std::fs::read(inp)?;
            verify(&data, &options(matches))?;
            info!(input = data.len(), "verified {inp}");
        }
        _ => unreachable!(),
    }
    Ok(())
}

fn verify(data: &[u8], options: &CompressOptions) -> Result<()> {
    let mut tree = SuffixTree::new(data, MAX_COPY_LEN);
    tree.commit_all();
    let from_tree = tree.distinct_substrings();
    let from_sa = reference::distinct_substrings(data);
    if from_tree != from_sa {
        return Err(Error::Verification(format!(
            "tree has {from_tree} distinct substrings, suffix array has {from_sa}"
        )));
    }

    let mut packed = vec![];
    compress(data, options, &mut packed)?;
    let mut brute = vec![];
    compress_with(data, &mut BruteForceMatcher::new(data), options, &mut brute)?;
    if packed != brute {
        return Err(Error::Verification(format!(
            "tree-backed output ({} bytes) differs from brute-force output ({} bytes)",
            packed.len(),
            brute.len()
        )));
    }

    let mut out = vec![];
    decompress(&packed, &mut out)?;
    if out != data {
        return Err(Error::Verification("round trip mismatch".into()));
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("suffix_squish=info,main=info")),
        )
        .init();

    match run(cli().get_matches()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
