use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use slog::{o, Drain, Level, Logger};
use toaq_semantics::{first_interpretation, parse_tree, Lexicon, MemoryLexicon, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// the sentence's logical form, one line per sentence
    Text,
    /// the whole annotated tree
    Json,
}

/// Compose typed logical forms for parsed Toaq sentences
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// JSON lexicon to use instead of the builtin one
    #[clap(short, long)]
    lexicon: Option<PathBuf>,

    #[clap(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// log every composition step to stderr
    #[clap(short, long)]
    verbose: bool,

    /// candidate parses of one sentence in bracket notation; read from stdin,
    /// one sentence per line, when absent
    trees: Vec<String>,
}

fn logger(verbose: bool) -> Logger {
    let level = if verbose { Level::Debug } else { Level::Warning };
    let plain = slog_term::PlainSyncDecorator::new(std::io::stderr());
    let drain = slog_term::FullFormat::new(plain)
        .build()
        .filter_level(level)
        .fuse();
    Logger::root(drain, o!())
}

fn read_candidates(sources: &[String], lexicon: &dyn Lexicon) -> Result<Vec<Tree>> {
    sources
        .iter()
        .map(|source| {
            parse_tree(source, lexicon).map_err(|e| {
                anyhow::anyhow!("{:?}", miette::Report::new(e))
            })
        })
        .collect()
}

fn run(sentence: &[String], lexicon: &dyn Lexicon, format: Format, logger: &Logger) -> Result<()> {
    let candidates = read_candidates(sentence, lexicon)?;
    let dtree = first_interpretation(candidates, logger)
        .map_err(|e| anyhow::anyhow!("{:?}", miette::Report::new(e)))?;
    match format {
        Format::Text => match dtree.expr() {
            Some(e) => println!("{}", e),
            None => println!("{}", dtree),
        },
        Format::Json => println!("{}", serde_json::to_string_pretty(&dtree.to_json())?),
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let logger = logger(args.verbose);

    let lexicon = match &args.lexicon {
        Some(path) => MemoryLexicon::load(path)
            .with_context(|| format!("loading lexicon {}", path.display()))?,
        None => MemoryLexicon::builtin()?,
    };

    if !args.trees.is_empty() {
        return run(&args.trees, &lexicon, args.format, &logger);
    }

    let mut failed = false;
    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if let Err(e) = run(&[line], &lexicon, args.format, &logger) {
            eprintln!("{}", e);
            failed = true;
        }
    }
    if failed {
        std::process::exit(1);
    }
    Ok(())
}
