//! Interactive query CLI over a corpus or a saved index image.
//!
//! One query per line; a trailing marker selects the form: `%` or `<` for
//! common-prefix search, `*` for predictive, `?` for approximate, `&` for
//! approximate predictive, none for exact. `save=PATH` dumps the index;
//! `exit`, `quit`, and `bye` terminate.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Context};
use clap::Parser;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use sftindex::index::{IndexMap, IndexSet};
use sftindex::trie::PersistError;

#[derive(Parser)]
#[command(name = "sftindex", version, about = "Trie-backed exact/prefix/predictive/approximate search")]
struct Cli {
    /// Corpus file: one key per line (or key<TAB>value with --values)
    #[arg(required_unless_present = "load")]
    corpus: Option<PathBuf>,

    /// Load a saved index image instead of building from a corpus
    #[arg(long, conflicts_with = "corpus")]
    load: Option<PathBuf>,

    /// Keys carry integer values
    #[arg(long)]
    values: bool,

    /// Edit bound for approximate queries
    #[arg(long, default_value_t = 1)]
    max_edits: usize,
}

/// Session outcome mapped to the process exit code: 1 for unreadable
/// input, 2 for format errors.
enum Failure {
    Unreadable(anyhow::Error),
    Format(anyhow::Error),
}

impl Failure {
    fn code(&self) -> ExitCode {
        match self {
            Failure::Unreadable(_) => ExitCode::from(1),
            Failure::Format(_) => ExitCode::from(2),
        }
    }

    fn error(&self) -> &anyhow::Error {
        match self {
            Failure::Unreadable(error) | Failure::Format(error) => error,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            eprintln!("{}: {:#}", "error".red().bold(), failure.error());
            failure.code()
        }
    }
}

fn run(cli: Cli) -> Result<(), Failure> {
    if cli.values {
        let index = load_map_index(&cli)?;
        eprintln!(
            "indexed {} key(s)",
            index.len().to_string().green().bold()
        );
        map_session(&index, cli.max_edits)
    } else {
        let index = load_set_index(&cli)?;
        eprintln!(
            "indexed {} key(s)",
            index.len().to_string().green().bold()
        );
        set_session(&index, cli.max_edits)
    }
}

fn read_lines(path: &PathBuf) -> Result<Vec<String>, Failure> {
    let file = File::open(path)
        .with_context(|| format!("cannot open {}", path.display()))
        .map_err(Failure::Unreadable)?;
    BufReader::new(file)
        .lines()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("cannot read {}", path.display()))
        .map_err(Failure::Unreadable)
}

fn load_set_index(cli: &Cli) -> Result<IndexSet, Failure> {
    if let Some(path) = &cli.load {
        return IndexSet::load(path)
            .with_context(|| format!("cannot load index {}", path.display()))
            .map_err(Failure::Format);
    }
    let Some(path) = cli.corpus.as_ref() else {
        return Err(Failure::Unreadable(anyhow!("no corpus given")));
    };
    let keys = read_lines(path)?;
    IndexSet::build(keys)
        .context("cannot build index")
        .map_err(Failure::Format)
}

fn load_map_index(cli: &Cli) -> Result<IndexMap<i64>, Failure> {
    if let Some(path) = &cli.load {
        return IndexMap::load(path)
            .with_context(|| format!("cannot load index {}", path.display()))
            .map_err(Failure::Format);
    }
    let Some(path) = cli.corpus.as_ref() else {
        return Err(Failure::Unreadable(anyhow!("no corpus given")));
    };
    let mut pairs = Vec::new();
    for (number, line) in read_lines(path)?.into_iter().enumerate() {
        let (key, value) = line
            .split_once('\t')
            .ok_or_else(|| anyhow!("line {}: expected key<TAB>value", number + 1))
            .map_err(Failure::Format)?;
        let value: i64 = value
            .trim()
            .parse()
            .map_err(|_| anyhow!("line {}: bad value {value:?}", number + 1))
            .map_err(Failure::Format)?;
        pairs.push((key.to_string(), value));
    }
    IndexMap::build(pairs)
        .context("cannot build index")
        .map_err(Failure::Format)
}

enum Query {
    Exact(String),
    Prefix(String),
    Predict(String),
    Approx(String),
    ApproxPredict(String),
    Save(PathBuf),
    Quit,
}

fn parse_line(line: &str) -> Query {
    let line = line.trim_end_matches(['\r', '\n']);
    if matches!(line, "exit" | "quit" | "bye") {
        return Query::Quit;
    }
    if let Some(path) = line.strip_prefix("save=") {
        return Query::Save(PathBuf::from(path));
    }
    let mut text = line.to_string();
    match text.pop() {
        Some('%') | Some('<') => Query::Prefix(text),
        Some('*') => Query::Predict(text),
        Some('?') => Query::Approx(text),
        Some('&') => Query::ApproxPredict(text),
        Some(last) => {
            text.push(last);
            Query::Exact(text)
        }
        None => Query::Exact(text),
    }
}

fn prompt(editor: &mut DefaultEditor) -> Result<Option<String>, Failure> {
    match editor.readline("> ") {
        Ok(line) => {
            let _ = editor.add_history_entry(&line);
            Ok(Some(line))
        }
        Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => Ok(None),
        Err(error) => Err(Failure::Unreadable(anyhow!("cannot read input: {error}"))),
    }
}

fn report(count: usize, query: &str) {
    if count == 0 {
        println!("{query}: {}", "not found".yellow());
    }
}

/// Report a failed dump and remember the first one; the session keeps
/// running but must terminate with exit code 2.
fn defer_save_failure(deferred: &mut Option<Failure>, path: &Path, error: PersistError) {
    eprintln!(
        "{}: cannot save {}: {error}",
        "error".red().bold(),
        path.display()
    );
    if deferred.is_none() {
        *deferred = Some(Failure::Format(anyhow!(
            "save to {} failed: {error}",
            path.display()
        )));
    }
}

fn set_session(index: &IndexSet, max_edits: usize) -> Result<(), Failure> {
    let searcher = index.searcher();
    let mut editor = DefaultEditor::new()
        .map_err(|error| Failure::Unreadable(anyhow!("cannot start prompt: {error}")))?;
    let mut deferred: Option<Failure> = None;

    while let Some(line) = prompt(&mut editor)? {
        match parse_line(&line) {
            Query::Quit => break,
            Query::Save(path) => match index.save(&path) {
                Ok(()) => println!("saved to {}", path.display().to_string().cyan()),
                Err(error) => defer_save_failure(&mut deferred, &path, error),
            },
            Query::Exact(query) => {
                if searcher.exact(&query) {
                    println!("{query}: {}", "found".green());
                } else {
                    report(0, &query);
                }
            }
            Query::Prefix(query) => {
                let mut count = 0;
                for hit in searcher.prefix(&query) {
                    count += 1;
                    println!("{count:4}: {}", hit.key);
                }
                report(count, &query);
            }
            Query::Predict(query) => {
                let mut count = 0;
                for hit in searcher.predict(&query) {
                    count += 1;
                    println!("{count:4}: {}", hit.key);
                }
                report(count, &query);
            }
            Query::Approx(query) => {
                let mut count = 0;
                for hit in searcher.approx(&query, max_edits) {
                    count += 1;
                    println!(
                        "{count:4}: {}, distance={}",
                        hit.key,
                        hit.edits.to_string().cyan()
                    );
                }
                report(count, &query);
            }
            Query::ApproxPredict(query) => {
                let mut count = 0;
                searcher.approx_predict_into(&query, max_edits, |hit| {
                    count += 1;
                    println!(
                        "{count:4}: {}, distance={}/{}",
                        hit.key,
                        hit.prefix_edits.to_string().cyan(),
                        hit.whole_edits.to_string().cyan()
                    );
                    true
                });
                report(count, &query);
            }
        }
    }
    deferred.map_or(Ok(()), Err)
}

fn map_session(index: &IndexMap<i64>, max_edits: usize) -> Result<(), Failure> {
    let searcher = index.searcher();
    let mut editor = DefaultEditor::new()
        .map_err(|error| Failure::Unreadable(anyhow!("cannot start prompt: {error}")))?;
    let mut deferred: Option<Failure> = None;

    while let Some(line) = prompt(&mut editor)? {
        match parse_line(&line) {
            Query::Quit => break,
            Query::Save(path) => match index.save(&path) {
                Ok(()) => println!("saved to {}", path.display().to_string().cyan()),
                Err(error) => defer_save_failure(&mut deferred, &path, error),
            },
            Query::Exact(query) => match index.trie().get(&query) {
                Some(value) => println!("{query}: {}", value.to_string().green()),
                None => report(0, &query),
            },
            Query::Prefix(query) => {
                let mut count = 0;
                for hit in searcher.prefix(&query) {
                    count += 1;
                    println!("{count:4}: {} = {}", hit.key, hit.value);
                }
                report(count, &query);
            }
            Query::Predict(query) => {
                let mut count = 0;
                for hit in searcher.predict(&query) {
                    count += 1;
                    println!("{count:4}: {} = {}", hit.key, hit.value);
                }
                report(count, &query);
            }
            Query::Approx(query) => {
                let mut count = 0;
                for hit in searcher.approx(&query, max_edits) {
                    count += 1;
                    println!(
                        "{count:4}: {} = {}, distance={}",
                        hit.key,
                        hit.value,
                        hit.edits.to_string().cyan()
                    );
                }
                report(count, &query);
            }
            Query::ApproxPredict(query) => {
                let mut count = 0;
                searcher.approx_predict_into(&query, max_edits, |hit| {
                    count += 1;
                    println!(
                        "{count:4}: {} = {}, distance={}/{}",
                        hit.key,
                        hit.value,
                        hit.prefix_edits.to_string().cyan(),
                        hit.whole_edits.to_string().cyan()
                    );
                    true
                });
                report(count, &query);
            }
        }
    }
    deferred.map_or(Ok(()), Err)
}
