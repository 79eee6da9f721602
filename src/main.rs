use std::process;
use std::time::Instant;

use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

use lenfuzz::configuration::{load_config, ConfigReadError, OutputFormat, QueryMode, RunConfig};
use lenfuzz::grammar::{parse_grammar, Generator, LoadedGrammar};
use lenfuzz::log::{format_elapsed, pull_messages, write_message, QueryEvent, QueryEventKind};
use lenfuzz::sample::TokenString;
use lenfuzz::sampling::Session;

const DEFAULT_CONFIG: &str = "lenfuzz.toml";

struct Printer<'a> {
    loaded: &'a LoadedGrammar,
    format: OutputFormat,
    tokens: bool,
}

impl<'a> Printer<'a> {
    fn string(&self, s: &TokenString) -> Result<(), anyhow::Error> {
        let rendered = s.render_lossy(&self.loaded.grammar);

        match self.format {
            OutputFormat::Text if self.tokens => println!("{rendered}\t{}", s.hex()),
            OutputFormat::Text => println!("{rendered}"),
            OutputFormat::Json => println!(
                "{}",
                serde_json::to_string(&json!({ "string": rendered, "tokens": s.hex() }))?
            ),
        }
        Ok(())
    }

    fn event(&self, started: Instant, kind: QueryEventKind) -> Result<(), anyhow::Error> {
        let event = QueryEvent {
            elapsed: format_elapsed(started.elapsed()),
            kind,
        };

        match self.format {
            OutputFormat::Text => write_message(&format!("{event:?}")),
            OutputFormat::Json => println!("{}", serde_json::to_string(&event)?),
        }
        Ok(())
    }
}

fn run(config: &RunConfig, loaded: &LoadedGrammar) -> Result<(), anyhow::Error> {
    let query = &config.query;
    let start = loaded.start;
    let symbol = loaded.grammar.describe(start);

    let printer = Printer {
        loaded,
        format: config.output.format,
        tokens: config.output.tokens,
    };

    let mut rng = match query.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let started = Instant::now();
    let mut session = Session::new(&loaded.grammar);

    match query.mode {
        QueryMode::Count => {
            let last = query.max_length.unwrap_or(query.length).max(query.length);

            for (length, count) in session.length_spectrum(start, query.length..=last)? {
                if config.output.format == OutputFormat::Text {
                    println!("{length}\t{count}");
                }
                printer.event(
                    started,
                    QueryEventKind::Counted {
                        symbol: symbol.clone(),
                        length,
                        count: count.to_string(),
                    },
                )?;
            }
        }

        QueryMode::Enumerate => {
            let id = session.definition_of(start, query.length)?;
            let strings = session.all_strings(id);

            for s in &strings {
                printer.string(s)?;
            }
            printer.event(
                started,
                QueryEventKind::Enumerated {
                    symbol,
                    length: query.length,
                    strings: strings.len(),
                },
            )?;
        }

        QueryMode::Sample => {
            let samples = session
                .sample_many(start, query.length, query.samples, &mut rng)
                .with_context(|| format!("sampling {symbol} at length {}", query.length))?;

            for s in &samples {
                printer.string(s)?;
            }
            printer.event(
                started,
                QueryEventKind::Sampled {
                    symbol,
                    length: query.length,
                    samples: samples.len(),
                },
            )?;
        }

        QueryMode::Fuzz => {
            let generator = Generator::new(&loaded.grammar, query.depth_limit);

            for _ in 0..query.samples {
                let s = generator.generate(start, &mut rng)?;
                printer.string(&s)?;
            }
            printer.event(
                started,
                QueryEventKind::Fuzzed {
                    symbol,
                    samples: query.samples,
                },
            )?;
        }
    }

    Ok(())
}

fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());

    let config = match load_config(&config_path) {
        Ok(config) => config,
        Err(ConfigReadError::ReadError(e)) => {
            eprintln!("failed to read {config_path}: {e}");
            process::exit(exitcode::IOERR)
        }

        Err(ConfigReadError::ParseError(e)) => {
            eprintln!("{e}");
            process::exit(exitcode::CONFIG)
        }
    };

    let grammar_content = match std::fs::read_to_string(&config.grammar.path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("error reading grammar file: {e}");
            process::exit(exitcode::IOERR);
        }
    };

    let loaded = match parse_grammar(&grammar_content, config.grammar.start.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("errors while parsing grammar");
            eprintln!("{e:?}");
            process::exit(exitcode::CONFIG)
        }
    };

    let result = run(&config, &loaded);

    if config.output.verbose {
        for message in pull_messages(128) {
            eprintln!("{message}");
        }
    }

    if let Err(e) = result {
        eprintln!("{e:?}");
        process::exit(exitcode::DATAERR)
    }
}
