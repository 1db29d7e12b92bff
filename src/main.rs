use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use notefind::document::{MemoryBuffer, PlainBufferAdapter};
use notefind::logging;
use notefind::search::Position;
use notefind::{DocumentId, FindConfig, SearchDirection, SearchSession};

const USAGE: &str = "usage: notefind FILE QUERY [--config PATH] [--at LINE:COLUMN] [--next N] [--backward]";

struct CliOptions {
    file: PathBuf,
    query: String,
    config: Option<PathBuf>,
    caret: Position,
    steps: usize,
    direction: SearchDirection,
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_args(&args)?;

    let config = match options.config.clone().or_else(FindConfig::default_path) {
        Some(path) => FindConfig::load_or_default(&path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => FindConfig::default(),
    };
    logging::init(&config);

    let text = std::fs::read_to_string(&options.file)
        .with_context(|| format!("failed to read {}", options.file.display()))?;
    let mut buffer = MemoryBuffer::from_str(&text);
    buffer.set_cursor(options.caret);
    let mut doc = PlainBufferAdapter::new(DocumentId::new(1), buffer);

    let mut session = SearchSession::new(config);
    session.open(&mut doc);
    let mut counters = session.search(&mut doc, &options.query);
    print_matches(&session, counters.current);

    for _ in 0..options.steps {
        counters = session.confirm(&mut doc, options.direction);
        println!("-> {}", counters);
    }

    session.close(&mut doc);
    if let Some((from, to)) = doc.host().selection() {
        println!("selection {}-{}", from, to);
    }
    Ok(())
}

fn print_matches(session: &SearchSession<PlainBufferAdapter<MemoryBuffer>>, current: usize) {
    let spans = session.match_spans();
    for (idx, span) in spans.iter().enumerate() {
        let marker = if idx + 1 == current { '*' } else { ' ' };
        println!("{} {}-{}", marker, span.start, span.end);
    }
    println!("{}", session.counters());
}

fn parse_args(args: &[String]) -> Result<CliOptions> {
    let mut positional = Vec::new();
    let mut config = None;
    let mut caret = Position::default();
    let mut steps = 0;
    let mut direction = SearchDirection::Forward;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().context("--config needs a path")?;
                config = Some(PathBuf::from(path));
            }
            "--at" => {
                let value = iter.next().context("--at needs LINE:COLUMN")?;
                caret = parse_position(value)?;
            }
            "--next" => {
                let value = iter.next().context("--next needs a count")?;
                steps = value
                    .parse()
                    .with_context(|| format!("invalid count {:?}", value))?;
            }
            "--backward" => direction = SearchDirection::Backward,
            "-h" | "--help" => bail!(USAGE),
            _ => positional.push(arg.clone()),
        }
    }

    let [file, query] = <[String; 2]>::try_from(positional).map_err(|_| anyhow::anyhow!(USAGE))?;
    Ok(CliOptions {
        file: PathBuf::from(file),
        query,
        config,
        caret,
        steps,
        direction,
    })
}

fn parse_position(value: &str) -> Result<Position> {
    let (line, column) = value
        .split_once(':')
        .with_context(|| format!("expected LINE:COLUMN, got {:?}", value))?;
    Ok(Position::new(line.trim().parse()?, column.trim().parse()?))
}
