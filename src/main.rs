mod cli;

use std::fs;
use std::io::{self, Write};
use std::sync::mpsc::{Receiver, SyncSender, sync_channel};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use memchr::memchr;
use mimalloc::MiMalloc;
use ssr::{RenderEnvironment, RuleSheet, ServerStyleSheet, SheetHandle, StyleAttrs};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Mode};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

// Renderer may run at most this many chunks ahead of the writer.
const CHUNK_QUEUE: usize = 1;

type ChunkResult = io::Result<String>;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let page = fs::read_to_string(&cli.page)
        .with_context(|| format!("read page {}", cli.page.display()))?;
    let rules = match &cli.styles {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("read stylesheet {}", path.display()))?;
            css::split_rule_blocks(&text)
        }
        None => Vec::new(),
    };

    let mut env = RenderEnvironment::detect();
    if let Some(nonce) = cli.nonce.clone() {
        env = env.with_nonce(nonce);
    }
    let mut sheet = ServerStyleSheet::with_accumulator(RuleSheet::new(), env, StyleAttrs::from_env());

    let chunks = split_at_tags(&page, cli.chunk_bytes.max(1));
    log::info!(
        "streaming {} ({} chunks, {} rules, mode {:?})",
        cli.page.display(),
        chunks.len(),
        rules.len(),
        cli.mode
    );
    let (chunks, handle) = sheet.collect_styles(chunks)?.into_parts();
    let (tx, rx) = sync_channel::<ChunkResult>(CHUNK_QUEUE);
    let renderer = spawn_renderer(chunks, rules, handle, tx);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let streamed = match cli.mode {
        Mode::Stream => stream_mode(&mut sheet, rx, &mut out),
        Mode::Pipe => pipe_mode(&mut sheet, rx, &mut out),
    };
    renderer
        .join()
        .map_err(|_| anyhow!("renderer thread panicked"))?;
    streamed
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn stream_mode(
    sheet: &mut ServerStyleSheet<RuleSheet>,
    rx: Receiver<ChunkResult>,
    out: &mut dyn Write,
) -> Result<()> {
    let written = sheet
        .interleave_with_stream(rx)?
        .pipe_to(out)
        .context("stream interleaved page")?;
    log::info!("wrote {written} chunks");
    Ok(())
}

fn pipe_mode(
    sheet: &mut ServerStyleSheet<RuleSheet>,
    rx: Receiver<ChunkResult>,
    out: &mut dyn Write,
) -> Result<()> {
    let pipe = sheet.interleave_with_pipe(move |destination: &mut dyn Write| {
        for chunk in rx {
            destination.write_all(chunk?.as_bytes())?;
        }
        Ok(())
    })?;
    pipe(out).context("pipe interleaved page")
}

/// Plays the part of a component renderer: rules are spread evenly over the
/// chunks and each one is registered right before the chunk that needs it.
fn spawn_renderer(
    chunks: Vec<String>,
    rules: Vec<String>,
    sheet: SheetHandle<RuleSheet>,
    tx: SyncSender<ChunkResult>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut per_chunk = assign_rules(rules, chunks.len()).into_iter();
        for (idx, chunk) in chunks.into_iter().enumerate() {
            if let Some(rules) = per_chunk.next() {
                sheet.with(|s| {
                    for (name, rule) in rules {
                        s.insert_rules("sc-page", &name, [rule]);
                    }
                });
            }
            if tx.send(Ok(chunk)).is_err() {
                log::debug!("writer went away after {idx} chunks");
                return;
            }
        }
    })
}

// Rule i goes to chunk i * chunks / rules, named "r{i}".
fn assign_rules(rules: Vec<String>, chunks: usize) -> Vec<Vec<(String, String)>> {
    let mut out = vec![Vec::new(); chunks];
    if chunks == 0 {
        return out;
    }
    let count = rules.len();
    for (idx, rule) in rules.into_iter().enumerate() {
        out[idx * chunks / count].push((format!("r{idx}"), rule));
    }
    out
}

/// Cut `html` into chunks of at least `min_bytes`, each ending right before a
/// `<` so that chunks start on a tag.
fn split_at_tags(html: &str, min_bytes: usize) -> Vec<String> {
    let bytes = html.as_bytes();
    let mut chunks = Vec::new();
    let mut start = 0usize;
    while start < bytes.len() {
        let target = start + min_bytes;
        let end = if target >= bytes.len() {
            bytes.len()
        } else {
            memchr(b'<', &bytes[target..]).map_or(bytes.len(), |rel| target + rel)
        };
        chunks.push(html[start..end].to_string());
        start = end;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_start_on_tags() {
        let chunks = split_at_tags("<html><head></head><body>héllo</body></html>", 8);
        assert_eq!(
            chunks,
            ["<html><head>", "</head><body>héllo", "</body></html>"]
        );
        assert_eq!(chunks.concat(), "<html><head></head><body>héllo</body></html>");
    }

    #[test]
    fn tiny_and_empty_pages() {
        assert!(split_at_tags("", 4).is_empty());
        assert_eq!(split_at_tags("<p>", 64), ["<p>"]);
    }

    #[test]
    fn rules_are_spread_in_order() {
        let rules = (0..5).map(|i| format!("r{i}{{}}")).collect::<Vec<_>>();
        let assigned = assign_rules(rules, 2);
        let names = assigned
            .iter()
            .map(|rules| rules.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        assert_eq!(names, [vec!["r0", "r1", "r2"], vec!["r3", "r4"]]);
        assert_eq!(assign_rules(vec!["a{}".into()], 0).len(), 0);
    }
}
