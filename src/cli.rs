use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Pull chunks from the renderer and pipe the interleaved stream out.
    Stream,
    /// Hand the renderer a writer that interleaves each write.
    Pipe,
}

#[derive(Debug, Parser, Clone)]
#[command(name = "sheetstream")]
#[command(about = "Stream an HTML page with its styles interleaved between chunks")]
pub struct Cli {
    /// HTML page to stream.
    pub page: PathBuf,

    /// Stylesheet whose rules are collected while the page renders.
    pub styles: Option<PathBuf>,

    /// Minimum chunk size; chunks are cut at the next tag start.
    #[arg(long, env = "SHEETSTREAM_CHUNK_BYTES", default_value_t = 256)]
    pub chunk_bytes: usize,

    /// CSP nonce stamped on every style tag.
    #[arg(long, env = "SHEETSTREAM_NONCE")]
    pub nonce: Option<String>,

    #[arg(long, value_enum, default_value_t = Mode::Stream)]
    pub mode: Mode,
}
