//! Pull-side adapter: an upstream sequence of chunk results in, interleaved
//! chunks out.

use std::fmt;
use std::io::{self, Write};
use std::iter::FusedIterator;

use css::StyleAccumulator;

use crate::interleave::{ChunkInterleaver, ChunkText};

/// Interleaved view over an upstream chunk source.
///
/// Every upstream chunk yields exactly one output chunk, in order. The one
/// exception is byte input whose last chunk ends inside a UTF-8 sequence: the
/// leftover bytes come out as a final extra chunk holding only `U+FFFD`, with
/// no style tag, so N chunks in give N + 1 out.
///
/// Upstream `Err` values are forwarded unchanged on the same channel as the
/// transformed chunks, after which the stream is finished. One upstream item
/// is pulled per call to `next`, so a slow consumer stalls the producer.
pub struct InterleavedStream<I, A> {
    upstream: I,
    interleaver: ChunkInterleaver<A>,
    done: bool,
}

impl<I, A> InterleavedStream<I, A> {
    pub(crate) fn new(upstream: I, interleaver: ChunkInterleaver<A>) -> Self {
        Self {
            upstream,
            interleaver,
            done: false,
        }
    }
}

impl<I, C, E, A> InterleavedStream<I, A>
where
    I: Iterator<Item = Result<C, E>>,
    C: ChunkText,
    A: StyleAccumulator,
{
    /// Drain the stream into `destination`, returning the number of chunks
    /// written.
    pub fn pipe_to<W: Write>(self, mut destination: W) -> Result<u64, StreamPipeError<E>> {
        let mut written = 0u64;
        for chunk in self {
            let chunk = chunk.map_err(StreamPipeError::Upstream)?;
            destination
                .write_all(chunk.as_bytes())
                .map_err(StreamPipeError::Io)?;
            written += 1;
        }
        destination.flush().map_err(StreamPipeError::Io)?;
        log::debug!(target: "ssr.stream", "piped {written} chunks");
        Ok(written)
    }
}

impl<I, C, E, A> Iterator for InterleavedStream<I, A>
where
    I: Iterator<Item = Result<C, E>>,
    C: ChunkText,
    A: StyleAccumulator,
{
    type Item = Result<String, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.upstream.next() {
            Some(Ok(chunk)) => Some(Ok(self.interleaver.transform(&chunk))),
            Some(Err(err)) => {
                self.done = true;
                log::debug!(
                    target: "ssr.stream",
                    "forwarding upstream error after {} chunks",
                    self.interleaver.chunks_seen()
                );
                Some(Err(err))
            }
            None => {
                self.done = true;
                self.interleaver.finish().map(Ok)
            }
        }
    }
}

impl<I, C, E, A> FusedIterator for InterleavedStream<I, A>
where
    I: Iterator<Item = Result<C, E>>,
    C: ChunkText,
    A: StyleAccumulator,
{
}

/// Failure while piping an [`InterleavedStream`] to a writer.
#[derive(Debug)]
pub enum StreamPipeError<E> {
    Upstream(E),
    Io(io::Error),
}

impl<E: fmt::Display> fmt::Display for StreamPipeError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamPipeError::Upstream(err) => write!(f, "upstream error: {err}"),
            StreamPipeError::Io(err) => write!(f, "write error: {err}"),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for StreamPipeError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StreamPipeError::Upstream(err) => Some(err),
            StreamPipeError::Io(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ServerStyleSheet;
    use core_types::{RenderEnvironment, StyleAttrs};
    use css::RuleSheet;
    use std::sync::mpsc;
    use std::thread;

    fn sheet() -> ServerStyleSheet<RuleSheet> {
        ServerStyleSheet::with_accumulator(
            RuleSheet::new(),
            RenderEnvironment::server(),
            StyleAttrs::default().with_version("t"),
        )
    }

    #[derive(Debug, PartialEq)]
    struct Boom;

    #[test]
    fn one_chunk_then_error_yields_chunk_then_same_error() {
        let mut sheet = sheet();
        let upstream: Vec<Result<&str, Boom>> = vec![Ok("<p>a</p>"), Err(Boom), Ok("<p>b</p>")];
        let mut stream = sheet.interleave_with_stream(upstream).unwrap();

        let first = stream.next().unwrap().unwrap();
        assert!(first.ends_with("<p>a</p>"));
        assert_eq!(stream.next(), Some(Err(Boom)));
        assert_eq!(stream.next(), None);
        assert_eq!(stream.next(), None);
    }

    #[test]
    fn chunk_count_and_order_are_preserved() {
        let mut sheet = sheet();
        let input = ["<a>", "</a>", "<b>", "x", ""];
        let upstream = input.iter().map(|c| Ok::<_, Boom>(*c));
        let out: Vec<String> = sheet
            .interleave_with_stream(upstream)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(out.len(), input.len());
        for (got, chunk) in out.iter().zip(input) {
            assert!(got.contains(chunk));
        }
        assert!(out[1].starts_with("</a><style"));
    }

    #[test]
    fn dangling_utf8_tail_is_the_only_extra_chunk() {
        let mut sheet = sheet();
        let upstream = vec![Ok::<_, Boom>(b"<p>".to_vec()), Ok(vec![b'a', 0xE2])];
        let out: Vec<String> = sheet
            .interleave_with_stream(upstream)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(out.len(), 3);
        assert!(out[0].ends_with("</style><p>"));
        assert!(out[1].ends_with("</style>a"));
        assert_eq!(out[2], "\u{FFFD}");
    }

    #[test]
    fn renderer_thread_feeds_stream_over_channel() {
        let mut sheet = sheet();
        let scope = sheet.collect_styles(()).unwrap();
        let handle = scope.sheet().clone();
        let (tx, rx) = mpsc::sync_channel::<Result<String, Boom>>(0);
        let stream = sheet.interleave_with_stream(rx).unwrap();

        let renderer = thread::spawn(move || {
            for i in 0..4 {
                handle.with(|s| {
                    s.insert_rules("sc-item", &format!("i{i}"), [format!(".i{i}{{}}")]);
                });
                tx.send(Ok(format!("<li>{i}</li>"))).unwrap();
            }
        });

        let out: Vec<String> = stream.collect::<Result<_, _>>().unwrap();
        renderer.join().unwrap();

        assert_eq!(out.len(), 4);
        let joined = out.concat();
        for i in 0..4 {
            assert_eq!(joined.matches(&format!(".i{i}{{}}")).count(), 1);
            assert!(joined.contains(&format!("<li>{i}</li>")));
        }
    }

    #[test]
    fn pipe_to_writes_every_chunk() {
        let mut sheet = sheet();
        sheet
            .collect_styles(())
            .unwrap()
            .sheet()
            .with(|s| s.push_rule("g", "a{}"));
        let upstream = vec![Ok::<_, Boom>("<a>"), Ok("</a>")];
        let mut out = Vec::new();
        let written = sheet
            .interleave_with_stream(upstream)
            .unwrap()
            .pipe_to(&mut out)
            .unwrap();
        assert_eq!(written, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            concat!(
                r#"<style data-styled="true" data-styled-version="t">a{}</style><a>"#,
                r#"</a><style data-styled="true" data-styled-version="t"></style>"#
            )
        );
    }

    #[test]
    fn pipe_to_stops_on_upstream_error() {
        let mut sheet = sheet();
        let upstream = vec![Ok("<a>"), Err(Boom)];
        let mut out = Vec::new();
        let err = sheet
            .interleave_with_stream(upstream)
            .unwrap()
            .pipe_to(&mut out)
            .unwrap_err();
        assert!(matches!(err, StreamPipeError::Upstream(Boom)));
        assert!(!out.is_empty());
    }
}
