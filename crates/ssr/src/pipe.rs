//! Push-side adapter: a writer that interleaves every write before passing it
//! on to the real destination.

use std::io::{self, Write};

use css::StyleAccumulator;

use crate::interleave::ChunkInterleaver;

/// Wraps `destination` so that each `write` call is treated as one chunk.
pub struct InterleavingWriter<W, A> {
    interleaver: ChunkInterleaver<A>,
    destination: W,
}

impl<W: Write, A: StyleAccumulator> InterleavingWriter<W, A> {
    pub fn new(interleaver: ChunkInterleaver<A>, destination: W) -> Self {
        Self {
            interleaver,
            destination,
        }
    }

    pub fn chunks_written(&self) -> u64 {
        self.interleaver.chunks_seen()
    }

    /// Write out any dangling partial character and flush the destination.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(tail) = self.interleaver.finish() {
            self.destination.write_all(tail.as_bytes())?;
        }
        self.destination.flush()?;
        log::debug!(
            target: "ssr.pipe",
            "writer finished after {} chunks",
            self.interleaver.chunks_seen()
        );
        Ok(self.destination)
    }
}

impl<W: Write, A: StyleAccumulator> Write for InterleavingWriter<W, A> {
    /// The whole buffer is consumed. An empty buffer is not a chunk.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let out = self.interleaver.transform(buf);
        self.destination.write_all(out.as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.destination.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ServerStyleSheet;
    use core_types::{RenderEnvironment, StyleAttrs};
    use css::RuleSheet;

    const STYLE_OPEN: &str = r#"<style data-styled="true" data-styled-version="t">"#;

    fn sheet() -> ServerStyleSheet<RuleSheet> {
        ServerStyleSheet::with_accumulator(
            RuleSheet::new(),
            RenderEnvironment::server(),
            StyleAttrs::default().with_version("t"),
        )
    }

    #[test]
    fn wrapped_pipe_writes_through_interleaver() {
        let mut sheet = sheet();
        let handle = sheet.collect_styles(()).unwrap().sheet().clone();
        let render = move |destination: &mut dyn Write| -> io::Result<()> {
            handle.with(|s| s.push_rule("g", "h1{}"));
            destination.write_all(b"<html><head>")?;
            destination.write_all(b"</head><body>")?;
            handle.with(|s| s.push_rule("g", "p{}"));
            destination.write_all(b"<p>x</p></body></html>")?;
            Ok(())
        };
        let pipe = sheet.interleave_with_pipe(render).unwrap();

        let mut out = Vec::new();
        pipe(&mut out).unwrap();

        let expected = format!(
            "{STYLE_OPEN}h1{{}}</style><html><head>\
             </head>{STYLE_OPEN}</style><body>\
             {STYLE_OPEN}p{{}}</style><p>x</p></body></html>"
        );
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn destination_errors_reach_the_caller() {
        struct Closed;
        impl Write for Closed {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut sheet = sheet();
        let pipe = sheet
            .interleave_with_pipe(|destination: &mut dyn Write| destination.write_all(b"<p>"))
            .unwrap();
        let err = pipe(&mut Closed).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn writer_counts_chunks_and_skips_empty_writes() {
        let sheet = sheet();
        let mut writer = InterleavingWriter::new(sheet.interleaver(), Vec::new());
        assert_eq!(writer.write(b"").unwrap(), 0);
        writer.write_all(b"<a>").unwrap();
        writer.write_all(b"</a>").unwrap();
        assert_eq!(writer.chunks_written(), 2);
        let out = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert_eq!(out.matches("<style").count(), 2);
    }
}
