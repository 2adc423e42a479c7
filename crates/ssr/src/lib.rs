//! Streams server-rendered HTML while injecting the styles collected for it.
//!
//! A [`ServerStyleSheet`] owns the accumulator for one render. Once a stream
//! adapter starts, each HTML chunk is sent on with a `<style>` tag holding the
//! rules added since the previous chunk, so the document never has to be
//! buffered in full.

mod error;
mod interleave;
mod markup;
mod pipe;
mod seal;
mod sheet;
mod stream;

pub use crate::error::SheetError;
pub use crate::interleave::{ChunkInterleaver, ChunkText, leading_closing_tag_end, splice_style};
pub use crate::markup::{STYLE_ELEMENT_KEY, StyleElement, StyleMarkup};
pub use crate::pipe::InterleavingWriter;
pub use crate::seal::SealState;
pub use crate::sheet::{ServerStyleSheet, StyleScope};
pub use crate::stream::{InterleavedStream, StreamPipeError};

pub use core_types::{RenderEnvironment, StyleAttrs};
pub use css::{RuleSheet, SheetHandle, StyleAccumulator};
