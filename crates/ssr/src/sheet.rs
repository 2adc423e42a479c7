use std::io::{self, Write};

use core_types::{RenderEnvironment, StyleAttrs};
use css::{RuleSheet, SheetHandle, StyleAccumulator};

use crate::error::SheetError;
use crate::interleave::{ChunkInterleaver, ChunkText};
use crate::markup::{StyleElement, StyleMarkup};
use crate::pipe::InterleavingWriter;
use crate::seal::SealState;
use crate::stream::InterleavedStream;

/// Collects the styles of one server render and hands them to exactly one
/// consumer: a one-shot extraction (`style_tags`, `style_element`) or one of
/// the streaming adapters. Starting a stream seals the sheet for good.
pub struct ServerStyleSheet<A = RuleSheet> {
    sheet: SheetHandle<A>,
    env: RenderEnvironment,
    markup: StyleMarkup,
    seal: SealState,
}

impl ServerStyleSheet<RuleSheet> {
    /// Sheet configured from the process environment.
    pub fn new() -> Self {
        Self::with_accumulator(
            RuleSheet::new(),
            RenderEnvironment::detect(),
            StyleAttrs::from_env(),
        )
    }
}

impl Default for ServerStyleSheet<RuleSheet> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: StyleAccumulator> ServerStyleSheet<A> {
    pub fn with_accumulator(accumulator: A, env: RenderEnvironment, attrs: StyleAttrs) -> Self {
        let markup = StyleMarkup::new(attrs, &env);
        Self {
            sheet: SheetHandle::new(accumulator),
            env,
            markup,
            seal: SealState::Unsealed,
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.seal.is_sealed()
    }

    /// Attach `children` to this sheet's accumulator. Whatever renders the
    /// returned scope adds its rules through [`StyleScope::sheet`], including
    /// while a stream started later is running.
    pub fn collect_styles<T>(&self, children: T) -> Result<StyleScope<T, A>, SheetError> {
        self.seal.assert_not_sealed()?;
        Ok(StyleScope {
            children,
            sheet: self.sheet.clone(),
        })
    }

    /// Markup for every collected rule. The accumulator is left as is.
    pub fn style_tags(&self) -> Result<String, SheetError> {
        self.seal.assert_not_sealed()?;
        Ok(self.sheet.with(|acc| self.markup.emit(&*acc)))
    }

    /// Collected rules as a single element, for hosts that build their own
    /// document tree.
    pub fn style_element(&self) -> Result<Vec<StyleElement>, SheetError> {
        self.seal.assert_not_sealed()?;
        let css = self.sheet.render();
        Ok(vec![self.markup.element(css)])
    }

    pub fn seal(&mut self) {
        self.seal.seal();
    }

    /// Pull-based interleaving: every `Ok` chunk from `input` comes out with
    /// the styles added since the previous chunk, and the first `Err` is
    /// forwarded as is.
    pub fn interleave_with_stream<I, C, E>(
        &mut self,
        input: I,
    ) -> Result<InterleavedStream<I::IntoIter, A>, SheetError>
    where
        I: IntoIterator<Item = Result<C, E>>,
        C: ChunkText,
    {
        self.begin_interleaving()?;
        log::debug!(target: "ssr.stream", "interleaving pull stream");
        Ok(InterleavedStream::new(input.into_iter(), self.interleaver()))
    }

    /// Push-based interleaving: returns a pipe function with the same shape as
    /// `pipe` that substitutes an [`InterleavingWriter`] for the destination it
    /// is given. Errors travel through the pipe function's return value.
    pub fn interleave_with_pipe<P>(
        &mut self,
        pipe: P,
    ) -> Result<impl FnOnce(&mut dyn Write) -> io::Result<()> + use<A, P>, SheetError>
    where
        P: FnOnce(&mut dyn Write) -> io::Result<()>,
    {
        self.begin_interleaving()?;
        let sheet = self.sheet.clone();
        let markup = self.markup.clone();
        Ok(move |destination: &mut dyn Write| {
            log::debug!(target: "ssr.pipe", "interleaving push pipe");
            let interleaver = ChunkInterleaver::new(sheet, markup);
            let mut writer = InterleavingWriter::new(interleaver, destination);
            pipe(&mut writer)?;
            writer.finish().map(|_| ())
        })
    }

    pub(crate) fn interleaver(&self) -> ChunkInterleaver<A> {
        ChunkInterleaver::new(self.sheet.clone(), self.markup.clone())
    }

    fn begin_interleaving(&mut self) -> Result<(), SheetError> {
        self.seal.guard(&self.env)?;
        self.seal.seal();
        Ok(())
    }
}

/// Children bound to a sheet's accumulator.
pub struct StyleScope<T, A> {
    children: T,
    sheet: SheetHandle<A>,
}

impl<T, A: StyleAccumulator> StyleScope<T, A> {
    pub fn sheet(&self) -> &SheetHandle<A> {
        &self.sheet
    }

    pub fn into_parts(self) -> (T, SheetHandle<A>) {
        (self.children, self.sheet)
    }

    pub fn render<R>(self, f: impl FnOnce(T, &SheetHandle<A>) -> R) -> R {
        f(self.children, &self.sheet)
    }
}
