//! Formatting of collected CSS as `<style>` markup.

use std::fmt;

use core_types::{RenderEnvironment, StyleAttrs};
use css::StyleAccumulator;

pub const STYLE_ELEMENT_KEY: &str = "sc-0-0";

/// Formats CSS text into a self-describing `<style>` tag.
///
/// Attribute order is fixed: `nonce` (when present), the marker attribute,
/// then the version attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleMarkup {
    attrs: StyleAttrs,
    nonce: Option<String>,
}

impl StyleMarkup {
    pub fn new(attrs: StyleAttrs, env: &RenderEnvironment) -> Self {
        Self {
            attrs,
            nonce: env.nonce().map(str::to_string),
        }
    }

    /// Markup for the accumulator's current rules. Does not reset it.
    pub fn emit<A: StyleAccumulator + ?Sized>(&self, sheet: &A) -> String {
        self.format(&sheet.render())
    }

    pub fn format(&self, css: &str) -> String {
        let mut out = String::with_capacity(css.len() + 64);
        out.push_str("<style ");
        if let Some(nonce) = &self.nonce {
            push_attr(&mut out, "nonce", nonce);
            out.push(' ');
        }
        push_attr(&mut out, &self.attrs.marker, "true");
        out.push(' ');
        push_attr(&mut out, &self.attrs.version_attr, &self.attrs.version);
        out.push('>');
        out.push_str(css);
        out.push_str("</style>");
        out
    }

    pub fn element(&self, css: String) -> StyleElement {
        let mut attributes = vec![
            (self.attrs.marker.clone(), String::new()),
            (self.attrs.version_attr.clone(), self.attrs.version.clone()),
        ];
        if let Some(nonce) = &self.nonce {
            attributes.push(("nonce".to_string(), nonce.clone()));
        }
        StyleElement {
            key: STYLE_ELEMENT_KEY,
            attributes,
            css,
        }
    }
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(value);
    out.push('"');
}

/// A `<style>` element for hosts that assemble their own document tree. The
/// CSS is raw and must not be escaped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleElement {
    pub key: &'static str,
    pub attributes: Vec<(String, String)>,
    pub css: String,
}

impl StyleElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for StyleElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<style")?;
        for (name, value) in &self.attributes {
            write!(f, " {name}=\"{value}\"")?;
        }
        write!(f, ">{}</style>", self.css)
    }
}
