//! Terminal-agnostic text frames.
//!
//! Screens are built as lines of toned spans. The terminal front-end maps
//! tones to colors; tests and the JSON-less CLI paths read [`Frame::plain_text`].

#![allow(missing_docs)]

use crate::puzzle::symbol::{Symbol, SymbolSet};

/// Semantic style of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Muted,
    Accent,
    Success,
    Danger,
    Warning,
    /// A symbol glyph, colored by its kind.
    Shape(Symbol),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub tone: Tone,
}

impl Span {
    pub fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Tone::Plain)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    #[must_use]
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::toned(text, Tone::Plain)
    }

    pub fn toned(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            spans: vec![Span::new(text, tone)],
        }
    }

    #[must_use]
    pub fn push(mut self, span: Span) -> Self {
        self.spans.push(span);
        self
    }

    /// Append each glyph of `set` as its own shape span, space separated.
    #[must_use]
    pub fn symbols(mut self, set: &SymbolSet) -> Self {
        for (i, symbol) in set.iter().enumerate() {
            if i > 0 {
                self.spans.push(Span::plain(" "));
            }
            self.spans
                .push(Span::new(symbol.glyph().to_string(), Tone::Shape(symbol)));
        }
        self
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub lines: Vec<Line>,
}

impl Frame {
    pub fn push(&mut self, line: Line) {
        self.lines.push(line);
    }

    pub fn blank(&mut self) {
        self.lines.push(Line::blank());
    }

    /// All lines joined with `\n`, tones dropped.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(Line::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_become_shape_spans() {
        let set = SymbolSet::new([
            Symbol::Circle,
            Symbol::Square,
            Symbol::Triangle,
            Symbol::Star,
        ])
        .unwrap();
        let line = Line::plain("in: ").symbols(&set);
        assert_eq!(line.text(), "in: ● ■ ▲ ★");
        let shapes = line
            .spans
            .iter()
            .filter(|s| matches!(s.tone, Tone::Shape(_)))
            .count();
        assert_eq!(shapes, 4);
    }

    #[test]
    fn plain_text_joins_lines() {
        let mut frame = Frame::default();
        frame.push(Line::plain("a"));
        frame.blank();
        frame.push(Line::toned("b", Tone::Danger));
        assert_eq!(frame.plain_text(), "a\n\nb");
    }
}
