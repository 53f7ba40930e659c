//! Markup handling for cell text.
//!
//! Table cells carry inline bracket markup such as `[bold red]Hello[/]`.
//! The layout engine never styles anything itself; it only needs to know
//! what is visible (to measure and wrap) and where each marker sits (to put
//! the markers back after wrapping). Those capabilities are the
//! [`Decorator`] trait. [`Markup`] implements it for the bracket dialect and
//! [`PlainText`] for text that carries no markup at all.
//!
//! Turning markup into terminal escape codes is the output sink's job; see
//! [`to_ansi`].

use std::fmt;
use std::sync::LazyLock;

use crossterm::style::{Attribute, Color, ContentStyle};
use regex::Regex;
use smallvec::SmallVec;

use crate::cells;

/// Error type for markup parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupError {
    /// Closing tag with nothing to close.
    UnmatchedClosingTag(Option<String>),
}

impl fmt::Display for MarkupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmatchedClosingTag(None) => {
                write!(f, "closing tag '[/]' has nothing to close")
            }
            Self::UnmatchedClosingTag(Some(tag)) => {
                write!(f, "closing tag '[/{tag}]' doesn't match any open tag")
            }
        }
    }
}

impl std::error::Error for MarkupError {}

/// One decorated region of a text.
///
/// `start` and `end` are offsets in visible characters of the stripped text
/// (line breaks included), `end` exclusive. `open` and `close` are the
/// literal markers that recreate the region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupSpan {
    /// Marker that opens the region, e.g. `[bold]`.
    pub open: String,
    /// Marker that closes the region, e.g. `[/bold]`.
    pub close: String,
    /// First visible character covered.
    pub start: usize,
    /// One past the last visible character covered.
    pub end: usize,
}

/// The decoration capabilities consumed by the table renderer.
///
/// An output sink owns one decorator; the renderer measures, wraps and
/// escapes with the decorator of the sink it writes to.
pub trait Decorator: fmt::Debug + Send + Sync {
    /// Remove all markup and return the visible text with its cell width.
    fn strip_and_measure(&self, text: &str) -> (String, usize);

    /// Decorated regions of `text`, in visible-character coordinates.
    fn markup_spans(&self, text: &str) -> Vec<MarkupSpan>;

    /// Make visible text safe to embed in markup.
    fn escape(&self, text: &str) -> String;

    /// Like [`Decorator::escape`], for text that is immediately followed by
    /// a marker.
    fn escape_before_marker(&self, text: &str) -> String {
        self.escape(text)
    }

    /// Visible text only.
    fn strip(&self, text: &str) -> String {
        self.strip_and_measure(text).0
    }

    /// Cell width of the visible text.
    fn measure(&self, text: &str) -> usize {
        self.strip_and_measure(text).1
    }

    /// `text` as written to a styling terminal.
    fn decorate(&self, text: &str) -> String {
        self.strip(text)
    }
}

/// Decorator for the `[style]text[/style]` bracket dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct Markup;

/// Decorator for text without markup: everything is visible.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainText;

impl Decorator for PlainText {
    fn strip_and_measure(&self, text: &str) -> (String, usize) {
        (text.to_string(), cells::cell_len(text))
    }

    fn markup_spans(&self, _text: &str) -> Vec<MarkupSpan> {
        Vec::new()
    }

    fn escape(&self, text: &str) -> String {
        text.to_string()
    }
}

impl Decorator for Markup {
    fn strip_and_measure(&self, text: &str) -> (String, usize) {
        let plain = parse_or_plain(text).plain;
        let width = cells::cell_len(&plain);
        (plain, width)
    }

    fn markup_spans(&self, text: &str) -> Vec<MarkupSpan> {
        parse_or_plain(text).spans
    }

    fn escape(&self, text: &str) -> String {
        escape(text)
    }

    fn escape_before_marker(&self, text: &str) -> String {
        let escaped = escape(text);
        let trailing = escaped.len() - escaped.trim_end_matches('\\').len();
        if trailing == 0 {
            escaped
        } else {
            format!("{escaped}{}", "\\".repeat(trailing))
        }
    }

    fn decorate(&self, text: &str) -> String {
        to_ansi(text)
    }
}

/// A parsed tag from markup.
#[derive(Debug, Clone)]
struct Tag {
    name: String,
    parameters: Option<String>,
}

impl Tag {
    fn is_closing(&self) -> bool {
        self.name.starts_with('/')
    }

    fn base_name(&self) -> &str {
        self.name.strip_prefix('/').unwrap_or(&self.name)
    }

    fn open_marker(&self) -> String {
        match &self.parameters {
            Some(param) => format!("[{}={param}]", self.name),
            None => format!("[{}]", self.name),
        }
    }

    fn close_marker(&self) -> String {
        format!("[/{}]", self.name)
    }
}

/// Plain text plus decorated regions, the result of [`parse`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedMarkup {
    /// Visible text.
    pub plain: String,
    /// Regions sorted by start, outer regions first.
    pub spans: Vec<MarkupSpan>,
}

// Optional backslashes, then [tag_content].
static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\\*)\[([a-z#/@][^\[\]]*?)\]").expect("invalid regex"));

enum Element {
    Text(String),
    Tag(Tag),
}

fn parse_elements(markup: &str) -> Vec<Element> {
    let mut elements = Vec::new();
    let mut last_end = 0;

    for cap in TAG_PATTERN.captures_iter(markup) {
        let Some(full_match) = cap.get(0) else {
            continue;
        };
        let backslashes = cap.get(1).map_or("", |m| m.as_str());
        let tag_content = cap.get(2).map_or("", |m| m.as_str());
        let match_start = full_match.start();

        if match_start > last_end {
            elements.push(Element::Text(markup[last_end..match_start].to_string()));
        }

        let literal_backslashes = backslashes.len() / 2;
        if literal_backslashes > 0 {
            elements.push(Element::Text("\\".repeat(literal_backslashes)));
        }

        if backslashes.len() % 2 == 1 {
            elements.push(Element::Text(format!("[{tag_content}]")));
        } else {
            elements.push(Element::Tag(parse_tag(tag_content)));
        }

        last_end = full_match.end();
    }

    if last_end < markup.len() {
        elements.push(Element::Text(markup[last_end..].to_string()));
    }

    elements
}

fn parse_tag(content: &str) -> Tag {
    let trimmed = content.trim();
    if let Some((name, param)) = trimmed.split_once('=') {
        return Tag {
            name: name.trim().to_string(),
            parameters: Some(param.trim().to_string()),
        };
    }
    Tag {
        name: trimmed.to_string(),
        parameters: None,
    }
}

fn pop_matching(stack: &mut SmallVec<[(usize, Tag); 8]>, name: &str) -> Option<(usize, Tag)> {
    let search_name = name.to_lowercase();
    for i in (0..stack.len()).rev() {
        let tag_name = stack[i].1.name.to_lowercase();
        let first_word = tag_name.split_whitespace().next().unwrap_or(&tag_name);
        if first_word == search_name || tag_name == search_name {
            return Some(stack.remove(i));
        }
    }
    None
}

/// Parse markup into visible text and decorated regions.
///
/// Unclosed tags are closed at the end of the text.
///
/// # Errors
///
/// Returns [`MarkupError::UnmatchedClosingTag`] for a closing tag that has
/// no open counterpart.
pub fn parse(markup: &str) -> Result<ParsedMarkup, MarkupError> {
    if !markup.contains('[') {
        return Ok(ParsedMarkup {
            plain: markup.to_string(),
            spans: Vec::new(),
        });
    }

    let mut plain = String::new();
    let mut position = 0usize;
    let mut spans = Vec::new();
    let mut stack: SmallVec<[(usize, Tag); 8]> = SmallVec::new();

    for element in parse_elements(markup) {
        match element {
            Element::Text(text) => {
                let unescaped = unescape_text(&text);
                position += unescaped.chars().count();
                plain.push_str(&unescaped);
            }
            Element::Tag(tag) if tag.is_closing() => {
                let name = tag.base_name().trim();
                let (start, open) = if name.is_empty() {
                    stack.pop().ok_or(MarkupError::UnmatchedClosingTag(None))?
                } else {
                    pop_matching(&mut stack, name)
                        .ok_or_else(|| MarkupError::UnmatchedClosingTag(Some(name.to_string())))?
                };
                push_span(&mut spans, &open, start, position);
            }
            Element::Tag(tag) => stack.push((position, tag)),
        }
    }

    while let Some((start, open)) = stack.pop() {
        push_span(&mut spans, &open, start, position);
    }

    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
    Ok(ParsedMarkup { plain, spans })
}

/// Undo [`escape`] in text that holds no tags: in a backslash run in front
/// of `[`, every pair is one literal backslash and an odd one escapes the
/// bracket. Other backslashes are kept as they are.
fn unescape_text(text: &str) -> String {
    if !text.contains('\\') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut run = 0usize;
    for c in text.chars() {
        match c {
            '\\' => run += 1,
            '[' => {
                out.push_str(&"\\".repeat(run / 2));
                run = 0;
                out.push('[');
            }
            _ => {
                out.push_str(&"\\".repeat(run));
                run = 0;
                out.push(c);
            }
        }
    }
    out.push_str(&"\\".repeat(run));
    out
}

fn push_span(spans: &mut Vec<MarkupSpan>, tag: &Tag, start: usize, end: usize) {
    if start < end {
        spans.push(MarkupSpan {
            open: tag.open_marker(),
            close: tag.close_marker(),
            start,
            end,
        });
    }
}

/// Parse markup, treating malformed markup as plain text.
#[must_use]
pub fn parse_or_plain(markup: &str) -> ParsedMarkup {
    parse(markup).unwrap_or_else(|_| ParsedMarkup {
        plain: markup.to_string(),
        spans: Vec::new(),
    })
}

/// Escape text for use in markup.
///
/// Every `[` becomes `\[`; backslashes directly in front of a bracket are
/// doubled so they stay literal.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_backslashes = 0usize;
    for c in text.chars() {
        match c {
            '\\' => pending_backslashes += 1,
            '[' => {
                out.push_str(&"\\".repeat(pending_backslashes * 2));
                pending_backslashes = 0;
                out.push_str("\\[");
            }
            _ => {
                out.push_str(&"\\".repeat(pending_backslashes));
                pending_backslashes = 0;
                out.push(c);
            }
        }
    }
    out.push_str(&"\\".repeat(pending_backslashes));
    out
}

/// Split `value` into physical lines, optionally hard-wrapping each line at
/// `width` cells, and re-attach its markup to every line.
///
/// Every returned line is self-contained: regions crossing a line boundary
/// are closed at the end of one line and reopened at the start of the next.
/// Markers never count towards `width`, and stripping the joined result
/// gives exactly the wrapped visible text.
#[must_use]
pub fn reflow<D: Decorator + ?Sized>(decorator: &D, value: &str, width: Option<usize>) -> Vec<String> {
    let plain = decorator.strip(value);
    let spans = decorator.markup_spans(value);
    let chars: Vec<char> = plain.chars().collect();

    line_ranges(&plain, width)
        .into_iter()
        .map(|(start, end)| decorate_range(decorator, &chars, &spans, start, end))
        .collect()
}

/// Visible-character ranges of the physical lines of `plain`.
fn line_ranges(plain: &str, width: Option<usize>) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut offset = 0usize;

    for line in plain.split('\n') {
        let count = line.chars().count();
        match width {
            Some(width) if cells::cell_len(line) > width => {
                let mut rest = line;
                let mut pos = offset;
                while !rest.is_empty() {
                    let (piece, remainder) = cells::chop_cells(rest, width.max(1));
                    let piece_len = piece.chars().count();
                    ranges.push((pos, pos + piece_len));
                    pos += piece_len;
                    rest = remainder;
                }
            }
            _ => ranges.push((offset, offset + count)),
        }
        // Skip the line break itself.
        offset += count + 1;
    }

    ranges
}

fn decorate_range<D: Decorator + ?Sized>(
    decorator: &D,
    chars: &[char],
    spans: &[MarkupSpan],
    start: usize,
    end: usize,
) -> String {
    let mut out = String::new();
    let mut chunk = String::new();
    let mut open: Vec<&MarkupSpan> = Vec::new();

    for span in spans.iter().filter(|s| s.start < start && s.end > start) {
        out.push_str(&span.open);
        open.push(span);
    }

    for (pos, &c) in chars.iter().enumerate().take(end).skip(start) {
        close_ending_at(decorator, &mut out, &mut chunk, &mut open, pos);
        for span in spans.iter().filter(|s| s.start == pos && s.end > pos) {
            flush(decorator, &mut out, &mut chunk, true);
            out.push_str(&span.open);
            open.push(span);
        }
        chunk.push(c);
    }

    close_ending_at(decorator, &mut out, &mut chunk, &mut open, end);
    if open.is_empty() {
        flush(decorator, &mut out, &mut chunk, false);
    } else {
        flush(decorator, &mut out, &mut chunk, true);
        while let Some(span) = open.pop() {
            out.push_str(&span.close);
        }
    }

    out
}

fn close_ending_at<D: Decorator + ?Sized>(
    decorator: &D,
    out: &mut String,
    chunk: &mut String,
    open: &mut Vec<&MarkupSpan>,
    pos: usize,
) {
    if !open.iter().any(|s| s.end == pos) {
        return;
    }
    flush(decorator, out, chunk, true);
    let mut index = open.len();
    while index > 0 {
        index -= 1;
        if open[index].end == pos {
            out.push_str(&open[index].close);
            open.remove(index);
        }
    }
}

fn flush<D: Decorator + ?Sized>(decorator: &D, out: &mut String, chunk: &mut String, before_marker: bool) {
    if chunk.is_empty() {
        return;
    }
    if before_marker {
        out.push_str(&decorator.escape_before_marker(chunk));
    } else {
        out.push_str(&decorator.escape(chunk));
    }
    chunk.clear();
}

/// Render one line of markup to text with ANSI SGR sequences.
///
/// Malformed markup is emitted as plain text.
#[must_use]
pub fn to_ansi(markup: &str) -> String {
    let parsed = parse_or_plain(markup);
    if parsed.spans.is_empty() {
        return parsed.plain;
    }

    let chars: Vec<char> = parsed.plain.chars().collect();
    let mut boundaries: Vec<usize> = parsed
        .spans
        .iter()
        .flat_map(|s| [s.start, s.end])
        .chain([0, chars.len()])
        .collect();
    boundaries.sort_unstable();
    boundaries.dedup();

    let mut out = String::new();
    for pair in boundaries.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        let text: String = chars[start..end].iter().collect();
        let active: Vec<&MarkupSpan> = parsed
            .spans
            .iter()
            .filter(|s| s.start <= start && s.end >= end)
            .collect();
        if active.is_empty() {
            out.push_str(&text);
            continue;
        }
        let mut style = ContentStyle::new();
        for span in active {
            apply_tag(&mut style, &span.open);
        }
        out.push_str(&style.apply(text).to_string());
    }
    out
}

/// Merge the style named by an opening marker into `style`.
fn apply_tag(style: &mut ContentStyle, open_marker: &str) {
    let name = open_marker.trim_start_matches('[').trim_end_matches(']');
    let mut words = name.split_whitespace();
    while let Some(word) = words.next() {
        let word = word.to_lowercase();
        if word == "on" {
            if let Some(color) = words.next().and_then(parse_color) {
                style.background_color = Some(color);
            }
            continue;
        }
        if let Some(attr) = parse_attribute(&word) {
            style.attributes.set(attr);
        } else if let Some(color) = parse_color(&word) {
            style.foreground_color = Some(color);
        }
    }
}

fn parse_attribute(word: &str) -> Option<Attribute> {
    match word {
        "bold" | "b" => Some(Attribute::Bold),
        "dim" | "d" => Some(Attribute::Dim),
        "italic" | "i" => Some(Attribute::Italic),
        "underline" | "u" => Some(Attribute::Underlined),
        "blink" => Some(Attribute::SlowBlink),
        "reverse" | "r" => Some(Attribute::Reverse),
        "conceal" => Some(Attribute::Hidden),
        "strike" | "s" => Some(Attribute::CrossedOut),
        _ => None,
    }
}

fn parse_color(word: &str) -> Option<Color> {
    let word = word.to_lowercase();
    let color = match word.as_str() {
        "default" => Color::Reset,
        "black" => Color::Black,
        "red" => Color::DarkRed,
        "green" => Color::DarkGreen,
        "yellow" => Color::DarkYellow,
        "blue" => Color::DarkBlue,
        "magenta" => Color::DarkMagenta,
        "cyan" => Color::DarkCyan,
        "white" => Color::Grey,
        "bright_black" => Color::DarkGrey,
        "bright_red" => Color::Red,
        "bright_green" => Color::Green,
        "bright_yellow" => Color::Yellow,
        "bright_blue" => Color::Blue,
        "bright_magenta" => Color::Magenta,
        "bright_cyan" => Color::Cyan,
        "bright_white" => Color::White,
        hex if hex.len() == 7 && hex.starts_with('#') => {
            let r = u8::from_str_radix(&hex[1..3], 16).ok()?;
            let g = u8::from_str_radix(&hex[3..5], 16).ok()?;
            let b = u8::from_str_radix(&hex[5..7], 16).ok()?;
            Color::Rgb { r, g, b }
        }
        other => {
            let number = other.strip_prefix("color(")?.strip_suffix(')')?;
            Color::AnsiValue(number.parse().ok()?)
        }
    };
    Some(color)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans_of(text: &str) -> Vec<(usize, usize)> {
        parse(text).unwrap().spans.iter().map(|s| (s.start, s.end)).collect()
    }

    #[test]
    fn test_parse_plain() {
        let parsed = parse("hello world").unwrap();
        assert_eq!(parsed.plain, "hello world");
        assert!(parsed.spans.is_empty());
    }

    #[test]
    fn test_parse_implicit_close() {
        let parsed = parse("[bold]hello[/]").unwrap();
        assert_eq!(parsed.plain, "hello");
        assert_eq!(parsed.spans[0].open, "[bold]");
        assert_eq!(parsed.spans[0].close, "[/bold]");
        assert_eq!(spans_of("[bold]hello[/]"), vec![(0, 5)]);
    }

    #[test]
    fn test_parse_nested_outer_first() {
        assert_eq!(spans_of("[bold]a[red]bc[/red]d[/bold]"), vec![(0, 4), (1, 3)]);
    }

    #[test]
    fn test_parse_unclosed_tag_auto_closes() {
        assert_eq!(spans_of("x[bold]hello"), vec![(1, 6)]);
    }

    #[test]
    fn test_parse_escaped_bracket() {
        let parsed = parse("\\[not a tag]").unwrap();
        assert_eq!(parsed.plain, "[not a tag]");
        assert!(parsed.spans.is_empty());
    }

    #[test]
    fn test_parse_link_parameter() {
        let parsed = parse("[link=https://example.com]here[/link]").unwrap();
        assert_eq!(parsed.plain, "here");
        assert_eq!(parsed.spans[0].open, "[link=https://example.com]");
        assert_eq!(parsed.spans[0].close, "[/link]");
    }

    #[test]
    fn test_unmatched_closing_tag() {
        let err = parse("[/bold]").expect_err("expected error for unmatched closing tag");
        assert_eq!(err.to_string(), "closing tag '[/bold]' doesn't match any open tag");
        let err = parse("hello[/]").expect_err("expected error for empty close");
        assert_eq!(err.to_string(), "closing tag '[/]' has nothing to close");
    }

    #[test]
    fn test_malformed_markup_is_plain() {
        let (plain, width) = Markup.strip_and_measure("a[/b]");
        assert_eq!(plain, "a[/b]");
        assert_eq!(width, 5);
    }

    #[test]
    fn test_escape_round_trips() {
        for text in [
            "hello [world]",
            "[bold]",
            "C:\\[x]",
            "C:\\[1]",
            "a\\\\[2] b\\c",
            "trailing\\",
            "日本[a]",
        ] {
            assert_eq!(parse(&escape(text)).unwrap().plain, text, "escape({text:?})");
        }
    }

    #[test]
    fn test_reflow_splits_on_line_breaks() {
        let lines = reflow(&Markup, "Dante\nAlighieri", None);
        assert_eq!(lines, vec!["Dante", "Alighieri"]);
    }

    #[test]
    fn test_reflow_reopens_regions_across_breaks() {
        let lines = reflow(&Markup, "[red]ab\ncd[/red]ef", None);
        assert_eq!(lines, vec!["[red]ab[/red]", "[red]cd[/red]ef"]);
    }

    #[test]
    fn test_reflow_wraps_visible_text_only() {
        let lines = reflow(&Markup, "[bold]abcdef[/bold]gh", Some(3));
        assert_eq!(lines, vec!["[bold]abc[/bold]", "[bold]def[/bold]", "gh"]);
    }

    #[test]
    fn test_reflow_keeps_short_lines() {
        assert_eq!(reflow(&Markup, "abc", Some(10)), vec!["abc"]);
        assert_eq!(reflow(&Markup, "", Some(10)), vec![""]);
    }

    #[test]
    fn test_reflow_wide_chars() {
        let lines = reflow(&PlainText, "日本語", Some(4));
        assert_eq!(lines, vec!["日本", "語"]);
    }

    #[test]
    fn test_reflow_escapes_literal_brackets() {
        let lines = reflow(&Markup, "\\[x] [red]y[/]", None);
        assert_eq!(lines, vec!["\\[x] [red]y[/red]"]);
        assert_eq!(Markup.strip(&lines[0]), "[x] y");
    }

    #[test]
    fn test_plain_text_decorator() {
        assert_eq!(PlainText.strip("[bold]x[/]"), "[bold]x[/]");
        assert!(PlainText.markup_spans("[bold]x[/]").is_empty());
        assert_eq!(reflow(&PlainText, "[b]x", Some(2)), vec!["[b", "]x"]);
    }

    #[test]
    fn test_to_ansi() {
        assert_eq!(to_ansi("plain"), "plain");
        let ansi = to_ansi("[bold]hi[/] there");
        assert!(ansi.contains("\x1b["));
        assert!(ansi.contains("hi"));
        assert!(ansi.ends_with(" there"));
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("red"), Some(Color::DarkRed));
        assert_eq!(parse_color("#ff0000"), Some(Color::Rgb { r: 255, g: 0, b: 0 }));
        assert_eq!(parse_color("color(42)"), Some(Color::AnsiValue(42)));
        assert_eq!(parse_color("nope"), None);
    }
}
