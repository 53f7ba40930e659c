//! Table styles: border glyphs, crossings and format templates.
//!
//! A [`TableStyle`] is built once with its builder methods and then shared
//! read-only (usually as `Arc<TableStyle>` from the
//! [`StyleRegistry`](crate::registry::StyleRegistry)).

use std::fmt;

use crate::markup::Decorator;

/// Which side of a cell receives the padding characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum PadType {
    /// Pad on the left, content is right-aligned.
    Left,
    /// Pad on the right, content is left-aligned.
    #[default]
    Right,
    /// Pad on both sides, content is centred (extra char goes right).
    Both,
}

/// Horizontal rule kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Top edge of the table.
    Top,
    /// Bottom edge of the table.
    Bottom,
    /// Simple rule between rows.
    Mid,
    /// Heavier rule, used below the headers and for double separators.
    DoubleMid,
}

/// Glyphs of one horizontal rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleGlyphs<'a> {
    /// Repeated across each column.
    pub horizontal: &'a str,
    /// Left edge crossing.
    pub left: &'a str,
    /// Crossing between two columns.
    pub mid: &'a str,
    /// Right edge crossing.
    pub right: &'a str,
}

/// The twelve crossing glyphs of a style.
///
/// The `*_bottom` glyphs draw the double rule below the headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crossings {
    /// Inner crossing of a simple rule.
    pub cross: String,
    /// Top-left corner.
    pub top_left: String,
    /// Top edge crossing.
    pub top_mid: String,
    /// Top-right corner.
    pub top_right: String,
    /// Right edge of a simple rule.
    pub mid_right: String,
    /// Bottom-right corner.
    pub bottom_right: String,
    /// Bottom edge crossing.
    pub bottom_mid: String,
    /// Bottom-left corner.
    pub bottom_left: String,
    /// Left edge of a simple rule.
    pub mid_left: String,
    /// Left edge of a double rule.
    pub top_left_bottom: String,
    /// Inner crossing of a double rule.
    pub top_mid_bottom: String,
    /// Right edge of a double rule.
    pub top_right_bottom: String,
}

impl Crossings {
    /// The same glyph everywhere.
    #[must_use]
    pub fn uniform(glyph: &str) -> Self {
        Self::new(glyph, glyph, glyph, glyph, glyph, glyph, glyph, glyph, glyph)
    }

    /// Crossings whose double-rule glyphs reuse the simple-rule ones.
    #[must_use]
    #[expect(
        clippy::too_many_arguments,
        reason = "one argument per glyph mirrors the table drawing order"
    )]
    pub fn new(
        cross: &str,
        top_left: &str,
        top_mid: &str,
        top_right: &str,
        mid_right: &str,
        bottom_right: &str,
        bottom_mid: &str,
        bottom_left: &str,
        mid_left: &str,
    ) -> Self {
        Self {
            cross: cross.to_string(),
            top_left: top_left.to_string(),
            top_mid: top_mid.to_string(),
            top_right: top_right.to_string(),
            mid_right: mid_right.to_string(),
            bottom_right: bottom_right.to_string(),
            bottom_mid: bottom_mid.to_string(),
            bottom_left: bottom_left.to_string(),
            mid_left: mid_left.to_string(),
            top_left_bottom: mid_left.to_string(),
            top_mid_bottom: cross.to_string(),
            top_right_bottom: mid_right.to_string(),
        }
    }

    /// Set the double-rule glyphs.
    #[must_use]
    pub fn with_double(mut self, left: &str, mid: &str, right: &str) -> Self {
        self.top_left_bottom = left.to_string();
        self.top_mid_bottom = mid.to_string();
        self.top_right_bottom = right.to_string();
        self
    }
}

/// A format template with a single `%s` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template(String);

impl Template {
    /// Create a template. A template without `%s` appends nothing.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Substitute `content` for the placeholder.
    #[must_use]
    pub fn apply(&self, content: &str) -> String {
        self.0.replacen("%s", content, 1)
    }

    /// Visible cells the template adds around its content.
    #[must_use]
    pub fn overhead(&self, decorator: &dyn Decorator) -> usize {
        decorator.measure(&self.0).saturating_sub(2)
    }

    /// The raw template string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Template {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Visual definition of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStyle {
    padding_char: char,
    horizontal_outside: String,
    horizontal_inside: String,
    vertical_outside: String,
    vertical_inside: String,
    crossings: Crossings,
    header_title_format: Template,
    footer_title_format: Template,
    cell_header_format: Template,
    cell_row_format: Template,
    cell_row_content_format: Template,
    border_format: Template,
    pad_type: PadType,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            padding_char: ' ',
            horizontal_outside: "-".to_string(),
            horizontal_inside: "-".to_string(),
            vertical_outside: "|".to_string(),
            vertical_inside: "|".to_string(),
            crossings: Crossings::uniform("+"),
            header_title_format: Template::new("[bold black on white] %s [/]"),
            footer_title_format: Template::new("[bold black on white] %s [/]"),
            cell_header_format: Template::new("[green]%s[/green]"),
            cell_row_format: Template::new("%s"),
            cell_row_content_format: Template::new(" %s "),
            border_format: Template::new("%s"),
            pad_type: PadType::Right,
        }
    }
}

impl TableStyle {
    /// The `default` style: ASCII borders.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the padding character.
    #[must_use]
    pub fn padding_char(mut self, padding: char) -> Self {
        self.padding_char = padding;
        self
    }

    /// Set the horizontal glyphs for the table edge and the inner rules.
    #[must_use]
    pub fn horizontal_border_chars(mut self, outside: &str, inside: &str) -> Self {
        self.horizontal_outside = outside.to_string();
        self.horizontal_inside = inside.to_string();
        self
    }

    /// Set the vertical glyphs for the table edge and between columns.
    #[must_use]
    pub fn vertical_border_chars(mut self, outside: &str, inside: &str) -> Self {
        self.vertical_outside = outside.to_string();
        self.vertical_inside = inside.to_string();
        self
    }

    /// Set all twelve crossing glyphs.
    #[must_use]
    pub fn crossing_chars(mut self, crossings: Crossings) -> Self {
        self.crossings = crossings;
        self
    }

    /// Use one glyph for every crossing.
    #[must_use]
    pub fn default_crossing_char(self, glyph: &str) -> Self {
        self.crossing_chars(Crossings::uniform(glyph))
    }

    /// Set the template of the title embedded in the top border.
    #[must_use]
    pub fn header_title_format(mut self, format: impl Into<Template>) -> Self {
        self.header_title_format = format.into();
        self
    }

    /// Set the template of the title embedded in the bottom border.
    #[must_use]
    pub fn footer_title_format(mut self, format: impl Into<Template>) -> Self {
        self.footer_title_format = format.into();
        self
    }

    /// Set the template wrapping each padded header cell.
    #[must_use]
    pub fn cell_header_format(mut self, format: impl Into<Template>) -> Self {
        self.cell_header_format = format.into();
        self
    }

    /// Set the template wrapping each padded data cell.
    #[must_use]
    pub fn cell_row_format(mut self, format: impl Into<Template>) -> Self {
        self.cell_row_format = format.into();
        self
    }

    /// Set the template applied to cell content before padding.
    #[must_use]
    pub fn cell_row_content_format(mut self, format: impl Into<Template>) -> Self {
        self.cell_row_content_format = format.into();
        self
    }

    /// Set the template wrapping every border glyph run.
    #[must_use]
    pub fn border_format(mut self, format: impl Into<Template>) -> Self {
        self.border_format = format.into();
        self
    }

    /// Set the default pad direction.
    #[must_use]
    pub fn pad_type(mut self, pad_type: PadType) -> Self {
        self.pad_type = pad_type;
        self
    }

    /// Padding character.
    #[must_use]
    pub fn get_padding_char(&self) -> char {
        self.padding_char
    }

    /// Default pad direction.
    #[must_use]
    pub fn get_pad_type(&self) -> PadType {
        self.pad_type
    }

    /// Crossing glyphs.
    #[must_use]
    pub fn crossings(&self) -> &Crossings {
        &self.crossings
    }

    /// Vertical glyph at the table edge.
    #[must_use]
    pub fn vertical_outside(&self) -> &str {
        &self.vertical_outside
    }

    /// Vertical glyph between two columns.
    #[must_use]
    pub fn vertical_inside(&self) -> &str {
        &self.vertical_inside
    }

    /// Horizontal glyph of inner rules.
    #[must_use]
    pub fn horizontal_inside(&self) -> &str {
        &self.horizontal_inside
    }

    /// Horizontal glyph of the table edge.
    #[must_use]
    pub fn horizontal_outside(&self) -> &str {
        &self.horizontal_outside
    }

    /// Header title template.
    #[must_use]
    pub fn get_header_title_format(&self) -> &Template {
        &self.header_title_format
    }

    /// Footer title template.
    #[must_use]
    pub fn get_footer_title_format(&self) -> &Template {
        &self.footer_title_format
    }

    /// Header cell template.
    #[must_use]
    pub fn get_cell_header_format(&self) -> &Template {
        &self.cell_header_format
    }

    /// Data cell template.
    #[must_use]
    pub fn get_cell_row_format(&self) -> &Template {
        &self.cell_row_format
    }

    /// Cell content template.
    #[must_use]
    pub fn get_cell_row_content_format(&self) -> &Template {
        &self.cell_row_content_format
    }

    /// Border template.
    #[must_use]
    pub fn get_border_format(&self) -> &Template {
        &self.border_format
    }

    /// Whether this style draws horizontal rules at all.
    #[must_use]
    pub fn has_rules(&self) -> bool {
        !(self.horizontal_outside.is_empty()
            && self.horizontal_inside.is_empty()
            && self.crossings.cross.is_empty())
    }

    /// Glyphs for a rule kind.
    #[must_use]
    pub fn rule_glyphs(&self, kind: RuleKind) -> RuleGlyphs<'_> {
        let c = &self.crossings;
        match kind {
            RuleKind::Top => RuleGlyphs {
                horizontal: &self.horizontal_outside,
                left: &c.top_left,
                mid: &c.top_mid,
                right: &c.top_right,
            },
            RuleKind::Bottom => RuleGlyphs {
                horizontal: &self.horizontal_outside,
                left: &c.bottom_left,
                mid: &c.bottom_mid,
                right: &c.bottom_right,
            },
            RuleKind::Mid => RuleGlyphs {
                horizontal: &self.horizontal_inside,
                left: &c.mid_left,
                mid: &c.cross,
                right: &c.mid_right,
            },
            RuleKind::DoubleMid => RuleGlyphs {
                horizontal: &self.horizontal_outside,
                left: &c.top_left_bottom,
                mid: &c.top_mid_bottom,
                right: &c.top_right_bottom,
            },
        }
    }

    /// Build the glyph run of a rule for the given column widths.
    #[must_use]
    pub fn build_rule(&self, widths: &[usize], kind: RuleKind) -> String {
        let glyphs = self.rule_glyphs(kind);
        let mut result = String::from(glyphs.left);
        let last = widths.len().saturating_sub(1);
        for (i, &width) in widths.iter().enumerate() {
            result.push_str(&glyphs.horizontal.repeat(width));
            result.push_str(if i == last { glyphs.right } else { glyphs.mid });
        }
        result
    }
}

impl fmt::Display for TableStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // A sample 3x3 grid.
        let widths = [3, 3, 3];
        let inner = format!(
            "{out}   {ins}   {ins}   {out}",
            out = self.vertical_outside,
            ins = self.vertical_inside
        );
        writeln!(f, "{}", self.build_rule(&widths, RuleKind::Top))?;
        writeln!(f, "{inner}")?;
        writeln!(f, "{}", self.build_rule(&widths, RuleKind::DoubleMid))?;
        writeln!(f, "{inner}")?;
        writeln!(f, "{}", self.build_rule(&widths, RuleKind::Mid))?;
        writeln!(f, "{inner}")?;
        write!(f, "{}", self.build_rule(&widths, RuleKind::Bottom))
    }
}
