//! Named table styles.
//!
//! A [`StyleRegistry`] maps names to shared [`TableStyle`] values. The
//! process-wide instance behind [`StyleRegistry::global`] is created on
//! first use with the built-in styles; independent registries can be built
//! with [`StyleRegistry::with_builtins`] and handed around explicitly.
//!
//! Built-in names: `default`, `borderless`, `compact`, `style-guide`,
//! `box`, `box-double`.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, RwLock};

use crate::error::ConfigError;
use crate::style::{Crossings, TableStyle};
use crate::sync::{read_recover, write_recover};

static GLOBAL_REGISTRY: LazyLock<StyleRegistry> = LazyLock::new(StyleRegistry::with_builtins);

/// Name → style map.
#[derive(Debug, Default)]
pub struct StyleRegistry {
    styles: RwLock<HashMap<String, Arc<TableStyle>>>,
}

impl StyleRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in styles.
    #[must_use]
    pub fn with_builtins() -> Self {
        let styles = builtin_styles()
            .into_iter()
            .map(|(name, style)| (name.to_string(), Arc::new(style)))
            .collect();
        Self {
            styles: RwLock::new(styles),
        }
    }

    /// The process-wide registry.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL_REGISTRY
    }

    /// Look up a style by name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::StyleNotDefined`] for an unknown name.
    pub fn get(&self, name: &str) -> Result<Arc<TableStyle>, ConfigError> {
        read_recover(&self.styles)
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::StyleNotDefined(name.to_string()))
    }

    /// Register (or replace) a style. Returns the style previously stored
    /// under that name.
    pub fn register(&self, name: impl Into<String>, style: TableStyle) -> Option<Arc<TableStyle>> {
        let name = name.into();
        log::debug!("registering table style {name:?}");
        write_recover(&self.styles).insert(name, Arc::new(style))
    }

    /// Whether a style is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        read_recover(&self.styles).contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = read_recover(&self.styles).keys().cloned().collect();
        names.sort();
        names
    }
}

/// Look up a style in the global registry.
///
/// # Errors
///
/// Returns [`ConfigError::StyleNotDefined`] for an unknown name.
pub fn get_style_definition(name: &str) -> Result<Arc<TableStyle>, ConfigError> {
    StyleRegistry::global().get(name)
}

/// Register a style in the global registry.
pub fn register_style(name: impl Into<String>, style: TableStyle) {
    StyleRegistry::global().register(name, style);
}

fn builtin_styles() -> [(&'static str, TableStyle); 6] {
    let borderless = TableStyle::new()
        .horizontal_border_chars("=", "=")
        .vertical_border_chars(" ", " ")
        .default_crossing_char(" ");

    let compact = TableStyle::new()
        .horizontal_border_chars("", "")
        .vertical_border_chars("", " ")
        .default_crossing_char("")
        .cell_row_content_format("%s");

    let style_guide = TableStyle::new()
        .horizontal_border_chars("-", "-")
        .vertical_border_chars(" ", " ")
        .default_crossing_char(" ")
        .cell_header_format("%s");

    let box_style = TableStyle::new()
        .horizontal_border_chars("─", "─")
        .vertical_border_chars("│", "│")
        .crossing_chars(Crossings::new("┼", "┌", "┬", "┐", "┤", "┘", "┴", "└", "├"));

    let box_double = TableStyle::new()
        .horizontal_border_chars("═", "─")
        .vertical_border_chars("║", "│")
        .crossing_chars(
            Crossings::new("┼", "╔", "╤", "╗", "╢", "╝", "╧", "╚", "╟").with_double("╠", "╪", "╣"),
        );

    [
        ("default", TableStyle::new()),
        ("borderless", borderless),
        ("compact", compact),
        ("style-guide", style_guide),
        ("box", box_style),
        ("box-double", box_double),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::RuleKind;

    #[test]
    fn test_builtins_present() {
        let registry = StyleRegistry::with_builtins();
        assert_eq!(
            registry.names(),
            vec!["borderless", "box", "box-double", "compact", "default", "style-guide"]
        );
    }

    #[test]
    fn test_unknown_style() {
        let registry = StyleRegistry::new();
        assert_eq!(
            registry.get("nonexistent"),
            Err(ConfigError::StyleNotDefined("nonexistent".to_string()))
        );
    }

    #[test]
    fn test_register_replaces() {
        let registry = StyleRegistry::with_builtins();
        let fire = TableStyle::new().horizontal_border_chars("~", "~");
        assert!(registry.register("fire", fire.clone()).is_none());
        assert_eq!(*registry.get("fire").unwrap(), fire);
        assert!(registry.register("fire", TableStyle::new()).is_some());
        assert_eq!(*registry.get("fire").unwrap(), TableStyle::new());
    }

    #[test]
    fn test_registries_are_independent() {
        let a = StyleRegistry::with_builtins();
        let b = StyleRegistry::with_builtins();
        a.register("only-a", TableStyle::new());
        assert!(a.contains("only-a"));
        assert!(!b.contains("only-a"));
    }

    #[test]
    fn test_box_double_rules() {
        let style = StyleRegistry::with_builtins().get("box-double").unwrap();
        assert_eq!(style.build_rule(&[1, 2], RuleKind::Top), "╔═╤══╗");
        assert_eq!(style.build_rule(&[1, 2], RuleKind::DoubleMid), "╠═╪══╣");
        assert_eq!(style.build_rule(&[1, 2], RuleKind::Mid), "╟─┼──╢");
        assert_eq!(style.build_rule(&[1, 2], RuleKind::Bottom), "╚═╧══╝");
    }

    #[test]
    fn test_compact_has_no_rules() {
        let style = StyleRegistry::with_builtins().get("compact").unwrap();
        assert!(!style.has_rules());
    }
}
