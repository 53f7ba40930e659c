//! Unicode character cell width calculations.
//!
//! Column sizing, padding and hard-wrapping all work in terminal cells,
//! not bytes or chars: CJK characters and most emoji occupy two cells.

use std::num::NonZeroUsize;
use std::sync::{LazyLock, Mutex};

use lru::LruCache;
use unicode_width::UnicodeWidthChar;

use crate::sync::lock_recover;

/// Minimum string length to cache (shorter strings have minimal overhead).
const CACHE_MIN_LEN: usize = 8;

/// Widths of recently measured cell values. Table layout measures every
/// value at least twice (sizing pass and materialisation pass).
static CELL_LEN_CACHE: LazyLock<Mutex<LruCache<String, usize>>> =
    LazyLock::new(|| Mutex::new(LruCache::new(NonZeroUsize::new(1024).expect("non-zero"))));

/// Get the cell width of a single character.
///
/// Control characters have 0 width.
#[must_use]
pub fn get_character_cell_size(c: char) -> usize {
    c.width().unwrap_or(0)
}

#[inline]
fn compute_cell_width(text: &str) -> usize {
    text.chars().map(get_character_cell_size).sum()
}

/// Get the total cell width of a string (cached for longer strings).
#[must_use]
pub fn cell_len(text: &str) -> usize {
    if text.len() < CACHE_MIN_LEN {
        return compute_cell_width(text);
    }

    if let Some(&cached) = lock_recover(&CELL_LEN_CACHE).get(text) {
        return cached;
    }

    let width = compute_cell_width(text);
    lock_recover(&CELL_LEN_CACHE).put(text.to_string(), width);
    width
}

/// Width of the widest line of a possibly multi-line string.
#[must_use]
pub fn max_line_len(text: &str) -> usize {
    text.split('\n').map(cell_len).max().unwrap_or(0)
}

/// Split a string at a cell position.
///
/// Returns (left, right) where left fits in `max_size` cells. At least one
/// character is always moved to the left part of a non-empty string, so a
/// wide character in a one-cell budget cannot stall a wrapping loop.
#[must_use]
pub fn chop_cells(text: &str, max_size: usize) -> (&str, &str) {
    let mut width = 0;
    let mut byte_pos = 0;

    for (i, c) in text.char_indices() {
        let char_width = get_character_cell_size(c);
        if width + char_width > max_size && byte_pos > 0 {
            break;
        }
        width += char_width;
        byte_pos = i + c.len_utf8();
        if width >= max_size {
            break;
        }
    }

    (&text[..byte_pos], &text[byte_pos..])
}

/// Truncate a string to at most `max_size` cells.
#[must_use]
pub fn truncate(text: &str, max_size: usize) -> &str {
    if max_size == 0 {
        return "";
    }
    let (left, _) = chop_cells(text, max_size);
    if cell_len(left) > max_size { "" } else { left }
}

/// The longest suffix of `text` that fits in `max_size` cells.
#[must_use]
pub fn truncate_start(text: &str, max_size: usize) -> &str {
    let mut width = 0;
    let mut start = text.len();
    for (i, c) in text.char_indices().rev() {
        width += get_character_cell_size(c);
        if width > max_size {
            break;
        }
        start = i;
    }
    &text[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_width() {
        assert_eq!(cell_len("hello"), 5);
        assert_eq!(cell_len("Hello, World!"), 13);
    }

    #[test]
    fn test_cjk_width() {
        assert_eq!(cell_len("日本語"), 6);
        assert_eq!(cell_len("Hello日本"), 9);
        assert_eq!(get_character_cell_size('中'), 2);
        assert_eq!(get_character_cell_size('\u{7}'), 0);
    }

    #[test]
    fn test_max_line_len() {
        assert_eq!(max_line_len("Dante\nAlighieri"), 9);
        assert_eq!(max_line_len(""), 0);
    }

    #[test]
    fn test_chop_cells() {
        let (left, right) = chop_cells("hello world", 5);
        assert_eq!(left, "hello");
        assert_eq!(right, " world");
    }

    #[test]
    fn test_chop_cells_cjk() {
        let (left, right) = chop_cells("日本語", 3);
        assert_eq!(left, "日");
        assert_eq!(right, "本語");
    }

    #[test]
    fn test_chop_cells_always_progresses() {
        let (left, right) = chop_cells("日本", 1);
        assert_eq!(left, "日");
        assert_eq!(right, "本");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 3), "hel");
        assert_eq!(truncate("日本", 1), "");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn test_truncate_start() {
        assert_eq!(truncate_start("hello", 3), "llo");
        assert_eq!(truncate_start("ab日本", 3), "本");
        assert_eq!(truncate_start("abc", 0), "");
        assert_eq!(truncate_start("abc", 10), "abc");
    }

    #[test]
    fn test_cached_and_uncached_agree() {
        let long = "a considerably longer string";
        assert_eq!(cell_len(long), compute_cell_width(long));
        assert_eq!(cell_len(long), compute_cell_width(long));
    }
}
