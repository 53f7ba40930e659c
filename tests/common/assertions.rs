//! Logged assertion helpers.

#![allow(dead_code)]

use std::fmt::Debug;

/// Assert equality, logging both values first.
#[track_caller]
pub fn assert_eq_logged<T: PartialEq + Debug>(context: &str, actual: T, expected: T) {
    tracing::debug!(
        context = context,
        expected = ?expected,
        actual = ?actual,
        "asserting equality"
    );

    if actual != expected {
        tracing::error!(
            context = context,
            expected = ?expected,
            actual = ?actual,
            "assertion failed: values not equal"
        );
    }

    assert_eq!(
        actual, expected,
        "{context}: expected {expected:?}, got {actual:?}"
    );
}

/// Assert that a result is an error and return it.
#[track_caller]
pub fn assert_err_logged<T: Debug, E: Debug>(context: &str, result: Result<T, E>) -> E {
    match result {
        Ok(value) => {
            tracing::error!(context = context, value = ?value, "expected error, got Ok");
            panic!("{context}: expected error, got Ok({value:?})");
        }
        Err(error) => {
            tracing::debug!(context = context, error = ?error, "got expected error");
            error
        }
    }
}

/// Assert that every line has the same display width.
#[track_caller]
pub fn assert_uniform_width(context: &str, lines: &[String]) {
    let widths: Vec<usize> = lines
        .iter()
        .map(|line| console_table::cells::cell_len(line))
        .collect();
    tracing::debug!(context = context, widths = ?widths, "checking line widths");
    assert!(
        widths.windows(2).all(|pair| pair[0] == pair[1]),
        "{context}: ragged lines {widths:?}\n{}",
        lines.join("\n")
    );
}
