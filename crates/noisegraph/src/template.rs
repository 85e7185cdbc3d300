// SPDX-License-Identifier: MIT OR Apache-2.0
//! Two-placeholder template expansion for user formulas.
//!
//! `$1` and `$2` are replaced textually in a single left-to-right pass;
//! substituted text is never rescanned. Any other `$` is kept as-is.

/// Result of expanding a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// Expanded text
    pub text: String,
    /// Whether `$1` occurred
    pub uses_first: bool,
    /// Whether `$2` occurred
    pub uses_second: bool,
}

impl Expansion {
    /// True when the template references neither operand
    pub fn is_constant(&self) -> bool {
        !self.uses_first && !self.uses_second
    }
}

/// Replace `$1` with `first` and `$2` with `second`
pub fn expand(template: &str, first: &str, second: &str) -> Expansion {
    let mut text = String::with_capacity(template.len());
    let mut uses_first = false;
    let mut uses_second = false;
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' {
            match chars.peek() {
                Some('1') => {
                    chars.next();
                    text.push_str(first);
                    uses_first = true;
                    continue;
                }
                Some('2') => {
                    chars.next();
                    text.push_str(second);
                    uses_second = true;
                    continue;
                }
                _ => {}
            }
        }
        text.push(c);
    }

    Expansion {
        text,
        uses_first,
        uses_second,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_both() {
        let e = expand("distance($1, $2)", "(a)", "(b)");
        assert_eq!(e.text, "distance((a), (b))");
        assert!(e.uses_first && e.uses_second);
    }

    #[test]
    fn test_expand_repeated_and_missing() {
        let e = expand("$1 * $1", "x", "y");
        assert_eq!(e.text, "x * x");
        assert!(e.uses_first);
        assert!(!e.uses_second);
    }

    #[test]
    fn test_substitution_is_not_rescanned() {
        let e = expand("$1", "$2", "boom");
        assert_eq!(e.text, "$2");
        assert!(!e.uses_second);
    }

    #[test]
    fn test_other_dollars_are_kept() {
        let e = expand("$3 + $", "a", "b");
        assert_eq!(e.text, "$3 + $");
        assert!(e.is_constant());
    }
}
