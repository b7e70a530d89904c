//! Batch number format compiler and matcher.
//!
//! A format string such as `HH:MM NNS` is compiled into an anchored,
//! case-insensitive regex. Recognized tokens are tried in table order at each
//! position, so two-character tokens win over their one-character prefixes.
//! Any character outside the table is matched literally.

use regex::{Regex, RegexBuilder};

/// Token table in priority order: (token, emitted sub-pattern).
const TOKEN_RULES: &[(&str, &str)] = &[
    ("HH", "(?:[01][0-9]|2[0-3])"),
    ("MM", "[0-5][0-9]"),
    ("N", "[0-9]"),
    ("S", "[A-C]"),
    (" ", r"\s*"),
    (":", ":"),
];

/// A compiled batch number format.
#[derive(Debug, Clone)]
pub struct BatchFormat {
    source: String,
    pattern: String,
    regex: Regex,
}

impl BatchFormat {
    /// Compile a format string. Returns `None` for an empty format.
    pub fn compile(format: &str) -> Option<Self> {
        if format.is_empty() {
            return None;
        }

        let pattern = translate(format);
        match RegexBuilder::new(&pattern).case_insensitive(true).build() {
            Ok(regex) => Some(Self {
                source: format.to_string(),
                pattern,
                regex,
            }),
            Err(e) => {
                tracing::warn!(format = %format, error = %e, "Batch format did not compile");
                None
            }
        }
    }

    /// The format string this rule was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The anchored regex source generated for this format.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Test a candidate code after trimming surrounding whitespace.
    /// An empty candidate never matches; a whitespace-only one is trimmed
    /// and tested like any other.
    pub fn is_match(&self, candidate: &str) -> bool {
        !candidate.is_empty() && self.regex.is_match(candidate.trim())
    }
}

/// Check `candidate` against `format`. Empty inputs never match.
pub fn matches(candidate: &str, format: &str) -> bool {
    if candidate.is_empty() {
        return false;
    }
    BatchFormat::compile(format).is_some_and(|rule| rule.is_match(candidate))
}

/// Translate a format string into an anchored regex source.
fn translate(format: &str) -> String {
    let mut pattern = String::with_capacity(format.len() * 4 + 2);
    pattern.push('^');

    let mut rest = format;
    while let Some(ch) = rest.chars().next() {
        match TOKEN_RULES
            .iter()
            .find(|(token, _)| rest.starts_with(token))
        {
            Some((token, sub_pattern)) => {
                pattern.push_str(sub_pattern);
                rest = &rest[token.len()..];
            }
            None => {
                let mut buf = [0u8; 4];
                pattern.push_str(&regex::escape(ch.encode_utf8(&mut buf)));
                rest = &rest[ch.len_utf8()..];
            }
        }
    }

    pattern.push('$');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hour_minute_bounds() {
        assert!(matches("23:59", "HH:MM"));
        assert!(matches("00:00", "HH:MM"));
        assert!(!matches("24:00", "HH:MM"));
        assert!(!matches("12:60", "HH:MM"));
        assert!(!matches("9:05", "HH:MM"));
    }

    #[test]
    fn digit_and_letter_tokens() {
        assert!(matches("42B11", "NNS11"));
        assert!(!matches("42D11", "NNS11"));
        assert!(!matches("4 2B11", "NNS11"));
        assert!(!matches("42B111", "NNS11"));
    }

    #[test]
    fn letter_token_is_case_insensitive() {
        assert!(matches("42b11", "NNS11"));
        assert!(matches("42c11", "NNS11"));
    }

    #[test]
    fn space_token_absorbs_whitespace_runs() {
        assert!(matches("08:30   12A", "HH:MM NNS"));
        assert!(matches("08:3012A", "HH:MM NNS"));
        assert!(matches("08:30\t12A", "HH:MM NNS"));
        assert!(matches("08:30 12A ", "HH:MM NNS"));
    }

    #[test]
    fn candidate_is_trimmed() {
        assert!(matches("  42B11\n", "NNS11"));
    }

    #[test]
    fn empty_inputs_never_match() {
        assert!(!matches("", "HH:MM"));
        assert!(!matches("", "LOT"));
        assert!(!matches("LOT", ""));
        assert!(!matches("", ""));
        assert!(!matches("   ", "NNS"));
    }

    #[test]
    fn whitespace_candidate_matches_space_only_format() {
        assert!(matches("   ", " "));
        assert!(matches("\t", "  "));
        assert!(!matches("", " "));

        let rule = BatchFormat::compile(" ").unwrap();
        assert!(rule.is_match("  "));
        assert!(!rule.is_match(""));
    }

    #[test]
    fn literal_only_formats_compare_case_insensitively() {
        assert!(matches("lot-a7", "LOT-A7"));
        assert!(matches(" LOT-A7 ", "LOT-A7"));
        assert!(!matches("LOT-A8", "LOT-A7"));
        assert!(!matches("LOT-A", "LOT-A7"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        assert!(matches("A.B", "A.B"));
        assert!(!matches("AxB", "A.B"));
        assert!(matches("(1)+[2]", "(1)+[2]"));
        assert!(matches("$^|?*{}\\", "$^|?*{}\\"));
    }

    #[test]
    fn lone_h_and_m_are_literals() {
        assert!(matches("H1", "HN"));
        assert!(!matches("11", "HN"));
        assert!(matches("m", "M"));
    }

    #[test]
    fn hh_is_consumed_before_single_tokens() {
        // "HHH" = hour token followed by a literal H.
        assert!(matches("12H", "HHH"));
        assert!(!matches("1H2", "HHH"));
    }

    #[test]
    fn n_token_rejects_non_ascii_digits() {
        assert!(!matches("٣", "N"));
    }

    #[test]
    fn non_ascii_literals_are_supported() {
        assert!(matches("Lö 12", "Lö NN"));
    }

    #[test]
    fn compile_exposes_anchored_pattern() {
        let rule = BatchFormat::compile("HH:MM NNS").unwrap();
        assert_eq!(
            rule.pattern(),
            r"^(?:[01][0-9]|2[0-3]):[0-5][0-9]\s*[0-9][0-9][A-C]$"
        );
        assert_eq!(rule.source(), "HH:MM NNS");
    }

    #[test]
    fn compile_rejects_empty_format() {
        assert!(BatchFormat::compile("").is_none());
    }

    #[test]
    fn repeated_compilation_is_stable() {
        let first = BatchFormat::compile("NNS11").unwrap();
        let second = BatchFormat::compile("NNS11").unwrap();
        assert_eq!(first.pattern(), second.pattern());
        for candidate in ["42B11", "42D11", "42b11", ""] {
            assert_eq!(first.is_match(candidate), second.is_match(candidate));
            assert_eq!(first.is_match(candidate), matches(candidate, "NNS11"));
        }
    }
}
