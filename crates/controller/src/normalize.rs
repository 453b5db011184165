//! Best-effort repair of generator output before structural parsing.
//!
//! Backends wrap JSON in code fences, add `//` comments, spell literals the
//! Python way, and leave trailing commas. [`normalize`] undoes all four.
//!
//! Literal rewriting works on whole words anywhere in the text, including
//! inside string values: an argument whose content is exactly `None` comes
//! back as `null`. Comment stripping likewise cuts a string value at a `//`
//! that follows whitespace.

use regex::Regex;
use std::sync::OnceLock;

struct RepairPatterns {
    line_comment: Regex,
    label: Regex,
    fenced_block: Regex,
    open_fence: Regex,
    close_fence: Regex,
    literals: [(Regex, &'static str); 3],
    trailing_separator: Regex,
}

fn patterns() -> &'static RepairPatterns {
    static PATTERNS: OnceLock<RepairPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| RepairPatterns {
        line_comment: Regex::new(r"(?m)(^|[ \t])//.*$").unwrap(),
        label: Regex::new(r"(?i)^\s*(?:json\s+plan\s*:\s*)+").unwrap(),
        fenced_block: Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)```").unwrap(),
        open_fence: Regex::new(r"^\s*```[A-Za-z0-9_-]*").unwrap(),
        close_fence: Regex::new(r"```\s*$").unwrap(),
        literals: [
            (Regex::new(r"\bTrue\b").unwrap(), "true"),
            (Regex::new(r"\bFalse\b").unwrap(), "false"),
            (Regex::new(r"\bNone\b").unwrap(), "null"),
        ],
        trailing_separator: Regex::new(r"(?:,\s*)+([\]}])").unwrap(),
    })
}

/// Repair raw generator text into something a JSON parser can accept.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(raw: &str) -> String {
    let p = patterns();

    // Either pass can expose work for the other: a label hiding a glued
    // `//`, or a comment line sitting above a label.
    let mut text = raw.to_string();
    loop {
        let unwrapped = strip_decoration(&text);
        let next = p.line_comment.replace_all(&unwrapped, "").into_owned();
        if next == text {
            break;
        }
        text = next;
    }

    for (pattern, replacement) in &p.literals {
        text = pattern.replace_all(&text, *replacement).into_owned();
    }

    let text = p.trailing_separator.replace_all(&text, "$1");
    text.trim().to_string()
}

/// Remove code fences and a leading "JSON Plan:" label.
fn strip_decoration(text: &str) -> String {
    let p = patterns();

    let unlabeled = p.label.replace(text, "");
    let inner = match p.fenced_block.captures(&unlabeled) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()).to_string(),
        None => {
            let opened = p.open_fence.replace(&unlabeled, "");
            p.close_fence.replace(&opened, "").into_owned()
        }
    };

    p.label.replace(inner.trim(), "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_fence_and_label() {
        let raw = "JSON Plan:\n```json\n[{\"tool_name\": \"echo\"}]\n```";
        assert_eq!(normalize(raw), "[{\"tool_name\": \"echo\"}]");

        let raw = "Here you go:\n```\n[]\n```\nLet me know!";
        assert_eq!(normalize(raw), "[]");
    }

    #[test]
    fn test_unterminated_fence() {
        let raw = "```json\n[{\"tool_name\": \"echo\"}]";
        assert_eq!(normalize(raw), "[{\"tool_name\": \"echo\"}]");
    }

    #[test]
    fn test_comment_marker_after_space_cuts_string() {
        let fixed = normalize(r#"[{"tool_name": "echo", "args": ["a // b"]}]"#);
        assert_eq!(fixed, r#"[{"tool_name": "echo", "args": ["a"#);
    }

    #[test]
    fn test_strips_line_comments_but_keeps_urls() {
        let raw = "[\n  // first step\n  {\"tool_name\": \"fetch\", \"args\": [\"https://example.com\"]} // inline\n]";
        let fixed = normalize(raw);
        assert!(!fixed.contains("first step"));
        assert!(!fixed.contains("inline"));
        assert!(fixed.contains("https://example.com"));
        assert!(serde_json::from_str::<serde_json::Value>(&fixed).is_ok());
    }

    #[test]
    fn test_rewrites_python_literals() {
        let raw = r#"[{"tool_name": "t", "kwargs": {"a": True, "b": False, "c": None}}]"#;
        assert_eq!(
            normalize(raw),
            r#"[{"tool_name": "t", "kwargs": {"a": true, "b": false, "c": null}}]"#
        );
        assert_eq!(normalize("Trueness"), "Trueness");
    }

    #[test]
    fn test_literal_rewrite_reaches_into_strings() {
        let raw = r#"[{"tool_name": "say", "args": ["None", "True story"]}]"#;
        assert_eq!(
            normalize(raw),
            r#"[{"tool_name": "say", "args": ["null", "true story"]}]"#
        );
    }

    #[test]
    fn test_removes_trailing_separators() {
        assert_eq!(normalize("[1, 2, ]"), "[1, 2]");
        assert_eq!(normalize("{\"a\": 1,\n}"), "{\"a\": 1}");
        assert_eq!(normalize("[1,,]"), "[1]");
    }

    #[test]
    fn test_comment_glued_to_decoration() {
        assert_eq!(normalize("JSON Plan://x\n[1]"), "[1]");
        assert_eq!(normalize("```json//c\n[1]\n```"), "[1]");
        assert_eq!(normalize("// note\nJSON Plan: [True]"), "[true]");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "",
            "[]",
            "JSON Plan: JSON Plan: [1,]",
            "```json\n// note\n[{\"tool_name\": \"x\", \"args\": [True,],},]\n```",
            "// leading comment\nJSON Plan:\n[None]",
            "text before ```python\nprint(1)\n``` text after",
            "[\"a // b\", \"c\"]",
            "{\"k\": [1, 2,\n],\n}",
            "```\n```",
            "JSON Plan://x\n[1]",
            "```json//c\n[1]\n```",
            "// n\nJSON Plan://x\n[1]",
        ];

        for input in inputs {
            let once = normalize(input);
            let twice = normalize(&once);
            assert_eq!(once, twice, "normalize not idempotent for {:?}", input);
        }
    }
}
