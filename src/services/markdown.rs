//! Markdown helpers for the blog editor
//!
//! `apply_format` splices markdown syntax around a selection. It never parses
//! the document; offsets are counted in chars, not bytes.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::blog::{MarkdownFormat, Selection, EXCERPT_LENGTH};

lazy_static! {
    static ref IMAGE_REGEX: Regex = Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap();
    static ref LINK_REGEX: Regex = Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap();
    static ref LINE_PREFIX_REGEX: Regex =
        Regex::new(r"(?m)^\s*(?:#{1,6}\s+|>\s?|[-*+]\s+|\d+\.\s+)").unwrap();
    static ref EMPHASIS_REGEX: Regex = Regex::new(r"(\*\*|__|\*|_|~~|`+)").unwrap();
    static ref WHITESPACE_REGEX: Regex = Regex::new(r"\s+").unwrap();
}

fn placeholder(format: MarkdownFormat) -> &'static str {
    match format {
        MarkdownFormat::Bold => "bold text",
        MarkdownFormat::Italic => "italic text",
        MarkdownFormat::Heading1 | MarkdownFormat::Heading2 | MarkdownFormat::Heading3 => "Heading",
        MarkdownFormat::BulletList | MarkdownFormat::NumberedList => "List item",
        MarkdownFormat::Link => "link text",
        MarkdownFormat::Image => "alt text",
        MarkdownFormat::Quote => "Quote",
        MarkdownFormat::Code => "code",
    }
}

/// Apply `format` to `selection` within `content`.
///
/// Returns the new content and the selection covering the formatted text
/// (the placeholder when the selection was empty).
pub fn apply_format(
    content: &str,
    selection: Selection,
    format: MarkdownFormat,
    url: Option<&str>,
) -> (String, Selection) {
    let chars: Vec<char> = content.chars().collect();
    let mut start = selection.start.min(chars.len());
    let mut end = selection.end.min(chars.len());
    if start > end {
        std::mem::swap(&mut start, &mut end);
    }

    let selected: String = chars[start..end].iter().collect();
    let url = url.map(str::trim).filter(|u| !u.is_empty()).unwrap_or("https://");

    match format {
        MarkdownFormat::Bold => wrap(&chars, start, end, &selected, "**", "**", format),
        MarkdownFormat::Italic => wrap(&chars, start, end, &selected, "*", "*", format),
        MarkdownFormat::Code if selected.contains('\n') => {
            wrap(&chars, start, end, &selected, "```\n", "\n```", format)
        }
        MarkdownFormat::Code => wrap(&chars, start, end, &selected, "`", "`", format),
        MarkdownFormat::Link => {
            let suffix = format!("]({})", url);
            wrap(&chars, start, end, &selected, "[", &suffix, format)
        }
        MarkdownFormat::Image => {
            let suffix = format!("]({})", url);
            wrap(&chars, start, end, &selected, "![", &suffix, format)
        }
        MarkdownFormat::Heading1 => prefix_lines(&chars, start, end, format, |_| "# ".to_string()),
        MarkdownFormat::Heading2 => prefix_lines(&chars, start, end, format, |_| "## ".to_string()),
        MarkdownFormat::Heading3 => prefix_lines(&chars, start, end, format, |_| "### ".to_string()),
        MarkdownFormat::Quote => prefix_lines(&chars, start, end, format, |_| "> ".to_string()),
        MarkdownFormat::BulletList => prefix_lines(&chars, start, end, format, |_| "- ".to_string()),
        MarkdownFormat::NumberedList => {
            prefix_lines(&chars, start, end, format, |i| format!("{}. ", i + 1))
        }
    }
}

fn splice(chars: &[char], start: usize, end: usize, middle: &str) -> String {
    let mut out: String = chars[..start].iter().collect();
    out.push_str(middle);
    out.extend(chars[end..].iter());
    out
}

fn wrap(
    chars: &[char],
    start: usize,
    end: usize,
    selected: &str,
    before: &str,
    after: &str,
    format: MarkdownFormat,
) -> (String, Selection) {
    let text = if selected.is_empty() { placeholder(format) } else { selected };
    let inner_start = start + before.chars().count();
    let inner_end = inner_start + text.chars().count();
    let content = splice(chars, start, end, &format!("{}{}{}", before, text, after));
    (
        content,
        Selection {
            start: inner_start,
            end: inner_end,
        },
    )
}

/// Prefix every line touched by the selection; a caret inserts a new line
/// holding the placeholder.
fn prefix_lines<F>(
    chars: &[char],
    start: usize,
    end: usize,
    format: MarkdownFormat,
    prefix: F,
) -> (String, Selection)
where
    F: Fn(usize) -> String,
{
    if start == end {
        let at_line_start = start == 0 || chars[start - 1] == '\n';
        let lead = if at_line_start { "" } else { "\n" };
        let marker = prefix(0);
        let text = placeholder(format);
        let inner_start = start + lead.chars().count() + marker.chars().count();
        let content = splice(chars, start, end, &format!("{}{}{}", lead, marker, text));
        return (
            content,
            Selection {
                start: inner_start,
                end: inner_start + text.chars().count(),
            },
        );
    }

    let line_start = chars[..start]
        .iter()
        .rposition(|c| *c == '\n')
        .map_or(0, |i| i + 1);
    let block: String = chars[line_start..end].iter().collect();
    let formatted = block
        .split('\n')
        .enumerate()
        .map(|(i, line)| format!("{}{}", prefix(i), line))
        .collect::<Vec<_>>()
        .join("\n");

    let new_end = line_start + formatted.chars().count();
    let content = splice(chars, line_start, end, &formatted);
    (
        content,
        Selection {
            start: line_start,
            end: new_end,
        },
    )
}

/// Plain-text summary of a markdown body, cut at a word boundary.
pub fn excerpt(content: &str) -> String {
    let text = IMAGE_REGEX.replace_all(content, "");
    let text = LINK_REGEX.replace_all(&text, "$1");
    let text = text
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n");
    let text = LINE_PREFIX_REGEX.replace_all(&text, "");
    let text = EMPHASIS_REGEX.replace_all(&text, "");
    let text = WHITESPACE_REGEX.replace_all(text.trim(), " ");

    if text.chars().count() <= EXCERPT_LENGTH {
        return text.into_owned();
    }

    let cut: String = text.chars().take(EXCERPT_LENGTH).collect();
    let cut = match cut.rfind(' ') {
        Some(i) if i > 0 => &cut[..i],
        _ => cut.as_str(),
    };
    format!("{}…", cut.trim_end_matches(|c: char| c.is_ascii_punctuation()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(start: usize, end: usize) -> Selection {
        Selection { start, end }
    }

    #[test]
    fn test_bold_wraps_selection() {
        let (content, selection) =
            apply_format("Save early often", sel(5, 10), MarkdownFormat::Bold, None);
        assert_eq!(content, "Save **early** often");
        assert_eq!(selection, sel(7, 12));
    }

    #[test]
    fn test_empty_selection_inserts_placeholder() {
        let (content, selection) = apply_format("Hi ", sel(3, 3), MarkdownFormat::Italic, None);
        assert_eq!(content, "Hi *italic text*");
        assert_eq!(&content[selection.start..selection.end], "italic text");
    }

    #[test]
    fn test_link_uses_url() {
        let (content, _) = apply_format(
            "See our guide",
            sel(8, 13),
            MarkdownFormat::Link,
            Some("https://example.com/guide"),
        );
        assert_eq!(content, "See our [guide](https://example.com/guide)");
    }

    #[test]
    fn test_heading_applies_from_line_start() {
        let (content, selection) =
            apply_format("Intro\nRetirement basics", sel(9, 12), MarkdownFormat::Heading2, None);
        assert_eq!(content, "Intro\n## Retirement basics");
        assert_eq!(selection.start, 6);
    }

    #[test]
    fn test_numbered_list_numbers_each_line() {
        let (content, _) = apply_format(
            "Budget\nSave\nInvest",
            sel(0, 18),
            MarkdownFormat::NumberedList,
            None,
        );
        assert_eq!(content, "1. Budget\n2. Save\n3. Invest");
    }

    #[test]
    fn test_caret_mid_line_starts_new_line() {
        let (content, _) = apply_format("Tips", sel(4, 4), MarkdownFormat::BulletList, None);
        assert_eq!(content, "Tips\n- List item");
    }

    #[test]
    fn test_multiline_code_is_fenced() {
        let (content, _) = apply_format("a\nb", sel(0, 3), MarkdownFormat::Code, None);
        assert_eq!(content, "```\na\nb\n```");
    }

    #[test]
    fn test_offsets_are_chars_and_clamped() {
        let (content, selection) = apply_format("café", sel(10, 3), MarkdownFormat::Bold, None);
        assert_eq!(content, "caf**é**");
        assert_eq!(selection, sel(5, 6));
    }

    #[test]
    fn test_excerpt_strips_markdown() {
        let body = "# Five mistakes\n\nAvoid **these** [errors](https://x.y) when planning.\n\n![chart](c.png)";
        assert_eq!(excerpt(body), "Five mistakes Avoid these errors when planning.");
    }

    #[test]
    fn test_excerpt_truncates_on_word_boundary() {
        let body = "word ".repeat(100);
        let short = excerpt(&body);
        assert!(short.ends_with('…'));
        assert!(short.chars().count() <= EXCERPT_LENGTH + 1);
        assert!(!short.contains("wor…"));
    }
}
