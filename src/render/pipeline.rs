//! The staged markdown-to-text transformation.
//!
//! Each stage rewrites the output of the previous one, so the order is part
//! of the contract: blockquotes are collapsed before headings are drawn,
//! horizontal rules are replaced before code fences are boxed, task-list
//! items are rewritten before the generic bullet stage sees them, and bold
//! runs are consumed before the italic stage can touch single markers.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const HEADING_RULE_LEN: usize = 15;
const HR_RULE_LEN: usize = 12;
const CODE_BOX_WIDTH: usize = 50;

static EXCESS_BLANKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static BLOCKQUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^>+(.*?)$").unwrap());
static H1: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#\s+(.*?)$").unwrap());
static H2: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^##\s+(.*?)$").unwrap());
static H3_TO_H6: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(#{3,6})\s+(.*?)$").unwrap());
static SETEXT_H1: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(.*?)\n={3,}[ \t]*$").unwrap());
static SETEXT_H2: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(.*?)\n-{3,}[ \t]*$").unwrap());
static HORIZONTAL_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(-{3,}|\*{3,}|_{3,})$").unwrap());
static CODE_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"```[^\n]*\n(?s:(.*?))```").unwrap());
static TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\|(.*)\|[ \t]*\n\|[-:| \t]+\|[ \t]*\n(?:\|.*\|[ \t]*\n)+").unwrap()
});
static IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[(.*?)\]\(.*?\)").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(.*?)\]\((.*?)\)").unwrap());
static TASK_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*- \[ \][ \t]*(.*?)$").unwrap());
static TASK_DONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?mi)^[ \t]*- \[x\][ \t]*(.*?)$").unwrap());
static ORDERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(\d+)\.[ \t]+(.*?)$").unwrap());
static UNORDERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([ \t]*)[-*+][ \t]+(.*?)$").unwrap());
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\*\*(.*?)\*\*|__(.*?)__").unwrap());
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\*(.*?)\*|_(.*?)_").unwrap());
static REMAINING_BLANKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());

/// Runs the full transformation. Total: any input produces some output.
pub(crate) fn markdown_to_text(markdown: &str) -> String {
    let mut text = markdown.to_string();
    if !text.ends_with('\n') {
        text.push('\n');
    }

    // 1. Collapse runs of blank lines down to one blank line.
    let text = EXCESS_BLANKS.replace_all(&text, "\n\n");

    // 2. All blockquote nesting levels collapse to a single marker.
    let text = BLOCKQUOTE.replace_all(&text, |caps: &Captures| {
        format!("┃ {}", caps[1].trim())
    });

    // 3. Level 1/2 ATX headings become the text plus a full-width rule.
    let heading = |caps: &Captures| {
        format!("{}\n{}", caps[1].trim(), "━".repeat(HEADING_RULE_LEN))
    };
    let text = H1.replace_all(&text, heading);
    let text = H2.replace_all(&text, heading);

    // 4. Deeper headings keep their literal hash run and gain a closing mark.
    let text = H3_TO_H6.replace_all(&text, |caps: &Captures| {
        format!("{} {}】", &caps[1], caps[2].trim())
    });

    // 5. Setext headings get the same rule treatment as stage 3.
    let setext = |caps: &Captures| {
        format!("{}\n{}", caps[1].trim(), "━".repeat(HEADING_RULE_LEN))
    };
    let text = SETEXT_H1.replace_all(&text, setext);
    let text = SETEXT_H2.replace_all(&text, setext);

    // 6. Horizontal rules become a fixed-length rule line.
    let text = HORIZONTAL_RULE.replace_all(&text, "━".repeat(HR_RULE_LEN));

    // 7. Fenced code blocks are re-emitted inside a drawn box.
    let text = CODE_BLOCK.replace_all(&text, |caps: &Captures| boxed_code(&caps[1]));

    // 8. Inline code spans pass through unchanged.

    // 9. Pipe tables are re-emitted with padded cells and a dashed separator.
    let text = TABLE.replace_all(&text, |caps: &Captures| rebuild_table(&caps[0]));

    // 10. Images become a placeholder; the URL is discarded.
    let text = IMAGE.replace_all(&text, "[image: $1]");

    // 11. Links become anchors so clickability survives the transform.
    let text = LINK.replace_all(&text, "<a href=\"$2\">$1</a>");

    // 12. Task list items keep their checked/unchecked state.
    let text = TASK_OPEN.replace_all(&text, "[  ] $1");
    let text = TASK_DONE.replace_all(&text, "[✓] $1");

    // 13. Ordered list items are normalized to `N. text`.
    let text = ORDERED_ITEM.replace_all(&text, "$1. $2");

    // 14. Unordered list bullets are chosen by indentation depth.
    let text = UNORDERED_ITEM.replace_all(&text, |caps: &Captures| {
        let depth = caps[1].len() / 2;
        let bullet = if depth == 0 { "• " } else { "◦ " };
        format!("{}{}{}", "  ".repeat(depth), bullet, &caps[2])
    });

    // 15/16. Bold before italic, so `**` runs are gone when `*` is handled.
    let text = BOLD.replace_all(&text, |caps: &Captures| {
        format!("【{}】", group_text(caps))
    });
    let text = ITALIC.replace_all(&text, |caps: &Captures| {
        format!("_{}_", group_text(caps))
    });

    // 17. Collapse what is left to single newlines and trim the edges.
    let text = REMAINING_BLANKS.replace_all(&text, "\n");
    text.trim().to_string()
}

/// Content of whichever alternative's capture group matched.
fn group_text<'a>(caps: &'a Captures) -> &'a str {
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str())
        .unwrap_or("")
}

fn boxed_code(code: &str) -> String {
    let mut out = format!("\n┌{}┐\n", "─".repeat(CODE_BOX_WIDTH));
    out.push_str("│ CODE BLOCK:\n");
    for line in code.split('\n') {
        out.push_str("│ ");
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&format!("└{}┘\n", "─".repeat(CODE_BOX_WIDTH)));
    out
}

fn rebuild_table(table: &str) -> String {
    let rows: Vec<&str> = table.trim().split('\n').collect();
    let mut out = String::from("\n");

    if let Some(header) = rows.first() {
        let line = format_row(header);
        out.push_str(&line);
        out.push('\n');
        // Separator sized to the header row, minus the leading cell padding.
        out.push('|');
        out.push_str(&"-".repeat(line.len().saturating_sub(3)));
        out.push_str("|\n");
    }

    // Skip the header and the markdown separator row.
    for row in rows.iter().skip(2) {
        if row.trim().is_empty() {
            continue;
        }
        out.push_str(&format_row(row));
        out.push('\n');
    }

    out.push('\n');
    out
}

fn format_row(row: &str) -> String {
    let mut line = String::from("| ");
    for cell in row.trim().trim_matches('|').split('|') {
        line.push_str(cell.trim());
        line.push_str(" | ");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_one_heading_gets_a_rule() {
        assert_eq!(markdown_to_text("# Hello"), format!("Hello\n{}", "━".repeat(15)));
    }

    #[test]
    fn level_two_heading_gets_a_rule() {
        assert_eq!(
            markdown_to_text("## Section"),
            format!("Section\n{}", "━".repeat(15))
        );
    }

    #[test]
    fn deep_headings_keep_their_hash_run() {
        assert_eq!(markdown_to_text("### Sub"), "### Sub】");
        assert_eq!(markdown_to_text("###### Fine"), "###### Fine】");
    }

    #[test]
    fn setext_headings_match_atx_treatment() {
        assert_eq!(
            markdown_to_text("Title\n==="),
            format!("Title\n{}", "━".repeat(15))
        );
        assert_eq!(
            markdown_to_text("Title\n----"),
            format!("Title\n{}", "━".repeat(15))
        );
    }

    #[test]
    fn bold_is_bracketed() {
        assert_eq!(markdown_to_text("**bold**"), "【bold】");
        assert_eq!(markdown_to_text("__bold__"), "【bold】");
    }

    #[test]
    fn italic_is_underscored() {
        assert_eq!(markdown_to_text("*slanted*"), "_slanted_");
    }

    #[test]
    fn blockquote_nesting_collapses_to_one_marker() {
        assert_eq!(markdown_to_text("> quoted"), "┃ quoted");
        assert_eq!(markdown_to_text(">> quoted"), "┃ quoted");
        assert_eq!(markdown_to_text(">>> deep"), "┃ deep");
    }

    #[test]
    fn task_items_keep_state() {
        assert_eq!(markdown_to_text("- [ ] task"), "[  ] task");
        assert_eq!(markdown_to_text("- [x] task"), "[✓] task");
        assert_eq!(markdown_to_text("- [X] task"), "[✓] task");
    }

    #[test]
    fn bullets_follow_indent_depth() {
        assert_eq!(markdown_to_text("- a\n  - b"), "• a\n  ◦ b");
        assert_eq!(markdown_to_text("* a\n    + b"), "• a\n    ◦ b");
    }

    #[test]
    fn ordered_items_are_normalized() {
        assert_eq!(markdown_to_text("1.  first\n2. second"), "1. first\n2. second");
    }

    #[test]
    fn blank_runs_collapse_to_single_newlines() {
        assert_eq!(markdown_to_text("a\n\n\n\n\nb"), "a\nb");
        assert_eq!(markdown_to_text("a\n\nb"), "a\nb");
    }

    #[test]
    fn horizontal_rule_becomes_fixed_rule() {
        assert_eq!(markdown_to_text("before\n***\nafter"), {
            format!("before\n{}\nafter", "━".repeat(12))
        });
        assert_eq!(markdown_to_text("before\n___\nafter"), {
            format!("before\n{}\nafter", "━".repeat(12))
        });
    }

    #[test]
    fn images_become_placeholders() {
        assert_eq!(
            markdown_to_text("see ![diagram](https://example.test/d.png)"),
            "see [image: diagram]"
        );
    }

    #[test]
    fn links_become_anchors() {
        assert_eq!(
            markdown_to_text("[docs](https://example.test/docs)"),
            "<a href=\"https://example.test/docs\">docs</a>"
        );
    }

    #[test]
    fn code_blocks_are_boxed() {
        let out = markdown_to_text("```rust\nlet x = 1;\n```");
        let top = format!("┌{}┐", "─".repeat(50));
        let bottom = format!("└{}┘", "─".repeat(50));
        assert!(out.starts_with(&top), "missing top border: {out}");
        assert!(out.contains("│ CODE BLOCK:"));
        assert!(out.contains("│ let x = 1;"));
        assert!(out.ends_with(&bottom), "missing bottom border: {out}");
    }

    #[test]
    fn inline_code_passes_through() {
        assert_eq!(markdown_to_text("run `cargo doc` now"), "run `cargo doc` now");
    }

    #[test]
    fn tables_are_rebuilt_with_separator() {
        let out = markdown_to_text("| name | port |\n|------|------|\n| smtp | 465 |\n");
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("| name | port | "));
        let sep = lines.next().expect("separator row");
        assert!(sep.starts_with('|') && sep.ends_with('|'));
        assert!(sep[1..sep.len() - 1].chars().all(|c| c == '-'));
        assert_eq!(lines.next(), Some("| smtp | 465 | "));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn rendering_is_deterministic() {
        let input = "# T\n\n> q\n\n- [ ] a\n- b\n  - c\n\n**B** and *i*";
        assert_eq!(markdown_to_text(input), markdown_to_text(input));
    }

    #[test]
    fn mixed_document_stays_in_stage_order() {
        let out = markdown_to_text("# Deploy\n\n> note\n\n- [x] built\n- shipped");
        assert_eq!(
            out,
            format!("Deploy\n{}\n┃ note\n[✓] built\n• shipped", "━".repeat(15))
        );
    }
}
