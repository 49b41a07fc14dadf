use common::models::{Column, QualityIssue};

use super::builder::comment_lines;
use super::{FixScript, FixScriptSynthesizer};

pub const BATCH_DIVIDER: &str =
    "-- ============================================================";

/// Every issue of every column, in column then issue order, with the script
/// for each issue produced by `script_for`.
pub(super) fn render_with<F>(synth: &FixScriptSynthesizer, columns: &[Column], mut script_for: F) -> String
where
    F: FnMut(&Column, &QualityIssue) -> FixScript,
{
    let mut out = comment_lines(&format!(
        "Suggested fixes for {}.{} ({})",
        synth.schema(),
        synth.asset_name(),
        synth.dialect()
    ));
    out.push(
        "-- Statements run independently; there is no transactional guarantee across blocks."
            .to_string(),
    );

    let mut blocks = Vec::new();
    for column in columns {
        for issue in &column.quality_issues {
            let script = script_for(column, issue);
            let mut block = comment_lines(&format!("{}: {}", column.column_name, issue.issue_type));
            block.push(script.text);
            blocks.push(block.join("\n"));
        }
    }

    if blocks.is_empty() {
        out.push("-- No quality issues found".to_string());
        return out.join("\n");
    }

    for block in blocks {
        out.push(String::new());
        out.push(BATCH_DIVIDER.to_string());
        out.push(block);
    }
    out.join("\n")
}

/// Supplied scripts are used verbatim.
pub(super) fn render(synth: &FixScriptSynthesizer, columns: &[Column]) -> String {
    render_with(synth, columns, |column, issue| synth.resolve(column, issue))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::synthesizer::ScriptKind;

    #[test]
    fn no_issues_yields_header_and_note() {
        let synth = FixScriptSynthesizer::new("orders", None, Dialect::Postgres);
        let text = render(&synth, &[Column::new("id"), Column::new("total")]);
        assert!(text.starts_with("-- Suggested fixes for public.orders"));
        assert!(text.ends_with("-- No quality issues found"));
        assert!(!text.contains(BATCH_DIVIDER));
    }

    #[test]
    fn one_block_per_issue_in_order() {
        let synth = FixScriptSynthesizer::new("orders", Some("sales"), Dialect::MySql);
        let columns = vec![
            Column::new("email")
                .with_issue(QualityIssue::new("null_values"))
                .with_issue(QualityIssue::new("duplicate_values")),
            Column::new("total").with_issue(
                QualityIssue::new("outlier_values").with_fix_script("UPDATE orders SET total = 0;"),
            ),
        ];

        let text = render(&synth, &columns);
        assert_eq!(text.matches(BATCH_DIVIDER).count(), 3);

        let nulls = text.find("-- email: null_values").unwrap();
        let dups = text.find("-- email: duplicate_values").unwrap();
        let outliers = text.find("-- total: outlier_values\nUPDATE orders SET total = 0;").unwrap();
        assert!(nulls < dups && dups < outliers);
        assert!(text.contains("DELETE t1 FROM sales.orders t1"));
    }

    #[test]
    fn issue_and_column_text_stay_inside_comments() {
        let synth = FixScriptSynthesizer::new("orders", None, Dialect::Postgres);
        let columns = vec![
            Column::new("email").with_issue(QualityIssue::new("stale\nDROP TABLE orders;")),
            Column::new("note\r\nTRUNCATE orders;").with_issue(
                QualityIssue::new("null_values").with_fix_script("UPDATE orders SET note = '';"),
            ),
        ];

        let text = render(&synth, &columns);
        assert!(!text.lines().any(|l| l.trim() == "DROP TABLE orders;"));
        assert!(!text.lines().any(|l| l.trim() == "TRUNCATE orders;"));
        assert!(text.contains("-- email: stale\n-- DROP TABLE orders;"));
        assert!(text.contains("-- TRUNCATE orders;: null_values\nUPDATE orders SET note = '';"));
    }

    #[test]
    fn custom_script_source_keeps_layout() {
        let synth = FixScriptSynthesizer::new("orders", None, Dialect::MySql);
        let columns = vec![Column::new("email").with_issue(QualityIssue::new("null_values"))];
        let text = render_with(&synth, &columns, |column, issue| FixScript {
            kind: ScriptKind::Diagnostic,
            dialect: Dialect::MySql,
            text: format!("SELECT '{}/{}';", column.column_name, issue.issue_type),
            warnings: Vec::new(),
        });
        assert!(text.ends_with(&format!("{BATCH_DIVIDER}\n-- email: null_values\nSELECT 'email/null_values';")));
    }
}
