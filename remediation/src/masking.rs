use serde::Serialize;

use crate::dialect::Dialect;

/// Masking shape applied to a PII value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskPattern {
    Ssn,
    CreditCard,
    Email,
    Phone,
    ZipCode,
    DateOfBirth,
    Default,
}

/// SQL expression masking `value` (an already rendered column reference)
/// for the given dialect.
pub fn masking_expression(pattern: MaskPattern, dialect: Dialect, value: &str) -> String {
    let v = value;
    match (pattern, dialect) {
        (MaskPattern::Ssn, Dialect::Postgres) => format!("'XXX-XX-' || RIGHT({v}::text, 4)"),
        (MaskPattern::Ssn, Dialect::SqlServer) => {
            format!("'XXX-XX-' + RIGHT(CAST({v} AS NVARCHAR(20)), 4)")
        }
        (MaskPattern::Ssn, Dialect::MySql) => format!("CONCAT('XXX-XX-', RIGHT({v}, 4))"),

        (MaskPattern::CreditCard, Dialect::Postgres) => format!(
            "'XXXX-XXXX-XXXX-' || RIGHT(REGEXP_REPLACE({v}::text, '[^0-9]', '', 'g'), 4)"
        ),
        (MaskPattern::CreditCard, Dialect::SqlServer) => format!(
            "'XXXX-XXXX-XXXX-' + RIGHT(REPLACE(REPLACE(CAST({v} AS NVARCHAR(32)), '-', ''), ' ', ''), 4)"
        ),
        (MaskPattern::CreditCard, Dialect::MySql) => format!(
            "CONCAT('XXXX-XXXX-XXXX-', RIGHT(REPLACE(REPLACE({v}, '-', ''), ' ', ''), 4))"
        ),

        (MaskPattern::Email, Dialect::Postgres) => format!(
            "LEFT(SPLIT_PART({v}, '@', 1), 1) || '***@' || SPLIT_PART({v}, '@', 2)"
        ),
        (MaskPattern::Email, Dialect::SqlServer) => format!(
            "LEFT({v}, 1) + '***@' + SUBSTRING({v}, CHARINDEX('@', {v}) + 1, LEN({v}))"
        ),
        (MaskPattern::Email, Dialect::MySql) => format!(
            "CONCAT(LEFT(SUBSTRING_INDEX({v}, '@', 1), 1), '***@', SUBSTRING_INDEX({v}, '@', -1))"
        ),

        (MaskPattern::Phone, Dialect::Postgres) => format!(
            "'XXX-XXX-' || RIGHT(REGEXP_REPLACE({v}::text, '[^0-9]', '', 'g'), 4)"
        ),
        (MaskPattern::Phone, Dialect::SqlServer) => {
            format!("'XXX-XXX-' + RIGHT(CAST({v} AS NVARCHAR(32)), 4)")
        }
        (MaskPattern::Phone, Dialect::MySql) => format!("CONCAT('XXX-XXX-', RIGHT({v}, 4))"),

        (MaskPattern::ZipCode, Dialect::Postgres) => format!("LEFT({v}::text, 3) || 'XX'"),
        (MaskPattern::ZipCode, Dialect::SqlServer) => {
            format!("LEFT(CAST({v} AS NVARCHAR(10)), 3) + 'XX'")
        }
        (MaskPattern::ZipCode, Dialect::MySql) => format!("CONCAT(LEFT({v}, 3), 'XX')"),

        (MaskPattern::DateOfBirth, Dialect::Postgres) => {
            format!("TO_CHAR({v}::date, 'YYYY') || '-XX-XX'")
        }
        (MaskPattern::DateOfBirth, Dialect::SqlServer) => {
            format!("CAST(YEAR({v}) AS NVARCHAR(4)) + '-XX-XX'")
        }
        (MaskPattern::DateOfBirth, Dialect::MySql) => format!("CONCAT(YEAR({v}), '-XX-XX')"),

        (MaskPattern::Default, Dialect::Postgres) => format!(
            "LEFT({v}::text, 2) || REPEAT('*', GREATEST(LENGTH({v}::text) - 2, 0))"
        ),
        (MaskPattern::Default, Dialect::SqlServer) => format!(
            "LEFT(CAST({v} AS NVARCHAR(MAX)), 2) + REPLICATE('*', CASE WHEN LEN({v}) > 2 THEN LEN({v}) - 2 ELSE 0 END)"
        ),
        (MaskPattern::Default, Dialect::MySql) => format!(
            "CONCAT(LEFT({v}, 2), REPEAT('*', GREATEST(CHAR_LENGTH({v}) - 2, 0)))"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_masking_uses_dialect_functions() {
        assert!(masking_expression(MaskPattern::Email, Dialect::Postgres, "email").contains("SPLIT_PART"));
        assert!(masking_expression(MaskPattern::Email, Dialect::SqlServer, "email").contains("CHARINDEX"));
        assert!(
            masking_expression(MaskPattern::Email, Dialect::MySql, "email").contains("SUBSTRING_INDEX")
        );
    }

    #[test]
    fn every_pattern_references_the_value() {
        let patterns = [
            MaskPattern::Ssn,
            MaskPattern::CreditCard,
            MaskPattern::Email,
            MaskPattern::Phone,
            MaskPattern::ZipCode,
            MaskPattern::DateOfBirth,
            MaskPattern::Default,
        ];
        for pattern in patterns {
            for dialect in [Dialect::Postgres, Dialect::SqlServer, Dialect::MySql] {
                let expr = masking_expression(pattern, dialect, "tax_id");
                assert!(expr.contains("tax_id"), "{pattern:?}/{dialect:?}: {expr}");
            }
        }
    }

    #[test]
    fn postgres_concatenates_with_pipes() {
        assert_eq!(
            masking_expression(MaskPattern::Ssn, Dialect::Postgres, "ssn"),
            "'XXX-XX-' || RIGHT(ssn::text, 4)"
        );
        assert!(masking_expression(MaskPattern::Ssn, Dialect::MySql, "ssn").starts_with("CONCAT("));
    }
}
