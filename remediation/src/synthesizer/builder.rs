use super::{FixScript, ScriptKind};
use crate::dialect::Dialect;

/// Accumulates a fix script: header comments, numbered steps and warnings.
/// Every identifier goes through [`ScriptBuilder::ident`] so quoting and the
/// matching warning are applied in one place.
pub(crate) struct ScriptBuilder {
    dialect: Dialect,
    schema_name: String,
    table_name: String,
    column_name: String,
    table: String,
    column: String,
    lines: Vec<String>,
    step: usize,
    warnings: Vec<String>,
}

impl ScriptBuilder {
    pub(crate) fn new(dialect: Dialect, schema: &str, table: &str, column: &str) -> Self {
        let mut builder = Self {
            dialect,
            schema_name: schema.to_string(),
            table_name: table.to_string(),
            column_name: column.to_string(),
            table: String::new(),
            column: String::new(),
            lines: Vec::new(),
            step: 0,
            warnings: Vec::new(),
        };
        builder.table = builder.qualified(table);
        builder.column = builder.ident(column);
        builder
    }

    pub(crate) fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Schema-qualified, rendered target table.
    pub(crate) fn table(&self) -> &str {
        &self.table
    }

    /// Rendered target column.
    pub(crate) fn column(&self) -> &str {
        &self.column
    }

    pub(crate) fn table_name(&self) -> &str {
        &self.table_name
    }

    pub(crate) fn column_name(&self) -> &str {
        &self.column_name
    }

    pub(crate) fn ident(&mut self, raw: &str) -> String {
        let (rendered, quoted) = self.dialect.identifier(raw);
        if quoted {
            self.warn(format!(
                "identifier {raw:?} is not a plain SQL identifier and was quoted"
            ));
        }
        rendered
    }

    pub(crate) fn qualified(&mut self, raw_table: &str) -> String {
        let schema = self.schema_name.clone();
        format!("{}.{}", self.ident(&schema), self.ident(raw_table))
    }

    pub(crate) fn comment(&mut self, text: &str) -> &mut Self {
        self.lines.extend(comment_lines(text));
        self
    }

    pub(crate) fn step(&mut self, title: &str, sql: &str) -> &mut Self {
        self.step_header(title);
        self.lines.extend(sql.lines().map(str::to_string));
        self
    }

    /// A step the reviewer has to uncomment deliberately (destructive or
    /// illustrative statements).
    pub(crate) fn commented_step(&mut self, title: &str, sql: &str) -> &mut Self {
        self.step_header(title);
        self.lines
            .extend(text_lines(sql).map(|line| format!("-- {line}")));
        self
    }

    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        if !self.warnings.contains(&message) {
            self.warnings.push(message);
        }
    }

    pub(crate) fn finish(self, kind: ScriptKind) -> FixScript {
        let mut lines = self.lines;
        if !self.warnings.is_empty() {
            lines.push(String::new());
            lines.extend(self.warnings.iter().map(|w| format!("-- Warning: {w}")));
        }

        FixScript {
            kind,
            dialect: self.dialect,
            text: lines.join("\n"),
            warnings: self.warnings,
        }
    }

    fn step_header(&mut self, title: &str) {
        self.step += 1;
        self.lines.push(String::new());
        self.lines.push(format!("-- Step {}: {}", self.step, title));
    }
}

fn text_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().flat_map(|line| line.split('\r'))
}

/// `text` as SQL comment lines; a lone `\r` also starts a new line.
pub(crate) fn comment_lines(text: &str) -> Vec<String> {
    text_lines(text)
        .map(str::trim_end)
        .map(|line| {
            if line.is_empty() {
                "--".to_string()
            } else {
                format!("-- {line}")
            }
        })
        .collect()
}
