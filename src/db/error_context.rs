//! Rich error context extracted from PostgreSQL errors raised while a migration
//! script runs. The one-line summary is what ends up in the ledger's `reason`.

use sqlx::postgres::{PgDatabaseError, PgErrorPosition};

#[derive(Debug, Clone, Default)]
pub struct SqlErrorContext {
    pub message: String,
    /// Line in the script, converted from PostgreSQL's 1-indexed character position
    pub line_number: Option<usize>,
    pub detail: Option<String>,
    pub hint: Option<String>,
    /// PL/pgSQL call stack or similar
    pub context: Option<String>,
    /// SQLSTATE, e.g. "42P01" for undefined_table
    pub code: Option<String>,
}

impl SqlErrorContext {
    pub fn from_sqlx_error(error: &sqlx::Error, sql_content: &str) -> Self {
        if let Some(db_error) = error.as_database_error()
            && let Some(pg_error) = db_error.try_downcast_ref::<PgDatabaseError>()
        {
            let line_number = pg_error.position().map(|pos| {
                let position = match pos {
                    PgErrorPosition::Original(p) => p,
                    PgErrorPosition::Internal { position, .. } => position,
                };
                position_to_line(sql_content, position)
            });

            return Self {
                message: pg_error.message().to_string(),
                line_number,
                detail: pg_error.detail().map(|s| s.to_string()),
                hint: pg_error.hint().map(|s| s.to_string()),
                context: pg_error.r#where().map(|s| s.to_string()),
                code: Some(pg_error.code().to_string()),
            };
        }

        Self {
            message: error.to_string(),
            ..Self::default()
        }
    }

    /// Single-line description suitable for the ledger
    pub fn summary(&self) -> String {
        let mut msg = self.message.clone();
        if let Some(code) = &self.code {
            msg.push_str(&format!(" [{}]", code));
        }
        if let Some(line) = self.line_number {
            msg.push_str(&format!(" at line {}", line));
        }
        if let Some(detail) = &self.detail {
            msg.push_str(&format!("; detail: {}", detail));
        }
        if let Some(hint) = &self.hint {
            msg.push_str(&format!("; hint: {}", hint));
        }
        msg
    }

    /// Multi-line report with the offending lines of the script
    pub fn format(&self, script: &str, sql_content: &str) -> String {
        let mut msg = format!("SQL error in '{}'", script);
        if let Some(line) = self.line_number {
            msg.push_str(&format!(" at line {}", line));
        }
        msg.push_str(&format!(":\n\n  {}\n", self.message));

        if let Some(detail) = &self.detail {
            msg.push_str(&format!("\n  Detail: {}", detail));
        }
        if let Some(hint) = &self.hint {
            msg.push_str(&format!("\n  Hint: {}", hint));
        }
        if let Some(ctx) = &self.context {
            msg.push_str(&format!("\n  Context: {}", ctx));
        }
        if let Some(line) = self.line_number {
            msg.push_str(&format!("\n\n{}", format_line_context(sql_content, line)));
        }

        msg
    }
}

/// Convert 1-indexed character position to line number
pub fn position_to_line(content: &str, position: usize) -> usize {
    content
        .chars()
        .take(position.saturating_sub(1))
        .filter(|c| *c == '\n')
        .count()
        + 1
}

/// Show up to three lines on either side of the failing line
pub fn format_line_context(content: &str, error_line: usize) -> String {
    const CONTEXT_LINES: usize = 3;

    let lines: Vec<&str> = content.lines().collect();
    let error_idx = error_line.saturating_sub(1);
    let start_idx = error_idx.saturating_sub(CONTEXT_LINES).min(lines.len());
    let end_idx = (error_idx + CONTEXT_LINES + 1).min(lines.len());

    lines[start_idx..end_idx]
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            let line_num = start_idx + idx + 1;
            let marker = if line_num == error_line { ">" } else { " " };
            format!("  {} {:4} | {}", marker, line_num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
