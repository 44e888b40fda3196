//! Read-back of the session log for the parent settings panel.
//!
//! Best effort only: a missing, unreadable or partly garbled log yields `None` or
//! simply fewer rows, never an error.

use std::path::Path;

use serde::Serialize;

/// One parsed log row.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LogRow {
    pub timestamp: String,
    pub source: String,
    pub success: bool,
    pub joke_len: usize,
    pub extra: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionStats {
    rows: Vec<LogRow>,
}

impl SessionStats {
    pub fn load(path: &Path) -> Option<Self> {
        let text = std::fs::read_to_string(path).ok()?;
        Some(Self::parse(&text))
    }

    pub fn parse(text: &str) -> Self {
        let rows = text
            .lines()
            .skip(1)
            .filter_map(parse_row)
            .collect();
        Self { rows }
    }

    pub fn total(&self) -> usize {
        self.rows.len()
    }

    /// Percentage (0..=100) of rows that came from the API.
    pub fn api_success_rate(&self) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        let ok = self.rows.iter().filter(|r| r.success).count();
        ok as f64 * 100.0 / self.rows.len() as f64
    }

    pub fn average_joke_len(&self) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        let sum: usize = self.rows.iter().map(|r| r.joke_len).sum();
        sum as f64 / self.rows.len() as f64
    }

    /// Most recent `n` rows, oldest first.
    pub fn tail(&self, n: usize) -> &[LogRow] {
        let start = self.rows.len().saturating_sub(n);
        &self.rows[start..]
    }
}

fn parse_row(line: &str) -> Option<LogRow> {
    let fields = split_csv_line(line);
    let [timestamp, source, success, joke_len, extra]: [String; 5] = fields.try_into().ok()?;
    let success = match success.to_ascii_lowercase().as_str() {
        "true" | "1" => true,
        "false" | "0" => false,
        _ => return None,
    };
    let joke_len = joke_len.trim().parse().ok()?;
    Some(LogRow { timestamp, source, success, joke_len, extra })
}

fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            ('"', _) => in_quotes = !in_quotes,
            (',', false) => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "timestamp,source,success,joke_len,session_id\n\
        2024-05-01T10:00:00.000000Z,api,true,40,web-1\n\
        2024-05-01T10:00:05.000000Z,offline,false,20,web-1\n\
        garbage line\n\
        2024-05-01T10:00:09.000000Z,api,True,30,\"web,2\"\n";

    #[test]
    fn computes_rate_and_average() {
        let stats = SessionStats::parse(SAMPLE);
        assert_eq!(stats.total(), 3);
        assert!((stats.api_success_rate() - 200.0 / 3.0).abs() < 1e-9);
        assert!((stats.average_joke_len() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn quoted_fields_unescape() {
        let stats = SessionStats::parse(SAMPLE);
        assert_eq!(stats.tail(1)[0].extra, "web,2");
        assert_eq!(split_csv_line(r#"a,"say ""hi""",c"#), vec!["a", "say \"hi\"", "c"]);
    }

    #[test]
    fn tail_is_bounded() {
        let stats = SessionStats::parse(SAMPLE);
        assert_eq!(stats.tail(50).len(), 3);
        assert_eq!(stats.tail(2)[0].source, "offline");
    }

    #[test]
    fn missing_file_is_none_and_empty_log_is_zero() {
        assert!(SessionStats::load(Path::new("/nonexistent/joke/log.csv")).is_none());
        let stats = SessionStats::parse("timestamp,source,success,joke_len,chaos\n");
        assert_eq!(stats.total(), 0);
        assert_eq!(stats.api_success_rate(), 0.0);
        assert_eq!(stats.average_joke_len(), 0.0);
    }
}
