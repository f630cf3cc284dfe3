//! Low-level CSV text handling: field escaping and a quote-aware row scanner.

use std::borrow::Cow;

/// One parsed record, possibly spanning several physical lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// 1-based physical line the record starts on.
    pub line: usize,
    pub fields: Vec<String>,
    /// False when the input ended inside a quoted field.
    pub complete: bool,
}

impl Row {
    /// Field `i`, or `""` when the row is shorter.
    pub fn get(&self, i: usize) -> &str {
        self.fields.get(i).map(String::as_str).unwrap_or("")
    }

    /// Field `i` if present and non-empty after trimming.
    pub fn non_empty(&self, i: usize) -> Option<&str> {
        self.fields
            .get(i)
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn needs_quotes(value: &str) -> bool {
    value.contains([',', '"', '\n', '\r'])
}

/// Quotes `value` if it contains a comma, quote or line break, doubling embedded quotes.
pub fn escape_field(value: &str) -> Cow<'_, str> {
    if needs_quotes(value) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Appends one newline-terminated record to `out`.
pub fn write_row<S: AsRef<str>>(out: &mut String, fields: &[S]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape_field(field.as_ref()));
    }
    out.push('\n');
}

/// Splits `input` into records, honouring quoted fields.
///
/// Field boundaries are found by scanning character by character, so commas and
/// line breaks inside quotes stay part of the field. Blank lines are skipped and
/// `\r\n` is accepted as a line ending.
pub fn parse_rows(input: &str) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut has_content = false;
    let mut line = 1;
    let mut start_line = 1;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_quotes = true;
                has_content = true;
            }
            ',' => {
                fields.push(std::mem::take(&mut field));
                has_content = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                if has_content {
                    fields.push(std::mem::take(&mut field));
                    rows.push(Row {
                        line: start_line,
                        fields: std::mem::take(&mut fields),
                        complete: true,
                    });
                }
                field.clear();
                has_content = false;
                line += 1;
                start_line = line;
            }
            _ => {
                field.push(c);
                has_content = true;
            }
        }
    }

    if has_content {
        fields.push(field);
        rows.push(Row {
            line: start_line,
            fields,
            complete: !in_quotes,
        });
    }

    rows
}
