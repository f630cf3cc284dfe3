//! # Persistence Codec
//!
//! Each record kind is stored as one CSV file: a header line naming the fields, then one
//! record per row. The codec turns a full collection into that text and back.
//!
//! ## Escaping
//!
//! There is exactly one escaping rule. A field containing a comma, a double quote or a
//! line break is wrapped in double quotes, and embedded quotes are doubled (`"` → `""`).
//! Parsing re-derives field boundaries with a quote-aware scanner ([`csv::parse_rows`]),
//! never by splitting on commas, so a quoted field may span several physical lines.
//!
//! ## Tolerant Loading
//!
//! Loading never fails as a whole because of one bad record:
//!
//! - A row shorter than the kind's mandatory prefix, with an empty id, with an
//!   unparsable mandatory value (a date), or with an id already seen is **skipped**.
//! - Optional trailing fields **default** when absent. When present but invalid they
//!   also default, and the replacement is noted.
//!
//! Every skip and every replacement becomes a [`Diagnostic`] in the [`Decoded`] result,
//! and is logged at `warn` level.
//!
//! Text that was not valid UTF-8 on disk reaches the decoder with `U+FFFD` in place of
//! the bad bytes. Such a record is kept, and noted so the damage can be fixed by hand.
//!
//! ## Layouts
//!
//! ```text
//! patients.csv         id,firstName,lastName,dateOfBirth,gender,contactNumber,address,bloodType,isAdmitted
//! appointments.csv     id,patientId,patientName,type,dateTime,status
//! bills.csv            billId,patientId,patientName,dateIssued,datePaid,status,totalAmount,amountPaid
//! medical_records.csv  id,patientId,patientName,diagnosis,notes,recordDate
//! payments.csv         id,billId,amount,paymentDateTime,paymentMethod,status
//! ```
//!
//! Dates are `yyyy-MM-dd`, date-times `yyyy-MM-dd HH:mm:ss`, booleans `true`/`false`,
//! amounts fixed at two decimal places.

use crate::model::{Record, RecordKind};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

pub mod csv;
mod appointments;
mod bills;
mod medical_records;
mod patients;
mod payments;

pub use csv::Row;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A record kind that can be written to and read from a CSV row.
pub trait CsvRecord: Record + Sized {
    /// Column names, in order.
    const HEADER: &'static [&'static str];

    /// Number of leading fields a row must have to be considered at all.
    const REQUIRED_FIELDS: usize;

    fn to_row(&self) -> Vec<String>;

    /// Builds a record from a row that has at least `REQUIRED_FIELDS` fields.
    ///
    /// Returns the reason when the row must be skipped. Defaults applied to invalid
    /// optional values are pushed onto `notes`.
    fn from_row(row: &Row, notes: &mut Vec<String>) -> Result<Self, String>;
}

/// Something worth reporting that happened while loading a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: RecordKind,
    pub line: usize,
    pub message: String,
    /// True when the record was dropped, false when it was kept with defaults.
    pub skipped: bool,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = if self.skipped { "skipped" } else { "kept" };
        write!(
            f,
            "{} line {} ({}): {}",
            self.kind.file_name(),
            self.line,
            action,
            self.message
        )
    }
}

/// The outcome of decoding one file.
#[derive(Debug)]
pub struct Decoded<T> {
    pub records: Vec<T>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Serializes the full collection, header first.
pub fn encode<T: CsvRecord>(records: &[T]) -> String {
    let mut out = String::new();
    csv::write_row(&mut out, T::HEADER);
    for record in records {
        csv::write_row(&mut out, &record.to_row());
    }
    out
}

/// Parses a whole file. The first row is always taken as the header.
pub fn decode<T: CsvRecord>(text: &str) -> Decoded<T> {
    let kind = T::KIND;
    let mut records = Vec::new();
    let mut diagnostics = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    let mut rows = csv::parse_rows(text).into_iter();

    if let Some(header) = rows.next() {
        if header.fields.iter().map(String::as_str).ne(T::HEADER.iter().copied()) {
            diagnostics.push(Diagnostic {
                kind,
                line: header.line,
                message: format!("unexpected header '{}'", header.fields.join(",")),
                skipped: false,
            });
        }
    }

    for row in rows {
        let skip = |message: String| Diagnostic {
            kind,
            line: row.line,
            message,
            skipped: true,
        };

        if !row.complete {
            diagnostics.push(skip("unterminated quoted field".to_string()));
            continue;
        }
        if row.len() < T::REQUIRED_FIELDS {
            diagnostics.push(skip(format!(
                "expected at least {} fields, found {}",
                T::REQUIRED_FIELDS,
                row.len()
            )));
            continue;
        }

        let mut notes = Vec::new();
        match T::from_row(&row, &mut notes) {
            Ok(record) => {
                if !seen.insert(record.id().to_string()) {
                    diagnostics.push(skip(format!("duplicate id {}", record.id())));
                    continue;
                }
                if row
                    .fields
                    .iter()
                    .any(|f| f.contains(char::REPLACEMENT_CHARACTER))
                {
                    notes.push(format!(
                        "{}: contains bytes that were not valid UTF-8",
                        record.id()
                    ));
                }
                diagnostics.extend(notes.into_iter().map(|message| Diagnostic {
                    kind,
                    line: row.line,
                    message,
                    skipped: false,
                }));
                records.push(record);
            }
            Err(reason) => diagnostics.push(skip(reason)),
        }
    }

    for d in &diagnostics {
        tracing::warn!(kind = %kind, line = d.line, skipped = d.skipped, "{}", d.message);
    }

    Decoded {
        records,
        diagnostics,
    }
}

/// Parses an optional boolean column. Only `true` (any case) is true.
fn parse_flag(row: &Row, i: usize, column: &str, notes: &mut Vec<String>) -> bool {
    match row.non_empty(i) {
        None => false,
        Some(v) if v.eq_ignore_ascii_case("true") => true,
        Some(v) if v.eq_ignore_ascii_case("false") => false,
        Some(v) => {
            notes.push(format!("{} '{}' is not a boolean, using false", column, v));
            false
        }
    }
}
