//! # Rendering Module
//!
//! Turns library values into terminal text. Every function here returns a `String`;
//! printing is left to the handlers so the output can be asserted in tests.
//!
//! ## Table Layout
//!
//! Lists are plain column tables. Widths are measured on the raw text with
//! `unicode-width` and padding is added before styling, so escape codes never skew the
//! alignment. Cells longer than [`MAX_CELL`] columns are truncated with `…`.
//!
//! JSON output does not go through here beyond [`json`]: records are serialized as-is.

use super::styles::{for_level, paint, PALETTE};
use chrono::NaiveDate;
use medrecapp::api::DanglingReference;
use medrecapp::codec::Diagnostic;
use medrecapp::deps::DeletionCheck;
use medrecapp::model::{Appointment, Bill, MedicalRecord, Patient, Payment};
use medrecapp::services::CmdMessage;
use serde::Serialize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const MAX_CELL: usize = 32;
const GAP: &str = "  ";

fn truncate_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Cells are single-line: embedded line breaks become spaces.
fn cell(text: &str) -> String {
    let flat = text.replace(['\r', '\n'], " ");
    truncate_to_width(&flat, MAX_CELL)
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

/// Renders a header row plus data rows. The first column is styled as an id.
fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in rows {
        for (i, value) in row.iter().enumerate() {
            widths[i] = widths[i].max(value.width());
        }
    }
    let last = headers.len() - 1;

    let mut out = String::new();
    let header_cells: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let padded = if i == last { h.to_string() } else { pad(h, widths[i]) };
            paint(&PALETTE.header, padded).to_string()
        })
        .collect();
    out.push_str(header_cells.join(GAP).trim_end());
    out.push('\n');

    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let padded = if i == last {
                    value.clone()
                } else {
                    pad(value, widths[i])
                };
                if i == 0 {
                    paint(&PALETTE.id, padded).to_string()
                } else {
                    padded
                }
            })
            .collect();
        out.push_str(cells.join(GAP).trim_end());
        out.push('\n');
    }
    out
}

fn empty(what: &str) -> String {
    format!("{}\n", paint(&PALETTE.muted, format!("No {} found.", what)))
}

fn date_or_dash(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn messages(messages: &[CmdMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("{}\n", paint(for_level(m.level), &m.content)))
        .collect()
}

pub fn patient_table(patients: &[Patient], today: NaiveDate) -> String {
    if patients.is_empty() {
        return empty("patients");
    }
    let rows: Vec<Vec<String>> = patients
        .iter()
        .map(|p| {
            vec![
                p.id.clone(),
                cell(&p.full_name()),
                p.date_of_birth
                    .map(|_| p.age_on(today).to_string())
                    .unwrap_or_else(|| "-".to_string()),
                cell(&p.gender),
                p.blood_type.to_string(),
                if p.is_admitted { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    table(&["ID", "Name", "Age", "Gender", "Blood", "Admitted"], &rows)
}

pub fn appointment_table(appointments: &[Appointment]) -> String {
    if appointments.is_empty() {
        return empty("appointments");
    }
    let rows: Vec<Vec<String>> = appointments
        .iter()
        .map(|a| {
            vec![
                a.id.clone(),
                a.date_time.format("%Y-%m-%d %H:%M").to_string(),
                a.patient_id.clone(),
                cell(&a.patient_name),
                cell(&a.kind),
                a.status.to_string(),
            ]
        })
        .collect();
    table(&["ID", "When", "Patient", "Name", "Type", "Status"], &rows)
}

pub fn bill_table(bills: &[Bill]) -> String {
    if bills.is_empty() {
        return empty("bills");
    }
    let rows: Vec<Vec<String>> = bills
        .iter()
        .map(|b| {
            vec![
                b.id.clone(),
                b.date_issued.to_string(),
                b.patient_id.clone(),
                cell(&b.patient_name),
                b.total_amount.to_string(),
                b.amount_paid.to_string(),
                b.balance().to_string(),
                b.status.clone(),
                date_or_dash(b.date_paid),
            ]
        })
        .collect();
    table(
        &[
            "ID", "Issued", "Patient", "Name", "Total", "Paid", "Balance", "Status", "Paid on",
        ],
        &rows,
    )
}

pub fn payment_table(payments: &[Payment]) -> String {
    if payments.is_empty() {
        return empty("payments");
    }
    let rows: Vec<Vec<String>> = payments
        .iter()
        .map(|p| {
            vec![
                p.id.clone(),
                p.paid_at.format("%Y-%m-%d %H:%M").to_string(),
                p.bill_id.clone(),
                p.amount.to_string(),
                cell(&p.method),
                p.status.to_string(),
            ]
        })
        .collect();
    table(&["ID", "When", "Bill", "Amount", "Method", "Status"], &rows)
}

pub fn medical_record_table(records: &[MedicalRecord]) -> String {
    if records.is_empty() {
        return empty("medical records");
    }
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.id.clone(),
                date_or_dash(r.record_date),
                r.patient_id.clone(),
                cell(&r.patient_name),
                cell(&r.diagnosis),
                cell(&r.notes),
            ]
        })
        .collect();
    table(&["ID", "Date", "Patient", "Name", "Diagnosis", "Notes"], &rows)
}

pub fn patient_detail(
    patient: &Patient,
    appointments: &[Appointment],
    bills: &[Bill],
    history: &[MedicalRecord],
    today: NaiveDate,
) -> String {
    let mut out = format!(
        "{} {}\n",
        paint(&PALETTE.id, &patient.id),
        paint(&PALETTE.title, patient.full_name())
    );

    let born = match patient.date_of_birth {
        Some(dob) => format!("{} (age {})", dob, patient.age_on(today)),
        None => "-".to_string(),
    };
    let fields = [
        ("Born", born),
        ("Gender", patient.gender.clone()),
        ("Phone", patient.contact_number.clone()),
        ("Address", patient.address.replace('\n', ", ")),
        ("Blood type", patient.blood_type.to_string()),
        (
            "Admitted",
            if patient.is_admitted { "yes" } else { "no" }.to_string(),
        ),
    ];
    for (label, value) in fields {
        let value = if value.is_empty() { "-".to_string() } else { value };
        out.push_str(&format!(
            "  {} {}\n",
            paint(&PALETTE.muted, pad(&format!("{}:", label), 11)),
            value
        ));
    }

    out.push('\n');
    out.push_str(&format!("{}\n", paint(&PALETTE.title, "Appointments")));
    out.push_str(&appointment_table(appointments));
    out.push('\n');
    out.push_str(&format!("{}\n", paint(&PALETTE.title, "Bills")));
    out.push_str(&bill_table(bills));
    out.push('\n');
    out.push_str(&format!("{}\n", paint(&PALETTE.title, "Medical records")));
    out.push_str(&medical_record_table(history));
    out
}

pub fn deletion_check(check: &DeletionCheck) -> String {
    if check.allowed() {
        return format!(
            "{}\n",
            paint(
                &PALETTE.success,
                format!("Patient {} can be deleted", check.patient_id)
            )
        );
    }
    let mut out = format!(
        "{}\n",
        paint(
            &PALETTE.warning,
            format!("Patient {} cannot be deleted:", check.patient_id)
        )
    );
    for reason in &check.blocking {
        out.push_str(&format!(
            "  {} {}\n",
            reason,
            paint(&PALETTE.muted, reason.ids.join(", "))
        ));
    }
    out
}

pub fn doctor(report: &[Diagnostic], dangling: &[DanglingReference]) -> String {
    if report.is_empty() && dangling.is_empty() {
        return format!("{}\n", paint(&PALETTE.success, "No problems found"));
    }
    let mut out = String::new();
    if !report.is_empty() {
        out.push_str(&format!("{}\n", paint(&PALETTE.title, "Load problems")));
        for d in report {
            let style = if d.skipped {
                &PALETTE.error
            } else {
                &PALETTE.warning
            };
            out.push_str(&format!("  {}\n", paint(style, d)));
        }
    }
    if !dangling.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("{}\n", paint(&PALETTE.title, "Missing patients")));
        for r in dangling {
            out.push_str(&format!(
                "  {} {} refers to {}\n",
                r.kind,
                paint(&PALETTE.id, &r.id),
                r.patient_id
            ));
        }
    }
    out
}

/// Fallback for values with no text layout, and the whole of `--output json`.
pub fn json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    Ok(text)
}
