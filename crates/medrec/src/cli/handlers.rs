//! Command handlers for the medrec CLI.
//!
//! One handler per command group. Each one calls [`RecordsApi`], then hands the result to
//! [`AppState`] to print in the selected output mode. Errors bubble up to `main`, which
//! prints them and exits non-zero.

use super::render;
use super::setup::{
    AppointmentCommands, BillCommands, OutputMode, PatientCommands, PatientDetails,
    RecordCommands,
};
use anyhow::{bail, Result};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use medrecapp::api::RecordsApi;
use medrecapp::error::MedrecError;
use medrecapp::model::RecordKind;
use medrecapp::services::{
    AppointmentDraft, BillDraft, MedicalRecordDraft, Outcome, PatientDraft, PatientUpdate,
    PaymentDraft,
};
use medrecapp::store::FsBackend;
use serde::Serialize;
use serde_json::json;

/// Everything a handler needs: the opened records and how to print.
pub struct AppState {
    pub api: RecordsApi<FsBackend>,
    pub output: OutputMode,
}

impl AppState {
    pub fn new(api: RecordsApi<FsBackend>, output: OutputMode) -> Self {
        Self { api, output }
    }

    fn is_json(&self) -> bool {
        self.output == OutputMode::Json
    }

    /// Prints a mutation result: the messages in text mode, the whole outcome as JSON.
    fn emit_outcome<T: Serialize>(&self, action: &str, outcome: &Outcome<T>) -> Result<()> {
        if self.is_json() {
            print!(
                "{}",
                render::json(&json!({
                    "action": action,
                    "record": outcome.record,
                    "messages": outcome.messages,
                }))?
            );
        } else {
            print!("{}", render::messages(&outcome.messages));
        }
        Ok(())
    }

    fn emit<T: Serialize + ?Sized>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        if self.is_json() {
            print!("{}", render::json(value)?);
        } else {
            print!("{}", text());
        }
        Ok(())
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Local wall-clock time, to the second the CSV files can hold.
fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

fn draft_from(first_name: String, last_name: String, details: PatientDetails) -> PatientDraft {
    PatientDraft {
        first_name,
        last_name,
        date_of_birth: details.dob,
        gender: details.gender.unwrap_or_default(),
        contact_number: details.phone.unwrap_or_default(),
        address: details.address.unwrap_or_default(),
        blood_type: details.blood_type.unwrap_or_default(),
    }
}

pub fn patient(state: &mut AppState, action: PatientCommands) -> Result<()> {
    match action {
        PatientCommands::Register {
            first_name,
            last_name,
            details,
        } => {
            let draft = draft_from(first_name, last_name, details);
            let outcome = state.api.register_patient(draft)?;
            state.emit_outcome("register", &outcome)
        }
        PatientCommands::List { admitted } => {
            let patients = if admitted {
                state.api.admitted_patients()
            } else {
                state.api.list_patients()
            };
            state.emit(&patients, || render::patient_table(&patients, today()))
        }
        PatientCommands::Show { id } => {
            let patient = state
                .api
                .find_patient(&id)
                .ok_or_else(|| MedrecError::not_found(RecordKind::Patient, &id))?;
            let appointments = state.api.appointments_for_patient(&id);
            let bills = state.api.bills_for_patient(&id);
            let history = state.api.medical_records_for_patient(&id);
            let value = json!({
                "patient": patient,
                "appointments": appointments,
                "bills": bills,
                "medical_records": history,
            });
            state.emit(&value, || {
                render::patient_detail(&patient, &appointments, &bills, &history, today())
            })
        }
        PatientCommands::Search { term } => {
            let patients = state.api.search_patients(&term);
            state.emit(&patients, || render::patient_table(&patients, today()))
        }
        PatientCommands::Update {
            id,
            first_name,
            last_name,
            details,
            clear_dob,
        } => {
            let date_of_birth = if clear_dob {
                Some(None)
            } else {
                details.dob.map(Some)
            };
            let update = PatientUpdate {
                first_name,
                last_name,
                date_of_birth,
                gender: details.gender,
                contact_number: details.phone,
                address: details.address,
                blood_type: details.blood_type,
            };
            if update.is_empty() {
                bail!("Nothing to update for {}: pass at least one field", id);
            }
            let outcome = state.api.update_patient(&id, update)?;
            state.emit_outcome("update", &outcome)
        }
        PatientCommands::BloodType { id, value } => {
            let outcome = state.api.update_medical_info(&id, &value)?;
            state.emit_outcome("blood-type", &outcome)
        }
        PatientCommands::Admit { id } => {
            let outcome = state.api.admit_patient(&id)?;
            state.emit_outcome("admit", &outcome)
        }
        PatientCommands::Discharge { id } => {
            let outcome = state.api.discharge_patient(&id)?;
            state.emit_outcome("discharge", &outcome)
        }
        PatientCommands::Check { id } => {
            let check = state.api.can_delete_patient(&id)?;
            state.emit(&check, || render::deletion_check(&check))
        }
        PatientCommands::Delete { id } => {
            let outcome = state.api.delete_patient(&id)?;
            state.emit_outcome("delete", &outcome)
        }
    }
}

pub fn appointment(state: &mut AppState, action: AppointmentCommands) -> Result<()> {
    match action {
        AppointmentCommands::Schedule {
            patient_id,
            kind,
            at,
            status,
        } => {
            let mut draft = AppointmentDraft::new(patient_id, kind, at);
            draft.status = status;
            let outcome = state.api.schedule_appointment(draft)?;
            state.emit_outcome("schedule", &outcome)
        }
        AppointmentCommands::List { patient } => {
            let appointments = match patient {
                Some(id) => state.api.appointments_for_patient(&id),
                None => state.api.list_appointments(),
            };
            state.emit(&appointments, || render::appointment_table(&appointments))
        }
        AppointmentCommands::Status { id, status } => {
            let outcome = state.api.set_appointment_status(&id, status)?;
            state.emit_outcome("status", &outcome)
        }
        AppointmentCommands::Reschedule { id, at } => {
            let outcome = state.api.reschedule_appointment(&id, at)?;
            state.emit_outcome("reschedule", &outcome)
        }
        AppointmentCommands::Delete { id } => {
            let outcome = state.api.delete_appointment(&id)?;
            state.emit_outcome("delete", &outcome)
        }
    }
}

pub fn bill(state: &mut AppState, action: BillCommands) -> Result<()> {
    match action {
        BillCommands::Issue {
            patient_id,
            amount,
            date,
        } => {
            let draft = BillDraft::new(patient_id, amount, date.unwrap_or_else(today));
            let outcome = state.api.issue_bill(draft)?;
            state.emit_outcome("issue", &outcome)
        }
        BillCommands::Pay {
            id,
            amount,
            date,
            method,
        } => {
            let paid_at = date
                .map(|d| d.and_time(NaiveTime::MIN))
                .unwrap_or_else(now);
            let draft = PaymentDraft::new(amount, paid_at).with_method(method);
            let outcome = state.api.record_payment(&id, draft)?;
            state.emit_outcome("pay", &outcome)
        }
        BillCommands::List { patient, unpaid } => {
            let mut bills = match patient {
                Some(id) => state.api.bills_for_patient(&id),
                None => state.api.list_bills(),
            };
            if unpaid {
                bills.retain(|b| !b.is_settled());
            }
            state.emit(&bills, || render::bill_table(&bills))
        }
        BillCommands::Payments { id } => {
            let payments = match id {
                // A deleted bill's payments are still listed
                Some(id) => {
                    let found = state.api.payments_for_bill(&id);
                    if found.is_empty() && state.api.find_bill(&id).is_none() {
                        return Err(MedrecError::not_found(RecordKind::Bill, &id).into());
                    }
                    found
                }
                None => state.api.list_payments(),
            };
            state.emit(&payments, || render::payment_table(&payments))
        }
        BillCommands::Delete { id } => {
            let outcome = state.api.delete_bill(&id)?;
            state.emit_outcome("delete", &outcome)
        }
    }
}

pub fn record(state: &mut AppState, action: RecordCommands) -> Result<()> {
    match action {
        RecordCommands::Add {
            patient_id,
            diagnosis,
            notes,
            date,
        } => {
            let mut draft =
                MedicalRecordDraft::new(patient_id, diagnosis, date.unwrap_or_else(today));
            if let Some(notes) = notes {
                draft = draft.with_notes(notes);
            }
            let outcome = state.api.add_medical_record(draft)?;
            state.emit_outcome("add", &outcome)
        }
        RecordCommands::List { patient } => {
            let records = match patient {
                Some(id) => state.api.medical_records_for_patient(&id),
                None => state.api.list_medical_records(),
            };
            state.emit(&records, || render::medical_record_table(&records))
        }
        RecordCommands::Annotate { id, notes } => {
            let outcome = state.api.annotate_medical_record(&id, &notes)?;
            state.emit_outcome("annotate", &outcome)
        }
        RecordCommands::Delete { id } => {
            let outcome = state.api.delete_medical_record(&id)?;
            state.emit_outcome("delete", &outcome)
        }
    }
}

pub fn doctor(state: &AppState) -> Result<()> {
    let report = state.api.load_report();
    let dangling = state.api.dangling_references();
    let value = json!({
        "load_report": report,
        "dangling_references": dangling,
    });
    state.emit(&value, || render::doctor(report, &dangling))
}
