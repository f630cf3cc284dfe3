//! # API Facade
//!
//! The API layer is the single entry point for every records operation, regardless of
//! the UI being used.
//!
//! ## Role and Responsibilities
//!
//! The facade:
//! - **Owns** the four services and nothing else holds them
//! - **Enforces cross-kind rules**: a patient must exist before an appointment, bill or
//!   medical record refers to it, and may not be deleted while anything still does
//! - **Returns owned snapshots** (`Outcome<T>`, `Vec<T>`, `Option<T>`). Callers keep ids,
//!   not references, and re-fetch when they need fresh data
//!
//! ## What the API Does NOT Do
//!
//! - **Per-kind business logic**: That belongs in `services/*.rs`
//! - **I/O beyond persistence**: No stdout, stderr, or formatting
//!
//! ## Guarded Deletes
//!
//! `delete_patient` asks a [`DependencyChecker`] built over the appointment, billing and
//! medical record services. If any record still refers to the patient, the delete fails with
//! [`MedrecError::Dependency`] listing every reason, and nothing changes. Nothing
//! cascades; the caller removes the dependents first.
//!
//! ## Concurrency
//!
//! Every mutation takes `&mut self`, so a facade has exactly one writer at a time. A host
//! that shares one across threads wraps it in a `Mutex`; each read-modify-persist
//! sequence then runs entirely under that lock.
//!
//! ## Generic Over StorageBackend
//!
//! `RecordsApi<B: StorageBackend>` works with any backend:
//! - Production: `RecordsApi<FsBackend>`
//! - Testing: `RecordsApi<MemBackend>`

use crate::codec::Diagnostic;
use crate::config::MedrecConfig;
use crate::deps::{DeletionCheck, DependencyChecker};
use crate::error::Result;
use crate::model::{
    Appointment, AppointmentStatus, Bill, MedicalRecord, Patient, PatientLinked, Payment,
    RecordKind,
};
use crate::services::{
    AppointmentDraft, AppointmentService, BillDraft, BillingService, CmdMessage,
    MedicalRecordDraft, MedicalRecordService, Outcome, PatientDraft, PatientService,
    PatientUpdate, PaymentDraft,
};
use crate::store::StorageBackend;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Kinds whose records refer to patients and must be checked before a patient delete.
pub const DEPENDENT_KINDS: &[RecordKind] = &[
    RecordKind::Appointment,
    RecordKind::Bill,
    RecordKind::MedicalRecord,
];

/// A record whose patient reference does not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    pub kind: RecordKind,
    pub id: String,
    pub patient_id: String,
}

/// The main API facade.
pub struct RecordsApi<B: StorageBackend> {
    patients: PatientService<B>,
    appointments: AppointmentService<B>,
    billing: BillingService<B>,
    medical_records: MedicalRecordService<B>,
    load_report: Vec<Diagnostic>,
}

impl<B: StorageBackend + Clone> RecordsApi<B> {
    /// Opens every table from `backend`. Unreadable records are skipped and reported
    /// through [`RecordsApi::load_report`].
    pub fn open(backend: B, config: &MedrecConfig) -> Result<Self> {
        let floor = config.id_floor;
        let (patients, mut load_report) = PatientService::open(backend.clone(), floor)?;
        let (appointments, diagnostics) = AppointmentService::open(backend.clone(), floor)?;
        load_report.extend(diagnostics);
        let (billing, diagnostics) = BillingService::open(backend.clone(), floor)?;
        load_report.extend(diagnostics);
        let (medical_records, diagnostics) = MedicalRecordService::open(backend, floor)?;
        load_report.extend(diagnostics);

        tracing::debug!(
            patients = patients.store().len(),
            appointments = appointments.store().len(),
            bills = billing.store().len(),
            payments = billing.ledger().len(),
            medical_records = medical_records.store().len(),
            diagnostics = load_report.len(),
            "opened records"
        );

        Ok(Self {
            patients,
            appointments,
            billing,
            medical_records,
            load_report,
        })
    }
}

impl<B: StorageBackend> RecordsApi<B> {
    /// The checker consulted before a patient is deleted.
    pub fn dependency_checker(&self) -> DependencyChecker<'_> {
        DependencyChecker::new()
            .with_source(&self.appointments)
            .with_source(&self.billing)
            .with_source(&self.medical_records)
    }

    /// Everything the decoder skipped or defaulted while opening.
    pub fn load_report(&self) -> &[Diagnostic] {
        &self.load_report
    }

    // --- Patients ---

    pub fn register_patient(&mut self, draft: PatientDraft) -> Result<Outcome<Patient>> {
        self.patients.register(draft)
    }

    pub fn update_patient(&mut self, id: &str, update: PatientUpdate) -> Result<Outcome<Patient>> {
        self.patients.update(id, update)
    }

    pub fn update_medical_info(&mut self, id: &str, blood_type: &str) -> Result<Outcome<Patient>> {
        self.patients.set_blood_type(id, blood_type)
    }

    pub fn admit_patient(&mut self, id: &str) -> Result<Outcome<Patient>> {
        self.patients.set_admitted(id, true)
    }

    pub fn discharge_patient(&mut self, id: &str) -> Result<Outcome<Patient>> {
        self.patients.set_admitted(id, false)
    }

    /// Whether `id` could be deleted right now, and if not, why.
    pub fn can_delete_patient(&self, id: &str) -> Result<DeletionCheck> {
        self.patients.require(id)?;
        Ok(self.dependency_checker().can_delete(id))
    }

    /// Deletes a patient that nothing refers to.
    pub fn delete_patient(&mut self, id: &str) -> Result<Outcome<Patient>> {
        let check = self.can_delete_patient(id)?;
        if !check.allowed() {
            tracing::info!(id = %id, "patient delete refused");
        }
        check.into_result()?;

        let patient = self.patients.remove(id)?;
        let message = CmdMessage::success(format!(
            "Deleted patient {} ({})",
            patient.id,
            patient.full_name()
        ));
        Ok(Outcome::new(patient).with_message(message))
    }

    pub fn find_patient(&self, id: &str) -> Option<Patient> {
        self.patients.find(id)
    }

    pub fn search_patients(&self, text: &str) -> Vec<Patient> {
        self.patients.search(text)
    }

    pub fn list_patients(&self) -> Vec<Patient> {
        self.patients.list()
    }

    pub fn admitted_patients(&self) -> Vec<Patient> {
        self.patients.admitted()
    }

    // --- Appointments ---

    pub fn schedule_appointment(&mut self, draft: AppointmentDraft) -> Result<Outcome<Appointment>> {
        let patient = self.patients.require(&draft.patient_id)?;
        self.appointments.schedule(&patient, draft)
    }

    pub fn set_appointment_status(
        &mut self,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<Outcome<Appointment>> {
        self.appointments.set_status(id, status)
    }

    pub fn reschedule_appointment(
        &mut self,
        id: &str,
        date_time: NaiveDateTime,
    ) -> Result<Outcome<Appointment>> {
        self.appointments.reschedule(id, date_time)
    }

    pub fn delete_appointment(&mut self, id: &str) -> Result<Outcome<Appointment>> {
        let appointment = self.appointments.remove(id)?;
        let message = CmdMessage::success(format!("Deleted appointment {}", appointment.id));
        Ok(Outcome::new(appointment).with_message(message))
    }

    pub fn appointments_for_patient(&self, patient_id: &str) -> Vec<Appointment> {
        self.appointments.for_patient(patient_id)
    }

    pub fn list_appointments(&self) -> Vec<Appointment> {
        self.appointments.list()
    }

    pub fn find_appointment(&self, id: &str) -> Option<Appointment> {
        self.appointments.find(id)
    }

    // --- Bills ---

    pub fn issue_bill(&mut self, draft: BillDraft) -> Result<Outcome<Bill>> {
        let patient = self.patients.require(&draft.patient_id)?;
        self.billing.issue(&patient, draft)
    }

    pub fn record_payment(&mut self, id: &str, payment: PaymentDraft) -> Result<Outcome<Bill>> {
        self.billing.record_payment(id, payment)
    }

    /// Deletes a bill. Payments already recorded against it stay in the ledger.
    pub fn delete_bill(&mut self, id: &str) -> Result<Outcome<Bill>> {
        let bill = self.billing.remove(id)?;
        let mut outcome = Outcome::new(bill)
            .with_message(CmdMessage::success(format!("Deleted bill {}", id)));
        let kept = self.billing.payments_for(id).len();
        if kept > 0 {
            outcome.add_message(CmdMessage::info(format!(
                "{} payment(s) for {} stay in the ledger",
                kept, id
            )));
        }
        Ok(outcome)
    }

    pub fn bills_for_patient(&self, patient_id: &str) -> Vec<Bill> {
        self.billing.for_patient(patient_id)
    }

    pub fn list_bills(&self) -> Vec<Bill> {
        self.billing.list()
    }

    pub fn find_bill(&self, id: &str) -> Option<Bill> {
        self.billing.find(id)
    }

    pub fn payments_for_bill(&self, bill_id: &str) -> Vec<Payment> {
        self.billing.payments_for(bill_id)
    }

    pub fn list_payments(&self) -> Vec<Payment> {
        self.billing.payments()
    }

    // --- Medical records ---

    pub fn add_medical_record(
        &mut self,
        draft: MedicalRecordDraft,
    ) -> Result<Outcome<MedicalRecord>> {
        let patient = self.patients.require(&draft.patient_id)?;
        self.medical_records.add(&patient, draft)
    }

    pub fn annotate_medical_record(
        &mut self,
        id: &str,
        notes: &str,
    ) -> Result<Outcome<MedicalRecord>> {
        self.medical_records.annotate(id, notes)
    }

    pub fn delete_medical_record(&mut self, id: &str) -> Result<Outcome<MedicalRecord>> {
        let record = self.medical_records.remove(id)?;
        let message = CmdMessage::success(format!("Deleted medical record {}", record.id));
        Ok(Outcome::new(record).with_message(message))
    }

    pub fn medical_records_for_patient(&self, patient_id: &str) -> Vec<MedicalRecord> {
        self.medical_records.for_patient(patient_id)
    }

    pub fn list_medical_records(&self) -> Vec<MedicalRecord> {
        self.medical_records.list()
    }

    pub fn find_medical_record(&self, id: &str) -> Option<MedicalRecord> {
        self.medical_records.find(id)
    }

    // --- Integrity ---

    /// Records whose patient no longer exists (e.g. edited files).
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        fn dangling<T: PatientLinked>(
            records: &[T],
            patients: &impl Fn(&str) -> bool,
        ) -> Vec<DanglingReference> {
            records
                .iter()
                .filter(|r| !patients(r.patient_id()))
                .map(|r| DanglingReference {
                    kind: T::KIND,
                    id: r.id().to_string(),
                    patient_id: r.patient_id().to_string(),
                })
                .collect()
        }

        let exists = |id: &str| self.patients.store().find_by_id(id).is_some();
        let mut found = dangling(self.appointments.store().all(), &exists);
        found.extend(dangling(self.billing.store().all(), &exists));
        found.extend(dangling(self.medical_records.store().all(), &exists));
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MedrecError;
    use crate::model::BloodType;
    use crate::services::MessageLevel;
    use crate::store::MemBackend;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn api(backend: &MemBackend) -> RecordsApi<MemBackend> {
        RecordsApi::open(backend.clone(), &MedrecConfig::default()).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    fn at(d: u32) -> NaiveDateTime {
        day(d).and_hms_opt(10, 0, 0).unwrap()
    }

    fn register(api: &mut RecordsApi<MemBackend>, first: &str, last: &str) -> String {
        api.register_patient(PatientDraft::new(first, last))
            .unwrap()
            .record
            .id
    }

    #[test]
    fn register_five_delete_one_then_register() {
        let backend = MemBackend::new();
        let mut api = api(&backend);
        let ids: Vec<_> = (0..5).map(|_| register(&mut api, "Test", "Patient")).collect();
        assert_eq!(ids, vec!["P101", "P102", "P103", "P104", "P105"]);

        api.delete_patient("P103").unwrap();
        assert_eq!(register(&mut api, "New", "Patient"), "P106");
        assert_eq!(api.list_patients().len(), 5);
    }

    #[test]
    fn delete_is_blocked_while_a_bill_exists() {
        let backend = MemBackend::new();
        let mut api = api(&backend);
        for _ in 0..4 {
            register(&mut api, "Test", "Patient");
        }
        api.issue_bill(BillDraft::new("P104", Decimal::new(2500, 2), day(1)))
            .unwrap();

        let check = api.can_delete_patient("P104").unwrap();
        assert!(!check.allowed());

        let err = api.delete_patient("P104").unwrap_err();
        assert_eq!(err.to_string(), "Cannot delete patient P104: has 1 bill(s)");
        assert!(api.find_patient("P104").is_some());

        api.delete_bill("B101").unwrap();
        assert!(api.can_delete_patient("P104").unwrap().allowed());
        api.delete_patient("P104").unwrap();
        assert!(api.find_patient("P104").is_none());
    }

    #[test]
    fn delete_lists_every_blocking_kind() {
        let backend = MemBackend::new();
        let mut api = api(&backend);
        register(&mut api, "Ada", "Lovelace");
        api.schedule_appointment(AppointmentDraft::new("P101", "Checkup", at(1)))
            .unwrap();
        api.schedule_appointment(AppointmentDraft::new("P101", "Follow-up", at(8)))
            .unwrap();
        api.issue_bill(BillDraft::new("P101", Decimal::new(90, 0), day(1)))
            .unwrap();

        let err = api.delete_patient("P101").unwrap_err();
        match err {
            MedrecError::Dependency { id, reasons } => {
                assert_eq!(id, "P101");
                assert_eq!(reasons.len(), 2);
                assert_eq!(reasons[0].ids, vec!["A101", "A102"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn deleting_unknown_patient_is_not_found() {
        let backend = MemBackend::new();
        let mut api = api(&backend);
        assert!(matches!(
            api.delete_patient("P999"),
            Err(MedrecError::NotFound { .. })
        ));
        assert!(api.can_delete_patient("P999").is_err());
    }

    #[test]
    fn scheduling_and_billing_require_an_existing_patient() {
        let backend = MemBackend::new();
        let mut api = api(&backend);
        let err = api
            .schedule_appointment(AppointmentDraft::new("P101", "Checkup", at(1)))
            .unwrap_err();
        assert_eq!(err.to_string(), "Patient not found: P101");
        assert!(api
            .issue_bill(BillDraft::new("P101", Decimal::ONE, day(1)))
            .is_err());
        assert!(backend.contents(RecordKind::Appointment).is_none());
        assert!(backend.contents(RecordKind::Bill).is_none());
    }

    #[test]
    fn update_medical_info_normalizes_and_warns() {
        let backend = MemBackend::new();
        let mut api = api(&backend);
        register(&mut api, "Ada", "Lovelace");

        let ok = api.update_medical_info("P101", "b+").unwrap();
        assert_eq!(ok.record.blood_type, BloodType::BPositive);
        assert!(!ok.has_warnings());

        let warned = api.update_medical_info("P101", "Z9").unwrap();
        assert_eq!(warned.record.blood_type, BloodType::Unknown);
        assert!(warned.has_warnings());

        assert!(api.update_medical_info("P999", "A+").is_err());
    }

    #[test]
    fn admit_and_discharge() {
        let backend = MemBackend::new();
        let mut api = api(&backend);
        register(&mut api, "Ada", "Lovelace");
        api.admit_patient("P101").unwrap();
        assert_eq!(api.admitted_patients().len(), 1);
        api.discharge_patient("P101").unwrap();
        assert!(api.admitted_patients().is_empty());
    }

    #[test]
    fn snapshots_are_detached_from_the_store() {
        let backend = MemBackend::new();
        let mut api = api(&backend);
        register(&mut api, "Ada", "Lovelace");
        let mut snapshot = api.find_patient("P101").unwrap();
        snapshot.first_name = "Changed".into();
        assert_eq!(api.find_patient("P101").unwrap().first_name, "Ada");
    }

    #[test]
    fn state_survives_reopening() {
        let backend = MemBackend::new();
        {
            let mut api = api(&backend);
            register(&mut api, "Ada", "Lovelace");
            api.schedule_appointment(AppointmentDraft::new("P101", "Checkup", at(1)))
                .unwrap();
            api.issue_bill(BillDraft::new("P101", Decimal::new(10, 0), day(1)))
                .unwrap();
            api.record_payment("B101", PaymentDraft::new(Decimal::new(4, 0), at(2)))
                .unwrap();
            api.add_medical_record(MedicalRecordDraft::new("P101", "Influenza", day(1)))
                .unwrap();
        }

        let api = api(&backend);
        assert_eq!(api.appointments_for_patient("P101").len(), 1);
        let bill = api.find_bill("B101").unwrap();
        assert_eq!(bill.status, Bill::PARTIAL);
        assert_eq!(bill.amount_paid.to_string(), "4.00");
        assert_eq!(api.payments_for_bill("B101").len(), 1);
        assert_eq!(api.medical_records_for_patient("P101").len(), 1);
        assert!(api.load_report().is_empty());
    }

    #[test]
    fn load_report_and_dangling_references() {
        let backend = MemBackend::new()
            .with_file(
                RecordKind::Patient,
                "id,firstName,lastName,dateOfBirth,gender,contactNumber,address,bloodType,isAdmitted\n\
                 P101,Ada,Lovelace,,,,,Z9,false\n",
            )
            .with_file(
                RecordKind::Appointment,
                "id,patientId,patientName,type,dateTime,status\n\
                 A101,P101,Ada,Checkup,2024-07-01 10:00:00,SCHEDULED\n\
                 A102,P777,Ghost,Checkup,2024-07-01 11:00:00,SCHEDULED\n",
            );
        let api = api(&backend);

        assert_eq!(api.load_report().len(), 1);
        assert_eq!(api.load_report()[0].kind, RecordKind::Patient);
        assert_eq!(
            api.dangling_references(),
            vec![DanglingReference {
                kind: RecordKind::Appointment,
                id: "A102".into(),
                patient_id: "P777".into(),
            }]
        );
    }

    #[test]
    fn dependency_checker_is_fully_wired() {
        let backend = MemBackend::new();
        let api = api(&backend);
        assert!(api.dependency_checker().assert_wired(DEPENDENT_KINDS).is_ok());
    }

    #[test]
    fn failed_write_leaves_everything_unchanged() {
        let backend = MemBackend::new();
        let mut api = api(&backend);
        register(&mut api, "Ada", "Lovelace");

        backend.set_simulate_write_error(true);
        assert!(api.delete_patient("P101").is_err());
        assert!(api
            .schedule_appointment(AppointmentDraft::new("P101", "Checkup", at(1)))
            .is_err());
        assert!(api.find_patient("P101").is_some());
        assert!(api.list_appointments().is_empty());
    }

    #[test]
    fn medical_records_guard_the_patient_too() {
        let backend = MemBackend::new();
        let mut api = api(&backend);
        register(&mut api, "Ada", "Lovelace");
        assert!(api
            .add_medical_record(MedicalRecordDraft::new("P999", "Influenza", day(1)))
            .is_err());
        let record = api
            .add_medical_record(MedicalRecordDraft::new("P101", "Influenza", day(1)))
            .unwrap()
            .record;
        assert_eq!(record.id, "M101");
        assert_eq!(record.patient_name, "Ada Lovelace");

        let err = api.delete_patient("P101").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot delete patient P101: has 1 medical record(s)"
        );

        api.delete_medical_record("M101").unwrap();
        api.delete_patient("P101").unwrap();
    }

    #[test]
    fn registering_around_deletes_never_overwrites_a_patient() {
        let backend = MemBackend::new();
        let mut api = api(&backend);
        let names = [
            ("Ada", "Lovelace"),
            ("Grace", "Hopper"),
            ("Alan", "Turing"),
            ("Edsger", "Dijkstra"),
            ("Barbara", "Liskov"),
        ];
        for (first, last) in names {
            let mut draft = PatientDraft::new(first, last);
            draft.address = format!("{} Street", last);
            api.register_patient(draft).unwrap();
        }
        api.admit_patient("P104").unwrap();

        let snapshot = |api: &RecordsApi<MemBackend>| api.list_patients();
        for doomed in ["P102", "P105", "P101"] {
            let before: Vec<Patient> = snapshot(&api)
                .into_iter()
                .filter(|p| p.id != doomed)
                .collect();
            api.delete_patient(doomed).unwrap();
            let fresh = register(&mut api, "Late", "Arrival");
            assert!(before.iter().all(|p| p.id != fresh));

            for patient in &before {
                assert_eq!(api.find_patient(&patient.id).as_ref(), Some(patient));
            }
        }

        // And the same holds after a reload from storage
        let reopened = RecordsApi::open(backend.clone(), &MedrecConfig::default()).unwrap();
        assert_eq!(reopened.list_patients(), api.list_patients());
        assert_eq!(reopened.find_patient("P104").unwrap().address, "Dijkstra Street");
    }

    #[test]
    fn deleting_a_paid_bill_keeps_its_ledger() {
        let backend = MemBackend::new();
        let mut api = api(&backend);
        register(&mut api, "Ada", "Lovelace");
        api.issue_bill(BillDraft::new("P101", Decimal::new(30, 0), day(1)))
            .unwrap();
        api.record_payment("B101", PaymentDraft::new(Decimal::new(30, 0), at(2)))
            .unwrap();

        let outcome = api.delete_bill("B101").unwrap();
        assert_eq!(outcome.messages.len(), 2);
        assert_eq!(outcome.messages[1].level, MessageLevel::Info);
        assert_eq!(
            outcome.messages[1].content,
            "1 payment(s) for B101 stay in the ledger"
        );
        assert_eq!(api.list_payments().len(), 1);
        assert!(api.can_delete_patient("P101").unwrap().allowed());
    }

    #[test]
    fn orphaned_medical_records_are_reported() {
        let backend = MemBackend::new().with_file(
            RecordKind::MedicalRecord,
            "id,patientId,patientName,diagnosis,notes,recordDate\n\
             M101,P404,Nobody,Influenza,,2024-07-01\n",
        );
        let api = api(&backend);
        assert_eq!(
            api.dangling_references(),
            vec![DanglingReference {
                kind: RecordKind::MedicalRecord,
                id: "M101".into(),
                patient_id: "P404".into(),
            }]
        );
    }
}
