#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// A `medrec` invocation pinned to `dir`, with colors and logging quiet.
fn medrec(dir: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin("medrec"));
    cmd.arg("--data")
        .arg(dir.path())
        .env("NO_COLOR", "1")
        .env_remove("MEDREC_LOG")
        .env_remove("MEDREC_DATA");
    cmd
}

fn register(dir: &TempDir, first: &str, last: &str) {
    medrec(dir)
        .args(["patient", "register", first, last])
        .assert()
        .success();
}

#[test]
fn test_register_and_list() {
    let dir = TempDir::new().unwrap();

    medrec(&dir)
        .args(["patient", "register", "Ada", "Lovelace", "--blood-type", "o-"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Registered patient P101 (Ada Lovelace)"));

    medrec(&dir)
        .args(["patient", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("P101"))
        .stdout(predicate::str::contains("Ada Lovelace"))
        .stdout(predicate::str::contains("O-"));

    // Naked invocation lists too
    medrec(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Ada Lovelace"));

    assert!(dir.path().join("patients.csv").exists());
}

#[test]
fn test_ids_continue_after_a_delete() {
    let dir = TempDir::new().unwrap();
    for _ in 0..5 {
        register(&dir, "Test", "Patient");
    }

    medrec(&dir)
        .args(["patient", "delete", "P103"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted patient P103"));

    medrec(&dir)
        .args(["patient", "register", "New", "Patient"])
        .assert()
        .success()
        .stdout(predicate::str::contains("P106"));
}

#[test]
fn test_unknown_blood_type_is_a_warning() {
    let dir = TempDir::new().unwrap();

    medrec(&dir)
        .args(["patient", "register", "Ada", "Lovelace", "--blood-type", "Z9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stored as Unknown"));

    medrec(&dir)
        .args(["patient", "show", "P101"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unknown"));
}

#[test]
fn test_delete_is_refused_while_a_bill_exists() {
    let dir = TempDir::new().unwrap();
    register(&dir, "Ada", "Lovelace");

    medrec(&dir)
        .args(["bill", "issue", "P101", "75.5", "--date", "2024-09-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Issued B101 to Ada Lovelace for 75.50"));

    medrec(&dir)
        .args(["patient", "check", "P101"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cannot be deleted"))
        .stdout(predicate::str::contains("1 bill(s)"));

    medrec(&dir)
        .args(["patient", "delete", "P101"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Error: Cannot delete patient P101: has 1 bill(s)",
        ));

    medrec(&dir)
        .args(["bill", "delete", "B101"])
        .assert()
        .success();

    medrec(&dir)
        .args(["patient", "delete", "P101"])
        .assert()
        .success();
}

#[test]
fn test_payments_move_a_bill_to_paid() {
    let dir = TempDir::new().unwrap();
    register(&dir, "Ada", "Lovelace");
    medrec(&dir)
        .args(["bill", "issue", "P101", "100", "--date", "2024-09-01"])
        .assert()
        .success();

    medrec(&dir)
        .args(["bill", "pay", "B101", "40", "--date", "2024-09-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("60.00 outstanding"));

    medrec(&dir)
        .args(["bill", "pay", "B101", "70"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds the outstanding balance of 60.00"));

    medrec(&dir)
        .args(["bill", "pay", "B101", "60", "--date", "2024-09-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("B101 paid in full"));

    medrec(&dir)
        .args(["bill", "list", "--unpaid"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No bills found."));

    let bills = fs::read_to_string(dir.path().join("bills.csv")).unwrap();
    assert!(bills.contains("B101,P101,Ada Lovelace,2024-09-01,2024-09-03,PAID,100.00,100.00"));

    let ledger = fs::read_to_string(dir.path().join("payments.csv")).unwrap();
    assert_eq!(
        ledger,
        "id,billId,amount,paymentDateTime,paymentMethod,status\n\
         PAY101,B101,40.00,2024-09-02 00:00:00,CASH,COMPLETED\n\
         PAY102,B101,60.00,2024-09-03 00:00:00,CASH,COMPLETED\n"
    );
}

#[test]
fn test_ledger_outlives_a_deleted_bill() {
    let dir = TempDir::new().unwrap();
    register(&dir, "Ada", "Lovelace");
    medrec(&dir)
        .args(["bill", "issue", "P101", "100", "--date", "2024-09-01"])
        .assert()
        .success();
    medrec(&dir)
        .args([
            "bill", "pay", "B101", "25", "--date", "2024-09-02", "--method", "card",
        ])
        .assert()
        .success();

    medrec(&dir)
        .args(["bill", "delete", "B101"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 payment(s) for B101 stay in the ledger"));

    medrec(&dir)
        .args(["bill", "payments", "B101"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PAY101"))
        .stdout(predicate::str::contains("CARD"));

    medrec(&dir)
        .args(["bill", "payments", "B999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Bill not found: B999"));
}

#[test]
fn test_medical_records_block_a_patient_delete() {
    let dir = TempDir::new().unwrap();
    register(&dir, "Ada", "Lovelace");

    medrec(&dir)
        .args([
            "record",
            "add",
            "P101",
            "Influenza",
            "--notes",
            "Rest, fluids",
            "--date",
            "2024-09-01",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added M101 for Ada Lovelace: Influenza"));

    medrec(&dir)
        .args(["patient", "show", "P101"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Medical records"))
        .stdout(predicate::str::contains("Influenza"));

    medrec(&dir)
        .args(["patient", "delete", "P101"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 medical record(s)"));

    medrec(&dir)
        .args(["record", "annotate", "M101", "Recovered"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated notes on M101"));

    medrec(&dir)
        .args(["record", "delete", "M101"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted medical record M101"));

    medrec(&dir)
        .args(["patient", "delete", "P101"])
        .assert()
        .success();
}

#[test]
fn test_birth_date_can_be_cleared() {
    let dir = TempDir::new().unwrap();
    medrec(&dir)
        .args(["patient", "register", "Ada", "Lovelace", "--dob", "1990-12-10"])
        .assert()
        .success();

    medrec(&dir)
        .args(["patient", "update", "P101", "--clear-dob"])
        .assert()
        .success();

    let patients = fs::read_to_string(dir.path().join("patients.csv")).unwrap();
    assert!(patients.contains("P101,Ada,Lovelace,,"));
    assert!(!patients.contains("1990-12-10"));
}

#[test]
fn test_appointments_need_an_existing_patient() {
    let dir = TempDir::new().unwrap();

    medrec(&dir)
        .args([
            "appointment",
            "schedule",
            "P999",
            "--type",
            "Checkup",
            "--at",
            "2024-09-01 09:00",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Patient not found: P999"));

    register(&dir, "Ada", "Lovelace");
    medrec(&dir)
        .args([
            "appointment",
            "schedule",
            "P101",
            "--type",
            "Checkup",
            "--at",
            "2024-09-01 09:00",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Scheduled A101 for Ada Lovelace"));

    medrec(&dir)
        .args(["appointment", "status", "A101", "confirmed"])
        .assert()
        .success();

    medrec(&dir)
        .args(["appointment", "list", "--patient", "P101"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CONFIRMED"));
}

#[test]
fn test_json_output_is_parseable() {
    let dir = TempDir::new().unwrap();
    register(&dir, "Ada", "Lovelace");

    let output = medrec(&dir)
        .args(["--output", "json", "patient", "list"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let patients = value.as_array().unwrap();
    assert_eq!(patients.len(), 1);
    assert_eq!(patients[0]["id"], "P101");
    assert_eq!(patients[0]["blood_type"], "Unknown");
}

#[test]
fn test_doctor_reports_hand_edited_files() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("patients.csv"),
        "id,firstName,lastName,dateOfBirth,gender,contactNumber,address,bloodType,isAdmitted\n\
         P101,Ada,Lovelace,,,,,A+,false\n\
         ,Nobody,Here,,,,,,false\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("appointments.csv"),
        "id,patientId,patientName,type,dateTime,status\n\
         A101,P777,Ghost,Checkup,2024-09-01 09:00:00,SCHEDULED\n",
    )
    .unwrap();

    medrec(&dir)
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("patients.csv line 3 (skipped)"))
        .stdout(predicate::str::contains("Appointment A101 refers to P777"));
}

#[test]
fn test_config_from_the_data_dir() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("medrec.toml"), "id_floor = 500\n").unwrap();

    medrec(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("id_floor = 500"))
        .stdout(predicate::str::contains("keep_backups = true"));

    medrec(&dir)
        .args(["patient", "register", "Ada", "Lovelace"])
        .assert()
        .success()
        .stdout(predicate::str::contains("P501"));
}

#[test]
fn test_data_dir_from_environment() {
    let dir = TempDir::new().unwrap();

    Command::new(cargo_bin("medrec"))
        .env("MEDREC_DATA", dir.path())
        .env("NO_COLOR", "1")
        .args(["patient", "register", "Ada", "Lovelace"])
        .assert()
        .success();

    assert!(dir.path().join("patients.csv").exists());
}
