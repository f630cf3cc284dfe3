use chrono::{NaiveDate, NaiveDateTime};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use medrecapp::codec::{DATE_FORMAT, DATE_TIME_FORMAT};
use medrecapp::model::AppointmentStatus;
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Returns the version string, with the git hash appended for non-release builds.
/// Format for releases: "v0.3.0"
/// Format for dev builds: "v0.3.0 (dev abc1234)"
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            format!("v{}", VERSION)
        } else {
            format!("v{} (dev {})", VERSION, GIT_HASH)
        }
    })
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputMode {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "medrec",
    bin_name = "medrec",
    version = get_version(),
    disable_help_subcommand = true,
    after_help = "Records live in the data directory as patients.csv, appointments.csv, bills.csv,\nmedical_records.csv and payments.csv. Set it with --data or MEDREC_DATA."
)]
#[command(about = "Patient, appointment and billing records in plain CSV files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory (defaults to MEDREC_DATA, then the OS data dir)
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data: Option<PathBuf>,

    /// Verbose output, repeat for more detail
    #[arg(short, long, global = true, action = ArgAction::Count, help_heading = "Options")]
    pub verbose: u8,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputMode::Text, help_heading = "Options")]
    pub output: OutputMode,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage patients
    #[command(alias = "p", display_order = 1)]
    Patient {
        #[command(subcommand)]
        action: PatientCommands,
    },

    /// Manage appointments
    #[command(alias = "appt", display_order = 2)]
    Appointment {
        #[command(subcommand)]
        action: AppointmentCommands,
    },

    /// Manage bills and payments
    #[command(display_order = 3)]
    Bill {
        #[command(subcommand)]
        action: BillCommands,
    },

    /// Manage medical records
    #[command(alias = "rec", display_order = 4)]
    Record {
        #[command(subcommand)]
        action: RecordCommands,
    },

    /// Show or generate configuration
    #[command(display_order = 10)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigCommands>,
    },

    /// Report load problems and records pointing at missing patients
    #[command(display_order = 11)]
    Doctor,
}

/// Optional patient details shared by `register` and `update`.
#[derive(Args, Debug, Default)]
pub struct PatientDetails {
    /// Date of birth
    #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_date)]
    pub dob: Option<NaiveDate>,

    #[arg(long)]
    pub gender: Option<String>,

    /// Contact number
    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    /// Blood type, e.g. A+ or o-
    #[arg(long)]
    pub blood_type: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum PatientCommands {
    /// Register a new patient
    #[command(alias = "add", display_order = 1)]
    Register {
        first_name: String,
        last_name: String,

        #[command(flatten)]
        details: PatientDetails,
    },

    /// List patients
    #[command(alias = "ls", display_order = 2)]
    List {
        /// Only admitted patients
        #[arg(long)]
        admitted: bool,
    },

    /// Show a patient with their appointments, bills and medical records
    #[command(display_order = 3)]
    Show { id: String },

    /// Search patients by name
    #[command(display_order = 4)]
    Search { term: String },

    /// Change patient details
    #[command(display_order = 5)]
    Update {
        id: String,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        #[command(flatten)]
        details: PatientDetails,

        /// Forget the recorded date of birth
        #[arg(long, conflicts_with = "dob")]
        clear_dob: bool,
    },

    /// Set the blood type
    #[command(display_order = 6)]
    BloodType { id: String, value: String },

    /// Mark a patient as admitted
    #[command(display_order = 7)]
    Admit { id: String },

    /// Mark a patient as discharged
    #[command(display_order = 8)]
    Discharge { id: String },

    /// Check whether a patient can be deleted
    #[command(display_order = 9)]
    Check { id: String },

    /// Delete a patient (refused while appointments, bills or medical records refer to them)
    #[command(alias = "rm", display_order = 10)]
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum AppointmentCommands {
    /// Book an appointment for a patient
    #[command(alias = "add", display_order = 1)]
    Schedule {
        patient_id: String,

        /// Appointment type, e.g. Checkup
        #[arg(long = "type", value_name = "TYPE")]
        kind: String,

        /// Date and time
        #[arg(long, value_name = "YYYY-MM-DD HH:MM", value_parser = parse_date_time)]
        at: NaiveDateTime,

        /// Initial status
        #[arg(long, default_value_t = AppointmentStatus::Scheduled)]
        status: AppointmentStatus,
    },

    /// List appointments
    #[command(alias = "ls", display_order = 2)]
    List {
        /// Only this patient's appointments
        #[arg(long, value_name = "ID")]
        patient: Option<String>,
    },

    /// Change the status (scheduled, confirmed, completed, cancelled, no-show)
    #[command(display_order = 3)]
    Status {
        id: String,
        status: AppointmentStatus,
    },

    /// Move an appointment
    #[command(display_order = 4)]
    Reschedule {
        id: String,

        #[arg(value_name = "YYYY-MM-DD HH:MM", value_parser = parse_date_time)]
        at: NaiveDateTime,
    },

    /// Delete an appointment
    #[command(alias = "rm", display_order = 5)]
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum BillCommands {
    /// Issue a bill to a patient
    #[command(display_order = 1)]
    Issue {
        patient_id: String,

        /// Total amount, e.g. 120.50
        #[arg(allow_negative_numbers = true)]
        amount: Decimal,

        /// Issue date (defaults to today)
        #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Record a payment against a bill
    #[command(display_order = 2)]
    Pay {
        id: String,

        #[arg(allow_negative_numbers = true)]
        amount: Decimal,

        /// Payment date (defaults to now)
        #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// Payment method, e.g. CARD
        #[arg(long, default_value = "CASH")]
        method: String,
    },

    /// List bills
    #[command(alias = "ls", display_order = 3)]
    List {
        /// Only this patient's bills
        #[arg(long, value_name = "ID")]
        patient: Option<String>,

        /// Only bills with a balance left
        #[arg(long)]
        unpaid: bool,
    },

    /// Show the payment ledger
    #[command(display_order = 4)]
    Payments {
        /// Only payments against this bill
        id: Option<String>,
    },

    /// Delete a bill (its payments stay in the ledger)
    #[command(alias = "rm", display_order = 5)]
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum RecordCommands {
    /// File a diagnosis for a patient
    #[command(display_order = 1)]
    Add {
        patient_id: String,
        diagnosis: String,

        #[arg(long)]
        notes: Option<String>,

        /// Record date (defaults to today)
        #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// List medical records
    #[command(alias = "ls", display_order = 2)]
    List {
        /// Only this patient's history
        #[arg(long, value_name = "ID")]
        patient: Option<String>,
    },

    /// Replace the notes on a record
    #[command(display_order = 3)]
    Annotate { id: String, notes: String },

    /// Delete a medical record
    #[command(alias = "rm", display_order = 4)]
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print a commented medrec.toml template
    Gen {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Print one resolved value
    Get { key: String },
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| format!("'{}' is not a date, expected YYYY-MM-DD", raw))
}

/// Accepts `YYYY-MM-DD HH:MM`, with optional seconds and `T` as the separator.
fn parse_date_time(raw: &str) -> Result<NaiveDateTime, String> {
    let normalized = raw.trim().replacen('T', " ", 1);
    NaiveDateTime::parse_from_str(&normalized, DATE_TIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M"))
        .map_err(|_| format!("'{}' is not a date and time, expected YYYY-MM-DD HH:MM", raw))
}
