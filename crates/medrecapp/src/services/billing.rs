use super::{CmdMessage, Outcome};
use crate::codec::Diagnostic;
use crate::deps::ReferenceSource;
use crate::error::{MedrecError, Result};
use crate::model::{to_cents, Bill, Patient, Payment, PaymentStatus, RecordKind};
use crate::store::{RecordStore, StorageBackend, Table};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct BillDraft {
    pub patient_id: String,
    pub total_amount: Decimal,
    pub date_issued: NaiveDate,
}

impl BillDraft {
    pub fn new(patient_id: impl Into<String>, total_amount: Decimal, date_issued: NaiveDate) -> Self {
        Self {
            patient_id: patient_id.into(),
            total_amount,
            date_issued,
        }
    }
}

/// A payment about to be recorded against a bill.
#[derive(Debug, Clone)]
pub struct PaymentDraft {
    pub amount: Decimal,
    pub paid_at: NaiveDateTime,
    pub method: String,
}

impl PaymentDraft {
    pub fn new(amount: Decimal, paid_at: NaiveDateTime) -> Self {
        Self {
            amount,
            paid_at,
            method: Payment::DEFAULT_METHOD.to_string(),
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }
}

/// Bills and the payment ledger behind them.
pub struct BillingService<B: StorageBackend> {
    bills: Table<Bill, B>,
    payments: Table<Payment, B>,
}

impl<B: StorageBackend + Clone> BillingService<B> {
    pub fn open(backend: B, id_floor: u64) -> Result<(Self, Vec<Diagnostic>)> {
        let (bills, mut diagnostics) = Table::open(backend.clone(), id_floor)?;
        let (payments, ledger_diagnostics) = Table::open(backend, id_floor)?;
        diagnostics.extend(ledger_diagnostics);
        Ok((Self { bills, payments }, diagnostics))
    }
}

impl<B: StorageBackend> BillingService<B> {
    pub fn store(&self) -> &RecordStore<Bill> {
        self.bills.records()
    }

    pub fn ledger(&self) -> &RecordStore<Payment> {
        self.payments.records()
    }

    /// Issues an unpaid bill to `patient`, which the caller has already resolved.
    pub fn issue(&mut self, patient: &Patient, draft: BillDraft) -> Result<Outcome<Bill>> {
        if draft.total_amount < Decimal::ZERO {
            return Err(MedrecError::validation("amount", "must not be negative"));
        }
        let total = to_cents(draft.total_amount);

        let bill = self.bills.transact(|store| {
            store.create(|id| Bill {
                id,
                patient_id: patient.id.clone(),
                patient_name: patient.full_name(),
                date_issued: draft.date_issued,
                date_paid: None,
                status: Bill::UNPAID.to_string(),
                total_amount: total,
                amount_paid: to_cents(Decimal::ZERO),
            })
        })?;

        tracing::info!(id = %bill.id, patient = %patient.id, total = %bill.total_amount, "issued bill");
        let message = CmdMessage::success(format!(
            "Issued {} to {} for {}",
            bill.id, bill.patient_name, bill.total_amount
        ));
        Ok(Outcome::new(bill).with_message(message))
    }

    /// Records a payment against bill `id`.
    ///
    /// The amount must be positive and no more than the outstanding balance. A payment
    /// that settles the bill marks it `PAID` and stamps the paid date; anything less
    /// leaves it `PARTIAL`.
    ///
    /// The ledger entry is written first. If the bill then cannot be saved, the entry is
    /// taken back out so the ledger never shows money the bill does not.
    pub fn record_payment(&mut self, id: &str, draft: PaymentDraft) -> Result<Outcome<Bill>> {
        let current = self
            .find(id)
            .ok_or_else(|| MedrecError::not_found(RecordKind::Bill, id))?;

        let amount = to_cents(draft.amount);
        if amount <= Decimal::ZERO {
            return Err(MedrecError::validation("amount", "must be greater than zero"));
        }
        let balance = current.balance();
        if amount > balance {
            return Err(MedrecError::validation(
                "amount",
                format!("{} exceeds the outstanding balance of {}", amount, to_cents(balance)),
            ));
        }
        let method = match draft.method.trim() {
            "" => Payment::DEFAULT_METHOD.to_string(),
            m => m.to_uppercase(),
        };

        let payment = self.payments.transact(|store| {
            store.create(|pid| Payment {
                id: pid,
                bill_id: current.id.clone(),
                amount,
                paid_at: draft.paid_at,
                method,
                status: PaymentStatus::Completed,
            })
        })?;

        let paid_on = draft.paid_at.date();
        let updated = self.bills.transact(|store| {
            store.update(id, |b| {
                b.amount_paid = to_cents(b.amount_paid + amount);
                if b.is_settled() {
                    b.status = Bill::PAID.to_string();
                    b.date_paid = Some(paid_on);
                } else {
                    b.status = Bill::PARTIAL.to_string();
                }
            })
        });
        let bill = match updated {
            Ok(bill) => bill,
            Err(e) => {
                self.withdraw(&payment.id);
                return Err(e);
            }
        };

        tracing::info!(id = %payment.id, bill = %bill.id, amount = %amount, "recorded payment");
        let message = if bill.is_settled() {
            CmdMessage::success(format!("Recorded {}: {} paid in full", payment.id, bill.id))
        } else {
            CmdMessage::success(format!(
                "Recorded {}: {} on {}, {} outstanding",
                payment.id,
                amount,
                bill.id,
                to_cents(bill.balance())
            ))
        };
        Ok(Outcome::new(bill).with_message(message))
    }

    /// Takes back a ledger entry whose bill update failed.
    fn withdraw(&mut self, payment_id: &str) {
        let undone = self.payments.transact(|store| {
            store
                .remove(payment_id)
                .ok_or_else(|| MedrecError::not_found(RecordKind::Payment, payment_id))
        });
        if let Err(e) = undone {
            tracing::error!(
                id = %payment_id,
                path = %self.payments.location().display(),
                error = %e,
                "payment stays in the ledger but its bill was not updated"
            );
        }
    }

    /// Ledger entries for bill `id`, in the order they were recorded.
    pub fn payments_for(&self, bill_id: &str) -> Vec<Payment> {
        self.ledger()
            .find_by(|p| p.bill_id == bill_id)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn payments(&self) -> Vec<Payment> {
        self.ledger().all().to_vec()
    }

    /// Removes the bill. Its ledger entries are kept.
    pub fn remove(&mut self, id: &str) -> Result<Bill> {
        let bill = self.bills.transact(|store| {
            store
                .remove(id)
                .ok_or_else(|| MedrecError::not_found(RecordKind::Bill, id))
        })?;
        tracing::info!(id = %bill.id, "deleted bill");
        Ok(bill)
    }

    pub fn find(&self, id: &str) -> Option<Bill> {
        self.store().find_by_id(id).cloned()
    }

    pub fn for_patient(&self, patient_id: &str) -> Vec<Bill> {
        self.store()
            .find_by(|b| b.patient_id == patient_id)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn list(&self) -> Vec<Bill> {
        self.store().all().to_vec()
    }
}

impl<B: StorageBackend> ReferenceSource for BillingService<B> {
    fn dependent_kind(&self) -> RecordKind {
        RecordKind::Bill
    }

    fn find_all_referencing(&self, patient_id: &str) -> Vec<String> {
        self.store().find_all_referencing(patient_id)
    }
}
