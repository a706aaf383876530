use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single income or expense entry.
///
/// The id is fixed at construction; deletion is logical and only flips the status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    id: Uuid,
    pub kind: TransactionKind,
    pub amount: f64,
    pub category_id: Uuid,
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub note: String,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        kind: TransactionKind,
        amount: f64,
        category_id: Uuid,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), kind, amount, category_id, timestamp)
    }

    /// Builds a transaction with a caller supplied id. A nil id is kept as is so
    /// that [`Account::add_transaction`](super::Account::add_transaction) can reject it.
    pub fn with_id(
        id: Uuid,
        kind: TransactionKind,
        amount: f64,
        category_id: Uuid,
        timestamp: NaiveDateTime,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            kind,
            amount,
            category_id,
            timestamp,
            note: String::new(),
            status: TransactionStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn income(amount: f64, category_id: Uuid, timestamp: NaiveDateTime) -> Self {
        Self::new(TransactionKind::Income, amount, category_id, timestamp)
    }

    pub fn expense(amount: f64, category_id: Uuid, timestamp: NaiveDateTime) -> Self {
        Self::new(TransactionKind::Expense, amount, category_id, timestamp)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    pub fn is_deleted(&self) -> bool {
        self.status == TransactionStatus::Deleted
    }

    pub fn mark_saved(&mut self) {
        self.status = TransactionStatus::Saved;
        self.touch();
    }

    pub fn mark_modified(&mut self) {
        self.status = TransactionStatus::Modified;
        self.touch();
    }

    pub fn mark_deleted(&mut self) {
        self.status = TransactionStatus::Deleted;
        self.touch();
    }

    /// Brings a deleted transaction back. Returns `false` when it was not deleted.
    pub fn restore(&mut self) -> bool {
        if !self.is_deleted() {
            return false;
        }
        self.status = TransactionStatus::Restored;
        self.touch();
        true
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TransactionKind {
    Income,
    #[default]
    Expense,
}

impl TransactionKind {
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TransactionStatus {
    #[default]
    Draft,
    Saved,
    Modified,
    Deleted,
    Restored,
}
