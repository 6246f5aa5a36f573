// Journal Line + Journal Entry - the double-entry building blocks
//
// A JournalEntry is two or more lines that net to zero, belong to one entity,
// and share a document type and posting date. Entries validate themselves;
// an entry that fails validation never reaches the export set.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::Entity;
use crate::vocab::{AccountType, DocumentType, Department, Division, Market};

// ============================================================================
// JOURNAL LINE
// ============================================================================

/// One posting: a single account and a signed amount, plus the dimensional
/// metadata the ledger import format carries.
///
/// Amounts follow the ledger convention of a signed magnitude in `debit`
/// with `credit` defaulting to zero; `signed_amount()` is debit - credit.
/// Lines are immutable once constructed and owned by their parent entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalLine {
    pub account_type: AccountType,
    pub account_number: String,
    pub posting_date: NaiveDate,
    pub document_date: NaiveDate,
    /// Entry-wide document identifier, shared by every line of a batch.
    pub document_no: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub description: String,
    pub department: Department,
    pub market: Market,
    pub state: String,
    pub division: Division,
    pub business_unit_code: u32,
    /// The entity whose books this line posts to. A single entry may carry
    /// lines referencing another entity's business unit, but the owning
    /// entity is always the one that books the line.
    pub owning_entity: Entity,
    pub salesperson_code: Option<String>,
    pub client: Option<String>,
    pub customer: Option<String>,
    pub employee_id: Option<String>,
    pub expense_code: Option<String>,
    pub vendor_dimension: Option<String>,
    pub job_dimension: Option<String>,
    pub document_type: Option<DocumentType>,
    pub applies_to_document_type: Option<DocumentType>,
    pub applies_to_document_number: Option<String>,
    pub blank_field: Option<String>,
    pub reason_code: String,
}

impl JournalLine {
    /// Create a line with the required fields; optional dimensions default
    /// to unset, credit to zero, reason code to "R10".
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        account_type: AccountType,
        account_number: String,
        posting_date: NaiveDate,
        document_date: NaiveDate,
        document_no: String,
        debit: Decimal,
        description: String,
        department: Department,
        market: Market,
        state: String,
        division: Division,
        business_unit_code: u32,
        owning_entity: Entity,
    ) -> Self {
        JournalLine {
            account_type,
            account_number,
            posting_date,
            document_date,
            document_no,
            debit,
            credit: Decimal::ZERO,
            description,
            department,
            market,
            state,
            division,
            business_unit_code,
            owning_entity,
            salesperson_code: None,
            client: None,
            customer: None,
            employee_id: None,
            expense_code: None,
            vendor_dimension: None,
            job_dimension: None,
            document_type: None,
            applies_to_document_type: None,
            applies_to_document_number: None,
            blank_field: None,
            reason_code: "R10".to_string(),
        }
    }

    /// Builder pattern: set the document type
    pub fn with_document_type(mut self, document_type: DocumentType) -> Self {
        self.document_type = Some(document_type);
        self
    }

    /// Builder pattern: set the client dimension
    pub fn with_client(mut self, client: String) -> Self {
        self.client = Some(client);
        self
    }

    /// Builder pattern: set the customer dimension
    pub fn with_customer(mut self, customer: String) -> Self {
        self.customer = Some(customer);
        self
    }

    /// Builder pattern: set the employee dimension
    pub fn with_employee_id(mut self, employee_id: String) -> Self {
        self.employee_id = Some(employee_id);
        self
    }

    /// Builder pattern: set the job dimension
    pub fn with_job_dimension(mut self, job_dimension: String) -> Self {
        self.job_dimension = Some(job_dimension);
        self
    }

    /// Builder pattern: link this line to the document it applies to
    pub fn with_applies_to(mut self, doc_type: DocumentType, doc_number: String) -> Self {
        self.applies_to_document_type = Some(doc_type);
        self.applies_to_document_number = Some(doc_number);
        self
    }

    /// The signed posting amount: debit minus credit.
    pub fn signed_amount(&self) -> Decimal {
        self.debit - self.credit
    }
}

// ============================================================================
// JOURNAL ENTRY
// ============================================================================

/// Validation failures, one variant per entry invariant. Each carries a
/// per-line summary so the offending entry can be diagnosed from the error
/// alone.
#[derive(Debug, Error)]
pub enum JournalEntryError {
    #[error("journal entry has no lines")]
    Empty,

    #[error("journal lines do not net to zero, they equal {net}\n{summary}")]
    NotBalanced { net: Decimal, summary: String },

    #[error("journal line document types do not match\n{summary}")]
    DocumentTypeMismatch { summary: String },

    #[error("journal lines span more than one owning entity\n{summary}")]
    EntityMismatch { summary: String },

    #[error("journal line posting dates do not match\n{summary}")]
    PostingDateMismatch { summary: String },
}

/// A balanced group of postings recorded together.
///
/// Line order is insertion order and is preserved through export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub description: String,
    pub posting_date: NaiveDate,
    /// The payment/document reference this entry was created for.
    pub identifier: String,
    pub lines: Vec<JournalLine>,
}

impl JournalEntry {
    pub fn new(
        description: String,
        posting_date: NaiveDate,
        identifier: String,
        lines: Vec<JournalLine>,
    ) -> Self {
        JournalEntry {
            description,
            posting_date,
            identifier,
            lines,
        }
    }

    /// Check every entry invariant, in a fixed order:
    /// net-to-zero, matching document types, one owning entity, matching
    /// posting dates. The first violated invariant is returned.
    ///
    /// Posting dates cannot be missing: `NaiveDate` makes an unset date
    /// unrepresentable, so only the all-equal check remains.
    pub fn validate(&self) -> Result<(), JournalEntryError> {
        if self.lines.is_empty() {
            return Err(JournalEntryError::Empty);
        }
        self.validate_lines_net_to_zero()?;
        self.validate_document_types_match()?;
        self.validate_lines_for_one_entity()?;
        self.validate_posting_dates_match()?;
        Ok(())
    }

    fn validate_lines_net_to_zero(&self) -> Result<(), JournalEntryError> {
        let net: Decimal = self.lines.iter().map(JournalLine::signed_amount).sum();
        if net.is_zero() {
            Ok(())
        } else {
            Err(JournalEntryError::NotBalanced {
                net,
                summary: self.line_summary(),
            })
        }
    }

    fn validate_document_types_match(&self) -> Result<(), JournalEntryError> {
        if all_equal(self.lines.iter().map(|line| line.document_type)) {
            Ok(())
        } else {
            Err(JournalEntryError::DocumentTypeMismatch {
                summary: self.line_summary(),
            })
        }
    }

    fn validate_lines_for_one_entity(&self) -> Result<(), JournalEntryError> {
        if all_equal(
            self.lines
                .iter()
                .map(|line| line.owning_entity.business_unit_code),
        ) {
            Ok(())
        } else {
            Err(JournalEntryError::EntityMismatch {
                summary: self.line_summary(),
            })
        }
    }

    fn validate_posting_dates_match(&self) -> Result<(), JournalEntryError> {
        if all_equal(self.lines.iter().map(|line| line.posting_date)) {
            Ok(())
        } else {
            Err(JournalEntryError::PostingDateMismatch {
                summary: self.line_summary(),
            })
        }
    }

    /// One row per line: account, owning entity, posting date, debit, credit.
    fn line_summary(&self) -> String {
        self.lines
            .iter()
            .map(|line| {
                format!(
                    "  {} | {} | {} | debit {} | credit {} | {}",
                    line.account_number,
                    line.owning_entity.abbreviation,
                    line.posting_date,
                    line.debit,
                    line.credit,
                    line.description,
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn all_equal<T: PartialEq>(mut iter: impl Iterator<Item = T>) -> bool {
    match iter.next() {
        None => true,
        Some(first) => iter.all(|item| item == first),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{INTERCOMPANY_GL_ASSET_ACCOUNT, INTERCOMPANY_GL_LIABILITY_ACCOUNT};
    use rust_decimal_macros::dec;

    fn entity() -> Entity {
        Entity::new(1007, "NebulaSolutions", "NS", Market::Phoenix, "AZ", Division::One)
    }

    fn other_entity() -> Entity {
        Entity::new(1023, "StellarGlobe", "SG", Market::Pittsburgh, "PA", Division::Two)
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn line(account: &str, debit: Decimal, owner: Entity, posting: NaiveDate) -> JournalLine {
        JournalLine::new(
            AccountType::GeneralLedger,
            account.to_string(),
            posting,
            date(1),
            "SJ20240301C1".to_string(),
            debit,
            "March statement".to_string(),
            Department::Corporate,
            Market::Phoenix,
            "AZ".to_string(),
            Division::One,
            owner.business_unit_code,
            owner,
        )
        .with_document_type(DocumentType::Invoice)
    }

    #[test]
    fn test_line_defaults() {
        let l = line("41000", dec!(-100.00), entity(), date(15));
        assert_eq!(l.credit, Decimal::ZERO);
        assert_eq!(l.reason_code, "R10");
        assert!(l.client.is_none());
        assert!(l.applies_to_document_number.is_none());
        assert_eq!(l.signed_amount(), dec!(-100.00));
    }

    #[test]
    fn test_line_builder_applies_to() {
        let l = line("P100", dec!(300.00), entity(), date(15))
            .with_client("C1".to_string())
            .with_applies_to(DocumentType::Payment, "CK-445".to_string());
        assert_eq!(l.client.as_deref(), Some("C1"));
        assert_eq!(l.applies_to_document_type, Some(DocumentType::Payment));
        assert_eq!(l.applies_to_document_number.as_deref(), Some("CK-445"));
    }

    #[test]
    fn test_balanced_entry_is_valid() {
        let entry = JournalEntry::new(
            "intercompany".to_string(),
            date(15),
            "CK-445".to_string(),
            vec![
                line("41000", dec!(-100.00), entity(), date(15)),
                line(INTERCOMPANY_GL_ASSET_ACCOUNT, dec!(100.00), entity(), date(15)),
            ],
        );
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn test_unbalanced_entry_fails() {
        let entry = JournalEntry::new(
            "bad".to_string(),
            date(15),
            "CK-445".to_string(),
            vec![
                line("41000", dec!(-100.00), entity(), date(15)),
                line(INTERCOMPANY_GL_ASSET_ACCOUNT, dec!(100.01), entity(), date(15)),
            ],
        );
        match entry.validate() {
            Err(JournalEntryError::NotBalanced { net, .. }) => assert_eq!(net, dec!(0.01)),
            other => panic!("expected NotBalanced, got {other:?}"),
        }
    }

    #[test]
    fn test_net_to_zero_uses_credit_field() {
        let mut credit_line = line("41000", dec!(0.00), entity(), date(15));
        credit_line.credit = dec!(100.00);
        let entry = JournalEntry::new(
            "debit vs credit".to_string(),
            date(15),
            "CK-445".to_string(),
            vec![
                line(INTERCOMPANY_GL_LIABILITY_ACCOUNT, dec!(100.00), entity(), date(15)),
                credit_line,
            ],
        );
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn test_document_type_mismatch_fails() {
        let mut payment = line("41000", dec!(-100.00), entity(), date(15));
        payment.document_type = Some(DocumentType::Payment);
        let entry = JournalEntry::new(
            "mixed types".to_string(),
            date(15),
            "CK-445".to_string(),
            vec![
                payment,
                line(INTERCOMPANY_GL_ASSET_ACCOUNT, dec!(100.00), entity(), date(15)),
            ],
        );
        assert!(matches!(
            entry.validate(),
            Err(JournalEntryError::DocumentTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_shared_none_document_type_is_valid() {
        let mut a = line("41000", dec!(-50.00), entity(), date(15));
        let mut b = line(INTERCOMPANY_GL_ASSET_ACCOUNT, dec!(50.00), entity(), date(15));
        a.document_type = None;
        b.document_type = None;
        let entry = JournalEntry::new(
            "no doc type".to_string(),
            date(15),
            "CK-445".to_string(),
            vec![a, b],
        );
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn test_entity_mismatch_fails() {
        let entry = JournalEntry::new(
            "two entities".to_string(),
            date(15),
            "CK-445".to_string(),
            vec![
                line("41000", dec!(-100.00), entity(), date(15)),
                line(INTERCOMPANY_GL_ASSET_ACCOUNT, dec!(100.00), other_entity(), date(15)),
            ],
        );
        assert!(matches!(
            entry.validate(),
            Err(JournalEntryError::EntityMismatch { .. })
        ));
    }

    #[test]
    fn test_posting_date_mismatch_fails() {
        let entry = JournalEntry::new(
            "two dates".to_string(),
            date(15),
            "CK-445".to_string(),
            vec![
                line("41000", dec!(-100.00), entity(), date(15)),
                line(INTERCOMPANY_GL_ASSET_ACCOUNT, dec!(100.00), entity(), date(16)),
            ],
        );
        assert!(matches!(
            entry.validate(),
            Err(JournalEntryError::PostingDateMismatch { .. })
        ));
    }

    #[test]
    fn test_empty_entry_fails() {
        let entry = JournalEntry::new(
            "empty".to_string(),
            date(15),
            "CK-445".to_string(),
            vec![],
        );
        assert!(matches!(entry.validate(), Err(JournalEntryError::Empty)));
    }

    #[test]
    fn test_validation_order_reports_balance_first() {
        // A line set that is both unbalanced and split across entities must
        // report the balance failure.
        let entry = JournalEntry::new(
            "doubly bad".to_string(),
            date(15),
            "CK-445".to_string(),
            vec![
                line("41000", dec!(-100.00), entity(), date(15)),
                line(INTERCOMPANY_GL_ASSET_ACCOUNT, dec!(250.00), other_entity(), date(16)),
            ],
        );
        assert!(matches!(
            entry.validate(),
            Err(JournalEntryError::NotBalanced { .. })
        ));
    }
}
