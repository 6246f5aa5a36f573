// Import Batch - aggregation + the two-phase entry builder/balancer
//
// One batch is one statement run. Construction resolves every line's entity
// against the registry (unknown codes fail fast) and fixes the batch context;
// `create()` then builds the output entries in two phases:
//
//   Phase 1: for every entity other than the deposit entity, an intercompany
//            entry moving its revenue back to the deposit entity
//            (revenue lines at -amount, balanced by a due-from line).
//   Phase 2: one consolidated deposit entry in the deposit entity netting
//            the customer deposit against its own revenue and the
//            due-to lines for every other entity.
//
// Every entry validates before it is appended; the first invalid entry
// aborts the batch with no partial output.

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;

use crate::entities::{Entity, EntityRegistry};
use crate::error::{ImportError, Result};
use crate::journal::{JournalEntry, JournalLine};
use crate::statement::StatementLine;
use crate::vocab::{
    AccountType, Department, DocumentType, Division, Market, INTERCOMPANY_GL_ASSET_ACCOUNT,
    INTERCOMPANY_GL_LIABILITY_ACCOUNT,
};

/// Quantize an amount to cents.
///
/// Midpoint-to-even (banker's rounding): 0.005 -> 0.00, 0.015 -> 0.02.
fn cents(amount: Decimal) -> Decimal {
    amount.round_dp(2)
}

// ============================================================================
// BATCH PARAMETERS
// ============================================================================

/// Batch-level context supplied by the caller (the CLI).
#[derive(Debug, Clone)]
pub struct BatchParams {
    pub posting_date: NaiveDate,
    pub document_date: NaiveDate,
    pub statement_reference: String,
    /// The payment's reference, normally the check number or EFT date.
    pub payment_number: String,
    /// Document type the deposit line applies to.
    pub applies_to_type: DocumentType,
    /// Code of the entity that banks the cash.
    pub deposit_entity_code: String,
    /// Customer account the deposit posts to.
    pub client_code: String,
    pub department: Department,
    pub market: Market,
    pub state: String,
    pub division: Division,
}

// ============================================================================
// IMPORT BATCH
// ============================================================================

/// One statement import run: resolved lines, deposit context, and the
/// accumulated output entries.
pub struct ImportBatch {
    /// Statement lines paired with their resolved entity, in input order.
    lines: Vec<(Entity, StatementLine)>,
    pub posting_date: NaiveDate,
    pub document_date: NaiveDate,
    pub statement_reference: String,
    pub deposit_id: String,
    pub deposit_document_type: DocumentType,
    pub deposit_entity: Entity,
    pub deposit_client_code: String,
    pub deposit_department: Department,
    pub deposit_market: Market,
    pub deposit_state: String,
    pub deposit_division: Division,
    /// Batch-unique document number stamped on every generated line.
    pub entry_id: String,
    pub entries: Vec<JournalEntry>,
    // compute-once caches; the raw lines cannot change after construction
    statement_total: Option<Decimal>,
    entity_totals: Option<Vec<(Entity, Decimal)>>,
}

impl ImportBatch {
    /// Resolve every statement line against the registry and fix the batch
    /// context. Fails fast on an empty statement, an unknown deposit entity
    /// code, or any line referencing an entity the registry does not know.
    pub fn new(
        lines: Vec<StatementLine>,
        params: BatchParams,
        registry: &EntityRegistry,
    ) -> Result<Self> {
        if lines.is_empty() {
            return Err(ImportError::EmptyStatement);
        }

        let deposit_entity = registry
            .get(&params.deposit_entity_code)
            .cloned()
            .ok_or_else(|| ImportError::UnknownEntity(params.deposit_entity_code.clone()))?;

        let resolved = lines
            .into_iter()
            .map(|line| {
                let entity = registry
                    .get(&line.entity_code)
                    .cloned()
                    .ok_or_else(|| ImportError::UnknownEntity(line.entity_code.clone()))?;
                Ok((entity, line))
            })
            .collect::<Result<Vec<_>>>()?;

        let entry_id = format!(
            "SJ{}{}",
            Local::now().format("%Y%m%d"),
            params.client_code
        );

        Ok(ImportBatch {
            lines: resolved,
            posting_date: params.posting_date,
            document_date: params.document_date,
            statement_reference: params.statement_reference,
            deposit_id: params.payment_number,
            deposit_document_type: params.applies_to_type,
            deposit_entity,
            deposit_client_code: params.client_code,
            deposit_department: params.department,
            deposit_market: params.market,
            deposit_state: params.state,
            deposit_division: params.division,
            entry_id,
            entries: Vec::new(),
            statement_total: None,
            entity_totals: None,
        })
    }

    // ========================================================================
    // AGGREGATION
    // ========================================================================

    /// Total cash the batch deposits: the sum of every line amount quantized
    /// to cents. Computed once and cached; the lines cannot change afterward.
    pub fn statement_total(&mut self) -> Decimal {
        let lines = &self.lines;
        *self
            .statement_total
            .get_or_insert_with(|| lines.iter().map(|(_, line)| cents(line.amount)).sum())
    }

    /// Per-entity totals in first-seen order, each line quantized to cents
    /// before summing so every total equals the sum of its posted lines.
    /// Computed once and cached.
    pub fn entity_totals(&mut self) -> &[(Entity, Decimal)] {
        let lines = &self.lines;
        self.entity_totals.get_or_insert_with(|| {
            let mut totals: Vec<(Entity, Decimal)> = Vec::new();
            for (entity, line) in lines {
                let amount = cents(line.amount);
                match totals
                    .iter_mut()
                    .find(|(known, _)| known.business_unit_code == entity.business_unit_code)
                {
                    Some((_, total)) => *total += amount,
                    None => totals.push((entity.clone(), amount)),
                }
            }
            totals
        })
    }

    // ========================================================================
    // ENTRY BUILDER
    // ========================================================================

    /// Build and validate all output entries. Invoked once per batch; any
    /// invalid entry aborts the run with nothing exported.
    pub fn create(&mut self) -> Result<()> {
        self.build_intercompany_entries()?;
        self.build_deposit_entry()?;
        Ok(())
    }

    /// Phase 1: one intercompany entry per non-deposit entity, even when its
    /// lines net to zero (the revenue lines still need their offset).
    fn build_intercompany_entries(&mut self) -> Result<()> {
        let totals = self.entity_totals().to_vec();
        for (entity, total) in totals {
            if entity.business_unit_code == self.deposit_entity.business_unit_code {
                continue;
            }

            let mut lines: Vec<JournalLine> = self
                .lines
                .iter()
                .filter(|(owner, _)| owner.business_unit_code == entity.business_unit_code)
                .map(|(owner, line)| self.revenue_line(owner, line, &entity))
                .collect();
            lines.push(self.intercompany_asset_line(&entity, total));

            let entry = JournalEntry::new(
                format!(
                    "Revenue entry in entities other than deposit entity \
                     intercompanying back to deposit entity: {}",
                    self.deposit_entity.abbreviation
                ),
                self.posting_date,
                self.deposit_id.clone(),
                lines,
            );
            entry.validate()?;
            self.entries.push(entry);
        }
        Ok(())
    }

    /// Phase 2: the consolidated deposit entry, always built. Line order is
    /// deposit line, then the deposit entity's own revenue, then one
    /// due-to line per other entity.
    fn build_deposit_entry(&mut self) -> Result<()> {
        let totals = self.entity_totals().to_vec();
        let statement_total = self.statement_total();

        let mut lines = vec![self.deposit_line(statement_total)];

        let revenue_lines: Vec<JournalLine> = self
            .lines
            .iter()
            .filter(|(owner, _)| {
                owner.business_unit_code == self.deposit_entity.business_unit_code
            })
            .map(|(owner, line)| self.revenue_line(owner, line, &self.deposit_entity))
            .collect();

        let intercompany_lines: Vec<JournalLine> = totals
            .iter()
            .filter(|(entity, _)| {
                entity.business_unit_code != self.deposit_entity.business_unit_code
            })
            .map(|(entity, total)| self.intercompany_liability_line(entity, *total))
            .collect();

        let mut description = format!(
            "Created deposit line in {}",
            self.deposit_entity.abbreviation
        );
        if !revenue_lines.is_empty() {
            description.push_str(" with revenue lines");
        }
        if !intercompany_lines.is_empty() {
            description.push_str(" and intercompany lines");
        }

        lines.extend(revenue_lines);
        lines.extend(intercompany_lines);

        let entry = JournalEntry::new(
            description,
            self.posting_date,
            self.deposit_id.clone(),
            lines,
        );
        entry.validate()?;
        self.entries.push(entry);
        Ok(())
    }

    // ========================================================================
    // LINE BUILDERS
    // ========================================================================

    /// A revenue line reverses one statement line (debit = -amount) into the
    /// books of `owning_entity`. Lines pulled out of a non-deposit entity get
    /// the deposit entity's abbreviation prefixed to the description.
    fn revenue_line(
        &self,
        line_entity: &Entity,
        line: &StatementLine,
        owning_entity: &Entity,
    ) -> JournalLine {
        let description =
            if owning_entity.business_unit_code == self.deposit_entity.business_unit_code {
                line.description.clone()
            } else {
                format!("{} - {}", self.deposit_entity.abbreviation, line.description)
            };

        let mut built = JournalLine::new(
            AccountType::GeneralLedger,
            line.account_number.clone(),
            line.posting_date,
            line.document_date,
            self.entry_id.clone(),
            -cents(line.amount),
            description,
            line.department,
            line.market,
            line.state.clone(),
            line.division,
            line_entity.business_unit_code,
            owning_entity.clone(),
        )
        .with_document_type(DocumentType::Invoice)
        .with_client(line.client.clone());

        if let Some(customer) = &line.customer {
            built = built.with_customer(customer.clone());
        }
        if let Some(employee_id) = &line.employee_id {
            built = built.with_employee_id(employee_id.clone());
        }
        if let Some(job_dimension) = &line.job_dimension {
            built = built.with_job_dimension(job_dimension.clone());
        }
        built
    }

    /// The due-from line balancing a non-deposit entity's revenue. Dimensions
    /// come from the deposit entity's reference record, not the owning one.
    fn intercompany_asset_line(&self, entity: &Entity, total: Decimal) -> JournalLine {
        JournalLine::new(
            AccountType::GeneralLedger,
            INTERCOMPANY_GL_ASSET_ACCOUNT.to_string(),
            self.posting_date,
            self.document_date,
            self.entry_id.clone(),
            total,
            format!("{} - {}", entity.abbreviation, self.first_description()),
            Department::Corporate,
            self.deposit_entity.major_market,
            self.deposit_entity.major_state.clone(),
            self.deposit_entity.major_division,
            self.deposit_entity.business_unit_code,
            entity.clone(),
        )
        .with_document_type(DocumentType::Invoice)
        .with_client(self.deposit_client_code.clone())
    }

    /// The due-to line in the deposit entity's books for one other entity.
    /// Booked by the deposit entity but carrying the other entity's
    /// market/state/division/business-unit dimensions.
    fn intercompany_liability_line(&self, entity: &Entity, total: Decimal) -> JournalLine {
        JournalLine::new(
            AccountType::GeneralLedger,
            INTERCOMPANY_GL_LIABILITY_ACCOUNT.to_string(),
            self.posting_date,
            self.document_date,
            self.entry_id.clone(),
            -total,
            format!("{} - {}", entity.abbreviation, self.first_description()),
            Department::Corporate,
            entity.major_market,
            entity.major_state.clone(),
            entity.major_division,
            entity.business_unit_code,
            self.deposit_entity.clone(),
        )
        .with_document_type(DocumentType::Invoice)
        .with_client(self.deposit_client_code.clone())
    }

    /// The customer-subledger line for the banked cash.
    fn deposit_line(&self, statement_total: Decimal) -> JournalLine {
        JournalLine::new(
            AccountType::Customer,
            self.deposit_client_code.clone(),
            self.posting_date,
            self.document_date,
            self.entry_id.clone(),
            statement_total,
            self.first_description(),
            self.deposit_department,
            self.deposit_market,
            self.deposit_state.clone(),
            self.deposit_division,
            self.deposit_entity.business_unit_code,
            self.deposit_entity.clone(),
        )
        .with_document_type(DocumentType::Invoice)
        .with_client(self.deposit_client_code.clone())
        .with_applies_to(self.deposit_document_type, self.deposit_id.clone())
    }

    // The first statement line's description stands in for the batch as a
    // whole on deposit and clearing lines. Imperfect, but it is what the
    // downstream ledger reports show.
    fn first_description(&self) -> String {
        self.lines[0].1.description.clone()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn posting() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
    }

    fn document() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn stmt_line(entity_code: &str, amount: Decimal) -> StatementLine {
        StatementLine {
            entity_code: entity_code.to_string(),
            account_number: "41000".to_string(),
            amount,
            description: "March commission statement".to_string(),
            department: Department::Sales,
            market: Market::Phoenix,
            state: "AZ".to_string(),
            division: Division::One,
            client: "C1".to_string(),
            posting_date: posting(),
            document_date: document(),
            customer: None,
            employee_id: None,
            job_dimension: None,
        }
    }

    /// Deposit entity is E2 (StellarGlobe, "SG", business unit 1023).
    fn params() -> BatchParams {
        BatchParams {
            posting_date: posting(),
            document_date: document(),
            statement_reference: "stmt-2024-03".to_string(),
            payment_number: "445".to_string(),
            applies_to_type: DocumentType::Payment,
            deposit_entity_code: "E2".to_string(),
            client_code: "P100".to_string(),
            department: Department::Finance,
            market: Market::Pittsburgh,
            state: "PA".to_string(),
            division: Division::Two,
        }
    }

    fn batch(lines: Vec<StatementLine>) -> ImportBatch {
        ImportBatch::new(lines, params(), &EntityRegistry::default()).unwrap()
    }

    #[test]
    fn test_unknown_line_entity_fails_before_entries() {
        let result = ImportBatch::new(
            vec![stmt_line("E99", dec!(10.00))],
            params(),
            &EntityRegistry::default(),
        );
        match result {
            Err(ImportError::UnknownEntity(code)) => assert_eq!(code, "E99"),
            other => panic!("expected UnknownEntity, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_unknown_deposit_entity_fails() {
        let mut bad = params();
        bad.deposit_entity_code = "E0".to_string();
        let result = ImportBatch::new(
            vec![stmt_line("E1", dec!(10.00))],
            bad,
            &EntityRegistry::default(),
        );
        assert!(matches!(result, Err(ImportError::UnknownEntity(_))));
    }

    #[test]
    fn test_empty_statement_rejected() {
        let result = ImportBatch::new(vec![], params(), &EntityRegistry::default());
        assert!(matches!(result, Err(ImportError::EmptyStatement)));
    }

    #[test]
    fn test_entry_id_format() {
        let b = batch(vec![stmt_line("E1", dec!(10.00))]);
        assert!(b.entry_id.starts_with("SJ"));
        assert!(b.entry_id.ends_with("P100"));
        // SJ + YYYYMMDD + client code
        assert_eq!(b.entry_id.len(), 2 + 8 + 4);
    }

    #[test]
    fn test_entity_totals_sums_per_entity() {
        let mut b = batch(vec![
            stmt_line("E1", dec!(60.00)),
            stmt_line("E2", dec!(200.00)),
            stmt_line("E1", dec!(40.00)),
        ]);
        let totals = b.entity_totals().to_vec();
        assert_eq!(totals.len(), 2);
        // first-seen order preserved
        assert_eq!(totals[0].0.business_unit_code, 1007);
        assert_eq!(totals[0].1, dec!(100.00));
        assert_eq!(totals[1].0.business_unit_code, 1023);
        assert_eq!(totals[1].1, dec!(200.00));
    }

    #[test]
    fn test_entity_totals_idempotent() {
        let mut b = batch(vec![
            stmt_line("E1", dec!(60.00)),
            stmt_line("E2", dec!(200.00)),
        ]);
        let first = b.entity_totals().to_vec();
        let second = b.entity_totals().to_vec();
        assert_eq!(first, second);
        assert_eq!(b.statement_total(), b.statement_total());
    }

    #[test]
    fn test_rounding_is_midpoint_to_even() {
        let mut b = batch(vec![
            stmt_line("E1", dec!(0.005)),
            stmt_line("E3", dec!(0.015)),
            stmt_line("E4", dec!(0.025)),
        ]);
        let totals = b.entity_totals().to_vec();
        assert_eq!(totals[0].1, dec!(0.00));
        assert_eq!(totals[1].1, dec!(0.02));
        assert_eq!(totals[2].1, dec!(0.02));
        assert_eq!(b.statement_total(), dec!(0.04));
    }

    #[test]
    fn test_round_trip_example() {
        // Entity A = E1 (100.00), deposit entity B = E2 (200.00), client P100.
        let mut b = batch(vec![
            stmt_line("E1", dec!(100.00)),
            stmt_line("E2", dec!(200.00)),
        ]);
        b.create().unwrap();
        assert_eq!(b.entries.len(), 2);

        // Intercompany entry for E1: revenue -100.00, due-from +100.00.
        let intercompany = &b.entries[0];
        assert_eq!(intercompany.lines.len(), 2);
        assert_eq!(intercompany.identifier, "445");
        let revenue = &intercompany.lines[0];
        assert_eq!(revenue.debit, dec!(-100.00));
        assert_eq!(revenue.owning_entity.business_unit_code, 1007);
        assert_eq!(revenue.description, "SG - March commission statement");
        let asset = &intercompany.lines[1];
        assert_eq!(asset.account_number, INTERCOMPANY_GL_ASSET_ACCOUNT);
        assert_eq!(asset.debit, dec!(100.00));
        assert_eq!(asset.owning_entity.business_unit_code, 1007);
        // dimensions come from the deposit entity's record
        assert_eq!(asset.market, Market::Pittsburgh);
        assert_eq!(asset.business_unit_code, 1023);
        assert_eq!(asset.department, Department::Corporate);

        // Deposit entry: deposit 300.00, own revenue -200.00, due-to -100.00.
        let deposit = &b.entries[1];
        assert_eq!(deposit.lines.len(), 3);
        let cash = &deposit.lines[0];
        assert_eq!(cash.account_type, AccountType::Customer);
        assert_eq!(cash.account_number, "P100");
        assert_eq!(cash.debit, dec!(300.00));
        assert_eq!(cash.applies_to_document_type, Some(DocumentType::Payment));
        assert_eq!(cash.applies_to_document_number.as_deref(), Some("445"));
        let own_revenue = &deposit.lines[1];
        assert_eq!(own_revenue.debit, dec!(-200.00));
        assert_eq!(own_revenue.description, "March commission statement");
        assert_eq!(own_revenue.owning_entity.business_unit_code, 1023);
        let liability = &deposit.lines[2];
        assert_eq!(liability.account_number, INTERCOMPANY_GL_LIABILITY_ACCOUNT);
        assert_eq!(liability.debit, dec!(-100.00));
        // booked by the deposit entity, dimensioned for the other one
        assert_eq!(liability.owning_entity.business_unit_code, 1023);
        assert_eq!(liability.business_unit_code, 1007);
        assert_eq!(liability.market, Market::Phoenix);

        // Both entries net to exactly zero.
        for entry in &b.entries {
            let net: Decimal = entry.lines.iter().map(JournalLine::signed_amount).sum();
            assert_eq!(net, Decimal::ZERO);
        }
    }

    #[test]
    fn test_every_entry_nets_to_zero() {
        let mut b = batch(vec![
            stmt_line("E1", dec!(123.45)),
            stmt_line("E3", dec!(0.015)),
            stmt_line("E2", dec!(999.99)),
            stmt_line("E1", dec!(-23.45)),
        ]);
        b.create().unwrap();
        for entry in &b.entries {
            let net: Decimal = entry.lines.iter().map(JournalLine::signed_amount).sum();
            assert_eq!(net, Decimal::ZERO, "entry not balanced: {}", entry.description);
        }
    }

    #[test]
    fn test_entity_coverage() {
        let mut b = batch(vec![
            stmt_line("E1", dec!(100.00)),
            stmt_line("E2", dec!(200.00)),
            stmt_line("E3", dec!(50.00)),
        ]);
        b.create().unwrap();
        // Two intercompany entries (E1, E3) plus the deposit entry.
        assert_eq!(b.entries.len(), 3);
        let intercompany_owners: Vec<u32> = b.entries[..2]
            .iter()
            .map(|entry| entry.lines[0].owning_entity.business_unit_code)
            .collect();
        assert_eq!(intercompany_owners, vec![1007, 1016]);
        // The deposit entity's revenue appears only in the deposit entry.
        let deposit = b.entries.last().unwrap();
        assert!(deposit
            .lines
            .iter()
            .all(|line| line.owning_entity.business_unit_code == 1023));
    }

    #[test]
    fn test_total_conservation() {
        let amounts = [dec!(100.00), dec!(200.00), dec!(50.25), dec!(-10.10)];
        let mut b = batch(vec![
            stmt_line("E1", amounts[0]),
            stmt_line("E2", amounts[1]),
            stmt_line("E3", amounts[2]),
            stmt_line("E2", amounts[3]),
        ]);
        b.create().unwrap();
        let revenue_total: Decimal = b
            .entries
            .iter()
            .flat_map(|entry| entry.lines.iter())
            .filter(|line| line.account_number == "41000")
            .map(|line| line.debit)
            .sum();
        let input_total: Decimal = amounts.iter().copied().sum();
        assert_eq!(revenue_total, -input_total);
    }

    #[test]
    fn test_zero_net_entity_still_gets_entry() {
        let mut b = batch(vec![
            stmt_line("E1", dec!(50.00)),
            stmt_line("E1", dec!(-50.00)),
            stmt_line("E2", dec!(10.00)),
        ]);
        b.create().unwrap();
        assert_eq!(b.entries.len(), 2);
        let intercompany = &b.entries[0];
        assert_eq!(intercompany.lines.len(), 3);
        let asset = intercompany.lines.last().unwrap();
        assert_eq!(asset.account_number, INTERCOMPANY_GL_ASSET_ACCOUNT);
        assert_eq!(asset.debit, dec!(0.00));
        assert!(intercompany.validate().is_ok());
    }

    #[test]
    fn test_deposit_description_with_revenue_only() {
        let mut b = batch(vec![stmt_line("E2", dec!(10.00))]);
        b.create().unwrap();
        assert_eq!(b.entries.len(), 1);
        assert_eq!(
            b.entries[0].description,
            "Created deposit line in SG with revenue lines"
        );
    }

    #[test]
    fn test_deposit_description_with_intercompany_only() {
        let mut b = batch(vec![stmt_line("E1", dec!(10.00))]);
        b.create().unwrap();
        let deposit = b.entries.last().unwrap();
        assert_eq!(
            deposit.description,
            "Created deposit line in SG and intercompany lines"
        );
    }

    #[test]
    fn test_deposit_description_with_both() {
        let mut b = batch(vec![
            stmt_line("E1", dec!(10.00)),
            stmt_line("E2", dec!(20.00)),
        ]);
        b.create().unwrap();
        let deposit = b.entries.last().unwrap();
        assert_eq!(
            deposit.description,
            "Created deposit line in SG with revenue lines and intercompany lines"
        );
    }

    #[test]
    fn test_mismatched_posting_date_aborts_batch() {
        let mut stale = stmt_line("E1", dec!(10.00));
        stale.posting_date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let mut b = batch(vec![stale]);
        match b.create() {
            Err(ImportError::InvalidEntry(err)) => {
                assert!(err.to_string().contains("posting dates"));
            }
            other => panic!("expected InvalidEntry, got {:?}", other.map(|_| ())),
        }
        // Nothing was appended for the failed entry.
        assert!(b.entries.is_empty());
    }

    #[test]
    fn test_document_number_shared_across_lines() {
        let mut b = batch(vec![
            stmt_line("E1", dec!(10.00)),
            stmt_line("E2", dec!(20.00)),
        ]);
        b.create().unwrap();
        let entry_id = b.entry_id.clone();
        for line in b.entries.iter().flat_map(|entry| entry.lines.iter()) {
            assert_eq!(line.document_no, entry_id);
        }
    }
}
