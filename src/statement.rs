// Statement Reader - versioned column mapping + CSV parsing
//
// Input is a tabular revenue statement. Header names vary between exporting
// systems, so each supported layout gets a versioned conversion table mapping
// header variants (case-insensitive) to canonical column names. Required
// columns must all be present after mapping or the import fails before any
// row is parsed.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use csv::StringRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ImportError, Result};
use crate::vocab::{Department, Division, Market};

// ============================================================================
// COLUMN CONVERSION TABLES
// ============================================================================

/// One supported input layout: header variants and the columns that must
/// survive the mapping.
struct ConversionTable {
    /// lowercase header variant -> canonical column name
    columns: &'static [(&'static str, &'static str)],
    required: &'static [&'static str],
}

/// Layout exported by the revenue system since 2020-02-24.
static V20200224: ConversionTable = ConversionTable {
    columns: &[
        ("account no.", "account_number"),
        ("posting date", "posting_date"),
        ("document date", "document_date"),
        ("amount", "amount"),
        ("description", "description"),
        ("department", "department"),
        ("market", "market"),
        ("state", "state"),
        ("customer", "customer"),
        ("division", "division"),
        ("client", "client"),
        ("employee id", "employee_id"),
        ("job dimension", "job_dimension"),
        ("entity", "entity"),
    ],
    required: &[
        "account_number",
        "posting_date",
        "document_date",
        "amount",
        "description",
        "department",
        "market",
        "state",
        "division",
        "client",
        "entity",
    ],
};

fn conversion_for(version: &str) -> Result<&'static ConversionTable> {
    match version {
        "V20200224" => Ok(&V20200224),
        _ => Err(ImportError::UnknownVersion(version.to_string())),
    }
}

/// The input version tags this build understands.
pub const SUPPORTED_INPUT_VERSIONS: &[&str] = &["V20200224"];

// ============================================================================
// STATEMENT LINE
// ============================================================================

/// One raw revenue row, vocabulary-checked but with the amount left
/// unquantized. The entity is still a code here; the batch resolves it
/// against the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementLine {
    pub entity_code: String,
    pub account_number: String,
    pub amount: Decimal,
    pub description: String,
    pub department: Department,
    pub market: Market,
    pub state: String,
    pub division: Division,
    pub client: String,
    pub posting_date: NaiveDate,
    pub document_date: NaiveDate,
    pub customer: Option<String>,
    pub employee_id: Option<String>,
    pub job_dimension: Option<String>,
}

// ============================================================================
// READER
// ============================================================================

/// Read a statement file into lines using the given input-version tag.
pub fn read_statement(path: &Path, version: &str) -> Result<Vec<StatementLine>> {
    let table = conversion_for(version)?;
    let mut reader = csv::Reader::from_path(path)?;

    let index = map_headers(reader.headers()?, table, version)?;

    let mut lines = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        // +2: rows are 1-indexed and the header occupies the first row
        lines.push(parse_record(&record, &index, idx + 2)?);
    }
    Ok(lines)
}

/// Lowercase and map the header row, then check every required column made
/// it through. Columns outside the conversion table are ignored.
fn map_headers(
    headers: &StringRecord,
    table: &ConversionTable,
    version: &str,
) -> Result<HashMap<&'static str, usize>> {
    let mut index = HashMap::new();
    for (pos, header) in headers.iter().enumerate() {
        let normalized = header.trim().to_lowercase();
        if let Some((_, canonical)) = table
            .columns
            .iter()
            .find(|(variant, _)| *variant == normalized)
        {
            index.entry(*canonical).or_insert(pos);
        }
    }

    let missing: Vec<String> = table
        .required
        .iter()
        .filter(|canonical| !index.contains_key(**canonical))
        .map(|canonical| canonical.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::MissingColumns {
            version: version.to_string(),
            columns: missing,
        });
    }
    Ok(index)
}

fn parse_record(
    record: &StringRecord,
    index: &HashMap<&'static str, usize>,
    row: usize,
) -> Result<StatementLine> {
    let field = |name: &'static str| -> &str {
        index
            .get(name)
            .and_then(|pos| record.get(*pos))
            .unwrap_or("")
            .trim()
    };
    let optional = |name: &'static str| -> Option<String> {
        let value = field(name);
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    };

    Ok(StatementLine {
        entity_code: field("entity").to_string(),
        account_number: field("account_number").to_string(),
        amount: parse_amount(field("amount"), row)?,
        description: field("description").to_string(),
        department: parse_vocab::<Department>(field("department"), "department", row)?,
        market: parse_vocab::<Market>(field("market"), "market", row)?,
        state: field("state").to_string(),
        division: parse_vocab::<Division>(field("division"), "division", row)?,
        client: field("client").to_string(),
        posting_date: parse_date(field("posting_date"), "posting_date", row)?,
        document_date: parse_date(field("document_date"), "document_date", row)?,
        customer: optional("customer"),
        employee_id: optional("employee_id"),
        job_dimension: optional("job_dimension"),
    })
}

fn parse_amount(value: &str, row: usize) -> Result<Decimal> {
    // Tolerate thousands separators the way spreadsheets emit them
    let cleaned = value.replace(',', "");
    Decimal::from_str(&cleaned).map_err(|err| ImportError::InvalidField {
        row,
        field: "amount",
        value: value.to_string(),
        reason: err.to_string(),
    })
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"];

fn parse_date(value: &str, field: &'static str, row: usize) -> Result<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .ok_or_else(|| ImportError::InvalidField {
            row,
            field,
            value: value.to_string(),
            reason: "expected a date like 2024-03-31 or 03/31/2024".to_string(),
        })
}

fn parse_vocab<T: FromStr<Err = String>>(
    value: &str,
    field: &'static str,
    row: usize,
) -> Result<T> {
    value.parse().map_err(|reason| ImportError::InvalidField {
        row,
        field,
        value: value.to_string(),
        reason,
    })
}

// ============================================================================
// TESTS
// ============================================================================
