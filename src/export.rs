// Flat-File Export - one tab-delimited import file per entity
//
// Lines are partitioned by owning entity (per line, not per entry) and each
// entity's lines land in its own file under a directory named after the
// statement reference. Files are written into a staging directory and the
// whole directory is renamed into place at the end, so a failed run never
// leaves a half-populated destination behind.

use std::fs;
use std::path::{Path, PathBuf};

use crate::batch::ImportBatch;
use crate::entities::Entity;
use crate::error::{ImportError, Result};
use crate::journal::JournalLine;

/// Export every line of the batch under `{save_location}/{statement_reference}`.
///
/// Fails with `DestinationExists` if that directory is already present;
/// re-running a finished import must be an explicit decision, not an
/// accidental overwrite. Returns the destination directory.
pub fn export_batch(
    batch: &ImportBatch,
    save_location: &Path,
    output_version: &str,
) -> Result<PathBuf> {
    let destination = save_location.join(&batch.statement_reference);
    if destination.exists() {
        return Err(ImportError::DestinationExists(destination));
    }

    // Stale staging from a crashed run is safe to discard.
    let staging = save_location.join(format!("{}.partial", batch.statement_reference));
    if staging.exists() {
        fs::remove_dir_all(&staging)?;
    }
    fs::create_dir_all(&staging)?;

    match write_entity_files(batch, &staging, output_version) {
        Ok(()) => {
            fs::rename(&staging, &destination)?;
            Ok(destination)
        }
        Err(err) => {
            let _ = fs::remove_dir_all(&staging);
            Err(err)
        }
    }
}

fn write_entity_files(batch: &ImportBatch, staging: &Path, output_version: &str) -> Result<()> {
    for (entity, lines) in partition_by_entity(batch) {
        let path = staging.join(entity_file_name(batch, output_version, &entity.abbreviation));
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_path(&path)?;
        for line in lines {
            writer.write_record(record(line))?;
        }
        writer.flush()?;
    }
    Ok(())
}

/// Group lines by owning entity, preserving first-seen entity order and the
/// line order within each group.
fn partition_by_entity(batch: &ImportBatch) -> Vec<(&Entity, Vec<&JournalLine>)> {
    let mut groups: Vec<(&Entity, Vec<&JournalLine>)> = Vec::new();
    for line in batch.entries.iter().flat_map(|entry| entry.lines.iter()) {
        match groups.iter_mut().find(|(entity, _)| {
            entity.business_unit_code == line.owning_entity.business_unit_code
        }) {
            Some((_, lines)) => lines.push(line),
            None => groups.push((&line.owning_entity, vec![line])),
        }
    }
    groups
}

/// `{posting MM.DD.YY} {document MM.YY} CK {payment} IMPORT_{version}_{abbr}.txt`
fn entity_file_name(batch: &ImportBatch, output_version: &str, abbreviation: &str) -> String {
    format!(
        "{} {} CK {} IMPORT_{}_{}.txt",
        batch.posting_date.format("%m.%d.%y"),
        batch.document_date.format("%m.%y"),
        batch.deposit_id,
        output_version,
        abbreviation,
    )
}

/// The 25 columns the ledger import expects, in its fixed order. Unset
/// optionals export as empty strings; the owning entity itself is used for
/// partitioning only and is never written.
fn record(line: &JournalLine) -> Vec<String> {
    let opt = |value: &Option<String>| value.clone().unwrap_or_default();
    let doc = |value: Option<crate::vocab::DocumentType>| {
        value.map(|d| d.as_str().to_string()).unwrap_or_default()
    };
    vec![
        line.account_type.as_str().to_string(),
        line.account_number.clone(),
        line.posting_date.format("%m%d%y").to_string(),
        line.document_date.format("%m%d%y").to_string(),
        opt(&line.blank_field),
        line.document_no.clone(),
        format!("{:.2}", line.debit),
        format!("{:.2}", line.credit),
        line.description.clone(),
        line.department.as_str().to_string(),
        line.market.as_str().to_string(),
        opt(&line.salesperson_code),
        line.state.clone(),
        opt(&line.customer),
        line.division.as_str().to_string(),
        opt(&line.client),
        opt(&line.employee_id),
        line.business_unit_code.to_string(),
        line.reason_code.clone(),
        opt(&line.expense_code),
        opt(&line.vendor_dimension),
        opt(&line.job_dimension),
        doc(line.document_type),
        doc(line.applies_to_document_type),
        opt(&line.applies_to_document_number),
    ]
}

// ============================================================================
// TESTS
// ============================================================================
