// Journal Import CLI - statement file in, per-entity import files out

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use uuid::Uuid;

use journal_import::{
    export_batch, read_statement, BatchParams, Department, Division, DocumentType, EntityRegistry,
    ImportBatch, Market,
};

/// Convert a flat revenue statement into balanced per-entity journal entry
/// import files.
#[derive(Parser)]
#[command(name = "journal-import", version)]
struct Cli {
    /// Path to the statement file
    #[arg(long)]
    import_file: PathBuf,

    /// Customer account the deposit posts to
    #[arg(long)]
    client_code: String,

    /// Code of the entity that banks the deposit (e.g. E2)
    #[arg(long)]
    deposit_entity: String,

    /// Posting date for the generated entries (YYYY-MM-DD)
    #[arg(long)]
    posting_date: NaiveDate,

    /// The statement's own date (YYYY-MM-DD)
    #[arg(long)]
    document_date: NaiveDate,

    /// Payment reference, normally the check number
    #[arg(long)]
    payment_number: String,

    /// Document type the deposit applies to
    #[arg(long, default_value = "Payment")]
    applies_to_type: DocumentType,

    /// Department dimension for the deposit line
    #[arg(long)]
    department: Department,

    /// Market dimension for the deposit line
    #[arg(long)]
    market: Market,

    /// State dimension for the deposit line
    #[arg(long)]
    state: String,

    /// Division dimension for the deposit line
    #[arg(long)]
    division: Division,

    /// Statement identifier; generated when omitted
    #[arg(long)]
    statement_identifier: Option<String>,

    /// Directory the export directory is created under
    #[arg(long, default_value = ".")]
    save_location: PathBuf,

    /// Input layout version of the statement file
    #[arg(long, default_value = "V20200224")]
    input_version: String,

    /// Output layout version stamped into the file names
    #[arg(long, default_value = "V7")]
    output_version: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let registry = EntityRegistry::default();

    if !registry.contains(&cli.deposit_entity) {
        bail!(
            "unknown deposit entity '{}' (known: {})",
            cli.deposit_entity,
            registry.codes().join(", ")
        );
    }

    // 1. Read the statement
    println!("📂 Reading statement: {}", cli.import_file.display());
    let lines = read_statement(&cli.import_file, &cli.input_version)
        .with_context(|| format!("failed to read {}", cli.import_file.display()))?;
    println!("✓ Parsed {} statement lines", lines.len());

    // 2. Build the batch
    let statement_reference = cli
        .statement_identifier
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let params = BatchParams {
        posting_date: cli.posting_date,
        document_date: cli.document_date,
        statement_reference,
        payment_number: cli.payment_number,
        applies_to_type: cli.applies_to_type,
        deposit_entity_code: cli.deposit_entity,
        client_code: cli.client_code,
        department: cli.department,
        market: cli.market,
        state: cli.state,
        division: cli.division,
    };
    let mut batch = ImportBatch::new(lines, params, &registry)
        .context("failed to build the import batch")?;

    // 3. Generate and validate the entries
    println!("\n⚖️  Building journal entries...");
    batch.create().context("failed to generate journal entries")?;
    println!("✓ Generated {} balanced entries", batch.entries.len());

    // 4. Export per-entity files
    println!("\n💾 Exporting import files...");
    let destination = export_batch(&batch, &cli.save_location, &cli.output_version)
        .context("failed to export import files")?;
    println!("✓ Export complete: {}", destination.display());

    Ok(())
}
