//! Report export CLI.
//!
//! Loads a JSON dump of store rows, applies the same filters the report
//! screens use, and writes the CSV or PDF a user would download.
//!
//! ```bash
//! report-taxonomy export --input reports.json --type oem --subtype orders --format csv
//! report-taxonomy export --input reports.json --type customer --department sales --format pdf
//! report-taxonomy schema --type visit
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use report_taxonomy::{
    file_name, CsvWriter, ExportFormat, FetchOutcome, FilterCriteria, FilterParams, InMemorySyncClient,
    RawRecord, ReportConfig, ReportKind, ReportSession, SchemaRegistry,
};

#[derive(Parser, Debug)]
#[command(name = "report-taxonomy")]
#[command(version, about = "Filter and export business reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Filter records and write a CSV or PDF export
    Export {
        /// JSON array of store rows
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Report type (employee, visit, oem, customer, blueprint, projection, achievement)
        #[arg(short = 't', long = "type")]
        report_type: String,

        #[arg(short, long)]
        subtype: Option<String>,

        /// Matches department, division or company
        #[arg(long)]
        department: Option<String>,

        #[arg(long)]
        status: Option<String>,

        /// Inclusive lower date bound
        #[arg(long)]
        from: Option<String>,

        /// Inclusive upper date bound
        #[arg(long)]
        to: Option<String>,

        /// Case-insensitive text search over title, content and name fields
        #[arg(long)]
        search: Option<String>,

        #[arg(short, long, value_enum, default_value_t = FormatArg::Csv)]
        format: FormatArg,

        /// Output file (defaults to `<type>_<subtype>_report.<ext>`)
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,

        /// TOML configuration file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Show the field set of a report kind
    Schema {
        #[arg(short = 't', long = "type")]
        report_type: String,

        #[arg(short, long)]
        subtype: Option<String>,

        /// Print the schema as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Csv,
    Pdf,
}

impl From<FormatArg> for ExportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Pdf => ExportFormat::Pdf,
        }
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("report_taxonomy=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            input,
            report_type,
            subtype,
            department,
            status,
            from,
            to,
            search,
            format,
            out,
            config,
        } => {
            let params = FilterParams {
                report_type: Some(report_type),
                subtype,
                department,
                status,
                date_from: from,
                date_to: to,
                free_text: search,
            };
            run_export(&input, &params, format.into(), out, config.as_deref())
        }
        Commands::Schema {
            report_type,
            subtype,
            json,
        } => run_schema(&report_type, subtype.as_deref(), json),
    }
}

fn run_export(
    input: &Path,
    params: &FilterParams,
    format: ExportFormat,
    out: Option<PathBuf>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = ReportConfig::load(config_path)?;

    let report_type = params.report_type.as_deref().unwrap_or_default();
    let kind = ReportKind::parse(report_type, params.subtype.as_deref())
        .with_context(|| format!("Cannot export {}", report_type))?;
    let criteria = FilterCriteria::from_params(params).context("Invalid filter")?;

    let content =
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let rows: Vec<RawRecord> =
        serde_json::from_str(&content).with_context(|| format!("Failed to parse records in {}", input.display()))?;

    let mut session = ReportSession::new(InMemorySyncClient::with_rows(rows))
        .with_date_fallback(config.sync.date_fallback);
    if let FetchOutcome::Applied { loaded, skipped } = session.refresh()? {
        if skipped > 0 {
            eprintln!("⚠️  Skipped {} unreadable record(s), {} loaded", skipped, loaded);
        }
    }

    let table = session.export(&criteria, kind, &config.projector());

    let bytes = match format {
        ExportFormat::Csv => CsvWriter::new().to_bytes(&table)?,
        ExportFormat::Pdf => config.pdf_writer().with_title(kind.label()).to_bytes(&table),
    };

    let path = out.unwrap_or_else(|| PathBuf::from(file_name(kind, format)));
    std::fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;

    println!("✓ Exported {} {} record(s) to {}", table.row_count(), kind.label(), path.display());
    Ok(())
}

fn run_schema(report_type: &str, subtype: Option<&str>, json: bool) -> Result<()> {
    let resolution = SchemaRegistry::global().resolve(report_type, subtype);
    let schema = resolution.schema();

    if json {
        println!("{}", serde_json::to_string_pretty(schema)?);
        return Ok(());
    }

    match schema.kind {
        Some(kind) => println!("{}", kind.label()),
        None => println!("No schema for {} {}; generic fields only", report_type, subtype.unwrap_or("")),
    }
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for field in &schema.fields {
        let marker = if schema.is_required(field.name) { "*" } else { " " };
        println!("{} {:<20} {:<24} {}", marker, field.name, field.label, field.kind.describe());
    }

    println!("\nColumns: {}", schema.headers().join(" | "));
    Ok(())
}
