use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde::Deserialize;
use tpm_report::{
    Attachment, Error, Origin, ReportConfig, ReportRequest, ReportType, generate_report,
    parse_hex_color,
};

#[derive(Parser)]
#[command(version, about = "Compose a phased TpM report as PDF and append attachments")]
struct Cli {
    /// Report type: phase1, phase2 or phase3
    #[arg(long = "type", value_name = "TYPE")]
    report_type: String,

    /// JSON record with project_name, responsible and fields
    #[arg(long)]
    record: PathBuf,

    /// Attachment uploaded with this submission (repeatable)
    #[arg(long, value_name = "FILE")]
    upload: Vec<PathBuf>,

    /// Attachment already stored with the project (repeatable)
    #[arg(long, value_name = "FILE")]
    existing: Vec<PathBuf>,

    /// Output PDF path
    #[arg(short, long)]
    output: PathBuf,

    /// Highlight color as RRGGBB, overrides TPM_REPORT_HIGHLIGHT
    #[arg(long, value_name = "RRGGBB")]
    highlight: Option<String>,
}

#[derive(Deserialize)]
struct RecordFile {
    #[serde(default)]
    project_name: String,
    #[serde(default)]
    responsible: String,
    #[serde(default)]
    fields: BTreeMap<String, String>,
}

fn read_record(path: &Path) -> Result<RecordFile, Error> {
    let raw = std::fs::read(path)?;
    serde_json::from_slice(&raw)
        .map_err(|e| Error::InvalidInput(format!("{}: {e}", path.display())))
}

fn read_attachments(paths: &[PathBuf], origin: Origin) -> Result<Vec<Attachment>, Error> {
    paths
        .iter()
        .map(|path| {
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(Attachment::new(filename, std::fs::read(path)?, origin))
        })
        .collect()
}

fn run(cli: &Cli) -> Result<(), Error> {
    let report_type: ReportType = cli.report_type.parse()?;
    let record = read_record(&cli.record)?;
    let request = ReportRequest::new(
        report_type,
        record.project_name,
        record.responsible,
        record.fields,
    )?;

    let mut config = ReportConfig::from_env();
    if let Some(hex) = &cli.highlight {
        config.highlight = parse_hex_color(hex)
            .ok_or_else(|| Error::InvalidInput(format!("bad highlight color {hex:?}")))?;
    }

    let mut attachments = read_attachments(&cli.upload, Origin::Upload)?;
    attachments.extend(read_attachments(&cli.existing, Origin::Existing)?);

    let report = generate_report(&request, &attachments, &config)?;
    std::fs::write(&cli.output, &report.bytes)?;

    println!(
        "Wrote {} ({} report pages, {} attachment pages)",
        cli.output.display(),
        report.layout.page_count,
        report.merge.appended_pages(),
    );
    for merged in &report.merge.merged {
        println!("  attached {} ({} pages)", merged.filename, merged.pages);
    }
    for skipped in &report.merge.skipped {
        println!("  skipped {}: {}", skipped.filename, skipped.reason);
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
