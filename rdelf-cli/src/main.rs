mod render;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use rdelf_core::Binary;

/// Simple ELF header reader
#[derive(Parser)]
#[command(
    name = "rdelf",
    about = "Display the ELF header, program headers and section headers of an ELF64 file",
    version,
    author
)]
struct Cli {
    /// Path to ELF file
    #[arg(required = true)]
    path: std::path::PathBuf,

    /// Display the ELF header
    #[arg(long)]
    hed: bool,

    /// Display program headers
    #[arg(short = 'l', long)]
    progh: bool,

    /// Display section headers
    #[arg(short = 'S', long)]
    segh: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Disable coloured labels
    #[arg(long)]
    no_color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Table,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let bin = Binary::open(&cli.path)?;

    // With nothing selected, show the header.
    let hed = cli.hed || !(cli.progh || cli.segh);
    log::debug!(
        "Selected header={hed} program_headers={} section_headers={} format={:?}",
        cli.progh,
        cli.segh,
        cli.format
    );

    let program_headers = if cli.progh {
        Some(bin.program_headers()?)
    } else {
        None
    };
    let section_headers = if cli.segh {
        Some(bin.section_headers()?)
    } else {
        None
    };

    let report = render::Report {
        file: &bin.path,
        header: hed.then_some(&bin.header),
        program_headers: program_headers.as_deref(),
        section_headers: section_headers.as_deref(),
    };

    let out = match cli.format {
        Format::Text => render::text(&report),
        Format::Table => render::table(&report),
        Format::Json => render::json(&report)?,
    };
    print!("{out}");

    Ok(())
}
