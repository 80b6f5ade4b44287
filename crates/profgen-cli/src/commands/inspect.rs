//! `profgen inspect`: manifest summary of a dataset directory.

use anyhow::Result;
use profgen_cli::InspectFormat;
use profgen_io::dataset::DatasetManifest;
use profgen_io::DatasetReader;
use std::io::{self, Write};
use std::path::Path;
use tabwriter::TabWriter;

pub fn handle(dataset: &Path, format: InspectFormat) -> Result<()> {
    // opening verifies every table checksum
    let reader = DatasetReader::open(dataset)?;
    let manifest = reader.manifest();
    match format {
        InspectFormat::Json => {
            println!("{}", serde_json::to_string_pretty(manifest)?);
            Ok(())
        }
        InspectFormat::Plain => print_summary(dataset, manifest),
    }
}

fn print_summary(dataset: &Path, manifest: &DatasetManifest) -> Result<()> {
    println!("Dataset {}", dataset.display());
    println!("  Technology : {}", manifest.technology);
    println!("  Kind       : {:?}", manifest.kind);
    println!("  Schema     : v{}", manifest.schema_version);
    println!("  Created    : {} (profgen {})", manifest.created_at, manifest.profgen_version);
    println!("  Checksums  : OK");
    println!();

    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "TABLE\tROWS\tBYTES\tSHA256")?;
    for (name, info) in &manifest.tables {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            name,
            info.row_count,
            info.file_size_bytes,
            &info.sha256[..info.sha256.len().min(12)]
        )?;
    }
    writer.flush()?;

    if !manifest.sources.is_empty() {
        println!();
        println!("Sources:");
        for source in &manifest.sources {
            let hash = source.sha256.as_deref().unwrap_or("directory");
            println!("  {} {} ({})", source.role, source.path, hash);
        }
    }

    println!();
    print!("{}", manifest.diagnostics);
    Ok(())
}
