//! Redmix CLI - Command-line tool for Westwood MIX archives.
//!
//! This is the main entry point for the Redmix command-line application.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use glob::{MatchOptions, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use redmix::codec;
use redmix::prelude::*;

/// Redmix - Westwood MIX archive tool
#[derive(Parser)]
#[command(name = "redmix")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Archive keys use the rotate-and-add checksum
    #[arg(long, global = true)]
    rotate_add: bool,

    /// Read entries through a memory map
    #[arg(long, global = true)]
    mmap: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List contents of a MIX archive
    List {
        /// Path to the MIX file
        #[arg(short, long, env = "REDMIX_ARCHIVE")]
        archive: PathBuf,

        /// File of known names, one per line
        #[arg(short, long, env = "REDMIX_NAMES")]
        names: Option<PathBuf>,

        /// Show header details
        #[arg(short, long)]
        detailed: bool,
    },

    /// Extract files from a MIX archive
    Extract {
        /// Path to the MIX file
        #[arg(short, long, env = "REDMIX_ARCHIVE")]
        archive: PathBuf,

        /// Output directory
        #[arg(short, long, env = "REDMIX_OUTPUT")]
        output: PathBuf,

        /// File of known names, one per line
        #[arg(short, long, env = "REDMIX_NAMES")]
        names: Option<PathBuf>,

        /// Filter pattern (glob-style) on resolved names
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Print lookup keys for file names
    Hash {
        /// Names to hash
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Decompress a raw LCW stream
    LcwDecode {
        /// Input file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Decompressed size
        #[arg(short, long)]
        size: usize,
    },

    /// Compress a file to a raw LCW stream
    LcwEncode {
        /// Input file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let key_hash = if cli.rotate_add {
        KeyHash::RotateAdd
    } else {
        KeyHash::Crc32
    };
    let options = OpenOptions::new().key_hash(key_hash).memory_map(cli.mmap);

    match cli.command {
        Commands::List {
            archive,
            names,
            detailed,
        } => {
            cmd_list(&archive, names.as_deref(), detailed, &options)?;
        }
        Commands::Extract {
            archive,
            output,
            names,
            filter,
        } => {
            cmd_extract(&archive, &output, names.as_deref(), filter.as_deref(), &options)?;
        }
        Commands::Hash { names } => {
            cmd_hash(&names);
        }
        Commands::LcwDecode {
            input,
            output,
            size,
        } => {
            cmd_lcw_decode(&input, &output, size)?;
        }
        Commands::LcwEncode { input, output } => {
            cmd_lcw_encode(&input, &output)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Mount one archive and load the optional name list.
fn open_registry(
    archive_path: &Path,
    names: Option<&Path>,
    options: &OpenOptions,
) -> Result<ArchiveRegistry> {
    let mut registry = ArchiveRegistry::new();
    registry
        .mount_with(archive_path, options)
        .with_context(|| format!("Failed to open MIX archive {}", archive_path.display()))?;

    if let Some(names) = names {
        let list = fs::read_to_string(names)
            .with_context(|| format!("Failed to read name list {}", names.display()))?;
        let mut count = 0;
        for name in list.lines().map(str::trim).filter(|l| !l.is_empty() && !l.starts_with(';')) {
            registry.register_name(name);
            count += 1;
        }
        debug!(count, "registered names");
    }

    Ok(registry)
}

/// Name an entry for display and extraction.
fn display_name(registry: &ArchiveRegistry, archive: &MixArchive, entry: &MixEntry) -> String {
    registry
        .name_of(archive, entry)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{:08X}.bin", entry.unsigned_key()))
}

/// Map an entry name onto a path under `output`.
///
/// Both `/` and `\` separate directories. Returns `None` for names that
/// would leave `output` or that contain no usable component.
fn entry_output_path(output: &Path, name: &str) -> Option<PathBuf> {
    let mut path = output.to_path_buf();
    let mut pushed = false;
    for part in name.split(['/', '\\']) {
        match part {
            "" | "." => continue,
            ".." => return None,
            _ if part.contains(':') => return None,
            _ => {
                path.push(part);
                pushed = true;
            }
        }
    }
    pushed.then_some(path)
}

fn cmd_list(
    archive_path: &Path,
    names: Option<&Path>,
    detailed: bool,
    options: &OpenOptions,
) -> Result<()> {
    let registry = open_registry(archive_path, names, options)?;
    let archive = &registry.archives()[0];

    if detailed {
        let flags = archive.format_flags();
        println!("Archive:     {}", archive.name());
        println!("Layout:      {}", archive.layout().label());
        println!("Key hash:    {}", archive.key_hash().label());
        println!("Data offset: {}", archive.data_region_offset());
        println!("Data size:   {}", archive.total_data_size());
        println!(
            "Flags:       digest={} encrypted={}",
            flags.has_digest, flags.is_encrypted
        );
        if let Some(digest) = archive.read_digest()? {
            let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
            println!("Digest:      {}", hex);
        }
        println!();
    }

    for entry in archive.iter() {
        println!(
            "{:08X} {:>10} {:>10} {}",
            entry.unsigned_key(),
            entry.data_offset,
            entry.data_size,
            registry.name_of(archive, entry).unwrap_or("")
        );
    }

    println!("\nTotal: {} entries", archive.entry_count());

    Ok(())
}

fn cmd_extract(
    archive_path: &Path,
    output: &Path,
    names: Option<&Path>,
    filter: Option<&str>,
    options: &OpenOptions,
) -> Result<()> {
    println!("Opening MIX archive: {}", archive_path.display());

    let start = Instant::now();
    let registry = open_registry(archive_path, names, options)?;
    let archive = &registry.archives()[0];

    println!("Loaded {} entries in {:?}", archive.entry_count(), start.elapsed());

    let pattern = filter
        .map(Pattern::new)
        .transpose()
        .context("Invalid filter pattern")?;
    let match_options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::default()
    };

    let selected: Vec<(String, MixEntry)> = archive
        .iter()
        .map(|entry| (display_name(&registry, archive, entry), *entry))
        .filter(|(name, _)| {
            pattern
                .as_ref()
                .map_or(true, |p| p.matches_with(name, match_options))
        })
        .collect();

    println!("Extracting {} entries...", selected.len());

    let pb = ProgressBar::new(selected.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    fs::create_dir_all(output)?;

    let start = Instant::now();
    let mut failed = 0;
    for (name, entry) in &selected {
        // One bad entry does not stop the rest.
        let Some(path) = entry_output_path(output, name) else {
            warn!(name = %name, "skipping entry with unsafe name");
            failed += 1;
            pb.inc(1);
            continue;
        };
        match archive.read_entry_bytes(entry) {
            Ok(data) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, data).with_context(|| format!("Failed to write {}", name))?;
            }
            Err(e) => {
                warn!(name = %name, error = %e, "skipping unreadable entry");
                failed += 1;
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Done");
    println!("Extraction completed in {:?}", start.elapsed());
    if failed > 0 {
        println!("{} entries could not be read", failed);
    }

    Ok(())
}

fn cmd_hash(names: &[String]) {
    for name in names {
        println!(
            "{:08X} {:08X} {}",
            codec::hash_name_with(name, KeyHash::Crc32),
            codec::hash_name_with(name, KeyHash::RotateAdd),
            name.to_ascii_uppercase()
        );
    }
}

fn cmd_lcw_decode(input: &Path, output: &Path, size: usize) -> Result<()> {
    let data = fs::read(input).context("Failed to read input file")?;
    let mut buffer = vec![0u8; size];
    let written = codec::decompress(&data, &mut buffer).context("Failed to decompress LCW stream")?;
    buffer.truncate(written);
    fs::write(output, &buffer).context("Failed to write output file")?;

    println!("Decompressed {} -> {} bytes", data.len(), written);

    Ok(())
}

fn cmd_lcw_encode(input: &Path, output: &Path) -> Result<()> {
    let data = fs::read(input).context("Failed to read input file")?;
    let packed = codec::compress(&data);
    fs::write(output, &packed).context("Failed to write output file")?;

    println!("Compressed {} -> {} bytes", data.len(), packed.len());

    Ok(())
}
