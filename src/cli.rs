// Command-line front end for the archiver.
//
//   archiver -c <archive> <file>...   create
//   archiver -d <archive>             extract
//   archiver -l <archive>             list
//   archiver -h                       help
//
// Argument errors and core failures print one message and exit with 1.

use std::path::{Path, PathBuf};
use std::process;

use clap::error::ErrorKind;
use clap::{ArgAction, ArgGroup, Parser, ValueHint};

use crate::archive::ArchiveDecoder;
use crate::io::{self, EntryStats, ExtractOptions};

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Multi-file archiver based on canonical Huffman coding.
#[derive(Parser, Debug)]
#[command(
    name = "archiver",
    version,
    about = "Huffman archiver: packs files into one compressed archive",
    arg_required_else_help = true
)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["create", "extract", "list"])
))]
struct Cli {
    /// Create ARCHIVE containing the listed files.
    #[arg(short = 'c', long = "create", value_name = "ARCHIVE", value_hint = ValueHint::FilePath)]
    create: Option<PathBuf>,

    /// Extract every file from ARCHIVE.
    #[arg(short = 'd', long = "extract", value_name = "ARCHIVE", value_hint = ValueHint::FilePath)]
    extract: Option<PathBuf>,

    /// List the files stored in ARCHIVE.
    #[arg(short = 'l', long = "list", value_name = "ARCHIVE", value_hint = ValueHint::FilePath)]
    list: Option<PathBuf>,

    /// Files to add, in archive order (with -c).
    #[arg(value_name = "FILE", requires = "create", value_hint = ValueHint::FilePath)]
    files: Vec<PathBuf>,

    /// Directory to extract into.
    #[arg(short = 'C', long = "directory", value_name = "DIR", default_value = ".", value_hint = ValueHint::DirPath)]
    directory: PathBuf,

    /// Fail instead of overwriting existing files on extraction.
    #[arg(short = 'n', long = "no-clobber")]
    no_clobber: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json")]
    json_output: bool,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Create { archive: PathBuf, files: Vec<PathBuf> },
    Extract { archive: PathBuf },
    List { archive: PathBuf },
}

#[derive(Debug)]
struct Options {
    command: Command,
    output_dir: PathBuf,
    overwrite: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
}

fn resolve_options(cli: Cli) -> Options {
    let command = match (cli.create, cli.extract, cli.list) {
        (Some(archive), _, _) => Command::Create {
            archive,
            files: cli.files,
        },
        (None, Some(archive), _) => Command::Extract { archive },
        (None, None, Some(archive)) => Command::List { archive },
        // The required `mode` group guarantees one of the above.
        (None, None, None) => Command::List {
            archive: PathBuf::new(),
        },
    };
    Options {
        command,
        output_dir: cli.directory,
        overwrite: !cli.no_clobber,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        json_output: cli.json_output,
    }
}

/// Checks clap cannot express: input files and archives must exist before
/// the core runs.
fn validate(opts: &Options) -> Result<(), String> {
    match &opts.command {
        Command::Create { files, .. } => {
            if files.is_empty() {
                return Err("no input files given to archive".into());
            }
            for file in files {
                if !file.is_file() {
                    return Err(format!("file {} does not exist", file.display()));
                }
            }
        }
        Command::Extract { archive } | Command::List { archive } => {
            if !archive.is_file() {
                return Err(format!("archive {} does not exist", archive.display()));
            }
        }
    }
    Ok(())
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("archiver".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = validate(&resolve_options(cli));
    }
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn entries_json(entries: &[EntryStats]) -> serde_json::Value {
    entries
        .iter()
        .map(|e| {
            serde_json::json!({
                "name": e.name,
                "size": e.size,
                "sha256": e.sha256.as_ref().map(|d| hex(d)),
            })
        })
        .collect()
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => eprintln!("{s}"),
        Err(e) => eprintln!("archiver: cannot render stats: {e}"),
    }
}

// ---------------------------------------------------------------------------
// Create command
// ---------------------------------------------------------------------------

fn cmd_create(opts: &Options, archive: &Path, files: &[PathBuf]) -> i32 {
    if !opts.quiet {
        println!("Encoding...");
    }

    let stats = match io::create_archive(archive, files) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("archiver: {e}");
            return 1;
        }
    };

    if !opts.quiet {
        for entry in &stats.entries {
            println!("Encoded file {}", entry.name);
        }
        println!("Archive {} encoded successfully", archive.display());
    }

    if opts.verbose > 0 && !opts.quiet {
        let ratio = if stats.input_size == 0 {
            0.0
        } else {
            stats.archive_size as f64 / stats.input_size as f64
        };
        eprintln!(
            "archiver: input size: {}, archive size: {}, ratio: {ratio:.3}",
            stats.input_size, stats.archive_size
        );
    }

    if opts.json_output {
        print_json(&serde_json::json!({
            "command": "create",
            "archive": archive.display().to_string(),
            "input_size": stats.input_size,
            "archive_size": stats.archive_size,
            "entries": entries_json(&stats.entries),
        }));
    }

    0
}

// ---------------------------------------------------------------------------
// Extract command
// ---------------------------------------------------------------------------

fn cmd_extract(opts: &Options, archive: &Path) -> i32 {
    if !opts.quiet {
        println!("Decoding...");
    }

    let extract_opts = ExtractOptions {
        output_dir: opts.output_dir.clone(),
        overwrite: opts.overwrite,
    };
    let stats = match io::extract_archive(archive, &extract_opts) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("archiver: {e}");
            return 1;
        }
    };

    if !opts.quiet {
        for entry in &stats.entries {
            println!("Decoded file {}", entry.name);
        }
        println!("Archive {} decoded successfully", archive.display());
    }

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "archiver: archive size: {}, output size: {}, files: {}",
            stats.archive_size,
            stats.output_size,
            stats.entries.len()
        );
    }

    if opts.json_output {
        print_json(&serde_json::json!({
            "command": "extract",
            "archive": archive.display().to_string(),
            "archive_size": stats.archive_size,
            "output_size": stats.output_size,
            "entries": entries_json(&stats.entries),
        }));
    }

    0
}

// ---------------------------------------------------------------------------
// List command
// ---------------------------------------------------------------------------

fn cmd_list(opts: &Options, archive: &Path) -> i32 {
    let file = match std::fs::File::open(archive) {
        Ok(f) => std::io::BufReader::new(f),
        Err(e) => {
            eprintln!("archiver: {}: {e}", archive.display());
            return 1;
        }
    };

    let listing = match ArchiveDecoder::new(file).list() {
        Ok(listing) => listing,
        Err(e) => {
            eprintln!("archiver: {e}");
            return 1;
        }
    };

    for entry in &listing {
        println!("{:>12}  {}", entry.size, entry.name);
    }

    if opts.json_output {
        let entries: serde_json::Value = listing
            .iter()
            .map(|e| serde_json::json!({ "name": e.name, "size": e.size }))
            .collect();
        print_json(&serde_json::json!({
            "command": "list",
            "archive": archive.display().to_string(),
            "entries": entries,
        }));
    }

    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            process::exit(code);
        }
    };
    let opts = resolve_options(cli);

    let filter = match opts.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    if let Err(msg) = validate(&opts) {
        eprintln!("archiver: error: {msg}");
        eprintln!("Run `archiver -h` for usage.");
        process::exit(1);
    }

    let exit_code = match &opts.command {
        Command::Create { archive, files } => cmd_create(&opts, archive, files),
        Command::Extract { archive } => cmd_extract(&opts, archive),
        Command::List { archive } => cmd_list(&opts, archive),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn try_parse(args: &[&str]) -> Result<Options, clap::Error> {
        let argv: Vec<String> = std::iter::once("archiver".to_string())
            .chain(args.iter().map(|s| s.to_string()))
            .collect();
        Cli::try_parse_from(argv).map(resolve_options)
    }

    fn parse_opts(args: &[&str]) -> Options {
        try_parse(args).expect("cli parse failed")
    }

    #[test]
    fn create_maps_archive_and_files() {
        let opts = parse_opts(&["-c", "out.huf", "a.txt", "b.txt"]);
        assert_eq!(
            opts.command,
            Command::Create {
                archive: "out.huf".into(),
                files: vec!["a.txt".into(), "b.txt".into()],
            }
        );
        assert!(opts.overwrite);
        assert!(!opts.quiet);
    }

    #[test]
    fn extract_maps_archive() {
        let opts = parse_opts(&["-d", "in.huf", "-C", "dest", "--no-clobber"]);
        assert_eq!(
            opts.command,
            Command::Extract {
                archive: "in.huf".into()
            }
        );
        assert_eq!(opts.output_dir, PathBuf::from("dest"));
        assert!(!opts.overwrite);
    }

    #[test]
    fn list_maps_archive() {
        let opts = parse_opts(&["-l", "in.huf", "--json"]);
        assert_eq!(
            opts.command,
            Command::List {
                archive: "in.huf".into()
            }
        );
        assert!(opts.json_output);
    }

    #[test]
    fn no_arguments_is_an_error() {
        assert!(try_parse(&[]).is_err());
    }

    #[test]
    fn help_is_reported_as_help() {
        let err = try_parse(&["-h"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn extract_rejects_extra_arguments() {
        assert!(try_parse(&["-d", "in.huf", "stray"]).is_err());
    }

    #[test]
    fn modes_are_exclusive() {
        assert!(try_parse(&["-c", "a.huf", "x", "-d", "b.huf"]).is_err());
    }

    #[test]
    fn unknown_flag_is_an_error() {
        assert!(try_parse(&["-x", "a.huf"]).is_err());
    }

    #[test]
    fn create_without_files_fails_validation() {
        let opts = parse_opts(&["-c", "out.huf"]);
        assert!(validate(&opts).is_err());
    }

    #[test]
    fn missing_input_fails_validation() {
        let opts = parse_opts(&["-c", "out.huf", "surely-missing-input.bin"]);
        let msg = validate(&opts).unwrap_err();
        assert!(msg.contains("surely-missing-input.bin"));
    }

    #[test]
    fn verbose_is_capped() {
        let opts = parse_opts(&["-vvvv", "-l", "x.huf"]);
        assert_eq!(opts.verbose, 2);
    }

    #[test]
    fn fuzz_hook_survives_garbage() {
        fuzz_try_parse_args(&["-c".into()]);
        fuzz_try_parse_args(&["--directory".into(), "-d".into()]);
    }

    #[test]
    fn hex_is_lowercase() {
        assert_eq!(hex(&[0x00, 0xab, 0x1f]), "00ab1f");
    }
}
