// Command-line interface for oxidiff.
//
// Subcommands mirror the classic bsdiff/bspatch pair plus patch inspection:
// `create`, `apply`, `header` and `config`.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::codec::{self, ApplyOptions, DiffOptions, apply::DEFAULT_BUFFER_SIZE, block};
use crate::format::MAGIC;
use crate::io::{apply_file, create_file};

// ---------------------------------------------------------------------------
// Byte size parsing (supports K, M, G suffixes)
// ---------------------------------------------------------------------------

fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty size string".into());
    }
    let (num_part, multiplier) = match s.as_bytes().last() {
        Some(b'k' | b'K') => (&s[..s.len() - 1], 1024u64),
        Some(b'm' | b'M') => (&s[..s.len() - 1], 1024 * 1024),
        Some(b'g' | b'G') => (&s[..s.len() - 1], 1024 * 1024 * 1024),
        _ => (s, 1u64),
    };
    let num: u64 = num_part
        .trim()
        .parse()
        .map_err(|e| format!("invalid size '{s}': {e}"))?;
    match num.checked_mul(multiplier) {
        Some(0) => Err("size must be non-zero".into()),
        Some(n) => Ok(n),
        None => Err(format!("size overflow: '{s}'")),
    }
}

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// bsdiff (BSDIFF40) binary patch creator/applier.
#[derive(Parser, Debug)]
#[command(
    name = "oxidiff",
    version,
    about = "BSDIFF40 binary patch creator/applier",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Create a patch that turns OLD into NEW.
    Create(CreateArgs),
    /// Apply PATCH to OLD, writing NEW.
    Apply(ApplyArgs),
    /// Print the header (and optionally the control triples) of a patch.
    Header(HeaderArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Args, Debug)]
struct CreateArgs {
    /// Old file.
    #[arg(value_hint = ValueHint::FilePath)]
    old: PathBuf,

    /// New file.
    #[arg(value_hint = ValueHint::FilePath)]
    new: PathBuf,

    /// Patch file to write.
    #[arg(value_hint = ValueHint::FilePath)]
    patch: PathBuf,

    /// bzip2 compression level for the patch blocks (1-9).
    #[arg(long, short = 'l', value_parser = clap::value_parser!(u32).range(1..=9), default_value_t = block::DEFAULT_LEVEL)]
    level: u32,
}

#[derive(Args, Debug)]
struct ApplyArgs {
    /// Old file.
    #[arg(value_hint = ValueHint::FilePath)]
    old: PathBuf,

    /// Patch file.
    #[arg(value_hint = ValueHint::FilePath)]
    patch: PathBuf,

    /// New file to write.
    #[arg(value_hint = ValueHint::FilePath)]
    new: PathBuf,

    /// Intermediate buffer size (supports K/M/G suffix).
    #[arg(long = "buffer-size", value_parser = parse_byte_size, default_value_t = DEFAULT_BUFFER_SIZE as u64)]
    buffer_size: u64,
}

#[derive(Args, Debug)]
struct HeaderArgs {
    /// Patch file.
    #[arg(value_hint = ValueHint::FilePath)]
    patch: PathBuf,

    /// Also decode and print every control triple.
    #[arg(long)]
    controls: bool,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Create,
    Apply,
    Header,
    Config,
}

struct Options {
    command: Command,
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
    level: u32,
    buffer_size: usize,
    print_controls: bool,
    old_file: Option<PathBuf>,
    new_file: Option<PathBuf>,
    patch_file: Option<PathBuf>,
}

impl Options {
    fn base(command: Command, cli: &Cli) -> Self {
        Self {
            command,
            force: cli.force,
            quiet: cli.quiet,
            verbose: cli.verbose.min(2),
            json_output: cli.json_output,
            level: block::DEFAULT_LEVEL,
            buffer_size: DEFAULT_BUFFER_SIZE,
            print_controls: false,
            old_file: None,
            new_file: None,
            patch_file: None,
        }
    }
}

fn resolve_options(cli: Cli) -> Options {
    match &cli.command {
        Cmd::Create(args) => Options {
            level: args.level,
            old_file: Some(args.old.clone()),
            new_file: Some(args.new.clone()),
            patch_file: Some(args.patch.clone()),
            ..Options::base(Command::Create, &cli)
        },
        Cmd::Apply(args) => Options {
            buffer_size: usize::try_from(args.buffer_size).unwrap_or(usize::MAX),
            old_file: Some(args.old.clone()),
            new_file: Some(args.new.clone()),
            patch_file: Some(args.patch.clone()),
            ..Options::base(Command::Apply, &cli)
        },
        Cmd::Header(args) => Options {
            print_controls: args.controls,
            patch_file: Some(args.patch.clone()),
            ..Options::base(Command::Header, &cli)
        },
        Cmd::Config => Options::base(Command::Config, &cli),
    }
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("oxidiff".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = resolve_options(cli);
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Check that an input exists and can be opened, printing the standard
/// diagnostic when it cannot.
fn check_input(path: &Path) -> bool {
    match File::open(path) {
        Ok(_) => true,
        Err(e) => {
            eprintln!("oxidiff: could not open '{}': {e}", path.display());
            false
        }
    }
}

fn check_output(path: &Path, force: bool) -> bool {
    if path.exists() && !force {
        eprintln!(
            "oxidiff: output file exists, use -f to overwrite: {}",
            path.display()
        );
        return false;
    }
    true
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => eprintln!("{s}"),
        Err(e) => eprintln!("oxidiff: failed to serialize stats: {e}"),
    }
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("oxidiff version {version} (Rust), Copyright (C) oxidiff contributors");
    eprintln!("Licensed under the MIT License");

    let file_io = cfg!(feature = "file-io") as u8;
    let ptr_size = std::mem::size_of::<*const ()>();

    eprintln!("MAGIC={}", String::from_utf8_lossy(&MAGIC));
    eprintln!("BLOCK_COMPRESSOR=bzip2");
    eprintln!("DEFAULT_LEVEL={}", block::DEFAULT_LEVEL);
    eprintln!("DEFAULT_BUFFER_SIZE={DEFAULT_BUFFER_SIZE}");
    eprintln!("FILE_IO={file_io}");
    eprintln!("sizeof(usize)={ptr_size}");

    0
}

// ---------------------------------------------------------------------------
// Create command
// ---------------------------------------------------------------------------

fn cmd_create(opts: &Options) -> i32 {
    let (Some(old), Some(new), Some(patch)) = (&opts.old_file, &opts.new_file, &opts.patch_file)
    else {
        return 1;
    };
    if !check_input(old) || !check_input(new) || !check_output(patch, opts.force) {
        return 1;
    }

    let diff_opts = DiffOptions { level: opts.level };
    let stats = match create_file(old, new, patch, &diff_opts) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("oxidiff: create error: {e}");
            return 1;
        }
    };

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "oxidiff: create: old size: {}, new size: {}, patch size: {}",
            stats.old_size, stats.new_size, stats.patch_size
        );
        if opts.verbose > 1 {
            eprintln!(
                "oxidiff: create: control block: {}, diff block: {}",
                stats.header.control_len, stats.header.diff_len
            );
        }
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "create",
            "old_size": stats.old_size,
            "new_size": stats.new_size,
            "patch_size": stats.patch_size,
            "control_len": stats.header.control_len,
            "diff_len": stats.header.diff_len,
            "level": opts.level,
            "new_sha256": stats.new_sha256.map(|h| hex(&h)),
        });
        print_json(&json);
    }

    0
}

// ---------------------------------------------------------------------------
// Apply command
// ---------------------------------------------------------------------------

fn cmd_apply(opts: &Options) -> i32 {
    let (Some(old), Some(patch), Some(new)) = (&opts.old_file, &opts.patch_file, &opts.new_file)
    else {
        return 1;
    };
    if !check_input(old) || !check_input(patch) || !check_output(new, opts.force) {
        return 1;
    }

    let apply_opts = ApplyOptions {
        buffer_size: opts.buffer_size,
    };
    let stats = match apply_file(old, patch, new, &apply_opts) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("oxidiff: apply error: {e}");
            return 1;
        }
    };

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "oxidiff: apply: old size: {}, patch size: {}, output size: {}",
            stats.old_size, stats.patch_size, stats.output_size
        );
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "apply",
            "old_size": stats.old_size,
            "patch_size": stats.patch_size,
            "output_size": stats.output_size,
            "output_sha256": stats.output_sha256.map(|h| hex(&h)),
        });
        print_json(&json);
    }

    0
}

// ---------------------------------------------------------------------------
// Header command
// ---------------------------------------------------------------------------

fn cmd_header(opts: &Options) -> i32 {
    let Some(path) = &opts.patch_file else {
        return 1;
    };
    if !check_input(path) {
        return 1;
    }

    let open_patch = || File::open(path).map(BufReader::new);
    let (header, controls) = if opts.print_controls {
        match codec::read_controls(open_patch) {
            Ok((header, controls)) => (header, Some(controls)),
            Err(e) => {
                eprintln!("oxidiff: {}: {e}", path.display());
                return 1;
            }
        }
    } else {
        let header = open_patch()
            .map_err(crate::Error::from)
            .and_then(|mut f| crate::format::PatchHeader::read_from(&mut f));
        match header {
            Ok(header) => (header, None),
            Err(e) => {
                eprintln!("oxidiff: {}: {e}", path.display());
                return 1;
            }
        }
    };

    if opts.json_output {
        let mut json = serde_json::json!({
            "command": "header",
            "magic": String::from_utf8_lossy(&MAGIC),
            "control_len": header.control_len,
            "diff_len": header.diff_len,
            "new_len": header.new_len,
        });
        if let Some(controls) = &controls {
            json["controls"] = controls
                .iter()
                .map(|c| serde_json::json!([c.copy, c.extra, c.seek]))
                .collect();
        }
        print_json(&json);
        return 0;
    }

    if opts.quiet {
        return 0;
    }

    println!("magic:            {}", String::from_utf8_lossy(&MAGIC));
    println!("control block:    {} bytes", header.control_len);
    println!("diff block:       {} bytes", header.diff_len);
    println!("new length:       {} bytes", header.new_len);
    if opts.verbose > 0 {
        println!("control offset:   {}", header.control_offset());
        println!("diff offset:      {}", header.diff_offset());
        println!("extra offset:     {}", header.extra_offset());
    }

    if let Some(controls) = controls {
        println!("controls:         {}", controls.len());
        println!("  {:>6}  {:>12} {:>12} {:>12}", "#", "copy", "extra", "seek");
        for (i, c) in controls.iter().enumerate() {
            println!("  {i:>6}  {:>12} {:>12} {:>12}", c.copy, c.extra, c.seek);
        }
    }

    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();
    let opts = resolve_options(cli);

    let exit_code = match opts.command {
        Command::Create => cmd_create(&opts),
        Command::Apply => cmd_apply(&opts),
        Command::Header => cmd_header(&opts),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
