//! xmlc14n CLI: XML -> canonical XML.

#[cfg(feature = "fast-alloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::Parser;
use std::fs::File;
use std::io::{IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use xmlc14n::c14n::C14N_URI;
use xmlc14n::{C14nOptions, Method};

#[derive(Parser)]
#[command(name = "xmlc14n", about = "Canonical XML 1.0 serialization")]
struct Cli {
    /// Input file (- for stdin)
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Output file (- or absent = stdout)
    #[arg(short, long)]
    output: Option<String>,

    /// Canonicalization method URI
    #[arg(long, default_value = C14N_URI)]
    method: String,

    /// Additional processing-instruction target to strip (repeatable)
    #[arg(long = "filter-pi", value_name = "TARGET")]
    filter_pi: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Fehler: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    // Methode zuerst pruefen, damit kein Input unnoetig gelesen wird.
    let method: Method = cli
        .method
        .parse()
        .map_err(|e| format!("Ungueltige Methode: {e}"))?;
    let options = cli
        .filter_pi
        .into_iter()
        .fold(C14nOptions::default(), C14nOptions::filter_pi);

    let doc = xmlc14n::parse(open_input(&cli.input)?).map_err(|e| format!("Parse-Fehler: {e}"))?;
    let canonical = xmlc14n::canonicalize_with_options(&doc, method, &options)
        .map_err(|e| format!("C14N-Fehler: {e}"))?;
    // Komplett serialisieren, bevor das Ziel angefasst wird.
    let bytes = xmlc14n::print(&canonical).map_err(|e| format!("Serialisierungs-Fehler: {e}"))?;

    match cli.output.as_deref() {
        None | Some("-") => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&bytes)
                .and_then(|()| stdout.flush())
                .map_err(|e| format!("Schreibfehler (stdout): {e}"))
        }
        Some(path) => replace_file(Path::new(path), &bytes),
    }
}

/// Eingabe als Stream; der Parser puffert selbst.
fn open_input(path: &str) -> Result<Box<dyn Read>, String> {
    if path == "-" {
        let stdin = std::io::stdin();
        if stdin.is_terminal() {
            eprintln!("Lese von stdin (Ctrl+D zum Beenden)...");
        }
        return Ok(Box::new(stdin.lock()));
    }
    let file = File::open(path).map_err(|e| format!("Lesefehler '{path}': {e}"))?;
    Ok(Box::new(file))
}

/// Ersetzt `path` atomar: erst `<path>.tmp` schreiben, dann umbenennen.
fn replace_file(path: &Path, bytes: &[u8]) -> Result<(), String> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    if let Err(e) = std::fs::write(&tmp_path, bytes) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(format!("Schreibfehler '{}': {e}", tmp_path.display()));
    }
    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        format!("Rename-Fehler '{}': {e}", path.display())
    })
}
