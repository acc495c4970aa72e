//! blocktree command-line interface.
//!
//! Thin dispatch over [`BTreeIndex`]: parses arguments, maps library
//! errors to exit codes, prints results on stdout and errors on stderr.

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufReader, Write};

use blocktree::{BTreeIndex, Error, Result};

fn main() {
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();

    let exit_code = run(std::env::args_os(), &mut stdout, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn write_usage<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Usage: blocktree <command> [arguments...]")?;
    writeln!(out)?;
    writeln!(out, "Commands:")?;
    writeln!(out, "  create  <file>                create a new, empty index file")?;
    writeln!(out, "  insert  <file> <key> <value>  insert one key/value pair")?;
    writeln!(out, "  search  <file> <key>          look up a key")?;
    writeln!(out, "  load    <file> <csv>          bulk-load key,value lines from a file")?;
    writeln!(out, "  print   <file>                print all pairs in ascending key order")?;
    writeln!(out, "  extract <file> <out>          write all pairs to a new text file")?;
    Ok(())
}

fn run<I, W, E>(args: I, out: &mut W, err: &mut E) -> i32
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let args: Vec<String> = args
        .into_iter()
        .skip(1)
        .map(|a| a.to_string_lossy().into_owned())
        .collect();

    let Some(command) = args.first() else {
        let _ = write_usage(err);
        return 2;
    };

    let result = match (command.as_str(), &args[1..]) {
        ("create", [file]) => BTreeIndex::create(file).map(|_| ()),
        ("insert", [file, key, value]) => cmd_insert(file, key, value),
        ("search", [file, key]) => match cmd_search(file, key, out) {
            Ok(true) => return 0,
            Ok(false) => {
                let _ = writeln!(err, "key {} not found", key);
                return 1;
            }
            Err(error) => Err(error),
        },
        ("load", [file, csv]) => cmd_load(file, csv, out, err),
        ("print", [file]) => cmd_print(file, out),
        ("extract", [file, output]) => cmd_extract(file, output),
        ("help" | "--help" | "-h", _) => {
            let _ = write_usage(out);
            return 0;
        }
        _ => {
            let _ = writeln!(err, "error: bad command or wrong number of arguments");
            let _ = write_usage(err);
            return 2;
        }
    };

    match result {
        Ok(()) => 0,
        Err(error) => {
            let _ = writeln!(err, "error: {error}");
            1
        }
    }
}

fn parse_u64(what: &str, raw: &str) -> Result<u64> {
    raw.parse()
        .map_err(|_| Error::InvalidInput(format!("{} must be an unsigned integer: {:?}", what, raw)))
}

fn cmd_insert(file: &str, key: &str, value: &str) -> Result<()> {
    let key = parse_u64("key", key)?;
    let value = parse_u64("value", value)?;
    BTreeIndex::open(file)?.insert(key, value)
}

/// Returns whether the key was found. A miss is a normal negative result
/// in the library; the caller turns it into a failing exit code.
fn cmd_search<W: Write>(file: &str, key: &str, out: &mut W) -> Result<bool> {
    let key = parse_u64("key", key)?;
    match BTreeIndex::open(file)?.search(key)? {
        Some((k, v)) => {
            writeln!(out, "{},{}", k, v)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

fn cmd_load<W: Write, E: Write>(file: &str, csv: &str, out: &mut W, err: &mut E) -> Result<()> {
    let mut index = BTreeIndex::open(file)?;
    let reader = BufReader::new(File::open(csv).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            Error::FileNotFound(csv.into())
        } else {
            Error::Io(e)
        }
    })?);

    let report = index.bulk_load(reader)?;
    for (line_no, line) in &report.skipped {
        writeln!(err, "warning: skipping malformed line {}: {:?}", line_no, line)?;
    }
    writeln!(out, "loaded {} records from {}", report.inserted, csv)?;
    Ok(())
}

fn cmd_print<W: Write>(file: &str, out: &mut W) -> Result<()> {
    BTreeIndex::open(file)?.print_to(out)
}

fn cmd_extract(file: &str, output: &str) -> Result<()> {
    BTreeIndex::open(file)?.extract_to(output)
}
