//! BCM command-line tool.
//!
//! Usage:
//!   bcm [options] infile [outfile]
//!
//! Compresses `infile` to `infile.bcm` by default; `-d` decompresses,
//! stripping the `.bcm` suffix (or appending `.out` when there is none).

use std::env;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use std::process;
use std::time::Instant;

use bcm::{BcmError, DEFAULT_BLOCK_SIZE};

struct Options {
    block_size: usize,
    decompress: bool,
    force: bool,
    files: Vec<String>,
}

fn usage() -> ! {
    eprintln!(
        "BCM - A BWT-based file compressor\n\
         \n\
         Usage: bcm [options] infile [outfile]\n\
         \n\
         Options:\n\
         \x20 -b# Set block size to # MiB (default: 16)\n\
         \x20 -d  Decompress\n\
         \x20 -f  Force overwrite of output file"
    );
    process::exit(1);
}

fn parse_options() -> Options {
    let mut opts = Options {
        block_size: DEFAULT_BLOCK_SIZE,
        decompress: false,
        force: false,
        files: Vec::new(),
    };

    let mut args = env::args().skip(1).peekable();
    while let Some(arg) = args.peek() {
        if !arg.starts_with('-') {
            break;
        }
        let arg = args.next().unwrap();
        let chars: Vec<char> = arg.chars().collect();
        let mut i = 1;
        while i < chars.len() {
            match chars[i] {
                // Digits standing alone are ignored for compatibility with
                // old command lines ("-b16" scans the digits twice).
                '0'..='9' => {}
                'b' => {
                    let digits: String = chars[i + 1..]
                        .iter()
                        .take_while(|c| c.is_ascii_digit())
                        .collect();
                    let mib: i64 = digits.parse().unwrap_or(0);
                    let bytes = mib.checked_mul(1 << 20).unwrap_or(0);
                    if !(1..=i64::from(i32::MAX)).contains(&bytes) {
                        eprintln!("Block size is out of range");
                        process::exit(1);
                    }
                    opts.block_size = bytes as usize;
                }
                'd' => opts.decompress = true,
                'f' => opts.force = true,
                c => {
                    eprintln!("Unknown option '-{c}'");
                    process::exit(1);
                }
            }
            i += 1;
        }
    }

    opts.files = args.collect();
    opts
}

fn default_output_name(input: &str, decompress: bool) -> String {
    if decompress {
        match input.strip_suffix(".bcm") {
            Some(stripped) if !stripped.is_empty() => stripped.to_string(),
            _ => format!("{input}.out"),
        }
    } else {
        format!("{input}.bcm")
    }
}

fn confirm_overwrite(path: &str) -> bool {
    eprint!("File '{path}' already exists. Overwrite (y/n)? ");
    io::stderr().flush().ok();

    let mut answer = String::new();
    if io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    answer.trim_start().starts_with('y')
}

fn main() {
    let start = Instant::now();

    let opts = parse_options();
    if opts.files.is_empty() {
        usage();
    }

    let input_name = &opts.files[0];
    let output_name = match opts.files.get(1) {
        Some(name) => name.clone(),
        None => default_output_name(input_name, opts.decompress),
    };

    let in_file = match File::open(input_name) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("{input_name}: {e}");
            process::exit(1);
        }
    };
    let in_len = in_file.metadata().map(|m| m.len()).unwrap_or(0);

    if !opts.force && Path::new(&output_name).exists() && !confirm_overwrite(&output_name) {
        eprintln!("Not overwritten");
        process::exit(1);
    }

    let out_file = match File::create(&output_name) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("{output_name}: {e}");
            process::exit(1);
        }
    };

    let mut reader = BufReader::with_capacity(1 << 16, in_file);
    let mut writer = BufWriter::with_capacity(1 << 16, out_file);

    let result = if opts.decompress {
        eprintln!("Decompressing '{input_name}':");
        bcm::decompress(&mut reader, &mut writer)
    } else {
        eprintln!("Compressing '{input_name}':");
        // No point allocating a 16 MiB block for a smaller file.
        let block_size = opts.block_size.min(in_len.max(1) as usize);
        bcm::compress(&mut reader, &mut writer, block_size)
    };

    if let Err(e) = result {
        match e {
            BcmError::InvalidSignature => eprintln!("{input_name}: {e}"),
            e => eprintln!("{e}"),
        }
        process::exit(1);
    }

    if let Err(e) = writer.flush() {
        eprintln!("{output_name}: {e}");
        process::exit(1);
    }

    let out_len = fs::metadata(&output_name).map(|m| m.len()).unwrap_or(0);
    eprintln!(
        "{in_len} -> {out_len} in {:.1} sec",
        start.elapsed().as_secs_f64()
    );
}
