use std::env;
use std::io::{self, BufRead, Write};
use std::process;

use log::{debug, LevelFilter};
use simplelog::{ColorChoice, Config as LogConfig, TermLogger, TerminalMode};

use pipeshell::config::Limits;
use pipeshell::executor;
use pipeshell::meta;

const PROMPT: &str = "pipeshell> ";

fn print_usage() -> ! {
    eprintln!("Usage: pipeshell [--meta <path>] [--verbose] [-c <command>]");
    process::exit(2);
}

struct Args {
    meta_path: Option<String>,
    command: Option<String>,
    verbose: bool,
}

fn parse_args() -> Args {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut meta_path: Option<String> = None;
    let mut command: Option<String> = None;
    let mut verbose = false;
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--meta" => {
                i += 1;
                match args.get(i) {
                    Some(path) => meta_path = Some(path.clone()),
                    None => print_usage(),
                }
            }
            "-c" => {
                i += 1;
                match args.get(i) {
                    Some(cmd) => command = Some(cmd.clone()),
                    None => print_usage(),
                }
            }
            "--verbose" => verbose = true,
            _ => print_usage(),
        }
        i += 1;
    }

    Args {
        meta_path,
        command,
        verbose,
    }
}

fn main() {
    let args = parse_args();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let _ = TermLogger::init(
        level,
        LogConfig::default(),
        TerminalMode::Stderr,
        ColorChoice::Never,
    );

    let limits = Limits::from_env();

    match args.command {
        Some(command) => one_shot(&command, &limits, args.meta_path.as_deref()),
        None => interactive(&limits),
    }
}

/// Run one pipeline and exit with its final segment's status.
fn one_shot(command: &str, limits: &Limits, meta_path: Option<&str>) -> ! {
    match executor::run_pipeline(command, limits) {
        Ok(result) => {
            debug!("pipestatus: {:?}", result.pipestatus);
            if let Some(path) = meta_path {
                if let Err(e) = meta::write_meta(path, &result) {
                    eprintln!("pipeshell: failed to write meta: {}", e);
                }
            }
            process::exit(result.exit_code);
        }
        Err(e) => {
            eprintln!("pipeshell: {}", e);
            process::exit(2);
        }
    }
}

/// Prompt, read, dispatch; until end-of-input or `exit`. Errors are printed
/// and the loop keeps going — a bad line never takes the shell down.
fn interactive(limits: &Limits) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();

    loop {
        let _ = stdout.write_all(PROMPT.as_bytes());
        let _ = stdout.flush();

        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // end of input
            Ok(_) => {}
            Err(e) => {
                eprintln!("pipeshell: read: {}", e);
                break;
            }
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "exit" {
            break;
        }

        match executor::run_pipeline(trimmed, limits) {
            Ok(result) => debug!("pipestatus: {:?}", result.pipestatus),
            Err(e) => eprintln!("pipeshell: {}", e),
        }
    }
}
