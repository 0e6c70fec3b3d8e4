//! CBOT command-line driver.

mod commands;

use commands::{check_file, lex_file, run_file, RunOptions};

fn main() {
    cbotc::init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "run" => {
            if args.len() < 3 {
                eprintln!("Usage: cbot run <file> [--entry <name>] [--steps <n>]");
                std::process::exit(1);
            }

            // Options take their value from the next argument.
            let mut options = RunOptions::default();
            let mut i = 3;
            while i < args.len() {
                let value = args.get(i + 1);
                match (args[i].as_str(), value) {
                    ("--entry" | "-e", Some(name)) => {
                        options.entry.clone_from(name);
                        i += 2;
                    }
                    ("--steps" | "-s", Some(steps)) => {
                        let Ok(steps) = steps.parse::<u64>() else {
                            eprintln!("error: --steps expects a positive number, got '{steps}'");
                            std::process::exit(1);
                        };
                        options.steps = Some(steps.max(1));
                        i += 2;
                    }
                    (flag, _) => {
                        eprintln!("error: unknown or incomplete option '{flag}'");
                        std::process::exit(1);
                    }
                }
            }

            run_file(&args[2], &options);
        }
        "check" => {
            if args.len() < 3 {
                eprintln!("Usage: cbot check <file>");
                std::process::exit(1);
            }
            check_file(&args[2]);
        }
        "lex" => {
            if args.len() < 3 {
                eprintln!("Usage: cbot lex <file>");
                std::process::exit(1);
            }
            lex_file(&args[2]);
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-v" => {
            println!("cbot {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("CBOT scripting language");
    println!();
    println!("Usage: cbot <command> [options]");
    println!();
    println!("Commands:");
    println!("  run <file>       Compile and run a program");
    println!("  check <file>     Compile only, report the first error");
    println!("  lex <file>       Tokenize and display tokens");
    println!("  help             Show this help message");
    println!("  version          Show version information");
    println!();
    println!("Run options:");
    println!("  --entry <name>   Function to start (default: main)");
    println!("  --steps <n>      Steps per slice; the run resumes until done");
    println!();
    println!("Environment:");
    println!("  RUST_LOG         Tracing filter, e.g. cbot_eval=debug");
    println!("  CBOT_LOG_TREE    Print tracing output as a tree");
}
