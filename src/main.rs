use brace_compiler::{tokenize, transform_template_code, TokenizeResult};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "brace")]
#[command(about = "Brace - template front end: token streams and state rewriting")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tokenize a template and print its token stream
    Tokens {
        /// Path to a template file
        #[arg(required_unless_present = "stdin")]
        file: Option<PathBuf>,

        /// Read from stdin
        #[arg(long)]
        stdin: bool,

        /// Output tokens as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rewrite free identifiers in a code snippet onto the state parameter
    Transform {
        /// Path to a code snippet
        #[arg(required_unless_present = "stdin")]
        file: Option<PathBuf>,

        /// Read from stdin
        #[arg(long)]
        stdin: bool,

        /// Name of the state parameter
        #[arg(long, default_value = "state")]
        state: String,
    },

    /// Tokenize every .tpl template under a path and report errors
    Check {
        /// Path to a template file or directory
        path: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Tokens { file, stdin, json } => {
            let (source, filename) = read_input(file.as_deref(), stdin);
            let result = tokenize(&source);
            print_tokens(&result, json);
            if let Some(error) = &result.error {
                report_error(&error.render_color(&source, &filename), &error.render(&source, &filename));
                std::process::exit(1);
            }
        }
        Commands::Transform { file, stdin, state } => {
            let (source, _) = read_input(file.as_deref(), stdin);
            match transform_template_code(&source, &state) {
                Ok(code) => print!("{}", code),
                Err(e) => {
                    eprintln!("error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Check { path } => check_path(&path),
    }
}

fn read_input(file: Option<&Path>, stdin: bool) -> (String, String) {
    if stdin {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .expect("Failed to read stdin");
        (source, "<stdin>".to_string())
    } else if let Some(path) = file {
        let source = fs::read_to_string(path).expect("Failed to read file");
        (source, path.display().to_string())
    } else {
        eprintln!("Error: provide a file or use --stdin");
        std::process::exit(1);
    }
}

fn print_tokens(result: &TokenizeResult, json: bool) {
    if json {
        match serde_json::to_string(&result.tokens) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("error: failed to serialize tokens: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        for token in &result.tokens {
            println!("{:>4}  {:?} {:?}", token.offset, token.kind, token.text);
        }
    }
}

fn check_path(path: &Path) {
    if path.is_file() {
        let start = Instant::now();
        let ok = check_file(path);
        print_summary(1, if ok { 0 } else { 1 }, start.elapsed());
        if !ok {
            std::process::exit(1);
        }
    } else if path.is_dir() {
        check_directory(path);
    } else {
        eprintln!("Error: {} does not exist", path.display());
        std::process::exit(1);
    }
}

fn check_directory(dir: &Path) {
    let start = Instant::now();
    let mut file_count = 0;
    let mut failed = 0;

    for entry in WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "tpl"))
    {
        file_count += 1;
        if !check_file(entry.path()) {
            failed += 1;
        }
    }

    if file_count == 0 {
        eprintln!("No .tpl files found in {}", dir.display());
        std::process::exit(1);
    }

    print_summary(file_count, failed, start.elapsed());
    if failed > 0 {
        std::process::exit(1);
    }
}

fn check_file(path: &Path) -> bool {
    let source = fs::read_to_string(path).expect("Failed to read file");
    let filename = path.display().to_string();
    let result = tokenize(&source);

    match &result.error {
        Some(error) => {
            report_error(
                &error.render_color(&source, &filename),
                &error.render(&source, &filename),
            );
            false
        }
        None => {
            print_checked(&filename);
            true
        }
    }
}

fn report_error(colored: &str, plain: &str) {
    if io::stderr().is_terminal() {
        eprint!("{}", colored);
    } else {
        eprint!("{}", plain);
    }
}

fn print_checked(path: &str) {
    if io::stderr().is_terminal() {
        eprintln!("  \x1b[32m✓\x1b[0m {}", path);
    } else {
        eprintln!("  ✓ {}", path);
    }
}

fn print_summary(count: usize, failed: usize, elapsed: std::time::Duration) {
    let time_str = format_duration(elapsed);
    let files_word = if count == 1 { "file" } else { "files" };
    let status = if failed == 0 {
        format!("Checked {} {}", count, files_word)
    } else {
        format!("Checked {} {}, {} failed", count, files_word, failed)
    };

    if io::stderr().is_terminal() {
        eprintln!("\n\x1b[1m{} in {}\x1b[0m", status, time_str);
    } else {
        eprintln!("\n{} in {}", status, time_str);
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let micros = d.as_micros();
    if micros < 1000 {
        format!("{}μs", micros)
    } else if micros < 1_000_000 {
        format!("{:.1}ms", micros as f64 / 1000.0)
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}
