use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use env_logger::{Builder, Env};
use log::{debug, info};

use rox::ast_printer::AstPrinter;
use rox::config::{Config, DEFAULT_MAX_CALL_DEPTH};
use rox::parser::Parser;
use rox::scanner::Scanner;
use rox::session::{Session, EXIT_DATA_ERR, EXIT_USAGE};

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    /// Script to run. Without one, starts an interactive prompt
    #[arg(value_name = "SCRIPT")]
    scripts: Vec<PathBuf>,

    /// Enable logging to rox.log
    #[arg(long)]
    log: bool,

    /// Maximum number of nested function calls before "Stack overflow."
    #[arg(long, env = "ROX_MAX_CALL_DEPTH", default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,

    /// Print the token stream instead of running
    #[arg(long, conflicts_with = "dump_ast")]
    tokens: bool,

    /// Print the parsed program instead of running
    #[arg(long)]
    dump_ast: bool,

    /// Emit --tokens / --dump-ast output as JSON
    #[arg(long)]
    json: bool,
}

/// Reads the contents of a file as UTF-8 text.
fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    String::from_utf8(buf).context(format!("{:?} is not valid UTF-8", filename))
}

fn init_logger() -> Result<()> {
    let log_file = File::create("rox.log").context("Failed to create rox.log")?;

    Builder::from_env(Env::default().default_filter_or("debug"))
        .format(|buf, record| {
            // Strip the crate prefix from module paths
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("rox::").unwrap_or(module);
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    info!("Logger initialized, writing to rox.log");
    Ok(())
}

/// Source for the dump modes: the script if given, otherwise all of stdin.
fn read_source(script: Option<&PathBuf>) -> Result<String> {
    match script {
        Some(path) => read_file(path),
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read standard input")?;
            Ok(source)
        }
    }
}

fn dump_tokens(source: &str, json: bool) -> Result<i32> {
    let (tokens, errors) = Scanner::new(source).scan_all();

    for e in &errors {
        eprintln!("{}", e);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
    } else {
        for token in &tokens {
            println!("{}", token);
        }
    }

    Ok(if errors.is_empty() { 0 } else { EXIT_DATA_ERR })
}

fn dump_ast(source: &str, json: bool) -> Result<i32> {
    let (tokens, mut errors) = Scanner::new(source).scan_all();
    let mut parser = Parser::new(tokens);
    let statements = parser.parse();
    errors.extend(parser.take_errors());

    for e in &errors {
        eprintln!("{}", e);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&statements)?);
    } else {
        println!("{}", AstPrinter::print_program(&statements));
    }

    Ok(if errors.is_empty() { 0 } else { EXIT_DATA_ERR })
}

fn run_file(path: &Path, config: Config) -> Result<i32> {
    let source = read_file(path)?;
    let mut session = Session::with_config(io::stdout(), config);
    let report = session.run(&source);

    for message in report.messages() {
        eprintln!("{}", message);
    }

    info!("Run finished with exit code {}", report.exit_code());
    Ok(report.exit_code())
}

fn run_prompt(config: Config) -> Result<i32> {
    let mut session = Session::with_config(io::stdout(), config);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush prompt")?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read from standard input")?;

        // Each line is its own program; only the globals carry over.
        let report = session.run(&line);
        for message in report.messages() {
            eprintln!("{}", message);
        }
        debug!("Line finished with exit code {}", report.exit_code());
    }

    println!();
    Ok(0)
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        // Minimal logger to avoid "no logger" warnings
        Builder::new().filter_level(log::LevelFilter::Off).init();
    }

    info!("CLI arguments: {:?}", args);

    if args.scripts.len() > 1 {
        println!("Usage: rox [script]");
        std::process::exit(EXIT_USAGE);
    }

    let script = args.scripts.first();
    let config = Config {
        max_call_depth: args.max_call_depth,
    };

    let code = if args.tokens {
        dump_tokens(&read_source(script)?, args.json)?
    } else if args.dump_ast {
        dump_ast(&read_source(script)?, args.json)?
    } else {
        match script {
            Some(path) => run_file(path, config)?,
            None => run_prompt(config)?,
        }
    };

    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}
