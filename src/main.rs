use std::{
    io::{BufRead, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::{CommandFactory, Parser as ClapParser, ValueEnum, error::ErrorKind};
use colored::Colorize;
use indoc::indoc;
use tacc::{
    CompileError, Session,
    backend::{EmitOptions, RegisterScope},
    frontend::{SourceFile, SourceFileOrigin},
    middle::tac::pretty_print::pretty_print_tac,
};

const REPL_BANNER: &str = indoc! {"
    tacc interactive mode
    Enter a program on one line, `exit` to quit.
"};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Listing {
    Tokens,
    Ast,
    Tac,
    Asm,
    All,
}

#[derive(Debug, ClapParser)]
#[command(version, about, long_about = None)]
pub struct Args {
    source_files: Vec<PathBuf>,

    /// Compile SOURCE instead of reading files
    #[arg(short, long = "input", value_name = "SOURCE", conflicts_with = "source_files")]
    input: Option<String>,

    /// Listings to print, may be repeated
    #[arg(long, value_enum)]
    emit: Vec<Listing>,

    #[arg(long, value_enum, default_value_t)]
    register_scope: RegisterScope,

    /// Print each TAC instruction as a comment above its assembly
    #[arg(long)]
    annotate: bool,
}

impl Args {
    fn wants(&self, listing: Listing) -> bool {
        self.emit.is_empty() || self.emit.contains(&Listing::All) || self.emit.contains(&listing)
    }

    fn emit_options(&self) -> EmitOptions {
        EmitOptions {
            register_scope: self.register_scope,
            annotate: self.annotate,
        }
    }
}

fn header(title: &str) {
    println!("{}", format!("== {title} ==").bold().green());
}

fn run(args: &Args, source: SourceFile) -> Result<(), CompileError> {
    let mut session = Session::new(source);

    let tokens = session.tokenize()?;
    if args.wants(Listing::Tokens) {
        header("TOKENS");
        for token in tokens {
            println!("{token}");
        }
    }

    let program = session.parse()?;
    if args.wants(Listing::Ast) {
        header("AST");
        print!("{program}");
    }

    let tac = session.generate()?;
    if args.wants(Listing::Tac) {
        header("TAC");
        pretty_print_tac(tac);
    }

    let assembly = session.emit(&args.emit_options())?;
    if args.wants(Listing::Asm) {
        header("ASSEMBLY");
        print!("{assembly}");
    }

    Ok(())
}

fn report(error: &CompileError) {
    eprintln!("{} {error}", "error:".bold().red());
}

fn repl(args: &Args) -> ExitCode {
    print!("{REPL_BANNER}");

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        if std::io::stdout().flush().is_err() {
            return ExitCode::FAILURE;
        }

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(error)) => {
                eprintln!("{} {error}", "error:".bold().red());
                return ExitCode::FAILURE;
            }
            // EOF
            None => return ExitCode::SUCCESS,
        };

        match line.trim() {
            "exit" => return ExitCode::SUCCESS,
            "" => continue,
            source => {
                if let Err(error) = run(args, SourceFile::in_memory(source)) {
                    report(&error);
                }
            }
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();

    if let Some(input) = &args.input {
        return match run(&args, SourceFile::in_memory(input.as_str())) {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                report(&error);
                ExitCode::FAILURE
            }
        };
    }

    if args.source_files.is_empty() {
        return repl(&args);
    }

    for source_file in &args.source_files {
        if !source_file.exists() {
            Args::command()
                .error(
                    ErrorKind::InvalidValue,
                    format!("Source file '{}' does not exist!", source_file.display()),
                )
                .exit()
        }

        if !source_file.is_file() {
            Args::command()
                .error(
                    ErrorKind::InvalidValue,
                    format!("Input path '{}' is not a file!", source_file.display()),
                )
                .exit()
        }
    }

    for path in &args.source_files {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) => {
                Args::command()
                    .error(
                        ErrorKind::Io,
                        format!("Failed to read '{}': {error}", path.display()),
                    )
                    .exit()
            }
        };

        let source = SourceFile {
            contents,
            origin: SourceFileOrigin::File(path.clone()),
        };

        log::info!("compiling {}", source.origin);

        if let Err(error) = run(&args, source) {
            report(&error);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
