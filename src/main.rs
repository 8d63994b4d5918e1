use std::{env, path::Path, process::ExitCode, time::Instant};

use ebc::{
    ast::{expressions::Tok, statements::Block},
    compiler::compiler::Compiler,
    config::CompilerConfig,
    display_error,
    errors::errors::{Error, ErrorTip},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: ebc <file>");
        return ExitCode::FAILURE;
    }

    let config = match CompilerConfig::for_entry(Path::new(&args[1])) {
        Ok(config) => config,
        Err(error) => {
            print_bare_error(&error);
            return ExitCode::FAILURE;
        }
    };
    let entry = config.entry.clone();

    let start = Instant::now();
    let mut compiler = Compiler::from_config(config);
    if let Err(error) = compiler.compile_entry(&entry) {
        match compiler.source_of(&error) {
            Some(source) => display_error(&error, source),
            None => print_bare_error(&error),
        }
        return ExitCode::FAILURE;
    }
    info!("Total time: {:?}", start.elapsed());

    for module in compiler.modules() {
        println!("module {}", module.path);
        for function in module.functions() {
            let (calls, candidates) = count_calls(&function.block);
            println!(
                "  {} ({} locals, {} calls, {} candidates)",
                function.unique_name.as_deref().unwrap_or(&function.name),
                function.locals.len(),
                calls,
                candidates
            );
        }
    }

    ExitCode::SUCCESS
}

fn print_bare_error(error: &Error) {
    if let ErrorTip::None = error.get_tip() {
        eprintln!("Error: {}", error.get_error_name());
    } else {
        eprintln!("Error: {} ({})", error.get_error_name(), error.get_tip());
    }
    eprintln!("-> {}", error.get_position().1);
}

/// Call sites of a block and the overloads they may bind to.
fn count_calls(block: &Block) -> (usize, usize) {
    let mut calls = 0;
    let mut candidates = 0;
    for statement in block {
        for tok in statement.expr().into_iter().flatten() {
            if let Tok::Call {
                candidates: found, ..
            } = tok
            {
                calls += 1;
                candidates += found.len();
            }
        }
        for inner in statement.blocks() {
            let (inner_calls, inner_candidates) = count_calls(inner);
            calls += inner_calls;
            candidates += inner_candidates;
        }
    }
    (calls, candidates)
}
