mod cli;
mod error_handling;
mod generator;
mod grammar;
mod normalize;
mod parser;

use std::process::ExitCode;

use clap::Parser;
use log::info;
use rand::thread_rng;

use cli::Cli;
use error_handling::*;
use grammar::{Grammar, Symbol};
use normalize::Limits;
use parser::CompileErrorType;

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(messages) => {
            for message in messages {
                eprintln!("{}", message);
            }
            ExitCode::FAILURE
        }
    }
}

// Errors come back already rendered, since each subsystem has its own type
fn run(cli: &Cli) -> Result<(), Vec<String>> {
    let grammar = load(cli)?;
    info!("Read {} rules from {}", grammar.rules().len(), cli.file.display());

    if cli.stages {
        println!("Input\n{}\n", grammar);
    }

    let limits = Limits { max_iterations: cli.max_iterations };
    let normalized = normalize::normalize_observed(&grammar, &limits, |stage, current| {
        if cli.stages {
            println!("After {}\n{}\n", stage, current);
        }
    }).map_err(|error| vec![Error::in_file(cli.file.clone(), error).to_string()])?;

    if !cli.stages {
        println!("{}", normalized);
    }

    let mut rng = thread_rng();
    for _ in 0..cli.amount.unwrap_or(0) {
        let sentence = generator::generate(&normalized, &mut rng, cli.depth, cli.file.clone())
            .map_err(|error| vec![error.to_string()])?;
        println!("{}", sentence);
    }

    Ok(())
}

fn load(cli: &Cli) -> Result<Grammar, Vec<String>> {
    let grammar = parser::parse_file(&cli.file)
        .map_err(|errors| errors.iter().map(ToString::to_string).collect::<Vec<_>>())?;

    match &cli.start {
        Some(start) => grammar
            .with_start(Symbol::new(start.as_str()))
            .map_err(|error| vec![Error::in_file(cli.file.clone(), CompileErrorType::InvalidGrammar(error)).to_string()]),
        None => Ok(grammar)
    }
}
