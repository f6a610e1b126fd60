use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(version, about = "Converts context-free grammars to Chomsky normal form")]
pub struct Cli {
    /// File containing the grammar
    pub file: PathBuf,

    /// Start symbol (default: first in the file)
    #[arg(short, long, value_name = "SYMBOL")]
    pub start: Option<String>,

    /// Print the grammar after every normalization stage
    #[arg(long)]
    pub stages: bool,

    /// Give up on a stage after this many fixpoint iterations
    #[arg(long, value_name = "N", default_value_t = 100_000)]
    pub max_iterations: usize,

    /// Number of sentences to sample from the normalized grammar (default: 0)
    #[arg(short = 'n', long, value_name = "AMOUNT")]
    pub amount: Option<u32>,

    /// Nesting depth after which sampling only picks rules that finish
    #[arg(long, value_name = "DEPTH", default_value_t = 12)]
    pub depth: usize
}
