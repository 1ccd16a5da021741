//! # Letter Boxed Live Data Test
//!
//! Fetches today's puzzle from the publisher via lib_letterboxed, solves it,
//! and prints a summary of what the server would serve.

use clap::Parser;
use lib_letterboxed::cache::build_snapshot;
use lib_letterboxed::puzzle::{NytPuzzleSource, PuzzleSource, DEFAULT_SOURCE_URL};
use lib_letterboxed::retrieve::ApiClientOptions;

#[derive(Parser, Debug)]
#[clap(about = "Live fetch-and-solve check of the Letter Boxed page")]
struct Args {
    /// Page to scrape.
    #[clap(long, default_value = DEFAULT_SOURCE_URL)]
    url: String,

    /// Print the full snapshot JSON instead of a summary.
    #[clap(long)]
    full: bool,
}

/// Executes the live fetch and solve.
///
/// // Statement: Prints the solution counts and a few samples to stdout on success.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // // Statement: Show the pipeline's stage timings on the console
    tracing_subscriber::fmt().with_target(false).init();

    let args = Args::parse();
    let source = NytPuzzleSource::new(&args.url, ApiClientOptions::default())?;

    println!("[*] Requesting live puzzle from {} ...", args.url);

    let raw = match source.fetch_puzzle().await {
        Ok(raw) => raw,
        Err(e) => {
            // // Statement: Failure - Print specific error details to stderr
            eprintln!("\n[ERROR] Puzzle retrieval failed:");
            eprintln!(">>> [{}] {}", e.kind(), e);
            std::process::exit(1);
        }
    };

    let snapshot = match tokio::task::spawn_blocking(move || build_snapshot(raw)).await? {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("\n[ERROR] Puzzle could not be solved:");
            eprintln!(">>> [{}] {}", e.kind(), e);
            std::process::exit(1);
        }
    };

    if args.full {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let sides: Vec<&str> = snapshot.puzzle.sides.iter().map(|s| s.as_str()).collect();
    println!("\n[SUCCESS] Puzzle solved:");
    println!("-----------------------------------------------");
    println!("Print date      : {}", snapshot.print_date());
    println!("Expiration      : {:?}", snapshot.expiration());
    println!("Sides           : {}", sides.join(" / "));
    println!("Dictionary      : {} words", snapshot.puzzle.dictionary.len());
    println!("Their solution  : {}", snapshot.puzzle.our_solution.join(" → "));
    println!("All solutions   : {}", snapshot.all_solutions.len());
    println!("One-word        : {}", snapshot.one_word_solutions.len());
    println!("Perfect         : {}", snapshot.perfect_solutions.len());
    println!("-----------------------------------------------");

    for solution in snapshot.perfect_solutions.iter().take(10) {
        println!("  {}", solution.join(" → "));
    }

    Ok(())
}
