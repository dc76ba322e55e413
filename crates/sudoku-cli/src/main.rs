//! Stream-solving command line interface.
//!
//! Reads puzzles from standard input, solves them, and writes the resulting
//! grids to standard output. Per-puzzle failures are diagnostics on standard
//! error and never abort the stream.

use std::io::{self, Write as _};
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;
use sudoku_core::Puzzle;
use sudoku_solver::{Grid, Solver, SolverError, SolverOptions};
use thiserror::Error;

mod reader;
mod writer;

use self::reader::{PuzzleReader, ReadError};
use self::writer::{GridWriter, OutputFormat};

#[derive(Debug, Parser)]
#[command(
    name = "sudoku",
    version,
    about = "Solve 9x9 sudoku puzzles from standard input"
)]
struct Cli {
    /// Log every assertion, rejection, and coloring event to stderr.
    #[arg(long)]
    verbose: bool,

    /// Output format code: columns per line (9, or 1 for a single line of
    /// 81) followed by the empty-cell character (. or 0).
    #[arg(long, value_name = "CODE", default_value = "9.")]
    format: OutputFormat,

    /// Write a CPU profile to sudoku.pprof on exit.
    #[arg(long)]
    cpuprofile: bool,

    /// Accept the first speculative solution without checking uniqueness.
    #[arg(long)]
    no_verify_uniqueness: bool,

    /// Reformat puzzles without solving them.
    #[arg(long)]
    no_solve: bool,

    /// Disable the coloring layer.
    #[arg(long)]
    no_coloring: bool,

    /// Disable speculative search; stalled puzzles are emitted unsolved.
    #[arg(long)]
    no_backtracking: bool,
}

impl Cli {
    fn solver_options(&self) -> SolverOptions {
        SolverOptions {
            coloring: !self.no_coloring,
            backtracking: !self.no_backtracking,
            verify_uniqueness: !self.no_verify_uniqueness,
        }
    }
}

/// A failure of the stream itself, as opposed to a per-puzzle diagnostic.
#[derive(Debug, Error)]
enum StreamError {
    #[error("read error: {0}")]
    Read(#[from] ReadError),
    #[error("write error: {0}")]
    Write(#[from] io::Error),
}

fn main() -> ExitCode {
    better_panic::install();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let profiler = cli.cpuprofile.then(start_profiler).flatten();
    let result = run(&cli);
    if let Some(profiler) = profiler {
        if let Err(err) = write_profile(&profiler) {
            eprintln!("cpuprofile: {err}");
        }
    }

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<bool, StreamError> {
    let options = cli.solver_options();
    let solver = Solver::new(options);
    let mut reader = PuzzleReader::new(io::stdin().lock());
    let mut writer = GridWriter::new(io::stdout().lock(), cli.format);

    let mut solved = false;
    while let Some(puzzle) = reader.read()? {
        let (grid, outcome) = process(&solver, &options, &puzzle, cli.no_solve);
        if let Err(err) = outcome {
            eprintln!("invalid puzzle: {}: {err}", reader.puzzles_read());
        }
        solved = solved || grid.is_solved();
        writer.write(&grid).map_err(StreamError::Write)?;
        writer.flush().map_err(StreamError::Write)?;
    }
    Ok(solved)
}

/// Loads the clues and, unless disabled, solves. The grid comes back in
/// whatever state it reached, so the stream always emits all 81 cells.
fn process(
    solver: &Solver,
    options: &SolverOptions,
    puzzle: &Puzzle,
    no_solve: bool,
) -> (Grid, Result<(), SolverError>) {
    let mut grid = Grid::with_coloring(options.coloring);
    if let Err(err) = grid.load(puzzle) {
        return (grid, Err(err));
    }
    if no_solve {
        return (grid, Ok(()));
    }
    let outcome = solver.solve(&mut grid).map(|_| ());
    (grid, outcome)
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
}

fn start_profiler() -> Option<pprof::ProfilerGuard<'static>> {
    match pprof::ProfilerGuardBuilder::default().frequency(99).build() {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("cpuprofile: {err}");
            None
        }
    }
}

fn write_profile(profiler: &pprof::ProfilerGuard<'_>) -> Result<(), Box<dyn std::error::Error>> {
    use pprof::protos::Message as _;

    let report = profiler.report().build()?;
    let profile = report.pprof()?;
    let mut body = Vec::new();
    profile.write_to_vec(&mut body)?;
    std::fs::write("sudoku.pprof", body)?;
    Ok(())
}
