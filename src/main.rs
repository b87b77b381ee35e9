//! Bunny Hop command line
//!
//! Lists the built-in levels, or runs a flat script file against one of
//! them on simulated time and prints how it went.

#[cfg(not(target_arch = "wasm32"))]
use std::process::ExitCode;

#[cfg(not(target_arch = "wasm32"))]
use bunny_hop::{
    Engine, EngineConfig, LevelCatalog, ManualClock, RunOutcome, RunReport, Script, ScriptRunner,
};

#[cfg(not(target_arch = "wasm32"))]
const USAGE: &str = "usage: bunny-hop [<level> <script-file>]";

#[cfg(not(target_arch = "wasm32"))]
fn main() -> ExitCode {
    env_logger::init();

    let catalog = match LevelCatalog::builtin() {
        Ok(catalog) => catalog,
        Err(err) => {
            eprintln!("error: built-in levels: {err}");
            return ExitCode::FAILURE;
        }
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => {
            list_levels(&catalog);
            ExitCode::SUCCESS
        }
        [level, path] => match run_script(&catalog, level, path) {
            Ok((number, report)) => {
                print_report(&report);
                if report.outcome == RunOutcome::Complete {
                    match catalog.next_after(number) {
                        Some(next) => println!("Next level: {next}"),
                        None => println!("That was the last level!"),
                    }
                }
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("error: {err}");
                ExitCode::FAILURE
            }
        },
        _ => {
            eprintln!("{USAGE}");
            ExitCode::from(2)
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn list_levels(catalog: &LevelCatalog) {
    for (number, level) in catalog.iter() {
        println!("{number:>3}  {:<24} {} items", level.name, level.item_count());
        if let Some(hint) = &level.hint {
            println!("     {hint}");
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run_script(
    catalog: &LevelCatalog,
    level: &str,
    path: &str,
) -> Result<(u32, RunReport), Box<dyn std::error::Error>> {
    let number: u32 = level.parse()?;
    let source = std::fs::read_to_string(path)?;
    let script = Script::parse(&source)?;

    let mut engine = Engine::with_clock(EngineConfig::default(), ManualClock::new());
    engine.load_from_catalog(catalog, number)?;
    log::info!("Running {} statements from {path}", script.statements().len());

    Ok((number, ScriptRunner::default().run(&mut engine, &script)))
}

#[cfg(not(target_arch = "wasm32"))]
fn print_report(report: &RunReport) {
    let summary = match report.outcome {
        RunOutcome::Complete => "Level complete!".to_string(),
        RunOutcome::NeedsItems { required } => {
            format!("Reached the flag, but you need to collect all {required} items first")
        }
        RunOutcome::Settled => "The bunny stopped before the flag".to_string(),
        RunOutcome::TimedOut => "Gave up after the time limit".to_string(),
        RunOutcome::NoLevel => "No level loaded".to_string(),
    };
    println!("{summary}");
    println!(
        "items: {}  moves: {}  time: {}s  frames: {}",
        report.stats.carrot_count, report.stats.move_count, report.stats.current_time, report.frames
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser entry point is `web::init`
}
