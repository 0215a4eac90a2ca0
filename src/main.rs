// Entry point and high-level CLI flow.
//
// - `report` and `info` run one pass and exit.
// - With no subcommand, an interactive menu loads the CSV once ([1]) and
//   generates reports for any number of date ranges ([2]).
mod cli;

use air_quality_report::output;
use air_quality_report::util::{self, resolve_bound};
use air_quality_report::{load, LoadReport, RecordStore, ReportSet};
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;
use clap::Parser;
use cli::{Args, Command};
use std::io::{self, Write};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn init_logging(args: &Args) {
    // RUST_LOG wins over the verbosity flags when set.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level().as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

/// Print `label` and read one trimmed line. `None` once stdin is closed.
fn prompt(label: &str) -> Option<String> {
    print!("{}", label);
    let _ = io::stdout().flush();
    match util::read_trimmed_line(&mut io::stdin().lock()) {
        Ok(line) => line,
        Err(e) => {
            debug!("stdin read failed: {}", e);
            None
        }
    }
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
fn read_choice() -> Option<String> {
    prompt("Enter choice: ")
}

/// Ask the user whether to go back to the report selection menu after
/// generating reports. Closed input counts as `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        let Some(resp) = prompt("Back to Report Selection (Y/N): ") else {
            return false;
        };
        match resp.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn print_load_report(store: &RecordStore, report: &LoadReport) {
    let (min, max) = store.bounds();
    println!(
        "Processing dataset... ({} rows loaded, {} stations)",
        util::format_int(report.total_rows),
        util::format_int(report.station_count)
    );
    println!(
        "Note: {} rows without PM2.5, {} rows without CO.",
        util::format_int(report.missing_pm25),
        util::format_int(report.missing_co)
    );
    println!("Date span: {} to {}\n", min, max);
}

/// Filter, aggregate, export and preview one date range.
fn run_report(args: &Args, store: &RecordStore, start: NaiveDateTime, end: NaiveDateTime) -> Result<()> {
    let view = store
        .filter_by_range(start, end)
        .with_context(|| format!("cannot select {} to {}", start, end))?;
    info!("Selected {} of {} records", view.len(), store.len());

    let set = ReportSet::build(&view);
    let written = output::export_all(&args.out_dir, &set)
        .with_context(|| format!("cannot write reports to {}", args.out_dir.display()))?;
    for path in &written {
        debug!("Wrote {}", path.display());
    }

    let note = format!("{} to {}, {} readings", start, end, util::format_int(view.len()));
    output::print_report(&set, &note, args.preview_rows);
    println!("(Full tables exported to {})\n", args.out_dir.display());
    Ok(())
}

/// Handle option [1]: load the CSV file, keeping the previous store on failure.
fn handle_load(args: &Args, current: &mut Option<RecordStore>) {
    match load(&args.data) {
        Ok((store, report)) => {
            print_load_report(&store, &report);
            *current = Some(store);
        }
        Err(e) => eprintln!("Failed to load file: {}\n", e),
    }
}

/// Handle option [2]: ask for a range inside the dataset span and report on it.
fn handle_generate_reports(args: &Args, store: Option<&RecordStore>) {
    let Some(store) = store else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };
    let (min, max) = store.bounds();
    println!("Date span: {} to {} (press Enter to keep a bound)", min.date(), max.date());

    if let Err(e) = prompt_range_and_report(args, store, min, max) {
        eprintln!("Error: {:#}\n", e);
    }
}

fn prompt_range_and_report(
    args: &Args,
    store: &RecordStore,
    min: NaiveDateTime,
    max: NaiveDateTime,
) -> Result<()> {
    let start = prompt("Start date: ").ok_or_else(|| anyhow!("input closed"))?;
    let start = resolve_bound(Some(start.as_str()), min)?;
    let end = prompt("End date: ").ok_or_else(|| anyhow!("input closed"))?;
    let end = resolve_bound(Some(end.as_str()), max)?;
    println!("\nGenerating reports...\n");
    run_report(args, store, start, end)
}

fn interactive(args: &Args) {
    let mut store: Option<RecordStore> = None;
    loop {
        println!("Air Quality Report:");
        println!("[1] Load the file");
        println!("[2] Generate Reports\n");
        let Some(choice) = read_choice() else {
            println!("\nExiting the program.");
            break;
        };
        match choice.as_str() {
            "1" => handle_load(args, &mut store),
            "2" => {
                println!();
                handle_generate_reports(args, store.as_ref());
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1 or 2.\n"),
        }
    }
}

fn run(args: &Args) -> Result<()> {
    match &args.command {
        None => {
            interactive(args);
            Ok(())
        }
        Some(Command::Info) => {
            let (store, report) = load(&args.data)
                .with_context(|| format!("cannot load {}", args.data.display()))?;
            print_load_report(&store, &report);
            println!("Stations: {}", store.stations().join(", "));
            Ok(())
        }
        Some(Command::Report { start, end }) => {
            let (store, report) = load(&args.data)
                .with_context(|| format!("cannot load {}", args.data.display()))?;
            print_load_report(&store, &report);
            let (min, max) = store.bounds();
            let start = resolve_bound(start.as_deref(), min)?;
            let end = resolve_bound(end.as_deref(), max)?;
            run_report(args, &store, start, end)
        }
    }
}

fn main() {
    let args = Args::parse();
    init_logging(&args);
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(&args) {
        eprintln!("\nError: {:#}", e);
        std::process::exit(1);
    }
}
