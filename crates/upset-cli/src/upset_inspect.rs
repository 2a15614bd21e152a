//! Dump inspection CLI
//!
//! Usage: upset_inspect <dump.upset.json> [options]
//!
//! Prints the sets and combinations of a dump together with the axis ticks
//! and band positions of an UpSet plot and, optionally, the Karnaugh-map
//! layout of its combinations.
//!
//! Example: upset_inspect movies.upset.json --width 600 --log --grid

use std::env;
use std::path::PathBuf;
use std::time::Instant;
use upset_engine::app::codec::{Snapshot, decode};
use upset_engine::constants::KARNAUGH_MAX_SETS;
use upset_engine::domain::grid::{GridAxis, GridBox, grid_layout};
use upset_engine::domain::query::{SetRef, query_overlaps};
use upset_engine::domain::scale::{
    BandScale, LinearScale, LogScale, NumericScale, NumericTick, Orientation, TickOptions,
};
use upset_engine::infra::dump_io::load_dump;

struct Args {
    path: PathBuf,
    width: f64,
    height: f64,
    log: bool,
    grid: bool,
    top: usize,
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <dump.upset.json> [options]", program);
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <dump.upset.json>  Dump written by upset_combine");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --width <PX>       Plot width (default: 600)");
    eprintln!("  --height <PX>      Plot height (default: 400)");
    eprintln!("  --log              Logarithmic cardinality axis");
    eprintln!("  --grid             Print the Karnaugh-map layout");
    eprintln!("  --top <N>          Number of combinations to list (default: 10)");
    eprintln!("  --help, -h         Show this help message");
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().collect();

    let mut path: Option<PathBuf> = None;
    let mut width = 600.0;
    let mut height = 400.0;
    let mut log = false;
    let mut grid = false;
    let mut top = 10;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--width" | "--height" | "--top" => {
                let option = args[i].as_str();
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| format!("{} requires a value", option))?;
                let invalid = || format!("Invalid value for {}: {}", option, value);
                match option {
                    "--width" => width = value.parse().map_err(|_| invalid())?,
                    "--height" => height = value.parse().map_err(|_| invalid())?,
                    _ => top = value.parse().map_err(|_| invalid())?,
                }
                i += 1;
            }
            "--log" => log = true,
            "--grid" => grid = true,
            "--help" | "-h" => {
                print_usage(&args[0]);
                std::process::exit(0);
            }
            arg if !arg.starts_with('-') => {
                if path.is_some() {
                    return Err(format!("Unexpected argument: {}", arg));
                }
                path = Some(PathBuf::from(arg));
            }
            _ => return Err(format!("Unknown option: {}", args[i])),
        }
        i += 1;
    }

    let path = path.ok_or("Missing dump file argument")?;

    Ok(Args {
        path,
        width,
        height,
        log,
        grid,
        top,
    })
}

fn format_ticks(ticks: &[NumericTick]) -> String {
    ticks
        .iter()
        .map(|t| match &t.label {
            Some(label) => label.clone(),
            None => "·".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_summary(snapshot: &Snapshot, top: usize) {
    println!("Elements: {}", snapshot.elements.len());
    println!("Sets: {}", snapshot.sets.len());
    for set in &snapshot.sets {
        println!("  {:<24} {:>8}", set.name, set.cardinality());
    }

    println!("Combinations: {}", snapshot.combinations.len());
    for combination in snapshot.combinations.iter().take(top) {
        println!(
            "  {:<40} {:<20} degree {:>2}  cardinality {:>8}",
            combination.name,
            combination.kind,
            combination.degree(),
            combination.cardinality()
        );
    }
    if snapshot.combinations.len() > top {
        println!("  ... {} more", snapshot.combinations.len() - top);
    }

    if let Some(selection) = snapshot.selection {
        let name = match selection {
            SetRef::Set(i) => snapshot.sets.as_slice().get(i).map(|s| s.name.as_str()),
            SetRef::Combination(i) => snapshot.combinations.get(i).map(|c| c.name.as_str()),
        };
        println!("Selection: {}", name.unwrap_or("?"));
    }

    for query in &snapshot.queries {
        match query_overlaps(query, &snapshot.sets, &snapshot.combinations) {
            Ok(overlaps) => {
                let shown: Vec<String> = overlaps.iter().take(top).map(|c| c.to_string()).collect();
                println!("Query '{}' ({}): {}", query.name, query.color, shown.join(" "));
            }
            Err(e) => eprintln!("Warning: query '{}': {}", query.name, e),
        }
    }
}

fn print_axes(snapshot: &Snapshot, args: &Args) {
    let max_cardinality = snapshot
        .combinations
        .iter()
        .map(|c| c.cardinality())
        .max()
        .unwrap_or(0) as f64;
    let max_set_size = snapshot
        .sets
        .iter()
        .map(|s| s.cardinality())
        .max()
        .unwrap_or(0) as f64;

    // UpSet layout: combination bars take 60% of the height, set bars 30% of the width
    let bar_height = args.height * 0.6;
    let set_width = args.width * 0.3;
    let vertical = TickOptions::default().with_orientation(Orientation::Vertical);

    println!();
    println!("Cardinality axis ({:.0}px):", bar_height);
    let ticks = if args.log {
        LogScale::new(max_cardinality.max(1.0), (bar_height, 0.0), vertical).ticks()
    } else {
        LinearScale::new(max_cardinality, (bar_height, 0.0), vertical).ticks()
    };
    println!("  {}", format_ticks(&ticks));

    println!("Set size axis ({:.0}px):", set_width);
    let scale = LinearScale::new(max_set_size, (set_width, 0.0), TickOptions::default());
    println!("  {}", format_ticks(&scale.ticks()));

    let bands = BandScale::new(
        snapshot.combinations.iter().map(|c| c.name.clone()),
        (set_width, args.width),
    );
    println!("Combination bands (bandwidth {:.1}px):", bands.bandwidth());
    for (i, name) in bands.domain().iter().enumerate().take(args.top) {
        if let Some(x) = bands.map_index(i) {
            println!("  {:<40} x = {:.1}", name, x);
        }
    }
}

fn print_grid(snapshot: &Snapshot, args: &Args) {
    println!();
    if snapshot.sets.len() > KARNAUGH_MAX_SETS {
        eprintln!(
            "Warning: {} sets cannot be laid out on a Karnaugh map (at most {})",
            snapshot.sets.len(),
            KARNAUGH_MAX_SETS
        );
        return;
    }

    let layout = match grid_layout(snapshot.sets.len(), GridBox::new(args.width, args.height)) {
        Ok(layout) => layout,
        Err(e) => {
            eprintln!("Warning: {}", e);
            return;
        }
    };
    println!(
        "Karnaugh map: {} x {} cells of {:.1}px",
        layout.cols, layout.rows, layout.cell_size
    );

    for (axis, label) in [(GridAxis::Columns, "Columns"), (GridAxis::Rows, "Rows")] {
        println!("{}:", label);
        for span in layout.labels(axis) {
            let set = &snapshot.sets.as_slice()[span.set];
            println!(
                "  {}{:<24} cells {}..{}",
                if span.member { " " } else { "¬" },
                set.name,
                span.first,
                span.first + span.count
            );
        }
    }

    let mut cardinality = vec![vec![None; layout.cols]; layout.rows];
    for combination in &snapshot.combinations {
        if let Some(cell) = layout.place(combination) {
            cardinality[cell.row][cell.col] = Some(combination.cardinality());
        }
    }
    for row in &cardinality {
        let cells: Vec<String> = row
            .iter()
            .map(|c| c.map_or_else(|| "-".to_string(), |v| v.to_string()))
            .map(|c| format!("{:>6}", c))
            .collect();
        println!("  {}", cells.join(""));
    }
}

fn main() {
    let args = match parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage(&env::args().next().unwrap_or_default());
            std::process::exit(1);
        }
    };

    let start = Instant::now();
    println!("Loading dump from {}...", args.path.display());

    #[cfg(feature = "mmap")]
    println!("Using memory-mapped I/O.");

    let snapshot = match load_dump(&args.path).and_then(|record| decode(&record)) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("Error: {}: {}", args.path.display(), e);
            std::process::exit(1);
        }
    };
    println!("Loaded in {:.2} seconds", start.elapsed().as_secs_f64());
    println!();

    print_summary(&snapshot, args.top);
    print_axes(&snapshot, &args);
    if args.grid {
        print_grid(&snapshot, &args);
    }
}
