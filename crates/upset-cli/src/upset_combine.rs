//! Combination generation CLI
//!
//! Usage: upset_combine <elements.json> [options]
//!
//! Reads a JSON array of element objects, extracts their sets, generates the
//! requested combinations and writes a dump file.
//!
//! Example: upset_combine movies.json --kind distinctIntersection --limit 20

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;
use upset_engine::app::codec::{EncodeOptions, Snapshot, encode};
use upset_engine::app::generator::{estimate_combinations, generate_combinations_with_progress};
use upset_engine::domain::combination::{CombinationKind, CombinationRequest, SortKey};
use upset_engine::infra::dump_io::{get_dump_path, save_dump};
use upset_engine::infra::element_io::{DEFAULT_MEMBERSHIP_KEY, load_elements};

struct Args {
    input: PathBuf,
    key: String,
    kind: CombinationKind,
    min_degree: usize,
    max_degree: Option<usize>,
    include_empty: bool,
    limit: Option<usize>,
    order: Vec<SortKey>,
    max_enumeration: Option<u128>,
    out_dir: PathBuf,
    name: Option<String>,
    compress: bool,
    store_options: bool,
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <elements.json> [options]", program);
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <elements.json>          JSON array of element objects");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --key <NAME>             Membership field of each element (default: sets)");
    eprintln!("  --kind <KIND>            intersection | union | distinctIntersection");
    eprintln!("  --min-degree <N>         Smallest number of sets per combination (default: 1)");
    eprintln!("  --max-degree <N>         Largest number of sets per combination (default: all)");
    eprintln!("  --include-empty          Keep combinations without elements");
    eprintln!("  --limit <N>              Keep the first N combinations after ordering");
    eprintln!("  --order <KEY>            Sort key, repeatable (e.g. cardinality:desc, degree:asc)");
    eprintln!("  --max-enumeration <N>    Refuse to enumerate more than N subsets");
    eprintln!("  --out-dir <PATH>         Dump directory (default: current directory)");
    eprintln!("  --name <NAME>            Dump name (default: input file stem)");
    eprintln!("  --compress               Write elements as compact arrays");
    eprintln!("  --store-options          Store generator options instead of combinations");
    eprintln!("  --help, -h               Show this help message");
}

fn parse_value<T: std::str::FromStr>(option: &str, value: Option<&String>) -> Result<T, String> {
    let value = value.ok_or_else(|| format!("{} requires a value", option))?;
    value
        .parse()
        .map_err(|_| format!("Invalid value for {}: {}", option, value))
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().collect();

    let mut input: Option<PathBuf> = None;
    let mut key = DEFAULT_MEMBERSHIP_KEY.to_string();
    let mut kind = CombinationKind::Intersection;
    let mut min_degree = 1;
    let mut max_degree = None;
    let mut include_empty = false;
    let mut limit = None;
    let mut order = Vec::new();
    let mut max_enumeration = None;
    let mut out_dir = PathBuf::from(".");
    let mut name = None;
    let mut compress = false;
    let mut store_options = false;

    let mut i = 1;
    while i < args.len() {
        let option = args[i].as_str();
        match option {
            "--key" => {
                key = parse_value(option, args.get(i + 1))?;
                i += 1;
            }
            "--kind" => {
                let value = args.get(i + 1).ok_or("--kind requires a value")?;
                kind = value
                    .parse::<CombinationKind>()
                    .map_err(|e| format!("{}", e))?;
                i += 1;
            }
            "--min-degree" => {
                min_degree = parse_value(option, args.get(i + 1))?;
                i += 1;
            }
            "--max-degree" => {
                max_degree = Some(parse_value(option, args.get(i + 1))?);
                i += 1;
            }
            "--limit" => {
                limit = Some(parse_value(option, args.get(i + 1))?);
                i += 1;
            }
            "--order" => {
                let value = args.get(i + 1).ok_or("--order requires a value")?;
                order.push(value.parse::<SortKey>().map_err(|e| format!("{}", e))?);
                i += 1;
            }
            "--max-enumeration" => {
                max_enumeration = Some(parse_value(option, args.get(i + 1))?);
                i += 1;
            }
            "--out-dir" => {
                out_dir = parse_value(option, args.get(i + 1))?;
                i += 1;
            }
            "--name" => {
                name = Some(parse_value(option, args.get(i + 1))?);
                i += 1;
            }
            "--include-empty" => include_empty = true,
            "--compress" => compress = true,
            "--store-options" => store_options = true,
            "--help" | "-h" => {
                print_usage(&args[0]);
                std::process::exit(0);
            }
            arg if !arg.starts_with('-') => {
                if input.is_some() {
                    return Err(format!("Unexpected argument: {}", arg));
                }
                input = Some(PathBuf::from(arg));
            }
            _ => return Err(format!("Unknown option: {}", args[i])),
        }
        i += 1;
    }

    let input = input.ok_or("Missing elements file argument")?;

    Ok(Args {
        input,
        key,
        kind,
        min_degree,
        max_degree,
        include_empty,
        limit,
        order,
        max_enumeration,
        out_dir,
        name,
        compress,
        store_options,
    })
}

fn build_request(args: &Args) -> Result<CombinationRequest, String> {
    let mut request = CombinationRequest::for_kind(args.kind)
        .map_err(|e| format!("{}", e))?
        .with_degree(args.min_degree, args.max_degree)
        .with_include_empty(args.include_empty);
    if !args.order.is_empty() {
        request = request.with_order(args.order.clone());
    }
    if let Some(limit) = args.limit {
        request = request.with_limit(limit);
    }
    if let Some(ceiling) = args.max_enumeration {
        request = request.with_max_enumeration(ceiling);
    }
    Ok(request)
}

fn dump_name(args: &Args) -> String {
    args.name.clone().unwrap_or_else(|| {
        args.input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("dump")
            .to_string()
    })
}

fn exit_with(message: String) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
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

    let request = build_request(&args).unwrap_or_else(|e| exit_with(e));
    let start = Instant::now();

    println!("Loading elements from {}...", args.input.display());
    let (elements, sets) = load_elements(&args.input, &args.key)
        .unwrap_or_else(|e| exit_with(format!("{}: {}", args.input.display(), e)));
    println!(
        "Loaded {} elements in {} sets ({:.2} seconds)",
        elements.len(),
        sets.len(),
        start.elapsed().as_secs_f64()
    );
    for set in &sets {
        println!("  {:<24} {:>8}", set.name, set.cardinality());
    }

    let estimated = estimate_combinations(&sets, &request).unwrap_or_else(|e| exit_with(e.to_string()));
    println!();
    println!(
        "Generating {} combinations ({} subsets to enumerate)...",
        request.kind(),
        estimated
    );
    if estimated > 1 << 24 {
        eprintln!(
            "Warning: {} subsets is a large enumeration; consider --max-degree or --limit",
            estimated
        );
    }

    let gen_start = Instant::now();
    let progress_callback = |done: usize, total: usize| {
        let progress = if total > 0 {
            (done as f64 / total as f64) * 100.0
        } else {
            100.0
        };
        print!("\r[Generation] Progress: {:.2}% ({}/{})", progress, done, total);
        io::stdout().flush().ok();
    };
    let combinations = generate_combinations_with_progress(&sets, &request, progress_callback)
        .unwrap_or_else(|e| {
            println!();
            exit_with(e.to_string())
        });
    println!();
    println!(
        "Generated {} combinations in {:.2} seconds",
        combinations.len(),
        gen_start.elapsed().as_secs_f64()
    );

    for combination in combinations.iter().take(10) {
        println!(
            "  {:<40} degree {:>2}  cardinality {:>8}",
            combination.name,
            combination.degree(),
            combination.cardinality()
        );
    }
    if combinations.len() > 10 {
        println!("  ... {} more", combinations.len() - 10);
    }

    let mut options = EncodeOptions::default().with_compress(args.compress);
    if args.store_options {
        options = options.with_generator(request);
    }
    let snapshot = Snapshot::new(elements, sets, combinations);
    let record = encode(&snapshot, &options).unwrap_or_else(|e| exit_with(e.to_string()));

    let path = get_dump_path(&args.out_dir, &dump_name(&args));
    println!();
    println!("Saving dump to {}...", path.display());
    if let Err(e) = save_dump(&path, &record) {
        exit_with(format!("saving dump: {}", e));
    }

    let file_size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
    println!("File size: {:.2} KB", file_size as f64 / 1024.0);
    println!();
    println!("Done! Total time: {:.2} seconds", start.elapsed().as_secs_f64());
    println!("Inspect the dump with upset_inspect {}", path.display());
}
