//! gts: CLI for the epsilon-greedy tree search planner.
//!
//! Subcommands:
//! - solve: run the engine on a YAML task file
//! - demo: run a built-in generated task

use std::env;
use std::process;

use gts_logging::{NdjsonWriter, RunFinishedEventV1, RunStartedEventV1};
use gts_search::{SearchConfig, SearchEngine, SearchStatus};
use gts_task::{builders, BlindEvaluator, CostType, Evaluator, GoalCountEvaluator, Task, INFINITY};

fn print_help() {
    println!(
        r#"gts - epsilon-greedy tree search planner

USAGE:
    gts <COMMAND> [OPTIONS]

COMMANDS:
    solve     Run the search on a YAML task file
    demo      Run the search on a built-in generated task
    help      Show this message
    version   Show the version

Run `gts <COMMAND> --help` for command options."#
    );
}

fn print_version() {
    println!("gts {}", env!("CARGO_PKG_VERSION"));
}

struct SolveOptions {
    task: Option<String>,
    heuristic: String,
    epsilon: f64,
    seed: u64,
    bound: i32,
    reopen: bool,
    cost_type: CostType,
    max_steps: u64,
    log: Option<String>,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            task: None,
            heuristic: "goalcount".to_string(),
            epsilon: 0.001,
            seed: 0,
            bound: INFINITY,
            reopen: false,
            cost_type: CostType::Normal,
            max_steps: 1_000_000,
            log: None,
        }
    }
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> T {
    if i + 1 >= args.len() {
        eprintln!("Missing value for {flag}");
        process::exit(1);
    }
    args[i + 1].parse().unwrap_or_else(|_| {
        eprintln!("Invalid {flag} value: {}", args[i + 1]);
        process::exit(1);
    })
}

fn parse_solve_options(args: &[String], help: &str) -> SolveOptions {
    let mut opts = SolveOptions::default();
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!("{help}");
                process::exit(0);
            }
            "--task" => {
                opts.task = Some(parse_value(args, i, "--task"));
                i += 2;
            }
            "--heuristic" => {
                opts.heuristic = parse_value(args, i, "--heuristic");
                i += 2;
            }
            "--epsilon" => {
                opts.epsilon = parse_value(args, i, "--epsilon");
                i += 2;
            }
            "--seed" => {
                opts.seed = parse_value(args, i, "--seed");
                i += 2;
            }
            "--bound" => {
                opts.bound = parse_value(args, i, "--bound");
                i += 2;
            }
            "--reopen" => {
                opts.reopen = true;
                i += 1;
            }
            "--cost-type" => {
                let name: String = parse_value(args, i, "--cost-type");
                opts.cost_type = match name.as_str() {
                    "normal" => CostType::Normal,
                    "one" => CostType::One,
                    "plusone" => CostType::PlusOne,
                    other => {
                        eprintln!("Unknown cost type: {other} (expected normal|one|plusone)");
                        process::exit(1);
                    }
                };
                i += 2;
            }
            "--max-steps" => {
                opts.max_steps = parse_value(args, i, "--max-steps");
                i += 2;
            }
            "--log" => {
                opts.log = Some(parse_value(args, i, "--log"));
                i += 2;
            }
            other => {
                eprintln!("Unknown option: {other}");
                eprintln!("{help}");
                process::exit(1);
            }
        }
    }
    opts
}

fn make_evaluator(name: &str) -> Box<dyn Evaluator> {
    match name {
        "goalcount" => Box::new(GoalCountEvaluator),
        "blind" => Box::<BlindEvaluator>::default(),
        other => {
            eprintln!("Unknown heuristic: {other} (expected goalcount|blind)");
            process::exit(1);
        }
    }
}

fn run_search(task: Task, opts: &SolveOptions) {
    let cfg = SearchConfig {
        epsilon: opts.epsilon,
        reopen_closed_nodes: opts.reopen,
        bound: opts.bound,
        seed: opts.seed,
        cost_type: opts.cost_type,
        elimination: None,
    };
    let task_name = task.name.clone();
    let evaluator = make_evaluator(&opts.heuristic);
    let mut engine = SearchEngine::new(task, evaluator, cfg).unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    let mut log = opts.log.as_ref().map(|path| {
        NdjsonWriter::open_append(path, 0).unwrap_or_else(|e| {
            eprintln!("Failed to open log file {path}: {e}");
            process::exit(1);
        })
    });
    let run_id = format!("{}-{}", task_name, opts.seed);
    if let Some(w) = log.as_mut() {
        let _ = w.write_event(&RunStartedEventV1 {
            event: "run_started",
            ts_ms: gts_logging::now_ms(),
            run_id: run_id.clone(),
            task_name: task_name.clone(),
            epsilon: opts.epsilon,
            bound: opts.bound,
            reopen_closed_nodes: opts.reopen,
            seed: opts.seed,
        });
    }

    engine.initialize();
    let mut steps: u64 = 0;
    let status = loop {
        let status = engine.step();
        steps += 1;
        if status != SearchStatus::InProgress {
            break status;
        }
        if steps >= opts.max_steps {
            break SearchStatus::InProgress;
        }
    };

    match status {
        SearchStatus::Solved => {
            println!("Solution found.");
            let plan = engine.plan().unwrap_or(&[]);
            for &op in plan {
                println!("{}", engine.task().operator(op).name);
            }
            println!(
                "Plan length: {} step(s). Plan cost: {}.",
                plan.len(),
                engine.plan_cost().unwrap_or(0)
            );
        }
        SearchStatus::Failed => println!("Search failed: the task is unsolvable."),
        SearchStatus::InProgress => {
            println!("Search stopped after {steps} step(s) without a verdict.")
        }
    }
    println!("Steps: {steps}.");
    engine.print_statistics();

    if let Some(w) = log.as_mut() {
        let stats = engine.statistics();
        let _ = w.write_event(&RunFinishedEventV1 {
            event: "run_finished",
            ts_ms: gts_logging::now_ms(),
            run_id,
            status: match status {
                SearchStatus::Solved => "solved",
                SearchStatus::Failed => "failed",
                SearchStatus::InProgress => "budget",
            },
            steps,
            plan_length: engine.plan().map(|p| p.len()),
            plan_cost: engine.plan_cost(),
            expanded: stats.expanded,
            evaluated: stats.evaluated,
            generated: stats.generated,
            reopened: stats.reopened,
            dead_ends: stats.dead_ends,
        });
        let _ = w.flush();
    }

    if status == SearchStatus::Failed {
        process::exit(2);
    }
}

fn cmd_solve(args: &[String]) {
    let help = r#"gts solve

USAGE:
    gts solve --task FILE [OPTIONS]

OPTIONS:
    --task FILE         Task file (YAML)
    --heuristic NAME    goalcount|blind (default: goalcount)
    --epsilon E         Exploration probability in [0,1] (default: 0.001)
    --seed S            RNG seed (default: 0)
    --bound B           Real-cost ceiling (default: none)
    --reopen            Re-parent closed nodes on cheaper paths
    --cost-type T       normal|one|plusone (default: normal)
    --max-steps N       Step budget (default: 1000000)
    --log FILE          Append NDJSON run events to FILE"#;
    let opts = parse_solve_options(args, help);
    let Some(path) = opts.task.as_ref() else {
        eprintln!("Missing required option --task");
        eprintln!("{help}");
        process::exit(1);
    };
    let task = Task::load(path).unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });
    run_search(task, &opts);
}

fn cmd_demo(args: &[String]) {
    let help = r#"gts demo

USAGE:
    gts demo [--kind chain|grid] [--size N] [OPTIONS]

OPTIONS:
    --kind KIND         chain|grid (default: grid)
    --size N            Chain length or grid side (default: 8)
plus all `gts solve` options except --task."#;

    let mut kind = "grid".to_string();
    let mut size: u16 = 8;
    let mut rest: Vec<String> = Vec::new();
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--kind" => {
                kind = parse_value(args, i, "--kind");
                i += 2;
            }
            "--size" => {
                size = parse_value(args, i, "--size");
                i += 2;
            }
            other => {
                rest.push(other.to_string());
                i += 1;
                // Carry the flag's value through untouched.
                if other.starts_with("--") && i < args.len() && !args[i].starts_with("--") {
                    rest.push(args[i].clone());
                    i += 1;
                }
            }
        }
    }
    let opts = parse_solve_options(&rest, help);
    let task = match kind.as_str() {
        "chain" => builders::chain(size),
        "grid" => builders::grid(size, size),
        other => {
            eprintln!("Unknown demo kind: {other} (expected chain|grid)");
            process::exit(1);
        }
    };
    println!("Task: {}.", task.name);
    run_search(task, &opts);
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_help();
        process::exit(0);
    }

    match args[1].as_str() {
        "-h" | "--help" | "help" => {
            print_help();
        }
        "-V" | "--version" | "version" => {
            print_version();
        }
        "solve" => {
            cmd_solve(&args[2..]);
        }
        "demo" => {
            cmd_demo(&args[2..]);
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_help();
            process::exit(1);
        }
    }
}
