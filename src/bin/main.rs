use std::error::Error;
use std::io;
use std::time::{Duration, Instant};

use clap::{Arg, ArgAction, ArgMatches, Command};
use log::{info, warn};

use taktix::evaluation::{Evaluator, FlatCountEval, PositionalEval};
use taktix::position::{DynamicBoard, VictoryCondition, Winner};
use taktix::search::{SearchEngine, SearchSettings};

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Tak has no repetition rule, so a game between two identical engines can go on forever
const MAX_SELFPLAY_PLIES: usize = 1000;

fn main() -> Result<(), Box<dyn Error>> {
    let size_arg = Arg::new("size")
        .short('s')
        .long("size")
        .env("TAKTIX_SIZE")
        .help("Board size")
        .num_args(1)
        .default_value("5")
        .value_parser(clap::value_parser!(u64).range(3..=8));
    let tps_arg = Arg::new("tps")
        .long("tps")
        .value_name("TPS")
        .help("Start from this position instead of an empty board")
        .num_args(1);
    let depth_arg = Arg::new("depth")
        .short('d')
        .long("depth")
        .env("TAKTIX_DEPTH")
        .help("Search depth in plies")
        .num_args(1)
        .default_value("4")
        .value_parser(clap::value_parser!(u16).range(1..=63));

    let matches = Command::new("taktix")
        .version("0.1")
        .about("Tak engine using MTD(f) alpha-beta search")
        .arg(
            Arg::new("logfile")
                .short('l')
                .long("logfile")
                .env("TAKTIX_LOG_FILE")
                .value_name("taktix.log")
                .help("Name of debug logfile")
                .num_args(1)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log search progress to stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("ttEntries")
                .long("tt-entries")
                .env("TAKTIX_TT_ENTRIES")
                .help("Number of transposition table entries, 16 bytes each")
                .num_args(1)
                .default_value("1048576")
                .value_parser(clap::value_parser!(usize))
                .global(true),
        )
        .arg(
            Arg::new("eval")
                .long("eval")
                .help("Evaluation function")
                .num_args(1)
                .default_value("positional")
                .value_parser(["positional", "flat"])
                .global(true),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("analyze")
                .about("Search a single position")
                .arg(size_arg.clone())
                .arg(tps_arg.clone())
                .arg(depth_arg.clone())
                .arg(
                    Arg::new("seconds")
                        .long("seconds")
                        .help("Stop deepening after this many seconds")
                        .num_args(1)
                        .value_parser(clap::value_parser!(u64)),
                ),
        )
        .subcommand(
            Command::new("selfplay")
                .about("Play a game against itself")
                .arg(size_arg.clone())
                .arg(tps_arg.clone())
                .arg(depth_arg.clone()),
        )
        .subcommand(
            Command::new("perft")
                .about("Count move sequences, for checking move generation")
                .arg(size_arg)
                .arg(tps_arg)
                .arg(depth_arg),
        )
        .get_matches();

    setup_logging(&matches)?;

    match matches.get_one::<String>("eval").map(String::as_str) {
        Some("flat") => run(FlatCountEval, &matches),
        _ => run(PositionalEval::default(), &matches),
    }
}

fn setup_logging(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let log_dispatcher = fern::Dispatch::new().format(|out, message, record| {
        out.finish(format_args!(
            "{}[{}][{}] {}",
            chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
            record.target(),
            record.level(),
            message
        ))
    });
    let stderr_level = if matches.get_flag("verbose") {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };

    if let Some(log_file) = matches.get_one::<String>("logfile") {
        log_dispatcher
            .chain(
                fern::Dispatch::new()
                    .level(log::LevelFilter::Debug)
                    .chain(fern::log_file(log_file)?),
            )
            .chain(
                fern::Dispatch::new()
                    .level(stderr_level)
                    .chain(io::stderr()),
            )
            .apply()?
    } else {
        log_dispatcher
            .level(stderr_level)
            .chain(io::stderr())
            .apply()?
    }
    Ok(())
}

fn run<E: Evaluator>(evaluator: E, matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let tt_entries = matches
        .get_one::<usize>("ttEntries")
        .copied()
        .unwrap_or(1 << 20);
    let Some((command, sub_matches)) = matches.subcommand() else {
        return Err("No command given".into());
    };

    let size = sub_matches.get_one::<u64>("size").copied().unwrap_or(5) as usize;
    let depth = sub_matches.get_one::<u16>("depth").copied().unwrap_or(4);
    let mut board = match sub_matches.get_one::<String>("tps") {
        Some(tps) => DynamicBoard::from_tps(size, tps)?,
        None => DynamicBoard::new(size)?,
    };

    let mut settings = SearchSettings::default()
        .max_depth(depth)
        .tt_entries(tt_entries);
    if let Some(seconds) = sub_matches.get_one::<u64>("seconds") {
        settings = settings.time_limit(Duration::from_secs(*seconds));
    }
    let mut engine = SearchEngine::new(evaluator, settings);

    match command {
        "analyze" => analyze(&mut board, &mut engine, depth),
        "selfplay" => selfplay(&mut board, &mut engine, depth),
        "perft" => {
            for d in 0..=depth {
                let start_time = Instant::now();
                let result = board.perft(d);
                println!(
                    "{}: {}, {:.2}s, {:.1} Mnps",
                    d,
                    result,
                    start_time.elapsed().as_secs_f32(),
                    result as f32 / start_time.elapsed().as_micros().max(1) as f32
                );
            }
            Ok(())
        }
        _ => Err(format!("Unknown command {}", command).into()),
    }
}

fn analyze<E: Evaluator>(
    board: &mut DynamicBoard,
    engine: &mut SearchEngine<E>,
    depth: u16,
) -> Result<(), Box<dyn Error>> {
    let result = board.search(engine, depth);
    println!("{}", board.to_tps());
    match result.best_move {
        Some(mv) => println!("Best move: {}", board.move_to_string(&mv)),
        None => println!("Game is over: {:?}", board.status()),
    }
    println!(
        "Score {} at depth {}, {} nodes, {} leaves, {} tt hits in {:.2}s",
        result.score,
        result.depth,
        result.stats.nodes,
        result.stats.leaves,
        result.stats.tt_hits,
        result.stats.elapsed.as_secs_f32()
    );
    Ok(())
}

fn selfplay<E: Evaluator>(
    board: &mut DynamicBoard,
    engine: &mut SearchEngine<E>,
    depth: u16,
) -> Result<(), Box<dyn Error>> {
    let mut ply = 0;
    while !board.status().over {
        if ply >= MAX_SELFPLAY_PLIES {
            warn!("Stopping selfplay after {} plies", ply);
            break;
        }
        let result = board.search(engine, depth);
        let Some(mv) = result.best_move else {
            warn!("No move found in {}", board.to_tps());
            break;
        };
        board.validate(&mv)?;
        let move_string = board.move_to_string(&mv);
        info!("Playing {} with score {}", move_string, result.score);
        if ply % 2 == 0 {
            print!("{}. {} ", ply / 2 + 1, move_string);
        } else {
            println!("{}", move_string);
        }
        board.execute(mv);
        ply += 1;
    }
    println!();
    let status = board.status();
    let result_string = match status.winner {
        Winner::White => "R-0",
        Winner::Black => "0-R",
        Winner::Tie => "1/2-1/2",
        Winner::Neither => "*",
    };
    let result_string = match (status.condition, result_string) {
        (Some(VictoryCondition::Flat), "R-0") => "F-0",
        (Some(VictoryCondition::Flat), "0-R") => "0-F",
        (_, result_string) => result_string,
    };
    println!("{}", result_string);
    println!("{}", board.to_tps());
    Ok(())
}
