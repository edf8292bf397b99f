//! drift-console: terminal front end for Quantum Drift.
//!
//! Usage:
//!   drift-console --seed 42 --questions ./data/questions.json
//!   drift-console --seed 42 --config rules.json --db session.db
//!   drift-console --ipc-mode            (JSON lines on stdin/stdout)

use anyhow::Result;
use quantum_drift_core::{
    config::GameConfig,
    error::GameResult,
    event::GameEvent,
    game::Game,
    quiz::QuestionBank,
    snapshot::GameSnapshot,
    store::GameStore,
    types::TargetId,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Start,
    GetState,
    Command { line: String },
    SelectRegion { region: String },
    Click { target: TargetId },
    Answer { option: String },
    Skip,
    Advance { ms: u64 },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState<'a> {
    snapshot:   GameSnapshot,
    transcript: &'a [String],
    events:     Vec<GameEvent>,
    error:      Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let questions_path = string_arg(&args, "--questions").unwrap_or("./data/questions.json");
    let config_path = string_arg(&args, "--config");
    let db = string_arg(&args, "--db").unwrap_or(":memory:");

    let config = match config_path {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let questions = QuestionBank::load(questions_path);

    if !ipc_mode {
        println!("Quantum Drift: The Lost AWS Architect - drift-console");
        println!("  seed:       {seed}");
        println!("  questions:  {questions_path} ({} loaded)", questions.len());
        println!("  db:         {db}");
        println!();
    }

    let store = if db == ":memory:" { GameStore::in_memory()? } else { GameStore::open(db)? };
    store.migrate()?;

    let session_id = format!("session-{}", uuid::Uuid::new_v4());
    store.insert_session(&session_id, seed, env!("CARGO_PKG_VERSION"))?;

    let mut game = Game::build(session_id, seed, config, questions, store)?;

    if ipc_mode {
        run_ipc_loop(&mut game)
    } else {
        run_interactive(&mut game)
    }
}

// ── Interactive mode ───────────────────────────────────────────

fn run_interactive(game: &mut Game) -> Result<()> {
    println!("Type \"start\" to begin, \"quit\" to leave.");
    let stdin = io::stdin();
    let mut cursor = 0;

    for line in stdin.lock().lines() {
        let line = line?;
        let mut words = line.split_whitespace();
        let head = words.next().unwrap_or_default();
        let arg = words.next();

        match (head, arg) {
            ("quit", _) => break,
            ("start", _) => settle(game.start_game())?,
            ("regions", _) => print_regions(game),
            ("select", Some(id)) => settle(game.select_region(id).map(|_| ()))?,
            ("targets", _) => print_targets(game),
            ("hit", Some(n)) => match n.parse::<TargetId>() {
                Ok(id) => settle(game.click_target(id).map(|_| ()))?,
                Err(_) => println!("Usage: hit <target-number>"),
            },
            ("answer", Some(option)) => settle(game.answer_question(option).map(|_| ()))?,
            ("skip", _) => settle(game.skip_question().map(|_| ()))?,
            ("wait", Some(secs)) => match secs.parse::<u64>() {
                Ok(secs) => settle(game.advance(secs.saturating_mul(1000)))?,
                Err(_) => println!("Usage: wait <seconds>"),
            },
            _ => settle(game.process_command(&line))?,
        }

        let lines = game.transcript().since(cursor);
        for l in lines {
            println!("> {l}");
        }
        cursor = game.transcript().len();
        if let Some(q) = game.quiz().current() {
            print_question(q);
        }
        game.drain_events();
    }

    print_summary(game)
}

fn print_regions(game: &Game) {
    for region in game.map().regions() {
        if let Some(info) = game.map().region_info(&region.id) {
            let marker = if region.active { "*" } else { " " };
            println!("{marker} {:<16} {:<12} {info}", region.id, region.name);
        }
    }
}

fn print_targets(game: &Game) {
    let round = game.round();
    if !round.is_active() {
        println!("No deployment in progress.");
        return;
    }
    println!(
        "Progress {}/{} | Time left {}s{}",
        round.score(),
        round.required(),
        round.time_left(),
        if round.is_low_on_time() { " (hurry!)" } else { "" }
    );
    for target in round.targets() {
        println!("  [{}] {} {}", target.id, target.service.icon(), target.service);
    }
}

fn print_question(q: &quantum_drift_core::quiz::Question) {
    println!();
    if let Some(problem) = &q.problem_description {
        println!("Scenario: {problem}");
    }
    println!("AWS Knowledge Check: {}", q.question);
    for (letter, text) in &q.options {
        println!("  {letter}) {text}");
    }
    println!("(answer <letter> or skip)");
}

fn print_summary(game: &Game) -> Result<()> {
    let p = game.player();
    let events = game.event_log()?;
    println!();
    println!("=== SESSION SUMMARY ===");
    println!("  session:        {}", game.session_id);
    println!("  seed:           {}", game.seed());
    println!("  virtual time:   {}s", game.clock.elapsed_secs());
    println!("  phase:          {:?}", game.phase());
    println!("  level:          {}", p.level);
    println!("  credits:        {}", p.credits);
    println!("  certifications: {}", p.certifications);
    println!("  deployed:       {}", p.deployed.len());
    println!("  events logged:  {}", events.len());
    Ok(())
}

// ── IPC mode ───────────────────────────────────────────────────

fn run_ipc_loop(game: &mut Game) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();
    let mut cursor = 0;

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        let outcome = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => Ok(()),
            IpcCommand::Start => game.start_game(),
            IpcCommand::Command { line } => game.process_command(&line),
            IpcCommand::SelectRegion { region } => game.select_region(&region).map(|_| ()),
            IpcCommand::Click { target } => game.click_target(target).map(|_| ()),
            IpcCommand::Answer { option } => game.answer_question(&option).map(|_| ()),
            IpcCommand::Skip => game.skip_question().map(|_| ()),
            IpcCommand::Advance { ms } => game.advance(ms),
        };
        let error = rule_error(outcome)?;
        let events = game.drain_events();

        let state = UiState {
            snapshot: game.snapshot(),
            transcript: game.transcript().since(cursor),
            events,
            error,
        };
        writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
        stdout.flush()?;
        cursor = game.transcript().len();
    }
    Ok(())
}

// ── Helpers ────────────────────────────────────────────────────

/// Rule violations are already in the transcript; anything else aborts.
fn settle(result: GameResult<()>) -> Result<()> {
    rule_error(result).map(|_| ())
}

fn rule_error(result: GameResult<()>) -> Result<Option<String>> {
    match result {
        Ok(()) => Ok(None),
        Err(e) if e.is_rule_violation() => {
            log::debug!("rule violation: {e}");
            Ok(Some(e.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}
