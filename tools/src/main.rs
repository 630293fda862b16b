//! capacity-runner: headless driver for the team capacity engine.
//!
//! Usage:
//!   capacity-runner --seed-demo --seed 12345 --reps 6 --db crm.db
//!   capacity-runner --db crm.db --team team-east --week 2024-03-06
//!   capacity-runner --db crm.db --ipc-mode

use anyhow::Result;
use capacity_core::{
    clock::{FixedClock, SystemClock},
    config::EngineConfig,
    demo::DemoSeeder,
    engine::CapacityEngine,
    source::BoardScope,
    store::CrmStore,
    work_item::KanbanColumn,
};
use chrono::NaiveDate;
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    UserCapacity {
        user_id: String,
        week: Option<NaiveDate>,
    },
    TeamCapacity {
        team_id: String,
        week: Option<NaiveDate>,
    },
    CanAssign {
        user_id: String,
        week: Option<NaiveDate>,
    },
    PickBestCandidate {
        team_id: String,
        week: Option<NaiveDate>,
    },
    WeeklyBoard {
        user_id: Option<String>,
        team_id: Option<String>,
        week: Option<NaiveDate>,
    },
    MoveItem {
        item_id: String,
        from: KanbanColumn,
        to: KanbanColumn,
        position: i64,
    },
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let reps = parse_arg(&args, "--reps", 5usize);
    let seed_demo = args.iter().any(|a| a == "--seed-demo");
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = string_arg(&args, "--db").unwrap_or(":memory:");
    let data_dir = string_arg(&args, "--data-dir").unwrap_or("./data");
    let team_id = string_arg(&args, "--team").unwrap_or("team-demo");
    let week: Option<NaiveDate> = string_arg(&args, "--week").map(str::parse::<NaiveDate>).transpose()?;

    let config = match EngineConfig::load(data_dir) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("using built-in engine config: {e}");
            EngineConfig::default()
        }
    };

    let store = CrmStore::open(db)?;
    store.migrate()?;

    let clock: Box<dyn capacity_core::clock::Clock> = match week {
        Some(date) => Box::new(FixedClock::new(date)),
        None => Box::new(SystemClock),
    };
    let engine = CapacityEngine::new(store, config, clock)?;

    if seed_demo || db == ":memory:" {
        let window = engine.window(None);
        DemoSeeder::new(&engine.store, engine.config(), seed).seed_team(team_id, reps, &window)?;
    }

    if ipc_mode {
        run_ipc_loop(&engine)
    } else {
        print_summary(&engine, team_id)
    }
}

fn run_ipc_loop(engine: &CapacityEngine<CrmStore>) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                writeln!(stdout, "{}", serde_json::json!({ "error": e.to_string() }))?;
                stdout.flush()?;
                continue;
            }
        };
        if matches!(cmd, IpcCommand::Quit) {
            break;
        }

        let reply = match handle_command(engine, cmd) {
            Ok(value) => value,
            Err(e) => serde_json::json!({ "error": e.to_string() }),
        };
        writeln!(stdout, "{reply}")?;
        stdout.flush()?;
    }
    Ok(())
}

fn handle_command(engine: &CapacityEngine<CrmStore>, cmd: IpcCommand) -> Result<serde_json::Value> {
    let value = match cmd {
        IpcCommand::UserCapacity { user_id, week } => {
            serde_json::to_value(engine.user_capacity(&user_id, week)?)?
        }
        IpcCommand::TeamCapacity { team_id, week } => {
            serde_json::to_value(engine.team_capacity(&team_id, week)?)?
        }
        IpcCommand::CanAssign { user_id, week } => {
            serde_json::to_value(engine.can_assign(&user_id, week)?)?
        }
        IpcCommand::PickBestCandidate { team_id, week } => {
            serde_json::to_value(engine.pick_best_candidate(&team_id, week)?)?
        }
        IpcCommand::WeeklyBoard { user_id, team_id, week } => {
            let scope = match (user_id, team_id) {
                (Some(user_id), _) => BoardScope::User(user_id),
                (None, Some(team_id)) => BoardScope::Team(team_id),
                (None, None) => anyhow::bail!("weekly_board needs user_id or team_id"),
            };
            serde_json::to_value(engine.weekly_board(&scope, week)?)?
        }
        IpcCommand::MoveItem { item_id, from, to, position } => {
            match engine.move_item(&item_id, from, to, position) {
                Ok(item) => serde_json::to_value(item)?,
                Err(e) if e.is_conflict() => serde_json::json!({ "conflict": e.to_string() }),
                Err(e) => return Err(e.into()),
            }
        }
        IpcCommand::Quit => serde_json::Value::Null,
    };
    Ok(value)
}

fn print_summary(engine: &CapacityEngine<CrmStore>, team_id: &str) -> Result<()> {
    let window = engine.window(None);
    let team = engine.team_capacity(team_id, None)?;

    println!("=== TEAM CAPACITY ===");
    println!("  team:      {team_id}");
    println!("  week:      {window}");
    println!(
        "  usage:     {}/{} ({}%)",
        team.total_usage, team.total_capacity, team.team_percentage
    );
    println!();
    for m in &team.members {
        println!(
            "  {:<20} {:>3}/{:<3} {:>4}%  {:<10} free: {}",
            m.user_id,
            m.current_week_items,
            m.max_items_per_week,
            m.capacity_percentage,
            m.status.as_str(),
            m.available_slots
        );
    }

    println!();
    match engine.pick_best_candidate(team_id, None)? {
        Some(c) => println!("  next assignee: {} ({} slots free)", c.user_id, c.available_slots),
        None => println!("  next assignee: (team saturated)"),
    }

    println!();
    println!("=== WEEKLY BOARD ===");
    let board = engine.weekly_board(&BoardScope::Team(team_id.to_string()), None)?;
    for column in KanbanColumn::ALL {
        let items = board.column(column);
        println!("  [{}] {} items", column.as_str(), items.len());
        for item in items.iter().take(5) {
            println!(
                "    - {} ({})",
                item.title,
                item.assignee_id.as_deref().unwrap_or("unassigned")
            );
        }
    }
    Ok(())
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
