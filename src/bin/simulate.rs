use chrono::{SecondsFormat, Utc};
use clap::Parser;
use packman_rust_core::config::ConfigFile;
use packman_rust_core::constants::MAX_TICK_DT;
use packman_rust_core::engine::{GameEngine, GameEngineOptions};
use packman_rust_core::error::ConfigError;
use packman_rust_core::tile_map::TileMap;
use packman_rust_core::types::{Direction, EntityKind, RuntimeEvent, Snapshot, TileKind, TilePos};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long, default_value_t = 1)]
    level: u32,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 20 * 60 * 60)]
    ticks: u64,
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,
    #[arg(long, default_value_t = 3)]
    lives: u32,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug)]
struct Scenario {
    level: u32,
    seed: u32,
    ticks: u64,
    dt: f32,
    lives: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum FinishReason {
    GameOver,
    TickLimit,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    seed: u32,
    #[serde(rename = "startLevel")]
    start_level: u32,
    #[serde(rename = "finalLevel")]
    final_level: u32,
    reason: FinishReason,
    ticks: u64,
    score: u64,
    #[serde(rename = "pelletsEaten")]
    pellets_eaten: u32,
    #[serde(rename = "powerPelletsEaten")]
    power_pellets_eaten: u32,
    #[serde(rename = "ghostsEaten")]
    ghosts_eaten: u32,
    #[serde(rename = "livesLost")]
    lives_lost: u32,
    #[serde(rename = "levelsCleared")]
    levels_cleared: u32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "generatedAt")]
    generated_at: String,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
    result: ScenarioResultLine,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Pause {
    Running,
    LifeLost(f32),
    LevelCleared(f32),
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let scenario = resolve_scenario(&cli);
    let file = match load_config(cli.config.as_deref()) {
        Ok(file) => file,
        Err(err) => {
            error!(error = %err, "config rejected");
            std::process::exit(2);
        }
    };

    info!(
        seed = scenario.seed,
        level = scenario.level,
        ticks = scenario.ticks,
        "scenario started"
    );
    let (result, anomaly_records) = match run_scenario(&scenario, file) {
        Ok(run) => run,
        Err(err) => {
            error!(error = %err, "maze rejected");
            std::process::exit(2);
        }
    };
    for anomaly in &anomaly_records {
        warn!(tick = anomaly.tick, message = %anomaly.message, "anomaly detected");
    }
    info!(
        reason = ?result.reason,
        score = result.score,
        final_level = result.final_level,
        ticks = result.ticks,
        "scenario finished"
    );

    match serde_json::to_string(&result) {
        Ok(line) => println!("{line}"),
        Err(err) => error!(error = %err, "result serialization failed"),
    }

    let has_anomaly = !result.anomalies.is_empty();
    if let Some(path) = cli.summary_out.as_ref() {
        let generated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let summary = build_run_summary(generated_at, result, anomaly_records);
        if let Err(err) = write_summary(path, &summary) {
            error!(path = %path.display(), error = %err, "summary write failed");
            std::process::exit(2);
        }
        info!(path = %path.display(), "summary written");
    }
    if has_anomaly {
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    let file = match path {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    let map = TileMap::parse(&file.layout(), file.level_config(1).tile_size)?;
    map.validate_pellet_reachability()?;
    Ok(file)
}

fn resolve_scenario(cli: &Cli) -> Scenario {
    let seed = normalize_seed(cli.seed.unwrap_or_else(|| Utc::now().timestamp_millis() as u64));
    Scenario {
        level: cli.level.max(1),
        seed,
        ticks: cli.ticks,
        dt: if cli.dt.is_finite() && cli.dt > 0.0 {
            cli.dt.min(MAX_TICK_DT)
        } else {
            1.0 / 60.0
        },
        lives: cli.lives.max(1),
    }
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn run_scenario(
    scenario: &Scenario,
    file: ConfigFile,
) -> Result<(ScenarioResultLine, Vec<AnomalyRecord>), ConfigError> {
    let mut engine = GameEngine::with_config(
        file,
        scenario.level,
        scenario.seed,
        GameEngineOptions::default(),
    )?;
    let mut result = ScenarioResultLine {
        seed: scenario.seed,
        start_level: scenario.level,
        final_level: scenario.level,
        reason: FinishReason::TickLimit,
        ticks: 0,
        score: 0,
        pellets_eaten: 0,
        power_pellets_eaten: 0,
        ghosts_eaten: 0,
        lives_lost: 0,
        levels_cleared: 0,
        anomalies: Vec::new(),
    };
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut lives = scenario.lives;
    let mut pause = Pause::Running;
    let mut last_pellets = engine.map().remaining_pellets();

    for tick in 0..scenario.ticks {
        result.ticks = tick + 1;
        match pause {
            Pause::LifeLost(left) => {
                let left = left - scenario.dt;
                if left > 0.0 {
                    pause = Pause::LifeLost(left);
                    continue;
                }
                engine.reset_after_life_lost();
                if engine.is_level_cleared() {
                    pause = Pause::LevelCleared(engine.config().level_transition_delay);
                    continue;
                }
                pause = Pause::Running;
            }
            Pause::LevelCleared(left) => {
                let left = left - scenario.dt;
                if left > 0.0 {
                    pause = Pause::LevelCleared(left);
                    continue;
                }
                let next = engine.level() + 1;
                engine.load_level(next)?;
                result.final_level = next;
                last_pellets = engine.map().remaining_pellets();
                pause = Pause::Running;
            }
            Pause::Running => {}
        }

        let input = autopilot_direction(engine.map(), engine.player().tile());
        engine.step(scenario.dt, input);
        let snapshot = engine.build_snapshot(true);

        for message in collect_snapshot_anomalies(engine.map(), &snapshot, last_pellets) {
            push_anomaly(
                &mut result.anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
        last_pellets = snapshot.pellets_remaining;

        for event in &snapshot.events {
            match event {
                RuntimeEvent::PelletEaten { points, .. } => {
                    result.pellets_eaten += 1;
                    result.score += u64::from(*points);
                }
                RuntimeEvent::FrightenedStarted { .. } => result.power_pellets_eaten += 1,
                RuntimeEvent::GhostEaten { points, .. } => {
                    result.ghosts_eaten += 1;
                    result.score += u64::from(*points);
                }
                RuntimeEvent::PlayerCaught { .. } => {
                    result.lives_lost += 1;
                    lives = lives.saturating_sub(1);
                    pause = Pause::LifeLost(engine.config().life_lost_delay);
                }
                RuntimeEvent::PelletsCleared => {
                    result.levels_cleared += 1;
                    pause = Pause::LevelCleared(engine.config().level_transition_delay);
                }
            }
        }

        if lives == 0 {
            result.reason = FinishReason::GameOver;
            break;
        }
    }

    Ok((result, anomaly_records))
}

fn autopilot_direction(map: &TileMap, from: TilePos) -> Option<Direction> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(from);
    for dir in Direction::PRIORITY {
        let next = map.step(from, dir);
        if map.in_bounds(next.row, next.col)
            && map.is_walkable(next.row, next.col, EntityKind::Player)
            && visited.insert(next)
        {
            queue.push_back((next, dir));
        }
    }

    while let Some((tile, first)) = queue.pop_front() {
        if has_pellet(map, tile) {
            return Some(first);
        }
        for dir in Direction::PRIORITY {
            let next = map.step(tile, dir);
            if map.in_bounds(next.row, next.col)
                && map.is_walkable(next.row, next.col, EntityKind::Player)
                && visited.insert(next)
            {
                queue.push_back((next, first));
            }
        }
    }
    None
}

fn has_pellet(map: &TileMap, tile: TilePos) -> bool {
    matches!(
        map.tile(tile.row, tile.col),
        Some(TileKind::Pellet | TileKind::PowerPellet)
    )
}

fn collect_snapshot_anomalies(
    map: &TileMap,
    snapshot: &Snapshot,
    last_pellets: usize,
) -> Vec<String> {
    let mut anomalies = Vec::new();
    let player = snapshot.player.tile;
    if !map.is_walkable(player.row, player.col, EntityKind::Player) {
        anomalies.push(format!("player on blocked tile ({}, {})", player.row, player.col));
    }
    for ghost in &snapshot.ghosts {
        if !map.is_walkable(ghost.tile.row, ghost.tile.col, EntityKind::Ghost) {
            anomalies.push(format!(
                "{:?} on blocked tile ({}, {})",
                ghost.id, ghost.tile.row, ghost.tile.col
            ));
        }
    }
    if snapshot.pellets_remaining > last_pellets {
        anomalies.push(format!(
            "pellet count grew without a reset: {last_pellets} -> {}",
            snapshot.pellets_remaining
        ));
    }
    if !snapshot.frightened_remaining.is_finite() || snapshot.frightened_remaining < 0.0 {
        anomalies.push(format!(
            "invalid frightened timer: {}",
            snapshot.frightened_remaining
        ));
    }
    anomalies
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn build_run_summary(
    generated_at: String,
    result: ScenarioResultLine,
    anomaly_records: Vec<AnomalyRecord>,
) -> RunSummary {
    RunSummary {
        generated_at,
        anomaly_count: anomaly_records.len(),
        anomaly_records,
        result,
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use packman_rust_core::constants::{DEFAULT_LAYOUT, TILE_SIZE};

    fn scenario(ticks: u64) -> Scenario {
        Scenario {
            level: 1,
            seed: 42,
            ticks,
            dt: 1.0 / 60.0,
            lives: 3,
        }
    }

    #[test]
    fn autopilot_heads_for_the_nearest_pellet() {
        let layout = ["#######", "#P  .B#", "#KIC###", "#######"];
        let map = TileMap::parse(&layout, TILE_SIZE).expect("layout parses");
        assert_eq!(autopilot_direction(&map, TilePos::new(1, 1)), Some(Direction::Right));
    }

    #[test]
    fn autopilot_gives_up_without_pellets() {
        let layout = ["#######", "#P   B#", "#KIC###", "#######"];
        let map = TileMap::parse(&layout, TILE_SIZE).expect("layout parses");
        assert_eq!(autopilot_direction(&map, TilePos::new(1, 1)), None);
    }

    #[test]
    fn same_seed_produces_same_result() {
        let (a, _) = run_scenario(&scenario(1_200), ConfigFile::default()).expect("scenario runs");
        let (b, _) = run_scenario(&scenario(1_200), ConfigFile::default()).expect("scenario runs");
        assert_eq!(
            serde_json::to_string(&a).expect("result serializes"),
            serde_json::to_string(&b).expect("result serializes")
        );
        assert!(a.pellets_eaten > 0);
        assert!(a.score >= u64::from(a.pellets_eaten) * 10);
        assert!(a.anomalies.is_empty(), "{:?}", a.anomalies);
    }

    #[test]
    fn bundled_maze_passes_validation() {
        let file = load_config(None).expect("default config is valid");
        assert_eq!(file.layout().len(), DEFAULT_LAYOUT.len());
    }

    #[test]
    fn unreachable_pellet_config_is_rejected() {
        let mut file = ConfigFile::default();
        file.maze = Some(
            ["#######", "#P.#.B#", "#KIC###", "#######"]
                .iter()
                .map(|row| row.to_string())
                .collect(),
        );
        let path = std::env::temp_dir().join(format!(
            "packman-sim-bad-maze-{}.json",
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        std::fs::write(
            &path,
            serde_json::json!({ "maze": file.maze }).to_string(),
        )
        .expect("temp config written");
        let result = load_config(Some(&path));
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(ConfigError::Maze(_))));
    }

    #[test]
    fn push_anomaly_keeps_records_and_deduplicates_summary_messages() {
        let mut anomalies = Vec::new();
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        push_anomaly(&mut anomalies, &mut records, &mut seen, 10, "same anomaly".to_string());
        push_anomaly(&mut anomalies, &mut records, &mut seen, 11, "same anomaly".to_string());

        assert_eq!(anomalies.len(), 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].tick, 10);
        assert_eq!(records[1].tick, 11);
    }

    #[test]
    fn write_summary_returns_error_when_parent_does_not_exist() {
        let target = std::env::temp_dir()
            .join(format!(
                "packman-sim-missing-{}",
                Utc::now().timestamp_nanos_opt().unwrap_or_default()
            ))
            .join("summary.json");
        let (result, records) =
            run_scenario(&scenario(10), ConfigFile::default()).expect("scenario runs");
        let summary = build_run_summary("2026-01-01T00:00:00.000Z".to_string(), result, records);
        assert!(write_summary(&target, &summary).is_err());
    }
}
