use clap::Parser;
use metro_flood_server::constants::MAX_FLOOD_LEVEL;
use metro_flood_server::engine::{GameEngine, GameEngineOptions};
use metro_flood_server::log_store::MemoryLogStore;
use metro_flood_server::rng::Rng;
use metro_flood_server::types::{ActionKind, Located, Train, TrainStatus};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Rounds to simulate per run.
    #[arg(long, default_value_t = 200)]
    rounds: u32,
    /// Seeds to run, one engine per seed. Defaults to a time-derived seed.
    #[arg(long)]
    seed: Vec<u32>,
    /// Dispatcher policy: idle, random or cautious.
    #[arg(long, default_value = "cautious")]
    policy: String,
    #[arg(long)]
    failure_points: Option<usize>,
    #[arg(long)]
    run_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Policy {
    Idle,
    Random,
    Cautious,
}

impl Policy {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "idle" => Some(Self::Idle),
            "random" => Some(Self::Random),
            "cautious" => Some(Self::Cautious),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
struct RunResultLine {
    seed: u32,
    policy: Policy,
    rounds: u32,
    #[serde(rename = "finalScore")]
    final_score: i64,
    #[serde(rename = "trappedRounds")]
    trapped_rounds: u64,
    evacuations: u64,
    #[serde(rename = "maxFloodLevel")]
    max_flood_level: f32,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    round: u32,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "runCount")]
    run_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "scoreBySeed")]
    score_by_seed: BTreeMap<String, i64>,
    runs: Vec<RunResultLine>,
}

fn main() {
    let cli = Cli::parse();
    let Some(policy) = Policy::parse(&cli.policy) else {
        eprintln!("[simulate] unknown policy: {}", cli.policy);
        std::process::exit(2);
    };

    let started_at_ms = now_ms();
    let seeds = if cli.seed.is_empty() {
        vec![started_at_ms as u32]
    } else {
        cli.seed.clone()
    };
    let run_id = cli
        .run_id
        .clone()
        .unwrap_or_else(|| format!("sim_{}_{started_at_ms}", seeds[0]));

    let mut runs = Vec::new();
    let mut total_anomalies = 0usize;
    for seed in seeds {
        emit_log(
            "info",
            "run_started",
            &run_id,
            json!({ "seed": seed, "policy": policy, "rounds": cli.rounds }),
        );
        let (result, records) = run_simulation(seed, policy, &cli);
        for record in &records {
            emit_log(
                "warn",
                "anomaly_detected",
                &run_id,
                json!({ "seed": seed, "round": record.round, "message": record.message }),
            );
        }
        total_anomalies += records.len();
        println!(
            "{}",
            serde_json::to_string(&result).expect("run result should serialize")
        );
        runs.push(result);
    }

    let finished_at_ms = now_ms();
    let summary = build_run_summary(run_id.clone(), started_at_ms, finished_at_ms, runs, total_anomalies);

    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &run_id,
                json!({ "path": path.to_string_lossy(), "error": error.to_string() }),
            );
            std::process::exit(2);
        }
    }

    emit_log(
        "info",
        "run_finished",
        &run_id,
        json!({
            "runCount": summary.run_count,
            "anomalyCount": summary.anomaly_count,
            "scoreBySeed": summary.score_by_seed,
        }),
    );

    if summary.anomaly_count > 0 {
        std::process::exit(1);
    }
}

fn run_simulation(seed: u32, policy: Policy, cli: &Cli) -> (RunResultLine, Vec<AnomalyRecord>) {
    let options = GameEngineOptions {
        failure_point_count: cli
            .failure_points
            .unwrap_or_else(|| GameEngineOptions::default().failure_point_count),
        ..GameEngineOptions::default()
    };
    let mut engine = GameEngine::new(seed, options, Box::new(MemoryLogStore::new()));
    let mut policy_rng = Rng::new(seed ^ 0x9e37_79b9);

    let run_started = SystemTime::now();
    let expected_passengers = total_passengers(&engine);
    let mut anomalies = Vec::new();
    let mut trapped_rounds = 0u64;
    let mut evacuations = 0u64;
    let mut max_flood = 0.0f32;

    for _ in 0..cli.rounds {
        dispatch(&mut engine, policy, &mut policy_rng, &mut evacuations);
        engine.commit_round();

        trapped_rounds += engine
            .trains()
            .iter()
            .filter(|t| t.status == TrainStatus::Trapped)
            .count() as u64;
        max_flood = max_flood.max(peak_flood(&engine));
        for message in collect_anomalies(&engine, expected_passengers) {
            push_anomaly(&mut anomalies, engine.round(), message);
        }
    }

    let duration_ms = run_started.elapsed().map(|d| d.as_millis() as u64).unwrap_or(0);
    let messages: Vec<String> = {
        let mut seen = Vec::new();
        for record in &anomalies {
            if !seen.contains(&record.message) {
                seen.push(record.message.clone());
            }
        }
        seen
    };
    let result = RunResultLine {
        seed,
        policy,
        rounds: cli.rounds,
        final_score: engine.score(),
        trapped_rounds,
        evacuations,
        max_flood_level: max_flood,
        duration_ms,
        anomalies: messages,
    };
    (result, anomalies)
}

fn dispatch(engine: &mut GameEngine, policy: Policy, rng: &mut Rng, evacuations: &mut u64) {
    match policy {
        Policy::Idle => {}
        Policy::Random => {
            let train_ids: Vec<u32> = engine.trains().iter().map(|t| t.id).collect();
            for train_id in train_ids {
                if rng.next_f32() > 0.3 {
                    continue;
                }
                let kind = match rng.int(0, 3) {
                    0 => ActionKind::Start,
                    1 => ActionKind::Stop,
                    2 => ActionKind::Reverse,
                    _ => ActionKind::Evacuate,
                };
                if kind == ActionKind::Evacuate && engine.queue_action(kind, train_id) {
                    *evacuations += 1;
                } else if kind != ActionKind::Evacuate {
                    engine.queue_action(kind, train_id);
                }
            }
        }
        Policy::Cautious => {
            let warning = engine.setting().flood_warning_threshold;
            let plans: Vec<(u32, ActionKind, bool)> = engine
                .trains()
                .iter()
                .filter_map(|train| {
                    let level = local_flood_level(engine, train);
                    match train.status {
                        TrainStatus::Running if level > warning => {
                            if train.located.is_at_station() {
                                Some((train.id, ActionKind::Evacuate, true))
                            } else {
                                Some((train.id, ActionKind::Stop, false))
                            }
                        }
                        TrainStatus::Stopped if level <= warning / 2.0 => {
                            Some((train.id, ActionKind::Start, false))
                        }
                        _ => None,
                    }
                })
                .collect();
            for (train_id, kind, is_evacuation) in plans {
                if engine.queue_action(kind, train_id) && is_evacuation {
                    *evacuations += 1;
                }
            }
        }
    }
}

fn local_flood_level(engine: &GameEngine, train: &Train) -> f32 {
    match train.located {
        Located::AtStation(station_id) => engine
            .stations()
            .iter()
            .find(|s| s.id == station_id)
            .map(|s| s.flood_level)
            .unwrap_or(0.0),
        Located::OnTrack {
            track_id,
            node_index,
        } => engine
            .tracks()
            .iter()
            .find(|t| t.id == track_id)
            .and_then(|t| t.nodes.get(node_index))
            .map(|n| n.flood_level)
            .unwrap_or(0.0),
    }
}

fn total_passengers(engine: &GameEngine) -> i64 {
    let aboard: i64 = engine.trains().iter().map(|t| i64::from(t.passengers)).sum();
    let waiting: i64 = engine
        .stations()
        .iter()
        .map(|s| i64::from(s.passengers))
        .sum();
    aboard + waiting
}

fn peak_flood(engine: &GameEngine) -> f32 {
    let station_peak = engine
        .stations()
        .iter()
        .map(|s| s.flood_level)
        .fold(0.0f32, f32::max);
    engine
        .tracks()
        .iter()
        .flat_map(|t| t.nodes.iter().map(|n| n.flood_level))
        .fold(station_peak, f32::max)
}

fn collect_anomalies(engine: &GameEngine, expected_passengers: i64) -> Vec<String> {
    let mut anomalies = Vec::new();
    for station in engine.stations() {
        if !(0.0..=MAX_FLOOD_LEVEL).contains(&station.flood_level) {
            anomalies.push(format!(
                "station {} flood level out of bounds: {}",
                station.id, station.flood_level
            ));
        }
        if station.passengers < 0 {
            anomalies.push(format!("station {} has negative passengers", station.id));
        }
    }
    for track in engine.tracks() {
        for node in &track.nodes {
            if !(0.0..=MAX_FLOOD_LEVEL).contains(&node.flood_level) {
                anomalies.push(format!(
                    "track node {} flood level out of bounds: {}",
                    node.id, node.flood_level
                ));
            }
        }
    }
    for train in engine.trains() {
        if train.passengers < 0 || train.passengers > train.capacity {
            anomalies.push(format!(
                "train {} passenger count out of bounds: {}",
                train.id, train.passengers
            ));
        }
    }
    if total_passengers(engine) != expected_passengers {
        anomalies.push(format!(
            "passenger total drifted: expected {expected_passengers}, got {}",
            total_passengers(engine)
        ));
    }
    anomalies
}

fn push_anomaly(records: &mut Vec<AnomalyRecord>, round: u32, message: String) {
    records.push(AnomalyRecord { round, message });
}

fn build_run_summary(
    run_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    runs: Vec<RunResultLine>,
    anomaly_count: usize,
) -> RunSummary {
    let score_by_seed = runs
        .iter()
        .map(|run| (run.seed.to_string(), run.final_score))
        .collect();
    RunSummary {
        run_id,
        started_at_ms,
        finished_at_ms,
        run_count: runs.len(),
        anomaly_count,
        score_by_seed,
        runs,
    }
}

fn emit_log(level: &str, event: &str, run_id: &str, details: Value) {
    let line = json!({
        "timestampMs": now_ms(),
        "level": level,
        "event": event,
        "runId": run_id,
        "details": details,
    });
    println!("{line}");
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let payload = serde_json::to_string_pretty(summary)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    std::fs::write(path, payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_run(seed: u32, final_score: i64) -> RunResultLine {
        RunResultLine {
            seed,
            policy: Policy::Idle,
            rounds: 10,
            final_score,
            trapped_rounds: 0,
            evacuations: 0,
            max_flood_level: 0.0,
            duration_ms: 5,
            anomalies: Vec::new(),
        }
    }

    #[test]
    fn policy_parse_accepts_known_names_only() {
        assert_eq!(Policy::parse("idle"), Some(Policy::Idle));
        assert_eq!(Policy::parse("random"), Some(Policy::Random));
        assert_eq!(Policy::parse("cautious"), Some(Policy::Cautious));
        assert_eq!(Policy::parse("reckless"), None);
    }

    #[test]
    fn summary_indexes_scores_by_seed() {
        let summary = build_run_summary(
            "sim_test".to_string(),
            0,
            10,
            vec![make_run(1, 250), make_run(2, -100)],
            3,
        );
        assert_eq!(summary.run_count, 2);
        assert_eq!(summary.anomaly_count, 3);
        assert_eq!(summary.score_by_seed["1"], 250);
        assert_eq!(summary.score_by_seed["2"], -100);
    }

    #[test]
    fn write_summary_fails_when_parent_is_missing() {
        let summary = build_run_summary("sim_test".to_string(), 0, 0, Vec::new(), 0);
        let path = Path::new("/nonexistent-dir/summary.json");
        assert!(write_summary(path, &summary).is_err());
    }

    #[test]
    fn idle_run_stays_anomaly_free() {
        let cli = Cli {
            rounds: 30,
            seed: vec![9],
            policy: "idle".to_string(),
            failure_points: Some(2),
            run_id: None,
            summary_out: None,
        };
        let (result, records) = run_simulation(9, Policy::Idle, &cli);
        assert_eq!(result.rounds, 30);
        assert!(records.is_empty(), "anomalies: {:?}", result.anomalies);
        assert!(result.max_flood_level <= MAX_FLOOD_LEVEL);
    }
}
