use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::mpsc;

use metro_flood_server::engine::{GameEngine, GameEngineOptions};
use metro_flood_server::log_store::{FileLogStore, LogStore, MemoryLogStore};
use metro_flood_server::server_protocol::{self, Command, WireAction};

struct ServerConfig {
    log_dir: Option<PathBuf>,
}

type SharedConfig = Arc<ServerConfig>;

#[tokio::main]
async fn main() {
    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let log_dir = std::env::var("GAME_LOG_DIR").ok().map(PathBuf::from);
    if let Some(dir) = &log_dir {
        if let Err(err) = std::fs::create_dir_all(dir) {
            eprintln!(
                "[server] cannot create log dir {}: {err}; falling back to in-memory logs",
                dir.to_string_lossy()
            );
        } else {
            println!("[server] round logs under {}", dir.to_string_lossy());
        }
    }

    let config = Arc::new(ServerConfig { log_dir });

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/ws", get(ws_handler))
        .with_state(config);

    let bind_addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("failed to bind server socket");

    println!("[server] listening on :{port}");
    axum::serve(listener, app)
        .await
        .expect("server runtime failed");
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn ws_handler(ws: WebSocketUpgrade, State(config): State<SharedConfig>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(config, socket))
}

fn make_store(config: &ServerConfig, seed: u32) -> Box<dyn LogStore> {
    match &config.log_dir {
        Some(dir) if dir.is_dir() => {
            Box::new(FileLogStore::new(dir.join(format!("game_log_{seed}.json"))))
        }
        _ => Box::new(MemoryLogStore::new()),
    }
}

/// One connection is one dispatch session: the socket task owns the engine,
/// so every batch commits against a consistent state without locking.
async fn handle_socket(config: SharedConfig, socket: WebSocket) {
    let seed = rand::random::<u32>();
    let store = make_store(&config, seed);
    let mut engine = GameEngine::new(seed, GameEngineOptions::default(), store);
    println!("[server] session opened with seed {seed}");

    let (tx, mut rx) = mpsc::channel::<Vec<u8>>(64);
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let writer = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if ws_sender.send(Message::Binary(payload.into())).await.is_err() {
                break;
            }
        }
    });

    push_observation(&engine, &tx).await;

    let mut countdown = tokio::time::interval(Duration::from_secs(1));
    countdown.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            received = ws_receiver.next() => {
                let Some(Ok(message)) = received else {
                    break;
                };
                let batch = match message {
                    Message::Binary(raw) => server_protocol::decode_binary_batch(&raw),
                    Message::Text(raw) => server_protocol::decode_text_batch(raw.as_str()),
                    Message::Close(_) => break,
                    _ => continue,
                };
                let Some(batch) = batch else {
                    continue;
                };

                process_batch(&mut engine, &batch);
                push_observation(&engine, &tx).await;
            }
            _ = countdown.tick() => {
                // An expired decision window commits on its own, with the
                // queued actions discarded.
                if engine.tick_countdown().is_some() {
                    push_observation(&engine, &tx).await;
                }
            }
        }
    }

    println!(
        "[server] session with seed {seed} closed at round {}",
        engine.round()
    );
    drop(tx);
    let _ = writer.await;
}

/// Applies every action of the batch, then commits exactly one round.
/// Remote drivers pace the simulation by sending batches, so even a batch
/// of pure `monitor` actions advances the round.
fn process_batch(engine: &mut GameEngine, batch: &[WireAction]) {
    for action in batch {
        match action.command() {
            Some(Command::Train { train_id, kind }) => {
                // Unknown train ids fall out here without failing the batch.
                engine.queue_action(kind, train_id);
            }
            Some(Command::Reset) => {
                println!("[server] session reset requested");
                engine.reset();
            }
            Some(Command::Monitor) | None => {}
        }
    }
    engine.commit_round();
}

async fn push_observation(engine: &GameEngine, tx: &mpsc::Sender<Vec<u8>>) {
    if let Some(payload) = server_protocol::encode_observation(&engine.observation()) {
        let _ = tx.send(payload).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metro_flood_server::log_store::MemoryLogStore;
    use metro_flood_server::types::TrainStatus;

    fn make_engine() -> GameEngine {
        let options = GameEngineOptions {
            failure_point_count: 0,
            ..GameEngineOptions::default()
        };
        GameEngine::new(1, options, Box::new(MemoryLogStore::new()))
    }

    fn wire(train_id: u32, action_type: &str) -> WireAction {
        WireAction {
            train_id,
            action_type: action_type.to_string(),
        }
    }

    #[test]
    fn monitor_only_batch_still_advances_the_round() {
        let mut engine = make_engine();
        process_batch(&mut engine, &[wire(0, "monitor")]);
        assert_eq!(engine.round(), 1);
    }

    #[test]
    fn unknown_train_ids_do_not_block_the_commit() {
        let mut engine = make_engine();
        process_batch(&mut engine, &[wire(99, "start")]);
        assert_eq!(engine.round(), 1);
        assert!(engine.pending_actions().is_empty());
    }

    #[test]
    fn batch_applies_actions_and_commits_exactly_once() {
        let mut engine = make_engine();
        process_batch(&mut engine, &[wire(0, "stop"), wire(1, "monitor")]);
        assert_eq!(engine.round(), 1);
        assert_eq!(engine.trains()[0].status, TrainStatus::Stopped);
    }

    #[test]
    fn reset_batch_rebuilds_the_session_then_commits() {
        let mut engine = make_engine();
        process_batch(&mut engine, &[wire(0, "stop")]);
        process_batch(&mut engine, &[wire(0, "monitor")]);
        assert_eq!(engine.round(), 2);

        process_batch(&mut engine, &[wire(0, "reset")]);
        // The rebuilt session commits its own first round.
        assert_eq!(engine.round(), 1);
        assert_eq!(engine.trains()[0].status, TrainStatus::Running);
    }
}
