use serde::{Deserialize, Serialize};

use crate::types::{ActionKind, Observation};

/// One entry of an inbound action batch:
/// `{"trainId": 3, "actionType": "stop"}`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct WireAction {
    #[serde(rename = "trainId")]
    pub train_id: u32,
    #[serde(rename = "actionType")]
    pub action_type: String,
}

/// A decoded batch entry. `monitor` asks for the current observation
/// without committing a round; `reset` starts the session over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Train { train_id: u32, kind: ActionKind },
    Monitor,
    Reset,
}

impl WireAction {
    /// Maps the wire string onto a command. Unknown action types are
    /// reported and skipped rather than failing the whole batch.
    pub fn command(&self) -> Option<Command> {
        match self.action_type.as_str() {
            "monitor" => Some(Command::Monitor),
            "reset" => Some(Command::Reset),
            other => match ActionKind::parse(other) {
                Some(kind) => Some(Command::Train {
                    train_id: self.train_id,
                    kind,
                }),
                None => {
                    eprintln!("[protocol] unknown action type: {other}");
                    None
                }
            },
        }
    }
}

/// Decodes a binary frame as a msgpack-encoded action batch.
pub fn decode_binary_batch(payload: &[u8]) -> Option<Vec<WireAction>> {
    match rmp_serde::from_slice(payload) {
        Ok(batch) => Some(batch),
        Err(err) => {
            eprintln!("[protocol] undecodable msgpack batch: {err}");
            None
        }
    }
}

/// Decodes a text frame as a JSON action batch. Kept for clients that
/// cannot speak msgpack.
pub fn decode_text_batch(payload: &str) -> Option<Vec<WireAction>> {
    match serde_json::from_str(payload) {
        Ok(batch) => Some(batch),
        Err(err) => {
            eprintln!("[protocol] undecodable json batch: {err}");
            None
        }
    }
}

/// Encodes an observation as a msgpack map with field names, the shape the
/// dispatcher clients decode.
pub fn encode_observation(observation: &Observation) -> Option<Vec<u8>> {
    match rmp_serde::to_vec_named(observation) {
        Ok(bytes) => Some(bytes),
        Err(err) => {
            eprintln!("[protocol] observation encoding failed: {err}");
            None
        }
    }
}
