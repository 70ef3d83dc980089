use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "forward" => Some(Self::Forward),
            "backward" => Some(Self::Backward),
            _ => None,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainStatus {
    Running,
    Stopped,
    Trapped,
}

impl TrainStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Trapped => "trapped",
        }
    }
}

/// Dispatcher actions that target a single train. `monitor` and `reset` are
/// wire-level commands, not train actions; see `server_protocol`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Start,
    Stop,
    Reverse,
    Evacuate,
}

impl ActionKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "start" => Some(Self::Start),
            "stop" => Some(Self::Stop),
            "reverse" => Some(Self::Reverse),
            "evacuate" => Some(Self::Evacuate),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Station {
    pub id: u32,
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub passengers: i32,
    #[serde(rename = "isTransfer")]
    pub is_transfer: bool,
    pub connected: Vec<u32>,
    #[serde(rename = "floodLevel")]
    pub flood_level: f32,
    #[serde(rename = "previousFloodLevel")]
    pub previous_flood_level: f32,
    #[serde(rename = "increaseInThisRound")]
    pub increase_in_this_round: f32,
    #[serde(rename = "isFailurePoint")]
    pub is_failure_point: bool,
    pub elevation: f32,
    #[serde(rename = "hasPump")]
    pub has_pump: bool,
    #[serde(rename = "pumpThreshold")]
    pub pump_threshold: f32,
    #[serde(rename = "pumpRate")]
    pub pump_rate: f32,
    #[serde(rename = "pumpUsed")]
    pub pump_used: bool,
    #[serde(rename = "lastIncrease", skip_serializing_if = "Option::is_none", default)]
    pub last_increase: Option<f32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackNode {
    pub id: u32,
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub elevation: f32,
    #[serde(rename = "floodLevel")]
    pub flood_level: f32,
    #[serde(rename = "previousFloodLevel")]
    pub previous_flood_level: f32,
    #[serde(rename = "increaseInThisRound")]
    pub increase_in_this_round: f32,
    #[serde(rename = "isFailurePoint")]
    pub is_failure_point: bool,
    #[serde(rename = "lastIncrease", skip_serializing_if = "Option::is_none", default)]
    pub last_increase: Option<f32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Track {
    pub id: u32,
    #[serde(rename = "lineId")]
    pub line_id: u32,
    #[serde(rename = "stationA")]
    pub station_a: u32,
    #[serde(rename = "stationB")]
    pub station_b: u32,
    pub nodes: Vec<TrackNode>,
}

/// A train is either at a station or on a track node, never both. The
/// variant makes the exclusivity a type-level fact instead of a pair of
/// nullable ids that must be kept in sync.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Located {
    AtStation(u32),
    OnTrack { track_id: u32, node_index: usize },
}

impl Located {
    pub fn station_id(self) -> Option<u32> {
        match self {
            Self::AtStation(id) => Some(id),
            Self::OnTrack { .. } => None,
        }
    }

    pub fn is_at_station(self) -> bool {
        matches!(self, Self::AtStation(_))
    }
}

#[derive(Clone, Debug)]
pub struct Train {
    pub id: u32,
    pub located: Located,
    pub capacity: i32,
    pub passengers: i32,
    pub direction: Direction,
    pub status: TrainStatus,
    pub line_id: u32,
    pub delayed_rounds: u32,
    pub last_move_round: u32,
}

impl Train {
    /// Wire shape of the train, with the location variant flattened back
    /// into the nullable stationId/trackId/nodePosition triple the clients
    /// expect.
    pub fn view(&self) -> TrainView {
        let (station_id, track_id, node_position) = match self.located {
            Located::AtStation(id) => (Some(id), None, None),
            Located::OnTrack {
                track_id,
                node_index,
            } => (None, Some(track_id), Some(node_index)),
        };
        TrainView {
            id: self.id,
            station_id,
            track_id,
            node_position,
            capacity: self.capacity,
            passengers: self.passengers,
            direction: self.direction,
            status: self.status,
            line_id: self.line_id,
            delayed_rounds: self.delayed_rounds,
            last_move_round: self.last_move_round,
        }
    }

    pub fn position_identifier(&self) -> String {
        match self.located {
            Located::AtStation(id) => format!("Station {id}"),
            Located::OnTrack {
                track_id,
                node_index,
            } => format!("Track {track_id}-Node {node_index}"),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct TrainView {
    pub id: u32,
    #[serde(rename = "stationId")]
    pub station_id: Option<u32>,
    #[serde(rename = "trackId")]
    pub track_id: Option<u32>,
    #[serde(rename = "nodePosition")]
    pub node_position: Option<usize>,
    pub capacity: i32,
    pub passengers: i32,
    pub direction: Direction,
    pub status: TrainStatus,
    #[serde(rename = "lineId")]
    pub line_id: u32,
    #[serde(rename = "delayedRounds")]
    pub delayed_rounds: u32,
    #[serde(rename = "lastMoveRound")]
    pub last_move_round: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    Station,
    Track,
}

/// Ordinal position of a station or track node along its line's full walk.
/// Derived by the topology resolver on demand, never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainLocation {
    #[serde(rename = "type")]
    pub kind: LocationKind,
    pub id: u32,
    pub name: String,
    #[serde(rename = "indexInLine")]
    pub index_in_line: usize,
}

/// An uncommitted dispatcher decision, held until the round commits or the
/// dispatcher withdraws it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PendingAction {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    #[serde(rename = "targetTrain")]
    pub train_id: u32,
    #[serde(rename = "targetLocation")]
    pub target: TrainLocation,
    pub timestamp: String,
    pub round: u32,
    #[serde(rename = "selectTimeUsed")]
    pub select_time_used: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrainScore {
    #[serde(rename = "trainId")]
    pub train_id: u32,
    #[serde(rename = "delayScore")]
    pub delay_score: i64,
    #[serde(rename = "evacuationScore")]
    pub evacuation_score: i64,
    #[serde(rename = "trackStopScore")]
    pub track_stop_score: i64,
    pub total: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoundScore {
    pub total: i64,
    #[serde(rename = "trainScores")]
    pub train_scores: Vec<TrainScore>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct GameSetting {
    #[serde(rename = "failurePointCount")]
    pub failure_point_count: usize,
    #[serde(rename = "floodIncreaseBaseMode")]
    pub flood_increase_base_mode: f32,
    #[serde(rename = "floodIncreaseSigmaMin")]
    pub flood_increase_sigma_min: f32,
    #[serde(rename = "floodIncreaseSigmaMax")]
    pub flood_increase_sigma_max: f32,
    #[serde(rename = "getOnAndOffRatioMin")]
    pub get_on_and_off_ratio_min: f32,
    #[serde(rename = "getOnAndOffRatioMax")]
    pub get_on_and_off_ratio_max: f32,
    #[serde(rename = "trappedThreshold")]
    pub trapped_threshold: f32,
    #[serde(rename = "floodWarningThreshold")]
    pub flood_warning_threshold: f32,
    #[serde(rename = "defaultDecisionTime")]
    pub default_decision_time: u32,
    #[serde(rename = "delayScorePerPassenger")]
    pub delay_score_per_passenger: i64,
    #[serde(rename = "evacuationScorePerPassenger")]
    pub evacuation_score_per_passenger: i64,
    #[serde(rename = "trappedInTrackScorePerPassenger")]
    pub trapped_in_track_score_per_passenger: i64,
    #[serde(rename = "propagationFloodIncrease")]
    pub propagation_flood_increase: f32,
    #[serde(rename = "propagationThreshold")]
    pub propagation_threshold: f32,
    #[serde(rename = "elevationDifferenceFactor")]
    pub elevation_difference_factor: f32,
    #[serde(rename = "floodDifferenceFactor")]
    pub flood_difference_factor: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrainLogEntry {
    pub id: u32,
    #[serde(rename = "stationId")]
    pub station_id: Option<u32>,
    #[serde(rename = "trackId")]
    pub track_id: Option<u32>,
    #[serde(rename = "nodePosition")]
    pub node_position: Option<usize>,
    pub capacity: i32,
    #[serde(rename = "passengersChange")]
    pub passengers_change: i32,
    #[serde(rename = "currentPassengers")]
    pub current_passengers: i32,
    #[serde(rename = "statusChange", skip_serializing_if = "Option::is_none", default)]
    pub status_change: Option<String>,
    #[serde(rename = "currentStatus")]
    pub current_status: TrainStatus,
    #[serde(
        rename = "directionChange",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub direction_change: Option<String>,
    #[serde(rename = "currentDirection")]
    pub current_direction: Direction,
    #[serde(rename = "positionChange")]
    pub position_change: String,
    #[serde(rename = "delayedRounds")]
    pub delayed_rounds: u32,
    #[serde(rename = "lastMoveRound")]
    pub last_move_round: u32,
    #[serde(rename = "lineId")]
    pub line_id: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StationLogEntry {
    pub id: u32,
    pub elevation: f32,
    #[serde(rename = "isTransfer")]
    pub is_transfer: bool,
    #[serde(rename = "currentFloodLevel")]
    pub current_flood_level: f32,
    #[serde(rename = "passengersChange")]
    pub passengers_change: i32,
    #[serde(rename = "currentPassengers")]
    pub current_passengers: i32,
    #[serde(rename = "pumpUsed")]
    pub pump_used: bool,
    #[serde(rename = "pumpThreshold")]
    pub pump_threshold: f32,
    #[serde(rename = "pumpRate")]
    pub pump_rate: f32,
    #[serde(rename = "isFailurePoint")]
    pub is_failure_point: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackNodeLogEntry {
    pub id: u32,
    #[serde(rename = "currentFloodLevel")]
    pub current_flood_level: f32,
    #[serde(rename = "isFailurePoint")]
    pub is_failure_point: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackLogEntry {
    pub id: u32,
    #[serde(rename = "stationA")]
    pub station_a: u32,
    #[serde(rename = "stationB")]
    pub station_b: u32,
    #[serde(rename = "lineId")]
    pub line_id: u32,
    pub nodes: Vec<TrackNodeLogEntry>,
}

/// Full per-round snapshot. Built once when the round commits and immutable
/// afterwards; round 0 additionally records the session's settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameLog {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub setting: Option<GameSetting>,
    pub id: u64,
    pub round: u32,
    pub timestamp: String,
    pub trains: Vec<TrainLogEntry>,
    pub stations: Vec<StationLogEntry>,
    pub tracks: Vec<TrackLogEntry>,
    #[serde(rename = "playerActions")]
    pub player_actions: Vec<PendingAction>,
    #[serde(rename = "scoreChange")]
    pub score_change: i64,
    #[serde(rename = "totalScore")]
    pub total_score: i64,
    #[serde(rename = "decisionTimeUsed")]
    pub decision_time_used: u32,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct RoundInfo {
    pub round: u32,
}

/// State observation pushed to a session after every committed round.
#[derive(Clone, Debug, Serialize)]
pub struct Observation {
    pub trains: Vec<TrainView>,
    pub stations: Vec<Station>,
    pub score: i64,
    pub info: RoundInfo,
}
