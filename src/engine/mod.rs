use chrono::{SecondsFormat, Utc};

use crate::constants::default_setting;
use crate::log_store::LogStore;
use crate::network::build_network;
use crate::rng::Rng;
use crate::types::{
    ActionKind, GameLog, GameSetting, Located, Observation, PendingAction, RoundInfo, RoundScore,
    Station, StationLogEntry, Track, TrackLogEntry, TrackNodeLogEntry, Train, TrainLogEntry,
    TrainStatus,
};

mod flood;
mod movement;
mod passengers;
mod scoring;
pub mod topology;

#[derive(Clone, Copy, Debug)]
pub struct GameEngineOptions {
    pub failure_point_count: usize,
    pub decision_time: u32,
}

impl Default for GameEngineOptions {
    fn default() -> Self {
        let setting = default_setting();
        Self {
            failure_point_count: setting.failure_point_count,
            decision_time: setting.default_decision_time,
        }
    }
}

/// One dispatch session: the network, the trains, the countdown and the
/// score. All randomness flows through the seeded generator, so a seed fully
/// determines a session given the same action sequence.
pub struct GameEngine {
    setting: GameSetting,
    seed: u32,
    rng: Rng,
    round: u32,
    score: i64,
    stations: Vec<Station>,
    tracks: Vec<Track>,
    trains: Vec<Train>,
    paused: bool,
    decision_time_remaining: u32,
    decision_time_used: u32,
    pending_actions: Vec<PendingAction>,
    evacuated_train_ids: Vec<u32>,
    last_round_score: Option<RoundScore>,
    store: Box<dyn LogStore>,
}

impl GameEngine {
    pub fn new(seed: u32, options: GameEngineOptions, store: Box<dyn LogStore>) -> Self {
        let mut setting = default_setting();
        setting.failure_point_count = options.failure_point_count;
        setting.default_decision_time = options.decision_time;

        let mut rng = Rng::new(seed);
        let network = build_network(setting.failure_point_count, &mut rng);
        Self {
            setting,
            seed,
            rng,
            round: 0,
            score: 0,
            stations: network.stations,
            tracks: network.tracks,
            trains: network.trains,
            paused: false,
            decision_time_remaining: setting.default_decision_time,
            decision_time_used: 0,
            pending_actions: Vec::new(),
            evacuated_train_ids: Vec::new(),
            last_round_score: None,
            store,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn setting(&self) -> &GameSetting {
        &self.setting
    }

    pub fn trains(&self) -> &[Train] {
        &self.trains
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn pending_actions(&self) -> &[PendingAction] {
        &self.pending_actions
    }

    pub fn last_round_score(&self) -> Option<&RoundScore> {
        self.last_round_score.as_ref()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn decision_time_remaining(&self) -> u32 {
        self.decision_time_remaining
    }

    pub fn logs(&self) -> Vec<GameLog> {
        self.store.load_all()
    }

    /// Queues a dispatcher decision for the running round. Unknown train ids
    /// are ignored; validity against the train's state is checked when the
    /// round commits, not here.
    pub fn queue_action(&mut self, kind: ActionKind, train_id: u32) -> bool {
        let Some(train) = self.trains.iter().find(|t| t.id == train_id) else {
            return false;
        };
        let Some(target) = topology::train_location(train, &self.stations, &self.tracks) else {
            eprintln!("[engine] train {train_id} has no resolvable position; action dropped");
            return false;
        };
        self.pending_actions.push(PendingAction {
            kind,
            train_id,
            target,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            round: self.round,
            select_time_used: self
                .setting
                .default_decision_time
                .saturating_sub(self.decision_time_remaining),
        });
        true
    }

    /// Withdraws every queued decision for the train. Returns whether
    /// anything was removed.
    pub fn cancel_action(&mut self, train_id: u32) -> bool {
        let before = self.pending_actions.len();
        self.pending_actions.retain(|action| action.train_id != train_id);
        self.pending_actions.len() != before
    }

    /// One second of the decision countdown. Returns the round score when
    /// the window just expired and the round committed.
    pub fn tick_countdown(&mut self) -> Option<RoundScore> {
        if self.paused {
            return None;
        }
        if self.decision_time_remaining > 0 {
            self.decision_time_remaining -= 1;
            return None;
        }
        Some(self.commit_round())
    }

    /// Runs the full round pipeline: queued actions, movement, flooding,
    /// passenger exchange, the trap state machine, scoring and the round
    /// log. An expired decision window discards the queue instead of
    /// applying it.
    pub fn commit_round(&mut self) -> RoundScore {
        let expired = self.decision_time_remaining == 0;
        self.decision_time_used = if expired {
            self.setting.default_decision_time
        } else {
            self.setting.default_decision_time - self.decision_time_remaining
        };

        let mut committed = std::mem::take(&mut self.pending_actions);
        if expired && !committed.is_empty() {
            eprintln!(
                "[engine] decision window expired; discarding {} queued action(s)",
                committed.len()
            );
            committed.clear();
        }

        let trains_before = self.trains.clone();
        let stations_before = self.stations.clone();

        for action in &committed {
            self.apply_action(action);
        }

        self.trains = self
            .trains
            .iter()
            .map(|train| {
                movement::advance_train(train, &self.trains, &self.stations, &self.tracks, self.round)
            })
            .collect();

        flood::update_flood_levels(&mut self.stations, &mut self.tracks, &self.setting, &mut self.rng);

        passengers::exchange_passengers(
            &mut self.trains,
            &mut self.stations,
            &mut self.evacuated_train_ids,
            &self.setting,
            &mut self.rng,
        );

        self.update_train_statuses();

        let round_score = scoring::calculate_round_score(
            &trains_before,
            &self.trains,
            &self.evacuated_train_ids,
            &self.setting,
        );

        let log = self.build_round_log(&trains_before, &stations_before, &committed, &round_score);
        self.store.append(&log);

        self.score += round_score.total;
        self.round += 1;
        self.decision_time_remaining = self.setting.default_decision_time;
        self.decision_time_used = 0;
        self.evacuated_train_ids.clear();
        self.last_round_score = Some(round_score.clone());
        round_score
    }

    pub fn observation(&self) -> Observation {
        Observation {
            trains: self.trains.iter().map(Train::view).collect(),
            stations: self.stations.clone(),
            score: self.score,
            info: RoundInfo { round: self.round },
        }
    }

    /// Starts the session over with fresh failure points. The log history
    /// survives the reset.
    pub fn reset(&mut self) {
        let network = build_network(self.setting.failure_point_count, &mut self.rng);
        self.stations = network.stations;
        self.tracks = network.tracks;
        self.trains = network.trains;
        self.round = 0;
        self.score = 0;
        self.paused = false;
        self.decision_time_remaining = self.setting.default_decision_time;
        self.decision_time_used = 0;
        self.pending_actions.clear();
        self.evacuated_train_ids.clear();
        self.last_round_score = None;
    }

    fn local_flood_level(&self, located: Located) -> Option<f32> {
        match located {
            Located::AtStation(station_id) => self
                .stations
                .iter()
                .find(|s| s.id == station_id)
                .map(|s| s.flood_level),
            Located::OnTrack {
                track_id,
                node_index,
            } => self
                .tracks
                .iter()
                .find(|t| t.id == track_id)
                .and_then(|t| t.nodes.get(node_index))
                .map(|n| n.flood_level),
        }
    }

    fn apply_action(&mut self, action: &PendingAction) {
        let Some(index) = self.trains.iter().position(|t| t.id == action.train_id) else {
            return;
        };
        let level = self.local_flood_level(self.trains[index].located).unwrap_or(0.0);
        let train = &mut self.trains[index];
        match action.kind {
            ActionKind::Start => {
                if train.status != TrainStatus::Stopped {
                    eprintln!(
                        "[engine] start refused for train {}: not stopped",
                        train.id
                    );
                } else if level > self.setting.trapped_threshold {
                    eprintln!(
                        "[engine] start refused for train {}: water too deep ({level})",
                        train.id
                    );
                } else {
                    train.status = TrainStatus::Running;
                }
            }
            ActionKind::Stop => {
                if train.status != TrainStatus::Running {
                    eprintln!("[engine] stop refused for train {}: not running", train.id);
                } else {
                    train.status = TrainStatus::Stopped;
                }
            }
            ActionKind::Reverse => {
                if train.status == TrainStatus::Trapped {
                    eprintln!("[engine] reverse refused for train {}: trapped", train.id);
                } else {
                    train.direction = train.direction.reversed();
                }
            }
            ActionKind::Evacuate => {
                if train.status == TrainStatus::Trapped {
                    eprintln!("[engine] evacuation refused for train {}: trapped", train.id);
                } else if !train.located.is_at_station() {
                    eprintln!(
                        "[engine] evacuation refused for train {}: not at a station",
                        train.id
                    );
                } else {
                    train.status = TrainStatus::Stopped;
                    self.evacuated_train_ids.push(train.id);
                }
            }
        }
    }

    // Post-flood trap state machine. Deep water traps a train no matter what
    // it was doing; receding water releases it to stopped, never straight
    // back to running.
    fn update_train_statuses(&mut self) {
        let levels: Vec<f32> = self
            .trains
            .iter()
            .map(|train| self.local_flood_level(train.located).unwrap_or(0.0))
            .collect();
        for (train, level) in self.trains.iter_mut().zip(levels) {
            if level > self.setting.trapped_threshold {
                if train.status != TrainStatus::Trapped {
                    eprintln!(
                        "[engine] train {} trapped at {} (flood {level})",
                        train.id,
                        train.position_identifier()
                    );
                }
                train.status = TrainStatus::Trapped;
            } else if train.status == TrainStatus::Trapped {
                train.status = TrainStatus::Stopped;
            }
        }
    }

    fn build_round_log(
        &self,
        trains_before: &[Train],
        stations_before: &[Station],
        actions: &[PendingAction],
        round_score: &RoundScore,
    ) -> GameLog {
        let trains = self
            .trains
            .iter()
            .map(|train| {
                let before = trains_before.iter().find(|b| b.id == train.id);
                let view = train.view();
                let status_change = before.and_then(|b| {
                    (b.status != train.status)
                        .then(|| format!("{}→{}", b.status.as_str(), train.status.as_str()))
                });
                let direction_change = before.and_then(|b| {
                    (b.direction != train.direction).then(|| {
                        format!("{}→{}", b.direction.as_str(), train.direction.as_str())
                    })
                });
                let position_change = match before {
                    Some(b) => format!(
                        "{} → {}",
                        b.position_identifier(),
                        train.position_identifier()
                    ),
                    None => train.position_identifier(),
                };
                TrainLogEntry {
                    id: train.id,
                    station_id: view.station_id,
                    track_id: view.track_id,
                    node_position: view.node_position,
                    capacity: train.capacity,
                    passengers_change: train.passengers
                        - before.map_or(0, |b| b.passengers),
                    current_passengers: train.passengers,
                    status_change,
                    current_status: train.status,
                    direction_change,
                    current_direction: train.direction,
                    position_change,
                    delayed_rounds: train.delayed_rounds,
                    last_move_round: train.last_move_round,
                    line_id: train.line_id,
                }
            })
            .collect();

        let stations = self
            .stations
            .iter()
            .map(|station| {
                let before = stations_before.iter().find(|b| b.id == station.id);
                StationLogEntry {
                    id: station.id,
                    elevation: station.elevation,
                    is_transfer: station.is_transfer,
                    current_flood_level: station.flood_level,
                    passengers_change: station.passengers
                        - before.map_or(0, |b| b.passengers),
                    current_passengers: station.passengers,
                    pump_used: station.pump_used,
                    pump_threshold: station.pump_threshold,
                    pump_rate: station.pump_rate,
                    is_failure_point: station.is_failure_point,
                }
            })
            .collect();

        let tracks = self
            .tracks
            .iter()
            .map(|track| TrackLogEntry {
                id: track.id,
                station_a: track.station_a,
                station_b: track.station_b,
                line_id: track.line_id,
                nodes: track
                    .nodes
                    .iter()
                    .map(|node| TrackNodeLogEntry {
                        id: node.id,
                        current_flood_level: node.flood_level,
                        is_failure_point: node.is_failure_point,
                    })
                    .collect(),
            })
            .collect();

        GameLog {
            setting: (self.round == 0).then_some(self.setting),
            id: Utc::now().timestamp_millis() as u64,
            round: self.round,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            trains,
            stations,
            tracks,
            player_actions: actions.to_vec(),
            score_change: round_score.total,
            total_score: self.score + round_score.total,
            decision_time_used: self.decision_time_used,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_store::MemoryLogStore;

    fn engine(seed: u32) -> GameEngine {
        // No failure points: the flood stays dry unless a test raises it.
        let options = GameEngineOptions {
            failure_point_count: 0,
            ..GameEngineOptions::default()
        };
        GameEngine::new(seed, options, Box::new(MemoryLogStore::new()))
    }

    #[test]
    fn new_session_starts_clean() {
        let engine = engine(1);
        assert_eq!(engine.round(), 0);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.trains().len(), 8);
        assert_eq!(engine.stations().len(), 16);
        assert_eq!(engine.tracks().len(), 12);
        assert!(engine.pending_actions().is_empty());
        assert!(engine.logs().is_empty());
    }

    #[test]
    fn commit_advances_round_and_records_a_log() {
        let mut engine = engine(1);
        engine.commit_round();
        engine.commit_round();

        assert_eq!(engine.round(), 2);
        let logs = engine.logs();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].round, 0);
        assert_eq!(logs[1].round, 1);
        // The session settings ride along on the first round only.
        assert!(logs[0].setting.is_some());
        assert!(logs[1].setting.is_none());
        assert_eq!(logs[1].total_score, engine.score());
    }

    #[test]
    fn queue_and_cancel_manage_the_pending_list() {
        let mut engine = engine(1);
        assert!(engine.queue_action(ActionKind::Stop, 0));
        assert!(engine.queue_action(ActionKind::Reverse, 1));
        assert_eq!(engine.pending_actions().len(), 2);

        assert!(engine.cancel_action(0));
        assert_eq!(engine.pending_actions().len(), 1);
        assert_eq!(engine.pending_actions()[0].train_id, 1);
        assert!(!engine.cancel_action(0));
    }

    #[test]
    fn unknown_train_id_is_ignored() {
        let mut engine = engine(1);
        assert!(!engine.queue_action(ActionKind::Start, 99));
        assert!(engine.pending_actions().is_empty());
    }

    #[test]
    fn expired_window_discards_queued_actions() {
        let options = GameEngineOptions {
            failure_point_count: 0,
            decision_time: 1,
        };
        let mut engine = GameEngine::new(1, options, Box::new(MemoryLogStore::new()));
        engine.queue_action(ActionKind::Stop, 0);

        assert!(engine.tick_countdown().is_none());
        // The window is now exhausted; the next tick commits without the
        // queued stop.
        let score = engine.tick_countdown().expect("round commits on expiry");
        assert_eq!(engine.round(), 1);
        assert_eq!(engine.trains()[0].status, TrainStatus::Running);
        assert_eq!(engine.logs()[0].player_actions.len(), 0);
        assert_eq!(engine.logs()[0].decision_time_used, 1);
        assert_eq!(score.total, engine.score());
    }

    #[test]
    fn paused_session_does_not_count_down() {
        let mut engine = engine(1);
        engine.set_paused(true);
        let remaining = engine.decision_time_remaining();
        for _ in 0..100 {
            assert!(engine.tick_countdown().is_none());
        }
        assert_eq!(engine.decision_time_remaining(), remaining);
        assert_eq!(engine.round(), 0);
    }

    #[test]
    fn stop_then_start_round_trip() {
        let mut engine = engine(1);
        engine.queue_action(ActionKind::Stop, 0);
        engine.commit_round();
        assert_eq!(engine.trains()[0].status, TrainStatus::Stopped);

        engine.queue_action(ActionKind::Start, 0);
        engine.commit_round();
        assert_eq!(engine.trains()[0].status, TrainStatus::Running);
    }

    #[test]
    fn invalid_actions_are_skipped_at_commit() {
        let mut engine = engine(1);
        // Train 0 is running; starting it again is a no-op.
        engine.queue_action(ActionKind::Start, 0);
        engine.commit_round();
        assert_eq!(engine.trains()[0].status, TrainStatus::Running);

        // A stopped train refuses a second stop.
        engine.queue_action(ActionKind::Stop, 0);
        engine.commit_round();
        engine.queue_action(ActionKind::Stop, 0);
        let pending_round = engine.round();
        engine.commit_round();
        assert_eq!(engine.round(), pending_round + 1);
        assert_eq!(engine.trains()[0].status, TrainStatus::Stopped);
    }

    #[test]
    fn stopped_train_accrues_negative_delay_score() {
        let mut engine = engine(1);
        engine.queue_action(ActionKind::Stop, 0);
        engine.commit_round();
        engine.commit_round();

        let train = &engine.trains()[0];
        assert!(train.delayed_rounds > 0);
        let score = engine.last_round_score().expect("round scored");
        let entry = score
            .train_scores
            .iter()
            .find(|s| s.train_id == 0)
            .expect("train 0 scored");
        assert!(entry.delay_score < 0);
        assert_eq!(
            entry.delay_score,
            -engine.setting().delay_score_per_passenger * i64::from(train.passengers)
        );
    }

    #[test]
    fn evacuation_empties_the_train_and_charges_the_penalty() {
        let mut engine = engine(1);
        let carried = engine.trains()[0].passengers;
        let platform_before = engine.stations()[0].passengers;
        assert!(carried > 0);

        engine.queue_action(ActionKind::Evacuate, 0);
        engine.commit_round();

        let train = &engine.trains()[0];
        assert_eq!(train.passengers, 0);
        assert_eq!(train.status, TrainStatus::Stopped);
        assert_eq!(train.located, Located::AtStation(0));
        assert_eq!(
            engine.stations()[0].passengers,
            platform_before + carried
        );

        let score = engine.last_round_score().expect("round scored");
        let entry = score
            .train_scores
            .iter()
            .find(|s| s.train_id == 0)
            .expect("train 0 scored");
        assert_eq!(
            entry.evacuation_score,
            engine.setting().evacuation_score_per_passenger * i64::from(carried)
        );
    }

    #[test]
    fn evacuation_voided_by_rising_water_charges_nothing() {
        let mut engine = engine(1);
        let carried = engine.trains()[0].passengers;
        // The platform sits just under the trapped threshold; the flooded
        // neighbor node pushes it over during the same round the
        // evacuation was queued.
        engine.stations[0].flood_level = 49.0;
        engine.stations[0].has_pump = false;
        engine.tracks[0].nodes[0].flood_level = 100.0;

        engine.queue_action(ActionKind::Evacuate, 0);
        engine.commit_round();

        let train = &engine.trains()[0];
        assert_eq!(train.status, TrainStatus::Trapped);
        assert_eq!(train.passengers, carried);
        let score = engine.last_round_score().expect("round scored");
        let entry = score
            .train_scores
            .iter()
            .find(|s| s.train_id == 0)
            .expect("train 0 scored");
        assert_eq!(entry.evacuation_score, 0);
    }

    #[test]
    fn evacuation_list_clears_after_the_round() {
        let mut engine = engine(1);
        engine.queue_action(ActionKind::Evacuate, 0);
        engine.commit_round();
        assert!(engine.evacuated_train_ids.is_empty());

        // The next round must not charge the evacuation again.
        engine.commit_round();
        let score = engine.last_round_score().expect("round scored");
        let entry = score
            .train_scores
            .iter()
            .find(|s| s.train_id == 0)
            .expect("train 0 scored");
        assert_eq!(entry.evacuation_score, 0);
    }

    #[test]
    fn deep_water_traps_and_receding_water_releases_to_stopped() {
        let mut engine = engine(1);
        engine.queue_action(ActionKind::Stop, 0);
        engine.commit_round();

        let passengers_before = engine.trains()[0].passengers;
        engine.stations[0].flood_level = 60.0;
        engine.stations[0].has_pump = false;
        engine.commit_round();
        assert_eq!(engine.trains()[0].status, TrainStatus::Trapped);
        // Trapping round: the passenger count is untouched.
        assert_eq!(engine.trains()[0].passengers, passengers_before);

        engine.stations[0].flood_level = 10.0;
        engine.commit_round();
        assert_eq!(engine.trains()[0].status, TrainStatus::Stopped);
    }

    #[test]
    fn trapped_train_cannot_start_reverse_or_evacuate() {
        let mut engine = engine(1);
        engine.queue_action(ActionKind::Stop, 0);
        engine.commit_round();
        engine.stations[0].flood_level = 60.0;
        engine.stations[0].has_pump = false;
        engine.commit_round();
        assert_eq!(engine.trains()[0].status, TrainStatus::Trapped);

        let direction = engine.trains()[0].direction;
        engine.queue_action(ActionKind::Start, 0);
        engine.queue_action(ActionKind::Reverse, 0);
        engine.queue_action(ActionKind::Evacuate, 0);
        engine.commit_round();

        let train = &engine.trains()[0];
        assert_eq!(train.status, TrainStatus::Trapped);
        assert_eq!(train.direction, direction);
        assert!(train.passengers > 0);
    }

    #[test]
    fn trapped_on_track_draws_the_stranding_penalty() {
        let mut engine = engine(1);
        engine.trains[0].located = Located::OnTrack {
            track_id: 0,
            node_index: 0,
        };
        engine.trains[0].status = TrainStatus::Stopped;
        engine.tracks[0].nodes[0].flood_level = 60.0;
        engine.commit_round();

        let train = &engine.trains()[0];
        assert_eq!(train.status, TrainStatus::Trapped);
        let score = engine.last_round_score().expect("round scored");
        let entry = score
            .train_scores
            .iter()
            .find(|s| s.train_id == 0)
            .expect("train 0 scored");
        assert_eq!(
            entry.track_stop_score,
            engine.setting().trapped_in_track_score_per_passenger * i64::from(train.passengers)
        );
    }

    #[test]
    fn observation_reflects_the_committed_state() {
        let mut engine = engine(1);
        engine.commit_round();
        let observation = engine.observation();
        assert_eq!(observation.info.round, 1);
        assert_eq!(observation.trains.len(), 8);
        assert_eq!(observation.stations.len(), 16);
        assert_eq!(observation.score, engine.score());
    }

    #[test]
    fn reset_restores_a_fresh_session_but_keeps_history() {
        let mut engine = engine(1);
        engine.queue_action(ActionKind::Stop, 0);
        engine.commit_round();
        engine.commit_round();
        assert_eq!(engine.logs().len(), 2);

        engine.reset();
        assert_eq!(engine.round(), 0);
        assert_eq!(engine.score(), 0);
        assert!(engine.pending_actions().is_empty());
        assert_eq!(engine.trains()[0].status, TrainStatus::Running);
        assert_eq!(engine.trains()[0].delayed_rounds, 0);
        assert_eq!(engine.logs().len(), 2);
    }

    #[test]
    fn dry_network_with_no_actions_only_moves_trains() {
        let mut engine = engine(1);
        for _ in 0..30 {
            engine.commit_round();
            let score = engine.last_round_score().expect("round scored");
            for entry in &score.train_scores {
                assert_eq!(entry.evacuation_score, 0);
                assert_eq!(entry.track_stop_score, 0);
            }
        }
        for train in engine.trains() {
            assert_eq!(train.status, TrainStatus::Running);
            assert_eq!(train.delayed_rounds, 0);
        }
    }

    #[test]
    fn same_seed_and_actions_replay_identically() {
        let mut a = engine(77);
        let mut b = engine(77);
        for round in 0..20 {
            if round % 3 == 0 {
                a.queue_action(ActionKind::Stop, 2);
                b.queue_action(ActionKind::Stop, 2);
            }
            if round % 3 == 1 {
                a.queue_action(ActionKind::Start, 2);
                b.queue_action(ActionKind::Start, 2);
            }
            a.commit_round();
            b.commit_round();
        }
        assert_eq!(a.score(), b.score());
        for (ta, tb) in a.trains().iter().zip(b.trains()) {
            assert_eq!(ta.passengers, tb.passengers);
            assert_eq!(ta.located, tb.located);
            assert_eq!(ta.status, tb.status);
        }
    }
}
