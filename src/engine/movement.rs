use crate::engine::topology::train_location;
use crate::types::{Direction, Located, Station, Track, Train, TrainStatus};

/// True when `train` must hold this round because the train one position
/// ahead of it on the same line and heading is stopped or trapped. The train
/// with the smaller line index is the leader; only a follower ever yields.
pub(crate) fn must_hold_for_leader(
    train: &Train,
    all_trains: &[Train],
    stations: &[Station],
    tracks: &[Track],
) -> bool {
    let Some(own_location) = train_location(train, stations, tracks) else {
        return false;
    };
    for other in all_trains {
        if other.id == train.id
            || other.line_id != train.line_id
            || other.direction != train.direction
        {
            continue;
        }
        let Some(other_location) = train_location(other, stations, tracks) else {
            continue;
        };
        let gap = own_location
            .index_in_line
            .abs_diff(other_location.index_in_line);
        if gap > 1 {
            continue;
        }
        let other_is_leader = other_location.index_in_line <= own_location.index_in_line;
        if other_is_leader
            && matches!(other.status, TrainStatus::Stopped | TrainStatus::Trapped)
        {
            return true;
        }
    }
    false
}

/// Computes a train's state after the movement phase. Non-running trains
/// never move but accrue delay; a running train steps one position along its
/// line, reversing at a terminus.
pub(crate) fn advance_train(
    train: &Train,
    all_trains: &[Train],
    stations: &[Station],
    tracks: &[Track],
    current_round: u32,
) -> Train {
    let mut next = train.clone();

    if train.status != TrainStatus::Running {
        if current_round > train.last_move_round {
            next.delayed_rounds += 1;
        }
        return next;
    }

    if must_hold_for_leader(train, all_trains, stations, tracks) {
        eprintln!(
            "[engine] train {} held at {} behind a stopped train",
            train.id,
            train.position_identifier()
        );
        next.status = TrainStatus::Stopped;
        next.delayed_rounds += 1;
        return next;
    }

    match train.located {
        Located::AtStation(station_id) => {
            let outgoing = tracks.iter().find(|track| {
                track.line_id == train.line_id
                    && match train.direction {
                        Direction::Forward => track.station_a == station_id,
                        Direction::Backward => track.station_b == station_id,
                    }
            });
            match outgoing {
                Some(track) => {
                    let entry_node = match train.direction {
                        Direction::Forward => 0,
                        Direction::Backward => track.nodes.len().saturating_sub(1),
                    };
                    next.located = Located::OnTrack {
                        track_id: track.id,
                        node_index: entry_node,
                    };
                }
                // Terminus: turn around, departure happens next round.
                None => next.direction = train.direction.reversed(),
            }
            next.last_move_round = current_round;
        }
        Located::OnTrack {
            track_id,
            node_index,
        } => {
            let Some(track) = tracks.iter().find(|t| t.id == track_id) else {
                eprintln!("[engine] train {} references unknown track {track_id}", train.id);
                return next;
            };
            next.located = match train.direction {
                Direction::Forward => {
                    if node_index + 1 >= track.nodes.len() {
                        Located::AtStation(track.station_b)
                    } else {
                        Located::OnTrack {
                            track_id,
                            node_index: node_index + 1,
                        }
                    }
                }
                Direction::Backward => {
                    if node_index == 0 {
                        Located::AtStation(track.station_a)
                    } else {
                        Located::OnTrack {
                            track_id,
                            node_index: node_index - 1,
                        }
                    }
                }
            };
            next.last_move_round = current_round;
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::build_network;
    use crate::rng::Rng;

    fn network() -> (Vec<Station>, Vec<Track>, Vec<Train>) {
        let mut rng = Rng::new(1);
        let built = build_network(0, &mut rng);
        (built.stations, built.tracks, built.trains)
    }

    #[test]
    fn running_train_enters_the_track_toward_its_heading() {
        let (stations, tracks, trains) = network();
        // Train 0: forward at station 0 on line 1.
        let moved = advance_train(&trains[0], &trains, &stations, &tracks, 1);
        assert_eq!(
            moved.located,
            Located::OnTrack {
                track_id: 0,
                node_index: 0
            }
        );
        assert_eq!(moved.last_move_round, 1);
    }

    #[test]
    fn backward_train_enters_at_the_far_node() {
        let (stations, tracks, mut trains) = network();
        trains[1].located = Located::AtStation(3);
        let moved = advance_train(&trains[1], &trains, &stations, &tracks, 1);
        assert_eq!(
            moved.located,
            Located::OnTrack {
                track_id: 2,
                node_index: 0
            }
        );
    }

    #[test]
    fn train_leaves_a_track_onto_the_next_station() {
        let (stations, tracks, mut trains) = network();
        trains[0].located = Located::OnTrack {
            track_id: 0,
            node_index: 0,
        };
        let moved = advance_train(&trains[0], &trains, &stations, &tracks, 2);
        assert_eq!(moved.located, Located::AtStation(1));

        trains[0].direction = Direction::Backward;
        let moved = advance_train(&trains[0], &trains, &stations, &tracks, 2);
        assert_eq!(moved.located, Located::AtStation(0));
    }

    #[test]
    fn terminus_reverses_without_moving() {
        let (stations, tracks, mut trains) = network();
        // Station 3 is the forward terminus of line 1.
        trains[0].located = Located::AtStation(3);
        let moved = advance_train(&trains[0], &trains, &stations, &tracks, 4);
        assert_eq!(moved.located, Located::AtStation(3));
        assert_eq!(moved.direction, Direction::Backward);
        assert_eq!(moved.last_move_round, 4);
    }

    #[test]
    fn stopped_train_accrues_delay_and_stays_put() {
        let (stations, tracks, mut trains) = network();
        trains[0].status = TrainStatus::Stopped;
        let moved = advance_train(&trains[0], &trains, &stations, &tracks, 1);
        assert_eq!(moved.located, trains[0].located);
        assert_eq!(moved.delayed_rounds, 1);

        // No extra delay within the round it last moved.
        trains[0].last_move_round = 1;
        let moved = advance_train(&trains[0], &trains, &stations, &tracks, 1);
        assert_eq!(moved.delayed_rounds, 0);
    }

    #[test]
    fn follower_holds_behind_a_stopped_leader() {
        let (stations, tracks, mut trains) = network();
        // Put a stopped train directly ahead of train 0 on line 1, same
        // heading. Station 0 is index 0; track 0 node 0 is index 1.
        trains[0].located = Located::OnTrack {
            track_id: 0,
            node_index: 0,
        };
        trains[1].direction = Direction::Forward;
        trains[1].status = TrainStatus::Stopped;
        trains[1].located = Located::AtStation(0);

        let moved = advance_train(&trains[0], &trains, &stations, &tracks, 1);
        assert_eq!(moved.status, TrainStatus::Stopped);
        assert_eq!(moved.delayed_rounds, 1);
        assert_eq!(
            moved.located,
            Located::OnTrack {
                track_id: 0,
                node_index: 0
            }
        );
    }

    #[test]
    fn running_leader_does_not_block_the_follower() {
        let (stations, tracks, mut trains) = network();
        trains[0].located = Located::OnTrack {
            track_id: 0,
            node_index: 0,
        };
        trains[1].direction = Direction::Forward;
        trains[1].status = TrainStatus::Running;
        trains[1].located = Located::AtStation(0);

        let moved = advance_train(&trains[0], &trains, &stations, &tracks, 1);
        assert_eq!(moved.status, TrainStatus::Running);
        assert_eq!(moved.located, Located::AtStation(1));
    }

    #[test]
    fn leader_ignores_a_stopped_follower() {
        let (stations, tracks, mut trains) = network();
        // Train 0 leads at station 0 (line index 0); train 1 sits stopped
        // one position later in the walk, making it the follower.
        trains[1].direction = Direction::Forward;
        trains[1].status = TrainStatus::Stopped;
        trains[1].located = Located::OnTrack {
            track_id: 0,
            node_index: 0,
        };
        assert!(!must_hold_for_leader(
            &trains[0], &trains, &stations, &tracks
        ));
    }

    #[test]
    fn trains_on_other_lines_never_interact() {
        let (stations, tracks, mut trains) = network();
        trains[2].status = TrainStatus::Stopped;
        // Train 0 (line 1) and train 2 (line 2) share no topology.
        assert!(!must_hold_for_leader(
            &trains[0], &trains, &stations, &tracks
        ));
    }
}
