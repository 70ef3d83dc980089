use crate::types::{GameSetting, RoundScore, Train, TrainScore, TrainStatus};

/// Scores one committed round from the post-round train states. The
/// pre-round snapshot supplies the evacuation baseline: an evacuated train
/// already emptied during the exchange, so the penalty counts the passengers
/// it carried when the round began.
pub(crate) fn calculate_round_score(
    trains_before: &[Train],
    trains: &[Train],
    evacuated_train_ids: &[u32],
    setting: &GameSetting,
) -> RoundScore {
    let mut train_scores = Vec::with_capacity(trains.len());
    let mut total = 0i64;

    for train in trains {
        let delay_score = if train.delayed_rounds > 0 {
            -setting.delay_score_per_passenger * i64::from(train.passengers)
        } else {
            setting.delay_score_per_passenger * i64::from(train.passengers)
        };

        let evacuation_score = if evacuated_train_ids.contains(&train.id) {
            let carried = trains_before
                .iter()
                .find(|before| before.id == train.id)
                .map(|before| before.passengers)
                .unwrap_or(0);
            setting.evacuation_score_per_passenger * i64::from(carried)
        } else {
            0
        };

        let track_stop_score =
            if train.status == TrainStatus::Trapped && !train.located.is_at_station() {
                setting.trapped_in_track_score_per_passenger * i64::from(train.passengers)
            } else {
                0
            };

        let train_total = delay_score + evacuation_score + track_stop_score;
        total += train_total;
        train_scores.push(TrainScore {
            train_id: train.id,
            delay_score,
            evacuation_score,
            track_stop_score,
            total: train_total,
        });
    }

    RoundScore {
        total,
        train_scores,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::default_setting;
    use crate::types::{Direction, Located};

    fn train(id: u32, passengers: i32) -> Train {
        Train {
            id,
            located: Located::AtStation(0),
            capacity: 100,
            passengers,
            direction: Direction::Forward,
            status: TrainStatus::Running,
            line_id: 1,
            delayed_rounds: 0,
            last_move_round: 0,
        }
    }

    #[test]
    fn on_time_train_earns_positive_delay_score() {
        let setting = default_setting();
        let trains = vec![train(0, 50)];
        let score = calculate_round_score(&trains, &trains, &[], &setting);
        assert_eq!(score.total, 250);
        assert_eq!(score.train_scores[0].delay_score, 250);
    }

    #[test]
    fn delayed_train_flips_the_delay_score_negative() {
        let setting = default_setting();
        let mut delayed = train(0, 50);
        delayed.delayed_rounds = 2;
        let trains = vec![delayed];
        let score = calculate_round_score(&trains, &trains, &[], &setting);
        assert_eq!(score.train_scores[0].delay_score, -250);
    }

    #[test]
    fn evacuation_penalty_uses_the_pre_round_passenger_count() {
        let setting = default_setting();
        let before = vec![train(0, 50)];
        let mut after = train(0, 0);
        after.status = TrainStatus::Stopped;
        let score = calculate_round_score(&before, &[after], &[0], &setting);
        assert_eq!(score.train_scores[0].evacuation_score, -750);
        // The emptied train is on time with zero passengers aboard.
        assert_eq!(score.train_scores[0].delay_score, 0);
        assert_eq!(score.total, -750);
    }

    #[test]
    fn trapped_on_track_draws_the_stranding_penalty() {
        let setting = default_setting();
        let mut stranded = train(0, 30);
        stranded.status = TrainStatus::Trapped;
        stranded.located = Located::OnTrack {
            track_id: 0,
            node_index: 0,
        };
        stranded.delayed_rounds = 1;
        let trains = vec![stranded];
        let score = calculate_round_score(&trains, &trains, &[], &setting);
        assert_eq!(score.train_scores[0].track_stop_score, -1500);
        assert_eq!(score.train_scores[0].delay_score, -150);
        assert_eq!(score.total, -1650);
    }

    #[test]
    fn trapped_at_a_station_avoids_the_stranding_penalty() {
        let setting = default_setting();
        let mut trapped = train(0, 30);
        trapped.status = TrainStatus::Trapped;
        trapped.delayed_rounds = 1;
        let trains = vec![trapped];
        let score = calculate_round_score(&trains, &trains, &[], &setting);
        assert_eq!(score.train_scores[0].track_stop_score, 0);
    }

    #[test]
    fn per_train_totals_sum_to_the_round_total() {
        let setting = default_setting();
        let mut a = train(0, 40);
        a.delayed_rounds = 1;
        let b = train(1, 25);
        let trains = vec![a, b];
        let score = calculate_round_score(&trains, &trains, &[], &setting);
        let summed: i64 = score.train_scores.iter().map(|s| s.total).sum();
        assert_eq!(score.total, summed);
        assert_eq!(score.total, -200 + 125);
    }
}
