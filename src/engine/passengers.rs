use crate::rng::Rng;
use crate::types::{GameSetting, Located, Station, Train, TrainStatus};

/// Passenger exchange at stations, run after movement and flooding. Trapped
/// trains and trains standing in water deep enough to trap them exchange
/// nothing; an evacuated train empties onto the platform instead of trading.
/// A train whose exchange is blocked is removed from the round's evacuation
/// list, so a dispatcher is never charged for a transfer that did not
/// happen.
pub(crate) fn exchange_passengers(
    trains: &mut [Train],
    stations: &mut [Station],
    evacuated_train_ids: &mut Vec<u32>,
    setting: &GameSetting,
    rng: &mut Rng,
) {
    for train in trains.iter_mut() {
        if exchange_for_train(train, stations, evacuated_train_ids, setting, rng) {
            continue;
        }
        evacuated_train_ids.retain(|id| *id != train.id);
    }
}

// Returns whether the train exchanged (or evacuated) this round.
fn exchange_for_train(
    train: &mut Train,
    stations: &mut [Station],
    evacuated_train_ids: &[u32],
    setting: &GameSetting,
    rng: &mut Rng,
) -> bool {
    if train.status == TrainStatus::Trapped {
        return false;
    }
    let Located::AtStation(station_id) = train.located else {
        return false;
    };
    let Some(station) = stations.iter_mut().find(|s| s.id == station_id) else {
        return false;
    };
    if station.flood_level > setting.trapped_threshold {
        return false;
    }

    if evacuated_train_ids.contains(&train.id) {
        station.passengers += train.passengers;
        train.passengers = 0;
        return true;
    }

    let off_ratio = rng.range_f32(
        setting.get_on_and_off_ratio_min,
        setting.get_on_and_off_ratio_max,
    );
    let on_ratio = rng.range_f32(
        setting.get_on_and_off_ratio_min,
        setting.get_on_and_off_ratio_max,
    );

    let alighting = (train.passengers as f32 * off_ratio).floor() as i32;
    train.passengers -= alighting;
    station.passengers += alighting;

    let wanting_on = (station.passengers as f32 * on_ratio).floor() as i32;
    let boarding = wanting_on.min(train.capacity - train.passengers).max(0);
    station.passengers -= boarding;
    train.passengers += boarding;
    true
}
