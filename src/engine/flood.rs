use std::f32::consts::PI;

use crate::constants::MAX_FLOOD_LEVEL;
use crate::rng::Rng;
use crate::types::{GameSetting, Station, Track};

/// Per-round inflow at a failure point, drawn from a log-normal distribution
/// whose mode sits at `base_mode`. Sigma is redrawn every time so some rounds
/// trickle and some rounds surge. Rounded to one decimal, capped at the
/// absolute flood ceiling.
pub(crate) fn draw_flood_increase(setting: &GameSetting, rng: &mut Rng) -> f32 {
    let sigma = rng.range_f32(
        setting.flood_increase_sigma_min,
        setting.flood_increase_sigma_max,
    );
    let mu = setting.flood_increase_base_mode.ln() + sigma * sigma;

    // Box-Muller transform on two uniform draws.
    let u1 = rng.next_f32().max(1e-7);
    let u2 = rng.next_f32();
    let standard_normal = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();

    let increase = (mu + sigma * standard_normal).exp();
    ((increase * 10.0).round() / 10.0).min(MAX_FLOOD_LEVEL)
}

/// Amount that leaks from a flooded element to a drier neighbor this round,
/// or `None` when no transfer fires. Water only moves from a source at or
/// above the propagation threshold toward a strictly lower level, scaled up
/// when the source sits higher than the target.
fn propagation_amount(
    source_level: f32,
    target_level: f32,
    source_elevation: f32,
    target_elevation: f32,
    setting: &GameSetting,
) -> Option<f32> {
    if source_level < setting.propagation_threshold || source_level <= target_level {
        return None;
    }
    let elevation_boost =
        1.0 + setting.elevation_difference_factor * (source_elevation - target_elevation);
    let amount = (setting.flood_difference_factor * (source_level - target_level) * elevation_boost)
        .ceil()
        .min(setting.propagation_flood_increase);
    let applied = (target_level + amount).min(MAX_FLOOD_LEVEL) - target_level;
    if applied > 0.0 {
        Some(applied)
    } else {
        None
    }
}

/// One full flood step: snapshot, pump drainage, failure-point inflow, then a
/// single propagation pass over neighboring elements.
pub(crate) fn update_flood_levels(
    stations: &mut [Station],
    tracks: &mut [Track],
    setting: &GameSetting,
    rng: &mut Rng,
) {
    for station in stations.iter_mut() {
        station.previous_flood_level = station.flood_level;
        station.pump_used = false;
        if station.has_pump && station.flood_level >= station.pump_threshold {
            station.flood_level = (station.flood_level - station.pump_rate).max(0.0);
            station.pump_used = true;
        }
        if station.is_failure_point {
            let increase = draw_flood_increase(setting, rng);
            station.flood_level = (station.flood_level + increase).min(MAX_FLOOD_LEVEL);
            station.last_increase = Some(increase);
        } else {
            station.last_increase = None;
        }
        station.increase_in_this_round = station.flood_level - station.previous_flood_level;
    }

    for track in tracks.iter_mut() {
        for node in &mut track.nodes {
            node.previous_flood_level = node.flood_level;
            if node.is_failure_point {
                let increase = draw_flood_increase(setting, rng);
                node.flood_level = (node.flood_level + increase).min(MAX_FLOOD_LEVEL);
                node.last_increase = Some(increase);
                node.increase_in_this_round = node.flood_level - node.previous_flood_level;
            } else {
                node.last_increase = None;
                node.increase_in_this_round = 0.0;
            }
        }
    }

    propagate_between_transfer_stations(stations, setting);
    propagate_stations_to_tracks(stations, tracks, setting);
    propagate_along_tracks(tracks, setting);
    propagate_tracks_to_stations(stations, tracks, setting);
}

// Water crosses between transfer stations that share the same map position.
fn propagate_between_transfer_stations(stations: &mut [Station], setting: &GameSetting) {
    for source_index in 0..stations.len() {
        if !stations[source_index].is_transfer {
            continue;
        }
        let (source_id, source_level, source_elevation, x, y) = {
            let source = &stations[source_index];
            (source.id, source.flood_level, source.elevation, source.x, source.y)
        };
        for target_index in 0..stations.len() {
            let target = &stations[target_index];
            if target.id == source_id || !target.is_transfer || target.x != x || target.y != y {
                continue;
            }
            if let Some(applied) = propagation_amount(
                source_level,
                target.flood_level,
                source_elevation,
                target.elevation,
                setting,
            ) {
                let target = &mut stations[target_index];
                target.flood_level += applied;
                target.increase_in_this_round += applied;
            }
        }
    }
}

// A station floods into the nearest node of each track that touches it.
fn propagate_stations_to_tracks(
    stations: &[Station],
    tracks: &mut [Track],
    setting: &GameSetting,
) {
    for station in stations {
        for track in tracks.iter_mut() {
            let node_index = if track.station_a == station.id {
                0
            } else if track.station_b == station.id {
                track.nodes.len().saturating_sub(1)
            } else {
                continue;
            };
            let Some(node) = track.nodes.get_mut(node_index) else {
                continue;
            };
            if let Some(applied) = propagation_amount(
                station.flood_level,
                node.flood_level,
                station.elevation,
                node.elevation,
                setting,
            ) {
                node.flood_level += applied;
                node.increase_in_this_round += applied;
            }
        }
    }
}

// Adjacent nodes of the same track exchange water.
fn propagate_along_tracks(tracks: &mut [Track], setting: &GameSetting) {
    for track in tracks.iter_mut() {
        for source_index in 0..track.nodes.len() {
            for offset in [-1i32, 1] {
                let target_index = source_index as i32 + offset;
                if target_index < 0 || target_index as usize >= track.nodes.len() {
                    continue;
                }
                let source = &track.nodes[source_index];
                let (source_level, source_elevation) = (source.flood_level, source.elevation);
                let target = &track.nodes[target_index as usize];
                if let Some(applied) = propagation_amount(
                    source_level,
                    target.flood_level,
                    source_elevation,
                    target.elevation,
                    setting,
                ) {
                    let target = &mut track.nodes[target_index as usize];
                    target.flood_level += applied;
                    target.increase_in_this_round += applied;
                }
            }
        }
    }
}

// The end node of a track floods back into the station it touches.
fn propagate_tracks_to_stations(
    stations: &mut [Station],
    tracks: &[Track],
    setting: &GameSetting,
) {
    for track in tracks {
        for (endpoint_station, node_index) in [
            (track.station_a, 0),
            (track.station_b, track.nodes.len().saturating_sub(1)),
        ] {
            let Some(node) = track.nodes.get(node_index) else {
                continue;
            };
            let Some(station) = stations.iter_mut().find(|s| s.id == endpoint_station) else {
                continue;
            };
            if let Some(applied) = propagation_amount(
                node.flood_level,
                station.flood_level,
                node.elevation,
                station.elevation,
                setting,
            ) {
                station.flood_level += applied;
                station.increase_in_this_round += applied;
            }
        }
    }
}
