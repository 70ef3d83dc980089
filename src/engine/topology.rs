use thiserror::Error;

use crate::types::{Located, LocationKind, Station, Track, Train, TrainLocation};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("line {0} has no resolvable start point")]
    NoStartPoint(u32),
}

/// Walks one line end to end and returns every station and track node in
/// order, each stamped with its ordinal position. Recomputed on every call;
/// the topology never changes after init and the walk is cheap relative to
/// the round cadence.
pub fn resolve_line_sequence(
    track: &Track,
    stations: &[Station],
    tracks: &[Track],
) -> Result<Vec<TrainLocation>, TopologyError> {
    let line_id = track.line_id;
    let line_tracks: Vec<&Track> = tracks.iter().filter(|t| t.line_id == line_id).collect();

    let endpoints: Vec<u32> = line_tracks
        .iter()
        .flat_map(|t| [t.station_a, t.station_b])
        .collect();
    // A terminus shows up as the endpoint of exactly one track of the line.
    let termini: Vec<u32> = endpoints
        .iter()
        .copied()
        .filter(|id| endpoints.iter().filter(|other| *other == id).count() == 1)
        .collect();

    let start_station_id = if termini.is_empty() {
        let smallest = endpoints
            .iter()
            .copied()
            .min()
            .ok_or(TopologyError::NoStartPoint(line_id))?;
        eprintln!(
            "[topology] line {line_id} is a closed loop; starting the walk at station {smallest}"
        );
        smallest
    } else {
        termini
            .iter()
            .copied()
            .find(|id| line_tracks.iter().any(|t| t.station_a == *id))
            .ok_or(TopologyError::NoStartPoint(line_id))?
    };

    // Orderly walk: station, then the connecting track's nodes oriented away
    // from that station, then the next station, until the line is exhausted.
    let mut visited: Vec<u32> = Vec::new();
    let mut sequence: Vec<(u32, &Track)> = Vec::new();
    let mut current_station_id = start_station_id;
    loop {
        let next_track = line_tracks.iter().find(|t| {
            (t.station_a == current_station_id || t.station_b == current_station_id)
                && !visited.contains(&t.id)
        });
        let Some(next_track) = next_track else {
            break;
        };
        visited.push(next_track.id);
        sequence.push((current_station_id, next_track));
        current_station_id = if next_track.station_a == current_station_id {
            next_track.station_b
        } else {
            next_track.station_a
        };
    }

    let mut locations = Vec::new();
    let mut index_in_line = 0usize;
    let mut push = |kind: LocationKind, id: u32, name: &str, index: &mut usize| {
        locations.push(TrainLocation {
            kind,
            id,
            name: name.to_string(),
            index_in_line: *index,
        });
        *index += 1;
    };

    for (station_id, walked_track) in &sequence {
        let Some(station) = stations.iter().find(|s| s.id == *station_id) else {
            continue;
        };
        push(
            LocationKind::Station,
            station.id,
            &station.name,
            &mut index_in_line,
        );

        if walked_track.station_a == station.id {
            for node in &walked_track.nodes {
                push(LocationKind::Track, node.id, &node.name, &mut index_in_line);
            }
        } else {
            for node in walked_track.nodes.iter().rev() {
                push(LocationKind::Track, node.id, &node.name, &mut index_in_line);
            }
        }
    }

    let last_station = stations
        .iter()
        .find(|s| s.id == current_station_id)
        .ok_or(TopologyError::NoStartPoint(line_id))?;
    push(
        LocationKind::Station,
        last_station.id,
        &last_station.name,
        &mut index_in_line,
    );

    Ok(locations)
}

/// Resolves a train's stored station/track reference into its position along
/// the line. `None` means the reference matches no known topology element,
/// which is a data-consistency problem: callers skip the train for the round
/// instead of crashing.
pub fn train_location(
    train: &Train,
    stations: &[Station],
    tracks: &[Track],
) -> Option<TrainLocation> {
    match train.located {
        Located::AtStation(station_id) => {
            let track = tracks
                .iter()
                .find(|t| t.station_a == station_id || t.station_b == station_id)?;
            let sequence = resolve_line_sequence(track, stations, tracks).ok()?;
            sequence
                .into_iter()
                .find(|entry| entry.kind == LocationKind::Station && entry.id == station_id)
        }
        Located::OnTrack {
            track_id,
            node_index,
        } => {
            let track = tracks.iter().find(|t| t.id == track_id)?;
            let node = track.nodes.get(node_index)?;
            let sequence = resolve_line_sequence(track, stations, tracks).ok()?;
            sequence
                .into_iter()
                .find(|entry| entry.kind == LocationKind::Track && entry.id == node.id)
        }
    }
}
