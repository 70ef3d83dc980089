use crate::rng::Rng;
use crate::types::{Direction, Located, Station, Track, TrackNode, Train, TrainStatus};

/// Static metro layout: two west-east lines crossing two north-south lines.
/// Transfer stations of crossing lines are distinct station records sharing
/// the same coordinates, which is how flood water jumps between lines.
#[derive(Clone, Debug)]
pub struct MetroNetwork {
    pub stations: Vec<Station>,
    pub tracks: Vec<Track>,
    pub trains: Vec<Train>,
}

pub fn build_network(failure_point_count: usize, rng: &mut Rng) -> MetroNetwork {
    let mut stations = build_stations();
    let mut tracks = build_tracks(&stations);
    initialize_failure_points(&mut stations, &mut tracks, failure_point_count, rng);
    MetroNetwork {
        stations,
        tracks,
        trains: build_trains(),
    }
}

fn station(
    id: u32,
    name: &str,
    x: i32,
    y: i32,
    passengers: i32,
    is_transfer: bool,
    connected: Vec<u32>,
    elevation: f32,
) -> Station {
    Station {
        id,
        name: name.to_string(),
        x,
        y,
        passengers,
        is_transfer,
        connected,
        flood_level: 0.0,
        previous_flood_level: 0.0,
        increase_in_this_round: 0.0,
        is_failure_point: false,
        elevation,
        has_pump: true,
        pump_threshold: 10.0,
        pump_rate: 3.0,
        pump_used: false,
        last_increase: None,
    }
}

fn build_stations() -> Vec<Station> {
    vec![
        // West-east line 1 (north)
        station(0, "H1-West", 100, 200, 30, false, vec![1], 5.0),
        station(1, "H1-WestXfer", 200, 200, 40, true, vec![0, 2], 4.0),
        station(2, "H1-EastXfer", 300, 200, 40, true, vec![1, 3], 4.0),
        station(3, "H1-East", 400, 200, 30, false, vec![2], 3.0),
        // West-east line 2 (south)
        station(4, "H2-West", 100, 300, 30, false, vec![5], 3.0),
        station(5, "H2-WestXfer", 200, 300, 40, true, vec![4, 6], 2.0),
        station(6, "H2-EastXfer", 300, 300, 40, true, vec![5, 7], 2.0),
        station(7, "H2-East", 400, 300, 30, false, vec![6], 1.0),
        // North-south line 3 (west)
        station(8, "V1-North", 200, 100, 30, false, vec![9], 5.0),
        station(9, "V1-NorthXfer", 200, 200, 40, true, vec![8, 10], 4.0),
        station(10, "V1-SouthXfer", 200, 300, 40, true, vec![9, 11], 2.0),
        station(11, "V1-South", 200, 400, 30, false, vec![10], 1.0),
        // North-south line 4 (east)
        station(12, "V2-North", 300, 100, 30, false, vec![13], 5.0),
        station(13, "V2-NorthXfer", 300, 200, 40, true, vec![12, 14], 4.0),
        station(14, "V2-SouthXfer", 300, 300, 40, true, vec![13, 15], 2.0),
        station(15, "V2-South", 300, 400, 30, false, vec![14], 1.0),
    ]
}

fn build_tracks(stations: &[Station]) -> Vec<Track> {
    let segments: &[(u32, u32, u32, u32, u32, &str, i32, i32)] = &[
        // (track id, line id, station a, station b, node id, node name, x, y)
        (0, 1, 0, 1, 100, "H1-1", 150, 200),
        (1, 1, 1, 2, 101, "H1-2", 250, 200),
        (2, 1, 2, 3, 102, "H1-3", 350, 200),
        (3, 2, 4, 5, 103, "H2-1", 150, 300),
        (4, 2, 5, 6, 104, "H2-2", 250, 300),
        (5, 2, 6, 7, 105, "H2-3", 350, 300),
        (6, 3, 8, 9, 106, "V1-1", 200, 150),
        (7, 3, 9, 10, 107, "V1-2", 200, 250),
        (8, 3, 10, 11, 108, "V1-3", 200, 350),
        (9, 4, 12, 13, 109, "V2-1", 300, 150),
        (10, 4, 13, 14, 110, "V2-2", 300, 250),
        (11, 4, 14, 15, 111, "V2-3", 300, 350),
    ];

    segments
        .iter()
        .map(
            |&(id, line_id, station_a, station_b, node_id, node_name, x, y)| Track {
                id,
                line_id,
                station_a,
                station_b,
                nodes: vec![TrackNode {
                    id: node_id,
                    name: node_name.to_string(),
                    x,
                    y,
                    elevation: midpoint_elevation(stations, station_a, station_b),
                    flood_level: 0.0,
                    previous_flood_level: 0.0,
                    increase_in_this_round: 0.0,
                    is_failure_point: false,
                    last_increase: None,
                }],
            },
        )
        .collect()
}

fn midpoint_elevation(stations: &[Station], station_a: u32, station_b: u32) -> f32 {
    let elevation_of = |id: u32| {
        stations
            .iter()
            .find(|station| station.id == id)
            .map(|station| station.elevation)
    };
    match (elevation_of(station_a), elevation_of(station_b)) {
        (Some(a), Some(b)) => (a + b) / 2.0,
        _ => 3.0,
    }
}

fn build_trains() -> Vec<Train> {
    let seeds: &[(u32, u32, i32, Direction, u32)] = &[
        // (train id, start station, passengers, direction, line id)
        (0, 0, 50, Direction::Forward, 1),
        (1, 3, 40, Direction::Backward, 1),
        (2, 4, 45, Direction::Forward, 2),
        (3, 7, 35, Direction::Backward, 2),
        (4, 8, 35, Direction::Forward, 3),
        (5, 11, 45, Direction::Backward, 3),
        (6, 12, 40, Direction::Forward, 4),
        (7, 15, 30, Direction::Backward, 4),
    ];

    seeds
        .iter()
        .map(|&(id, station_id, passengers, direction, line_id)| Train {
            id,
            located: Located::AtStation(station_id),
            capacity: 100,
            passengers,
            direction,
            status: TrainStatus::Running,
            line_id,
            delayed_rounds: 0,
            last_move_round: 0,
        })
        .collect()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CandidateKind {
    Station,
    TrackNode,
}

/// Marks `count` randomly chosen nodes (stations or track nodes) as failure
/// points and zeroes all flood state.
pub fn initialize_failure_points(
    stations: &mut [Station],
    tracks: &mut [Track],
    count: usize,
    rng: &mut Rng,
) {
    let mut candidates: Vec<(CandidateKind, u32)> = stations
        .iter()
        .map(|station| (CandidateKind::Station, station.id))
        .chain(
            tracks
                .iter()
                .flat_map(|track| track.nodes.iter())
                .map(|node| (CandidateKind::TrackNode, node.id)),
        )
        .collect();

    // Fisher-Yates, driven by the session rng so layouts are reproducible.
    for i in (1..candidates.len()).rev() {
        let j = rng.int(0, i as i32) as usize;
        candidates.swap(i, j);
    }
    let chosen = &candidates[..count.min(candidates.len())];

    for station in stations.iter_mut() {
        station.flood_level = 0.0;
        station.previous_flood_level = 0.0;
        station.increase_in_this_round = 0.0;
        station.last_increase = None;
        station.is_failure_point = chosen
            .iter()
            .any(|&(kind, id)| kind == CandidateKind::Station && id == station.id);
    }
    for track in tracks.iter_mut() {
        for node in &mut track.nodes {
            node.flood_level = 0.0;
            node.previous_flood_level = 0.0;
            node.increase_in_this_round = 0.0;
            node.last_increase = None;
            node.is_failure_point = chosen
                .iter()
                .any(|&(kind, id)| kind == CandidateKind::TrackNode && id == node.id);
        }
    }
}
