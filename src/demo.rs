//! Seeded demo atlas.
//!
//! Random-walk trails clustered around a handful of cities, three anchors, and
//! a short bookmark list. The same seed always yields the same atlas.

#[cfg(test)]
#[path = "demo_test.rs"]
mod tests;

use canvas::geo::{Anchor, GeoPoint, Trail, TrailKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::state::{Atlas, Bookmark};

/// One cluster of similar trails.
struct Cluster {
    slug: &'static str,
    kind: TrailKind,
    name: &'static str,
    date: &'static str,
    center: [f64; 2],
    count: usize,
    steps: usize,
    step_deg: f64,
}

const SAN_FRANCISCO: [f64; 2] = [-122.4194, 37.7749];
const NEW_YORK: [f64; 2] = [-74.0060, 40.7128];
const LONDON: [f64; 2] = [-0.1276, 51.5074];
const TOKYO: [f64; 2] = [139.6917, 35.6895];
const SYDNEY: [f64; 2] = [151.2093, -33.8688];

const CLUSTERS: &[Cluster] = &[
    Cluster { slug: "run-sf", kind: TrailKind::Run, name: "Morning Run in SF", date: "2023-10-01", center: SAN_FRANCISCO, count: 40, steps: 100, step_deg: 0.002 },
    Cluster { slug: "ride-sf", kind: TrailKind::Ride, name: "Marin Headlands Ride", date: "2023-09-15", center: SAN_FRANCISCO, count: 25, steps: 300, step_deg: 0.006 },
    Cluster { slug: "run-nyc", kind: TrailKind::Run, name: "Central Park Loop", date: "2023-11-02", center: NEW_YORK, count: 35, steps: 120, step_deg: 0.002 },
    Cluster { slug: "hike-ldn", kind: TrailKind::Hike, name: "Hampstead Heath Walk", date: "2023-08-20", center: LONDON, count: 20, steps: 80, step_deg: 0.003 },
    Cluster { slug: "ride-tokyo", kind: TrailKind::Ride, name: "Tokyo Cycling", date: "2023-05-10", center: TOKYO, count: 30, steps: 250, step_deg: 0.004 },
    Cluster { slug: "run-syd", kind: TrailKind::Run, name: "Sydney Harbour Run", date: "2023-12-05", center: SYDNEY, count: 15, steps: 90, step_deg: 0.002 },
];

#[must_use]
pub fn generate(seed: u64) -> Atlas {
    let mut rng = StdRng::seed_from_u64(seed);
    let trails = CLUSTERS
        .iter()
        .flat_map(|cluster| (0..cluster.count).map(move |i| (cluster, i)))
        .map(|(cluster, i)| Trail {
            id: format!("{}-{i}", cluster.slug),
            kind: cluster.kind,
            name: format!("{} #{}", cluster.name, i + 1),
            date: cluster.date.to_owned(),
            distance_km: None,
            points: random_walk(&mut rng, cluster.center.into(), cluster.steps, cluster.step_deg),
        })
        .map(with_distance)
        .collect();

    Atlas { trails, anchors: anchors(), bookmarks: bookmarks() }
}

/// A path of `steps + 1` points starting at `start`, each step uniform in
/// `[-step_deg / 2, step_deg / 2)` per axis.
fn random_walk(rng: &mut StdRng, start: GeoPoint, steps: usize, step_deg: f64) -> Vec<GeoPoint> {
    let half = step_deg / 2.0;
    let mut at = start;
    let mut points = Vec::with_capacity(steps + 1);
    points.push(at);
    for _ in 0..steps {
        at = GeoPoint::new(at.lon + rng.random_range(-half..half), at.lat + rng.random_range(-half..half));
        points.push(at);
    }
    points
}

fn with_distance(mut trail: Trail) -> Trail {
    let km: f64 = trail
        .points
        .windows(2)
        .map(|w| canvas::geo::haversine_km(w[0], w[1]))
        .sum();
    trail.distance_km = Some((km * 100.0).round() / 100.0);
    trail
}

fn anchors() -> Vec<Anchor> {
    vec![
        Anchor {
            id: "anchor-1".into(),
            location: GeoPoint::new(-122.4783, 37.8199),
            title: "Golden Gate Bridge".into(),
            location_name: Some("San Francisco, CA".into()),
            date: "2023-10-15".into(),
            note: "Foggy morning run across the bridge, stopping halfway to watch a container ship pass underneath.".into(),
            image_url: None,
        },
        Anchor {
            id: "anchor-2".into(),
            location: GeoPoint::new(139.6917, 35.6895),
            title: "Neon Nights".into(),
            location_name: Some("Shinjuku, Tokyo".into()),
            date: "2023-05-12".into(),
            note: "Cycling through the neon-lit streets after midnight.".into(),
            image_url: None,
        },
        Anchor {
            id: "anchor-3".into(),
            location: GeoPoint::new(-0.1276, 51.5074),
            title: "Thames Path".into(),
            location_name: Some("London, UK".into()),
            date: "2023-08-22".into(),
            note: "A slow walk along the river with a coffee near Tate Modern.".into(),
            image_url: None,
        },
    ]
}

fn bookmarks() -> Vec<Bookmark> {
    [
        ("Calendar", "https://calendar.google.com"),
        ("Gmail", "https://mail.google.com"),
        ("GitHub", "https://github.com"),
        ("YouTube", "https://youtube.com"),
        ("Strava", "https://strava.com"),
    ]
    .into_iter()
    .map(|(title, url)| Bookmark { title: title.into(), url: url.into(), icon: None })
    .collect()
}
