use std::fs::File;
use std::io::Write;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `[0, n)`.
    fn below(&mut self, n: u64) -> u64 {
        (self.next_f64() * n as f64) as u64
    }
}

struct Catalog {
    artist: &'static str,
    album: &'static str,
    tracks: &'static [&'static str],
    /// Relative listening weight; higher means more plays.
    weight: f64,
}

const CATALOG: &[Catalog] = &[
    Catalog {
        artist: "Nina Simone",
        album: "Pastel Blues",
        tracks: &["Sinnerman", "Trouble in Mind", "Ain't No Use"],
        weight: 5.0,
    },
    Catalog {
        artist: "Massive Attack",
        album: "Mezzanine",
        tracks: &["Angel", "Teardrop", "Inertia Creeps"],
        weight: 4.0,
    },
    Catalog {
        artist: "Boards of Canada",
        album: "Music Has the Right to Children",
        tracks: &["Roygbiv", "Aquarius", "Turquoise Hexagon Sun"],
        weight: 3.0,
    },
    Catalog {
        artist: "Khruangbin",
        album: "Con Todo El Mundo",
        tracks: &["Maria También", "August 10", "Evan Finds the Third Room"],
        weight: 2.0,
    },
    Catalog {
        artist: "Alice Coltrane",
        album: "Journey in Satchidananda",
        tracks: &["Journey in Satchidananda", "Shiva-Loka"],
        weight: 1.5,
    },
    Catalog {
        artist: "Portishead",
        album: "Dummy",
        tracks: &["Glory Box", "Roads", "Sour Times"],
        weight: 1.0,
    },
];

fn pick_artist(rng: &mut SimpleRng) -> &'static Catalog {
    let total: f64 = CATALOG.iter().map(|c| c.weight).sum();
    let mut roll = rng.next_f64() * total;
    for entry in CATALOG {
        if roll < entry.weight {
            return entry;
        }
        roll -= entry.weight;
    }
    &CATALOG[CATALOG.len() - 1]
}

fn main() {
    let mut rng = SimpleRng::new(42);

    // Eighteen months of listening; the first year in the legacy schema,
    // the rest in the extended schema, like a real pair of exports.
    let start = Utc.with_ymd_and_hms(2022, 7, 1, 0, 0, 0).unwrap();
    let split = Utc.with_ymd_and_hms(2023, 7, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let span_secs = (end - start).num_seconds() as u64;

    let mut events: Vec<(DateTime<Utc>, &'static Catalog, &'static str, u64)> = (0..1200)
        .map(|_| {
            let played_at = start + chrono::Duration::seconds(rng.below(span_secs) as i64);
            let entry = pick_artist(&mut rng);
            let track = entry.tracks[rng.below(entry.tracks.len() as u64) as usize];
            // Between 30 s and ~6 min.
            let ms_played = 30_000 + rng.below(330_000);
            (played_at, entry, track, ms_played)
        })
        .collect();
    events.sort_by_key(|&(ts, ..)| ts);

    let legacy: Vec<_> = events
        .iter()
        .filter(|&&(ts, ..)| ts < split)
        .map(|&(ts, entry, track, ms)| {
            json!({
                "endTime": ts.format("%Y-%m-%d %H:%M").to_string(),
                "artistName": entry.artist,
                "trackName": track,
                "msPlayed": ms,
            })
        })
        .collect();

    let extended: Vec<_> = events
        .iter()
        .filter(|&&(ts, ..)| ts >= split)
        .map(|&(ts, entry, track, ms)| {
            json!({
                "ts": ts.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
                "ms_played": ms,
                "master_metadata_track_name": track,
                "master_metadata_album_artist_name": entry.artist,
                "master_metadata_album_album_name": entry.album,
            })
        })
        .collect();

    let output_path = "sample_listening_history.zip";
    let file = File::create(output_path).expect("Failed to create output file");
    let mut writer = ZipWriter::new(file);

    let members = [
        ("MyData/StreamingHistory0.json", json!(legacy)),
        ("MyData/Streaming_History_Audio_2023.json", json!(extended)),
        // A decoy member the loader's pattern filter must skip.
        ("MyData/Playlist1.json", json!([{ "name": "on repeat" }])),
    ];
    for (name, body) in members {
        writer
            .start_file(name, SimpleFileOptions::default())
            .expect("Failed to start archive member");
        writer
            .write_all(serde_json::to_string_pretty(&body).unwrap().as_bytes())
            .expect("Failed to write archive member");
    }
    writer.finish().expect("Failed to close archive");

    println!(
        "Wrote {} legacy + {} extended play events to {output_path}",
        legacy.len(),
        extended.len()
    );
}
