use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::info;
use nalgebra::Vector3;
use ned_core::{GeodeticPoint, LocalPoint};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::track::{Sample, Tracks};

/// Output encoding for exported series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Csv,
    Json,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Format::Csv),
            "json" => Ok(Format::Json),
            other => Err(format!("unknown format {other:?} (expected csv or json)")),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Csv => f.write_str("csv"),
            Format::Json => f.write_str("json"),
        }
    }
}

#[derive(Debug, Serialize)]
struct NedRow {
    time: f64,
    north: f64,
    east: f64,
    down: f64,
}

#[derive(Debug, Serialize)]
struct GeodeticRow {
    time: f64,
    lon: f64,
    lat: f64,
    alt: f64,
}

#[derive(Debug, Serialize)]
struct VelocityRow {
    time: f64,
    vn: f64,
    ve: f64,
    vd: f64,
}

impl From<&Sample<LocalPoint>> for NedRow {
    fn from(s: &Sample<LocalPoint>) -> Self {
        Self {
            time: s.time,
            north: s.value.north,
            east: s.value.east,
            down: s.value.down,
        }
    }
}

impl From<&Sample<GeodeticPoint>> for GeodeticRow {
    fn from(s: &Sample<GeodeticPoint>) -> Self {
        Self {
            time: s.time,
            lon: s.value.lon,
            lat: s.value.lat,
            alt: s.value.alt,
        }
    }
}

impl From<&Sample<Vector3<f64>>> for VelocityRow {
    fn from(s: &Sample<Vector3<f64>>) -> Self {
        Self {
            time: s.time,
            vn: s.value.x,
            ve: s.value.y,
            vd: s.value.z,
        }
    }
}

#[derive(Debug, Serialize)]
struct TracksDocument {
    home: Option<GeodeticPoint>,
    global_position: Vec<GeodeticRow>,
    global_ned: Vec<NedRow>,
    local_position: Vec<NedRow>,
    local_velocity: Vec<VelocityRow>,
    local_geodetic: Vec<GeodeticRow>,
}

// Header is written explicitly so empty series still get one
fn write_rows<W, S, I>(writer: W, header: [&str; 4], rows: I) -> Result<()>
where
    W: Write,
    S: Serialize,
    I: IntoIterator<Item = S>,
{
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(header)?;
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_ned_csv<W: Write>(writer: W, samples: &[Sample<LocalPoint>]) -> Result<()> {
    write_rows(
        writer,
        ["time", "north", "east", "down"],
        samples.iter().map(NedRow::from),
    )
}

pub fn write_geodetic_csv<W: Write>(writer: W, samples: &[Sample<GeodeticPoint>]) -> Result<()> {
    write_rows(
        writer,
        ["time", "lon", "lat", "alt"],
        samples.iter().map(GeodeticRow::from),
    )
}

pub fn write_velocity_csv<W: Write>(writer: W, samples: &[Sample<Vector3<f64>>]) -> Result<()> {
    write_rows(
        writer,
        ["time", "vn", "ve", "vd"],
        samples.iter().map(VelocityRow::from),
    )
}

/// Write all series as one JSON document
pub fn write_json<W: Write>(writer: W, tracks: &Tracks) -> Result<()> {
    let document = TracksDocument {
        home: tracks.home.map(|h| h.point()),
        global_position: tracks.global_position.iter().map(GeodeticRow::from).collect(),
        global_ned: tracks.global_ned.iter().map(NedRow::from).collect(),
        local_position: tracks.local_position.iter().map(NedRow::from).collect(),
        local_velocity: tracks.local_velocity.iter().map(VelocityRow::from).collect(),
        local_geodetic: tracks.local_geodetic.iter().map(GeodeticRow::from).collect(),
    };
    serde_json::to_writer_pretty(writer, &document)?;
    Ok(())
}

/// Write every series under `dir`, returning the files written
pub fn export_tracks(tracks: &Tracks, dir: &Path, format: Format) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    match format {
        Format::Csv => {
            let path = dir.join("global_position.csv");
            write_geodetic_csv(create(&path)?, &tracks.global_position)?;
            written.push(path);

            let path = dir.join("global_ned.csv");
            write_ned_csv(create(&path)?, &tracks.global_ned)?;
            written.push(path);

            let path = dir.join("local_position.csv");
            write_ned_csv(create(&path)?, &tracks.local_position)?;
            written.push(path);

            let path = dir.join("local_velocity.csv");
            write_velocity_csv(create(&path)?, &tracks.local_velocity)?;
            written.push(path);

            let path = dir.join("local_geodetic.csv");
            write_geodetic_csv(create(&path)?, &tracks.local_geodetic)?;
            written.push(path);
        }
        Format::Json => {
            let path = dir.join("tracks.json");
            let mut writer = create(&path)?;
            write_json(&mut writer, tracks)?;
            writer.flush()?;
            written.push(path);
        }
    }

    for path in &written {
        info!("wrote {}", path.display());
    }
    Ok(written)
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}
