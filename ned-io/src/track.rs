//! Assembly of position tracks from a stream of records
//!
//! The first `GLOBAL_HOME` record fixes the [`HomeAnchor`] for the whole
//! log. Positions that need the anchor but arrive before it are either
//! dropped or held back, depending on [`HomePolicy`].

use std::fmt;
use std::str::FromStr;

use log::{debug, info, warn};
use nalgebra::Vector3;
use ned_core::{FrameConverter, GeodeticPoint, HomeAnchor, LocalPoint, NedError};
use serde::{Deserialize, Serialize};

use crate::error::{IoError, ParseError, Result, TrackError};
use crate::record::Record;

/// What to do with positions seen before the home anchor is known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HomePolicy {
    /// Drop them
    #[default]
    Discard,
    /// Hold them and convert once the anchor arrives
    Buffer,
}

impl FromStr for HomePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "discard" => Ok(HomePolicy::Discard),
            "buffer" => Ok(HomePolicy::Buffer),
            other => Err(format!("unknown home policy {other:?} (expected discard or buffer)")),
        }
    }
}

impl fmt::Display for HomePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HomePolicy::Discard => f.write_str("discard"),
            HomePolicy::Buffer => f.write_str("buffer"),
        }
    }
}

/// A timestamped value from the log
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<T> {
    pub time: f64,
    pub value: T,
}

impl<T> Sample<T> {
    pub fn new(time: f64, value: T) -> Self {
        Self { time, value }
    }
}

/// Series extracted from one log, each in arrival order
#[derive(Debug, Clone, Default)]
pub struct Tracks {
    pub home: Option<HomeAnchor>,
    /// GLOBAL_POSITION as logged, including fixes before the home
    pub global_position: Vec<Sample<GeodeticPoint>>,
    /// GLOBAL_POSITION converted to north/east/down
    pub global_ned: Vec<Sample<LocalPoint>>,
    /// LOCAL_POSITION as logged
    pub local_position: Vec<Sample<LocalPoint>>,
    /// LOCAL_VELOCITY as logged, north/east/down
    pub local_velocity: Vec<Sample<Vector3<f64>>>,
    /// LOCAL_POSITION converted back to geodetic
    pub local_geodetic: Vec<Sample<GeodeticPoint>>,
    /// Conversions dropped because no home was known yet
    pub discarded: usize,
    /// Malformed lines and rejected values skipped in lenient mode
    pub skipped: usize,
}

/// Routes records into [`Tracks`]
///
/// In strict mode the first malformed line or rejected value is an error;
/// otherwise it is logged and counted in [`Tracks::skipped`].
#[derive(Debug)]
pub struct TrackAssembler {
    policy: HomePolicy,
    strict: bool,
    converter: Option<FrameConverter>,
    pending_global: Vec<Sample<GeodeticPoint>>,
    pending_local: Vec<Sample<LocalPoint>>,
    tracks: Tracks,
}

impl TrackAssembler {
    pub fn new(policy: HomePolicy, strict: bool) -> Self {
        Self {
            policy,
            strict,
            converter: None,
            pending_global: Vec::new(),
            pending_local: Vec::new(),
            tracks: Tracks::default(),
        }
    }

    pub fn push(&mut self, record: Record) -> Result<()> {
        match record {
            Record::GlobalHome { point, .. } => self.set_home(point),
            Record::GlobalPosition { time, point } => {
                let sample = Sample::new(time, point);
                self.tracks.global_position.push(sample);
                match self.converter {
                    Some(converter) => self.convert_global(&converter, sample),
                    None => {
                        self.hold(|pending| pending.pending_global.push(sample));
                        Ok(())
                    }
                }
            }
            Record::LocalPosition { time, point } => {
                let sample = Sample::new(time, point);
                self.tracks.local_position.push(sample);
                match self.converter {
                    Some(converter) => self.convert_local(&converter, sample),
                    None => {
                        self.hold(|pending| pending.pending_local.push(sample));
                        Ok(())
                    }
                }
            }
            Record::LocalVelocity { time, velocity } => {
                self.tracks.local_velocity.push(Sample::new(time, velocity));
                Ok(())
            }
            Record::Other { tag } => {
                debug!("skipping {tag} record");
                Ok(())
            }
        }
    }

    /// Handle a line the reader could not parse
    pub fn push_malformed(&mut self, error: ParseError) -> Result<()> {
        if self.strict {
            return Err(error.into());
        }
        warn!("skipping malformed record: {error}");
        self.tracks.skipped += 1;
        Ok(())
    }

    pub fn finish(self) -> Result<Tracks> {
        let pending = self.pending_global.len() + self.pending_local.len();
        if pending > 0 {
            return Err(TrackError::MissingHome { pending }.into());
        }

        let tracks = self.tracks;
        info!(
            "assembled tracks: {} global ({} converted), {} local, {} velocity, {} discarded, {} skipped",
            tracks.global_position.len(),
            tracks.global_ned.len(),
            tracks.local_position.len(),
            tracks.local_velocity.len(),
            tracks.discarded,
            tracks.skipped
        );
        Ok(tracks)
    }

    fn hold(&mut self, buffer: impl FnOnce(&mut Self)) {
        match self.policy {
            HomePolicy::Discard => self.tracks.discarded += 1,
            HomePolicy::Buffer => buffer(self),
        }
    }

    /// Anchor the frame at the first valid home record
    ///
    /// Unlike the original plotting script, where each GLOBAL_HOME line
    /// replaced the previous one, later home records never move the anchor,
    /// so every converted point shares one frame.
    fn set_home(&mut self, point: GeodeticPoint) -> Result<()> {
        if let Some(converter) = &self.converter {
            let current = converter.home().point();
            if current != point {
                warn!(
                    "ignoring home ({}, {}, {}), already anchored at ({}, {}, {})",
                    point.lon, point.lat, point.alt, current.lon, current.lat, current.alt
                );
            }
            return Ok(());
        }

        let home = match HomeAnchor::new(point) {
            Ok(home) => home,
            Err(e) => return self.reject(e),
        };
        info!("home anchored at ({}, {}, {})", point.lon, point.lat, point.alt);

        let converter = FrameConverter::new(home);
        self.converter = Some(converter);
        self.tracks.home = Some(home);

        self.drain_pending(&converter)
    }

    fn drain_pending(&mut self, converter: &FrameConverter) -> Result<()> {
        let globals = std::mem::take(&mut self.pending_global);
        let locals = std::mem::take(&mut self.pending_local);
        if !globals.is_empty() || !locals.is_empty() {
            debug!(
                "converting {} buffered global and {} buffered local positions",
                globals.len(),
                locals.len()
            );
        }

        if self.strict {
            let points: Vec<GeodeticPoint> = globals.iter().map(|s| s.value).collect();
            let converted = converter.to_local_batch(&points)?;
            self.tracks.global_ned.extend(
                globals
                    .iter()
                    .zip(converted)
                    .map(|(s, local)| Sample::new(s.time, local)),
            );

            let points: Vec<LocalPoint> = locals.iter().map(|s| s.value).collect();
            let converted = converter.to_global_batch(&points)?;
            self.tracks.local_geodetic.extend(
                locals
                    .iter()
                    .zip(converted)
                    .map(|(s, global)| Sample::new(s.time, global)),
            );
        } else {
            for sample in globals {
                self.convert_global(converter, sample)?;
            }
            for sample in locals {
                self.convert_local(converter, sample)?;
            }
        }

        Ok(())
    }

    fn convert_global(
        &mut self,
        converter: &FrameConverter,
        sample: Sample<GeodeticPoint>,
    ) -> Result<()> {
        match converter.to_local(sample.value) {
            Ok(local) => {
                self.tracks.global_ned.push(Sample::new(sample.time, local));
                Ok(())
            }
            Err(e) => self.reject(e),
        }
    }

    fn convert_local(&mut self, converter: &FrameConverter, sample: Sample<LocalPoint>) -> Result<()> {
        match converter.to_global(sample.value) {
            Ok(global) => {
                self.tracks.local_geodetic.push(Sample::new(sample.time, global));
                Ok(())
            }
            Err(e) => self.reject(e),
        }
    }

    fn reject(&mut self, error: NedError) -> Result<()> {
        if self.strict {
            return Err(error.into());
        }
        warn!("skipping record: {error}");
        self.tracks.skipped += 1;
        Ok(())
    }
}

/// Build tracks from a record stream such as a [`LogReader`](crate::LogReader)
pub fn assemble<I>(records: I, policy: HomePolicy, strict: bool) -> Result<Tracks>
where
    I: IntoIterator<Item = Result<Record>>,
{
    let mut assembler = TrackAssembler::new(policy, strict);
    for record in records {
        match record {
            Ok(record) => assembler.push(record)?,
            Err(IoError::Parse(e)) => assembler.push_malformed(e)?,
            Err(e) => return Err(e),
        }
    }
    assembler.finish()
}
