//! Typed telemetry log records
//!
//! Lines look like `MsgID.GLOBAL_POSITION,<time>,<lon>,<lat>,<alt>`. Only
//! the kinds needed for position tracks are decoded; everything else is
//! kept as [`Record::Other`] with its raw tag.

use std::fmt;
use std::str::FromStr;

use nalgebra::Vector3;
use ned_core::{GeodeticPoint, LocalPoint};

use crate::error::{ParseError, ParseErrorKind};

const TAG_PREFIX: &str = "MsgID.";

// tag, time and three components
const POSITION_FIELDS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    GlobalPosition,
    GlobalHome,
    LocalPosition,
    LocalVelocity,
    Other,
}

impl RecordKind {
    /// Message name as it appears after the `MsgID.` prefix
    pub fn name(&self) -> Option<&'static str> {
        match self {
            RecordKind::GlobalPosition => Some("GLOBAL_POSITION"),
            RecordKind::GlobalHome => Some("GLOBAL_HOME"),
            RecordKind::LocalPosition => Some("LOCAL_POSITION"),
            RecordKind::LocalVelocity => Some("LOCAL_VELOCITY"),
            RecordKind::Other => None,
        }
    }
}

impl FromStr for RecordKind {
    type Err = ParseErrorKind;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let name = tag
            .strip_prefix(TAG_PREFIX)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ParseErrorKind::BadTag(tag.to_string()))?;

        Ok(match name {
            "GLOBAL_POSITION" => RecordKind::GlobalPosition,
            "GLOBAL_HOME" => RecordKind::GlobalHome,
            "LOCAL_POSITION" => RecordKind::LocalPosition,
            "LOCAL_VELOCITY" => RecordKind::LocalVelocity,
            _ => RecordKind::Other,
        })
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or("OTHER"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    GlobalPosition { time: f64, point: GeodeticPoint },
    GlobalHome { time: f64, point: GeodeticPoint },
    LocalPosition { time: f64, point: LocalPoint },
    LocalVelocity { time: f64, velocity: Vector3<f64> },
    Other { tag: String },
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::GlobalPosition { .. } => RecordKind::GlobalPosition,
            Record::GlobalHome { .. } => RecordKind::GlobalHome,
            Record::LocalPosition { .. } => RecordKind::LocalPosition,
            Record::LocalVelocity { .. } => RecordKind::LocalVelocity,
            Record::Other { .. } => RecordKind::Other,
        }
    }

    /// Parse one log line; `line` is the 1-based line number for errors
    pub fn parse(text: &str, line: usize) -> Result<Self, ParseError> {
        Self::parse_fields(text).map_err(|kind| ParseError { line, kind })
    }

    fn parse_fields(text: &str) -> Result<Self, ParseErrorKind> {
        let fields: Vec<&str> = text.trim().split(',').map(str::trim).collect();
        let tag = fields[0];
        let kind: RecordKind = tag.parse()?;

        if kind == RecordKind::Other {
            return Ok(Record::Other {
                tag: tag.to_string(),
            });
        }

        if fields.len() < POSITION_FIELDS {
            return Err(ParseErrorKind::TooFewFields {
                expected: POSITION_FIELDS,
                found: fields.len(),
            });
        }

        let time = parse_number(&fields, 1)?;
        let [x, y, z] = [
            parse_number(&fields, 2)?,
            parse_number(&fields, 3)?,
            parse_number(&fields, 4)?,
        ];

        Ok(match kind {
            RecordKind::GlobalPosition => Record::GlobalPosition {
                time,
                point: GeodeticPoint::new(x, y, z),
            },
            RecordKind::GlobalHome => Record::GlobalHome {
                time,
                point: GeodeticPoint::new(x, y, z),
            },
            RecordKind::LocalPosition => Record::LocalPosition {
                time,
                point: LocalPoint::new(x, y, z),
            },
            RecordKind::LocalVelocity => Record::LocalVelocity {
                time,
                velocity: Vector3::new(x, y, z),
            },
            RecordKind::Other => Record::Other {
                tag: tag.to_string(),
            },
        })
    }
}

fn parse_number(fields: &[&str], field: usize) -> Result<f64, ParseErrorKind> {
    let value: f64 = fields[field]
        .parse()
        .map_err(|_| ParseErrorKind::InvalidNumber {
            field,
            value: fields[field].to_string(),
        })?;

    if !value.is_finite() {
        return Err(ParseErrorKind::NonFinite { field });
    }

    Ok(value)
}
