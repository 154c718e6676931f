pub mod error;
pub mod export;
pub mod reader;
pub mod record;
pub mod track;

pub use error::{IoError, ParseError, ParseErrorKind, Result, TrackError};
pub use export::{export_tracks, Format};
pub use reader::LogReader;
pub use record::{Record, RecordKind};
pub use track::{assemble, HomePolicy, Sample, TrackAssembler, Tracks};
