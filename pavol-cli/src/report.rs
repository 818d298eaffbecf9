use std::fmt;

use pavol::api::{SinkControl, FULL_SCALE_VOLUME};
use serde::Serialize;

use crate::config::OutputFormat;
use crate::interpret::Interpreter;

/// The single line printed when the program ends
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Full {
        muted: bool,
        volume: u32,
        normal: u32,
        max: u64,
    },
    Percent {
        muted: bool,
        percent: u64,
    },
}

impl Report {
    pub fn new(sink: &impl SinkControl, interpreter: &Interpreter) -> Report {
        let muted = sink.muted();
        let volume = sink.volume();
        if interpreter.want_percentage_output() {
            Report::Percent {
                muted,
                percent: volume as u64 * 100 / FULL_SCALE_VOLUME as u64,
            }
        } else {
            Report::Full {
                muted,
                volume,
                normal: FULL_SCALE_VOLUME,
                max: interpreter.max_volume() as u64,
            }
        }
    }

    pub fn render(&self, format: OutputFormat) -> serde_json::Result<String> {
        match format {
            OutputFormat::Plain => Ok(self.to_string()),
            OutputFormat::Json => serde_json::to_string(self),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Report::Full {
                muted,
                volume,
                normal,
                max,
            } => write!(f, "{} {} {} {}", muted as u8, volume, normal, max),
            Report::Percent { muted, percent } => write!(f, "{} {}", muted as u8, percent),
        }
    }
}
