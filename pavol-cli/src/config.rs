use std::env;
use std::str::FromStr;

pub const DEFAULT_APP_NAME: &str = "pavol";
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Plain,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" => Ok(OutputFormat::Plain),
            "json" => Ok(OutputFormat::Json),
            other => Err(other.to_string()),
        }
    }
}

/// Settings read from the environment. The command line is left entirely to the argument
/// grammar, so nothing here has a flag.
///
/// - `PAVOL_SERVER`: PulseAudio server to connect to (libpulse picks one when unset)
/// - `PAVOL_APP_NAME`: application name shown by the server
/// - `PAVOL_FORMAT`: `plain` (default) or `json`
/// - `PAVOL_LOG`: tracing filter, e.g. `debug` or `pavol=trace`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server: Option<String>,
    pub app_name: String,
    pub format: OutputFormat,
    pub log_filter: String,
    /// A `PAVOL_FORMAT` value that wasn't understood; logged once logging is up
    pub unknown_format: Option<String>,
}

impl Config {
    pub fn from_env() -> Config {
        Config::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Config {
        let non_empty = |key: &str| lookup(key).filter(|v: &String| !v.trim().is_empty());

        let format = non_empty("PAVOL_FORMAT").map(|v| v.parse::<OutputFormat>());
        let (format, unknown_format) = match format {
            None => (OutputFormat::default(), None),
            Some(Ok(format)) => (format, None),
            Some(Err(raw)) => (OutputFormat::default(), Some(raw)),
        };

        Config {
            server: non_empty("PAVOL_SERVER"),
            app_name: non_empty("PAVOL_APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.into()),
            format,
            log_filter: non_empty("PAVOL_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.into()),
            unknown_format,
        }
    }
}
