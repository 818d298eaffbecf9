use std::env;
use std::ffi::OsString;

use clap::Parser;
use pavol::api::DEFAULT_RELATIVE_VOLUME;

/// Every argument is a word of the `pavol` grammar (see [`Token`]), so clap only collects them:
/// its own help and version flags are disabled, and values may start with a hyphen (`-`, `-5.`,
/// `-h`, `--help`). Arguments need not be valid UTF-8; see [`Cli::words`].
///
/// A leading `--` is still taken by clap as the end of options and never reaches the grammar.
#[derive(Debug, Parser)]
#[command(name = "pavol", disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Mute, volume and output arguments; pass `h` for details
    #[arg(num_args = 0.., allow_hyphen_values = true, trailing_var_arg = true)]
    pub args: Vec<OsString>,
}

impl Cli {
    /// The arguments as text. Bytes that aren't UTF-8 become U+FFFD, so such an argument still
    /// classifies (usually as a number with whatever digits lead it).
    pub fn words(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }
}

/// A classified command line argument.
///
/// Matching is case-insensitive and only looks at the first character, except for the exact
/// tokens `-h`, `--help`, `+` and `-`. Anything that matches nothing else is a number.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Help,
    Mute,
    Unmute,
    ToggleMute,
    /// Double the maximum settable volume
    Boost,
    /// Report the volume as a percentage
    PercentOutput,
    /// Bare `+`
    StepUp,
    /// Bare `-`
    StepDown,
    Number(&'a str),
}

impl<'a> Token<'a> {
    pub fn classify(arg: &'a str) -> Token<'a> {
        if arg.eq_ignore_ascii_case("-h") || arg.eq_ignore_ascii_case("--help") {
            return Token::Help;
        }

        match arg.bytes().next().map(|b| b.to_ascii_lowercase()) {
            Some(b'h') => Token::Help,
            Some(b'm') => Token::Mute,
            Some(b'u') => Token::Unmute,
            Some(b't') => Token::ToggleMute,
            Some(b'f') => Token::Boost,
            Some(b'p') => Token::PercentOutput,
            _ => match arg {
                "+" => Token::StepUp,
                "-" => Token::StepDown,
                _ => Token::Number(arg),
            },
        }
    }
}

/// Name this process was invoked as, for the usage text
pub fn program_name() -> String {
    env::args().next().unwrap_or_else(|| "pavol".into())
}

pub fn usage(program: &str) -> String {
    let step = DEFAULT_RELATIVE_VOLUME;
    format!(
        "\
usage: {program} ARG ...

ARG can be one of:
  MUTING
      m[ute]      : enable mute
      u[nmute]    : disable mute
      t[oggle]    : toggle mute

  VOLUME
      +           : increase the volume by {step}%
      -           : decrease the volume by {step}%
      NUM         : set the volume to an amount

  OTHER
       f          : double the maximum-settable volume
       p          : output the mute status and volume as a percent

NUM can be interpreted in different ways:
    if NUM contains a radix (decimal point, '.'), it is interpreted as a percentage; otherwise it is an absolute value.
    if NUM contains a sign ('+' or '-'), then it is interpreted as a relative value.

The output is four space separated integers:
    <muted> <absolute volume> <100% volume> <maximum settable volume>
If ARG 'p' is given, then the output is two integers:
    <muted> <volume as a percent>

EXAMPLES
    set the volume to 50%
        {program} 50.
    increase the volume by 20%
        {program} +20.
    toggle mute
        {program} t
    unmute and decrease volume to 10%
        {program} u 10.
    print out the mute status and current volume as a percent
        {program} p
"
    )
}
