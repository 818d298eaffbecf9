//! Blocking control of the default PulseAudio sink: volume and mute, plus the number grammar used
//! to describe volume changes on the command line.

mod ignore;
mod pulseaudio;

pub use ignore::Ignore;
pub use pulseaudio::*;
