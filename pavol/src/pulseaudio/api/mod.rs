pub mod volume;

use libpulse_binding::volume::Volume;
pub use volume::*;

use super::error::BridgeError;

/// The reference ("100%") volume of the server, in device units
pub const FULL_SCALE_VOLUME: u32 = Volume::NORMAL.0;

/// Number of channels written on every volume change. The default sink is treated as stereo
/// regardless of how many channels it actually has, so this is only exact for mono and stereo
/// sinks.
pub const STEREO_CHANNELS: u8 = 2;

/// Volume and mute control over a single sink.
///
/// `volume` and `muted` report locally tracked state: they are refreshed whenever the
/// implementation reads from the server, and updated optimistically by the setters.
pub trait SinkControl {
    /// Average volume across channels, in device units
    fn volume(&self) -> u32;

    fn muted(&self) -> bool;

    /// Sets every channel to `volume`
    fn set_volume(&mut self, volume: u32) -> Result<(), BridgeError>;

    fn set_mute(&mut self, mute: bool) -> Result<(), BridgeError>;
}
