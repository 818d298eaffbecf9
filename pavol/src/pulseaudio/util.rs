use libpulse_binding::volume::{ChannelVolumes, Volume};
use libpulse_sys::pa_cvolume;

/// A volume vector of `channels` channels, each set to `volume`
pub fn uniform_channel_volumes(channels: u8, volume: Volume) -> ChannelVolumes {
    let mut inner = pa_cvolume::default();
    inner.channels = channels;
    for value in inner.values.iter_mut().take(channels as usize) {
        *value = volume.0;
    }

    // is this really the only way to create a `ChannelVolumes`?
    inner.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_channel_gets_the_volume() {
        let cv = uniform_channel_volumes(2, Volume(1234));
        assert_eq!(cv.len(), 2);
        assert_eq!(cv.get(), &[Volume(1234), Volume(1234)]);
    }

    #[test]
    fn unused_channels_are_left_alone() {
        let cv = uniform_channel_volumes(1, Volume(99));
        assert_eq!(cv.get(), &[Volume(99)]);
    }
}
