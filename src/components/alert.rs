//! Audible Alerts
//!
//! `ToneAlert` plays a short sine tone every time it is asked to. The audio output
//! is shared by the whole process: it is opened on the first alert and lives
//! until the process exits.
use std::time::Duration;

use crate::{
    api::controller::AlertApi,
    core::constants::{ALERT_TONE_AMPLITUDE, ALERT_TONE_DURATION_MS, ALERT_TONE_FREQUENCY_HZ},
};

/// Parameters of a single alert tone.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub amplitude: f32,
    pub duration: Duration,
}

impl Default for Tone {
    fn default() -> Self {
        Self {
            frequency_hz: ALERT_TONE_FREQUENCY_HZ,
            amplitude: ALERT_TONE_AMPLITUDE,
            duration: Duration::from_millis(ALERT_TONE_DURATION_MS),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ToneAlert {
    tone: Tone,
}

#[cfg(feature = "audio")]
mod output {
    //! The process wide audio output.
    //!
    //! `rodio`'s output stream must stay on the thread that opened it, so a
    //! dedicated thread owns it and plays the tones sent over a channel.
    use std::sync::OnceLock;

    use log::{error, info, warn};
    use rodio::{source::SineWave, OutputStream, Source};
    use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

    use super::Tone;

    static AUDIO_OUTPUT: OnceLock<Option<UnboundedSender<Tone>>> = OnceLock::new();

    /// Returns the output channel, spawning the audio thread on first use.
    ///
    /// Never waits for the device to open. If it cannot be opened, the thread
    /// logs the failure and exits, and later sends fail silently.
    pub(super) fn acquire() -> Option<&'static UnboundedSender<Tone>> {
        AUDIO_OUTPUT.get_or_init(spawn_output).as_ref()
    }

    fn spawn_output() -> Option<UnboundedSender<Tone>> {
        let (tx, mut rx) = unbounded_channel::<Tone>();
        let spawned = std::thread::Builder::new()
            .name("audio-output".to_owned())
            .spawn(move || {
                let (_stream, handle) = match OutputStream::try_default() {
                    Ok(output) => output,
                    Err(e) => {
                        error!("could not open audio output, alerts will be silent: {}", e);
                        return;
                    }
                };
                info!("audio output opened");
                while let Some(tone) = rx.blocking_recv() {
                    let source = SineWave::new(tone.frequency_hz)
                        .take_duration(tone.duration)
                        .amplify(tone.amplitude);
                    if let Err(e) = handle.play_raw(source) {
                        warn!("failed to play alert tone: {}", e);
                    }
                }
            });
        match spawned {
            Ok(_) => Some(tx),
            Err(e) => {
                error!("could not spawn audio thread: {}", e);
                None
            }
        }
    }
}

impl AlertApi for ToneAlert {
    #[cfg(feature = "audio")]
    fn emit(&self) {
        if let Some(output) = output::acquire() {
            if output.send(self.tone).is_err() {
                log::trace!("no audio output, alert tone dropped");
            }
        }
    }

    #[cfg(not(feature = "audio"))]
    fn emit(&self) {
        log::warn!(
            "ALERT: vital sign out of range ({} Hz tone unavailable, built without audio)",
            self.tone.frequency_hz
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tone() {
        let alert = ToneAlert::default();
        assert_eq!(alert.tone.frequency_hz, 440.0);
        assert_eq!(alert.tone.amplitude, 0.1);
        assert_eq!(alert.tone.duration, Duration::from_millis(200));
    }

    #[test]
    fn test_emit_is_fire_and_forget() {
        // Without an audio device this only logs, it must never panic or block.
        let alert = ToneAlert::default();
        alert.emit();
        alert.emit();
    }

    #[test]
    fn test_concurrent_first_use() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| ToneAlert::default().emit()))
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[cfg(feature = "audio")]
    #[test]
    fn test_output_available_without_device() {
        // the channel exists as soon as the thread is spawned, device or not
        ToneAlert::default().emit();
        assert!(output::acquire().is_some());
    }
}
