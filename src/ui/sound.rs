/// Sound cues: short procedural beeps played through rodio.
///
/// Every cue is synthesized into an in-memory WAV buffer once at start-up.
/// Playback is fire-and-forget on a detached Sink.
///
/// Build without the "sound" feature to get a silent engine with the same API.

use crate::sim::event::GameEvent;

/// Which sound to play.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    Key,
    Heart,
    Hurt,
    Door,
    Jump,
    Win,
    Loss,
}

impl Cue {
    pub const ALL: [Cue; 7] = [Cue::Key, Cue::Heart, Cue::Hurt, Cue::Door, Cue::Jump, Cue::Win, Cue::Loss];
}

/// Map a simulation event to its cue. Blocked exits and landings are silent.
pub fn cue_for(event: &GameEvent) -> Option<Cue> {
    match event {
        GameEvent::KeyCollected => Some(Cue::Key),
        GameEvent::HeartCollected { .. } => Some(Cue::Heart),
        GameEvent::LifeLost { .. } => Some(Cue::Hurt),
        GameEvent::ExitOpened { .. } => Some(Cue::Door),
        GameEvent::JumpStarted => Some(Cue::Jump),
        GameEvent::Won { .. } => Some(Cue::Win),
        GameEvent::Lost => Some(Cue::Loss),
        GameEvent::ExitBlocked | GameEvent::Landed => None,
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::Cue;

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        buffers: Vec<(Cue, Arc<Vec<u8>>)>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::warn!("audio output unavailable: {e}");
                    return None;
                }
            };
            let buffers = Cue::ALL
                .iter()
                .map(|&cue| (cue, Arc::new(make_wav(&synth(cue)))))
                .collect();
            Some(SoundEngine { _stream: stream, handle, buffers })
        }

        pub fn play(&self, cue: Cue) {
            let Some((_, buf)) = self.buffers.iter().find(|(c, _)| *c == cue) else { return };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveforms (mono f32 samples)
    // ════════════════════════════════════════════════════════════

    fn synth(cue: Cue) -> Vec<f32> {
        match cue {
            // C6 E6 G6
            Cue::Key => arpeggio(&[1047.0, 1319.0, 1568.0], 0.045, 0.25),
            // G5 C6
            Cue::Heart => arpeggio(&[784.0, 1047.0], 0.07, 0.25),
            Cue::Hurt => sweep(520.0, 140.0, 0.2, 0.3),
            Cue::Door => arpeggio(&[392.0, 523.0], 0.08, 0.25),
            Cue::Jump => sweep(300.0, 700.0, 0.1, 0.2),
            // C5 E5 G5 C6
            Cue::Win => arpeggio(&[523.0, 659.0, 784.0, 1047.0, 1047.0], 0.1, 0.3),
            // A4 F#4 Eb4 C4
            Cue::Loss => arpeggio(&[440.0, 370.0, 311.0, 261.0], 0.12, 0.3),
        }
    }

    /// Notes played back to back, each with a fading envelope and a touch of
    /// third harmonic for a square-ish retro tone.
    fn arpeggio(notes: &[f32], note_dur: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * note_dur) as usize;
        let mut samples = Vec::with_capacity(n * notes.len());
        for &freq in notes {
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = (t * freq * TAU).sin() * 0.7 + (t * freq * 3.0 * TAU).sin() * 0.3;
                samples.push(wave * env * volume);
            }
        }
        samples
    }

    /// Linear pitch glide from `from` to `to` Hz.
    fn sweep(from: f32, to: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = from + (to - from) * t;
                phase += freq * TAU / SAMPLE_RATE as f32;
                phase.sin() * (1.0 - t).powf(0.6) * volume
            })
            .collect()
    }

    // ════════════════════════════════════════════════════════════
    //  16-bit PCM WAV container
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let channels: u16 = 1;
        let bits: u16 = 16;
        let byte_rate = SAMPLE_RATE * channels as u32 * bits as u32 / 8;
        let block_align = channels * bits / 8;
        let data_size = samples.len() as u32 * 2;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }
        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn wav_header_matches_payload() {
            let samples = synth(Cue::Jump);
            let wav = make_wav(&samples);
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(wav.len(), 44 + samples.len() * 2);
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API (no-ops when the sound feature is off)
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _cue: Cue) {}
}

impl SoundEngine {
    /// Play the cue for every event that has one.
    pub fn play_events(&self, events: &[GameEvent]) {
        for cue in events.iter().filter_map(cue_for) {
            self.play(cue);
        }
    }
}
