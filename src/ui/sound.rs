/// Sound engine: procedural chiptune blips via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile with `--no-default-features` or without "sound" feature
/// to disable audio entirely (the stub SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = std::f32::consts::TAU;

    /// Pre-generated WAV buffers for each sound effect.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_dot: Arc<Vec<u8>>,
        sfx_bonus: Arc<Vec<u8>>,
        sfx_win: Arc<Vec<u8>>,
        sfx_caught: Arc<Vec<u8>>,
        sfx_cheat: Arc<Vec<u8>>,
        sfx_reset: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_dot: Arc::new(make_wav(&gen_dot())),
                sfx_bonus: Arc::new(make_wav(&gen_bonus())),
                sfx_win: Arc::new(make_wav(&gen_win())),
                sfx_caught: Arc::new(make_wav(&gen_caught())),
                sfx_cheat: Arc::new(make_wav(&gen_cheat())),
                sfx_reset: Arc::new(make_wav(&gen_reset())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        pub fn play_dot(&self) { self.play(&self.sfx_dot); }
        pub fn play_bonus(&self) { self.play(&self.sfx_bonus); }
        pub fn play_win(&self) { self.play(&self.sfx_win); }
        pub fn play_caught(&self) { self.play(&self.sfx_caught); }
        pub fn play_cheat(&self) { self.play(&self.sfx_cheat); }
        pub fn play_reset(&self) { self.play(&self.sfx_reset); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    /// Square-ish tone (sine + 3rd harmonic) with a linear fade.
    fn tone(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32);
                let wave = (t * freq * TAU).sin() * 0.7 + (t * freq * 3.0 * TAU).sin() * 0.3;
                wave * env * volume
            })
            .collect()
    }

    /// Consecutive tones of equal length.
    fn arpeggio(notes: &[f32], note_dur: f32, volume: f32) -> Vec<f32> {
        notes.iter().flat_map(|&f| tone(f, note_dur, volume)).collect()
    }

    /// Dot: the classic two-step "waka".
    fn gen_dot() -> Vec<f32> {
        arpeggio(&[494.0, 392.0], 0.03, 0.2) // B4, G4
    }

    /// Bonus: bright rising triad C6→E6→G6
    fn gen_bonus() -> Vec<f32> {
        arpeggio(&[1047.0, 1319.0, 1568.0], 0.05, 0.25)
    }

    /// Win: ascending fanfare with a held top note
    fn gen_win() -> Vec<f32> {
        let mut samples = arpeggio(&[523.0, 659.0, 784.0], 0.1, 0.3); // C5→E5→G5
        samples.extend(tone(1047.0, 0.35, 0.3));                      // C6
        samples
    }

    /// Caught: a sliding whine down from 900 Hz to 100 Hz
    fn gen_caught() -> Vec<f32> {
        let duration = 0.6;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 900.0 - t * 800.0;
                phase += freq / SAMPLE_RATE as f32;
                let wobble = 1.0 + 0.3 * (t * 40.0).sin();
                let env = (1.0 - t).powf(0.5);
                (phase * TAU * wobble).sin() * env * 0.3
            })
            .collect()
    }

    /// Cheat: fast upward glissando
    fn gen_cheat() -> Vec<f32> {
        let notes: Vec<f32> = (0..8).map(|k| 400.0 * 2f32.powf(k as f32 / 4.0)).collect();
        arpeggio(&notes, 0.025, 0.2)
    }

    /// Reset: short low double blip
    fn gen_reset() -> Vec<f32> {
        let mut samples = tone(262.0, 0.06, 0.25);
        samples.extend(std::iter::repeat(0.0).take((SAMPLE_RATE as f32 * 0.03) as usize));
        samples.extend(tone(392.0, 0.08, 0.25));
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2; // 16-bit = 2 bytes per sample
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes());  // PCM format
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
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
            let samples = gen_dot();
            let wav = make_wav(&samples);
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(&wav[8..12], b"WAVE");
            assert_eq!(wav.len(), 44 + samples.len() * 2);
            let data_size = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]);
            assert_eq!(data_size as usize, samples.len() * 2);
        }

        #[test]
        fn samples_stay_in_range() {
            for s in [gen_dot(), gen_bonus(), gen_win(), gen_caught(), gen_cheat(), gen_reset()] {
                assert!(!s.is_empty());
                assert!(s.iter().all(|v| v.abs() <= 1.0));
            }
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_dot(&self) {}
    pub fn play_bonus(&self) {}
    pub fn play_win(&self) {}
    pub fn play_caught(&self) {}
    pub fn play_cheat(&self) {}
    pub fn play_reset(&self) {}
}
