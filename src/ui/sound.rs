/// Sound engine: procedural retro sound effects via rodio.
///
/// One pre-generated WAV buffer per `GameEvent` kind, built at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

use gridblast::sim::event::GameEvent;

/// Which buffer an event plays.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
enum Sfx {
    Plant,
    Boom,
    Break,
    Powerup,
    Kill,
    Start,
    Win,
    Die,
}

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn sfx_for(event: &GameEvent) -> Sfx {
    match event {
        GameEvent::BombArmed { .. } => Sfx::Plant,
        GameEvent::Explosion { .. } => Sfx::Boom,
        GameEvent::BrickBreak { .. } => Sfx::Break,
        GameEvent::Powerup { .. } => Sfx::Powerup,
        GameEvent::EnemyKill { .. } => Sfx::Kill,
        GameEvent::LevelStart { .. } => Sfx::Start,
        GameEvent::Win { .. } => Sfx::Win,
        GameEvent::Death { .. } => Sfx::Die,
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::{sfx_for, Sfx};
    use gridblast::sim::event::GameEvent;

    const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = std::f32::consts::PI * 2.0;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        buffers: Vec<(Sfx, Arc<Vec<u8>>)>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("no audio output: {e}");
                    return None;
                }
            };

            let buffers = [
                (Sfx::Plant, gen_plant()),
                (Sfx::Boom, gen_boom()),
                (Sfx::Break, gen_break()),
                (Sfx::Powerup, gen_powerup()),
                (Sfx::Kill, gen_kill()),
                (Sfx::Start, gen_start()),
                (Sfx::Win, gen_win()),
                (Sfx::Die, gen_die()),
            ]
            .into_iter()
            .map(|(sfx, samples)| (sfx, Arc::new(make_wav(&samples))))
            .collect();

            Some(SoundEngine { _stream: stream, handle, buffers })
        }

        pub fn play(&self, event: &GameEvent) {
            let sfx = sfx_for(event);
            let Some((_, buf)) = self.buffers.iter().find(|(s, _)| *s == sfx) else { return };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn samples_for(duration: f32) -> usize {
        (SAMPLE_RATE as f32 * duration) as usize
    }

    fn square(phase: f32) -> f32 {
        if phase.fract() < 0.5 { 1.0 } else { -1.0 }
    }

    fn saw(phase: f32) -> f32 {
        phase.fract() * 2.0 - 1.0
    }

    fn triangle(phase: f32) -> f32 {
        1.0 - 4.0 * (phase.fract() - 0.5).abs()
    }

    /// Seeded white noise in [-1, 1); same seed, same sample.
    fn noise(seed: u64) -> impl FnMut() -> f32 {
        let mut rng = StdRng::seed_from_u64(seed);
        move || rng.gen_range(-1.0..1.0)
    }

    /// Bomb armed: short high sine ping.
    fn gen_plant() -> Vec<f32> {
        let n = samples_for(0.1);
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - i as f32 / n as f32;
                (t * 880.0 * TAU).sin() * env * 0.2
            })
            .collect()
    }

    /// Explosion: low saw + sub square under a decaying noise burst.
    fn gen_boom() -> Vec<f32> {
        let n = samples_for(0.6);
        let mut noise = noise(777);
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let p = i as f32 / n as f32;
                let tone = saw(t * 100.0) * 0.4 + square(t * 50.0) * 0.3;
                let burst = noise() * (1.0 - p).powf(3.0);
                (tone * (1.0 - p) + burst * 0.6) * 0.35
            })
            .collect()
    }

    /// Brick break: two short gritty tones.
    fn gen_break() -> Vec<f32> {
        let n = samples_for(0.15);
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - i as f32 / n as f32;
                let a = if t < 0.1 { square(t * 200.0) } else { 0.0 };
                let b = saw(t * 150.0);
                (a * 0.5 + b * 0.5) * env * 0.2
            })
            .collect()
    }

    /// Power-up: rising A-major arpeggio.
    fn gen_powerup() -> Vec<f32> {
        let notes = [440.0_f32, 554.0, 659.0, 880.0];
        let n = samples_for(0.1);
        let mut samples = Vec::with_capacity(n * notes.len());
        for &freq in &notes {
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - i as f32 / n as f32 * 0.5;
                samples.push((t * freq * TAU).sin() * env * 0.25);
            }
        }
        samples
    }

    /// Enemy kill: noise with a closing low-pass sweep.
    fn gen_kill() -> Vec<f32> {
        let n = samples_for(0.3);
        let mut noise = noise(4242);
        let mut lp = 0.0_f32;
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                // One-pole filter; cutoff falls from ~1 kHz to ~100 Hz.
                let cutoff = 1000.0 * (0.1_f32).powf(p);
                let alpha = (TAU * cutoff / SAMPLE_RATE as f32).min(1.0);
                lp += alpha * (noise() - lp);
                lp * (1.0 - p) * 0.8
            })
            .collect()
    }

    /// Level start: soft triangle note.
    fn gen_start() -> Vec<f32> {
        let n = samples_for(0.5);
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = (1.0 - i as f32 / n as f32).powf(2.0);
                triangle(t * 440.0) * env * 0.3
            })
            .collect()
    }

    /// Win: C-major fanfare with a sustained top note.
    fn gen_win() -> Vec<f32> {
        let notes = [523.25_f32, 659.25, 783.99, 1046.5];
        let step = samples_for(0.15);
        let tail = samples_for(0.6);
        let mut samples = Vec::with_capacity(step * notes.len() + tail);
        for (k, &freq) in notes.iter().enumerate() {
            let n = if k + 1 == notes.len() { tail } else { step };
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - i as f32 / n as f32 * 0.8;
                samples.push(triangle(t * freq) * env * 0.3);
            }
        }
        samples
    }

    /// Death: falling sine glide over a buzzing saw.
    fn gen_die() -> Vec<f32> {
        let n = samples_for(0.8);
        let glide = samples_for(0.5);
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let p = i as f32 / n as f32;
                let buzz = saw(t * 150.0) * (1.0 - p) * 0.25;
                let sweep = if i < glide {
                    let g = i as f32 / glide as f32;
                    let freq = 200.0 * (0.25_f32).powf(g); // 200 Hz → 50 Hz
                    phase += freq / SAMPLE_RATE as f32;
                    (phase * TAU).sin() * (1.0 - g) * 0.3
                } else {
                    0.0
                };
                buzz + sweep
            })
            .collect()
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    pub(super) fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
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
    pub fn play(&self, _event: &GameEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridblast::domain::entity::{Coord, ItemKind};
    use gridblast::sim::event::DeathCause;

    #[test]
    fn every_event_has_a_sound() {
        let cases = [
            (GameEvent::BombArmed { at: Coord::new(1, 1) }, Sfx::Plant),
            (GameEvent::Explosion { bombs: 2 }, Sfx::Boom),
            (GameEvent::BrickBreak { count: 1 }, Sfx::Break),
            (GameEvent::Powerup { kind: ItemKind::SpeedUp }, Sfx::Powerup),
            (GameEvent::EnemyKill { count: 3 }, Sfx::Kill),
            (GameEvent::LevelStart { level: 1 }, Sfx::Start),
            (GameEvent::Win { level: 1 }, Sfx::Win),
            (GameEvent::Death { cause: DeathCause::Timeout }, Sfx::Die),
        ];
        for (ev, sfx) in cases {
            assert_eq!(sfx_for(&ev), sfx);
        }
    }
}
