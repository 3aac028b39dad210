//! Precomputed looped noise buffers.
//!
//! Noise is synthesized once into a fixed-length buffer and loop-played,
//! trading a few hundred kilobytes of memory for a trivially real-time-safe
//! render path. Generation is seeded and fully deterministic: the same
//! color, rate, length, and seed produce a bit-identical buffer, and a
//! [`NoisePlayer`] regenerates only when the color actually changes.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Minimum buffer length in milliseconds.
///
/// Shorter loops develop an audible repetition period; two seconds keeps
/// the loop point imperceptible for all three colors.
pub const MIN_NOISE_BUFFER_MS: f32 = 2000.0;

/// Spectral color of a noise stimulus.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NoiseColor {
    /// Flat spectrum, i.i.d. uniform samples.
    #[default]
    White,
    /// -3 dB/octave, perceptually balanced across bands.
    Pink,
    /// -6 dB/octave random walk, deep rumble.
    Brown,
}

/// Xorshift32 PRNG for noise generation.
///
/// Not cryptographic; chosen for determinism and a single word of state.
#[derive(Debug, Clone)]
struct Xorshift32 {
    state: u32,
}

impl Xorshift32 {
    fn new(seed: u32) -> Self {
        // Zero is a fixed point of xorshift; nudge it.
        Self {
            state: if seed == 0 { 0x9E3779B9 } else { seed },
        }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform sample in [-1.0, 1.0].
    fn next_f32(&mut self) -> f32 {
        (self.next_u32() as i32 as f32) / (i32::MAX as f32)
    }
}

/// A generated, immutable noise buffer.
///
/// # Example
///
/// ```rust
/// use oido_synth::{NoiseBuffer, NoiseColor};
///
/// let a = NoiseBuffer::generate(NoiseColor::Pink, 48000.0, 2000.0, 7);
/// let b = NoiseBuffer::generate(NoiseColor::Pink, 48000.0, 2000.0, 7);
/// assert_eq!(a.samples(), b.samples());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseBuffer {
    color: NoiseColor,
    sample_rate: f32,
    seed: u32,
    samples: Vec<f32>,
}

impl NoiseBuffer {
    /// Generate a buffer of the given color.
    ///
    /// `duration_ms` is floored at [`MIN_NOISE_BUFFER_MS`].
    pub fn generate(color: NoiseColor, sample_rate: f32, duration_ms: f32, seed: u32) -> Self {
        let duration_ms = duration_ms.max(MIN_NOISE_BUFFER_MS);
        let len = (duration_ms / 1000.0 * sample_rate) as usize;
        let mut rng = Xorshift32::new(seed);

        let samples = match color {
            NoiseColor::White => (0..len).map(|_| rng.next_f32()).collect(),
            NoiseColor::Pink => generate_pink(&mut rng, len),
            NoiseColor::Brown => generate_brown(&mut rng, len),
        };

        Self {
            color,
            sample_rate,
            seed,
            samples,
        }
    }

    /// The buffer's color.
    pub fn color(&self) -> NoiseColor {
        self.color
    }

    /// The seed the buffer was generated from.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Sample rate the buffer was generated for.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// The raw samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Buffer length in samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer is empty (never true for generated buffers).
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Kellett's economy pink-noise filter: seven leaky-integrator states
/// combining six IIR taps of the white source plus a direct residual,
/// scaled to normalize peak amplitude.
fn generate_pink(rng: &mut Xorshift32, len: usize) -> Vec<f32> {
    let mut b = [0.0f32; 7];
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        let white = rng.next_f32();
        b[0] = 0.99886 * b[0] + white * 0.0555179;
        b[1] = 0.99332 * b[1] + white * 0.0750759;
        b[2] = 0.96900 * b[2] + white * 0.1538520;
        b[3] = 0.86650 * b[3] + white * 0.3104856;
        b[4] = 0.55000 * b[4] + white * 0.5329522;
        b[5] = -0.7616 * b[5] - white * 0.0168980;
        let pink = b.iter().sum::<f32>() + white * 0.5362;
        b[6] = white * 0.115926;
        out.push(pink * 0.11);
    }
    out
}

/// Brown noise as an integrated (random-walk) white source.
///
/// The 1/1.02 leak keeps the walk mean-reverting; the 3.5x gain restores
/// audible amplitude after the -6 dB/octave rolloff. Output is clamped so
/// accumulated drift can never leave [-1, 1].
fn generate_brown(rng: &mut Xorshift32, len: usize) -> Vec<f32> {
    let mut last = 0.0f32;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        let white = rng.next_f32();
        last = (last + 0.02 * white) / 1.02;
        out.push((last * 3.5).clamp(-1.0, 1.0));
    }
    out
}

/// Loop-playback over a [`NoiseBuffer`].
///
/// Changing color regenerates the buffer; requesting the color already
/// loaded is a no-op and keeps the exact same samples.
#[derive(Debug, Clone)]
pub struct NoisePlayer {
    buffer: NoiseBuffer,
    duration_ms: f32,
    position: usize,
}

impl NoisePlayer {
    /// Create a player with a freshly generated buffer.
    pub fn new(color: NoiseColor, sample_rate: f32, duration_ms: f32, seed: u32) -> Self {
        Self {
            buffer: NoiseBuffer::generate(color, sample_rate, duration_ms, seed),
            duration_ms,
            position: 0,
        }
    }

    /// The buffer currently being played.
    pub fn buffer(&self) -> &NoiseBuffer {
        &self.buffer
    }

    /// Switch color, regenerating only on an actual change.
    pub fn set_color(&mut self, color: NoiseColor) {
        if color == self.buffer.color() {
            return;
        }
        self.buffer = NoiseBuffer::generate(
            color,
            self.buffer.sample_rate(),
            self.duration_ms,
            self.buffer.seed(),
        );
        self.position = 0;
    }

    /// Next sample, wrapping at the loop point.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let sample = self.buffer.samples()[self.position];
        self.position += 1;
        if self.position >= self.buffer.len() {
            self.position = 0;
        }
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_is_bit_identical() {
        for color in [NoiseColor::White, NoiseColor::Pink, NoiseColor::Brown] {
            let a = NoiseBuffer::generate(color, 48000.0, 2000.0, 42);
            let b = NoiseBuffer::generate(color, 48000.0, 2000.0, 42);
            assert_eq!(a.samples(), b.samples(), "{color:?} not deterministic");
        }
    }

    #[test]
    fn different_seeds_differ() {
        let a = NoiseBuffer::generate(NoiseColor::White, 48000.0, 2000.0, 1);
        let b = NoiseBuffer::generate(NoiseColor::White, 48000.0, 2000.0, 2);
        assert_ne!(a.samples(), b.samples());
    }

    #[test]
    fn duration_floored_at_two_seconds() {
        let buf = NoiseBuffer::generate(NoiseColor::White, 48000.0, 100.0, 0);
        assert_eq!(buf.len(), 96_000);
    }

    #[test]
    fn all_colors_bounded() {
        for color in [NoiseColor::White, NoiseColor::Pink, NoiseColor::Brown] {
            let buf = NoiseBuffer::generate(color, 48000.0, 2000.0, 1234);
            for &s in buf.samples() {
                assert!((-1.0..=1.0).contains(&s), "{color:?} out of range: {s}");
            }
        }
    }

    #[test]
    fn brown_has_more_low_frequency_energy_than_white() {
        // Crude spectral tilt check: a random walk changes slowly, so the
        // mean absolute first difference must be much smaller than white's.
        let white = NoiseBuffer::generate(NoiseColor::White, 48000.0, 2000.0, 9);
        let brown = NoiseBuffer::generate(NoiseColor::Brown, 48000.0, 2000.0, 9);

        let diff_energy = |samples: &[f32]| {
            samples
                .windows(2)
                .map(|w| (w[1] - w[0]).abs())
                .sum::<f32>()
                / (samples.len() - 1) as f32
        };

        assert!(diff_energy(brown.samples()) < diff_energy(white.samples()) * 0.2);
    }

    #[test]
    fn player_loops_at_buffer_end() {
        let mut player = NoisePlayer::new(NoiseColor::White, 48000.0, 2000.0, 5);
        let len = player.buffer().len();
        let first = player.buffer().samples()[0];

        for _ in 0..len {
            player.advance();
        }
        // One full pass later the player is back at the loop start.
        assert_eq!(player.advance(), first);
    }

    #[test]
    fn set_color_same_color_keeps_buffer() {
        let mut player = NoisePlayer::new(NoiseColor::Pink, 48000.0, 2000.0, 5);
        let before = player.buffer().clone();
        player.set_color(NoiseColor::Pink);
        assert_eq!(player.buffer(), &before);
    }

    #[test]
    fn set_color_change_regenerates() {
        let mut player = NoisePlayer::new(NoiseColor::Pink, 48000.0, 2000.0, 5);
        player.set_color(NoiseColor::Brown);
        assert_eq!(player.buffer().color(), NoiseColor::Brown);
    }
}
