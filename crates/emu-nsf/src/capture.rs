//! WAV capture of rendered tracks.
//!
//! The mixer output is unipolar (0.0 up to a little under 1.0), so it maps
//! onto the positive half of the 16-bit range with the DC offset left in.

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use log::info;

/// Convert one mixer level to a 16-bit PCM sample, clamping to ±1.0.
#[must_use]
pub fn pcm_sample(level: f32) -> i16 {
    (level.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16
}

/// Encode `samples` as a mono 16-bit WAV into `sink`.
pub fn write_wav<W: Write + Seek>(
    samples: &[f32],
    sample_rate: u32,
    sink: W,
) -> Result<(), hound::Error> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::new(sink, spec)?;
    for &level in samples {
        writer.write_sample(pcm_sample(level))?;
    }
    writer.finalize()
}

/// Write `samples` to a WAV file at `path`.
pub fn save_audio(samples: &[f32], sample_rate: u32, path: &Path) -> Result<(), hound::Error> {
    write_wav(samples, sample_rate, BufWriter::new(File::create(path)?))?;
    info!(
        "wrote {} samples at {sample_rate} Hz to {}",
        samples.len(),
        path.display()
    );
    Ok(())
}
