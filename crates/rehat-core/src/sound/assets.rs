use std::f32::consts::TAU;
use std::io;
use std::path::Path;

use super::SoundFile;

const SAMPLE_RATE: u32 = 22_050;

/// A beep pattern: (frequency Hz, tone ms, silence ms) repeated in order.
fn pattern(sound: SoundFile) -> &'static [(f32, u32, u32)] {
    match sound {
        // classic double beep
        SoundFile::Alarm1 => &[(880.0, 180, 90), (880.0, 180, 550)],
        // rising three-note chime
        SoundFile::Alarm2 => &[(523.25, 220, 40), (659.25, 220, 40), (783.99, 320, 400)],
        // soft low pulse
        SoundFile::Alarm3 => &[(440.0, 400, 600)],
    }
}

fn synthesize(sound: SoundFile) -> Vec<i16> {
    let per_ms = SAMPLE_RATE as f32 / 1000.0;
    let mut samples = Vec::new();
    for &(freq, tone_ms, gap_ms) in pattern(sound) {
        let tone = (tone_ms as f32 * per_ms) as usize;
        // short linear fade in/out so the tone does not click
        let fade = (tone / 10).max(1);
        for i in 0..tone {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = (i.min(tone - i) as f32 / fade as f32).min(1.0);
            let v = (TAU * freq * t).sin() * 0.4 * env;
            samples.push((v * i16::MAX as f32) as i16);
        }
        samples.extend(std::iter::repeat(0).take((gap_ms as f32 * per_ms) as usize));
    }
    samples
}

/// Write the built-in alarm sounds into `dir`.
///
/// Existing files are left alone unless `force` is set, so users can drop in
/// their own `alarmN.wav`. Returns the sounds that were written.
///
/// # Errors
/// Returns an error if the directory or a file cannot be written.
pub fn install_default_sounds(dir: &Path, force: bool) -> io::Result<Vec<SoundFile>> {
    std::fs::create_dir_all(dir)?;
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut written = Vec::new();
    for sound in SoundFile::ALL {
        let path = dir.join(sound.file_name());
        if path.exists() && !force {
            continue;
        }
        let mut writer = hound::WavWriter::create(&path, spec).map_err(to_io)?;
        for s in synthesize(sound) {
            writer.write_sample(s).map_err(to_io)?;
        }
        writer.finalize().map_err(to_io)?;
        written.push(sound);
    }
    Ok(written)
}

fn to_io(err: hound::Error) -> io::Error {
    match err {
        hound::Error::IoError(e) => e,
        other => io::Error::other(other.to_string()),
    }
}
