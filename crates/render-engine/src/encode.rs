//! Output encoders: animated GIF in-process, MP4/WebM through ffmpeg, or a
//! plain directory of PNG frames.

use std::fs::File;
use std::io::{BufWriter, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use image::codecs::gif::{GifEncoder, Repeat};
use image::imageops::{self, FilterType};
use image::{Delay, Frame, ImageFormat, RgbaImage};

use democast_common::error::{DemocastError, DemocastResult};
use democast_model::{OutputConfig, OutputFormat, RenderedFrame};

use crate::raster::to_image;

/// Characters of encoder stderr kept in an [`DemocastError::EncoderFailed`].
pub const STDERR_TAIL_CHARS: usize = 500;

/// Encoder settings that come from the machine rather than the scenario.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    pub ffmpeg_binary: String,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            ffmpeg_binary: "ffmpeg".to_string(),
        }
    }
}

/// Outcome of one external encoder invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderRun {
    /// Exit code; `None` when the process was killed by a signal.
    pub status: Option<i32>,
    pub stderr_tail: String,
}

impl EncoderRun {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Encode `frames` with the default encoder options.
pub fn encode(frames: &[RenderedFrame], output: &OutputConfig) -> DemocastResult<PathBuf> {
    encode_with(frames, output, &EncodeOptions::default())
}

/// Encode `frames` into `output.output_dir` according to `output.format`.
///
/// Returns the written file, or the frame directory for PNG sequences.
pub fn encode_with(
    frames: &[RenderedFrame],
    output: &OutputConfig,
    options: &EncodeOptions,
) -> DemocastResult<PathBuf> {
    if frames.is_empty() {
        return Err(DemocastError::encoding("no frames to encode"));
    }
    std::fs::create_dir_all(&output.output_dir)?;
    let started = std::time::Instant::now();

    let path = match output.format {
        OutputFormat::Gif => {
            let path = output_path(output);
            encode_gif(frames, output, &path)?;
            path
        }
        OutputFormat::Mp4 | OutputFormat::Webm => {
            let path = output_path(output);
            encode_video(frames, output, &path, options)?;
            path
        }
        OutputFormat::PngSequence => {
            let dir = output.output_dir.join(&output.filename);
            write_png_sequence(frames, output, &dir)?;
            dir
        }
    };

    tracing::info!(
        path = %path.display(),
        format = ?output.format,
        frames = frames.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Encoded output"
    );
    Ok(path)
}

/// `output_dir/filename.ext` for file formats.
pub fn output_path(output: &OutputConfig) -> PathBuf {
    match output.format.extension() {
        Some(ext) => output.output_dir.join(format!("{}.{ext}", output.filename)),
        None => output.output_dir.join(&output.filename),
    }
}

/// ffmpeg CRF for a 1-100 quality: 100 is lossless, lower is smaller.
pub fn quality_to_crf(quality: u32) -> u32 {
    (51.0 - quality.min(100) as f64 / 100.0 * 51.0).round() as u32
}

/// GIF quantizer speed for a 1-100 quality: 1 is the slowest, best palette.
fn quality_to_gif_speed(quality: u32) -> i32 {
    (30.0 - quality.clamp(1, 100) as f64 / 100.0 * 29.0).round() as i32
}

/// Frame image at exactly the configured output size.
fn output_image(frame: &RenderedFrame, output: &OutputConfig) -> RgbaImage {
    let img = to_image(frame.pixels.clone());
    let (w, h) = (output.width.max(1), output.height.max(1));
    if img.dimensions() == (w, h) {
        img
    } else {
        imageops::resize(&img, w, h, FilterType::Triangle)
    }
}

fn encode_gif(frames: &[RenderedFrame], output: &OutputConfig, path: &Path) -> DemocastResult<()> {
    let delay_ms = (1000.0 / output.fps.max(1) as f64).round() as u32;
    let file = BufWriter::new(File::create(path)?);
    let mut encoder = GifEncoder::new_with_speed(file, quality_to_gif_speed(output.quality));
    encoder
        .set_repeat(Repeat::Infinite)
        .map_err(|e| DemocastError::encoding(format!("GIF setup failed: {e}")))?;

    for frame in frames {
        let delay = Delay::from_numer_denom_ms(delay_ms, 1);
        encoder
            .encode_frame(Frame::from_parts(output_image(frame, output), 0, 0, delay))
            .map_err(|e| {
                DemocastError::encoding(format!("GIF frame {} failed: {e}", frame.index))
            })?;
    }
    tracing::debug!(path = %path.display(), delay_ms, "GIF written");
    Ok(())
}

/// Zero-padded frame file name.
fn frame_name(position: usize, width: usize) -> String {
    format!("frame-{position:0width$}.png")
}

fn digits(n: usize) -> usize {
    n.max(1).to_string().len()
}

fn write_png_sequence(
    frames: &[RenderedFrame],
    output: &OutputConfig,
    dir: &Path,
) -> DemocastResult<()> {
    std::fs::create_dir_all(dir)?;
    let width = digits(frames.len()).max(3);
    for (position, frame) in frames.iter().enumerate() {
        let path = dir.join(frame_name(position, width));
        output_image(frame, output)
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|e| DemocastError::encoding(format!("writing {}: {e}", path.display())))?;
    }
    Ok(())
}

/// ffmpeg arguments for turning `pattern` into `output_path`.
pub fn ffmpeg_args(
    format: OutputFormat,
    fps: u32,
    quality: u32,
    pattern: &Path,
    output_path: &Path,
) -> Vec<String> {
    let crf = quality_to_crf(quality).to_string();
    let mut args: Vec<String> = vec![
        "-y".into(),
        "-framerate".into(),
        fps.max(1).to_string(),
        "-i".into(),
        pattern.display().to_string(),
    ];
    match format {
        OutputFormat::Webm => args.extend(
            [
                "-c:v",
                "libvpx-vp9",
                "-b:v",
                "0",
                "-crf",
                crf.as_str(),
                "-pix_fmt",
                "yuv420p",
            ]
            .map(String::from),
        ),
        _ => args.extend(
            [
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "-crf",
                crf.as_str(),
                "-preset",
                "slow",
                "-tune",
                "animation",
                "-movflags",
                "+faststart",
            ]
            .map(String::from),
        ),
    }
    args.push(output_path.display().to_string());
    args
}

fn encode_video(
    frames: &[RenderedFrame],
    output: &OutputConfig,
    path: &Path,
    options: &EncodeOptions,
) -> DemocastResult<()> {
    let workdir = tempfile::Builder::new().prefix("democast-").tempdir()?;
    let width = digits(frames.len());
    for (position, frame) in frames.iter().enumerate() {
        let frame_path = workdir.path().join(frame_name(position, width));
        output_image(frame, output)
            .save_with_format(&frame_path, ImageFormat::Png)
            .map_err(|e| DemocastError::encoding(format!("writing frame {position}: {e}")))?;
    }

    let pattern = workdir.path().join(format!("frame-%0{width}d.png"));
    let args = ffmpeg_args(output.format, output.fps, output.quality, &pattern, path);
    let run = run_encoder(&options.ffmpeg_binary, &args)?;
    if !run.success() {
        return Err(DemocastError::EncoderFailed {
            binary: options.ffmpeg_binary.clone(),
            status: run.status,
            stderr_tail: run.stderr_tail,
        });
    }
    Ok(())
}

/// Run an encoder binary to completion, keeping the tail of its stderr.
///
/// A missing binary is [`DemocastError::EncoderNotFound`]; a non-zero exit
/// is reported through the returned [`EncoderRun`].
pub fn run_encoder(binary: &str, args: &[String]) -> DemocastResult<EncoderRun> {
    tracing::debug!(binary, ?args, "Running encoder");
    let mut child = Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DemocastError::EncoderNotFound {
                binary: binary.to_string(),
            },
            _ => DemocastError::encoding(format!("failed to start {binary}: {e}")),
        })?;

    let stderr = match child.stderr.take() {
        Some(pipe) => read_lossy(pipe).unwrap_or_else(|err| {
            format!("<failed to read {binary} stderr: {err}>")
        }),
        None => String::new(),
    };
    let status = child.wait()?;
    let run = EncoderRun {
        status: status.code(),
        stderr_tail: tail_chars(&stderr, STDERR_TAIL_CHARS),
    };
    if !run.success() {
        tracing::warn!(binary, status = ?run.status, "Encoder exited unsuccessfully");
    }
    Ok(run)
}

/// Drain `pipe`, replacing any invalid UTF-8 rather than failing.
fn read_lossy(mut pipe: impl Read) -> std::io::Result<String> {
    let mut bytes = Vec::new();
    pipe.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// First line of `<binary> -version`, or `None` when it cannot be run.
pub fn probe_encoder(binary: &str) -> Option<String> {
    let output = Command::new(binary)
        .arg("-version")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|line| line.trim().to_string())
}

fn tail_chars(s: &str, n: usize) -> String {
    let count = s.chars().count();
    s.chars().skip(count.saturating_sub(n)).collect()
}
