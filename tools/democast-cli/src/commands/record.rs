//! Record a scenario, compose the frames, and encode the output.

use std::path::{Path, PathBuf};

use anyhow::Context;
use democast_capture_engine::{
    AutomationProvider, BridgeProvider, Recorder, RecorderOptions, SimulatedProvider,
};
use democast_common::config::AppConfig;
use democast_model::{EffectsConfig, OutputFormat, RecordedSession, Scenario};
use democast_render_engine::{
    encode_with, needs_text, Compositor, EncodeOptions, ImageRaster, RenderProgress, RenderStage,
};

pub struct RecordArgs {
    pub scenario: PathBuf,
    pub output: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub no_effects: bool,
    pub driver: Option<String>,
    pub dry_run: bool,
}

pub async fn run(args: RecordArgs, config: &AppConfig) -> anyhow::Result<()> {
    let (mut scenario, report) = Scenario::load(&args.scenario)
        .with_context(|| format!("Failed to load scenario {}", args.scenario.display()))?;
    for warning in &report.warnings {
        tracing::warn!(warning = %warning, "Scenario warning");
    }
    apply_overrides(&mut scenario, &args);

    let provider = provider_for(&args, config)?;
    tracing::info!(
        scenario = %scenario.name,
        steps = scenario.steps.len(),
        actions = scenario.action_count(),
        format = ?scenario.output.format,
        dry_run = args.dry_run,
        "Recording scenario"
    );

    let mut recorder = Recorder::with_options(
        provider,
        RecorderOptions {
            element_timeout_ms: config.capture.element_timeout_ms,
        },
    );

    match recorder.record(&scenario).await {
        Ok(session) => {
            let path = render(session, scenario, config).await?;
            println!("{}", path.display());
            Ok(())
        }
        Err(err) => {
            if let Some(partial) = err.partial().filter(|s| !s.is_empty()) {
                let mut partial_scenario = scenario.clone();
                partial_scenario.output.filename = format!("{}-partial", scenario.output.filename);
                match render(partial.clone(), partial_scenario, config).await {
                    Ok(path) => eprintln!("Partial recording saved to: {}", path.display()),
                    Err(render_err) => {
                        tracing::warn!(error = %render_err, "Could not save partial recording");
                    }
                }
            }
            Err(anyhow::Error::new(err).context("Recording failed"))
        }
    }
}

fn apply_overrides(scenario: &mut Scenario, args: &RecordArgs) {
    if let Some(dir) = &args.output {
        scenario.output.output_dir = dir.clone();
    }
    if let Some(format) = args.format {
        scenario.output.format = format;
    }
    if args.no_effects {
        scenario.effects = EffectsConfig::disabled();
    }
}

fn provider_for(
    args: &RecordArgs,
    config: &AppConfig,
) -> anyhow::Result<Box<dyn AutomationProvider>> {
    if args.dry_run {
        return Ok(Box::new(SimulatedProvider::permissive()));
    }
    let command: Vec<String> = match &args.driver {
        Some(cmd) => cmd.split_whitespace().map(str::to_string).collect(),
        None => config.capture.driver_command.clone(),
    };
    if command.is_empty() {
        anyhow::bail!(
            "No automation driver configured. Pass --driver <command>, set \
             capture.driver_command in the config file, or use --dry-run."
        );
    }
    Ok(Box::new(BridgeProvider::new(command)))
}

/// Raster with the configured font, else a system font. A missing font is
/// only an error when an enabled effect draws text.
fn raster_for(font_path: Option<&Path>, effects: &EffectsConfig) -> anyhow::Result<ImageRaster> {
    match ImageRaster::for_font(font_path) {
        Ok(raster) => Ok(raster),
        Err(err) if needs_text(effects) => Err(anyhow::Error::new(err)
            .context("Keystroke and watermark overlays need a font; set render.font_path")),
        Err(err) => {
            tracing::debug!(error = %err, "No overlay font; scenario draws no text");
            Ok(ImageRaster::new())
        }
    }
}

/// Compose and encode on a blocking thread.
async fn render(
    session: RecordedSession,
    scenario: Scenario,
    config: &AppConfig,
) -> anyhow::Result<PathBuf> {
    let raster = raster_for(config.render.font_path.as_deref(), &scenario.effects)?;
    let options = EncodeOptions {
        ffmpeg_binary: config.render.ffmpeg_binary.clone(),
    };

    tokio::task::spawn_blocking(move || -> anyhow::Result<PathBuf> {
        let compositor = Compositor::new(raster, &scenario).with_progress(Box::new(log_progress));
        let frames = compositor
            .compose_all(&session.frames)
            .context("Compositing failed")?;
        let path = encode_with(&frames, &scenario.output, &options).context("Encoding failed")?;
        Ok(path)
    })
    .await
    .context("Render task panicked")?
}

fn log_progress(p: RenderProgress) {
    match p.stage {
        RenderStage::Compositing if p.frames_done % 60 == 0 => {
            tracing::debug!(
                done = p.frames_done,
                total = p.total_frames,
                percent = (p.progress * 100.0).round() as u32,
                "Compositing"
            );
        }
        RenderStage::Crossfading => tracing::debug!("Applying crossfades"),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> RecordArgs {
        RecordArgs {
            scenario: PathBuf::from("demo.json"),
            output: None,
            format: None,
            no_effects: false,
            driver: None,
            dry_run: false,
        }
    }

    fn scenario() -> Scenario {
        Scenario::from_json_str(
            r#"{"name":"t","steps":[{"actions":[{"action":"navigate","url":"https://example.com"}]}]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_overrides_applied() {
        let mut s = scenario();
        let a = RecordArgs {
            output: Some(PathBuf::from("/tmp/out")),
            format: Some(OutputFormat::Mp4),
            no_effects: true,
            ..args()
        };
        apply_overrides(&mut s, &a);
        assert_eq!(s.output.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(s.output.format, OutputFormat::Mp4);
        assert_eq!(s.effects, EffectsConfig::disabled());
    }

    #[test]
    fn test_missing_driver_is_an_error() {
        let config = AppConfig::default();
        assert!(provider_for(&args(), &config).is_err());
    }

    #[test]
    fn test_dry_run_needs_no_driver() {
        let config = AppConfig::default();
        let a = RecordArgs {
            dry_run: true,
            ..args()
        };
        assert!(provider_for(&a, &config).is_ok());
    }

    #[test]
    fn test_bad_font_path_fails_only_when_text_is_drawn() {
        let missing = Path::new("/nonexistent/democast/font.ttf");
        let mut effects = EffectsConfig::disabled();
        let raster = raster_for(Some(missing), &effects).unwrap();
        assert!(!raster.has_font());

        effects.watermark.enabled = true;
        effects.watermark.text = "democast".into();
        assert!(raster_for(Some(missing), &effects).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dry_run_records_and_encodes() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = scenario();
        s.viewport = democast_model::ViewportSize::new(320, 200);
        s.output.width = 160;
        s.output.height = 100;
        s.output.fps = 5;
        s.output.format = OutputFormat::PngSequence;
        s.output.output_dir = dir.path().to_path_buf();
        s.steps[0].hold_duration = 200;

        let mut recorder = Recorder::new(Box::new(SimulatedProvider::permissive()));
        let session = recorder.record(&s).await.unwrap();
        let path = render(session, s, &AppConfig::default()).await.unwrap();
        assert!(path.join("frame-000.png").is_file());
    }
}
