//! Report what a recording needs from the machine.

use democast_common::config::{config_file_path, AppConfig};
use democast_render_engine::{probe_encoder, ImageRaster};

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("democast system check");
    println!("{}", "=".repeat(50));

    let config_path = config_file_path();
    if config_path.exists() {
        println!("[OK] Config: {}", config_path.display());
    } else {
        println!("[--] Config: {} (not found, using defaults)", config_path.display());
    }

    let ffmpeg = &config.render.ffmpeg_binary;
    match probe_encoder(ffmpeg) {
        Some(version) => println!("[OK] Encoder: {version}"),
        None => println!("[WARN] Encoder: '{ffmpeg}' not found (GIF and PNG output still work)"),
    }

    if config.capture.driver_command.is_empty() {
        println!("[WARN] Driver: none configured (set capture.driver_command, or use --driver / --dry-run)");
    } else {
        let command = config.capture.driver_command.join(" ");
        let program = &config.capture.driver_command[0];
        if program_on_path(program) {
            println!("[OK] Driver: {command}");
        } else {
            println!("[WARN] Driver: '{program}' not found on PATH ({command})");
        }
    }

    let font_path = config.render.font_path.as_deref();
    let source = match font_path {
        Some(path) => path.display().to_string(),
        None => "system fonts".to_string(),
    };
    match ImageRaster::for_font(font_path) {
        Ok(_) => println!("[OK] Font: {source}"),
        Err(e) => println!("[WARN] Font: {source} unusable ({e}); keystroke and watermark effects will fail"),
    }

    Ok(())
}

fn program_on_path(program: &str) -> bool {
    let candidate = std::path::Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file();
    }
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}
