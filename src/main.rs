//! Headless runner: loads an extracted `.sb3` directory, clicks the green
//! flag and runs a fixed number of frames, then prints where every sprite
//! ended up.
//!
//! Usage: `scratch-runtime <project-dir> [frames] [config.json]`

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use scratch_runtime::prelude::*;
use tracing_subscriber::EnvFilter;

const FRAME_RATE: u32 = 30;

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(dir) = args.next().map(PathBuf::from) else {
        bail!("usage: scratch-runtime <project-dir> [frames] [config.json]");
    };
    let frames: u32 = match args.next() {
        Some(n) => n.parse().context("frames must be a whole number")?,
        None => FRAME_RATE * 5,
    };
    let config = match args.next() {
        Some(path) => RuntimeConfig::from_json_str(
            &std::fs::read_to_string(&path).with_context(|| format!("read {path}"))?,
        )?,
        None => RuntimeConfig::default(),
    };

    let level = if config.enable_debug_messages { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let json = std::fs::read_to_string(dir.join("project.json"))
        .with_context(|| format!("read {}", dir.join("project.json").display()))?;
    let targets = load_targets(&json, |file| read_asset(&dir, file))?;

    let catalog = load_catalog(&dir, &config.language)?;
    let mut runtime = Runtime::new(targets, Arc::new(ImageDecoder), &config, catalog)?;
    runtime.start();

    let input = InputState::new();
    let dt = Duration::from_secs(1) / FRAME_RATE;
    for _ in 0..frames {
        runtime.tick(dt, &input);
    }

    for sprite in runtime.sprites() {
        println!(
            "{:<20} x={:<8} y={:<8} direction={:<6} costume={}",
            sprite.name(),
            sprite.x(),
            sprite.y(),
            sprite.direction(),
            sprite.costume_index()
        );
    }
    Ok(())
}

/// `<project-dir>/lang/<language>.json` when present, English otherwise.
fn load_catalog(dir: &Path, language: &str) -> anyhow::Result<Catalog> {
    let path = dir.join("lang").join(format!("{language}.json"));
    if language == "en" || !path.exists() {
        return Ok(Catalog::english());
    }
    let json = std::fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    Ok(Catalog::from_json_str(language, &json)?)
}

fn read_asset(dir: &Path, file: &str) -> Option<Vec<u8>> {
    std::fs::read(dir.join(file)).ok()
}
