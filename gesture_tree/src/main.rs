//! gesture_tree — interactive entry point.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use gesture_tree::app::run;
use gesture_tree::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "gesture_tree", about = "Hand-gesture driven ornament and photo tree")]
struct Cli {
    /// TOML config file (missing keys keep their defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Layout seed
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ornaments
    #[arg(long)]
    ornaments: Option<usize>,

    /// Directory of photos to hang on the tree
    #[arg(long)]
    photos: Option<PathBuf>,

    /// Placeholder cards when no photo directory is given
    #[arg(long)]
    placeholders: Option<usize>,

    /// JSON-lines landmark feed file, or `-` for stdin
    #[arg(long)]
    landmarks: Option<String>,

    /// Detector command whose stdout is a JSON-lines landmark feed
    #[arg(long)]
    detector: Option<String>,
}

impl Cli {
    /// Load the config file (if any) and apply flag overrides on top.
    fn into_config(self) -> Result<AppConfig> {
        let mut cfg = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None       => AppConfig::default(),
        };
        if let Some(seed) = self.seed { cfg.layout.seed = seed; }
        if let Some(n) = self.ornaments { cfg.layout.ornament_count = n; }
        if let Some(n) = self.placeholders { cfg.input.placeholders = n; }
        if self.photos.is_some() { cfg.input.photos = self.photos; }
        if self.landmarks.is_some() { cfg.input.landmarks = self.landmarks; }
        if self.detector.is_some() { cfg.input.detector = self.detector; }
        cfg.layout.validate()?;
        Ok(cfg)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gesture_tree=info,tree_gesture=info".into()),
        )
        .init();

    let cfg = cli.into_config()?;

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Gesture Tree — ornaments, photos, and hands         ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    match (&cfg.input.detector, &cfg.input.landmarks) {
        (Some(cmd), _)     => println!("  Input: detector `{}` + keyboard", cmd),
        (None, Some(path)) => println!("  Input: landmark feed {} + keyboard", path),
        (None, None)       => println!("  Input: keyboard simulation"),
    }
    println!("  F=fist (tree)  O=open (scatter)  P=pinch (focus)  N=new  Del=remove  Q=quit");
    println!();

    info!(
        "gesture_tree v{} starting: {} ornaments, seed {:#x}",
        env!("CARGO_PKG_VERSION"), cfg.layout.ornament_count, cfg.layout.seed
    );
    run(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "gesture_tree", "--seed", "42", "--ornaments", "100", "--landmarks", "-",
        ]);
        let cfg = cli.into_config().unwrap();
        assert_eq!(cfg.layout.seed, 42);
        assert_eq!(cfg.layout.ornament_count, 100);
        assert_eq!(cfg.input.landmarks.as_deref(), Some("-"));
        assert_eq!(cfg.input.detector, None);
    }

    #[test]
    fn no_flags_is_default_config() {
        let cfg = Cli::parse_from(["gesture_tree"]).into_config().unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let cli = Cli::parse_from(["gesture_tree", "--config", "/no/such/tree.toml"]);
        assert!(cli.into_config().is_err());
    }
}
