//! emberforge - deterministic forge-and-anvil smithing sessions
//!
//! Headless runner: loads materials, plays a session script against one forge
//! and one anvil, and prints the finished parts as JSON on stdout.

mod config;
mod session;

use anyhow::{Context, Result};
use config::{EmberforgeConfig, DEFAULT_CONFIG_PATH};
use emberforge_assets::{pack_from_file, starter_pack, MaterialRegistry};
use session::{Session, SessionScript, DEMO_SCRIPT};
use std::{env, path::PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = CliOptions::parse(env::args().skip(1));
    if cli.help {
        print_usage();
        return Ok(());
    }

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let (mut config, config_error) = match EmberforgeConfig::read(&config_path) {
        Ok(config) => (config, None),
        Err(err) => (EmberforgeConfig::default(), Some(err)),
    };

    // RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting emberforge v{}", env!("CARGO_PKG_VERSION"));
    if let Some(err) = config_error {
        warn!("{err:#}. Using defaults");
    }
    for problem in &cli.problems {
        error!("{problem}");
    }

    if let Some(seed) = cli.seed {
        config.strike_seed = seed;
    }
    if let Some(path) = cli.save.clone() {
        config.save_path = Some(path);
    }
    if let Some(path) = &cli.write_config {
        config
            .save_to_path(path)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        info!("Wrote effective config to {}", path.display());
    }

    let registry = build_registry(&config);
    info!("Material registry ready ({})", registry.summary());

    let script = match &cli.script {
        Some(path) => SessionScript::from_path(path)?,
        None => {
            info!("No --script given; running the demo session");
            SessionScript::from_str(DEMO_SCRIPT)?
        }
    };

    let mut session = Session::new(&registry, config.strike_seed, config.max_ticks);
    let report = session.run(&script)?;

    if let Some(path) = &config.save_path {
        session
            .workshop()
            .save_to_path(path)
            .with_context(|| format!("Failed to save workshop to {}", path.display()))?;
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn build_registry(config: &EmberforgeConfig) -> MaterialRegistry {
    let registry = MaterialRegistry::new();
    if config.include_builtin_materials {
        match starter_pack() {
            Ok(pack) => registry.register_pack(pack),
            Err(err) => error!(%err, "Built-in materials failed to load"),
        }
    }
    if let Some(path) = &config.materials_pack {
        match pack_from_file(path) {
            Ok(pack) => registry.register_pack(pack),
            Err(err) => warn!(
                "Failed to load material pack {}: {err}. Continuing without it",
                path.display()
            ),
        }
    }
    registry
}

fn print_usage() {
    println!(
        "Usage: emberforge [--config PATH] [--script PATH] [--save PATH] [--seed N] [--write-config PATH]\n\
         \n\
         Runs a scripted smithing session and prints the result as JSON.\n\
         Without --script a built-in demo session is played.\n\
         Logging goes to stderr; set RUST_LOG or log_level in the config to adjust."
    );
}

#[derive(Debug, Default)]
struct CliOptions {
    help: bool,
    config: Option<PathBuf>,
    script: Option<PathBuf>,
    save: Option<PathBuf>,
    write_config: Option<PathBuf>,
    seed: Option<u64>,
    /// Parse problems, reported once logging is up.
    problems: Vec<String>,
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Self {
        let mut opts = CliOptions::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => opts.help = true,
                "--config" => opts.config = opts.path_arg(&arg, args.next()),
                "--script" => opts.script = opts.path_arg(&arg, args.next()),
                "--save" => opts.save = opts.path_arg(&arg, args.next()),
                "--write-config" => opts.write_config = opts.path_arg(&arg, args.next()),
                "--seed" => match args.next().map(|raw| (raw.parse::<u64>(), raw)) {
                    Some((Ok(value), _)) => opts.seed = Some(value),
                    Some((Err(err), raw)) => opts
                        .problems
                        .push(format!("--seed must be an integer (got {raw}): {err}")),
                    None => opts.problems.push("--seed requires an integer".to_string()),
                },
                other => opts.problems.push(format!("Unknown argument: {other}")),
            }
        }

        opts
    }

    fn path_arg(&mut self, flag: &str, value: Option<String>) -> Option<PathBuf> {
        if value.is_none() {
            self.problems.push(format!("{flag} requires a path"));
        }
        value.map(PathBuf::from)
    }
}
