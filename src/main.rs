//! Level Tuning CLI
//!
//! Binds the global and per-level tuning tiers into a settings store,
//! resolves preset chains on top of them, and reports the result.

use anyhow::{Result, bail};
use clap::Parser;
use level_tuning::cli::check::{CheckArgs, CheckReport};
use level_tuning::cli::diff::{DiffArgs, DiffFormat};
use level_tuning::cli::resolve::ResolveArgs;
use level_tuning::cli::{Cli, Command, ConfigArgs};
use level_tuning::config::{Config, ConfigLoader, ConfigPaths};
use level_tuning::error::Diagnostics;
use level_tuning::export::Snapshot;
use level_tuning::export::diff::{diff_level, diff_snapshots};
use level_tuning::groups::TuningConfig;
use level_tuning::overrides::ResolvedOverrides;
use level_tuning::presets::PresetLibrary;
use level_tuning::store::{MemoryStore, SettingsStore, YamlFileStore};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on --log option
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    let mut paths = ConfigPaths::discover();
    if let Some(config_path) = &cli.config {
        paths = paths.with_explicit(config_path);
    }
    let mut loader = ConfigLoader::load_with_paths(paths)?;

    // CLI path flags win over every config tier
    let config = loader.config_mut();
    if let Some(store) = cli.store {
        config.paths.store = store;
    }
    if let Some(presets) = cli.presets {
        config.paths.presets = presets;
    }
    if let Some(snapshot) = cli.snapshot {
        config.paths.snapshot = snapshot;
    }
    if let Some(path) = loader.config_path() {
        debug!(path = %path.display(), "configuration loaded");
    }

    match cli.command {
        Command::Bind => run_bind(loader.config()),
        Command::Check(args) => run_check(loader.config(), args),
        Command::Resolve(args) => run_resolve(loader.config(), args),
        Command::Diff(args) => run_diff(loader.config(), args),
        Command::Config(args) => run_config(&loader, args),
    }
}

fn load_snapshot(config: &Config) -> Result<Snapshot> {
    let snapshot = Snapshot::from_file(&config.paths.snapshot)?;
    if !snapshot.is_schema_compatible() {
        warn!(
            path = %config.paths.snapshot.display(),
            schema_version = snapshot.schema_version,
            "snapshot schema version differs from this build; fields may be missing"
        );
    }
    Ok(snapshot)
}

/// Preset file is optional: a missing file means no presets.
fn load_presets(
    config: &Config,
    snapshot: &Snapshot,
    diagnostics: &Diagnostics,
) -> Result<PresetLibrary> {
    let path = &config.paths.presets;
    if !path.exists() {
        debug!(path = %path.display(), "no preset file");
        return Ok(PresetLibrary::default());
    }
    PresetLibrary::from_file(path, snapshot, diagnostics)
}

/// In-memory copy of the store file, so read-only commands never write it.
fn load_store_copy(config: &Config) -> Result<Arc<dyn SettingsStore>> {
    let file = YamlFileStore::open(&config.paths.store)?;
    Ok(Arc::new(MemoryStore::from_document(file.document())))
}

fn build_tiers(
    config: &Config,
    store: Arc<dyn SettingsStore>,
    snapshot: &Snapshot,
    diagnostics: &Diagnostics,
) -> Result<TuningConfig> {
    TuningConfig::build(store, snapshot, diagnostics, &config.tiers)
}

fn run_bind(config: &Config) -> Result<()> {
    let snapshot = load_snapshot(config)?;
    let diagnostics = Diagnostics::new();
    let store = Arc::new(YamlFileStore::open(&config.paths.store)?);
    let tuning = build_tiers(config, store, &snapshot, &diagnostics)?;

    let set_levels = tuning.levels.values().filter(|l| l.is_set()).count();
    println!(
        "Bound global tier and {} levels into {}",
        tuning.levels.len(),
        config.paths.store.display()
    );
    println!(
        "  global: {}",
        if tuning.global.is_set() { "set" } else { "default" }
    );
    println!("  levels with overrides: {}", set_levels);
    if !diagnostics.is_empty() {
        println!("  warnings: {}", diagnostics.len());
    }
    Ok(())
}

fn run_check(config: &Config, args: CheckArgs) -> Result<()> {
    let snapshot = load_snapshot(config)?;
    let diagnostics = Diagnostics::new();
    let tuning = build_tiers(config, load_store_copy(config)?, &snapshot, &diagnostics)?;
    let library = load_presets(config, &snapshot, &diagnostics)?;

    let report = CheckReport::collect(&tuning, library.presets().len(), &diagnostics);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report);
    }

    if !report.passed() {
        bail!("{} malformed values in {}", report.malformed.len(), config.paths.store.display());
    }
    Ok(())
}

fn run_resolve(config: &Config, args: ResolveArgs) -> Result<()> {
    let snapshot = load_snapshot(config)?;
    let diagnostics = Diagnostics::new();
    let tuning = build_tiers(config, load_store_copy(config)?, &snapshot, &diagnostics)?;
    let library = load_presets(config, &snapshot, &diagnostics)?;
    let resolved = ResolvedOverrides::resolve(&tuning, &library);

    if let Some(ref level) = args.level
        && resolved.level(level).is_none()
    {
        bail!("Unknown level '{}'", level);
    }

    let selected: BTreeMap<&str, _> = resolved
        .levels()
        .filter(|(id, _)| args.level.as_deref().is_none_or(|l| l == *id))
        .filter(|(_, bundle)| args.include_empty || !bundle.is_empty())
        .collect();

    let json = if args.compact {
        serde_json::to_string(&selected)?
    } else {
        serde_json::to_string_pretty(&selected)?
    };

    match args.output.as_ref().or(config.paths.output.as_ref()) {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, json)?;
            info!(path = %path.display(), levels = selected.len(), "overrides written");
            eprintln!("Wrote {} levels to {}", selected.len(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn run_diff(config: &Config, args: DiffArgs) -> Result<()> {
    if let Some(ref target_path) = args.against {
        let source = load_snapshot(config)?;
        let target = Snapshot::from_file(target_path)?;
        let mut diff = diff_snapshots(&source, &target);
        diff.source_label = config.paths.snapshot.display().to_string();
        diff.target_label = target_path.display().to_string();
        diff.tables.retain(|name, _| args.should_include_group(name));

        match args.format {
            DiffFormat::Text => print!("{}", diff),
            DiffFormat::Json => println!("{}", serde_json::to_string_pretty(&diff)?),
            DiffFormat::Summary => {
                println!("Diff: {} -> {}", diff.source_label, diff.target_label);
                if diff.is_empty() {
                    println!("No differences found.");
                } else {
                    for (table, added, removed, modified) in diff.summary() {
                        println!("  {}: +{} -{} ~{}", table, added, removed, modified);
                    }
                    println!("Total: {} changes", diff.total_changes());
                }
            }
        }
        return Ok(());
    }

    let Some(ref level) = args.level else {
        bail!("either --level or --against is required");
    };

    let snapshot = load_snapshot(config)?;
    let diagnostics = Diagnostics::new();
    let tuning = build_tiers(config, load_store_copy(config)?, &snapshot, &diagnostics)?;
    let library = load_presets(config, &snapshot, &diagnostics)?;
    let resolved = ResolvedOverrides::resolve(&tuning, &library);
    let Some(bundle) = resolved.level(level) else {
        bail!("Unknown level '{}'", level);
    };

    let mut diff = diff_level(level, bundle);
    diff.retain_groups(|name| args.should_include_group(name));

    match args.format {
        DiffFormat::Text => print!("{}", diff),
        DiffFormat::Json => println!("{}", serde_json::to_string_pretty(&diff)?),
        DiffFormat::Summary => {
            println!("Level: {}", diff.level);
            if diff.is_empty() {
                println!("No overrides.");
            } else {
                for (group, count) in diff.summary() {
                    println!("  {}: ~{}", group, count);
                }
                println!("Total: {} changes", diff.total_changes());
            }
        }
    }
    Ok(())
}

fn run_config(loader: &ConfigLoader, args: ConfigArgs) -> Result<()> {
    match loader.config_path() {
        Some(path) => println!("# config file: {}", path.display()),
        None => println!("# config file: (defaults only)"),
    }
    print!("{}", serde_yaml::to_string(loader.config())?);

    if args.sources {
        println!();
        println!("# sources");
        for (field, tier) in loader.sources() {
            println!("{}: {}", field, tier);
        }
    }
    Ok(())
}
