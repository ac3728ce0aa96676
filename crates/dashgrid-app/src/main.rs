//! DashGrid command-line entry point.

mod cli;
mod error;
mod replay;

use clap::Parser;
use cli::{Cli, Command};
use dashgrid_core::{Dashboard, DashboardConfig, FileStorage, WidgetRegistry};
use error::{AppError, AppResult};
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> AppResult<()> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => DashboardConfig::default(),
    };
    let storage = match cli.data_dir {
        Some(dir) => FileStorage::new(dir)?,
        None => FileStorage::default_location()?,
    };
    log::debug!("Using layout storage at {}", storage.base_path().display());

    let mut dashboard = Dashboard::open(Arc::new(storage), WidgetRegistry::builtin(), config, cli.width);

    match cli.command {
        Command::Show => {}
        Command::Catalog { query } => {
            let registry = dashboard.registry();
            let descriptors = match query.as_deref() {
                Some(q) => registry.search(q),
                None => registry.iter().collect(),
            };
            let class = dashboard.viewport().class();
            for d in descriptors {
                let size = d.size_for(class);
                let refresh = d
                    .refresh_interval
                    .as_millis()
                    .map_or_else(|| "off".to_string(), |ms| format!("{}ms", ms));
                println!(
                    "{:<22} {:<24} {:>4}x{:<4} refresh {:<8} {}",
                    d.key, d.title, size.width, size.height, refresh, d.description
                );
            }
            return Ok(());
        }
        Command::Add { widget_type } => {
            let id = dashboard.add_widget(&widget_type)?;
            log::info!("Added widget {}", id);
        }
        Command::Remove { id } => {
            dashboard.remove_widget(&id)?;
        }
        Command::Reset => dashboard.reset_layout(),
        Command::Replay { script } => {
            let json = read(&script)?;
            let steps = replay::parse_script(&json).map_err(|source| AppError::Parse {
                path: script.clone(),
                source,
            })?;
            replay::run_script(&mut dashboard, &steps);
        }
    }

    if dashboard.persistence().is_dirty() {
        log::warn!("Layout changes were not saved");
    }
    println!("{}", dashboard.snapshot().to_json()?);
    Ok(())
}

fn read(path: &Path) -> AppResult<String> {
    fs::read_to_string(path).map_err(|source| AppError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn load_config(path: &Path) -> AppResult<DashboardConfig> {
    let json = read(path)?;
    DashboardConfig::from_json(&json).map_err(|source| AppError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn cli(dir: &Path, args: &[&str]) -> Cli {
        let mut argv = vec!["dashgrid", "--data-dir", dir.to_str().unwrap()];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_add_persists_across_runs() {
        let dir = tempdir().unwrap();
        run(cli(dir.path(), &["add", "EcosystemLeaderboard"])).unwrap();

        let storage = Arc::new(FileStorage::new(dir.path().to_path_buf()).unwrap());
        let dashboard = Dashboard::open(storage, WidgetRegistry::builtin(), DashboardConfig::default(), 1280);
        assert_eq!(dashboard.snapshot().len(), 3);
    }

    #[test]
    fn test_unknown_type_is_an_error() {
        let dir = tempdir().unwrap();
        let result = run(cli(dir.path(), &["add", "Nope"]));
        assert!(matches!(result, Err(AppError::Layout(_))));
    }

    #[test]
    fn test_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        fs::write(&config_path, r#"{ "viewport": { "mobile_max_width": 2000 } }"#).unwrap();
        assert!(load_config(&config_path).unwrap().viewport.mobile_max_width == 2000);

        fs::write(&config_path, "not json").unwrap();
        assert!(matches!(load_config(&config_path), Err(AppError::Parse { .. })));
        assert!(matches!(load_config(&dir.path().join("missing.json")), Err(AppError::Read { .. })));
    }
}
