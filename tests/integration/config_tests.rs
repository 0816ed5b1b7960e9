//! Integration tests for the configuration stack: defaults, TOML file,
//! `DUPFIND_*` environment variables and command-line flags.

use clap::Parser;
use dupfind::actions::TrashMethod;
use dupfind::cli::Cli;
use dupfind::config::{Config, ConfigError};
use dupfind::scanner::HashAlgorithm;
use std::fs;
use std::sync::Mutex;
use tempfile::tempdir;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Clear all DUPFIND_* environment variables to avoid interference.
fn clear_env() {
    for (key, _) in std::env::vars() {
        if key.starts_with("DUPFIND_") {
            std::env::remove_var(key);
        }
    }
}

fn write_config(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, content).unwrap();
    (dir, path)
}

#[test]
fn test_load_explicit_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let (_dir, path) = write_config(
        r#"
io_threads = 2
algorithm = "blake3"
trash_method = "permanent"
trash_timeout_secs = 30
sort_by_size = false
extra_exclusions = ["target", "*.log"]
"#,
    );

    let config = Config::load(Some(&path)).unwrap();

    assert_eq!(config.io_threads, 2);
    assert_eq!(config.algorithm, HashAlgorithm::Blake3);
    assert_eq!(config.trash_method, TrashMethod::Permanent);
    assert_eq!(config.trash_timeout_secs, 30);
    assert!(!config.sort_by_size);
    assert_eq!(config.extra_exclusions, vec!["target", "*.log"]);
    assert_eq!(config.block_size, 4096);
}

#[test]
fn test_partial_file_keeps_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let (_dir, path) = write_config("io_threads = 6\n");

    let config = Config::load(Some(&path)).unwrap();

    assert_eq!(
        config,
        Config {
            io_threads: 6,
            ..Config::default()
        }
    );
}

#[test]
fn test_env_overrides_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let (_dir, path) = write_config("io_threads = 2\nalgorithm = \"sha256\"\n");

    std::env::set_var("DUPFIND_IO_THREADS", "12");
    std::env::set_var("DUPFIND_ALGORITHM", "blake3");
    let config = Config::load(Some(&path));
    clear_env();

    let config = config.unwrap();
    assert_eq!(config.io_threads, 12);
    assert_eq!(config.algorithm, HashAlgorithm::Blake3);
}

#[test]
fn test_cli_overrides_env_and_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let (_dir, path) = write_config("io_threads = 2\ntrash_method = \"xdg\"\n");

    std::env::set_var("DUPFIND_IO_THREADS", "12");
    let loaded = Config::load(Some(&path));
    clear_env();
    let mut config = loaded.unwrap();

    let cli = Cli::try_parse_from([
        "dupfind",
        "--io-threads",
        "3",
        "--auto-clean",
        "--permanent",
        "/data",
    ])
    .unwrap();
    cli.apply_to(&mut config);

    assert_eq!(config.io_threads, 3);
    assert_eq!(config.trash_method, TrashMethod::Permanent);
}

#[test]
fn test_unknown_trash_method_suggests_closest() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let (_dir, path) = write_config("trash_method = \"permanant\"\n");

    let err = Config::load(Some(&path)).unwrap_err();

    assert!(matches!(err, ConfigError::Invalid(_)));
    let message = err.to_string();
    assert!(message.contains("did you mean 'permanent'"), "{}", message);
}

#[test]
fn test_unknown_env_value_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let (_dir, path) = write_config("");

    std::env::set_var("DUPFIND_ALGORITHM", "md5");
    let result = Config::load(Some(&path));
    clear_env();

    let message = result.unwrap_err().to_string();
    assert!(message.contains("unknown algorithm 'md5'"), "{}", message);
    assert!(message.contains("sha256, blake3"), "{}", message);
}

#[test]
fn test_out_of_range_values_fail_validation() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let (_dir, path) = write_config("trash_timeout_secs = 0\n");

    let err = Config::load(Some(&path)).unwrap_err();

    assert!(matches!(
        err,
        ConfigError::OutOfRange {
            key: "trash_timeout_secs",
            ..
        }
    ));
}

#[test]
fn test_wrong_type_is_invalid() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let (_dir, path) = write_config("io_threads = \"many\"\n");

    assert!(matches!(
        Config::load(Some(&path)),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_missing_explicit_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    let err = Config::load(Some(&missing)).unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("config file not found: {}", missing.display())
    );
}

#[test]
fn test_rendered_config_loads_back() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let original = Config {
        io_threads: 7,
        algorithm: HashAlgorithm::Blake3,
        trash_method: TrashMethod::Xdg,
        extra_exclusions: vec!["build".to_string()],
        sort_by_size: false,
        ..Config::default()
    };

    let (_dir, path) = write_config(&original.to_toml_string().unwrap());
    let loaded = Config::load(Some(&path)).unwrap();

    assert_eq!(loaded, original);
}

#[test]
fn test_default_path_is_named_config_toml() {
    if let Some(path) = Config::default_path() {
        assert_eq!(path.file_name().unwrap(), "config.toml");
        assert!(path.to_string_lossy().contains("dupfind"));
    }
}
