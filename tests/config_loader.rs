use reasoning_adapter::config::{Config, ConfigError, Provider};
use std::fs;
use tempfile::TempDir;

fn write_config(content: &str) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("config.toml");
    fs::write(&path, content).expect("Failed to write config");
    (dir, path)
}

#[test]
fn test_config_default_values() {
    let config = Config::default();

    assert_eq!(config.proxy.bind_addr, "127.0.0.1:8080");
    assert_eq!(config.upstream.target, "http://127.0.0.1:1234");
    assert_eq!(config.upstream.connect_timeout_seconds, 5);
    assert_eq!(config.cache.capacity, 1000);
    assert_eq!(config.provider.preset, "llama-cpp");
    assert!(config.provider.reasoning_field.is_none());
}

#[test]
fn test_config_path_ends_with_expected() {
    let path = Config::config_path();
    assert!(path.ends_with("reasoning-adapter/config.toml"));
}

#[test]
fn test_load_full_file() {
    let (_dir, path) = write_config(
        r#"
[proxy]
bind_addr = "0.0.0.0:9090"

[upstream]
target = "https://gpu.internal:8443/api"
connect_timeout_seconds = 10

[cache]
capacity = 50

[provider]
preset = "lmstudio"
"#,
    );

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.proxy.bind_addr, "0.0.0.0:9090");
    assert_eq!(config.upstream.target, "https://gpu.internal:8443/api");
    assert_eq!(config.upstream.connect_timeout_seconds, 10);
    assert_eq!(config.cache.capacity, 50);
    assert_eq!(config.resolve_provider().unwrap(), Provider::lmstudio());
}

#[test]
fn test_partial_file_fills_defaults() {
    let (_dir, path) = write_config("[cache]\ncapacity = 3\n");

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.cache.capacity, 3);
    assert_eq!(config.proxy.bind_addr, "127.0.0.1:8080");
    assert_eq!(config.resolve_provider().unwrap(), Provider::llama_cpp());
}

#[test]
fn test_provider_overrides() {
    let (_dir, path) = write_config(
        r#"
[provider]
preset = "llama.cpp"
reasoning_field = "thoughts"
reasoning_effort_path = ""
"#,
    );

    let provider = Config::load_from(&path).unwrap().resolve_provider().unwrap();
    assert_eq!(provider.name, "llama-cpp");
    assert_eq!(provider.reasoning_field, "thoughts");
    assert!(provider.reasoning_effort_path.is_empty());
}

#[test]
fn test_unknown_preset_fails_validation() {
    let (_dir, path) = write_config("[provider]\npreset = \"vllm\"\n");

    let config = Config::load_from(&path).unwrap();
    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError { .. }));
    assert!(err.to_string().contains("vllm"));
}

#[test]
fn test_override_corrects_invalid_file_value() {
    let (_dir, path) = write_config(
        "[provider]\npreset = \"vllm\"\n\n[upstream]\ntarget = \"not a url\"\n",
    );

    let mut config = Config::load_from(&path).unwrap();
    config.provider.preset = "llama-cpp".to_string();
    config.upstream.target = "http://127.0.0.1:1234".to_string();

    assert!(config.validate().is_ok());
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let (_dir, path) = write_config("[proxy\nbind_addr = ");

    let err = Config::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn test_bad_target_fails_validation() {
    let (_dir, path) = write_config("[upstream]\ntarget = \"not a url\"\n");

    let err = Config::load_from(&path).unwrap().validate().unwrap_err();
    assert!(err.to_string().contains("Invalid upstream target"));
}
