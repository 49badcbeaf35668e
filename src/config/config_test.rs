use std::error::Error;

use crate::config::{ControllerBackend, Settings};
use crate::console::ConsoleKind;

#[tokio::test]
async fn test_defaults() -> Result<(), Box<dyn Error>> {
    let settings = Settings::default();
    assert_eq!(settings.console, ConsoleKind::GameCube);
    assert_eq!(settings.controller_count, 1);
    assert_eq!(settings.backend, ControllerBackend::Uinput);
    assert_eq!(settings.command_prefix, '!');
    assert_eq!(settings.credits_interval_secs, 120);
    assert_eq!(settings.credits_amount, 100);
    assert_eq!(settings.limits.max_input_duration_ms, 60000);
    assert_eq!(settings.limits.default_input_duration_ms, 200);
    assert_eq!(settings.limits.max_macro_recursion, 10);
    assert_eq!(settings.limits.max_pause_hold_duration_ms, None);
    assert_eq!(settings.limits.pause_input, None);
    Ok(())
}

#[tokio::test]
async fn test_partial_yaml_fills_defaults() -> Result<(), Box<dyn Error>> {
    let content = String::from("console: snes\nlimits:\n  max_input_duration_ms: 5000\n");
    let settings = Settings::from_yaml(content)?;
    assert_eq!(settings.console, ConsoleKind::Snes);
    assert_eq!(settings.limits.max_input_duration_ms, 5000);
    // Everything unnamed falls back to its default
    assert_eq!(settings.limits.default_input_duration_ms, 200);
    assert_eq!(settings.backend, ControllerBackend::Uinput);
    assert_eq!(settings.controller_count, 1);
    Ok(())
}

#[tokio::test]
async fn test_console_alias_and_backend_tags() -> Result<(), Box<dyn Error>> {
    let settings = Settings::from_yaml(String::from("console: gc\nbackend: memory\n"))?;
    assert_eq!(settings.console, ConsoleKind::GameCube);
    assert_eq!(settings.backend, ControllerBackend::Memory);

    let settings = Settings::from_yaml(String::from("backend: uinput\n"))?;
    assert_eq!(settings.backend, ControllerBackend::Uinput);
    Ok(())
}

#[tokio::test]
async fn test_pause_settings() -> Result<(), Box<dyn Error>> {
    let content =
        String::from("limits:\n  pause_input: start\n  max_pause_hold_duration_ms: 500\n");
    let settings = Settings::from_yaml(content)?;
    assert_eq!(settings.limits.pause_input.as_deref(), Some("start"));
    assert_eq!(settings.limits.max_pause_hold_duration_ms, Some(500));
    Ok(())
}

#[tokio::test]
async fn test_yaml_roundtrip() -> Result<(), Box<dyn Error>> {
    let settings = Settings {
        console: ConsoleKind::Wii,
        controller_count: 4,
        backend: ControllerBackend::Memory,
        ..Default::default()
    };
    let content = serde_yaml::to_string(&settings)?;
    let loaded = Settings::from_yaml(content)?;
    assert_eq!(loaded.console, ConsoleKind::Wii);
    assert_eq!(loaded.controller_count, 4);
    assert_eq!(loaded.backend, ControllerBackend::Memory);
    Ok(())
}

#[tokio::test]
async fn test_invalid_yaml_errors() -> Result<(), Box<dyn Error>> {
    assert!(Settings::from_yaml(String::from("console: [oops")).is_err());
    assert!(Settings::from_yaml(String::from("console: dreamcast")).is_err());
    Ok(())
}
