/// Base system fallback path for configuration if XDG lookup fails
pub const FALLBACK_CONFIG_PATH: &str = "/usr/share/crowdpad";

/// Fallback path for persistent bot data if XDG lookup fails
pub const FALLBACK_DATA_PATH: &str = "/var/lib/crowdpad";

/// File name of the daemon settings file
pub const SETTINGS_FILE: &str = "crowdpad.yaml";

/// File name of the persistent bot data file
pub const DATA_FILE: &str = "data.json";

/// Name prefix for created virtual controller devices. The controller
/// number is appended (e.g. "Crowdpad Controller 0").
pub const CONTROLLER_NAME: &str = "Crowdpad Controller";

/// Chat name attributed to unprefixed lines typed into the terminal
pub const OPERATOR_NAME: &str = "operator";
