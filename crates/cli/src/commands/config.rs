use std::env;
use std::fs;
use std::path::Path;

use catalog_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

use crate::commands::CommandResult;

struct ConfigField {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult {
                exit_code: 2,
                output: format!("config validation failed: {error}"),
            };
        }
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(
            field.key_path,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key_path, &field.value, source));
    }

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn fields(config: &AppConfig) -> Vec<ConfigField> {
    vec![
        ConfigField {
            key_path: "server.bind_address",
            env_keys: &["CATALOG_SERVER_BIND_ADDRESS"],
            value: config.server.bind_address.clone(),
        },
        ConfigField {
            key_path: "server.port",
            env_keys: &["CATALOG_SERVER_PORT"],
            value: config.server.port.to_string(),
        },
        ConfigField {
            key_path: "server.cors_allowed_origins",
            env_keys: &["CATALOG_SERVER_CORS_ALLOWED_ORIGINS"],
            value: config.server.cors_allowed_origins.join(","),
        },
        ConfigField {
            key_path: "storage.backend",
            env_keys: &["CATALOG_STORAGE_BACKEND"],
            value: config.storage.backend.as_str().to_string(),
        },
        ConfigField {
            key_path: "storage.path",
            env_keys: &["CATALOG_STORAGE_PATH"],
            value: config.storage.path.display().to_string(),
        },
        ConfigField {
            key_path: "storage.seed_demo_data",
            env_keys: &["CATALOG_STORAGE_SEED_DEMO_DATA"],
            value: config.storage.seed_demo_data.to_string(),
        },
        ConfigField {
            key_path: "logging.level",
            env_keys: &["CATALOG_LOGGING_LEVEL", "CATALOG_LOG_LEVEL"],
            value: config.logging.level.clone(),
        },
        ConfigField {
            key_path: "logging.format",
            env_keys: &["CATALOG_LOGGING_FORMAT", "CATALOG_LOG_FORMAT"],
            value: format!("{:?}", config.logging.format).to_ascii_lowercase(),
        },
    ]
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
