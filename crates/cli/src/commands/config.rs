use std::env;
use std::fs;
use std::path::Path;

use pizzabot_core::config::{resolve_config_path, AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_key: &str| {
        field_source(key_path, Some(env_key), config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let api_key = redact_token(
        config.llm.api_key.as_ref().map(|key| key.expose_secret()).unwrap_or_default(),
    );

    let entries: Vec<(&str, String, Option<&str>)> = vec![
        (
            "services.pizza_api_base_url",
            config.services.pizza_api_base_url.clone(),
            Some("PIZZABOT_SERVICES_PIZZA_API_BASE_URL"),
        ),
        (
            "services.timeout_secs",
            config.services.timeout_secs.to_string(),
            Some("PIZZABOT_SERVICES_TIMEOUT_SECS"),
        ),
        ("llm.provider", format!("{:?}", config.llm.provider), Some("PIZZABOT_LLM_PROVIDER")),
        ("llm.model", config.llm.model.clone(), Some("PIZZABOT_LLM_MODEL")),
        (
            "llm.base_url",
            config.llm.base_url.clone().unwrap_or_else(|| "<unset>".to_string()),
            Some("PIZZABOT_LLM_BASE_URL"),
        ),
        ("llm.api_key", api_key, Some("PIZZABOT_LLM_API_KEY")),
        (
            "dialogue.intent_mode",
            format!("{:?}", config.dialogue.intent_mode),
            Some("PIZZABOT_DIALOGUE_INTENT_MODE"),
        ),
        (
            "dialogue.address_extraction",
            format!("{:?}", config.dialogue.address_extraction),
            Some("PIZZABOT_DIALOGUE_ADDRESS_EXTRACTION"),
        ),
        (
            "dialogue.order_keywords",
            config.dialogue.order_keywords.join(", "),
            Some("PIZZABOT_DIALOGUE_ORDER_KEYWORDS"),
        ),
        (
            "dialogue.confirm_keywords",
            config.dialogue.confirm_keywords.join(", "),
            Some("PIZZABOT_DIALOGUE_CONFIRM_KEYWORDS"),
        ),
        (
            "dialogue.match_threshold",
            config.dialogue.match_threshold.to_string(),
            Some("PIZZABOT_DIALOGUE_MATCH_THRESHOLD"),
        ),
        ("dialogue.required_slots", config.dialogue.required_slots.join(", "), None),
        ("dialogue.optional_slots", config.dialogue.optional_slots.join(", "), None),
        (
            "server.bind_address",
            config.server.bind_address.clone(),
            Some("PIZZABOT_SERVER_BIND_ADDRESS"),
        ),
        ("server.port", config.server.port.to_string(), Some("PIZZABOT_SERVER_PORT")),
        (
            "server.session_idle_secs",
            config.server.session_idle_secs.to_string(),
            Some("PIZZABOT_SERVER_SESSION_IDLE_SECS"),
        ),
        ("logging.level", config.logging.level.clone(), Some("PIZZABOT_LOGGING_LEVEL")),
        (
            "logging.format",
            format!("{:?}", config.logging.format),
            Some("PIZZABOT_LOGGING_FORMAT"),
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, value, env_key) in entries {
        let origin = match env_key {
            Some(env_key) => source(key, env_key),
            None => field_source(
                key,
                None,
                config_file_doc.as_ref(),
                config_file_path.as_deref(),
            ),
        };
        lines.push(render_line(key, &value, origin));
    }

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: Option<&str>,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_key {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
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

fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<unset>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}
