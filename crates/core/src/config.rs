use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dialogue::engine::DialogueSettings;
use crate::dialogue::slots::{Requirement, SlotCatalog, SlotId};
use crate::validation::KeywordSet;

pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["pizzabot.toml", "config/pizzabot.toml"];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub services: ServicesConfig,
    pub llm: LlmConfig,
    pub dialogue: DialogueConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServicesConfig {
    pub pizza_api_base_url: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DialogueConfig {
    pub intent_mode: IntentMode,
    pub address_extraction: AddressExtraction,
    pub order_keywords: Vec<String>,
    pub confirm_keywords: Vec<String>,
    pub description_keywords: Vec<String>,
    pub match_threshold: u8,
    pub required_slots: Vec<String>,
    pub optional_slots: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
    /// Conversations without a turn for this long are dropped.
    pub session_idle_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    #[serde(rename = "openai")]
    OpenAi,
    Ollama,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentMode {
    Keyword,
    Llm,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressExtraction {
    Regex,
    Llm,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub pizza_api_base_url: Option<String>,
    pub log_level: Option<String>,
    pub llm_provider: Option<LlmProvider>,
    pub llm_model: Option<String>,
    pub intent_mode: Option<IntentMode>,
    pub address_extraction: Option<AddressExtraction>,
    pub server_port: Option<u16>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            services: ServicesConfig {
                pizza_api_base_url: "http://localhost:8000".to_string(),
                timeout_secs: 10,
            },
            llm: LlmConfig {
                provider: LlmProvider::Ollama,
                api_key: None,
                base_url: Some("http://localhost:11434/v1".to_string()),
                model: "llama3.1".to_string(),
                timeout_secs: 30,
            },
            dialogue: DialogueConfig::default(),
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
                session_idle_secs: 1800,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl Default for DialogueConfig {
    fn default() -> Self {
        let names = |slots: &[SlotId]| slots.iter().map(|slot| slot.to_string()).collect();
        Self {
            intent_mode: IntentMode::Keyword,
            address_extraction: AddressExtraction::Regex,
            order_keywords: vec!["order".to_string(), "pizza".to_string()],
            confirm_keywords: vec!["yes".to_string()],
            description_keywords: vec![
                "menu".to_string(),
                "describe".to_string(),
                "description".to_string(),
            ],
            match_threshold: 80,
            required_slots: names(&[
                SlotId::PizzaName,
                SlotId::CustomerAddress,
                SlotId::AdditionalInfoFlag,
            ]),
            optional_slots: names(&[SlotId::CustomerTelNumber, SlotId::DeliveryTime]),
        }
    }
}

impl DialogueConfig {
    pub fn catalog(&self) -> Result<SlotCatalog, ConfigError> {
        SlotCatalog::from_names(&self.required_slots, &self.optional_slots)
            .map_err(|error| ConfigError::Validation(format!("dialogue slots: {error}")))
    }

    pub fn settings(&self) -> Result<DialogueSettings, ConfigError> {
        Ok(DialogueSettings {
            catalog: self.catalog()?,
            match_threshold: self.match_threshold,
            confirm_keywords: KeywordSet::new(&self.confirm_keywords),
        })
    }

    pub fn order_keyword_set(&self) -> KeywordSet {
        KeywordSet::new(&self.order_keywords)
    }

    pub fn description_keyword_set(&self) -> KeywordSet {
        KeywordSet::new(&self.description_keywords)
    }
}

impl LlmConfig {
    pub fn api_key_value(&self) -> Option<&str> {
        self.api_key.as_ref().map(|key| key.expose_secret()).filter(|key| !key.trim().is_empty())
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_CANDIDATES[0]));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// True when any part of the dialogue calls out to the language model.
    pub fn uses_llm(&self) -> bool {
        self.dialogue.intent_mode == IntentMode::Llm
            || self.dialogue.address_extraction == AddressExtraction::Llm
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(services) = patch.services {
            if let Some(pizza_api_base_url) = services.pizza_api_base_url {
                self.services.pizza_api_base_url = pizza_api_base_url;
            }
            if let Some(timeout_secs) = services.timeout_secs {
                self.services.timeout_secs = timeout_secs;
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(provider) = llm.provider {
                self.llm.provider = provider;
            }
            if let Some(llm_api_key_value) = llm.api_key {
                self.llm.api_key = Some(secret_value(llm_api_key_value));
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = Some(base_url);
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
        }

        if let Some(dialogue) = patch.dialogue {
            if let Some(intent_mode) = dialogue.intent_mode {
                self.dialogue.intent_mode = intent_mode;
            }
            if let Some(address_extraction) = dialogue.address_extraction {
                self.dialogue.address_extraction = address_extraction;
            }
            if let Some(order_keywords) = dialogue.order_keywords {
                self.dialogue.order_keywords = order_keywords;
            }
            if let Some(confirm_keywords) = dialogue.confirm_keywords {
                self.dialogue.confirm_keywords = confirm_keywords;
            }
            if let Some(description_keywords) = dialogue.description_keywords {
                self.dialogue.description_keywords = description_keywords;
            }
            if let Some(match_threshold) = dialogue.match_threshold {
                self.dialogue.match_threshold = match_threshold;
            }
            if let Some(required_slots) = dialogue.required_slots {
                self.dialogue.required_slots = required_slots;
            }
            if let Some(optional_slots) = dialogue.optional_slots {
                self.dialogue.optional_slots = optional_slots;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
            if let Some(session_idle_secs) = server.session_idle_secs {
                self.server.session_idle_secs = session_idle_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("PIZZABOT_SERVICES_PIZZA_API_BASE_URL") {
            self.services.pizza_api_base_url = value;
        }
        if let Some(value) = read_env("PIZZABOT_SERVICES_TIMEOUT_SECS") {
            self.services.timeout_secs = parse_u64("PIZZABOT_SERVICES_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("PIZZABOT_LLM_PROVIDER") {
            self.llm.provider = value.parse()?;
        }
        if let Some(value) = read_env("PIZZABOT_LLM_API_KEY") {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("PIZZABOT_LLM_BASE_URL") {
            self.llm.base_url = Some(value);
        }
        if let Some(value) = read_env("PIZZABOT_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("PIZZABOT_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("PIZZABOT_LLM_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("PIZZABOT_DIALOGUE_INTENT_MODE") {
            self.dialogue.intent_mode = value.parse()?;
        }
        if let Some(value) = read_env("PIZZABOT_DIALOGUE_ADDRESS_EXTRACTION") {
            self.dialogue.address_extraction = value.parse()?;
        }
        if let Some(value) = read_env("PIZZABOT_DIALOGUE_ORDER_KEYWORDS") {
            self.dialogue.order_keywords = parse_list(&value);
        }
        if let Some(value) = read_env("PIZZABOT_DIALOGUE_CONFIRM_KEYWORDS") {
            self.dialogue.confirm_keywords = parse_list(&value);
        }
        if let Some(value) = read_env("PIZZABOT_DIALOGUE_MATCH_THRESHOLD") {
            self.dialogue.match_threshold = parse_u8("PIZZABOT_DIALOGUE_MATCH_THRESHOLD", &value)?;
        }

        if let Some(value) = read_env("PIZZABOT_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("PIZZABOT_SERVER_PORT") {
            self.server.port = parse_u16("PIZZABOT_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("PIZZABOT_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("PIZZABOT_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }
        if let Some(value) = read_env("PIZZABOT_SERVER_SESSION_IDLE_SECS") {
            self.server.session_idle_secs =
                parse_u64("PIZZABOT_SERVER_SESSION_IDLE_SECS", &value)?;
        }

        let log_level =
            read_env("PIZZABOT_LOGGING_LEVEL").or_else(|| read_env("PIZZABOT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("PIZZABOT_LOGGING_FORMAT").or_else(|| read_env("PIZZABOT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(pizza_api_base_url) = overrides.pizza_api_base_url {
            self.services.pizza_api_base_url = pizza_api_base_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(llm_provider) = overrides.llm_provider {
            self.llm.provider = llm_provider;
        }
        if let Some(llm_model) = overrides.llm_model {
            self.llm.model = llm_model;
        }
        if let Some(intent_mode) = overrides.intent_mode {
            self.dialogue.intent_mode = intent_mode;
        }
        if let Some(address_extraction) = overrides.address_extraction {
            self.dialogue.address_extraction = address_extraction;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_services(&self.services)?;
        if self.uses_llm() {
            validate_llm(&self.llm)?;
        }
        validate_dialogue(&self.dialogue)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::Validation(format!(
                "unsupported llm provider `{other}` (expected openai|ollama)"
            ))),
        }
    }
}

impl std::str::FromStr for IntentMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "keyword" => Ok(Self::Keyword),
            "llm" => Ok(Self::Llm),
            other => Err(ConfigError::Validation(format!(
                "unsupported intent mode `{other}` (expected keyword|llm)"
            ))),
        }
    }
}

impl std::str::FromStr for AddressExtraction {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "regex" => Ok(Self::Regex),
            "llm" => Ok(Self::Llm),
            other => Err(ConfigError::Validation(format!(
                "unsupported address extraction `{other}` (expected regex|llm)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

/// First existing config file: the explicit path if given, otherwise the
/// standard locations relative to the working directory.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    CONFIG_FILE_CANDIDATES.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_services(services: &ServicesConfig) -> Result<(), ConfigError> {
    let url = services.pizza_api_base_url.trim();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "services.pizza_api_base_url must start with http:// or https://".to_string(),
        ));
    }

    if services.timeout_secs == 0 || services.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "services.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if llm.model.trim().is_empty() {
        return Err(ConfigError::Validation("llm.model must not be empty".to_string()));
    }

    match llm.provider {
        LlmProvider::OpenAi => {
            if llm.api_key_value().is_none() {
                return Err(ConfigError::Validation(
                    "llm.api_key is required for the openai provider".to_string(),
                ));
            }
        }
        LlmProvider::Ollama => {
            let missing =
                llm.base_url.as_ref().map(|value| value.trim().is_empty()).unwrap_or(true);
            if missing {
                return Err(ConfigError::Validation(
                    "llm.base_url is required for ollama provider".to_string(),
                ));
            }
        }
    }

    Ok(())
}

fn validate_dialogue(dialogue: &DialogueConfig) -> Result<(), ConfigError> {
    if !(1..=100).contains(&dialogue.match_threshold) {
        return Err(ConfigError::Validation(
            "dialogue.match_threshold must be in range 1..=100".to_string(),
        ));
    }

    if dialogue.intent_mode == IntentMode::Keyword && dialogue.order_keyword_set().is_empty() {
        return Err(ConfigError::Validation(
            "dialogue.order_keywords must contain at least one keyword in keyword mode"
                .to_string(),
        ));
    }

    if dialogue.confirm_keywords.iter().all(|keyword| keyword.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "dialogue.confirm_keywords must contain at least one keyword".to_string(),
        ));
    }

    let catalog = dialogue.catalog()?;
    for slot in [SlotId::PizzaName, SlotId::CustomerAddress] {
        let required = catalog
            .specs()
            .iter()
            .any(|spec| spec.id == slot && spec.requirement == Requirement::Required);
        if !required {
            return Err(ConfigError::Validation(format!(
                "dialogue.required_slots must include `{slot}`"
            )));
        }
    }

    // Optional slots are only reachable through a yes to the required
    // additional-information question.
    let additional_info = catalog.specs().iter().find(|spec| spec.id == SlotId::AdditionalInfoFlag);
    match additional_info.map(|spec| spec.requirement) {
        Some(Requirement::Optional) => {
            return Err(ConfigError::Validation(format!(
                "dialogue.optional_slots must not include `{}`; it gates the optional slots and belongs in dialogue.required_slots",
                SlotId::AdditionalInfoFlag
            )));
        }
        None if !dialogue.optional_slots.is_empty() => {
            return Err(ConfigError::Validation(format!(
                "dialogue.optional_slots can only be asked when `{}` is in dialogue.required_slots",
                SlotId::AdditionalInfoFlag
            )));
        }
        _ => {}
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    if server.session_idle_secs == 0 {
        return Err(ConfigError::Validation(
            "server.session_idle_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_list(value: &str) -> Vec<String> {
    value.split(',').map(str::trim).filter(|item| !item.is_empty()).map(str::to_string).collect()
}

fn parse_u8(key: &str, value: &str) -> Result<u8, ConfigError> {
    value.trim().parse::<u8>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    services: Option<ServicesPatch>,
    llm: Option<LlmPatch>,
    dialogue: Option<DialoguePatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServicesPatch {
    pizza_api_base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    provider: Option<LlmProvider>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct DialoguePatch {
    intent_mode: Option<IntentMode>,
    address_extraction: Option<AddressExtraction>,
    order_keywords: Option<Vec<String>>,
    confirm_keywords: Option<Vec<String>>,
    description_keywords: Option<Vec<String>>,
    match_threshold: Option<u8>,
    required_slots: Option<Vec<String>>,
    optional_slots: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
    session_idle_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
