use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Default endpoint of the A3RT small-talk API proxied by POST /talk.
pub const DEFAULT_TALK_API_URL: &str = "https://api.a3rt.recruit.co.jp/talk/v1/smalltalk";

/// myjlab demo backend server
#[derive(Parser, Serialize, Deserialize, Clone, Debug)]
#[command(name = "myjlab-server", version, about = "myjlab demo backend server")]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "MYJLAB_PORT", default_value = "8000")]
    pub port: u16,

    /// Bind address
    #[arg(long, env = "MYJLAB_BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind_address: String,

    /// Path to TOML config file
    #[arg(long, default_value = "./myjlab.toml")]
    pub config: String,

    /// Enable structured JSON logging (for Docker/production)
    #[arg(long, env = "MYJLAB_JSON_LOGS")]
    pub json_logs: bool,

    /// Output a commented TOML config template and exit
    #[arg(long)]
    pub generate_config: bool,

    /// Upstream small-talk API endpoint
    #[arg(long, env = "MYJLAB_TALK_API_URL", default_value = DEFAULT_TALK_API_URL)]
    pub talk_api_url: String,

    /// API key sent to the upstream small-talk API
    #[arg(long, env = "MYJLAB_TALK_API_KEY", default_value = "")]
    pub talk_api_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_address: "0.0.0.0".to_string(),
            config: "./myjlab.toml".to_string(),
            json_logs: false,
            generate_config: false,
            talk_api_url: DEFAULT_TALK_API_URL.to_string(),
            talk_api_key: String::new(),
        }
    }
}

impl Config {
    /// Load config with layered precedence:
    /// built-in defaults < TOML file < env vars (MYJLAB_*) < CLI args
    pub fn load() -> Result<Self, figment::Error> {
        let cli = Config::parse();
        let config_path = cli.config.clone();

        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_path))
            .merge(Env::prefixed("MYJLAB_"))
            .merge(Serialized::defaults(cli))
            .extract()
    }
}

/// Generate a commented TOML config template
pub fn generate_config_template() -> String {
    r#"# myjlab Demo Backend Configuration
# Place this file at ./myjlab.toml or specify with --config <path>
# All settings can be overridden via environment variables (MYJLAB_PORT, etc.)
# or CLI flags (--port, etc.)

# Server port (default: 8000)
# port = 8000

# Bind address (default: 0.0.0.0 — all interfaces)
# bind_address = "0.0.0.0"

# Enable structured JSON logging for Docker/production
# json_logs = false

# ---- Small-talk Proxy ----

# Upstream small-talk API endpoint (default: A3RT smalltalk)
# talk_api_url = "https://api.a3rt.recruit.co.jp/talk/v1/smalltalk"

# API key sent to the upstream small-talk API
# Required for POST /talk to succeed against the real upstream
# talk_api_key = ""
"#
    .to_string()
}
