//! Reporter configuration from environment variables.

use crate::domain::ConfigError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default contract name of the vote manager.
pub const DEFAULT_CONTRACT_NAME: &str = "vote-manager";

/// Read-only function returning proposal totals.
pub const PROPOSAL_DATA_FUNCTION: &str = "get-proposal-data";

/// Stacks network flavour, which fixes the address version bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StacksNetwork {
    #[default]
    Mainnet,
    Testnet,
}

impl StacksNetwork {
    /// Single-sig address version (`SP` / `ST`).
    pub fn single_sig_version(self) -> u8 {
        match self {
            Self::Mainnet => 22,
            Self::Testnet => 26,
        }
    }

    pub fn default_node_url(self) -> &'static str {
        match self {
            Self::Mainnet => "https://api.hiro.so",
            Self::Testnet => "https://api.testnet.hiro.so",
        }
    }
}

impl FromStr for StacksNetwork {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            other => Err(ConfigError::Invalid {
                name: "STACKS_NETWORK",
                reason: format!("expected mainnet or testnet, got {other:?}"),
            }),
        }
    }
}

/// Ledger Reader settings.
#[derive(Debug, Clone)]
pub struct StacksConfig {
    pub network: StacksNetwork,
    /// Base URL of the Stacks node API
    pub node_url: String,
    /// Principal that deployed the vote manager
    pub contract_address: String,
    pub contract_name: String,
    /// Caller principal for read-only calls
    pub sender_address: String,
}

/// Google credentials for the Sheets adapter.
#[derive(Clone)]
pub enum GoogleCredentials {
    /// Service account exchanged for short-lived tokens.
    ServiceAccount {
        client_email: String,
        private_key_pem: String,
    },
    /// Pre-issued bearer token.
    AccessToken(String),
}

impl std::fmt::Debug for GoogleCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ServiceAccount { client_email, .. } => f
                .debug_struct("ServiceAccount")
                .field("client_email", client_email)
                .field("private_key_pem", &"<redacted>")
                .finish(),
            Self::AccessToken(_) => f.debug_tuple("AccessToken").field(&"<redacted>").finish(),
        }
    }
}

/// Record Sink and topic source settings.
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub api_base_url: String,
    pub spreadsheet_id: String,
    /// Range appended to for reports
    pub reports_range: String,
    /// Range holding the voting topics (header row first)
    pub topics_range: String,
    pub credentials: Option<GoogleCredentials>,
}

/// Report Generator and pipeline behaviour.
#[derive(Debug, Clone)]
pub struct ReportingConfig {
    pub ledger_timeout: Duration,
    pub sink_timeout: Duration,
    /// Reports processed in parallel per delivery (1 = sequential)
    pub max_concurrent_reports: usize,
    /// Skip proposals already reported by this process
    pub dedupe_reported: bool,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            ledger_timeout: Duration::from_secs(10),
            sink_timeout: Duration::from_secs(10),
            max_concurrent_reports: 1,
            dedupe_reported: false,
        }
    }
}

/// Complete reporter configuration.
#[derive(Debug, Clone)]
pub struct ReporterConfig {
    pub stacks: StacksConfig,
    pub sheets: SheetsConfig,
    pub reporting: ReportingConfig,
}

impl ReporterConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `STACKS_NETWORK`: mainnet or testnet (default: mainnet)
    /// - `STACKS_NETWORK_URL`: node API base URL (default: Hiro API for the network)
    /// - `VOTE_MANAGER_ADDRESS`: deployer principal, optionally `.contract-name` suffixed
    /// - `VOTE_MANAGER_CONTRACT_NAME`: contract name (default: vote-manager)
    /// - `DEPLOYER_ADDRESS`: read-only caller (default: contract principal)
    /// - `VOTING_SHEET_ID`: spreadsheet id
    /// - `VOTING_SHEET_RANGE`: topics range (default: Topics!A:D)
    /// - `REPORT_SHEET_RANGE`: report range (default: Reports!A:G)
    /// - `GOOGLE_SERVICE_ACCOUNT_EMAIL` / `GOOGLE_PRIVATE_KEY` or `GOOGLE_ACCESS_TOKEN`
    /// - `LEDGER_TIMEOUT_MS` / `SINK_TIMEOUT_MS`: stage timeouts (default: 10000)
    /// - `REPORT_CONCURRENCY`: parallel reports per delivery (default: 1)
    /// - `REPORT_DEDUPE`: skip already reported proposals (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let network = match var("STACKS_NETWORK") {
            Some(raw) => raw.parse()?,
            None => StacksNetwork::default(),
        };

        let manager = var("VOTE_MANAGER_ADDRESS").ok_or(ConfigError::Missing("VOTE_MANAGER_ADDRESS"))?;
        let (contract_address, suffix_name) = match manager.split_once('.') {
            Some((address, name)) => (address.to_string(), Some(name.to_string())),
            None => (manager.clone(), None),
        };
        let contract_name = var("VOTE_MANAGER_CONTRACT_NAME")
            .or(suffix_name)
            .unwrap_or_else(|| DEFAULT_CONTRACT_NAME.to_string());

        let credentials = match (
            var("GOOGLE_SERVICE_ACCOUNT_EMAIL"),
            var("GOOGLE_PRIVATE_KEY"),
            var("GOOGLE_ACCESS_TOKEN"),
        ) {
            (Some(client_email), Some(key), _) => Some(GoogleCredentials::ServiceAccount {
                client_email,
                private_key_pem: key.replace("\\n", "\n"),
            }),
            (_, _, Some(token)) => Some(GoogleCredentials::AccessToken(token)),
            _ => None,
        };

        let defaults = ReportingConfig::default();
        let config = Self {
            stacks: StacksConfig {
                network,
                node_url: var("STACKS_NETWORK_URL")
                    .unwrap_or_else(|| network.default_node_url().to_string())
                    .trim_end_matches('/')
                    .to_string(),
                sender_address: var("DEPLOYER_ADDRESS").unwrap_or_else(|| contract_address.clone()),
                contract_address,
                contract_name,
            },
            sheets: SheetsConfig {
                api_base_url: var("GOOGLE_SHEETS_API_URL")
                    .unwrap_or_else(|| "https://sheets.googleapis.com".to_string()),
                spreadsheet_id: var("VOTING_SHEET_ID").ok_or(ConfigError::Missing("VOTING_SHEET_ID"))?,
                reports_range: var("REPORT_SHEET_RANGE").unwrap_or_else(|| "Reports!A:G".to_string()),
                topics_range: var("VOTING_SHEET_RANGE").unwrap_or_else(|| "Topics!A:D".to_string()),
                credentials,
            },
            reporting: ReportingConfig {
                ledger_timeout: parse_millis(var("LEDGER_TIMEOUT_MS"), "LEDGER_TIMEOUT_MS")?
                    .unwrap_or(defaults.ledger_timeout),
                sink_timeout: parse_millis(var("SINK_TIMEOUT_MS"), "SINK_TIMEOUT_MS")?
                    .unwrap_or(defaults.sink_timeout),
                max_concurrent_reports: match var("REPORT_CONCURRENCY") {
                    Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                        name: "REPORT_CONCURRENCY",
                        reason: format!("not a positive integer: {raw:?}"),
                    })?,
                    None => defaults.max_concurrent_reports,
                },
                dedupe_reported: var("REPORT_DEDUPE")
                    .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                    .unwrap_or(defaults.dedupe_reported),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_principal_like(&self.stacks.contract_address) {
            return Err(ConfigError::Invalid {
                name: "VOTE_MANAGER_ADDRESS",
                reason: format!("not a Stacks principal: {}", self.stacks.contract_address),
            });
        }

        if self.stacks.contract_name.is_empty() {
            return Err(ConfigError::Invalid {
                name: "VOTE_MANAGER_CONTRACT_NAME",
                reason: "contract name cannot be empty".into(),
            });
        }

        if self.reporting.max_concurrent_reports == 0 {
            return Err(ConfigError::Invalid {
                name: "REPORT_CONCURRENCY",
                reason: "must be at least 1".into(),
            });
        }

        if self.reporting.ledger_timeout.is_zero() || self.reporting.sink_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                name: "LEDGER_TIMEOUT_MS",
                reason: "stage timeouts cannot be 0".into(),
            });
        }

        Ok(())
    }
}

fn parse_millis(raw: Option<String>, name: &'static str) -> Result<Option<Duration>, ConfigError> {
    raw.map(|v| {
        v.parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| ConfigError::Invalid {
                name,
                reason: format!("not a number of milliseconds: {v:?}"),
            })
    })
    .transpose()
}

fn is_principal_like(address: &str) -> bool {
    address.len() > 2 && address.starts_with('S') && address.chars().all(|c| c.is_ascii_alphanumeric())
}
