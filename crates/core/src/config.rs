use serde::Deserialize;

/// Root site configuration. Loaded from environment variables with the
/// prefix `METAMECH__`; every field carries the value shipped with the
/// production site as its default, so a bare `SiteConfig::default()` is a
/// working configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub submission: SubmissionConfig,
    #[serde(default)]
    pub payment: PaymentConfig,
    #[serde(default)]
    pub trial: TrialConfig,
}

/// Remote form-submission endpoint (Web3Forms-compatible contract).
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionConfig {
    #[serde(default = "default_submission_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_access_key")]
    pub access_key: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Payment routing targets that are not per-plan catalog data.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Plan-independent wallet payment page.
    #[serde(default = "default_wallet_link")]
    pub wallet_link: String,
    /// Recipient for invoice requests and the fallback contact instruction.
    #[serde(default = "default_sales_email")]
    pub sales_email: String,
}

/// Trial download handed out after a successful trial-request submission.
#[derive(Debug, Clone, Deserialize)]
pub struct TrialConfig {
    #[serde(default = "default_trial_file")]
    pub download_file: String,
    #[serde(default = "default_trial_url")]
    pub download_url: String,
}

fn default_submission_endpoint() -> String {
    "https://api.web3forms.com/submit".into()
}

fn default_access_key() -> String {
    "c7e2117e-876a-443f-9e05-b3a9b0eca813".into()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_wallet_link() -> String {
    "https://revolut.me/saviosyl".into()
}

fn default_sales_email() -> String {
    "hi@metamechsolutions.com".into()
}

fn default_trial_file() -> String {
    "MetaMechTrial.exe".into()
}

fn default_trial_url() -> String {
    "/MetaMechTrial.exe".into()
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_submission_endpoint(),
            access_key: default_access_key(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            wallet_link: default_wallet_link(),
            sales_email: default_sales_email(),
        }
    }
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            download_file: default_trial_file(),
            download_url: default_trial_url(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            submission: SubmissionConfig::default(),
            payment: PaymentConfig::default(),
            trial: TrialConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("METAMECH")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
