//! Configuration types for the pipeline.
//!
//! Every section has working defaults; `EngineConfig::from_env` layers a JSON
//! file and `LEAD_ENGINE_*` overrides on top of them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub normalize: NormalizeConfig,
    pub fetch: FetchConfig,
    pub rate_limits: RateLimitConfig,
    pub cache: CacheConfig,
    pub extract: ExtractConfig,
    pub classifier: ClassifierConfig,
    pub scoring: ScoringConfig,
    pub routing: RoutingConfig,
}

impl EngineConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration the way the batch binary does.
    ///
    /// Reads `.env` if present, then the JSON file named by
    /// `LEAD_ENGINE_CONFIG` (if set), then these overrides:
    /// - `LEAD_ENGINE_PER_HOST_REQUESTS`
    /// - `LEAD_ENGINE_GLOBAL_RPM`
    /// - `LEAD_ENGINE_WORKERS`
    /// - `LEAD_ENGINE_CACHE_TTL_HOURS`
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let mut config = match std::env::var("LEAD_ENGINE_CONFIG") {
            Ok(path) => Self::from_json_file(&path)?,
            Err(_) => Self::default(),
        };

        if let Some(v) = env_parse::<u32>("LEAD_ENGINE_PER_HOST_REQUESTS")? {
            config.rate_limits.per_host_requests = v;
        }
        if let Some(v) = env_parse::<u32>("LEAD_ENGINE_GLOBAL_RPM")? {
            config.rate_limits.global_requests_per_minute = v;
        }
        if let Some(v) = env_parse::<usize>("LEAD_ENGINE_WORKERS")? {
            config.fetch.workers = Some(v);
        }
        if let Some(v) = env_parse::<i64>("LEAD_ENGINE_CACHE_TTL_HOURS")? {
            config.cache.ttl_hours = v;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file; missing sections take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Reject settings that would make shared infrastructure unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limits.per_host_requests == 0 {
            return Err(ConfigError::Zero {
                field: "rate_limits.per_host_requests",
            });
        }
        if self.rate_limits.per_host_window_ms == 0 {
            return Err(ConfigError::Zero {
                field: "rate_limits.per_host_window_ms",
            });
        }
        if self.rate_limits.global_requests_per_minute == 0 {
            return Err(ConfigError::Zero {
                field: "rate_limits.global_requests_per_minute",
            });
        }
        if self.fetch.workers == Some(0) {
            return Err(ConfigError::Zero {
                field: "fetch.workers",
            });
        }
        regex::Regex::new(&self.normalize.tracking_param_pattern).map_err(|source| {
            ConfigError::Pattern {
                field: "normalize.tracking_param_pattern",
                source,
            }
        })?;
        Ok(())
    }

    pub fn with_rate_limits(mut self, rate_limits: RateLimitConfig) -> Self {
        self.rate_limits = rate_limits;
        self
    }

    pub fn with_fetch(mut self, fetch: FetchConfig) -> Self {
        self.fetch = fetch;
        self
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ConfigError::Parse(format!("{key}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// URL normalization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Query parameter names matching this regex are dropped.
    pub tracking_param_pattern: String,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            tracking_param_pattern: r"^(utm_.*|ref|fbclid|gclid|source|mc_cid|mc_eid)$".to_string(),
        }
    }
}

/// HTTP fetch behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Connect phase budget. Default: 5s.
    pub connect_timeout_ms: u64,

    /// Longest wait for any single read once connected. Default: 15s.
    pub read_timeout_ms: u64,

    /// Retries after the first attempt. Default: 2.
    pub max_retries: u32,

    /// First backoff delay. Default: 500ms.
    pub backoff_base_ms: u64,

    /// Backoff multiplier per attempt. Default: 2.0.
    pub backoff_factor: f64,

    /// How long a host stays in cooldown after 429/503. Default: 60s.
    pub cooldown_secs: u64,

    pub user_agent: String,

    /// Fetch worker pool size. Default: derived from the global ceiling.
    pub workers: Option<usize>,

    /// Bodies are truncated past this many bytes. Default: 5 MiB.
    pub max_body_bytes: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 5_000,
            read_timeout_ms: 15_000,
            max_retries: 2,
            backoff_base_ms: 500,
            backoff_factor: 2.0,
            cooldown_secs: 60,
            user_agent: "LeadEngineBot/1.0".to_string(),
            workers: None,
            max_body_bytes: 5 * 1024 * 1024,
        }
    }
}

impl FetchConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = self.backoff_factor.max(1.0).powi(attempt as i32);
        Duration::from_millis((self.backoff_base_ms as f64 * factor).round() as u64)
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_backoff_base_ms(mut self, ms: u64) -> Self {
        self.backoff_base_ms = ms;
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown_secs = cooldown.as_secs();
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = max;
        self
    }
}

/// Throughput ceilings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests allowed to one host per window. Default: 1.
    pub per_host_requests: u32,

    /// Per-host window length. Default: 1000ms.
    pub per_host_window_ms: u64,

    /// Requests allowed across all hosts per minute. Default: 60.
    pub global_requests_per_minute: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_host_requests: 1,
            per_host_window_ms: 1_000,
            global_requests_per_minute: 60,
        }
    }
}

impl RateLimitConfig {
    pub fn new(per_host_requests: u32, per_host_window: Duration, global_rpm: u32) -> Self {
        Self {
            per_host_requests,
            per_host_window_ms: per_host_window.as_millis() as u64,
            global_requests_per_minute: global_rpm,
        }
    }

    pub fn per_host_window(&self) -> Duration {
        Duration::from_millis(self.per_host_window_ms)
    }

    /// Worker pool size matching the global ceiling (requests per second, at least 1).
    pub fn default_workers(&self) -> usize {
        ((self.global_requests_per_minute / 60) as usize).max(1)
    }
}

/// Content cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,

    /// Entries older than this are re-fetched. Default: 24h.
    pub ttl_hours: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_hours: 24,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.ttl_hours)
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}

/// Extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Role taxonomy: tag -> title keywords (matched on word boundaries).
    pub role_keywords: BTreeMap<String, Vec<String>>,

    /// Job titles kept per board. Default: 20.
    pub max_job_titles: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        let roles: [(&str, &[&str]); 8] = [
            ("backend", &["backend", "back-end", "back end", "api", "server"]),
            ("frontend", &["frontend", "front-end", "front end", "react", "ui engineer"]),
            ("fullstack", &["full stack", "fullstack", "full-stack"]),
            ("devops", &["devops", "sre", "site reliability", "platform engineer", "infrastructure"]),
            ("ml_ai", &["machine learning", "ml", "ai", "llm", "data scientist", "nlp"]),
            ("data", &["data engineer", "analytics engineer", "data platform"]),
            ("web3", &["web3", "blockchain", "solidity", "smart contract", "crypto"]),
            ("mobile", &["ios", "android", "mobile", "react native", "flutter"]),
        ];
        Self {
            role_keywords: roles
                .iter()
                .map(|(tag, words)| {
                    (tag.to_string(), words.iter().map(|w| w.to_string()).collect())
                })
                .collect(),
            max_job_titles: 20,
        }
    }
}

/// Keyword vocabularies for the rule classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    pub product_strong: Vec<String>,
    pub product_moderate: Vec<String>,
    pub services_strong: Vec<String>,
    pub services_moderate: Vec<String>,
    pub staffing_strong: Vec<String>,
    pub staffing_moderate: Vec<String>,
    pub enterprise_noise: Vec<String>,
    pub huge_hiring: Vec<String>,
    pub partner_fit: Vec<String>,
    pub product_studio: Vec<String>,
    pub case_studies: Vec<String>,
    pub inbound_channel: Vec<String>,
    pub broad_agency: Vec<String>,
    pub consultancy_terms: Vec<String>,
    pub agency_terms: Vec<String>,
    pub integrator_terms: Vec<String>,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            product_strong: words(&[
                "pricing", "free trial", "sign up", "api", "dashboard", "saas",
                "integrations", "documentation", "self-serve", "per month",
            ]),
            product_moderate: words(&[
                "book a demo", "request a demo", "get started", "start free",
                "our platform", "customers", "changelog", "roadmap",
            ]),
            services_strong: words(&[
                "our services", "we build", "client work", "development services",
                "hire us", "software agency", "consulting services", "we partner with clients",
            ]),
            services_moderate: words(&[
                "clients", "portfolio", "our work", "projects", "custom software",
                "engagement", "agency", "consultancy",
            ]),
            staffing_strong: words(&[
                "staffing", "recruitment agency", "talent acquisition", "staff augmentation",
                "headhunting", "executive search", "placement fee",
            ]),
            staffing_moderate: words(&[
                "recruiters", "candidates", "contract-to-hire", "job seekers", "placements",
                "talent pool",
            ]),
            enterprise_noise: words(&[
                "fortune 500", "global enterprise", "offices worldwide", "nyse", "nasdaq",
            ]),
            huge_hiring: words(&[
                "hundreds of open roles", "10,000 employees", "thousands of employees",
            ]),
            partner_fit: words(&[
                "white label", "white-label", "overflow", "referral partner", "partner program",
            ]),
            product_studio: words(&["product studio", "mvp development", "mvp dev", "venture studio"]),
            case_studies: words(&["case studies", "case study", "portfolio"]),
            inbound_channel: words(&["newsletter", "community", "blog"]),
            broad_agency: words(&["we do everything", "full service", "full-service"]),
            consultancy_terms: words(&["consulting", "consultant", "consultancy", "advisory"]),
            agency_terms: words(&["agency", "studio"]),
            integrator_terms: words(&["integrator", "systems integration", "implementation partner"]),
        }
    }
}

/// Rule classifier thresholds and the secondary-classifier trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Weighted staffing count at or above which a company is a recruiter. Default: 2.
    pub staffing_threshold: u32,

    /// Minimum services/product difference to call either side. Default: 2.
    pub services_product_delta: u32,

    /// Secondary classifier runs below this confidence. Default: 0.5.
    pub secondary_confidence_threshold: f32,

    /// Secondary classifier calls allowed per period. Default: 50.
    pub secondary_budget_per_period: u32,

    pub keywords: KeywordConfig,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            staffing_threshold: 2,
            services_product_delta: 2,
            secondary_confidence_threshold: 0.5,
            secondary_budget_per_period: 50,
            keywords: KeywordConfig::default(),
        }
    }
}

impl ClassifierConfig {
    pub fn with_staffing_threshold(mut self, threshold: u32) -> Self {
        self.staffing_threshold = threshold;
        self
    }

    pub fn with_services_product_delta(mut self, delta: u32) -> Self {
        self.services_product_delta = delta;
        self
    }
}

/// A boost that decays in steps as its evidence ages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecencyBoost {
    /// Points inside the near window
    pub full: i32,
    /// Points inside the far window
    pub reduced: i32,
    pub near_days: i64,
    pub far_days: i64,
}

impl RecencyBoost {
    pub const fn new(full: i32, reduced: i32, near_days: i64, far_days: i64) -> Self {
        Self {
            full,
            reduced,
            near_days,
            far_days,
        }
    }

    /// Points for evidence `age_days` old. Future-dated evidence counts as fresh.
    pub fn value(&self, age_days: i64) -> i32 {
        let age = age_days.max(0);
        if age <= self.near_days {
            self.full
        } else if age <= self.far_days {
            self.reduced
        } else {
            0
        }
    }
}

/// Engineering-role count buckets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleCountWeights {
    pub one_to_two: i32,
    pub three_to_five: i32,
    pub six_to_ten: i32,
    pub eleven_plus: i32,
}

impl Default for RoleCountWeights {
    fn default() -> Self {
        Self {
            one_to_two: 8,
            three_to_five: 15,
            six_to_ten: 20,
            eleven_plus: 12,
        }
    }
}

impl RoleCountWeights {
    pub fn bucket(&self, count: u32) -> Option<(&'static str, i32)> {
        match count {
            0 => None,
            1..=2 => Some(("engineering_roles_1_2", self.one_to_two)),
            3..=5 => Some(("engineering_roles_3_5", self.three_to_five)),
            6..=10 => Some(("engineering_roles_6_10", self.six_to_ten)),
            _ => Some(("engineering_roles_11_plus", self.eleven_plus)),
        }
    }
}

/// MVP-intent weight table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MvpWeights {
    pub ats_board_found: i32,
    pub engineering_roles: RoleCountWeights,
    pub founding_role: i32,
    pub relevant_role_tags: i32,
    pub product_engineer_role: i32,
    pub pricing_page: i32,
    pub docs_page: i32,
    pub integrations_page: i32,
    pub launch: RecencyBoost,
    pub builder_post: i32,
    pub early_funding: RecencyBoost,
    pub series_a_funding: RecencyBoost,
    pub accelerator_member: i32,
    pub ecosystem_listed: i32,
    pub grant_or_hackathon: i32,
    pub services_penalty: i32,
    pub staffing_penalty: i32,
    pub enterprise_noise_penalty: i32,
    pub huge_hiring_penalty: i32,
    /// Role tags that count as relevant engineering demand
    pub relevant_roles: Vec<String>,
}

impl Default for MvpWeights {
    fn default() -> Self {
        Self {
            ats_board_found: 20,
            engineering_roles: RoleCountWeights::default(),
            founding_role: 12,
            relevant_role_tags: 8,
            product_engineer_role: 6,
            pricing_page: 8,
            docs_page: 8,
            integrations_page: 4,
            launch: RecencyBoost::new(10, 4, 30, 90),
            builder_post: 4,
            early_funding: RecencyBoost::new(10, 5, 365, 545),
            series_a_funding: RecencyBoost::new(8, 4, 545, 730),
            accelerator_member: 8,
            ecosystem_listed: 4,
            grant_or_hackathon: 4,
            services_penalty: -25,
            staffing_penalty: -40,
            enterprise_noise_penalty: -10,
            huge_hiring_penalty: -10,
            relevant_roles: words(&["backend", "fullstack", "devops", "ml_ai"]),
        }
    }
}

/// Partnership-fit weight table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PartnershipWeights {
    pub services_type: i32,
    pub product_studio: i32,
    pub partner_fit: i32,
    pub hiring_engineers: i32,
    pub niche_alignment: i32,
    pub case_studies: i32,
    pub inbound_channel: i32,
    pub staffing_language_penalty: i32,
    pub broad_agency_penalty: i32,
}

impl Default for PartnershipWeights {
    fn default() -> Self {
        Self {
            services_type: 20,
            product_studio: 10,
            partner_fit: 15,
            hiring_engineers: 10,
            niche_alignment: 10,
            case_studies: 6,
            inbound_channel: 6,
            staffing_language_penalty: -30,
            broad_agency_penalty: -10,
        }
    }
}

/// Scoring tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub mvp: MvpWeights,
    pub partnership: PartnershipWeights,
}

/// Routing thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Engineering roles that make an unknown company worth a low-priority look. Default: 3.
    pub strong_hiring_threshold: u32,

    /// MVP lane score at which priority becomes high. Default: 60.
    pub mvp_high_priority_score: u32,

    /// Partnership lane score at which priority becomes high. Default: 50.
    pub partnership_high_priority_score: u32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            strong_hiring_threshold: 3,
            mvp_high_priority_score: 60,
            partnership_high_priority_score: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_ceiling_is_fatal() {
        let config = EngineConfig::default().with_rate_limits(RateLimitConfig {
            global_requests_per_minute: 0,
            ..Default::default()
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Zero { field: "rate_limits.global_requests_per_minute" })
        ));
    }

    #[test]
    fn test_bad_pattern_is_fatal() {
        let mut config = EngineConfig::default();
        config.normalize.tracking_param_pattern = "(".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Pattern { .. })));
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"rate_limits": {"per_host_requests": 3}}"#).unwrap();
        assert_eq!(config.rate_limits.per_host_requests, 3);
        assert_eq!(config.rate_limits.global_requests_per_minute, 60);
        assert_eq!(config.fetch.max_retries, 2);
    }

    #[test]
    fn test_backoff_grows_exponentially() {
        let fetch = FetchConfig::default();
        assert_eq!(fetch.backoff(0), Duration::from_millis(500));
        assert_eq!(fetch.backoff(1), Duration::from_millis(1000));
        assert_eq!(fetch.backoff(2), Duration::from_millis(2000));
    }

    #[test]
    fn test_recency_boost_steps() {
        let boost = RecencyBoost::new(10, 4, 30, 90);
        assert_eq!(boost.value(0), 10);
        assert_eq!(boost.value(30), 10);
        assert_eq!(boost.value(31), 4);
        assert_eq!(boost.value(90), 4);
        assert_eq!(boost.value(91), 0);
        assert_eq!(boost.value(-5), 10);
    }

    #[test]
    fn test_role_buckets() {
        let weights = RoleCountWeights::default();
        assert_eq!(weights.bucket(0), None);
        assert_eq!(weights.bucket(2), Some(("engineering_roles_1_2", 8)));
        assert_eq!(weights.bucket(4), Some(("engineering_roles_3_5", 15)));
        assert_eq!(weights.bucket(10), Some(("engineering_roles_6_10", 20)));
        assert_eq!(weights.bucket(40), Some(("engineering_roles_11_plus", 12)));
    }

    #[test]
    fn test_default_workers_follow_global_ceiling() {
        assert_eq!(RateLimitConfig::default().default_workers(), 1);
        assert_eq!(RateLimitConfig::new(1, Duration::from_secs(1), 600).default_workers(), 10);
    }
}
