use serde::Deserialize;

/// Default site origin that report hrefs are appended to
pub const DEFAULT_BASE_URL: &str = "http://bgp.he.net";

/// Default path of the world report, relative to the origin
pub const DEFAULT_WORLD_PATH: &str = "/report/world";

/// bgp.he.net filters requests by user agent
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Default dataset file
pub const DEFAULT_OUTPUT_PATH: &str = "data.json";

/// Main configuration structure for ASN-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Absolute URL of the world report
    pub fn world_url(&self) -> String {
        format!("{}{}", self.crawler.base_url, self.crawler.world_path)
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Origin prepended to every country href
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the world report page
    #[serde(rename = "world-path")]
    pub world_path: String,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            world_path: DEFAULT_WORLD_PATH.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the dataset file
    pub path: String,

    /// Quote ASN keys so the finished file is strict JSON
    #[serde(rename = "strict-json-keys")]
    pub strict_json_keys: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_OUTPUT_PATH.to_string(),
            strict_json_keys: false,
        }
    }
}
