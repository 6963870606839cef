use anyhow::Result;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct Config {
    pub storage: StorageConfig,
    pub llm: LLMConfig,
    pub search: SearchConfig,
    pub keywords: KeywordConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Holds the credential file, the history file and logs
    pub data_dir: PathBuf,
    pub export_dir: PathBuf,
}

impl StorageConfig {
    pub fn api_key_path(&self) -> PathBuf {
        self.data_dir.join(".api_key.txt")
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(".analysis_history.json")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

#[derive(Debug, Clone)]
pub struct LLMConfig {
    /// Key from the environment; the stored credential wins when present
    pub google_api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub serpapi_key: String,
    /// DuckDuckGo region code
    pub region: String,
    pub safe_search: bool,
    /// DuckDuckGo date filter: d, w, m, y
    pub time_limit: String,
    pub delay_ms: u64,
    pub primary_max_results: usize,
    pub secondary_max_results: usize,
}

#[derive(Debug, Clone)]
pub struct KeywordConfig {
    pub construction: Vec<String>,
    pub humanoid: Vec<String>,
    pub other: Vec<String>,
}

impl KeywordConfig {
    /// Group A keywords: construction first, then humanoid
    pub fn primary(&self) -> Vec<String> {
        self.construction
            .iter()
            .chain(self.humanoid.iter())
            .cloned()
            .collect()
    }

    pub fn secondary(&self) -> Vec<String> {
        self.other.clone()
    }
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            construction: to_owned_list(&[
                "건설 로봇",
                "건설 현장 자동화",
                "스마트 건설 R&D",
                "건설용 웨어러블 로봇",
            ]),
            humanoid: to_owned_list(&[
                "휴머노이드 로봇",
                "이족보행 로봇",
                "테슬라 옵티머스",
                "피규어 AI",
                "보스턴 다이내믹스",
            ]),
            other: to_owned_list(&["협동로봇", "물류 로봇", "AMR", "주차 로봇", "제조업 로봇"]),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Font family written into DOCX runs
    pub docx_font: String,
    /// TrueType fonts tried in order for PDF output
    pub pdf_font_paths: Vec<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            docx_font: "Malgun Gothic".to_string(),
            pdf_font_paths: vec![
                PathBuf::from("C:/Windows/Fonts/malgun.ttf"),
                PathBuf::from("/usr/share/fonts/truetype/nanum/NanumGothic.ttf"),
                PathBuf::from("/usr/share/fonts/nanum/NanumGothic.ttf"),
            ],
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let data_dir = env::var("ROBOT_INSIGHT_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_data_dir());

        let export_defaults = ExportConfig::default();
        let keyword_defaults = KeywordConfig::default();

        Ok(Self {
            storage: StorageConfig {
                data_dir,
                export_dir: env::var("ROBOT_INSIGHT_EXPORT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("exports")),
            },
            llm: LLMConfig {
                google_api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
                model: env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
                base_url: env::var("GEMINI_API_BASE")
                    .unwrap_or_else(|_| GEMINI_API_BASE.to_string()),
                temperature: env::var("GEMINI_TEMPERATURE")
                    .ok()
                    .map(|v| v.parse())
                    .transpose()?,
                max_tokens: env::var("GEMINI_MAX_TOKENS")
                    .ok()
                    .map(|v| v.parse())
                    .transpose()?,
            },
            search: SearchConfig {
                serpapi_key: env::var("SERPAPI_API_KEY").unwrap_or_default(),
                region: env::var("SEARCH_REGION").unwrap_or_else(|_| "kr-kr".to_string()),
                safe_search: env::var("SEARCH_SAFE")
                    .unwrap_or_else(|_| "false".to_string())
                    .parse()?,
                time_limit: env::var("SEARCH_TIME_LIMIT").unwrap_or_else(|_| "w".to_string()),
                delay_ms: env::var("SEARCH_DELAY_MS")
                    .unwrap_or_else(|_| "500".to_string())
                    .parse()?,
                primary_max_results: env::var("SEARCH_PRIMARY_MAX_RESULTS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()?,
                secondary_max_results: env::var("SEARCH_SECONDARY_MAX_RESULTS")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()?,
            },
            keywords: KeywordConfig {
                construction: env::var("KEYWORDS_CONSTRUCTION")
                    .map(|v| parse_keyword_list(&v))
                    .unwrap_or(keyword_defaults.construction),
                humanoid: env::var("KEYWORDS_HUMANOID")
                    .map(|v| parse_keyword_list(&v))
                    .unwrap_or(keyword_defaults.humanoid),
                other: env::var("KEYWORDS_OTHER")
                    .map(|v| parse_keyword_list(&v))
                    .unwrap_or(keyword_defaults.other),
            },
            export: ExportConfig {
                docx_font: env::var("EXPORT_DOCX_FONT").unwrap_or(export_defaults.docx_font),
                pdf_font_paths: env::var("EXPORT_PDF_FONTS")
                    .map(|v| v.split('|').map(|p| PathBuf::from(p.trim())).collect())
                    .unwrap_or(export_defaults.pdf_font_paths),
            },
        })
    }

    /// Configuration rooted at `data_dir` with every other value defaulted
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            storage: StorageConfig {
                export_dir: data_dir.join("exports"),
                data_dir,
            },
            llm: LLMConfig {
                google_api_key: String::new(),
                model: DEFAULT_MODEL.to_string(),
                base_url: GEMINI_API_BASE.to_string(),
                temperature: None,
                max_tokens: None,
            },
            search: SearchConfig {
                serpapi_key: String::new(),
                region: "kr-kr".to_string(),
                safe_search: false,
                time_limit: "w".to_string(),
                delay_ms: 500,
                primary_max_results: 5,
                secondary_max_results: 3,
            },
            keywords: KeywordConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("robot-insight")
}

/// Split a keyword list on `|` or newlines, dropping blanks
pub fn parse_keyword_list(raw: &str) -> Vec<String> {
    raw.split(['|', '\n'])
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keyword_list() {
        assert_eq!(
            parse_keyword_list(" 건설 로봇 |\n휴머노이드 로봇|| "),
            vec!["건설 로봇".to_string(), "휴머노이드 로봇".to_string()]
        );
        assert!(parse_keyword_list("  ").is_empty());
    }

    #[test]
    fn test_primary_keywords_keep_group_order() {
        let keywords = KeywordConfig::default();
        let primary = keywords.primary();
        assert_eq!(primary.len(), 9);
        assert_eq!(primary[0], "건설 로봇");
        assert_eq!(primary[4], "휴머노이드 로봇");
        assert_eq!(keywords.secondary().len(), 5);
    }

    #[test]
    fn test_storage_paths() {
        let config = Config::with_data_dir(PathBuf::from("/tmp/ri"));
        assert_eq!(config.storage.api_key_path(), PathBuf::from("/tmp/ri/.api_key.txt"));
        assert_eq!(
            config.storage.history_path(),
            PathBuf::from("/tmp/ri/.analysis_history.json")
        );
        assert_eq!(config.search.delay_ms, 500);
    }
}
