use serde::{Deserialize, Serialize};

/// Configuration for article extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizerConfig {
    /// Minimum visible text length for an extracted region (default: 200)
    pub min_content_length: usize,

    /// Selectors that mark likely article containers. Matching candidates get
    /// a score bonus; they are hints, not requirements.
    pub content_selectors: Vec<String>,

    /// Selectors for subtrees that are never content (ads, navigation, etc.)
    pub remove_selectors: Vec<String>,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            min_content_length: 200,
            content_selectors: vec![
                // Common article content selectors
                "article".to_string(),
                "[role=\"main\"]".to_string(),
                "main".to_string(),
                ".post-content".to_string(),
                ".article-content".to_string(),
                ".entry-content".to_string(),
                ".content".to_string(),
                "#content".to_string(),
                ".post".to_string(),
                ".article".to_string(),
                ".blog-post".to_string(),
            ],
            remove_selectors: vec![
                // Chrome, ads and tracking containers
                ".sidebar".to_string(),
                ".advertisement".to_string(),
                ".ad".to_string(),
                ".ads".to_string(),
                "[id^=\"ad-\"]".to_string(),
                "[class*=\"sponsor\"]".to_string(),
                ".social-share".to_string(),
                ".share".to_string(),
                ".comments".to_string(),
                "#comments".to_string(),
                ".related-posts".to_string(),
                ".newsletter".to_string(),
                ".cookie-banner".to_string(),
                "[aria-hidden=\"true\"]".to_string(),
                "[hidden]".to_string(),
                "img[width=\"1\"]".to_string(),
            ],
        }
    }
}

impl SanitizerConfig {
    /// Relaxed thresholds for short pages.
    pub fn lenient() -> Self {
        Self {
            min_content_length: 50,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = SanitizerConfig::default();
        assert_eq!(config.min_content_length, 200);
        assert!(config.content_selectors.iter().any(|s| s == "article"));
        assert!(config.remove_selectors.iter().any(|s| s == ".ad"));
    }

    #[test]
    fn test_lenient_config() {
        let config = SanitizerConfig::lenient();
        assert_eq!(config.min_content_length, 50);
        // Inherits defaults for the rest
        assert!(!config.remove_selectors.is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: SanitizerConfig = toml::from_str("min_content_length = 10").unwrap();
        assert_eq!(config.min_content_length, 10);
        assert!(!config.content_selectors.is_empty());
    }
}
