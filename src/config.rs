/// Runtime settings, read from the extension with defaults for anything missing
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ShelfConfig {
    /// How long the delete control waits for a second click
    pub confirm_window_ms: u32,
    /// Delay between a view reset and the re-fetch + sweep
    pub settle_delay_ms: u32,
    pub poll_interval_ms: u32,
    /// How long success/error colors stay on a control
    pub feedback_ms: u32,
    pub toast_ms: u32,
    pub page_size: u32,
    pub site_origin: String,
    pub log_level: String,
    pub selectors: Selectors,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Selectors {
    pub card: String,
    pub remove_favorite: String,
    pub view_selector: String,
    pub title: String,
    pub image: String,
    pub link: String,
}

impl Default for ShelfConfig {
    fn default() -> Self {
        ShelfConfig {
            confirm_window_ms: 3000,
            settle_delay_ms: 800,
            poll_interval_ms: 1000,
            feedback_ms: 2000,
            toast_ms: 3500,
            page_size: 100,
            site_origin: "https://vrchat.com".to_string(),
            log_level: "info".to_string(),
            selectors: Selectors::default(),
        }
    }
}

impl Default for Selectors {
    fn default() -> Self {
        Selectors {
            card: r#"[data-scrollkey^="wrld_"], [data-scrollkey="???"]"#.to_string(),
            remove_favorite: r#"button[aria-label="Remove Favorite"][id]"#.to_string(),
            view_selector: r#"[aria-label="Favorite Group"] [aria-selected="true"]"#.to_string(),
            title: "h4".to_string(),
            image: "img".to_string(),
            link: r#"a[href*="/home/world/"]"#.to_string(),
        }
    }
}

impl ShelfConfig {
    pub fn api_base(&self) -> String {
        format!("{}/api/1", self.site_origin.trim_end_matches('/'))
    }

    pub fn log_filter(&self) -> log::LevelFilter {
        self.log_level
            .parse()
            .unwrap_or(log::LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_keep_defaults() {
        let config: ShelfConfig =
            serde_json::from_str(r#"{"confirmWindowMs": 5000, "selectors": {"title": "h3"}}"#)
                .unwrap();

        assert_eq!(config.confirm_window_ms, 5000);
        assert_eq!(config.settle_delay_ms, 800);
        assert_eq!(config.selectors.title, "h3");
        assert_eq!(config.selectors.image, "img");
    }

    #[test]
    fn test_api_base() {
        let config = ShelfConfig {
            site_origin: "https://vrchat.com/".to_string(),
            ..ShelfConfig::default()
        };

        assert_eq!(config.api_base(), "https://vrchat.com/api/1");
    }

    #[test]
    fn test_log_filter() {
        let mut config = ShelfConfig::default();
        assert_eq!(config.log_filter(), log::LevelFilter::Info);

        config.log_level = "debug".to_string();
        assert_eq!(config.log_filter(), log::LevelFilter::Debug);

        config.log_level = "loud".to_string();
        assert_eq!(config.log_filter(), log::LevelFilter::Info);
    }
}
