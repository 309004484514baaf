use crate::error::AppError;
use crate::storage::file_store::app_dir;
use crate::view::Filter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "ASCIITODO_CONFIG_PATH";

#[derive(Debug, Clone)]
pub struct Palette {
    pub accent: &'static str,
    pub muted: &'static str,
    pub alert: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub const PLAIN: Palette = Palette {
        accent: "",
        muted: "",
        alert: "",
        reset: "",
    };

    pub fn accentize(&self, text: &str) -> String {
        self.paint(self.accent, text)
    }

    pub fn mutedize(&self, text: &str) -> String {
        self.paint(self.muted, text)
    }

    pub fn alertize(&self, text: &str) -> String {
        self.paint(self.alert, text)
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if color.is_empty() || text.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", color, text, self.reset)
        }
    }
}

pub fn palette_for_theme(theme: Option<&str>) -> Palette {
    match theme.and_then(canonical_theme_name).as_deref() {
        Some("noir") => Palette {
            accent: "\x1b[38;5;208m",
            muted: "\x1b[38;5;250m",
            alert: "\x1b[38;5;196m",
            reset: "\x1b[0m",
        },
        Some("solarized") => Palette {
            accent: "\x1b[38;5;108m",
            muted: "\x1b[38;5;250m",
            alert: "\x1b[38;5;160m",
            reset: "\x1b[0m",
        },
        _ => Palette::PLAIN,
    }
}

/// `None` means plain output: blank, `default`, or a theme this build lacks.
pub fn canonical_theme_name(raw: &str) -> Option<String> {
    let name = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
    match name.as_str() {
        "noir" | "dark" | "dark_mode" => Some("noir".to_string()),
        "solarized" => Some("solarized".to_string()),
        "" | "default" | "plain" => None,
        other => {
            log::warn!("unknown theme '{other}', using plain output");
            None
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub default_filter: Option<Filter>,
}

impl Config {
    pub fn filter(&self) -> Filter {
        self.default_filter.unwrap_or_default()
    }

    pub fn palette(&self) -> Palette {
        palette_for_theme(self.theme.as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub theme: Option<String>,
    pub default_filter: Option<Filter>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    match std::env::var(CONFIG_ENV_VAR) {
        Ok(path) if !path.trim().is_empty() => Ok(PathBuf::from(path)),
        _ => Ok(app_dir()?.join(CONFIG_FILE_NAME)),
    }
}

/// A missing file yields defaults silently; an unreadable one yields defaults
/// plus the error for the caller to report.
pub fn load_config_with_fallback() -> ConfigLoad {
    let loaded = config_path().and_then(|path| load_optional_config(&path));
    match loaded {
        Ok(config) => ConfigLoad {
            config: config.unwrap_or_default(),
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_optional_config(path: &Path) -> Result<Option<Config>, AppError> {
    if !path.exists() {
        return Ok(None);
    }
    load_config_from_path(path).map(Some)
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let mut config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    config.theme = config.theme.and_then(|name| canonical_theme_name(&name));
    Ok(config)
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(theme) = overrides.theme.as_deref() {
        merged.theme = canonical_theme_name(theme);
    }

    if let Some(filter) = overrides.default_filter {
        merged.default_filter = Some(filter);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::{
        Config, ConfigOverrides, canonical_theme_name, load_config_from_path,
        load_optional_config, merge_overrides, palette_for_theme,
    };
    use crate::view::Filter;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("asciitodo-{nanos}-{file_name}"))
    }

    #[test]
    fn missing_config_file_is_not_an_error() {
        let path = temp_path("missing-config.json");

        assert_eq!(load_optional_config(&path).unwrap(), None);
    }

    #[test]
    fn invalid_config_file_reports_invalid_data() {
        let path = temp_path("invalid-config.json");
        fs::write(&path, "{ invalid json ").unwrap();

        let result = load_optional_config(&path);
        fs::remove_file(&path).ok();

        assert_eq!(result.unwrap_err().code(), "invalid_data");
    }

    #[test]
    fn unknown_default_filter_is_rejected() {
        let path = temp_path("bad-filter-config.json");
        fs::write(&path, r#"{ "default_filter": "someday" }"#).unwrap();

        let result = load_config_from_path(&path);
        fs::remove_file(&path).ok();

        assert!(result.is_err());
    }

    #[test]
    fn valid_config_file_sets_theme_and_filter() {
        let path = temp_path("valid-config.json");
        let content = serde_json::json!({
            "theme": "Dark Mode",
            "default_filter": "overdue"
        });
        fs::write(&path, serde_json::to_string(&content).unwrap()).unwrap();

        let loaded = load_config_from_path(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded.theme.as_deref(), Some("noir"));
        assert_eq!(loaded.filter(), Filter::Overdue);
    }

    #[test]
    fn default_config_lists_everything_without_colour() {
        let config = Config::default();

        assert_eq!(config.filter(), Filter::All);
        assert!(config.palette().accent.is_empty());
    }

    #[test]
    fn overrides_replace_theme_and_filter() {
        let base = Config {
            theme: Some("solarized".into()),
            default_filter: Some(Filter::Active),
        };
        let overrides = ConfigOverrides {
            theme: Some("noir".into()),
            default_filter: Some(Filter::Completed),
        };

        let merged = merge_overrides(&base, &overrides);

        assert_eq!(merged.theme.as_deref(), Some("noir"));
        assert_eq!(merged.filter(), Filter::Completed);
        assert_eq!(base.theme.as_deref(), Some("solarized"));
    }

    #[test]
    fn theme_override_can_switch_back_to_plain() {
        let base = Config {
            theme: Some("noir".into()),
            default_filter: None,
        };
        let overrides = ConfigOverrides {
            theme: Some("default".into()),
            default_filter: None,
        };

        assert_eq!(merge_overrides(&base, &overrides).theme, None);
        assert_eq!(merge_overrides(&base, &ConfigOverrides::default()), base);
    }

    #[test]
    fn theme_names_are_normalized() {
        assert_eq!(canonical_theme_name("Noir"), Some("noir".into()));
        assert_eq!(canonical_theme_name("dark-mode"), Some("noir".into()));
        assert_eq!(canonical_theme_name(" Solarized "), Some("solarized".into()));
        assert_eq!(canonical_theme_name("default"), None);
        assert_eq!(canonical_theme_name("  "), None);
        assert_eq!(canonical_theme_name("oceanic"), None);
    }

    #[test]
    fn palettes_colour_only_named_themes() {
        assert_eq!(palette_for_theme(None).alertize("late"), "late");

        let noir = palette_for_theme(Some("noir"));
        assert_eq!(noir.accent, "\x1b[38;5;208m");
        assert_eq!(noir.alertize("late"), "\x1b[38;5;196mlate\x1b[0m");

        assert!(palette_for_theme(Some("oceanic")).accent.is_empty());
    }
}
