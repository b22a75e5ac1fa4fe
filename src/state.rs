use crate::constants::{
    DOLPHIN_MARKER, EMBED_SCHEME_DEFAULT, HUMAN_MARKER, PLACEHOLDER_HYPHENATED,
    PLACEHOLDER_PLAIN, PLACEHOLDER_SAMPLE, SETTINGS_FILE_DEFAULT, SETTINGS_PATH_ENV,
    SHARE_MAX_CHARS_CEILING, TWITTER_INTENT_URL_DEFAULT, TWITTER_MAX_CHARS_DEFAULT,
    WARPCAST_CHANNEL_KEY_DEFAULT, WARPCAST_COMPOSE_URL_DEFAULT, WARPCAST_MAX_CHARS_DEFAULT,
};
use crate::dolphin::Category;
use crate::errors::{report_error, AppError};
use crate::share::{is_available, ShareTarget};
use crate::util::text_len;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub hyphenate: bool, // Initial value of the normalize flag
    pub warpcast_compose_url: String,
    pub warpcast_channel_key: String,
    pub twitter_intent_url: String,
    pub warpcast_max_chars: usize,
    pub twitter_max_chars: usize,
    pub embed_scheme: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hyphenate: false,
            warpcast_compose_url: WARPCAST_COMPOSE_URL_DEFAULT.to_string(),
            warpcast_channel_key: WARPCAST_CHANNEL_KEY_DEFAULT.to_string(),
            twitter_intent_url: TWITTER_INTENT_URL_DEFAULT.to_string(),
            warpcast_max_chars: WARPCAST_MAX_CHARS_DEFAULT,
            twitter_max_chars: TWITTER_MAX_CHARS_DEFAULT,
            embed_scheme: EMBED_SCHEME_DEFAULT.to_string(),
        }
    }
}

impl Settings {
    pub fn normalize(&mut self) {
        let defaults = Settings::default();

        if !is_http_endpoint(&self.warpcast_compose_url) {
            warn!(
                "Invalid Warpcast endpoint '{}', using default",
                self.warpcast_compose_url
            );
            self.warpcast_compose_url = defaults.warpcast_compose_url.clone();
        }
        if !is_http_endpoint(&self.twitter_intent_url) {
            warn!(
                "Invalid X endpoint '{}', using default",
                self.twitter_intent_url
            );
            self.twitter_intent_url = defaults.twitter_intent_url.clone();
        }

        self.warpcast_channel_key = self.warpcast_channel_key.trim().to_string();

        // Clamp limits to a sane range
        if self.warpcast_max_chars == 0 || self.warpcast_max_chars > SHARE_MAX_CHARS_CEILING {
            self.warpcast_max_chars = defaults.warpcast_max_chars;
        }
        if self.twitter_max_chars == 0 || self.twitter_max_chars > SHARE_MAX_CHARS_CEILING {
            self.twitter_max_chars = defaults.twitter_max_chars;
        }

        let scheme = self.embed_scheme.trim().trim_end_matches("://").to_lowercase();
        self.embed_scheme = if scheme == "http" || scheme == "https" {
            scheme
        } else {
            defaults.embed_scheme
        };
    }
}

fn is_http_endpoint(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.has_host(),
        Err(_) => false,
    }
}

/// Settings file location: `$DOLPHIN_SETTINGS` or `./settings.json`.
pub fn resolve_settings_path() -> PathBuf {
    if let Ok(path) = std::env::var(SETTINGS_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    PathBuf::from(SETTINGS_FILE_DEFAULT)
}

/// Read settings from `path`. A missing file yields the defaults.
pub fn read_settings(path: &Path) -> Result<Settings, AppError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Settings::default()),
        Err(e) => {
            return Err(AppError::Settings(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };
    let parsed = serde_json::from_str::<Settings>(&raw).map_err(|e| {
        AppError::Settings(format!("Malformed settings file {}: {}", path.display(), e))
    })?;
    info!("Loaded settings from {}", path.display());
    Ok(parsed)
}

/// Load settings from `path`. Missing or broken files fall back to defaults.
pub fn load_settings(path: &Path) -> Settings {
    let mut settings = read_settings(path).unwrap_or_else(|e| {
        report_error(&e, Some("Loading settings"));
        Settings::default()
    });
    settings.normalize();
    settings
}

/// Marker shown next to a text box for the category of its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Label {
    Dolphin,
    Human,
}

impl Label {
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::Primary => Label::Dolphin,
            Category::Secondary => Label::Human,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Label::Dolphin => Label::Human,
            Label::Human => Label::Dolphin,
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            Label::Dolphin => DOLPHIN_MARKER,
            Label::Human => HUMAN_MARKER,
        }
    }
}

/// The committed session fields. Only `Transition::apply` writes them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    input_text: String,
    output_text: String,
    input_label: Option<Label>,
    output_label: Option<Label>,
    normalize: bool,
}

impl SessionState {
    pub fn with_normalize(normalize: bool) -> Self {
        Self {
            normalize,
            ..Self::default()
        }
    }

    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    pub fn output_text(&self) -> &str {
        &self.output_text
    }

    pub fn input_label(&self) -> Option<Label> {
        self.input_label
    }

    pub fn output_label(&self) -> Option<Label> {
        self.output_label
    }

    pub fn normalize(&self) -> bool {
        self.normalize
    }
}

/// Result of one re-derivation, waiting to be committed.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub(crate) input_text: String,
    pub(crate) output_text: String,
    pub(crate) input_label: Option<Label>,
    pub(crate) output_label: Option<Label>,
    pub(crate) normalize: bool,
}

impl Transition {
    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    pub fn output_text(&self) -> &str {
        &self.output_text
    }

    pub fn input_label(&self) -> Option<Label> {
        self.input_label
    }

    pub fn output_label(&self) -> Option<Label> {
        self.output_label
    }

    pub fn normalize(&self) -> bool {
        self.normalize
    }

    pub(crate) fn apply(self, state: &mut SessionState) {
        state.input_text = self.input_text;
        state.output_text = self.output_text;
        state.input_label = self.input_label;
        state.output_label = self.output_label;
        state.normalize = self.normalize;
    }
}

/// Which actions are currently offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub clear: bool,
    pub swap: bool,
    pub copy: bool,
    pub hyphenate: bool,
    pub cast: bool,
    pub tweet: bool,
}

/// Read-only view of the session plus the strings derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub input_text: String,
    pub output_text: String,
    pub input_label: Option<Label>,
    pub output_label: Option<Label>,
    pub normalize: bool,
    pub input_heading: String,
    pub output_heading: String,
    pub placeholder: String,
    pub counter: Option<String>,
    pub available: Availability,
}

impl SessionSnapshot {
    pub(crate) fn build(state: &SessionState, input_is_dolphin: bool, settings: &Settings) -> Self {
        let has_output = !state.output_text.is_empty();
        let output_len = text_len(&state.output_text);
        let counter_max = if output_len < settings.twitter_max_chars {
            settings.twitter_max_chars
        } else {
            settings.warpcast_max_chars
        };
        let placeholder_head = if state.normalize {
            PLACEHOLDER_HYPHENATED
        } else {
            PLACEHOLDER_PLAIN
        };

        Self {
            input_text: state.input_text.clone(),
            output_text: state.output_text.clone(),
            input_label: state.input_label,
            output_label: state.output_label,
            normalize: state.normalize,
            input_heading: heading(state.input_label, "Input"),
            output_heading: heading(state.output_label, "Output"),
            placeholder: format!("{}\n\n{}", placeholder_head, PLACEHOLDER_SAMPLE),
            // Footer is hidden until there is something to share
            counter: has_output.then(|| format!("{} / {}", output_len, counter_max)),
            available: Availability {
                clear: has_output,
                swap: has_output,
                copy: has_output,
                hyphenate: !input_is_dolphin,
                cast: is_available(ShareTarget::Warpcast, &state.output_text, settings),
                tweet: is_available(ShareTarget::Twitter, &state.output_text, settings),
            },
        }
    }
}

fn heading(label: Option<Label>, fallback: &str) -> String {
    match label {
        Some(label) => format!("{} :", label.marker()),
        None => format!("{}:", fallback),
    }
}
