pub const WARPCAST_COMPOSE_URL_DEFAULT: &str = "https://warpcast.com/~/compose";
pub const WARPCAST_CHANNEL_KEY_DEFAULT: &str = "dolphin-zone";
pub const TWITTER_INTENT_URL_DEFAULT: &str = "https://twitter.com/intent/tweet";
pub const EMBED_SCHEME_DEFAULT: &str = "https";

pub const WARPCAST_MAX_CHARS_DEFAULT: usize = 1024;
pub const TWITTER_MAX_CHARS_DEFAULT: usize = 280;
pub const SHARE_MAX_CHARS_CEILING: usize = 100_000;

pub const DOLPHIN_MARKER: &str = "🐬";
pub const HUMAN_MARKER: &str = "👤";

pub const PLACEHOLDER_PLAIN: &str = "write or paste your text here";
pub const PLACEHOLDER_HYPHENATED: &str = "write-or-paste-your-text-here";
pub const PLACEHOLDER_SAMPLE: &str =
    "Eee EeE EE e E eee EeE EeeE Ee EEE e E eEee eee EEe EeE EE eE EeeE EEe e e E eEEe e EEEE E EeE E";

pub const SETTINGS_FILE_DEFAULT: &str = "settings.json";
pub const SETTINGS_PATH_ENV: &str = "DOLPHIN_SETTINGS";
