// Share-link builder
//
// Pure functions over the output text. Opening the resulting URL is the
// caller's business (see `opener`).

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::warn;

use crate::state::Settings;
use crate::util::text_len;

/// Characters left alone by `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

// ASCII classes spelled out, `(?i)` would also fold in U+212A and U+017F
const URL_PATTERN: &str = r"([Hh][Tt][Tt][Pp][Ss]?://\S+)|((?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z0-9][A-Za-z0-9-]{0,61}[A-Za-z0-9])";

static URL_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

fn url_regex() -> Option<&'static Regex> {
    URL_REGEX
        .get_or_init(|| match Regex::new(URL_PATTERN) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!("URL pattern failed to compile, embeds disabled: {}", e);
                None
            }
        })
        .as_ref()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShareTarget {
    /// Compose endpoint with embed support.
    Warpcast,
    /// Plain tweet intent.
    Twitter,
}

impl ShareTarget {
    pub fn max_chars(self, settings: &Settings) -> usize {
        match self {
            ShareTarget::Warpcast => settings.warpcast_max_chars,
            ShareTarget::Twitter => settings.twitter_max_chars,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ShareTarget::Warpcast => "Post to Warpcast",
            ShareTarget::Twitter => "Post to X",
        }
    }
}

pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// Find URLs and bare domains in `text`, left to right, and turn each one
/// into an absolute URL. Bare domains get `default_scheme` prepended.
pub fn extract_embed_urls(text: &str, default_scheme: &str) -> Vec<String> {
    let Some(re) = url_regex() else {
        return Vec::new();
    };
    re.captures_iter(text)
        .filter_map(|caps| {
            if let Some(schemed) = caps.get(1) {
                Some(schemed.as_str().to_string())
            } else {
                caps.get(2)
                    .map(|bare| format!("{}://{}", default_scheme, bare.as_str()))
            }
        })
        .collect()
}

fn with_query(endpoint: &str) -> String {
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!("{}{}", endpoint, separator)
}

/// Warpcast compose URL: text, channel key, then one `embeds[]` per URL found.
pub fn warpcast_url(text: &str, settings: &Settings) -> String {
    let mut url = format!(
        "{}text={}",
        with_query(&settings.warpcast_compose_url),
        encode_component(text)
    );
    if !settings.warpcast_channel_key.is_empty() {
        url.push_str("&channelKey=");
        url.push_str(&encode_component(&settings.warpcast_channel_key));
    }
    for embed in extract_embed_urls(text, &settings.embed_scheme) {
        url.push_str("&embeds[]=");
        url.push_str(&encode_component(&embed));
    }
    url
}

/// Tweet intent URL carrying only the text.
pub fn twitter_url(text: &str, settings: &Settings) -> String {
    format!(
        "{}text={}",
        with_query(&settings.twitter_intent_url),
        encode_component(text)
    )
}

pub fn share_url(target: ShareTarget, text: &str, settings: &Settings) -> String {
    match target {
        ShareTarget::Warpcast => warpcast_url(text, settings),
        ShareTarget::Twitter => twitter_url(text, settings),
    }
}

/// Whether the share action for `target` may be offered for `text`.
pub fn is_available(target: ShareTarget, text: &str, settings: &Settings) -> bool {
    !text.is_empty() && text_len(text) <= target.max_chars(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings::default()
    }

    #[test]
    fn bare_domain_gets_default_scheme() {
        let urls = extract_embed_urls("check example.com now", "https");
        assert_eq!(urls, vec!["https://example.com".to_string()]);
    }

    #[test]
    fn non_ascii_case_folds_are_not_domain_characters() {
        let urls = extract_embed_urls("see \u{212A}ey.com and mi\u{17F}s.org", "https");
        assert_eq!(
            urls,
            vec!["https://ey.com".to_string(), "https://s.org".to_string()]
        );
    }

    #[test]
    fn schemed_urls_pass_through_in_order() {
        let urls = extract_embed_urls(
            "see http://a.io/x?y=1 and docs.rs then HTTPS://Foo.org/p",
            "https",
        );
        assert_eq!(
            urls,
            vec![
                "http://a.io/x?y=1".to_string(),
                "https://docs.rs".to_string(),
                "HTTPS://Foo.org/p".to_string(),
            ]
        );
    }

    #[test]
    fn dolphin_text_has_no_embeds() {
        assert!(extract_embed_urls("EeE eee EE e", "https").is_empty());
        assert!(extract_embed_urls("", "https").is_empty());
    }

    #[test]
    fn encode_component_matches_uri_component_rules() {
        assert_eq!(encode_component("a b&c"), "a%20b%26c");
        assert_eq!(encode_component("-_.!~*'()"), "-_.!~*'()");
        assert_eq!(encode_component("🐬"), "%F0%9F%90%AC");
        assert_eq!(
            encode_component("https://example.com"),
            "https%3A%2F%2Fexample.com"
        );
    }

    #[test]
    fn warpcast_url_has_one_embed_per_match() {
        let url = warpcast_url("check example.com now", &settings());
        assert_eq!(
            url,
            "https://warpcast.com/~/compose?text=check%20example.com%20now&channelKey=dolphin-zone&embeds[]=https%3A%2F%2Fexample.com"
        );
        assert_eq!(url.matches("embeds[]=").count(), 1);
    }

    #[test]
    fn warpcast_url_without_links_has_no_embeds() {
        let url = warpcast_url("HELLO", &settings());
        assert!(!url.contains("embeds[]"));
        assert!(url::Url::parse(&url).is_ok());
    }

    #[test]
    fn twitter_url_carries_only_text() {
        let url = twitter_url("hi example.com", &settings());
        assert_eq!(
            url,
            "https://twitter.com/intent/tweet?text=hi%20example.com"
        );
    }

    #[test]
    fn endpoint_with_query_is_extended() {
        let mut s = settings();
        s.twitter_intent_url = "https://x.test/intent?via=dz".to_string();
        assert_eq!(twitter_url("a", &s), "https://x.test/intent?via=dz&text=a");
    }

    #[test]
    fn length_guards() {
        let s = settings();
        let text = "a".repeat(300);
        assert!(!is_available(ShareTarget::Twitter, &text, &s));
        assert!(is_available(ShareTarget::Warpcast, &text, &s));

        let limit = "a".repeat(280);
        assert!(is_available(ShareTarget::Twitter, &limit, &s));
        assert!(!is_available(ShareTarget::Warpcast, &"a".repeat(1025), &s));
        assert!(!is_available(ShareTarget::Twitter, "", &s));
    }
}
