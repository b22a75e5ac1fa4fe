// Session controller — keeps input, output, labels and the hyphenate flag in sync
//
// Every action ends in `submit`, which re-derives the whole state from one raw
// text value and commits it in a single step. Each submission takes a ticket
// before awaiting the translator; only the newest ticket may commit, so a slow
// earlier request can never overwrite a later one.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

use crate::clipboard::ClipboardAccess;
use crate::dolphin::{Category, Classifier, Translator};
use crate::errors::{report_error, AppError, ErrorEvent};
use crate::normalize;
use crate::opener::UrlOpener;
use crate::share::{is_available, share_url, ShareTarget};
use crate::state::{Label, SessionSnapshot, SessionState, Settings, Transition};

/// What an action ended up doing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ActionOutcome {
    /// A re-derivation was committed.
    Applied(SessionSnapshot),
    /// A newer action was submitted before this one finished.
    Superseded,
    /// The action is currently unavailable; nothing changed.
    Ignored,
    /// Output text was handed to the clipboard.
    Copied { text: String },
    /// A share URL was handed to the opener.
    Shared { target: ShareTarget, url: String },
}

pub struct SessionController {
    classifier: Arc<dyn Classifier>,
    translator: Arc<dyn Translator>,
    clipboard: Arc<dyn ClipboardAccess>,
    opener: Arc<dyn UrlOpener>,
    settings: Settings,
    state: Mutex<SessionState>,
    sequence: AtomicU64,
    last_error: Mutex<Option<ErrorEvent>>,
}

impl SessionController {
    pub fn new(
        settings: Settings,
        classifier: Arc<dyn Classifier>,
        translator: Arc<dyn Translator>,
        clipboard: Arc<dyn ClipboardAccess>,
        opener: Arc<dyn UrlOpener>,
    ) -> Self {
        let state = SessionState::with_normalize(settings.hyphenate);
        Self {
            classifier,
            translator,
            clipboard,
            opener,
            settings,
            state: Mutex::new(state),
            sequence: AtomicU64::new(0),
            last_error: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        // State is only ever replaced whole, so a poisoned guard is still consistent
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> SessionState {
        self.lock_state().clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock_state();
        self.snapshot_of(&state)
    }

    fn snapshot_of(&self, state: &SessionState) -> SessionSnapshot {
        let input_is_dolphin = self.classifier.classify(state.input_text()) == Category::Primary;
        SessionSnapshot::build(state, input_is_dolphin, &self.settings)
    }

    /// Most recent error reported by any action.
    pub fn last_error(&self) -> Option<ErrorEvent> {
        self.last_error
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn record_error(&self, error: &AppError, context: &str) {
        let event = report_error(error, Some(context));
        *self.last_error.lock().unwrap_or_else(|e| e.into_inner()) = Some(event);
    }

    /// Compute the next state for `raw_text` without committing it.
    pub async fn rederive(&self, raw_text: &str, normalize: bool) -> Result<Transition, AppError> {
        let raw_category = self.classifier.classify(raw_text);

        // Dolphin text is never hyphenated
        let stored = if normalize && raw_category != Category::Primary {
            normalize::hyphenate(raw_text)
        } else {
            raw_text.to_string()
        };

        let output_text = self.translator.translate(&stored).await?;

        let stored_category = self.classifier.classify(&stored);
        let (input_label, output_label) = if stored.is_empty() {
            (None, None)
        } else {
            let label = Label::for_category(stored_category);
            (Some(label), Some(label.opposite()))
        };

        Ok(Transition {
            input_text: stored,
            output_text,
            input_label,
            output_label,
            normalize: normalize && stored_category != Category::Primary,
        })
    }

    async fn submit(
        &self,
        raw_text: &str,
        normalize: bool,
        action: &str,
    ) -> Result<ActionOutcome, AppError> {
        let ticket = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("{} submitted as #{}", action, ticket);

        let transition = match self.rederive(raw_text, normalize).await {
            Ok(transition) => transition,
            Err(e) => {
                self.record_error(&e, action);
                return Err(e);
            }
        };

        let mut state = self.lock_state();
        if self.sequence.load(Ordering::SeqCst) != ticket {
            debug!("{} #{} superseded, dropping result", action, ticket);
            return Ok(ActionOutcome::Superseded);
        }
        transition.apply(&mut state);
        Ok(ActionOutcome::Applied(self.snapshot_of(&state)))
    }

    pub async fn input_edit(&self, text: &str) -> Result<ActionOutcome, AppError> {
        let normalize = self.lock_state().normalize();
        self.submit(text, normalize, "Input edit").await
    }

    pub async fn paste(&self) -> Result<ActionOutcome, AppError> {
        let text = match self.clipboard.read_text().await {
            Ok(text) => text,
            Err(e) => {
                self.record_error(&e, "Reading clipboard");
                return Err(e);
            }
        };
        let normalize = self.lock_state().normalize();
        self.submit(&text, normalize, "Paste").await
    }

    /// Copy the output text. Clipboard failures are logged, not returned.
    pub fn copy(&self) -> ActionOutcome {
        let text = self.lock_state().output_text().to_string();
        if text.is_empty() {
            return ActionOutcome::Ignored;
        }
        if let Err(e) = self.clipboard.write_text(&text) {
            self.record_error(&e, "Writing clipboard");
        }
        ActionOutcome::Copied { text }
    }

    pub async fn clear(&self) -> Result<ActionOutcome, AppError> {
        let normalize = {
            let state = self.lock_state();
            if state.output_text().is_empty() {
                return Ok(ActionOutcome::Ignored);
            }
            state.normalize()
        };
        self.submit("", normalize, "Clear").await
    }

    pub async fn swap(&self) -> Result<ActionOutcome, AppError> {
        let (text, normalize) = {
            let state = self.lock_state();
            (state.output_text().to_string(), state.normalize())
        };
        self.submit(&text, normalize, "Swap").await
    }

    /// Turn hyphenation on or off, converting the current input accordingly.
    /// Ignored while the input is dolphin text.
    pub async fn toggle_normalize(&self, enabled: bool) -> Result<ActionOutcome, AppError> {
        let input = self.lock_state().input_text().to_string();
        if self.classifier.classify(&input) == Category::Primary {
            debug!("Hyphenate toggle ignored for dolphin input");
            return Ok(ActionOutcome::Ignored);
        }
        info!("Hyphenate set to {}", enabled);
        let updated = normalize::apply(&input, enabled);
        self.submit(&updated, enabled, "Hyphenate toggle").await
    }

    /// Build the share URL for `target` and open it. Opener failures are
    /// logged, not returned.
    pub fn share(&self, target: ShareTarget) -> ActionOutcome {
        let text = self.lock_state().output_text().to_string();
        if !is_available(target, &text, &self.settings) {
            return ActionOutcome::Ignored;
        }
        let url = share_url(target, &text, &self.settings);
        if let Err(e) = self.opener.open(&url) {
            self.record_error(&e, target.label());
        }
        ActionOutcome::Shared { target, url }
    }

    pub fn cast_to_warpcast(&self) -> ActionOutcome {
        self.share(ShareTarget::Warpcast)
    }

    pub fn post_to_twitter(&self) -> ActionOutcome {
        self.share(ShareTarget::Twitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::dolphin::DolphinCodec;
    use async_trait::async_trait;
    use std::time::Duration;

    // Upper-case text is "primary", everything else "secondary".
    struct CaseClassifier;

    impl Classifier for CaseClassifier {
        fn classify(&self, text: &str) -> Category {
            let has_letters = text.chars().any(|c| c.is_alphabetic());
            if has_letters && !text.chars().any(|c| c.is_lowercase()) {
                Category::Primary
            } else {
                Category::Secondary
            }
        }
    }

    // Secondary -> upper case with hyphens as spaces, primary -> lower case.
    // Texts starting with "slow" take a while, "boom" fails.
    struct CaseTranslator;

    #[async_trait]
    impl Translator for CaseTranslator {
        async fn translate(&self, text: &str) -> Result<String, AppError> {
            if text.starts_with("slow") {
                tokio::time::sleep(Duration::from_millis(60)).await;
            }
            if text == "boom" {
                return Err(AppError::Translation("backend down".to_string()));
            }
            Ok(match CaseClassifier.classify(text) {
                Category::Primary => text.to_lowercase(),
                Category::Secondary => text.to_uppercase().replace('-', " "),
            })
        }
    }

    struct BrokenClipboard;

    #[async_trait]
    impl ClipboardAccess for BrokenClipboard {
        async fn read_text(&self) -> Result<String, AppError> {
            Err(AppError::Clipboard("permission refused".to_string()))
        }

        fn write_text(&self, _text: &str) -> Result<(), AppError> {
            Err(AppError::Clipboard("permission refused".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingOpener {
        opened: Mutex<Vec<String>>,
    }

    impl UrlOpener for RecordingOpener {
        fn open(&self, url: &str) -> Result<(), AppError> {
            self.opened.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    fn controller_with(
        settings: Settings,
        clipboard: Arc<dyn ClipboardAccess>,
        opener: Arc<dyn UrlOpener>,
    ) -> SessionController {
        SessionController::new(
            settings,
            Arc::new(CaseClassifier),
            Arc::new(CaseTranslator),
            clipboard,
            opener,
        )
    }

    fn controller(hyphenate: bool) -> SessionController {
        controller_with(
            Settings {
                hyphenate,
                ..Settings::default()
            },
            Arc::new(MemoryClipboard::new()),
            Arc::new(RecordingOpener::default()),
        )
    }

    fn dolphin_controller() -> SessionController {
        SessionController::new(
            Settings::default(),
            Arc::new(DolphinCodec),
            Arc::new(DolphinCodec),
            Arc::new(MemoryClipboard::new()),
            Arc::new(RecordingOpener::default()),
        )
    }

    fn assert_consistent(state: &SessionState) {
        if state.input_text().is_empty() {
            assert!(state.input_label().is_none());
            assert!(state.output_label().is_none());
        } else {
            let input = state.input_label().expect("input label set");
            assert_eq!(state.output_label(), Some(input.opposite()));
        }
    }

    #[tokio::test]
    async fn hyphenated_input_is_translated() {
        let session = controller(true);
        let outcome = session.input_edit("hello world").await.unwrap();
        assert!(matches!(outcome, ActionOutcome::Applied(_)));

        let state = session.state();
        assert_eq!(state.input_text(), "hello-world");
        assert_eq!(state.output_text(), "HELLO WORLD");
        assert_eq!(state.input_label(), Some(Label::Human));
        assert_eq!(state.output_label(), Some(Label::Dolphin));
        assert!(state.normalize());
    }

    #[tokio::test]
    async fn empty_input_clears_everything() {
        let session = controller(false);
        session.input_edit("abc").await.unwrap();
        session.input_edit("").await.unwrap();

        let state = session.state();
        assert_eq!(state.input_text(), "");
        assert_eq!(state.output_text(), "");
        assert_eq!(state.input_label(), None);
        assert_eq!(state.output_label(), None);
    }

    #[tokio::test]
    async fn labels_stay_complementary() {
        let session = controller(false);
        for text in ["hello", "HELLO", "mixed Case", "", "42", "A B"] {
            session.input_edit(text).await.unwrap();
            assert_consistent(&session.state());
        }
    }

    #[tokio::test]
    async fn primary_input_forces_flag_off() {
        let session = controller(true);
        session.input_edit("HELLO THERE").await.unwrap();

        let state = session.state();
        assert!(!state.normalize());
        assert_eq!(state.input_text(), "HELLO THERE");
        assert_eq!(state.input_label(), Some(Label::Dolphin));
    }

    #[tokio::test]
    async fn rederive_is_idempotent() {
        let session = controller(true);
        for text in ["hello world", "HELLO", "a-b c"] {
            let first = session.rederive(text, true).await.unwrap();
            let second = session
                .rederive(first.input_text(), first.normalize())
                .await
                .unwrap();
            assert_eq!(first.output_text(), second.output_text());
            assert_eq!(first.input_label(), second.input_label());
            assert_eq!(first.output_label(), second.output_label());
        }
    }

    #[tokio::test]
    async fn toggle_converts_input_both_ways() {
        let session = controller(false);
        session.input_edit("good morning sea").await.unwrap();

        session.toggle_normalize(true).await.unwrap();
        assert_eq!(session.state().input_text(), "good-morning-sea");
        assert!(session.state().normalize());

        session.toggle_normalize(false).await.unwrap();
        let state = session.state();
        assert_eq!(state.input_text(), "good morning sea");
        assert!(!state.normalize());
        assert_eq!(state.output_text(), "GOOD MORNING SEA");
    }

    #[tokio::test]
    async fn toggle_ignored_for_primary_input() {
        let session = controller(false);
        session.input_edit("LOUD").await.unwrap();

        let outcome = session.toggle_normalize(true).await.unwrap();
        assert_eq!(outcome, ActionOutcome::Ignored);
        assert!(!session.state().normalize());
        assert!(!session.snapshot().available.hyphenate);
    }

    #[tokio::test]
    async fn swap_twice_restores_texts() {
        let session = controller(false);
        session.input_edit("hello world").await.unwrap();
        let before = session.state();

        session.swap().await.unwrap();
        assert_eq!(session.state().input_text(), "HELLO WORLD");
        assert_eq!(session.state().output_text(), "hello world");
        assert_eq!(session.state().input_label(), Some(Label::Dolphin));

        session.swap().await.unwrap();
        assert_eq!(session.state(), before);
    }

    #[tokio::test]
    async fn clear_is_ignored_without_output() {
        let session = controller(false);
        assert_eq!(session.clear().await.unwrap(), ActionOutcome::Ignored);

        session.input_edit("hi").await.unwrap();
        assert!(matches!(
            session.clear().await.unwrap(),
            ActionOutcome::Applied(_)
        ));
        assert_eq!(session.state().output_text(), "");
    }

    #[tokio::test]
    async fn paste_runs_through_normalization() {
        let clipboard = Arc::new(MemoryClipboard::with_text("from the clipboard"));
        let session = controller_with(
            Settings {
                hyphenate: true,
                ..Settings::default()
            },
            clipboard,
            Arc::new(RecordingOpener::default()),
        );

        session.paste().await.unwrap();
        assert_eq!(session.state().input_text(), "from-the-clipboard");
        assert_eq!(session.state().output_text(), "FROM THE CLIPBOARD");
    }

    #[tokio::test]
    async fn paste_failure_leaves_state_alone() {
        let session = controller_with(
            Settings::default(),
            Arc::new(BrokenClipboard),
            Arc::new(RecordingOpener::default()),
        );
        session.input_edit("keep").await.unwrap();
        let before = session.state();

        let err = session.paste().await.unwrap_err();
        assert!(matches!(err, AppError::Clipboard(_)));
        assert_eq!(session.state(), before);
        assert!(session.last_error().is_some());
    }

    #[tokio::test]
    async fn copy_writes_output() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let session = controller_with(
            Settings::default(),
            clipboard.clone(),
            Arc::new(RecordingOpener::default()),
        );
        assert_eq!(session.copy(), ActionOutcome::Ignored);

        session.input_edit("splash").await.unwrap();
        assert_eq!(
            session.copy(),
            ActionOutcome::Copied {
                text: "SPLASH".to_string()
            }
        );
        assert_eq!(clipboard.read_text().await.unwrap(), "SPLASH");
    }

    #[tokio::test]
    async fn copy_failure_is_logged_only() {
        let session = controller_with(
            Settings::default(),
            Arc::new(BrokenClipboard),
            Arc::new(RecordingOpener::default()),
        );
        session.input_edit("splash").await.unwrap();

        assert!(matches!(session.copy(), ActionOutcome::Copied { .. }));
        assert!(matches!(
            session.last_error().map(|e| e.error),
            Some(AppError::Clipboard(_))
        ));
    }

    #[tokio::test]
    async fn translation_failure_keeps_stale_output() {
        let session = controller(false);
        session.input_edit("first").await.unwrap();
        let before = session.state();

        let err = session.input_edit("boom").await.unwrap_err();
        assert!(matches!(err, AppError::Translation(_)));
        assert_eq!(session.state(), before);
        assert_eq!(
            session.last_error().and_then(|e| e.context),
            Some("Input edit".to_string())
        );
    }

    #[tokio::test]
    async fn later_submission_wins_over_slower_earlier_one() {
        let session = controller(false);

        let (slow, fast) = tokio::join!(session.input_edit("slow text"), session.input_edit("fast"));

        assert_eq!(slow.unwrap(), ActionOutcome::Superseded);
        assert!(matches!(fast.unwrap(), ActionOutcome::Applied(_)));
        assert_eq!(session.state().input_text(), "fast");
        assert_eq!(session.state().output_text(), "FAST");
    }

    #[tokio::test]
    async fn failing_later_submission_keeps_state_from_before_both() {
        let session = controller(false);
        session.input_edit("first").await.unwrap();
        let before = session.state();

        let (slow, failed) = tokio::join!(session.input_edit("slow text"), session.input_edit("boom"));

        assert_eq!(slow.unwrap(), ActionOutcome::Superseded);
        assert!(matches!(failed, Err(AppError::Translation(_))));
        assert_eq!(session.state(), before);
        assert_eq!(session.state().output_text(), "FIRST");
    }

    #[tokio::test]
    async fn share_respects_length_guards() {
        let opener = Arc::new(RecordingOpener::default());
        let session = controller_with(
            Settings::default(),
            Arc::new(MemoryClipboard::new()),
            opener.clone(),
        );
        session.input_edit(&"a".repeat(300)).await.unwrap();

        assert_eq!(session.post_to_twitter(), ActionOutcome::Ignored);
        assert!(matches!(
            session.cast_to_warpcast(),
            ActionOutcome::Shared {
                target: ShareTarget::Warpcast,
                ..
            }
        ));
        assert_eq!(opener.opened.lock().unwrap().len(), 1);

        let snapshot = session.snapshot();
        assert!(snapshot.available.cast);
        assert!(!snapshot.available.tweet);
    }

    #[tokio::test]
    async fn cast_includes_embeds_from_output() {
        let session = controller(false);
        session.input_edit("see example.com").await.unwrap();

        match session.cast_to_warpcast() {
            ActionOutcome::Shared { url, .. } => {
                assert!(url.ends_with("&embeds[]=https%3A%2F%2FEXAMPLE.COM"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn dolphin_input_disables_hyphenate() {
        let session = dolphin_controller();
        session.input_edit("sos").await.unwrap();
        session.toggle_normalize(true).await.unwrap();
        assert!(session.state().normalize());

        session.swap().await.unwrap();
        let state = session.state();
        assert_eq!(state.input_text(), "EEE eee EEE");
        assert_eq!(state.output_text(), "SOS");
        assert_eq!(state.input_label(), Some(Label::Dolphin));
        assert!(!state.normalize());
    }

    #[tokio::test]
    async fn dolphin_hyphenation_keeps_word_breaks() {
        let session = dolphin_controller();
        session.toggle_normalize(true).await.unwrap();
        session.input_edit("hi you").await.unwrap();

        let state = session.state();
        assert_eq!(state.input_text(), "hi-you");
        assert_eq!(state.output_text(), "EEEE EE eEEEEe eEee eee EEe");
    }

    #[tokio::test]
    async fn uncodable_input_still_has_output_to_clear() {
        let session = dolphin_controller();
        for text in ["#", "   ", "EEEEEEEEE"] {
            session.input_edit(text).await.unwrap();
            let snapshot = session.snapshot();
            assert!(!snapshot.output_text.is_empty(), "empty output for {:?}", text);
            assert!(snapshot.available.clear);
            assert_consistent(&session.state());

            assert!(matches!(
                session.clear().await.unwrap(),
                ActionOutcome::Applied(_)
            ));
            assert_eq!(session.state().input_text(), "");
        }
    }
}
