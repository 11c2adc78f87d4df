use tracing::{debug, info, warn};

use crate::config::ListingSelectors;
use crate::traits::RenderSurface;

use super::scripts;
use super::types::ConsentOutcome;

/// 同意ダイアログ（インタースティシャル）を閉じる
///
/// 失敗してもエラーは返さない。結果は `ConsentOutcome` で表す。
pub struct ConsentDismisser<'a> {
    surface: &'a dyn RenderSurface,
    selectors: &'a ListingSelectors,
}

impl<'a> ConsentDismisser<'a> {
    pub fn new(surface: &'a dyn RenderSurface, selectors: &'a ListingSelectors) -> Self {
        Self { surface, selectors }
    }

    pub async fn attempt(&self) -> ConsentOutcome {
        debug!("Looking for consent dialog...");

        let script = scripts::dismiss_consent(self.selectors);
        let outcome = match self.surface.evaluate(&script).await {
            Ok(value) if value.as_bool().unwrap_or(false) => ConsentOutcome::Dismissed,
            Ok(_) => ConsentOutcome::NotFound,
            Err(e) => ConsentOutcome::Failed(e.to_string()),
        };

        match &outcome {
            ConsentOutcome::Dismissed => info!(
                "Dismissed consent dialog with '{}' button",
                self.selectors.consent_label
            ),
            ConsentOutcome::NotFound => info!("Consent dialog not found, continuing"),
            ConsentOutcome::Failed(reason) => {
                warn!("Consent dialog handling failed, continuing: {}", reason)
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeSite, FakeSurface};

    #[tokio::test]
    async fn test_dismisses_open_dialog() {
        let surface = FakeSurface::new(FakeSite {
            consent_label: Some("  Got it ".into()),
            ..FakeSite::single_page(vec![])
        });
        let selectors = ListingSelectors::default();

        let outcome = ConsentDismisser::new(&surface, &selectors).attempt().await;
        assert_eq!(outcome, ConsentOutcome::Dismissed);
        assert!(outcome.dismissed());
        assert!(!surface.consent_open());
    }

    #[tokio::test]
    async fn test_no_dialog_is_idempotent() {
        let surface = FakeSurface::new(FakeSite::single_page(vec![]));
        let selectors = ListingSelectors::default();
        let dismisser = ConsentDismisser::new(&surface, &selectors);

        for _ in 0..2 {
            let outcome = dismisser.attempt().await;
            assert_eq!(outcome, ConsentOutcome::NotFound);
            assert!(!outcome.dismissed());
        }
        assert!(surface.clicks().is_empty());
        assert_eq!(surface.current_page(), 1);
    }

    #[tokio::test]
    async fn test_label_mismatch_leaves_dialog_open() {
        let surface = FakeSurface::new(FakeSite {
            consent_label: Some("Manage settings".into()),
            ..FakeSite::single_page(vec![])
        });
        let selectors = ListingSelectors::default();

        let outcome = ConsentDismisser::new(&surface, &selectors).attempt().await;
        assert_eq!(outcome, ConsentOutcome::NotFound);
        assert!(surface.consent_open());
    }

    #[tokio::test]
    async fn test_script_error_is_contained() {
        let surface = FakeSurface::new(FakeSite {
            broken_scripts: true,
            ..FakeSite::single_page(vec![])
        });
        let selectors = ListingSelectors::default();

        let outcome = ConsentDismisser::new(&surface, &selectors).attempt().await;
        assert!(matches!(outcome, ConsentOutcome::Failed(_)));
        assert!(!outcome.dismissed());
    }
}
