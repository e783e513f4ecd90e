//! Record snapshot held by a dashboard view.

use crate::poller::FetchResult;
use chrono::{DateTime, Utc};
use licdash_core::ports::LicenseSource;
use licdash_core::{LicenseKey, LicensePatch, LicenseRecord, Result, Session};
use tracing::{debug, info, warn};

/// What a view can currently show.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    Ready(Vec<LicenseRecord>),
    /// The last fetch failed; nothing is rendered but the message.
    Failed(String),
}

/// The current license listing of one view.
///
/// Fetches replace the whole snapshot. Edits patch a single record in place
/// and stay in effect until the next fetch.
#[derive(Debug)]
pub struct LicenseView {
    state: ViewState,
    fetched_at: Option<DateTime<Utc>>,
}

impl LicenseView {
    /// Open a view; only authenticated sessions get one.
    pub fn open(session: &Session) -> Result<Self> {
        session.require()?;
        Ok(Self {
            state: ViewState::Loading,
            fetched_at: None,
        })
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Records of the current snapshot; empty unless the view is ready.
    pub fn records(&self) -> &[LicenseRecord] {
        match &self.state {
            ViewState::Ready(records) => records,
            _ => &[],
        }
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    pub fn find(&self, key: &LicenseKey) -> Option<&LicenseRecord> {
        self.records()
            .iter()
            .find(|r| r.license_key.as_ref() == Some(key))
    }

    /// Replace the snapshot with a fetch result.
    pub fn apply_fetch(&mut self, result: FetchResult) {
        match result {
            Ok(records) => {
                debug!(count = records.len(), "View snapshot replaced");
                self.state = ViewState::Ready(records);
                self.fetched_at = Some(Utc::now());
            }
            Err(e) => {
                warn!(error = %e, "View fetch failed");
                self.state = ViewState::Failed(e.to_string());
            }
        }
    }

    pub async fn refresh(&mut self, source: &dyn LicenseSource) {
        let result = source.list_licenses().await;
        self.apply_fetch(result);
    }

    /// Send a partial update and patch the local record on success.
    ///
    /// On failure the snapshot is left as it was. Edits are not coordinated
    /// with polling: a poll response fetched before the update lands but
    /// applied after it overwrites the patched record until the next poll.
    pub async fn apply_edit(
        &mut self,
        source: &dyn LicenseSource,
        key: &LicenseKey,
        patch: &LicensePatch,
    ) -> Result<()> {
        patch.validate()?;

        let echoed = source.update_license(key, patch).await.inspect_err(|e| {
            warn!(license_key = %key, error = %e, "License update failed");
        })?;

        if let ViewState::Ready(records) = &mut self.state
            && let Some(record) = records
                .iter_mut()
                .find(|r| r.license_key.as_ref() == Some(key))
        {
            match echoed {
                Some(updated) => *record = updated,
                None => patch.apply_to(record),
            }
            info!(license_key = %key, "Local record patched");
        }
        Ok(())
    }
}
