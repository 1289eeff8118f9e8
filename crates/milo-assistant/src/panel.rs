//! Panel visibility and the history/settings sub-views.
//!
//! The panel collapses to a compact pill and expands on demand, on any
//! generating activity, and never in response to the same pointer press
//! that opened it.

use std::time::Duration;

use milo_common::{ConversationId, Event};
use milo_config::schema::PanelConfig;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

use crate::error::SessionError;
use crate::session::SessionManager;

/// Screen region of the expanded panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }
}

/// A destructive action waiting for the user to confirm it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PendingConfirmation {
    Delete(ConversationId),
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmedAction {
    Deleted(ConversationId),
    Cleared,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PanelState {
    pub is_open: bool,
    pub is_history_open: bool,
    pub is_settings_open: bool,
    pub pending: Option<PendingConfirmation>,
}

pub struct PanelController {
    state: PanelState,
    grace: Duration,
    expanded_at: Option<Instant>,
}

impl PanelController {
    pub fn new(config: &PanelConfig) -> Self {
        let mut controller = Self {
            state: PanelState::default(),
            grace: Duration::from_millis(config.outside_click_grace_ms),
            expanded_at: None,
        };
        if config.start_expanded {
            controller.expand();
        }
        controller
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn is_expanded(&self) -> bool {
        self.state.is_open
    }

    pub fn pending(&self) -> Option<&PendingConfirmation> {
        self.state.pending.as_ref()
    }

    pub fn expand(&mut self) {
        if !self.state.is_open {
            debug!("panel expanded");
            self.state.is_open = true;
            self.expanded_at = Some(Instant::now());
        }
    }

    /// Collapse and drop any open sub-view or pending confirmation.
    pub fn collapse(&mut self) {
        if self.state.is_open {
            debug!("panel collapsed");
        }
        self.state = PanelState::default();
        self.expanded_at = None;
    }

    pub fn toggle(&mut self) {
        if self.state.is_open {
            self.collapse();
        } else {
            self.expand();
        }
    }

    pub fn toggle_history(&mut self) {
        self.expand();
        self.state.is_history_open = !self.state.is_history_open;
        if self.state.is_history_open {
            self.state.is_settings_open = false;
        }
    }

    pub fn toggle_settings(&mut self) {
        self.expand();
        self.state.is_settings_open = !self.state.is_settings_open;
        if self.state.is_settings_open {
            self.state.is_history_open = false;
        }
    }

    /// React to session events.
    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::GeneratingChanged(true) => self.expand(),
            Event::ConversationDeleted(id) => {
                if self.state.pending == Some(PendingConfirmation::Delete(id.clone())) {
                    self.state.pending = None;
                }
            }
            _ => {}
        }
    }

    /// Handle a pointer press at `(x, y)`. A press outside `bounds`
    /// collapses the panel unless it came within the grace period after
    /// expanding. Returns whether the panel collapsed.
    pub fn pointer_down(&mut self, x: f64, y: f64, bounds: Rect) -> bool {
        if !self.state.is_open || bounds.contains(x, y) {
            return false;
        }
        if let Some(at) = self.expanded_at {
            if at.elapsed() < self.grace {
                return false;
            }
        }
        self.collapse();
        true
    }

    /// Message count to show on the collapsed pill.
    pub fn badge(&self, session: &SessionManager) -> Option<usize> {
        if self.state.is_open {
            return None;
        }
        let count = session.message_count();
        (count > 0).then_some(count)
    }

    pub fn new_chat(&mut self, session: &SessionManager) {
        session.start_new_conversation();
        self.state.is_history_open = false;
        self.state.pending = None;
    }

    pub async fn open_from_history(
        &mut self,
        session: &SessionManager,
        id: &ConversationId,
    ) -> Result<(), SessionError> {
        session.load_conversation(id).await?;
        self.state.is_history_open = false;
        Ok(())
    }

    pub fn request_delete(&mut self, id: ConversationId) {
        self.expand();
        self.state.pending = Some(PendingConfirmation::Delete(id));
    }

    pub fn request_clear(&mut self) {
        self.expand();
        self.state.pending = Some(PendingConfirmation::Clear);
    }

    pub fn cancel(&mut self) {
        self.state.pending = None;
    }

    /// Carry out the pending action. `Ok(None)` when nothing was pending.
    pub async fn confirm(
        &mut self,
        session: &SessionManager,
    ) -> Result<Option<ConfirmedAction>, SessionError> {
        let Some(pending) = self.state.pending.take() else {
            return Ok(None);
        };
        match pending {
            PendingConfirmation::Delete(id) => {
                session.delete_conversation(&id).await?;
                Ok(Some(ConfirmedAction::Deleted(id)))
            }
            PendingConfirmation::Clear => {
                session.clear_conversation();
                Ok(Some(ConfirmedAction::Cleared))
            }
        }
    }
}
