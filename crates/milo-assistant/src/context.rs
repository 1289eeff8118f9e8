//! Wiring of the assistant components from a `MiloConfig`.

use std::sync::Arc;

use milo_ai::InferenceGateway;
use milo_common::{Event, EventBus};
use milo_config::MiloConfig;
use milo_store::PersistenceGateway;
use tokio::sync::broadcast;

use crate::panel::PanelController;
use crate::reveal::{RevealCache, RevealEngine, VoiceOutput, VoiceSettings, VoiceTrigger};
use crate::session::{SessionManager, SessionSettings};

/// Everything a front end needs, built once per process.
///
/// The session manager is shared; the reveal cache behind the engine and
/// the voice trigger outlives any view of the message list.
pub struct AssistantContext {
    pub events: Arc<EventBus>,
    pub session: Arc<SessionManager>,
    pub reveal: RevealEngine,
    pub voice: VoiceTrigger,
    pub panel: PanelController,
}

impl AssistantContext {
    pub fn new(
        config: &MiloConfig,
        store: Arc<dyn PersistenceGateway>,
        inference: Arc<dyn InferenceGateway>,
        voice_output: Arc<dyn VoiceOutput>,
    ) -> Self {
        let events = Arc::new(EventBus::default());
        let session = Arc::new(
            SessionManager::new(store, inference, events.clone())
                .with_settings(SessionSettings::from(&config.assistant)),
        );
        let cache = Arc::new(RevealCache::new(
            config.reveal.voice_cache_capacity as usize,
        ));
        Self {
            reveal: RevealEngine::new(cache.clone(), &config.reveal),
            voice: VoiceTrigger::new(voice_output, cache, VoiceSettings::from(&config.voice)),
            panel: PanelController::new(&config.panel),
            session,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Feed an event to the components that react to session changes.
    pub fn dispatch(&mut self, event: &Event) {
        self.panel.handle_event(event);
        if matches!(event, Event::MessageAppended(_)) {
            self.voice.observe(&self.session.messages());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_support::{FlakyStore, RecordingVoice, ScriptedInference};

    #[tokio::test]
    async fn reply_expands_panel_and_is_spoken_once() {
        let mut config = MiloConfig::default();
        config.voice.enabled = true;
        let voice = Arc::new(RecordingVoice::default());
        let mut ctx = AssistantContext::new(
            &config,
            Arc::new(FlakyStore::default()),
            Arc::new(ScriptedInference::default().reply("Sure thing.")),
            voice.clone(),
        );
        let mut rx = ctx.subscribe();

        ctx.session.send_message("Hello MILO!").await.unwrap();
        while let Ok(event) = rx.try_recv() {
            ctx.dispatch(&event);
        }

        assert!(ctx.panel.is_expanded());
        assert_eq!(voice.spoken(), vec!["Sure thing.".to_string()]);

        let messages = ctx.session.messages();
        let tw = ctx.reveal.mount_latest(&messages).unwrap();
        assert_eq!(tw.full_text(), "Sure thing.");
        drop(tw);
        assert!(ctx.reveal.mount_latest(&messages).is_none());
    }
}
