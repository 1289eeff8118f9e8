use std::sync::atomic::Ordering;
use std::time::Duration;

use milo_ai::AiError;
use milo_common::{Event, Role};
use milo_store::PersistenceGateway;
use tokio::sync::broadcast;

use crate::error::SessionError;
use crate::session::SessionSettings;
use crate::test_support::{harness, harness_with, ScriptedInference, StoreWrite};

async fn wait_for_retitle(rx: &mut broadcast::Receiver<Event>) -> String {
    let wait = async {
        loop {
            if let Ok(Event::ConversationRetitled { title, .. }) = rx.recv().await {
                return title;
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(5), wait)
        .await
        .expect("no retitle event")
}

async fn wait_for_inference_calls(inference: &ScriptedInference, count: usize) {
    for _ in 0..1000 {
        if inference.calls().len() >= count {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("inference was never called");
}

#[tokio::test]
async fn hello_from_idle_creates_titles_and_replies() {
    let h = harness(ScriptedInference::default().reply("Hi! How can I help?"));
    let mut rx = h.events.subscribe();

    let reply = h.session.send_message("Hello MILO!").await.unwrap().unwrap();
    assert_eq!(reply.content, "Hi! How can I help?");
    assert_eq!(reply.role, Role::Assistant);

    let snapshot = h.session.snapshot();
    let conv_id = snapshot.current_conversation_id.clone().unwrap();
    assert_eq!(snapshot.messages.len(), 2);
    assert_eq!(snapshot.messages[0].role, Role::User);
    assert_eq!(snapshot.messages[0].content, "Hello MILO!");
    assert_eq!(snapshot.messages[1].id, reply.id);
    assert!(!snapshot.is_generating);
    assert!(snapshot.error.is_none());

    let calls = h.inference.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].text, "Hello MILO!");
    assert_eq!(calls[0].history.len(), 1);
    assert_eq!(calls[0].history[0].content, "Hello MILO!");

    assert_eq!(wait_for_retitle(&mut rx).await, "Hello MILO!");
    let listed = h.session.conversations();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, conv_id);
    assert_eq!(listed[0].title, "Hello MILO!");
}

#[tokio::test]
async fn blank_input_is_ignored() {
    let h = harness(ScriptedInference::default());

    assert!(h.session.send_message("   ").await.unwrap().is_none());
    assert!(h.session.send_message("").await.unwrap().is_none());

    assert!(h.inference.calls().is_empty());
    assert!(h.session.current_conversation_id().is_none());
    assert!(h.store.list_conversations().await.unwrap().is_empty());
}

#[tokio::test]
async fn inference_failure_keeps_user_message() {
    let h = harness(ScriptedInference::default().fail(AiError::NotConfigured));

    let err = h.session.send_message("Hello MILO!").await.unwrap_err();
    assert!(matches!(err, SessionError::Inference(AiError::NotConfigured)));

    let snapshot = h.session.snapshot();
    assert_eq!(snapshot.error.as_deref(), Some("API key not configured"));
    assert!(!snapshot.is_generating);
    assert_eq!(snapshot.messages.len(), 1);
    assert_eq!(snapshot.messages[0].content, "Hello MILO!");

    let conv_id = snapshot.current_conversation_id.unwrap();
    let stored = h.store.list_messages(&conv_id).await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn next_send_clears_previous_error() {
    let h = harness(
        ScriptedInference::default()
            .fail(AiError::RateLimited)
            .reply("second try worked"),
    );

    assert!(h.session.send_message("first").await.is_err());
    assert!(h.session.error().is_some());

    h.session.send_message("again").await.unwrap();
    assert!(h.session.error().is_none());
    assert_eq!(h.session.message_count(), 3);
}

#[tokio::test]
async fn first_send_creates_then_appends_once_before_inference() {
    let h = harness(ScriptedInference::gated().reply("Hi!"));

    let session = h.session.clone();
    let pending = tokio::spawn(async move { session.send_message("Hello MILO!").await });
    wait_for_inference_calls(&h.inference, 1).await;
    assert_eq!(
        h.store.writes(),
        vec![StoreWrite::Create, StoreWrite::Append(Role::User)]
    );

    h.inference.release();
    pending.await.unwrap().unwrap();
    assert_eq!(
        h.store.writes(),
        vec![
            StoreWrite::Create,
            StoreWrite::Append(Role::User),
            StoreWrite::Append(Role::Assistant),
        ]
    );
}

#[tokio::test]
async fn conversation_is_created_only_once() {
    let h = harness(ScriptedInference::default());

    h.session.send_message("one").await.unwrap();
    h.session.send_message("two").await.unwrap();

    assert_eq!(h.store.list_conversations().await.unwrap().len(), 1);
    let creates = h.store.writes().into_iter().filter(|w| *w == StoreWrite::Create);
    assert_eq!(creates.count(), 1);
    let calls = h.inference.calls();
    assert_eq!(calls[1].history.len(), 3);
    assert_eq!(calls[1].history[2].content, "two");
}

#[tokio::test]
async fn history_is_bounded_by_context_window() {
    let settings = SessionSettings {
        context_window: 3,
        ..SessionSettings::default()
    };
    let h = harness_with(ScriptedInference::default(), settings);

    for n in 0..5 {
        h.session.send_message(&format!("message {n}")).await.unwrap();
    }

    let last = h.inference.calls().pop().unwrap();
    assert_eq!(last.history.len(), 3);
    assert_eq!(last.history[0].role, Role::User);
    assert_eq!(last.history[0].content, "message 3");
    assert_eq!(last.history[2].content, "message 4");
}

#[tokio::test]
async fn create_failure_reports_error_without_inference() {
    let h = harness(ScriptedInference::default());
    h.store.fail_create.store(true, Ordering::SeqCst);

    let err = h.session.send_message("Hello").await.unwrap_err();
    assert!(matches!(err, SessionError::CreateConversation(_)));
    assert_eq!(
        h.session.error().as_deref(),
        Some("Failed to create conversation")
    );
    assert!(!h.session.is_generating());
    assert!(h.inference.calls().is_empty());
    assert!(h.session.current_conversation_id().is_none());
}

#[tokio::test]
async fn append_failure_never_raises_generating() {
    let h = harness(ScriptedInference::default());
    let mut rx = h.events.subscribe();
    h.store.fail_append.store(true, Ordering::SeqCst);

    let err = h.session.send_message("Hello").await.unwrap_err();
    assert!(matches!(err, SessionError::SendMessage(_)));
    assert!(h.inference.calls().is_empty());
    assert!(h.session.messages().is_empty());

    while let Ok(event) = rx.try_recv() {
        assert!(!matches!(event, Event::GeneratingChanged(true)));
    }
}

#[tokio::test]
async fn concurrent_send_is_rejected_as_busy() {
    let h = harness(ScriptedInference::gated().reply("done"));

    let session = h.session.clone();
    let first = tokio::spawn(async move { session.send_message("first").await });
    wait_for_inference_calls(&h.inference, 1).await;

    let before = h.session.snapshot();
    assert!(before.is_generating);
    let err = h.session.send_message("second").await.unwrap_err();
    assert!(matches!(err, SessionError::Busy));
    assert_eq!(h.session.snapshot(), before);

    h.inference.release();
    let reply = first.await.unwrap().unwrap().unwrap();
    assert_eq!(reply.content, "done");
    assert!(!h.session.is_generating());
    assert_eq!(h.inference.calls().len(), 1);
}

#[tokio::test]
async fn reply_for_abandoned_conversation_is_only_persisted() {
    let h = harness(ScriptedInference::gated().reply("late reply"));

    let session = h.session.clone();
    let pending = tokio::spawn(async move { session.send_message("question").await });
    wait_for_inference_calls(&h.inference, 1).await;

    let conv_id = h.session.current_conversation_id().unwrap();
    h.session.start_new_conversation();
    assert!(h.session.current_conversation_id().is_none());

    h.inference.release();
    pending.await.unwrap().unwrap();

    let snapshot = h.session.snapshot();
    assert!(snapshot.current_conversation_id.is_none());
    assert!(snapshot.messages.is_empty());
    assert!(!snapshot.is_generating);

    let stored = h.store.list_messages(&conv_id).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[1].content, "late reply");
}

#[tokio::test(start_paused = true)]
async fn slow_inference_times_out() {
    let settings = SessionSettings {
        inference_timeout: Some(Duration::from_secs(30)),
        ..SessionSettings::default()
    };
    let h = harness_with(ScriptedInference::gated(), settings);

    let err = h.session.send_message("hello?").await.unwrap_err();
    assert!(matches!(err, SessionError::Inference(AiError::Timeout)));
    assert_eq!(h.session.error().as_deref(), Some("Request timed out"));
    assert!(!h.session.is_generating());
    assert_eq!(h.session.message_count(), 1);
}

#[tokio::test]
async fn auto_title_runs_once_per_conversation() {
    let h = harness(ScriptedInference::default());
    let mut rx = h.events.subscribe();

    h.session.send_message("Plan my week").await.unwrap();
    wait_for_retitle(&mut rx).await;
    h.session.send_message("And next week").await.unwrap();
    h.session.send_message("And the one after").await.unwrap();
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }

    assert_eq!(h.store.auto_title_calls.load(Ordering::SeqCst), 1);
    let conv_id = h.session.current_conversation_id().unwrap();
    let conv = h.store.get_conversation(&conv_id).await.unwrap().unwrap();
    assert_eq!(conv.title, "Plan my week");
}

#[tokio::test]
async fn load_conversation_replaces_messages() {
    let h = harness(ScriptedInference::default());
    h.session.send_message("first chat").await.unwrap();
    let first = h.session.current_conversation_id().unwrap();

    h.session.start_new_conversation();
    h.session.send_message("second chat").await.unwrap();
    assert_ne!(h.session.current_conversation_id().unwrap(), first);

    h.session.load_conversation(&first).await.unwrap();
    let messages = h.session.messages();
    assert_eq!(h.session.current_conversation_id(), Some(first));
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "first chat");
}

#[tokio::test]
async fn load_failure_sets_error_and_keeps_state() {
    let h = harness(ScriptedInference::default());
    h.session.send_message("keep me").await.unwrap();
    let open = h.session.current_conversation_id();

    h.store.fail_load.store(true, Ordering::SeqCst);
    let err = h.session.load_conversation(&open.clone().unwrap()).await;
    assert!(matches!(err, Err(SessionError::LoadConversation(_))));
    assert_eq!(
        h.session.error().as_deref(),
        Some("Failed to load conversation")
    );
    assert_eq!(h.session.current_conversation_id(), open);
    assert_eq!(h.session.message_count(), 2);
}

#[tokio::test]
async fn list_failure_is_silent() {
    let h = harness(ScriptedInference::default());
    h.session.send_message("hi").await.unwrap();
    h.session.load_conversations().await;
    assert_eq!(h.session.conversations().len(), 1);

    h.store.fail_list.store(true, Ordering::SeqCst);
    h.session.load_conversations().await;
    assert_eq!(h.session.conversations().len(), 1);
    assert!(h.session.error().is_none());
}

#[tokio::test]
async fn deleting_open_conversation_returns_to_idle() {
    let h = harness(ScriptedInference::default());
    h.session.send_message("to be deleted").await.unwrap();
    let id = h.session.current_conversation_id().unwrap();
    h.session.load_conversations().await;

    h.session.delete_conversation(&id).await.unwrap();

    let snapshot = h.session.snapshot();
    assert!(snapshot.current_conversation_id.is_none());
    assert!(snapshot.messages.is_empty());
    assert!(snapshot.conversations.is_empty());
    assert!(h.store.list_messages(&id).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_failure_leaves_list_unchanged() {
    let h = harness(ScriptedInference::default());
    h.session.send_message("survivor").await.unwrap();
    let id = h.session.current_conversation_id().unwrap();
    h.session.load_conversations().await;

    h.store.fail_delete.store(true, Ordering::SeqCst);
    let err = h.session.delete_conversation(&id).await.unwrap_err();
    assert!(matches!(err, SessionError::DeleteConversation(_)));
    assert_eq!(h.session.conversations().len(), 1);
    assert_eq!(h.session.current_conversation_id(), Some(id));
}

#[tokio::test]
async fn clear_keeps_persisted_history() {
    let h = harness(ScriptedInference::default());
    h.session.send_message("remember this").await.unwrap();
    let id = h.session.current_conversation_id().unwrap();

    h.session.clear_conversation();

    assert!(h.session.current_conversation_id().is_none());
    assert!(h.session.messages().is_empty());
    assert_eq!(h.store.list_messages(&id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn rename_updates_store_and_list() {
    let h = harness(ScriptedInference::default());
    h.session.send_message("untitled").await.unwrap();
    let id = h.session.current_conversation_id().unwrap();
    h.session.load_conversations().await;

    h.session
        .rename_conversation(&id, "  Weekly plan ")
        .await
        .unwrap();

    assert_eq!(h.session.conversations()[0].title, "Weekly plan");
    let stored = h.store.get_conversation(&id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Weekly plan");

    let missing = milo_common::ConversationId::from("missing");
    assert!(matches!(
        h.session.rename_conversation(&missing, "x").await,
        Err(SessionError::NotFound(_))
    ));
}

#[tokio::test]
async fn events_follow_send_lifecycle() {
    let h = harness(ScriptedInference::default());
    let mut rx = h.events.subscribe();

    h.session.send_message("trace me").await.unwrap();

    let mut seen = Vec::new();
    while let Ok(event) = rx.try_recv() {
        seen.push(event);
    }
    let generating_on = seen
        .iter()
        .position(|e| matches!(e, Event::GeneratingChanged(true)))
        .unwrap();
    let generating_off = seen
        .iter()
        .position(|e| matches!(e, Event::GeneratingChanged(false)))
        .unwrap();
    let opened = seen
        .iter()
        .position(|e| matches!(e, Event::ConversationOpened(_)))
        .unwrap();
    assert!(opened < generating_on);
    assert!(generating_on < generating_off);
    assert_eq!(
        seen.iter()
            .filter(|e| matches!(e, Event::MessageAppended(_)))
            .count(),
        2
    );
}
