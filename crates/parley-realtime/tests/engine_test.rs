//! Integration tests for the realtime engine: presence edges, room
//! broadcasts, receipts, and missed-message replay, over in-memory stores.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::mpsc;

use parley_auth::jwt::decoder::JwtDecoder;
use parley_core::config::auth::AuthConfig;
use parley_core::config::realtime::RealtimeConfig;
use parley_core::result::AppResult;
use parley_core::types::{ChatId, MessageId, UserId};
use parley_entity::message::model::Message;
use parley_entity::message::status::MessageStatus;
use parley_entity::user::role::UserRole;
use parley_realtime::connection::handle::ConnectionHandle;
use parley_realtime::store::{ChatStore, MessageStore, UserStore};
use parley_realtime::{ConnectionAuthenticator, RealtimeEngine};

/// In-memory stand-in for the chat, message, and user repositories.
#[derive(Default)]
struct FakeStore {
    participants: Mutex<HashMap<ChatId, HashSet<UserId>>>,
    messages: Mutex<Vec<Message>>,
    last_seen: Mutex<HashMap<UserId, DateTime<Utc>>>,
}

impl FakeStore {
    fn add_chat(&self, chat_id: ChatId, members: &[UserId]) {
        self.participants
            .lock()
            .unwrap()
            .insert(chat_id, members.iter().copied().collect());
    }

    fn add_message(&self, chat_id: ChatId, sender_id: UserId, content: &str, status: MessageStatus, age_minutes: i64) -> MessageId {
        let id = MessageId::new();
        let at = Utc::now() - Duration::minutes(age_minutes);
        self.messages.lock().unwrap().push(Message {
            id,
            chat_id,
            sender_id,
            content: content.to_string(),
            status,
            created_at: at,
            updated_at: at,
        });
        id
    }

    fn status_of(&self, id: MessageId) -> Option<MessageStatus> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.status)
    }
}

#[async_trait]
impl ChatStore for FakeStore {
    async fn chat_ids_for_participant(&self, user_id: UserId) -> AppResult<Vec<ChatId>> {
        Ok(self
            .participants
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, members)| members.contains(&user_id))
            .map(|(chat_id, _)| *chat_id)
            .collect())
    }

    async fn is_participant(&self, chat_id: ChatId, user_id: UserId) -> AppResult<bool> {
        Ok(self
            .participants
            .lock()
            .unwrap()
            .get(&chat_id)
            .map(|members| members.contains(&user_id))
            .unwrap_or(false))
    }
}

#[async_trait]
impl MessageStore for FakeStore {
    async fn mark_delivered(&self, id: MessageId) -> AppResult<Option<Message>> {
        let mut messages = self.messages.lock().unwrap();
        match messages.iter_mut().find(|m| m.id == id) {
            Some(m) if m.status == MessageStatus::Sent => {
                m.status = MessageStatus::Delivered;
                Ok(Some(m.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn mark_read(&self, id: MessageId) -> AppResult<Option<Message>> {
        let mut messages = self.messages.lock().unwrap();
        match messages.iter_mut().find(|m| m.id == id) {
            Some(m) if m.status != MessageStatus::Read => {
                m.status = MessageStatus::Read;
                Ok(Some(m.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn find_undelivered(&self, chat_ids: &[ChatId]) -> AppResult<Vec<Message>> {
        let mut missed: Vec<Message> = self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.status == MessageStatus::Sent && chat_ids.contains(&m.chat_id))
            .cloned()
            .collect();
        missed.sort_by_key(|m| m.created_at);
        Ok(missed)
    }
}

#[async_trait]
impl UserStore for FakeStore {
    async fn update_last_seen(&self, user_id: UserId, at: DateTime<Utc>) -> AppResult<()> {
        self.last_seen.lock().unwrap().insert(user_id, at);
        Ok(())
    }
}

fn make_engine(store: Arc<FakeStore>) -> RealtimeEngine {
    make_engine_with(store, RealtimeConfig::default())
}

fn make_engine_with(store: Arc<FakeStore>, config: RealtimeConfig) -> RealtimeEngine {
    let auth_config = AuthConfig {
        jwt_secret: "engine-test-secret".into(),
        jwt_access_ttl_minutes: 15,
        jwt_refresh_ttl_hours: 24,
        password_min_length: 8,
    };
    let authenticator = ConnectionAuthenticator::new(Arc::new(JwtDecoder::new(&auth_config)));
    RealtimeEngine::new(
        config,
        authenticator,
        store.clone(),
        store.clone(),
        store,
    )
}

fn connect(engine: &RealtimeEngine, user_id: UserId, name: &str) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>, bool) {
    engine
        .connections
        .register(user_id, UserRole::User, name.to_string())
}

/// Drain every frame currently buffered on a connection.
fn drain(rx: &mut mpsc::Receiver<String>) -> Vec<serde_json::Value> {
    let mut frames = Vec::new();
    while let Ok(raw) = rx.try_recv() {
        frames.push(serde_json::from_str(&raw).unwrap());
    }
    frames
}

async fn join(engine: &RealtimeEngine, handle: &ConnectionHandle, chat_id: ChatId) {
    let frame = format!(r#"{{"event":"join-room","chatId":"{chat_id}"}}"#);
    engine.connections.handle_inbound(handle.id, &frame).await;
}

#[tokio::test]
async fn first_connection_broadcasts_online_once() {
    let store = Arc::new(FakeStore::default());
    let engine = make_engine(store);
    let alice = UserId::new();
    let bob = UserId::new();

    let (_a_handle, mut a_rx, a_first) = connect(&engine, alice, "alice");
    assert!(a_first);

    let (_b1, mut b1_rx, first) = connect(&engine, bob, "bob");
    assert!(first);
    let (_b2, mut b2_rx, second) = connect(&engine, bob, "bob");
    assert!(!second);

    let frames = drain(&mut a_rx);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["event"], "user-online");
    assert_eq!(frames[0]["userId"], bob.to_string());

    // The new connection does not see its own online edge.
    assert!(drain(&mut b1_rx).is_empty());
    assert!(drain(&mut b2_rx).is_empty());
    assert!(engine.connections.is_online(bob));
}

#[tokio::test]
async fn last_disconnect_broadcasts_offline_and_records_last_seen() {
    let store = Arc::new(FakeStore::default());
    let engine = make_engine(store.clone());
    let alice = UserId::new();
    let bob = UserId::new();

    let (_a, mut a_rx, _) = connect(&engine, alice, "alice");
    let (b1, _b1_rx, _) = connect(&engine, bob, "bob");
    let (b2, _b2_rx, _) = connect(&engine, bob, "bob");
    drain(&mut a_rx);

    engine.connections.unregister(b1.id).await;
    assert!(drain(&mut a_rx).is_empty());
    assert!(engine.connections.is_online(bob));
    assert!(store.last_seen.lock().unwrap().is_empty());

    engine.connections.unregister(b2.id).await;
    let frames = drain(&mut a_rx);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["event"], "user-offline");
    assert_eq!(frames[0]["userId"], bob.to_string());
    assert!(!engine.connections.is_online(bob));
    assert!(store.last_seen.lock().unwrap().contains_key(&bob));
}

#[tokio::test]
async fn replay_pushes_sent_messages_oldest_first() {
    let store = Arc::new(FakeStore::default());
    let alice = UserId::new();
    let bob = UserId::new();
    let shared = ChatId::new();
    let foreign = ChatId::new();
    store.add_chat(shared, &[alice, bob]);
    store.add_chat(foreign, &[alice]);

    let newer = store.add_message(shared, alice, "second", MessageStatus::Sent, 1);
    let older = store.add_message(shared, alice, "first", MessageStatus::Sent, 10);
    store.add_message(shared, alice, "already seen", MessageStatus::Delivered, 20);
    store.add_message(foreign, alice, "not bob's chat", MessageStatus::Sent, 5);

    let engine = make_engine(store);
    let (handle, mut rx, first) = connect(&engine, bob, "bob");
    assert!(first);

    let pushed = engine.replayer.replay(&handle).await;
    assert_eq!(pushed, 2);

    let frames = drain(&mut rx);
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0]["event"], "message-new");
    assert_eq!(frames[0]["id"], older.to_string());
    assert_eq!(frames[0]["content"], "first");
    assert_eq!(frames[0]["sender"], alice.to_string());
    assert_eq!(frames[0]["chatId"], shared.to_string());
    assert_eq!(frames[1]["id"], newer.to_string());
}

#[tokio::test]
async fn replay_backlog_larger_than_buffer_is_fully_delivered() {
    let store = Arc::new(FakeStore::default());
    let alice = UserId::new();
    let bob = UserId::new();
    let chat = ChatId::new();
    store.add_chat(chat, &[alice, bob]);
    for i in 0..10 {
        store.add_message(chat, alice, &format!("missed {i}"), MessageStatus::Sent, 10 - i);
    }

    let engine = make_engine_with(
        store,
        RealtimeConfig {
            channel_buffer_size: 4,
            ..RealtimeConfig::default()
        },
    );
    let (handle, mut rx, first) = connect(&engine, bob, "bob");
    assert!(first);

    // Drain concurrently, the way the socket's forwarding task does.
    let drainer = tokio::spawn(async move {
        let mut frames = Vec::new();
        while frames.len() < 10 {
            match rx.recv().await {
                Some(raw) => frames.push(serde_json::from_str::<serde_json::Value>(&raw).unwrap()),
                None => break,
            }
        }
        frames
    });

    let pushed = engine.replayer.replay(&handle).await;
    assert_eq!(pushed, 10);

    let frames = drainer.await.unwrap();
    assert_eq!(frames.len(), 10);
    assert_eq!(frames[0]["content"], "missed 0");
    assert_eq!(frames[9]["content"], "missed 9");
}

#[tokio::test]
async fn replay_with_no_missed_messages_pushes_nothing() {
    let store = Arc::new(FakeStore::default());
    let bob = UserId::new();

    let engine = make_engine(store);
    let (handle, mut rx, _) = connect(&engine, bob, "bob");

    assert_eq!(engine.replayer.replay(&handle).await, 0);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn join_requires_current_chat_membership() {
    let store = Arc::new(FakeStore::default());
    let alice = UserId::new();
    let mallory = UserId::new();
    let chat = ChatId::new();
    store.add_chat(chat, &[alice]);

    let engine = make_engine(store);
    let (a_handle, mut a_rx, _) = connect(&engine, alice, "alice");
    let (m_handle, mut m_rx, _) = connect(&engine, mallory, "mallory");
    drain(&mut a_rx);

    join(&engine, &a_handle, chat).await;
    join(&engine, &m_handle, chat).await;

    assert!(engine.rooms.is_member(chat, a_handle.id));
    assert!(!engine.rooms.is_member(chat, m_handle.id));

    let message = Message {
        id: MessageId::new(),
        chat_id: chat,
        sender_id: alice,
        content: "hello".into(),
        status: MessageStatus::Sent,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    engine.connections.broadcast_message_new(&message);

    let a_frames = drain(&mut a_rx);
    assert_eq!(a_frames.len(), 1);
    assert_eq!(a_frames[0]["event"], "message-new");
    assert!(drain(&mut m_rx).is_empty());
}

#[tokio::test]
async fn receipts_never_regress_status() {
    let store = Arc::new(FakeStore::default());
    let alice = UserId::new();
    let bob = UserId::new();
    let chat = ChatId::new();
    store.add_chat(chat, &[alice, bob]);
    let message_id = store.add_message(chat, alice, "hi", MessageStatus::Sent, 1);

    let engine = make_engine(store.clone());
    let (handle, _rx, _) = connect(&engine, bob, "bob");

    let read = format!(r#"{{"event":"message-read","messageId":"{message_id}"}}"#);
    engine.connections.handle_inbound(handle.id, &read).await;
    assert_eq!(store.status_of(message_id), Some(MessageStatus::Read));

    // A late delivery receipt must not undo the read status.
    let delivered = format!(r#"{{"event":"message-delivered","messageId":"{message_id}"}}"#);
    engine.connections.handle_inbound(handle.id, &delivered).await;
    assert_eq!(store.status_of(message_id), Some(MessageStatus::Read));
}

#[tokio::test]
async fn typing_is_relayed_to_other_room_members_only() {
    let store = Arc::new(FakeStore::default());
    let alice = UserId::new();
    let bob = UserId::new();
    let carol = UserId::new();
    let chat = ChatId::new();
    store.add_chat(chat, &[alice, bob]);

    let engine = make_engine(store);
    let (a_handle, mut a_rx, _) = connect(&engine, alice, "alice");
    let (b_handle, mut b_rx, _) = connect(&engine, bob, "bob");
    let (_c_handle, mut c_rx, _) = connect(&engine, carol, "carol");
    join(&engine, &a_handle, chat).await;
    join(&engine, &b_handle, chat).await;
    drain(&mut a_rx);
    drain(&mut b_rx);
    drain(&mut c_rx);

    let frame = format!(r#"{{"event":"typing-start","chatId":"{chat}"}}"#);
    engine.connections.handle_inbound(b_handle.id, &frame).await;

    let a_frames = drain(&mut a_rx);
    assert_eq!(a_frames.len(), 1);
    assert_eq!(a_frames[0]["event"], "typing-start");
    assert_eq!(a_frames[0]["userId"], bob.to_string());
    assert!(drain(&mut b_rx).is_empty());
    assert!(drain(&mut c_rx).is_empty());
}

#[tokio::test]
async fn malformed_frames_are_dropped_without_killing_the_connection() {
    let store = Arc::new(FakeStore::default());
    let alice = UserId::new();
    let chat = ChatId::new();
    store.add_chat(chat, &[alice]);

    let engine = make_engine(store);
    let (handle, _rx, _) = connect(&engine, alice, "alice");

    engine.connections.handle_inbound(handle.id, "not json").await;
    engine
        .connections
        .handle_inbound(handle.id, r#"{"event":"no-such-event"}"#)
        .await;

    assert!(handle.is_alive());
    join(&engine, &handle, chat).await;
    assert!(engine.rooms.is_member(chat, handle.id));
}

#[tokio::test]
async fn leaving_a_room_stops_delivery() {
    let store = Arc::new(FakeStore::default());
    let alice = UserId::new();
    let chat = ChatId::new();
    store.add_chat(chat, &[alice]);

    let engine = make_engine(store);
    let (handle, mut rx, _) = connect(&engine, alice, "alice");
    join(&engine, &handle, chat).await;

    let leave = format!(r#"{{"event":"leave-room","chatId":"{chat}"}}"#);
    engine.connections.handle_inbound(handle.id, &leave).await;

    engine
        .connections
        .broadcast_message_deleted(chat, MessageId::new());
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn shutdown_drops_all_connections_silently() {
    let store = Arc::new(FakeStore::default());
    let engine = make_engine(store);
    let alice = UserId::new();
    let (_a, mut a_rx, _) = connect(&engine, alice, "alice");
    let (_b, _b_rx, _) = connect(&engine, UserId::new(), "bob");
    drain(&mut a_rx);

    engine.shutdown().await.unwrap();

    assert_eq!(engine.connections.connection_count(), 0);
    assert!(!engine.connections.is_online(alice));
    // No offline broadcasts during shutdown.
    assert!(drain(&mut a_rx).is_empty());
}
