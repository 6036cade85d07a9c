//! Integration-Tests fuer den Signaling-Kern (Dispatcher + In-Memory-Broadcaster)

use fluester_auth::{CodeHasher, HashParameter};
use fluester_core::ConnectionId;
use fluester_protocol::events::{
    MELDUNG_CHANNEL_BELEGT, MELDUNG_FALSCHER_CODE, MELDUNG_HOST_GETRENNT, MELDUNG_NICHT_GEFUNDEN,
};
use fluester_protocol::{FrameCodec, ServerEvent};
use fluester_signaling::{EventBroadcaster, MessageDispatcher, SignalingConfig, SignalingState};
use std::sync::Arc;
use tokio::sync::mpsc;

type State = Arc<SignalingState<EventBroadcaster>>;

fn state() -> State {
    let hasher = CodeHasher::neu(HashParameter::MINIMAL).expect("Parameter gueltig");
    SignalingState::neu(SignalingConfig::default(), EventBroadcaster::neu(), hasher)
}

fn verbinden(state: &State) -> (ConnectionId, mpsc::Receiver<ServerEvent>) {
    let id = ConnectionId::new();
    (id, state.transport.client_registrieren(id))
}

/// Dekodiert einen Frame wie er vom Client kommt und dispatcht ihn
async fn senden(dispatcher: &MessageDispatcher<EventBroadcaster>, von: ConnectionId, frame: &str) {
    let event = FrameCodec::new().dekodieren(frame).expect("Test-Frame gueltig");
    dispatcher.dispatch(event, von).await;
}

fn leeren(rx: &mut mpsc::Receiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Simuliert das Ende einer Verbindung in derselben Reihenfolge wie der Transport
fn trennen(state: &State, dispatcher: &MessageDispatcher<EventBroadcaster>, id: ConnectionId) {
    dispatcher.verbindung_getrennt(id);
    state.transport.client_entfernen(&id);
}

#[tokio::test]
async fn kompletter_ablauf() {
    let state = state();
    let dispatcher = MessageDispatcher::neu(Arc::clone(&state));
    let (host, mut host_rx) = verbinden(&state);
    let (empfaenger, mut empfaenger_rx) = verbinden(&state);
    let (fremder, mut fremder_rx) = verbinden(&state);

    // Host eroeffnet "Demo " -> kanonisch "demo"
    senden(
        &dispatcher,
        host,
        r#"{"event":"host_session","data":{"channel":"Demo ","code":"123456"}}"#,
    )
    .await;
    assert_eq!(leeren(&mut host_rx), vec![ServerEvent::HostSuccess]);
    assert_eq!(state.registry.anzahl(), 1);

    // Empfaenger tritt mit korrektem Code bei
    senden(
        &dispatcher,
        empfaenger,
        r#"{"event":"join_attempt","data":{"channel":"demo","code":"123456"}}"#,
    )
    .await;
    assert_eq!(leeren(&mut empfaenger_rx), vec![ServerEvent::AuthSuccess]);
    assert_eq!(
        leeren(&mut host_rx),
        vec![ServerEvent::NewReceiverJoined { sid: empfaenger }]
    );

    // Falscher Code
    senden(
        &dispatcher,
        fremder,
        r#"{"event":"join_attempt","data":{"channel":"demo","code":"000000"}}"#,
    )
    .await;
    assert_eq!(
        leeren(&mut fremder_rx),
        vec![ServerEvent::auth_failed(MELDUNG_FALSCHER_CODE)]
    );
    assert!(leeren(&mut host_rx).is_empty());

    // Schluesselaustausch und ein Text-Update
    senden(
        &dispatcher,
        empfaenger,
        r#"{"event":"receiver_hello","data":{"channel":"demo","publicKey":"pk"}}"#,
    )
    .await;
    match leeren(&mut host_rx).as_slice() {
        [ServerEvent::ServerAnnounceReceiver(p)] => assert_eq!(p["publicKey"], "pk"),
        anders => panic!("Unerwartet: {anders:?}"),
    }

    let angebot = format!(
        r#"{{"event":"sender_offer","data":{{"target_sid":"{empfaenger}","encryptedKey":"ek"}}}}"#
    );
    senden(&dispatcher, host, &angebot).await;
    match leeren(&mut empfaenger_rx).as_slice() {
        [ServerEvent::ServerDeliverKey(p)] => assert_eq!(p["encryptedKey"], "ek"),
        anders => panic!("Unerwartet: {anders:?}"),
    }

    senden(
        &dispatcher,
        host,
        r#"{"event":"update_text","data":{"channel":"demo","ciphertext":"c","iv":"i"}}"#,
    )
    .await;
    assert_eq!(leeren(&mut empfaenger_rx).len(), 1);
    assert!(leeren(&mut host_rx).is_empty());
    assert!(leeren(&mut fremder_rx).is_empty());

    // Host trennt sich
    trennen(&state, &dispatcher, host);
    assert_eq!(
        leeren(&mut empfaenger_rx),
        vec![ServerEvent::session_ended(MELDUNG_HOST_GETRENNT)]
    );
    assert!(state.registry.ist_leer());

    senden(
        &dispatcher,
        fremder,
        r#"{"event":"join_attempt","data":{"channel":"demo","code":"123456"}}"#,
    )
    .await;
    assert_eq!(
        leeren(&mut fremder_rx),
        vec![ServerEvent::auth_failed(MELDUNG_NICHT_GEFUNDEN)]
    );
}

#[tokio::test]
async fn fehlversuche_sperren_nicht() {
    let state = state();
    let dispatcher = MessageDispatcher::neu(Arc::clone(&state));
    let (host, _host_rx) = verbinden(&state);
    let (empfaenger, mut empfaenger_rx) = verbinden(&state);

    senden(
        &dispatcher,
        host,
        r#"{"event":"host_session","data":{"channel":"raum","code":"4711"}}"#,
    )
    .await;

    for _ in 0..5 {
        senden(
            &dispatcher,
            empfaenger,
            r#"{"event":"join_attempt","data":{"channel":"RAUM","code":"0815"}}"#,
        )
        .await;
    }
    senden(
        &dispatcher,
        empfaenger,
        r#"{"event":"join_attempt","data":{"channel":"RAUM","code":"4711"}}"#,
    )
    .await;

    let events = leeren(&mut empfaenger_rx);
    assert_eq!(events.len(), 6);
    assert!(events[..5]
        .iter()
        .all(|e| *e == ServerEvent::auth_failed(MELDUNG_FALSCHER_CODE)));
    assert_eq!(events[5], ServerEvent::AuthSuccess);
}

#[tokio::test]
async fn numerischer_channel_name() {
    let state = state();
    let dispatcher = MessageDispatcher::neu(Arc::clone(&state));
    let (host, mut host_rx) = verbinden(&state);
    let (empfaenger, mut empfaenger_rx) = verbinden(&state);

    senden(
        &dispatcher,
        host,
        r#"{"event":"host_session","data":{"channel":42,"code":"1"}}"#,
    )
    .await;
    senden(
        &dispatcher,
        empfaenger,
        r#"{"event":"join_attempt","data":{"channel":"42","code":"1"}}"#,
    )
    .await;

    assert_eq!(leeren(&mut host_rx)[0], ServerEvent::HostSuccess);
    assert_eq!(leeren(&mut empfaenger_rx), vec![ServerEvent::AuthSuccess]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn gleichzeitiges_hosten_nur_einer_gewinnt() {
    let state = state();
    let dispatcher = Arc::new(MessageDispatcher::neu(Arc::clone(&state)));

    let mut tasks = Vec::new();
    let mut queues = Vec::new();
    for i in 0..8 {
        let (id, rx) = verbinden(&state);
        queues.push(rx);
        let dispatcher = Arc::clone(&dispatcher);
        tasks.push(tokio::spawn(async move {
            let frame = format!(
                r#"{{"event":"host_session","data":{{"channel":" Streit ","code":"{i}"}}}}"#
            );
            senden(&dispatcher, id, &frame).await;
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let antworten: Vec<ServerEvent> = queues.iter_mut().flat_map(leeren).collect();
    assert_eq!(antworten.len(), 8);
    let erfolge = antworten
        .iter()
        .filter(|e| **e == ServerEvent::HostSuccess)
        .count();
    let konflikte = antworten
        .iter()
        .filter(|e| **e == ServerEvent::host_error(MELDUNG_CHANNEL_BELEGT))
        .count();
    assert_eq!(erfolge, 1);
    assert_eq!(konflikte, 7);
    assert_eq!(state.registry.anzahl(), 1);
}

#[tokio::test]
async fn empfaenger_trennung_laesst_channel_bestehen() {
    let state = state();
    let dispatcher = MessageDispatcher::neu(Arc::clone(&state));
    let (host, mut host_rx) = verbinden(&state);
    let (empfaenger, _empfaenger_rx) = verbinden(&state);
    let (zweiter, mut zweiter_rx) = verbinden(&state);

    senden(
        &dispatcher,
        host,
        r#"{"event":"host_session","data":{"channel":"demo","code":"1"}}"#,
    )
    .await;
    senden(
        &dispatcher,
        empfaenger,
        r#"{"event":"join_attempt","data":{"channel":"demo","code":"1"}}"#,
    )
    .await;
    trennen(&state, &dispatcher, empfaenger);
    assert_eq!(state.registry.anzahl(), 1);
    assert_eq!(state.transport.mitglieder(&"demo".parse().unwrap()), vec![host]);

    senden(
        &dispatcher,
        zweiter,
        r#"{"event":"join_attempt","data":{"channel":"demo","code":"1"}}"#,
    )
    .await;
    assert_eq!(leeren(&mut zweiter_rx), vec![ServerEvent::AuthSuccess]);
    assert_eq!(
        leeren(&mut host_rx).last(),
        Some(&ServerEvent::NewReceiverJoined { sid: zweiter })
    );
}
