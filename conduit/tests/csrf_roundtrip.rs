use conduit::{
    Admission, Message, MessageError, Pipeline, RequestContext, SessionToken,
    extensions::{ContextSession, CsrfProtection, CsrfTokenAttacher, MessageLogger},
    testing::{CountingExtension, RecordingExtension},
};
use serde_json::json;

mod common;
use common::init_tracing;

fn client(token: &str) -> Pipeline {
    Pipeline::builder()
        .extension(CsrfTokenAttacher::new(SessionToken::new(token)))
        .build()
}

fn server(recorder: &RecordingExtension) -> Pipeline {
    Pipeline::builder()
        .extension(CsrfProtection::new(ContextSession))
        .extension(recorder.clone())
        .extension(MessageLogger)
        .build()
}

/// Client outgoing run, then the wire, then the server incoming run.
async fn send(client: &Pipeline, server: &Pipeline, session: &str, message: Message) -> Message {
    let sent = client.run_outgoing(message).await.unwrap();
    let wire = serde_json::to_string(&sent).unwrap();
    let received: Message = serde_json::from_str(&wire).unwrap();

    let context = RequestContext::new().with(SessionToken::new(session));
    server.run_incoming(received, &context).await.unwrap()
}

#[tokio::test]
async fn test_matching_token_round_trip_is_allowed() {
    init_tracing();
    let recorder = RecordingExtension::new();
    let server = server(&recorder);

    let message = Message::new("/chat/lobby").with_data(json!({ "text": "hi" }));
    let out = send(&client("X"), &server, "X", message).await;

    assert!(!out.is_rejected());
    assert!(out.ext().unwrap().is_empty());
    assert_eq!(out.data(), &json!({ "text": "hi" }));

    // Later hooks never see the token.
    let seen = recorder.messages();
    assert_eq!(seen.len(), 1);
    assert!(!seen[0].ext().unwrap().contains_key("csrfToken"));
}

#[tokio::test]
async fn test_foreign_token_is_rejected() {
    init_tracing();
    let recorder = RecordingExtension::new();
    let server = server(&recorder);

    let out = send(&client("Z"), &server, "X", Message::new("/chat/lobby")).await;

    assert_eq!(out.error(), Some(&MessageError::access_denied()));
    assert!(!out.ext().unwrap().contains_key("csrfToken"));
    // The recorder still ran after the rejection.
    assert_eq!(recorder.count(), 1);
}

#[tokio::test]
async fn test_other_ext_keys_survive() {
    let recorder = RecordingExtension::new();
    let server = server(&recorder);

    let mut message = Message::new("/chat/lobby");
    message.ext_mut().insert("other", json!("Y"));
    let out = send(&client("X"), &server, "X", message).await;

    assert_eq!(
        serde_json::to_value(out.ext().unwrap()).unwrap(),
        json!({ "other": "Y" })
    );
}

#[tokio::test]
async fn test_message_without_client_extension_is_rejected() {
    let recorder = RecordingExtension::new();
    let server = server(&recorder);
    let context = RequestContext::new().with(SessionToken::new("X"));

    let admission = server
        .admit(Message::new("/chat/lobby").with_id("42"), &context)
        .await
        .unwrap();

    match admission {
        Admission::Reject { reply, error } => {
            assert_eq!(error.to_string(), "401::Access denied");
            assert_eq!(reply.id(), Some("42"));
            let wire = serde_json::to_value(&reply).unwrap();
            assert_eq!(wire["error"], json!("401::Access denied"));
            assert_eq!(wire["successful"], json!(false));
        }
        Admission::Deliver(_) => panic!("message without token must be rejected"),
    }
}

#[tokio::test]
async fn test_hooks_after_rejection_still_run() {
    let after = CountingExtension::new();
    let server = Pipeline::builder()
        .extension(CsrfProtection::new(ContextSession))
        .extension(after.clone())
        .build();

    let out = server
        .run_incoming(Message::new("/chat/lobby"), &RequestContext::new())
        .await
        .unwrap();

    assert!(out.is_rejected());
    assert_eq!(after.count(), 1);
}
