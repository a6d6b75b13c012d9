mod common;

use common::{ACCOUNT_SID, AUTH_TOKEN};
use mockito::Matcher;
use sentry_twilio::notifications::{Event, Group, Level, Project};
use sentry_twilio::plugins::{Plugin, PluginRegistry};
use sentry_twilio::twilio::rest::RestClient;
use sentry_twilio::twilio::{Account, NewCall, NewMessage, TwilioApi};
use sentry_twilio::{Error, MemoryOptionStore};
use std::collections::HashMap;
use std::sync::Arc;

fn account() -> Account {
    Account::new(ACCOUNT_SID, AUTH_TOKEN)
}

fn path(resource: &str) -> String {
    format!("/2010-04-01/Accounts/{ACCOUNT_SID}{resource}")
}

#[tokio::test]
async fn create_message_posts_form() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", path("/Messages.json").as_str())
        .match_header("authorization", Matcher::Regex("^Basic ".to_string()))
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("To".to_string(), "+13055550101".to_string()),
            Matcher::UrlEncoded("From".to_string(), "+13305093095".to_string()),
            Matcher::UrlEncoded("Body".to_string(), "Sentry [Acme] ERROR: boom & bust".to_string()),
        ]))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"sid": "SM0123", "status": "queued", "to": "+13055550101"}"#)
        .create_async()
        .await;

    let client = RestClient::with_base_url(server.url()).unwrap();
    let message = NewMessage::new("+13055550101", "+13305093095", "Sentry [Acme] ERROR: boom & bust");
    let resource = client.create_message(&account(), &message).await.unwrap();

    mock.assert_async().await;
    assert_eq!(resource.sid(), "SM0123");
    assert_eq!(resource.status(), Some("queued"));
}

#[tokio::test]
async fn create_call_posts_url() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", path("/Calls.json").as_str())
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("To".to_string(), "+13055550101".to_string()),
            Matcher::UrlEncoded("Url".to_string(), "http://twimlets.com/message?&message=Sentry+ERROR%3A+boom".to_string()),
        ]))
        .with_status(201)
        .with_body(r#"{"sid": "CA0123", "status": "queued"}"#)
        .create_async()
        .await;

    let client = RestClient::with_base_url(server.url()).unwrap();
    let call = NewCall::new("+13055550101", "+13305093095", "http://twimlets.com/message?&message=Sentry+ERROR%3A+boom");
    let resource = client.create_call(&account(), &call).await.unwrap();

    mock.assert_async().await;
    assert_eq!(resource.sid(), "CA0123");
}

#[tokio::test]
async fn api_error_is_decoded() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", path("/Messages.json").as_str())
        .with_status(400)
        .with_body(
            r#"{"code": 21211, "message": "The 'To' number 555 is not a valid phone number.", "more_info": "https://www.twilio.com/docs/errors/21211", "status": 400}"#,
        )
        .create_async()
        .await;

    let client = RestClient::with_base_url(server.url()).unwrap();
    let result = client.create_message(&account(), &NewMessage::new("555", "+13305093095", "body")).await;

    match result.unwrap_err() {
        Error::TwilioApi { status, code, message } => {
            assert_eq!(status, 400);
            assert_eq!(code, Some(21211));
            assert_eq!(message, "The 'To' number 555 is not a valid phone number.");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn non_json_error_keeps_body() {
    let mut server = mockito::Server::new_async().await;
    server.mock("GET", path(".json").as_str()).with_status(503).with_body("upstream unavailable").create_async().await;

    let client = RestClient::with_base_url(server.url()).unwrap();
    let result = client.fetch_account(&account()).await;

    assert_eq!(
        result.unwrap_err().to_string(),
        Error::TwilioApi { status: 503, code: None, message: "upstream unavailable".to_string() }.to_string()
    );
}

#[tokio::test]
async fn fetch_account_reads_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", path(".json").as_str())
        .match_header("authorization", Matcher::Regex("^Basic ".to_string()))
        .with_status(200)
        .with_body(format!(r#"{{"sid": "{ACCOUNT_SID}", "friendly_name": "Acme Ops", "status": "active"}}"#))
        .create_async()
        .await;

    let client = RestClient::with_base_url(server.url()).unwrap();
    let resource = client.fetch_account(&account()).await.unwrap();

    assert_eq!(resource.sid(), ACCOUNT_SID);
    assert_eq!(resource.friendly_name(), Some("Acme Ops"));
    assert_eq!(resource.status(), Some("active"));
}

#[tokio::test]
async fn sms_plugin_through_rest_client() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", path("/Messages.json").as_str())
        .match_body(Matcher::UrlEncoded("Body".to_string(), "Sentry [Acme] ERROR: NullPointerException".to_string()))
        .with_status(201)
        .with_body(r#"{"sid": "SM0123", "status": "queued"}"#)
        .expect(2)
        .create_async()
        .await;

    let registry = PluginRegistry::with_api(Arc::new(RestClient::with_base_url(server.url()).unwrap()));
    let project = Project::new("acme", "Acme");
    let mut store = MemoryOptionStore::new();
    let input: HashMap<String, String> = [
        ("account_sid", ACCOUNT_SID),
        ("auth_token", AUTH_TOKEN),
        ("sms_from", "3305093095"),
        ("sms_to", "305-555-0101, 305-555-0102"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    registry.get("twilio_sms").unwrap().save_options(&project, &input, &mut store).unwrap();

    let event = Event::new(Level::Error, "NullPointerException\nat line 5");
    let outcomes = registry.notify(&Group::new(project), &event, &store).await;

    mock.assert_async().await;
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].result().as_ref().map(Vec::len).unwrap(), 2);
}
