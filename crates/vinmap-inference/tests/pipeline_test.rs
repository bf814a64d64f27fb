//! Enrichment pipeline tests against a mock gateway.

use serde_json::json;
use vinmap_core::{Country, Error, PipelineStep, Rating};
use vinmap_inference::{
    enrich, AnthropicGateway, EnrichOptions, EnrichmentMode, EnrichmentRequest, GatewayConfig,
};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

fn gateway(server: &MockServer) -> AnthropicGateway {
    AnthropicGateway::new(GatewayConfig::default().with_base_url(server.uri()))
        .expect("Failed to create gateway")
}

fn reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "content": [{ "type": "text", "text": text }]
    }))
}

fn request(wine_name: Option<&str>) -> EnrichmentRequest {
    EnrichmentRequest {
        image: Some(PNG_B64.to_string()),
        wine_name: wine_name.map(str::to_string),
        reviews: None,
        api_key: Some("sk-test".to_string()),
        mode: None,
    }
}

const LABEL_REPLY: &str = r#"Here is what I can read:
{"wineName":"Domaine Leflaive Bourgogne Blanc","winery":"Domaine Leflaive","vintage":2020,"wineType":null,"region":"Bourgogne","grapeVariety":null,"otherText":null}"#;

const DETAILS_REPLY: &str = r#"```json
{
  "name": "Domaine Leflaive Bourgogne Blanc 2020",
  "winery": "Domaine Leflaive",
  "wineryInfo": "부르고뉴의 명가.",
  "country": "france",
  "wineType": "Red",
  "sweetness": 1,
  "acidity": 4,
  "body": 3,
  "description": "시트러스와 미네랄."
}
```"#;

#[tokio::test]
async fn test_two_step_runs_extraction_then_synthesis() {
    let server = MockServer::start().await;

    // Step A carries the image; step B is text only.
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-test"))
        .and(body_string_contains("\"type\":\"image\""))
        .respond_with(reply(LABEL_REPLY))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(body_string_contains("Domaine Leflaive"))
        .and(body_string_contains("sommelier"))
        .respond_with(reply(DETAILS_REPLY))
        .expect(1)
        .mount(&server)
        .await;

    let details = enrich(&gateway(&server), &request(None), &EnrichOptions::default())
        .await
        .unwrap();

    assert_eq!(details.name, "Domaine Leflaive Bourgogne Blanc 2020");
    assert_eq!(details.country, Some(Country::France));
    assert_eq!(details.acidity.map(Rating::get), Some(4));
    // "Blanc" in the name overrides the model's type.
    assert_eq!(details.wine_type.as_deref(), Some("White"));
}

#[tokio::test]
async fn test_missing_api_key_makes_no_gateway_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(reply("{}"))
        .expect(0)
        .mount(&server)
        .await;

    let mut req = request(Some("Barolo"));
    req.api_key = Some("   ".to_string());
    let err = enrich(&gateway(&server), &req, &EnrichOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(ref m) if m == "API key is required"));

    let mut req = request(Some("Barolo"));
    req.image = None;
    let err = enrich(&gateway(&server), &req, &EnrichOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(ref m) if m == "Image is required"));
}

#[tokio::test]
async fn test_single_shot_uses_strong_model_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(body_string_contains("claude-3-5-sonnet-20241022"))
        .and(body_string_contains("\"type\":\"image\""))
        .respond_with(reply(
            r#"{"name":"Barolo","winery":"Vietti","wineryInfo":"x","country":"italy","sweetness":1,"acidity":5,"body":5,"description":"y"}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let mut req = request(Some("Barolo"));
    req.mode = Some(EnrichmentMode::SingleShot);
    let details = enrich(&gateway(&server), &req, &EnrichOptions::default())
        .await
        .unwrap();

    assert_eq!(details.winery, "Vietti");
    assert_eq!(details.country, Some(Country::Italy));
}

#[tokio::test]
async fn test_omitted_ratings_stay_unset() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(reply(
            r#"{"name":"Barolo","winery":"Vietti","country":"italy","body":7,"description":"y"}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let mut req = request(Some("Barolo"));
    req.mode = Some(EnrichmentMode::SingleShot);
    let details = enrich(&gateway(&server), &req, &EnrichOptions::default())
        .await
        .unwrap();

    assert!(details.sweetness.is_none());
    assert!(details.acidity.is_none());
    assert_eq!(details.body.map(Rating::get), Some(5));

    let v = serde_json::to_value(&details).unwrap();
    assert!(v.get("sweetness").is_none());
    assert_eq!(v["body"], 5);
}

#[tokio::test]
async fn test_gateway_error_at_step_a_aborts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(529).set_body_json(json!({
            "type": "error",
            "error": { "type": "overloaded_error", "message": "Overloaded" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = enrich(&gateway(&server), &request(None), &EnrichOptions::default())
        .await
        .unwrap_err();

    match err {
        Error::Gateway {
            step,
            status,
            message,
        } => {
            assert_eq!(step, PipelineStep::LabelExtraction);
            assert_eq!(status, 529);
            assert_eq!(message, "Overloaded");
        }
        other => panic!("expected gateway error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unparseable_synthesis_reply_keeps_raw_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(body_string_contains("\"type\":\"image\""))
        .respond_with(reply(r#"{"wineName":"X"}"#))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(body_string_contains("sommelier"))
        .respond_with(reply("Sorry, I cannot describe this wine."))
        .mount(&server)
        .await;

    let err = enrich(&gateway(&server), &request(None), &EnrichOptions::default())
        .await
        .unwrap_err();

    match err {
        Error::ResponseFormat { step, raw } => {
            assert_eq!(step, PipelineStep::DetailSynthesis);
            assert_eq!(raw, "Sorry, I cannot describe this wine.");
        }
        other => panic!("expected response format error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_gateway_error_without_message_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let err = enrich(&gateway(&server), &request(Some("Barolo")), &EnrichOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "label extraction failed: AI analysis failed");
}
