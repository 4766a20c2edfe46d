use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use crate::helper::{push_body, spawn_app, spawn_app_with};

#[tokio::test]
async fn get_pubsub_fails() {
    let app = spawn_app().await;

    let res = app.get("/pubsub").await;
    assert_eq!(405, res.status().as_u16());
    assert_eq!(0, app.message_log.len());
}

#[tokio::test]
async fn non_post_methods_fail_before_parsing() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let body = push_body("sub", "CASE_CREATED", "cases/1");

    for method in [reqwest::Method::PUT, reqwest::Method::DELETE, reqwest::Method::PATCH] {
        let res = client
            .request(method.clone(), format!("{}/pubsub", &app.address))
            .body(body.clone())
            .send()
            .await
            .expect("failed to execute request.");
        assert_eq!(405, res.status().as_u16(), "{method}");
    }
    assert_eq!(0, app.message_log.len());
}

#[tokio::test]
async fn incorrect_body_fails() {
    let app = spawn_app().await;

    let res = app.post_pubsub("ThisShouldntPassParsing").await;
    assert_eq!(400, res.status().as_u16());
    assert_eq!(
        "PubSub message failed to decode!!\r\n",
        res.text().await.unwrap()
    );
    assert_eq!(0, app.message_log.len());
}

#[tokio::test]
async fn valid_push_is_recorded() {
    let app = spawn_app().await;

    let body = push_body(
        "projects/p/subscriptions/cases",
        "CASE_UPDATED",
        "projects/p/cases/42",
    );
    let res = app.post_pubsub(body).await;
    assert_eq!(200, res.status().as_u16());

    let text = res.text().await.unwrap();
    let lines: Vec<_> = text.split("\r\n").collect();
    assert_eq!(5, lines.len(), "{text}");
    assert!(lines[0].starts_with("Received Msg ID: "), "{text}");
    assert!(lines[0].contains(" at timestamp: "), "{text}");
    assert_eq!("Subscription: projects/p/subscriptions/cases", lines[1]);
    assert_eq!("ResourceName: projects/p/cases/42", lines[2]);
    assert_eq!("NotificationType: CASE_UPDATED", lines[3]);

    let messages = app.message_log.snapshot();
    assert_eq!(1, messages.len());
    let recorded = &messages[0];
    assert!(lines[0].contains(&recorded.id.to_string()));
    assert_eq!("CASE_UPDATED", recorded.notification_type());
    assert_eq!("projects/p/cases/42", recorded.resource_name());
}

#[tokio::test]
async fn missing_attributes_yield_empty_fields() {
    let app = spawn_app().await;

    let res = app
        .post_pubsub(r#"{"subscription": "sub", "message": {}}"#)
        .await;
    assert_eq!(200, res.status().as_u16());
    let text = res.text().await.unwrap();
    assert!(text.contains("ResourceName: \r\n"), "{text}");
    assert!(text.contains("NotificationType: \r\n"), "{text}");
    assert_eq!(1, app.message_log.len());
}

#[tokio::test]
async fn null_message_is_accepted() {
    let app = spawn_app().await;

    let datas = [
        r#"{"subscription": "sub", "message": null}"#,
        r#"{"subscription": "sub", "message": {"attributes": null}}"#,
    ];
    for body in datas {
        let res = app.post_pubsub(body).await;
        assert_eq!(200, res.status().as_u16(), "{body}");
        let text = res.text().await.unwrap();
        assert!(text.contains("Subscription: sub\r\n"), "{text}");
        assert!(text.contains("NotificationType: \r\n"), "{text}");
    }
    assert_eq!(2, app.message_log.len());
}

#[tokio::test]
async fn echoed_fields_are_escaped() {
    let app = spawn_app().await;

    let res = app
        .post_pubsub(push_body("<script>", "a&b", "'quoted'"))
        .await;
    let text = res.text().await.unwrap();
    assert!(text.contains("Subscription: &lt;script&gt;\r\n"), "{text}");
    assert!(text.contains("ResourceName: &#39;quoted&#39;\r\n"), "{text}");
    assert!(text.contains("NotificationType: a&amp;b\r\n"), "{text}");
}

#[tokio::test]
async fn log_length_tracks_pushes_and_clear() {
    let app = spawn_app().await;

    let n = 5;
    for i in 0..n {
        let res = app
            .post_pubsub(push_body(&format!("sub-{i}"), "CASE_CREATED", "cases/1"))
            .await;
        assert_eq!(200, res.status().as_u16());
    }
    assert_eq!(n, app.message_log.len());

    let res = app.post("/clear", "").await;
    assert_eq!(200, res.status().as_u16());
    assert_eq!(0, app.message_log.len());
}

#[tokio::test]
async fn concurrent_pushes_are_all_recorded() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..20 {
        let request = client
            .post(format!("{}/pubsub", &app.address))
            .body(push_body(&format!("sub-{i}"), "CASE_CREATED", "cases/1"));
        tasks.spawn(async move { request.send().await });
    }
    while let Some(res) = tasks.join_next().await {
        let res = res.unwrap().expect("failed to execute request.");
        assert_eq!(200, res.status().as_u16());
    }
    assert_eq!(20, app.message_log.len());
}

#[tokio::test]
async fn case_client_is_acquired_per_push() {
    let case_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/cases"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&case_server)
        .await;
    let app = spawn_app_with(|config| config.case_client.base_url = Some(case_server.uri())).await;

    for _ in 0..2 {
        let res = app
            .post_pubsub(push_body("sub", "CASE_CREATED", "cases/1"))
            .await;
        assert_eq!(200, res.status().as_u16());
    }
    assert_eq!(2, app.message_log.len());
}

#[tokio::test]
async fn case_client_failure_is_not_recorded() {
    let case_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/cases"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&case_server)
        .await;
    let app = spawn_app_with(|config| config.case_client.base_url = Some(case_server.uri())).await;

    let res = app
        .post_pubsub(push_body("sub", "CASE_CREATED", "cases/1"))
        .await;
    assert_eq!(500, res.status().as_u16());
    assert!(res
        .text()
        .await
        .unwrap()
        .starts_with("Failed to create client: "));
    assert_eq!(0, app.message_log.len());
}

#[tokio::test]
async fn enforced_token_rejects_unverified_push() {
    let app = spawn_app_with(|config| {
        config.pubsub.verification_token = Some(secrecy::SecretString::new("s3cret".into()));
        config.pubsub.enforce_verification_token = true;
    })
    .await;
    let body = push_body("sub", "CASE_CREATED", "cases/1");

    let res = app.post_pubsub(body.clone()).await;
    assert_eq!(401, res.status().as_u16());
    let res = app.post("/pubsub?token=wrong", body.clone()).await;
    assert_eq!(401, res.status().as_u16());
    assert_eq!(0, app.message_log.len());

    let res = app.post("/pubsub?token=s3cret", body).await;
    assert_eq!(200, res.status().as_u16());
    assert_eq!(1, app.message_log.len());
}

#[tokio::test]
async fn enforced_token_keeps_method_check() {
    let app = spawn_app_with(|config| {
        config.pubsub.verification_token = Some(secrecy::SecretString::new("s3cret".into()));
        config.pubsub.enforce_verification_token = true;
    })
    .await;

    let res = app.get("/pubsub").await;
    assert_eq!(405, res.status().as_u16());
    let res = app.get("/pubsub?token=s3cret").await;
    assert_eq!(405, res.status().as_u16());
    assert_eq!(0, app.message_log.len());
}

#[tokio::test]
async fn token_not_enforced_by_default() {
    let app = spawn_app_with(|config| {
        config.pubsub.verification_token = Some(secrecy::SecretString::new("s3cret".into()));
    })
    .await;

    let res = app
        .post_pubsub(push_body("sub", "CASE_CREATED", "cases/1"))
        .await;
    assert_eq!(200, res.status().as_u16());
    assert_eq!(1, app.message_log.len());
}
