mod support;

use reqwest::Client;
use serde_json::{json, Value};

use support::{build_app, serve};

async fn register(client: &Client, base: &str, name: &str) -> reqwest::Response {
    client
        .post(format!("{base}/participants"))
        .json(&json!({ "name": name }))
        .send()
        .await
        .expect("register request")
}

async fn fetch_feed(client: &Client, base: &str, user: &str) -> Vec<Value> {
    client
        .get(format!("{base}/messages"))
        .header("user", user)
        .send()
        .await
        .expect("feed request")
        .json::<Vec<Value>>()
        .await
        .expect("feed json")
}

fn texts(feed: &[Value]) -> Vec<&str> {
    feed.iter().filter_map(|m| m["text"].as_str()).collect()
}

#[tokio::test]
async fn registration_flow() {
    let app = build_app();
    let (base, _shutdown) = serve(app.router).await;
    let client = Client::new();

    assert_eq!(register(&client, &base, "   ").await.status(), 422);
    assert_eq!(register(&client, &base, "").await.status(), 422);

    let created = register(&client, &base, "Alice").await;
    assert_eq!(created.status(), 201);
    let body: Value = created.json().await.expect("created json");
    assert_eq!(body["name"], "Alice");

    assert_eq!(register(&client, &base, "Alice").await.status(), 409);

    let list: Vec<Value> = client
        .get(format!("{base}/participants"))
        .send()
        .await
        .expect("list request")
        .json()
        .await
        .expect("list json");
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["name"], "Alice");
    assert!(list[0]["lastStatus"].is_i64());

    // the arrival was announced to the room
    let feed = fetch_feed(&client, &base, "Alice").await;
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["type"], "status");
    assert_eq!(feed[0]["from"], "Alice");
    assert_eq!(feed[0]["to"], "Todos");
    assert_eq!(feed[0]["text"], "entra na sala...");
}

#[tokio::test]
async fn markup_is_stripped_from_names_and_messages() {
    let app = build_app();
    let (base, _shutdown) = serve(app.router).await;
    let client = Client::new();

    assert_eq!(register(&client, &base, "<b>Alice</b>").await.status(), 201);

    let posted = client
        .post(format!("{base}/messages"))
        .header("user", "Alice")
        .json(&json!({ "to": "Todos", "text": "oi <script>x</script>gente", "type": "message" }))
        .send()
        .await
        .expect("post message");
    assert_eq!(posted.status(), 201);

    let feed = fetch_feed(&client, &base, "Alice").await;
    assert!(texts(&feed).contains(&"oi xgente"));
}

#[tokio::test]
async fn message_visibility_flow() {
    let app = build_app();
    let (base, _shutdown) = serve(app.router).await;
    let client = Client::new();

    for name in ["Alice", "Bob", "Carol"] {
        assert_eq!(register(&client, &base, name).await.status(), 201);
    }

    let broadcast = client
        .post(format!("{base}/messages"))
        .header("user", "Alice")
        .json(&json!({ "to": "Todos", "text": "hello all", "type": "message" }))
        .send()
        .await
        .expect("broadcast");
    assert_eq!(broadcast.status(), 201);

    let private = client
        .post(format!("{base}/messages"))
        .header("user", "Alice")
        .json(&json!({ "to": "Bob", "text": "segredo", "type": "private_message" }))
        .send()
        .await
        .expect("private");
    assert_eq!(private.status(), 201);

    let carol_feed = fetch_feed(&client, &base, "Carol").await;
    assert!(texts(&carol_feed).contains(&"hello all"));
    assert!(!texts(&carol_feed).contains(&"segredo"));

    let bob_feed = fetch_feed(&client, &base, "Bob").await;
    assert!(texts(&bob_feed).contains(&"segredo"));

    let alice_feed = fetch_feed(&client, &base, "Alice").await;
    assert!(texts(&alice_feed).contains(&"segredo"));

    // limit keeps the most recent visible entries, oldest first
    let limited: Vec<Value> = client
        .get(format!("{base}/messages?limit=2"))
        .header("user", "Bob")
        .send()
        .await
        .expect("limited feed")
        .json()
        .await
        .expect("limited json");
    assert_eq!(texts(&limited), ["hello all", "segredo"]);

    // a non-numeric limit falls back to the whole filtered log
    let unlimited: Vec<Value> = client
        .get(format!("{base}/messages?limit=abc"))
        .header("user", "Bob")
        .send()
        .await
        .expect("unlimited feed")
        .json()
        .await
        .expect("unlimited json");
    assert_eq!(unlimited.len(), 5);
}

#[tokio::test]
async fn message_posting_requires_known_actor_and_valid_body() {
    let app = build_app();
    let (base, _shutdown) = serve(app.router).await;
    let client = Client::new();

    assert_eq!(register(&client, &base, "Alice").await.status(), 201);

    // no user header
    let res = client
        .post(format!("{base}/messages"))
        .json(&json!({ "to": "Todos", "text": "oi", "type": "message" }))
        .send()
        .await
        .expect("post without header");
    assert_eq!(res.status(), 400);

    // unknown user
    let res = client
        .post(format!("{base}/messages"))
        .header("user", "Ghost")
        .json(&json!({ "to": "Todos", "text": "oi", "type": "message" }))
        .send()
        .await
        .expect("post unknown user");
    assert_eq!(res.status(), 401);

    // bad type, empty text, empty recipient
    for body in [
        json!({ "to": "Todos", "text": "oi", "type": "status" }),
        json!({ "to": "Todos", "text": "oi", "type": "banana" }),
        json!({ "to": "Todos", "text": "   ", "type": "message" }),
        json!({ "to": "", "text": "oi", "type": "message" }),
        json!({ "to": "Todos", "type": "message" }),
    ] {
        let res = client
            .post(format!("{base}/messages"))
            .header("user", "Alice")
            .json(&body)
            .send()
            .await
            .expect("invalid body");
        assert_eq!(res.status(), 422, "body: {body}");
    }

    // reading also requires a known actor
    let res = client
        .get(format!("{base}/messages"))
        .send()
        .await
        .expect("feed without header");
    assert_eq!(res.status(), 401);

    let res = client
        .get(format!("{base}/messages"))
        .header("user", "Ghost")
        .send()
        .await
        .expect("feed unknown user");
    assert_eq!(res.status(), 401);
}

#[tokio::test]
async fn delete_flow() {
    let app = build_app();
    let (base, _shutdown) = serve(app.router).await;
    let client = Client::new();

    assert_eq!(register(&client, &base, "Alice").await.status(), 201);
    assert_eq!(register(&client, &base, "Bob").await.status(), 201);

    let posted: Value = client
        .post(format!("{base}/messages"))
        .header("user", "Alice")
        .json(&json!({ "to": "Todos", "text": "oops", "type": "message" }))
        .send()
        .await
        .expect("post")
        .json()
        .await
        .expect("post json");
    let message_id = posted["id"].as_str().expect("message id").to_owned();

    // missing header and non-owner both reuse the auth code
    let res = client
        .delete(format!("{base}/messages/{message_id}"))
        .send()
        .await
        .expect("delete without header");
    assert_eq!(res.status(), 401);

    let res = client
        .delete(format!("{base}/messages/{message_id}"))
        .header("user", "Bob")
        .send()
        .await
        .expect("delete as non-owner");
    assert_eq!(res.status(), 401);

    // unknown requester is a 404
    let res = client
        .delete(format!("{base}/messages/{message_id}"))
        .header("user", "Ghost")
        .send()
        .await
        .expect("delete as unknown");
    assert_eq!(res.status(), 404);

    // the owner succeeds, permanently
    let res = client
        .delete(format!("{base}/messages/{message_id}"))
        .header("user", "Alice")
        .send()
        .await
        .expect("delete as owner");
    assert_eq!(res.status(), 200);

    assert!(!texts(&fetch_feed(&client, &base, "Alice").await).contains(&"oops"));

    let res = client
        .delete(format!("{base}/messages/{message_id}"))
        .header("user", "Alice")
        .send()
        .await
        .expect("delete again");
    assert_eq!(res.status(), 404);
}
