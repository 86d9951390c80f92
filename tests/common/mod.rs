//! Common test utilities

use serde_json::{json, Value};
use tokcomments::crawler::comment::api;
use tokcomments::crawler::{CommentClient, HttpTransport};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Raw top-level comment as the API sends it
pub fn raw_comment(cid: &str, text: &str, reply_total: u64) -> Value {
    json!({
        "cid": cid,
        "text": text,
        "create_time": 1_700_000_000,
        "reply_comment_total": reply_total,
        "user": {
            "unique_id": format!("user_{cid}"),
            "nickname": format!("User {cid}"),
            "avatar_thumb": {"url_list": [format!("https://img/{cid}.jpg")]}
        },
        "share_info": {
            "title": "Test video #rust #scraping",
            "url": "https://www.tiktok.com/@brand/video/7001"
        }
    })
}

/// Raw reply record
pub fn raw_reply(cid: &str, text: &str) -> Value {
    json!({
        "cid": cid,
        "text": text,
        "create_time": 1_700_000_100,
        "user": {"unique_id": format!("replier_{cid}"), "nickname": "Replier"}
    })
}

/// Response body for one list page
pub fn page_body(comments: Vec<Value>, has_more: bool) -> Value {
    json!({
        "status_code": 0,
        "comments": comments,
        "has_more": i32::from(has_more),
        "cursor": 0,
        "total": 0
    })
}

/// Mount one page of top-level comments for `video_id` at `cursor`
pub async fn mount_comment_page(
    server: &MockServer,
    video_id: &str,
    cursor: u32,
    body: Value,
    expected_calls: u64,
) {
    Mock::given(method("GET"))
        .and(path(api::COMMENT_LIST))
        .and(query_param("aweme_id", video_id))
        .and(query_param("cursor", cursor.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Mount one page of replies for `comment_id` at `cursor`
pub async fn mount_reply_page(
    server: &MockServer,
    comment_id: &str,
    cursor: u32,
    body: Value,
    expected_calls: u64,
) {
    Mock::given(method("GET"))
        .and(path(api::REPLY_LIST))
        .and(query_param("comment_id", comment_id))
        .and(query_param("cursor", cursor.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Comment client talking to the mock server
pub fn client_for(server: &MockServer, page_size: u32) -> CommentClient<HttpTransport> {
    let transport = HttpTransport::with_base_url(&server.uri()).unwrap();
    CommentClient::new(transport).with_page_size(page_size)
}
