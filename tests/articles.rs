mod common;

use actix_web::test;

use serde_json::json;

use blog_api::db::InteractionRepo;
use blog_api::models::InteractionKind;

use common::*;

#[actix_rt::test]
async fn create_article_gets_default_tag() {
  let env = TestEnv::new();
  let app = env.app().await;
  let author = create_author(&app, "Jane", "jane@example.com").await;

  let article = create_article(&app, author, "Hello", None).await;
  assert_eq!(article["title"], "Hello");
  assert_eq!(article["text"], "Some text");
  assert_eq!(article["author_id"], author);
  assert_eq!(article["tags"], json!(["tech"]));
  assert!(article["image"].is_null());
  assert!(article["date_edited"].is_null());
}

#[actix_rt::test]
async fn create_article_validates_input() {
  let env = TestEnv::new();
  let app = env.app().await;
  let author = create_author(&app, "Jane", "jane@example.com").await;

  // unknown author
  let (content_type, body) = multipart(&[("Title", "Hello"), ("Text", "text")], None);
  let req = test::TestRequest::post()
    .uri("/article/?id=99")
    .insert_header(("content-type", content_type))
    .set_payload(body)
    .to_request();
  let (status, body) = call(&app, req).await;
  assert_eq!(status, 404);
  assert_eq!(body, json!({"error": "The author with id 99 does not exist."}));

  // unknown form key
  let (content_type, body) = multipart(&[("Title", "Hello"), ("Text", "text"), ("Subtitle", "x")], None);
  let req = test::TestRequest::post()
    .uri(&format!("/article/?id={}", author))
    .insert_header(("content-type", content_type))
    .set_payload(body)
    .to_request();
  let (status, _) = call(&app, req).await;
  assert_eq!(status, 400);

  // title too short
  let (content_type, body) = multipart(&[("Title", "H"), ("Text", "text")], None);
  let req = test::TestRequest::post()
    .uri(&format!("/article/?id={}", author))
    .insert_header(("content-type", content_type))
    .set_payload(body)
    .to_request();
  let (status, body) = call(&app, req).await;
  assert_eq!(status, 400);
  assert_eq!(body, json!({"error": "The Title has to be at least 2 characters long."}));

  // id is not an integer
  let req = test::TestRequest::get().uri("/article/stats?id=abc").to_request();
  let (status, body) = call(&app, req).await;
  assert_eq!(status, 400);
  assert_eq!(body, json!({"error": "The id has to be an integer."}));
}

#[actix_rt::test]
async fn every_read_records_a_view() {
  let env = TestEnv::new();
  let app = env.app().await;
  let author = create_author(&app, "Jane", "jane@example.com").await;
  let reader = create_author(&app, "John", "john@example.com").await;
  let article = create_article(&app, author, "Hello", None).await;
  let id = article["id"].as_i64().unwrap();

  for _ in 0..2 {
    let req = test::TestRequest::get()
      .uri(&format!("/article/?id={}&author%20id={}", id, reader))
      .to_request();
    let (status, body) = call(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(body["id"], id);
  }

  let req = test::TestRequest::get().uri(&format!("/article/stats?id={}", id)).to_request();
  let (status, stats) = call(&app, req).await;
  assert_eq!(status, 200);
  assert_eq!(stats, json!({"views": 2, "likes": 0, "comments": 0, "bookmarks": 0, "shares": 0}));

  let req = test::TestRequest::get()
    .uri(&format!("/article/articles_views?id={}&author_id={}", id, reader))
    .to_request();
  let (_, views) = call(&app, req).await;
  assert_eq!(views.as_array().unwrap().len(), 2);

  let store = env.services.memory_store().unwrap();
  let rows = store.article_interactions(InteractionKind::View, id as i32, Some(reader as i32)).await.unwrap();
  assert_eq!(rows.len(), 2);

  // reading requires a reader
  let req = test::TestRequest::get().uri(&format!("/article/?id={}", id)).to_request();
  let (status, body) = call(&app, req).await;
  assert_eq!(status, 400);
  assert_eq!(body, json!({"error": "The author id has to be provided."}));
}

#[actix_rt::test]
async fn like_only_once() {
  let env = TestEnv::new();
  let app = env.app().await;
  let author = create_author(&app, "Jane", "jane@example.com").await;
  let article = create_article(&app, author, "Hello", None).await;
  let like_uri = format!("/article/like?article%20id={}&author%20id={}", article["id"], author);
  let unlike_uri = format!("/article/unlike?article_id={}&author_id={}", article["id"], author);

  let (status, body) = call(&app, test::TestRequest::get().uri(&unlike_uri).to_request()).await;
  assert_eq!(status, 400);
  assert_eq!(body, json!({"error": "You have not liked this article!"}));

  let (status, like) = call(&app, test::TestRequest::get().uri(&like_uri).to_request()).await;
  assert_eq!(status, 201);
  assert_eq!(like["article_id"], article["id"]);

  let (status, body) = call(&app, test::TestRequest::get().uri(&like_uri).to_request()).await;
  assert_eq!(status, 400);
  assert_eq!(body, json!({"error": "You have already liked this article!"}));

  let req = test::TestRequest::get().uri(&format!("/article/likes?id={}", article["id"])).to_request();
  let (_, likes) = call(&app, req).await;
  assert_eq!(likes.as_array().unwrap().len(), 1);

  let (status, body) = call(&app, test::TestRequest::get().uri(&unlike_uri).to_request()).await;
  assert_eq!(status, 200);
  assert_eq!(body["id"], like["id"]);
}

#[actix_rt::test]
async fn bookmark_and_unbookmark() {
  let env = TestEnv::new();
  let app = env.app().await;
  let author = create_author(&app, "Jane", "jane@example.com").await;
  let article = create_article(&app, author, "Hello", None).await;
  let query = format!("article_id={}&author_id={}", article["id"], author);

  let req = test::TestRequest::get().uri(&format!("/article/bookmark?{}", query)).to_request();
  assert_eq!(call(&app, req).await.0, 200);
  let req = test::TestRequest::get().uri(&format!("/article/bookmark?{}", query)).to_request();
  let (status, body) = call(&app, req).await;
  assert_eq!(status, 400);
  assert_eq!(body, json!({"error": "You have already bookmarked this article!"}));

  let req = test::TestRequest::get().uri(&format!("/author/articles_bookmarked?id={}", author)).to_request();
  let (_, list) = call(&app, req).await;
  assert_eq!(list["articles_count"], 1);

  let req = test::TestRequest::get().uri(&format!("/article/unbookmark?{}", query)).to_request();
  assert_eq!(call(&app, req).await.0, 200);
  let req = test::TestRequest::get().uri(&format!("/article/bookmarks?id={}", article["id"])).to_request();
  let (_, bookmarks) = call(&app, req).await;
  assert_eq!(bookmarks, json!([]));
}

#[actix_rt::test]
async fn only_the_owner_updates() {
  let env = TestEnv::new();
  let app = env.app().await;
  let owner = create_author(&app, "Jane", "jane@example.com").await;
  let other = create_author(&app, "John", "john@example.com").await;
  let article = create_article(&app, owner, "Hello", None).await;

  let (content_type, body) = multipart(&[("Title", "Hijacked")], None);
  let req = test::TestRequest::put()
    .uri(&format!("/article/?id={}&author%20id={}", article["id"], other))
    .insert_header(("content-type", content_type))
    .set_payload(body)
    .to_request();
  let (status, body) = call(&app, req).await;
  assert_eq!(status, 400);
  assert_eq!(body, json!({"error": "You can only edit your own articles!"}));

  let (content_type, body) = multipart(&[("Title", "Updated"), ("Text", "New text")], None);
  let req = test::TestRequest::put()
    .uri(&format!("/article/?id={}&author%20id={}", article["id"], owner))
    .insert_header(("content-type", content_type))
    .set_payload(body)
    .to_request();
  let (status, updated) = call(&app, req).await;
  assert_eq!(status, 200);
  assert_eq!(updated["title"], "Updated");
  assert_eq!(updated["text"], "New text");
  assert!(!updated["date_edited"].is_null());
}

#[actix_rt::test]
async fn tag_and_untag() {
  let env = TestEnv::new();
  let app = env.app().await;
  let owner = create_author(&app, "Jane", "jane@example.com").await;
  let other = create_author(&app, "John", "john@example.com").await;
  let article = create_article(&app, owner, "Hello", None).await;
  let id = article["id"].clone();
  let uri = |action: &str, author: i64, tag: &str| {
    format!("/article/{}?article%20id={}&author%20id={}&tag={}", action, id, author, tag)
  };

  let (status, body) = call(&app, test::TestRequest::get().uri(&uri("tag", owner, "tech")).to_request()).await;
  assert_eq!(status, 400);
  assert_eq!(body, json!({"error": "The article is already tagged as tech"}));

  let (status, body) = call(&app, test::TestRequest::get().uri(&uri("tag", other, "rust")).to_request()).await;
  assert_eq!(status, 400);
  assert_eq!(body, json!({"error": "You can only tag your articles!"}));

  let (status, body) = call(&app, test::TestRequest::get().uri(&uri("tag", owner, "rust")).to_request()).await;
  assert_eq!(status, 201);
  assert_eq!(body, json!({"article_id": id, "tags": ["tech", "rust"]}));

  let (status, body) = call(&app, test::TestRequest::get().uri(&uri("untag", owner, "go")).to_request()).await;
  assert_eq!(status, 400);
  assert_eq!(body, json!({"error": "The article is not tagged as go"}));

  let (status, body) = call(&app, test::TestRequest::get().uri(&uri("untag", owner, "tech")).to_request()).await;
  assert_eq!(status, 200);
  assert_eq!(body["tags"], json!(["rust"]));

  let req = test::TestRequest::get().uri(&format!("/article/tags?id={}", id)).to_request();
  let (_, tags) = call(&app, req).await;
  assert_eq!(tags, json!({"article_id": id, "tags": ["rust"]}));
}

#[actix_rt::test]
async fn comment_and_uncomment() {
  let env = TestEnv::new();
  let app = env.app().await;
  let owner = create_author(&app, "Jane", "jane@example.com").await;
  let reader = create_author(&app, "John", "john@example.com").await;
  let article = create_article(&app, owner, "Hello", None).await;

  let req = test::TestRequest::post()
    .uri(&format!("/article/comment?article%20id={}&author%20id={}", article["id"], reader))
    .set_json(json!({"comment": "Nice post"}))
    .to_request();
  let (status, comment) = call(&app, req).await;
  assert_eq!(status, 201);
  assert_eq!(comment["comment"], "Nice post");

  let req = test::TestRequest::post()
    .uri(&format!("/article/comment?article%20id={}&author%20id={}", article["id"], reader))
    .set_json(json!({"comment": ""}))
    .to_request();
  assert_eq!(call(&app, req).await.0, 400);

  let req = test::TestRequest::get()
    .uri(&format!("/article/comments?id={}&author%20id={}", article["id"], reader))
    .to_request();
  let (_, comments) = call(&app, req).await;
  assert_eq!(comments.as_array().unwrap().len(), 1);

  let req = test::TestRequest::get()
    .uri(&format!("/article/uncomment?comment%20id={}&author%20id={}", comment["id"], owner))
    .to_request();
  let (status, body) = call(&app, req).await;
  assert_eq!(status, 400);
  assert_eq!(body, json!({"error": "You can only delete your own comments!"}));

  let req = test::TestRequest::get()
    .uri(&format!("/article/uncomment?comment%20id={}&author%20id={}", comment["id"], reader))
    .to_request();
  let (status, body) = call(&app, req).await;
  assert_eq!(status, 200);
  assert_eq!(body["id"], comment["id"]);

  let req = test::TestRequest::get()
    .uri(&format!("/article/uncomment?comment%20id={}&author%20id={}", comment["id"], reader))
    .to_request();
  assert_eq!(call(&app, req).await.0, 404);
}

#[actix_rt::test]
async fn share_and_report() {
  let env = TestEnv::new();
  let app = env.app().await;
  let author = create_author(&app, "Jane", "jane@example.com").await;
  let article = create_article(&app, author, "Hello", None).await;
  let query = format!("article_id={}&author_id={}", article["id"], author);

  for _ in 0..2 {
    let req = test::TestRequest::get().uri(&format!("/article/share?{}", query)).to_request();
    assert_eq!(call(&app, req).await.0, 201);
  }
  let req = test::TestRequest::get().uri(&format!("/article/shares?id={}", article["id"])).to_request();
  let (_, shares) = call(&app, req).await;
  assert_eq!(shares.as_array().unwrap().len(), 2);

  let req = test::TestRequest::post()
    .uri(&format!("/article/report?{}", query))
    .set_json(json!({"reason": "spam"}))
    .to_request();
  let (status, report) = call(&app, req).await;
  assert_eq!(status, 201);
  assert_eq!(report["reason"], "spam");

  let req = test::TestRequest::post().uri(&format!("/article/report?{}", query)).to_request();
  let (status, report) = call(&app, req).await;
  assert_eq!(status, 201);
  assert!(report["reason"].is_null());
}

#[actix_rt::test]
async fn list_and_delete() {
  let env = TestEnv::new();
  let app = env.app().await;
  let jane = create_author(&app, "Jane", "jane@example.com").await;
  let john = create_author(&app, "John", "john@example.com").await;
  let first = create_article(&app, jane, "First", None).await;
  create_article(&app, john, "Second", None).await;

  let (_, all) = call(&app, test::TestRequest::get().uri("/article/articles").to_request()).await;
  assert_eq!(all["articles_count"], 2);

  let req = test::TestRequest::get().uri(&format!("/article/articles?author%20id={}", jane)).to_request();
  let (_, janes) = call(&app, req).await;
  assert_eq!(janes["articles_count"], 1);
  assert_eq!(janes["articles"][0]["title"], "First");

  let req = test::TestRequest::delete().uri(&format!("/article/?id={}", first["id"])).to_request();
  let (status, deleted) = call(&app, req).await;
  assert_eq!(status, 200);
  assert_eq!(deleted["id"], first["id"]);

  let req = test::TestRequest::delete().uri(&format!("/article/?id={}", first["id"])).to_request();
  let (status, body) = call(&app, req).await;
  assert_eq!(status, 404);
  assert_eq!(body, json!({"error": format!("The article with id {} does not exist.", first["id"])}));
}
