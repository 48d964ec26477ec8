#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use actix_web::{test, web, App};
use actix_web::dev::{Service, ServiceResponse};
use actix_http::Request;

use serde_json::Value;

use blog_api::app::AppConfig;
use blog_api::error::Result;
use blog_api::images::ObjectStorage;
use blog_api::services::{config_services, Services};

pub const BOUNDARY: &str = "----blogapitestboundary";

/// Object storage that only remembers what was put and deleted.
#[derive(Default)]
pub struct RecordingStorage {
  pub puts: Mutex<Vec<String>>,
  pub deletes: Mutex<Vec<String>>,
}

impl RecordingStorage {
  pub fn puts(&self) -> Vec<String> {
    self.puts.lock().unwrap().clone()
  }

  pub fn deletes(&self) -> Vec<String> {
    self.deletes.lock().unwrap().clone()
  }
}

#[async_trait]
impl ObjectStorage for RecordingStorage {
  async fn put(&self, name: &str, local_path: &Path) -> Result<()> {
    assert!(local_path.exists(), "{:?} was not saved before upload", local_path);
    self.puts.lock().unwrap().push(name.to_string());
    Ok(())
  }

  async fn delete(&self, name: &str) -> Result<()> {
    self.deletes.lock().unwrap().push(name.to_string());
    Ok(())
  }
}

pub struct TestEnv {
  pub dir: tempfile::TempDir,
  pub storage: Arc<RecordingStorage>,
  pub services: Services,
}

impl TestEnv {
  pub fn new() -> TestEnv {
    let dir = tempfile::tempdir().unwrap();
    let conf = format!(r#"
servers = ["api"]

[api]
listen = "127.0.0.1:0"
services = ["Health", "Author", "Article", "Image"]

[db]
backend = "memory"

[images]
upload_dir = "{}"
public_url = "https://images.test/"
"#, dir.path().join("uploads").display());
    let config = AppConfig::from_toml(&conf).unwrap();
    let storage = Arc::new(RecordingStorage::default());
    let services = config_services(&config, "api").unwrap()
      .with_image_storage(storage.clone());
    TestEnv { dir, storage, services }
  }

  pub fn upload_path(&self, filename: &str) -> std::path::PathBuf {
    self.dir.path().join("uploads").join(filename)
  }

  pub async fn app(&self) -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    let services = self.services.clone();
    test::init_service(
      App::new().configure(move |web: &mut web::ServiceConfig| services.web_config(web))
    ).await
  }
}

/// Build a multipart/form-data body with text fields and an optional `Image` part.
pub fn multipart(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> (String, Vec<u8>) {
  let mut body = Vec::new();
  for (name, value) in fields {
    body.extend_from_slice(format!(
      "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
      BOUNDARY, name, value).as_bytes());
  }
  if let Some((filename, data)) = image {
    body.extend_from_slice(format!(
      "--{}\r\nContent-Disposition: form-data; name=\"Image\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
      BOUNDARY, filename).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(b"\r\n");
  }
  body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
  (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

pub async fn call<S>(app: &S, req: Request) -> (u16, Value)
where
  S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
  let resp = test::call_service(app, req).await;
  let status = resp.status().as_u16();
  let body = test::read_body(resp).await;
  let value = if body.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&body).unwrap()
  };
  (status, value)
}

pub async fn create_author<S>(app: &S, name: &str, email: &str) -> i64
where
  S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
  let req = test::TestRequest::post()
    .uri("/author/")
    .set_form([("Name", name), ("Email Address", email)])
    .to_request();
  let (status, body) = call(app, req).await;
  assert_eq!(status, 201, "{}", body);
  body["id"].as_i64().unwrap()
}

pub async fn create_article<S>(app: &S, author_id: i64, title: &str, image: Option<(&str, &[u8])>) -> Value
where
  S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
  let (content_type, body) = multipart(&[("Title", title), ("Text", "Some text")], image);
  let req = test::TestRequest::post()
    .uri(&format!("/article/?id={}", author_id))
    .insert_header(("content-type", content_type))
    .set_payload(body)
    .to_request();
  let (status, body) = call(app, req).await;
  assert_eq!(status, 201, "{}", body);
  body
}
