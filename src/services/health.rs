use actix_web::{get, web, HttpResponse};

use crate::error::*;
use crate::app::*;

/// Check if the application is running.
#[get("/")]
async fn hello() -> HttpResponse {
  HttpResponse::Ok().json(json!({
    "success": "hello from blog-api",
  }))
}

#[derive(Debug, Clone, Default)]
pub struct HealthService;

impl super::Service for HealthService {
  fn load_app_config(&mut self, _config: &AppConfig, _prefix: &str) -> Result<()> {
    Ok(())
  }

  fn web_config(&self, web: &mut web::ServiceConfig) {
    web.service(hello);
  }
}

pub fn new_factory() -> HealthService {
  Default::default()
}
