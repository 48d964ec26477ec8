use log::*;

use actix_files::NamedFile;
use actix_web::{get, web, HttpResponse};

use serde::Deserialize;

use crate::error::*;
use crate::app::*;
use crate::images::ImageService;

#[derive(Debug, Default, Deserialize)]
pub struct ImageParams {
  pub filename: Option<String>,
}

impl ImageParams {
  fn filename(&self) -> Result<&str> {
    match self.filename.as_deref() {
      Some(name) if !name.is_empty() => Ok(name),
      _ => Err(Error::Invalid("The filename must be provided!".to_string())),
    }
  }
}

/// Serve a locally stored upload.
#[get("/image")]
async fn get_image(
  images: web::Data<ImageService>,
  params: web::Query<ImageParams>,
) -> Result<NamedFile> {
  let filename = params.filename()?;
  let path = images.local_path(filename)?;
  NamedFile::open_async(&path).await.map_err(|err| {
    debug!("Image {:?}: {}", path, err);
    Error::NotFound(format!("The image {} does not exist.", filename))
  })
}

/// Remove a locally stored upload.
#[get("/delete")]
async fn delete_image(
  images: web::Data<ImageService>,
  params: web::Query<ImageParams>,
) -> Result<HttpResponse> {
  images.remove_local(params.filename()?).await?;
  Ok(HttpResponse::Ok().json(json!({
    "success": "image deleted",
  })))
}

#[derive(Debug, Clone, Default)]
pub struct ImageRelayService;

impl super::Service for ImageRelayService {
  fn load_app_config(&mut self, _config: &AppConfig, _prefix: &str) -> Result<()> {
    Ok(())
  }

  fn web_config(&self, web: &mut web::ServiceConfig) {
    web
      .service(get_image)
      .service(delete_image);
  }
}

pub fn new_factory() -> ImageRelayService {
  Default::default()
}
