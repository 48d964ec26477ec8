use log::*;

use std::collections::HashSet;
use std::sync::Arc;

use actix_web::{web, HttpRequest};

use crate::error::*;
use crate::app::*;
use crate::db::{Backend, MemoryStore, Repository};
use crate::images::{ImageService, ObjectStorage};

mod health;
mod author;
mod article;
mod image;

type BoxService = Box<dyn Service>;

pub trait Service: ServiceClone + Send {
  /// Load Service config from AppConfig.
  fn load_app_config(&mut self, config: &AppConfig, prefix: &str) -> Result<()>;

  /// Setup Service endpoints.
  fn web_config(&self, _web: &mut web::ServiceConfig) {
  }
}

pub trait ServiceClone {
  fn clone_box(&self) -> BoxService;
}

impl<T> ServiceClone for T
where
    T: 'static + Service + Clone,
{
  fn clone_box(&self) -> BoxService {
    Box::new(self.clone())
  }
}

impl Clone for BoxService {
  fn clone(&self) -> BoxService {
    self.clone_box()
  }
}

fn query_error(err: actix_web::error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
  Error::Invalid(format!("Invalid query string: {}", err)).into()
}

fn form_error(err: actix_web::error::UrlencodedError, _req: &HttpRequest) -> actix_web::Error {
  Error::Invalid(format!("Invalid form data: {}", err)).into()
}

fn json_error(err: actix_web::error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
  Error::Invalid(format!("Invalid json: {}", err)).into()
}

#[derive(Clone)]
pub struct Services {
  backend: Backend,
  images: ImageService,
  services: Vec<BoxService>,
}

impl Services {
  pub fn new(backend: Backend, images: ImageService) -> Services {
    Services {
      backend,
      images,
      services: Vec::new(),
    }
  }

  fn load_service(&mut self, name: &str, config: &AppConfig, prefix: &str) -> Result<BoxService> {
    let mut service: BoxService = match name {
      "Health" => Box::new(health::new_factory()),
      "Author" => Box::new(author::new_factory()),
      "Article" => Box::new(article::new_factory()),
      "Image" => Box::new(image::new_factory()),
      _ => {
        return Err(Error::InvalidConfig(format!("Unknown Service: {}", name)));
      },
    };

    service.load_app_config(config, prefix)?;
    Ok(service)
  }

  /// Load Service config from AppConfig.
  pub fn load_app_config(&mut self, config: &AppConfig, prefix: &str) -> Result<()> {
    let list = config.get_array(&format!("{}.services", prefix))?
      .ok_or_else(|| Error::InvalidConfig(format!("missing list of {}.services", prefix)))?;
    let mut loaded = HashSet::new();
    for name in list.iter() {
      info!("Loading {}Service config", name);
      if !loaded.insert(name.clone()) {
        return Err(Error::InvalidConfig(format!("can't load service {} multiple times.", name)));
      }
      let service = self.load_service(name, config, prefix)?;
      self.services.push(service);
    }
    Ok(())
  }

  /// Replace the object storage images are handed to.
  pub fn with_image_storage(mut self, storage: Arc<dyn ObjectStorage>) -> Self {
    self.images = self.images.with_object_storage(storage);
    self
  }

  /// The shared store, when running on the memory backend.
  pub fn memory_store(&self) -> Option<Arc<MemoryStore>> {
    match &self.backend {
      Backend::Memory(store) => Some(store.clone()),
      Backend::Postgres(_) => None,
    }
  }

  /// Setup Service endpoints.
  pub fn web_config(&self, web: &mut web::ServiceConfig) {
    // Repository for this worker.
    let db: Arc<dyn Repository> = self.backend.repository();
    web
      .app_data(web::Data::from(db))
      .app_data(web::Data::new(self.images.clone()))
      .app_data(web::QueryConfig::default().error_handler(query_error))
      .app_data(web::FormConfig::default().limit(256 * 1024).error_handler(form_error))
      .app_data(web::JsonConfig::default().error_handler(json_error));

    for service in self.services.iter() {
      service.web_config(web);
    }
  }
}

pub fn config_services(config: &AppConfig, prefix: &str) -> Result<Services> {
  let backend = Backend::from_config(config)?;
  let images = ImageService::from_config(config)?;
  let mut services = Services::new(backend, images);
  services.load_app_config(config, prefix)?;
  Ok(services)
}
