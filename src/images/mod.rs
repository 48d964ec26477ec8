use log::*;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::app::AppConfig;
use crate::error::*;
use crate::util::{basename, file_extension, secure_filename};

pub const DEFAULT_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];
pub const DEFAULT_MAX_SIZE: usize = 5 * 1024 * 1024;

/// An uploaded file, as read from the multipart `Image` part.
#[derive(Debug, Clone, Default)]
pub struct Upload {
  pub filename: Option<String>,
  pub data: Vec<u8>,
}

/// Where uploaded images end up once saved locally.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
  /// Store the local file `local_path` under the key `name`.
  async fn put(&self, name: &str, local_path: &Path) -> Result<()>;

  async fn delete(&self, name: &str) -> Result<()>;
}

/// Object storage backed by a plain directory.
#[derive(Debug, Clone)]
pub struct DirectoryStorage {
  root: PathBuf,
}

impl DirectoryStorage {
  pub fn new<P: Into<PathBuf>>(root: P) -> Self {
    DirectoryStorage { root: root.into() }
  }
}

#[async_trait]
impl ObjectStorage for DirectoryStorage {
  async fn put(&self, name: &str, local_path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(&self.root).await?;
    tokio::fs::copy(local_path, self.root.join(name)).await?;
    Ok(())
  }

  async fn delete(&self, name: &str) -> Result<()> {
    match tokio::fs::remove_file(self.root.join(name)).await {
      Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
      _ => Ok(()),
    }
  }
}

#[derive(Clone)]
pub struct ImageService {
  upload_dir: PathBuf,
  public_url: String,
  allowed_extensions: Vec<String>,
  max_size: usize,
  storage: Arc<dyn ObjectStorage>,
}

impl ImageService {
  pub fn from_config(config: &AppConfig) -> Result<ImageService> {
    let upload_dir = config.get_path("images.upload_dir")?
      .unwrap_or_else(|| PathBuf::from("uploads"));
    let storage_dir = config.get_path("images.storage_dir")?
      .unwrap_or_else(|| PathBuf::from("storage"));
    let public_url = config.get_str("images.public_url")?
      .unwrap_or_else(|| "/image?filename=".to_string());

    let mut service = ImageService::with_storage(upload_dir, public_url,
      Arc::new(DirectoryStorage::new(storage_dir)));
    if let Some(list) = config.get_array("images.allowed_extensions")? {
      service.allowed_extensions = list.iter().map(|ext| ext.to_lowercase()).collect();
    }
    if let Some(max_size) = config.get_int("images.max_size")? {
      service.max_size = max_size.max(0) as usize;
    }
    Ok(service)
  }

  pub fn with_storage<P: Into<PathBuf>>(upload_dir: P, public_url: String, storage: Arc<dyn ObjectStorage>) -> ImageService {
    ImageService {
      upload_dir: upload_dir.into(),
      public_url,
      allowed_extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
      max_size: DEFAULT_MAX_SIZE,
      storage,
    }
  }

  pub fn with_object_storage(mut self, storage: Arc<dyn ObjectStorage>) -> Self {
    self.storage = storage;
    self
  }

  pub fn max_size(&self) -> usize {
    self.max_size
  }

  /// Check that `filename` has an allowed extension.
  pub fn allowed_file(&self, filename: &str) -> Result<bool> {
    if filename.is_empty() {
      return Err(Error::Invalid("The filename must be provided!".to_string()));
    }
    match file_extension(filename) {
      Some(ext) => Ok(self.allowed_extensions.iter().any(|allowed| *allowed == ext)),
      None => Err(Error::WrongType("The file lacks an extension".to_string())),
    }
  }

  /// Save the upload locally, hand it to object storage and return its public url.
  pub async fn upload(&self, upload: &Upload) -> Result<String> {
    let filename = match upload.filename.as_deref() {
      Some(name) if !name.is_empty() => name,
      _ => return Err(Error::Invalid("The file has to be provided!".to_string())),
    };
    if !self.allowed_file(filename)? {
      return Err(Error::WrongType("That file type is not allowed!".to_string()));
    }
    if upload.data.len() > self.max_size {
      return Err(Error::Invalid(format!("The file is larger than {} bytes.", self.max_size)));
    }
    let name = secure_filename(filename);
    if file_extension(&name).is_none() {
      return Err(Error::WrongType("The file lacks an extension".to_string()));
    }

    tokio::fs::create_dir_all(&self.upload_dir).await?;
    let path = self.upload_dir.join(&name);
    tokio::fs::write(&path, &upload.data).await?;
    self.storage.put(&name, &path).await?;

    debug!("Image uploaded: {}", name);
    Ok(format!("{}{}", self.public_url, name))
  }

  /// Storage key of an image url handed out by `upload`.
  fn image_name(&self, url: &str) -> String {
    let name = match url.strip_prefix(self.public_url.as_str()) {
      Some(name) if !self.public_url.is_empty() => name,
      _ => basename(url),
    };
    secure_filename(name)
  }

  /// Remove the image behind a public url from object storage and disk.
  pub async fn delete_by_url(&self, url: &str) -> Result<()> {
    let name = self.image_name(url);
    if name.is_empty() {
      return Ok(());
    }
    self.storage.delete(&name).await?;
    if let Err(err) = self.remove_local(&name).await {
      warn!("Failed to remove local image {}: {}", name, err);
    }
    debug!("Image deleted: {}", name);
    Ok(())
  }

  /// Like `delete_by_url`, but failures are only logged.
  pub async fn discard(&self, url: &str) {
    if let Err(err) = self.delete_by_url(url).await {
      warn!("Failed to delete image {}: {}", url, err);
    }
  }

  /// Path of a locally stored upload, if `filename` names one.
  pub fn local_path(&self, filename: &str) -> Result<PathBuf> {
    let name = secure_filename(filename);
    if name.is_empty() {
      return Err(Error::Invalid("The filename must be provided!".to_string()));
    }
    Ok(self.upload_dir.join(name))
  }

  pub async fn remove_local(&self, filename: &str) -> Result<()> {
    let path = self.local_path(filename)?;
    match tokio::fs::remove_file(&path).await {
      Ok(()) => Ok(()),
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
        Err(Error::NotFound(format!("The image {} does not exist.", filename)))
      },
      Err(err) => Err(err.into()),
    }
  }
}
