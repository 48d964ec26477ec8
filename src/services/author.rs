use actix_web::{get, web, HttpResponse};

use crate::error::*;
use crate::app::*;
use crate::controller::author as controller;
use crate::db::Repository;
use crate::forms::*;
use crate::images::ImageService;
use crate::models::*;

/// create author
async fn create_author(
  db: web::Data<dyn Repository>,
  form: web::Form<FormFields>,
) -> Result<HttpResponse> {
  let author = controller::create(db.get_ref(), &form).await?;
  Ok(HttpResponse::Created().json(author))
}

/// get author by id
async fn get_author(
  db: web::Data<dyn Repository>,
  params: web::Query<AuthorParams>,
) -> Result<HttpResponse> {
  let author = controller::get(db.get_ref(), params.id.as_deref()).await?;
  Ok(HttpResponse::Ok().json(author))
}

/// update name and/or email
async fn update_author(
  db: web::Data<dyn Repository>,
  params: web::Query<AuthorParams>,
  form: web::Form<FormFields>,
) -> Result<HttpResponse> {
  let author = controller::update(db.get_ref(), params.id.as_deref(), &form).await?;
  Ok(HttpResponse::Ok().json(author))
}

async fn delete_author(
  db: web::Data<dyn Repository>,
  images: web::Data<ImageService>,
  params: web::Query<AuthorParams>,
) -> Result<HttpResponse> {
  let author = controller::delete(db.get_ref(), &images, params.id.as_deref()).await?;
  Ok(HttpResponse::Ok().json(author))
}

/// Get list of authors
#[get("/authors")]
async fn list(db: web::Data<dyn Repository>) -> Result<HttpResponse> {
  let authors = controller::list(db.get_ref()).await?;
  Ok(HttpResponse::Ok().json(authors))
}

fn article_list(articles: Vec<Article>) -> HttpResponse {
  HttpResponse::Ok().json(ArticleList::from(articles))
}

#[get("/articles_published")]
async fn articles_published(
  db: web::Data<dyn Repository>,
  params: web::Query<AuthorParams>,
) -> Result<HttpResponse> {
  Ok(article_list(controller::articles_published(db.get_ref(), params.id.as_deref()).await?))
}

#[get("/articles_liked")]
async fn articles_liked(
  db: web::Data<dyn Repository>,
  params: web::Query<AuthorParams>,
) -> Result<HttpResponse> {
  let articles = controller::articles_interacted(db.get_ref(), InteractionKind::Like,
    params.id.as_deref()).await?;
  Ok(article_list(articles))
}

#[get("/articles_bookmarked")]
async fn articles_bookmarked(
  db: web::Data<dyn Repository>,
  params: web::Query<AuthorParams>,
) -> Result<HttpResponse> {
  let articles = controller::articles_interacted(db.get_ref(), InteractionKind::Bookmark,
    params.id.as_deref()).await?;
  Ok(article_list(articles))
}

#[get("/articles_viewed")]
async fn articles_viewed(
  db: web::Data<dyn Repository>,
  params: web::Query<AuthorParams>,
) -> Result<HttpResponse> {
  let articles = controller::articles_interacted(db.get_ref(), InteractionKind::View,
    params.id.as_deref()).await?;
  Ok(article_list(articles))
}

#[get("/articles_commented")]
async fn articles_commented(
  db: web::Data<dyn Repository>,
  params: web::Query<AuthorParams>,
) -> Result<HttpResponse> {
  Ok(article_list(controller::articles_commented(db.get_ref(), params.id.as_deref()).await?))
}

#[get("/stats")]
async fn stats(
  db: web::Data<dyn Repository>,
  params: web::Query<AuthorParams>,
) -> Result<HttpResponse> {
  let counts = controller::stats(db.get_ref(), params.id.as_deref()).await?;
  Ok(HttpResponse::Ok().json(counts))
}

#[derive(Debug, Clone)]
pub struct AuthorService {
  pub prefix: String,
}

impl super::Service for AuthorService {
  fn load_app_config(&mut self, config: &AppConfig, _prefix: &str) -> Result<()> {
    if let Some(prefix) = config.get_str("Author.prefix")? {
      self.prefix = prefix;
    }
    Ok(())
  }

  fn web_config(&self, web: &mut web::ServiceConfig) {
    web.service(
      web::scope(&self.prefix)
        .service(
          web::resource(vec!["", "/"])
            .route(web::post().to(create_author))
            .route(web::get().to(get_author))
            .route(web::put().to(update_author))
            .route(web::delete().to(delete_author))
        )
        .service(list)
        .service(articles_published)
        .service(articles_liked)
        .service(articles_bookmarked)
        .service(articles_viewed)
        .service(articles_commented)
        .service(stats)
    );
  }
}

pub fn new_factory() -> AuthorService {
  AuthorService {
    prefix: "/author".to_string(),
  }
}
