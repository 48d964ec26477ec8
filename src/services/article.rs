use log::*;

use actix_multipart::Multipart;
use actix_web::{get, post, web, http::header, HttpRequest, HttpResponse};
use futures::TryStreamExt;

use crate::error::*;
use crate::app::*;
use crate::controller::article as controller;
use crate::db::Repository;
use crate::forms::*;
use crate::images::{ImageService, Upload};
use crate::models::*;

/// Name of the multipart file part holding the article image.
const IMAGE_FIELD: &str = "Image";

fn is_multipart(req: &HttpRequest) -> bool {
  req.headers().get(header::CONTENT_TYPE)
    .and_then(|value| value.to_str().ok())
    .map_or(false, |value| value.starts_with("multipart/form-data"))
}

/// Split a multipart article form into its text fields and optional image.
async fn read_article_form(
  req: &HttpRequest,
  mut payload: Multipart,
  max_size: usize,
) -> Result<(FormFields, Option<Upload>)> {
  let mut fields = FormFields::new();
  let mut image = None;
  if !is_multipart(req) {
    return Ok((fields, image));
  }

  while let Some(mut field) = payload.try_next().await? {
    let disposition = field.content_disposition();
    let name = disposition.get_name().unwrap_or_default().to_string();
    let filename = disposition.get_filename().map(|name| name.to_string());

    let mut data = Vec::new();
    while let Some(chunk) = field.try_next().await? {
      if data.len() + chunk.len() > max_size {
        return Err(Error::Invalid(format!("The {} is larger than {} bytes.", name, max_size)));
      }
      data.extend_from_slice(&chunk);
    }

    if name == IMAGE_FIELD {
      // browsers send an empty file part when nothing was picked.
      if filename.as_deref().map_or(false, |name| !name.is_empty()) {
        image = Some(Upload { filename, data });
      }
    } else if filename.is_some() {
      debug!("Ignoring file part: {}", name);
    } else {
      let value = String::from_utf8(data)
        .map_err(|_| Error::WrongType(format!("The {} has to be a string.", name)))?;
      fields.insert(name, value);
    }
  }
  Ok((fields, image))
}

/// create article
async fn create_article(
  req: HttpRequest,
  db: web::Data<dyn Repository>,
  images: web::Data<ImageService>,
  params: web::Query<ArticleParams>,
  payload: Multipart,
) -> Result<HttpResponse> {
  let (fields, image) = read_article_form(&req, payload, images.max_size()).await?;
  let article = controller::create(db.get_ref(), &images, params.id.as_deref(),
    &fields, image.as_ref()).await?;
  Ok(HttpResponse::Created().json(article))
}

/// get article by id, as read by `author id`
async fn get_article(
  db: web::Data<dyn Repository>,
  params: web::Query<ArticleParams>,
) -> Result<HttpResponse> {
  let article = controller::get(db.get_ref(), params.id.as_deref(),
    params.author_id.as_deref()).await?;
  Ok(HttpResponse::Ok().json(article))
}

async fn update_article(
  req: HttpRequest,
  db: web::Data<dyn Repository>,
  images: web::Data<ImageService>,
  params: web::Query<ArticleParams>,
  payload: Multipart,
) -> Result<HttpResponse> {
  let (fields, image) = read_article_form(&req, payload, images.max_size()).await?;
  let article = controller::update(db.get_ref(), &images, params.author_id.as_deref(),
    params.id.as_deref(), &fields, image.as_ref()).await?;
  Ok(HttpResponse::Ok().json(article))
}

async fn delete_article(
  db: web::Data<dyn Repository>,
  images: web::Data<ImageService>,
  params: web::Query<ArticleParams>,
) -> Result<HttpResponse> {
  let article = controller::delete(db.get_ref(), &images, params.id.as_deref()).await?;
  Ok(HttpResponse::Ok().json(article))
}

/// Get list of articles
#[get("/articles")]
async fn list(
  db: web::Data<dyn Repository>,
  params: web::Query<ArticleParams>,
) -> Result<HttpResponse> {
  let articles = controller::list(db.get_ref(), params.author_id.as_deref()).await?;
  Ok(HttpResponse::Ok().json(ArticleList::from(articles)))
}

#[get("/comments")]
async fn comments(
  db: web::Data<dyn Repository>,
  params: web::Query<ArticleParams>,
) -> Result<HttpResponse> {
  let rows = controller::comments(db.get_ref(), params.id.as_deref(),
    params.author_id.as_deref()).await?;
  Ok(HttpResponse::Ok().json(rows))
}

async fn interactions(
  db: &dyn Repository,
  kind: InteractionKind,
  params: &ArticleParams,
) -> Result<HttpResponse> {
  let rows = controller::interactions(db, kind, params.id.as_deref(),
    params.author_id.as_deref()).await?;
  Ok(HttpResponse::Ok().json(rows))
}

#[get("/likes")]
async fn likes(
  db: web::Data<dyn Repository>,
  params: web::Query<ArticleParams>,
) -> Result<HttpResponse> {
  interactions(db.get_ref(), InteractionKind::Like, &params).await
}

#[get("/bookmarks")]
async fn bookmarks(
  db: web::Data<dyn Repository>,
  params: web::Query<ArticleParams>,
) -> Result<HttpResponse> {
  interactions(db.get_ref(), InteractionKind::Bookmark, &params).await
}

#[get("/articles_views")]
async fn views(
  db: web::Data<dyn Repository>,
  params: web::Query<ArticleParams>,
) -> Result<HttpResponse> {
  interactions(db.get_ref(), InteractionKind::View, &params).await
}

#[get("/shares")]
async fn shares(
  db: web::Data<dyn Repository>,
  params: web::Query<ArticleParams>,
) -> Result<HttpResponse> {
  interactions(db.get_ref(), InteractionKind::Share, &params).await
}

#[get("/tags")]
async fn tags(
  db: web::Data<dyn Repository>,
  params: web::Query<ArticleParams>,
) -> Result<HttpResponse> {
  let article_tags = controller::tags(db.get_ref(), params.id.as_deref()).await?;
  Ok(HttpResponse::Ok().json(article_tags))
}

#[get("/stats")]
async fn stats(
  db: web::Data<dyn Repository>,
  params: web::Query<ArticleParams>,
) -> Result<HttpResponse> {
  let counts = controller::stats(db.get_ref(), params.id.as_deref()).await?;
  Ok(HttpResponse::Ok().json(counts))
}

#[get("/bookmark")]
async fn bookmark(
  db: web::Data<dyn Repository>,
  params: web::Query<InteractionParams>,
) -> Result<HttpResponse> {
  let row = controller::interact(db.get_ref(), InteractionKind::Bookmark,
    params.article_id.as_deref(), params.author_id.as_deref()).await?;
  Ok(HttpResponse::Ok().json(row))
}

#[get("/unbookmark")]
async fn unbookmark(
  db: web::Data<dyn Repository>,
  params: web::Query<InteractionParams>,
) -> Result<HttpResponse> {
  let row = controller::uninteract(db.get_ref(), InteractionKind::Bookmark,
    params.article_id.as_deref(), params.author_id.as_deref()).await?;
  Ok(HttpResponse::Ok().json(row))
}

#[get("/like")]
async fn like(
  db: web::Data<dyn Repository>,
  params: web::Query<InteractionParams>,
) -> Result<HttpResponse> {
  let row = controller::interact(db.get_ref(), InteractionKind::Like,
    params.article_id.as_deref(), params.author_id.as_deref()).await?;
  Ok(HttpResponse::Created().json(row))
}

#[get("/unlike")]
async fn unlike(
  db: web::Data<dyn Repository>,
  params: web::Query<InteractionParams>,
) -> Result<HttpResponse> {
  let row = controller::uninteract(db.get_ref(), InteractionKind::Like,
    params.article_id.as_deref(), params.author_id.as_deref()).await?;
  Ok(HttpResponse::Ok().json(row))
}

#[get("/share")]
async fn share(
  db: web::Data<dyn Repository>,
  params: web::Query<InteractionParams>,
) -> Result<HttpResponse> {
  let row = controller::interact(db.get_ref(), InteractionKind::Share,
    params.article_id.as_deref(), params.author_id.as_deref()).await?;
  Ok(HttpResponse::Created().json(row))
}

#[get("/tag")]
async fn tag(
  db: web::Data<dyn Repository>,
  params: web::Query<InteractionParams>,
) -> Result<HttpResponse> {
  let article_tags = controller::tag(db.get_ref(), &params).await?;
  Ok(HttpResponse::Created().json(article_tags))
}

#[get("/untag")]
async fn untag(
  db: web::Data<dyn Repository>,
  params: web::Query<InteractionParams>,
) -> Result<HttpResponse> {
  let article_tags = controller::untag(db.get_ref(), &params).await?;
  Ok(HttpResponse::Ok().json(article_tags))
}

#[post("/comment")]
async fn comment(
  db: web::Data<dyn Repository>,
  params: web::Query<InteractionParams>,
  form: web::Json<CreateComment>,
) -> Result<HttpResponse> {
  let created = controller::comment(db.get_ref(), params.article_id.as_deref(),
    params.author_id.as_deref(), form.into_inner()).await?;
  Ok(HttpResponse::Created().json(created))
}

#[get("/uncomment")]
async fn uncomment(
  db: web::Data<dyn Repository>,
  params: web::Query<CommentParams>,
) -> Result<HttpResponse> {
  let removed = controller::uncomment(db.get_ref(), params.comment_id.as_deref(),
    params.author_id.as_deref()).await?;
  Ok(HttpResponse::Ok().json(removed))
}

/// report an article; the json body with a `reason` is optional.
#[post("/report")]
async fn report(
  db: web::Data<dyn Repository>,
  params: web::Query<InteractionParams>,
  body: web::Bytes,
) -> Result<HttpResponse> {
  let form = if body.iter().all(u8::is_ascii_whitespace) {
    CreateReport::default()
  } else {
    serde_json::from_slice(&body)
      .map_err(|err| Error::Invalid(format!("Invalid json: {}", err)))?
  };
  let stored = controller::report(db.get_ref(), params.article_id.as_deref(),
    params.author_id.as_deref(), form).await?;
  Ok(HttpResponse::Created().json(stored))
}

#[derive(Debug, Clone)]
pub struct ArticleService {
  pub prefix: String,
}

impl super::Service for ArticleService {
  fn load_app_config(&mut self, config: &AppConfig, _prefix: &str) -> Result<()> {
    if let Some(prefix) = config.get_str("Article.prefix")? {
      self.prefix = prefix;
    }
    Ok(())
  }

  fn web_config(&self, web: &mut web::ServiceConfig) {
    web.service(
      web::scope(&self.prefix)
        .service(
          web::resource(vec!["", "/"])
            .route(web::post().to(create_article))
            .route(web::get().to(get_article))
            .route(web::put().to(update_article))
            .route(web::delete().to(delete_article))
        )
        .service(list)
        .service(comments)
        .service(likes)
        .service(bookmarks)
        .service(views)
        .service(shares)
        .service(tags)
        .service(stats)
        .service(bookmark)
        .service(unbookmark)
        .service(like)
        .service(unlike)
        .service(share)
        .service(tag)
        .service(untag)
        .service(comment)
        .service(uncomment)
        .service(report)
    );
  }
}

pub fn new_factory() -> ArticleService {
  ArticleService {
    prefix: "/article".to_string(),
  }
}
