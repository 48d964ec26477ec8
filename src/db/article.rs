use async_trait::async_trait;

use tokio_postgres::Row;

use crate::error::*;
use crate::models::*;

use crate::db::*;
use crate::db::util::*;

#[derive(Clone)]
pub struct ArticleService {
  // get one article
  article_by_id: VersionedStatement,

  // get multiple articles
  all_articles: VersionedStatement,
  articles_by_author: VersionedStatement,
  articles_commented: VersionedStatement,

  // store/update/delete article
  store_article: VersionedStatement,
  update_article: VersionedStatement,
  delete_article: VersionedStatement,

  article_stats: VersionedStatement,
}

lazy_static! {
  pub(crate) static ref ARTICLE_COLUMNS: ColumnMappers = {
    ColumnMappers {
      table_name: "articles",
      columns: vec![
        generated("id"),
        column("author_id"),
        column("title"),
        column("text"),
        column("image"),
        generated("date_published"),
        generated("date_edited"),
        generated("tags"),
      ],
    }
  };
}

pub(crate) fn article_from_row(row: &Row) -> Article {
  Article {
    id: row.get(0),
    author_id: row.get(1),
    title: row.get(2),
    text: row.get(3),
    image: row.get(4),
    date_published: row.get(5),
    date_edited: row.get(6),
    tags: row.get(7),
  }
}

static ARTICLE_STATS_SELECT: &str = r#"
SELECT
  (SELECT COUNT(*) FROM views WHERE article_id = $1) AS Views,
  (SELECT COUNT(*) FROM likes WHERE article_id = $1) AS Likes,
  (SELECT COUNT(*) FROM comments WHERE article_id = $1) AS Comments,
  (SELECT COUNT(*) FROM bookmarks WHERE article_id = $1) AS Bookmarks,
  (SELECT COUNT(*) FROM shares WHERE article_id = $1) AS Shares
"#;

impl ArticleService {
  pub fn new(cl: SharedClient) -> ArticleService {
    let select = ARTICLE_COLUMNS.build_select_query();
    ArticleService {
      article_by_id: VersionedStatement::new(cl.clone(),
          &format!(r#"{} WHERE id = $1"#, select)),

      all_articles: VersionedStatement::new(cl.clone(),
          &format!(r#"{} ORDER BY id"#, select)),
      articles_by_author: VersionedStatement::new(cl.clone(),
          &format!(r#"{} WHERE author_id = $1 ORDER BY id"#, select)),
      articles_commented: VersionedStatement::new(cl.clone(),
          &format!(r#"{} WHERE id IN (SELECT article_id FROM comments WHERE author_id = $1)
          ORDER BY id"#, select)),

      store_article: VersionedStatement::new(cl.clone(),
          &ARTICLE_COLUMNS.build_insert_query()),
      update_article: VersionedStatement::new(cl.clone(),
          r#"UPDATE articles SET title = $2, text = $3, image = $4, date_edited = $5, tags = $6
          WHERE id = $1"#),
      delete_article: VersionedStatement::new(cl.clone(),
          r#"DELETE FROM articles WHERE id = $1"#),

      article_stats: VersionedStatement::new(cl, ARTICLE_STATS_SELECT),
    }
  }

  pub async fn prepare(&self) -> Result<()> {
    self.article_by_id.prepare().await?;

    self.all_articles.prepare().await?;
    self.articles_by_author.prepare().await?;
    self.articles_commented.prepare().await?;

    self.store_article.prepare().await?;
    self.update_article.prepare().await?;
    self.delete_article.prepare().await?;

    self.article_stats.prepare().await?;
    Ok(())
  }
}

#[async_trait(?Send)]
impl ArticleRepo for DbService {
  async fn article_by_id(&self, article_id: i32) -> Result<Option<Article>> {
    let row = self.article.article_by_id.query_opt(&[&article_id]).await?;
    Ok(row.as_ref().map(article_from_row))
  }

  async fn all_articles(&self, author_id: Option<i32>) -> Result<Vec<Article>> {
    let rows = match author_id {
      Some(author_id) => self.article.articles_by_author.query(&[&author_id]).await?,
      None => self.article.all_articles.query(&[]).await?,
    };
    Ok(rows.iter().map(article_from_row).collect())
  }

  async fn store_article(&self, article: &NewArticle) -> Result<Article> {
    let row = self.article.store_article.query_one(&[
      &article.author_id, &article.title, &article.text, &article.image,
    ]).await?;
    Ok(article_from_row(&row))
  }

  async fn update_article(&self, article: &Article) -> Result<u64> {
    self.article.update_article.execute(&[
      &article.id, &article.title, &article.text, &article.image,
      &article.date_edited, &article.tags,
    ]).await
  }

  async fn delete_article(&self, article_id: i32) -> Result<u64> {
    self.article.delete_article.execute(&[&article_id]).await
  }

  async fn article_stats(&self, article_id: i32) -> Result<ArticleStats> {
    let row = self.article.article_stats.query_one(&[&article_id]).await?;
    Ok(ArticleStats {
      views: row.get(0),
      likes: row.get(1),
      comments: row.get(2),
      bookmarks: row.get(3),
      shares: row.get(4),
    })
  }

  async fn articles_by_interaction(&self, kind: InteractionKind, author_id: i32) -> Result<Vec<Article>> {
    let rows = self.interaction.statements(kind).articles_by_author.query(&[&author_id]).await?;
    Ok(rows.iter().map(article_from_row).collect())
  }

  async fn articles_commented(&self, author_id: i32) -> Result<Vec<Article>> {
    let rows = self.article.articles_commented.query(&[&author_id]).await?;
    Ok(rows.iter().map(article_from_row).collect())
  }
}
