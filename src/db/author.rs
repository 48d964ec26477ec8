use async_trait::async_trait;

use tokio_postgres::Row;

use crate::error::*;
use crate::models::*;

use crate::db::*;
use crate::db::util::*;

#[derive(Clone)]
pub struct AuthorService {
  // gets
  author_by_id: VersionedStatement,
  author_by_email: VersionedStatement,
  all_authors: VersionedStatement,

  // store/update/delete
  store_author: VersionedStatement,
  update_author: VersionedStatement,
  delete_author: VersionedStatement,

  author_stats: VersionedStatement,
}

lazy_static! {
  static ref AUTHOR_COLUMNS: ColumnMappers = {
    ColumnMappers {
      table_name: "authors",
      columns: vec![
        generated("id"),
        column("name"),
        column("email_address"),
        generated("created_at"),
      ],
    }
  };
}

fn author_from_row(row: &Row) -> Author {
  Author {
    id: row.get(0),
    name: row.get(1),
    email_address: row.get(2),
    created_at: row.get(3),
  }
}

static AUTHOR_STATS_SELECT: &str = r#"
SELECT
  (SELECT COUNT(*) FROM articles WHERE author_id = $1) AS ArticlesPublished,
  (SELECT COUNT(*) FROM likes WHERE author_id = $1) AS Likes,
  (SELECT COUNT(*) FROM bookmarks WHERE author_id = $1) AS Bookmarks,
  (SELECT COUNT(*) FROM views WHERE author_id = $1) AS Views,
  (SELECT COUNT(*) FROM comments WHERE author_id = $1) AS Comments,
  (SELECT COUNT(*) FROM shares WHERE author_id = $1) AS Shares
"#;

impl AuthorService {
  pub fn new(cl: SharedClient) -> AuthorService {
    let select = AUTHOR_COLUMNS.build_select_query();
    AuthorService {
      author_by_id: VersionedStatement::new(cl.clone(),
          &format!(r#"{} WHERE id = $1"#, select)),
      author_by_email: VersionedStatement::new(cl.clone(),
          &format!(r#"{} WHERE email_address = $1"#, select)),
      all_authors: VersionedStatement::new(cl.clone(),
          &format!(r#"{} ORDER BY id"#, select)),

      store_author: VersionedStatement::new(cl.clone(),
          &AUTHOR_COLUMNS.build_insert_query()),
      update_author: VersionedStatement::new(cl.clone(),
          r#"UPDATE authors SET name = $2, email_address = $3 WHERE id = $1"#),
      // articles, comments and interactions go with it (ON DELETE CASCADE).
      delete_author: VersionedStatement::new(cl.clone(),
          r#"DELETE FROM authors WHERE id = $1"#),

      author_stats: VersionedStatement::new(cl, AUTHOR_STATS_SELECT),
    }
  }

  pub async fn prepare(&self) -> Result<()> {
    self.author_by_id.prepare().await?;
    self.author_by_email.prepare().await?;
    self.all_authors.prepare().await?;

    self.store_author.prepare().await?;
    self.update_author.prepare().await?;
    self.delete_author.prepare().await?;

    self.author_stats.prepare().await?;
    Ok(())
  }
}

#[async_trait(?Send)]
impl AuthorRepo for DbService {
  async fn author_by_id(&self, author_id: i32) -> Result<Option<Author>> {
    let row = self.author.author_by_id.query_opt(&[&author_id]).await?;
    Ok(row.as_ref().map(author_from_row))
  }

  async fn author_by_email(&self, email: &str) -> Result<Option<Author>> {
    let row = self.author.author_by_email.query_opt(&[&email]).await?;
    Ok(row.as_ref().map(author_from_row))
  }

  async fn all_authors(&self) -> Result<Vec<Author>> {
    let rows = self.author.all_authors.query(&[]).await?;
    Ok(rows.iter().map(author_from_row).collect())
  }

  async fn store_author(&self, author: &NewAuthor) -> Result<Author> {
    let row = self.author.store_author.query_one(&[
      &author.name, &author.email_address,
    ]).await?;
    Ok(author_from_row(&row))
  }

  async fn update_author(&self, author: &Author) -> Result<u64> {
    self.author.update_author.execute(&[
      &author.id, &author.name, &author.email_address,
    ]).await
  }

  async fn delete_author(&self, author_id: i32) -> Result<u64> {
    self.author.delete_author.execute(&[&author_id]).await
  }

  async fn author_stats(&self, author_id: i32) -> Result<AuthorStats> {
    let row = self.author.author_stats.query_one(&[&author_id]).await?;
    Ok(AuthorStats {
      articles_published: row.get(0),
      likes: row.get(1),
      bookmarks: row.get(2),
      views: row.get(3),
      comments: row.get(4),
      shares: row.get(5),
    })
  }
}
