use async_trait::async_trait;

use tokio_postgres::Row;

use crate::error::*;
use crate::models::*;

use crate::db::*;
use crate::db::util::*;

#[derive(Clone)]
pub struct CommentService {
  // get comment
  comment_by_id: VersionedStatement,

  // store comment
  store_comment: VersionedStatement,

  // delete comment
  delete_comment: VersionedStatement,

  // get multiple comments
  comments_by_article: VersionedStatement,
  comments_by_article_author: VersionedStatement,
}

lazy_static! {
  static ref COMMENT_COLUMNS: ColumnMappers = {
    ColumnMappers {
      table_name: "comments",
      columns: vec![
        generated("id"),
        column("author_id"),
        column("article_id"),
        column("comment"),
        generated("date"),
      ],
    }
  };
}

fn comment_from_row(row: &Row) -> Comment {
  Comment {
    id: row.get(0),
    author_id: row.get(1),
    article_id: row.get(2),
    comment: row.get(3),
    date: row.get(4),
  }
}

impl CommentService {
  pub fn new(cl: SharedClient) -> CommentService {
    let select = COMMENT_COLUMNS.build_select_query();
    CommentService {
      comment_by_id: VersionedStatement::new(cl.clone(),
          &format!(r#"{} WHERE id = $1"#, select)),

      store_comment: VersionedStatement::new(cl.clone(),
          &COMMENT_COLUMNS.build_insert_query()),

      delete_comment: VersionedStatement::new(cl.clone(),
          r#"DELETE FROM comments WHERE id = $1"#),

      comments_by_article: VersionedStatement::new(cl.clone(),
          &format!(r#"{} WHERE article_id = $1 ORDER BY id"#, select)),
      comments_by_article_author: VersionedStatement::new(cl,
          &format!(r#"{} WHERE article_id = $1 AND author_id = $2 ORDER BY id"#, select)),
    }
  }

  pub async fn prepare(&self) -> Result<()> {
    self.comment_by_id.prepare().await?;

    self.store_comment.prepare().await?;
    self.delete_comment.prepare().await?;

    self.comments_by_article.prepare().await?;
    self.comments_by_article_author.prepare().await?;

    Ok(())
  }
}

#[async_trait(?Send)]
impl CommentRepo for DbService {
  async fn comment_by_id(&self, comment_id: i32) -> Result<Option<Comment>> {
    let row = self.comment.comment_by_id.query_opt(&[&comment_id]).await?;
    Ok(row.as_ref().map(comment_from_row))
  }

  async fn store_comment(&self, comment: &NewComment) -> Result<Comment> {
    let row = self.comment.store_comment.query_one(&[
      &comment.author_id, &comment.article_id, &comment.comment,
    ]).await?;
    Ok(comment_from_row(&row))
  }

  async fn delete_comment(&self, comment_id: i32) -> Result<u64> {
    self.comment.delete_comment.execute(&[&comment_id]).await
  }

  async fn article_comments(&self, article_id: i32, author_id: Option<i32>) -> Result<Vec<Comment>> {
    let rows = match author_id {
      Some(author_id) => {
        self.comment.comments_by_article_author.query(&[&article_id, &author_id]).await?
      },
      None => self.comment.comments_by_article.query(&[&article_id]).await?,
    };
    Ok(rows.iter().map(comment_from_row).collect())
  }
}
