use async_trait::async_trait;

use tokio_postgres::Row;

use crate::error::*;
use crate::models::*;

use crate::db::*;
use crate::db::util::*;

/// Statements of one interaction table (likes, bookmarks, views, shares).
#[derive(Clone)]
pub struct InteractionStatements {
  pub(crate) find: VersionedStatement,
  pub(crate) store: VersionedStatement,
  pub(crate) delete: VersionedStatement,
  pub(crate) by_article: VersionedStatement,
  pub(crate) by_article_author: VersionedStatement,
  pub(crate) articles_by_author: VersionedStatement,
}

#[derive(Clone)]
pub struct InteractionService {
  like: InteractionStatements,
  bookmark: InteractionStatements,
  view: InteractionStatements,
  share: InteractionStatements,

  store_report: VersionedStatement,
}

fn interaction_columns(table_name: &'static str) -> ColumnMappers {
  ColumnMappers {
    table_name,
    columns: vec![
      generated("id"),
      column("author_id"),
      column("article_id"),
      generated("date"),
    ],
  }
}

lazy_static! {
  static ref REPORT_COLUMNS: ColumnMappers = {
    ColumnMappers {
      table_name: "reports",
      columns: vec![
        generated("id"),
        column("author_id"),
        column("article_id"),
        column("reason"),
        generated("date"),
      ],
    }
  };
}

fn interaction_from_row(row: &Row) -> Interaction {
  Interaction {
    id: row.get(0),
    author_id: row.get(1),
    article_id: row.get(2),
    date: row.get(3),
  }
}

fn report_from_row(row: &Row) -> Report {
  Report {
    id: row.get(0),
    author_id: row.get(1),
    article_id: row.get(2),
    reason: row.get(3),
    date: row.get(4),
  }
}

impl InteractionStatements {
  fn new(cl: &SharedClient, kind: InteractionKind) -> Self {
    let columns = interaction_columns(kind.table_name());
    let select = columns.build_select_query();
    let table = kind.table_name();
    InteractionStatements {
      find: VersionedStatement::new(cl.clone(),
          &format!(r#"{} WHERE author_id = $1 AND article_id = $2 ORDER BY id LIMIT 1"#, select)),
      store: VersionedStatement::new(cl.clone(), &columns.build_insert_query()),
      delete: VersionedStatement::new(cl.clone(),
          &format!(r#"DELETE FROM {} WHERE id = $1"#, table)),
      by_article: VersionedStatement::new(cl.clone(),
          &format!(r#"{} WHERE article_id = $1 ORDER BY id"#, select)),
      by_article_author: VersionedStatement::new(cl.clone(),
          &format!(r#"{} WHERE article_id = $1 AND author_id = $2 ORDER BY id"#, select)),
      articles_by_author: VersionedStatement::new(cl.clone(),
          &format!(r#"{} WHERE id IN (SELECT article_id FROM {} WHERE author_id = $1)
          ORDER BY id"#, ARTICLE_COLUMNS.build_select_query(), table)),
    }
  }

  async fn prepare(&self) -> Result<()> {
    self.find.prepare().await?;
    self.store.prepare().await?;
    self.delete.prepare().await?;
    self.by_article.prepare().await?;
    self.by_article_author.prepare().await?;
    self.articles_by_author.prepare().await?;
    Ok(())
  }
}

impl InteractionService {
  pub fn new(cl: SharedClient) -> InteractionService {
    InteractionService {
      like: InteractionStatements::new(&cl, InteractionKind::Like),
      bookmark: InteractionStatements::new(&cl, InteractionKind::Bookmark),
      view: InteractionStatements::new(&cl, InteractionKind::View),
      share: InteractionStatements::new(&cl, InteractionKind::Share),

      store_report: VersionedStatement::new(cl, &REPORT_COLUMNS.build_insert_query()),
    }
  }

  pub fn statements(&self, kind: InteractionKind) -> &InteractionStatements {
    match kind {
      InteractionKind::Like => &self.like,
      InteractionKind::Bookmark => &self.bookmark,
      InteractionKind::View => &self.view,
      InteractionKind::Share => &self.share,
    }
  }

  pub async fn prepare(&self) -> Result<()> {
    for kind in InteractionKind::ALL.iter() {
      self.statements(*kind).prepare().await?;
    }
    self.store_report.prepare().await?;
    Ok(())
  }
}

#[async_trait(?Send)]
impl InteractionRepo for DbService {
  async fn find_interaction(&self, kind: InteractionKind, author_id: i32, article_id: i32) -> Result<Option<Interaction>> {
    let row = self.interaction.statements(kind).find.query_opt(&[&author_id, &article_id]).await?;
    Ok(row.as_ref().map(interaction_from_row))
  }

  async fn store_interaction(&self, kind: InteractionKind, author_id: i32, article_id: i32) -> Result<Interaction> {
    let row = self.interaction.statements(kind).store.query_one(&[&author_id, &article_id]).await?;
    Ok(interaction_from_row(&row))
  }

  async fn delete_interaction(&self, kind: InteractionKind, interaction_id: i32) -> Result<u64> {
    self.interaction.statements(kind).delete.execute(&[&interaction_id]).await
  }

  async fn article_interactions(&self, kind: InteractionKind, article_id: i32, author_id: Option<i32>) -> Result<Vec<Interaction>> {
    let statements = self.interaction.statements(kind);
    let rows = match author_id {
      Some(author_id) => statements.by_article_author.query(&[&article_id, &author_id]).await?,
      None => statements.by_article.query(&[&article_id]).await?,
    };
    Ok(rows.iter().map(interaction_from_row).collect())
  }

  async fn store_report(&self, report: &NewReport) -> Result<Report> {
    let row = self.interaction.store_report.query_one(&[
      &report.author_id, &report.article_id, &report.reason,
    ]).await?;
    Ok(report_from_row(&row))
  }
}
