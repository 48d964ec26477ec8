use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnNote {
  /// Generated by the db (serial ids, defaulted dates), never inserted.
  Generated,
  None,
}

#[derive(Debug, Clone)]
pub struct ColumnMapper {
  pub name: String,
  pub note: ColumnNote,
}

pub fn column(name: &'static str) -> ColumnMapper {
  ColumnMapper {
    name: name.to_string(),
    note: ColumnNote::None,
  }
}

pub fn generated(name: &'static str) -> ColumnMapper {
  ColumnMapper {
    name: name.to_string(),
    note: ColumnNote::Generated,
  }
}

#[derive(Debug, Default, Clone)]
pub struct ColumnMappers {
  pub table_name: &'static str,
  pub columns: Vec<ColumnMapper>,
}

impl ColumnMappers {
  /// Comma separated column list, each prefixed with `alias.` when given.
  pub fn get_columns(&self, alias: Option<&str>) -> String {
    self.columns.iter().map(|col| {
      match alias {
        Some(alias) => format!("{}.{}", alias, col.name),
        None => col.name.clone(),
      }
    }).collect::<Vec<String>>().join(", ")
  }

  pub fn build_select_query(&self) -> String {
    format!("SELECT {} FROM {}", self.get_columns(None), self.table_name)
  }

  /// INSERT of all non generated columns, returning the full row.
  pub fn build_insert_query(&self) -> String {
    let mut buf = String::new();
    let mut values = Vec::new();
    let _ = write!(buf, "INSERT INTO {}(", self.table_name);
    for col in self.columns.iter().filter(|col| col.note != ColumnNote::Generated) {
      if !values.is_empty() {
        buf.push_str(", ");
      }
      values.push(format!("${}", values.len() + 1));
      buf.push_str(&col.name);
    }
    let _ = write!(buf, ") VALUES({}) RETURNING {}", values.join(", "), self.get_columns(None));
    buf
  }
}
