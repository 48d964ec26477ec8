use log::*;

use std::rc::Rc;
use std::cell::RefCell;
use std::time::Duration;

use tokio::time::sleep;

use tokio_postgres::{
  connect, Client, Statement, Row, NoTls,
  error::SqlState,
  types::ToSql,
};

use crate::error::*;

const MAX_RETRIES: u32 = 10;
const RETRY_DELAY: Duration = Duration::from_millis(100);
const RECONNECT_DELAY: Duration = Duration::from_millis(500);

/// A connected client tagged with its connection generation.
pub type RefClient = Rc<(u64, Client)>;

/// Client connected state
#[derive(Clone)]
enum ClientState {
  Connecting(u64),
  Connected(RefClient),
}

/// A postgres connection shared by all statements of one worker.
///
/// A background task keeps the connection open; every reconnect bumps the
/// generation so statements prepared on an old connection get re-prepared.
#[derive(Clone)]
pub struct SharedClient {
  state: Rc<RefCell<ClientState>>,
}

impl SharedClient {
  pub fn new(url: &str) -> Self {
    let shared_cl = Self {
      state: Rc::new(RefCell::new(ClientState::Connecting(0))),
    };
    let task_cl = shared_cl.clone();
    let url = url.to_string();
    actix_rt::spawn(async move {
      task_cl.run(url).await;
      debug!("client background task stopped.");
    });
    shared_cl
  }

  async fn run(&self, url: String) {
    let mut generation = 0;
    loop {
      generation += 1;
      self.set_state(ClientState::Connecting(generation));
      let (cl, conn) = loop {
        match connect(&url, NoTls).await {
          Ok(res) => break res,
          Err(e) => {
            debug!("client task: gen={}: connect error: {}", generation, e);
            sleep(RECONNECT_DELAY).await;
          },
        }
      };
      debug!("client task: gen={}: connected.", generation);
      self.set_state(ClientState::Connected(Rc::new((generation, cl))));

      // Drive the connection until it closes.
      match conn.await {
        Err(e) => debug!("tokio-postgres connection error: {}", e),
        Ok(()) => {
          debug!("tokio-postgres connection closed.");
          return;
        },
      }
      sleep(RECONNECT_DELAY).await;
    }
  }

  /// Wait (bounded) for a connected client.
  pub async fn get_client(&self) -> Result<RefClient> {
    for _ in 0..MAX_RETRIES {
      let state = self.state.borrow().clone();
      match state {
        ClientState::Connected(cl) => return Ok(cl),
        ClientState::Connecting(generation) => {
          debug!("get_client: gen={}: connecting..", generation);
          sleep(RETRY_DELAY).await;
        },
      }
    }
    Err(Error::DisconnectedError("Failed to connect to database".to_string()))
  }

  /// Is `generation` still the live connection?
  pub fn is_current(&self, generation: u64) -> bool {
    match *self.state.borrow() {
      ClientState::Connected(ref cl) => cl.0 == generation,
      _ => false,
    }
  }

  fn set_state(&self, state: ClientState) {
    self.state.replace(state);
  }
}

struct PreparedStatement {
  cl: RefClient,
  statement: Statement,
}

#[derive(Clone)]
enum StatementState {
  Unprepared,
  Preparing,
  Prepared(Rc<PreparedStatement>),
}

/// A query that is prepared on first use and re-prepared after reconnects.
#[derive(Clone)]
pub struct VersionedStatement {
  shared_cl: SharedClient,
  state: Rc<RefCell<StatementState>>,
  query: String,
}

macro_rules! impl_client_method {
  ($method:ident, $res_ty:ty) => {
    pub async fn $method(&self, params: &[&(dyn ToSql + Sync)]) -> Result<$res_ty> {
      let mut retries = 0;
      loop {
        let prepared = self.get_statement().await?;
        match prepared.cl.1.$method(&prepared.statement, params).await {
          Ok(res) => return Ok(res),
          Err(err) if err.is_closed() => {
            retries += 1;
            if retries >= MAX_RETRIES {
              return Err(Error::DisconnectedError(
                "Failed to connect to database".to_string()));
            }
            info!("DB connection closed, retry query.");
            sleep(RETRY_DELAY).await;
          },
          Err(err) => return Err(db_error(err, &self.query)),
        }
      }
    }
  };
}

impl VersionedStatement {
  pub fn new(shared_cl: SharedClient, query: &str) -> Self {
    Self {
      shared_cl,
      state: Rc::new(RefCell::new(StatementState::Unprepared)),
      query: query.to_string(),
    }
  }

  pub async fn prepare(&self) -> Result<()> {
    self.get_statement().await?;
    Ok(())
  }

  async fn get_statement(&self) -> Result<Rc<PreparedStatement>> {
    for _ in 0..MAX_RETRIES {
      let state = self.state.borrow().clone();
      match state {
        StatementState::Prepared(prepared) => {
          if self.shared_cl.is_current(prepared.cl.0) {
            return Ok(prepared);
          }
          debug!("get_statement: gen={}: stale, re-prepare", prepared.cl.0);
          self.state.replace(StatementState::Unprepared);
        },
        StatementState::Preparing => {
          // another task is preparing it.
          sleep(RETRY_DELAY).await;
        },
        StatementState::Unprepared => {
          self.state.replace(StatementState::Preparing);
          let cl = match self.shared_cl.get_client().await {
            Ok(cl) => cl,
            Err(err) => {
              self.state.replace(StatementState::Unprepared);
              return Err(err);
            },
          };
          match cl.1.prepare(&self.query).await {
            Ok(statement) => {
              debug!("get_statement: gen={}: prepared.", cl.0);
              let prepared = Rc::new(PreparedStatement { cl, statement });
              self.state.replace(StatementState::Prepared(prepared.clone()));
              return Ok(prepared);
            },
            Err(err) => {
              self.state.replace(StatementState::Unprepared);
              if !err.is_closed() {
                return Err(db_error(err, &self.query));
              }
            },
          }
        },
      }
    }
    Err(Error::DisconnectedError("Failed to connect to database".to_string()))
  }

  impl_client_method!(query, Vec<Row>);
  impl_client_method!(query_one, Row);
  impl_client_method!(query_opt, Option<Row>);
  impl_client_method!(execute, u64);
}

/// Constraint violations are caused by the request, anything else is ours.
fn db_error(err: tokio_postgres::Error, query: &str) -> Error {
  match err.code() {
    Some(code) if *code == SqlState::FOREIGN_KEY_VIOLATION => {
      debug!("Foreign key violation: {:?}", err);
      Error::Invalid("The referenced author or article does not exist.".to_string())
    },
    Some(code) if *code == SqlState::UNIQUE_VIOLATION => {
      debug!("Unique violation: {:?}", err);
      Error::Invalid("That record already exists.".to_string())
    },
    _ => {
      error!("Postgres error: {}, query=[[{}]]", err, query);
      err.into()
    },
  }
}

/// Open a one-off connection, e.g. for the migrate command.
pub async fn connect_once(url: &str) -> Result<Client> {
  let (cl, conn) = connect(url, NoTls).await?;
  actix_rt::spawn(async move {
    if let Err(e) = conn.await {
      error!("tokio-postgres connection error: {}", e);
    }
  });
  Ok(cl)
}
