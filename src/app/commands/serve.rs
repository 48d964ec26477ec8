use log::*;

use std::thread;
use futures::executor;

use crossbeam_channel::{
  bounded, unbounded, Sender, Receiver,
};

use actix_cors::Cors;
use actix_rt::System;
use actix_web::{get, web, middleware, HttpResponse, App, HttpServer};

use crate::{
  error::*,
  app::*,
  db::{Backend, DbService},
  services::config_services,
};

#[derive(Debug)]
enum Signal {
  /// Shut every server down.
  Shutdown,
  /// Stop one server.
  Stop,
  /// A server thread has finished.
  Stopped(u32),
}

fn send_signal(tx: &Sender<Signal>, signal: Signal) {
  if let Err(err) = tx.send(signal) {
    error!("Failed to send {:?}", err.0);
  }
}

/// Handed to a server thread: receives its stop signal and reports back.
#[derive(Clone)]
struct ServerLink {
  id: u32,
  supervisor: Sender<Signal>,
  stop: Receiver<Signal>,
}

impl ServerLink {
  fn wait_stop(&self) -> Result<Signal> {
    Ok(self.stop.recv()?)
  }

  fn stopped(&self) {
    debug!("Server({}) finished.", self.id);
    send_signal(&self.supervisor, Signal::Stopped(self.id));
  }

  fn request_shutdown(&self) {
    info!("Server({}) requests shutdown of all servers.", self.id);
    send_signal(&self.supervisor, Signal::Shutdown);
  }
}

#[get("/stop")]
async fn stop_server(link: web::Data<ServerLink>) -> HttpResponse {
  link.request_shutdown();
  HttpResponse::Ok().body("Shutting down.")
}

/// Main thread side: tracks running servers until all of them are gone.
struct Supervisor {
  tx: Sender<Signal>,
  rx: Receiver<Signal>,
  stops: Vec<Sender<Signal>>,
}

impl Supervisor {
  fn new() -> Self {
    let (tx, rx) = unbounded();
    Self { tx, rx, stops: Vec::new() }
  }

  fn link(&mut self) -> ServerLink {
    let (stop_tx, stop_rx) = bounded(1);
    let id = self.stops.len() as u32;
    self.stops.push(stop_tx);
    ServerLink {
      id,
      supervisor: self.tx.clone(),
      stop: stop_rx,
    }
  }

  fn stop_all(&self) {
    for stop in self.stops.iter() {
      send_signal(stop, Signal::Stop);
    }
  }

  fn run(&self) {
    let mut running = self.stops.len();
    let mut stopping = false;
    while running > 0 {
      match self.rx.recv() {
        Ok(Signal::Shutdown) if !stopping => {
          info!("Shutdown requested, stopping {} server(s).", running);
          stopping = true;
          self.stop_all();
        },
        Ok(Signal::Stopped(id)) => {
          running -= 1;
          debug!("Server({}) stopped, {} remaining.", id, running);
        },
        Ok(signal) => {
          debug!("Supervisor ignoring {:?}", signal);
        },
        Err(err) => {
          error!("Supervisor channel closed: {}", err);
          return;
        },
      }
    }
    info!("All servers stopped.");
  }
}

/// Listener settings of one `[server]` table.
struct Listener {
  listen: String,
  workers: usize,
  backlog: Option<u32>,
  stopper: bool,
  access_log: bool,
}

impl Listener {
  fn from_config(config: &AppConfig, prefix: &str) -> Result<Self> {
    let key = |name: &str| format!("{}.{}", prefix, name);
    let workers = match config.get_int(&key("workers"))? {
      Some(workers) if workers > 0 => workers as usize,
      Some(workers) => {
        return Err(Error::InvalidConfig(format!("{} must be > 0, got {}", key("workers"), workers)));
      },
      None => num_cpus::get(),
    };
    Ok(Self {
      listen: config.require_str(&key("listen"))?,
      workers,
      backlog: config.get_int(&key("backlog"))?.map(|b| b.max(1) as u32),
      stopper: config.get_bool(&key("stopper"))?.unwrap_or_default(),
      access_log: config.get_bool(&key("access_log"))?.unwrap_or(true),
    })
  }
}

pub fn execute(config: AppConfig) -> Result<()> {
  let mut supervisor = Supervisor::new();

  let servers = config.get_array("servers")?
    .ok_or_else(|| Error::InvalidConfig("missing list of servers".to_string()))?;
  for server in servers.into_iter() {
    let cfg = config.clone();
    let link = supervisor.link();
    debug!("Spawn server: {}", server);
    thread::spawn(move || {
      if let Err(err) = run_server(&cfg, &server, link.clone()) {
        error!("Error from server({}): {:?}", server, err);
      }
      link.stopped();
    });
  }

  supervisor.run();
  Ok(())
}

async fn check_statements(url: String) -> Result<()> {
  DbService::new(&url).prepare().await
}

fn run_server(config: &AppConfig, prefix: &str, link: ServerLink) -> Result<()> {
  let sys = System::new();
  let listener = Listener::from_config(config, prefix)?;

  info!("Configure services of {}", prefix);
  let services = config_services(config, prefix)?;

  if config.get_bool("debug")?.unwrap_or(false) {
    if let Backend::Postgres(url) = Backend::from_config(config)? {
      sys.block_on(check_statements(url))?;
    }
  }

  let stop_link = if listener.stopper { Some(link.clone()) } else { None };
  let access_log = listener.access_log;
  let mut server = HttpServer::new(move || {
    let mut app = App::new()
      .wrap(middleware::Compress::default())
      .wrap(Cors::permissive())
      .wrap(middleware::Condition::new(access_log, middleware::Logger::default()))
      .configure(|web| services.web_config(web));

    if let Some(link) = &stop_link {
      app = app.app_data(web::Data::new(link.clone()))
        .service(stop_server);
    }
    app
  }).workers(listener.workers);

  if let Some(backlog) = listener.backlog {
    server = server.backlog(backlog);
  }
  info!("{}: listening on {} with {} workers", prefix, listener.listen, listener.workers);
  let server = server.bind(&listener.listen)?.run();

  let handle = server.handle();
  thread::spawn(move || {
    match link.wait_stop() {
      Ok(Signal::Stop) => {
        debug!("Stopping server({})", link.id);
        executor::block_on(handle.stop(true));
      },
      Ok(signal) => error!("Server({}) got unexpected {:?}", link.id, signal),
      Err(_) => (),
    }
  });

  Ok(sys.block_on(server)?)
}
