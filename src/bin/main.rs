use dotenv::dotenv;

use clap::{Arg, Command};

use blog_api::{app::*, error::*};

fn cli() -> Command {
  Command::new("blog-api")
    .version(clap::crate_version!())
    .about("Blogging backend: authors, articles, comments and interactions.")
    .arg(
      Arg::new("config")
        .short('c')
        .long("config")
        .value_name("FILE")
        .help("Sets a custom config file")
    )
    .subcommand(Command::new("serve").about("Run the http servers (default)"))
    .subcommand(Command::new("migrate").about("Create the database tables"))
}

fn main() -> Result<()> {
  dotenv().ok();
  env_logger::init();

  let cli = cli().get_matches();

  let config = AppConfig::new_clap(&cli)?;

  match cli.subcommand_name() {
    Some("migrate") => migrate::execute(config)?,
    // default to 'serve' command.
    _ => serve::execute(config)?,
  }
  log::info!("Main finished");
  Ok(())
}
