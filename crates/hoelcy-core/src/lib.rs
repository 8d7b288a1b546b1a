pub mod api;
pub mod board;
pub mod category;
pub mod cli;
pub mod color;
pub mod commands;
pub mod config;
pub mod datetime;
pub mod filter;
pub mod priority;
pub mod project;
pub mod render;
pub mod settings;
pub mod store;
pub mod task;

use std::ffi::OsString;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting hoelcy CLI"
  );

  let data_dir =
    settings::resolve_data_dir(
      cli.data.as_deref()
    )
    .context(
      "failed to resolve data \
       directory"
    )?;

  let settings =
    settings::Settings::load(&data_dir)?;
  datetime::install_timezone(
    settings.timezone.as_deref()
  );
  debug!(loaded_from = ?settings.loaded_from, "settings ready");

  let store =
    store::FileStore::open(&data_dir)
      .with_context(|| {
        format!(
          "failed to open store at {}",
          data_dir.display()
        )
      })?;

  let renderer = render::Renderer::new(
    &settings,
    cli.no_color
  )?;
  let notifier: Arc<dyn api::Notifier> =
    Arc::new(render::ConsoleNotifier::new(
      settings.color_enabled()?
        && !cli.no_color
    ));
  let mut session = commands::Session {
    provider: config::ConfigProvider::new(
      store
    ),
    renderer,
    settings,
    notifier
  };

  let runtime =
    tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .context(
        "failed to start async runtime"
      )?;
  runtime.block_on(commands::dispatch(
    &mut session,
    cli.command
  ))?;

  info!("done");
  Ok(())
}
