use anyhow::Context;

use super::Session;
use crate::cli::ConfigCommand;
use crate::config::default_config;

pub(super) fn run(
  session: &mut Session,
  command: ConfigCommand
) -> anyhow::Result<()> {
  match command {
    | ConfigCommand::Show => {
      match session.provider.get_config() {
        | Some(config) => {
          session
            .renderer
            .print_config(&config)
        }
        | None => {
          session.renderer.print_empty_state(
            super::CONFIG_REQUIRED_TITLE,
            super::CONFIG_REQUIRED_DESCRIPTION
          )
        }
      }
    }
    | ConfigCommand::Set { pairs } => {
      let mut config = session
        .provider
        .get_config()
        .unwrap_or_else(default_config);
      for pair in pairs {
        config
          .set_endpoint(&pair.key, pair.value)?;
      }
      session
        .provider
        .save_config(&config)
        .context(
          "endpoint configuration was not \
           saved"
        )?;
      println!(
        "Saved endpoint configuration to \
         {}.",
        session
          .provider
          .store()
          .path_for(
            crate::config::CONFIG_KEY
          )
          .display()
      );
      Ok(())
    }
    | ConfigCommand::Clear => {
      session.provider.clear_config()?;
      println!(
        "Cleared endpoint configuration."
      );
      Ok(())
    }
    | ConfigCommand::Default => {
      session
        .renderer
        .print_config(&default_config())
    }
  }
}
