mod categories;
mod endpoints;
mod priorities;
mod projects;
mod tasks;

use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Arc;

use anyhow::anyhow;
use tracing::{debug, instrument};

use crate::api::{Notifier, WebhookClient};
use crate::cli::{Command, TaskCommand, TaskListArgs};
use crate::config::ConfigProvider;
use crate::render::Renderer;
use crate::settings::Settings;
use crate::store::FileStore;

const CONFIG_REQUIRED_TITLE: &str = "Configuration Required";
const CONFIG_REQUIRED_DESCRIPTION: &str =
    "Please configure your n8n webhook endpoints to get started: hoelcy config set tasks=URL ...";

/// Everything one invocation needs: stored endpoints, output and toasts.
pub struct Session {
    pub provider: ConfigProvider<FileStore>,
    pub renderer: Renderer,
    pub settings: Settings,
    pub notifier: Arc<dyn Notifier>,
}

impl Session {
    /// Client bound to whatever endpoints are stored right now.
    fn client(&mut self) -> WebhookClient {
        WebhookClient::new(self.provider.get_config(), self.notifier.clone())
    }

    /// Prints the setup hint and returns `None` when nothing is configured.
    fn configured_client(&mut self) -> anyhow::Result<Option<WebhookClient>> {
        let client = self.client();
        if client.is_configured() {
            return Ok(Some(client));
        }
        self.renderer
            .print_empty_state(CONFIG_REQUIRED_TITLE, CONFIG_REQUIRED_DESCRIPTION)?;
        Ok(None)
    }
}

#[instrument(skip(session, command))]
pub async fn dispatch(session: &mut Session, command: Option<Command>) -> anyhow::Result<()> {
    let command =
        command.unwrap_or_else(|| Command::Tasks(TaskCommand::List(TaskListArgs::default())));
    debug!(?command, "dispatching command");

    match command {
        Command::Tasks(cmd) => tasks::run(session, cmd).await,
        Command::Categories(cmd) => categories::run(session, cmd).await,
        Command::Priorities(cmd) => priorities::run(session, cmd).await,
        Command::Projects(cmd) => projects::run(session, cmd).await,
        Command::Config(cmd) => endpoints::run(session, cmd),
    }
}

/// Asks on the terminal unless `--yes` was given. Without a terminal the
/// answer is no.
fn confirm(question: &str, assume_yes: bool) -> anyhow::Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(anyhow!("{question} Re-run with --yes to confirm."));
    }

    let mut out = io::stderr().lock();
    write!(out, "{question} [y/N] ")?;
    out.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Empty strings on the command line clear optional text fields.
fn optional_text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

fn non_empty(value: &str, what: &str) -> anyhow::Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("{what} cannot be empty"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{Session, confirm, dispatch, non_empty, optional_text};
    use crate::api::RecordingNotifier;
    use crate::cli::{CategoryCommand, Command, TaskCommand};
    use crate::config::ConfigProvider;
    use crate::render::Renderer;
    use crate::settings::Settings;
    use crate::store::FileStore;

    fn unconfigured_session(dir: &std::path::Path) -> (Session, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let settings = Settings::default();
        let session = Session {
            provider: ConfigProvider::new(FileStore::open(dir).expect("open store")),
            renderer: Renderer::new(&settings, true).expect("renderer"),
            settings,
            notifier: notifier.clone(),
        };
        (session, notifier)
    }

    #[test]
    fn yes_flag_skips_the_prompt() {
        assert!(confirm("Delete everything?", true).expect("confirm"));
    }

    #[test]
    fn text_helpers_trim() {
        assert_eq!(non_empty("  Work ", "name").expect("name"), "Work");
        assert!(non_empty("   ", "name").is_err());
        assert_eq!(optional_text(Some(" x ".to_string())), Some("x".to_string()));
        assert_eq!(optional_text(None), None);
    }

    #[tokio::test]
    async fn unconfigured_commands_stop_before_any_request() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut session, notifier) = unconfigured_session(dir.path());

        for command in [
            Command::Tasks(TaskCommand::Done { id: 1 }),
            Command::Tasks(TaskCommand::Describe { id: 1, text: "x".to_string() }),
            Command::Tasks(TaskCommand::Delete { id: 1, yes: false }),
            Command::Tasks(TaskCommand::Archive { id: 1, yes: false }),
            Command::Tasks(TaskCommand::Send { id: 1, yes: false }),
            Command::Categories(CategoryCommand::Delete { id: 1, yes: false }),
        ] {
            dispatch(&mut session, Some(command))
                .await
                .expect("empty state, not an error");
        }
        assert!(notifier.toasts().is_empty());
    }
}
