use anyhow::anyhow;

use super::{
  Session,
  confirm,
  non_empty
};
use crate::cli::PriorityCommand;
use crate::priority::{
  CreatePriorityPayload,
  sort_priorities_by_level
};

pub(super) async fn run(
  session: &mut Session,
  command: PriorityCommand
) -> anyhow::Result<()> {
  match command {
    | PriorityCommand::List => {
      let Some(client) =
        session.configured_client()?
      else {
        return Ok(());
      };
      let priorities =
        sort_priorities_by_level(
          &client.fetch_priorities().await
        );
      if priorities.is_empty() {
        return session
          .renderer
          .print_empty_state(
            "No priorities found",
            "Create one with `hoelcy \
             priorities add NAME --level N`"
          );
      }
      session
        .renderer
        .print_priority_table(&priorities)
    }
    | PriorityCommand::Add {
      name,
      level,
      color
    } => {
      if level == 0 {
        return Err(anyhow!(
          "priority level must not be 0"
        ));
      }
      let payload = CreatePriorityPayload {
        name: non_empty(
          &name,
          "priority name"
        )?,
        color: color.trim().to_string(),
        level
      };
      let Some(client) =
        session.configured_client()?
      else {
        return Ok(());
      };
      if let Some(created) = client
        .create_priority(&payload)
        .await
      {
        println!(
          "Created priority {}.",
          created.id
        );
      }
      Ok(())
    }
    | PriorityCommand::Delete { id, yes } => {
      let Some(client) =
        session.configured_client()?
      else {
        return Ok(());
      };
      if !confirm(
        &format!(
          "Are you sure you want to \
           delete priority {id}?"
        ),
        yes
      )? {
        return Ok(());
      }
      if client
        .delete_priority(id)
        .await
      {
        println!("Deleted priority {id}.");
      }
      Ok(())
    }
  }
}
