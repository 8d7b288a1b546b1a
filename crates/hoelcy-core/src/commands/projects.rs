use anyhow::anyhow;

use super::{
  Session,
  confirm,
  non_empty
};
use crate::api::Resource;
use crate::cli::ProjectCommand;
use crate::datetime::project_now;
use crate::project::{
  CreateCodingProjectPayload,
  UpdateCodingProjectPayload,
  filter_projects_by_branch,
  sort_projects_by_date,
  validate_unique_name
};

pub(super) async fn run(
  session: &mut Session,
  command: ProjectCommand
) -> anyhow::Result<()> {
  match command {
    | ProjectCommand::List { branch } => {
      let Some(client) =
        session.configured_client()?
      else {
        return Ok(());
      };
      if !client
        .has_endpoint(Resource::CodingProjects)
      {
        return session
          .renderer
          .print_empty_state(
            "Coding projects not configured",
            "Set one with `hoelcy config \
             set coding-projects=URL`"
          );
      }

      let mut projects = sort_projects_by_date(
        &client.fetch_coding_projects().await
      );
      if let Some(branch) = branch {
        projects = filter_projects_by_branch(
          &projects, &branch
        );
      }
      if projects.is_empty() {
        return session
          .renderer
          .print_empty_state(
            "No coding projects found",
            "Create one with `hoelcy \
             projects add`"
          );
      }
      session.renderer.print_project_table(
        &projects,
        &project_now()
      )
    }
    | ProjectCommand::Add {
      name,
      repository,
      branch
    } => {
      let Some(client) =
        session.configured_client()?
      else {
        return Ok(());
      };
      let name =
        non_empty(&name, "project name")?;
      let existing =
        client.fetch_coding_projects().await;
      if !validate_unique_name(
        &name, &existing, None
      ) {
        return Err(anyhow!(
          "a coding project named \
           \"{name}\" already exists"
        ));
      }

      let payload =
        CreateCodingProjectPayload {
          name,
          repository_url: non_empty(
            &repository,
            "repository URL"
          )?,
          branch_name: non_empty(
            &branch,
            "branch name"
          )?
        };
      if let Some(created) = client
        .create_coding_project(&payload)
        .await
      {
        println!(
          "Created coding project {}.",
          created.id
        );
      }
      Ok(())
    }
    | ProjectCommand::Edit {
      id,
      name,
      repository,
      branch
    } => {
      let Some(client) =
        session.configured_client()?
      else {
        return Ok(());
      };
      let name = name
        .map(|n| {
          non_empty(&n, "project name")
        })
        .transpose()?;
      if let Some(name) = &name {
        let existing =
          client.fetch_coding_projects().await;
        if !validate_unique_name(
          name,
          &existing,
          Some(id)
        ) {
          return Err(anyhow!(
            "a coding project named \
             \"{name}\" already exists"
          ));
        }
      }

      let payload =
        UpdateCodingProjectPayload {
          name,
          repository_url: repository
            .map(|r| r.trim().to_string()),
          branch_name: branch
            .map(|b| b.trim().to_string())
        };
      if payload
        == UpdateCodingProjectPayload::default()
      {
        return Err(anyhow!(
          "nothing to change for coding \
           project {id}"
        ));
      }
      if client
        .update_coding_project(id, &payload)
        .await
        .is_some()
      {
        println!(
          "Modified coding project {id}."
        );
      }
      Ok(())
    }
    | ProjectCommand::Delete { id, yes } => {
      let Some(client) =
        session.configured_client()?
      else {
        return Ok(());
      };
      if !confirm(
        &format!(
          "Are you sure you want to \
           delete coding project {id}?"
        ),
        yes
      )? {
        return Ok(());
      }
      if client
        .delete_coding_project(id)
        .await
      {
        println!(
          "Deleted coding project {id}."
        );
      }
      Ok(())
    }
  }
}
