use anyhow::anyhow;

use super::{
  Session,
  confirm,
  non_empty,
  optional_text
};
use crate::category::{
  CreateCategoryPayload,
  UpdateCategoryPayload,
  category_stats,
  filter_categories,
  find_category,
  sort_categories_alphabetically
};
use crate::cli::CategoryCommand;
use crate::datetime::project_now;
use crate::render::category_markdown;

pub(super) async fn run(
  session: &mut Session,
  command: CategoryCommand
) -> anyhow::Result<()> {
  match command {
    | CategoryCommand::List {
      search,
      detail
    } => {
      list(
        session,
        search.as_deref().unwrap_or(""),
        detail
      )
      .await
    }
    | CategoryCommand::Add {
      name,
      description,
      repository,
      branch
    } => {
      let payload = CreateCategoryPayload {
        category:       non_empty(
          &name,
          "category name"
        )?,
        description:    optional_text(
          description
        ),
        repository_url: optional_text(
          repository
        ),
        branch_name:    optional_text(
          branch
        )
      };
      let Some(client) =
        session.configured_client()?
      else {
        return Ok(());
      };
      if let Some(created) = client
        .create_category(&payload)
        .await
      {
        println!(
          "Created category {}.",
          created.id
        );
      }
      Ok(())
    }
    | CategoryCommand::Edit {
      id,
      name,
      description,
      repository,
      branch
    } => {
      let payload = UpdateCategoryPayload {
        category:       name
          .map(|n| {
            non_empty(&n, "category name")
          })
          .transpose()?,
        description:    optional_text(
          description
        ),
        repository_url: optional_text(
          repository
        ),
        branch_name:    optional_text(
          branch
        )
      };
      if payload
        == UpdateCategoryPayload::default()
      {
        return Err(anyhow!(
          "nothing to change for category \
           {id}"
        ));
      }
      let Some(client) =
        session.configured_client()?
      else {
        return Ok(());
      };
      if client
        .update_category(id, &payload)
        .await
        .is_some()
      {
        println!("Modified category {id}.");
      }
      Ok(())
    }
    | CategoryCommand::Delete { id, yes } => {
      let Some(client) =
        session.configured_client()?
      else {
        return Ok(());
      };
      let question = format!(
        "Are you sure you want to delete \
         category {id}? Its tasks will \
         show as Unknown."
      );
      if !confirm(&question, yes)? {
        return Ok(());
      }
      if client
        .delete_category(id)
        .await
      {
        println!("Deleted category {id}.");
      }
      Ok(())
    }
    | CategoryCommand::Show { id } => {
      show(session, id).await
    }
  }
}

#[tracing::instrument(skip(session))]
async fn list(
  session: &mut Session,
  search: &str,
  detail: bool
) -> anyhow::Result<()> {
  let Some(client) =
    session.configured_client()?
  else {
    return Ok(());
  };

  let (categories, tasks) = tokio::join!(
    client.fetch_categories(),
    client.fetch_tasks()
  );
  let shown = sort_categories_alphabetically(
    &filter_categories(&categories, search)
  );

  let renderer = &session.renderer;
  if shown.is_empty() {
    return renderer.print_empty_state(
      "No categories found",
      "Create a new category with `hoelcy \
       categories add`"
    );
  }

  if detail {
    let now = project_now();
    for category in &shown {
      let stats =
        category_stats(category.id, &tasks);
      renderer.print_markdown(
        &category_markdown(
          category, &stats, &now
        )
      )?;
      renderer.print_markdown("")?;
    }
    return Ok(());
  }

  renderer
    .print_category_table(&shown, &tasks)
}

async fn show(
  session: &mut Session,
  id: i64
) -> anyhow::Result<()> {
  let Some(client) =
    session.configured_client()?
  else {
    return Ok(());
  };

  let (categories, tasks) = tokio::join!(
    client.fetch_categories(),
    client.fetch_tasks()
  );
  let category =
    find_category(&categories, id)
      .ok_or_else(|| {
        anyhow!("no category with id {id}")
      })?;
  let stats = category_stats(id, &tasks);
  session.renderer.print_markdown(
    &category_markdown(
      category,
      &stats,
      &project_now()
    )
  )
}
