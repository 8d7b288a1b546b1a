use anyhow::anyhow;
use tracing::info;

use super::{
  Session,
  confirm,
  non_empty
};
use crate::board::Board;
use crate::category::category_name;
use crate::cli::{
  TaskCommand,
  TaskListArgs
};
use crate::datetime::{
  parse_due_input,
  project_now
};
use crate::filter::{
  CategorySelection,
  TaskQuery
};
use crate::priority::lowest_priority;
use crate::render::task_markdown;
use crate::task::{
  CreateTaskPayload,
  UpdateTaskPayload
};

pub(super) async fn run(
  session: &mut Session,
  command: TaskCommand
) -> anyhow::Result<()> {
  match command {
    | TaskCommand::List(args) => {
      list(session, args).await
    }
    | TaskCommand::Add {
      name,
      category,
      due,
      priority,
      description
    } => {
      add(
        session,
        &name,
        category,
        &due,
        priority,
        description
      )
      .await
    }
    | TaskCommand::Edit {
      id,
      name,
      category,
      due,
      priority
    } => {
      edit(
        session, id, name, category, due,
        priority
      )
      .await
    }
    | TaskCommand::Done { id } => {
      toggle_done(session, id).await
    }
    | TaskCommand::Archive { id, yes } => {
      toggle_archived(session, id, yes)
        .await
    }
    | TaskCommand::Delete { id, yes } => {
      delete(session, id, yes).await
    }
    | TaskCommand::Describe { id, text } => {
      describe(session, id, text).await
    }
    | TaskCommand::Show { id } => {
      show(session, id).await
    }
    | TaskCommand::Send { id, yes } => {
      send(session, id, yes).await
    }
  }
}

#[tracing::instrument(skip(session))]
async fn list(
  session: &mut Session,
  args: TaskListArgs
) -> anyhow::Result<()> {
  let Some(client) =
    session.configured_client()?
  else {
    return Ok(());
  };

  let board = Board::load(&client).await;
  let now = project_now();
  let query = TaskQuery {
    category:       args
      .category
      .as_deref()
      .map(CategorySelection::parse)
      .unwrap_or_default(),
    show_archived:  args.archived,
    due_today_only: args.due_today,
    search:         args
      .search
      .unwrap_or_default()
  };
  let sort = args
    .sort
    .unwrap_or(
      session.settings.default_sort
    );
  let tasks =
    board.visible_tasks(&query, sort, &now);
  info!(
    shown = tasks.len(),
    sort = sort.label(),
    "listing tasks"
  );

  let renderer = &session.renderer;
  renderer.print_category_counts(&board)?;

  if tasks.is_empty() {
    return if query.show_archived {
      renderer.print_empty_state(
        "No tasks found",
        "Create a new task with `hoelcy \
         tasks add`"
      )
    } else {
      renderer.print_empty_state(
        "No active tasks",
        "All tasks completed! Create a \
         new task with `hoelcy tasks \
         add` or show archived with \
         --archived"
      )
    };
  }

  if args.detail {
    for task in &tasks {
      renderer.print_markdown(
        &task_markdown(
          task,
          category_name(
            task,
            &board.categories
          ),
          &board.priorities,
          &now
        )
      )?;
      renderer.print_markdown("")?;
    }
    return Ok(());
  }

  renderer
    .print_task_table(&board, &tasks, &now)
}

#[tracing::instrument(skip(
  session,
  description
))]
async fn add(
  session: &mut Session,
  name: &str,
  category_id: i64,
  due: &str,
  priority: Option<i64>,
  description: Option<String>
) -> anyhow::Result<()> {
  let task = non_empty(name, "task name")?;
  let due =
    parse_due_input(due, &project_now())?;
  let Some(client) =
    session.configured_client()?
  else {
    return Ok(());
  };

  let priority_id = match priority {
    | Some(id) => id,
    | None => {
      lowest_priority(
        &client.fetch_priorities().await
      )
      .id
    }
  };

  let payload = CreateTaskPayload {
    task,
    due,
    category_id,
    priority_id,
    description: description
      .map(|d| d.trim().to_string())
      .filter(|d| !d.is_empty())
  };
  if let Some(created) =
    client.create_task(&payload).await
  {
    println!(
      "Created task {}.",
      created.id
    );
  }
  Ok(())
}

#[tracing::instrument(skip(session))]
async fn edit(
  session: &mut Session,
  id: i64,
  name: Option<String>,
  category_id: Option<i64>,
  due: Option<String>,
  priority_id: Option<i64>
) -> anyhow::Result<()> {
  let task = name
    .map(|n| non_empty(&n, "task name"))
    .transpose()?;
  let due = due
    .map(|d| {
      parse_due_input(&d, &project_now())
    })
    .transpose()?;
  let payload = UpdateTaskPayload {
    task,
    due,
    category_id,
    priority_id,
    ..UpdateTaskPayload::default()
  };
  if payload.is_empty() {
    return Err(anyhow!(
      "nothing to change for task {id}"
    ));
  }

  let Some(client) =
    session.configured_client()?
  else {
    return Ok(());
  };
  if client
    .update_task(id, &payload)
    .await
    .is_some()
  {
    println!("Modified task {id}.");
  }
  Ok(())
}

async fn toggle_done(
  session: &mut Session,
  id: i64
) -> anyhow::Result<()> {
  let Some(client) =
    session.configured_client()?
  else {
    return Ok(());
  };
  let mut board =
    Board::load(&client).await;
  if board.toggle_done(&client, id).await?
  {
    let state = if board.task(id)?.done {
      "done"
    } else {
      "open"
    };
    println!("Task {id} is now {state}.");
  }
  Ok(())
}

async fn toggle_archived(
  session: &mut Session,
  id: i64,
  yes: bool
) -> anyhow::Result<()> {
  let Some(client) =
    session.configured_client()?
  else {
    return Ok(());
  };
  let mut board =
    Board::load(&client).await;
  let task = board.task(id)?;
  let verb = if task.archived {
    "unarchive"
  } else {
    "archive"
  };
  let question = format!(
    "Are you sure you want to {verb} \
     \"{}\"?",
    task.task
  );
  if !confirm(&question, yes)? {
    return Ok(());
  }

  if board
    .toggle_archived(&client, id)
    .await?
  {
    println!("Task {id} {verb}d.");
  }
  Ok(())
}

async fn delete(
  session: &mut Session,
  id: i64,
  yes: bool
) -> anyhow::Result<()> {
  let Some(client) =
    session.configured_client()?
  else {
    return Ok(());
  };
  let mut board =
    Board::load(&client).await;
  let question = format!(
    "Are you sure you want to delete \
     \"{}\"?",
    board.task(id)?.task
  );
  if !confirm(&question, yes)? {
    return Ok(());
  }

  if board.delete_task(&client, id).await?
  {
    println!("Deleted task {id}.");
  }
  Ok(())
}

async fn describe(
  session: &mut Session,
  id: i64,
  text: String
) -> anyhow::Result<()> {
  let Some(client) =
    session.configured_client()?
  else {
    return Ok(());
  };
  let mut board =
    Board::load(&client).await;
  if board
    .update_description(
      &client,
      id,
      text.trim().to_string()
    )
    .await?
  {
    println!(
      "Updated description of task {id}."
    );
  }
  Ok(())
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
  let board = Board::load(&client).await;
  let task = board.task(id)?;
  session.renderer.print_markdown(
    &task_markdown(
      task,
      category_name(
        task,
        &board.categories
      ),
      &board.priorities,
      &project_now()
    )
  )
}

async fn send(
  session: &mut Session,
  id: i64,
  yes: bool
) -> anyhow::Result<()> {
  let Some(client) =
    session.configured_client()?
  else {
    return Ok(());
  };
  let board = Board::load(&client).await;
  let question = format!(
    "This will send task \"{}\" to the \
     coding agent. This operation may \
     incur costs. Are you sure you want \
     to continue?",
    board.task(id)?.task
  );
  if !board
    .can_send_to_agent(board.task(id)?)
  {
    return Err(anyhow!(
      "task {id} belongs to a category \
       without a repository URL and \
       branch"
    ));
  }
  if !confirm(&question, yes)? {
    return Ok(());
  }

  if board
    .send_to_coding_agent(&client, id)
    .await?
  {
    println!(
      "Sent task {id} to the coding \
       agent."
    );
  }
  Ok(())
}
