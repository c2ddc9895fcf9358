//! Command execution logic.

use anyhow::{bail, Context, Result};
use std::io::IsTerminal;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};

use super::args::{AddArgs, ApisArgs, ExploreArgs, InitArgs, ListArgs, RelationArg, ShowArgs};
use super::gesture::{parse_gesture, Gesture, GESTURE_HELP};
use crate::app::App;
use crate::config::NavigatorConfig;
use crate::directory;
use crate::domain::{
    default_api_endpoint, Application, ApplicationDetails, ApplicationId, ApplicationRecord,
    RelatedApplication,
};
use crate::navigator::{Command, CommandSender, NavigatorRuntime, Outcome, Report, ViewState};
use crate::output::{self, OutputMode};
use crate::source::in_memory::append_record;

/// Execute the init command
pub async fn execute_init(config_path: &Path, args: &InitArgs) -> Result<()> {
    if config_path.exists() && !args.force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    let mut config = NavigatorConfig {
        lookahead: args.lookahead,
        ..NavigatorConfig::default()
    };
    if let Some(data_file) = &args.data_file {
        config.data_file.clone_from(data_file);
    }
    config
        .save(config_path)
        .await
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    if !args.quiet {
        println!("Wrote {}", config_path.display());
        println!("  Data file: {}", config.data_file.display());
        println!("  Lookahead: {}", config.lookahead);
    }
    Ok(())
}

/// Execute the list command
pub async fn execute_list(app: &App, _args: &ListArgs, output_mode: OutputMode) -> Result<()> {
    let apps = directory::list_applications(app.source().as_ref()).await;
    output::print_applications(&apps, output_mode)?;
    Ok(())
}

/// Execute the show command
pub async fn execute_show(app: &App, args: &ShowArgs, output_mode: OutputMode) -> Result<()> {
    let mut navigator = app.navigator();
    if args.lookahead {
        navigator = navigator.with_lookahead(true);
    }

    match navigator
        .dispatch(Command::Select(ApplicationId::new(args.id.as_str())))
        .await
    {
        Some(Outcome::Applied(view)) => match output_mode {
            OutputMode::Json => output::print_json(&view)?,
            OutputMode::Text => output::print_view(&view, output_mode)?,
        },
        Some(Outcome::Failed(report)) => bail!(report.message),
        Some(Outcome::Discarded) | None => {}
    }
    Ok(())
}

/// Execute the apis command
pub async fn execute_apis(app: &App, args: &ApisArgs, output_mode: OutputMode) -> Result<()> {
    let id = ApplicationId::new(args.id.as_str());
    let apis = directory::list_apis(app.source().as_ref(), &id)
        .await
        .with_context(|| format!("Failed to look up APIs of {id}"))?;
    output::print_apis(&id, &apis, output_mode)?;
    Ok(())
}

/// Execute the add command
///
/// Relations given without a name must name an application the data file
/// already knows.
pub async fn execute_add(app: &App, args: &AddArgs, output_mode: OutputMode) -> Result<()> {
    let known = app
        .source()
        .list_applications()
        .await
        .context("Failed to read the application directory")?;

    let api_endpoint = args
        .api_endpoint
        .clone()
        .or_else(|| args.api_name.as_deref().and_then(default_api_endpoint));
    let record = ApplicationRecord {
        application_id: ApplicationId::new(args.id.as_str()),
        application_name: args.name.clone(),
        details: ApplicationDetails {
            capability_name: args.capability.clone(),
            api_name: args.api_name.clone(),
            api_endpoint,
        },
        upstream_apps: resolve_relations(&args.id, &args.upstream, &known)?,
        downstream_apps: resolve_relations(&args.id, &args.downstream, &known)?,
    };

    append_record(app.data_file(), &record)
        .await
        .with_context(|| format!("Failed to write {}", app.data_file().display()))?;

    match output_mode {
        OutputMode::Json => output::print_json(&record)?,
        OutputMode::Text => output::print_message(&format!(
            "Added {} to {}",
            record.application_id,
            app.data_file().display()
        ))?,
    }
    Ok(())
}

fn resolve_relations(
    own_id: &str,
    relations: &[RelationArg],
    known: &[Application],
) -> Result<Vec<RelatedApplication>> {
    relations
        .iter()
        .map(|relation| -> Result<RelatedApplication> {
            if relation.id == own_id {
                bail!("{own_id} cannot be related to itself");
            }
            let name = match &relation.name {
                Some(name) => name.clone(),
                None => known
                    .iter()
                    .find(|app| app.id.as_str() == relation.id)
                    .map(|app| app.name.clone())
                    .with_context(|| {
                        format!(
                            "Unknown application: {} (give it a name with {}=Name)",
                            relation.id, relation.id
                        )
                    })?,
            };
            Ok(RelatedApplication::new(relation.id.as_str(), name))
        })
        .collect()
}

/// Execute the explore command
///
/// Gestures are read until `quit` or end of input. When stdin is not a
/// terminal each gesture settles before the next line is read, so a script
/// always acts on the view its previous line produced. Interactive input is
/// sent as it arrives and the latest gesture wins. The runtime settles any
/// fetch still in flight before the command returns.
pub async fn execute_explore(app: &App, args: &ExploreArgs, output_mode: OutputMode) -> Result<()> {
    let mut navigator = app.navigator();
    if args.lookahead {
        navigator = navigator.with_lookahead(true);
    }

    let (runtime, handle) = NavigatorRuntime::new(navigator);
    let runtime_task = tokio::spawn(runtime.run());
    let (commands, views, reports) = handle.into_parts();
    let printer = tokio::spawn(print_updates(views, reports, output_mode));
    let settle_each = !std::io::stdin().is_terminal();

    if output_mode == OutputMode::Text {
        output::print_message("Type 'help' for the list of gestures.")?;
    }
    if let Some(id) = &args.id {
        forward(
            &commands,
            Command::Select(ApplicationId::new(id.as_str())),
            settle_each,
        )
        .await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_gesture(&line) {
            Ok(None) => {}
            Ok(Some(Gesture::Quit)) => break,
            Ok(Some(Gesture::Help)) => output::print_message(GESTURE_HELP)?,
            Ok(Some(Gesture::Command(command))) => {
                tracing::debug!(?command, "Gesture");
                forward(&commands, command, settle_each).await?;
            }
            Err(e) => eprintln!("{e}"),
        }
    }

    drop(commands);
    runtime_task.await.context("Navigator task failed")?;
    printer.await.context("Output task failed")??;
    Ok(())
}

async fn forward(commands: &CommandSender, command: Command, settle: bool) -> Result<()> {
    if settle {
        let settled = commands.dispatch(command).await.context("Navigator stopped")?;
        tracing::debug!(?settled, "Gesture settled");
    } else {
        commands.send(command).await.context("Navigator stopped")?;
    }
    Ok(())
}

/// Print every published view and report until the runtime stops.
async fn print_updates(
    mut views: watch::Receiver<ViewState>,
    mut reports: mpsc::UnboundedReceiver<Report>,
    output_mode: OutputMode,
) -> std::io::Result<()> {
    let mut views_open = true;
    let mut reports_open = true;

    while views_open || reports_open {
        tokio::select! {
            changed = views.changed(), if views_open => match changed {
                Ok(()) => {
                    let view = views.borrow_and_update().clone();
                    output::print_view(&view, output_mode)?;
                }
                Err(_) => views_open = false,
            },
            report = reports.recv(), if reports_open => match report {
                Some(report) => output::print_report(&report, output_mode)?,
                None => reports_open = false,
            },
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONFIG_FILE_NAME;
    use tempfile::TempDir;

    fn init_args(force: bool) -> InitArgs {
        InitArgs {
            force,
            lookahead: true,
            data_file: Some("apps.jsonl".into()),
            quiet: true,
        }
    }

    #[tokio::test]
    async fn init_writes_loadable_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        execute_init(&path, &init_args(false)).await.unwrap();

        let config = NavigatorConfig::load(&path).await.unwrap();
        assert!(config.lookahead);
        assert_eq!(config.data_file, Path::new("apps.jsonl"));
    }

    #[tokio::test]
    async fn init_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        execute_init(&path, &init_args(false)).await.unwrap();

        let err = execute_init(&path, &init_args(false)).await.unwrap_err();
        assert!(err.to_string().contains("already exists"));
        execute_init(&path, &init_args(true)).await.unwrap();
    }

    fn known_apps() -> Vec<Application> {
        vec![Application::new("ledger", "Ledger")]
    }

    #[test]
    fn relations_take_known_names() {
        let relations = [RelationArg {
            id: "ledger".to_string(),
            name: None,
        }];

        let resolved = resolve_relations("pay", &relations, &known_apps()).unwrap();
        assert_eq!(resolved, vec![RelatedApplication::new("ledger", "Ledger")]);
    }

    #[test]
    fn inline_relation_name_wins() {
        let relations = [RelationArg {
            id: "ledger".to_string(),
            name: Some("General Ledger".to_string()),
        }];

        let resolved = resolve_relations("pay", &relations, &known_apps()).unwrap();
        assert_eq!(resolved[0].app_name, "General Ledger");
    }

    #[test]
    fn unknown_or_self_relation_is_rejected() {
        let unknown = [RelationArg {
            id: "bank".to_string(),
            name: None,
        }];
        let err = resolve_relations("pay", &unknown, &known_apps()).unwrap_err();
        assert!(err.to_string().contains("bank=Name"));

        let own = [RelationArg {
            id: "pay".to_string(),
            name: Some("Payments".to_string()),
        }];
        assert!(resolve_relations("pay", &own, &known_apps()).is_err());
    }

    #[tokio::test]
    async fn add_appends_a_loadable_record() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        let app = App::from_config_path(&config_path).await.unwrap();
        let args = AddArgs {
            id: "pay".to_string(),
            name: "Payments".to_string(),
            capability: None,
            api_name: Some("PaymentAPI".to_string()),
            api_endpoint: None,
            upstream: vec![RelationArg {
                id: "bank".to_string(),
                name: Some("Bank".to_string()),
            }],
            downstream: Vec::new(),
        };

        execute_add(&app, &args, OutputMode::Json).await.unwrap();

        let reloaded = App::from_config_path(&config_path).await.unwrap();
        let apis = directory::list_apis(reloaded.source().as_ref(), &ApplicationId::new("pay"))
            .await
            .unwrap();
        assert_eq!(apis.len(), 1);
        assert_eq!(apis[0].api_endpoint.as_deref(), Some("/api/v1payment"));
        let names: Vec<String> = directory::list_applications(reloaded.source().as_ref())
            .await
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, ["Bank", "Payments"]);
    }

    #[tokio::test]
    async fn show_unknown_application_fails() {
        let dir = TempDir::new().unwrap();
        let app = App::from_config_path(&dir.path().join(CONFIG_FILE_NAME))
            .await
            .unwrap();
        let args = ShowArgs {
            id: "ghost".to_string(),
            lookahead: false,
        };

        let err = execute_show(&app, &args, OutputMode::Json).await.unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }
}
