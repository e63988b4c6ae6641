//! Servers command implementation

use crate::api::ServerId;
use crate::cli::output::{
    format_banner, format_probe, format_probe_summary, format_pull_job, format_server_detail,
    format_servers_json, format_servers_table,
};
use crate::cli::{ServerIdArgs, ServersAddArgs, ServersListArgs, ServersPullArgs};
use crate::dashboard::Dashboard;
use crate::modal::AddServerForm;
use crate::registry::RefreshOutcome;
use colored::Colorize;

type CliResult = Result<String, Box<dyn std::error::Error>>;

/// Fetch the fleet once. One-shot commands have nothing to fall back on,
/// so a failed fetch is an error here.
async fn load(dashboard: &Dashboard) -> Result<(), Box<dyn std::error::Error>> {
    match dashboard.reload().await {
        RefreshOutcome::Failed(message) => Err(message.into()),
        _ => Ok(()),
    }
}

/// Handle `fleet servers list`
pub async fn handle_servers_list(args: &ServersListArgs, dashboard: &Dashboard) -> CliResult {
    load(dashboard).await?;
    let view = dashboard.view();
    let servers = view.servers();

    if args.json {
        return Ok(format_servers_json(servers));
    }

    let mut output = format!("{}\n{}", format_banner(&view), format_servers_table(servers));
    if args.detail {
        for server in servers {
            output.push_str("\n\n");
            output.push_str(&format_server_detail(server));
        }
    }
    Ok(output)
}

/// Handle `fleet servers add`
pub async fn handle_servers_add(args: &ServersAddArgs, dashboard: &Dashboard) -> CliResult {
    let mut form = AddServerForm::new();
    form.open();
    form.name = args.name.clone();
    form.url = args.url.clone();
    form.priority = args.priority;

    match form.submit(dashboard.dispatcher()).await {
        Some(server) => Ok(format!(
            "{} Added server {} ({}) as id {}",
            "✓".green(),
            server.name,
            server.url,
            server.id
        )),
        None => Err(form
            .error
            .unwrap_or_else(|| "Server was not added".to_string())
            .into()),
    }
}

/// Handle `fleet servers remove`
///
/// The fleet is fetched first so a server with attached workers is refused
/// locally instead of being sent to the backend.
pub async fn handle_servers_remove(args: &ServerIdArgs, dashboard: &Dashboard) -> CliResult {
    load(dashboard).await?;
    let id = ServerId::from(args.id.as_str());
    dashboard.cards().delete(&id).await?;
    Ok(format!("{} Removed server {}", "✓".green(), id))
}

/// Handle `fleet servers test`
pub async fn handle_servers_test(args: &ServerIdArgs, dashboard: &Dashboard) -> CliResult {
    let id = ServerId::from(args.id.as_str());
    let outcome = dashboard.cards().test(&id).await?;
    Ok(format_probe(id.as_str(), &outcome))
}

/// Handle `fleet servers test-all`
pub async fn handle_servers_test_all(dashboard: &Dashboard) -> CliResult {
    let summary = dashboard.dispatcher().test_all().await?;
    Ok(format_probe_summary(&summary))
}

/// Handle `fleet servers pull`
pub async fn handle_servers_pull(args: &ServersPullArgs, dashboard: &Dashboard) -> CliResult {
    let id = ServerId::from(args.id.as_str());
    dashboard.cards().set_pull_input(&id, &args.model);
    let job = dashboard.cards().pull(&id).await?;
    Ok(format_pull_job(id.as_str(), &job))
}
