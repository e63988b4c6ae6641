//! Watch command implementation
//!
//! Live dashboard on the terminal: polls the registry, redraws on every
//! change and reads one-line commands from stdin.

use crate::api::{ServerId, ServerSource};
use crate::boundary::{Recovery, RecoveryBoundary, RenderError};
use crate::cards::CardBoard;
use crate::cli::output::{format_banner, format_join_command, format_server_detail, format_servers_table};
use crate::cli::WatchArgs;
use crate::config::FleetConfig;
use crate::dashboard::Dashboard;
use crate::dispatch::ActionDispatcher;
use crate::modal::{AddServerForm, Clipboard, JoinCommandModal, JoinPhase, TerminalClipboard};
use crate::registry::RegistryView;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

const HELP: &str = "[e <id>] expand  [t <id>] test  [T] test all  [p <id> <model>] pull  \
[d <id>] delete  [a <name> <url> [priority]] add  [j [id]] join command  [c] copy  [x] close  \
[r] retry  [R] reload  [q] quit";

/// Redraw period while the "copied" acknowledgment is showing.
const ACK_REDRAW: Duration = Duration::from_millis(250);

/// One line typed by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchCommand {
    Toggle(ServerId),
    Test(ServerId),
    TestAll,
    Pull(ServerId, String),
    Delete(ServerId),
    Add {
        name: String,
        url: String,
        priority: i64,
    },
    JoinCommand(Option<ServerId>),
    Copy,
    Close,
    Retry,
    Reload,
    Quit,
}

/// Parse an input line. Unknown input yields `None`.
pub fn parse_command(line: &str) -> Option<WatchCommand> {
    let mut parts = line.split_whitespace();
    let head = parts.next()?;
    let rest: Vec<&str> = parts.collect();

    let command = match (head, rest.as_slice()) {
        ("q", []) => WatchCommand::Quit,
        ("r", []) => WatchCommand::Retry,
        ("R", []) => WatchCommand::Reload,
        ("T", []) => WatchCommand::TestAll,
        ("c", []) => WatchCommand::Copy,
        ("x", []) => WatchCommand::Close,
        ("e", [id]) => WatchCommand::Toggle(ServerId::from(*id)),
        ("t", [id]) => WatchCommand::Test(ServerId::from(*id)),
        ("d", [id]) => WatchCommand::Delete(ServerId::from(*id)),
        ("p", [id, model @ ..]) if !model.is_empty() => {
            WatchCommand::Pull(ServerId::from(*id), model.join(" "))
        }
        ("a", [name, url]) => WatchCommand::Add {
            name: name.to_string(),
            url: url.to_string(),
            priority: 0,
        },
        ("a", [name, url, priority]) => WatchCommand::Add {
            name: name.to_string(),
            url: url.to_string(),
            priority: priority.parse().ok()?,
        },
        ("j", []) => WatchCommand::JoinCommand(None),
        ("j", [id]) => WatchCommand::JoinCommand(Some(ServerId::from(*id))),
        _ => return None,
    };
    Some(command)
}

/// Dialogs owned by the watch session.
#[derive(Debug, Default)]
pub struct Dialogs {
    pub form: AddServerForm,
    pub join: JoinCommandModal,
}

impl Dialogs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn close(&mut self) {
        self.form.close();
        self.join.close();
    }

    /// Run a dialog command and return the notice to show.
    /// Commands that are not dialog commands yield `None`.
    pub async fn apply(
        &mut self,
        command: &WatchCommand,
        dispatcher: &ActionDispatcher,
        clipboard: &dyn Clipboard,
    ) -> Option<String> {
        let notice = match command {
            WatchCommand::Add {
                name,
                url,
                priority,
            } => {
                self.form.open();
                self.form.name = name.clone();
                self.form.url = url.clone();
                self.form.priority = *priority;
                match self.form.submit(dispatcher).await {
                    Some(server) => format!("Added {} as id {}", server.name, server.id),
                    // Inline error is drawn with the form
                    None => String::new(),
                }
            }
            WatchCommand::JoinCommand(id) => {
                self.join.open(dispatcher, id.clone()).await;
                String::new()
            }
            WatchCommand::Copy => match self.join.copy(clipboard) {
                Ok(()) => String::new(),
                Err(e) => e.to_string(),
            },
            WatchCommand::Close => {
                self.close();
                String::new()
            }
            _ => return None,
        };
        Some(notice)
    }
}

/// Draw the whole dashboard for one registry snapshot.
pub fn render_dashboard(
    view: &RegistryView,
    cards: &CardBoard,
    dialogs: &Dialogs,
) -> Result<String, RenderError> {
    let mut out = String::new();
    let fail = |e: std::fmt::Error| RenderError(e.to_string());

    writeln!(out, "{}", format_banner(view)).map_err(fail)?;
    if !view.is_loading() {
        writeln!(out, "{}", format_servers_table(view.servers())).map_err(fail)?;
    }
    if !cards.test_all_enabled() {
        writeln!(out, "  Testing all servers...").map_err(fail)?;
    }

    for server in view.servers() {
        let card = cards.state(&server.id);
        if card.expanded {
            writeln!(out, "\n{}", format_server_detail(server)).map_err(fail)?;
        }
        if card.testing {
            writeln!(out, "  [{}] testing...", server.id).map_err(fail)?;
        }
        if card.pulling {
            writeln!(out, "  [{}] pulling {}...", server.id, card.pull_input).map_err(fail)?;
        }
        if card.deleting {
            writeln!(out, "  [{}] deleting...", server.id).map_err(fail)?;
        }
        if let Some(job) = &card.last_job {
            writeln!(out, "  [{}] last pull job: {}", server.id, job).map_err(fail)?;
        }
        if let Some(error) = &card.last_error {
            writeln!(out, "  [{}] {}", server.id, error).map_err(fail)?;
        }
    }

    render_dialogs(&mut out, dialogs).map_err(fail)?;
    Ok(out)
}

fn render_dialogs(out: &mut String, dialogs: &Dialogs) -> std::fmt::Result {
    let form = &dialogs.form;
    if form.open {
        writeln!(
            out,
            "\nAdd server: {} {} (priority {})",
            form.name, form.url, form.priority
        )?;
        if form.submitting {
            writeln!(out, "  Adding...")?;
        }
        if let Some(error) = &form.error {
            writeln!(out, "  ✗ {}", error)?;
        }
        writeln!(out, "  [a <name> <url> [priority]] resubmit  [x] close")?;
    }

    let join = &dialogs.join;
    match join.phase() {
        JoinPhase::Closed => {}
        JoinPhase::Loading => writeln!(out, "\nLoading join command...")?,
        JoinPhase::Ready(command) => {
            writeln!(out, "\nWorker join command:\n{}", format_join_command(command))?;
            writeln!(out, "  [c] {}  [x] close", join.copy_label())?;
        }
        JoinPhase::Failed(message) => {
            writeln!(out, "\nCould not load join command: {}", message)?;
            writeln!(out, "  [j] retry  [x] close")?;
        }
    }
    Ok(())
}

/// Run `fleet watch` until the operator quits or presses Ctrl-C.
pub async fn run_watch(
    args: &WatchArgs,
    config: &FleetConfig,
    source: Arc<dyn ServerSource>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut polling = config.polling.clone();
    if let Some(interval) = args.interval.filter(|secs| *secs > 0) {
        polling.interval_seconds = interval;
    }

    if let Some(addr) = args.metrics_listen.or(config.metrics.listen) {
        crate::metrics::install_exporter(addr)?;
    }

    let dashboard = Dashboard::new(source, &polling);
    dashboard.mount();
    let mut updates = dashboard.subscribe();
    let mut boundary = RecoveryBoundary::new();
    let mut dialogs = Dialogs::new();
    let clipboard = TerminalClipboard;
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let (notice_tx, mut notices) = mpsc::unbounded_channel::<String>();
    let mut notice = String::new();

    loop {
        draw(&dashboard, &mut boundary, &dialogs, &notice);

        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                dashboard.sync_cards();
            }
            Some(message) = notices.recv() => notice = message,
            _ = tokio::time::sleep(ACK_REDRAW), if dialogs.join.is_copied() => {}
            line = stdin.next_line() => {
                let Some(line) = line? else { break };
                let Some(command) = parse_command(&line) else {
                    notice = format!("Unknown command: {}", line.trim());
                    continue;
                };
                match command {
                    WatchCommand::Quit => break,
                    WatchCommand::Retry => boundary.recover(Recovery::Retry),
                    WatchCommand::Reload => boundary.recover(Recovery::Reload),
                    WatchCommand::Toggle(id) => {
                        dashboard.cards().toggle(&id);
                    }
                    WatchCommand::Add { .. }
                    | WatchCommand::JoinCommand(_)
                    | WatchCommand::Copy
                    | WatchCommand::Close => {
                        notice = String::new();
                        draw(&dashboard, &mut boundary, &dialogs, "Working...");
                        if let Some(message) =
                            dialogs.apply(&command, dashboard.dispatcher(), &clipboard).await
                        {
                            notice = message;
                        }
                    }
                    other => spawn_action(&dashboard, other, notice_tx.clone()),
                }
                if boundary.take_reload_request() {
                    dashboard.reload().await;
                }
            }
        }
    }

    dialogs.close();
    dashboard.unmount();
    Ok(())
}

fn draw(dashboard: &Dashboard, boundary: &mut RecoveryBoundary, dialogs: &Dialogs, notice: &str) {
    let view = dashboard.view();
    let cards = dashboard.cards();
    let screen = boundary.render(|| render_dashboard(&view, cards, dialogs));
    // Clear screen and home the cursor
    print!("\x1B[2J\x1B[H{}\n{}\n{}\n> ", screen, notice, HELP);
    let _ = std::io::Write::flush(&mut std::io::stdout());
}

/// Run a card action in the background; its outcome arrives as a notice and
/// the registry refresh it triggers redraws the table.
fn spawn_action(dashboard: &Dashboard, command: WatchCommand, notices: mpsc::UnboundedSender<String>) {
    let cards = Arc::clone(dashboard.cards());

    tokio::spawn(async move {
        let message = match command {
            WatchCommand::Test(id) => match cards.test(&id).await {
                Ok(_) => format!("Probe sent to {}", id),
                Err(e) => format!("Test {} failed: {}", id, e.user_message()),
            },
            WatchCommand::TestAll => match cards.test_all().await {
                Ok(summary) => format!("Probed {} servers, {} online", summary.total, summary.online),
                Err(e) => format!("Test all failed: {}", e.user_message()),
            },
            WatchCommand::Pull(id, model) => {
                cards.set_pull_input(&id, &model);
                match cards.pull(&id).await {
                    Ok(job) => format!("Pull of {} started on {} (job {})", model, id, job.job_id),
                    Err(e) => format!("Pull on {} failed: {}", id, e.user_message()),
                }
            }
            WatchCommand::Delete(id) => match cards.delete(&id).await {
                Ok(()) => format!("Removed {}", id),
                Err(e) => e.user_message(),
            },
            _ => return,
        };
        let _ = notices.send(message);
    });
}
