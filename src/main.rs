use clap::Parser;
use fleet::api::{HttpSource, ServerSource};
use fleet::archive::ArchiveSource;
use fleet::cli::{
    archive, handle_completions, handle_config_init, load_config_with_overrides, servers, watch,
    workers, Cli, Commands, ConfigCommands, ImagesCommands, ServersCommands, WorkersCommands,
};
use fleet::dashboard::Dashboard;
use fleet::modal::StdoutClipboard;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    // Commands that need neither configuration nor the network
    match &cli.command {
        Commands::Config(ConfigCommands::Init(args)) => {
            println!("{}", handle_config_init(args)?);
            return Ok(());
        }
        Commands::Completions(args) => {
            handle_completions(args, &mut std::io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let config = load_config_with_overrides(&cli.global)?;
    fleet::logging::init_tracing(&config.logging)?;
    tracing::debug!(api = %config.api.base_url, "Configuration loaded");

    let http = Arc::new(HttpSource::new(&config.api)?);
    let source: Arc<dyn ServerSource> = http.clone();
    let archive_source: Arc<dyn ArchiveSource> = http;

    let output = match cli.command {
        Commands::Servers(cmd) => {
            let dashboard = Dashboard::new(source, &config.polling);
            match cmd {
                ServersCommands::List(args) => {
                    servers::handle_servers_list(&args, &dashboard).await?
                }
                ServersCommands::Add(args) => servers::handle_servers_add(&args, &dashboard).await?,
                ServersCommands::Remove(args) => {
                    servers::handle_servers_remove(&args, &dashboard).await?
                }
                ServersCommands::Test(args) => {
                    servers::handle_servers_test(&args, &dashboard).await?
                }
                ServersCommands::TestAll => servers::handle_servers_test_all(&dashboard).await?,
                ServersCommands::Pull(args) => {
                    servers::handle_servers_pull(&args, &dashboard).await?
                }
            }
        }
        Commands::Workers(WorkersCommands::Command(args)) => {
            let dashboard = Dashboard::new(source, &config.polling);
            workers::handle_workers_command(&args, dashboard.dispatcher(), &StdoutClipboard).await?
        }
        Commands::Stats(args) => archive::handle_stats(&args, archive_source.as_ref()).await?,
        Commands::Recent(args) => archive::handle_recent(&args, archive_source.as_ref()).await?,
        Commands::Images(cmd) => match cmd {
            ImagesCommands::Show(args) => {
                archive::handle_images_show(&args, archive_source.as_ref()).await?
            }
            ImagesCommands::Fetch(args) => {
                archive::handle_images_fetch(&args, archive_source.as_ref()).await?
            }
            ImagesCommands::Analyze(args) => {
                archive::handle_images_analyze(&args, archive_source).await?
            }
        },
        Commands::Watch(args) => {
            watch::run_watch(&args, &config, source).await?;
            String::new()
        }
        Commands::Config(_) | Commands::Completions(_) => String::new(),
    };

    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}
