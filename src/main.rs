use clap::Parser;
use dialoguer::Confirm;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tooth_time::cli::{Cli, Command, NotifsCommand};
use tooth_time::clock::SystemClock;
use tooth_time::commands::App;
use tooth_time::error::ServiceResult;
use tooth_time::metadata::{PKG_NAME, PKG_VERSION};
use tooth_time::notify::{DesktopNotifier, NotificationPermission};
use tooth_time::settings::AppConfig;
use tooth_time::{editor, watch};

fn init_tracing(default_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> ServiceResult<()> {
    let tick_override = match &cli.command {
        Command::Watch(args) => args.tick_secs,
        _ => None,
    };
    let config = AppConfig::resolve(cli.data_dir, tick_override);
    let mut app = App::open(config, SystemClock);

    match cli.command {
        Command::Status(args) => println!("{}", app.status(&args)?),
        Command::Watch(_) => {
            let (config, store, clock) = app.into_parts();
            let notifier = DesktopNotifier::new(config.settings.notifications);
            let watcher = watch::Watcher::new(store, clock, notifier);
            watch::run(watcher, config.tick, &config.pid_file()).await?;
        }
        Command::Take { med } => println!("{}", app.take(med)),
        Command::Done { task, time } => println!("{}", app.done(task, time)?),
        Command::Set(cmd) => println!("{}", app.set(cmd)?),
        Command::Config => {
            let actions = editor::run(app.store().plan())?;
            if actions.is_empty() {
                println!("No changes.");
            } else {
                app.apply(actions);
                println!("Saved.");
            }
        }
        Command::Notifs(action) => {
            let permission = match action {
                NotifsCommand::Status => app.permission(),
                NotifsCommand::Revoke => app.revoke_permission()?,
                NotifsCommand::Request => {
                    if app.permission() == NotificationPermission::Unsupported {
                        NotificationPermission::Unsupported
                    } else {
                        let granted = Confirm::new()
                            .with_prompt(format!(
                                "Allow {} to send desktop notifications?",
                                app.store().plan().character_name
                            ))
                            .default(true)
                            .interact()?;
                        app.set_permission(granted)?
                    }
                }
            };
            println!("notifications: {permission}");
        }
        Command::Theme => println!("{}", app.toggle_theme()),
        Command::Intro => println!("{}", app.intro()),
        Command::Reset { yes } => {
            let confirmed = yes
                || Confirm::new()
                    .with_prompt("Clear all saved data and restore the default plan?")
                    .default(false)
                    .interact()?;
            if confirmed {
                println!("{}", app.reset());
            } else {
                println!("Reset cancelled.");
            }
        }
        Command::Stop => match watch::stop(&app.config().pid_file())? {
            watch::StopOutcome::Stopped(pid) => println!("Stopped watch (pid {pid})."),
            watch::StopOutcome::NotRunning => println!("No watch is running."),
        },
        Command::Version => println!("{PKG_NAME} {PKG_VERSION}"),
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let level = if matches!(cli.command, Command::Watch(_)) {
        "info"
    } else {
        "warn"
    };
    init_tracing(level);

    if let Err(e) = run(cli).await {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
