//! FieldOps - field operations console
//!
//! CLI entry point for roster management and for driving the
//! hold-and-confirm intervention controls from a terminal.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use colored::{ColoredString, Colorize};
use eyre::{Context, Result};
use tracing::info;

use docstore::{Filter, Store};
use fieldops::cli::{Cli, Command, EventCommand, HpCommand, SimAction, TeamCommand, VolunteerCommand};
use fieldops::config::Config;
use fieldops::confirm::{ConfirmationPrompt, Decision};
use fieldops::domain::{HealthPoint, TeamStatus, VolunteerProfile};
use fieldops::feedback::{FeedbackSink, LogFeedback, NullFeedback};
use fieldops::hold::HoldKind;
use fieldops::lifecycle::LifecycleService;
use fieldops::panel::InterventionPanel;
use fieldops::persistence::DocstorePersistence;
use fieldops::roster::{EventService, NewEvent, TeamService, VolunteerService};

fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fieldops")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Write to a log file, not stdout/stderr: the terminal belongs to
    // the command output
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(log_dir.join("fieldops.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

/// Id recorded on created records; a real deployment takes this from
/// the identity provider session
fn operator_id() -> String {
    std::env::var("USER").unwrap_or_else(|_| "operator".to_string())
}

fn paint_status(status: TeamStatus) -> ColoredString {
    match status {
        TeamStatus::Free => "FREE".green().bold(),
        TeamStatus::Active => "ACTIVE".red().bold(),
        TeamStatus::Transferring => "TRANSFERRING".yellow().bold(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate()?;

    let store = Arc::new(Store::open(config.storage.resolved_path()).context("Failed to open document store")?);

    match cli.command {
        Some(Command::Event { command }) => cmd_event(store, command),
        Some(Command::Team { command }) => cmd_team(store, command),
        Some(Command::Volunteer { command }) => cmd_volunteer(store, command),
        Some(Command::Hp { command }) => cmd_hp(store, command),
        Some(Command::Status { event_id }) => cmd_status(store, &event_id),
        Some(Command::Simulate {
            team_id,
            action,
            destination,
            time_scale,
        }) => cmd_simulate(&config, store, &team_id, action, destination, time_scale).await,
        None => {
            let mut cmd = Cli::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}

fn cmd_event(store: Arc<Store>, command: EventCommand) -> Result<()> {
    let service = EventService::new(store);

    match command {
        EventCommand::Create {
            name,
            location,
            date,
            level,
            notes,
        } => {
            let event = service.create(NewEvent {
                name,
                location,
                date,
                start_time: None,
                end_time: None,
                level,
                notes,
                created_by: operator_id(),
            })?;
            println!("{} event {} ({})", "created".green(), event.name.bold(), event.id.dimmed());
        }

        EventCommand::List => {
            let events = service.list()?;
            if events.is_empty() {
                println!("no events");
            }
            for event in events {
                let level = event.level.map(|l| l.to_string()).unwrap_or_else(|| "-".to_string());
                println!(
                    "{}  {}  {}  level: {}",
                    event.id.dimmed(),
                    event.name.bold(),
                    event.location,
                    level
                );
            }
        }

        EventCommand::Delete { event_id } => {
            if service.delete(&event_id)? {
                println!("{} {}", "deleted".red(), event_id);
            } else {
                println!("event not found: {event_id}");
            }
        }
    }
    Ok(())
}

fn cmd_team(store: Arc<Store>, command: TeamCommand) -> Result<()> {
    let service = TeamService::new(store);

    match command {
        TeamCommand::Create { event_id, name, members } => {
            let team = service.create(&event_id, name, &members, &operator_id())?;
            println!(
                "{} team {} with {} member(s) ({})",
                "created".green(),
                team.name.bold(),
                team.members.len(),
                team.id.dimmed()
            );
        }

        TeamCommand::List { event_id, detailed } => {
            if detailed {
                for entry in service.teams_with_members(&event_id)? {
                    println!("{}  {}", entry.team.name.bold(), paint_status(entry.team.status));
                    for member in entry.members {
                        println!("    {}", member.full_name());
                    }
                }
            } else {
                let teams = service.list_for_event(&event_id)?;
                if teams.is_empty() {
                    println!("no teams for event {event_id}");
                }
                for team in teams {
                    println!(
                        "{}  {}  {} member(s)  {}",
                        team.id.dimmed(),
                        team.name.bold(),
                        team.members.len(),
                        paint_status(team.status)
                    );
                }
            }
        }

        TeamCommand::Assign { team_id, volunteers } => {
            let team = service.assign_volunteers(&team_id, &volunteers)?;
            println!(
                "{} {} volunteer(s) to {}",
                "assigned".green(),
                team.members.len(),
                team.name.bold()
            );
        }

        TeamCommand::Delete { team_id } => {
            service.delete(&team_id)?;
            println!("{} {}", "deleted".red(), team_id);
        }
    }
    Ok(())
}

fn cmd_volunteer(store: Arc<Store>, command: VolunteerCommand) -> Result<()> {
    let service = VolunteerService::new(store);

    match command {
        VolunteerCommand::Register {
            id,
            email,
            first_name,
            last_name,
            qualification,
            phone,
        } => {
            let mut profile = VolunteerProfile::new(id);
            profile.email = email;
            profile.first_name = first_name;
            profile.last_name = last_name;
            profile.qualification = qualification;
            profile.phone = phone;
            service.upsert(&profile)?;
            println!("{} {}", "registered".green(), profile.full_name().bold());
        }

        VolunteerCommand::List => {
            for volunteer in service.available()? {
                let assignment = match volunteer.current_team_name {
                    Some(team) => format!("assigned to {team}"),
                    None => "unassigned".to_string(),
                };
                println!(
                    "{}  {}  {}",
                    volunteer.profile.id.dimmed(),
                    volunteer.profile.full_name().bold(),
                    assignment
                );
            }
        }
    }
    Ok(())
}

fn cmd_hp(store: Arc<Store>, command: HpCommand) -> Result<()> {
    match command {
        HpCommand::Register { event_id, name } => {
            let hp = HealthPoint::new(name, event_id);
            store.put(&hp)?;
            println!("{} health point {} ({})", "registered".green(), hp.name.bold(), hp.id.dimmed());
        }

        HpCommand::List { event_id } => {
            let points = store.list::<HealthPoint>(&[Filter::eq("event_id", event_id.as_str())])?;
            if points.is_empty() {
                println!("no health points for event {event_id}");
            }
            for hp in points {
                println!("{}  {}  {}", hp.id.dimmed(), hp.name.bold(), hp.status);
            }
        }
    }
    Ok(())
}

fn cmd_status(store: Arc<Store>, event_id: &str) -> Result<()> {
    docstore::log_summary(&store, &["teams", "interventions", "health_points"]);

    let service = TeamService::new(store);
    let teams = service.teams_with_members(event_id)?;

    if teams.is_empty() {
        println!("no teams for event {event_id}");
        return Ok(());
    }

    for entry in teams {
        let intervention = entry
            .team
            .active_intervention_id
            .as_deref()
            .map(|id| format!("  intervention: {id}"))
            .unwrap_or_default();
        println!(
            "{}  {}{}",
            entry.team.name.bold(),
            paint_status(entry.team.status),
            intervention.dimmed()
        );
        for member in entry.members {
            println!("    {}", member.full_name());
        }
    }
    Ok(())
}

async fn cmd_simulate(
    config: &Config,
    store: Arc<Store>,
    team_id: &str,
    action: SimAction,
    destination: Option<String>,
    time_scale: u64,
) -> Result<()> {
    let feedback: Arc<dyn FeedbackSink> = if config.feedback.enabled {
        Arc::new(LogFeedback)
    } else {
        Arc::new(NullFeedback)
    };
    let adapter = Arc::new(DocstorePersistence::new(store));
    let service = Arc::new(LifecycleService::new(adapter, feedback.clone()));
    let prompt = Arc::new(ConfirmationPrompt::new());
    let hold = config.hold.scaled(time_scale);
    let panel = Arc::new(InterventionPanel::new(
        team_id,
        service.clone(),
        prompt,
        feedback,
        &hold,
    ));

    let team = service.fetch(team_id).await?;
    println!("team {} is {}", team.name.bold(), paint_status(team.status));

    let kind = action.hold_kind();
    let states = panel.control_states().await?;
    let enabled = match kind {
        HoldKind::Start => states.start_enabled,
        HoldKind::Terminate => states.terminate_enabled,
        HoldKind::Transfer => states.transfer_enabled,
    };
    if !enabled {
        println!("{} cannot {} while team is {}", "blocked:".yellow(), action, team.status);
        return Ok(());
    }

    let duration_ms = match kind {
        HoldKind::Start => hold.start_hold_ms,
        HoldKind::Terminate => hold.terminate_hold_ms,
        HoldKind::Transfer => hold.transfer_hold_ms,
    };
    println!("holding {} control for {}ms...", action.to_string().bold(), duration_ms);
    panel.press(kind).await?;

    let completed = tokio::time::timeout(Duration::from_secs(30), panel.next_completion())
        .await
        .context("hold never completed")?
        .ok_or_else(|| eyre::eyre!("completion channel closed"))?;
    info!(kind = %completed, "hold completed");

    // Auto-accept the confirmation once it opens
    let responder = {
        let panel = panel.clone();
        tokio::spawn(async move {
            loop {
                if let Some(message) = panel.prompt().open_message() {
                    println!("\n{message}");
                    println!("{}", "auto-confirming".dimmed());
                    let _ = panel.prompt().resolve(Decision::Accepted);
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
    };

    let result = panel.confirm(kind, destination.as_deref()).await;
    // The responder may still be polling if the confirm step failed
    // before the prompt ever opened
    responder.abort();

    match result {
        Ok(Some(updated)) => {
            println!("{} {}", "done:".green(), LifecycleService::toast_for(&updated));
            println!("team {} is now {}", updated.name.bold(), paint_status(updated.status));
        }
        Ok(None) => println!("{}", "cancelled".yellow()),
        Err(err) => println!("{} {err}", "failed:".red()),
    }

    Ok(())
}
