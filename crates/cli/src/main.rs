//! Skyfit terminal planner
//!
//! Cycles flight options for each leg of a trip while mirroring the current
//! selection onto the travel calendar as preview events. Previews are
//! removed again on every exit path, including errors.

use std::sync::Arc;

use anyhow::Context;
use skyfit_core::{
    ensure_trip_block, extract, CalendarPort, CyclePolicy, FilterDirection, LocalClock,
    PlannerSession, PreviewSynchronizer, SelectionMove, StepOutcome, WindowResolver,
};
use skyfit_domain::constants::LOCAL_TIME_FORMAT;
use skyfit_domain::{Config, PreviewTag};
use skyfit_infra::{GoogleCalendarProvider, RefreshingTokenProvider};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    // Load environment variables from .env file
    match dotenvy::dotenv() {
        Ok(path) => info!(path = %path.display(), "loaded environment from .env"),
        Err(e) => debug!(error = %e, "no .env file loaded"),
    }

    let config = skyfit_infra::config::load().context("loading configuration")?;
    run(config).await
}

async fn run(config: Config) -> anyhow::Result<()> {
    let calendar_id = skyfit_infra::config::read_calendar_id(&config.calendar.id_file)?;
    let clock = LocalClock::from_zone_name(&config.calendar.timezone)?;

    let tokens = Arc::new(RefreshingTokenProvider::new(config.oauth.clone()));
    let calendar: Arc<dyn CalendarPort> = Arc::new(GoogleCalendarProvider::new(tokens));

    let trip = skyfit_infra::load_trip_payload(&config.search.payload_file)?;
    let outbound = extract(&trip.outbound_raw, &clock);
    let inbound = match &trip.inbound_raw {
        Some(raw) => extract(raw, &clock),
        None => Vec::new(),
    };
    anyhow::ensure!(!outbound.is_empty(), "no usable outbound itineraries in the search payload");

    let resolver = WindowResolver::new(Arc::clone(&calendar), calendar_id.clone(), clock);
    let synchronizer = PreviewSynchronizer::new(Arc::clone(&calendar), calendar_id.clone());
    let mut session = PlannerSession::new(resolver, synchronizer);

    let outbound_tag = PreviewTag::new("outbound")?;
    session.add_slot(
        outbound_tag.clone(),
        FilterDirection::ArriveBefore,
        &config.calendar.outbound_color,
        outbound.clone(),
        CyclePolicy::Wraparound,
    )?;

    let mut tags = vec![outbound_tag];
    if inbound.is_empty() {
        warn!("planning outbound leg only");
    } else {
        let inbound_tag = PreviewTag::new("inbound")?;
        session.add_slot(
            inbound_tag.clone(),
            FilterDirection::DepartAfter,
            &config.calendar.inbound_color,
            inbound.clone(),
            CyclePolicy::Wraparound,
        )?;
        tags.push(inbound_tag);
    }

    // One-time all-day banner spanning the trip's travel days
    let depart_day = outbound[0].arrival().date_naive();
    let return_day = inbound.first().map_or(depart_day, |it| it.departure().date_naive());
    let trip_name = format!("{} → {} Trip", outbound[0].origin(), outbound[0].destination());
    ensure_trip_block(calendar.as_ref(), &calendar_id, &trip_name, depart_day, return_day).await?;

    let result = interact(&mut session, &tags).await;

    // Previews must never outlive the session, even when the loop failed
    if let Err(err) = session.cleanup().await {
        error!(error = %err, "preview cleanup failed; stale preview events may remain");
        if result.is_ok() {
            return Err(err.into());
        }
    } else {
        println!("Cleaned up preview events.");
    }
    result
}

async fn interact(session: &mut PlannerSession, tags: &[PreviewTag]) -> anyhow::Result<()> {
    let mut focus = 0usize;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    show_step(session, &tags[focus], SelectionMove::Stay).await?;
    print_help(tags.len() > 1);

    loop {
        match next_command(&mut lines).await? {
            None | Some(Command::Quit) => break,
            Some(Command::Next) => {
                show_step(session, &tags[focus], SelectionMove::Next).await?;
            }
            Some(Command::Prev) => {
                show_step(session, &tags[focus], SelectionMove::Prev).await?;
            }
            Some(Command::SwitchLeg) => {
                if tags.len() > 1 {
                    focus = (focus + 1) % tags.len();
                    show_step(session, &tags[focus], SelectionMove::Stay).await?;
                } else {
                    println!("Only one leg to plan.");
                }
            }
            Some(Command::Unknown(other)) => {
                println!("Unrecognized command: {other:?}");
                print_help(tags.len() > 1);
            }
        }
    }
    Ok(())
}

enum Command {
    Next,
    Prev,
    SwitchLeg,
    Quit,
    Unknown(String),
}

async fn next_command(lines: &mut Lines<BufReader<Stdin>>) -> anyhow::Result<Option<Command>> {
    let Some(line) = lines.next_line().await.context("reading from stdin")? else {
        return Ok(None);
    };
    let command = match line.trim().to_lowercase().as_str() {
        "" => Command::Next,
        "p" => Command::Prev,
        "s" => Command::SwitchLeg,
        "q" => Command::Quit,
        other => Command::Unknown(other.to_string()),
    };
    Ok(Some(command))
}

fn print_help(two_legs: bool) {
    if two_legs {
        println!("\nENTER = next option, p = previous, s = switch leg, q = quit");
    } else {
        println!("\nENTER = next option, p = previous, q = quit");
    }
}

async fn show_step(
    session: &mut PlannerSession,
    tag: &PreviewTag,
    movement: SelectionMove,
) -> anyhow::Result<()> {
    match session.step(tag, movement).await? {
        StepOutcome::Selected { itinerary, index, total } => {
            println!("\n[{tag}] option {} of {}: ${}", index + 1, total, itinerary.price());
            for seg in itinerary.segments() {
                println!(
                    "  {} → {} ({} → {}, {})",
                    seg.origin,
                    seg.destination,
                    seg.departure.format(LOCAL_TIME_FORMAT),
                    seg.arrival.format(LOCAL_TIME_FORMAT),
                    seg.carrier,
                );
            }
        }
        StepOutcome::NoValidOptions => {
            println!("\n[{tag}] no flights fit your schedule.");
        }
    }
    Ok(())
}
