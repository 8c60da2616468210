//! Bus command handlers.

use std::fmt::Write as _;
use std::sync::Arc;

use tabled::Tabled;

use bustrack_core::{
    Bus, BusEdit, BusField, BusFilter, BusId, Command as CoreCommand, CommandResult, Controller,
    CoreError, LoadLevel, Operation, RouteDraft, StopDraft,
};

use crate::cli::{BusesArgs, BusesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct BusRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Bus")]
    number: String,
    #[tabled(rename = "Route")]
    route: String,
    #[tabled(rename = "Stops")]
    stops: usize,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Next Stop")]
    next_stop: String,
    #[tabled(rename = "ETA")]
    eta: String,
    #[tabled(rename = "Load")]
    load: String,
}

impl From<&Arc<Bus>> for BusRow {
    fn from(b: &Arc<Bus>) -> Self {
        Self {
            id: b.id.to_string(),
            number: b.number.clone(),
            route: b.route.clone(),
            stops: b.stops.len(),
            location: b.current_location.clone(),
            next_stop: b.next_stop.clone(),
            eta: b.eta.clone(),
            load: load_cell(b),
        }
    }
}

fn load_cell(b: &Bus) -> String {
    let level = match b.load_level() {
        Some(LoadLevel::Low) => "low",
        Some(LoadLevel::Moderate) => "moderate",
        Some(LoadLevel::High) => "high",
        None => "-",
    };
    format!("{}/{} ({level})", b.occupancy, b.capacity)
}

fn detail(b: &Bus) -> String {
    let mut out = [
        format!("ID:        {}", b.id),
        format!("Bus:       {}", b.number),
        format!("Route:     {}", b.route),
        format!("Location:  {}", b.current_location),
        format!("Next Stop: {}", b.next_stop),
        format!("ETA:       {}", b.eta),
        format!(
            "Occupancy: {}/{}{}",
            b.occupancy,
            b.capacity,
            b.load_percent()
                .map_or_else(String::new, |p| format!(" ({p:.0}%)"))
        ),
        "Schedule:".to_owned(),
    ]
    .join("\n");
    for (i, stop) in b.stops.iter().enumerate() {
        let _ = write!(out, "\n  {:>2}. {:<6} {}", i + 1, stop.scheduled_time, stop.name);
    }
    out
}

// ── Parsing helpers ─────────────────────────────────────────────────

/// Parse `"Name@HH:MM"`. The last `@` separates the time; without one the
/// time is left empty.
pub fn parse_stop(raw: &str) -> StopDraft {
    match raw.rsplit_once('@') {
        Some((name, time)) => StopDraft {
            name: name.trim().to_owned(),
            time: time.trim().to_owned(),
        },
        None => StopDraft {
            name: raw.trim().to_owned(),
            time: String::new(),
        },
    }
}

/// Check every assignment against a scratch form so bad input fails
/// before any request.
fn check_assignments(assignments: &[String]) -> Result<(), CoreError> {
    let mut scratch = RouteDraft::default();
    for raw in assignments {
        let (field, value) = BusField::parse_assignment(raw)?;
        scratch.set(field, value)?;
    }
    Ok(())
}

fn print_bus(bus: &Bus, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(&global.output, bus, detail, |b| b.id.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: BusesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        BusesCommand::List { search, route } => {
            controller
                .refresh()
                .await
                .map_err(|e| CliError::from_core(e, Operation::Load))?;
            let filter = BusFilter::new(search.unwrap_or_default(), route);
            let snap = filter.apply(&controller.buses_snapshot());
            let out = output::render_list(
                &global.output,
                &snap,
                |b| BusRow::from(b),
                |b| b.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        BusesCommand::Show { id } => {
            let bus = controller
                .get_bus(&BusId::from(id))
                .await
                .map_err(|e| CliError::from_core(e, Operation::Load))?;
            print_bus(&bus, global)
        }

        BusesCommand::Add {
            number,
            route,
            stops,
            capacity,
            occupancy,
            current_location,
            next_stop,
            eta,
        } => {
            let draft = RouteDraft {
                number,
                route,
                stops: stops.iter().map(|s| parse_stop(s)).collect(),
                current_location: current_location.unwrap_or_default(),
                next_stop: next_stop.unwrap_or_default(),
                eta: eta.unwrap_or_default(),
                capacity,
                occupancy,
            };
            let result = controller
                .execute(CoreCommand::CreateBus(draft.to_new_bus()))
                .await
                .map_err(|e| CliError::from_core(e, Operation::Save))?;
            if !global.quiet {
                eprintln!("New route added!");
            }
            match result {
                CommandResult::Bus(bus) => print_bus(&bus, global),
                CommandResult::Tracking(_) => Ok(()),
            }
        }

        BusesCommand::Edit { id, assignments } => {
            check_assignments(&assignments).map_err(CliError::input)?;

            let bus = controller
                .get_bus(&BusId::from(id))
                .await
                .map_err(|e| CliError::from_core(e, Operation::Load))?;
            let mut edit = BusEdit::from_bus(&bus);
            edit.apply_assignments(assignments.iter().map(String::as_str))
                .map_err(CliError::input)?;
            let (id, fields) = edit.into_update();

            let result = controller
                .execute(CoreCommand::UpdateBus { id, bus: fields })
                .await
                .map_err(|e| CliError::from_core(e, Operation::Save))?;
            if !global.quiet {
                eprintln!("Changes saved!");
            }
            match result {
                CommandResult::Bus(bus) => print_bus(&bus, global),
                CommandResult::Tracking(_) => Ok(()),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bustrack_core::Stop;

    #[test]
    fn stop_spec_splits_on_last_at() {
        assert_eq!(
            parse_stop("Central Station@06:00"),
            StopDraft {
                name: "Central Station".into(),
                time: "06:00".into()
            }
        );
        assert_eq!(parse_stop("Pier @ 5@07:10").name, "Pier @ 5");
        assert_eq!(parse_stop("Depot").time, "");
    }

    #[test]
    fn bad_numbers_fail_before_any_request() {
        assert!(check_assignments(&["eta=4 mins".into()]).is_ok());
        assert!(check_assignments(&["occupancy=lots".into()]).is_err());
        assert!(check_assignments(&["colour=red".into()]).is_err());
    }

    #[test]
    fn detail_lists_schedule_in_order() {
        let bus = Bus {
            id: BusId::from("1"),
            number: "101".into(),
            route: "Downtown Express".into(),
            stops: vec![
                Stop::new("Central Station", "06:00"),
                Stop::new("City Hall", "06:15"),
            ],
            current_location: "City Hall".into(),
            next_stop: "Main Street".into(),
            eta: "5 mins".into(),
            capacity: 50,
            occupancy: 32,
        };
        let text = detail(&bus);
        assert!(text.contains("Occupancy: 32/50 (64%)"));
        let first = text.find("Central Station").unwrap();
        let second = text.rfind("City Hall").unwrap();
        assert!(first < second);
        assert_eq!(load_cell(&bus), "32/50 (moderate)");
    }
}
