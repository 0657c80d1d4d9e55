//! Boat command handlers: list, inline edit + save, and tile selection.

use std::fmt::Write as _;
use std::sync::Arc;

use tabled::Tabled;
use tokio::sync::mpsc;

use fleetdeck_core::{
    Boat, BoatDataService, BoatEdit, BoatFilter, BoatId, BoatList, BoatListState, BoatReviews,
    BoatTile, ListPhase, Notifier, ReviewsState, SaveOutcome, SelectionBus,
};

use crate::cli::{BoatsArgs, BoatsCommand, GlobalOpts};
use crate::config::Session;
use crate::error::CliError;
use crate::notify;
use crate::output;

use super::reviews::{ReviewRow, review_row};
use super::util;

// ── Table rows ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct BoatRow {
    #[tabled(rename = "")]
    selected: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Length")]
    length: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Description")]
    description: String,
}

fn boat_row(boat: &Boat, selected: Option<&BoatId>, color: bool) -> BoatRow {
    let tile = BoatTile::new(boat.clone(), selected);
    BoatRow {
        selected: output::selection_marker(tile.is_selected(), color),
        id: boat.id.to_string(),
        name: boat.name.clone(),
        length: boat.length.map(|l| format!("{l} ft")).unwrap_or_default(),
        price: boat.price.map(format_price).unwrap_or_default(),
        description: boat.description.clone().unwrap_or_default(),
    }
}

fn format_price(price: f64) -> String {
    format!("${price:.2}")
}

fn detail(boat: &Boat) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ID:          {}", boat.id);
    let _ = writeln!(out, "Name:        {}", boat.name);
    if let Some(length) = boat.length {
        let _ = writeln!(out, "Length:      {length} ft");
    }
    if let Some(price) = boat.price {
        let _ = writeln!(out, "Price:       {}", format_price(price));
    }
    if let Some(ref kind) = boat.boat_type_id {
        let _ = writeln!(out, "Type:        {kind}");
    }
    if let Some(ref picture) = boat.picture_url {
        let _ = writeln!(out, "Picture:     {picture}");
    }
    if let Some(ref description) = boat.description {
        let _ = writeln!(out, "Description: {description}");
    }
    out.trim_end().to_owned()
}

// ── Handler ──────────────────────────────────────────────────────────

pub async fn handle<S: BoatDataService>(
    service: Arc<S>,
    args: BoatsArgs,
    session: &Session,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let notifier = util::notifier(global);
    let bus = SelectionBus::new();
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let spinner = notify::spawn_spinner(events_rx, global.quiet);
    let list = BoatList::new(Arc::clone(&service), bus.clone(), Arc::clone(&notifier), events_tx);

    let result = run(service, &list, &bus, notifier, args, session, global).await;

    // Dropping the list closes the event channel and ends the spinner.
    drop(list);
    let _ = spinner.await;
    result
}

async fn run<S: BoatDataService>(
    service: Arc<S>,
    list: &BoatList<S>,
    bus: &SelectionBus,
    notifier: Arc<dyn Notifier>,
    args: BoatsArgs,
    session: &Session,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        BoatsCommand::List { filter } => {
            let state = load(list, util::resolve_filter(filter, session)).await?;
            print_boats(&state, global)
        }

        BoatsCommand::Edit {
            id,
            name,
            length,
            price,
            description,
            filter,
        } => {
            let edit = build_edit(&id, name, length, price, description)?;
            let state = load(list, util::resolve_filter(filter, session)).await?;
            find_boat(&state, &edit.id)?;
            edit_and_save(list, edit, global).await
        }

        BoatsCommand::Show { id, filter } => {
            let state = load(list, util::resolve_filter(filter, session)).await?;
            let boat = find_boat(&state, &BoatId::from(id.as_str()))?;
            show(service, list, bus, notifier, boat, global).await
        }
    }
}

/// Search and wait for the outcome; a failed fetch has already been
/// shown as a notification.
async fn load<S: BoatDataService>(
    list: &BoatList<S>,
    filter: BoatFilter,
) -> Result<BoatListState, CliError> {
    let mut states = list.subscribe();
    list.search_boats(filter);
    let state = util::settled(&mut states, |s: &BoatListState| s.is_loading).await?;
    if state.phase == ListPhase::Error {
        return Err(CliError::Reported {
            operation: "Loading boats".into(),
        });
    }
    Ok(state)
}

fn find_boat(state: &BoatListState, id: &BoatId) -> Result<Boat, CliError> {
    state
        .boats
        .iter()
        .flat_map(|boats| boats.iter())
        .find(|b| b.id == *id)
        .cloned()
        .ok_or_else(|| CliError::NotFound {
            resource_type: "boat".into(),
            identifier: id.to_string(),
            list_command: "boats list".into(),
        })
}

fn print_boats(state: &BoatListState, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let selected = state.selected_boat_id.as_ref();
    let boats = state.boats.as_deref().map_or(&[][..], Vec::as_slice);
    let out = output::render_list(
        &global.output,
        boats,
        |b| boat_row(b, selected, color),
        |b| b.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn build_edit(
    id: &str,
    name: Option<String>,
    length: Option<f64>,
    price: Option<f64>,
    description: Option<String>,
) -> Result<BoatEdit, CliError> {
    let boat_id = BoatId::parse_optional(id).ok_or_else(|| CliError::Validation {
        field: "id".into(),
        reason: "boat ID cannot be empty".into(),
    })?;

    let mut edit = BoatEdit::new(boat_id);
    if let Some(name) = name {
        edit = edit.with_name(name);
    }
    if let Some(length) = length {
        edit = edit.with_length(length);
    }
    if let Some(price) = price {
        edit = edit.with_price(price);
    }
    if let Some(description) = description {
        edit = edit.with_description(description);
    }

    if edit.is_empty() {
        return Err(CliError::Validation {
            field: "edit".into(),
            reason: "nothing to change; pass --name, --length, --price or --description".into(),
        });
    }
    Ok(edit)
}

async fn edit_and_save<S: BoatDataService>(
    list: &BoatList<S>,
    edit: BoatEdit,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if !util::confirm(&format!("Save changes to boat '{}'?", edit.id), global.yes)? {
        return Ok(());
    }

    let mut states = list.subscribe();
    list.stage_edit(edit);
    match list.save().await {
        SaveOutcome::Saved { count } => {
            tracing::debug!(count, "edits saved, waiting for refresh");
            let state = util::settled(&mut states, |s: &BoatListState| s.is_loading).await?;
            if state.phase == ListPhase::Error {
                return Err(CliError::Reported {
                    operation: "Refreshing boats".into(),
                });
            }
            print_boats(&state, global)
        }
        SaveOutcome::Failed { .. } => Err(CliError::Reported {
            operation: "Saving boat edits".into(),
        }),
        SaveOutcome::NothingToSave => Ok(()),
    }
}

// ── Show ─────────────────────────────────────────────────────────────

#[derive(serde::Serialize)]
struct BoatDetail {
    boat: Boat,
    reviews: Vec<fleetdeck_core::ReviewEntry>,
}

async fn show<S: BoatDataService>(
    service: Arc<S>,
    list: &BoatList<S>,
    bus: &SelectionBus,
    notifier: Arc<dyn Notifier>,
    boat: Boat,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut reviews = BoatReviews::new(service, notifier);
    reviews.follow_selection(bus);
    let mut review_states = reviews.subscribe();

    let tile = BoatTile::new(boat, None);
    let reached = list.update_selected_tile(tile.select());
    tracing::debug!(reached, "selection published");

    let state = util::settled(&mut review_states, |s: &ReviewsState| s.is_loading).await?;
    if state.reviews.is_none() && state.last_error.is_some() {
        return Err(CliError::Reported {
            operation: "Loading reviews".into(),
        });
    }

    let detail_view = BoatDetail {
        boat: tile.boat,
        reviews: state.reviews.as_deref().cloned().unwrap_or_default(),
    };
    let out = output::render_single(&global.output, &detail_view, render_detail, |d| {
        d.boat.id.to_string()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn render_detail(view: &BoatDetail) -> String {
    let mut out = detail(&view.boat);
    out.push_str("\n\n");
    if view.reviews.is_empty() {
        out.push_str("No reviews yet.");
    } else {
        let rows: Vec<ReviewRow> = view.reviews.iter().map(review_row).collect();
        out.push_str(
            &tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string(),
        );
    }
    out
}
