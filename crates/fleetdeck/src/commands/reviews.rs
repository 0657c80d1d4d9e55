//! Reviews command handler.

use std::sync::Arc;

use tabled::Tabled;

use fleetdeck_core::{BoatDataService, BoatId, BoatReviews, ReviewEntry, ReviewsState};

use crate::cli::{GlobalOpts, OutputFormat, ReviewsArgs};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
pub(crate) struct ReviewRow {
    #[tabled(rename = "Reviewer")]
    reviewer: String,
    #[tabled(rename = "Rating")]
    rating: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Review")]
    text: String,
    #[tabled(rename = "Date")]
    date: String,
}

pub(crate) fn review_row(review: &ReviewEntry) -> ReviewRow {
    ReviewRow {
        reviewer: review.reviewer_name.clone().unwrap_or_else(|| "-".into()),
        rating: review.rating.map(stars).unwrap_or_default(),
        title: review.title.clone().unwrap_or_default(),
        text: review.text.clone(),
        date: review
            .created_at
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
    }
}

fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(5));
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

pub async fn handle<S: BoatDataService>(
    service: Arc<S>,
    args: ReviewsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let ReviewsArgs { id, refresh } = args;
    let boat_id = BoatId::parse_optional(&id).ok_or_else(|| CliError::Validation {
        field: "id".into(),
        reason: "boat ID cannot be empty".into(),
    })?;

    let reviews = BoatReviews::new(service, util::notifier(global));
    let mut states = reviews.subscribe();

    reviews.set_record_id(Some(boat_id));
    let mut state = util::settled(&mut states, |s: &ReviewsState| s.is_loading).await?;

    if refresh && reviews.refresh() {
        state = util::settled(&mut states, |s: &ReviewsState| s.is_loading).await?;
    }

    let Some(entries) = state.reviews else {
        return Err(CliError::Reported {
            operation: "Loading reviews".into(),
        });
    };

    if entries.is_empty() && matches!(global.output, OutputFormat::Table) {
        if !global.quiet {
            eprintln!("No reviews yet.");
        }
        return Ok(());
    }

    let out = output::render_list(&global.output, entries.as_slice(), review_row, |r| r.id.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
