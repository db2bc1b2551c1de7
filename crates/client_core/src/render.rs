use std::fmt;

use shared::{
    domain::{Activity, Directory},
    error::LOAD_FAILURE_NOTICE,
};

use crate::{
    coordinator::MutationCoordinator,
    error::{LoadFailure, MutationError},
};

pub const NO_PARTICIPANTS_NOTICE: &str = "No participants yet";
pub const SELECTOR_PLACEHOLDER: &str = "-- Select an activity --";

/// Withdrawal handle for one participant row. The `(activity, email)` pair is
/// fixed when the row is rendered and cannot be changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawControl {
    activity: String,
    email: String,
}

impl WithdrawControl {
    fn bind(activity: &str, email: &str) -> Self {
        Self {
            activity: activity.to_string(),
            email: email.to_string(),
        }
    }

    pub fn activity(&self) -> &str {
        &self.activity
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub async fn trigger(
        &self,
        coordinator: &MutationCoordinator,
    ) -> Result<Option<String>, MutationError> {
        coordinator.withdraw(&self.activity, &self.email).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantRow {
    pub email: String,
    pub withdraw: WithdrawControl,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticipantList {
    Empty { notice: &'static str },
    Rows(Vec<ParticipantRow>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityCard {
    pub name: String,
    pub description: String,
    pub schedule: String,
    pub spots_left: i64,
    pub participants: ParticipantList,
}

/// Option list of the enroll form. Rebuilt on every render with no selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollSelector {
    options: Vec<String>,
    selected: Option<String>,
}

impl EnrollSelector {
    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Selects an option by name; unknown names leave the selection untouched.
    pub fn select(&mut self, name: &str) -> bool {
        if self.options.iter().any(|option| option == name) {
            self.selected = Some(name.to_string());
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedView {
    Failed {
        notice: String,
    },
    Listing {
        cards: Vec<ActivityCard>,
        selector: EnrollSelector,
    },
}

impl RenderedView {
    pub fn cards(&self) -> &[ActivityCard] {
        match self {
            RenderedView::Listing { cards, .. } => cards,
            RenderedView::Failed { .. } => &[],
        }
    }

    pub fn selector(&self) -> Option<&EnrollSelector> {
        match self {
            RenderedView::Listing { selector, .. } => Some(selector),
            RenderedView::Failed { .. } => None,
        }
    }

    pub fn selector_mut(&mut self) -> Option<&mut EnrollSelector> {
        match self {
            RenderedView::Listing { selector, .. } => Some(selector),
            RenderedView::Failed { .. } => None,
        }
    }

    pub fn card(&self, name: &str) -> Option<&ActivityCard> {
        self.cards().iter().find(|card| card.name == name)
    }

    /// All withdrawal controls in display order. The position of a control in
    /// this sequence is the row number shown by the text rendering.
    pub fn withdraw_controls(&self) -> impl Iterator<Item = &WithdrawControl> {
        self.cards()
            .iter()
            .flat_map(|card| match &card.participants {
                ParticipantList::Rows(rows) => rows.as_slice(),
                ParticipantList::Empty { .. } => &[][..],
            })
            .map(|row| &row.withdraw)
    }
}

impl fmt::Display for RenderedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (cards, selector) = match self {
            RenderedView::Failed { notice } => return writeln!(f, "{notice}"),
            RenderedView::Listing { cards, selector } => (cards, selector),
        };

        let mut row_number = 0usize;
        for card in cards {
            writeln!(f, "{}", card.name)?;
            writeln!(f, "  {}", card.description)?;
            writeln!(f, "  Schedule: {}", card.schedule)?;
            writeln!(f, "  Availability: {} spots left", card.spots_left)?;
            writeln!(f, "  Participants:")?;
            match &card.participants {
                ParticipantList::Empty { notice } => writeln!(f, "    {notice}")?,
                ParticipantList::Rows(rows) => {
                    for row in rows {
                        row_number += 1;
                        writeln!(f, "    [{row_number}] {} (withdraw)", row.email)?;
                    }
                }
            }
            writeln!(f)?;
        }

        writeln!(f, "Enroll in:")?;
        writeln!(f, "  {SELECTOR_PLACEHOLDER}")?;
        for (index, option) in selector.options.iter().enumerate() {
            writeln!(f, "  ({}) {option}", index + 1)?;
        }
        Ok(())
    }
}

/// Rebuilds the whole view from one loader result. Holds no state, so the
/// same input always yields the same view.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewRenderer;

impl ViewRenderer {
    pub fn render(&self, snapshot: &Result<Directory, LoadFailure>) -> RenderedView {
        match snapshot {
            Ok(directory) => self.render_directory(directory),
            Err(_) => RenderedView::Failed {
                notice: LOAD_FAILURE_NOTICE.to_string(),
            },
        }
    }

    pub fn render_directory(&self, directory: &Directory) -> RenderedView {
        let cards = directory
            .iter()
            .map(|(name, activity)| render_card(name, activity))
            .collect();
        let selector = EnrollSelector {
            options: directory.names().map(str::to_string).collect(),
            selected: None,
        };
        RenderedView::Listing { cards, selector }
    }
}

fn render_card(name: &str, activity: &Activity) -> ActivityCard {
    let participants = if activity.participants.is_empty() {
        ParticipantList::Empty {
            notice: NO_PARTICIPANTS_NOTICE,
        }
    } else {
        ParticipantList::Rows(
            activity
                .participants
                .iter()
                .map(|email| ParticipantRow {
                    email: email.clone(),
                    withdraw: WithdrawControl::bind(name, email),
                })
                .collect(),
        )
    };

    ActivityCard {
        name: name.to_string(),
        description: activity.description.clone(),
        schedule: activity.schedule.clone(),
        spots_left: activity.spots_left(),
        participants,
    }
}
