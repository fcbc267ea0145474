/// Habit entity and related functionality
///
/// This module defines the core Habit struct that represents something a user
/// wants to do regularly, along with validation and completion tracking.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    CalendarDate, CategoryId, DomainError, Frequency, HabitId, StatsEngine, StatsResult, UserId,
};

/// Longest title a habit may have, in characters
pub const MAX_TITLE_LEN: usize = 100;

/// A habit represents something the user wants to do regularly
///
/// Each habit belongs to exactly one user, may be filed under one of that
/// user's categories, and records the calendar days it was completed on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Owner of this habit
    pub user_id: UserId,
    /// Display title (e.g., "Morning Run", "Read for 30min")
    pub title: String,
    /// How often this habit should be performed
    pub frequency: Frequency,
    /// Category for organization, `None` when uncategorized
    pub category_id: Option<CategoryId>,
    /// Days on which the habit was completed, each at most once
    pub completion_dates: BTreeSet<CalendarDate>,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
}

impl Habit {
    /// Create a new habit with validation
    ///
    /// The title is trimmed before it is stored. New habits start with no
    /// completions.
    pub fn new(
        user_id: UserId,
        title: &str,
        frequency: Frequency,
        category_id: Option<CategoryId>,
    ) -> Result<Self, DomainError> {
        let title = Self::validate_title(title)?;

        Ok(Self {
            id: HabitId::new(),
            user_id,
            title,
            frequency,
            category_id,
            completion_dates: BTreeSet::new(),
            created_at: Utc::now(),
        })
    }

    /// Create a habit from existing data (used when loading from database)
    ///
    /// This constructor assumes data is already validated.
    pub fn from_existing(
        id: HabitId,
        user_id: UserId,
        title: String,
        frequency: Frequency,
        category_id: Option<CategoryId>,
        completion_dates: BTreeSet<CalendarDate>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            title,
            frequency,
            category_id,
            completion_dates,
            created_at,
        }
    }

    /// Update the habit's properties with validation
    ///
    /// `category_id` is doubly optional: `None` leaves the category alone,
    /// `Some(None)` clears it. Nothing is applied if validation fails.
    pub fn update(
        &mut self,
        title: Option<&str>,
        frequency: Option<Frequency>,
        category_id: Option<Option<CategoryId>>,
    ) -> Result<(), DomainError> {
        let title = title.map(Self::validate_title).transpose()?;

        if let Some(new_title) = title {
            self.title = new_title;
        }
        if let Some(new_frequency) = frequency {
            self.frequency = new_frequency;
        }
        if let Some(new_category) = category_id {
            self.category_id = new_category;
        }

        Ok(())
    }

    /// Record a completion; returns false if the date was already recorded
    pub fn add_completion(&mut self, date: CalendarDate) -> bool {
        self.completion_dates.insert(date)
    }

    /// Forget a completion; returns false if the date was not recorded
    pub fn remove_completion(&mut self, date: CalendarDate) -> bool {
        self.completion_dates.remove(&date)
    }

    /// Flip the completion state of a date, returning whether it is now recorded
    pub fn toggle_completion(&mut self, date: CalendarDate) -> bool {
        if self.remove_completion(date) {
            false
        } else {
            self.add_completion(date)
        }
    }

    pub fn is_completed_on(&self, date: CalendarDate) -> bool {
        self.completion_dates.contains(&date)
    }

    /// Most recent completion, if any
    pub fn last_completed(&self) -> Option<CalendarDate> {
        self.completion_dates.iter().next_back().copied()
    }

    /// Statistics for this habit over `[start, end]`
    pub fn stats(&self, engine: &StatsEngine, start: CalendarDate, end: CalendarDate) -> StatsResult {
        engine.compute_stats(self.frequency, &self.completion_dates, start, end)
    }

    /// Validate a habit title according to business rules
    fn validate_title(title: &str) -> Result<String, DomainError> {
        let trimmed = title.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidHabitTitle(
                "Habit title cannot be empty".to_string(),
            ));
        }

        if trimmed.chars().count() > MAX_TITLE_LEN {
            return Err(DomainError::InvalidHabitTitle(format!(
                "Habit title cannot be longer than {} characters",
                MAX_TITLE_LEN
            )));
        }

        Ok(trimmed.to_string())
    }
}
