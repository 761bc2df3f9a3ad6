use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HabitDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

/// Display order matters: chart colours are assigned by position.
pub static HABITS: [HabitDefinition; 8] = [
    HabitDefinition {
        id: "sleep",
        name: "Sleep",
        description: "7+ hours",
        icon: "🌙",
        color: "#a78bfa",
    },
    HabitDefinition {
        id: "clean-food",
        name: "Clean Food",
        description: "Healthy eating",
        icon: "🥗",
        color: "#34d399",
    },
    HabitDefinition {
        id: "water",
        name: "Water Intake",
        description: "3L minimum",
        icon: "💧",
        color: "#60a5fa",
    },
    HabitDefinition {
        id: "gym",
        name: "Gym",
        description: "Workout session",
        icon: "💪",
        color: "#f87171",
    },
    HabitDefinition {
        id: "boxing",
        name: "Boxing",
        description: "Combat training",
        icon: "🥊",
        color: "#fb923c",
    },
    HabitDefinition {
        id: "study",
        name: "Study",
        description: "Learning time",
        icon: "📚",
        color: "#fbbf24",
    },
    HabitDefinition {
        id: "skill-building",
        name: "Skill Building",
        description: "Practice & improve",
        icon: "🎯",
        color: "#00ffc8",
    },
    HabitDefinition {
        id: "self-care",
        name: "Self Care",
        description: "Mind & body",
        icon: "🧘",
        color: "#f472b6",
    },
];

static HABIT_INDEX: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    HABITS
        .iter()
        .enumerate()
        .map(|(position, habit)| (habit.id, position))
        .collect()
});

const CHART_PALETTE: [&str; 8] = [
    "purple", "green", "blue", "orange", "pink", "accent", "orange", "pink",
];

const QUOTES: [&str; 10] = [
    "Discipline is the bridge between goals and accomplishment.",
    "Small daily improvements lead to stunning results.",
    "The secret of your success is found in your daily routine.",
    "Champions keep playing until they get it right.",
    "Excellence is not a destination but a continuous journey.",
    "Your future is created by what you do today.",
    "Success is the sum of small efforts repeated day in and day out.",
    "Be stronger than your excuses.",
    "Every day is a chance to get better.",
    "Consistency is what transforms average into excellence.",
];

pub fn catalog() -> &'static [HabitDefinition] {
    &HABITS
}

pub fn find_habit(id: &str) -> Option<&'static HabitDefinition> {
    HABIT_INDEX.get(id).map(|&position| &HABITS[position])
}

/// Bar colour for the habit at `index` in the catalog.
pub fn chart_color(index: usize) -> &'static str {
    CHART_PALETTE[index % CHART_PALETTE.len()]
}

/// Same quote for the whole day, rotating by day of year.
pub fn daily_quote(date: NaiveDate) -> &'static str {
    QUOTES[date.ordinal() as usize % QUOTES.len()]
}
