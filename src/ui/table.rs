use tabled::{settings::Style, Table, Tabled};
use crate::habit::HabitStatus;
use crate::storage::DbStats;
use crate::ui::output::mark;

#[derive(Tabled)]
pub struct HabitRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Habit")]
    pub name: String,
    #[tabled(rename = "Today")]
    pub today: String,
}

impl From<&HabitStatus> for HabitRow {
    fn from(habit: &HabitStatus) -> Self {
        Self {
            id: habit.id.get(),
            name: habit.name.clone(),
            today: mark(habit.is_completed_today),
        }
    }
}

#[derive(Tabled)]
pub struct StatRow {
    #[tabled(rename = "Metric")]
    pub metric: &'static str,
    #[tabled(rename = "Value")]
    pub value: usize,
}

/// Rounded table of habits; empty string for an empty list
pub fn habits_table(habits: &[HabitStatus]) -> String {
    if habits.is_empty() {
        return String::new();
    }
    let rows: Vec<HabitRow> = habits.iter().map(HabitRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn stats_table(stats: &DbStats) -> String {
    let rows = vec![
        StatRow { metric: "Habits", value: stats.habits },
        StatRow { metric: "Entries", value: stats.entries },
        StatRow { metric: "Completed", value: stats.completed_entries },
    ];
    Table::new(rows).with(Style::rounded()).to_string()
}
