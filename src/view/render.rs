//! Plain-text rendering of the view models for terminals

use std::fmt::Write;

use crate::driver::FeedState;

use super::leaderboard::Leaderboard;
use super::schedule::ScheduleView;
use super::session::SessionSummary;

const LEADERBOARD_HEADERS: [&str; 10] =
    ["Pos", "#", "Driver", "Ctry", "Team", "Status", "Laps", "Last Lap", "Best Lap", "Gap"];

/// Columns that read better right-aligned.
const RIGHT_ALIGNED: [usize; 4] = [6, 7, 8, 9];

/// Simple column-aligned table.
struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    right_aligned: Vec<usize>,
}

impl Table {
    fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            right_aligned: Vec::new(),
        }
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }
        widths
    }

    fn write_line(&self, out: &mut String, cells: &[String], widths: &[usize]) {
        let line: Vec<String> = cells
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(column, (cell, width))| {
                let pad = width.saturating_sub(cell.chars().count());
                if self.right_aligned.contains(&column) {
                    format!("{}{}", " ".repeat(pad), cell)
                } else {
                    format!("{}{}", cell, " ".repeat(pad))
                }
            })
            .collect();
        let _ = writeln!(out, "{}", line.join("  ").trim_end());
    }

    fn render(&self) -> String {
        let widths = self.widths();
        let mut out = String::new();
        self.write_line(&mut out, &self.headers, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        let _ = writeln!(out, "{}", rule.join("  "));
        for row in &self.rows {
            self.write_line(&mut out, row, &widths);
        }
        out
    }
}

/// Header lines for a session.
pub fn render_summary(summary: &SessionSummary) -> String {
    let mut out = String::new();
    let marker = if summary.chequered_flag { " 🏁" } else { "" };
    let _ = writeln!(out, "{}{}", summary.title, marker);
    let _ = writeln!(
        out,
        "[{}]  Flag: {}  Air: {}  Track: {}  |  {} Drivers",
        summary.status, summary.flag, summary.ambient, summary.track, summary.driver_count
    );
    let _ = writeln!(out, "{}", summary.caption());
    out
}

/// Standings table.
pub fn render_leaderboard(board: &Leaderboard) -> String {
    if board.is_empty() {
        return "No participants.\n".to_string();
    }

    let mut table = Table::new(&LEADERBOARD_HEADERS);
    table.right_aligned = RIGHT_ALIGNED.to_vec();
    table.rows = board
        .rows
        .iter()
        .map(|row| {
            vec![
                row.position.clone(),
                row.number.clone(),
                row.driver.clone(),
                row.country.clone(),
                row.team.clone(),
                row.status.to_string(),
                row.laps.clone(),
                row.last_lap.clone(),
                row.best_lap.clone(),
                row.gap.clone(),
            ]
        })
        .collect();
    table.render()
}

/// Schedule screen for every state.
pub fn render_schedule(view: &ScheduleView) -> String {
    match view {
        ScheduleView::Loading => "Loading schedule...\n".to_string(),
        ScheduleView::Failed { message } => format!("Error loading schedule: {}\n", message),
        ScheduleView::Empty => "No races found for this championship.\n".to_string(),
        ScheduleView::Ready(races) => {
            let mut out = String::new();
            for race in races {
                let _ = writeln!(out, "{}", race.name);
                let mut table = Table::new(&["Session", "Starts", "Status"]);
                table.rows = race
                    .sessions
                    .iter()
                    .map(|s| vec![s.name.clone(), s.starts.clone(), s.status_label().to_string()])
                    .collect();
                out.push_str(&table.render());
                out.push('\n');
            }
            out
        }
    }
}

/// One-line feed status for the live view.
pub fn render_feed_state(state: &FeedState) -> String {
    format!("Feed: {}", state)
}
