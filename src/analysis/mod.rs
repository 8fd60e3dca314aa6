pub mod queries;

use std::path::Path;

use rusqlite::Connection;
use tracing::{error, warn};

pub use queries::{OverspendingDay, RankedTotal};

/// How many budget periods make up the "recent" window.
pub const RECENT_WINDOW_DAYS: usize = 7;
/// How many entries the ranked top lists keep.
pub const TOP_LIMIT: usize = 3;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowSummary {
    pub days: usize,
    pub goal_saving: f64,
    pub total_saving: f64,
    pub top_categories: Vec<RankedTotal>,
    pub top_subtasks: Vec<RankedTotal>,
}

impl WindowSummary {
    pub fn goal_met(&self) -> bool {
        self.total_saving >= self.goal_saving
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisSummary {
    pub all_time: WindowSummary,
    pub recent: WindowSummary,
    pub overspending_days: Vec<OverspendingDay>,
}

/// Run the full aggregation pipeline against an uploaded database.
///
/// Never fails: a query that errors is logged and replaced by its default so
/// the remaining aggregations still run, and an unopenable file yields an
/// all-default summary that still renders.
pub fn analyze_database(path: &Path) -> AnalysisSummary {
    let conn = match Connection::open(path) {
        Ok(conn) => conn,
        Err(err) => {
            error!(path = %path.display(), error = %err, "failed to open uploaded database");
            return AnalysisSummary::default();
        }
    };

    let all_ids = or_default(queries::all_budget_ids(&conn), "all_budget_ids");
    let recent_ids = or_default(
        queries::recent_budget_ids(&conn, RECENT_WINDOW_DAYS),
        "recent_budget_ids",
    );

    AnalysisSummary {
        all_time: window_summary(&conn, &all_ids),
        recent: window_summary(&conn, &recent_ids),
        overspending_days: or_default(queries::overspending_days(&conn, TOP_LIMIT), "overspending_days"),
    }
}

fn window_summary(conn: &Connection, ids: &[i64]) -> WindowSummary {
    WindowSummary {
        days: ids.len(),
        goal_saving: or_default(queries::goal_saving(conn, ids), "goal_saving"),
        total_saving: or_default(queries::total_saving(conn, ids), "total_saving"),
        top_categories: or_default(queries::top_categories(conn, ids, TOP_LIMIT), "top_categories"),
        top_subtasks: or_default(queries::top_subtasks(conn, ids, TOP_LIMIT), "top_subtasks"),
    }
}

/// The degrade-on-failure policy: a failed query becomes its default value,
/// loudly.
fn or_default<T: Default>(result: rusqlite::Result<T>, query: &str) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            warn!(query, error = %err, "query failed, substituting default");
            T::default()
        }
    }
}
