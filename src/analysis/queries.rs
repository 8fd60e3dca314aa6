use rusqlite::{params, Connection, Result};

/// A label (category or sub-task) with its summed expense amount.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedTotal {
    pub label: String,
    pub total: f64,
}

/// A day whose summed task amounts exceeded its planned budget.
#[derive(Debug, Clone, PartialEq)]
pub struct OverspendingDay {
    pub date: String,
    pub total: f64,
    pub plan_budget: f64,
}

/// All budget-period ids, ordered by date ascending.
pub fn all_budget_ids(conn: &Connection) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT id FROM daily_budget ORDER BY date ASC")?;
    let rows = stmt.query_map([], |row| row.get(0))?;
    rows.collect()
}

/// The ids of the `limit` most recent budget periods.
pub fn recent_budget_ids(conn: &Connection, limit: usize) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT id FROM daily_budget ORDER BY date DESC LIMIT ?")?;
    let rows = stmt.query_map(params![limit as i64], |row| row.get(0))?;
    rows.collect()
}

/// Render an id set as a SQL IN filter. An empty set must still produce a
/// well-formed query, so it becomes an impossible-id filter instead.
fn id_filter(ids: &[i64]) -> String {
    if ids.is_empty() {
        return "(-1)".to_string();
    }
    let joined = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("({})", joined)
}

/// Savings goal over the given budget periods: 20% of the summed plan.
pub fn goal_saving(conn: &Connection, ids: &[i64]) -> Result<f64> {
    let sql = format!(
        "SELECT COALESCE(SUM(planBudget), 0) * 0.2 FROM daily_budget WHERE id IN {}",
        id_filter(ids)
    );
    conn.query_row(&sql, [], |row| row.get(0))
}

/// Actual savings achieved over the given budget periods.
pub fn total_saving(conn: &Connection, ids: &[i64]) -> Result<f64> {
    let sql = format!(
        "SELECT COALESCE(SUM(saving), 0) FROM daily_budget WHERE id IN {}",
        id_filter(ids)
    );
    conn.query_row(&sql, [], |row| row.get(0))
}

/// Expense categories ranked by summed amount within the given budget
/// periods. Tasks referencing a missing budget period drop out of the join.
pub fn top_categories(conn: &Connection, ids: &[i64], limit: usize) -> Result<Vec<RankedTotal>> {
    let sql = format!(
        "SELECT t.category, SUM(t.amount) AS total
         FROM tasks t
         JOIN daily_budget d ON t.dailyBudgetId = d.id
         WHERE d.id IN {}
         GROUP BY t.category
         ORDER BY total DESC
         LIMIT ?",
        id_filter(ids)
    );
    ranked_totals(conn, &sql, limit)
}

/// Same ranking keyed by sub-task label.
pub fn top_subtasks(conn: &Connection, ids: &[i64], limit: usize) -> Result<Vec<RankedTotal>> {
    let sql = format!(
        "SELECT t.subTask, SUM(t.amount) AS total
         FROM tasks t
         JOIN daily_budget d ON t.dailyBudgetId = d.id
         WHERE d.id IN {}
         GROUP BY t.subTask
         ORDER BY total DESC
         LIMIT ?",
        id_filter(ids)
    );
    ranked_totals(conn, &sql, limit)
}

fn ranked_totals(conn: &Connection, sql: &str, limit: usize) -> Result<Vec<RankedTotal>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params![limit as i64], |row| {
        Ok(RankedTotal {
            label: row.get(0)?,
            total: row.get(1)?,
        })
    })?;
    rows.collect()
}

/// Days whose summed task amounts exceed that day's planned budget, worst
/// first.
pub fn overspending_days(conn: &Connection, limit: usize) -> Result<Vec<OverspendingDay>> {
    let mut stmt = conn.prepare(
        "SELECT d.date, SUM(t.amount) AS total, d.planBudget
         FROM tasks t
         JOIN daily_budget d ON t.dailyBudgetId = d.id
         GROUP BY d.id
         HAVING total > d.planBudget
         ORDER BY total DESC
         LIMIT ?",
    )?;
    let rows = stmt.query_map(params![limit as i64], |row| {
        Ok(OverspendingDay {
            date: row.get(0)?,
            total: row.get(1)?,
            plan_budget: row.get(2)?,
        })
    })?;
    rows.collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE daily_budget (
                id INTEGER PRIMARY KEY,
                date TEXT NOT NULL,
                planBudget REAL NOT NULL,
                saving REAL NOT NULL
            );
            CREATE TABLE tasks (
                id INTEGER PRIMARY KEY,
                category TEXT NOT NULL,
                subTask TEXT NOT NULL,
                amount REAL NOT NULL,
                dailyBudgetId INTEGER NOT NULL
            );
            INSERT INTO daily_budget (id, date, planBudget, saving) VALUES
                (1, '2026-07-01', 50.0, 12.0),
                (2, '2026-07-02', 40.0, 5.0),
                (3, '2026-07-03', 60.0, 20.0);
            INSERT INTO tasks (category, subTask, amount, dailyBudgetId) VALUES
                ('Food', 'Lunch', 10.0, 1),
                ('Food', 'Dinner', 15.0, 2),
                ('Transport', 'Taxi', 30.0, 2),
                ('Transport', 'Fuel', 12.0, 3),
                ('Shopping', 'Clothes', 70.0, 3),
                ('Food', 'Snacks', 4.0, 99);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_ids_ordered_by_date() {
        let conn = fixture();
        assert_eq!(all_budget_ids(&conn).unwrap(), vec![1, 2, 3]);
        assert_eq!(recent_budget_ids(&conn, 2).unwrap(), vec![3, 2]);
    }

    #[test]
    fn test_goal_is_twenty_percent_of_summed_plan() {
        let conn = fixture();
        let ids = all_budget_ids(&conn).unwrap();
        let goal = goal_saving(&conn, &ids).unwrap();
        assert!((goal - 0.2 * 150.0).abs() < 1e-9);
        let saved = total_saving(&conn, &ids).unwrap();
        assert!((saved - 37.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_id_set_sums_to_zero() {
        let conn = fixture();
        assert_eq!(goal_saving(&conn, &[]).unwrap(), 0.0);
        assert_eq!(total_saving(&conn, &[]).unwrap(), 0.0);
        assert!(top_categories(&conn, &[], 3).unwrap().is_empty());
    }

    #[test]
    fn test_categories_ranked_descending_and_truncated() {
        let conn = fixture();
        let ids = all_budget_ids(&conn).unwrap();
        let ranked = top_categories(&conn, &ids, 2).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].label, "Shopping");
        assert!((ranked[0].total - 70.0).abs() < 1e-9);
        assert_eq!(ranked[1].label, "Transport");
        assert!((ranked[1].total - 42.0).abs() < 1e-9);
    }

    #[test]
    fn test_unmatched_task_is_excluded_from_join() {
        let conn = fixture();
        let ids = all_budget_ids(&conn).unwrap();
        // The 'Snacks' row references budget id 99, which does not exist.
        let ranked = top_subtasks(&conn, &ids, 10).unwrap();
        assert!(ranked.iter().all(|r| r.label != "Snacks"));
        let food_total: f64 = top_categories(&conn, &ids, 10)
            .unwrap()
            .iter()
            .find(|r| r.label == "Food")
            .map(|r| r.total)
            .unwrap();
        assert!((food_total - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_filter_restricts_aggregates() {
        let conn = fixture();
        let recent = recent_budget_ids(&conn, 2).unwrap();
        let ranked = top_categories(&conn, &recent, 10).unwrap();
        // Day 1 (Lunch, 10.0) falls outside the recent window.
        let food = ranked.iter().find(|r| r.label == "Food").unwrap();
        assert!((food.total - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_overspending_days_sorted_worst_first() {
        let conn = fixture();
        let days = overspending_days(&conn, 3).unwrap();
        // Day 3: 82.0 spent vs 60.0 planned; day 2: 45.0 vs 40.0.
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, "2026-07-03");
        assert!((days[0].total - 82.0).abs() < 1e-9);
        assert!((days[0].plan_budget - 60.0).abs() < 1e-9);
        assert_eq!(days[1].date, "2026-07-02");
    }

    #[test]
    fn test_missing_table_is_an_error_not_a_panic() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(all_budget_ids(&conn).is_err());
        assert!(overspending_days(&conn, 3).is_err());
    }
}
