use chrono::NaiveDate;

use crate::config::Config;
use crate::data::filter::{
    default_constraint, filtered_indices, matching_values, ColumnConstraint, FilterSpec,
    SkippedConstraint,
};
use crate::data::loader::{LoadIssue, LoadOutcome};
use crate::data::model::{ColumnProfile, Dataset};
use crate::metrics::AdInputs;
use crate::store::{Priority, Task, TaskStatus, TaskStore, User};
use crate::ui::plot::ChartConfig;

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Calculator,
    Tasks,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Dashboard, Page::Calculator, Page::Tasks];

    pub fn label(self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Calculator => "Calculator",
            Page::Tasks => "Tasks",
        }
    }
}

// ---------------------------------------------------------------------------
// Per-page state
// ---------------------------------------------------------------------------

/// Calculator page inputs.
pub struct CalculatorState {
    pub currency: String,
    pub inputs: AdInputs,
}

impl Default for CalculatorState {
    fn default() -> Self {
        CalculatorState {
            currency: "USD".to_string(),
            inputs: AdInputs::default(),
        }
    }
}

/// The add-task form, kept across frames until submitted.
pub struct TaskForm {
    pub name: String,
    pub status: TaskStatus,
    pub due_date: NaiveDate,
    pub priority: Priority,
    pub attachment: Option<(String, Vec<u8>)>,
    pub assigned_to: String,
    pub assigned_by: String,
}

impl Default for TaskForm {
    fn default() -> Self {
        TaskForm {
            name: String::new(),
            status: TaskStatus::ToDo,
            due_date: chrono::Local::now().date_naive(),
            priority: Priority::Low,
            attachment: None,
            assigned_to: String::new(),
            assigned_by: String::new(),
        }
    }
}

/// Tasks page: the form, cached store rows, and the add-user inputs.
/// The caches are refreshed after every mutation, not every frame.
#[derive(Default)]
pub struct TasksPage {
    pub form: TaskForm,
    pub tasks: Vec<Task>,
    pub users: Vec<User>,
    pub new_user_email: String,
    pub new_user_name: String,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering. One instance per
/// session, passed explicitly into every panel function.
pub struct AppState {
    pub page: Page,
    pub config: Config,

    /// Task storage (None when the database could not be opened).
    pub store: Option<TaskStore>,

    /// Loaded dataset (None until the user loads something).
    pub dataset: Option<Dataset>,

    /// Problems from the last load, shown in the sidebar.
    pub load_issues: Vec<LoadIssue>,

    /// Per-column constraints for the columns chosen for filtering.
    pub filters: FilterSpec,

    /// Row indices passing the current filters (recomputed in full on
    /// every filter change).
    pub visible_indices: Vec<usize>,

    /// Constraints skipped during the last filter pass.
    pub skipped_constraints: Vec<SkippedConstraint>,

    /// Chart type and axis columns.
    pub chart: ChartConfig,

    /// Whether a chart has been requested and should stay visible.
    pub show_chart: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    pub calculator: CalculatorState,
    pub tasks: TasksPage,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let store = match TaskStore::open(&config.database_path) {
            Ok(store) => Some(store),
            Err(e) => {
                log::error!("could not open task database: {e}");
                None
            }
        };
        let mut state = AppState {
            page: Page::Dashboard,
            config,
            store,
            dataset: None,
            load_issues: Vec::new(),
            filters: FilterSpec::new(),
            visible_indices: Vec::new(),
            skipped_constraints: Vec::new(),
            chart: ChartConfig::default(),
            show_chart: false,
            status_message: None,
            calculator: CalculatorState::default(),
            tasks: TasksPage::default(),
        };
        state.refresh_store_cache();
        state
    }

    /// Ingest a newly loaded dataset, replacing the previous one
    /// wholesale and resetting filters and chart selections.
    pub fn ingest(&mut self, outcome: LoadOutcome) {
        let LoadOutcome { dataset, issues } = outcome;
        self.filters = FilterSpec::new();
        self.visible_indices = (0..dataset.len()).collect();
        self.skipped_constraints = Vec::new();
        self.load_issues = issues;

        let first = dataset.columns.first().map(|c| c.name.clone());
        self.chart = ChartConfig {
            x_column: first.clone().unwrap_or_default(),
            y_column: first.unwrap_or_default(),
            ..ChartConfig::default()
        };
        self.show_chart = false;

        self.dataset = Some(dataset);
        self.status_message = None;
    }

    /// Recompute `visible_indices` after a filter change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            let (indices, skipped) = filtered_indices(ds, &self.filters);
            self.visible_indices = indices;
            self.skipped_constraints = skipped;
        }
    }

    pub fn is_filtered(&self, column: &str) -> bool {
        self.filters.contains_key(column)
    }

    /// Start filtering a column with its pass-everything default.
    pub fn add_filter(&mut self, column: &str) {
        if let Some(ds) = &self.dataset {
            if let Some(col) = ds.column(column) {
                self.filters.insert(column.to_string(), default_constraint(col));
            }
        }
        self.refilter();
    }

    /// Stop filtering a column entirely.
    pub fn remove_filter(&mut self, column: &str) {
        self.filters.remove(column);
        self.refilter();
    }

    /// Update a text column's search term; every matching value starts
    /// selected, values no longer matching drop out.
    pub fn set_category_search(&mut self, column: &str, search: String) {
        let Some(matches) = self.search_matches(column, &search) else {
            return;
        };
        if let Some(ColumnConstraint::Values { search: s, selected }) =
            self.filters.get_mut(column)
        {
            *s = search;
            *selected = matches.into_iter().collect();
        }
        self.refilter();
    }

    /// Toggle a single value inside a text column's selection.
    pub fn toggle_category(&mut self, column: &str, value: &str) {
        if let Some(ColumnConstraint::Values { selected, .. }) = self.filters.get_mut(column) {
            if !selected.remove(value) {
                selected.insert(value.to_string());
            }
        }
        self.refilter();
    }

    /// Select every value matching the current search.
    pub fn select_all_matching(&mut self, column: &str) {
        let search = match self.filters.get(column) {
            Some(ColumnConstraint::Values { search, .. }) => search.clone(),
            _ => return,
        };
        self.set_category_search(column, search);
    }

    /// Clear the selection; the filtered view drops to zero rows.
    pub fn select_no_values(&mut self, column: &str) {
        if let Some(ColumnConstraint::Values { selected, .. }) = self.filters.get_mut(column) {
            selected.clear();
        }
        self.refilter();
    }

    fn search_matches(&self, column: &str, search: &str) -> Option<Vec<String>> {
        let ds = self.dataset.as_ref()?;
        match &ds.column(column)?.profile {
            ColumnProfile::Text { unique } => Some(matching_values(unique, search)),
            _ => None,
        }
    }

    /// Re-read the task and user caches after a store mutation.
    pub fn refresh_store_cache(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        match store.tasks() {
            Ok(tasks) => self.tasks.tasks = tasks,
            Err(e) => self.status_message = Some(format!("Error: {e}")),
        }
        match store.users() {
            Ok(users) => {
                if self.tasks.form.assigned_to.is_empty() {
                    if let Some(first) = users.first() {
                        self.tasks.form.assigned_to = first.name.clone();
                        self.tasks.form.assigned_by = first.name.clone();
                    }
                }
                self.tasks.users = users;
            }
            Err(e) => self.status_message = Some(format!("Error: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{build_dataset, read_source};

    fn outcome(csv_text: &str) -> LoadOutcome {
        let (table, issues) = read_source("test.csv", csv_text.as_bytes()).unwrap();
        LoadOutcome {
            dataset: build_dataset(vec![table]),
            issues,
        }
    }

    fn state_with(csv_text: &str) -> AppState {
        let mut state = AppState {
            page: Page::Dashboard,
            config: Config::default(),
            store: None,
            dataset: None,
            load_issues: Vec::new(),
            filters: FilterSpec::new(),
            visible_indices: Vec::new(),
            skipped_constraints: Vec::new(),
            chart: ChartConfig::default(),
            show_chart: false,
            status_message: None,
            calculator: CalculatorState::default(),
            tasks: TasksPage::default(),
        };
        state.ingest(outcome(csv_text));
        state
    }

    #[test]
    fn ingest_shows_every_row_and_seeds_chart_columns() {
        let state = state_with("amount,category\n1,fruit\n5,fish\n");
        assert_eq!(state.visible_indices, vec![0, 1]);
        assert_eq!(state.chart.x_column, "amount");
        assert_eq!(state.chart.y_column, "amount");
        assert!(!state.show_chart);
    }

    #[test]
    fn fresh_filter_keeps_every_row() {
        let mut state = state_with("amount,category\n1,fruit\n5,fish\n");
        state.add_filter("category");
        assert_eq!(state.visible_indices.len(), 2);
        state.remove_filter("category");
        assert!(state.filters.is_empty());
    }

    #[test]
    fn search_narrows_the_selection_to_matches() {
        let mut state = state_with("category\nfruit\nfish\nvegetable\n");
        state.add_filter("category");
        state.set_category_search("category", "f".to_string());
        // "fruit" and "fish" match, "vegetable" does not.
        assert_eq!(state.visible_indices, vec![0, 1]);

        state.set_category_search("category", "zzz".to_string());
        assert!(state.visible_indices.is_empty());
    }

    #[test]
    fn select_none_then_toggle_restores_one_value() {
        let mut state = state_with("category\nfruit\nfish\n");
        state.add_filter("category");
        state.select_no_values("category");
        assert!(state.visible_indices.is_empty());
        state.toggle_category("category", "fish");
        assert_eq!(state.visible_indices, vec![1]);
    }
}
