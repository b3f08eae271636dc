use std::collections::BTreeSet;

use tracing::{debug, error, info, trace};

use crate::domain::{
    AppConfig, AppError, Assignment, EngineError, Message, Submission, SubmissionBatch,
    SubmissionStatus, HELP_TEXT,
};
use crate::engine::{TableEngine, TableView};
use crate::filter::FilterValue;
use crate::inputter::{InputResult, Inputter};
use crate::sort::{Direction, SortState};
use crate::table::{self, COL_STATUS, COL_SUBMITTED};

#[derive(Debug, PartialEq, Eq)]
pub enum RunStatus {
    Ready,
    Quitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modus {
    Table,
    Facet,
    Popup,
    Input,
}

/// One row of the status facet screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetRow {
    pub wire: String,
    pub label: String,
    pub count: usize,
    pub active: bool,
}

pub struct Model {
    engine: TableEngine<Submission>,
    view: TableView,
    assignment: Assignment,
    pub status: RunStatus,
    modus: Modus,
    previous_modus: Modus,
    curser_row: usize,
    curser_column: usize,
    facet_curser: usize,
    input: Inputter,
    last_input: InputResult,
    input_target: Option<&'static str>,
    status_message: String,
}

impl Model {
    pub fn init(
        config: &AppConfig,
        batch: Result<SubmissionBatch, AppError>,
    ) -> Result<Self, AppError> {
        // A failed load is "no data", not a startup failure
        let (assignment, submissions, status_message) = match batch {
            Ok(batch) => {
                let message = format!(
                    "Loaded {} submissions for \"{}\"",
                    batch.submissions.len(),
                    batch.assignment.name
                );
                (batch.assignment, batch.submissions, message)
            }
            Err(e) => {
                error!("Loading submissions failed: {e}");
                (Assignment::default(), Vec::new(), format!("No data: {e}"))
            }
        };

        let registry = table::submission_columns(assignment.max_score)?;
        let mut engine = TableEngine::new(registry, config.page_size)?;
        // Newest submission first, like the dashboard's default ordering
        engine.set_sort(Some(SortState {
            key: COL_SUBMITTED.to_string(),
            direction: Direction::Descending,
        }))?;
        let view = engine.load(submissions)?;
        info!("Model ready: {} rows, page size {}", view.total, view.page_size);

        Ok(Model {
            engine,
            view,
            assignment,
            status: RunStatus::Ready,
            modus: Modus::Table,
            previous_modus: Modus::Table,
            curser_row: 0,
            curser_column: 0,
            facet_curser: 0,
            input: Inputter::default(),
            last_input: InputResult::default(),
            input_target: None,
            status_message,
        })
    }

    pub fn update(&mut self, message: Message) -> Result<(), AppError> {
        trace!("Update: modus {:?}, message {:?}", self.modus, message);
        match self.modus {
            Modus::Table => match message {
                Message::Quit => self.quit(),
                Message::MoveUp => self.move_row_curser(-1),
                Message::MoveDown => self.move_row_curser(1),
                Message::MoveLeft => self.move_column_curser(-1),
                Message::MoveRight => self.move_column_curser(1),
                Message::NextPage => self.next_page(),
                Message::PrevPage => self.previous_page(),
                Message::GrowPageSize => self.change_page_size(5),
                Message::ShrinkPageSize => self.change_page_size(-5),
                Message::SortAscending => self.sort_selected_column(Direction::Ascending),
                Message::SortDescending => self.sort_selected_column(Direction::Descending),
                Message::Facet => self.enter_facet(),
                Message::FilterBySubmitter => {
                    self.enter_input(table::COL_SUBMITTER, "Search by submitter name")
                }
                Message::FilterById => self.enter_input(table::COL_ID, "Search by id"),
                Message::ResetFilters => self.reset_filters(),
                Message::Help => self.show_help(),
                _ => (),
            },
            Modus::Facet => match message {
                Message::Quit => self.quit(),
                Message::MoveUp => self.move_facet_curser(-1),
                Message::MoveDown => self.move_facet_curser(1),
                Message::Enter => self.toggle_facet_value(),
                Message::Exit => self.leave_facet(),
                Message::Help => self.show_help(),
                _ => (),
            },
            Modus::Popup => match message {
                Message::Quit => self.quit(),
                Message::Exit | Message::Enter => self.close_popup(),
                _ => (),
            },
            Modus::Input => {
                if let Message::RawKey(key) = message {
                    self.raw_input(key);
                }
            }
        }
        Ok(())
    }

    /// While the input line is active, keys bypass the controller mapping.
    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::Input
    }

    pub fn quit(&mut self) {
        self.status = RunStatus::Quitting;
    }

    pub fn view(&self) -> &TableView {
        &self.view
    }

    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    pub fn modus(&self) -> Modus {
        self.modus
    }

    pub fn curser(&self) -> (usize, usize) {
        (self.curser_row, self.curser_column)
    }

    pub fn facet_curser(&self) -> usize {
        self.facet_curser
    }

    pub fn input_state(&self) -> &InputResult {
        &self.last_input
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn popup_text(&self) -> &str {
        HELP_TEXT
    }

    /// Column keys in registry order, matching the view's header order.
    pub fn column_keys(&self) -> Vec<&'static str> {
        self.engine.registry().iter().map(|c| c.key()).collect()
    }

    /// Facet screen rows for the status column, engine order, with the
    /// currently selected filter values marked active.
    pub fn facet_rows(&self) -> Vec<FacetRow> {
        let selected: BTreeSet<String> = self.engine.filter_set(COL_STATUS).into_iter().collect();
        self.view
            .facets
            .get(COL_STATUS)
            .map(|facets| {
                facets
                    .iter()
                    .map(|f| FacetRow {
                        wire: f.value.clone(),
                        label: SubmissionStatus::label_for(&f.value).to_string(),
                        count: f.count,
                        active: selected.contains(&f.value),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    // -------------------- Control handling functions ---------------------- //

    fn apply_engine(&mut self, result: Result<TableView, EngineError>) {
        match result {
            Ok(view) => {
                self.view = view;
                self.clamp_cursers();
            }
            // Misconfiguration and rejected actions surface on the status line
            Err(e) => {
                error!("Engine action rejected: {e}");
                self.set_status_message(e.to_string());
            }
        }
    }

    fn clamp_cursers(&mut self) {
        let rows = self.view.rows.len();
        self.curser_row = if rows == 0 {
            0
        } else {
            std::cmp::min(self.curser_row, rows - 1)
        };
        let facets = self.facet_rows().len();
        self.facet_curser = if facets == 0 {
            0
        } else {
            std::cmp::min(self.facet_curser, facets - 1)
        };
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    fn move_row_curser(&mut self, step: i64) {
        let rows = self.view.rows.len();
        if rows == 0 {
            return;
        }
        let pos = self.curser_row as i64 + step;
        self.curser_row = pos.clamp(0, rows as i64 - 1) as usize;
    }

    fn move_column_curser(&mut self, step: i64) {
        let columns = self.engine.registry().len();
        if columns == 0 {
            return;
        }
        let pos = self.curser_column as i64 + step;
        self.curser_column = pos.clamp(0, columns as i64 - 1) as usize;
    }

    fn move_facet_curser(&mut self, step: i64) {
        let rows = self.facet_rows().len();
        if rows == 0 {
            return;
        }
        let pos = self.facet_curser as i64 + step;
        self.facet_curser = pos.clamp(0, rows as i64 - 1) as usize;
    }

    fn next_page(&mut self) {
        let index = self.view.page_index + 1;
        let result = self.engine.set_page(index);
        self.apply_engine(result);
    }

    fn previous_page(&mut self) {
        let index = self.view.page_index.saturating_sub(1);
        let result = self.engine.set_page(index);
        self.apply_engine(result);
    }

    fn change_page_size(&mut self, step: i64) {
        let size = std::cmp::max(1, self.view.page_size as i64 + step) as usize;
        debug!("Page size {} -> {}", self.view.page_size, size);
        let result = self.engine.set_page_size(size);
        self.apply_engine(result);
    }

    fn sort_selected_column(&mut self, direction: Direction) {
        let Some(column) = self.engine.registry().iter().nth(self.curser_column) else {
            return;
        };
        let key = column.key().to_string();
        let result = self.engine.set_sort(Some(SortState { key, direction }));
        self.apply_engine(result);
    }

    fn enter_facet(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::Facet;
        self.facet_curser = 0;
    }

    fn leave_facet(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::Table;
    }

    fn toggle_facet_value(&mut self) {
        let rows = self.facet_rows();
        let Some(row) = rows.get(self.facet_curser) else {
            return;
        };
        let mut selected: BTreeSet<String> = self.engine.filter_set(COL_STATUS).into_iter().collect();
        if !selected.insert(row.wire.clone()) {
            selected.remove(&row.wire);
        }
        trace!("Status filter now {:?}", selected);
        let result = self
            .engine
            .set_column_filter(COL_STATUS, FilterValue::Set(selected));
        self.apply_engine(result);
    }

    fn enter_input(&mut self, target: &'static str, prompt: &str) {
        self.previous_modus = self.modus;
        self.modus = Modus::Input;
        self.input_target = Some(target);
        self.input.start(prompt, self.engine.filter_text(target));
        self.last_input = self.input.get();
    }

    fn raw_input(&mut self, key: ratatui::crossterm::event::KeyEvent) {
        self.last_input = self.input.read(key);
        if self.last_input.finished {
            self.modus = self.previous_modus;
            self.previous_modus = Modus::Input;
            if !self.last_input.canceled
                && let Some(target) = self.input_target.take()
            {
                let term = self.last_input.input.clone();
                let result = self.engine.set_column_filter(target, FilterValue::Text(term));
                self.apply_engine(result);
            }
        }
    }

    fn reset_filters(&mut self) {
        let result = self.engine.reset_filters();
        self.apply_engine(result);
        self.set_status_message("Filters reset");
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::Popup;
    }

    fn close_popup(&mut self) {
        self.modus = self.previous_modus;
        self.previous_modus = Modus::Popup;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn batch() -> SubmissionBatch {
        let statuses = [
            SubmissionStatus::Todo,
            SubmissionStatus::Grading,
            SubmissionStatus::Incompleted,
            SubmissionStatus::Completed,
            SubmissionStatus::Completed,
        ];
        let submissions = statuses
            .iter()
            .enumerate()
            .map(|(i, &status)| Submission {
                id: i as u64 + 1,
                submitter_name: format!("Student {}", i + 1),
                submitter_profile_url: String::new(),
                language: "Rust".to_string(),
                score: (i as u32) * 10,
                status,
                submitted_at: Utc.with_ymd_and_hms(2026, 8, 1 + i as u32, 12, 0, 0).unwrap(),
            })
            .collect();
        SubmissionBatch {
            assignment: Assignment {
                name: "Graphs".to_string(),
                max_score: 40,
            },
            submissions,
        }
    }

    fn model() -> Model {
        let config = AppConfig {
            event_poll_time: 100,
            page_size: 10,
        };
        Model::init(&config, Ok(batch())).unwrap()
    }

    fn raw(model: &mut Model, code: KeyCode) {
        model
            .update(Message::RawKey(KeyEvent::new(code, KeyModifiers::NONE)))
            .unwrap();
    }

    #[test]
    fn starts_newest_first() {
        let model = model();
        assert_eq!(model.view().total, 5);
        // Submitted-at descending puts the last submission on top
        assert_eq!(model.view().rows[0][0], "5");
    }

    #[test]
    fn facet_toggle_narrows_the_view_but_not_its_own_counts() {
        let mut model = model();
        model.update(Message::Facet).unwrap();
        // facet rows follow store order: TODO, GRADING, INCOMPLETED, COMPLETED
        model.update(Message::MoveDown).unwrap();
        model.update(Message::MoveDown).unwrap();
        model.update(Message::MoveDown).unwrap();
        model.update(Message::Enter).unwrap();

        assert_eq!(model.view().filtered, 2);
        let rows = model.facet_rows();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[3].label, "Passed");
        assert_eq!(rows[3].count, 2);
        assert!(rows[3].active);

        // Toggling again clears the filter
        model.update(Message::Enter).unwrap();
        assert_eq!(model.view().filtered, 5);
        assert!(!model.facet_rows()[3].active);
    }

    #[test]
    fn input_applies_a_text_filter() {
        let mut model = model();
        model.update(Message::FilterById).unwrap();
        assert!(model.raw_keyevents());
        raw(&mut model, KeyCode::Char('3'));
        raw(&mut model, KeyCode::Enter);

        assert_eq!(model.modus(), Modus::Table);
        assert_eq!(model.view().filtered, 1);
        assert_eq!(model.view().rows[0][0], "3");
    }

    #[test]
    fn canceled_input_changes_nothing() {
        let mut model = model();
        model.update(Message::FilterBySubmitter).unwrap();
        raw(&mut model, KeyCode::Char('x'));
        raw(&mut model, KeyCode::Esc);
        assert_eq!(model.view().filtered, 5);
        assert!(!model.view().has_filters);
    }

    #[test]
    fn sorting_an_unsortable_column_surfaces_on_the_status_line() {
        let mut model = model();
        // Move the column curser onto "Language"
        model.update(Message::MoveRight).unwrap();
        model.update(Message::MoveRight).unwrap();
        model.update(Message::SortAscending).unwrap();
        assert!(model.status_message().contains("not sortable"));
        // Previous sort state still applies
        assert_eq!(model.view().rows[0][0], "5");
    }

    #[test]
    fn paging_clamps_at_the_ends() {
        let mut model = model();
        model.update(Message::ShrinkPageSize).unwrap();
        // page size steps by 5, bottoming out at 1
        assert_eq!(model.view().page_size, 5);
        model.update(Message::ShrinkPageSize).unwrap();
        assert_eq!(model.view().page_size, 1);
        assert_eq!(model.view().page_count, 5);

        for _ in 0..10 {
            model.update(Message::NextPage).unwrap();
        }
        assert_eq!(model.view().page_index, 4);
        model.update(Message::PrevPage).unwrap();
        assert_eq!(model.view().page_index, 3);
    }

    #[test]
    fn failed_load_is_an_empty_single_page() {
        let config = AppConfig {
            event_poll_time: 100,
            page_size: 10,
        };
        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let model = Model::init(&config, Err(AppError::Io(missing))).unwrap();
        assert_eq!(model.view().total, 0);
        assert_eq!(model.view().page_count, 1);
        assert!(model.status_message().starts_with("No data"));
    }

    #[test]
    fn reset_clears_text_and_facet_filters() {
        let mut model = model();
        model.update(Message::FilterById).unwrap();
        raw(&mut model, KeyCode::Char('1'));
        raw(&mut model, KeyCode::Enter);
        assert!(model.view().has_filters);

        model.update(Message::ResetFilters).unwrap();
        assert!(!model.view().has_filters);
        assert_eq!(model.view().filtered, 5);
    }
}
