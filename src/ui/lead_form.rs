use std::time::Instant;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::format::format_phone;
use crate::models::{LeadRecord, LeadStatus};
use crate::validate::{FieldErrors, validate_lead};

use super::components::date_input::DateInputState;
use super::components::select_input::SelectInputState;
use super::{INPUT_POLL, SUBMITTED_DISPLAY, SubmitPhase};

pub enum LeadFormAction {
    Back,
    Submit(LeadRecord),
}

#[derive(Clone, Copy, PartialEq)]
pub enum LeadField {
    Name,
    Phone,
    Social,
    Interest,
    Status,
    ReminderDate,
    ReminderReason,
    Notes,
}

impl LeadField {
    const ALL: [LeadField; 8] = [
        LeadField::Name,
        LeadField::Phone,
        LeadField::Social,
        LeadField::Interest,
        LeadField::Status,
        LeadField::ReminderDate,
        LeadField::ReminderReason,
        LeadField::Notes,
    ];

    fn label(&self) -> &'static str {
        match self {
            LeadField::Name => "Name",
            LeadField::Phone => "Phone",
            LeadField::Social => "Social handle",
            LeadField::Interest => "Interest",
            LeadField::Status => "Status",
            LeadField::ReminderDate => "Reminder date",
            LeadField::ReminderReason => "Reminder reason",
            LeadField::Notes => "Notes",
        }
    }

    /// Key under which validation reports errors for this field
    fn error_key(&self) -> Option<&'static str> {
        match self {
            LeadField::Name => Some("name"),
            LeadField::Phone => Some("phone"),
            LeadField::Interest => Some("interest"),
            LeadField::ReminderReason => Some("reminder_reason"),
            _ => None,
        }
    }
}

pub struct LeadFormState {
    pub record: LeadRecord,
    pub current_field: LeadField,
    pub editing: bool,
    pub errors: FieldErrors,
    pub toast: Option<String>,
    pub phase: SubmitPhase,
    pub reminder_input: DateInputState,
    pub reminder_set: bool,
    pub status_input: SelectInputState,
    success: Option<String>,
    pending: Option<LeadRecord>,
}

impl LeadFormState {
    pub fn new() -> Self {
        let status_input =
            SelectInputState::new(LeadStatus::ALL.iter().map(|s| s.label()).collect());

        Self {
            record: LeadRecord::new(),
            current_field: LeadField::Name,
            editing: false,
            errors: FieldErrors::new(),
            toast: None,
            phase: SubmitPhase::Editing,
            reminder_input: DateInputState::new(chrono::Local::now().date_naive()),
            reminder_set: false,
            status_input,
            success: None,
            pending: None,
        }
    }

    pub fn next_field(&mut self) {
        let i = LeadField::ALL
            .iter()
            .position(|f| *f == self.current_field)
            .unwrap_or(0);
        self.current_field = LeadField::ALL[(i + 1) % LeadField::ALL.len()];
    }

    pub fn previous_field(&mut self) {
        let i = LeadField::ALL
            .iter()
            .position(|f| *f == self.current_field)
            .unwrap_or(0);
        self.current_field = LeadField::ALL[(i + LeadField::ALL.len() - 1) % LeadField::ALL.len()];
    }

    pub fn toggle_editing(&mut self) {
        match self.current_field {
            LeadField::ReminderDate => {
                // Editing the date sets the reminder; Delete clears it again
                self.reminder_set = true;
                self.reminder_input.toggle_editing();
                self.editing = self.reminder_input.editing;
            }
            LeadField::Phone => {
                if self.editing {
                    self.record.phone = format_phone(&self.record.phone);
                }
                self.editing = !self.editing;
            }
            _ => {
                self.editing = !self.editing;
            }
        }
    }

    pub fn clear_reminder(&mut self) {
        self.reminder_set = false;
        self.record.reminder_date = None;
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match self.current_field {
            LeadField::ReminderDate => {
                self.reminder_input.handle_input(key);
                return;
            }
            LeadField::Status => {
                match key {
                    KeyCode::Right => self.status_input.next(),
                    KeyCode::Left => self.status_input.previous(),
                    _ => {}
                }
                return;
            }
            _ => {}
        }

        let field_value = match self.current_field {
            LeadField::Name => &mut self.record.name,
            LeadField::Phone => &mut self.record.phone,
            LeadField::Social => &mut self.record.social,
            LeadField::Interest => &mut self.record.interest,
            LeadField::ReminderReason => &mut self.record.reminder_reason,
            LeadField::Notes => &mut self.record.notes,
            LeadField::Status | LeadField::ReminderDate => unreachable!(),
        };

        match key {
            KeyCode::Char(c) => {
                field_value.push(c);
            }
            KeyCode::Backspace => {
                field_value.pop();
            }
            _ => {}
        }
    }

    /// Validate the record; on success hand back a snapshot for submission.
    pub fn validate_for_submit(&mut self) -> Option<LeadRecord> {
        self.record.status =
            LeadStatus::from_label(self.status_input.current()).unwrap_or_default();
        self.record.reminder_date = self.reminder_set.then(|| self.reminder_input.date);
        self.record.phone = format_phone(&self.record.phone);

        match validate_lead(&self.record) {
            Ok(()) => {
                self.errors.clear();
                Some(self.record.clone())
            }
            Err(errors) => {
                self.errors = errors;
                None
            }
        }
    }

    pub fn begin_submit(&mut self, record: LeadRecord) {
        self.pending = Some(record);
        self.phase = SubmitPhase::Submitting;
    }

    /// Snapshot of the in-flight record, taken exactly once per submission
    pub fn take_pending(&mut self) -> Option<LeadRecord> {
        self.pending.take()
    }

    pub fn mark_submitted(&mut self, message: String) {
        self.success = Some(message);
        self.phase = SubmitPhase::Submitted(Instant::now());
    }

    pub fn fail(&mut self, message: String) {
        self.toast = Some(message);
        self.phase = SubmitPhase::Editing;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Expire the submitted confirmation and hand the user a fresh form
    pub fn tick(&mut self) {
        if let SubmitPhase::Submitted(at) = self.phase {
            if at.elapsed() >= SUBMITTED_DISPLAY {
                self.reset();
            }
        }
    }

    fn field_value(&self, field: LeadField) -> String {
        match field {
            LeadField::Name => self.record.name.clone(),
            LeadField::Phone => self.record.phone.clone(),
            LeadField::Social => self.record.social.clone(),
            LeadField::Interest => self.record.interest.clone(),
            LeadField::Status => self.status_input.get_display_string(),
            LeadField::ReminderDate => {
                if self.reminder_set {
                    self.reminder_input.get_display_string()
                } else {
                    "(none)".to_string()
                }
            }
            LeadField::ReminderReason => self.record.reminder_reason.clone(),
            LeadField::Notes => self.record.notes.clone(),
        }
    }
}

pub fn render_lead_form<B: Backend>(f: &mut Frame<B>, state: &mut LeadFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title = Paragraph::new("New Lead")
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, state, chunks[1]);

    let help_text = if state.editing {
        match state.current_field {
            LeadField::Status => "Left/Right - Change status | Enter - Save field",
            LeadField::ReminderDate => {
                "Digits - Set part | Left/Right - Switch part | Enter - Save field"
            }
            _ => "Enter - Save field | Esc - Cancel editing",
        }
    } else {
        "Enter - Edit field | Up/Down - Navigate | Del - Clear reminder | S - Submit | Esc - Back"
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);

    match state.phase {
        SubmitPhase::Submitting => super::render_submitting(f, f.size()),
        SubmitPhase::Submitted(_) => {
            if let Some(message) = &state.success {
                super::render_success(f, f.size(), message);
            }
        }
        SubmitPhase::Editing => {
            if let Some(toast) = &state.toast {
                super::render_error(f, f.size(), toast);
            }
        }
    }
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &mut LeadFormState, area: Rect) {
    let items: Vec<ListItem> = LeadField::ALL
        .iter()
        .map(|field| {
            let selected = *field == state.current_field;
            let value = state.field_value(*field);

            let label_style = if selected {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };

            let mut spans = vec![Span::styled(format!("{}: ", field.label()), label_style)];

            let text_field = !matches!(field, LeadField::Status | LeadField::ReminderDate);
            if selected && state.editing && text_field {
                spans.push(Span::styled(
                    format!("{}|", value),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else {
                spans.push(Span::raw(value));
            }

            if let Some(message) = field.error_key().and_then(|key| state.errors.get(key)) {
                spans.push(Span::styled(
                    format!("  [{}]", message),
                    Style::default().fg(Color::Red),
                ));
            }

            ListItem::new(Spans::from(spans))
        })
        .collect();

    let form_list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Lead Details"))
        .highlight_style(Style::default().fg(Color::Yellow));

    f.render_widget(form_list, area);
}

pub fn handle_input(state: &mut LeadFormState) -> Result<Option<LeadFormAction>> {
    state.tick();

    if !event::poll(INPUT_POLL)? {
        return Ok(None);
    }

    if let Event::Key(key) = event::read()? {
        // Any key dismisses the submitted confirmation early
        if matches!(state.phase, SubmitPhase::Submitted(_)) {
            state.reset();
            return Ok(None);
        }

        state.toast = None;

        match key.code {
            KeyCode::Esc => {
                if state.editing {
                    state.toggle_editing();
                } else {
                    return Ok(Some(LeadFormAction::Back));
                }
            }
            KeyCode::Enter => {
                state.toggle_editing();
            }
            KeyCode::Up if !state.editing => {
                state.previous_field();
            }
            KeyCode::Down if !state.editing => {
                state.next_field();
            }
            KeyCode::Delete if !state.editing && state.current_field == LeadField::ReminderDate => {
                state.clear_reminder();
            }
            KeyCode::Char('s') if !state.editing => {
                if let Some(record) = state.validate_for_submit() {
                    return Ok(Some(LeadFormAction::Submit(record)));
                }
            }
            _ if state.editing => {
                state.edit_current_field(key.code);
            }
            _ => {}
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_state() -> LeadFormState {
        let mut state = LeadFormState::new();
        state.record.name = "João Souza".to_string();
        state.record.phone = "11987654321".to_string();
        state.record.interest = "Bolos".to_string();
        state
    }

    #[test]
    fn empty_form_blocks_submission_with_field_errors() {
        let mut state = LeadFormState::new();

        assert!(state.validate_for_submit().is_none());
        assert!(state.errors.contains_key("name"));
        assert!(state.errors.contains_key("phone"));
        assert!(state.errors.contains_key("interest"));
    }

    #[test]
    fn status_select_only_produces_valid_variants() {
        let mut state = filled_state();
        state.current_field = LeadField::Status;
        state.toggle_editing();
        state.edit_current_field(KeyCode::Right);
        state.toggle_editing();

        let record = state.validate_for_submit().unwrap();
        assert_eq!(record.status, LeadStatus::EmNegociacao);
    }

    #[test]
    fn reminder_without_reason_is_blocked() {
        let mut state = filled_state();
        state.current_field = LeadField::ReminderDate;
        state.toggle_editing();
        state.toggle_editing();

        assert!(state.validate_for_submit().is_none());
        assert!(state.errors.contains_key("reminder_reason"));

        state.record.reminder_reason = "Retornar ligação".to_string();
        let record = state.validate_for_submit().unwrap();
        assert_eq!(record.reminder_date, Some(state.reminder_input.date));
    }

    #[test]
    fn clearing_the_reminder_removes_the_date() {
        let mut state = filled_state();
        state.current_field = LeadField::ReminderDate;
        state.toggle_editing();
        state.toggle_editing();
        state.clear_reminder();

        let record = state.validate_for_submit().unwrap();
        assert_eq!(record.reminder_date, None);
    }

    #[test]
    fn submitted_form_resets_after_the_display_delay() {
        let mut state = filled_state();
        state.mark_submitted("Record sent to 'Leads'".to_string());

        state.phase = SubmitPhase::Submitted(Instant::now() - SUBMITTED_DISPLAY);
        state.tick();

        assert_eq!(state.phase, SubmitPhase::Editing);
        assert_eq!(state.record, LeadRecord::new());
    }
}
