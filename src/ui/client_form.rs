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
use crate::models::ClientRecord;
use crate::validate::{FieldErrors, validate_client};

use super::components::date_input::DateInputState;
use super::{INPUT_POLL, SUBMITTED_DISPLAY, SubmitPhase};

pub enum ClientFormAction {
    Back,
    Submit(ClientRecord),
}

#[derive(Clone, Copy, PartialEq)]
pub enum ClientField {
    Name,
    Phone,
    Address,
    City,
    Product,
    OrderDate,
    Notes,
}

impl ClientField {
    const ALL: [ClientField; 7] = [
        ClientField::Name,
        ClientField::Phone,
        ClientField::Address,
        ClientField::City,
        ClientField::Product,
        ClientField::OrderDate,
        ClientField::Notes,
    ];

    fn label(&self) -> &'static str {
        match self {
            ClientField::Name => "Name",
            ClientField::Phone => "Phone",
            ClientField::Address => "Address",
            ClientField::City => "City",
            ClientField::Product => "Product",
            ClientField::OrderDate => "Order date",
            ClientField::Notes => "Notes",
        }
    }

    /// Key under which validation reports errors for this field
    fn error_key(&self) -> Option<&'static str> {
        match self {
            ClientField::Name => Some("name"),
            ClientField::Phone => Some("phone"),
            ClientField::Product => Some("product"),
            _ => None,
        }
    }
}

pub struct ClientFormState {
    pub record: ClientRecord,
    pub current_field: ClientField,
    pub editing: bool,
    pub errors: FieldErrors,
    pub toast: Option<String>,
    pub phase: SubmitPhase,
    pub order_date_input: DateInputState,
    success: Option<String>,
    pending: Option<ClientRecord>,
}

impl ClientFormState {
    pub fn new() -> Self {
        let record = ClientRecord::new();
        let order_date_input = DateInputState::new(record.order_date);

        Self {
            record,
            current_field: ClientField::Name,
            editing: false,
            errors: FieldErrors::new(),
            toast: None,
            phase: SubmitPhase::Editing,
            order_date_input,
            success: None,
            pending: None,
        }
    }

    pub fn next_field(&mut self) {
        let i = ClientField::ALL
            .iter()
            .position(|f| *f == self.current_field)
            .unwrap_or(0);
        self.current_field = ClientField::ALL[(i + 1) % ClientField::ALL.len()];
    }

    pub fn previous_field(&mut self) {
        let i = ClientField::ALL
            .iter()
            .position(|f| *f == self.current_field)
            .unwrap_or(0);
        self.current_field =
            ClientField::ALL[(i + ClientField::ALL.len() - 1) % ClientField::ALL.len()];
    }

    pub fn toggle_editing(&mut self) {
        if self.current_field == ClientField::OrderDate {
            self.order_date_input.toggle_editing();
            self.editing = self.order_date_input.editing;
            return;
        }

        // Leaving the phone field applies the display mask
        if self.editing && self.current_field == ClientField::Phone {
            self.record.phone = format_phone(&self.record.phone);
        }
        self.editing = !self.editing;
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        if self.current_field == ClientField::OrderDate {
            self.order_date_input.handle_input(key);
            return;
        }

        let field_value = match self.current_field {
            ClientField::Name => &mut self.record.name,
            ClientField::Phone => &mut self.record.phone,
            ClientField::Address => &mut self.record.address,
            ClientField::City => &mut self.record.city,
            ClientField::Product => &mut self.record.product,
            ClientField::Notes => &mut self.record.notes,
            ClientField::OrderDate => unreachable!(),
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

    /// Validate the record; on success hand back a snapshot for submission
    /// and move the form into the submitting phase.
    pub fn validate_for_submit(&mut self) -> Option<ClientRecord> {
        self.record.order_date = self.order_date_input.date;
        self.record.phone = format_phone(&self.record.phone);

        match validate_client(&self.record) {
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

    pub fn begin_submit(&mut self, record: ClientRecord) {
        self.pending = Some(record);
        self.phase = SubmitPhase::Submitting;
    }

    /// Snapshot of the in-flight record, taken exactly once per submission
    pub fn take_pending(&mut self) -> Option<ClientRecord> {
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

    fn field_value(&self, field: ClientField) -> String {
        match field {
            ClientField::Name => self.record.name.clone(),
            ClientField::Phone => self.record.phone.clone(),
            ClientField::Address => self.record.address.clone(),
            ClientField::City => self.record.city.clone(),
            ClientField::Product => self.record.product.clone(),
            ClientField::OrderDate => self.order_date_input.get_display_string(),
            ClientField::Notes => self.record.notes.clone(),
        }
    }
}

pub fn render_client_form<B: Backend>(f: &mut Frame<B>, state: &mut ClientFormState) {
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

    let title = Paragraph::new("New Client")
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, state, chunks[1]);

    let help_text = if state.editing {
        "Enter - Save field | Esc - Cancel editing"
    } else {
        "Enter - Edit field | Up/Down - Navigate fields | S - Submit | Esc - Back"
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

fn render_form<B: Backend>(f: &mut Frame<B>, state: &mut ClientFormState, area: Rect) {
    let items: Vec<ListItem> = ClientField::ALL
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

            if selected && state.editing && *field != ClientField::OrderDate {
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
        .block(Block::default().borders(Borders::ALL).title("Client Details"))
        .highlight_style(Style::default().fg(Color::Yellow));

    f.render_widget(form_list, area);
}

pub fn handle_input(state: &mut ClientFormState) -> Result<Option<ClientFormAction>> {
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
                    return Ok(Some(ClientFormAction::Back));
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
            KeyCode::Char('s') if !state.editing => {
                if let Some(record) = state.validate_for_submit() {
                    return Ok(Some(ClientFormAction::Submit(record)));
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

    fn filled_state() -> ClientFormState {
        let mut state = ClientFormState::new();
        state.record.name = "Maria Silva".to_string();
        state.record.phone = "11987654321".to_string();
        state.record.product = "Kit festa".to_string();
        state
    }

    #[test]
    fn empty_form_blocks_submission_with_field_errors() {
        let mut state = ClientFormState::new();

        assert!(state.validate_for_submit().is_none());
        assert!(state.errors.contains_key("name"));
        assert!(state.errors.contains_key("phone"));
        assert_eq!(state.phase, SubmitPhase::Editing);
    }

    #[test]
    fn valid_form_snapshots_a_normalized_record() {
        let mut state = filled_state();

        let record = state.validate_for_submit().unwrap();
        assert_eq!(record.phone, "(11) 98765-4321");
        assert!(state.errors.is_empty());
    }

    #[test]
    fn pending_record_is_taken_exactly_once() {
        let mut state = filled_state();
        let record = state.validate_for_submit().unwrap();
        state.begin_submit(record.clone());

        assert_eq!(state.phase, SubmitPhase::Submitting);
        assert_eq!(state.take_pending(), Some(record));
        assert_eq!(state.take_pending(), None);
    }

    #[test]
    fn submitted_form_resets_after_the_display_delay() {
        let mut state = filled_state();
        state.mark_submitted("Record sent to 'Clientes'".to_string());

        // Backdate the confirmation past the display delay
        state.phase = SubmitPhase::Submitted(Instant::now() - SUBMITTED_DISPLAY);
        state.tick();

        assert_eq!(state.phase, SubmitPhase::Editing);
        assert_eq!(state.record, ClientRecord::new());
    }

    #[test]
    fn failure_returns_to_editing_and_keeps_the_typed_record() {
        let mut state = filled_state();
        let record = state.validate_for_submit().unwrap();
        state.begin_submit(record);
        state.take_pending();
        state.fail("request failed: timeout".to_string());

        assert_eq!(state.phase, SubmitPhase::Editing);
        assert_eq!(state.toast.as_deref(), Some("request failed: timeout"));
        assert_eq!(state.record.name, "Maria Silva");
    }

    #[test]
    fn leaving_the_phone_field_applies_the_mask() {
        let mut state = ClientFormState::new();
        state.current_field = ClientField::Phone;
        state.toggle_editing();
        for c in "11987654321".chars() {
            state.edit_current_field(KeyCode::Char(c));
        }
        state.toggle_editing();

        assert_eq!(state.record.phone, "(11) 98765-4321");
    }
}
