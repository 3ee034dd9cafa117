use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

pub enum HomeAction {
    Exit,
    OpenClientForm,
    OpenLeadForm,
}

const ENTRIES: [&str; 2] = ["New client", "New lead"];

// Represents the state of the intake selection screen
pub struct HomeState {
    list_state: ListState,
}

impl HomeState {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self { list_state }
    }

    pub fn next(&mut self) {
        let i = match self.list_state.selected() {
            Some(i) => (i + 1) % ENTRIES.len(),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let i = match self.list_state.selected() {
            Some(i) => (i + ENTRIES.len() - 1) % ENTRIES.len(),
            None => 0,
        };
        self.list_state.select(Some(i));
    }
}

pub fn render_home<B: Backend>(f: &mut Frame<B>, state: &mut HomeState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title = Paragraph::new("Intake Manager")
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let items: Vec<ListItem> = ENTRIES.iter().map(|e| ListItem::new(*e)).collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Forms"))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    f.render_stateful_widget(list, chunks[1], &mut state.list_state);

    let help = Paragraph::new("Enter - Open form | Up/Down - Navigate | Q/Esc - Quit")
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

pub fn handle_input(state: &mut HomeState) -> Result<Option<HomeAction>> {
    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                return Ok(Some(HomeAction::Exit));
            }
            KeyCode::Up => {
                state.previous();
            }
            KeyCode::Down => {
                state.next();
            }
            KeyCode::Enter => {
                return Ok(match state.list_state.selected() {
                    Some(0) => Some(HomeAction::OpenClientForm),
                    Some(1) => Some(HomeAction::OpenLeadForm),
                    _ => None,
                });
            }
            _ => {}
        }
    }

    Ok(None)
}
