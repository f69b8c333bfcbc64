use crate::store::TaskStore;
use crate::task::{Filter, Task};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Terminal,
};
use std::io;
use uuid::Uuid;

/// What the input line is collecting, if anything.
enum InputMode {
    Idle,
    Adding,
    Editing(Uuid),
}

/// Cursor and input state. All task state lives in the store; the UI
/// re-queries it on every draw.
pub struct App {
    filter: Filter,
    selected: usize,
    mode: InputMode,
    input: String,
}

impl App {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            selected: 0,
            mode: InputMode::Idle,
            input: String::new(),
        }
    }

    fn clamp_selection(&mut self, visible: usize) {
        if visible == 0 {
            self.selected = 0;
        } else if self.selected >= visible {
            self.selected = visible - 1;
        }
    }
}

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    store: &mut TaskStore,
    initial_filter: Filter,
) -> io::Result<()> {
    let mut app = App::new(initial_filter);
    loop {
        let tasks = store.filtered(app.filter);
        app.clamp_selection(tasks.len());
        let stats = store.stats();

        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints(vec![
                    Constraint::Length(1),
                    Constraint::Min(3),
                    Constraint::Length(3),
                    Constraint::Length(1),
                ])
                .split(f.area());

            let header = Line::from(vec![
                Span::styled("Tasks ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(format!(
                    "[{}]  total: {} | active: {} | completed: {}",
                    app.filter.label(),
                    stats.total,
                    stats.active,
                    stats.completed
                )),
            ]);
            f.render_widget(Paragraph::new(header), chunks[0]);

            let list = if tasks.is_empty() {
                List::new(vec![ListItem::new(Span::styled(
                    empty_hint(app.filter),
                    Style::default().fg(Color::DarkGray),
                ))])
            } else {
                let items: Vec<ListItem> = tasks
                    .iter()
                    .enumerate()
                    .map(|(i, t)| ListItem::new(task_line(t, i == app.selected)))
                    .collect();
                List::new(items)
            };
            f.render_widget(
                list.block(Block::default().borders(Borders::ALL)),
                chunks[1],
            );

            let (title, text) = match app.mode {
                InputMode::Idle => ("", String::new()),
                InputMode::Adding => ("New task", app.input.clone()),
                InputMode::Editing(_) => ("Edit task", app.input.clone()),
            };
            if !matches!(app.mode, InputMode::Idle) {
                f.render_widget(
                    Paragraph::new(text)
                        .block(Block::default().title(title).borders(Borders::ALL)),
                    chunks[2],
                );
            }

            let hints = match app.mode {
                InputMode::Idle => "a: add | e: edit | space: toggle | d: delete | tab: filter | q: quit",
                _ => "enter: confirm | esc: cancel",
            };
            f.render_widget(
                Paragraph::new(Span::styled(hints, Style::default().fg(Color::DarkGray))),
                chunks[3],
            );
        })?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match app.mode {
                InputMode::Idle => match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Char('a') => {
                        app.mode = InputMode::Adding;
                        app.input.clear();
                    }
                    KeyCode::Char('e') => {
                        if let Some(task) = tasks.get(app.selected).and_then(|t| store.get(t.id)) {
                            app.mode = InputMode::Editing(task.id);
                            app.input = task.description;
                        }
                    }
                    KeyCode::Char(' ') | KeyCode::Enter => {
                        if let Some(task) = tasks.get(app.selected) {
                            store.toggle_completion(task.id);
                        }
                    }
                    KeyCode::Char('d') => {
                        if let Some(task) = tasks.get(app.selected) {
                            store.delete(task.id);
                        }
                    }
                    KeyCode::Tab | KeyCode::Char('f') => {
                        app.filter = app.filter.next();
                        app.selected = 0;
                    }
                    KeyCode::Up => {
                        if app.selected > 0 {
                            app.selected -= 1;
                        }
                    }
                    KeyCode::Down => {
                        if app.selected + 1 < tasks.len() {
                            app.selected += 1;
                        }
                    }
                    _ => {}
                },
                InputMode::Adding => match key.code {
                    KeyCode::Enter => {
                        store.add(&app.input);
                        app.mode = InputMode::Idle;
                        app.input.clear();
                    }
                    KeyCode::Esc => {
                        app.mode = InputMode::Idle;
                        app.input.clear();
                    }
                    KeyCode::Backspace => {
                        app.input.pop();
                    }
                    KeyCode::Char(c) => app.input.push(c),
                    _ => {}
                },
                InputMode::Editing(id) => match key.code {
                    KeyCode::Enter => {
                        store.update_description(id, &app.input);
                        app.mode = InputMode::Idle;
                        app.input.clear();
                    }
                    KeyCode::Esc => {
                        app.mode = InputMode::Idle;
                        app.input.clear();
                    }
                    KeyCode::Backspace => {
                        app.input.pop();
                    }
                    KeyCode::Char(c) => app.input.push(c),
                    _ => {}
                },
            }
        }
    }
}

fn task_line(task: &Task, selected: bool) -> Line<'static> {
    let marker = if task.completed { "[x] " } else { "[ ] " };
    let mut desc_style = Style::default().fg(Color::White);
    if task.completed {
        desc_style = desc_style
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT);
    }
    if selected {
        desc_style = desc_style.add_modifier(Modifier::BOLD).fg(Color::Cyan);
    }
    let when = match &task.completed_at {
        Some(at) => format!(" (done: {at})"),
        None => format!(" (added: {})", task.created_at),
    };
    Line::from(vec![
        Span::raw(marker),
        Span::styled(task.description.clone(), desc_style),
        Span::styled(when, Style::default().fg(Color::DarkGray)),
    ])
}

fn empty_hint(filter: Filter) -> &'static str {
    match filter {
        Filter::All => "No tasks yet. Press 'a' to add your first task.",
        Filter::Active => "No active tasks. Everything is done.",
        Filter::Completed => "No completed tasks yet.",
    }
}
