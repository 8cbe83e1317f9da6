mod ui;
mod widgets;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::db::{Database, Stats};
use crate::models::{Belt, BeltHistoryEntry, ProgressionRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Progressions,
    ProgressionDetail,
}

impl View {
    fn next(&self) -> Self {
        match self {
            View::Dashboard => View::Progressions,
            View::Progressions => View::Dashboard,
            View::ProgressionDetail => View::Progressions,
        }
    }

    fn prev(&self) -> Self {
        match self {
            View::Dashboard => View::Progressions,
            View::Progressions => View::Dashboard,
            View::ProgressionDetail => View::Progressions,
        }
    }
}

pub struct StatefulList<T> {
    pub items: Vec<T>,
    pub selected: Option<usize>,
}

impl<T> StatefulList<T> {
    fn with_items(items: Vec<T>) -> Self {
        let selected = if items.is_empty() { None } else { Some(0) };
        Self { items, selected }
    }

    fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(i) => {
                if i >= self.items.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.selected = Some(i);
    }

    fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(i) => {
                if i == 0 {
                    self.items.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.selected = Some(i);
    }

    fn selected_item(&self) -> Option<&T> {
        self.selected.and_then(|i| self.items.get(i))
    }
}

pub struct App {
    db: Database,
    pub view: View,
    pub progressions: StatefulList<ProgressionRecord>,
    pub selected_progression: Option<ProgressionRecord>,
    pub stats: Stats,
    pub belt_distribution: Vec<(Belt, i64)>,
    pub recent_promotions: Vec<(BeltHistoryEntry, String)>, // promotion + user id
    pub filter_user: Option<String>,
    pub filter_input: String,
    pub filter_mode: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(db: Database) -> Result<Self, Box<dyn std::error::Error>> {
        let stats = db.get_stats()?;
        let progressions = db.list_progressions(None)?;
        let belt_distribution = db.get_belt_distribution()?;
        let recent_promotions = db.get_recent_promotions(5)?;

        Ok(Self {
            db,
            view: View::Dashboard,
            progressions: StatefulList::with_items(progressions),
            selected_progression: None,
            stats,
            belt_distribution,
            recent_promotions,
            filter_user: None,
            filter_input: String::new(),
            filter_mode: false,
            should_quit: false,
        })
    }

    pub fn refresh_data(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.stats = self.db.get_stats()?;
        self.progressions = StatefulList::with_items(
            self.db.list_progressions(self.filter_user.as_deref())?,
        );
        self.belt_distribution = self.db.get_belt_distribution()?;
        self.recent_promotions = self.db.get_recent_promotions(5)?;

        // Re-read the open detail record so it reflects the refresh too.
        if let Some(selected) = &self.selected_progression {
            self.selected_progression = self
                .db
                .get_progression(&selected.user_id, &selected.topic_name)?;
            if self.selected_progression.is_none() {
                self.view = View::Progressions;
            }
        }
        Ok(())
    }

    fn apply_filter(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if self.filter_input.is_empty() {
            self.filter_user = None;
        } else {
            self.filter_user = Some(self.filter_input.clone());
        }
        self.progressions = StatefulList::with_items(
            self.db.list_progressions(self.filter_user.as_deref())?,
        );
        Ok(())
    }

    fn select_progression(&mut self) {
        if let Some(record) = self.progressions.selected_item() {
            self.selected_progression = Some(record.clone());
            self.view = View::ProgressionDetail;
        }
    }

    fn handle_key(
        &mut self,
        key: KeyCode,
        modifiers: KeyModifiers,
    ) -> Result<(), Box<dyn std::error::Error>> {
        // Handle filter mode input (vim-like / search)
        if self.filter_mode {
            match key {
                KeyCode::Esc => {
                    self.filter_mode = false;
                    self.filter_input.clear();
                }
                KeyCode::Enter => {
                    self.filter_mode = false;
                    self.apply_filter()?;
                }
                KeyCode::Backspace => {
                    self.filter_input.pop();
                }
                KeyCode::Char(c) => {
                    self.filter_input.push(c);
                }
                _ => {}
            }
            return Ok(());
        }

        match key {
            KeyCode::Char('q') => self.should_quit = true,

            // Refresh: Ctrl+r (vim-like redo/refresh)
            KeyCode::Char('r') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.refresh_data()?;
            }

            // Search/filter by user: / (vim search)
            KeyCode::Char('/') if self.view == View::Progressions => {
                self.filter_mode = true;
                self.filter_input.clear();
            }

            KeyCode::Esc => match self.view {
                View::ProgressionDetail => {
                    self.view = View::Progressions;
                    self.selected_progression = None;
                }
                View::Progressions if self.filter_user.is_some() => {
                    self.filter_user = None;
                    self.filter_input.clear();
                    self.apply_filter()?;
                }
                View::Progressions => {}
                View::Dashboard => {}
            },

            // Navigation between views: h/l (left/right like vim)
            KeyCode::Char('h') | KeyCode::Left => match self.view {
                View::ProgressionDetail => {
                    self.view = View::Progressions;
                    self.selected_progression = None;
                }
                _ => self.view = self.view.prev(),
            },
            KeyCode::Char('l') | KeyCode::Right => match self.view {
                View::Progressions => self.select_progression(),
                _ => self.view = self.view.next(),
            },

            // Tab still works for quick view switching
            KeyCode::Tab => {
                if modifiers.contains(KeyModifiers::SHIFT) {
                    self.view = self.view.prev();
                } else {
                    self.view = self.view.next();
                }
            }
            KeyCode::BackTab => {
                self.view = self.view.prev();
            }

            // List navigation: j/k (vim up/down)
            KeyCode::Char('j') | KeyCode::Down => {
                if self.view == View::Progressions {
                    self.progressions.next();
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if self.view == View::Progressions {
                    self.progressions.previous();
                }
            }

            // Jump to top/bottom: g for top, G for bottom
            KeyCode::Char('g') => {
                if self.view == View::Progressions && !self.progressions.items.is_empty() {
                    self.progressions.selected = Some(0);
                }
            }
            KeyCode::Char('G') => {
                if self.view == View::Progressions && !self.progressions.items.is_empty() {
                    self.progressions.selected = Some(self.progressions.items.len() - 1);
                }
            }

            KeyCode::Enter => {
                if self.view == View::Progressions {
                    self.select_progression();
                }
            }

            _ => {}
        }
        Ok(())
    }
}

pub fn run(db: Database) -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::new(db)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key.code, key.modifiers)?;
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
