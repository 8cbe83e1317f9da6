use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::tui::ui::{belt_color, stripe_bar, truncate};
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let title = if let Some(user) = &app.filter_user {
        format!(" Progressions (user: {}) ", user)
    } else {
        " Progressions ".to_string()
    };

    let items: Vec<ListItem> = app
        .progressions
        .items
        .iter()
        .map(|record| {
            let bar = stripe_bar(record.stripe);
            let accuracy = record.current_accuracy * 100.0;

            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<18}", truncate(&record.user_id, 16)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    format!("{:<26}", truncate(&record.topic_name, 24)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    format!("{:<8}", record.belt.label()),
                    Style::default().fg(belt_color(record.belt)),
                ),
                Span::styled(bar, Style::default().fg(Color::Green)),
                Span::styled(
                    format!(" {} ", record.stripe),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(
                    format!("{:>4}q ", record.total_quizzes),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(
                    format!("{:>3.0}%", accuracy),
                    Style::default().fg(if accuracy >= 70.0 {
                        Color::Green
                    } else {
                        Color::Yellow
                    }),
                ),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_style(Style::default().fg(Color::Cyan));

    // Header
    let header = Line::from(vec![
        Span::styled(
            format!("{:<18}", "User"),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{:<26}", "Topic"),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{:<8}", "Belt"),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "Stripes  ",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "Quiz Acc",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        ),
    ]);

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(app.progressions.selected);

    // Render header separately at the top of content area
    let header_area = Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: 1,
    };
    f.render_widget(ratatui::widgets::Paragraph::new(header), header_area);

    // Adjust list area to account for header
    let list_area = Rect {
        x: area.x,
        y: area.y + 1,
        width: area.width,
        height: area.height.saturating_sub(1),
    };

    f.render_stateful_widget(list, list_area, &mut state);
}
