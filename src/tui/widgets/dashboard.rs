use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::tui::ui::{belt_color, format_date, truncate};
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9), // Stats + belt distribution row
            Constraint::Min(0),    // Recent promotions
        ])
        .split(area);

    // Top row: Stats and Belts side by side
    let top_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[0]);

    draw_stats(f, app, top_chunks[0]);
    draw_belt_distribution(f, app, top_chunks[1]);
    draw_recent_promotions(f, app, chunks[1]);
}

fn draw_stats(f: &mut Frame, app: &App, area: Rect) {
    let stats = &app.stats;

    let text = vec![
        Line::from(vec![
            Span::styled("Progressions: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}", stats.total_progressions),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Promotions: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}", stats.total_promotions),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(vec![
            Span::styled("Black belts: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}", stats.black_belts),
                Style::default().fg(Color::Green),
            ),
        ]),
        Line::from(vec![
            Span::styled("Avg Accuracy: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{:.1}%", stats.avg_accuracy * 100.0),
                Style::default().fg(Color::Cyan),
            ),
        ]),
        Line::from(vec![
            Span::styled("Avg Readiness: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{:.1}%", stats.avg_readiness * 100.0),
                Style::default().fg(Color::Cyan),
            ),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Stats ")
        .title_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(text).block(block);
    f.render_widget(paragraph, area);
}

fn draw_belt_distribution(f: &mut Frame, app: &App, area: Rect) {
    let max = app
        .belt_distribution
        .iter()
        .map(|(_, count)| *count)
        .max()
        .unwrap_or(0)
        .max(1);

    let items: Vec<ListItem> = app
        .belt_distribution
        .iter()
        .map(|(belt, count)| {
            let filled = (count * 10 / max) as usize;
            let bar = format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled));

            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<8}", belt.label()),
                    Style::default().fg(belt_color(*belt)),
                ),
                Span::styled(bar, Style::default().fg(Color::Green)),
                Span::styled(format!(" {}", count), Style::default().fg(Color::Yellow)),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Belts ")
        .title_style(Style::default().fg(Color::Yellow));

    let list = List::new(items).block(block);
    f.render_widget(list, area);
}

fn draw_recent_promotions(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .recent_promotions
        .iter()
        .map(|(entry, user_id)| {
            let date = format_date(&entry.promoted_at);

            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<10}", date),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("{:<18}", truncate(user_id, 16)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    format!("{:<22}", truncate(&entry.topic_name, 20)),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(
                    format!("{} / {}", entry.belt.label(), entry.stripe),
                    Style::default().fg(belt_color(entry.belt)),
                ),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Recent Promotions ")
        .title_style(Style::default().fg(Color::Magenta));

    if items.is_empty() {
        let paragraph = Paragraph::new("No promotions yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(paragraph, area);
    } else {
        let list = List::new(items).block(block);
        f.render_widget(list, area);
    }
}
