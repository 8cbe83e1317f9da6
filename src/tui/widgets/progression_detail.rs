use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::models::ProgressionRecord;
use crate::requirements::{next_grade, requirement_for};
use crate::tui::ui::{belt_color, format_date, stripe_bar};
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let Some(record) = &app.selected_progression else {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Progression Detail ");
        let paragraph = Paragraph::new("No progression selected").block(block);
        f.render_widget(paragraph, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Grade
            Constraint::Length(6), // Next grade requirements
            Constraint::Min(0),    // Promotion history
        ])
        .split(area);

    draw_grade(f, record, chunks[0]);
    draw_next_grade(f, record, chunks[1]);
    draw_history(f, record, chunks[2]);
}

fn draw_grade(f: &mut Frame, record: &ProgressionRecord, area: Rect) {
    let text = vec![
        Line::from(vec![
            Span::styled("Grade: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{} belt ", record.belt.label()),
                Style::default()
                    .fg(belt_color(record.belt))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(stripe_bar(record.stripe), Style::default().fg(Color::Green)),
            Span::styled(
                format!(" stripe {}", record.stripe),
                Style::default().fg(Color::Yellow),
            ),
        ]),
        Line::from(vec![
            Span::styled("Quizzes this grade: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!(
                    "{} ({} passed, {:.0}%)",
                    record.total_quizzes,
                    record.successful_quizzes,
                    record.pass_rate()
                ),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(vec![
            Span::styled("Accuracy: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{:.1}%", record.current_accuracy * 100.0),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw("  "),
            Span::styled("Council readiness: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{:.1}%", record.council_readiness_score * 100.0),
                Style::default().fg(Color::Cyan),
            ),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} / {} ", record.user_id, record.topic_name))
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let paragraph = Paragraph::new(text).block(block);
    f.render_widget(paragraph, area);
}

fn requirement_line(label: &str, value: String, needed: String, met: bool) -> Line<'static> {
    let (mark, color) = if met {
        ("✓", Color::Green)
    } else {
        ("✗", Color::Red)
    };
    Line::from(vec![
        Span::styled(format!("{} ", mark), Style::default().fg(color)),
        Span::styled(format!("{:<12}", label), Style::default().fg(Color::Gray)),
        Span::styled(value, Style::default().fg(color)),
        Span::styled(format!(" / {}", needed), Style::default().fg(Color::DarkGray)),
    ])
}

fn draw_next_grade(f: &mut Frame, record: &ProgressionRecord, area: Rect) {
    let next = next_grade(record.belt, record.stripe)
        .and_then(|(belt, stripe)| requirement_for(belt, stripe).map(|req| (belt, stripe, req)));

    let block = Block::default()
        .borders(Borders::ALL)
        .title(match &next {
            Some((belt, stripe, _)) => format!(" Next: {} belt, stripe {} ", belt.label(), stripe),
            None => " Next Grade ".to_string(),
        })
        .title_style(Style::default().fg(Color::Cyan));

    let Some((_, _, req)) = next else {
        let paragraph = Paragraph::new("Terminal grade reached.")
            .style(Style::default().fg(Color::Green))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    };

    let text = vec![
        requirement_line(
            "Quizzes",
            format!("{}", record.total_quizzes),
            format!("{}", req.min_quizzes),
            record.total_quizzes >= req.min_quizzes,
        ),
        requirement_line(
            "Accuracy",
            format!("{:.1}%", record.current_accuracy * 100.0),
            format!("{:.0}%", req.min_accuracy * 100.0),
            record.current_accuracy >= req.min_accuracy,
        ),
        requirement_line(
            "Readiness",
            format!("{:.1}%", record.council_readiness_score * 100.0),
            format!("{:.0}%", req.min_council_readiness * 100.0),
            record.council_readiness_score >= req.min_council_readiness,
        ),
    ];

    let paragraph = Paragraph::new(text).block(block);
    f.render_widget(paragraph, area);
}

fn draw_history(f: &mut Frame, record: &ProgressionRecord, area: Rect) {
    let items: Vec<ListItem> = record
        .belt_history
        .iter()
        .rev()
        .map(|entry| {
            let date = format_date(&entry.promoted_at);

            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<10}", date),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("{} belt", entry.belt.label()),
                    Style::default().fg(belt_color(entry.belt)),
                ),
                Span::styled(
                    format!(", stripe {}", entry.stripe),
                    Style::default().fg(Color::Yellow),
                ),
            ]))
        })
        .collect();

    let title = if record.belt_history.is_empty() {
        " Promotions (none) ".to_string()
    } else {
        format!(" Promotions ({}) ", record.belt_history.len())
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_style(Style::default().fg(Color::Magenta));

    if items.is_empty() {
        let paragraph = Paragraph::new("No promotions yet. Keep quizzing!")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(paragraph, area);
    } else {
        let list = List::new(items).block(block);
        f.render_widget(list, area);
    }
}
