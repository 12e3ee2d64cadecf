use crate::app::App;
use crate::util::strip_control_chars;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Render the detail panel for the selected category.
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let block = Block::default().borders(Borders::ALL).title("Details");

    let Some(record) = app.selected_record() else {
        f.render_widget(Paragraph::new("No category selected").block(block), area);
        return;
    };
    let thumbnail = app.selected_thumbnail().unwrap_or_default();

    let label = Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD);
    let field = |name: &'static str, value: String| {
        Line::from(vec![Span::styled(format!("{:<10}", name), label), Span::raw(value)])
    };
    let or_dash = |value: Option<&str>| value.unwrap_or("-").to_string();

    let mut lines = vec![
        Line::from(Span::styled(
            record.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        field("ID", record.id.to_string()),
        field("Parent", or_dash(record.parent_title())),
        field("Status", or_dash(Some(record.status.as_str()).filter(|s| !s.is_empty()))),
        field("Created", or_dash(record.created_at.as_deref())),
        field("By", or_dash(record.created_by_name.as_deref())),
    ];

    // Data URIs are long and meaningless on screen
    let image = if thumbnail.starts_with("data:") {
        "(placeholder)".to_string()
    } else {
        thumbnail
    };
    lines.push(field("Image", image));

    if let Some(description) = record.description.as_deref() {
        lines.push(Line::default());
        lines.push(Line::from(strip_control_chars(description).into_owned()));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
