use chrono::Local;
use droplet_core::{
    model::{Reading, Rgb},
    quality::{clamp_score, score_to_color},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Tabs, Wrap},
};

use crate::app::{App, Screen};

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: tabs, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    let selected = Screen::ALL
        .iter()
        .position(|screen| *screen == app.screen)
        .unwrap_or_default();
    let tabs = Tabs::new(
        Screen::ALL
            .iter()
            .enumerate()
            .map(|(idx, screen)| format!("{} {}", idx + 1, screen.title())),
    )
    .select(selected)
    .block(Block::default().borders(Borders::ALL).title("Droplet – water quality"))
    .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, *header_area);

    match app.screen {
        Screen::Overview => draw_overview(frame, app, *content_area),
        Screen::Readings => draw_readings(frame, app, *content_area),
        Screen::Log => draw_log(frame, app, *content_area),
        Screen::Locate => draw_locate(frame, app, *content_area),
        Screen::Submit => draw_submit(frame, app, *content_area),
    }

    // Status bar
    let nav_hint = match app.screen {
        Screen::Overview | Screen::Readings | Screen::Log => {
            "↑/↓ move · r refresh · 1-5/Tab switch · q/Ctrl-C quit"
        }
        Screen::Locate => "Type latitude, longitude · Enter locate · Tab/Esc switch · Ctrl-C quit",
        Screen::Submit => {
            "Type latitude longitude photo-path · Enter submit · Tab/Esc switch · Ctrl-C quit"
        }
    };

    let status_text = if app.is_loading {
        format!("Loading… · {nav_hint}")
    } else if let Some(msg) = &app.error_message {
        format!("{msg} · {nav_hint}")
    } else {
        nav_hint.to_owned()
    };

    let status_style = if app.error_message.is_some() {
        Style::default().fg(Color::Red)
    } else if app.is_loading {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn draw_overview(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let title = format!("Water sources ({} zones)", app.service.sources().len());

    if app.summaries.is_empty() {
        let text = if app.service.sources().is_empty() {
            "No water sources configured."
        } else {
            "No data loaded yet. Press r to refresh."
        };
        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let rows = app.summaries.iter().map(|summary| {
        let (quality, style) = match (summary.average, summary.color) {
            (Some(average), Some(color)) => (average.to_string(), Style::default().fg(to_color(color))),
            _ => ("no data".to_owned(), Style::default().fg(Color::DarkGray)),
        };

        Row::new(vec![
            Cell::from(summary.source.name.clone()),
            Cell::from(format!(
                "{:.5}, {:.5}",
                summary.source.latitude, summary.source.longitude
            )),
            Cell::from(format!("{:.0} m", summary.source.radius_meters)),
            Cell::from(summary.reading_count.to_string()),
            Cell::from(quality).style(style),
            Cell::from(swatch(summary.color)).style(style),
        ])
    });

    let column_widths = [
        Constraint::Min(20),
        Constraint::Length(22),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Length(6),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["Source", "Centre", "Radius", "Readings", "Quality", ""])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .column_spacing(1);

    let mut state = TableState::default();
    state.select(Some(app.summary_index));
    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_log(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(user_id) = &app.user_id else {
        let paragraph = Paragraph::new("Set app.user_id in the configuration to see your log.")
            .block(Block::default().borders(Borders::ALL).title("Your log"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    };

    let title = format!("Your log ({user_id})");

    if app.log.is_empty() {
        let paragraph = Paragraph::new("You haven't predicted any water yet.")
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let table = reading_table(app, &app.log, false)
        .block(Block::default().borders(Borders::ALL).title(title));

    let mut state = TableState::default();
    state.select(Some(app.log_index));
    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_readings(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let title = format!("All readings ({})", app.readings.len());

    if app.readings.is_empty() {
        let paragraph = Paragraph::new("No readings loaded yet. Press r to refresh.")
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let table = reading_table(app, &app.readings, true)
        .block(Block::default().borders(Borders::ALL).title(title));

    let mut state = TableState::default();
    state.select(Some(app.readings_index));
    frame.render_stateful_widget(table, area, &mut state);
}

// One row per reading, coloured by its own score.
fn reading_table<'rows>(
    app: &'rows App,
    readings: &'rows [Reading],
    with_owner: bool,
) -> Table<'rows> {
    let rows = readings.iter().map(|reading| {
        let uploaded = reading
            .uploaded_at
            .with_timezone(&Local)
            .format("%d.%m.%Y %H:%M")
            .to_string();
        let (quality, style) = match reading.quality_score {
            Some(score) if !score.is_nan() => (
                format!("{:.1}", clamp_score(score)),
                Style::default().fg(to_color(score_to_color(score))),
            ),
            _ => ("–".to_owned(), Style::default().fg(Color::DarkGray)),
        };

        let mut cells = vec![Cell::from(reading.id.clone()).style(style)];
        if with_owner {
            cells.push(Cell::from(reading.user_id.to_string()));
        }
        cells.extend([
            Cell::from(uploaded),
            Cell::from(app.label_for(reading).to_owned()),
            Cell::from(quality).style(style),
        ]);
        Row::new(cells)
    });

    let mut column_widths = vec![Constraint::Length(22)];
    let mut header = vec!["Droplet"];
    if with_owner {
        column_widths.push(Constraint::Length(14));
        header.push("User");
    }
    column_widths.extend([
        Constraint::Length(17),
        Constraint::Min(18),
        Constraint::Length(8),
    ]);
    header.extend(["Uploaded", "Location", "Quality"]);

    Table::new(rows, column_widths)
        .header(Row::new(header).style(Style::default().add_modifier(Modifier::BOLD)))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .column_spacing(1)
}

fn draw_locate(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // input
            Constraint::Min(0),    // report
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [input_area, report_area] = chunks else {
        return;
    };

    let input = Paragraph::new(app.locate_input.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Position (latitude, longitude; Enter)"),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(input, *input_area);

    let lines = match &app.located {
        None => vec![Line::from("Enter a position to see which water source it belongs to.")],
        Some(located) => {
            let nearest = match &located.nearest {
                Some((name, distance, inside)) => format!(
                    "{name}, {distance:.0} m away ({})",
                    if *inside { "inside radius" } else { "outside radius" }
                ),
                None => "none".to_owned(),
            };
            vec![
                Line::from(format!("Position:        {}", located.point)),
                Line::from(vec![
                    Span::raw("Location:        "),
                    Span::styled(located.label.clone(), Style::default().add_modifier(Modifier::BOLD)),
                ]),
                Line::from(format!("Nearest source:  {nearest}")),
                Line::from(format!(
                    "First match:     {}",
                    located.enclosing.as_deref().unwrap_or("none")
                )),
            ]
        }
    };

    let report = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Proximity"))
        .wrap(Wrap { trim: true });
    frame.render_widget(report, *report_area);
}

fn draw_submit(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [input_area, result_area] = chunks else {
        return;
    };

    let input = Paragraph::new(app.submit_input.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("latitude longitude photo-path (Enter)"),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(input, *input_area);

    let text = if !app.service.can_submit() {
        Text::from("Submissions need a [classifier] endpoint in the configuration.")
    } else if app.user_id.is_none() {
        Text::from("Submissions need app.user_id in the configuration.")
    } else if let Some(reading) = &app.last_submission {
        let score = reading.quality_score.unwrap_or_default();
        Text::from(vec![
            Line::from(format!("Stored droplet {}", reading.id)),
            Line::from(format!("Location: {}", app.label_for(reading))),
            Line::from(Span::styled(
                format!("Quality:  {score:.1}"),
                Style::default().fg(to_color(score_to_color(score))),
            )),
        ])
    } else {
        Text::from("Photograph a water body, then submit its position and photo file.")
    };

    let result = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Submission"))
        .wrap(Wrap { trim: true });
    frame.render_widget(result, *result_area);
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.red, rgb.green, rgb.blue)
}

fn swatch(color: Option<Rgb>) -> String {
    match color {
        Some(_) => "████".to_owned(),
        None => "····".to_owned(),
    }
}
