use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use regex::Regex;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::Date;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::app::{AppState, Route};
use crate::config::themes::Palette;
use crate::favorites::Favorites;
use crate::highlight::{build_highlight_regex, match_ranges};
use crate::poem::Poem;
use crate::store::StoreState;

const HEADING: &str = "The Privilege of Boredom";
const SUBHEADING: &str = "poems from before and after the break.";
const TAGLINE: &str = "Attention is costly. Boredom is a luxury.";
const IDLE_TEXT: &str = "be still.";
pub const EMPTY_TITLE: &str = "No Poems Found";
pub const EMPTY_HINT: &str = "Try adjusting your search or filter.";

static ISO_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
static LONG_DATE: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");

/// Everything one frame needs, borrowed for the duration of the draw.
pub struct Screen<'a> {
    pub store: &'a StoreState,
    pub app: &'a AppState,
    pub favorites: &'a Favorites,
    /// The collection list as displayed, after search, sort and favorites filtering.
    pub visible: &'a [Poem],
    pub palette: Palette,
}

pub fn draw_app(frame: &mut Frame, screen: &Screen, list_state: &mut ListState) {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(2)])
        .split(frame.size());

    match &screen.app.route {
        Route::Collection => draw_collection(frame, vertical[0], screen, list_state),
        Route::Poem { .. } => draw_detail(frame, vertical[0], screen),
    }
    frame.render_widget(
        Paragraph::new(build_status_line(screen)),
        vertical[1],
    );

    if screen.app.idle && matches!(screen.app.route, Route::Poem { .. }) {
        let area = centered_rect(30, 20, frame.size());
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(IDLE_TEXT)
                .alignment(Alignment::Center)
                .style(Style::default().fg(screen.palette.muted)),
            area,
        );
    }
}

fn draw_collection(frame: &mut Frame, area: Rect, screen: &Screen, list_state: &mut ListState) {
    let palette = screen.palette;
    let has_preamble = screen.store.preamble.is_some();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(if has_preamble { 4 } else { 0 }),
            Constraint::Length(1),
            Constraint::Min(3),
        ])
        .split(area);

    let header = Text::from(vec![
        Line::from(Span::styled(
            HEADING,
            Style::default()
                .fg(palette.text)
                .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        )),
        Line::from(Span::styled(
            SUBHEADING,
            Style::default()
                .fg(palette.muted)
                .add_modifier(Modifier::ITALIC),
        )),
        Line::from(""),
        Line::from(Span::styled(TAGLINE, Style::default().fg(palette.muted))),
    ]);
    frame.render_widget(Paragraph::new(header).alignment(Alignment::Center), rows[0]);

    if let Some(preamble) = &screen.store.preamble {
        let width = rows[1].width.saturating_sub(4) as usize;
        let card = Paragraph::new(Text::from(vec![
            Line::from(Span::styled(
                preamble.title.clone(),
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(truncate_to_width(&preamble.excerpt, width)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Preamble (p)")
                .border_style(Style::default().fg(palette.accent)),
        );
        frame.render_widget(card, rows[1]);
    }

    frame.render_widget(Paragraph::new(build_controls_line(screen)), rows[2]);

    let list_block = Block::default()
        .borders(Borders::ALL)
        .title(screen.store.stats());

    if screen.store.poems.is_empty() {
        let body = if screen.store.is_loading {
            Text::from("Loading poems…")
        } else if let Some(error) = &screen.store.error {
            error_text(error, palette)
        } else {
            empty_text(palette)
        };
        frame.render_widget(
            Paragraph::new(body)
                .wrap(Wrap { trim: true })
                .block(list_block),
            rows[3],
        );
        return;
    }

    let regex = build_highlight_regex(&screen.store.search);
    let highlight_style = Style::default()
        .fg(palette.accent)
        .add_modifier(Modifier::BOLD);
    let width = rows[3].width.saturating_sub(6) as usize;
    let mut items = Vec::with_capacity(screen.visible.len());
    for poem in screen.visible {
        let mut title_spans = Vec::new();
        if screen.favorites.contains(&poem.id) {
            title_spans.push(Span::styled("★ ", Style::default().fg(palette.accent)));
        }
        title_spans.extend(highlight_line(
            &poem.title,
            regex.as_ref(),
            highlight_style,
            Style::default().fg(palette.text).add_modifier(Modifier::BOLD),
        ));
        let excerpt = truncate_to_width(&poem.excerpt, width);
        items.push(ListItem::new(vec![
            Line::from(title_spans),
            Line::from(Span::styled(
                format_poem_date(&poem.date),
                Style::default().fg(palette.muted),
            )),
            Line::from(highlight_line(
                &excerpt,
                regex.as_ref(),
                highlight_style,
                Style::default().fg(palette.muted),
            )),
        ]));
    }
    if items.is_empty() {
        items.push(ListItem::new(empty_text(palette)));
    }
    let list = List::new(items)
        .block(list_block)
        .highlight_style(Style::default().bg(palette.highlight_bg))
        .highlight_symbol("▸ ");
    frame.render_stateful_widget(list, rows[3], list_state);
}

fn draw_detail(frame: &mut Frame, area: Rect, screen: &Screen) {
    let palette = screen.palette;
    let reading = screen.favorites.reading_mode();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(if reading { 0 } else { 1 }),
        ])
        .split(area);
    let margin = if reading { 8 } else { 2 };
    let body_area = Rect {
        x: rows[0].x + margin.min(rows[0].width / 4),
        width: rows[0].width.saturating_sub(2 * margin.min(rows[0].width / 4)),
        ..rows[0]
    };

    let store = screen.store;
    let text = if store.is_poem_loading {
        Text::from(Span::styled(
            "Loading poem…",
            Style::default().fg(palette.muted),
        ))
    } else if let Some(error) = &store.error {
        error_text(error, palette)
    } else if let Some(poem) = &store.selected {
        poem_text(poem, &store.stanzas(), screen)
    } else {
        Text::from("")
    };
    frame.render_widget(
        Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .scroll((screen.app.detail_scroll, 0)),
        body_area,
    );

    if !reading {
        frame.render_widget(Paragraph::new(build_navigation_line(screen)), rows[1]);
    }
}

fn poem_text(poem: &Poem, stanzas: &[String], screen: &Screen) -> Text<'static> {
    let palette = screen.palette;
    let mut lines = Vec::new();
    let mut title = Vec::new();
    if screen.favorites.contains(&poem.id) {
        title.push(Span::styled("★ ", Style::default().fg(palette.accent)));
    }
    title.push(Span::styled(
        poem.title.clone(),
        Style::default()
            .fg(palette.text)
            .add_modifier(Modifier::BOLD),
    ));
    lines.push(Line::from(title));
    lines.push(Line::from(Span::styled(
        format_poem_date(&poem.date),
        Style::default().fg(palette.muted),
    )));
    if let Some(url) = &poem.image_url {
        if !screen.favorites.reading_mode() {
            lines.push(Line::from(Span::styled(
                format!("[image] {url}"),
                Style::default()
                    .fg(palette.muted)
                    .add_modifier(Modifier::ITALIC),
            )));
        }
    }
    lines.push(Line::from(""));
    for stanza in stanzas {
        for line in stanza.lines() {
            lines.push(Line::from(Span::styled(
                line.to_string(),
                Style::default().fg(palette.text),
            )));
        }
        lines.push(Line::from(""));
    }
    Text::from(lines)
}

fn empty_text(palette: Palette) -> Text<'static> {
    Text::from(vec![
        Line::from(Span::styled(
            EMPTY_TITLE,
            Style::default()
                .fg(palette.text)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(EMPTY_HINT, Style::default().fg(palette.muted))),
    ])
}

fn error_text(message: &str, palette: Palette) -> Text<'static> {
    Text::from(vec![
        Line::from(Span::styled(
            "An Error Occurred",
            Style::default()
                .fg(palette.error)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(message.to_string()),
    ])
}

fn build_controls_line(screen: &Screen) -> Line<'static> {
    let palette = screen.palette;
    let search_label = if screen.app.is_searching() {
        format!("/{}▏", screen.app.search_input)
    } else if screen.app.search_input.is_empty() {
        "Search… (/)".to_string()
    } else {
        format!("/{}", screen.app.search_input)
    };
    let mut spans = vec![
        Span::styled(search_label, Style::default().fg(palette.text)),
        Span::raw("  |  Sort: "),
        Span::styled(
            screen.store.sort.label().to_string(),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    if screen.app.favorites_only {
        spans.push(Span::styled(
            "  |  ★ favorites only",
            Style::default().fg(palette.accent),
        ));
    }
    Line::from(spans)
}

fn build_navigation_line(screen: &Screen) -> Line<'static> {
    let palette = screen.palette;
    let nav = screen.store.navigation();
    let mut spans = Vec::new();
    if let Some(prev) = &nav.prev {
        spans.push(Span::styled(
            format!("← Previous: {}", prev.title),
            Style::default().fg(palette.muted),
        ));
        spans.push(Span::raw("   "));
    }
    spans.push(Span::styled(
        nav.position_label(),
        Style::default().fg(palette.muted),
    ));
    if let Some(next) = &nav.next {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            format!("{} :Next →", next.title),
            Style::default().fg(palette.muted),
        ));
    }
    Line::from(spans)
}

fn build_status_line(screen: &Screen) -> Text<'static> {
    let hints = match screen.app.route {
        Route::Collection => "j/k move · Enter open · / search · s sort · f favorite · v favorites · q quit",
        Route::Poem { .. } => "h/l prev/next · b back · f favorite · m reading mode · q quit",
    };
    let mut lines = vec![Line::from(Span::styled(
        hints,
        Style::default().fg(screen.palette.muted),
    ))];
    if let Some(message) = screen.app.status_message() {
        lines.push(Line::from(Span::styled(
            message.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
    }
    Text::from(lines)
}

fn highlight_line(
    text: &str,
    regex: Option<&Regex>,
    highlight_style: Style,
    base_style: Style,
) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut last = 0;
    for range in match_ranges(text, regex) {
        if range.start > last {
            spans.push(Span::styled(text[last..range.start].to_string(), base_style));
        }
        spans.push(Span::styled(text[range.clone()].to_string(), highlight_style));
        last = range.end;
    }
    if last < text.len() || spans.is_empty() {
        spans.push(Span::styled(text[last..].to_string(), base_style));
    }
    spans
}

/// `2024-03-10` becomes `March 10, 2024`; anything unparseable is shown as is.
pub fn format_poem_date(raw: &str) -> String {
    let day = raw.get(..10).unwrap_or(raw);
    Date::parse(day, ISO_DATE)
        .ok()
        .and_then(|date| date.format(LONG_DATE).ok())
        .unwrap_or_else(|| raw.to_string())
}

/// Cuts `text` to at most `width` columns, ending with `…` when shortened.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for grapheme in text.graphemes(true) {
        let w = grapheme.width();
        if used + w + 1 > width {
            break;
        }
        out.push_str(grapheme);
        used += w;
    }
    out.push('…');
    out
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
