use ratatui::{
    layout::{Alignment, Constraint, Layout, Margin, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::config::{parse_color, parse_modifier, Config};
use crate::effects::{glitch_keyframe, neon_color, SpriteGrid, SPRITE_SIZE};
use crate::panel::Effect;

/// Height of a card: the sprite plus its border.
const CARD_HEIGHT: u16 = SPRITE_SIZE as u16 + 2;
/// Each sprite pixel is two cells wide so it reads as a square.
const PIXEL: &str = "\u{2588}\u{2588}";

// ============================================================================
// LAYOUT
// ============================================================================

/// Screen regions shared by drawing and mouse hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    pub hero: Rect,
    pub card_row: Rect,
    pub cards: [Rect; 4],
    pub footer: Rect,
    pub link: Rect,
    pub help: Option<Rect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Card(usize),
    Link,
}

pub fn page_layout(area: Rect, config: &Config) -> PageLayout {
    let help_height = u16::from(config.help_text.enabled);
    let footer_height = (config.shader.lines as u16).saturating_add(2);

    let [hero, card_row, footer, help] = Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(CARD_HEIGHT + 2),
        Constraint::Length(footer_height),
        Constraint::Length(help_height),
    ])
    .areas(area);

    let cards_area = card_row.inner(Margin {
        horizontal: 1,
        vertical: 1,
    });
    let cards = Layout::horizontal([
        Constraint::Ratio(1, 4),
        Constraint::Ratio(1, 4),
        Constraint::Ratio(1, 4),
        Constraint::Ratio(1, 4),
    ])
    .spacing(1)
    .areas(cards_area);

    let link_width = (config.link.label.chars().count() as u16 + 4).min(footer.width);
    let link = Rect {
        x: footer.x + (footer.width.saturating_sub(link_width)) / 2,
        y: footer.y + footer.height / 2,
        width: link_width,
        height: footer.height.min(1),
    };

    PageLayout {
        hero,
        card_row,
        cards,
        footer,
        link,
        help: config.help_text.enabled.then_some(help),
    }
}

pub fn hit_test(layout: &PageLayout, column: u16, row: u16) -> Option<Target> {
    let position = Position { x: column, y: row };
    if layout.link.contains(position) {
        return Some(Target::Link);
    }
    layout
        .cards
        .iter()
        .position(|card| card.contains(position))
        .map(Target::Card)
}

// ============================================================================
// UI RENDERING
// ============================================================================

pub fn ui(f: &mut Frame, app: &App) {
    let size = f.area();
    let config = &app.config;
    let theme = app.panel.theme();
    let layout = page_layout(size, config);

    let root = Block::default().style(Style::default().bg(theme.background).fg(theme.foreground));
    f.render_widget(root, size);

    render_hero(f, app, layout.hero);
    render_cards(f, app, &layout);
    render_footer(f, app, &layout);

    if let Some(help_area) = layout.help {
        render_help_text(f, app, help_area);
    }
}

fn render_hero(f: &mut Frame, app: &App, area: Rect) {
    let config = &app.config;
    let theme = app.panel.theme();

    let title = if app.panel.is_active(Effect::Glitch) {
        let frame = glitch_keyframe(app.elapsed());
        // centered text moves one cell per two spaces of padding
        let pad = " ".repeat(usize::from(frame.offset.unsigned_abs()) * 2);
        let mut spans: Vec<Span> = config
            .title
            .chars()
            .enumerate()
            .map(|(i, c)| {
                Span::styled(
                    c.to_string(),
                    Style::default()
                        .fg(theme.foreground)
                        .bg(frame.shadows[i % 2])
                        .add_modifier(Modifier::BOLD),
                )
            })
            .collect();
        if frame.offset > 0 {
            spans.insert(0, Span::raw(pad));
        } else if frame.offset < 0 {
            spans.push(Span::raw(pad));
        }
        Line::from(spans)
    } else {
        Line::from(Span::styled(
            config.title.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ))
    };

    let tagline = Line::from(Span::styled(
        config.tagline.clone(),
        Style::default().fg(parse_color(&config.colors.tagline)),
    ));

    let top_padding = area.height.saturating_sub(3) / 2;
    let mut lines = vec![Line::default(); usize::from(top_padding)];
    lines.extend([title, Line::default(), tagline]);

    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn render_cards(f: &mut Frame, app: &App, layout: &PageLayout) {
    let config = &app.config;
    let colors = &config.colors;

    let backdrop = Block::default().style(Style::default().bg(app.panel.theme().card));
    f.render_widget(backdrop, layout.card_row);

    let face = parse_color(&colors.card_face);
    let label_color = parse_color(&colors.card_label);
    let border_color = parse_color(&colors.card_border);
    let focus_color = parse_color(&colors.focus_border);
    let focus_modifier = parse_modifier(&colors.focus_modifier);

    for (i, (effect, area)) in Effect::ALL.iter().zip(layout.cards).enumerate() {
        let border_style = if i == app.focused {
            Style::default().fg(focus_color).add_modifier(focus_modifier)
        } else {
            Style::default().fg(border_color)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .style(Style::default().bg(face));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let lines = if *effect == Effect::Sprite && app.panel.is_active(Effect::Sprite) {
            sprite_lines(app.panel.sprite())
        } else {
            let top_padding = inner.height.saturating_sub(1) / 2;
            let mut lines = vec![Line::default(); usize::from(top_padding)];
            lines.push(Line::from(Span::styled(
                effect.label(),
                Style::default().fg(label_color).add_modifier(Modifier::BOLD),
            )));
            if let (Effect::Palette, Some(palette)) = (effect, app.panel.palette()) {
                lines.push(Line::from(Span::styled(
                    format!(
                        "bg {}\u{b0} fg {}\u{b0}",
                        palette.background.hue, palette.foreground.hue
                    ),
                    Style::default().fg(label_color),
                )));
            }
            lines
        };

        f.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            inner,
        );
    }
}

fn sprite_lines(grid: &SpriteGrid) -> Vec<Line<'static>> {
    grid.rows()
        .map(|row| {
            Line::from(
                row.iter()
                    .map(|cell| Span::styled(PIXEL, Style::default().fg(cell.to_color())))
                    .collect::<Vec<_>>(),
            )
        })
        .collect()
}

fn render_footer(f: &mut Frame, app: &App, layout: &PageLayout) {
    let colors = &app.config.colors;

    if app.panel.is_active(Effect::Shader) {
        let elapsed = app.elapsed();
        let lines: Vec<Line> = app
            .panel
            .ascii()
            .lines()
            .iter()
            .map(|line| {
                let width = line.chars().count();
                Line::from(
                    line.chars()
                        .enumerate()
                        .map(|(col, c)| {
                            Span::styled(
                                c.to_string(),
                                Style::default().fg(neon_color(col, width, elapsed)),
                            )
                        })
                        .collect::<Vec<_>>(),
                )
            })
            .collect();

        let top_padding = layout.footer.height.saturating_sub(lines.len() as u16) / 2;
        let area = Rect {
            y: layout.footer.y + top_padding,
            height: layout.footer.height - top_padding,
            ..layout.footer
        };
        f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
    }

    let button = Paragraph::new(Line::from(app.config.link.label.clone()))
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(parse_color(&colors.link_fg))
                .bg(parse_color(&colors.link_bg))
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(button, layout.link);
}

fn render_help_text(f: &mut Frame, app: &App, area: Rect) {
    let config = &app.config;
    let keys = &config.keys;
    let separator = config.help_text.separator.as_str();

    let help_key_fg = parse_color(&config.colors.help_key_fg);
    let help_fg = parse_color(&config.colors.help_fg);
    let help_key_modifier = parse_modifier(&config.colors.help_key_modifier);
    let key_style = Style::default()
        .fg(help_key_fg)
        .add_modifier(help_key_modifier);

    let entries = [
        (format!("{}/{}", keys.previous.join("/"), keys.next.join("/")), " Navigate"),
        (keys.activate.join("/"), " Activate"),
        ("1-4".to_string(), " Cards"),
        (keys.open_link.join("/"), " Open link"),
        (keys.quit.join("/"), " Quit"),
    ];

    let mut help_spans = Vec::new();
    for (i, (names, action)) in entries.into_iter().enumerate() {
        if i > 0 {
            help_spans.push(Span::raw(separator));
        }
        help_spans.push(Span::styled(names, key_style));
        help_spans.push(Span::styled(action, Style::default().fg(help_fg)));
    }

    let help_text = Paragraph::new(Line::from(help_spans))
        .alignment(Alignment::Center)
        .style(Style::default().fg(help_fg));

    f.render_widget(help_text, area);
}
