mod app;
mod tap;

use std::{cell::RefCell, io, rc::Rc};

use app::App;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Wrap};
use ratzilla::ratatui::{Frame, Terminal};
use ratzilla::{DomBackend, WebRenderer};
use shell_pack_booster::catalog::AttributeLabels;
use shell_pack_booster::collection::{group_for_display, CollectionSummary};
use shell_pack_booster::constants::MAX_STAT;
use shell_pack_booster::timer::{format_time_remaining, progress_percent, remaining_seconds};
use shell_pack_booster::{
    console, BoosterService, BoosterType, Card, Catalog, MemoryStorage, Persistence, RarityTier,
    StatKind, StorageBackend, SystemClock, TimerStatus,
};
use tap::{is_compact_layout, pixel_y_to_row, TapMap};

type BoosterApp = App<SmallRng>;

/// Query the grid container's bounding rect and convert pixel coordinates to a row.
fn dom_pixel_to_row(mouse_x: u32, mouse_y: u32, map: &TapMap) -> Option<u16> {
    let document = web_sys::window()?.document()?;

    // DomBackend renders into a <div> directly under <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    if (mouse_x as f64) < rect.left() {
        return None;
    }
    pixel_y_to_row(mouse_y as f64 - rect.top(), rect.height(), map.rows)
}

/// Frame timestamp in ms. `performance.now()` is monotonic, unlike `Date.now()`.
fn frame_timestamp() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

#[cfg(target_arch = "wasm32")]
fn browser_backend() -> Option<Rc<dyn StorageBackend>> {
    let local = shell_pack_booster::storage::LocalStorage::open()?;
    Some(Rc::new(local))
}

#[cfg(not(target_arch = "wasm32"))]
fn browser_backend() -> Option<Rc<dyn StorageBackend>> {
    None
}

fn open_persistence() -> Persistence {
    match browser_backend() {
        Some(backend) => Persistence::new(backend),
        None => {
            console::warn("[main] localStorage が使えないため、進行状況はリロードで消える");
            Persistence::new(Rc::new(MemoryStorage::new()))
        }
    }
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();

    let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;
    let service = BoosterService::new(
        open_persistence(),
        Rc::new(SystemClock),
        Catalog::builtin(),
        SmallRng::seed_from_u64(seed),
    );
    let state = Rc::new(RefCell::new(App::new(service)));
    let tap_map = Rc::new(RefCell::new(TapMap::new()));
    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    terminal.on_mouse_event({
        let state = state.clone();
        let tap_map = tap_map.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }

            let map = tap_map.borrow();
            if !map.is_ready() {
                return;
            }
            let action = dom_pixel_to_row(mouse_event.x, mouse_event.y, &map)
                .and_then(|row| map.action_at(row));
            drop(map);

            if let Some(key) = action {
                state.borrow_mut().handle_action(key);
            }
        }
    });

    terminal.on_key_event({
        let state = state.clone();
        move |key_event| {
            if let KeyCode::Char(c) = key_event.code {
                state.borrow_mut().handle_action(c.to_ascii_lowercase());
            }
        }
    });

    terminal.draw_web({
        let tap_map = tap_map.clone();
        move |f| {
            let mut app = state.borrow_mut();
            app.on_frame(frame_timestamp());
            let size = f.area();

            tap_map.borrow_mut().reset(size.width, size.height);

            let main_chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(10),
                    Constraint::Length(3),
                ])
                .split(size);

            render_title(f, main_chunks[0]);
            if is_compact_layout(size.width) {
                render_compact_layout(f, &app, main_chunks[1], &tap_map);
            } else {
                render_wide_layout(f, &app, main_chunks[1], &tap_map);
            }
            render_help(f, main_chunks[2]);
        }
    });

    Ok(())
}

fn render_title(f: &mut Frame, area: Rect) {
    let title = Paragraph::new(Line::from(Span::styled(
        "Shell Pack Booster",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    )
    .alignment(Alignment::Center);
    f.render_widget(title, area);
}

/// Wide layout: timer + actions + log | last card + collection
fn render_wide_layout(
    f: &mut Frame,
    app: &BoosterApp,
    area: Rect,
    tap_map: &Rc<RefCell<TapMap>>,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Length(app.actions.len() as u16 + 2),
            Constraint::Min(3),
        ])
        .split(columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(5)])
        .split(columns[1]);

    render_timer(f, app, left[0]);
    render_actions(f, app, left[1], tap_map);
    render_log(f, app, left[2]);
    render_last_card(f, app, right[0]);
    render_collection(f, app, right[1]);
}

/// Compact layout: everything stacked; the log is dropped.
fn render_compact_layout(
    f: &mut Frame,
    app: &BoosterApp,
    area: Rect,
    tap_map: &Rc<RefCell<TapMap>>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Length(app.actions.len() as u16 + 2),
            Constraint::Length(9),
            Constraint::Min(3),
        ])
        .split(area);

    render_timer(f, app, chunks[0]);
    render_actions(f, app, chunks[1], tap_map);
    render_last_card(f, app, chunks[2]);
    render_collection(f, app, chunks[3]);
}

fn render_timer(f: &mut Frame, app: &BoosterApp, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(" ブースター ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(timer) = app.timer() else {
        let lines = vec![
            Line::from(format!("選択中: {} ブースター", app.booster.display_name())),
            Line::from(format!("待ち時間: {}h", app.hours)),
            Line::from(Span::styled(
                "長く待つほどレアなカードが出やすい",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
        return;
    };

    let now = app.service.now();
    let name = timer
        .booster_type
        .parse::<BoosterType>()
        .map(|b| b.display_name().to_string())
        .unwrap_or_else(|_| timer.booster_type.clone());
    let status = match timer.status {
        TimerStatus::Active => Line::from(vec![
            Span::raw("残り "),
            Span::styled(
                format_time_remaining(remaining_seconds(timer, now)),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  今すぐ開けると +{:.1}%", app.service.early_open_bonus(timer)),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        TimerStatus::Ready => Line::from(Span::styled(
            "準備完了！パックを開けよう",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1)])
        .split(inner);

    let text = vec![
        Line::from(format!("{name} ブースター / {}h", timer.original_hours)),
        status,
    ];
    f.render_widget(Paragraph::new(text), rows[0]);

    let percent = progress_percent(timer, now);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
        .ratio(percent / 100.0)
        .label(format!("{percent:.0}%"));
    f.render_widget(gauge, rows[1]);
}

fn render_actions(f: &mut Frame, app: &BoosterApp, area: Rect, tap_map: &Rc<RefCell<TapMap>>) {
    let items: Vec<ListItem> = app
        .actions
        .iter()
        .map(|a| {
            let label_style = if a.key == 'x' && app.confirm_clear {
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!(" [{}] ", a.key.to_ascii_uppercase()),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                Span::styled(a.label.as_str(), label_style),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" ▶ アクション "),
    );
    f.render_widget(list, area);

    let visible = area.height.saturating_sub(2) as usize;
    let mut map = tap_map.borrow_mut();
    for (i, action) in app.actions.iter().take(visible).enumerate() {
        map.bind_row(area.y + 1 + i as u16, action.key);
    }
}

fn render_log(f: &mut Frame, app: &BoosterApp, area: Rect) {
    let visible_height = area.height.saturating_sub(2) as usize;
    let start = app.log.len().saturating_sub(visible_height);

    let lines: Vec<Line> = app.log[start..]
        .iter()
        .map(|entry| {
            let style = if entry.is_important {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(Span::styled(entry.text.as_str(), style))
        })
        .collect();

    let log = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue))
                .title(" ログ "),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(log, area);
}

fn rarity_color(tier: RarityTier) -> Color {
    match tier {
        RarityTier::Top => Color::Yellow,
        RarityTier::Mid => Color::White,
        RarityTier::Base => Color::Rgb(205, 127, 50),
    }
}

fn labels_for<'a>(catalog: &'a Catalog, card: &Card) -> Option<&'a AttributeLabels> {
    let booster = catalog.booster_for_card_type(&card.template_ref)?;
    catalog.get(booster).ok().map(|entry| &entry.attribute_labels)
}

fn stat_bar(value: u32) -> String {
    const WIDTH: u32 = 10;
    let filled = (value.min(MAX_STAT) * WIDTH / MAX_STAT) as usize;
    format!(
        "{}{}",
        "█".repeat(filled),
        "░".repeat(WIDTH as usize - filled)
    )
}

fn render_last_card(f: &mut Frame, app: &BoosterApp, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(" 開封結果 ");

    let Some(card) = &app.last_card else {
        let empty = Paragraph::new(Span::styled(
            "まだパックを開けていない",
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        f.render_widget(empty, area);
        return;
    };

    let color = rarity_color(card.rarity_tier);
    let labels = labels_for(app.service.catalog(), card);
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!("[{}] ", card.rarity_tier.label()),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(card.name.as_str(), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                format!("  +{}%", card.bonus_percentage),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(card.description.as_str()),
    ];
    for &stat in StatKind::all() {
        let label = labels.map(|l| l.get(stat)).unwrap_or(stat.key());
        let value = card.stats.get(stat);
        lines.push(Line::from(vec![
            Span::raw(format!("{label:<12} ")),
            Span::styled(stat_bar(value), Style::default().fg(color)),
            Span::raw(format!(" {value}")),
        ]));
    }
    lines.push(Line::from(Span::styled(
        card.flavor_text.as_str(),
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    )));

    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_collection(f: &mut Frame, app: &BoosterApp, area: Rect) {
    let summary = CollectionSummary::of(&app.cards);
    let mut lines = vec![Line::from(vec![
        Span::raw(format!("合計 {}  ", summary.total)),
        Span::styled(
            format!("GOLD {}  ", summary.top),
            Style::default().fg(rarity_color(RarityTier::Top)),
        ),
        Span::styled(
            format!("SILVER {}  ", summary.mid),
            Style::default().fg(rarity_color(RarityTier::Mid)),
        ),
        Span::styled(
            format!("BRONZE {}", summary.base),
            Style::default().fg(rarity_color(RarityTier::Base)),
        ),
    ])];

    for group in group_for_display(&app.cards, app.service.catalog()) {
        if group.cards.is_empty() {
            continue;
        }
        lines.push(Line::from(Span::styled(
            format!("{} ({})", group.booster.display_name(), group.cards.len()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        for card in &group.cards {
            let stats: Vec<String> = StatKind::all()
                .iter()
                .map(|&s| format!("{} {}", s.key().to_uppercase(), card.stats.get(s)))
                .collect();
            lines.push(Line::from(vec![
                Span::styled(
                    format!(" ◆ {:<7}", card.rarity_tier.label()),
                    Style::default().fg(rarity_color(card.rarity_tier)),
                ),
                Span::raw(format!("{}  ", card.name)),
                Span::styled(stats.join(" "), Style::default().fg(Color::Gray)),
            ]));
        }
    }

    let collection = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" コレクション "),
    );
    f.render_widget(collection, area);
}

fn render_help(f: &mut Frame, area: Rect) {
    let help = Paragraph::new(Line::from(Span::styled(
        "[H/W] 種類  [+/-] 時間  [S] 開始  [N] 今すぐ  [O] 開ける  [X] 空にする",
        Style::default().fg(Color::DarkGray),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    )
    .alignment(Alignment::Center);
    f.render_widget(help, area);
}
