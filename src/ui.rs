use crate::error::ValidationError;
use crate::identifier::{validate, Identifier, MAX_ID, MIN_ID};
use crate::models::DisplayModel;
use crate::state::{Controller, ViewState};
use crate::utils::{format_name, text_to_lines};
use crossterm::event::KeyCode;
use image::imageops::FilterType;
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Span, Spans};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use std::io;

/// Compact RGB thumbnail of the current sprite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteThumb {
    pub w: u32,
    pub h: u32,
    /// RGB pixels in row-major order (len = w*h*3)
    pub pixels: Vec<u8>,
}

/// What the event loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Search(Identifier),
    Random,
}

pub struct App {
    pub controller: Controller,
    pub input: String,
    /// Blocking notice; must be dismissed before anything else happens.
    pub notice: Option<String>,
    pub show_help: bool,
    pub show_sprites: bool,
    // Sprite of the card on screen, keyed by pokedex id.
    sprite: Option<(u32, SpriteThumb)>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            controller: Controller::new(),
            input: String::new(),
            notice: None,
            show_help: false,
            show_sprites: true,
            sprite: None,
        }
    }

    /// Validate the search field. On failure the notice is raised and
    /// nothing should be fetched.
    pub fn submit(&mut self) -> Option<Identifier> {
        match validate(&self.input) {
            Ok(id) => Some(id),
            Err(e) => {
                self.notice = Some(notice_for(&e));
                None
            }
        }
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Action {
        // any key closes the notice, and does nothing else
        if self.notice.is_some() {
            self.dismiss_notice();
            return Action::None;
        }
        match code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Esc if self.show_help => {
                self.show_help = false;
                Action::None
            }
            KeyCode::Esc => Action::Quit,
            KeyCode::F(1) | KeyCode::Char('?') => {
                self.show_help = !self.show_help;
                Action::None
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if self.input.len() < 6 {
                    self.input.push(c);
                }
                Action::None
            }
            KeyCode::Backspace => {
                self.input.pop();
                Action::None
            }
            KeyCode::Enter => self.submit().map_or(Action::None, Action::Search),
            KeyCode::Char('r') => Action::Random,
            KeyCode::Char('s') => {
                self.show_sprites = !self.show_sprites;
                Action::None
            }
            _ => Action::None,
        }
    }

    /// Stores a sprite if it still belongs to the card on screen.
    pub fn set_sprite(&mut self, id: u32, thumb: SpriteThumb) {
        if self.controller.current().map(|m| m.id) == Some(id) {
            self.sprite = Some((id, thumb));
        }
    }

    /// Pixel rows sized `w` x `h` for the sprite of `id`, resized from the
    /// cached thumbnail when the requested size differs.
    pub fn get_sprite_pixels(&self, id: u32, w: u32, h: u32) -> Option<Vec<Vec<(u8, u8, u8)>>> {
        let thumb = match &self.sprite {
            Some((sid, thumb)) if *sid == id => thumb,
            _ => return None,
        };

        if thumb.w == w && thumb.h == h {
            let rows = thumb
                .pixels
                .chunks(w as usize * 3)
                .map(|row| row.chunks(3).map(|p| (p[0], p[1], p[2])).collect())
                .collect();
            return Some(rows);
        }

        let mut buf = image::RgbaImage::new(thumb.w, thumb.h);
        for (i, px) in thumb.pixels.chunks(3).enumerate() {
            let x = i as u32 % thumb.w;
            let y = i as u32 / thumb.w;
            buf.put_pixel(x, y, image::Rgba([px[0], px[1], px[2], 255]));
        }
        let resized = image::imageops::resize(&buf, w, h, FilterType::Lanczos3);
        let mut rows: Vec<Vec<(u8, u8, u8)>> = Vec::with_capacity(resized.height() as usize);
        for y in 0..resized.height() {
            let mut row = Vec::with_capacity(resized.width() as usize);
            for x in 0..resized.width() {
                let p = resized.get_pixel(x, y);
                row.push((p[0], p[1], p[2]));
            }
            rows.push(row);
        }
        Some(rows)
    }
}

pub fn notice_for(err: &ValidationError) -> String {
    format!(
        "Enter a valid number between {} and {} ({})",
        MIN_ID, MAX_ID, err
    )
}

// helper to compute a centered rect for popups
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_w = r.width.saturating_mul(percent_x) / 100;
    let popup_h = r.height.saturating_mul(percent_y) / 100;
    let popup_x = r.x + (r.width.saturating_sub(popup_w) / 2);
    let popup_y = r.y + (r.height.saturating_sub(popup_h) / 2);
    Rect::new(popup_x, popup_y, popup_w, popup_h)
}

pub fn draw_ui<B: Backend>(terminal: &mut Terminal<B>, app: &App) -> io::Result<()> {
    terminal.draw(|f| render(f, app)).map(|_| ())
}

fn render<B: Backend>(f: &mut Frame<B>, app: &App) {
    let size = f.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(12),
            Constraint::Min(4),
            Constraint::Length(3),
        ])
        .split(size);

    let search = Paragraph::new(Spans::from(vec![
        Span::raw(format!("Number ({}-{}): ", MIN_ID, MAX_ID)),
        Span::styled(
            format!("{}_", app.input),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL).title("Search"));
    f.render_widget(search, chunks[0]);

    match app.controller.current() {
        Some(p) => render_card(f, app, p, chunks[1], chunks[2]),
        None => {
            let msg = if app.controller.is_loading() {
                "Loading, please wait..."
            } else {
                "Nothing to show yet."
            };
            let placeholder = Paragraph::new(msg)
                .block(Block::default().borders(Borders::ALL).title("Pokémon"));
            f.render_widget(placeholder, chunks[1].union(chunks[2]));
        }
    }

    f.render_widget(status_line(app.controller.state()), chunks[3]);

    if app.show_help {
        let popup = centered_rect(60, 50, size);
        let help_lines = vec![
            Spans::from(Span::styled(
                "Keybindings",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Spans::from(Span::raw("")),
            Spans::from(Span::raw("0-9        Type a pokedex number")),
            Spans::from(Span::raw("Enter      Search")),
            Spans::from(Span::raw("r          Random Pokémon")),
            Spans::from(Span::raw("s          Toggle sprite")),
            Spans::from(Span::raw("?/F1       Toggle this help")),
            Spans::from(Span::raw("q/Esc      Quit")),
        ];
        let help_para = Paragraph::new(help_lines)
            .block(Block::default().borders(Borders::ALL).title("Help"))
            .wrap(Wrap { trim: true });
        f.render_widget(Clear, popup);
        f.render_widget(help_para, popup);
    }

    if let Some(notice) = &app.notice {
        let popup = centered_rect(60, 30, size);
        let lines = vec![
            Spans::from(Span::styled(
                notice.as_str(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Spans::from(Span::raw("")),
            Spans::from(Span::raw("Press any key to continue.")),
        ];
        let para = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Invalid input"))
            .wrap(Wrap { trim: true });
        f.render_widget(Clear, popup);
        f.render_widget(para, popup);
    }
}

fn render_card<B: Backend>(f: &mut Frame<B>, app: &App, p: &DisplayModel, top: Rect, bottom: Rect) {
    let top_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(10)])
        .split(top);

    let sprite_block = Block::default().borders(Borders::ALL).title("Sprite");
    let sprite_para = if app.show_sprites {
        let rect = top_chunks[0];
        let sprite_w = (rect.width.saturating_sub(2).max(1) as u32).min(64);
        let sprite_h = (rect.height.saturating_sub(2).max(1) as u32).min(64);
        if let Some(sprite_lines) = app.get_sprite_pixels(p.id, sprite_w, sprite_h) {
            let stext: Vec<Spans> = sprite_lines
                .iter()
                .map(|row| {
                    Spans::from(
                        row.iter()
                            .map(|&(r, g, b)| {
                                Span::styled(" ", Style::default().bg(Color::Rgb(r, g, b)))
                            })
                            .collect::<Vec<_>>(),
                    )
                })
                .collect();
            Paragraph::new(stext).block(sprite_block)
        } else {
            Paragraph::new("(no sprite)").block(sprite_block)
        }
    } else {
        Paragraph::new("(sprites off)").block(sprite_block)
    };
    f.render_widget(sprite_para, top_chunks[0]);

    // NAME (padded) | VALUE | [bar...]
    let inner_w = top_chunks[1].width.saturating_sub(2) as usize;
    let name_w = 15usize;
    let val_w = 4usize;
    let bar_max_w = inner_w.saturating_sub(name_w + val_w + 2);
    let scale_max = 255.0f32;

    let mut info_lines: Vec<Spans> = vec![
        Spans::from(Span::styled(
            format!("{} (#{})", format_name(&p.name), p.id),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Spans::from(Span::raw("")),
    ];
    for (label, value) in [
        ("HP", p.hp),
        ("Attack", p.attack),
        ("Defense", p.defense),
        ("Special Attack", p.special),
    ] {
        let bar_len = (((value as f32) / scale_max).min(1.0) * (bar_max_w as f32)).round() as usize;
        info_lines.push(Spans::from(vec![
            Span::raw(format!(
                "{:<name_w$} {:>val_w$} ",
                label,
                value,
                name_w = name_w,
                val_w = val_w
            )),
            Span::styled("█".repeat(bar_len), Style::default().fg(Color::Green)),
        ]));
    }
    let info_para = Paragraph::new(info_lines)
        .block(Block::default().borders(Borders::ALL).title("Stats"));
    f.render_widget(info_para, top_chunks[1]);

    let width = bottom.width.saturating_sub(2).max(1) as usize;
    let desc: Vec<Spans> = text_to_lines(&p.description, width)
        .into_iter()
        .map(|line| Spans::from(Span::raw(line)))
        .collect();
    let desc_para = Paragraph::new(desc)
        .block(Block::default().borders(Borders::ALL).title("Description"))
        .wrap(Wrap { trim: true });
    f.render_widget(desc_para, bottom);
}

fn status_line(state: &ViewState) -> Paragraph<'static> {
    let (text, style) = match state {
        ViewState::Loading => (
            "Loading, please wait...".to_string(),
            Style::default().fg(Color::Yellow),
        ),
        ViewState::Failed(reason) => (
            format!("Could not load that Pokémon: {}", reason),
            Style::default().fg(Color::Red),
        ),
        ViewState::Idle | ViewState::Displayed(_) => (
            "Enter: search  r: random  ?: help  q: quit".to_string(),
            Style::default(),
        ),
    };
    Paragraph::new(Span::styled(text, style))
        .block(Block::default().borders(Borders::ALL).title("Status"))
}
