//! Terminal sketchpad for human drawings.
//!
//! A fixed grid of cells painted with the mouse or the keyboard. The
//! finished sketch is stored as plain text, one row per line.

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::{self, stdout};
use std::path::Path;
use std::time::Duration;
use telephone_core::backend::drawing_path;

pub const CANVAS_WIDTH: u16 = 48;
pub const CANVAS_HEIGHT: u16 = 16;

const INK: char = '#';

/// Result of handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SketchResult {
    Continue,
    Finished,
}

/// Sketch state, independent of the terminal.
pub struct Sketchpad {
    title: String,
    cells: Vec<bool>,
    cursor: (u16, u16),
    /// Screen area of the canvas at the last render, for mouse hits.
    canvas: Rect,
}

impl Sketchpad {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            cells: vec![false; usize::from(CANVAS_WIDTH) * usize::from(CANVAS_HEIGHT)],
            cursor: (0, 0),
            canvas: Rect::default(),
        }
    }

    fn index(x: u16, y: u16) -> usize {
        usize::from(y) * usize::from(CANVAS_WIDTH) + usize::from(x)
    }

    pub fn paint(&mut self, x: u16, y: u16) {
        if x < CANVAS_WIDTH && y < CANVAS_HEIGHT {
            self.cells[Self::index(x, y)] = true;
        }
    }

    pub fn is_painted(&self, x: u16, y: u16) -> bool {
        x < CANVAS_WIDTH && y < CANVAS_HEIGHT && self.cells[Self::index(x, y)]
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = false);
    }

    pub fn is_blank(&self) -> bool {
        !self.cells.iter().any(|c| *c)
    }

    /// The sketch as text, trailing blanks removed.
    pub fn to_text(&self) -> String {
        let mut rows: Vec<String> = (0..CANVAS_HEIGHT)
            .map(|y| {
                (0..CANVAS_WIDTH)
                    .map(|x| if self.is_painted(x, y) { INK } else { ' ' })
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect();
        while rows.last().is_some_and(|r| r.is_empty()) {
            rows.pop();
        }
        rows.join("\n")
    }

    pub fn handle_event(&mut self, event: Event) -> SketchResult {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse);
                SketchResult::Continue
            }
            _ => SketchResult::Continue,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> SketchResult {
        if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
            return SketchResult::Finished;
        }

        let (x, y) = self.cursor;
        match key.code {
            KeyCode::Enter | KeyCode::Esc => return SketchResult::Finished,
            KeyCode::Left => self.cursor.0 = x.saturating_sub(1),
            KeyCode::Right => self.cursor.0 = (x + 1).min(CANVAS_WIDTH - 1),
            KeyCode::Up => self.cursor.1 = y.saturating_sub(1),
            KeyCode::Down => self.cursor.1 = (y + 1).min(CANVAS_HEIGHT - 1),
            KeyCode::Char(' ') => self.paint(x, y),
            KeyCode::Char('c') => self.clear(),
            _ => {}
        }
        SketchResult::Continue
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left) => {
                let inside = mouse.column >= self.canvas.x
                    && mouse.row >= self.canvas.y
                    && mouse.column < self.canvas.x + self.canvas.width
                    && mouse.row < self.canvas.y + self.canvas.height;
                if inside {
                    let (x, y) = (mouse.column - self.canvas.x, mouse.row - self.canvas.y);
                    self.cursor = (x, y);
                    self.paint(x, y);
                }
            }
            _ => {}
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(CANVAS_HEIGHT + 2),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(frame.area());

        let title = Paragraph::new(self.title.as_str())
            .block(Block::default().borders(Borders::ALL).title(" Prompt "))
            .wrap(Wrap { trim: true });
        frame.render_widget(title, chunks[0]);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Sketch ");
        let area = Rect {
            width: (CANVAS_WIDTH + 2).min(chunks[1].width),
            ..chunks[1]
        };
        self.canvas = block.inner(area);

        let cursor_style = Style::default().add_modifier(Modifier::REVERSED);
        let lines: Vec<Line> = (0..CANVAS_HEIGHT)
            .map(|y| {
                Line::from(
                    (0..CANVAS_WIDTH)
                        .map(|x| {
                            let ch = if self.is_painted(x, y) { INK } else { ' ' };
                            if (x, y) == self.cursor {
                                Span::styled(ch.to_string(), cursor_style)
                            } else {
                                Span::raw(ch.to_string())
                            }
                        })
                        .collect::<Vec<_>>(),
                )
            })
            .collect();
        frame.render_widget(Paragraph::new(lines).block(block), area);

        let help = Paragraph::new(Line::from(vec![
            Span::styled("drag", Style::default().fg(Color::Yellow)),
            Span::raw(" or "),
            Span::styled("arrows+space", Style::default().fg(Color::Yellow)),
            Span::raw(" paint  "),
            Span::styled("c", Style::default().fg(Color::Yellow)),
            Span::raw(" clear  "),
            Span::styled("Enter/Esc", Style::default().fg(Color::Yellow)),
            Span::raw(" save"),
        ]));
        frame.render_widget(help, chunks[2]);
    }
}

/// Open the sketchpad, wait for the participant to finish and save the
/// result to the drawings directory. Returns the saved path.
///
/// Blocks on terminal input; call it from a blocking task.
pub fn draw(name: &str, round: u32, prompt: &str, dir: &Path) -> io::Result<String> {
    let mut pad = Sketchpad::new(format!("{name}, draw: {prompt}"));

    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(out))?;

    let result = run_pad(&mut terminal, &mut pad);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    result?;

    std::fs::create_dir_all(dir)?;
    let path = drawing_path(dir, name, round, "txt");
    std::fs::write(&path, pad.to_text())?;
    Ok(path.to_string_lossy().into_owned())
}

fn run_pad<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    pad: &mut Sketchpad,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| pad.render(f))?;

        if event::poll(Duration::from_millis(100))? {
            if pad.handle_event(event::read()?) == SketchResult::Finished {
                return Ok(());
            }
        }
    }
}
