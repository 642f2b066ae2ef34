use std::{
    io::{self, IsTerminal, Write},
    sync::{Arc, Mutex, PoisonError},
};

use crossterm::{
    cursor, queue,
    terminal::{self, ClearType},
};
use weather_core::{RenderRegion, RenderState, render_text};

const FALLBACK_WIDTH: u16 = 80;

/// How a new frame replaces the previous one on the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedrawMode {
    /// Erase the rows of the previous frame and draw over them.
    InPlace,
    /// Clear the whole screen before each frame.
    ClearScreen,
    /// Output is not a terminal; only final frames (results and errors) are written.
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escape {
    None,
    Start,
    Csi,
}

/// Counts how many rows the cursor moves down while text is printed on a
/// terminal `width` columns wide. Escape sequences take no room.
#[derive(Debug, Clone)]
struct RowCounter {
    width: usize,
    column: usize,
    rows: usize,
    escape: Escape,
}

impl RowCounter {
    fn new(width: u16) -> Self {
        Self {
            width: usize::from(width).max(1),
            column: 0,
            rows: 0,
            escape: Escape::None,
        }
    }

    fn feed(&mut self, text: &str) {
        for ch in text.chars() {
            match self.escape {
                Escape::Start => {
                    self.escape = if ch == '[' {
                        Escape::Csi
                    } else {
                        Escape::None
                    };
                    continue;
                }
                Escape::Csi => {
                    if ('@'..='~').contains(&ch) {
                        self.escape = Escape::None;
                    }
                    continue;
                }
                Escape::None => {}
            }

            match ch {
                '\x1b' => self.escape = Escape::Start,
                '\n' => {
                    self.rows += 1;
                    self.column = 0;
                }
                '\r' => self.column = 0,
                c if c.is_control() => {}
                _ => {
                    // the terminal wraps before printing past the last column
                    if self.column >= self.width {
                        self.rows += 1;
                        self.column = 0;
                    }
                    self.column += 1;
                }
            }
        }
    }
}

fn rows_taken(text: &str, width: u16) -> usize {
    let mut counter = RowCounter::new(width);
    counter.feed(text);
    counter.rows
}

/// Rows written to the terminal by someone other than the region, such as
/// log lines on stderr when stderr and stdout share a tty.
#[derive(Debug, Clone)]
pub struct SharedRows(Arc<Mutex<RowCounter>>);

impl SharedRows {
    pub fn new(width: u16) -> Self {
        Self(Arc::new(Mutex::new(RowCounter::new(width))))
    }

    fn record(&self, text: &str) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .feed(text);
    }

    /// Rows recorded since the last call.
    fn take(&self) -> usize {
        let mut counter = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        counter.column = 0;
        std::mem::take(&mut counter.rows)
    }
}

/// Passes writes through to `inner` and records the rows they take.
#[derive(Debug)]
pub struct TrackedWriter<W> {
    inner: W,
    rows: Option<SharedRows>,
}

impl<W: Write> TrackedWriter<W> {
    pub fn new(inner: W, rows: Option<SharedRows>) -> Self {
        Self { inner, rows }
    }
}

impl<W: Write> Write for TrackedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        if let Some(rows) = &self.rows {
            rows.record(&String::from_utf8_lossy(&buf[..written]));
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// What the binary knows about the terminal it draws on.
#[derive(Debug, Clone)]
pub struct Screen {
    pub width: u16,
    /// Present when log output lands on the same tty as the region.
    pub log_rows: Option<SharedRows>,
}

impl Screen {
    pub fn detect() -> Self {
        let width = terminal::size()
            .map(|(columns, _)| columns)
            .unwrap_or(FALLBACK_WIDTH);
        let shared_tty = io::stdout().is_terminal() && io::stderr().is_terminal();

        Self {
            width,
            log_rows: shared_tty.then(|| SharedRows::new(width)),
        }
    }

    pub fn region<W: Write>(&self, out: W, mode: RedrawMode) -> TerminalRegion<W> {
        let region = TerminalRegion::new(out, mode, self.width);
        match &self.log_rows {
            Some(rows) => region.with_foreign_output(rows.clone()),
            None => region,
        }
    }
}

/// Terminal-backed output region.
#[derive(Debug)]
pub struct TerminalRegion<W: Write> {
    out: W,
    mode: RedrawMode,
    width: u16,
    frame_rows: usize,
    foreign: Option<SharedRows>,
}

impl<W: Write> TerminalRegion<W> {
    pub fn new(out: W, mode: RedrawMode, width: u16) -> Self {
        Self {
            out,
            mode,
            width,
            frame_rows: 0,
            foreign: None,
        }
    }

    /// Also erase rows other writers put below the last frame.
    pub fn with_foreign_output(mut self, rows: SharedRows) -> Self {
        self.foreign = Some(rows);
        self
    }

    fn draw(&mut self, state: &RenderState) -> io::Result<()> {
        let frame = render_text(state);
        let foreign = self.foreign.as_ref().map_or(0, SharedRows::take);

        match self.mode {
            RedrawMode::InPlace => {
                if self.frame_rows > 0 {
                    let up = u16::try_from(self.frame_rows + foreign).unwrap_or(u16::MAX);
                    queue!(
                        self.out,
                        cursor::MoveToPreviousLine(up),
                        terminal::Clear(ClearType::FromCursorDown)
                    )?;
                }
            }
            RedrawMode::ClearScreen => queue!(
                self.out,
                terminal::Clear(ClearType::All),
                cursor::MoveTo(0, 0)
            )?,
            RedrawMode::Plain => {
                if matches!(state, RenderState::Idle | RenderState::Loading) {
                    return Ok(());
                }
            }
        }

        self.out.write_all(frame.as_bytes())?;
        self.out.flush()?;
        self.frame_rows = rows_taken(&frame, self.width);
        Ok(())
    }
}

impl<W: Write> RenderRegion for TerminalRegion<W> {
    fn render(&mut self, state: &RenderState) {
        if let Err(err) = self.draw(state) {
            tracing::warn!("Failed to draw to terminal: {err}");
        }
    }
}
