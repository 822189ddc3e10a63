use crate::render::{DrawOp, Style};
use crate::viewport::TerminalSize;
use crossterm::{
    cursor,
    event::{self, Event, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Stdout, Write};
use std::time::Duration;

pub trait Surface {
    fn size(&self) -> anyhow::Result<TerminalSize>;
    fn clear(&mut self) -> anyhow::Result<()>;
    fn write_at(&mut self, x: u16, y: u16, text: &str, style: Style) -> anyhow::Result<()>;
    fn flush(&mut self) -> anyhow::Result<()>;
    fn poll_key(&mut self, timeout: Duration) -> anyhow::Result<Option<KeyEvent>>;
}

pub fn apply(surface: &mut dyn Surface, ops: &[DrawOp]) -> anyhow::Result<()> {
    for op in ops {
        match op {
            DrawOp::ClearScreen => surface.clear()?,
            DrawOp::MoveAndWrite { x, y, text, style } => surface.write_at(*x, *y, text, *style)?,
        }
    }
    surface.flush()
}

fn style_colors(style: Style) -> (Color, bool) {
    match style {
        Style::Alive => (Color::Green, true),
        Style::Dead => (Color::DarkGrey, false),
        Style::Dim => (Color::DarkGrey, false),
        Style::PatternPreview => (Color::Yellow, true),
        Style::Status => (Color::Cyan, false),
        Style::Menu => (Color::White, false),
    }
}

// Terminal state is restored on drop, panics included.
pub struct CrosstermTerminal {
    out: Stdout,
    in_frame: bool,
}

impl CrosstermTerminal {
    pub fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            out,
            EnterAlternateScreen,
            DisableLineWrap,
            cursor::Hide,
            Clear(ClearType::All),
            cursor::MoveTo(0, 0)
        )?;
        Ok(Self {
            out,
            in_frame: false,
        })
    }

    fn start_frame(&mut self) -> anyhow::Result<()> {
        if !self.in_frame {
            queue!(self.out, BeginSynchronizedUpdate)?;
            self.in_frame = true;
        }
        Ok(())
    }
}

impl Drop for CrosstermTerminal {
    fn drop(&mut self) {
        let _ = execute!(
            self.out,
            EndSynchronizedUpdate,
            ResetColor,
            SetAttribute(Attribute::Reset),
            cursor::Show,
            EnableLineWrap,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

impl Surface for CrosstermTerminal {
    fn size(&self) -> anyhow::Result<TerminalSize> {
        let (cols, rows) = terminal::size()?;
        Ok(TerminalSize::new(cols, rows))
    }

    fn clear(&mut self) -> anyhow::Result<()> {
        self.start_frame()?;
        queue!(self.out, ResetColor, Clear(ClearType::All))?;
        Ok(())
    }

    fn write_at(&mut self, x: u16, y: u16, text: &str, style: Style) -> anyhow::Result<()> {
        self.start_frame()?;
        let (fg, bold) = style_colors(style);
        queue!(self.out, cursor::MoveTo(x, y), SetForegroundColor(fg))?;
        if bold {
            queue!(self.out, SetAttribute(Attribute::Bold))?;
        }
        queue!(self.out, Print(text), SetAttribute(Attribute::Reset))?;
        Ok(())
    }

    fn flush(&mut self) -> anyhow::Result<()> {
        if self.in_frame {
            queue!(self.out, EndSynchronizedUpdate)?;
            self.in_frame = false;
        }
        self.out.flush()?;
        Ok(())
    }

    fn poll_key(&mut self, timeout: Duration) -> anyhow::Result<Option<KeyEvent>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(k) if k.kind != KeyEventKind::Release => Ok(Some(k)),
            _ => Ok(None),
        }
    }
}
