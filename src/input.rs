use crate::controller::Command;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub fn map_key(pattern_mode: bool, key: KeyEvent) -> Command {
    // Global
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
    {
        return Command::Quit;
    }
    if matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q')) {
        return Command::Quit;
    }

    if pattern_mode {
        return match key.code {
            KeyCode::Left => Command::MoveCursorLeft,
            KeyCode::Right => Command::MoveCursorRight,
            KeyCode::Up => Command::MoveCursorUp,
            KeyCode::Down => Command::MoveCursorDown,
            KeyCode::Char(c @ '1'..='9') => Command::SelectPattern(c as usize - '0' as usize),
            KeyCode::Char('r') | KeyCode::Char('R') => Command::RotatePattern,
            KeyCode::Char(' ') | KeyCode::Enter => Command::PlacePattern,
            KeyCode::Char('p') | KeyCode::Char('P') => Command::TogglePatternMode,
            KeyCode::Esc => Command::ExitPatternMode,
            _ => Command::Continue,
        };
    }

    match key.code {
        KeyCode::Char('r') | KeyCode::Char('R') => Command::Restart,
        KeyCode::Char('c') | KeyCode::Char('C') => Command::ClearGrid,
        KeyCode::Char(' ') => Command::ToggleSimulation,
        KeyCode::Up => Command::SpeedUp,
        KeyCode::Down => Command::SpeedDown,
        KeyCode::Char('+') | KeyCode::Char('=') => Command::ResizeLarger,
        KeyCode::Char('-') | KeyCode::Char('_') => Command::ResizeSmaller,
        KeyCode::Char('b') | KeyCode::Char('B') => Command::CycleBoundary,
        KeyCode::Char(']') => Command::ViewportExpand,
        KeyCode::Char('[') => Command::ViewportShrink,
        KeyCode::Char('h') | KeyCode::Left => Command::ViewportPanLeft,
        KeyCode::Char('l') | KeyCode::Right => Command::ViewportPanRight,
        KeyCode::Char('k') => Command::ViewportPanUp,
        KeyCode::Char('j') => Command::ViewportPanDown,
        KeyCode::Char('p') | KeyCode::Char('P') => Command::TogglePatternMode,
        KeyCode::Char('d') | KeyCode::Char('D') => Command::ToggleDebug,
        _ => Command::Continue,
    }
}
