use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextPage,
    PrevPage,
    GoToPage(usize),
    Up,
    Down,
    Top,
    Refresh,
    ToggleTheme,
    Resize { width: u16, height: u16 },
}

pub struct EventHandler {
    terminal_size: Option<(u16, u16)>,
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            terminal_size: None,
        }
    }

    pub fn handle_event(&mut self, event: Event) -> Option<Action> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Resize(width, height) => self.handle_resize(width, height),
            _ => None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        let ctrl_pressed = key.modifiers.contains(KeyModifiers::CONTROL);

        match (key.code, ctrl_pressed) {
            (KeyCode::Char('c'), true) => Some(Action::Quit),
            (KeyCode::Char('q'), false) => Some(Action::Quit),
            (KeyCode::Tab, _) => Some(Action::NextPage),
            (KeyCode::BackTab, _) => Some(Action::PrevPage),
            (KeyCode::Char('j'), false) | (KeyCode::Down, _) => Some(Action::Down),
            (KeyCode::Char('k'), false) | (KeyCode::Up, _) => Some(Action::Up),
            (KeyCode::Char('g'), false) | (KeyCode::Home, _) => Some(Action::Top),
            (KeyCode::Char('r'), false) => Some(Action::Refresh),
            (KeyCode::Char('t'), false) => Some(Action::ToggleTheme),
            (KeyCode::Char(c), false) if ('1'..='4').contains(&c) => {
                Some(Action::GoToPage(c as usize - '1' as usize))
            }
            _ => None,
        }
    }

    /// Repeated resize events with an unchanged size are dropped.
    pub fn handle_resize(&mut self, width: u16, height: u16) -> Option<Action> {
        if self.terminal_size == Some((width, height)) {
            return None;
        }
        self.terminal_size = Some((width, height));
        Some(Action::Resize { width, height })
    }
}
