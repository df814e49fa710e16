use blockwatch_core::ServiceStatus;
use ratatui::style::{Modifier, Style};

use super::TerminalTheme;

pub struct ThemedStyles<'a> {
    theme: &'a TerminalTheme,
}

impl<'a> ThemedStyles<'a> {
    pub fn new(theme: &'a TerminalTheme) -> Self {
        Self { theme }
    }

    pub fn base(&self) -> Style {
        Style::default()
            .bg(self.theme.background)
            .fg(self.theme.foreground)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.theme.border)
    }

    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.theme.primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn dimmed(&self) -> Style {
        Style::default().fg(self.theme.foreground_dim)
    }

    pub fn accent(&self) -> Style {
        Style::default().fg(self.theme.primary)
    }

    pub fn accent_bold(&self) -> Style {
        self.accent().add_modifier(Modifier::BOLD)
    }

    pub fn secondary(&self) -> Style {
        Style::default().fg(self.theme.secondary)
    }

    pub fn table_header(&self) -> Style {
        Style::default()
            .fg(self.theme.axis_title)
            .add_modifier(Modifier::BOLD)
    }

    pub fn blocked(&self, blocked: bool) -> Style {
        if blocked {
            Style::default().fg(self.theme.error())
        } else {
            Style::default().fg(self.theme.success())
        }
    }

    pub fn status(&self, status: ServiceStatus) -> Style {
        let color = match status {
            ServiceStatus::Running => self.theme.success(),
            ServiceStatus::Stopped => self.theme.error(),
            ServiceStatus::Unknown => self.theme.warning(),
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }
}
