//! Visual theme and styling.

use console::Style;

/// Console palette used for run output.
#[derive(Debug, Clone)]
pub struct BuilderTheme {
    /// Step announcements (magenta).
    pub status: Style,
    /// Command lines about to run (yellow).
    pub command: Style,
    /// Success messages (green).
    pub success: Style,
    /// Warnings and notices (orange).
    pub warning: Style,
    /// Failures (red bold).
    pub error: Style,
    /// Secondary text, echoed output.
    pub dim: Style,
    /// Headers (magenta bold).
    pub header: Style,
    pub highlight: Style,
}

impl Default for BuilderTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl BuilderTheme {
    pub fn new() -> Self {
        Self {
            status: Style::new().magenta(),
            command: Style::new().yellow(),
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
            header: Style::new().bold().magenta(),
            highlight: Style::new().bold(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            status: Style::new(),
            command: Style::new(),
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            header: Style::new(),
            highlight: Style::new(),
        }
    }

    pub fn format_status(&self, msg: &str) -> String {
        format!("{}", self.status.apply_to(format!("◆ {}", msg)))
    }

    pub fn format_command(&self, cmd: &str) -> String {
        format!("{}", self.command.apply_to(format!("$ {}", cmd)))
    }

    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    pub fn format_skipped(&self, msg: &str) -> String {
        format!("{}", self.dim.apply_to(format!("⊘ {}", msg)))
    }

    pub fn format_header(&self, title: &str) -> String {
        format!("{}", self.header.apply_to(title))
    }

    /// Frame banner lines in a box of asterisks.
    pub fn format_banner(&self, lines: &[&str], success: bool) -> String {
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 4;
        let border = "*".repeat(width + 4);
        let style = if success { &self.success } else { &self.error };

        let mut out = vec![format!("{}", style.apply_to(&border))];
        for line in lines {
            let padded = format!("{:^width$}", line, width = width);
            out.push(format!("{}", style.apply_to(format!("**{}**", padded))));
        }
        out.push(format!("{}", style.apply_to(&border)));
        out.join("\n")
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // Check NO_COLOR env var (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_theme_keeps_icons() {
        let theme = BuilderTheme::plain();
        assert_eq!(theme.format_success("done"), "✓ done");
        assert_eq!(theme.format_error("boom"), "✗ boom");
        assert_eq!(theme.format_command("sfdx org"), "$ sfdx org");
        assert_eq!(theme.format_skipped("LoadData"), "⊘ LoadData");
    }

    #[test]
    fn banner_is_framed() {
        let theme = BuilderTheme::plain();
        let banner = theme.format_banner(&["ABORTING"], false);
        let lines: Vec<&str> = banner.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].chars().all(|c| c == '*'));
        assert!(lines[1].contains("ABORTING"));
        assert_eq!(lines[0].chars().count(), lines[1].chars().count());
    }
}
