//! Terminal rendering of the markdown produced by the core display types.
//!
//! Rich output colours headers and runs ordinary lines through termimad.
//! Fenced blocks (step settings) are printed verbatim so the JSON stays
//! copyable.

use anyhow::Result;
use termimad::{crossterm::style::Color, MadSkin};

const FENCE: &str = "```";

/// Terminal renderer that can switch between rich and plain text output
pub struct TerminalRenderer {
    rich_enabled: bool,
    skin: MadSkin,
}

impl TerminalRenderer {
    pub fn new(rich_enabled: bool) -> Self {
        let mut skin = MadSkin::default();
        skin.set_headers_fg(Color::Blue);
        skin.bold.set_fg(Color::Yellow);
        skin.italic.set_fg(Color::Magenta);
        skin.inline_code.set_bg(Color::AnsiValue(238));

        Self { rich_enabled, skin }
    }

    /// Render markdown text to stdout
    pub fn render(&self, markdown: &str) -> Result<()> {
        if !self.rich_enabled {
            print!("{markdown}");
            return Ok(());
        }

        let mut in_fence = false;
        for line in markdown.lines() {
            if line.trim_start().starts_with(FENCE) {
                in_fence = !in_fence;
                continue;
            }

            if in_fence {
                println!("    \x1b[2m{line}\x1b[0m");
            } else if line.starts_with('#') {
                println!("\x1b[34m{line}\x1b[0m");
            } else {
                self.skin.print_inline(line);
                println!();
            }
        }
        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_renderer() {
        let renderer = TerminalRenderer::new(false);
        assert!(!renderer.rich_enabled);
        renderer.render("# 1. Funnel\n").unwrap();
    }

    #[test]
    fn test_rich_renderer_handles_fences() {
        let renderer = TerminalRenderer::default();
        assert!(renderer.rich_enabled);
        renderer
            .render("### 1. Step 1 (ID: 3)\n\n```json\n{}\n```\n")
            .unwrap();
    }
}
