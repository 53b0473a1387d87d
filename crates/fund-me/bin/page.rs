use anstyle::{AnsiColor, Style};
use fund_me::Page;
use parking_lot::Mutex;

const LABEL: Style = Style::new().bold();
const LOG: Style = Style::new().fg_color(Some(anstyle::Color::Ansi(AnsiColor::BrightBlack)));

/// Renders the page on the terminal: the connect label and log lines go to stdout, the amount
/// input is set from the command line.
#[derive(Debug, Default)]
pub struct TerminalPage {
    amount: Mutex<String>,
}

impl TerminalPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_amount(&self, amount: impl Into<String>) {
        *self.amount.lock() = amount.into();
    }
}

impl Page for TerminalPage {
    fn set_label(&self, text: &str) {
        anstream::println!("{}{text}{}", LABEL.render(), LABEL.render_reset());
    }

    fn amount(&self) -> String {
        self.amount.lock().clone()
    }

    fn log(&self, line: &str) {
        anstream::println!("{}>{} {line}", LOG.render(), LOG.render_reset());
    }
}
