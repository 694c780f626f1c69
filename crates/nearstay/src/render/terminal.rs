use std::fmt::Write as _;
use std::io::Write;

use nearstay_core::Status;

use super::Row;

/// Console on stdout. The status line is dimmed, the list is numbered and,
/// at the prompt, each entry shows the command that opens it.
pub struct Console {
    color: bool,
    prompt: bool,
}

impl Console {
    pub const fn new(color: bool, prompt: bool) -> Self {
        Self { color, prompt }
    }
}

impl super::Console for Console {
    fn status(&self, status: &Status) {
        if self.color {
            println!("\x1b[2m{status}\x1b[0m");
        } else {
            println!("{status}");
        }
        let _ = std::io::stdout().flush();
    }

    fn list(&self, rows: &[Row]) {
        if rows.is_empty() {
            return;
        }
        print!("{}", format_rows(rows, self.prompt));
        let _ = std::io::stdout().flush();
    }
}

fn format_rows(rows: &[Row], prompt: bool) -> String {
    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        let _ = writeln!(out, "{}. {} ({:.2} km)", i + 1, row.name, row.distance_km);
        if prompt {
            let _ = writeln!(out, "   open {} -> {}", i + 1, row.url);
        } else {
            let _ = writeln!(out, "   {}", row.url);
        }
    }
    out
}
