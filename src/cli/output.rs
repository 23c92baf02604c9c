//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for the Docent CLI.

use owo_colors::OwoColorize;
use std::io::{self, Write};

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "💡".dimmed(), message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// Print one numbered chunk
    pub fn chunk(&self, number: usize, text: &str) {
        if self.colored {
            println!("{} {}", format!("[{}]", number).cyan().bold(), text);
        } else {
            println!("[{}] {}", number, text);
        }
    }

    /// Print one retrieved context chunk with its distance
    pub fn context(&self, position: usize, distance: f32, text: &str) {
        if self.colored {
            println!(
                "    {} {} {}",
                format!("#{}", position).cyan(),
                format!("({:.4})", distance).dimmed(),
                text
            );
        } else {
            println!("    #{} ({:.4}) {}", position, distance, text);
        }
    }

    /// Print the chat prompt without a newline
    pub fn prompt(&self) {
        if self.colored {
            print!("{} ", "?".bright_yellow().bold());
        } else {
            print!("> ");
        }
        io::stdout().flush().ok();
    }

    /// Print a streamed answer fragment immediately
    pub fn token(&self, fragment: &str) {
        print!("{}", fragment);
        io::stdout().flush().ok();
    }

    pub fn newline(&self) {
        println!();
    }
}
