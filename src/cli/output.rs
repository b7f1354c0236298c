use serde::Serialize;
use std::io::IsTerminal;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format: OutputFormat,
    pub pretty: bool,
    pub use_color: bool,
    pub verbose: bool,
}

impl OutputOptions {
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Serialize a value to stdout, honoring `--pretty`.
    pub fn print_json<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        println!("{}", json);
        Ok(())
    }
}

pub fn detect_color(color_flag: bool) -> bool {
    if !color_flag {
        return false;
    }
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    std::io::stdout().is_terminal()
}
