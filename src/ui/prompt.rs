use crate::error::{BackupError, Result};
use crate::scanner::InstallationPath;
use std::io::{BufRead, Write};

/// Operator's answer to the installation menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallationChoice {
    All,
    Single(usize),
}

impl InstallationChoice {
    /// Accepts a zero-based menu index or `all` / `a` (any case).
    pub fn parse(input: &str, available: usize) -> Result<Self> {
        let token = input.trim();

        if token.eq_ignore_ascii_case("all") || token.eq_ignore_ascii_case("a") {
            return Ok(InstallationChoice::All);
        }

        let index: usize = token.parse().map_err(|_| {
            BackupError::invalid_selection(input, "expected an installation number or 'all'")
        })?;

        if index >= available {
            return Err(BackupError::invalid_selection(
                input,
                format!(
                    "installation numbers run from 0 to {}",
                    available.saturating_sub(1)
                ),
            ));
        }

        Ok(InstallationChoice::Single(index))
    }

    pub fn select(&self, installations: &[InstallationPath]) -> Vec<InstallationPath> {
        match self {
            InstallationChoice::All => installations.to_vec(),
            InstallationChoice::Single(index) => {
                installations.get(*index).cloned().into_iter().collect()
            }
        }
    }

    /// Archive label: `All`, or the chosen installation's leaf name.
    pub fn archive_label(&self, installations: &[InstallationPath]) -> String {
        match self {
            InstallationChoice::All => "All".to_string(),
            InstallationChoice::Single(index) => installations
                .get(*index)
                .map(|i| i.name.clone())
                .unwrap_or_else(|| "All".to_string()),
        }
    }
}

/// Line-oriented question/answer over any reader and writer.
pub struct Prompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Prints `question` and returns the next input line without its line
    /// ending. End of input yields an empty answer.
    pub fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.writer, "{}", question)?;
        self.writer.flush()?;

        let mut line = String::new();
        self.reader.read_line(&mut line)?;

        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn installations() -> Vec<InstallationPath> {
        vec![
            InstallationPath::new("/opt/EnRoute6"),
            InstallationPath::new("/opt/EnRoute9"),
        ]
    }

    #[test]
    fn test_parse_index_and_all() {
        assert_eq!(InstallationChoice::parse("0", 2).unwrap(), InstallationChoice::Single(0));
        assert_eq!(InstallationChoice::parse(" 1 \n", 2).unwrap(), InstallationChoice::Single(1));
        assert_eq!(InstallationChoice::parse("ALL", 2).unwrap(), InstallationChoice::All);
        assert_eq!(InstallationChoice::parse("a", 2).unwrap(), InstallationChoice::All);
    }

    #[test]
    fn test_parse_rejects_out_of_range_and_garbage() {
        for input in ["2", "-1", "", "one", "1.0"] {
            assert!(
                matches!(
                    InstallationChoice::parse(input, 2),
                    Err(BackupError::InvalidSelection { .. })
                ),
                "should reject {:?}",
                input
            );
        }
    }

    #[test]
    fn test_select_and_label() {
        let installs = installations();

        let single = InstallationChoice::Single(1);
        assert_eq!(single.select(&installs), vec![installs[1].clone()]);
        assert_eq!(single.archive_label(&installs), "EnRoute9");

        let all = InstallationChoice::All;
        assert_eq!(all.select(&installs).len(), 2);
        assert_eq!(all.archive_label(&installs), "All");
    }

    #[test]
    fn test_prompter_reads_lines() {
        let input = Cursor::new("1\r\nall\n");
        let mut output = Vec::new();
        {
            let mut prompter = Prompter::new(input, &mut output);
            assert_eq!(prompter.ask("Mode: ").unwrap(), "1");
            assert_eq!(prompter.ask("Install: ").unwrap(), "all");
            assert_eq!(prompter.ask("Again: ").unwrap(), "");
        }
        assert_eq!(String::from_utf8(output).unwrap(), "Mode: Install: Again: ");
    }
}
