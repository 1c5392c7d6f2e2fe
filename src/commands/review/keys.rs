//! Operator keystrokes for the review loop

use std::io::{self, BufRead};

use console::{Key, Term};

/// What the operator asked for at the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Keep,
    Delete,
    View,
    Enhance,
    Concepts,
    Skip,
    Quit,
    Unknown(char),
}

impl Action {
    /// Map a typed character. Ctrl-C in raw mode arrives as ETX and quits.
    pub fn from_char(c: char) -> Self {
        match c.to_ascii_lowercase() {
            'k' => Action::Keep,
            'd' => Action::Delete,
            'v' => Action::View,
            'e' => Action::Enhance,
            'c' => Action::Concepts,
            's' => Action::Skip,
            'q' | '\u{3}' => Action::Quit,
            other => Action::Unknown(other),
        }
    }
}

/// Source of operator decisions
pub trait KeySource {
    fn next_action(&mut self) -> io::Result<Action>;

    /// Ask a yes/no question; anything but `y` is no
    fn confirm(&mut self, prompt: &str) -> io::Result<bool>;
}

/// Single unbuffered keystrokes from the controlling terminal
pub struct TerminalKeys {
    term: Term,
}

impl TerminalKeys {
    pub fn stdout() -> Self {
        Self {
            term: Term::stdout(),
        }
    }

    fn read_key(&self) -> io::Result<Option<Key>> {
        match self.term.read_key() {
            Ok(key) => Ok(Some(key)),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl KeySource for TerminalKeys {
    fn next_action(&mut self) -> io::Result<Action> {
        let action = match self.read_key()? {
            None => Action::Quit,
            Some(Key::Enter) => Action::Keep,
            Some(Key::Char(c)) => Action::from_char(c),
            Some(_) => Action::Unknown('?'),
        };
        Ok(action)
    }

    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        self.term.write_str(prompt)?;
        let answer = matches!(self.read_key()?, Some(Key::Char('y' | 'Y')));
        self.term.write_line(if answer { "y" } else { "n" })?;
        Ok(answer)
    }
}

/// Line-based input for piped stdin: first character of each line, empty
/// line means Enter, end of input quits.
pub struct LineKeys<R> {
    reader: R,
}

impl<R: BufRead> LineKeys<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

impl<R: BufRead> KeySource for LineKeys<R> {
    fn next_action(&mut self) -> io::Result<Action> {
        let action = match self.read_line()? {
            None => Action::Quit,
            Some(line) => match line.chars().next() {
                None => Action::Keep,
                Some(c) => Action::from_char(c),
            },
        };
        Ok(action)
    }

    fn confirm(&mut self, _prompt: &str) -> io::Result<bool> {
        let answer = self.read_line()?.unwrap_or_default().to_lowercase();
        Ok(answer == "y" || answer == "yes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_action_mapping() {
        assert_eq!(Action::from_char('K'), Action::Keep);
        assert_eq!(Action::from_char('d'), Action::Delete);
        assert_eq!(Action::from_char('\u{3}'), Action::Quit);
        assert_eq!(Action::from_char('x'), Action::Unknown('x'));
    }

    #[test]
    fn test_line_keys() {
        let mut keys = LineKeys::new(Cursor::new("\nkeep\n  d \nyes\nn\n"));
        assert_eq!(keys.next_action().unwrap(), Action::Keep);
        assert_eq!(keys.next_action().unwrap(), Action::Keep);
        assert_eq!(keys.next_action().unwrap(), Action::Delete);
        assert!(keys.confirm("sure? ").unwrap());
        assert!(!keys.confirm("sure? ").unwrap());
        assert_eq!(keys.next_action().unwrap(), Action::Quit);
        assert!(!keys.confirm("sure? ").unwrap());
    }
}
