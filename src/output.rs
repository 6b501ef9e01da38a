//! Destination for `print` statements.
//!
//! - `Stdout`: one line per `print` on standard output (default)
//! - `Buffer`: lines are captured in a shared string, for tests and embedding
//!
//! Enum dispatch keeps the hot `print` path free of trait objects.

use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Default)]
pub enum Output {
    #[default]
    Stdout,
    Buffer(Rc<RefCell<String>>),
}

impl Output {
    /// A fresh capturing output.  Clones share the same buffer.
    pub fn buffered() -> Self {
        Output::Buffer(Rc::new(RefCell::new(String::new())))
    }

    pub fn println(&self, line: &str) {
        match self {
            Output::Stdout => println!("{line}"),
            Output::Buffer(buf) => {
                let mut buf = buf.borrow_mut();
                buf.push_str(line);
                buf.push('\n');
            }
        }
    }

    /// Everything captured so far; always empty for `Stdout`.
    pub fn captured(&self) -> String {
        match self {
            Output::Stdout => String::new(),
            Output::Buffer(buf) => buf.borrow().clone(),
        }
    }

    /// Captured output split into lines.
    pub fn lines(&self) -> Vec<String> {
        self.captured().lines().map(str::to_string).collect()
    }
}
