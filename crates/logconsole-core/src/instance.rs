use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::ConsoleError;
use crate::console::{Console, ConsoleOptions};

/// Set while a [`ConsoleInstance`] is alive
static ACTIVE: AtomicBool = AtomicBool::new(false);

/// The process-wide console
///
/// At most one exists at a time; the slot is released on drop.
#[derive(Debug)]
pub struct ConsoleInstance {
    console: Console,
}

impl ConsoleInstance {
    /// Claim the process-wide console, failing if one is already alive
    pub fn acquire(options: ConsoleOptions) -> Result<Self, ConsoleError> {
        if ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ConsoleError::AlreadyActive);
        }

        match Console::new(options) {
            Ok(console) => Ok(Self { console }),
            Err(e) => {
                ACTIVE.store(false, Ordering::Release);
                Err(e)
            }
        }
    }

    /// Check whether an instance is currently alive
    pub fn is_active() -> bool {
        ACTIVE.load(Ordering::Acquire)
    }
}

impl Deref for ConsoleInstance {
    type Target = Console;

    fn deref(&self) -> &Console {
        &self.console
    }
}

impl DerefMut for ConsoleInstance {
    fn deref_mut(&mut self) -> &mut Console {
        &mut self.console
    }
}

impl Drop for ConsoleInstance {
    fn drop(&mut self) {
        ACTIVE.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logconsole_types::Severity;

    // The only test touching the global slot, so it cannot race with others.
    #[test]
    fn test_single_instance() {
        let bad = ConsoleInstance::acquire(ConsoleOptions {
            pattern: "(".to_string(),
            ..Default::default()
        });
        assert!(matches!(bad, Err(ConsoleError::InvalidFilterPattern { .. })));
        assert!(!ConsoleInstance::is_active());

        let mut first = ConsoleInstance::acquire(ConsoleOptions::default()).unwrap();
        first.ingest("hello", "", Severity::Info);
        assert_eq!(first.shown_len(), 1);

        let second = ConsoleInstance::acquire(ConsoleOptions::default());
        assert!(matches!(second, Err(ConsoleError::AlreadyActive)));

        drop(first);
        assert!(!ConsoleInstance::is_active());
        assert!(ConsoleInstance::acquire(ConsoleOptions::default()).is_ok());
    }
}
