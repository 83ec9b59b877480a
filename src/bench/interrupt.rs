//! Cooperative interrupt flag for the inference loop
//!
//! The Ctrl-C handler is installed only when the flag is armed, so an
//! interrupt before that point keeps the default behaviour and ends the
//! process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::utils::error::{BenchError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    CtrlC,
    Manual,
}

#[derive(Debug, Clone)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
    source: Source,
}

impl Interrupt {
    /// Flag set by SIGINT once armed
    pub fn ctrlc() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            source: Source::CtrlC,
        }
    }

    /// Flag set only through [`Interrupt::trigger`]
    pub fn manual() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            source: Source::Manual,
        }
    }

    /// Start honoring interrupts
    ///
    /// Installing the Ctrl-C handler twice in one process fails.
    pub fn arm(&self) -> Result<()> {
        if self.source == Source::Manual {
            return Ok(());
        }

        let flag = Arc::clone(&self.flag);
        ctrlc::set_handler(move || {
            warn!("Interrupt received, finishing the current pass");
            flag.store(true, Ordering::SeqCst);
        })
        .map_err(|e| BenchError::Signal(e.to_string()))?;

        debug!("Ctrl-C handler installed");
        Ok(())
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_trigger() {
        let interrupt = Interrupt::manual();
        interrupt.arm().unwrap();
        assert!(!interrupt.is_set());

        interrupt.trigger();
        assert!(interrupt.is_set());
    }

    #[test]
    fn test_clones_share_the_flag() {
        let interrupt = Interrupt::manual();
        let handle = interrupt.clone();

        std::thread::spawn(move || handle.trigger()).join().unwrap();
        assert!(interrupt.is_set());
    }
}
