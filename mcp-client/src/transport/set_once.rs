// mcp-client/src/transport/set_once.rs
use tokio::sync::watch;

/// Returned by [`SetOnce::set`] when a value is already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AlreadySet;

/// A value that is written at most once and awaited by any number of readers.
pub(crate) struct SetOnce<T> {
    tx: watch::Sender<Option<T>>,
}

impl<T: Clone> SetOnce<T> {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// Store `value` and wake every waiter. The first write wins.
    pub(crate) fn set(&self, value: T) -> Result<(), AlreadySet> {
        let mut value = Some(value);
        let stored = self.tx.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = value.take();
            true
        });

        if stored {
            Ok(())
        } else {
            Err(AlreadySet)
        }
    }

    pub(crate) fn get(&self) -> Option<T> {
        self.tx.borrow().clone()
    }

    /// Suspend until a value is stored, then return a copy of it.
    pub(crate) async fn wait(&self) -> T {
        let mut rx = self.tx.subscribe();
        loop {
            if let Some(value) = rx.borrow_and_update().clone() {
                return value;
            }
            if rx.changed().await.is_err() {
                // The sender lives in `self`, so it cannot be dropped while we wait.
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn waiters_resume_once_set() {
        let cell = Arc::new(SetOnce::<u32>::new());

        let waiter = tokio::spawn({
            let cell = cell.clone();
            async move { cell.wait().await }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        cell.set(7).unwrap();
        assert_eq!(waiter.await.unwrap(), 7);
        assert_eq!(cell.wait().await, 7);
    }

    #[test]
    fn first_write_wins() {
        let cell = SetOnce::new();
        assert_eq!(cell.get(), None);
        assert_eq!(cell.set("first"), Ok(()));
        assert_eq!(cell.set("second"), Err(AlreadySet));
        assert_eq!(cell.get(), Some("first"));
    }
}
