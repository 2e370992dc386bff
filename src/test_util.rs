#[cfg(test)]
pub(crate) fn with_temp_home<F, R>(func: F) -> R
where
    F: FnOnce(&std::path::Path) -> R,
{
    static HOME_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
    let _guard = HOME_MUTEX.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let dir = tempfile::tempdir().expect("tempdir");
    let old_home = std::env::var("HOME").ok();
    // SAFETY: HOME is only mutated while HOME_MUTEX is held.
    unsafe { std::env::set_var("HOME", dir.path()) };
    let result = func(dir.path());
    match old_home {
        Some(old) => unsafe { std::env::set_var("HOME", old) },
        None => unsafe { std::env::remove_var("HOME") },
    }
    result
}

#[cfg(test)]
pub(crate) use recording::RecordingProvider;

#[cfg(test)]
mod recording {
    use anyhow::anyhow;
    use std::sync::{Arc, Mutex};

    use crate::providers::{Message, Provider, ProviderFuture, ProviderResponse};

    #[derive(Debug, Clone)]
    pub(crate) struct RecordedCall {
        pub(crate) key: String,
        pub(crate) messages: Vec<Message>,
    }

    /// Provider double that records every completed call.
    #[derive(Debug, Clone)]
    pub(crate) struct RecordingProvider {
        key: String,
        messages: Vec<Message>,
        outcome: Result<String, String>,
        calls: Arc<Mutex<Vec<RecordedCall>>>,
    }

    impl RecordingProvider {
        pub(crate) fn replying(text: &str) -> Self {
            Self::with_outcome(Ok(text.to_string()))
        }

        pub(crate) fn failing(message: &str) -> Self {
            Self::with_outcome(Err(message.to_string()))
        }

        fn with_outcome(outcome: Result<String, String>) -> Self {
            Self {
                key: String::new(),
                messages: Vec::new(),
                outcome,
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub(crate) fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    impl Provider for RecordingProvider {
        fn with_key(mut self, key: String) -> Self {
            self.key = key;
            self
        }

        fn append_system_input(mut self, input: String) -> Self {
            self.messages.push(Message::system(input));
            self
        }

        fn append_user_input(mut self, input: String) -> Self {
            self.messages.push(Message::user(input));
            self
        }

        fn complete(self) -> ProviderFuture {
            self.calls.lock().expect("calls lock").push(RecordedCall {
                key: self.key.clone(),
                messages: self.messages.clone(),
            });
            let outcome = self.outcome.clone();
            Box::pin(async move {
                outcome
                    .map(|text| ProviderResponse {
                        text,
                        model: Some("test".to_string()),
                        usage: None,
                    })
                    .map_err(|message| anyhow!(message))
            })
        }
    }
}
