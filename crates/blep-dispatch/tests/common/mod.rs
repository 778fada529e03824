//! Shared fixtures for dispatcher integration tests.

#![allow(dead_code)]

use blep_dispatch::testing::RecordingResponder;
use blep_dispatch::{action_fn, BoundArgs, CommandAction, Dispatcher, Prefix, RegistryBuilder};
use parking_lot::Mutex;
use std::sync::Arc;

/// Records every action invocation as `(path, args)`.
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<(Vec<String>, BoundArgs)>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// An action that appends its invocation to this log.
    pub fn action(&self) -> Arc<dyn CommandAction> {
        let calls = Arc::clone(&self.calls);
        action_fn(move |invocation, args| {
            let calls = Arc::clone(&calls);
            async move {
                calls.lock().push((invocation.path().to_vec(), args));
                Ok(())
            }
        })
    }

    pub fn calls(&self) -> Vec<(Vec<String>, BoundArgs)> {
        self.calls.lock().clone()
    }
}

/// Freeze `builder` behind a `!` prefix and a recording responder.
pub fn dispatcher(builder: RegistryBuilder) -> (Dispatcher, Arc<RecordingResponder>) {
    let responder = Arc::new(RecordingResponder::new());
    let dispatcher = Dispatcher::new(
        builder.freeze(),
        Prefix::new("!").expect("valid prefix"),
        responder.clone(),
    );
    (dispatcher, responder)
}

pub fn some(values: &[&str]) -> BoundArgs {
    values.iter().map(|v| Some(v.to_string())).collect()
}
