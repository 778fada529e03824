//! Command and trigger registry.
//!
//! Registration happens once, at startup, through [`RegistryBuilder`]. The
//! builder is frozen into an immutable [`Registry`] before the first message
//! is dispatched, so dispatch never observes a partially registered tree.

use crate::command::CommandNode;
use crate::error::RegistrationError;
use crate::trigger::TriggerEntry;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Mutable registration phase.
#[derive(Default)]
pub struct RegistryBuilder {
    commands: HashMap<String, Arc<CommandNode>>,
    triggers: Vec<TriggerEntry>,
}

impl RegistryBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a top-level command under its name and all its aliases.
    ///
    /// Every name is checked before anything is inserted: on error the
    /// builder is left exactly as it was.
    pub fn register_command(
        &mut self,
        node: CommandNode,
    ) -> Result<Arc<CommandNode>, RegistrationError> {
        let mut names: Vec<String> = Vec::with_capacity(1 + node.aliases().len());
        for name in std::iter::once(node.name()).chain(node.aliases().iter().map(String::as_str)) {
            if self.commands.contains_key(name) || names.iter().any(|n| n == name) {
                return Err(RegistrationError::DuplicateCommandName(name.to_string()));
            }
            names.push(name.to_string());
        }

        let node = Arc::new(node);
        for name in names {
            self.commands.insert(name, Arc::clone(&node));
        }
        debug!(command = %node.name(), aliases = ?node.aliases(), "Registered command");
        Ok(node)
    }

    /// Register a trigger. Triggers are keyed by their pattern source text.
    pub fn register_trigger(&mut self, trigger: TriggerEntry) -> Result<(), RegistrationError> {
        if self.triggers.iter().any(|t| t.key() == trigger.key()) {
            return Err(RegistrationError::DuplicateTriggerPattern(
                trigger.key().to_string(),
            ));
        }
        debug!(pattern = %trigger.key(), "Registered trigger");
        self.triggers.push(trigger);
        Ok(())
    }

    /// End the registration phase.
    pub fn freeze(self) -> Arc<Registry> {
        let command_counts = self
            .commands
            .values()
            .map(|node| (node.name().to_string(), Arc::new(AtomicU64::new(0))))
            .collect();
        info!(
            names = self.commands.len(),
            triggers = self.triggers.len(),
            "Command registry frozen"
        );
        Arc::new(Registry {
            commands: self.commands,
            triggers: self.triggers,
            command_counts,
        })
    }
}

/// The frozen command and trigger tables.
pub struct Registry {
    commands: HashMap<String, Arc<CommandNode>>,
    triggers: Vec<TriggerEntry>,
    /// Invocation counters, keyed by canonical command name.
    command_counts: HashMap<String, Arc<AtomicU64>>,
}

impl Registry {
    /// Look up a top-level command by exact name or alias.
    pub fn lookup(&self, name: &str) -> Option<&Arc<CommandNode>> {
        self.commands.get(name)
    }

    /// Distinct top-level commands, sorted by canonical name.
    pub fn unique_nodes(&self) -> Vec<Arc<CommandNode>> {
        let mut seen = HashSet::new();
        let mut nodes: Vec<_> = self
            .commands
            .values()
            .filter(|node| seen.insert(node_id(node)))
            .cloned()
            .collect();
        nodes.sort_by(|a, b| a.name().cmp(b.name()));
        nodes
    }

    /// Registered triggers, in registration order.
    pub fn triggers(&self) -> &[TriggerEntry] {
        &self.triggers
    }

    /// Count one invocation of the top-level command `name`.
    pub fn record_invocation(&self, name: &str) {
        if let Some(counter) = self.command_counts.get(name) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Usage statistics for commands invoked at least once, busiest first.
    pub fn command_stats(&self) -> Vec<(String, u64)> {
        let mut stats: Vec<_> = self
            .command_counts
            .iter()
            .map(|(name, count)| (name.clone(), count.load(Ordering::Relaxed)))
            .filter(|(_, count)| *count > 0)
            .collect();

        stats.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        stats
    }

    /// Run every shutdown hook exactly once, subcommands included.
    ///
    /// Hook failures are logged and do not stop the remaining hooks.
    /// Returns the number of hooks run.
    pub async fn shutdown(&self) -> usize {
        let mut visited = HashSet::new();
        let mut stack = self.unique_nodes();
        let mut ran = 0;

        while let Some(node) = stack.pop() {
            if !visited.insert(node_id(&node)) {
                continue;
            }
            stack.extend(node.subcommands().iter().cloned());

            let Some(hook) = node.shutdown_hook() else {
                continue;
            };
            ran += 1;
            if let Err(e) = hook.shutdown().await {
                warn!(command = %node.name(), error = %e, "Shutdown hook failed");
            }
        }

        info!(hooks = ran, "Command registry shut down");
        ran
    }
}

/// Node identity. Aliases share one allocation.
fn node_id(node: &Arc<CommandNode>) -> usize {
    Arc::as_ptr(node) as usize
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .field("triggers", &self.triggers.len())
            .finish()
    }
}
