//! Persistent server directory.

use crate::storage::JsonStore;
use spindle_core::{BoxError, EventContext, EventPayload, EventType, Hook, HookDescriptor};

/// Records every server seen at readiness in `<root>/worker/servers.json`,
/// keyed by id.
pub struct ServerDirectoryHook {
    store: JsonStore,
}

impl ServerDirectoryHook {
    /// Document parent directory under the storage root.
    pub const PARENT: &'static str = "worker";
    /// Document file name.
    pub const NAME: &'static str = "servers.json";

    /// Create a hook writing into `store`.
    pub fn new(store: JsonStore) -> Self {
        Self { store }
    }

    /// Descriptor for the ready round.
    pub fn descriptor() -> HookDescriptor {
        HookDescriptor::event("server_directory", EventType::Ready)
    }
}

impl Hook for ServerDirectoryHook {
    fn call(&self, ctx: &mut EventContext) -> Result<(), BoxError> {
        let EventPayload::Ready { servers } = ctx.payload() else {
            return Ok(());
        };
        let mut directory = self.store.map(Self::PARENT, Self::NAME)?;
        directory.update(|entries| {
            for server in servers {
                entries.insert(server.id.clone(), server.name.clone().into());
            }
        })?;
        tracing::debug!(
            servers = servers.len(),
            path = %directory.path().display(),
            "server directory updated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use spindle_core::{HookEntry, InvocationScope, Server};
    use std::sync::Arc;

    #[test]
    fn test_ready_round_persists_servers() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        store
            .map(ServerDirectoryHook::PARENT, ServerDirectoryHook::NAME)
            .unwrap()
            .insert("0", "old")
            .unwrap();

        let hook = Arc::new(HookEntry::new(
            ServerDirectoryHook::descriptor(),
            ServerDirectoryHook::new(store.clone()),
        ));
        let mut ctx = InvocationScope::default().context(
            Arc::clone(&hook),
            EventPayload::Ready {
                servers: vec![Server::new("1", "home"), Server::new("2", "away")],
            },
        );
        hook.hook().call(&mut ctx).unwrap();

        let directory = store
            .map(ServerDirectoryHook::PARENT, ServerDirectoryHook::NAME)
            .unwrap();
        assert_eq!(directory.get("0"), Some(&json!("old")));
        assert_eq!(directory.get("1"), Some(&json!("home")));
        assert_eq!(directory.get("2"), Some(&json!("away")));
    }
}
