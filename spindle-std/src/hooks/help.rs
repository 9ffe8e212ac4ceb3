//! Command listing.

use spindle_core::{BoxError, EventContext, Hook, HookDescriptor};
use std::collections::BTreeMap;

/// Replies with the list of commands, or with one command's documentation.
///
/// The documentation is snapshotted when the registry is built.
pub struct HelpHook {
    docs: BTreeMap<String, Option<String>>,
}

impl HelpHook {
    /// Descriptor for a help command called `name`.
    pub fn descriptor(name: &str) -> HookDescriptor {
        HookDescriptor::command(name)
            .threaded(false)
            .doc(format!("List commands, or `{name} <command>` for details."))
    }

    /// Build the hook from the descriptors of every command it should know.
    pub fn from_descriptors<'a, I>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = &'a HookDescriptor>,
    {
        let mut docs = BTreeMap::new();
        for desc in descriptors {
            for name in desc.command_names() {
                docs.insert(name.clone(), desc.documentation().map(str::to_string));
            }
        }
        Self { docs }
    }

    /// Text the hook replies with for `query`.
    pub fn render(&self, query: &str) -> String {
        let query = query.trim();
        if query.is_empty() {
            let names: Vec<&str> = self.docs.keys().map(String::as_str).collect();
            return format!("Commands: {}", names.join(", "));
        }
        match self.docs.get(query) {
            Some(Some(doc)) => format!("{query}: {doc}"),
            Some(None) => format!("{query}: no documentation"),
            None => format!("Unknown command `{query}`"),
        }
    }
}

impl Hook for HelpHook {
    fn call(&self, ctx: &mut EventContext) -> Result<(), BoxError> {
        let text = self.render(ctx.text());
        ctx.reply(&text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn help() -> HelpHook {
        let ping = HookDescriptor::command("ping").alias("p").doc("replies pong");
        let roll = HookDescriptor::command("roll");
        HelpHook::from_descriptors([&ping, &roll, &HelpHook::descriptor("help")])
    }

    #[test]
    fn test_lists_commands_sorted() {
        assert_eq!(help().render(""), "Commands: help, p, ping, roll");
    }

    #[test]
    fn test_single_command() {
        let help = help();
        assert_eq!(help.render(" p "), "p: replies pong");
        assert_eq!(help.render("roll"), "roll: no documentation");
        assert_eq!(help.render("nope"), "Unknown command `nope`");
    }
}
