//! `tag` - per-group text snippets.
//!
//! `tag <name>` prints a tag; `create`, `owner`, `edit` and `delete`
//! manage them. Editing and deleting are restricted to the tag's owner.

use crate::store::{Tag, TagStore};
use anyhow::Context as _;
use async_trait::async_trait;
use blep_dispatch::{
    ArgumentSpec, ArgumentValidator, CommandAction, CommandNode, Invocation, RegistrationError,
    Validation,
};
use std::collections::HashSet;
use std::sync::Arc;

const SUBCOMMANDS: [&str; 4] = ["create", "owner", "edit", "delete"];
const TAG_EXISTS: &str = "This tag already exists.";

/// The group a tag invocation belongs to. The command is group-only, so
/// this only fails if the registration is changed.
fn group_id(invocation: &Invocation) -> anyhow::Result<&str> {
    invocation
        .message()
        .context
        .group_id()
        .context("tag command invoked outside a group")
}

/// First bound argument, which every tag command declares as required.
fn tag_name(args: &[Option<String>]) -> anyhow::Result<&str> {
    args.first()
        .and_then(Option::as_deref)
        .context("tag name was not bound")
}

// --- validators -------------------------------------------------------------

/// The tag must exist in the invoking group.
pub struct TagExists {
    store: Arc<TagStore>,
}

#[async_trait]
impl ArgumentValidator for TagExists {
    async fn validate(&self, invocation: &Invocation, value: &str) -> Validation {
        match invocation.message().context.group_id() {
            Some(group) if self.store.contains(group, value) => Validation::accept(),
            _ => Validation::reject("No such tag."),
        }
    }
}

/// The name must be free and not shadow `help` or a subcommand.
pub struct NewTagName {
    store: Arc<TagStore>,
    reserved: HashSet<&'static str>,
}

#[async_trait]
impl ArgumentValidator for NewTagName {
    async fn validate(&self, invocation: &Invocation, value: &str) -> Validation {
        let exists = invocation
            .message()
            .context
            .group_id()
            .is_some_and(|group| self.store.contains(group, value));
        if exists {
            Validation::reject(TAG_EXISTS)
        } else if self.reserved.contains(value) {
            Validation::reject("You cannot make a tag with this name as the name is reserved.")
        } else {
            Validation::accept()
        }
    }
}

/// The tag must exist and belong to the caller.
pub struct CanEditTag {
    store: Arc<TagStore>,
}

#[async_trait]
impl ArgumentValidator for CanEditTag {
    async fn validate(&self, invocation: &Invocation, value: &str) -> Validation {
        let message = invocation.message();
        let Some(tag) = message
            .context
            .group_id()
            .and_then(|group| self.store.get(group, value))
        else {
            return Validation::reject("No such tag.");
        };
        if tag.owner_id != message.author_id {
            return Validation::reject("You are not the owner of this tag.");
        }
        Validation::accept()
    }
}

// --- actions ----------------------------------------------------------------

pub struct ShowTagHandler {
    store: Arc<TagStore>,
}

#[async_trait]
impl CommandAction for ShowTagHandler {
    async fn execute(
        &self,
        invocation: &Invocation,
        args: &[Option<String>],
    ) -> anyhow::Result<()> {
        // TODO: substitute the extra arguments into the content once tags support placeholders.
        let name = tag_name(args)?;
        match self.store.get(group_id(invocation)?, name) {
            Some(tag) => invocation.say(&tag.content).await,
            None => invocation.error("No such tag.").await,
        }
        Ok(())
    }
}

pub struct CreateTagHandler {
    store: Arc<TagStore>,
}

#[async_trait]
impl CommandAction for CreateTagHandler {
    async fn execute(
        &self,
        invocation: &Invocation,
        args: &[Option<String>],
    ) -> anyhow::Result<()> {
        let name = tag_name(args)?;
        let content = args
            .get(1)
            .cloned()
            .flatten()
            .context("tag content was not bound")?;
        let tag = Tag {
            name: name.to_string(),
            owner_id: invocation.message().author_id.clone(),
            content,
        };
        // The name validator ran before this task; a concurrent create may
        // have claimed the name since.
        if self.store.insert_new(group_id(invocation)?, tag) {
            invocation.success(&format!("Created tag `{name}`.")).await;
        } else {
            invocation.error(TAG_EXISTS).await;
        }
        Ok(())
    }
}

pub struct TagOwnerHandler {
    store: Arc<TagStore>,
}

#[async_trait]
impl CommandAction for TagOwnerHandler {
    async fn execute(
        &self,
        invocation: &Invocation,
        args: &[Option<String>],
    ) -> anyhow::Result<()> {
        let name = tag_name(args)?;
        match self.store.get(group_id(invocation)?, name) {
            Some(tag) => {
                invocation
                    .say(&format!("Tag `{name}` is owned by `{}`", tag.owner_id))
                    .await
            }
            None => {
                invocation
                    .error(&format!("The tag `{name}` does not exist."))
                    .await
            }
        }
        Ok(())
    }
}

pub struct EditTagHandler {
    store: Arc<TagStore>,
}

#[async_trait]
impl CommandAction for EditTagHandler {
    async fn execute(
        &self,
        invocation: &Invocation,
        args: &[Option<String>],
    ) -> anyhow::Result<()> {
        let name = tag_name(args)?;
        let content = args
            .get(1)
            .cloned()
            .flatten()
            .context("new tag content was not bound")?;
        let group = group_id(invocation)?;
        if self.store.update_content(group, name, content) {
            invocation
                .success(&format!("Successfully edited tag `{name}`."))
                .await;
        } else {
            invocation.error("No such tag.").await;
        }
        Ok(())
    }
}

pub struct DeleteTagHandler {
    store: Arc<TagStore>,
}

#[async_trait]
impl CommandAction for DeleteTagHandler {
    async fn execute(
        &self,
        invocation: &Invocation,
        args: &[Option<String>],
    ) -> anyhow::Result<()> {
        let name = tag_name(args)?;
        if self.store.remove(group_id(invocation)?, name).is_some() {
            invocation
                .success(&format!("Successfully deleted tag `{name}`."))
                .await;
        } else {
            invocation.error("No such tag.").await;
        }
        Ok(())
    }
}

pub fn command(store: Arc<TagStore>) -> Result<CommandNode, RegistrationError> {
    let exists = Arc::new(TagExists {
        store: Arc::clone(&store),
    });
    let can_edit = Arc::new(CanEditTag {
        store: Arc::clone(&store),
    });
    let new_name = Arc::new(NewTagName {
        store: Arc::clone(&store),
        reserved: std::iter::once("help").chain(SUBCOMMANDS).collect(),
    });

    let create = CommandNode::builder(
        "create",
        Arc::new(CreateTagHandler {
            store: Arc::clone(&store),
        }),
    )
    .usage("tag create [tag-name] [content]")
    .description("Creates a new tag named `[tag-name]` containing `[content]`.")
    .argument(ArgumentSpec::required("tagName").validate_with(new_name))
    .argument(ArgumentSpec::required("content").infinite())
    .build()?;

    let owner = CommandNode::builder(
        "owner",
        Arc::new(TagOwnerHandler {
            store: Arc::clone(&store),
        }),
    )
    .usage("tag owner [tag-name]")
    .description("Displays the owner of [tag-name].")
    .argument(ArgumentSpec::required("tagName").validate_with(exists.clone()))
    .build()?;

    let edit = CommandNode::builder(
        "edit",
        Arc::new(EditTagHandler {
            store: Arc::clone(&store),
        }),
    )
    .usage("tag edit [tag-name] [new-content]")
    .description("If you are the owner of [tag-name], replaces its contents with [new-content].")
    .argument(ArgumentSpec::required("tagName").validate_with(can_edit.clone()))
    .argument(ArgumentSpec::required("newContent").infinite())
    .build()?;

    let delete = CommandNode::builder(
        "delete",
        Arc::new(DeleteTagHandler {
            store: Arc::clone(&store),
        }),
    )
    .usage("tag delete [tag-name]")
    .description("Deletes [tag-name] if you are its owner.")
    .argument(ArgumentSpec::required("tagName").validate_with(can_edit))
    .build()?;

    CommandNode::builder(
        "tag",
        Arc::new(ShowTagHandler {
            store: Arc::clone(&store),
        }),
    )
    .alias("t")
    .usage("tag [tag-name]")
    .description("Retrieves the tag [tag-name].")
    .argument(ArgumentSpec::required("tagName").validate_with(exists))
    .argument(ArgumentSpec::optional("tagArgs").infinite())
    .subcommand(create)
    .subcommand(owner)
    .subcommand(edit)
    .subcommand(delete)
    .group_only()
    .on_shutdown(store)
    .build()
}
