//! Integration tests for the command path, the trigger path and the
//! registry lifecycle.

mod common;

use async_trait::async_trait;
use blep_dispatch::testing::ReplyKind;
use blep_dispatch::{
    trigger_fn, validator_fn, ArgumentError, ArgumentSpec, CommandNode, DispatchError,
    DispatchOutcome, InboundMessage, RegistrationError, RegistryBuilder, ShutdownHook,
    TriggerEntry, Validation,
};
use common::{dispatcher, some, CallLog};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Barrier;

fn tag_tree(log: &CallLog) -> CommandNode {
    CommandNode::builder("tag", log.action())
        .alias("t")
        .argument(ArgumentSpec::required("tagName"))
        .argument(ArgumentSpec::optional("tagArgs").infinite())
        .subcommand(
            CommandNode::builder("create", log.action())
                .argument(ArgumentSpec::required("tagName"))
                .argument(ArgumentSpec::required("content").infinite())
                .build()
                .unwrap(),
        )
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_ping_runs_with_no_arguments() {
    let log = CallLog::new();
    let mut builder = RegistryBuilder::new();
    builder
        .register_command(CommandNode::builder("ping", log.action()).build().unwrap())
        .unwrap();
    let (dispatcher, responder) = dispatcher(builder);

    let outcome = dispatcher
        .dispatch(InboundMessage::direct("c1", "alice", "!ping"))
        .await;

    assert_eq!(
        outcome,
        DispatchOutcome::Executed {
            path: vec!["ping".into()]
        }
    );
    assert_eq!(log.calls(), vec![(vec!["ping".to_string()], vec![])]);
    assert!(responder.errors().is_empty());
}

#[tokio::test]
async fn test_zero_argument_command_rejects_extra_text() {
    let log = CallLog::new();
    let mut builder = RegistryBuilder::new();
    builder
        .register_command(CommandNode::builder("ping", log.action()).build().unwrap())
        .unwrap();
    let (dispatcher, responder) = dispatcher(builder);

    let outcome = dispatcher
        .dispatch(InboundMessage::direct("c1", "alice", "!ping  now please"))
        .await;

    assert_eq!(
        outcome,
        DispatchOutcome::Rejected(DispatchError::InvalidArguments(vec![
            ArgumentError::UnexpectedArguments("now please".into())
        ]))
    );
    assert!(log.calls().is_empty());
    assert_eq!(
        responder.errors(),
        vec!["Unexpected arguments: `now please`"]
    );
}

#[tokio::test]
async fn test_subcommand_binds_infinite_content() {
    let log = CallLog::new();
    let mut builder = RegistryBuilder::new();
    builder.register_command(tag_tree(&log)).unwrap();
    let (dispatcher, _responder) = dispatcher(builder);

    let message = InboundMessage::group("g1", "c1", "alice", "!tag create foo bar baz");
    let outcome = dispatcher.dispatch(message).await;

    let path = vec!["tag".to_string(), "create".to_string()];
    assert_eq!(outcome, DispatchOutcome::Executed { path: path.clone() });
    assert_eq!(log.calls(), vec![(path, some(&["foo", "bar baz"]))]);
}

#[tokio::test]
async fn test_alias_resolves_to_same_tree() {
    let log = CallLog::new();
    let mut builder = RegistryBuilder::new();
    builder.register_command(tag_tree(&log)).unwrap();
    let (dispatcher, _responder) = dispatcher(builder);

    dispatcher
        .dispatch(InboundMessage::group("g1", "c1", "alice", "!t hello"))
        .await;

    let args = vec![Some("hello".to_string()), None];
    assert_eq!(log.calls(), vec![(vec!["tag".to_string()], args)]);
}

#[tokio::test]
async fn test_missing_required_argument_blocks_action() {
    let log = CallLog::new();
    let mut builder = RegistryBuilder::new();
    builder.register_command(tag_tree(&log)).unwrap();
    let (dispatcher, responder) = dispatcher(builder);

    let message = InboundMessage::group("g1", "c1", "alice", "!tag create foo");
    let outcome = dispatcher.dispatch(message).await;

    assert_eq!(
        outcome,
        DispatchOutcome::Rejected(DispatchError::InvalidArguments(vec![
            ArgumentError::RequiredArgumentMissing("content".into())
        ]))
    );
    assert!(log.calls().is_empty());
    assert_eq!(
        responder.errors(),
        vec!["Required argument `content` was empty."]
    );
}

#[tokio::test]
async fn test_unknown_command_skips_trigger_scan() {
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    let mut builder = RegistryBuilder::new();
    builder
        .register_trigger(
            TriggerEntry::from_pattern(
                "bogus",
                trigger_fn(move |_| {
                    let counter = Arc::clone(&counter);
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                }),
            )
            .unwrap(),
        )
        .unwrap();
    let (dispatcher, responder) = dispatcher(builder);

    let outcome = dispatcher
        .dispatch(InboundMessage::direct("c1", "alice", "!bogus"))
        .await;

    assert_eq!(
        outcome,
        DispatchOutcome::Rejected(DispatchError::UnrecognizedCommand("bogus".into()))
    );
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert_eq!(responder.errors(), vec!["Unrecognized command `bogus`."]);
}

#[tokio::test]
async fn test_group_only_command_in_direct_message() {
    let log = CallLog::new();
    let mut builder = RegistryBuilder::new();
    builder
        .register_command(
            CommandNode::builder("tag", log.action())
                .argument(ArgumentSpec::required("tagName"))
                .group_only()
                .build()
                .unwrap(),
        )
        .unwrap();
    let (dispatcher, responder) = dispatcher(builder);

    let outcome = dispatcher
        .dispatch(InboundMessage::direct("dm", "alice", "!tag foo"))
        .await;

    assert_eq!(
        outcome,
        DispatchOutcome::Rejected(DispatchError::ContextRestricted)
    );
    assert!(log.calls().is_empty());
    assert_eq!(
        responder.errors(),
        vec!["This command can only be executed in a group."]
    );
}

#[tokio::test]
async fn test_two_matching_triggers_both_fire() {
    let mut builder = RegistryBuilder::new();
    builder
        .register_trigger(
            TriggerEntry::from_pattern(
                "dead",
                trigger_fn(|ctx| async move {
                    ctx.say("one").await;
                    Ok(())
                }),
            )
            .unwrap(),
        )
        .unwrap();
    builder
        .register_trigger(
            TriggerEntry::from_pattern(
                "^dead",
                trigger_fn(|ctx| async move {
                    ctx.say("two").await;
                    Ok(())
                }),
            )
            .unwrap(),
        )
        .unwrap();
    let (dispatcher, responder) = dispatcher(builder);

    let outcome = dispatcher
        .dispatch(InboundMessage::group("g1", "c1", "bob", "deader"))
        .await;

    assert_eq!(outcome, DispatchOutcome::Triggered { fired: 2 });
    let mut said = responder.said();
    said.sort();
    assert_eq!(said, vec!["one", "two"]);
}

#[tokio::test]
async fn test_failing_trigger_does_not_suppress_sibling() {
    let mut builder = RegistryBuilder::new();
    builder
        .register_trigger(
            TriggerEntry::from_pattern("x", trigger_fn(|_| async { anyhow::bail!("nope") }))
                .unwrap(),
        )
        .unwrap();
    builder
        .register_trigger(
            TriggerEntry::from_pattern(
                "x+",
                trigger_fn(|_| async { panic!("trigger blew up") }),
            )
            .unwrap(),
        )
        .unwrap();
    builder
        .register_trigger(
            TriggerEntry::from_pattern(
                "^x",
                trigger_fn(|ctx| async move {
                    ctx.say("still here").await;
                    Ok(())
                }),
            )
            .unwrap(),
        )
        .unwrap();
    let (dispatcher, responder) = dispatcher(builder);

    let outcome = dispatcher
        .dispatch(InboundMessage::direct("c1", "bob", "xx"))
        .await;

    assert_eq!(outcome, DispatchOutcome::Triggered { fired: 3 });
    assert_eq!(responder.said(), vec!["still here"]);
}

#[tokio::test]
async fn test_scoped_trigger_ignores_other_channels() {
    let mut builder = RegistryBuilder::new();
    builder
        .register_trigger(
            TriggerEntry::from_pattern(
                "dead",
                trigger_fn(|ctx| async move {
                    ctx.say("fired").await;
                    Ok(())
                }),
            )
            .unwrap()
            .scoped_to(["A"]),
        )
        .unwrap();
    let (dispatcher, responder) = dispatcher(builder);

    let outcome = dispatcher
        .dispatch(InboundMessage::group("g1", "B", "bob", "dead"))
        .await;
    assert_eq!(outcome, DispatchOutcome::Triggered { fired: 0 });

    let outcome = dispatcher
        .dispatch(InboundMessage::group("g1", "A", "bob", "dead"))
        .await;
    assert_eq!(outcome, DispatchOutcome::Triggered { fired: 1 });
    assert_eq!(responder.replies().len(), 1);
    assert_eq!(responder.replies()[0].kind, ReplyKind::Say);
    assert_eq!(responder.replies()[0].channel_id, "A");
}

#[tokio::test]
async fn test_duplicate_registration_leaves_registry_unchanged() {
    let log = CallLog::new();
    let mut builder = RegistryBuilder::new();
    builder.register_command(tag_tree(&log)).unwrap();

    let err = builder
        .register_command(CommandNode::builder("tag", log.action()).build().unwrap())
        .unwrap_err();
    assert_eq!(err, RegistrationError::DuplicateCommandName("tag".into()));

    // Only the alias collides; the fresh name must not be inserted either.
    let err = builder
        .register_command(
            CommandNode::builder("tags", log.action())
                .alias("t")
                .build()
                .unwrap(),
        )
        .unwrap_err();
    assert_eq!(err, RegistrationError::DuplicateCommandName("t".into()));

    let err = builder
        .register_trigger(
            TriggerEntry::from_pattern("dead", trigger_fn(|_| async { Ok(()) })).unwrap(),
        )
        .and_then(|()| {
            builder.register_trigger(
                TriggerEntry::from_pattern("dead", trigger_fn(|_| async { Ok(()) })).unwrap(),
            )
        })
        .unwrap_err();
    assert_eq!(
        err,
        RegistrationError::DuplicateTriggerPattern("dead".into())
    );

    let registry = builder.freeze();
    assert!(registry.lookup("tags").is_none());
    assert_eq!(registry.lookup("t").map(|n| n.name()), Some("tag"));
    assert_eq!(registry.unique_nodes().len(), 1);
    assert_eq!(registry.triggers().len(), 1);
}

#[tokio::test]
async fn test_validators_run_concurrently_and_report_in_order() {
    let barrier = Arc::new(Barrier::new(2));
    let slow_barrier = Arc::clone(&barrier);
    let fast_barrier = Arc::clone(&barrier);

    let log = CallLog::new();
    let mut builder = RegistryBuilder::new();
    builder
        .register_command(
            CommandNode::builder("pair", log.action())
                .argument(ArgumentSpec::required("first").validate_with(validator_fn(
                    move |_, _| {
                        let barrier = Arc::clone(&slow_barrier);
                        async move {
                            barrier.wait().await;
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            Validation::reject("first is wrong")
                        }
                    },
                )))
                .argument(ArgumentSpec::required("second").validate_with(validator_fn(
                    move |_, _| {
                        let barrier = Arc::clone(&fast_barrier);
                        async move {
                            barrier.wait().await;
                            Validation::reject("second is wrong")
                        }
                    },
                )))
                .build()
                .unwrap(),
        )
        .unwrap();
    let (dispatcher, responder) = dispatcher(builder);

    // Sequential validators would deadlock on the barrier.
    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        dispatcher.dispatch(InboundMessage::direct("c1", "alice", "!pair a b")),
    )
    .await
    .expect("validators did not run concurrently");

    match outcome {
        DispatchOutcome::Rejected(DispatchError::InvalidArguments(errors)) => {
            assert_eq!(errors.len(), 2);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(log.calls().is_empty());
    assert_eq!(responder.errors(), vec!["first is wrong\nsecond is wrong"]);
}

#[tokio::test]
async fn test_every_position_is_checked() {
    let log = CallLog::new();
    let mut builder = RegistryBuilder::new();
    builder
        .register_command(
            CommandNode::builder("set", log.action())
                .argument(ArgumentSpec::required("key").validate_with(validator_fn(
                    |_, value| async move {
                        if value.len() > 3 {
                            Validation::reject("Key too long.")
                        } else {
                            Validation::accept()
                        }
                    },
                )))
                .argument(ArgumentSpec::required("value"))
                .build()
                .unwrap(),
        )
        .unwrap();
    let (dispatcher, _responder) = dispatcher(builder);

    let message = InboundMessage::direct("c1", "alice", "!set toolong v extra");
    let outcome = dispatcher.dispatch(message).await;

    assert_eq!(
        outcome,
        DispatchOutcome::Rejected(DispatchError::InvalidArguments(vec![
            ArgumentError::ValidationFailed {
                name: "key".into(),
                message: "Key too long.".into(),
            },
            ArgumentError::UnexpectedArguments("extra".into()),
        ]))
    );
}

#[tokio::test]
async fn test_optional_argument_skips_validator_when_absent() {
    let log = CallLog::new();
    let mut builder = RegistryBuilder::new();
    builder
        .register_command(
            CommandNode::builder("timefor", log.action())
                .argument(
                    ArgumentSpec::optional("user")
                        .validate_with(validator_fn(|_, _| async { Validation::reject("no") })),
                )
                .build()
                .unwrap(),
        )
        .unwrap();
    let (dispatcher, _responder) = dispatcher(builder);

    let outcome = dispatcher
        .dispatch(InboundMessage::direct("c1", "alice", "!timefor"))
        .await;

    assert!(matches!(outcome, DispatchOutcome::Executed { .. }));
    assert_eq!(log.calls(), vec![(vec!["timefor".to_string()], vec![None])]);
}

struct CountingHook(Arc<AtomicUsize>);

#[async_trait]
impl ShutdownHook for CountingHook {
    async fn shutdown(&self) -> anyhow::Result<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn test_shutdown_runs_once_per_node() {
    let count = Arc::new(AtomicUsize::new(0));
    let log = CallLog::new();
    let mut builder = RegistryBuilder::new();
    builder
        .register_command(
            CommandNode::builder("tag", log.action())
                .alias("t")
                .alias("tags")
                .on_shutdown(Arc::new(CountingHook(Arc::clone(&count))))
                .subcommand(
                    CommandNode::builder("create", log.action())
                        .on_shutdown(Arc::new(CountingHook(Arc::clone(&count))))
                        .build()
                        .unwrap(),
                )
                .build()
                .unwrap(),
        )
        .unwrap();
    let registry = builder.freeze();

    assert_eq!(registry.shutdown().await, 2);
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_spawned_dispatches_are_independent() {
    let log = CallLog::new();
    let mut builder = RegistryBuilder::new();
    builder
        .register_command(
            CommandNode::builder("echo", log.action())
                .argument(ArgumentSpec::required("text").infinite())
                .build()
                .unwrap(),
        )
        .unwrap();
    let (dispatcher, _responder) = dispatcher(builder);

    let handles: Vec<_> = (0..16)
        .map(|i| InboundMessage::direct("c1", "alice", format!("!echo {i}")))
        .map(|message| dispatcher.spawn(message))
        .collect();
    for handle in handles {
        assert!(matches!(
            handle.await.unwrap(),
            DispatchOutcome::Executed { .. }
        ));
    }

    assert_eq!(log.calls().len(), 16);
    assert_eq!(dispatcher.command_stats(), vec![("echo".to_string(), 16)]);
}
