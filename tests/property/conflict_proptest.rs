//! Property-based tests for conflict resolution

use chrono::Utc;
use proptest::prelude::*;
use taskboard::shared::conflict::{ConflictReport, FieldChoices, FieldSource, Resolution, TaskField};
use taskboard::shared::task::{Task, TaskFields, TaskPriority, TaskStatus};
use uuid::Uuid;

fn status() -> impl Strategy<Value = TaskStatus> {
    prop::sample::select(TaskStatus::ALL.to_vec())
}

fn priority() -> impl Strategy<Value = TaskPriority> {
    prop::sample::select(TaskPriority::ALL.to_vec())
}

fn task_fields() -> impl Strategy<Value = TaskFields> {
    (
        "[A-Za-z ]{1,30}",
        prop::option::of("[a-z ]{0,40}"),
        status(),
        priority(),
        any::<bool>(),
    )
        .prop_map(|(title, description, status, priority, assigned)| TaskFields {
            title,
            description,
            status,
            priority,
            assigned_user_id: assigned.then(Uuid::new_v4),
        })
}

fn source() -> impl Strategy<Value = FieldSource> {
    prop_oneof![Just(FieldSource::Mine), Just(FieldSource::Server)]
}

fn report(fields: TaskFields, version: i64) -> ConflictReport {
    let now = Utc::now();
    ConflictReport::new(Task {
        id: Uuid::new_v4(),
        title: fields.title,
        description: fields.description,
        status: fields.status,
        priority: fields.priority,
        assigned_user_id: fields.assigned_user_id,
        created_by: Uuid::new_v4(),
        created_at: now,
        updated_at: now,
        version,
    })
}

proptest! {
    #[test]
    fn test_every_resolution_uses_reported_version(
        mine in task_fields(),
        server in task_fields(),
        version in 1i64..10_000,
    ) {
        let report = report(server, version);
        for resolution in [Resolution::AcceptServer, Resolution::AcceptMine, Resolution::Merge(FieldChoices::default())] {
            prop_assert_eq!(resolution.resolve(&mine, &report).version, version);
        }
    }

    #[test]
    fn test_merge_takes_each_field_from_its_source(
        mine in task_fields(),
        server in task_fields(),
        sources in prop::collection::vec(source(), 5),
    ) {
        let choices = TaskField::ALL
            .into_iter()
            .zip(sources.iter().copied())
            .fold(FieldChoices::default(), |choices, (field, source)| choices.with(field, source));
        let merged = Resolution::Merge(choices.clone()).merged_fields(&mine, &server);

        let pick = |field| if choices.source(field) == FieldSource::Server { &server } else { &mine };
        prop_assert_eq!(&merged.title, &pick(TaskField::Title).title);
        prop_assert_eq!(&merged.description, &pick(TaskField::Description).description);
        prop_assert_eq!(merged.status, pick(TaskField::Status).status);
        prop_assert_eq!(merged.priority, pick(TaskField::Priority).priority);
        prop_assert_eq!(merged.assigned_user_id, pick(TaskField::Assignee).assigned_user_id);
    }

    #[test]
    fn test_uniform_merges_match_whole_side(mine in task_fields(), server in task_fields()) {
        prop_assert_eq!(
            Resolution::Merge(FieldChoices::all(FieldSource::Mine)).merged_fields(&mine, &server),
            Resolution::AcceptMine.merged_fields(&mine, &server)
        );
        prop_assert_eq!(
            Resolution::Merge(FieldChoices::all(FieldSource::Server)).merged_fields(&mine, &server),
            Resolution::AcceptServer.merged_fields(&mine, &server)
        );
    }
}
