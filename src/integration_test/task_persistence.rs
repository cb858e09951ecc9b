use super::test_util::{insert_user, prepare_db_and_test};
use crate::domain::task::driven_ports::{TaskReader, TaskWriter};
use crate::domain::task::test_util::details_with_priority;
use crate::domain::task::{Priority, TaskToSave};
use crate::domain::user::TodoUser;
use crate::domain::user::driven_ports::UserReader;
use crate::persistence::ExternalConnectivity;
use crate::persistence::db_task_driven_ports::{DbTaskReader, DbTaskWriter};
use crate::persistence::db_user_driven_ports::DbUserReader;
use speculoos::prelude::*;

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn finds_users_by_username() {
    prepare_db_and_test(|db| async move {
        let alice_id = insert_user(&db, "alice").await;
        let mut ext_cxn = ExternalConnectivity::new(db);

        let alice = DbUserReader.user_by_username("alice", &mut ext_cxn).await;
        assert_that!(alice).is_ok().is_some().is_equal_to(TodoUser {
            id: alice_id,
            username: "alice".to_owned(),
        });

        let nobody = DbUserReader.user_by_username("mallory", &mut ext_cxn).await;
        assert_that!(nobody).is_ok().is_none();
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn saved_task_reads_back_unchanged() {
    prepare_db_and_test(|db| async move {
        let alice_id = insert_user(&db, "alice").await;
        let mut ext_cxn = ExternalConnectivity::new(db);
        let details = details_with_priority("Renew passport", Priority::Medium);

        let created = DbTaskWriter
            .save_task(
                &TaskToSave::New {
                    owner_user_id: alice_id,
                    details: details.clone(),
                },
                &mut ext_cxn,
            )
            .await
            .expect("insert should succeed");
        assert_eq!(alice_id, created.owner_user_id);
        assert_eq!(details, created.details);

        let fetched = DbTaskReader.task_by_id(created.id, &mut ext_cxn).await;
        assert_that!(fetched).is_ok().is_some().is_equal_to(created);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn lists_only_owned_tasks_by_priority_then_creation() {
    prepare_db_and_test(|db| async move {
        let alice_id = insert_user(&db, "alice").await;
        let bob_id = insert_user(&db, "bob").await;
        let mut ext_cxn = ExternalConnectivity::new(db);

        let to_create = [
            (alice_id, "Low first", Priority::Low),
            (alice_id, "High first", Priority::High),
            (bob_id, "Bob's task", Priority::High),
            (alice_id, "Medium", Priority::Medium),
            (alice_id, "High second", Priority::High),
        ];
        for (owner_user_id, title, priority) in to_create {
            DbTaskWriter
                .save_task(
                    &TaskToSave::New {
                        owner_user_id,
                        details: details_with_priority(title, priority),
                    },
                    &mut ext_cxn,
                )
                .await
                .expect("insert should succeed");
        }

        let alice_tasks = DbTaskReader
            .tasks_for_owner(alice_id, &mut ext_cxn)
            .await
            .expect("listing should succeed");
        let titles: Vec<&str> = alice_tasks
            .iter()
            .map(|task| task.details.title.as_str())
            .collect();
        assert_eq!(
            vec!["High first", "High second", "Medium", "Low first"],
            titles
        );
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn update_keeps_id_and_owner() {
    prepare_db_and_test(|db| async move {
        let alice_id = insert_user(&db, "alice").await;
        let mut ext_cxn = ExternalConnectivity::new(db);

        let created = DbTaskWriter
            .save_task(
                &TaskToSave::New {
                    owner_user_id: alice_id,
                    details: details_with_priority("Draft", Priority::Low),
                },
                &mut ext_cxn,
            )
            .await
            .expect("insert should succeed");
        let new_details = details_with_priority("Final", Priority::High);

        let updated = DbTaskWriter
            .save_task(
                &TaskToSave::Existing(created.clone().with_details(new_details.clone())),
                &mut ext_cxn,
            )
            .await
            .expect("update should succeed");
        assert_eq!(created.id, updated.id);
        assert_eq!(alice_id, updated.owner_user_id);
        assert_eq!(new_details, updated.details);

        let alice_tasks = DbTaskReader
            .tasks_for_owner(alice_id, &mut ext_cxn)
            .await
            .expect("listing should succeed");
        assert_that!(alice_tasks).has_length(1);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn delete_removes_only_that_task() {
    prepare_db_and_test(|db| async move {
        let alice_id = insert_user(&db, "alice").await;
        let mut ext_cxn = ExternalConnectivity::new(db);

        let mut created_ids = Vec::new();
        for title in ["Keep", "Remove"] {
            let created = DbTaskWriter
                .save_task(
                    &TaskToSave::New {
                        owner_user_id: alice_id,
                        details: details_with_priority(title, Priority::Medium),
                    },
                    &mut ext_cxn,
                )
                .await
                .expect("insert should succeed");
            created_ids.push(created.id);
        }

        DbTaskWriter
            .delete_task(created_ids[1], &mut ext_cxn)
            .await
            .expect("delete should succeed");
        // Deleting something that's already gone is not an error
        DbTaskWriter
            .delete_task(created_ids[1], &mut ext_cxn)
            .await
            .expect("repeat delete should succeed");

        let removed = DbTaskReader.task_by_id(created_ids[1], &mut ext_cxn).await;
        assert_that!(removed).is_ok().is_none();
        let kept = DbTaskReader.task_by_id(created_ids[0], &mut ext_cxn).await;
        assert_that!(kept).is_ok().is_some();
    });
}
