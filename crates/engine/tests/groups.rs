use engine::{Engine, EngineError, NewExpense, NewParticipant, ParticipantStatus, ShareValue, SplitMode};
use migration::MigratorTrait;
use sea_orm::Database;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    engine
        .new_user("alice", "password", "alice@test.com", Some("Alice"))
        .await
        .unwrap();
    engine
}

fn invitee(name: &str, email: &str) -> NewParticipant {
    NewParticipant {
        name: name.to_string(),
        email: email.to_string(),
        color: None,
        avatar: None,
    }
}

fn expense(amount: f64, payer: uuid::Uuid, mode: SplitMode, shares: Vec<ShareValue>) -> NewExpense {
    NewExpense {
        description: "test".to_string(),
        category: None,
        amount,
        date: "2026-02-05T12:00:00Z".parse().unwrap(),
        payer_id: payer,
        split_mode: mode,
        shares,
    }
}

#[tokio::test]
async fn new_group_creates_linked_primary_participant() {
    let engine = engine_with_db().await;

    let group_id = engine.new_group("Trip", "alice", vec![]).await.unwrap();

    let summary = engine.group_summary(&group_id, "alice").await.unwrap();
    assert_eq!(summary.group.owner_id, "alice");
    assert_eq!(summary.participants.len(), 1);

    let primary = &summary.participants[0];
    assert_eq!(primary.name, "Alice");
    assert_eq!(primary.email, "alice@test.com");
    assert_eq!(primary.status, ParticipantStatus::Active);
    assert_eq!(primary.user_id.as_deref(), Some("alice"));
}

#[tokio::test]
async fn primary_name_falls_back_to_email_local_part() {
    let engine = engine_with_db().await;
    engine
        .new_user("john", "password", "john.doe@test.com", None)
        .await
        .unwrap();

    let group_id = engine.new_group("Solo", "john", vec![]).await.unwrap();
    let summary = engine.group_summary(&group_id, "john").await.unwrap();
    assert_eq!(summary.participants[0].name, "john doe");
}

#[tokio::test]
async fn inviting_unknown_email_creates_pending_participant_with_token() {
    let engine = engine_with_db().await;
    let group_id = engine.new_group("Trip", "alice", vec![]).await.unwrap();

    let (participant, token) = engine
        .add_participant(&group_id, "alice", invitee("Bob", "bob@test.com"))
        .await
        .unwrap();

    assert_eq!(participant.status, ParticipantStatus::Pending);
    assert!(participant.user_id.is_none());
    assert!(token.is_some());
}

#[tokio::test]
async fn inviting_known_email_links_immediately() {
    let engine = engine_with_db().await;
    engine
        .new_user("bob", "password", "bob@test.com", Some("Bob"))
        .await
        .unwrap();
    let group_id = engine.new_group("Trip", "alice", vec![]).await.unwrap();

    let (participant, token) = engine
        .add_participant(&group_id, "alice", invitee("Bob", "Bob@Test.com"))
        .await
        .unwrap();

    assert_eq!(participant.status, ParticipantStatus::Active);
    assert_eq!(participant.user_id.as_deref(), Some("bob"));
    assert!(token.is_none());
}

#[tokio::test]
async fn registering_claims_pending_invites() {
    let engine = engine_with_db().await;
    let group_id = engine.new_group("Trip", "alice", vec![]).await.unwrap();
    engine
        .add_participant(&group_id, "alice", invitee("Bob", "bob@test.com"))
        .await
        .unwrap();

    engine
        .new_user("bob", "password", "bob@test.com", Some("Bobby"))
        .await
        .unwrap();

    let summary = engine.group_summary(&group_id, "bob").await.unwrap();
    let bob = summary
        .participants
        .iter()
        .find(|p| p.email == "bob@test.com")
        .unwrap();
    assert_eq!(bob.status, ParticipantStatus::Active);
    assert_eq!(bob.user_id.as_deref(), Some("bob"));
    assert_eq!(bob.name, "Bobby");
}

#[tokio::test]
async fn accept_invite_checks_email_and_is_idempotent() {
    let engine = engine_with_db().await;
    let group_id = engine.new_group("Trip", "alice", vec![]).await.unwrap();
    let (_, token) = engine
        .add_participant(&group_id, "alice", invitee("Eve", "eve@test.com"))
        .await
        .unwrap();
    let token = token.unwrap();

    // An account with a different email may not claim the invite.
    engine
        .new_user("mallory", "password", "mallory@test.com", None)
        .await
        .unwrap();
    let err = engine.accept_invite(&token, "mallory").await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    // Registration with the invited email claims it; accepting again just
    // returns the group.
    engine
        .new_user("eve", "password", "eve@test.com", None)
        .await
        .unwrap();
    let accepted_group = engine.accept_invite(&token, "eve").await.unwrap();
    assert_eq!(accepted_group, group_id);
}

#[tokio::test]
async fn unknown_invite_token_is_not_found() {
    let engine = engine_with_db().await;
    let err = engine.accept_invite("nope", "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn rename_is_owner_only() {
    let engine = engine_with_db().await;
    engine
        .new_user("bob", "password", "bob@test.com", None)
        .await
        .unwrap();
    let group_id = engine
        .new_group("Trip", "alice", vec![invitee("Bob", "bob@test.com")])
        .await
        .unwrap();

    let err = engine
        .rename_group(&group_id, "Bob's now", "bob")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let renamed = engine
        .rename_group(&group_id, "Summer Trip", "alice")
        .await
        .unwrap();
    assert_eq!(renamed.name, "Summer Trip");
}

#[tokio::test]
async fn group_capacity_is_limited() {
    let engine = engine_with_db().await;
    let group_id = engine
        .new_group(
            "Trip",
            "alice",
            vec![
                invitee("B", "b@test.com"),
                invitee("C", "c@test.com"),
                invitee("D", "d@test.com"),
            ],
        )
        .await
        .unwrap();

    let err = engine
        .add_participant(&group_id, "alice", invitee("E", "e@test.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::GroupFull(_)));
}

#[tokio::test]
async fn duplicate_email_in_group_conflicts() {
    let engine = engine_with_db().await;
    let group_id = engine.new_group("Trip", "alice", vec![]).await.unwrap();
    engine
        .add_participant(&group_id, "alice", invitee("Bob", "bob@test.com"))
        .await
        .unwrap();

    let err = engine
        .add_participant(&group_id, "alice", invitee("Bobby", "bob@test.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn groups_for_user_spans_owned_and_shared() {
    let engine = engine_with_db().await;
    engine
        .new_user("bob", "password", "bob@test.com", None)
        .await
        .unwrap();

    let own = engine.new_group("Alice's", "alice", vec![]).await.unwrap();
    let shared = engine
        .new_group("Bob's", "bob", vec![invitee("Alice", "alice@test.com")])
        .await
        .unwrap();

    let groups = engine.groups_for_user("alice").await.unwrap();
    let ids: Vec<_> = groups.iter().map(|g| g.id.clone()).collect();
    assert!(ids.contains(&own));
    assert!(ids.contains(&shared));

    let bobs = engine.groups_for_user("bob").await.unwrap();
    assert_eq!(bobs.len(), 1);
}

#[tokio::test]
async fn non_member_cannot_read_group() {
    let engine = engine_with_db().await;
    engine
        .new_user("bob", "password", "bob@test.com", None)
        .await
        .unwrap();
    let group_id = engine.new_group("Private", "alice", vec![]).await.unwrap();

    let err = engine.group_summary(&group_id, "bob").await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn all_groups_summary_unions_accessible_scopes() {
    let engine = engine_with_db().await;
    engine
        .new_user("bob", "password", "bob@test.com", None)
        .await
        .unwrap();

    let first = engine.new_group("First", "alice", vec![]).await.unwrap();
    let second = engine
        .new_group("Second", "bob", vec![invitee("Alice", "alice@test.com")])
        .await
        .unwrap();

    let first_summary = engine.group_summary(&first, "alice").await.unwrap();
    let alice_in_first = first_summary.participants[0].id;
    engine
        .add_expense(
            &first,
            "alice",
            expense(30.0, alice_in_first, SplitMode::Equal, vec![]),
        )
        .await
        .unwrap();

    let second_summary = engine.group_summary(&second, "bob").await.unwrap();
    let bob_in_second = second_summary
        .participants
        .iter()
        .find(|p| p.email == "bob@test.com")
        .unwrap()
        .id;
    engine
        .add_expense(
            &second,
            "bob",
            expense(20.0, bob_in_second, SplitMode::Equal, vec![]),
        )
        .await
        .unwrap();

    let all = engine.group_summary("all", "alice").await.unwrap();
    assert_eq!(all.group.id, "all");
    assert_eq!(all.expenses.len(), 2);
    assert_eq!(all.total_spent.cents(), 50_00);
    // Alice has two participant records (one per group), Bob one.
    assert_eq!(all.participants.len(), 3);

    // Bob only sees his own group in the union.
    let bobs = engine.group_summary("all", "bob").await.unwrap();
    assert_eq!(bobs.expenses.len(), 1);
}

#[tokio::test]
async fn delete_group_cascades_to_everything() {
    let engine = engine_with_db().await;
    let group_id = engine
        .new_group("Trip", "alice", vec![invitee("Bob", "bob@test.com")])
        .await
        .unwrap();

    let summary = engine.group_summary(&group_id, "alice").await.unwrap();
    let payer = summary.participants[0].id;
    engine
        .add_expense(&group_id, "alice", expense(60.0, payer, SplitMode::Equal, vec![]))
        .await
        .unwrap();

    engine.delete_group(&group_id, "alice").await.unwrap();

    let err = engine.group_summary(&group_id, "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    assert!(engine.groups_for_user("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn remove_participant_refused_while_balance_is_open() {
    let engine = engine_with_db().await;
    engine
        .new_user("bob", "password", "bob@test.com", None)
        .await
        .unwrap();
    let group_id = engine
        .new_group("Trip", "alice", vec![invitee("Bob", "bob@test.com")])
        .await
        .unwrap();

    let summary = engine.group_summary(&group_id, "alice").await.unwrap();
    let alice_id = summary
        .participants
        .iter()
        .find(|p| p.email == "alice@test.com")
        .unwrap()
        .id;
    let bob_id = summary
        .participants
        .iter()
        .find(|p| p.email == "bob@test.com")
        .unwrap()
        .id;

    engine
        .add_expense(
            &group_id,
            "alice",
            expense(100.0, alice_id, SplitMode::Equal, vec![]),
        )
        .await
        .unwrap();

    let err = engine
        .remove_participant(&bob_id.to_string(), "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::UnsettledBalance(_)));
}

#[tokio::test]
async fn remove_participant_drops_their_expenses() {
    let engine = engine_with_db().await;
    engine
        .new_user("bob", "password", "bob@test.com", None)
        .await
        .unwrap();
    let group_id = engine
        .new_group("Trip", "alice", vec![invitee("Bob", "bob@test.com")])
        .await
        .unwrap();

    let summary = engine.group_summary(&group_id, "alice").await.unwrap();
    let alice_id = summary
        .participants
        .iter()
        .find(|p| p.email == "alice@test.com")
        .unwrap()
        .id;
    let bob_id = summary
        .participants
        .iter()
        .find(|p| p.email == "bob@test.com")
        .unwrap()
        .id;

    // Two mirrored expenses leave both nets at zero while still involving Bob.
    engine
        .add_expense(
            &group_id,
            "alice",
            expense(
                40.0,
                alice_id,
                SplitMode::Custom,
                vec![ShareValue {
                    participant_id: bob_id,
                    value: 40.0,
                }],
            ),
        )
        .await
        .unwrap();
    engine
        .add_expense(
            &group_id,
            "bob",
            expense(
                40.0,
                bob_id,
                SplitMode::Custom,
                vec![ShareValue {
                    participant_id: alice_id,
                    value: 40.0,
                }],
            ),
        )
        .await
        .unwrap();

    engine
        .remove_participant(&bob_id.to_string(), "alice")
        .await
        .unwrap();

    let summary = engine.group_summary(&group_id, "alice").await.unwrap();
    assert_eq!(summary.participants.len(), 1);
    assert!(summary.expenses.is_empty());
    assert!(summary.balances.iter().all(|b| b.net.is_zero()));
}
