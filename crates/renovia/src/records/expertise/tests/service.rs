use std::collections::BTreeMap;

use axum::http::StatusCode;

use crate::accounts::tests::common::{caller, context, seed_user};
use crate::accounts::Role;
use crate::records::expertise::{ExpertiseDraft, GlobalCondition, RoomRatings};
use crate::records::{Beneficiary, RecordStatus};

fn draft(name: &str) -> ExpertiseDraft {
    ExpertiseDraft {
        beneficiary: Beneficiary {
            name: name.to_string(),
            city: Some("Rennes".to_string()),
            ..Beneficiary::default()
        },
        ..ExpertiseDraft::default()
    }
}

fn rated(name: &str, rooms: &[(&str, [Option<u8>; 4])]) -> ExpertiseDraft {
    let mut draft = draft(name);
    draft.evaluations.rooms = rooms
        .iter()
        .map(|(room, [windows, heating, humidity, ventilation])| {
            (
                room.to_string(),
                RoomRatings {
                    windows: *windows,
                    heating: *heating,
                    humidity: *humidity,
                    ventilation: *ventilation,
                },
            )
        })
        .collect::<BTreeMap<_, _>>();
    draft
}

#[tokio::test]
async fn create_derives_score_and_condition() {
    let ctx = context();
    let agent = caller(&seed_user(&ctx, "agent@renovia.fr", Role::User).await);

    let created = ctx
        .expertises
        .create(
            &agent,
            rated(
                "M. Leroy",
                &[
                    ("salon", [Some(4), Some(5), Some(4), Some(5)]),
                    ("cuisine", [Some(5), Some(4), None, Some(4)]),
                ],
            ),
        )
        .await
        .expect("created");

    let global = &created.content.evaluations.global;
    let score = global.score.expect("score derived");
    assert!((score - 31.0 / 7.0).abs() < 1e-9);
    assert_eq!(global.condition, Some(GlobalCondition::Favorable));
    assert_eq!(created.created_by, agent.id);
    assert_eq!(created.content.status, RecordStatus::InProgress);
}

#[tokio::test]
async fn unrated_expertise_keeps_global_evaluation_empty() {
    let ctx = context();
    let agent = caller(&seed_user(&ctx, "agent@renovia.fr", Role::User).await);

    let created = ctx
        .expertises
        .create(&agent, draft("Mme Roux"))
        .await
        .expect("created");
    assert_eq!(created.content.evaluations.global.score, None);
    assert_eq!(created.content.evaluations.global.condition, None);
}

#[tokio::test]
async fn invalid_drafts_are_rejected() {
    let ctx = context();
    let agent = caller(&seed_user(&ctx, "agent@renovia.fr", Role::User).await);

    let err = ctx
        .expertises
        .create(&agent, draft("  "))
        .await
        .expect_err("missing beneficiary");
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    let err = ctx
        .expertises
        .create(
            &agent,
            rated("M. Blanc", &[("chambre", [Some(6), None, None, None])]),
        )
        .await
        .expect_err("rating out of range");
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    let mut overscored = draft("Mme Vasseur");
    overscored.evaluations.global.score = Some(42.0);
    let err = ctx
        .expertises
        .create(&agent, overscored)
        .await
        .expect_err("score above the scale");
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert!(ctx.expertises.list(&agent).await.expect("list").is_empty());
}

#[tokio::test]
async fn agents_only_see_their_own_records() {
    let ctx = context();
    let first = caller(&seed_user(&ctx, "first@renovia.fr", Role::User).await);
    let second = caller(&seed_user(&ctx, "second@renovia.fr", Role::User).await);
    let admin = caller(&seed_user(&ctx, "admin@renovia.fr", Role::Admin).await);

    let mine = ctx
        .expertises
        .create(&first, draft("Famille Morel"))
        .await
        .expect("created");
    ctx.expertises
        .create(&second, draft("Famille Lambert"))
        .await
        .expect("created");

    let listed = ctx.expertises.list(&first).await.expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, mine.id);
    assert_eq!(ctx.expertises.list(&admin).await.expect("list").len(), 2);

    let err = ctx
        .expertises
        .get(&second, &mine.id)
        .await
        .expect_err("not the owner");
    assert_eq!(err.status(), StatusCode::FORBIDDEN);
    ctx.expertises
        .get(&admin, &mine.id)
        .await
        .expect("admin reads everything");
}

#[tokio::test]
async fn update_replaces_content_but_keeps_ownership() {
    let ctx = context();
    let agent = caller(&seed_user(&ctx, "agent@renovia.fr", Role::User).await);
    let admin = caller(&seed_user(&ctx, "admin@renovia.fr", Role::Admin).await);
    let created = ctx
        .expertises
        .create(&agent, draft("M. Fabre"))
        .await
        .expect("created");

    let mut revised = rated("M. Fabre", &[("séjour", [Some(1), Some(2), Some(2), Some(1)])]);
    revised.status = RecordStatus::Completed;
    let updated = ctx
        .expertises
        .update(&admin, &created.id, revised)
        .await
        .expect("updated");

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_by, agent.id);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.content.status, RecordStatus::Completed);
    assert_eq!(
        updated.content.evaluations.global.condition,
        Some(GlobalCondition::Critique)
    );

    let stored = ctx
        .expertises
        .get(&agent, &created.id)
        .await
        .expect("stored");
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn delete_checks_ownership_then_removes() {
    let ctx = context();
    let owner = caller(&seed_user(&ctx, "owner@renovia.fr", Role::User).await);
    let other = caller(&seed_user(&ctx, "other@renovia.fr", Role::User).await);
    let created = ctx
        .expertises
        .create(&owner, draft("Mme Caron"))
        .await
        .expect("created");

    let err = ctx
        .expertises
        .delete(&other, &created.id)
        .await
        .expect_err("forbidden");
    assert_eq!(err.status(), StatusCode::FORBIDDEN);

    ctx.expertises
        .delete(&owner, &created.id)
        .await
        .expect("deleted");
    let err = ctx
        .expertises
        .get(&owner, &created.id)
        .await
        .expect_err("gone");
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}
