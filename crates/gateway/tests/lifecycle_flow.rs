//! End-to-end claim lifecycle flows against the in-memory gateway: the happy
//! path from draft to paid, authorization failures, stale-copy conflicts, and
//! batch payment partial failures.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use claimdesk_core::domain::claim::{ClaimId, ClaimStatus};
use claimdesk_core::domain::project::{
    Project, ProjectId, ProjectMember, ProjectRole, ProjectStatus,
};
use claimdesk_core::domain::user::{RoleCode, UserId};
use claimdesk_core::validation::NewClaim;
use claimdesk_core::workflow::rules::{Actor, TransitionError};

use claimdesk_gateway::{
    ClaimLifecycle, ClaimsGateway, GatewayError, InMemoryGateway, LifecycleError,
};

fn project() -> Project {
    let now = Utc::now();
    Project {
        id: ProjectId("P-1".to_string()),
        project_name: "Payments Revamp".to_string(),
        project_code: Some("PAY".to_string()),
        start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        status: ProjectStatus::Active,
        members: vec![
            ProjectMember {
                user_id: UserId("u-claimer".to_string()),
                project_role: ProjectRole::Developer,
            },
            ProjectMember {
                user_id: UserId("u-approver".to_string()),
                project_role: ProjectRole::ProjectManager,
            },
        ],
        created_at: now,
        updated_at: now,
    }
}

fn january_draft() -> NewClaim {
    NewClaim {
        claim_name: "January overtime".to_string(),
        project_id: ProjectId("P-1".to_string()),
        approval_id: UserId("u-approver".to_string()),
        claim_start_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
        claim_end_date: NaiveDate::from_ymd_opt(2025, 1, 12).unwrap(),
        total_work_time: Decimal::new(8, 0),
        remark: Some("weekend release support".to_string()),
    }
}

fn gateway_with_project() -> Arc<InMemoryGateway> {
    let gateway = Arc::new(InMemoryGateway::new());
    gateway.insert_project(project());
    gateway
}

fn claimer(gateway: &Arc<InMemoryGateway>) -> ClaimLifecycle<InMemoryGateway> {
    ClaimLifecycle::new(Arc::clone(gateway), Actor::new("u-claimer", RoleCode::Member))
}

fn approver(gateway: &Arc<InMemoryGateway>) -> ClaimLifecycle<InMemoryGateway> {
    ClaimLifecycle::new(Arc::clone(gateway), Actor::new("u-approver", RoleCode::Approver))
}

fn finance(gateway: &Arc<InMemoryGateway>) -> ClaimLifecycle<InMemoryGateway> {
    ClaimLifecycle::new(Arc::clone(gateway), Actor::new("u-finance", RoleCode::Finance))
}

#[tokio::test]
async fn draft_to_paid_walks_the_full_approval_chain() {
    let gateway = gateway_with_project();

    let claim = claimer(&gateway).create_claim(&january_draft()).await.unwrap();
    assert_eq!(claim.status, ClaimStatus::Draft);

    let claim = claimer(&gateway).send_for_approval(&claim.id).await.unwrap();
    assert_eq!(claim.status, ClaimStatus::PendingApproval);

    let claim = approver(&gateway)
        .approve(&claim.id, Some("hours verified".to_string()))
        .await
        .unwrap();
    assert_eq!(claim.status, ClaimStatus::Approved);

    let claim = finance(&gateway).mark_paid(&claim.id).await.unwrap();
    assert_eq!(claim.status, ClaimStatus::Paid);
    assert_eq!(claim.updated_by, Some(UserId("u-finance".to_string())));

    // One trail entry per transition, in order.
    let statuses: Vec<ClaimStatus> =
        claim.audit_trail.iter().map(|entry| entry.entered_status).collect();
    assert_eq!(
        statuses,
        vec![ClaimStatus::PendingApproval, ClaimStatus::Approved, ClaimStatus::Paid]
    );
    assert_eq!(claim.audit_trail[1].comment.as_deref(), Some("hours verified"));
}

#[tokio::test]
async fn only_the_assigned_approver_may_approve() {
    let gateway = gateway_with_project();
    let claim = claimer(&gateway).create_claim(&january_draft()).await.unwrap();
    claimer(&gateway).send_for_approval(&claim.id).await.unwrap();

    let impostor =
        ClaimLifecycle::new(Arc::clone(&gateway), Actor::new("u-other-pm", RoleCode::Approver));
    let error = impostor.approve(&claim.id, None).await.expect_err("must fail");
    assert!(matches!(
        error,
        LifecycleError::Transition(TransitionError::Unauthorized { .. })
    ));

    // The stored record is untouched.
    let stored = gateway.stored_claim(&claim.id).unwrap();
    assert_eq!(stored.status, ClaimStatus::PendingApproval);
    assert_eq!(stored.audit_trail.len(), 1);
}

#[tokio::test]
async fn paying_twice_is_an_invalid_transition() {
    let gateway = gateway_with_project();
    let claim = claimer(&gateway).create_claim(&january_draft()).await.unwrap();
    claimer(&gateway).send_for_approval(&claim.id).await.unwrap();
    approver(&gateway).approve(&claim.id, None).await.unwrap();
    finance(&gateway).mark_paid(&claim.id).await.unwrap();

    let error = finance(&gateway).mark_paid(&claim.id).await.expect_err("must fail");
    assert!(matches!(
        error,
        LifecycleError::Transition(TransitionError::InvalidTransition {
            from: ClaimStatus::Paid,
            ..
        })
    ));
}

#[tokio::test]
async fn stale_copy_surfaces_the_backend_rejection() {
    let gateway = gateway_with_project();
    let claim = claimer(&gateway).create_claim(&january_draft()).await.unwrap();
    claimer(&gateway).send_for_approval(&claim.id).await.unwrap();

    // Someone else rejects between this approver's fetch and transition call.
    let reject_actor = Actor::new("u-approver", RoleCode::Approver);
    gateway
        .transition_claim(
            &claim.id,
            claimdesk_core::workflow::rules::ClaimAction::Reject,
            &reject_actor,
            None,
        )
        .await
        .unwrap();

    let error = gateway
        .transition_claim(
            &claim.id,
            claimdesk_core::workflow::rules::ClaimAction::Approve,
            &reject_actor,
            None,
        )
        .await
        .expect_err("must fail");
    assert!(matches!(error, GatewayError::Conflict(_)));

    let stored = gateway.stored_claim(&claim.id).unwrap();
    assert_eq!(stored.status, ClaimStatus::Rejected);
}

#[tokio::test]
async fn cancel_is_only_available_from_draft() {
    let gateway = gateway_with_project();
    let claim = claimer(&gateway).create_claim(&january_draft()).await.unwrap();

    claimer(&gateway).send_for_approval(&claim.id).await.unwrap();
    let error = claimer(&gateway).cancel(&claim.id, None).await.expect_err("must fail");
    assert!(matches!(
        error,
        LifecycleError::Transition(TransitionError::InvalidTransition { .. })
    ));

    let fresh = claimer(&gateway).create_claim(&january_draft()).await.unwrap();
    let canceled =
        claimer(&gateway).cancel(&fresh.id, Some("duplicate entry".to_string())).await.unwrap();
    assert_eq!(canceled.status, ClaimStatus::Canceled);
}

#[tokio::test]
async fn batch_payment_isolates_per_claim_failures() {
    let gateway = gateway_with_project();

    let mut ids: Vec<ClaimId> = Vec::new();
    for name in ["Week 1", "Week 2", "Week 3"] {
        let mut draft = january_draft();
        draft.claim_name = name.to_string();
        let claim = claimer(&gateway).create_claim(&draft).await.unwrap();
        claimer(&gateway).send_for_approval(&claim.id).await.unwrap();
        approver(&gateway).approve(&claim.id, None).await.unwrap();
        ids.push(claim.id);
    }
    gateway.inject_transition_failure(&ids[1]);

    let outcome = finance(&gateway).mark_paid_batch(&ids).await;
    assert!(!outcome.is_complete_success());
    assert_eq!(outcome.succeeded, vec![ids[0].clone(), ids[2].clone()]);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].claim_id, ids[1]);
    assert!(outcome.failed[0].reason.contains("injected backend failure"));

    // The failed sibling is untouched and still payable later.
    let stuck = gateway.stored_claim(&ids[1]).unwrap();
    assert_eq!(stuck.status, ClaimStatus::Approved);
}

#[tokio::test]
async fn draft_updates_cannot_break_claim_invariants() {
    let gateway = gateway_with_project();
    let lifecycle = claimer(&gateway);
    let claim = lifecycle.create_claim(&january_draft()).await.unwrap();

    // Zero hours and an end date before the start date, in one edit.
    let fields = claimdesk_core::domain::claim::ClaimUpdate {
        total_work_time: Some(Decimal::ZERO),
        claim_end_date: NaiveDate::from_ymd_opt(2025, 1, 2),
        ..Default::default()
    };
    let error = lifecycle.update_claim(&claim.id, &fields).await.expect_err("must fail");
    assert!(matches!(error, LifecycleError::Validation(_)));

    // The stored record still satisfies the creation constraints.
    let stored = gateway.stored_claim(&claim.id).unwrap();
    assert_eq!(stored.total_work_time, Decimal::new(8, 0));
    assert_eq!(stored.claim_end_date, NaiveDate::from_ymd_opt(2025, 1, 12).unwrap());
}

#[tokio::test]
async fn backend_rejects_invariant_breaking_updates_even_from_a_stale_client() {
    let gateway = gateway_with_project();
    let claim = claimer(&gateway).create_claim(&january_draft()).await.unwrap();

    // Straight to the gateway, bypassing the controller's own checks.
    let fields = claimdesk_core::domain::claim::ClaimUpdate {
        total_work_time: Some(Decimal::ZERO),
        ..Default::default()
    };
    let error = gateway
        .update_claim(&claim.id, &fields, &Actor::new("u-claimer", RoleCode::Member))
        .await
        .expect_err("must fail");
    assert!(matches!(error, GatewayError::Validation(_)));

    let stored = gateway.stored_claim(&claim.id).unwrap();
    assert_eq!(stored.total_work_time, Decimal::new(8, 0));
}

#[tokio::test]
async fn non_member_claimers_are_rejected_by_the_backend() {
    let gateway = gateway_with_project();
    let outsider =
        ClaimLifecycle::new(Arc::clone(&gateway), Actor::new("u-outsider", RoleCode::Member));

    let error = outsider.create_claim(&january_draft()).await.expect_err("must fail");
    assert!(matches!(
        error,
        LifecycleError::Gateway(GatewayError::Conflict(message)) if message.contains("not a member")
    ));
}
