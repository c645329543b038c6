//! Property-based tests for LifecycleService.

use chrono::{DateTime, Utc};
use docflow_shared::types::UserId;
use proptest::prelude::*;
use uuid::Uuid;

use crate::context::OperationContext;
use crate::document::DocumentStatus;
use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::service::LifecycleService;
use crate::lifecycle::types::LifecycleAction;

fn arb_status() -> impl Strategy<Value = DocumentStatus> {
    prop_oneof![
        Just(DocumentStatus::Draft),
        Just(DocumentStatus::PendingReview),
        Just(DocumentStatus::Approved),
        Just(DocumentStatus::Rejected),
        Just(DocumentStatus::Completed),
    ]
}

fn arb_ctx() -> impl Strategy<Value = OperationContext> {
    (any::<u128>(), 0i64..4_000_000_000i64).prop_map(|(id, secs)| {
        let now = DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or_default();
        OperationContext::at(UserId::from_uuid(Uuid::from_u128(id)), now)
    })
}

/// Requests that do not need a full document.
#[derive(Debug, Clone, Copy)]
enum Request {
    Submit,
    Approve,
    Reject,
    Complete,
}

fn arb_request() -> impl Strategy<Value = Request> {
    prop_oneof![
        Just(Request::Submit),
        Just(Request::Approve),
        Just(Request::Reject),
        Just(Request::Complete),
    ]
}

/// Status-only submit; the document guards are covered by unit tests.
fn submit_status(
    status: DocumentStatus,
    ctx: &OperationContext,
) -> Result<LifecycleAction, LifecycleError> {
    match status {
        DocumentStatus::Draft => Ok(LifecycleAction::Submit {
            new_status: DocumentStatus::PendingReview,
            submitted_by: ctx.actor,
            submitted_at: ctx.now,
        }),
        from => Err(LifecycleError::IllegalTransition {
            from,
            to: DocumentStatus::PendingReview,
        }),
    }
}

fn run(
    request: Request,
    status: DocumentStatus,
    ctx: &OperationContext,
) -> Result<LifecycleAction, LifecycleError> {
    match request {
        Request::Submit => submit_status(status, ctx),
        Request::Approve => LifecycleService::approve(status, None, ctx),
        Request::Reject => LifecycleService::reject(status, "not acceptable", ctx),
        Request::Complete => LifecycleService::complete(status, ctx),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every status change the service produces is in the transition table.
    #[test]
    fn prop_actions_follow_transition_table(
        status in arb_status(),
        request in arb_request(),
        ctx in arb_ctx(),
    ) {
        if let Ok(action) = run(request, status, &ctx) {
            if action.changes_status() {
                prop_assert!(LifecycleService::is_valid_transition(status, action.new_status()));
            } else {
                prop_assert_eq!(action.new_status(), status);
            }
        }
    }

    /// Approve, reject and complete succeed exactly where the table allows it.
    #[test]
    fn prop_table_decides_outcome(status in arb_status(), ctx in arb_ctx()) {
        for (target, result) in [
            (DocumentStatus::Approved, LifecycleService::approve(status, None, &ctx)),
            (DocumentStatus::Rejected, LifecycleService::reject(status, "not acceptable", &ctx)),
            (DocumentStatus::Completed, LifecycleService::complete(status, &ctx)),
        ] {
            let allowed = LifecycleService::is_valid_transition(status, target);
            let retried_approval = target == DocumentStatus::Approved && status == target;
            match result {
                Ok(action) => prop_assert!(allowed || (retried_approval && !action.changes_status())),
                Err(LifecycleError::IllegalTransition { from, to }) => {
                    prop_assert!(!allowed);
                    prop_assert_eq!((from, to), (status, target));
                }
                Err(other) => prop_assert!(false, "unexpected error {:?}", other),
            }
        }
    }

    /// Terminal statuses accept no transition at all.
    #[test]
    fn prop_terminal_statuses_are_final(
        status in prop_oneof![Just(DocumentStatus::Rejected), Just(DocumentStatus::Completed)],
        request in arb_request(),
        ctx in arb_ctx(),
    ) {
        let result = run(request, status, &ctx);
        let is_illegal = matches!(result, Err(LifecycleError::IllegalTransition { .. }));
        prop_assert!(is_illegal);
    }

    /// Any sequence of requests starting from draft walks one of the two allowed paths.
    #[test]
    fn prop_reachable_paths(
        requests in prop::collection::vec(arb_request(), 0..12),
        ctx in arb_ctx(),
    ) {
        let mut status = DocumentStatus::Draft;
        let mut path = vec![status];
        for request in requests {
            if let Ok(action) = run(request, status, &ctx) {
                if action.changes_status() {
                    status = action.new_status();
                    path.push(status);
                }
            }
        }

        let approved_path = [
            DocumentStatus::Draft,
            DocumentStatus::PendingReview,
            DocumentStatus::Approved,
            DocumentStatus::Completed,
        ];
        let rejected_path = [
            DocumentStatus::Draft,
            DocumentStatus::PendingReview,
            DocumentStatus::Rejected,
        ];
        prop_assert!(approved_path.starts_with(&path) || rejected_path.starts_with(&path));
    }

    /// Approve records the acting user and time.
    #[test]
    fn prop_approve_records_actor(ctx in arb_ctx(), notes in proptest::option::of("[a-z ]{0,20}")) {
        let action = LifecycleService::approve(DocumentStatus::PendingReview, notes.clone(), &ctx).unwrap();
        match action {
            LifecycleAction::Approve { approved_by, approved_at, approval_notes, .. } => {
                prop_assert_eq!(approved_by, ctx.actor);
                prop_assert_eq!(approved_at, ctx.now);
                prop_assert_eq!(approval_notes, notes.unwrap_or_default());
            }
            other => prop_assert!(false, "expected Approve, got {:?}", other),
        }
    }
}
