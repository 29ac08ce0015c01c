use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::order::{CartSubmission, KitchenStage, Order, OrderStatus, SubmittedLine, Transition};

fn placed_order() -> Order {
    let submission = CartSubmission {
        session_id: "s-1".to_string(),
        table_id: None,
        table_name: None,
        customer_id: None,
        customer_name: None,
        note: None,
        lines: vec![SubmittedLine {
            product_id: "p-1".to_string(),
            name: "Filter Coffee".to_string(),
            quantity: 1,
            unit_price: Decimal::new(6000, 2),
            discount_percent: Decimal::ZERO,
            tax_percent: Decimal::new(5, 0),
            note: String::new(),
        }],
    };
    let mut order = Order::from_submission("o-1".into(), "BR1".into(), &submission, 0);
    order
        .apply_transition(Transition::SendToKitchen, 1)
        .expect("draft can be sent");
    order
}

fn any_transition() -> impl Strategy<Value = Transition> {
    prop_oneof![
        Just(Transition::SendToKitchen),
        Just(Transition::BeginPreparing),
        Just(Transition::MarkReady),
        Just(Transition::SettlePayment),
        Just(Transition::Cancel),
    ]
}

fn kitchen_advance() -> impl Strategy<Value = Transition> {
    prop_oneof![
        Just(Transition::BeginPreparing),
        Just(Transition::MarkReady),
        Just(Transition::SendToKitchen),
    ]
}

fn stage_rank(stage: Option<KitchenStage>) -> usize {
    match stage {
        None => 0,
        Some(KitchenStage::ToCook) => 1,
        Some(KitchenStage::Preparing) => 2,
        Some(KitchenStage::Completed) => 3,
    }
}

proptest! {
    /// Interleaved kitchen advances from several terminals never regress or skip.
    #[test]
    fn kitchen_stage_is_monotonic(ops in prop::collection::vec(kitchen_advance(), 0..40)) {
        let mut order = placed_order();
        let mut observed = vec![order.kitchen_stage];

        for (i, t) in ops.into_iter().enumerate() {
            let before = order.clone();
            match order.apply_transition(t, 10 + i as i64) {
                Ok(_) => {}
                Err(err) => {
                    prop_assert_eq!(err.status, before.status);
                    prop_assert_eq!(&order, &before);
                }
            }
            observed.push(order.kitchen_stage);
        }

        for pair in observed.windows(2) {
            let (a, b) = (stage_rank(pair[0]), stage_rank(pair[1]));
            prop_assert!(b >= a, "stage regressed: {:?} -> {:?}", pair[0], pair[1]);
            prop_assert!(b - a <= 1, "stage skipped: {:?} -> {:?}", pair[0], pair[1]);
        }
    }

    /// Status rank never decreases and nothing leaves a terminal status.
    #[test]
    fn status_never_regresses(ops in prop::collection::vec(any_transition(), 0..40)) {
        let mut order = placed_order();

        for (i, t) in ops.into_iter().enumerate() {
            let before = order.clone();
            let result = order.apply_transition(t, 10 + i as i64);
            if before.status.is_terminal() {
                prop_assert!(result.is_err());
                prop_assert_eq!(&order, &before);
            }
            prop_assert!(order.status.progress_rank() >= before.status.progress_rank());
            prop_assert!(order.revision >= before.revision);
        }
    }

    /// Applying the same transition twice equals applying it once.
    #[test]
    fn repeated_transition_is_idempotent(t in kitchen_advance(), n in 1usize..5) {
        let mut once = placed_order();
        let _ = once.apply_transition(t, 5);

        let mut many = placed_order();
        for _ in 0..n {
            let _ = many.apply_transition(t, 5);
        }

        prop_assert_eq!(&many, &once);
    }
}

#[test]
fn paid_order_rejects_cancel() {
    let mut order = placed_order();
    order.apply_transition(Transition::SettlePayment, 2).unwrap();
    assert_eq!(order.status, OrderStatus::Paid);
    let err = order.apply_transition(Transition::Cancel, 3).unwrap_err();
    assert_eq!(err.status, OrderStatus::Paid);
    assert_eq!(err.transition, Transition::Cancel);
}
