use livemetrics::*;
use std::cell::RefCell;
use std::rc::Rc;

fn test_store() -> MetricsStore {
    MetricsStore::builder()
        .clock(ManualClock::new(0))
        .id_seed(7)
        .build()
        .unwrap()
}

#[test]
fn test_listener_receives_every_mutation() {
    let mut store = test_store();
    let seen: Rc<RefCell<Vec<MetricsSnapshot>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let _sub = store.subscribe(move |m| sink.borrow_mut().push(m.clone()));

    store.record_function_registration(1_000, 10.0);
    store.record_trigger_creation(2_000, 20.0);
    store.record_execution(ExecutionInput::success(1, 1, "0x01", 100, 5.0));
    store.update_gas_price(1);
    store.reset();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 5);
    assert_eq!(seen[0].execution.total_functions, 1);
    assert_eq!(seen[1].execution.total_triggers, 1);
    assert_eq!(seen[2].execution.total_executions, 1);
    assert_eq!(seen[3].gas.gas_price, 1);
    assert_eq!(seen[4].execution.total_executions, 0);
    assert_eq!(seen[4].execution.total_functions, 0);
}

#[test]
fn test_listener_sees_same_snapshot_as_metrics() {
    let mut store = test_store();
    let last: Rc<RefCell<Option<MetricsSnapshot>>> = Rc::new(RefCell::new(None));
    let sink = last.clone();
    store.subscribe(move |m| *sink.borrow_mut() = Some(m.clone()));

    store.record_execution(ExecutionInput::success(1, 1, "0x01", 100, 5.0));

    assert_eq!(last.borrow().as_ref(), Some(&store.metrics()));
}

#[test]
fn test_listeners_called_in_registration_order() {
    let mut store = test_store();
    let order = Rc::new(RefCell::new(Vec::new()));
    for name in ["panel", "feed", "cards"] {
        let order = order.clone();
        store.subscribe(move |_| order.borrow_mut().push(name));
    }

    store.update_gas_price(5);
    assert_eq!(*order.borrow(), vec!["panel", "feed", "cards"]);
}

#[test]
fn test_unsubscribed_listener_gets_nothing_more() {
    let mut store = test_store();
    let removed_calls = Rc::new(RefCell::new(0));
    let kept_calls = Rc::new(RefCell::new(0));

    let counter = removed_calls.clone();
    let removed = store.subscribe(move |_| *counter.borrow_mut() += 1);
    let counter = kept_calls.clone();
    let _kept = store.subscribe(move |_| *counter.borrow_mut() += 1);

    store.update_gas_price(1);
    assert!(removed.unsubscribe());
    store.update_gas_price(2);
    store.update_gas_price(3);

    assert_eq!(*removed_calls.borrow(), 1);
    assert_eq!(*kept_calls.borrow(), 3);
    assert_eq!(store.subscriber_count(), 1);
}

#[test]
fn test_unsubscribe_inside_listener_does_not_skip_others() {
    let mut store = test_store();
    let calls = Rc::new(RefCell::new(Vec::new()));

    let own_handle: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
    let handle = own_handle.clone();
    let log = calls.clone();
    let sub = store.subscribe(move |_| {
        log.borrow_mut().push("self-removing");
        if let Some(sub) = handle.borrow().as_ref() {
            sub.unsubscribe();
        }
    });
    *own_handle.borrow_mut() = Some(sub);

    let log = calls.clone();
    store.subscribe(move |_| log.borrow_mut().push("second"));

    store.record_execution(ExecutionInput::success(1, 1, "0x01", 100, 5.0));
    store.record_execution(ExecutionInput::success(1, 1, "0x02", 100, 5.0));

    assert_eq!(*calls.borrow(), vec!["self-removing", "second", "second"]);
    assert_eq!(store.subscriber_count(), 1);
}

#[test]
fn test_listener_removing_later_listener_mid_notification() {
    let mut store = test_store();
    let calls = Rc::new(RefCell::new(Vec::new()));
    let victim_slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

    let slot = victim_slot.clone();
    let log = calls.clone();
    store.subscribe(move |_| {
        log.borrow_mut().push("remover");
        if let Some(victim) = slot.borrow().as_ref() {
            victim.unsubscribe();
        }
    });

    let log = calls.clone();
    let victim = store.subscribe(move |_| log.borrow_mut().push("victim"));
    *victim_slot.borrow_mut() = Some(victim);

    // The round in progress was snapshotted before removal
    store.update_gas_price(1);
    store.update_gas_price(2);

    assert_eq!(*calls.borrow(), vec!["remover", "victim", "remover"]);
}

#[test]
fn test_reset_keeps_subscribers() {
    let mut store = test_store();
    let calls = Rc::new(RefCell::new(0));
    let counter = calls.clone();
    store.subscribe(move |_| *counter.borrow_mut() += 1);

    store.reset();
    store.update_gas_price(1);

    assert_eq!(*calls.borrow(), 2);
}

#[test]
fn test_subscription_outlives_store() {
    let sub = {
        let store = test_store();
        store.subscribe(|_| {})
    };
    assert!(!sub.is_active());
    assert!(!sub.unsubscribe());
}
