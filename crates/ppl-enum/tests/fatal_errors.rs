use std::cell::Cell;
use std::rc::Rc;

use ppl_core::{Bernoulli, EnumError, Gaussian, RandomInteger, Store, UniformDraw};
use ppl_enum::{
    enumerate_breadth_first, enumerate_depth_first, enumerate_nested, exit, sample,
    EnumerateConfig, Enumerator, Marginal, Step,
};
use serde_json::{json, Value};

type Prog = Step<Store, Value>;

#[test]
fn continuous_choice_aborts_the_run() {
    let program = |s: Store| -> Prog { sample(s, Gaussian, &[0.0, 1.0], |s, v: Value| exit(s, v)) };
    let err = enumerate_breadth_first(Store::new(), program, None).unwrap_err();
    assert!(matches!(err, EnumError::UnsupportedDistribution(_)));
    assert_eq!(err.info().context["erp"], "gaussian");
    assert!(err.is_model_defect());
}

#[test]
fn empty_support_aborts_the_run() {
    let program = |s: Store| -> Prog {
        sample(s, RandomInteger, &[0.0], |s, v: Value| exit(s, v))
    };
    let err = enumerate_depth_first(Store::new(), program, None).unwrap_err();
    assert!(matches!(err, EnumError::EmptySupport(_)));
    assert_eq!(err.info().context["erp"], "randomInteger");
}

#[test]
fn failure_deep_in_the_tree_discards_partial_results() {
    let completed = Rc::new(Cell::new(0usize));
    let counter = Rc::clone(&completed);
    let program = move |s: Store| -> Prog {
        sample(s, Bernoulli, &[0.5], move |s, first: Value| {
            if first == json!(true) {
                counter.set(counter.get() + 1);
                exit(s, first)
            } else {
                let empty: UniformDraw<Value> = UniformDraw::new(Vec::new());
                sample(s, empty, &[], |s, v: Value| exit(s, v))
            }
        })
    };
    let result = enumerate_breadth_first(Store::new(), program, None);
    assert!(matches!(result, Err(EnumError::EmptySupport(_))));
    assert_eq!(completed.get(), 1);
}

#[test]
fn error_inside_nested_run_aborts_outer_run() {
    let program = |s: Store| -> Prog {
        enumerate_nested(
            s,
            EnumerateConfig::depth_first(),
            |s: Store| sample(s, Gaussian, &[0.0, 1.0], |s, v: Value| exit(s, v)),
            |s, inner: Marginal<Value>| exit(s, json!(inner.len())),
        )
    };
    let err = enumerate_depth_first(Store::new(), program, None).unwrap_err();
    assert!(matches!(err, EnumError::UnsupportedDistribution(_)));
}

#[test]
fn zero_budget_is_rejected_before_running() {
    let ran = Rc::new(Cell::new(false));
    let flag = Rc::clone(&ran);
    let program = move |s: Store| -> Prog {
        flag.set(true);
        exit(s, json!(null))
    };
    let enumerator = Enumerator::new(EnumerateConfig::depth_first().with_max_executions(0));
    let err = enumerator.run(Store::new(), program).unwrap_err();
    assert!(matches!(err, EnumError::Config(_)));
    assert!(!ran.get());
}

#[test]
fn zero_budget_on_nested_run_is_rejected() {
    let program = |s: Store| -> Prog {
        enumerate_nested(
            s,
            EnumerateConfig::breadth_first().with_max_executions(0),
            |s: Store| exit(s, json!(1)),
            |s, _inner: Marginal<Value>| exit(s, json!(0)),
        )
    };
    let err = enumerate_breadth_first(Store::new(), program, None).unwrap_err();
    assert_eq!(err.info().code, "budget-zero");
}
