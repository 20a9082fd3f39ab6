use ppl_core::{Bernoulli, Store};
use ppl_enum::{
    enumerate_breadth_first, enumerate_depth_first, enumerate_likely_first, enumerate_nested,
    exit, sample, EnumerateConfig, Marginal, Step,
};
use serde_json::{json, Value};

type Prog = Step<Store, Value>;

fn fair_coin(s: Store) -> Prog {
    sample(s, Bernoulli, &[0.5], |s, v: Value| exit(s, v))
}

fn heads_in_two_flips(s: Store) -> Prog {
    sample(s, Bernoulli, &[0.5], |s, a: Value| {
        sample(s, Bernoulli, &[0.5], move |s, b: Value| {
            let heads = [&a, &b].iter().filter(|flip| ***flip == json!(true)).count();
            exit(s, json!(heads))
        })
    })
}

#[test]
fn outer_choices_route_to_outer_engine_after_nested_run() {
    let program = |s: Store| -> Prog {
        sample(s, Bernoulli, &[0.5], |s, first: Value| {
            enumerate_nested(
                s,
                EnumerateConfig::breadth_first(),
                fair_coin,
                move |s, inner: Marginal<Value>| {
                    let inner_len = inner.len();
                    sample(s, Bernoulli, &[0.5], move |s, second: Value| {
                        exit(s, json!([first.clone(), inner_len, second]))
                    })
                },
            )
        })
    };

    let (_, run) = enumerate_likely_first(Store::new(), program, None).unwrap();

    assert_eq!(run.report.completed_executions, 4);
    // One outer choice plus one follow-up choice per outer branch; inner choices never land here.
    assert_eq!(run.report.expansions, 3);
    assert_eq!(run.marginal.len(), 4);
    for entry in run.marginal.entries() {
        assert_eq!(entry.value[1], json!(2));
        assert!((entry.mass - 0.25).abs() < 1e-12);
    }
}

#[test]
fn nested_marginal_serves_as_distribution() {
    let program = |s: Store| -> Prog {
        enumerate_nested(
            s,
            EnumerateConfig::depth_first(),
            heads_in_two_flips,
            |s, heads: Marginal<Value>| sample(s, heads, &[], |s, v: Value| exit(s, v)),
        )
    };

    let (_, run) = enumerate_breadth_first(Store::new(), program, None).unwrap();

    assert!((run.marginal.probability(&json!(0)) - 0.25).abs() < 1e-12);
    assert!((run.marginal.probability(&json!(1)) - 0.5).abs() < 1e-12);
    assert!((run.marginal.probability(&json!(2)) - 0.25).abs() < 1e-12);
    assert_eq!(run.report.completed_executions, 3);
}

#[test]
fn nested_run_restores_the_store_it_was_given() {
    let program = |mut s: Store| -> Prog {
        s.insert("depth", json!("outer"));
        enumerate_nested(
            s,
            EnumerateConfig::likely_first(),
            |mut s: Store| {
                s.insert("depth", json!("inner"));
                sample(s, Bernoulli, &[0.5], |s, v: Value| exit(s, v))
            },
            |s, _inner: Marginal<Value>| {
                let depth = s.get("depth").cloned().unwrap_or(Value::Null);
                exit(s, depth)
            },
        )
    };

    let (_, run) = enumerate_depth_first(Store::new(), program, None).unwrap();

    assert_eq!(run.marginal.len(), 1);
    assert!((run.marginal.mass(&json!("outer")) - 1.0).abs() < 1e-12);
}

fn nested_chain(depth: usize) -> Box<dyn FnOnce(Store) -> Prog> {
    Box::new(move |s: Store| -> Prog {
        if depth == 0 {
            fair_coin(s)
        } else {
            enumerate_nested(
                s,
                EnumerateConfig::depth_first(),
                nested_chain(depth - 1),
                |s, inner: Marginal<Value>| sample(s, inner, &[], |s, v: Value| exit(s, v)),
            )
        }
    })
}

#[test]
fn deeply_nested_runs_unwind_in_order() {
    let (_, run) = enumerate_likely_first(Store::new(), nested_chain(5), None).unwrap();
    assert_eq!(run.marginal.len(), 2);
    assert!((run.marginal.probability(&json!(true)) - 0.5).abs() < 1e-12);
    assert!((run.marginal.probability(&json!(false)) - 0.5).abs() < 1e-12);
}

#[test]
fn budget_of_nested_run_is_independent_of_outer_budget() {
    let program = |s: Store| -> Prog {
        enumerate_nested(
            s,
            EnumerateConfig::breadth_first().with_max_executions(1),
            heads_in_two_flips,
            |s, inner: Marginal<Value>| exit(s, json!(inner.len())),
        )
    };
    let (_, run) = enumerate_depth_first(Store::new(), program, Some(10)).unwrap();
    assert_eq!(run.report.completed_executions, 1);
    assert!((run.marginal.mass(&json!(1)) - 1.0).abs() < 1e-12);
}

#[test]
fn synchronous_nested_call_inside_a_branch() {
    let program = |s: Store| -> Prog {
        sample(s, Bernoulli, &[0.5], |s, first: Value| {
            let inner = enumerate_depth_first(Store::new(), fair_coin, None).map(|(_, run)| run);
            let inner_len = inner.map_or(0, |run| run.marginal.len());
            exit(s, json!([first, inner_len]))
        })
    };
    let (_, run) = enumerate_breadth_first(Store::new(), program, None).unwrap();
    assert_eq!(run.report.completed_executions, 2);
    assert!((run.marginal.mass(&json!([true, 2])) - 0.5).abs() < 1e-12);
}
