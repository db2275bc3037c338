#[cfg(test)]
mod tests {
    use crate::tests::{ExecLog, FutureMap, chk_err, init_test_logging};
    use crate::{Future, FutureResult, Manager, ManagerConfig, ManagerHandle};

    fn fibonacci(mgr: &ManagerHandle, n: u64) -> Future<u64> {
        match n {
            0 | 1 => mgr.future().compute(move |()| Ok(n)),
            _ => {
                let h1 = mgr.clone();
                let f1 = mgr.future().delegate(move |()| Ok(fibonacci(&h1, n - 2)));
                let h2 = mgr.clone();
                let f2 = mgr.future().delegate(move |()| Ok(fibonacci(&h2, n - 1)));
                mgr.future()
                    .after(f1)
                    .after(f2)
                    .compute(|(res1, res2)| Ok(res1 + res2))
            }
        }
    }

    fn chk_fibonacci(input: u64, expected: u64) {
        let mgr = Manager::create();
        let handle = mgr.handle();
        let future = mgr.future().delegate(move |()| Ok(fibonacci(&handle, input)));
        mgr.finish().unwrap();
        assert_eq!(future.get_result().unwrap(), expected, "fibonacci({input})");
    }

    #[test]
    fn test_fibonacci() {
        init_test_logging();
        let expected = [0, 1, 1, 2, 3, 5, 8, 13, 21, 34, 55, 89, 144];
        for (n, value) in expected.into_iter().enumerate() {
            chk_fibonacci(n as u64, value);
        }
    }

    #[test]
    fn test_cycle_tail() {
        let mgr = Manager::create();
        let map = FutureMap::default();
        for (name, next) in [("a", "b"), ("b", "c"), ("c", "d"), ("d", "b")] {
            let m = map.clone();
            map.insert(name, mgr.future().name(name).delegate(move |()| Ok(m.get(next))));
        }

        chk_err("cycle:b,c,d,b", mgr.finish());
    }

    #[test]
    fn test_cycle_mixed() {
        let mgr = Manager::create();
        let map = FutureMap::default();

        let m = map.clone();
        map.insert("c", mgr.future().name("c").compute(move |()| m.result("b")));
        let m = map.clone();
        map.insert(
            "b",
            mgr.future()
                .name("b")
                .compute_on_demand(true)
                .delegate(move |()| Ok(m.get("a"))),
        );
        map.insert(
            "a",
            mgr.future()
                .name("a")
                .after(map.get("c"))
                .compute(|(c,)| Ok(c)),
        );

        chk_err("cycle:c,b,a,c", mgr.finish());
    }

    fn init_cycle_mixed_complex(mgr: &Manager) -> FutureMap {
        let map = FutureMap::default();

        let m = map.clone();
        map.insert(
            "g",
            mgr.future()
                .name("g")
                .compute_on_demand(true)
                .delegate(move |()| Ok(m.get("b"))),
        );
        let m = map.clone();
        map.insert(
            "f",
            mgr.future()
                .name("f")
                .compute_on_demand(true)
                .compute(move |()| m.result("g")),
        );
        let m = map.clone();
        map.insert("e", mgr.future().name("e").compute(move |()| m.result("f")));
        map.insert(
            "d",
            mgr.future().name("d").after(map.get("e")).compute(|(e,)| Ok(e)),
        );
        map.insert(
            "c",
            mgr.future()
                .name("c")
                .compute_on_demand(true)
                .after(map.get("d"))
                .compute(|(d,)| Ok(d)),
        );
        let m = map.clone();
        map.insert(
            "b",
            mgr.future()
                .name("b")
                .compute_on_demand(true)
                .compute(move |()| m.result("c")),
        );
        let m = map.clone();
        map.insert(
            "a",
            mgr.future()
                .name("a")
                .compute_on_demand(true)
                .compute(move |()| m.result("b")),
        );
        map
    }

    #[test]
    fn test_cycle_mixed_complex_execute() {
        let mgr = Manager::create();
        let _map = init_cycle_mixed_complex(&mgr);
        // The scan starts at `e`, the first eager future.
        chk_err("cycle:e,f,g,b,c,d,e", mgr.finish());
    }

    #[test]
    fn test_execution_order() {
        init_test_logging();
        let mgr = Manager::create();
        let map = FutureMap::default();
        let log = ExecLog::default();

        let l = log.clone();
        map.insert(
            "a",
            mgr.future().name("a").compute(move |()| {
                l.add("a");
                Ok(123)
            }),
        );
        let (l, m) = (log.clone(), map.clone());
        map.insert(
            "b",
            mgr.future().name("b").delegate(move |()| {
                l.add("b");
                Ok(m.get("d"))
            }),
        );
        let l = log.clone();
        map.insert(
            "c",
            mgr.future()
                .name("c")
                .after(map.get("b"))
                .compute(move |(b,)| {
                    l.add(format!("c:{b}"));
                    Ok(b + 1)
                }),
        );
        let l = log.clone();
        map.insert(
            "d",
            mgr.future().name("d").compute(move |()| {
                l.add("d");
                Ok(456)
            }),
        );

        mgr.execute().unwrap();

        assert_eq!(log.entries(), ["a", "b", "d", "c:456"]);
        assert_eq!(map.result("a").unwrap(), 123);
        assert_eq!(map.result("b").unwrap(), 456);
        assert_eq!(map.result("c").unwrap(), 457);
        assert_eq!(map.result("d").unwrap(), 456);
    }

    #[test]
    fn test_execution_order_promise() {
        let mgr = Manager::create();
        let log = ExecLog::default();
        let p = mgr.promise::<i32>();

        let l = log.clone();
        let a = mgr.future().after(p.future()).compute(move |(v,)| {
            l.add(format!("a:{v}"));
            Ok(v + 1)
        });
        let l = log.clone();
        let b = mgr.future().after(a.clone()).compute(move |(v,)| {
            l.add(format!("b:{v}"));
            Ok(v + 1)
        });
        let (l, promise) = (log.clone(), p.clone());
        let c = mgr.future().compute(move |()| {
            l.add("c");
            promise.set_result(123)?;
            Ok(456)
        });
        let l = log.clone();
        let d = mgr.future().compute(move |()| {
            l.add("d");
            Ok(789)
        });

        mgr.execute().unwrap();

        assert_eq!(log.entries(), ["c", "d", "a:123", "b:124"]);
        assert_eq!(a.get_result().unwrap(), 124);
        assert_eq!(b.get_result().unwrap(), 125);
        assert_eq!(c.get_result().unwrap(), 456);
        assert_eq!(d.get_result().unwrap(), 789);
    }

    #[test]
    fn test_promise_set_between_executions() {
        let mgr = Manager::create();
        let p = mgr.promise::<i32>();
        let a = mgr
            .future()
            .name("a")
            .after(p.future())
            .compute(|(v,)| Ok(v * 2));

        mgr.execute().unwrap();
        assert!(!a.is_done());
        chk_err("no_result:a", a.get_result());

        p.set_result(21).unwrap();
        mgr.execute().unwrap();
        assert_eq!(a.get_result().unwrap(), 42);
        mgr.finish().unwrap();
    }

    #[test]
    fn test_finish_reports_first_blocked_future() {
        let mgr = Manager::create();
        let p = mgr.promise::<i32>();
        let _ready = mgr.future().name("ready").compute(|()| Ok(1));
        let a = mgr.future().name("a").after(p.future()).compute(|(v,)| Ok(v));
        let _b = mgr.future().name("b").after(a).compute(|(v,)| Ok(v));

        chk_err("no_result:a", mgr.finish());
        assert!(mgr.is_finished());
        chk_err("finished", mgr.execute());
        assert_eq!(mgr.pending_count(), 3);
    }

    #[test]
    fn test_unset_promise_alone_does_not_fail_finish() {
        let mgr = Manager::create();
        let p = mgr.promise::<String>();
        let a = mgr.future().name("a").compute(|()| Ok(7));
        mgr.finish().unwrap();
        assert!(!p.is_set());
        assert_eq!(a.get_result().unwrap(), 7);
    }

    #[test]
    fn test_blocked_delegate_body_runs_once() {
        let mgr = Manager::create();
        let log = ExecLog::default();
        let p = mgr.promise::<i32>();
        let target = mgr
            .future()
            .name("target")
            .compute_on_demand(true)
            .after(p.future())
            .compute(|(v,)| Ok(v + 1));

        let l = log.clone();
        let outer = mgr.future().name("outer").delegate(move |()| {
            l.add("outer");
            Ok(target)
        });

        mgr.execute().unwrap();
        mgr.execute().unwrap();
        assert!(!outer.is_done());

        p.set_result(9).unwrap();
        mgr.execute().unwrap();
        assert_eq!(outer.get_result().unwrap(), 10);
        assert_eq!(log.count("outer"), 1);
    }

    #[test]
    fn test_delegate_to_promise_waits_in_batch() {
        let mgr = Manager::create();
        let p = mgr.promise::<&'static str>();
        let pf = p.future();
        let a = mgr.future().name("a").delegate(move |()| Ok(pf));

        mgr.execute().unwrap();
        assert!(!a.is_done());
        p.set_result("late").unwrap();
        mgr.finish().unwrap();
        assert_eq!(a.get_result().unwrap(), "late");
    }

    #[test]
    fn test_futures_registered_during_pass_are_visited() {
        let mgr = Manager::create();
        let handle = mgr.handle();
        let created = std::rc::Rc::new(std::cell::RefCell::new(None));

        let slot = created.clone();
        let _outer = mgr.future().name("outer").compute(move |()| {
            let inner = handle.future().name("inner").compute(|()| Ok(5));
            *slot.borrow_mut() = Some(inner);
            Ok(0)
        });

        mgr.execute().unwrap();
        let inner = created.borrow().clone().unwrap();
        assert!(inner.is_done());
        assert_eq!(inner.get_result().unwrap(), 5);
    }

    #[test]
    fn test_error_aborts_execute() {
        let mgr = Manager::create();
        let log = ExecLog::default();
        let map = FutureMap::default();

        let m = map.clone();
        map.insert("c", mgr.future().name("c").compute(move |()| m.result("d")));
        let l = log.clone();
        map.insert(
            "d",
            mgr.future().name("d").compute(move |()| {
                l.add("d");
                Ok(1)
            }),
        );

        chk_err("no_result:d", mgr.execute());
        assert!(log.entries().is_empty());
    }

    #[test]
    fn test_finished_manager_rejects_execution() {
        let mgr = Manager::create();
        mgr.finish().unwrap();
        chk_err("finished", mgr.execute());
        chk_err("finished", mgr.finish());
    }

    #[test]
    fn test_recursive_execution_rejected_by_default() {
        let mgr = Manager::create();
        let handle = mgr.handle();
        let _a = mgr.future().name("a").compute(move |()| {
            handle.execute()?;
            Ok(1)
        });
        chk_err("recursive_execute", mgr.execute());
    }

    #[test]
    fn test_recursive_execution_when_allowed() {
        let mgr = Manager::with_config(ManagerConfig::new().allow_recursive_execution(true));
        let handle = mgr.handle();
        let a = mgr.future().name("a").compute(move |()| -> FutureResult<i32> {
            let inner = handle.future().name("inner").compute(|()| Ok(41));
            handle.execute()?;
            Ok(inner.get_result()? + 1)
        });
        mgr.finish().unwrap();
        assert_eq!(a.get_result().unwrap(), 42);
    }

    #[test]
    fn test_on_demand_futures_skipped_by_batch() {
        let mgr = Manager::create();
        let log = ExecLog::default();
        let l = log.clone();
        let lazy = mgr
            .future()
            .name("lazy")
            .compute_on_demand(true)
            .compute(move |()| {
                l.add("lazy");
                Ok(1)
            });

        mgr.finish().unwrap();
        assert!(log.entries().is_empty());
        assert_eq!(lazy.get_result().unwrap(), 1);
        assert_eq!(log.entries(), ["lazy"]);
    }

    #[test]
    fn test_promise_set_while_chasing_blocked_future() {
        let mgr = Manager::create();
        let p = mgr.promise::<i32>();
        let q = mgr.promise::<i32>();

        let z = mgr
            .future()
            .name("z")
            .after(p.future())
            .compute(|(v,)| Ok(v + 1));
        let setter = p.clone();
        let e = mgr
            .future()
            .name("e")
            .compute_on_demand(true)
            .compute(move |()| {
                setter.set_result(10)?;
                Ok(0)
            });
        let a = mgr
            .future()
            .name("a")
            .after(e.clone())
            .after(q.future())
            .compute(|(e, q)| Ok(e + q));

        chk_err("no_result:a", mgr.finish());
        assert!(p.is_set());
        assert!(e.is_done());
        assert_eq!(z.get_result().unwrap(), 11);
        assert!(!a.is_done());
    }

    #[test]
    fn test_deterministic_order() {
        fn run() -> Vec<String> {
            let mgr = Manager::create();
            let log = ExecLog::default();
            let p = mgr.promise::<i32>();
            let mut previous = p.future();
            for i in 0..5 {
                let l = log.clone();
                previous = mgr.future().after(previous).compute(move |(v,)| {
                    l.add(format!("chain{i}"));
                    Ok(v + 1)
                });
            }
            for i in 0..3 {
                let (l, p) = (log.clone(), p.clone());
                mgr.future().compute(move |()| {
                    l.add(format!("free{i}"));
                    if i == 2 {
                        p.set_result(0)?;
                    }
                    Ok(i)
                });
            }
            mgr.finish().unwrap();
            assert_eq!(previous.get_result().unwrap(), 5);
            log.entries()
        }

        let first = run();
        assert_eq!(first, run());
        assert_eq!(first[..3], ["free0", "free1", "free2"]);
    }
}
