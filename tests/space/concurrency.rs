use std::thread;

use configspace::prelude::*;

const SAMPLERS: usize = 4;
const ROUNDS: usize = 40;
const BATCH: usize = 25;

fn shared_space() -> (ConfigurationSpace, Parameter) {
    let x = Parameter::float("x", -1.0, 1.0).build().unwrap();
    let y = Parameter::int("y", 0, 10).build().unwrap();
    let space = ConfigurationSpace::builder("shared")
        .parameters([x, y.clone()])
        .condition_text(&y, "x < 0")
        .forbidden_clause_text("y == 9")
        .seed(31)
        .build()
        .unwrap();
    (space, y)
}

#[test]
fn spaces_are_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ConfigurationSpace>();
    assert_send_sync::<DistributionSpace>();
    assert_send_sync::<Configuration>();
}

#[test]
fn samples_stay_valid_while_the_space_is_rewired() {
    let (space, y) = shared_space();
    // Equivalent conditions, so every sample is valid whichever one is set.
    let conditions = [
        Expression::parse("x < 0", &space).unwrap(),
        Expression::parse("!(x >= 0)", &space).unwrap(),
    ];
    let distributions = [
        Distribution::uniform_float(-1.0, 1.0, Scale::Linear, 0.0).unwrap(),
        Distribution::uniform_float(-0.5, 0.5, Scale::Linear, 0.0).unwrap(),
    ];

    thread::scope(|scope| {
        let writer = scope.spawn(|| {
            for round in 0..ROUNDS {
                let condition = conditions[round % 2].clone();
                space.set_condition(&y, Some(condition)).unwrap();
                let distribution = &distributions[round % 2];
                space.set_distribution(distribution, &[0]).unwrap();
                thread::yield_now();
            }
        });
        let samplers: Vec<_> = (0..SAMPLERS)
            .map(|_| {
                scope.spawn(|| {
                    let mut checked = 0;
                    for _ in 0..ROUNDS {
                        for c in space.samples(BATCH).unwrap() {
                            assert!(space.check_configuration(&c).unwrap(), "{c}");
                            checked += 1;
                        }
                    }
                    checked
                })
            })
            .collect();

        writer.join().unwrap();
        let checked: usize = samplers.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(checked, SAMPLERS * ROUNDS * BATCH);
    });

    // The last writes are the ones in force.
    let last = (ROUNDS - 1) % 2;
    assert_eq!(space.condition(1).unwrap(), Some(conditions[last].clone()));
    assert!(space.distribution(0).unwrap().0.ptr_eq(&distributions[last]));
}

#[test]
fn private_generators_and_tables_under_contention() {
    let (space, _) = shared_space();
    let ds = DistributionSpace::new(&space).unwrap();
    let narrow = Distribution::uniform_float(-1.0, -0.5, Scale::Linear, 0.0).unwrap();
    let wide = Distribution::uniform_float(-1.0, 1.0, Scale::Linear, 0.0).unwrap();

    thread::scope(|scope| {
        scope.spawn(|| {
            for round in 0..ROUNDS as u64 {
                let d = if round % 2 == 0 { &narrow } else { &wide };
                ds.set_distribution(d, &[0]).unwrap();
                space.set_seed(round);
            }
        });
        for seed in 0..SAMPLERS as u64 {
            let (space, ds) = (&space, &ds);
            scope.spawn(move || {
                let mut rng = fastrand::Rng::with_seed(seed);
                for _ in 0..ROUNDS {
                    let batch = space.samples_with(Some(ds), Some(&mut rng), BATCH).unwrap();
                    for c in &batch {
                        assert!(space.check_configuration(c).unwrap(), "{c}");
                        c.check().unwrap();
                    }
                }
            });
        }
    });
}
