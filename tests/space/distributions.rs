use configspace::prelude::*;

fn pair() -> ConfigurationSpace {
    let a = Parameter::float("a", 0.0, 1.0).build().unwrap();
    let b = Parameter::float("b", 0.0, 1.0).build().unwrap();
    let k = Parameter::categorical("k", ["p", "q"]).build().unwrap();
    ConfigurationSpace::builder("pair")
        .parameters([a, b, k])
        .seed(21)
        .build()
        .unwrap()
}

fn uniform(l: f64, u: f64) -> Distribution {
    Distribution::uniform_float(l, u, Scale::Linear, 0.0).unwrap()
}

#[test]
fn joint_wrapper_drives_its_group() {
    let space = pair();
    let ds = DistributionSpace::new(&space).unwrap();
    let joint = Distribution::multivariate(vec![uniform(0.0, 0.2), uniform(0.8, 1.0)]).unwrap();
    ds.set_distribution(&joint, &[1, 0]).unwrap();

    let (d, dim) = ds.distribution(0).unwrap();
    assert!(d.ptr_eq(&joint));
    assert_eq!(dim, 1);
    assert_eq!(ds.wrappers().len(), 2);

    for c in space.samples_with(Some(&ds), None, 200).unwrap() {
        let a = c.values()[0].as_f64().unwrap();
        let b = c.values()[1].as_f64().unwrap();
        assert!(a >= 0.8 && b < 0.2, "{c}");
    }
    // The space's own assignment is untouched.
    assert_eq!(space.distribution_wrappers().len(), 3);
}

#[test]
fn splitting_a_group_restores_defaults() {
    let space = pair();
    let ds = DistributionSpace::new(&space).unwrap();
    let joint = Distribution::multivariate(vec![uniform(0.0, 0.2), uniform(0.0, 0.2)]).unwrap();
    ds.set_distribution(&joint, &[0, 1]).unwrap();
    ds.set_distribution(&uniform(0.5, 0.6), &[0]).unwrap();

    let indices: Vec<Vec<usize>> = ds.wrappers().iter().map(|w| w.indices().to_vec()).collect();
    assert_eq!(indices, vec![vec![2], vec![0], vec![1]]);
    let (b_dist, _) = ds.distribution(1).unwrap();
    assert!(!b_dist.ptr_eq(&joint));

    let mut b_high = false;
    for c in space.samples_with(Some(&ds), None, 200).unwrap() {
        let a = c.values()[0].as_f64().unwrap();
        assert!((0.5..0.6).contains(&a));
        b_high |= c.values()[1].as_f64().unwrap() > 0.2;
    }
    assert!(b_high, "b should be back on its full domain");
}

#[test]
fn foreign_distribution_spaces_are_rejected() {
    let (s1, s2) = (pair(), pair());
    let ds = DistributionSpace::new(&s2).unwrap();
    let foreign = s1.samples_with(Some(&ds), None, 3);
    assert!(matches!(foreign, Err(Error::InvalidValue(_))));
    assert!(ds.configuration_space().ptr_eq(&s2));
}

#[test]
fn bad_assignments_leave_the_table_alone() {
    let space = pair();
    let before = space.distribution_wrappers().len();
    assert!(matches!(
        space.set_distribution(&uniform(0.0, 1.0), &[7]),
        Err(Error::OutOfBounds { index: 7, len: 3 })
    ));
    let joint = Distribution::multivariate(vec![uniform(0.0, 1.0), uniform(0.0, 1.0)]).unwrap();
    assert!(matches!(
        space.set_distribution(&joint, &[0]),
        Err(Error::InvalidValue(_))
    ));
    assert_eq!(space.distribution_wrappers().len(), before);
}
