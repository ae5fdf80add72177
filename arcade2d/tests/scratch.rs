use arcade2d::{ScratchPool, Vec2};

#[test]
fn nested_brackets_restore_the_index() {
    let mut pool = ScratchPool::vectors(16);
    pool.begin();
    pool.get().unwrap();
    let before = pool.index();

    for _ in 0..4 {
        pool.begin();
        pool.get().unwrap();
        pool.get().unwrap();
    }
    assert_eq!(pool.index(), before + 8);
    for _ in 0..4 {
        pool.done();
    }
    assert_eq!(pool.index(), before);
    pool.done();
    assert_eq!(pool.index(), 0);
    assert_eq!(pool.depth(), 0);
}

#[test]
fn unmatched_done_does_nothing() {
    let mut pool = ScratchPool::vectors(4);
    pool.get().unwrap();
    pool.done();
    assert_eq!(pool.index(), 1);
}

#[test]
fn leaked_bracket_exhausts_the_pool() {
    let mut pool = ScratchPool::vectors(3);
    for _ in 0..3 {
        pool.begin();
        pool.get().unwrap();
    }
    assert!(pool.get().is_none());
    assert_eq!(pool.overflows(), 1);

    pool.reset();
    assert_eq!(pool.depth(), 0);
    assert!(pool.get().is_some());
}

#[test]
fn scoped_use_hands_back_its_items() {
    let mut pool = ScratchPool::vectors(4);
    let length = pool.scope(|p| {
        let a = p.get().unwrap();
        let b = p.get().unwrap();
        p[a].set(3.0, 0.0);
        p[b].set(0.0, 4.0);
        let sum = p[a] + p[b];
        sum.length()
    });
    assert_eq!(length, 5.0);
    assert_eq!(pool.index(), 0);

    // items keep their last values
    let again = pool.get().unwrap();
    assert_eq!(pool[again], Vec2::new(3.0, 0.0));
}
