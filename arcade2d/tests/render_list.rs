use std::cell::RefCell;

use arcade2d::{DrawResolver, DrawTarget, RecordingSurface, RenderList, Surface};

/// Remembers which targets were drawn and with what offset.
#[derive(Default)]
struct Drawn {
    calls: RefCell<Vec<(u32, f32, f32)>>,
    debug_calls: RefCell<Vec<u32>>,
}

impl DrawResolver for Drawn {
    fn draw_target(&self, target: DrawTarget, _surface: &mut dyn Surface, xofs: f32, yofs: f32) {
        if let DrawTarget::Custom(id) = target {
            self.calls.borrow_mut().push((id, xofs, yofs));
        }
    }

    fn draw_target_debug(&self, target: DrawTarget, _surface: &mut dyn Surface, _xofs: f32, _yofs: f32) {
        if let DrawTarget::Custom(id) = target {
            self.debug_calls.borrow_mut().push(id);
        }
    }
}

fn ids(drawn: &Drawn) -> Vec<u32> {
    drawn.calls.borrow().iter().map(|c| c.0).collect()
}

#[test]
fn sorts_by_layer_then_priority() {
    let mut list = RenderList::new();
    list.add_object(DrawTarget::Custom(5), 0, 5, false);
    list.add_object(DrawTarget::Custom(10), 1, 0, false);
    list.add_object(DrawTarget::Custom(1), 0, 1, false);
    list.sort();

    let keys: Vec<_> = list.nodes().iter().map(|n| (n.layer, n.priority)).collect();
    assert_eq!(keys, vec![(0, 1), (0, 5), (1, 0)]);

    let drawn = Drawn::default();
    list.draw(&drawn, &mut RecordingSurface::new(), 0.0, 0.0);
    assert_eq!(ids(&drawn), vec![1, 5, 10]);
}

#[test]
fn equal_keys_keep_insertion_order() {
    let mut list = RenderList::new();
    for id in 0..5 {
        list.add_object(DrawTarget::Custom(id), -10, -10, false);
    }
    list.sort();
    let drawn = Drawn::default();
    list.draw(&drawn, &mut RecordingSurface::new(), 0.0, 0.0);
    assert_eq!(ids(&drawn), vec![0, 1, 2, 3, 4]);
}

#[test]
fn screen_relative_nodes_ignore_the_camera() {
    let mut list = RenderList::new();
    list.add_object(DrawTarget::Custom(1), 0, 0, false);
    list.add_object(DrawTarget::Custom(2), 0, 1, true);
    let drawn = Drawn::default();
    list.draw(&drawn, &mut RecordingSurface::new(), 30.0, -12.0);
    assert_eq!(*drawn.calls.borrow(), vec![(1, -30.0, 12.0), (2, 0.0, 0.0)]);
}

#[test]
fn debug_draw_is_limited_to_one_layer() {
    let mut list = RenderList::new();
    list.add_object(DrawTarget::Custom(1), 0, 0, false);
    list.add_object(DrawTarget::Custom(2), 3, 0, false);
    list.add_object(DrawTarget::Custom(3), 3, 1, false);
    let drawn = Drawn::default();
    list.draw_debug(&drawn, &mut RecordingSurface::new(), 0.0, 0.0, 3);
    assert_eq!(*drawn.debug_calls.borrow(), vec![2, 3]);
}

#[test]
fn full_list_drops_calls_until_cleared() {
    let mut list = RenderList::with_capacity(2).unwrap();
    assert!(list.add_object(DrawTarget::Custom(0), 0, 0, false));
    assert!(list.add_object(DrawTarget::Custom(1), 0, 0, false));
    assert!(!list.add_object(DrawTarget::Custom(2), 0, 0, false));
    assert_eq!(list.len(), 2);
    assert_eq!(list.dropped(), 1);

    list.clear();
    assert!(list.is_empty());
    assert!(list.add_object(DrawTarget::Custom(3), 0, 0, false));
    assert_eq!(list.capacity(), 2);
}

#[test]
fn zero_capacity_is_rejected() {
    assert!(RenderList::with_capacity(0).is_err());
}
