//! This module is for testing only

use std::cell::RefCell;
use std::rc::Rc;

pub type DropFlag<T> = Rc<RefCell<T>>;

/// Records its `value` in `drops` when dropped.
pub struct Tracked {
    pub value: i32,
    pub drops: DropFlag<Vec<i32>>,
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.drops.borrow_mut().push(self.value);
    }
}

/// A `free` callback that keeps everything it is given, and the log it keeps it in.
pub fn free_log<D: 'static>() -> (DropFlag<Vec<D>>, impl Fn(D) + 'static) {
    let log = DropFlag::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    (log, move |data| sink.borrow_mut().push(data))
}

#[test]
fn dropflag() {
    let flag = DropFlag::new(RefCell::new(Vec::new()));
    let tracked = Tracked { value: 3, drops: flag.clone() };
    assert!(flag.borrow().is_empty());
    std::mem::drop(tracked);
    assert_eq!(vec![3], *flag.borrow());

    let (freed, free) = free_log::<&str>();
    free("gone");
    assert_eq!(vec!["gone"], *freed.borrow());
}
