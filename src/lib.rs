/*!

Manually managed containers: a type-erased resizable [`Array`], a handle based doubly
linked [`List`] with owner supplied callbacks, and a natural merge sort for the list in
[`sort`].

```
use aputils::{ContainerIterator, List};

let mut list = vec![1, 1, 3, 7, 2, 4, 5, 6, 2, 3]
    .into_iter()
    .collect_list("numbers")
    .unwrap()
    .with_compare(|a: &i32, b| a.cmp(b));

list.sort().unwrap();
assert_eq!(Ok(true), list.is_sorted());
```

*/

#[macro_use]
mod logging;

mod arena;
mod array;
mod error;
mod iter;
mod list;
mod traits;
pub mod sort;

pub use arena::NodeId;
pub use array::Array;
pub use error::Error;
pub use iter::{Iter, Nodes};
pub use list::{CompareFn, CopyFn, FreeFn, List, MAX_LABEL_LEN};
pub use sort::Run;
pub use traits::ContainerIterator;

#[cfg(test)]
pub mod dropflag;
