use crate::{Array, Error, List};
use bytemuck::Pod;

/// Implements collect into `List` and `Array`.
pub trait ContainerIterator: Iterator {
    /// Pushes every item to the back of a new list without callbacks.
    fn collect_list(self, label: &str) -> Result<List<Self::Item>, Error>;

    /// Byte copies every item into a new array with the stride of the item type.
    fn collect_array(self) -> Result<Array, Error>
        where
            Self::Item: Pod;
}

impl<Q: Iterator> ContainerIterator for Q {
    fn collect_list(self, label: &str) -> Result<List<Self::Item>, Error> {
        let mut list = List::new(label);
        for item in self {
            list.push_back(item)?;
        }
        Ok(list)
    }

    fn collect_array(self) -> Result<Array, Error>
        where
            Self::Item: Pod
    {
        let (lower, _) = self.size_hint();
        let mut array = Array::for_type::<Self::Item>(lower.max(1))?;
        for item in self {
            array.push_value(item)?;
        }
        Ok(array)
    }
}
