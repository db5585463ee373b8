pub use remainder::{remaining, Remaining};

mod remainder {
    /// View of a slice with one element split out, giving access to all
    /// other positions under their original indices.
    pub struct Remaining<'a, T> {
        before: &'a mut [T],
        after: &'a mut [T],
        used_index: usize,
    }

    impl<'a, T> Remaining<'a, T> {
        /// Get the value at position `i` from the underlying slice.
        /// Returns `None` if the index is out-of-bounds or the same index
        /// as used on the call to `remaining`.
        pub fn get_mut(&mut self, i: usize) -> Option<&mut T> {
            if i < self.used_index {
                self.before.get_mut(i)
            } else {
                self.after.get_mut(i.checked_sub(self.used_index + 1)?)
            }
        }

        pub fn get(&self, i: usize) -> Option<&T> {
            if i < self.used_index {
                self.before.get(i)
            } else {
                self.after.get(i.checked_sub(self.used_index + 1)?)
            }
        }
    }

    /// Retrieve a value from a slice, but allow accessing the remaining elements using
    /// the returned `Remaining` object.
    pub fn remaining<T>(slice: &mut [T], i: usize) -> Option<(&mut T, Remaining<'_, T>)> {
        if i >= slice.len() {
            return None;
        }

        let (before, rest) = slice.split_at_mut(i);
        let (value, after) = rest.split_first_mut().expect("index checked above");

        Some((
            value,
            Remaining {
                before,
                after,
                used_index: i,
            },
        ))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn remaining_test() {
            let mut data = vec![1, 2, 3, 4];

            let (val, mut remaining) = remaining(&mut data, 2).unwrap();
            assert_eq!(*val, 3);

            let val1 = remaining.get(0).unwrap();
            assert_eq!(*val1, 1);

            let val2 = remaining.get(1).unwrap();
            assert_eq!(*val2, 2);

            assert!(remaining.get(2).is_none());

            let val4 = remaining.get_mut(3).unwrap();
            assert_eq!(*val4, 4);

            assert!(remaining.get(4).is_none());
        }

        #[test]
        fn first_and_last_split() {
            let mut data = vec![10, 20];

            let (first, rest) = remaining(&mut data, 0).unwrap();
            assert_eq!(*first, 10);
            assert_eq!(rest.get(1), Some(&20));

            let (last, rest) = remaining(&mut data, 1).unwrap();
            assert_eq!(*last, 20);
            assert_eq!(rest.get(0), Some(&10));
        }
    }
}
