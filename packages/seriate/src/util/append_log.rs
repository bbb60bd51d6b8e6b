//! Append-only log that can store a small number of elements inline.

use smallvec::SmallVec;
use std::{
    mem,
    fmt::{self, Formatter, Debug},
};


// this many elements may be stored without heap allocating
const INLINE_LEN: usize = 4;


/// Append-only log that can store a small number of elements inline
///
/// Elements are only ever added at the back, except that the front element may be overwritten,
/// and reading consumes the log
pub struct AppendLog<T>(SmallVec<[T; INLINE_LEN]>);

impl<T> AppendLog<T> {
    /// Construct empty
    pub fn new() -> Self {
        AppendLog(SmallVec::new())
    }

    /// Current length in elements
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no elements
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append to back of log
    pub fn push(&mut self, elem: T) {
        self.0.push(elem);
    }

    /// Overwrite the front element, or push it if empty. Returns the overwritten element
    pub fn set_first(&mut self, elem: T) -> Option<T> {
        match self.0.first_mut() {
            Some(first) => Some(mem::replace(first, elem)),
            None => {
                self.0.push(elem);
                None
            }
        }
    }

    /// Consume the log front to back, stopping early once `f` returns false
    ///
    /// Returns whether every element was visited without `f` returning false. Elements after the
    /// stopping point are dropped
    pub fn for_each_while<F: FnMut(T) -> bool>(self, mut f: F) -> bool {
        self.0.into_iter().all(|elem| f(elem))
    }

    /// Create iterator from front to back by reference
    pub fn iter(&self) -> impl Iterator<Item=&T> {
        self.0.iter()
    }
}

impl<T> Default for AppendLog<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Debug> Debug for AppendLog<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> IntoIterator for AppendLog<T> {
    type Item = T;
    type IntoIter = smallvec::IntoIter<[T; INLINE_LEN]>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand_pcg::Pcg32;

    fn new_rng() -> impl Rng {
        Pcg32::from_seed(0xdeadbeefdeadbeefdeadbeefdeadbeefu128.to_le_bytes())
    }

    #[test]
    fn set_first_on_empty_pushes() {
        let mut log = AppendLog::new();
        assert_eq!(log.set_first(1), None);
        assert_eq!(log.len(), 1);
        log.push(2);
        assert_eq!(log.set_first(3), Some(1));
        assert_eq!(log.into_iter().collect::<Vec<_>>(), [3, 2]);
    }

    #[test]
    fn for_each_while_stops_early() {
        let mut log = AppendLog::new();
        for i in 0..10 {
            log.push(i);
        }
        let mut seen = Vec::new();
        let finished = log.for_each_while(|i| {
            seen.push(i);
            i != 5
        });
        assert!(!finished);
        assert_eq!(seen, [0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn for_each_while_empty() {
        let log = AppendLog::<u8>::new();
        assert!(log.is_empty());
        assert!(log.for_each_while(|_| panic!("visited element of empty log")));
    }

    #[test]
    fn equivalent_to_vec() {
        let mut rng = new_rng();

        for outer in 0..100 {
            let mut log_1 = Vec::new();
            let mut log_2 = AppendLog::new();
            println!("outer loop {}", outer);
            for i in 0u32..rng.gen_range(0..64) {
                if rng.gen_ratio(9, 10) {
                    println!("PUSH {}", i);
                    log_1.push(i);
                    log_2.push(i);
                } else {
                    println!("SET FIRST {}", i);
                    let expect = if log_1.is_empty() {
                        log_1.push(i);
                        None
                    } else {
                        Some(mem::replace(&mut log_1[0], i))
                    };
                    assert_eq!(log_2.set_first(i), expect);
                }
                assert_eq!(log_1.len(), log_2.len());
            }
            assert_eq!(log_2.iter().copied().collect::<Vec<_>>(), log_1);
            let mut visited = Vec::new();
            assert!(log_2.for_each_while(|i| {
                visited.push(i);
                true
            }));
            assert_eq!(visited, log_1);
        }
    }
}
