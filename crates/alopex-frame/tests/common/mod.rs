#![allow(dead_code)]

pub mod tracing_setup;

use std::io::{self, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use alopex_frame::{column_of, Column, Frame};

/// People with a nullable age and a nested address group.
pub fn people() -> Frame {
    let address = Frame::new(vec![
        column_of("city", vec!["Oslo", "Rome", "Lima"]),
        column_of("zip", vec![Some(150_i64), None, Some(15001)]),
    ])
    .unwrap();
    Frame::new(vec![
        column_of("name", vec!["Alice", "Bob", "Carol"]),
        column_of("age", vec![Some(30_i64), None, Some(41)]),
        Column::group("address", address),
        column_of("weight", vec![54.5_f64, 80.0, f64::NAN]),
    ])
    .unwrap()
}

/// A reader over `bytes` that counts how often it is dropped.
pub struct CountingReader {
    inner: io::Cursor<Vec<u8>>,
    drops: Arc<AtomicUsize>,
}

impl CountingReader {
    pub fn new(bytes: &[u8]) -> (Self, Arc<AtomicUsize>) {
        let drops = Arc::new(AtomicUsize::new(0));
        let reader = Self {
            inner: io::Cursor::new(bytes.to_vec()),
            drops: drops.clone(),
        };
        (reader, drops)
    }
}

impl Read for CountingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Drop for CountingReader {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}
