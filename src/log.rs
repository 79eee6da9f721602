use std::sync::Mutex;
use std::time::Duration;

use chrono::{Datelike, Local, Timelike};
use itertools::Itertools;
use lazy_static::lazy_static;
use ringbuffer::RingBufferWrite;
use ringbuffer::{AllocRingBuffer, RingBufferExt};
use serde_derive::Serialize;

lazy_static! {
    static ref BUFFER: Mutex<AllocRingBuffer<String>> =
        Mutex::new(AllocRingBuffer::with_capacity(128));
}

pub fn write_message(message: &str) {
    let time = Local::now();

    let human_readable = format!(
        "{:02}.{:02} {:02}:{:02}:{:02}",
        time.day(),
        time.month(),
        time.hour(),
        time.minute(),
        time.second()
    );

    // a poisoned buffer still holds usable messages
    let mut buffer = match BUFFER.lock() {
        Ok(buffer) => buffer,
        Err(poisoned) => poisoned.into_inner(),
    };

    buffer.push(format!("[{human_readable}] {message}"))
}

macro_rules! log{
    ($($e:expr),+) => {
        crate::log::write_message(&format!($($e),+))
    }
}

pub(crate) use log;

/// Most recent `n` messages, oldest first.
pub fn pull_messages(n: usize) -> Vec<String> {
    let mut items = {
        let buffer = match BUFFER.lock() {
            Ok(buffer) => buffer,
            Err(poisoned) => poisoned.into_inner(),
        };

        buffer.iter().rev().take(n).map(Clone::clone).collect_vec()
    };
    items.reverse();
    items
}

pub fn format_elapsed(elapsed: Duration) -> String {
    // sub-microsecond precision is noise for query timings
    let rounded = Duration::new(elapsed.as_secs(), elapsed.subsec_micros() * 1_000);
    humantime::format_duration(rounded).to_string()
}

#[derive(Clone, Debug, Serialize)]
pub struct QueryEvent {
    pub elapsed: String,
    pub kind: QueryEventKind,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub enum QueryEventKind {
    Counted { symbol: String, length: usize, count: String },

    Enumerated { symbol: String, length: usize, strings: usize },

    Sampled { symbol: String, length: usize, samples: usize },

    Fuzzed { symbol: String, samples: usize },
}
