use std::collections::VecDeque;

/// Moving average over the last `window` samples, updated one sample at a time.
///
/// Until the window fills, the mean is over the samples seen so far.
#[derive(Debug, Clone)]
pub struct StreamingMovingAverage {
    window: usize,
    buf: VecDeque<f32>,
    sum: f64,
}

impl StreamingMovingAverage {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            buf: VecDeque::with_capacity(window + 1),
            sum: 0.0,
        }
    }

    pub fn process(&mut self, value: f32) -> f32 {
        self.buf.push_back(value);
        self.sum += f64::from(value);
        if self.buf.len() > self.window
            && let Some(old) = self.buf.pop_front()
        {
            self.sum -= f64::from(old);
        }
        (self.sum / self.buf.len() as f64) as f32
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}
