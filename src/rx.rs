use core::convert::Infallible;
use core::future::poll_fn;
use core::task::Poll;

use embassy_sync::waitqueue::AtomicWaker;
use embedded_io_async::{ErrorType, Read};
use heapless::spsc::{Consumer, Producer, Queue};

/// Slot count of the receive ring used by the reference board
pub const RX_BUFFER_SIZE: usize = 64;

/// Fixed-capacity receive ring bridging the UART interrupt and the
/// foreground loop.
///
/// One slot is always kept free to tell "full" from "empty", so the ring
/// holds at most `N - 1` bytes. Bytes arriving while it is full are dropped.
pub struct RxBuffer<const N: usize> {
    queue: Queue<u8, N>,
    waker: AtomicWaker,
}

impl<const N: usize> RxBuffer<N> {
    /// Create an empty ring
    pub const fn new() -> Self {
        Self {
            queue: Queue::new(),
            waker: AtomicWaker::new(),
        }
    }

    /// Split the ring into its interrupt-side and foreground-side halves
    pub fn split(&mut self) -> (RxProducer<'_, N>, RxConsumer<'_, N>) {
        let Self { queue, waker } = self;
        let waker: &AtomicWaker = waker;
        let (producer, consumer) = queue.split();
        (
            RxProducer {
                inner: producer,
                waker,
            },
            RxConsumer {
                inner: consumer,
                waker,
            },
        )
    }
}

impl<const N: usize> Default for RxBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer half, owned by the byte-received interrupt handler
pub struct RxProducer<'a, const N: usize> {
    inner: Producer<'a, u8, N>,
    waker: &'a AtomicWaker,
}

impl<'a, const N: usize> RxProducer<'a, N> {
    /// Store a received byte. Never blocks.
    ///
    /// Returns `false` and drops the byte when the ring is full.
    pub fn push(&mut self, byte: u8) -> bool {
        match self.inner.enqueue(byte) {
            Ok(()) => {
                self.waker.wake();
                true
            }
            Err(dropped) => {
                trace!("rx ring full, dropped {=u8:#x}", dropped);
                false
            }
        }
    }

    pub fn is_full(&self) -> bool {
        !self.inner.ready()
    }
}

/// Consumer half, owned by the foreground loop
pub struct RxConsumer<'a, const N: usize> {
    inner: Consumer<'a, u8, N>,
    waker: &'a AtomicWaker,
}

impl<'a, const N: usize> RxConsumer<'a, N> {
    /// Take the oldest byte, if any
    pub fn try_pop(&mut self) -> Option<u8> {
        self.inner.dequeue()
    }

    /// Spin until a byte is available and take it.
    ///
    /// There is no timeout. Use [`pop_async`](Self::pop_async) when the
    /// wait has to be bounded or cancelled.
    pub fn pop(&mut self) -> u8 {
        loop {
            if let Some(byte) = self.inner.dequeue() {
                return byte;
            }
            core::hint::spin_loop();
        }
    }

    /// Wait for a byte without spinning; the producer wakes the task on push.
    pub async fn pop_async(&mut self) -> u8 {
        poll_fn(|cx| {
            if let Some(byte) = self.inner.dequeue() {
                return Poll::Ready(byte);
            }
            self.waker.register(cx.waker());
            // A push may have landed between the first check and registering.
            match self.inner.dequeue() {
                Some(byte) => Poll::Ready(byte),
                None => Poll::Pending,
            }
        })
        .await
    }

    /// Number of bytes waiting
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        !self.inner.ready()
    }
}

impl<'a, const N: usize> ErrorType for RxConsumer<'a, N> {
    type Error = Infallible;
}

impl<'a, const N: usize> Read for RxConsumer<'a, N> {
    /// Waits for the first byte, then drains whatever else is already queued.
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        buf[0] = self.pop_async().await;
        let mut count = 1;
        while count < buf.len() {
            match self.inner.dequeue() {
                Some(byte) => {
                    buf[count] = byte;
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }
}
