// Copyright (C) 2025 Marcus L. Hanestad <marlhan@proton.me>
//
// This file is part of OpenMirroring.
//
// OpenMirroring is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// OpenMirroring is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with OpenMirroring.  If not, see <https://www.gnu.org/licenses/>.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use log::trace;

use crate::geometry::Size;

type Waker = Box<dyn Fn() + Send + Sync + 'static>;

#[inline]
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Hands the native size from the streaming thread over to the GUI thread.
///
/// Only the newest size is kept, so posting never allocates and never blocks.
/// The wake channel holds at most one token.
pub struct Notifier {
    pending: Mutex<Option<Size>>,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
    waker: Mutex<Option<Waker>>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (wake_tx, wake_rx) = crossbeam_channel::bounded(1);
        Self {
            pending: Mutex::new(None),
            wake_tx,
            wake_rx,
            waker: Mutex::new(None),
        }
    }

    pub fn set_waker<F>(&self, waker: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *lock(&self.waker) = Some(Box::new(waker));
    }

    pub fn receiver(&self) -> Receiver<()> {
        self.wake_rx.clone()
    }

    pub fn post_native_size(&self, size: Size) {
        *lock(&self.pending) = Some(size);

        match self.wake_tx.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => (),
            Err(TrySendError::Disconnected(())) => trace!("Wake channel disconnected"),
        }

        if let Some(waker) = lock(&self.waker).as_ref() {
            waker();
        }
    }

    /// Takes the pending size. Call on the GUI thread.
    pub fn take(&self) -> Option<Size> {
        // Drain before taking so a post racing with us leaves a token behind.
        while self.wake_rx.try_recv().is_ok() {}
        lock(&self.pending).take()
    }
}

/// GUI thread callbacks.
pub struct Signal<T> {
    handlers: Vec<Box<dyn FnMut(T)>>,
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }
}

impl<T: Copy> Signal<T> {
    pub fn connect<F: FnMut(T) + 'static>(&mut self, f: F) {
        self.handlers.push(Box::new(f));
    }

    pub fn emit(&mut self, value: T) {
        for handler in &mut self.handlers {
            handler(value);
        }
    }
}
